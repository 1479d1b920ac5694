//! Drug and condition ID list parsing.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{info, warn};
use tscore_model::{Id, IdList};

use crate::error::{IngestError, Result};

/// Parse one line of an ID list.
///
/// Returns `None` for blank and `#` comment lines. All-digit values become
/// [`Id::Int`]; everything else is kept as a trimmed [`Id::Token`].
pub fn parse_id_line(line: &str) -> Option<Id> {
    let stripped = line.trim();
    if stripped.is_empty() || stripped.starts_with('#') {
        return None;
    }
    if stripped.bytes().all(|b| b.is_ascii_digit()) {
        match stripped.parse::<u64>() {
            Ok(value) => return Some(Id::Int(value)),
            Err(_) => warn!(id = stripped, "Numeric ID out of range, keeping it as a token"),
        }
    }
    Some(Id::Token(stripped.to_string()))
}

/// Parse an ID list from a reader, preserving order and duplicates.
pub fn parse_ids<R: BufRead>(reader: R) -> std::io::Result<IdList> {
    let mut ids = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = if index == 0 {
            line.strip_prefix('\u{feff}').unwrap_or(&line).to_string()
        } else {
            line
        };
        if let Some(id) = parse_id_line(&line) {
            ids.push(id);
        }
    }
    Ok(IdList::new(ids))
}

/// Read an ID list file.
pub fn read_id_file(path: &Path) -> Result<IdList> {
    info!(path = %path.display(), "Loading IDs from file");
    let file = File::open(path).map_err(|e| IngestError::from_io(path, e))?;
    let ids = parse_ids(BufReader::new(file)).map_err(|e| IngestError::from_io(path, e))?;
    info!(path = %path.display(), count = ids.len(), "Loaded IDs");
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn test_integers_and_tokens() {
        let ids = parse_ids(Cursor::new("773\n  797  \nRxNorm:1191\n")).unwrap();
        assert_eq!(
            ids.as_slice(),
            &[Id::Int(773), Id::Int(797), Id::from("RxNorm:1191")]
        );
    }

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        let ids = parse_ids(Cursor::new("# drugs\n\n   \n773\n  # trailing\n")).unwrap();
        assert_eq!(ids.as_slice(), &[Id::Int(773)]);
    }

    #[test]
    fn test_mixed_digit_tokens_stay_tokens() {
        assert_eq!(parse_id_line("12abc"), Some(Id::from("12abc")));
        assert_eq!(parse_id_line("-5"), Some(Id::from("-5")));
        assert_eq!(parse_id_line("1 2"), Some(Id::from("1 2")));
    }

    #[test]
    fn test_oversized_number_is_a_token() {
        let huge = "99999999999999999999999";
        assert_eq!(parse_id_line(huge), Some(Id::from(huge)));
    }

    #[test]
    fn test_duplicates_are_preserved() {
        let ids = parse_ids(Cursor::new("1\n2\n1\n")).unwrap();
        assert_eq!(ids.as_slice(), &[Id::Int(1), Id::Int(2), Id::Int(1)]);
    }

    #[test]
    fn test_read_id_file_with_bom() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "\u{feff}421\r\n443\r\n479\r\n").unwrap();
        let ids = read_id_file(file.path()).unwrap();
        assert_eq!(ids.as_slice(), &[Id::Int(421), Id::Int(443), Id::Int(479)]);
    }

    #[test]
    fn test_read_id_file_missing() {
        let result = read_id_file(Path::new("/definitely/not/here.txt"));
        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }
}
