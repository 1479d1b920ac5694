//! Parameters file parsing.
//!
//! The format is deliberately loose: one `name: value` or `name = value`
//! setting per line, `#` comments, and blank lines. Names are kept exactly as
//! written (no case folding), since they must match template placeholders.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::{IngestError, Result};

static SETTING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([\w~!@$%^&*+|;,./?-]+)\s*[:=]\s*(.*?)\s*$").expect("Invalid setting regex")
});

/// A non-blank, non-comment line that did not look like a setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line_number: usize,
    pub content: String,
}

/// Settings read from a parameters file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedConfig {
    /// Settings in first-seen order. Later duplicates overwrite the value.
    pub settings: IndexMap<String, String>,
    /// Lines that were skipped with a warning.
    pub skipped: Vec<SkippedLine>,
}

/// Load a parameters file.
pub fn parse_config(path: &Path) -> Result<ParsedConfig> {
    info!(path = %path.display(), "Loading parameters file");
    let text = fs::read_to_string(path).map_err(|e| IngestError::from_io(path, e))?;
    Ok(parse_config_str(&text, &path.display().to_string()))
}

/// Parse parameters file text. `origin` names the source in warnings.
pub fn parse_config_str(text: &str, origin: &str) -> ParsedConfig {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut parsed = ParsedConfig::default();

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }
        match SETTING_REGEX.captures(line) {
            Some(captures) => {
                let name = captures[1].to_string();
                let value = captures[2].to_string();
                debug!(origin, line_number, name = %name, "Parsed setting");
                parsed.settings.insert(name, value);
            }
            None => {
                warn!("Skipping non-setting at {origin}:{line_number}: '{line}'");
                parsed.skipped.push(SkippedLine {
                    line_number,
                    content: line.to_string(),
                });
            }
        }
    }

    parsed
}
