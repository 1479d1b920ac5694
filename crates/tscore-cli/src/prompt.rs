//! Terminal prompts for credentials missing from the parameters.

use std::io::{self, BufRead, Write};

use tscore_core::CredentialPrompt;

/// Prompts on stderr and reads from the terminal. The password is read
/// without echo.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl CredentialPrompt for TerminalPrompt {
    fn username(&mut self) -> io::Result<String> {
        let mut stderr = io::stderr().lock();
        write!(stderr, "Oracle username: ")?;
        stderr.flush()?;
        read_answer(&mut io::stdin().lock())
    }

    fn password(&mut self) -> io::Result<String> {
        rpassword::prompt_password("Oracle password: ")
    }
}

/// One line of input without its line ending. End of input is an error.
pub fn read_answer<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "no answer before end of input",
        ));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
