//! Running scripts through the external batch client.
//!
//! [`ScriptRunner`] is the seam between the orchestrator and whatever
//! executes the script. [`SqlPlusRunner`] shells out like this:
//!
//! ```text
//! echo <password> | sqlplus -s <user>@<connection> @<script.sql> > output 2>&1
//! ```
//!
//! The password only ever travels over the child's stdin, never argv or the
//! environment.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::NamedTempFile;
use tracing::{debug, error, info};
use tscore_model::Secret;

use crate::error::{RunnerError, ToolExit};

/// How often a child with a timeout is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Who to connect as and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub connection: String,
    pub user: String,
}

impl ConnectionTarget {
    pub fn new(connection: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            connection: connection.into(),
            user: user.into(),
        }
    }

    /// `user@connection`, as passed on the tool's command line.
    pub fn login(&self) -> String {
        format!("{}@{}", self.user, self.connection)
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.login())
    }
}

/// How the tool ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Success,
    Failed(ToolExit),
}

impl Termination {
    /// Classify a child's exit status.
    pub fn from_status(status: ExitStatus) -> Self {
        if status.success() {
            return Self::Success;
        }
        if let Some(code) = status.code() {
            return Self::Failed(ToolExit::Code(code));
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self::Failed(ToolExit::Signal(signal));
            }
        }
        Self::Failed(ToolExit::Unknown)
    }
}

/// Captured tool output and how the tool ended.
///
/// The output is positioned at its start. It is separate from the report
/// file, which the script writes on its own.
#[derive(Debug)]
pub struct ExecutionResult {
    pub termination: Termination,
    output: File,
}

impl ExecutionResult {
    pub fn new(termination: Termination, mut output: File) -> io::Result<Self> {
        output.seek(SeekFrom::Start(0))?;
        Ok(Self {
            termination,
            output,
        })
    }

    /// Read all captured output and rewind for further reads.
    pub fn output_text(&mut self) -> io::Result<String> {
        self.output.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::new();
        self.output.read_to_end(&mut bytes)?;
        self.output.seek(SeekFrom::Start(0))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Turn a failed termination into [`RunnerError::ExternalTool`].
    ///
    /// The full output is logged before the error is returned.
    pub fn into_result(mut self, program: &str) -> Result<Self, RunnerError> {
        let Termination::Failed(exit) = self.termination else {
            return Ok(self);
        };
        error!("{program} sub-process {exit}");
        let output = self
            .output_text()
            .map_err(RunnerError::io("failed to read captured output"))?;
        info!("{program} output:\n{output}");
        Err(RunnerError::ExternalTool {
            program: program.to_string(),
            exit,
            output,
        })
    }
}

impl Read for ExecutionResult {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.output.read(buf)
    }
}

/// Executes a script against a connection, authenticated by a secret.
pub trait ScriptRunner {
    /// Run `script` and return its captured output.
    ///
    /// Any termination other than success is an error.
    fn run(
        &self,
        target: &ConnectionTarget,
        secret: &Secret,
        script: &str,
    ) -> Result<ExecutionResult, RunnerError>;
}

impl<R: ScriptRunner + ?Sized> ScriptRunner for &R {
    fn run(
        &self,
        target: &ConnectionTarget,
        secret: &Secret,
        script: &str,
    ) -> Result<ExecutionResult, RunnerError> {
        (**self).run(target, secret, script)
    }
}

/// Runs scripts with Oracle SQL*Plus (or anything with the same command line).
#[derive(Debug, Clone)]
pub struct SqlPlusRunner {
    program: PathBuf,
    leading_args: Vec<OsString>,
    timeout: Option<Duration>,
    script_dir: Option<PathBuf>,
}

impl Default for SqlPlusRunner {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PROGRAM)
    }
}

impl SqlPlusRunner {
    pub const DEFAULT_PROGRAM: &'static str = "sqlplus";

    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            timeout: None,
            script_dir: None,
        }
    }

    /// Arguments placed before the standard `-s <login> @<script>` ones,
    /// for running the client through a wrapper.
    #[must_use]
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.leading_args = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
        self
    }

    /// Kill the tool if it runs longer than `timeout`. `None` waits forever.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Directory for the temporary script file. `None` uses the system
    /// temp directory.
    #[must_use]
    pub fn with_script_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.script_dir = dir;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Full argument list (without the program) for a script path.
    pub fn args(&self, target: &ConnectionTarget, script_path: &Path) -> Vec<OsString> {
        let mut script_arg = OsString::from("@");
        script_arg.push(script_path.as_os_str());
        let mut args = self.leading_args.clone();
        args.push(OsString::from("-s"));
        args.push(OsString::from(target.login()));
        args.push(script_arg);
        args
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    fn write_script(&self, script: &str) -> Result<NamedTempFile, RunnerError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("tscore-").suffix(".sql");
        let mut file = match &self.script_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(RunnerError::io("failed to create script file"))?;
        file.write_all(script.as_bytes())
            .and_then(|()| file.flush())
            .and_then(|()| file.as_file().sync_all())
            .map_err(RunnerError::io("failed to write script file"))?;
        Ok(file)
    }

    /// Send the secret and close stdin so the tool does not wait for input.
    fn send_secret(child: &mut Child, secret: &Secret) -> io::Result<()> {
        let Some(mut stdin) = child.stdin.take() else {
            return Ok(());
        };
        match stdin.write_all(secret.expose().as_bytes()) {
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!("Sub-process closed its input before the password was written");
                Ok(())
            }
            other => other,
        }
        // stdin drops here, closing the pipe
    }

    /// Wait for exit, killing the child when the timeout passes.
    fn wait(&self, child: &mut Child) -> io::Result<Termination> {
        let Some(limit) = self.timeout else {
            return child.wait().map(Termination::from_status);
        };
        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Termination::from_status(status));
            }
            let elapsed = started.elapsed();
            if elapsed >= limit {
                // The child may exit between try_wait and kill.
                let _ = child.kill();
                child.wait()?;
                return Ok(Termination::Failed(ToolExit::TimedOut(limit)));
            }
            thread::sleep(POLL_INTERVAL.min(limit - elapsed));
        }
    }

    fn execute(
        &self,
        target: &ConnectionTarget,
        secret: &Secret,
        script_path: &Path,
    ) -> Result<ExecutionResult, RunnerError> {
        let program = self.program_name();
        let output = tempfile::tempfile().map_err(RunnerError::io("failed to create output file"))?;
        let stdout = output
            .try_clone()
            .map_err(RunnerError::io("failed to share output file"))?;
        let stderr = output
            .try_clone()
            .map_err(RunnerError::io("failed to share output file"))?;

        let args = self.args(target, script_path);
        info!(
            "Running {program} sub-process: {} {}",
            self.program.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );
        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .spawn()
            .map_err(|source| RunnerError::Launch {
                program: program.clone(),
                source,
            })?;

        if let Err(source) = Self::send_secret(&mut child, secret) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(RunnerError::Io {
                context: "failed to write password to sub-process",
                source,
            });
        }

        let termination = self
            .wait(&mut child)
            .map_err(RunnerError::io("failed to wait for sub-process"))?;
        let result = ExecutionResult::new(termination, output)
            .map_err(RunnerError::io("failed to rewind captured output"))?;
        result.into_result(&program)
    }
}

impl ScriptRunner for SqlPlusRunner {
    fn run(
        &self,
        target: &ConnectionTarget,
        secret: &Secret,
        script: &str,
    ) -> Result<ExecutionResult, RunnerError> {
        info!(login = %target, "Running script");
        debug!("Script:\n{script}");

        // Deleted when dropped, on every return path.
        let script_file = self.write_script(script)?;
        let outcome = self.execute(target, secret, script_file.path());
        drop(script_file);

        match &outcome {
            Ok(_) => info!("{} sub-process finished successfully", self.program_name()),
            Err(RunnerError::ExternalTool { .. }) => {}
            Err(err) => error!(error = %err, "Sub-process failed with exception"),
        }
        outcome
    }
}
