//! External process invocation
//!
//! Every SDK tool call goes through an [`Invocation`]: program, arguments and
//! the synthetic stdin text the tool is fed. Stdout and stderr are inherited
//! from the step so the tool output lands in the build log. Runs are blocking
//! from the caller's point of view: the invocation is awaited to completion
//! before the step moves on.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// A fully described external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Text written to the child's stdin before it is closed
    pub stdin: Option<String>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Feed `input` to the child's stdin
    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Shell-quoted command line, for the build log
    pub fn printable(&self) -> String {
        let mut words = Vec::with_capacity(self.args.len() + 1);
        words.push(self.program.to_string_lossy().into_owned());
        words.extend(self.args.iter().cloned());
        shell_words::join(words)
    }

    /// Check whether the argument list contains `flag` immediately followed by `value`
    pub fn has_arg_pair(&self, flag: &str, value: &str) -> bool {
        self.args.windows(2).any(|pair| pair[0] == flag && pair[1] == value)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.printable())
    }
}

/// Exit information of a finished command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit code; `None` when the process was terminated by a signal
    pub code: Option<i32>,
}

impl CommandOutcome {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn failure(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Why an invocation did not complete successfully
#[derive(Debug)]
pub enum RunFailure {
    /// The process could not be started, or did not finish in time
    Spawn(io::Error),
    /// The process ran and exited unsuccessfully
    Exit(Option<i32>),
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunFailure::Spawn(e) => write!(f, "failed to run command: {}", e),
            RunFailure::Exit(Some(code)) => write!(f, "exit status {}", code),
            RunFailure::Exit(None) => f.write_str("terminated by signal"),
        }
    }
}

/// Runs invocations to completion
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run the invocation and wait for it to exit
    async fn run(&self, invocation: &Invocation) -> io::Result<CommandOutcome>;
}

impl<R: CommandRunner> CommandRunner for &R {
    async fn run(&self, invocation: &Invocation) -> io::Result<CommandOutcome> {
        (**self).run(invocation).await
    }
}

/// Run an invocation and turn anything but a zero exit into a [`RunFailure`]
pub async fn run_to_completion<R: CommandRunner>(
    runner: &R,
    invocation: &Invocation,
) -> Result<(), RunFailure> {
    match runner.run(invocation).await {
        Ok(outcome) if outcome.is_success() => Ok(()),
        Ok(outcome) => Err(RunFailure::Exit(outcome.code)),
        Err(e) => Err(RunFailure::Spawn(e)),
    }
}

/// Spawns real processes with tokio
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound every invocation; a timeout is reported as a spawn failure
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> io::Result<CommandOutcome> {
        debug!("Spawning {}", invocation.program.display());

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(if invocation.stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        if let (Some(mut stdin), Some(input)) = (child.stdin.take(), invocation.stdin.as_ref()) {
            // The tool may exit without reading its prompt answer.
            if let Err(e) = stdin.write_all(input.as_bytes()).await {
                if e.kind() != io::ErrorKind::BrokenPipe {
                    return Err(e);
                }
            }
            drop(stdin);
        }

        let status = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => status?,
                Err(_) => {
                    warn!("{} did not finish within {:?}, killing it", invocation.program.display(), limit);
                    child.kill().await?;
                    return Err(io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("timed out after {:?}", limit),
                    ));
                }
            },
            None => child.wait().await?,
        };

        Ok(CommandOutcome { code: status.code() })
    }
}
