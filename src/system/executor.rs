// src/system/executor.rs

use std::collections::BTreeMap;
use std::fmt;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

/// Failures at the process boundary.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// Unbalanced quotes in a user-authored command line.
    #[error("Command could not be parsed: {0}")]
    CommandParse(String),
    /// The command line was blank.
    #[error("No command specified to run.")]
    EmptyCommand,
    /// The program could not be spawned.
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, std::io::Error),
    /// Raised by [`CommandOutput::ensure_success`].
    #[error("Command '{0}' exited with a non-zero error code.")]
    NonZeroExitStatus(String),
    /// Captured stdout was not UTF-8.
    #[error("Command '{command}' produced output that was not valid UTF-8")]
    InvalidUtf8Output {
        command: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// How the child's standard streams are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Stdout and stderr go straight to the user's terminal.
    #[default]
    Interactive,
    /// Stdout is captured and returned; stderr is discarded.
    Captured,
}

/// A fully parameterized command: program plus argument vector. Nothing here
/// is ever joined into a shell string before execution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandSpec {
    /// Looked up on `PATH`.
    pub program: String,
    /// Passed verbatim, one element per argument.
    pub args: Vec<String>,
    /// Working directory. Inherited when `None`.
    pub cwd: Option<PathBuf>,
    /// Overrides layered on top of the inherited environment.
    pub env: BTreeMap<String, String>,
    /// Written to the child's stdin, which is then closed.
    pub stdin: Option<String>,
    /// Terminal or captured.
    pub mode: OutputMode,
}

impl CommandSpec {
    /// A command with no arguments, run interactively.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Tokenizes a user-authored command line with shell-word rules.
    pub fn from_command_line(command_line: &str) -> Result<Self, ExecutionError> {
        let trimmed = command_line.trim();
        if trimmed.is_empty() {
            return Err(ExecutionError::EmptyCommand);
        }
        let mut parts = shlex::split(trimmed)
            .ok_or_else(|| ExecutionError::CommandParse(trimmed.to_string()))?
            .into_iter();
        let program = parts.next().ok_or(ExecutionError::EmptyCommand)?;
        Ok(Self::new(program).args(parts))
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Adds environment overrides. Later keys win.
    pub fn envs(mut self, env: &BTreeMap<String, String>) -> Self {
        self.env
            .extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Feeds `input` to the child's stdin.
    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Captures stdout instead of printing it.
    pub fn captured(mut self) -> Self {
        self.mode = OutputMode::Captured;
        self
    }

    /// The program and its arguments, space separated. Used for matching and
    /// display only.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        match shlex::try_join(words) {
            Ok(quoted) => f.write_str(&quoted),
            Err(_) => f.write_str(&self.command_line()),
        }
    }
}

/// What a finished command left behind. A non-zero exit is data here; callers
/// that need success call [`CommandOutput::ensure_success`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit status was zero.
    pub success: bool,
    /// `None` when the child was killed by a signal.
    pub code: Option<i32>,
    /// Empty unless the command ran captured.
    pub stdout: String,
}

impl CommandOutput {
    /// A zero exit with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
        }
    }

    /// A non-zero exit with no output.
    pub fn failure(code: i32) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
        }
    }

    /// Turns a non-zero exit into [`ExecutionError::NonZeroExitStatus`].
    pub fn ensure_success(self, spec: &CommandSpec) -> Result<Self, ExecutionError> {
        if self.success {
            Ok(self)
        } else {
            Err(ExecutionError::NonZeroExitStatus(spec.to_string()))
        }
    }
}

/// The process boundary. Everything that talks to git or docker goes through
/// this trait.
pub trait CommandRunner {
    /// Runs `spec` to completion. Only spawn failures are errors.
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecutionError>;
}

/// Runs commands with `std::process`, blocking until each one finishes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    fn build(spec: &CommandSpec, program: &str, args: &[String]) -> StdCommand {
        let mut command = StdCommand::new(program);
        command.args(args).envs(&spec.env);
        if let Some(cwd) = &spec.cwd {
            command.current_dir(dunce::simplified(cwd));
        }

        command.stdin(if spec.stdin.is_some() {
            Stdio::piped()
        } else if spec.mode == OutputMode::Captured {
            Stdio::null()
        } else {
            Stdio::inherit()
        });

        match spec.mode {
            OutputMode::Interactive => {
                command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
            OutputMode::Captured => {
                command.stdout(Stdio::piped()).stderr(Stdio::null());
            }
        }
        command
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecutionError> {
        if spec.program.trim().is_empty() {
            return Err(ExecutionError::EmptyCommand);
        }
        log::debug!("Running `{}` in {:?}", spec, spec.cwd);

        // Windows built-ins like `echo` only exist inside cmd.exe.
        let mut child = match Self::build(spec, &spec.program, &spec.args).spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound && cfg!(target_os = "windows") => {
                log::debug!("Command '{}' not found. Retrying with cmd /C.", spec.program);
                let mut args = vec!["/C".to_string(), spec.program.clone()];
                args.extend(spec.args.iter().cloned());
                Self::build(spec, "cmd", &args)
                    .spawn()
                    .map_err(|e| ExecutionError::CommandFailed(spec.to_string(), e))?
            }
            Err(e) => return Err(ExecutionError::CommandFailed(spec.to_string(), e)),
        };

        if let Some(input) = &spec.stdin {
            if let Some(mut pipe) = child.stdin.take() {
                pipe.write_all(input.as_bytes())
                    .map_err(|e| ExecutionError::CommandFailed(spec.to_string(), e))?;
                // Dropping the handle closes stdin so the child sees EOF.
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| ExecutionError::CommandFailed(spec.to_string(), e))?;

        let stdout =
            String::from_utf8(output.stdout).map_err(|e| ExecutionError::InvalidUtf8Output {
                command: spec.to_string(),
                source: e,
            })?;

        if !output.status.success() {
            log::debug!("`{}` exited with {:?}", spec, output.status.code());
        }

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout,
        })
    }
}
