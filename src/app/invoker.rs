use crate::app::models::Invocation;
use anyhow::{bail, Context, Result};
use std::io::{self, Read};
use std::path::Path;
use std::process::Command;

/// Exit code `go test` uses both for failing tests and for "no test files".
const BENIGN_EXIT_CODE: i32 = 1;

/// Runs the test tool inside a single directory.
pub trait TestInvoker {
    /// Errors mean the command could not be run at all; a non-zero exit is
    /// reported through the returned [`Invocation`].
    fn invoke(&mut self, dir: &Path) -> Result<Invocation>;
}

pub struct CommandInvoker {
    program: String,
    args: Vec<String>,
}

impl CommandInvoker {
    pub fn new(command: &[String]) -> Result<Self> {
        let Some((program, args)) = command.split_first() else {
            bail!("Test command is empty");
        };
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl TestInvoker for CommandInvoker {
    fn invoke(&mut self, dir: &Path) -> Result<Invocation> {
        log::debug!("Running {} {:?} in {}", self.program, self.args, dir.display());

        // Both streams share one pipe so the bytes keep their interleaving.
        let (mut reader, writer) = io::pipe().context("Failed to create output pipe")?;
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(dir)
            .stdout(writer.try_clone().context("Failed to clone output pipe")?)
            .stderr(writer)
            .spawn()
            .context(format!("Failed to start `{}` in {}", self.program, dir.display()))?;

        let mut output = Vec::new();
        reader
            .read_to_end(&mut output)
            .context("Failed to read test output")?;
        let status = child.wait().context("Failed to wait for test command")?;

        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Ok(Invocation {
            output,
            exit_code: status.code(),
            signal,
            success: status.success(),
        })
    }
}

/// Describes an unexpected exit, or `None` when the exit is clean or benign.
pub fn exit_problem(invocation: &Invocation) -> Option<String> {
    if invocation.success {
        return None;
    }
    match invocation.exit_code {
        Some(BENIGN_EXIT_CODE) => None,
        Some(code) => Some(format!("exit status {}", code)),
        None => Some(match invocation.signal {
            Some(signal) => format!("signal: {}", signal_name(signal)),
            None => "signal: unknown".to_string(),
        }),
    }
}

fn signal_name(signal: i32) -> String {
    match signal {
        1 => "hangup".to_string(),
        2 => "interrupt".to_string(),
        3 => "quit".to_string(),
        6 => "aborted".to_string(),
        9 => "killed".to_string(),
        11 => "segmentation fault".to_string(),
        13 => "broken pipe".to_string(),
        15 => "terminated".to_string(),
        other => format!("signal {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn invocation(exit_code: Option<i32>, success: bool) -> Invocation {
        Invocation {
            output: Vec::new(),
            exit_code,
            signal: None,
            success,
        }
    }

    #[test]
    fn exit_status_one_is_benign() {
        assert_eq!(exit_problem(&invocation(Some(0), true)), None);
        assert_eq!(exit_problem(&invocation(Some(1), false)), None);
    }

    #[test]
    fn other_exits_are_reported() {
        assert_eq!(
            exit_problem(&invocation(Some(2), false)).as_deref(),
            Some("exit status 2")
        );
        assert_eq!(
            exit_problem(&invocation(None, false)).as_deref(),
            Some("signal: unknown")
        );
    }

    #[test]
    fn signals_are_named() {
        let killed = Invocation {
            signal: Some(9),
            ..invocation(None, false)
        };
        assert_eq!(exit_problem(&killed).as_deref(), Some("signal: killed"));

        let odd = Invocation {
            signal: Some(42),
            ..invocation(None, false)
        };
        assert_eq!(exit_problem(&odd).as_deref(), Some("signal: signal 42"));
    }

    #[cfg(unix)]
    #[test]
    fn captures_terminating_signal() {
        let dir = TempDir::new().unwrap();
        let command: Vec<String> = ["sh", "-c", "kill -9 $$"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let result = CommandInvoker::new(&command).unwrap().invoke(dir.path()).unwrap();

        assert_eq!(result.exit_code, None);
        assert_eq!(result.signal, Some(9));
        assert_eq!(exit_problem(&result).as_deref(), Some("signal: killed"));
    }

    #[test]
    fn rejects_empty_command() {
        assert!(CommandInvoker::new(&[]).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn captures_combined_output_in_working_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "here").unwrap();
        let command: Vec<String> = ["sh", "-c", "cat marker.txt; echo; echo oops >&2; exit 1"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut invoker = CommandInvoker::new(&command).unwrap();
        let result = invoker.invoke(dir.path()).unwrap();

        assert_eq!(String::from_utf8_lossy(&result.output), "here\noops\n");
        assert_eq!(result.exit_code, Some(1));
        assert!(!result.success);
    }

    #[test]
    fn missing_program_is_an_error() {
        let dir = TempDir::new().unwrap();
        let command = vec!["utrunner-definitely-not-a-real-program".to_string()];
        let mut invoker = CommandInvoker::new(&command).unwrap();
        assert!(invoker.invoke(dir.path()).is_err());
    }
}
