use std::time::Duration;

/// A single external command to run under a timeout.
#[derive(Debug, Clone)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    hidden_window: bool,
}

impl Invocation {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout,
            hidden_window: false,
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

    /// Ask the OS not to create a console window for the child (Windows only).
    pub fn hidden_window(mut self) -> Self {
        self.hidden_window = true;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arg_list(&self) -> &[String] {
        &self.args
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_hidden_window(&self) -> bool {
        self.hidden_window
    }
}

/// Captured result of a finished invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_builder() {
        let invocation = Invocation::new("powershell.exe", Duration::from_secs(5))
            .arg("-NoProfile")
            .args(["-File", "script.ps1"])
            .hidden_window();

        assert_eq!(invocation.program(), "powershell.exe");
        assert_eq!(invocation.arg_list(), ["-NoProfile", "-File", "script.ps1"]);
        assert_eq!(invocation.timeout(), Duration::from_secs(5));
        assert!(invocation.is_hidden_window());
    }

    #[test]
    fn test_command_output_success() {
        let output = CommandOutput {
            exit_code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(output.success());

        let killed = CommandOutput {
            exit_code: None,
            ..output
        };
        assert!(!killed.success());
    }
}
