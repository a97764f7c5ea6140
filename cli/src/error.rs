use crate::api::ApiError;
use crate::console::Console;
use crate::kube::ConfigError;
use std::io::Write;
use thiserror::Error;
use tracing::debug;

/// Exit code when the API server rejected or failed a request.
pub const EXIT_REMOTE_FAILURE: u8 = 1;
/// Exit code for failures on this side: configuration, missing tools, I/O.
pub const EXIT_LOCAL_FAILURE: u8 = 2;

const SIGNAL_EXIT_BASE: i32 = 128;

/// How a successful handler finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Success,
    /// An external tool ran to completion with this exit code.
    Child(i32),
}

impl Completion {
    pub fn from_signal(signal: i32) -> Self {
        Self::Child(SIGNAL_EXIT_BASE + signal)
    }

    pub fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Child(code) => u8::try_from(code).unwrap_or(EXIT_REMOTE_FAILURE),
        }
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{tool} is required for this command but was not found on PATH")]
    ToolUnavailable { tool: &'static str },
    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to serialize output: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CommandError {
    /// Remote failures are reported and the run ends; nothing local is broken.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Api(_))
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_remote() {
            EXIT_REMOTE_FAILURE
        } else {
            EXIT_LOCAL_FAILURE
        }
    }
}

/// The single place where a handler result becomes a process exit code.
pub fn finish<O: Write, E: Write>(
    result: Result<Completion, CommandError>,
    console: &mut Console<O, E>,
) -> u8 {
    match result {
        Ok(completion) => completion.exit_code(),
        Err(err) => {
            debug!("Command failed: {:?}", err);
            // Nothing sensible is left to do if stderr itself is gone.
            let _ = console.error(&err);
            err.exit_code()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn forbidden() -> CommandError {
        CommandError::Api(ApiError::Status {
            reason: "Forbidden".to_string(),
            message: "pods is forbidden".to_string(),
            code: 403,
        })
    }

    #[rstest]
    #[case(Completion::Success, 0)]
    #[case(Completion::Child(0), 0)]
    #[case(Completion::Child(3), 3)]
    #[case(Completion::Child(-1), 1)]
    #[case(Completion::from_signal(2), 130)]
    fn test_completion_exit_code(#[case] completion: Completion, #[case] expected: u8) {
        assert_eq!(completion.exit_code(), expected);
    }

    #[test]
    fn test_remote_error_exits_one() {
        let err = forbidden();
        assert!(err.is_remote());
        assert_eq!(err.exit_code(), EXIT_REMOTE_FAILURE);
    }

    #[test]
    fn test_local_errors_exit_two() {
        let missing = CommandError::ToolUnavailable { tool: "kubectl" };
        let config = CommandError::Config(ConfigError::ConflictingFlags);

        assert_eq!(missing.exit_code(), EXIT_LOCAL_FAILURE);
        assert_eq!(config.exit_code(), EXIT_LOCAL_FAILURE);
        assert!(!config.is_remote());
    }

    #[test]
    fn test_finish_reports_error_on_stderr() {
        let mut console = Console::captured();

        let code = finish(Err(forbidden()), &mut console);

        assert_eq!(code, EXIT_REMOTE_FAILURE);
        assert!(console.stdout_text().is_empty());
        assert!(
            console
                .stderr_text()
                .contains("API error: Forbidden (pods is forbidden)")
        );
    }

    #[test]
    fn test_finish_success_is_silent() {
        let mut console = Console::captured();

        let code = finish(Ok(Completion::Success), &mut console);

        assert_eq!(code, 0);
        assert!(console.stderr_text().is_empty());
    }
}
