use crate::error::CommandError;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const KUBECTL: &str = "kubectl";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolAvailability {
    Available(PathBuf),
    Unavailable,
}

impl ToolAvailability {
    /// Looks `name` up on `PATH`.
    pub fn locate(name: &str) -> Self {
        match which::which(name) {
            Ok(path) => {
                debug!("Found {} at {}", name, path.display());
                Self::Available(path)
            }
            Err(err) => {
                debug!("{} not available: {}", name, err);
                Self::Unavailable
            }
        }
    }

    pub fn require(&self, tool: &'static str) -> Result<&Path, CommandError> {
        match self {
            Self::Available(path) => Ok(path),
            Self::Unavailable => Err(CommandError::ToolUnavailable { tool }),
        }
    }
}

/// What this host can do, probed once at startup.
#[derive(Debug, Clone)]
pub struct Capabilities {
    kubectl: ToolAvailability,
}

impl Capabilities {
    pub fn detect() -> Self {
        Self {
            kubectl: ToolAvailability::locate(KUBECTL),
        }
    }

    pub fn new(kubectl: ToolAvailability) -> Self {
        Self { kubectl }
    }

    pub fn kubectl(&self) -> &ToolAvailability {
        &self.kubectl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_is_unavailable() {
        let availability = ToolAvailability::locate("kctl-test-tool-that-does-not-exist");
        assert_eq!(availability, ToolAvailability::Unavailable);
    }

    #[test]
    fn test_require_unavailable_tool_fails() {
        let capabilities = Capabilities::new(ToolAvailability::Unavailable);

        let result = capabilities.kubectl().require(KUBECTL);

        assert!(matches!(
            result,
            Err(CommandError::ToolUnavailable { tool: "kubectl" })
        ));
    }

    #[test]
    fn test_require_available_tool_returns_path() {
        let capabilities =
            Capabilities::new(ToolAvailability::Available(PathBuf::from("/usr/bin/kubectl")));

        let path = capabilities
            .kubectl()
            .require(KUBECTL)
            .expect("kubectl should be available");

        assert_eq!(path, Path::new("/usr/bin/kubectl"));
    }
}
