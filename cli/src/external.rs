use async_trait::async_trait;
use getset::{CopyGetters, Getters};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::{debug, info};

#[cfg(test)]
use mockall::automock;

use crate::capabilities::KUBECTL;
use crate::error::Completion;

/// Connection flags forwarded so kubectl talks to the same cluster we would.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolTarget {
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
}

impl ToolTarget {
    fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(kubeconfig) = &self.kubeconfig {
            args.push(format!("--kubeconfig={}", kubeconfig.display()));
        }
        if let Some(context) = &self.context {
            args.push(format!("--context={context}"));
        }
        args
    }
}

/// One kubectl run: its arguments and how to treat Ctrl-C while it runs.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct ToolInvocation {
    #[getset(get = "pub")]
    args: Vec<String>,

    /// Ctrl-C ends the child and counts as a normal stop.
    #[getset(get_copy = "pub")]
    stop_on_interrupt: bool,
}

impl ToolInvocation {
    pub fn exec(
        target: &ToolTarget,
        pod: &str,
        namespace: &str,
        container: Option<&str>,
        command: &[String],
        tty: bool,
    ) -> Self {
        let mut args = vec!["exec".to_string(), "-i".to_string()];
        if tty {
            args.push("-t".to_string());
        }
        args.extend([pod.to_string(), "-n".to_string(), namespace.to_string()]);
        if let Some(container) = container {
            args.extend(["-c".to_string(), container.to_string()]);
        }
        args.extend(target.args());
        args.push("--".to_string());
        args.extend(command.iter().cloned());

        Self {
            args,
            stop_on_interrupt: false,
        }
    }

    pub fn port_forward(target: &ToolTarget, name: &str, ports: &str, namespace: &str) -> Self {
        let mut args = vec![
            "port-forward".to_string(),
            name.to_string(),
            ports.to_string(),
            "-n".to_string(),
            namespace.to_string(),
        ];
        args.extend(target.args());

        Self {
            args,
            stop_on_interrupt: true,
        }
    }

    pub fn apply(target: &ToolTarget, file: &Path, namespace: Option<&str>) -> Self {
        Self::manifest("apply", target, file, namespace, false)
    }

    pub fn delete(target: &ToolTarget, file: &Path, namespace: Option<&str>, force: bool) -> Self {
        Self::manifest("delete", target, file, namespace, force)
    }

    fn manifest(
        verb: &str,
        target: &ToolTarget,
        file: &Path,
        namespace: Option<&str>,
        force: bool,
    ) -> Self {
        let mut args = vec![
            verb.to_string(),
            "-f".to_string(),
            file.display().to_string(),
        ];
        if let Some(namespace) = namespace {
            args.extend(["-n".to_string(), namespace.to_string()]);
        }
        if force {
            args.push("--force".to_string());
        }
        args.extend(target.args());

        Self {
            args,
            stop_on_interrupt: false,
        }
    }
}

impl Display for ToolInvocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{KUBECTL} {}", self.args.join(" "))
    }
}

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolExit {
    Exited(i32),
    Signaled(i32),
    /// Stopped by Ctrl-C where that is the expected way to end it.
    Interrupted,
}

impl From<ExitStatus> for ToolExit {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self::Exited(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self::Signaled(signal);
            }
        }

        Self::Exited(1)
    }
}

impl ToolExit {
    pub fn completion(self) -> Completion {
        match self {
            Self::Exited(code) => Completion::Child(code),
            Self::Signaled(signal) => Completion::from_signal(signal),
            Self::Interrupted => Completion::Success,
        }
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, invocation: &ToolInvocation) -> std::io::Result<ToolExit>;
}

/// Runs the tool as a child process attached to our terminal.
pub struct ProcessRunner {
    program: PathBuf,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl ToolRunner for ProcessRunner {
    async fn run(&self, invocation: &ToolInvocation) -> std::io::Result<ToolExit> {
        debug!("Spawning {} {:?}", self.program.display(), invocation.args());
        let mut child = Command::new(&self.program)
            .args(invocation.args())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()?;

        if !invocation.stop_on_interrupt() {
            return Ok(child.wait().await?.into());
        }

        match unless_interrupted(child.wait(), tokio::signal::ctrl_c()).await {
            Some(status) => Ok(status?.into()),
            None => {
                // The child shares our process group and got the same SIGINT.
                let status = child.wait().await?;
                info!("{} stopped by interrupt ({})", KUBECTL, status);
                Ok(ToolExit::Interrupted)
            }
        }
    }
}

/// Runs `work` unless `interrupt` fires first. A tie goes to the interrupt.
async fn unless_interrupted<T>(
    work: impl Future<Output = T>,
    interrupt: impl Future<Output = std::io::Result<()>>,
) -> Option<T> {
    tokio::select! {
        biased;
        Ok(()) = interrupt => None,
        output = work => Some(output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| (*arg).to_string()).collect()
    }

    #[tokio::test]
    async fn test_interrupt_wins_when_child_exits_at_the_same_time() {
        let outcome = unless_interrupted(std::future::ready(0), std::future::ready(Ok(()))).await;
        assert_eq!(outcome, None);
    }

    #[tokio::test]
    async fn test_child_exit_without_interrupt() {
        let outcome =
            unless_interrupted(std::future::ready(7), std::future::pending::<std::io::Result<()>>())
                .await;
        assert_eq!(outcome, Some(7));
    }

    #[tokio::test]
    async fn test_failed_interrupt_listener_is_ignored() {
        let interrupt = std::future::ready(Err(std::io::Error::other("no signal handler")));
        let outcome = unless_interrupted(std::future::ready(7), interrupt).await;
        assert_eq!(outcome, Some(7));
    }

    #[test]
    fn test_exec_args_with_container_and_tty() {
        let invocation = ToolInvocation::exec(
            &ToolTarget::default(),
            "web-1",
            "default",
            Some("app"),
            &strings(&["/bin/sh", "-c", "ls"]),
            true,
        );

        assert_eq!(
            invocation.args(),
            &strings(&[
                "exec", "-i", "-t", "web-1", "-n", "default", "-c", "app", "--", "/bin/sh", "-c",
                "ls"
            ])
        );
        assert!(!invocation.stop_on_interrupt());
    }

    #[test]
    fn test_exec_args_without_tty_forward_target() {
        let target = ToolTarget {
            kubeconfig: Some(PathBuf::from("/tmp/config")),
            context: Some("prod".to_string()),
        };

        let invocation =
            ToolInvocation::exec(&target, "web-1", "apps", None, &strings(&["env"]), false);

        assert_eq!(
            invocation.args(),
            &strings(&[
                "exec",
                "-i",
                "web-1",
                "-n",
                "apps",
                "--kubeconfig=/tmp/config",
                "--context=prod",
                "--",
                "env"
            ])
        );
    }

    #[test]
    fn test_port_forward_stops_on_interrupt() {
        let invocation =
            ToolInvocation::port_forward(&ToolTarget::default(), "svc/web", "8080:80", "default");

        assert_eq!(
            invocation.args(),
            &strings(&["port-forward", "svc/web", "8080:80", "-n", "default"])
        );
        assert!(invocation.stop_on_interrupt());
        assert_eq!(
            invocation.to_string(),
            "kubectl port-forward svc/web 8080:80 -n default"
        );
    }

    #[test]
    fn test_exit_completion() {
        assert_eq!(ToolExit::Exited(0).completion(), Completion::Child(0));
        assert_eq!(ToolExit::Exited(7).completion().exit_code(), 7);
        assert_eq!(ToolExit::Signaled(9).completion().exit_code(), 137);
        assert_eq!(ToolExit::Interrupted.completion(), Completion::Success);
    }

    #[test]
    fn test_apply_args() {
        let invocation =
            ToolInvocation::apply(&ToolTarget::default(), Path::new("deploy.yaml"), None);

        assert_eq!(invocation.args(), &strings(&["apply", "-f", "deploy.yaml"]));
    }

    #[test]
    fn test_delete_args_with_namespace_and_force() {
        let invocation = ToolInvocation::delete(
            &ToolTarget::default(),
            Path::new("deploy.yaml"),
            Some("apps"),
            true,
        );

        assert_eq!(
            invocation.args(),
            &strings(&["delete", "-f", "deploy.yaml", "-n", "apps", "--force"])
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_reports_exit_code() {
        let runner = ProcessRunner::new("sh");
        let invocation = ToolInvocation {
            args: strings(&["-c", "exit 3"]),
            stop_on_interrupt: false,
        };

        let exit = runner.run(&invocation).await.expect("sh should run");

        assert_eq!(exit, ToolExit::Exited(3));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_reports_signal() {
        let runner = ProcessRunner::new("sh");
        let invocation = ToolInvocation {
            args: strings(&["-c", "kill -TERM $$"]),
            stop_on_interrupt: false,
        };

        let exit = runner.run(&invocation).await.expect("sh should run");

        assert_eq!(exit, ToolExit::Signaled(15));
    }

    #[tokio::test]
    async fn test_process_runner_missing_program_fails() {
        let runner = ProcessRunner::new("kctl-test-tool-that-does-not-exist");
        let invocation = ToolInvocation {
            args: Vec::new(),
            stop_on_interrupt: false,
        };

        assert!(runner.run(&invocation).await.is_err());
    }
}
