use std::io::Write;
use std::path::Path;

use crate::commands::{Settings, run_kubectl};
use crate::console::Console;
use crate::error::{CommandError, Completion};
use crate::external::{ToolInvocation, ToolRunner};

/// `kubectl apply -f FILE`; `-n` is only forwarded when given explicitly.
pub async fn handle_apply_command<O: Write, E: Write>(
    runner: &dyn ToolRunner,
    file: &Path,
    settings: &Settings,
    console: &mut Console<O, E>,
) -> Result<Completion, CommandError> {
    let invocation =
        ToolInvocation::apply(&settings.tool_target(), file, settings.explicit_namespace());
    Ok(run_kubectl(runner, &invocation, console).await?.completion())
}

pub async fn handle_delete_command<O: Write, E: Write>(
    runner: &dyn ToolRunner,
    file: &Path,
    force: bool,
    settings: &Settings,
    console: &mut Console<O, E>,
) -> Result<Completion, CommandError> {
    let invocation = ToolInvocation::delete(
        &settings.tool_target(),
        file,
        settings.explicit_namespace(),
        force,
    );
    Ok(run_kubectl(runner, &invocation, console).await?.completion())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::{MockToolRunner, ToolExit};
    use crate::kube::ConnectionOptions;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_apply_without_namespace_flag() {
        let mut runner = MockToolRunner::new();
        runner
            .expect_run()
            .withf(|invocation| {
                invocation.args()
                    == &[
                        "apply",
                        "-f",
                        "deploy.yaml",
                        "--kubeconfig=/tmp/config",
                    ]
            })
            .times(1)
            .returning(|_| Ok(ToolExit::Exited(0)));
        let settings = Settings::builder()
            .connection(
                ConnectionOptions::builder()
                    .kubeconfig(PathBuf::from("/tmp/config"))
                    .build(),
            )
            .build();
        let mut console = Console::captured();

        let completion =
            handle_apply_command(&runner, Path::new("deploy.yaml"), &settings, &mut console)
                .await
                .expect("apply should run");

        assert_eq!(completion.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_delete_forwards_namespace_and_force() {
        let mut runner = MockToolRunner::new();
        runner
            .expect_run()
            .withf(|invocation| {
                invocation.args() == &["delete", "-f", "deploy.yaml", "-n", "apps", "--force"]
            })
            .times(1)
            .returning(|_| Ok(ToolExit::Exited(1)));
        let settings = Settings::builder().namespace("apps".to_string()).build();
        let mut console = Console::captured();

        let completion = handle_delete_command(
            &runner,
            Path::new("deploy.yaml"),
            true,
            &settings,
            &mut console,
        )
        .await
        .expect("delete should run");

        assert_eq!(completion.exit_code(), 1);
        assert!(
            console
                .stdout_text()
                .contains("Running: kubectl delete -f deploy.yaml -n apps --force")
        );
    }
}
