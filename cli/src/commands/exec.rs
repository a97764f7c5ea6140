use std::io::Write;

use crate::commands::{Settings, run_kubectl};
use crate::console::Console;
use crate::error::{CommandError, Completion};
use crate::external::{ToolInvocation, ToolRunner};

/// Runs a command in a pod through `kubectl exec`; the child's exit code becomes ours.
pub async fn handle_exec_command<O: Write, E: Write>(
    runner: &dyn ToolRunner,
    name: &str,
    container: Option<&str>,
    command: &[String],
    tty: bool,
    settings: &Settings,
    console: &mut Console<O, E>,
) -> Result<Completion, CommandError> {
    let invocation = ToolInvocation::exec(
        &settings.tool_target(),
        name,
        settings.namespace(),
        container,
        command,
        tty,
    );

    Ok(run_kubectl(runner, &invocation, console).await?.completion())
}
