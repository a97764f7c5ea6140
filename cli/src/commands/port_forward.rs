use std::io::Write;

use crate::commands::{Settings, run_kubectl};
use crate::console::Console;
use crate::error::{CommandError, Completion};
use crate::external::{ToolExit, ToolInvocation, ToolRunner};

/// Forwards local ports until kubectl exits or the user presses Ctrl-C.
pub async fn handle_port_forward_command<O: Write, E: Write>(
    runner: &dyn ToolRunner,
    name: &str,
    ports: &str,
    settings: &Settings,
    console: &mut Console<O, E>,
) -> Result<Completion, CommandError> {
    let invocation =
        ToolInvocation::port_forward(&settings.tool_target(), name, ports, settings.namespace());

    let exit = run_kubectl(runner, &invocation, console).await?;
    if exit == ToolExit::Interrupted {
        console.success("Port-forward stopped.")?;
    }

    Ok(exit.completion())
}
