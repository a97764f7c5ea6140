use std::io::Write;

use crate::api::{ClusterApi, LogOptions};
use crate::commands::Settings;
use crate::console::Console;
use crate::error::{CommandError, Completion};

/// Handle logs command
pub async fn handle_logs_command<O: Write, E: Write>(
    api: &dyn ClusterApi,
    name: &str,
    container: Option<&str>,
    tail: i64,
    previous: bool,
    settings: &Settings,
    console: &mut Console<O, E>,
) -> Result<Completion, CommandError> {
    let options = LogOptions {
        container: container.map(str::to_string),
        tail_lines: Some(tail),
        previous,
    };

    let logs = api.pod_logs(settings.namespace(), name, &options).await?;
    console.out().write_all(logs.as_bytes())?;

    Ok(Completion::Success)
}
