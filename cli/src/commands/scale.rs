use serde_json::{Value, json};
use std::io::Write;
use tracing::info;

use crate::api::ClusterApi;
use crate::commands::Settings;
use crate::console::Console;
use crate::error::{CommandError, Completion};

/// Merge patch touching `spec.replicas` and nothing else.
pub fn replicas_patch(replicas: i32) -> Value {
    json!({ "spec": { "replicas": replicas } })
}

/// Read, then overwrite `spec.replicas`. Concurrent edits are not detected.
pub async fn handle_scale_deployment<O: Write, E: Write>(
    api: &dyn ClusterApi,
    name: &str,
    replicas: i32,
    settings: &Settings,
    console: &mut Console<O, E>,
) -> Result<Completion, CommandError> {
    let namespace = settings.namespace();

    api.get_deployment(namespace, name).await?;
    api.patch_deployment(namespace, name, &replicas_patch(replicas))
        .await?;
    info!("Scaled deployment {}/{} to {}", namespace, name, replicas);

    console.success(format!("Deployment '{name}' scaled to {replicas} replicas"))?;
    Ok(Completion::Success)
}
