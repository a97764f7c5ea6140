use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Value, json};
use std::io::Write;
use tracing::info;

use crate::api::ClusterApi;
use crate::commands::Settings;
use crate::console::Console;
use crate::error::{CommandError, Completion};

/// Pod-template annotation whose change makes the controller roll every pod.
pub const RESTARTED_AT_ANNOTATION: &str = "kubectl.kubernetes.io/restartedAt";

/// Merge patch setting only the restart annotation on the pod template.
pub fn restart_patch(at: DateTime<Utc>) -> Value {
    json!({
        "spec": {
            "template": {
                "metadata": {
                    "annotations": {
                        RESTARTED_AT_ANNOTATION: at.to_rfc3339_opts(SecondsFormat::Secs, true)
                    }
                }
            }
        }
    })
}

pub async fn handle_rollout_restart<O: Write, E: Write>(
    api: &dyn ClusterApi,
    name: &str,
    settings: &Settings,
    console: &mut Console<O, E>,
) -> Result<Completion, CommandError> {
    let namespace = settings.namespace();

    api.get_deployment(namespace, name).await?;
    api.patch_deployment(namespace, name, &restart_patch(Utc::now()))
        .await?;
    info!("Restarted deployment {}/{}", namespace, name);

    console.success(format!("Rollout restart triggered for deployment '{name}'"))?;
    Ok(Completion::Success)
}
