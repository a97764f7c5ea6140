use kube::config::Kubeconfig;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tabled::Tabled;
use tracing::info;

use crate::commands::Settings;
use crate::console::Console;
use crate::error::{CommandError, Completion};
use crate::kube::{
    ConfigError, ConnectionOptions, load_config, persist_current_context,
    primary_kubeconfig_path, read_kubeconfig,
};
use crate::output::write_rows;

const CURRENT_MARKER: &str = "*";

/// Context information model
#[derive(Debug, Clone, PartialEq, Eq, Tabled, Serialize)]
pub struct ContextRow {
    pub current: String,
    pub name: String,
    pub cluster: String,
    pub user: String,
}

/// One row per context, marking the one named by `current-context`.
pub fn context_rows(kubeconfig: &Kubeconfig) -> Vec<ContextRow> {
    let current = kubeconfig.current_context.as_deref();

    kubeconfig
        .contexts
        .iter()
        .map(|named| {
            let context = named.context.as_ref();
            ContextRow {
                current: if current == Some(named.name.as_str()) {
                    CURRENT_MARKER.to_string()
                } else {
                    String::new()
                },
                name: named.name.clone(),
                cluster: context.map(|c| c.cluster.clone()).unwrap_or_default(),
                user: context.and_then(|c| c.user.clone()).unwrap_or_default(),
            }
        })
        .collect()
}

/// Lists kubeconfig contexts without talking to the cluster.
pub fn handle_get_contexts<O: Write, E: Write>(
    settings: &Settings,
    console: &mut Console<O, E>,
) -> Result<Completion, CommandError> {
    let kubeconfig = read_kubeconfig(settings.connection().kubeconfig().as_deref())?;
    write_rows(
        context_rows(&kubeconfig),
        "Contexts",
        &[0],
        settings,
        console,
    )?;
    Ok(Completion::Success)
}

/// Checks that `name` exists and loads. With `save`, also makes it the
/// current context of the primary kubeconfig file.
pub async fn handle_use_context<O: Write, E: Write>(
    name: &str,
    save: bool,
    settings: &Settings,
    console: &mut Console<O, E>,
) -> Result<Completion, CommandError> {
    let explicit = settings.connection().kubeconfig().as_deref();
    let kubeconfig = read_kubeconfig(explicit)?;

    if !kubeconfig.contexts.iter().any(|named| named.name == name) {
        return Err(ConfigError::UnknownContext(name.to_string()).into());
    }

    let options = ConnectionOptions::builder()
        .kubeconfig(explicit.map(Path::to_path_buf))
        .context(name.to_string())
        .request_timeout(settings.connection().request_timeout())
        .build();
    let loaded = load_config(&options).await?;
    console.notice(loaded.source.describe())?;

    if save {
        let path = primary_kubeconfig_path(explicit).ok_or(ConfigError::NoKubeconfigPath)?;
        persist_current_context(&path, name)?;
    }
    info!("Switched to context {}", name);

    console.success(format!("Switched to context '{name}'"))?;
    Ok(Completion::Success)
}
