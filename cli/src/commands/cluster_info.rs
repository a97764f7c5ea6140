use serde::Serialize;
use std::io::Write;
use tabled::Tabled;

use crate::api::ClusterApi;
use crate::commands::Settings;
use crate::console::Console;
use crate::error::{CommandError, Completion};
use crate::output::write_rows;

#[derive(Debug, Clone, PartialEq, Eq, Tabled, Serialize)]
pub struct ResourceCountRow {
    pub resource: String,
    pub count: usize,
}

impl ResourceCountRow {
    fn new(resource: impl Into<String>, count: usize) -> Self {
        Self {
            resource: resource.into(),
            count,
        }
    }
}

/// Counts namespaces and nodes, plus workloads in the effective namespace.
pub async fn handle_cluster_info<O: Write, E: Write>(
    api: &dyn ClusterApi,
    settings: &Settings,
    console: &mut Console<O, E>,
) -> Result<Completion, CommandError> {
    let namespace = settings.namespace();

    let rows = vec![
        ResourceCountRow::new("Namespaces", api.list_namespaces().await?.len()),
        ResourceCountRow::new("Nodes", api.list_nodes().await?.len()),
        ResourceCountRow::new(
            format!("Pods ({namespace})"),
            api.list_pods(namespace).await?.len(),
        ),
        ResourceCountRow::new(
            format!("Deployments ({namespace})"),
            api.list_deployments(namespace).await?.len(),
        ),
        ResourceCountRow::new(
            format!("Services ({namespace})"),
            api.list_services(namespace).await?.len(),
        ),
    ];

    write_rows(rows, "Cluster Summary", &[], settings, console)?;
    Ok(Completion::Success)
}
