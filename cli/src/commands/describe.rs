use chrono::SecondsFormat;
use k8s_openapi::api::core::v1::{ContainerState, Pod};
use serde::Serialize;
use std::io::Write;
use tabled::{Table, Tabled};

use crate::api::ClusterApi;
use crate::cli::OutputFormat;
use crate::commands::Settings;
use crate::console::Console;
use crate::error::{CommandError, Completion};
use crate::output::write_document;
use crate::table_theme::TableTheme;

const NONE: &str = "<none>";

#[derive(Debug, Clone, PartialEq, Eq, Tabled, Serialize)]
pub struct ContainerRow {
    pub name: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Tabled, Serialize)]
pub struct ContainerStatusRow {
    pub name: String,
    pub ready: bool,
    pub restarts: i32,
    pub state: String,
}

/// The fields `describe pod` shows in table mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodDescription {
    pub name: String,
    pub namespace: String,
    pub node: String,
    pub phase: String,
    pub ip: String,
    pub created: String,
    pub containers: Vec<ContainerRow>,
    pub statuses: Vec<ContainerStatusRow>,
}

fn state_name(state: Option<&ContainerState>) -> &'static str {
    match state {
        Some(state) if state.running.is_some() => "running",
        Some(state) if state.waiting.is_some() => "waiting",
        Some(state) if state.terminated.is_some() => "terminated",
        _ => "unknown",
    }
}

impl PodDescription {
    pub fn from_pod(pod: &Pod) -> Self {
        let metadata = &pod.metadata;
        let spec = pod.spec.as_ref();
        let status = pod.status.as_ref();

        let containers = spec
            .map(|spec| {
                spec.containers
                    .iter()
                    .map(|container| ContainerRow {
                        name: container.name.clone(),
                        image: container.image.clone().unwrap_or_else(|| NONE.to_string()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let statuses = status
            .and_then(|status| status.container_statuses.as_ref())
            .map(|statuses| {
                statuses
                    .iter()
                    .map(|s| ContainerStatusRow {
                        name: s.name.clone(),
                        ready: s.ready,
                        restarts: s.restart_count,
                        state: state_name(s.state.as_ref()).to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name: metadata.name.clone().unwrap_or_default(),
            namespace: metadata.namespace.clone().unwrap_or_default(),
            node: spec
                .and_then(|spec| spec.node_name.clone())
                .unwrap_or_else(|| NONE.to_string()),
            phase: status
                .and_then(|status| status.phase.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            ip: status
                .and_then(|status| status.pod_ip.clone())
                .unwrap_or_else(|| NONE.to_string()),
            created: metadata.creation_timestamp.as_ref().map_or_else(
                || "<unknown>".to_string(),
                |ts| ts.0.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            containers,
            statuses,
        }
    }

    fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "Namespace:  {}", self.namespace)?;
        writeln!(out, "Node:       {}", self.node)?;
        writeln!(out, "Phase:      {}", self.phase)?;
        writeln!(out, "IP:         {}", self.ip)?;
        writeln!(out, "Created:    {}", self.created)?;
        writeln!(out)?;
        writeln!(out, "Containers:")?;
        writeln!(
            out,
            "{}",
            TableTheme::apply_default(Table::new(&self.containers))
        )?;
        writeln!(out)?;
        writeln!(out, "Container Statuses:")?;
        writeln!(
            out,
            "{}",
            TableTheme::apply_default(Table::new(&self.statuses))
        )
    }
}

/// Describe pod in detail
pub async fn handle_describe_pod<O: Write, E: Write>(
    api: &dyn ClusterApi,
    name: &str,
    settings: &Settings,
    console: &mut Console<O, E>,
) -> Result<Completion, CommandError> {
    let pod = api.get_pod(settings.namespace(), name).await?;

    match settings.output() {
        OutputFormat::Table => {
            let description = PodDescription::from_pod(&pod);
            console.header(&format!("Pod: {}", description.name))?;
            description.write_to(console.out())?;
        }
        OutputFormat::Json | OutputFormat::Yaml => write_document(&pod, settings, console)?,
    }

    Ok(Completion::Success)
}
