use chrono::SecondsFormat;
use k8s_openapi::api::{
    apps::v1::Deployment,
    core::v1::{ConfigMap, Namespace, Node, Pod, Service},
};
use serde::Serialize;
use std::io::Write;
use tabled::Tabled;

use crate::api::ClusterApi;
use crate::cli::GetResource;
use crate::commands::Settings;
use crate::console::Console;
use crate::error::{CommandError, Completion};
use crate::output::write_rows;

const NONE: &str = "<none>";
const UNKNOWN: &str = "<unknown>";
const NODE_ROLE_PREFIX: &str = "node-role.kubernetes.io/";

#[derive(Debug, Clone, PartialEq, Eq, Tabled, Serialize)]
pub struct NamespaceRow {
    pub name: String,
    pub status: String,
}

impl NamespaceRow {
    pub fn from_namespace(namespace: Namespace) -> Self {
        Self {
            name: namespace.metadata.name.unwrap_or_default(),
            status: namespace
                .status
                .and_then(|status| status.phase)
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Tabled, Serialize)]
pub struct PodRow {
    pub name: String,
    pub ready: String,
    pub status: String,
    pub restarts: i32,
    pub namespace: String,
}

impl PodRow {
    pub fn from_pod(pod: Pod) -> Self {
        let metadata = pod.metadata;
        let declared = pod.spec.map(|spec| spec.containers.len()).unwrap_or(0);
        let status = pod.status.unwrap_or_default();
        let statuses = status.container_statuses.unwrap_or_default();

        let ready = statuses.iter().filter(|s| s.ready).count();
        let restarts = statuses.iter().map(|s| s.restart_count).sum();

        Self {
            name: metadata.name.unwrap_or_default(),
            ready: format!("{ready}/{declared}"),
            status: status.phase.unwrap_or_else(|| "Unknown".to_string()),
            restarts,
            namespace: metadata.namespace.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Tabled, Serialize)]
pub struct DeploymentRow {
    pub name: String,
    pub ready: i32,
    pub desired: i32,
    pub updated: i32,
    pub available: i32,
}

impl DeploymentRow {
    pub fn from_deployment(deployment: Deployment) -> Self {
        let status = deployment.status.unwrap_or_default();
        let desired = deployment
            .spec
            .and_then(|spec| spec.replicas)
            .or(status.replicas)
            .unwrap_or(0);

        Self {
            name: deployment.metadata.name.unwrap_or_default(),
            ready: status.ready_replicas.unwrap_or(0),
            desired,
            updated: status.updated_replicas.unwrap_or(0),
            available: status.available_replicas.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Tabled, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRow {
    pub name: String,
    #[tabled(rename = "type")]
    #[serde(rename = "type")]
    pub service_type: String,
    #[tabled(rename = "cluster-ip")]
    pub cluster_ip: String,
    pub ports: String,
}

impl ServiceRow {
    pub fn from_service(service: Service) -> Self {
        let spec = service.spec.unwrap_or_default();

        let ports = spec
            .ports
            .unwrap_or_default()
            .into_iter()
            .map(|port| {
                let node_port = port
                    .node_port
                    .map_or_else(|| "-".to_string(), |p| p.to_string());
                let protocol = port.protocol.unwrap_or_else(|| "TCP".to_string());
                format!("{}:{}/{}", port.port, node_port, protocol)
            })
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            name: service.metadata.name.unwrap_or_default(),
            service_type: spec.type_.unwrap_or_else(|| "ClusterIP".to_string()),
            cluster_ip: spec
                .cluster_ip
                .filter(|ip| !ip.is_empty())
                .unwrap_or_else(|| NONE.to_string()),
            ports,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Tabled, Serialize)]
pub struct ConfigMapRow {
    pub name: String,
    pub data: usize,
    pub created: String,
}

impl ConfigMapRow {
    pub fn from_config_map(config_map: ConfigMap) -> Self {
        let metadata = config_map.metadata;
        Self {
            name: metadata.name.unwrap_or_default(),
            data: config_map.data.map(|data| data.len()).unwrap_or(0),
            created: metadata.creation_timestamp.map_or_else(
                || UNKNOWN.to_string(),
                |ts| ts.0.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Tabled, Serialize)]
pub struct NodeRow {
    pub name: String,
    pub ready: String,
    pub roles: String,
    pub version: String,
}

impl NodeRow {
    pub fn from_node(node: Node) -> Self {
        let metadata = node.metadata;
        let status = node.status.unwrap_or_default();

        // Only an explicit Ready=True counts; Unknown or a missing condition is not ready.
        let ready = status
            .conditions
            .unwrap_or_default()
            .iter()
            .any(|condition| condition.type_ == "Ready" && condition.status == "True");

        let roles = metadata
            .labels
            .unwrap_or_default()
            .keys()
            .filter_map(|key| key.strip_prefix(NODE_ROLE_PREFIX))
            .filter(|role| !role.is_empty())
            .collect::<Vec<_>>()
            .join(",");

        Self {
            name: metadata.name.unwrap_or_default(),
            ready: if ready { "True" } else { "False" }.to_string(),
            roles: if roles.is_empty() {
                NONE.to_string()
            } else {
                roles
            },
            version: status
                .node_info
                .map(|info| info.kubelet_version)
                .filter(|version| !version.is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }
}

/// The `get` kinds served by the API server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterResource {
    Namespaces,
    Pods,
    Deployments,
    Services,
    ConfigMaps,
    Nodes,
}

impl ClusterResource {
    /// `None` for kinds read from the kubeconfig instead.
    pub fn from_get(resource: GetResource) -> Option<Self> {
        match resource {
            GetResource::Namespaces => Some(Self::Namespaces),
            GetResource::Pods => Some(Self::Pods),
            GetResource::Deployments => Some(Self::Deployments),
            GetResource::Services => Some(Self::Services),
            GetResource::ConfigMaps => Some(Self::ConfigMaps),
            GetResource::Nodes => Some(Self::Nodes),
            GetResource::Contexts => None,
        }
    }
}

fn project<T, R>(items: Vec<T>, projection: fn(T) -> R) -> Vec<R> {
    items.into_iter().map(projection).collect()
}

/// Handle the get command for one resource kind.
pub async fn handle_get_command<O: Write, E: Write>(
    api: &dyn ClusterApi,
    resource: ClusterResource,
    settings: &Settings,
    console: &mut Console<O, E>,
) -> Result<Completion, CommandError> {
    let namespace = settings.namespace();

    match resource {
        ClusterResource::Namespaces => {
            let rows = project(api.list_namespaces().await?, NamespaceRow::from_namespace);
            write_rows(rows, "Namespaces", &[1], settings, console)?;
        }
        ClusterResource::Pods => {
            let rows = project(api.list_pods(namespace).await?, PodRow::from_pod);
            let title = format!("Pods in namespace: {namespace}");
            write_rows(rows, &title, &[1, 2, 3], settings, console)?;
        }
        ClusterResource::Deployments => {
            let rows = project(
                api.list_deployments(namespace).await?,
                DeploymentRow::from_deployment,
            );
            let title = format!("Deployments in namespace: {namespace}");
            write_rows(rows, &title, &[], settings, console)?;
        }
        ClusterResource::Services => {
            let rows = project(api.list_services(namespace).await?, ServiceRow::from_service);
            let title = format!("Services in namespace: {namespace}");
            write_rows(rows, &title, &[1], settings, console)?;
        }
        ClusterResource::ConfigMaps => {
            let rows = project(
                api.list_config_maps(namespace).await?,
                ConfigMapRow::from_config_map,
            );
            let title = format!("ConfigMaps in namespace: {namespace}");
            write_rows(rows, &title, &[], settings, console)?;
        }
        ClusterResource::Nodes => {
            let rows = project(api.list_nodes().await?, NodeRow::from_node);
            write_rows(rows, "Nodes", &[1], settings, console)?;
        }
    }

    Ok(Completion::Success)
}
