use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Node, Pod, Service};
use kube::api::{DeleteParams, ListParams, LogParams, Patch, PatchParams};
use kube::{Api, Client};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

/// A failed call against the API server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with a `Status` failure.
    #[error("{reason} ({message})")]
    Status {
        reason: String,
        message: String,
        code: u16,
    },
    /// The request never produced a server answer.
    #[error("{0}")]
    Transport(String),
}

impl ApiError {
    pub fn reason(&self) -> &str {
        match self {
            Self::Status { reason, .. } => reason,
            Self::Transport(_) => "RequestFailed",
        }
    }
}

impl From<kube::Error> for ApiError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(response) => Self::Status {
                reason: response.reason,
                message: response.message,
                code: response.code,
            },
            other => Self::Transport(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogOptions {
    pub container: Option<String>,
    pub tail_lines: Option<i64>,
    pub previous: bool,
}

/// The cluster operations the command handlers need, one method per API call.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, ApiError>;

    async fn list_nodes(&self) -> Result<Vec<Node>, ApiError>;

    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, ApiError>;

    async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, ApiError>;

    async fn list_services(&self, namespace: &str) -> Result<Vec<Service>, ApiError>;

    async fn list_config_maps(&self, namespace: &str) -> Result<Vec<ConfigMap>, ApiError>;

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, ApiError>;

    async fn pod_logs(
        &self,
        namespace: &str,
        name: &str,
        options: &LogOptions,
    ) -> Result<String, ApiError>;

    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<(), ApiError>;

    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment, ApiError>;

    /// Sends `patch` as a JSON merge patch. The patch carries no
    /// `resourceVersion`, so the write is unconditional.
    async fn patch_deployment(
        &self,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> Result<Deployment, ApiError>;
}

/// [`ClusterApi`] backed by a live `kube` client.
#[derive(Clone)]
pub struct KubeClusterApi {
    client: Client,
}

impl KubeClusterApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterApi for KubeClusterApi {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, ApiError> {
        debug!("Listing namespaces");
        let api: Api<Namespace> = Api::all(self.client.clone());
        Ok(api.list(&ListParams::default()).await?.items)
    }

    async fn list_nodes(&self) -> Result<Vec<Node>, ApiError> {
        debug!("Listing nodes");
        let api: Api<Node> = Api::all(self.client.clone());
        Ok(api.list(&ListParams::default()).await?.items)
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, ApiError> {
        debug!("Listing pods in {}", namespace);
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.list(&ListParams::default()).await?.items)
    }

    async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, ApiError> {
        debug!("Listing deployments in {}", namespace);
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.list(&ListParams::default()).await?.items)
    }

    async fn list_services(&self, namespace: &str) -> Result<Vec<Service>, ApiError> {
        debug!("Listing services in {}", namespace);
        let api: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.list(&ListParams::default()).await?.items)
    }

    async fn list_config_maps(&self, namespace: &str) -> Result<Vec<ConfigMap>, ApiError> {
        debug!("Listing config maps in {}", namespace);
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.list(&ListParams::default()).await?.items)
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, ApiError> {
        debug!("Reading pod {}/{}", namespace, name);
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get(name).await?)
    }

    async fn pod_logs(
        &self,
        namespace: &str,
        name: &str,
        options: &LogOptions,
    ) -> Result<String, ApiError> {
        debug!("Reading logs of pod {}/{}", namespace, name);
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let params = LogParams {
            container: options.container.clone(),
            tail_lines: options.tail_lines,
            previous: options.previous,
            ..Default::default()
        };
        Ok(api.logs(name, &params).await?)
    }

    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<(), ApiError> {
        debug!("Deleting pod {}/{}", namespace, name);
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        api.delete(name, &DeleteParams::default()).await?;
        Ok(())
    }

    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment, ApiError> {
        debug!("Reading deployment {}/{}", namespace, name);
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get(name).await?)
    }

    async fn patch_deployment(
        &self,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> Result<Deployment, ApiError> {
        debug!("Patching deployment {}/{}: {}", namespace, name, patch);
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        Ok(api
            .patch(name, &PatchParams::default(), &Patch::Merge(patch))
            .await?)
    }
}
