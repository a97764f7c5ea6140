use clap::{Parser, Subcommand};
use std::path::PathBuf;

const EXAMPLES: &str = "Examples:
  kctl get namespaces
  kctl get pods -n kube-system
  kctl describe pod my-pod -n default
  kctl logs my-pod -n default --tail 50
  kctl scale deployment my-deploy -n default --replicas 3
  kctl rollout restart my-deploy -n default
  kctl get services -n default
  kctl get nodes
  kctl cluster-info
  kctl get contexts
  kctl exec my-pod -n default -- /bin/sh
  kctl port-forward my-pod 8080:80 -n default
  kctl apply -f deployment.yaml";

#[derive(Parser, Debug)]
#[command(
    name = "kctl",
    about = "A small kubectl-style client for Kubernetes clusters",
    version,
    long_about = "A command-line tool for listing, inspecting, scaling and restarting resources in a Kubernetes cluster. Interactive and manifest commands are delegated to kubectl.",
    after_help = EXAMPLES,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Kubernetes namespace to operate in (defaults to "default")
    #[arg(short, long, global = true)]
    pub namespace: Option<String>,

    /// Kubeconfig context to use
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// Use the in-cluster service account configuration
    #[arg(long, global = true)]
    pub in_cluster: bool,

    /// Kubeconfig file path
    #[arg(long, global = true)]
    pub kubeconfig: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Give up on API requests that take longer than this many seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    pub request_timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use emojis in table output for better visual representation
    #[arg(long, global = true)]
    pub emoji: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List resources
    Get {
        #[command(subcommand)]
        resource: GetResource,
    },
    /// Show detailed information about a resource
    Describe {
        #[command(subcommand)]
        resource: DescribeResource,
    },
    /// Print the logs of a pod
    Logs {
        /// Pod name
        name: String,
        /// Container name (for multi-container pods)
        #[arg(short, long)]
        container: Option<String>,
        /// Show the last N lines
        #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(i64).range(0..))]
        tail: i64,
        /// Show logs from the previous container instance
        #[arg(long)]
        previous: bool,
    },
    /// Delete a pod by name
    #[command(name = "delete-pod")]
    DeletePod {
        /// Pod name
        name: String,
    },
    /// Change the desired replica count of a workload
    Scale {
        #[command(subcommand)]
        resource: ScaleResource,
    },
    /// Manage rollouts
    Rollout {
        #[command(subcommand)]
        action: RolloutAction,
    },
    /// Show a summary of resource counts
    #[command(name = "cluster-info")]
    ClusterInfo,
    /// Check that a kubeconfig context loads
    #[command(name = "use-context")]
    UseContext {
        /// Context name
        name: String,
        /// Also write it as current-context of the kubeconfig file
        #[arg(long)]
        save: bool,
    },
    /// Execute a command in a pod (runs kubectl)
    Exec {
        /// Pod name
        name: String,
        /// Container name
        #[arg(short, long)]
        container: Option<String>,
        /// Command to execute
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },
    /// Forward local ports to a pod (runs kubectl)
    #[command(name = "port-forward")]
    PortForward {
        /// Pod name, or TYPE/NAME such as svc/web
        name: String,
        /// Port mapping, e.g. 8080:80
        ports: String,
    },
    /// Apply a manifest file (runs kubectl)
    Apply {
        /// Path to the manifest file
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Delete the resources described by a manifest file (runs kubectl)
    Delete {
        /// Path to the manifest file
        #[arg(short, long)]
        file: PathBuf,
        /// Force deletion
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetResource {
    /// List namespaces
    #[command(alias = "ns")]
    Namespaces,
    /// List pods
    #[command(alias = "po")]
    Pods,
    /// List deployments
    #[command(alias = "deploy")]
    Deployments,
    /// List services
    #[command(alias = "svc")]
    Services,
    /// List config maps
    #[command(name = "configmaps", alias = "cm")]
    ConfigMaps,
    /// List nodes
    #[command(alias = "no")]
    Nodes,
    /// List kubeconfig contexts
    Contexts,
}

#[derive(Subcommand, Debug)]
pub enum DescribeResource {
    /// Describe a pod
    Pod {
        /// Pod name
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ScaleResource {
    /// Scale a deployment
    Deployment {
        /// Deployment name
        name: String,
        /// Desired number of replicas
        #[arg(long, value_parser = clap::value_parser!(i32).range(0..))]
        replicas: i32,
    },
}

#[derive(Subcommand, Debug)]
pub enum RolloutAction {
    /// Restart every pod of a deployment
    Restart {
        /// Deployment name
        name: String,
    },
}
