pub mod cluster_info;
pub mod context;
pub mod delete;
pub mod describe;
pub mod exec;
pub mod get;
pub mod logs;
pub mod manifest;
pub mod port_forward;
pub mod rollout;
pub mod scale;

use async_trait::async_trait;
use getset::{CopyGetters, Getters};
use std::io::{IsTerminal, Write};
use std::time::Duration;
use typed_builder::TypedBuilder;

#[cfg(test)]
use mockall::automock;

use crate::api::{ClusterApi, KubeClusterApi};
use crate::capabilities::{Capabilities, KUBECTL};
use crate::cli::{Cli, Commands, DescribeResource, OutputFormat, RolloutAction, ScaleResource};
use crate::console::Console;
use crate::error::{CommandError, Completion};
use crate::external::{ProcessRunner, ToolExit, ToolInvocation, ToolRunner, ToolTarget};
use crate::kube::{ConfigError, ConfigSource, ConnectionOptions, create_kube_client};

pub const DEFAULT_NAMESPACE: &str = "default";

/// Per-invocation settings every handler reads, built once from the flags.
#[derive(Debug, Clone, Default, TypedBuilder, Getters, CopyGetters)]
pub struct Settings {
    #[builder(default, setter(into))]
    namespace: Option<String>,

    #[getset(get_copy = "pub")]
    #[builder(default)]
    output: OutputFormat,

    #[getset(get_copy = "pub")]
    #[builder(default)]
    emoji: bool,

    #[getset(get = "pub")]
    #[builder(default)]
    connection: ConnectionOptions,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Self {
        let connection = ConnectionOptions::builder()
            .kubeconfig(cli.kubeconfig.clone())
            .context(cli.context.clone())
            .in_cluster(cli.in_cluster)
            .request_timeout(cli.request_timeout.map(Duration::from_secs))
            .build();

        Self::builder()
            .namespace(cli.namespace.clone())
            .output(cli.output)
            .emoji(cli.emoji)
            .connection(connection)
            .build()
    }

    /// The effective namespace: `-n`, else `default`.
    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE)
    }

    /// The namespace only when `-n` was given.
    pub fn explicit_namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn tool_target(&self) -> ToolTarget {
        ToolTarget {
            kubeconfig: self.connection.kubeconfig().clone(),
            context: self.connection.context().clone(),
        }
    }
}

/// Produces the API handle for cluster commands.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ApiConnector: Send + Sync {
    async fn connect(
        &self,
        options: &ConnectionOptions,
    ) -> Result<(Box<dyn ClusterApi>, ConfigSource), ConfigError>;
}

/// Connects through a real `kube::Client`.
pub struct KubeConnector;

#[async_trait]
impl ApiConnector for KubeConnector {
    async fn connect(
        &self,
        options: &ConnectionOptions,
    ) -> Result<(Box<dyn ClusterApi>, ConfigSource), ConfigError> {
        let (client, source) = create_kube_client(options).await?;
        Ok((Box::new(KubeClusterApi::new(client)), source))
    }
}

async fn connect<C, O, E>(
    connector: &C,
    settings: &Settings,
    console: &mut Console<O, E>,
) -> Result<Box<dyn ClusterApi>, CommandError>
where
    C: ApiConnector + ?Sized,
    O: Write,
    E: Write,
{
    let (api, source) = connector.connect(settings.connection()).await?;
    console.notice(source.describe())?;
    Ok(api)
}

fn kubectl_runner(capabilities: &Capabilities) -> Result<ProcessRunner, CommandError> {
    Ok(ProcessRunner::new(capabilities.kubectl().require(KUBECTL)?))
}

/// Announces and runs one kubectl invocation.
pub(crate) async fn run_kubectl<O: Write, E: Write>(
    runner: &dyn ToolRunner,
    invocation: &ToolInvocation,
    console: &mut Console<O, E>,
) -> Result<ToolExit, CommandError> {
    console.info(format!("Running: {invocation}"))?;
    runner
        .run(invocation)
        .await
        .map_err(|source| CommandError::Spawn {
            tool: KUBECTL,
            source,
        })
}

/// Main command dispatcher
///
/// Commands that only touch the kubeconfig or delegate to kubectl never open
/// an API connection.
pub async fn handle_command<C, O, E>(
    command: &Commands,
    settings: &Settings,
    capabilities: &Capabilities,
    connector: &C,
    console: &mut Console<O, E>,
) -> Result<Completion, CommandError>
where
    C: ApiConnector + ?Sized,
    O: Write,
    E: Write,
{
    match command {
        Commands::Get { resource } => match get::ClusterResource::from_get(*resource) {
            Some(kind) => {
                let api = connect(connector, settings, console).await?;
                get::handle_get_command(api.as_ref(), kind, settings, console).await
            }
            None => context::handle_get_contexts(settings, console),
        },
        Commands::Describe {
            resource: DescribeResource::Pod { name },
        } => {
            let api = connect(connector, settings, console).await?;
            describe::handle_describe_pod(api.as_ref(), name, settings, console).await
        }
        Commands::Logs {
            name,
            container,
            tail,
            previous,
        } => {
            let api = connect(connector, settings, console).await?;
            logs::handle_logs_command(
                api.as_ref(),
                name,
                container.as_deref(),
                *tail,
                *previous,
                settings,
                console,
            )
            .await
        }
        Commands::DeletePod { name } => {
            let api = connect(connector, settings, console).await?;
            delete::handle_delete_pod(api.as_ref(), name, settings, console).await
        }
        Commands::Scale {
            resource: ScaleResource::Deployment { name, replicas },
        } => {
            let api = connect(connector, settings, console).await?;
            scale::handle_scale_deployment(api.as_ref(), name, *replicas, settings, console).await
        }
        Commands::Rollout {
            action: RolloutAction::Restart { name },
        } => {
            let api = connect(connector, settings, console).await?;
            rollout::handle_rollout_restart(api.as_ref(), name, settings, console).await
        }
        Commands::ClusterInfo => {
            let api = connect(connector, settings, console).await?;
            cluster_info::handle_cluster_info(api.as_ref(), settings, console).await
        }
        Commands::UseContext { name, save } => {
            context::handle_use_context(name, *save, settings, console).await
        }
        Commands::Exec {
            name,
            container,
            command,
        } => {
            let runner = kubectl_runner(capabilities)?;
            exec::handle_exec_command(
                &runner,
                name,
                container.as_deref(),
                command,
                std::io::stdin().is_terminal(),
                settings,
                console,
            )
            .await
        }
        Commands::PortForward { name, ports } => {
            let runner = kubectl_runner(capabilities)?;
            port_forward::handle_port_forward_command(&runner, name, ports, settings, console)
                .await
        }
        Commands::Apply { file } => {
            let runner = kubectl_runner(capabilities)?;
            manifest::handle_apply_command(&runner, file, settings, console).await
        }
        Commands::Delete { file, force } => {
            let runner = kubectl_runner(capabilities)?;
            manifest::handle_delete_command(&runner, file, *force, settings, console).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, MockClusterApi};
    use crate::capabilities::ToolAvailability;
    use crate::error::{EXIT_LOCAL_FAILURE, EXIT_REMOTE_FAILURE, finish};
    use crate::kube::tests::kubeconfig_file;
    use clap::Parser;
    use std::path::PathBuf;

    fn connector_with(api: MockClusterApi) -> MockApiConnector {
        let mut connector = MockApiConnector::new();
        connector.expect_connect().times(1).return_once(move |_| {
            Ok((
                Box::new(api) as Box<dyn ClusterApi>,
                ConfigSource::Kubeconfig {
                    context: "b".to_string(),
                },
            ))
        });
        connector
    }

    fn no_kubectl() -> Capabilities {
        Capabilities::new(ToolAvailability::Unavailable)
    }

    #[test]
    fn test_settings_from_cli() {
        let cli = Cli::parse_from([
            "kctl",
            "get",
            "pods",
            "--context",
            "prod",
            "--kubeconfig",
            "/tmp/config",
            "--request-timeout",
            "5",
            "-o",
            "yaml",
        ]);

        let settings = Settings::from_cli(&cli);

        assert_eq!(settings.namespace(), "default");
        assert_eq!(settings.explicit_namespace(), None);
        assert_eq!(settings.output(), OutputFormat::Yaml);
        assert_eq!(
            settings.connection().request_timeout(),
            Some(Duration::from_secs(5))
        );
        assert_eq!(
            settings.tool_target(),
            ToolTarget {
                kubeconfig: Some(PathBuf::from("/tmp/config")),
                context: Some("prod".to_string()),
            }
        );
    }

    #[test]
    fn test_settings_explicit_namespace() {
        let cli = Cli::parse_from(["kctl", "-n", "apps", "apply", "-f", "app.yaml"]);

        let settings = Settings::from_cli(&cli);

        assert_eq!(settings.namespace(), "apps");
        assert_eq!(settings.explicit_namespace(), Some("apps"));
    }

    #[tokio::test]
    async fn test_remote_error_on_get_pods_exits_one() {
        let mut api = MockClusterApi::new();
        api.expect_list_pods()
            .withf(|namespace| namespace == "default")
            .times(1)
            .returning(|_| {
                Err(ApiError::Status {
                    reason: "Forbidden".to_string(),
                    message: "pods is forbidden".to_string(),
                    code: 403,
                })
            });
        let connector = connector_with(api);
        let cli = Cli::parse_from(["kctl", "get", "pods"]);
        let settings = Settings::from_cli(&cli);
        let mut console = Console::captured();

        let result = handle_command(
            &cli.command,
            &settings,
            &no_kubectl(),
            &connector,
            &mut console,
        )
        .await;
        let code = finish(result, &mut console);

        assert_eq!(code, EXIT_REMOTE_FAILURE);
        let stderr = console.stderr_text();
        assert!(stderr.contains("Loaded kubeconfig (context: b)"));
        assert!(stderr.contains("Forbidden"));
        assert!(!console.stdout_text().contains("Forbidden"));
    }

    #[tokio::test]
    async fn test_config_failure_exits_two() {
        let mut connector = MockApiConnector::new();
        connector
            .expect_connect()
            .times(1)
            .returning(|_| Err(ConfigError::UnknownContext("missing".to_string())));
        let cli = Cli::parse_from(["kctl", "cluster-info"]);
        let settings = Settings::from_cli(&cli);
        let mut console = Console::captured();

        let result = handle_command(
            &cli.command,
            &settings,
            &no_kubectl(),
            &connector,
            &mut console,
        )
        .await;
        let code = finish(result, &mut console);

        assert_eq!(code, EXIT_LOCAL_FAILURE);
        assert!(
            console
                .stderr_text()
                .contains("Context 'missing' not found in kubeconfig")
        );
    }

    #[tokio::test]
    async fn test_get_contexts_never_connects() {
        let file = kubeconfig_file();
        let connector = MockApiConnector::new();
        let kubeconfig = file.path().to_string_lossy().into_owned();
        let cli = Cli::parse_from(["kctl", "--kubeconfig", &kubeconfig, "get", "contexts"]);
        let settings = Settings::from_cli(&cli);
        let mut console = Console::captured();

        let result = handle_command(
            &cli.command,
            &settings,
            &no_kubectl(),
            &connector,
            &mut console,
        )
        .await;

        assert!(matches!(result, Ok(Completion::Success)));
        assert!(console.stdout_text().contains("cluster-b"));
    }

    #[rstest::rstest]
    #[case(&["kctl", "exec", "web-1", "--", "ls"])]
    #[case(&["kctl", "port-forward", "web-1", "8080:80"])]
    #[case(&["kctl", "apply", "-f", "app.yaml"])]
    #[case(&["kctl", "delete", "-f", "app.yaml"])]
    #[tokio::test]
    async fn test_tool_commands_require_kubectl(#[case] args: &[&str]) {
        let connector = MockApiConnector::new();
        let cli = Cli::parse_from(args);
        let settings = Settings::from_cli(&cli);
        let mut console = Console::captured();

        let result = handle_command(
            &cli.command,
            &settings,
            &no_kubectl(),
            &connector,
            &mut console,
        )
        .await;
        let code = finish(result, &mut console);

        assert_eq!(code, EXIT_LOCAL_FAILURE);
        assert!(console.stderr_text().contains("kubectl is required"));
    }
}
