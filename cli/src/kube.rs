use getset::{CopyGetters, Getters};
use kube::config::{InClusterError, KubeConfigOptions, Kubeconfig, KubeconfigError};
use kube::{Client, Config};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use typed_builder::TypedBuilder;

const CURRENT_CONTEXT_KEY: &str = "current-context";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("--in-cluster cannot be combined with --context or --kubeconfig")]
    ConflictingFlags,
    #[error("Failed to load in-cluster config: {0}")]
    InCluster(#[from] InClusterError),
    #[error("Failed to load kubeconfig: {0}")]
    Kubeconfig(#[from] KubeconfigError),
    #[error("Failed to create Kubernetes client: {0}")]
    Client(#[from] kube::Error),
    #[error("Context '{0}' not found in kubeconfig")]
    UnknownContext(String),
    #[error("Could not determine the kubeconfig path")]
    NoKubeconfigPath,
    #[error("Failed to access kubeconfig {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse kubeconfig {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Kubeconfig {} has no top-level current-context line that can be rewritten", .0.display())]
    UnsupportedLayout(PathBuf),
}

/// How to reach the API server, straight from the global flags.
#[derive(Debug, Clone, Default, TypedBuilder, Getters, CopyGetters)]
pub struct ConnectionOptions {
    #[getset(get = "pub")]
    #[builder(default, setter(into))]
    kubeconfig: Option<PathBuf>,

    #[getset(get = "pub")]
    #[builder(default, setter(into))]
    context: Option<String>,

    #[getset(get_copy = "pub")]
    #[builder(default)]
    in_cluster: bool,

    #[getset(get_copy = "pub")]
    #[builder(default, setter(into))]
    request_timeout: Option<Duration>,
}

/// Where the loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    InCluster,
    Kubeconfig { context: String },
}

impl ConfigSource {
    /// The one-line confirmation printed after loading.
    pub fn describe(&self) -> String {
        match self {
            Self::InCluster => "Loaded in-cluster config".to_string(),
            Self::Kubeconfig { context } => format!("Loaded kubeconfig (context: {context})"),
        }
    }
}

#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: ConfigSource,
}

/// Reads the kubeconfig from `path`, or from `KUBECONFIG` / `~/.kube/config`.
pub fn read_kubeconfig(path: Option<&Path>) -> Result<Kubeconfig, ConfigError> {
    let kubeconfig = match path {
        Some(path) => Kubeconfig::read_from(path)?,
        None => Kubeconfig::read()?,
    };
    debug!("Read kubeconfig with {} context(s)", kubeconfig.contexts.len());
    Ok(kubeconfig)
}

/// Resolves the client configuration for one invocation.
pub async fn load_config(options: &ConnectionOptions) -> Result<LoadedConfig, ConfigError> {
    if options.in_cluster() {
        if options.context().is_some() || options.kubeconfig().is_some() {
            return Err(ConfigError::ConflictingFlags);
        }

        let mut config = Config::incluster()?;
        apply_timeout(&mut config, options.request_timeout());
        return Ok(LoadedConfig {
            config,
            source: ConfigSource::InCluster,
        });
    }

    let kubeconfig = read_kubeconfig(options.kubeconfig().as_deref())?;
    let context = options
        .context()
        .clone()
        .or_else(|| kubeconfig.current_context.clone())
        .unwrap_or_else(|| "default".to_string());

    let kube_config_options = KubeConfigOptions {
        context: options.context().clone(),
        cluster: None,
        user: None,
    };
    let mut config = Config::from_custom_kubeconfig(kubeconfig, &kube_config_options).await?;
    apply_timeout(&mut config, options.request_timeout());

    Ok(LoadedConfig {
        config,
        source: ConfigSource::Kubeconfig { context },
    })
}

fn apply_timeout(config: &mut Config, timeout: Option<Duration>) {
    if let Some(timeout) = timeout {
        config.read_timeout = Some(timeout);
    }
}

/// Create a Kubernetes client for the given connection flags.
pub async fn create_kube_client(
    options: &ConnectionOptions,
) -> Result<(Client, ConfigSource), ConfigError> {
    let LoadedConfig { config, source } = load_config(options).await?;
    let client = Client::try_from(config)?;
    Ok((client, source))
}

/// The file `use-context --save` writes to: `--kubeconfig`, else the first
/// `KUBECONFIG` entry, else `~/.kube/config`.
pub fn primary_kubeconfig_path(explicit: Option<&Path>) -> Option<PathBuf> {
    resolve_kubeconfig_path(explicit, std::env::var_os("KUBECONFIG"), dirs::home_dir())
}

fn resolve_kubeconfig_path(
    explicit: Option<&Path>,
    env_paths: Option<OsString>,
    home: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    env_paths
        .and_then(|paths| std::env::split_paths(&paths).find(|p| !p.as_os_str().is_empty()))
        .or_else(|| home.map(|home| home.join(".kube").join("config")))
}

/// Rewrites the `current-context` line in place. Every other line, comments
/// included, is written back byte for byte.
pub fn persist_current_context(path: &Path, context: &str) -> Result<(), ConfigError> {
    let io_error = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    let raw = std::fs::read_to_string(path).map_err(io_error)?;
    let value = serde_yaml::to_string(context).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    let updated = replace_current_context(&raw, value.trim_end());

    let reparsed = Kubeconfig::from_yaml(&updated)
        .map_err(|_| ConfigError::UnsupportedLayout(path.to_path_buf()))?;
    if reparsed.current_context.as_deref() != Some(context) {
        return Err(ConfigError::UnsupportedLayout(path.to_path_buf()));
    }

    std::fs::write(path, updated).map_err(io_error)?;
    info!("Set current-context to {} in {}", context, path.display());
    Ok(())
}

/// Swaps the value on the top-level `current-context:` line, keeping a trailing
/// comment. Appends the key when the document has none.
fn replace_current_context(raw: &str, value: &str) -> String {
    let prefix = format!("{CURRENT_CONTEXT_KEY}:");
    let mut replaced = false;
    let mut out = String::with_capacity(raw.len() + value.len());

    for line in raw.split_inclusive('\n') {
        let Some(rest) = line.strip_prefix(&prefix) else {
            out.push_str(line);
            continue;
        };
        if replaced {
            out.push_str(line);
            continue;
        }

        let body = rest.trim_end_matches(['\n', '\r']);
        let ending = &rest[body.len()..];
        let comment = body.find(" #").map(|at| &body[at..]).unwrap_or_default();
        out.push_str(&format!("{prefix} {value}{comment}{ending}"));
        replaced = true;
    }

    if !replaced {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&format!("{prefix} {value}\n"));
    }
    out
}
