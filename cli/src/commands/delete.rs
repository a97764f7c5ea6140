use std::io::Write;
use tracing::info;

use crate::api::ClusterApi;
use crate::commands::Settings;
use crate::console::Console;
use crate::error::{CommandError, Completion};

/// Deletes a pod right away, with the server's default grace period.
pub async fn handle_delete_pod<O: Write, E: Write>(
    api: &dyn ClusterApi,
    name: &str,
    settings: &Settings,
    console: &mut Console<O, E>,
) -> Result<Completion, CommandError> {
    let namespace = settings.namespace();
    api.delete_pod(namespace, name).await?;
    info!("Deleted pod {}/{}", namespace, name);

    console.success(format!("Pod '{name}' deleted from namespace '{namespace}'"))?;
    Ok(Completion::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, MockClusterApi};

    #[tokio::test]
    async fn test_delete_pod_reports_success() {
        let mut api = MockClusterApi::new();
        api.expect_delete_pod()
            .withf(|namespace, name| namespace == "default" && name == "web-1")
            .times(1)
            .returning(|_, _| Ok(()));
        let settings = Settings::builder().build();
        let mut console = Console::captured();

        handle_delete_pod(&api, "web-1", &settings, &mut console)
            .await
            .expect("delete should succeed");

        assert!(
            console
                .stdout_text()
                .contains("Pod 'web-1' deleted from namespace 'default'")
        );
    }

    #[tokio::test]
    async fn test_delete_pod_failure_prints_nothing() {
        let mut api = MockClusterApi::new();
        api.expect_delete_pod().times(1).returning(|_, _| {
            Err(ApiError::Transport("connection refused".to_string()))
        });
        let settings = Settings::builder().build();
        let mut console = Console::captured();

        let result = handle_delete_pod(&api, "web-1", &settings, &mut console).await;

        assert!(matches!(result, Err(CommandError::Api(_))));
        assert!(console.stdout_text().is_empty());
    }
}
