//! Resource provider and resource group operations over ARM.

use crate::backends::azure::ArmClient;
use crate::management::ResourceManagement;
use crate::model::{ProviderRegistration, ResourceGroup};
use crate::Result;
use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;
use tracing::info;

/// API version for `Microsoft.Resources` calls.
const RESOURCES_API_VERSION: &str = "2021-04-01";

/// Azure implementation of [`ResourceManagement`].
#[derive(Debug, Clone)]
pub struct AzureResourceClient {
    arm: Arc<ArmClient>,
}

impl AzureResourceClient {
    /// Creates a resource client on a shared ARM client.
    pub fn new(arm: Arc<ArmClient>) -> Self {
        Self { arm }
    }
}

pub(crate) fn group_path(name: &str) -> String {
    format!("/resourcegroups/{}", name)
}

pub(crate) fn register_path(namespace: &str) -> String {
    format!("/providers/{}/register", namespace)
}

#[async_trait]
impl ResourceManagement for AzureResourceClient {
    fn name(&self) -> &str {
        "resources"
    }

    async fn register_provider(&self, namespace: &str) -> Result<ProviderRegistration> {
        let url = self
            .arm
            .subscription_url(&register_path(namespace), RESOURCES_API_VERSION)?;
        self.arm
            .send_json::<(), _>(Method::POST, url, None, namespace)
            .await
    }

    async fn create_or_update_resource_group(
        &self,
        name: &str,
        group: &ResourceGroup,
    ) -> Result<ResourceGroup> {
        let url = self
            .arm
            .subscription_url(&group_path(name), RESOURCES_API_VERSION)?;
        self.arm.send_json(Method::PUT, url, Some(group), name).await
    }

    async fn delete_resource_group(&self, name: &str) -> Result<()> {
        let url = self
            .arm
            .subscription_url(&group_path(name), RESOURCES_API_VERSION)?;
        let response = self.arm.send::<()>(Method::DELETE, url, None, name).await?;

        self.arm.wait_for_completion(response, name).await?;
        info!(resource_group = %name, "resource group deleted");
        Ok(())
    }
}
