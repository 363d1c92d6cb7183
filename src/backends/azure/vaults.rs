//! Key Vault management operations over ARM.

use crate::backends::azure::ArmClient;
use crate::management::VaultManagement;
use crate::model::{Vault, VaultCreateOrUpdateParameters};
use crate::Result;
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use std::sync::Arc;

/// API version for `Microsoft.KeyVault/vaults` calls.
const VAULTS_API_VERSION: &str = "2022-07-01";

/// API version of the generic resource listing used to enumerate vaults.
const LIST_API_VERSION: &str = "2015-11-01";

/// Resource type filter for vault listing.
const VAULT_FILTER: &str = "resourceType eq 'Microsoft.KeyVault/vaults'";

#[derive(Debug, Deserialize)]
struct ResourceList {
    #[serde(default)]
    value: Vec<Vault>,
}

/// Azure implementation of [`VaultManagement`].
#[derive(Debug, Clone)]
pub struct AzureVaultClient {
    arm: Arc<ArmClient>,
}

impl AzureVaultClient {
    /// Creates a vault client on a shared ARM client.
    pub fn new(arm: Arc<ArmClient>) -> Self {
        Self { arm }
    }
}

pub(crate) fn vault_path(resource_group: &str, name: &str) -> String {
    format!(
        "/resourceGroups/{}/providers/Microsoft.KeyVault/vaults/{}",
        resource_group, name
    )
}

#[async_trait]
impl VaultManagement for AzureVaultClient {
    fn name(&self) -> &str {
        "vaults"
    }

    async fn create_or_update_vault(
        &self,
        resource_group: &str,
        name: &str,
        parameters: &VaultCreateOrUpdateParameters,
    ) -> Result<Vault> {
        let url = self
            .arm
            .subscription_url(&vault_path(resource_group, name), VAULTS_API_VERSION)?;
        self.arm
            .send_json(Method::PUT, url, Some(parameters), name)
            .await
    }

    async fn list_vaults(&self, top: u32) -> Result<Vec<Vault>> {
        let mut url = self.arm.subscription_url("/resources", LIST_API_VERSION)?;
        url.query_pairs_mut()
            .append_pair("$filter", VAULT_FILTER)
            .append_pair("$top", &top.to_string());

        // One page: $top bounds the page size.
        let mut list: ResourceList = self
            .arm
            .send_json::<(), _>(Method::GET, url, None, "vaults")
            .await?;
        list.value.truncate(top as usize);
        Ok(list.value)
    }

    async fn delete_vault(&self, resource_group: &str, name: &str) -> Result<()> {
        let url = self
            .arm
            .subscription_url(&vault_path(resource_group, name), VAULTS_API_VERSION)?;
        self.arm.send::<()>(Method::DELETE, url, None, name).await?;
        Ok(())
    }
}
