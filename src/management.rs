//! Management collaborator traits.
//!
//! The workflow never talks to the network itself. It drives two
//! collaborators: [`ResourceManagement`] for provider registration and
//! resource groups, and [`VaultManagement`] for vaults. Each call blocks the
//! workflow until it completes; neither trait retries.

use crate::model::{ProviderRegistration, ResourceGroup, Vault, VaultCreateOrUpdateParameters};
use crate::Result;
use async_trait::async_trait;

/// Resource provider and resource group operations.
///
/// # Implementations
///
/// - [`AzureResourceClient`](crate::backends::azure::AzureResourceClient): Azure Resource Manager
/// - [`MockCloud`](crate::backends::mock::MockCloud): in-memory, with a call journal
#[async_trait]
pub trait ResourceManagement: Send + Sync {
    /// Returns the collaborator name used in error context (e.g. "resources").
    fn name(&self) -> &str;

    /// Registers the subscription with a resource provider namespace.
    ///
    /// Idempotent: registering an already registered namespace reports its
    /// current state.
    async fn register_provider(&self, namespace: &str) -> Result<ProviderRegistration>;

    /// Creates a resource group, or updates it if it already exists.
    ///
    /// Idempotent for identical input.
    async fn create_or_update_resource_group(
        &self,
        name: &str,
        group: &ResourceGroup,
    ) -> Result<ResourceGroup>;

    /// Deletes a resource group and everything in it.
    ///
    /// # Errors
    ///
    /// - [`ProvisionError::NotFound`](crate::ProvisionError::NotFound):
    ///   the group does not exist
    async fn delete_resource_group(&self, name: &str) -> Result<()>;
}

/// Vault operations.
#[async_trait]
pub trait VaultManagement: Send + Sync {
    /// Returns the collaborator name used in error context (e.g. "vaults").
    fn name(&self) -> &str;

    /// Creates a vault, or updates it if it already exists.
    ///
    /// # Errors
    ///
    /// - [`ProvisionError::NotFound`](crate::ProvisionError::NotFound):
    ///   the resource group does not exist
    /// - [`ProvisionError::Api`](crate::ProvisionError::Api):
    ///   the name is taken globally, quota exceeded, etc.
    async fn create_or_update_vault(
        &self,
        resource_group: &str,
        name: &str,
        parameters: &VaultCreateOrUpdateParameters,
    ) -> Result<Vault>;

    /// Lists at most `top` vaults in the subscription.
    ///
    /// Listed vaults carry the generic resource view; `properties` is `None`.
    async fn list_vaults(&self, top: u32) -> Result<Vec<Vault>>;

    /// Deletes a vault.
    ///
    /// # Errors
    ///
    /// - [`ProvisionError::NotFound`](crate::ProvisionError::NotFound):
    ///   the vault does not exist
    async fn delete_vault(&self, resource_group: &str, name: &str) -> Result<()>;
}
