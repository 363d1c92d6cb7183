//! Azure Resource Manager backend.
//!
//! Implements both management collaborators against the public Azure
//! management endpoint. Tokens come from the Azure SDK
//! (`ClientSecretCredential`), which acquires and refreshes them.
//!
//! # Authentication
//!
//! A service principal is required:
//! - `AZURE_TENANT_ID`: Azure AD tenant id or domain
//! - `AZURE_CLIENT_ID`: application (client) id
//! - `AZURE_CLIENT_SECRET`: application secret
//! - `AZURE_SUBSCRIPTION_ID`: subscription to provision in
//!
//! # Example
//!
//! ```no_run
//! use vaultprov::backends::azure;
//! use vaultprov::management::ResourceManagement;
//! use vaultprov::Credentials;
//!
//! #[tokio::main]
//! async fn main() -> vaultprov::Result<()> {
//!     let creds = Credentials::from_env()?;
//!     let clients = azure::connect(&creds)?;
//!
//!     let reg = clients.resources.register_provider("Microsoft.KeyVault").await?;
//!     println!("{} {}", reg.namespace, reg.registration_state);
//!     Ok(())
//! }
//! ```

mod arm;
mod resources;
mod vaults;

pub use arm::{ArmClient, AUTHORITY_HOST, MANAGEMENT_ENDPOINT};
pub use resources::AzureResourceClient;
pub use vaults::AzureVaultClient;

use crate::factory::Clients;
use crate::{Credentials, Result};
use std::sync::Arc;

/// Builds both Azure clients on one shared ARM client.
pub fn connect(credentials: &Credentials) -> Result<Clients> {
    let arm = Arc::new(ArmClient::new(credentials)?);
    tracing::debug!(subscription = %arm.subscription_id(), "connected to Azure Resource Manager");

    Ok(Clients {
        resources: Box::new(AzureResourceClient::new(Arc::clone(&arm))),
        vaults: Box::new(AzureVaultClient::new(arm)),
    })
}
