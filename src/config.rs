//! Configuration types: service principal credentials and workflow settings.

use crate::{ProvisionError, Result};
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

/// Environment variable holding the Azure AD tenant id (or domain).
pub const TENANT_ID_VAR: &str = "AZURE_TENANT_ID";
/// Environment variable holding the application (client) id.
pub const CLIENT_ID_VAR: &str = "AZURE_CLIENT_ID";
/// Environment variable holding the application secret.
pub const CLIENT_SECRET_VAR: &str = "AZURE_CLIENT_SECRET";
/// Environment variable holding the subscription id.
pub const SUBSCRIPTION_ID_VAR: &str = "AZURE_SUBSCRIPTION_ID";
/// Environment variable holding the principal object id granted vault access.
pub const OBJECT_ID_VAR: &str = "AZURE_OBJECT_ID";

/// Substituted when no subscription id is configured. Not valid for real calls.
pub const PLACEHOLDER_SUBSCRIPTION_ID: &str = "11111111-1111-1111-1111-111111111111";

/// Default region for the resource group and vault.
pub const DEFAULT_REGION: &str = "West US";
/// Default resource group name.
pub const DEFAULT_RESOURCE_GROUP: &str = "KeyVaultSample";
/// Default vault name.
pub const DEFAULT_VAULT_NAME: &str = "KeyVaultSample123";
/// Resource provider namespace registered before creating vaults.
pub const KEY_VAULT_NAMESPACE: &str = "Microsoft.KeyVault";
/// Number of vaults requested by the list step.
pub const DEFAULT_LIST_LIMIT: u32 = 5;

/// Service principal credentials, read once at startup.
///
/// The client secret is never included in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Azure AD tenant id
    pub tenant_id: String,
    /// Application (client) id
    pub client_id: String,
    /// Application secret
    pub client_secret: String,
    /// Subscription all resources are created in
    pub subscription_id: String,
    /// Object id of the principal granted vault access, if configured
    pub object_id: Option<String>,
}

impl Credentials {
    /// Reads credentials from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::MissingConfig`] if the tenant id, client id
    /// or client secret is absent.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads credentials through an arbitrary key lookup.
    ///
    /// Empty values count as absent. A missing subscription id falls back to
    /// [`PLACEHOLDER_SUBSCRIPTION_ID`].
    ///
    /// # Example
    ///
    /// ```
    /// use vaultprov::Credentials;
    /// use std::collections::HashMap;
    ///
    /// let vars: HashMap<&str, &str> = [
    ///     ("AZURE_TENANT_ID", "tenant"),
    ///     ("AZURE_CLIENT_ID", "client"),
    ///     ("AZURE_CLIENT_SECRET", "secret"),
    /// ]
    /// .into_iter()
    /// .collect();
    ///
    /// let creds = Credentials::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
    /// assert_eq!(creds.tenant_id, "tenant");
    /// assert_eq!(creds.subscription_id, "11111111-1111-1111-1111-111111111111");
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| get(key).ok_or_else(|| ProvisionError::MissingConfig(key.to_string()));

        let tenant_id = require(TENANT_ID_VAR)?;
        let client_id = require(CLIENT_ID_VAR)?;
        let client_secret = require(CLIENT_SECRET_VAR)?;

        let subscription_id = get(SUBSCRIPTION_ID_VAR).unwrap_or_else(|| {
            warn!(
                var = SUBSCRIPTION_ID_VAR,
                placeholder = PLACEHOLDER_SUBSCRIPTION_ID,
                "subscription id not set, using placeholder"
            );
            PLACEHOLDER_SUBSCRIPTION_ID.to_string()
        });

        Ok(Self {
            tenant_id,
            client_id,
            client_secret,
            subscription_id,
            object_id: get(OBJECT_ID_VAR),
        })
    }

    /// Returns the principal id to grant vault access to.
    ///
    /// Falls back to the tenant id when no object id is configured. That grant
    /// does not reach a real identity, so a warning is logged.
    pub fn principal_id(&self) -> &str {
        match self.object_id.as_deref() {
            Some(id) => id,
            None => {
                warn!(
                    var = OBJECT_ID_VAR,
                    "object id not set, granting vault access to the tenant id"
                );
                &self.tenant_id
            }
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("subscription_id", &self.subscription_id)
            .field("object_id", &self.object_id)
            .finish()
    }
}

/// Loads a `.env` file into the process environment.
///
/// With no path, `.env` in the current directory or its parents is used and a
/// missing file is not an error. Variables already set in the environment are
/// never overwritten.
///
/// # Errors
///
/// Returns an error if an explicitly named file cannot be read or parsed, or
/// if the default `.env` exists but is malformed.
pub fn load_env_file(path: Option<&Path>) -> Result<()> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };

    match loaded {
        Ok(loaded_from) => {
            tracing::debug!(path = %loaded_from.display(), "loaded environment file");
            Ok(())
        }
        Err(dotenvy::Error::Io(e)) if path.is_none() && e.kind() == std::io::ErrorKind::NotFound => {
            Ok(())
        }
        Err(e) => Err(ProvisionError::Other(anyhow::anyhow!(
            "failed to load environment file: {}",
            e
        ))),
    }
}

/// Management backend the workflow talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendType {
    /// In-memory collaborators, no network access
    Mock,
    /// Azure Resource Manager
    Azure,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mock => write!(f, "mock"),
            Self::Azure => write!(f, "azure"),
        }
    }
}

impl FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "azure" | "arm" => Ok(Self::Azure),
            other => Err(format!("unknown backend: {other} (valid: azure, mock)")),
        }
    }
}

/// Workflow settings.
///
/// Every name used by the workflow comes from one `Config`, so the names a
/// resource is created with are the names it is later listed and deleted by.
///
/// ```
/// use vaultprov::{BackendType, Config};
///
/// let config = Config::new(BackendType::Mock)
///     .with_region("East US")
///     .with_vault_name("my-vault-01");
///
/// assert_eq!(config.region, "East US");
/// assert_eq!(config.resource_group, "KeyVaultSample");
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend type
    pub backend: BackendType,

    /// Region for the resource group and vault (default: "West US")
    pub region: String,

    /// Resource group name (default: "KeyVaultSample")
    pub resource_group: String,

    /// Vault name (default: "KeyVaultSample123")
    pub vault_name: String,

    /// Provider namespace to register (default: "Microsoft.KeyVault")
    pub provider_namespace: String,

    /// Maximum number of vaults listed (default: 5)
    pub list_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendType::Azure,
            region: DEFAULT_REGION.to_string(),
            resource_group: DEFAULT_RESOURCE_GROUP.to_string(),
            vault_name: DEFAULT_VAULT_NAME.to_string(),
            provider_namespace: KEY_VAULT_NAMESPACE.to_string(),
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl Config {
    /// Creates a configuration with default names for the given backend.
    pub fn new(backend: BackendType) -> Self {
        Self {
            backend,
            ..Default::default()
        }
    }

    /// Sets the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Sets the resource group name.
    pub fn with_resource_group(mut self, name: impl Into<String>) -> Self {
        self.resource_group = name.into();
        self
    }

    /// Sets the vault name.
    pub fn with_vault_name(mut self, name: impl Into<String>) -> Self {
        self.vault_name = name.into();
        self
    }

    /// Sets the provider namespace registered before vault creation.
    pub fn with_provider_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.provider_namespace = namespace.into();
        self
    }

    /// Sets how many vaults the list step requests.
    pub fn with_list_limit(mut self, limit: u32) -> Self {
        self.list_limit = limit;
        self
    }
}
