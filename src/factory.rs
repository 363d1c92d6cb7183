//! Builds the collaborator pair for a backend type.

use crate::management::{ResourceManagement, VaultManagement};
use crate::{BackendType, Config, Credentials, ProvisionError, Result};

/// The two management collaborators the workflow drives.
pub struct Clients {
    /// Provider registration and resource groups
    pub resources: Box<dyn ResourceManagement>,
    /// Vaults
    pub vaults: Box<dyn VaultManagement>,
}

impl std::fmt::Debug for Clients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clients")
            .field("resources", &self.resources.name())
            .field("vaults", &self.vaults.name())
            .finish()
    }
}

/// Creates clients for `config.backend`, authenticated with `credentials`.
///
/// No remote call is made here; the first token is acquired on the first
/// management request.
///
/// # Errors
///
/// Returns an error if:
/// - The backend was not compiled in (missing feature flag)
/// - The backend rejects the credentials while building its client
///
/// # Example
///
/// ```
/// use vaultprov::{factory, BackendType, Config, Credentials};
///
/// let creds = Credentials::from_lookup(|k| Some(format!("{k}-value"))).unwrap();
/// let clients = factory::new_clients(&Config::new(BackendType::Mock), &creds).unwrap();
/// assert_eq!(clients.vaults.name(), "mock-vaults");
/// ```
#[cfg_attr(not(any(feature = "mock", feature = "azure")), allow(unused_variables))]
pub fn new_clients(config: &Config, credentials: &Credentials) -> Result<Clients> {
    match config.backend {
        #[cfg(feature = "mock")]
        BackendType::Mock => {
            let cloud = crate::backends::mock::MockCloud::new(credentials.subscription_id.clone());
            Ok(Clients {
                resources: Box::new(cloud.clone()),
                vaults: Box::new(cloud),
            })
        }

        #[cfg(feature = "azure")]
        BackendType::Azure => crate::backends::azure::connect(credentials),

        #[allow(unreachable_patterns)]
        other => Err(ProvisionError::Other(anyhow::anyhow!(
            "unknown backend: {} (did you enable the '{}' feature flag?)",
            other,
            other
        ))),
    }
}
