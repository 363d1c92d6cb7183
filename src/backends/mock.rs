//! Mock management backend for testing.
//!
//! [`MockCloud`] implements both collaborator traits in memory, records every
//! call in a [`Journal`], and supports error injection per operation.
//! [`MockGate`] is a confirmation gate that records each confirmation in the
//! same journal, so tests can assert on the relative order of remote calls
//! and operator pauses.

use crate::gate::ConfirmationGate;
use crate::management::{ResourceManagement, VaultManagement};
use crate::model::{
    ProviderRegistration, ResourceGroup, ResourceGroupProperties, Vault,
    VaultCreateOrUpdateParameters,
};
use crate::{ProvisionError, Result, PLACEHOLDER_SUBSCRIPTION_ID};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::RwLock;

/// One recorded interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `register_provider`
    RegisterProvider {
        /// Namespace requested
        namespace: String,
    },
    /// `create_or_update_resource_group`
    CreateOrUpdateResourceGroup {
        /// Group name
        name: String,
        /// Requested region
        location: String,
    },
    /// `delete_resource_group`
    DeleteResourceGroup {
        /// Group name
        name: String,
    },
    /// `create_or_update_vault`
    CreateOrUpdateVault {
        /// Resource group name
        resource_group: String,
        /// Vault name
        name: String,
        /// Full request parameters
        parameters: VaultCreateOrUpdateParameters,
    },
    /// `list_vaults`
    ListVaults {
        /// Requested limit
        top: u32,
    },
    /// `delete_vault`
    DeleteVault {
        /// Resource group name
        resource_group: String,
        /// Vault name
        name: String,
    },
    /// The operator confirmed a gate.
    Confirmed,
}

/// Shared, ordered record of calls.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Journal {
    /// Creates an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a call.
    pub fn record(&self, call: Call) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    /// Returns a snapshot of all recorded calls, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the index of the first call matching `pred`.
    pub fn position(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls().iter().position(pred)
    }

    /// Returns how many recorded calls match `pred`.
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.calls().is_empty()
    }
}

#[derive(Debug, Default)]
struct CloudState {
    providers: BTreeSet<String>,
    groups: BTreeMap<String, ResourceGroup>,
    // keyed by (resource group, vault name)
    vaults: BTreeMap<(String, String), Vault>,
}

/// In-memory stand-in for both management collaborators.
///
/// Clones share state and journal, so one clone can be handed to the
/// workflow as resource client and another as vault client.
///
/// # Example
///
/// ```
/// use vaultprov::backends::mock::{Call, MockCloud};
/// use vaultprov::management::ResourceManagement;
///
/// #[tokio::main]
/// async fn main() -> vaultprov::Result<()> {
///     let cloud = MockCloud::new("sub-123");
///     let reg = cloud.register_provider("Microsoft.KeyVault").await?;
///     assert_eq!(reg.registration_state, "Registered");
///
///     assert_eq!(
///         cloud.journal().calls(),
///         vec![Call::RegisterProvider { namespace: "Microsoft.KeyVault".to_string() }]
///     );
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct MockCloud {
    subscription_id: String,
    state: Arc<RwLock<CloudState>>,
    journal: Journal,

    /// Error to return from `register_provider()`
    pub register_error: Option<Arc<ProvisionError>>,
    /// Error to return from `create_or_update_resource_group()`
    pub group_error: Option<Arc<ProvisionError>>,
    /// Error to return from `create_or_update_vault()`
    pub vault_error: Option<Arc<ProvisionError>>,
    /// Error to return from `list_vaults()`
    pub list_error: Option<Arc<ProvisionError>>,
    /// Error to return from `delete_vault()`
    pub delete_vault_error: Option<Arc<ProvisionError>>,
    /// Error to return from `delete_resource_group()`
    pub delete_group_error: Option<Arc<ProvisionError>>,
}

impl MockCloud {
    /// Creates an empty mock cloud for a subscription.
    pub fn new(subscription_id: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            state: Arc::new(RwLock::new(CloudState::default())),
            journal: Journal::new(),
            register_error: None,
            group_error: None,
            vault_error: None,
            list_error: None,
            delete_vault_error: None,
            delete_group_error: None,
        }
    }

    /// Returns the journal shared by all clones.
    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }

    /// Pre-populates a vault (and its resource group) outside the journal.
    pub async fn set_vault(
        &self,
        resource_group: impl Into<String>,
        name: impl Into<String>,
        location: impl Into<String>,
    ) {
        let resource_group = resource_group.into();
        let name = name.into();
        let location = location.into();

        let mut state = self.state.write().await;
        let group = self.group_record(&resource_group, &ResourceGroup::new(location.clone()));
        state.groups.entry(resource_group.clone()).or_insert(group);

        let vault = Vault {
            id: self.vault_id(&resource_group, &name),
            name: name.clone(),
            location,
            ..Default::default()
        };
        state.vaults.insert((resource_group, name), vault);
    }

    /// Returns true if the vault currently exists.
    pub async fn has_vault(&self, resource_group: &str, name: &str) -> bool {
        let state = self.state.read().await;
        state
            .vaults
            .contains_key(&(resource_group.to_string(), name.to_string()))
    }

    /// Returns true if the resource group currently exists.
    pub async fn has_resource_group(&self, name: &str) -> bool {
        self.state.read().await.groups.contains_key(name)
    }

    fn injected(err: &Option<Arc<ProvisionError>>) -> Result<()> {
        match err {
            Some(err) => Err(ProvisionError::Other(anyhow::anyhow!("{}", err))),
            None => Ok(()),
        }
    }

    fn group_id(&self, name: &str) -> String {
        format!("/subscriptions/{}/resourceGroups/{}", self.subscription_id, name)
    }

    fn vault_id(&self, resource_group: &str, name: &str) -> String {
        format!(
            "{}/providers/Microsoft.KeyVault/vaults/{}",
            self.group_id(resource_group),
            name
        )
    }

    fn group_record(&self, name: &str, group: &ResourceGroup) -> ResourceGroup {
        ResourceGroup {
            id: self.group_id(name),
            name: name.to_string(),
            location: group.location.clone(),
            tags: group.tags.clone(),
            properties: Some(ResourceGroupProperties {
                provisioning_state: Some("Succeeded".to_string()),
            }),
        }
    }
}

impl Default for MockCloud {
    fn default() -> Self {
        Self::new(PLACEHOLDER_SUBSCRIPTION_ID)
    }
}

#[async_trait]
impl ResourceManagement for MockCloud {
    fn name(&self) -> &str {
        "mock-resources"
    }

    async fn register_provider(&self, namespace: &str) -> Result<ProviderRegistration> {
        self.journal.record(Call::RegisterProvider {
            namespace: namespace.to_string(),
        });
        Self::injected(&self.register_error)?;

        self.state
            .write()
            .await
            .providers
            .insert(namespace.to_string());

        Ok(ProviderRegistration {
            namespace: namespace.to_string(),
            registration_state: "Registered".to_string(),
        })
    }

    async fn create_or_update_resource_group(
        &self,
        name: &str,
        group: &ResourceGroup,
    ) -> Result<ResourceGroup> {
        self.journal.record(Call::CreateOrUpdateResourceGroup {
            name: name.to_string(),
            location: group.location.clone(),
        });
        Self::injected(&self.group_error)?;

        let record = self.group_record(name, group);
        self.state
            .write()
            .await
            .groups
            .insert(name.to_string(), record.clone());
        Ok(record)
    }

    async fn delete_resource_group(&self, name: &str) -> Result<()> {
        self.journal.record(Call::DeleteResourceGroup {
            name: name.to_string(),
        });
        Self::injected(&self.delete_group_error)?;

        let mut state = self.state.write().await;
        state
            .groups
            .remove(name)
            .ok_or_else(|| ProvisionError::NotFound(name.to_string()))?;
        state.vaults.retain(|(group, _), _| group != name);
        Ok(())
    }
}

#[async_trait]
impl VaultManagement for MockCloud {
    fn name(&self) -> &str {
        "mock-vaults"
    }

    async fn create_or_update_vault(
        &self,
        resource_group: &str,
        name: &str,
        parameters: &VaultCreateOrUpdateParameters,
    ) -> Result<Vault> {
        self.journal.record(Call::CreateOrUpdateVault {
            resource_group: resource_group.to_string(),
            name: name.to_string(),
            parameters: parameters.clone(),
        });
        Self::injected(&self.vault_error)?;

        let mut state = self.state.write().await;
        if !state.groups.contains_key(resource_group) {
            return Err(ProvisionError::NotFound(resource_group.to_string()));
        }

        let mut properties = parameters.properties.clone();
        properties.vault_uri = Some(format!("https://{}.vault.azure.net/", name.to_lowercase()));
        properties.provisioning_state = Some("Succeeded".to_string());

        let vault = Vault {
            id: self.vault_id(resource_group, name),
            name: name.to_string(),
            location: parameters.location.clone(),
            tags: parameters.tags.clone(),
            properties: Some(properties),
        };
        state
            .vaults
            .insert((resource_group.to_string(), name.to_string()), vault.clone());
        Ok(vault)
    }

    async fn list_vaults(&self, top: u32) -> Result<Vec<Vault>> {
        self.journal.record(Call::ListVaults { top });
        Self::injected(&self.list_error)?;

        let state = self.state.read().await;
        Ok(state
            .vaults
            .values()
            .take(top as usize)
            .map(|v| Vault {
                properties: None,
                ..v.clone()
            })
            .collect())
    }

    async fn delete_vault(&self, resource_group: &str, name: &str) -> Result<()> {
        self.journal.record(Call::DeleteVault {
            resource_group: resource_group.to_string(),
            name: name.to_string(),
        });
        Self::injected(&self.delete_vault_error)?;

        let mut state = self.state.write().await;
        state
            .vaults
            .remove(&(resource_group.to_string(), name.to_string()))
            .ok_or_else(|| ProvisionError::NotFound(name.to_string()))?;
        Ok(())
    }
}

/// Confirmation gate that confirms immediately and records each confirmation.
#[derive(Debug, Clone)]
pub struct MockGate {
    journal: Journal,
}

impl MockGate {
    /// Creates a gate recording into `journal`.
    pub fn new(journal: Journal) -> Self {
        Self { journal }
    }

    /// Returns how many times the gate has been passed.
    pub fn confirmations(&self) -> usize {
        self.journal.count(|c| matches!(c, Call::Confirmed))
    }
}

#[async_trait]
impl ConfirmationGate for MockGate {
    async fn wait(&mut self) -> Result<()> {
        self.journal.record(Call::Confirmed);
        Ok(())
    }
}
