//! The provisioning workflow.
//!
//! One ordered procedure: authenticate, register the Key Vault provider,
//! create the resource group, create the vault, list vaults, then (after an
//! operator confirmation each) delete the vault and the resource group.
//!
//! Any failure aborts the remaining steps. Nothing is rolled back or retried;
//! the error is returned with the failing operation attached.

use crate::factory::Clients;
use crate::gate::ConfirmationGate;
use crate::management::{ResourceManagement, VaultManagement};
use crate::model::{
    AccessPolicyEntry, Permissions, ProviderRegistration, ResourceGroup, Sku, Vault,
    VaultCreateOrUpdateParameters, VaultProperties,
};
use crate::report::print_item;
use crate::validation::validate_config;
use crate::{Config, Credentials, ProvisionError, Result};
use std::io::Write;
use tracing::{info, instrument};

const PROMPT: &str = "Press any key to continue...";

/// Builds the vault request: configured region, the tenant's id, SKU
/// `A/standard`, and one access policy granting all key and secret
/// operations to the configured principal.
pub fn vault_parameters(config: &Config, credentials: &Credentials) -> VaultCreateOrUpdateParameters {
    let properties = VaultProperties {
        tenant_id: credentials.tenant_id.clone(),
        sku: Sku::standard(),
        access_policies: vec![AccessPolicyEntry {
            tenant_id: credentials.tenant_id.clone(),
            object_id: credentials.principal_id().to_string(),
            permissions: Permissions::all(),
        }],
        vault_uri: None,
        provisioning_state: None,
    };

    VaultCreateOrUpdateParameters::new(config.region.clone(), properties)
}

/// Runs the whole procedure, starting from raw configuration.
///
/// Credentials are read through `lookup` and names are validated before
/// `connect` is called, so missing or invalid configuration fails without
/// any remote call.
///
/// # Example
///
/// ```
/// use vaultprov::backends::mock::{MockCloud, MockGate};
/// use vaultprov::factory::Clients;
/// use vaultprov::{workflow, BackendType, Config};
///
/// #[tokio::main]
/// async fn main() -> vaultprov::Result<()> {
///     let cloud = MockCloud::default();
///     let gate = MockGate::new(cloud.journal());
///     let mut out = Vec::new();
///
///     workflow::provision(
///         &Config::new(BackendType::Mock),
///         |k| Some(format!("{k}-value")),
///         |_creds| Ok(Clients { resources: Box::new(cloud.clone()), vaults: Box::new(cloud.clone()) }),
///         gate,
///         &mut out,
///     )
///     .await?;
///
///     assert!(String::from_utf8_lossy(&out).contains("KeyVaultSample123"));
///     Ok(())
/// }
/// ```
pub async fn provision<F, C, G, W>(
    config: &Config,
    lookup: F,
    connect: C,
    gate: G,
    out: W,
) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    C: FnOnce(&Credentials) -> Result<Clients>,
    G: ConfirmationGate,
    W: Write,
{
    let credentials = Credentials::from_lookup(lookup)?;
    validate_config(config)?;

    let clients = connect(&credentials)?;
    Workflow::new(
        config,
        &credentials,
        clients.resources.as_ref(),
        clients.vaults.as_ref(),
        gate,
        out,
    )
    .run()
    .await
}

/// The provisioning procedure over already-built collaborators.
///
/// Each step is also exposed on its own; [`run`](Self::run) calls them in
/// order.
pub struct Workflow<'a, G, W> {
    config: &'a Config,
    credentials: &'a Credentials,
    resources: &'a dyn ResourceManagement,
    vaults: &'a dyn VaultManagement,
    gate: G,
    out: W,
}

impl<'a, G, W> Workflow<'a, G, W>
where
    G: ConfirmationGate,
    W: Write,
{
    /// Creates a workflow.
    pub fn new(
        config: &'a Config,
        credentials: &'a Credentials,
        resources: &'a dyn ResourceManagement,
        vaults: &'a dyn VaultManagement,
        gate: G,
        out: W,
    ) -> Self {
        Self {
            config,
            credentials,
            resources,
            vaults,
            gate,
            out,
        }
    }

    /// Runs every step in order, stopping at the first failure.
    #[instrument(
        skip(self),
        fields(
            subscription = %self.credentials.subscription_id,
            resource_group = %self.config.resource_group,
            vault = %self.config.vault_name,
        )
    )]
    pub async fn run(mut self) -> Result<()> {
        self.register_provider().await?;
        self.create_resource_group().await?;
        self.create_vault().await?;
        self.list_vaults().await?;
        self.delete_vault().await?;
        self.delete_resource_group().await?;

        info!("workflow complete");
        Ok(())
    }

    /// Registers the subscription with the Key Vault provider namespace.
    pub async fn register_provider(&mut self) -> Result<ProviderRegistration> {
        let namespace = &self.config.provider_namespace;
        let resources = self.resources;
        info!(namespace = %namespace, "registering provider");

        let registration = resources
            .register_provider(namespace)
            .await
            .map_err(|e| ProvisionError::remote_op(resources.name(), "register", namespace, e))?;

        writeln!(
            self.out,
            "{} {}",
            registration.namespace, registration.registration_state
        )?;
        Ok(registration)
    }

    /// Creates (or updates) the resource group.
    pub async fn create_resource_group(&mut self) -> Result<ResourceGroup> {
        let config = self.config;
        let resources = self.resources;
        let name = &config.resource_group;
        writeln!(self.out, "Create a resource group")?;
        info!(resource_group = %name, region = %config.region, "creating resource group");

        let group = resources
            .create_or_update_resource_group(name, &ResourceGroup::new(config.region.clone()))
            .await
            .map_err(|e| ProvisionError::remote_op(resources.name(), "create_or_update", name, e))?;

        print_item(&mut self.out, &group)?;
        Ok(group)
    }

    /// Creates (or updates) the vault.
    pub async fn create_vault(&mut self) -> Result<Vault> {
        let config = self.config;
        let vaults = self.vaults;
        let name = &config.vault_name;
        writeln!(self.out, "Create Key Vault")?;
        info!(vault = %name, "creating vault");

        let parameters = vault_parameters(config, self.credentials);
        let vault = vaults
            .create_or_update_vault(&config.resource_group, name, &parameters)
            .await
            .map_err(|e| ProvisionError::remote_op(vaults.name(), "create_or_update", name, e))?;

        print_item(&mut self.out, &vault)?;
        Ok(vault)
    }

    /// Lists up to `list_limit` vaults and prints each one.
    pub async fn list_vaults(&mut self) -> Result<Vec<Vault>> {
        let top = self.config.list_limit;
        let client = self.vaults;
        writeln!(self.out, "List top {} Vaults", top)?;

        let vaults = client
            .list_vaults(top)
            .await
            .map_err(|e| ProvisionError::remote_op(client.name(), "list", format!("top {top}"), e))?;

        for vault in &vaults {
            print_item(&mut self.out, vault)?;
        }
        info!(count = vaults.len(), "listed vaults");
        Ok(vaults)
    }

    /// Waits for confirmation, then deletes the vault.
    pub async fn delete_vault(&mut self) -> Result<()> {
        let config = self.config;
        let vaults = self.vaults;
        let name = &config.vault_name;
        writeln!(self.out, "Delete a vault")?;
        self.confirm().await?;

        info!(vault = %name, "deleting vault");
        vaults
            .delete_vault(&config.resource_group, name)
            .await
            .map_err(|e| ProvisionError::remote_op(vaults.name(), "delete", name, e))
    }

    /// Waits for confirmation, then deletes the resource group.
    pub async fn delete_resource_group(&mut self) -> Result<()> {
        let config = self.config;
        let resources = self.resources;
        let name = &config.resource_group;
        writeln!(self.out, "Vault has been deleted. Now delete resource group")?;
        self.confirm().await?;

        writeln!(self.out, "Delete a resource group")?;
        info!(resource_group = %name, "deleting resource group");
        resources
            .delete_resource_group(name)
            .await
            .map_err(|e| ProvisionError::remote_op(resources.name(), "delete", name, e))
    }

    async fn confirm(&mut self) -> Result<()> {
        writeln!(self.out, "{}", PROMPT)?;
        self.out.flush()?;
        self.gate.wait().await
    }
}
