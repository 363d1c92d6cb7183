//! # vaultprov
//!
//! Provisions a resource group and a Key Vault, lists vaults, then deletes
//! both after operator confirmation.
//!
//! ## Usage
//!
//! ```bash
//! # Credentials from the environment or ./.env
//! export AZURE_TENANT_ID=... AZURE_CLIENT_ID=... AZURE_CLIENT_SECRET=... AZURE_SUBSCRIPTION_ID=...
//! vaultprov
//!
//! # Different names and region
//! vaultprov --region "North Europe" --resource-group rg-kv-demo --vault-name kv-demo-0042
//!
//! # Dry run against the in-memory backend
//! vaultprov --backend mock
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use vaultprov::config::{
    self, DEFAULT_LIST_LIMIT, DEFAULT_REGION, DEFAULT_RESOURCE_GROUP, DEFAULT_VAULT_NAME,
    KEY_VAULT_NAMESPACE,
};
use vaultprov::gate::StdinGate;
use vaultprov::{factory, workflow, BackendType, Config};

/// Provision, list and tear down an Azure Key Vault
#[derive(Parser, Debug)]
#[command(name = "vaultprov", version)]
#[command(
    about = "Provision, list and tear down an Azure Key Vault",
    long_about = None,
    after_help = "\
Environment:
  AZURE_TENANT_ID        Azure AD tenant id (required)
  AZURE_CLIENT_ID        service principal client id (required)
  AZURE_CLIENT_SECRET    service principal secret (required)
  AZURE_SUBSCRIPTION_ID  subscription to provision in
  AZURE_OBJECT_ID        principal granted vault access (defaults to the tenant id)
"
)]
struct Cli {
    /// Region for the resource group and vault
    #[arg(long, default_value = DEFAULT_REGION)]
    region: String,

    /// Resource group name
    #[arg(long, default_value = DEFAULT_RESOURCE_GROUP)]
    resource_group: String,

    /// Vault name
    #[arg(long, default_value = DEFAULT_VAULT_NAME)]
    vault_name: String,

    /// Resource provider namespace to register
    #[arg(long, default_value = KEY_VAULT_NAMESPACE)]
    provider_namespace: String,

    /// Number of vaults to list
    #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
    list_limit: u32,

    /// Environment file to load (defaults to ./.env if present)
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Management backend: azure or mock
    #[arg(long, default_value = "azure")]
    backend: BackendType,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vaultprov=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    config::load_env_file(cli.env_file.as_deref()).context("Failed to load environment file")?;

    let config = Config::new(cli.backend)
        .with_region(cli.region)
        .with_resource_group(cli.resource_group)
        .with_vault_name(cli.vault_name)
        .with_provider_namespace(cli.provider_namespace)
        .with_list_limit(cli.list_limit);

    info!(backend = %config.backend, "starting provisioning workflow");

    workflow::provision(
        &config,
        |key| std::env::var(key).ok(),
        |creds| factory::new_clients(&config, creds),
        StdinGate::stdin(),
        std::io::stdout(),
    )
    .await
    .context("Provisioning workflow failed")?;

    Ok(())
}
