//! Vaultprov - provision and tear down an Azure Key Vault with a service principal.
//!
//! Vaultprov runs one operator-driven procedure against Azure Resource Manager:
//! register the `Microsoft.KeyVault` provider, create a resource group, create
//! a vault with an access policy, list vaults, and then, after the operator
//! confirms each step, delete the vault and the resource group.
//!
//! # Features
//!
//! - **Collaborator traits**: the workflow only sees [`ResourceManagement`] and
//!   [`VaultManagement`], so tests swap in the in-memory mock
//! - **Fail fast**: missing credentials and invalid names fail before any
//!   remote call; any remote failure aborts the remaining steps
//! - **Error Context**: every remote failure says which call and resource failed
//! - **Feature Flags**: the Azure backend and its HTTP stack are optional
//!
//! # Quick Start
//!
//! ```no_run
//! use vaultprov::gate::StdinGate;
//! use vaultprov::{factory, workflow, BackendType, Config};
//!
//! #[tokio::main]
//! async fn main() -> vaultprov::Result<()> {
//!     let config = Config::new(BackendType::Azure).with_region("West Europe");
//!
//!     workflow::provision(
//!         &config,
//!         |key| std::env::var(key).ok(),
//!         |creds| factory::new_clients(&config, creds),
//!         StdinGate::stdin(),
//!         std::io::stdout(),
//!     )
//!     .await
//! }
//! ```
//!
//! # Feature Flags
//!
//! | Feature | Default | Provides |
//! |---------|---------|----------|
//! | `mock` | yes | in-memory collaborators and a recording gate |
//! | `azure` | yes | Azure Resource Manager collaborators |

pub mod backends;
pub mod config;
pub mod error;
pub mod factory;
pub mod gate;
pub mod management;
pub mod model;
pub mod report;
pub mod validation;
pub mod workflow;

pub use config::{BackendType, Config, Credentials, PLACEHOLDER_SUBSCRIPTION_ID};
pub use error::{ProvisionError, Result};
pub use management::{ResourceManagement, VaultManagement};
pub use workflow::Workflow;
