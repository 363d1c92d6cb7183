//! Full provisioning run against the in-memory backend.
//!
//! Both confirmations are answered from a scripted input, so this runs
//! without a terminal or Azure credentials:
//!
//!   cargo run --example dry_run

use vaultprov::gate::LineGate;
use vaultprov::{factory, workflow, BackendType, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> vaultprov::Result<()> {
    let config = Config::new(BackendType::Mock).with_vault_name("kv-dry-run");
    println!("Backend: {}, region: {}", config.backend, config.region);

    // Placeholder values; the mock never authenticates.
    let lookup = |key: &str| match key {
        "AZURE_SUBSCRIPTION_ID" => None,
        other => Some(format!("dry-run-{}", other.to_lowercase())),
    };

    workflow::provision(
        &config,
        lookup,
        |creds| factory::new_clients(&config, creds),
        LineGate::new(&b"\n\n"[..]),
        std::io::stdout(),
    )
    .await?;

    println!("Dry run complete");
    Ok(())
}
