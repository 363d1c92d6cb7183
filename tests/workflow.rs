//! End-to-end workflow tests against the in-memory backend.
//!
//! Run with:
//!   cargo test --test workflow

#![cfg(feature = "mock")]

use std::collections::HashMap;
use std::sync::Arc;
use vaultprov::backends::mock::{Call, Journal, MockCloud, MockGate};
use vaultprov::factory::Clients;
use vaultprov::{workflow, BackendType, Config, ProvisionError};

fn env() -> HashMap<String, String> {
    [
        ("AZURE_TENANT_ID", "00000000-aaaa-bbbb-cccc-000000000001"),
        ("AZURE_CLIENT_ID", "00000000-aaaa-bbbb-cccc-000000000002"),
        ("AZURE_CLIENT_SECRET", "not-a-real-secret"),
        ("AZURE_SUBSCRIPTION_ID", "sub-123"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn clients(cloud: &MockCloud) -> Clients {
    Clients {
        resources: Box::new(cloud.clone()),
        vaults: Box::new(cloud.clone()),
    }
}

async fn run(cloud: &MockCloud, vars: &HashMap<String, String>) -> (Result<(), ProvisionError>, String) {
    let config = Config::new(BackendType::Mock);
    let gate = MockGate::new(cloud.journal());
    let mut out = Vec::new();

    let result = workflow::provision(
        &config,
        |k| vars.get(k).cloned(),
        |_creds| Ok(clients(cloud)),
        gate,
        &mut out,
    )
    .await;

    (result, String::from_utf8(out).expect("output is UTF-8"))
}

fn index_of(journal: &Journal, pred: impl Fn(&Call) -> bool) -> usize {
    journal.position(pred).expect("call not recorded")
}

#[tokio::test]
async fn test_full_run_succeeds_and_cleans_up() {
    let cloud = MockCloud::new("sub-123");
    let (result, output) = run(&cloud, &env()).await;

    result.expect("workflow failed");
    assert!(!cloud.has_vault("KeyVaultSample", "KeyVaultSample123").await);
    assert!(!cloud.has_resource_group("KeyVaultSample").await);
    assert!(output.ends_with("Delete a resource group\n"));
}

#[tokio::test]
async fn test_call_sequence() {
    let cloud = MockCloud::new("sub-123");
    let (result, _) = run(&cloud, &env()).await;
    result.unwrap();

    let calls: Vec<&'static str> = cloud
        .journal()
        .calls()
        .iter()
        .map(|c| match c {
            Call::RegisterProvider { .. } => "register",
            Call::CreateOrUpdateResourceGroup { .. } => "create_group",
            Call::CreateOrUpdateVault { .. } => "create_vault",
            Call::ListVaults { .. } => "list",
            Call::Confirmed => "confirm",
            Call::DeleteVault { .. } => "delete_vault",
            Call::DeleteResourceGroup { .. } => "delete_group",
        })
        .collect();

    assert_eq!(
        calls,
        [
            "register",
            "create_group",
            "create_vault",
            "list",
            "confirm",
            "delete_vault",
            "confirm",
            "delete_group",
        ]
    );
}

#[tokio::test]
async fn test_register_provider_once_before_vault_operations() {
    let cloud = MockCloud::new("sub-123");
    let (result, output) = run(&cloud, &env()).await;
    result.unwrap();

    let journal = cloud.journal();
    assert_eq!(
        journal.count(|c| matches!(c, Call::RegisterProvider { .. })),
        1
    );
    assert!(journal.calls().contains(&Call::RegisterProvider {
        namespace: "Microsoft.KeyVault".to_string()
    }));

    let register = index_of(&journal, |c| matches!(c, Call::RegisterProvider { .. }));
    let first_vault_op = index_of(&journal, |c| {
        matches!(
            c,
            Call::CreateOrUpdateVault { .. } | Call::ListVaults { .. } | Call::DeleteVault { .. }
        )
    });
    assert!(register < first_vault_op);
    assert!(output.starts_with("Microsoft.KeyVault Registered\n"));
}

#[tokio::test]
async fn test_resource_group_uses_fixed_name_and_location() {
    let first = MockCloud::new("sub-123");
    let second = MockCloud::new("sub-123");
    run(&first, &env()).await.0.unwrap();
    run(&second, &env()).await.0.unwrap();

    let expected = Call::CreateOrUpdateResourceGroup {
        name: "KeyVaultSample".to_string(),
        location: "West US".to_string(),
    };
    for cloud in [&first, &second] {
        let groups: Vec<Call> = cloud
            .journal()
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::CreateOrUpdateResourceGroup { .. }))
            .collect();
        assert_eq!(groups, vec![expected.clone()]);
    }
}

#[tokio::test]
async fn test_vault_gets_one_policy_with_all_key_and_secret_permissions() {
    let cloud = MockCloud::new("sub-123");
    run(&cloud, &env()).await.0.unwrap();

    let calls = cloud.journal().calls();
    let (resource_group, name, parameters) = calls
        .iter()
        .find_map(|c| match c {
            Call::CreateOrUpdateVault {
                resource_group,
                name,
                parameters,
            } => Some((resource_group, name, parameters)),
            _ => None,
        })
        .expect("vault not created");

    assert_eq!(resource_group, "KeyVaultSample");
    assert_eq!(name, "KeyVaultSample123");
    assert_eq!(parameters.location, "West US");
    assert_eq!(
        parameters.properties.tenant_id,
        "00000000-aaaa-bbbb-cccc-000000000001"
    );

    let policies = &parameters.properties.access_policies;
    assert_eq!(policies.len(), 1);
    assert!(policies[0].permissions.keys.contains(&"all".to_string()));
    assert!(policies[0].permissions.secrets.contains(&"all".to_string()));
}

#[tokio::test]
async fn test_configured_object_id_is_the_principal() {
    let cloud = MockCloud::new("sub-123");
    let mut vars = env();
    vars.insert("AZURE_OBJECT_ID".to_string(), "principal-object-id".to_string());
    run(&cloud, &vars).await.0.unwrap();

    let object_id = cloud.journal().calls().into_iter().find_map(|c| match c {
        Call::CreateOrUpdateVault { parameters, .. } => {
            Some(parameters.properties.access_policies[0].object_id.clone())
        }
        _ => None,
    });
    assert_eq!(object_id.as_deref(), Some("principal-object-id"));
}

#[tokio::test]
async fn test_list_limit_and_listing_printed_before_deletes() {
    let cloud = MockCloud::new("sub-123");
    for i in 0..7 {
        cloud.set_vault("other-rg", format!("other-vault-{i}"), "East US").await;
    }
    let (result, output) = run(&cloud, &env()).await;
    result.unwrap();

    let journal = cloud.journal();
    assert!(journal.calls().contains(&Call::ListVaults { top: 5 }));

    let list = index_of(&journal, |c| matches!(c, Call::ListVaults { .. }));
    let delete = index_of(&journal, |c| matches!(c, Call::DeleteVault { .. }));
    assert!(list < delete);

    let listing = output
        .split("List top 5 Vaults\n")
        .nth(1)
        .and_then(|rest| rest.split("Delete a vault\n").next())
        .expect("listing section missing");
    assert_eq!(listing.matches("\tName: ").count(), 5);
}

#[tokio::test]
async fn test_deletes_wait_for_confirmations() {
    let cloud = MockCloud::new("sub-123");
    run(&cloud, &env()).await.0.unwrap();

    let calls = cloud.journal().calls();
    let confirmations: Vec<usize> = calls
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, Call::Confirmed))
        .map(|(i, _)| i)
        .collect();
    let delete_vault = calls
        .iter()
        .position(|c| matches!(c, Call::DeleteVault { .. }))
        .unwrap();
    let delete_group = calls
        .iter()
        .position(|c| matches!(c, Call::DeleteResourceGroup { .. }))
        .unwrap();

    assert_eq!(confirmations.len(), 2);
    assert!(confirmations[0] < delete_vault);
    assert!(delete_vault < confirmations[1]);
    assert!(confirmations[1] < delete_group);
}

#[tokio::test]
async fn test_created_vault_is_printed_and_listed() {
    let cloud = MockCloud::new("sub-123");
    let (result, output) = run(&cloud, &env()).await;
    result.unwrap();

    let vault_id =
        "/subscriptions/sub-123/resourceGroups/KeyVaultSample/providers/Microsoft.KeyVault/vaults/KeyVaultSample123";

    let created = output
        .split("Create Key Vault\n")
        .nth(1)
        .and_then(|rest| rest.split("List top").next())
        .expect("create section missing");
    assert!(created.contains("\tName: KeyVaultSample123\n"));
    assert!(created.contains(&format!("\tId: {vault_id}\n")));
    assert!(created.contains("\tLocation: West US\n"));
    assert!(created.contains("\t\tProvisioning State: Succeeded\n"));

    let listed = output
        .split("List top 5 Vaults\n")
        .nth(1)
        .expect("listing missing");
    assert!(listed.contains("\tName: KeyVaultSample123\n"));
    assert!(listed.contains(&format!("\tId: {vault_id}\n")));
    assert!(listed.contains("\tLocation: West US\n"));
}

#[tokio::test]
async fn test_missing_credentials_fail_before_any_remote_call() {
    for missing in ["AZURE_TENANT_ID", "AZURE_CLIENT_ID", "AZURE_CLIENT_SECRET"] {
        let cloud = MockCloud::new("sub-123");
        let mut vars = env();
        vars.remove(missing);

        let config = Config::new(BackendType::Mock);
        let mut connected = false;
        let result = workflow::provision(
            &config,
            |k| vars.get(k).cloned(),
            |_creds| {
                connected = true;
                Ok(clients(&cloud))
            },
            MockGate::new(cloud.journal()),
            std::io::sink(),
        )
        .await;

        assert!(
            matches!(result, Err(ProvisionError::MissingConfig(ref var)) if var == missing),
            "missing {missing}"
        );
        assert!(!connected);
        assert!(cloud.journal().is_empty());
    }
}

#[tokio::test]
async fn test_missing_subscription_uses_placeholder() {
    let cloud = MockCloud::new("ignored");
    let mut vars = env();
    vars.remove("AZURE_SUBSCRIPTION_ID");

    let config = Config::new(BackendType::Mock);
    let mut subscription = None;
    workflow::provision(
        &config,
        |k| vars.get(k).cloned(),
        |creds| {
            subscription = Some(creds.subscription_id.clone());
            Ok(clients(&cloud))
        },
        MockGate::new(cloud.journal()),
        std::io::sink(),
    )
    .await
    .unwrap();

    assert_eq!(
        subscription.as_deref(),
        Some(vaultprov::PLACEHOLDER_SUBSCRIPTION_ID)
    );
}

#[tokio::test]
async fn test_invalid_vault_name_fails_before_any_remote_call() {
    let cloud = MockCloud::new("sub-123");
    let vars = env();
    let config = Config::new(BackendType::Mock).with_vault_name("bad_vault_name");

    let result = workflow::provision(
        &config,
        |k| vars.get(k).cloned(),
        |_creds| Ok(clients(&cloud)),
        MockGate::new(cloud.journal()),
        std::io::sink(),
    )
    .await;

    assert!(matches!(result, Err(ProvisionError::InvalidName(_))));
    assert!(cloud.journal().is_empty());
}

#[tokio::test]
async fn test_failure_aborts_remaining_steps() {
    let mut cloud = MockCloud::new("sub-123");
    cloud.delete_vault_error = Some(Arc::new(ProvisionError::Api {
        status: 409,
        code: "Conflict".to_string(),
        message: "vault is busy".to_string(),
    }));

    let (result, output) = run(&cloud, &env()).await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("delete KeyVaultSample123"));

    let journal = cloud.journal();
    assert_eq!(journal.count(|c| matches!(c, Call::Confirmed)), 1);
    assert_eq!(
        journal.count(|c| matches!(c, Call::DeleteResourceGroup { .. })),
        0
    );
    assert!(cloud.has_resource_group("KeyVaultSample").await);
    assert!(!output.contains("Vault has been deleted"));
}

#[tokio::test]
async fn test_zero_list_limit_fails_before_any_remote_call() {
    let cloud = MockCloud::new("sub-123");
    let vars = env();
    let config = Config::new(BackendType::Mock).with_list_limit(0);

    let result = workflow::provision(
        &config,
        |k| vars.get(k).cloned(),
        |_creds| Ok(clients(&cloud)),
        MockGate::new(cloud.journal()),
        std::io::sink(),
    )
    .await;

    assert!(matches!(result, Err(ProvisionError::InvalidConfig(_))));
    assert!(cloud.journal().is_empty());
}

#[tokio::test]
async fn test_configured_provider_namespace_is_registered() {
    let cloud = MockCloud::new("sub-123");
    let vars = env();
    let config = Config::new(BackendType::Mock).with_provider_namespace("Microsoft.Storage");
    let mut out = Vec::new();

    workflow::provision(
        &config,
        |k| vars.get(k).cloned(),
        |_creds| Ok(clients(&cloud)),
        MockGate::new(cloud.journal()),
        &mut out,
    )
    .await
    .unwrap();

    let journal = cloud.journal();
    assert_eq!(
        journal.position(|c| matches!(c, Call::RegisterProvider { namespace } if namespace == "Microsoft.Storage")),
        Some(0)
    );
    assert!(String::from_utf8(out).unwrap().starts_with("Microsoft.Storage Registered\n"));
}
