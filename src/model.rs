//! Value records exchanged with the management collaborators.
//!
//! Field names serialize to Azure Resource Manager JSON (camelCase).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resource tags. Ordered so printed output is stable.
pub type Tags = BTreeMap<String, String>;

/// Result of registering a resource provider namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRegistration {
    /// Provider namespace, e.g. "Microsoft.KeyVault"
    pub namespace: String,
    /// Registration state reported by the provider ("Registering", "Registered")
    #[serde(default)]
    pub registration_state: String,
}

/// Properties of a resource group reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroupProperties {
    /// Provisioning state, e.g. "Succeeded"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

/// A resource group.
///
/// Requests only carry `location` (and optionally `tags`); the rest is filled
/// in by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceGroup {
    /// Fully qualified resource id
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Resource group name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Region
    pub location: String,

    /// Tags
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,

    /// Provider-reported properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<ResourceGroupProperties>,
}

impl ResourceGroup {
    /// Creates a resource group request for the given region.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Default::default()
        }
    }

    /// Returns the provisioning state, if the provider reported one.
    pub fn provisioning_state(&self) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|p| p.provisioning_state.as_deref())
    }
}

/// SKU family. Key Vault only defines family `A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkuFamily {
    /// Family A
    A,
}

/// SKU tier name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkuName {
    /// Standard tier (software-protected keys)
    Standard,
    /// Premium tier (HSM-protected keys)
    Premium,
}

/// Vault SKU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    /// SKU family
    pub family: SkuFamily,
    /// SKU tier
    pub name: SkuName,
}

impl Sku {
    /// Family `A`, tier `standard`.
    pub fn standard() -> Self {
        Self {
            family: SkuFamily::A,
            name: SkuName::Standard,
        }
    }
}

/// Operations granted on keys and secrets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Permissions {
    /// Key permissions
    #[serde(default)]
    pub keys: Vec<String>,
    /// Secret permissions
    #[serde(default)]
    pub secrets: Vec<String>,
}

impl Permissions {
    /// The wildcard permission value.
    pub const ALL: &'static str = "all";

    /// Grants every operation on keys and secrets.
    pub fn all() -> Self {
        Self {
            keys: vec![Self::ALL.to_string()],
            secrets: vec![Self::ALL.to_string()],
        }
    }

    /// Returns true if every key operation is granted.
    pub fn all_keys(&self) -> bool {
        self.keys.iter().any(|p| p.eq_ignore_ascii_case(Self::ALL))
    }

    /// Returns true if every secret operation is granted.
    pub fn all_secrets(&self) -> bool {
        self.secrets.iter().any(|p| p.eq_ignore_ascii_case(Self::ALL))
    }
}

/// A grant of permissions to one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessPolicyEntry {
    /// Tenant the identity belongs to
    pub tenant_id: String,
    /// Object id of the identity
    pub object_id: String,
    /// Granted permissions
    pub permissions: Permissions,
}

/// Vault properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultProperties {
    /// Tenant used to authenticate requests to the vault
    pub tenant_id: String,

    /// SKU
    pub sku: Sku,

    /// Identities with access to the vault
    #[serde(default)]
    pub access_policies: Vec<AccessPolicyEntry>,

    /// Data-plane URI, assigned by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_uri: Option<String>,

    /// Provisioning state, assigned by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

/// Request body for creating or updating a vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultCreateOrUpdateParameters {
    /// Region
    pub location: String,

    /// Tags
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,

    /// Vault properties
    pub properties: VaultProperties,
}

impl VaultCreateOrUpdateParameters {
    /// Creates vault parameters with no tags.
    pub fn new(location: impl Into<String>, properties: VaultProperties) -> Self {
        Self {
            location: location.into(),
            tags: Tags::new(),
            properties,
        }
    }
}

/// A vault as reported by the provider.
///
/// Listing returns the generic resource view, so `properties` is only
/// populated by create-or-update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Vault {
    /// Fully qualified resource id
    pub id: String,

    /// Vault name
    pub name: String,

    /// Region
    #[serde(default)]
    pub location: String,

    /// Tags
    #[serde(default)]
    pub tags: Tags,

    /// Vault properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<VaultProperties>,
}

impl Vault {
    /// Returns the provisioning state, if the provider reported one.
    pub fn provisioning_state(&self) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|p| p.provisioning_state.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vault_parameters_wire_shape() {
        let params = VaultCreateOrUpdateParameters::new(
            "West US",
            VaultProperties {
                tenant_id: "tenant".to_string(),
                sku: Sku::standard(),
                access_policies: vec![AccessPolicyEntry {
                    tenant_id: "tenant".to_string(),
                    object_id: "object".to_string(),
                    permissions: Permissions::all(),
                }],
                vault_uri: None,
                provisioning_state: None,
            },
        );

        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(
            value,
            json!({
                "location": "West US",
                "properties": {
                    "tenantId": "tenant",
                    "sku": { "family": "A", "name": "standard" },
                    "accessPolicies": [{
                        "tenantId": "tenant",
                        "objectId": "object",
                        "permissions": { "keys": ["all"], "secrets": ["all"] }
                    }]
                }
            })
        );
    }

    #[test]
    fn test_resource_group_request_only_carries_location() {
        let value = serde_json::to_value(ResourceGroup::new("West US")).unwrap();
        assert_eq!(value, json!({ "location": "West US" }));
    }

    #[test]
    fn test_resource_group_response() {
        let group: ResourceGroup = serde_json::from_value(json!({
            "id": "/subscriptions/sub/resourceGroups/KeyVaultSample",
            "name": "KeyVaultSample",
            "location": "westus",
            "tags": { "env": "demo" },
            "properties": { "provisioningState": "Succeeded" }
        }))
        .unwrap();

        assert_eq!(group.name, "KeyVaultSample");
        assert_eq!(group.tags.get("env").map(String::as_str), Some("demo"));
        assert_eq!(group.provisioning_state(), Some("Succeeded"));
    }

    #[test]
    fn test_listed_vault_without_properties() {
        let vault: Vault = serde_json::from_value(json!({
            "id": "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.KeyVault/vaults/kv",
            "name": "kv",
            "type": "Microsoft.KeyVault/vaults",
            "location": "westus"
        }))
        .unwrap();

        assert_eq!(vault.name, "kv");
        assert!(vault.tags.is_empty());
        assert_eq!(vault.provisioning_state(), None);
    }

    #[test]
    fn test_permissions_all() {
        let perms = Permissions::all();
        assert!(perms.all_keys());
        assert!(perms.all_secrets());
        assert!(!Permissions::default().all_keys());
    }

    #[test]
    fn test_provider_registration() {
        let reg: ProviderRegistration = serde_json::from_value(json!({
            "id": "/subscriptions/sub/providers/Microsoft.KeyVault",
            "namespace": "Microsoft.KeyVault",
            "registrationState": "Registered"
        }))
        .unwrap();

        assert_eq!(reg.namespace, "Microsoft.KeyVault");
        assert_eq!(reg.registration_state, "Registered");
    }
}
