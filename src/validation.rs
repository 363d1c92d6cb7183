//! Resource name validation.
//!
//! Names are checked against the provider's naming rules before any remote
//! call, so a bad configuration fails without touching the subscription.

use crate::{Config, ProvisionError, Result};

/// Maximum length of a resource group name.
const MAX_GROUP_NAME_LENGTH: usize = 90;

/// Minimum and maximum length of a vault name.
const MIN_VAULT_NAME_LENGTH: usize = 3;
const MAX_VAULT_NAME_LENGTH: usize = 24;

/// Validates a resource group name.
///
/// Allowed: 1-90 characters, letters, digits, underscores, hyphens, periods
/// and parentheses; must not end with a period.
///
/// # Example
///
/// ```
/// use vaultprov::validation::validate_resource_group_name;
///
/// assert!(validate_resource_group_name("KeyVaultSample").is_ok());
/// assert!(validate_resource_group_name("rg_prod-(west).1").is_ok());
///
/// assert!(validate_resource_group_name("").is_err());
/// assert!(validate_resource_group_name("trailing.").is_err());
/// assert!(validate_resource_group_name("rg/../other").is_err());
/// ```
pub fn validate_resource_group_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ProvisionError::InvalidName(
            "resource group name cannot be empty".to_string(),
        ));
    }

    if name.chars().count() > MAX_GROUP_NAME_LENGTH {
        return Err(ProvisionError::InvalidName(format!(
            "resource group name exceeds maximum length of {} characters",
            MAX_GROUP_NAME_LENGTH
        )));
    }

    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '(' | ')')))
    {
        return Err(ProvisionError::InvalidName(format!(
            "resource group name contains invalid character {:?}",
            c
        )));
    }

    if name.ends_with('.') {
        return Err(ProvisionError::InvalidName(
            "resource group name cannot end with a period".to_string(),
        ));
    }

    Ok(())
}

/// Validates a vault name.
///
/// Allowed: 3-24 ASCII letters, digits and hyphens; must start with a
/// letter, end with a letter or digit, and not contain consecutive hyphens.
///
/// # Example
///
/// ```
/// use vaultprov::validation::validate_vault_name;
///
/// assert!(validate_vault_name("KeyVaultSample123").is_ok());
/// assert!(validate_vault_name("kv-prod-01").is_ok());
///
/// assert!(validate_vault_name("kv").is_err());
/// assert!(validate_vault_name("1vault").is_err());
/// assert!(validate_vault_name("kv--prod").is_err());
/// ```
pub fn validate_vault_name(name: &str) -> Result<()> {
    let len = name.len();
    if !(MIN_VAULT_NAME_LENGTH..=MAX_VAULT_NAME_LENGTH).contains(&len) {
        return Err(ProvisionError::InvalidName(format!(
            "vault name must be {} to {} characters long",
            MIN_VAULT_NAME_LENGTH, MAX_VAULT_NAME_LENGTH
        )));
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ProvisionError::InvalidName(
            "vault name may only contain letters, digits and hyphens".to_string(),
        ));
    }

    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(ProvisionError::InvalidName(
            "vault name must start with a letter".to_string(),
        ));
    }

    if name.ends_with('-') {
        return Err(ProvisionError::InvalidName(
            "vault name must end with a letter or digit".to_string(),
        ));
    }

    if name.contains("--") {
        return Err(ProvisionError::InvalidName(
            "vault name cannot contain consecutive hyphens".to_string(),
        ));
    }

    Ok(())
}

/// Validates every name and setting in a workflow configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.region.trim().is_empty() {
        return Err(ProvisionError::MissingConfig("region".to_string()));
    }
    if config.provider_namespace.trim().is_empty() {
        return Err(ProvisionError::MissingConfig("provider namespace".to_string()));
    }
    if config.list_limit == 0 {
        return Err(ProvisionError::InvalidConfig(
            "list limit must be at least 1".to_string(),
        ));
    }
    validate_resource_group_name(&config.resource_group)?;
    validate_vault_name(&config.vault_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BackendType;

    #[test]
    fn test_valid_group_names() {
        assert!(validate_resource_group_name("KeyVaultSample").is_ok());
        assert!(validate_resource_group_name("a").is_ok());
        assert!(validate_resource_group_name("rg.prod_1-(eu)").is_ok());
        assert!(validate_resource_group_name(&"g".repeat(90)).is_ok());
    }

    #[test]
    fn test_group_name_too_long() {
        let result = validate_resource_group_name(&"g".repeat(91));
        assert!(result.unwrap_err().to_string().contains("maximum length"));
    }

    #[test]
    fn test_group_name_invalid_characters() {
        for name in ["rg name", "rg/sub", "rg;rm", "rg?x", "rg#1"] {
            let result = validate_resource_group_name(name);
            assert!(result.is_err(), "Expected '{}' to fail validation", name);
        }
    }

    #[test]
    fn test_valid_vault_names() {
        assert!(validate_vault_name("KeyVaultSample123").is_ok());
        assert!(validate_vault_name("abc").is_ok());
        assert!(validate_vault_name(&format!("a{}", "b".repeat(23))).is_ok());
    }

    #[test]
    fn test_invalid_vault_names() {
        let cases = [
            ("ab", "characters long"),
            ("abcdefghijklmnopqrstuvwxy", "characters long"),
            ("kv_prod", "letters, digits and hyphens"),
            ("9vault", "start with a letter"),
            ("-vault", "start with a letter"),
            ("vault-", "end with a letter or digit"),
            ("kv--prod", "consecutive hyphens"),
        ];

        for (name, expected) in cases {
            let err = validate_vault_name(name).unwrap_err();
            assert!(
                err.to_string().contains(expected),
                "'{}' gave '{}'",
                name,
                err
            );
        }
    }

    #[test]
    fn test_validate_config() {
        assert!(validate_config(&Config::new(BackendType::Mock)).is_ok());

        let bad_region = Config::new(BackendType::Mock).with_region(" ");
        assert!(matches!(
            validate_config(&bad_region),
            Err(ProvisionError::MissingConfig(_))
        ));

        let no_listing = Config::new(BackendType::Mock).with_list_limit(0);
        assert!(matches!(
            validate_config(&no_listing),
            Err(ProvisionError::InvalidConfig(_))
        ));

        let bad_vault = Config::new(BackendType::Mock).with_vault_name("x");
        assert!(matches!(
            validate_config(&bad_vault),
            Err(ProvisionError::InvalidName(_))
        ));
    }
}
