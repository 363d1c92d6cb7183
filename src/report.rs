//! Human-readable item output.
//!
//! Every resource is printed in the same block:
//!
//! ```text
//! 	Name: KeyVaultSample
//! 	Id: /subscriptions/.../resourceGroups/KeyVaultSample
//! 	Location: westus
//! 	Tags: {}
//! 	Properties:
//! 		Provisioning State: Succeeded
//! ```
//!
//! The `Properties` lines only appear when the provider reported a
//! provisioning state.

use crate::model::{ResourceGroup, Tags, Vault};
use std::io::{self, Write};

/// A resource that can be printed by [`print_item`].
pub trait Printable {
    /// Resource name
    fn name(&self) -> &str;
    /// Resource id
    fn id(&self) -> &str;
    /// Region
    fn location(&self) -> &str;
    /// Tags
    fn tags(&self) -> &Tags;
    /// Provisioning state, if reported
    fn provisioning_state(&self) -> Option<&str>;
}

impl Printable for ResourceGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn tags(&self) -> &Tags {
        &self.tags
    }

    fn provisioning_state(&self) -> Option<&str> {
        ResourceGroup::provisioning_state(self)
    }
}

impl Printable for Vault {
    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn tags(&self) -> &Tags {
        &self.tags
    }

    fn provisioning_state(&self) -> Option<&str> {
        Vault::provisioning_state(self)
    }
}

/// Formats tags as `{key: value, ...}`.
pub fn format_tags(tags: &Tags) -> String {
    let pairs: Vec<String> = tags.iter().map(|(k, v)| format!("{k}: {v}")).collect();
    format!("{{{}}}", pairs.join(", "))
}

/// Writes one item block.
pub fn print_item<W: Write + ?Sized>(out: &mut W, item: &dyn Printable) -> io::Result<()> {
    writeln!(out, "\tName: {}", item.name())?;
    writeln!(out, "\tId: {}", item.id())?;
    writeln!(out, "\tLocation: {}", item.location())?;
    writeln!(out, "\tTags: {}", format_tags(item.tags()))?;
    if let Some(state) = item.provisioning_state() {
        writeln!(out, "\tProperties:")?;
        writeln!(out, "\t\tProvisioning State: {}", state)?;
    }
    Ok(())
}
