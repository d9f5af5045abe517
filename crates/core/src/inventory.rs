//! Inventory listing.

use serde::Serialize;

use crate::bridge::InvocationBridge;
use crate::error::{GovmError, GovmResult};

/// A VM name relative to the configured inventory root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VmName(String);

impl VmName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for VmName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Names from a raw `ls` listing.
///
/// Each line longer (in bytes) than `root` contributes the part after the first
/// `root.len()` bytes. Shorter or equal lines, which includes the root entry
/// itself and the trailing empty line, are dropped. The prefix is not checked
/// against `root`.
pub fn names_from_listing(output: &str, root: &str) -> Vec<VmName> {
    output
        .split('\n')
        .filter(|line| line.len() > root.len())
        .map(|line| VmName(String::from_utf8_lossy(&line.as_bytes()[root.len()..]).into_owned()))
        .collect()
}

/// List the VMs under `root`.
///
/// A non-zero exit from the tool is an [`GovmError::Invocation`] carrying what
/// it printed. No retries.
pub async fn list_vms(bridge: &InvocationBridge, root: &str) -> GovmResult<Vec<VmName>> {
    let args = ["ls".to_string(), root.to_string()];
    let captured = bridge.invoke(&args).await?;

    if !captured.success() {
        return Err(GovmError::invocation(captured.output, captured.exit_code));
    }

    tracing::debug!(root, output = %captured.output, "inventory listing");
    Ok(names_from_listing(&captured.output, root))
}
