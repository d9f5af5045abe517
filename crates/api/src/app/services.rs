use std::sync::Arc;

use govm_core::{GovcTool, InvocationBridge, OutputChannel, Settings, Tool};

/// State shared by all handlers. Immutable after startup.
pub struct AppServices {
    pub bridge: InvocationBridge,
    pub vm_path: String,
}

impl AppServices {
    pub fn new(tool: Arc<dyn Tool>, vm_path: impl Into<String>) -> Self {
        Self {
            bridge: InvocationBridge::new(tool, Arc::new(OutputChannel::stdout())),
            vm_path: vm_path.into(),
        }
    }

    /// Production wiring: `govc` with the resolved connection settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Arc::new(GovcTool::from_settings(settings)),
            settings.vm_path.clone(),
        )
    }
}
