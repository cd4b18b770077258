//! Helpers the host authentication framework supplies per adapter.

/// Model-name resolution and debug logging, as provided by the host.
pub trait HostContext: Send + Sync {
    /// Map a generic model name (`user`, `session`, ...) to a collection name.
    fn model_name(&self, model: &str, use_plural: bool) -> String {
        if use_plural {
            format!("{model}s")
        } else {
            model.to_string()
        }
    }

    /// Emit one diagnostic line. Only called when `debug_logs` is enabled.
    fn debug_log(&self, message: &str) {
        tracing::debug!(target: "pbauth_adapter", "{message}");
    }
}

/// Host context using the default naming and `tracing` output
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHostContext;

impl HostContext for DefaultHostContext {}
