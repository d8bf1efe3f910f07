use std::future::Future;

use crate::runtime::Deferred;

/// The handle a child component registers with its host.
///
/// Clones share one readiness signal; identity follows that signal.
#[derive(Clone, Debug, Default)]
pub struct ChildHandle {
    label: Option<String>,
    initialized: Deferred<()>,
}

impl ChildHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            initialized: Deferred::new(),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Reports the child as initialized. Returns `false` if it already was.
    pub fn mark_initialized(&self) -> bool {
        self.initialized.resolve(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.is_resolved()
    }

    /// Resolves once the child has initialized.
    pub fn initialized(&self) -> impl Future<Output = ()> + Send + 'static {
        let signal = self.initialized.clone();
        async move { signal.wait().await }
    }

    pub fn same(&self, other: &ChildHandle) -> bool {
        self.initialized.ptr_eq(&other.initialized)
    }
}
