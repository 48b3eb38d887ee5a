//! Scoped environment overrides around connection resolution.
//!
//! Some runtimes need a temporary change to thread-level state while a
//! connection is opened. A [`ResolveScope`] is entered right before the
//! connector runs and exited right after it, on success and on failure.

/// Hook applied around connection resolution.
pub trait ResolveScope: Send + Sync {
    /// Whether the override is needed on this platform. Checked once per
    /// resolution; when `false`, neither `enter` nor `exit` is called.
    fn is_required(&self) -> bool {
        true
    }

    /// Applies the override.
    fn enter(&self);

    /// Restores the state captured by `enter`.
    fn exit(&self);
}

/// Exits the scope on drop.
pub(crate) struct ScopeGuard<'a> {
    scope: Option<&'a dyn ResolveScope>,
}

impl<'a> ScopeGuard<'a> {
    pub(crate) fn enter(scope: Option<&'a dyn ResolveScope>) -> Self {
        let scope = scope.filter(|scope| scope.is_required());
        if let Some(scope) = scope {
            scope.enter();
        }
        Self { scope }
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if let Some(scope) = self.scope {
            scope.exit();
        }
    }
}
