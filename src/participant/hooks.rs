//! Lifecycle hooks supplied by a concrete resource kind.

/// How a resource kind creates, completes, and disposes of its handles.
///
/// The participant calls these while it holds the branch entry, so a hook
/// must not call back into the participant or its branch table.
pub trait ResourceLifecycleHooks<R>: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Open a new handle. Failures surface as `XAER_RMFAIL`.
    fn create_resource(&self) -> Result<R, Self::Error>;

    /// Phase one. Failures surface as `XAER_RMERR`.
    fn prepare(&self, resource: &mut R) -> Result<(), Self::Error>;

    fn commit(&self, resource: &mut R) -> Result<(), Self::Error>;

    fn rollback(&self, resource: &mut R) -> Result<(), Self::Error>;

    fn close(&self, resource: &mut R) -> Result<(), Self::Error>;

    /// Whether a just-prepared resource did no work worth committing.
    fn is_read_only(&self, _resource: &R) -> bool {
        false
    }
}
