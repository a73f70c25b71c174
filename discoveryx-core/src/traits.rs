// Core traits for DiscoveryX

use std::sync::Arc;

/// Supplies instances of `T` to the container.
///
/// The container calls [`Provider::get`] once per container lifetime and caches
/// the result, so every resolution of the bound key shares one instance.
pub trait Provider<T: ?Sized>: Send + Sync {
    /// Returns the provided instance
    fn get(&self) -> Arc<T>;
}

impl<T: ?Sized + Send + Sync> Provider<T> for Arc<T> {
    fn get(&self) -> Arc<T> {
        Arc::clone(self)
    }
}
