//! Navigation boundary.

/// Fire-and-forget navigation, assumed to unmount the protected subtree.
pub trait Navigator: Send + Sync {
    fn navigate_to(&self, path: &str);
}
