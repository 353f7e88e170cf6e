//! Resource kind → branch table directory.

use std::any::Any;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use tracing::debug;

use crate::branch::BranchTable;
use crate::xa::{XaError, XaResult};

/// Hands out one shared [`BranchTable`] per resource kind.
///
/// Tables are created lazily on first lookup and live as long as the
/// registry. A kind is bound to the resource type it was first looked up with.
#[derive(Default)]
pub struct ResourceRegistry {
    tables: DashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry.
    pub fn global() -> &'static ResourceRegistry {
        static GLOBAL: OnceLock<ResourceRegistry> = OnceLock::new();
        GLOBAL.get_or_init(ResourceRegistry::new)
    }

    /// The table for `kind`, creating it if needed.
    pub fn table<R>(&self, kind: &str) -> XaResult<Arc<BranchTable<R>>>
    where
        R: Send + Sync + 'static,
    {
        let table = self
            .tables
            .entry(kind.to_string())
            .or_insert_with(|| {
                debug!(kind, "creating branch table");
                Arc::new(BranchTable::<R>::new(kind)) as Arc<dyn Any + Send + Sync>
            })
            .clone();

        table.downcast::<BranchTable<R>>().map_err(|_| {
            XaError::Inval(format!(
                "resource kind {} is registered with a different resource type",
                kind
            ))
        })
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.tables.contains_key(kind)
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.tables.iter().map(|e| e.key().clone()).collect();
        kinds.sort();
        kinds
    }
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_kind_same_table() {
        let registry = ResourceRegistry::new();
        let a = registry.table::<String>("buffer").unwrap();
        let b = registry.table::<String>("buffer").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.kind(), "buffer");

        let c = registry.table::<String>("session").unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(registry.kinds(), vec!["buffer", "session"]);
    }

    #[test]
    fn test_kind_type_mismatch() {
        let registry = ResourceRegistry::new();
        registry.table::<String>("buffer").unwrap();
        let err = registry.table::<u64>("buffer").unwrap_err();
        assert!(matches!(err, XaError::Inval(_)));
    }

    #[test]
    fn test_registries_are_independent() {
        let a = ResourceRegistry::new();
        let b = ResourceRegistry::new();
        let ta = a.table::<u8>("k").unwrap();
        let tb = b.table::<u8>("k").unwrap();
        assert!(!Arc::ptr_eq(&ta, &tb));
        assert!(a.contains("k"));
    }

    #[test]
    fn test_global() {
        let t1 = ResourceRegistry::global()
            .table::<u16>("registry-global-test")
            .unwrap();
        let t2 = ResourceRegistry::global()
            .table::<u16>("registry-global-test")
            .unwrap();
        assert!(Arc::ptr_eq(&t1, &t2));
    }
}
