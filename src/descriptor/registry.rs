//! Concurrent cache of built type descriptors.

use std::{any::TypeId, sync::Arc};

use dashmap::{mapref::entry::Entry, DashMap};

use crate::{
    descriptor::{EntityType, TypeDescriptor},
    Configuration,
};

/// Memoizes one [`TypeDescriptor`] per entity type.
///
/// Lookups are lock-free for readers; the first lookup of a type builds its descriptor outside
/// of any map guard, and if two threads race, the first insert wins and both observe the same
/// descriptor afterwards. A descriptor built against an older [`Configuration::generation`]
/// is rebuilt on its next lookup.
#[derive(Default)]
pub struct TypeRegistry {
    descriptors: DashMap<TypeId, Arc<TypeDescriptor>>,
}

impl TypeRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        TypeRegistry::default()
    }

    /// Get the descriptor of `ty`, building it against `config` on first use.
    pub fn descriptor(&self, ty: EntityType, config: &Configuration) -> Arc<TypeDescriptor> {
        if let Some(existing) = self.descriptors.get(&ty.id()) {
            if existing.generation() == config.generation() {
                return Arc::clone(existing.value());
            }
        }

        let built = Arc::new(TypeDescriptor::build(ty, config));
        match self.descriptors.entry(ty.id()) {
            Entry::Occupied(mut entry) => {
                if entry.get().generation() < built.generation() {
                    entry.insert(Arc::clone(&built));
                }
                Arc::clone(entry.get())
            }
            Entry::Vacant(entry) => Arc::clone(entry.insert(built).value()),
        }
    }

    /// Drop the memoized descriptor of one type
    pub fn invalidate(&self, ty: TypeId) {
        self.descriptors.remove(&ty);
    }

    /// Drop all memoized descriptors
    pub fn clear(&self) {
        self.descriptors.clear();
    }

    /// Number of memoized descriptors
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns true if nothing is memoized
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test::{Customer, Order},
        Entity,
    };

    fn of<T: Entity>() -> EntityType {
        EntityType::of::<T>()
    }

    #[test]
    fn test_descriptor_is_memoized() {
        let registry = TypeRegistry::new();
        let config = Configuration::default();

        let first = registry.descriptor(of::<Customer>(), &config);
        let second = registry.descriptor(of::<Customer>(), &config);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);

        registry.descriptor(of::<Order>(), &config);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_invalidate_rebuilds() {
        let registry = TypeRegistry::new();
        let config = Configuration::default();

        let first = registry.descriptor(of::<Order>(), &config);
        registry.invalidate(of::<Order>().id());
        let rebuilt = registry.descriptor(of::<Order>(), &config);
        assert!(!Arc::ptr_eq(&first, &rebuilt));
        assert_eq!(rebuilt.identifiers(), ["OrderId"]);
    }

    #[test]
    fn test_configuration_change_rebuilds_stale_descriptor() {
        let registry = TypeRegistry::new();
        let config = Configuration::default();

        let first = registry.descriptor(of::<Order>(), &config);
        assert_eq!(first.identifiers(), ["OrderId"]);

        config.add_identifiers::<Order>(["Total"]);
        let rebuilt = registry.descriptor(of::<Order>(), &config);
        assert!(!Arc::ptr_eq(&first, &rebuilt));
        assert_eq!(rebuilt.identifiers(), ["Total"]);
        assert!(Arc::ptr_eq(&rebuilt, &registry.descriptor(of::<Order>(), &config)));

        config.add_identifier_convention(|_| "Total".to_string());
        assert!(!Arc::ptr_eq(&rebuilt, &registry.descriptor(of::<Order>(), &config)));
    }

    #[test]
    fn test_clear() {
        let registry = TypeRegistry::new();
        registry.descriptor(of::<Customer>(), &Configuration::default());
        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_concurrent_first_use_yields_one_descriptor() {
        use rayon::prelude::*;

        let registry = TypeRegistry::new();
        let config = Configuration::default();
        let built: Vec<_> = (0..64)
            .into_par_iter()
            .map(|_| registry.descriptor(of::<Customer>(), &config))
            .collect();

        assert!(built.iter().all(|d| Arc::ptr_eq(d, &built[0])));
    }
}
