//! Identity resolution and the per-session instance cache.
//!
//! Every record, at every nesting level, is reduced to an [`IdentityKey`]: the target type,
//! the values of the type's identifier members in identifier order, and the parent instance
//! the record hangs off. Records with equal keys resolve to the same instance, so repeated rows
//! of a join collapse into one entity per distinct identity. Integral identifier values compare
//! by number regardless of width; values of other types (including numeric strings) compare as
//! they are.
//!
//! # Anonymous Keys
//!
//! A type without identifiers, or a record carrying none of the identifier keys, can not be
//! identified. Such records get a key made unique by a process-wide counter and always produce
//! a new instance. Anonymous keys are never stored in the cache since no later record can hit
//! them.
//!
//! # Examples
//!
//! ```rust
//! use rowgraph::{Configuration, Entity, EntityType, FlatRecord, InstanceCache, TypeBuilder,
//!     TypeRegistry, Value};
//!
//! #[derive(Default)]
//! struct Tag {
//!     id: i32,
//! }
//!
//! impl Entity for Tag {
//!     fn describe(ty: &mut TypeBuilder<Self>) {
//!         ty.default_constructor();
//!         ty.field("Id", |t| &mut t.id);
//!     }
//! }
//!
//! let config = Configuration::default();
//! let registry = TypeRegistry::new();
//! let descriptor = registry.descriptor(EntityType::of::<Tag>(), &config);
//! let mut cache = InstanceCache::new();
//!
//! let record: FlatRecord = [("Id", Value::from(1))].into_iter().collect();
//! let first = cache.resolve(&config, &descriptor, &record, None)?;
//! let second = cache.resolve(&config, &descriptor, &record, None)?;
//!
//! assert!(first.is_new);
//! assert!(!second.is_new);
//! assert_eq!(first.instance, second.instance);
//! # Ok::<(), rowgraph::Error>(())
//! ```

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

use tracing::trace;

use crate::{
    activate::activate,
    descriptor::{EntityType, Instance, TypeDescriptor},
    Configuration, FlatRecord, Result, Value,
};

static NEXT_ANONYMOUS: AtomicU64 = AtomicU64::new(1);

/// One identifier slot of an [`IdentityKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
    /// The record carried the identifier key (possibly with a `Null` value)
    Present(Value),
    /// The record did not carry the identifier key
    Missing,
}

/// The identifying component of an [`IdentityKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyIdentity {
    /// Identifier values in identifier order
    Values(Vec<KeyPart>),
    /// A unique stand-in for records that can not be identified
    Anonymous(u64),
}

/// Structural identity of one record at one nesting level.
///
/// Equality compares the type, every identifier value, and the parent instance by address;
/// hashing only buckets keys and never stands in for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    ty: EntityType,
    identity: KeyIdentity,
    parent: Option<Instance>,
}

impl IdentityKey {
    /// Compute the key of `record` for the described type under `parent`
    #[must_use]
    pub fn for_record(
        descriptor: &TypeDescriptor,
        record: &FlatRecord,
        parent: Option<&Instance>,
    ) -> Self {
        let parts: Vec<KeyPart> = descriptor
            .identifiers()
            .iter()
            .map(|name| {
                record
                    .get(name)
                    .map_or(KeyPart::Missing, |value| KeyPart::Present(key_value(value)))
            })
            .collect();

        let identity = if parts.iter().all(|part| *part == KeyPart::Missing) {
            KeyIdentity::Anonymous(NEXT_ANONYMOUS.fetch_add(1, Ordering::Relaxed))
        } else {
            KeyIdentity::Values(parts)
        };

        IdentityKey {
            ty: descriptor.entity_type(),
            identity,
            parent: parent.cloned(),
        }
    }

    /// The target type
    #[must_use]
    pub fn entity_type(&self) -> EntityType {
        self.ty
    }

    /// The identifying component
    #[must_use]
    pub fn identity(&self) -> &KeyIdentity {
        &self.identity
    }

    /// The parent instance, `None` for roots
    #[must_use]
    pub fn parent(&self) -> Option<&Instance> {
        self.parent.as_ref()
    }

    /// Returns true if the record could not be identified
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self.identity, KeyIdentity::Anonymous(_))
    }
}

/// Integers of any width identify alike: `1i32` and `1i64` name the same entity.
fn key_value(value: &Value) -> Value {
    let integral = value.scalar_type().is_some_and(|ty| ty.is_integral());
    match value.as_integer().filter(|_| integral).map(i64::try_from) {
        Some(Ok(number)) => Value::I8(number),
        _ => value.clone(),
    }
}

/// The outcome of resolving a record against the cache.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// True if the instance was created by this resolution
    pub is_new: bool,
    /// The reused or newly created instance
    pub instance: Instance,
    /// The key the record resolved under
    pub key: IdentityKey,
}

/// Identity key to instance map of one mapping session.
#[derive(Debug, Default)]
pub struct InstanceCache {
    instances: HashMap<IdentityKey, Instance>,
}

impl InstanceCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        InstanceCache::default()
    }

    /// Resolve `record` for the described type: reuse the cached instance for its key, or
    /// activate and cache a new one.
    ///
    /// # Errors
    /// Returns [`crate::Error::Activation`] if a new instance is needed but can not be created.
    pub fn resolve(
        &mut self,
        config: &Configuration,
        descriptor: &TypeDescriptor,
        record: &FlatRecord,
        parent: Option<&Instance>,
    ) -> Result<Resolved> {
        let key = IdentityKey::for_record(descriptor, record, parent);
        self.resolve_key(config, descriptor, key)
    }

    /// Resolve an already computed key.
    ///
    /// # Errors
    /// Returns [`crate::Error::Activation`] if a new instance is needed but can not be created.
    pub fn resolve_key(
        &mut self,
        config: &Configuration,
        descriptor: &TypeDescriptor,
        key: IdentityKey,
    ) -> Result<Resolved> {
        if let Some(existing) = self.instances.get(&key) {
            trace!(ty = descriptor.name(), identity = ?key.identity, "instance cache hit");
            return Ok(Resolved {
                is_new: false,
                instance: existing.clone(),
                key,
            });
        }

        let instance = activate(config, descriptor)?;
        trace!(ty = descriptor.name(), identity = ?key.identity, "instance cache miss");
        if !key.is_anonymous() {
            self.instances.insert(key.clone(), instance.clone());
        }

        Ok(Resolved {
            is_new: true,
            instance,
            key,
        })
    }

    /// The cached instance for `key`
    #[must_use]
    pub fn get(&self, key: &IdentityKey) -> Option<&Instance> {
        self.instances.get(key)
    }

    /// Number of cached instances
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns true if nothing is cached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Drop every cached instance
    pub fn clear(&mut self) {
        self.instances.clear();
    }

    /// Take over the entries of `other` whose keys are not cached here
    pub fn merge(&mut self, other: InstanceCache) {
        for (key, instance) in other.instances {
            self.instances.entry(key).or_insert(instance);
        }
    }
}
