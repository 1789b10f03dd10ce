//! Top-level mapping of flat records into object graphs.
//!
//! A [`Mapper`] owns a [`Configuration`] and a [`TypeRegistry`] and maps sequences of
//! [`FlatRecord`]s into distinct root instances. Each call resolves every record's root identity,
//! populates the root (and, recursively, everything nested below it), and returns the distinct
//! roots in the order they were first seen.
//!
//! # Instance Caches
//!
//! Resolved instances live in an [`InstanceCache`]. The mapping methods on [`Mapper`] use one
//! cache per mapper and thread, so calls on different threads never observe each other's
//! instances. A [`MappingSession`] owns its cache explicitly and is the better fit when the
//! cache's scope should follow a unit of work rather than a thread.
//!
//! Passing `keep_cache = false` clears the cache once the call finishes (successfully or not).
//! With `keep_cache = true` later calls continue to top up the same instances.
//!
//! # Key Components
//!
//! - [`Mapper`] - Configuration, descriptor registry and the per-thread cache
//! - [`MappingSession`] - A mapping scope with a caller-owned cache
//!
//! # Examples
//!
//! ```rust
//! use rowgraph::{Entity, EntityRc, EntityWeak, Mapper, TypeBuilder, Value};
//!
//! #[derive(Default)]
//! struct Customer {
//!     customer_id: i32,
//!     first_name: String,
//!     orders: Vec<EntityRc<Order>>,
//! }
//!
//! #[derive(Default)]
//! struct Order {
//!     order_id: i32,
//!     customer: Option<EntityWeak<Customer>>,
//! }
//!
//! impl Entity for Customer {
//!     fn describe(ty: &mut TypeBuilder<Self>) {
//!         ty.default_constructor();
//!         ty.field("CustomerId", |c| &mut c.customer_id);
//!         ty.field("FirstName", |c| &mut c.first_name);
//!         ty.collection("Orders", |c| &mut c.orders);
//!     }
//! }
//!
//! impl Entity for Order {
//!     fn describe(ty: &mut TypeBuilder<Self>) {
//!         ty.default_constructor();
//!         ty.field("OrderId", |o| &mut o.order_id);
//!         ty.reference("Customer", |o| &mut o.customer);
//!     }
//! }
//!
//! let rows = vec![
//!     vec![("CustomerId", Value::from(1)), ("FirstName", Value::from("Bob")), ("Orders_OrderId", Value::from(10))],
//!     vec![("CustomerId", Value::from(1)), ("FirstName", Value::from("Bob")), ("Orders_OrderId", Value::from(11))],
//! ];
//!
//! let mapper = Mapper::new();
//! let customers = mapper.map::<Customer>(rows, false)?;
//!
//! assert_eq!(customers.len(), 1);
//! let customer = customers[0].read().unwrap();
//! assert_eq!(customer.orders.len(), 2);
//! # Ok::<(), rowgraph::Error>(())
//! ```

mod session;

pub use session::MappingSession;

use std::{
    any::TypeId,
    cell::RefCell,
    collections::HashMap,
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::{
    activate::TypeActivator,
    convert::TypeConverter,
    descriptor::{Entity, EntityRc, EntityType, Instance, TypeDescriptor, TypeRegistry},
    identity::{IdentityKey, InstanceCache},
    populate::Populator,
    value::json_kind,
    Configuration, Error, FlatRecord, Result,
};

static NEXT_MAPPER: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_CACHES: RefCell<HashMap<u64, InstanceCache>> = RefCell::new(HashMap::new());
}

/// Maps flat records into object graphs.
///
/// `Mapper` is `Send + Sync`; configuration may be extended and mapping calls made from any
/// thread. Every thread gets its own instance cache per mapper.
pub struct Mapper {
    id: u64,
    config: Configuration,
    registry: TypeRegistry,
}

impl Default for Mapper {
    fn default() -> Self {
        Mapper::new()
    }
}

impl Mapper {
    /// Create a mapper with the default [`Configuration`]
    #[must_use]
    pub fn new() -> Self {
        Mapper::with_config(Configuration::default())
    }

    /// Create a mapper with a custom configuration
    #[must_use]
    pub fn with_config(config: Configuration) -> Self {
        Mapper {
            id: NEXT_MAPPER.fetch_add(1, Ordering::Relaxed),
            config,
            registry: TypeRegistry::new(),
        }
    }

    /// The mapper's configuration
    #[must_use]
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// The mapper's descriptor registry
    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// The descriptor of `T`, built on first use
    #[must_use]
    pub fn descriptor<T: Entity>(&self) -> Arc<TypeDescriptor> {
        self.registry
            .descriptor(EntityType::of::<T>(), &self.config)
    }

    /// Set `T`'s identifier to a single member, replacing discovery.
    pub fn add_identifier<T: Entity>(&self, name: impl Into<String>) {
        self.config.add_identifier::<T>(name);
        self.registry.invalidate(TypeId::of::<T>());
    }

    /// Set `T`'s identifiers, replacing discovery. Several names form a composite identity.
    pub fn add_identifiers<T: Entity>(&self, names: impl IntoIterator<Item = impl Into<String>>) {
        self.config.add_identifiers::<T>(names);
        self.registry.invalidate(TypeId::of::<T>());
    }

    /// Add an identifier naming convention. Memoized descriptors are rebuilt on next use.
    pub fn add_identifier_convention<F>(&self, convention: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.config.add_identifier_convention(convention);
        self.registry.clear();
    }

    /// Register a value converter
    pub fn add_converter(&self, converter: impl TypeConverter + 'static) {
        self.config.add_converter(converter);
    }

    /// Register an instance activator
    pub fn add_activator(&self, activator: impl TypeActivator + 'static) {
        self.config.add_activator(activator);
    }

    /// Open a mapping session with its own, initially empty instance cache
    #[must_use]
    pub fn session(&self) -> MappingSession<'_> {
        MappingSession::new(self)
    }

    /// Drop this thread's cached instances
    pub fn clear_instance_cache(&self) {
        THREAD_CACHES.with(|caches| {
            caches.borrow_mut().remove(&self.id);
        });
        debug!(mapper = self.id, "instance cache cleared");
    }

    /// Drop memoized descriptors and this thread's cached instances.
    ///
    /// Identifier overrides, conventions, converters and activators are configuration and stay.
    pub fn clear_all_caches(&self) {
        self.registry.clear();
        self.clear_instance_cache();
    }

    /// Number of instances in this thread's cache
    #[must_use]
    pub fn cached_instances(&self) -> usize {
        THREAD_CACHES.with(|caches| caches.borrow().get(&self.id).map_or(0, InstanceCache::len))
    }

    /// Map `records` into distinct root instances of `T` in first-seen order.
    ///
    /// ## Arguments
    /// * `records` - Anything convertible into flat records: pair arrays, vectors of pairs,
    ///   maps, or prepared [`FlatRecord`]s
    /// * `keep_cache` - Keep this thread's instance cache after the call
    ///
    /// # Errors
    /// Returns the first conversion, assignment, format or activation error. No partial result
    /// is returned.
    pub fn map<T: Entity>(
        &self,
        records: impl IntoIterator<Item = impl Into<FlatRecord>>,
        keep_cache: bool,
    ) -> Result<Vec<EntityRc<T>>> {
        self.with_thread_cache(|cache| map_records(self, cache, records, keep_cache))
    }

    /// Map a single record; `None` only if nothing was produced.
    ///
    /// # Errors
    /// See [`Mapper::map`].
    pub fn map_one<T: Entity>(
        &self,
        record: impl Into<FlatRecord>,
        keep_cache: bool,
    ) -> Result<Option<EntityRc<T>>> {
        Ok(self
            .map::<T>(std::iter::once(record.into()), keep_cache)?
            .into_iter()
            .next())
    }

    /// Map a JSON object; `null` yields `None`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for anything but `null` or a flat object, plus the
    /// errors of [`Mapper::map`].
    pub fn map_dynamic<T: Entity>(
        &self,
        value: &serde_json::Value,
        keep_cache: bool,
    ) -> Result<Option<EntityRc<T>>> {
        match dynamic_record(value)? {
            Some(record) => self.map_one::<T>(record, keep_cache),
            None => Ok(None),
        }
    }

    /// Map a JSON array of objects; `null` yields an empty result.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for anything but `null` or an array of flat objects,
    /// plus the errors of [`Mapper::map`].
    pub fn map_dynamic_all<T: Entity>(
        &self,
        values: &serde_json::Value,
        keep_cache: bool,
    ) -> Result<Vec<EntityRc<T>>> {
        let records = dynamic_records(values)?;
        self.map::<T>(records, keep_cache)
    }

    /// Map a sequence of JSON objects.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if any element is not a flat object.
    pub fn map_dynamic_iter<'v, T: Entity>(
        &self,
        values: impl IntoIterator<Item = &'v serde_json::Value>,
        keep_cache: bool,
    ) -> Result<Vec<EntityRc<T>>> {
        let records = values
            .into_iter()
            .map(FlatRecord::from_json)
            .collect::<Result<Vec<_>>>()?;
        self.map::<T>(records, keep_cache)
    }

    /// Run `f` with this thread's cache taken out of thread-local storage, so nothing is
    /// borrowed across user callbacks (activators, converters) that may map again.
    ///
    /// Instances kept by such nested calls are merged back into the outer cache; on a key
    /// present in both, the outer call's instance stays.
    fn with_thread_cache<R>(&self, f: impl FnOnce(&mut InstanceCache) -> R) -> R {
        let mut cache = THREAD_CACHES
            .with(|caches| caches.borrow_mut().remove(&self.id))
            .unwrap_or_default();

        let result = f(&mut cache);

        THREAD_CACHES.with(|caches| {
            let mut caches = caches.borrow_mut();
            if let Some(nested) = caches.remove(&self.id) {
                cache.merge(nested);
            }
            if !cache.is_empty() {
                caches.insert(self.id, cache);
            }
        });
        result
    }
}

impl Drop for Mapper {
    fn drop(&mut self) {
        let _ = THREAD_CACHES.try_with(|caches| {
            if let Ok(mut caches) = caches.try_borrow_mut() {
                caches.remove(&self.id);
            }
        });
    }
}

impl fmt::Debug for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("descriptors", &self.registry.len())
            .finish()
    }
}

/// Map `records` through `cache`, clearing it afterwards unless `keep_cache` is set.
pub(crate) fn map_records<T: Entity>(
    mapper: &Mapper,
    cache: &mut InstanceCache,
    records: impl IntoIterator<Item = impl Into<FlatRecord>>,
    keep_cache: bool,
) -> Result<Vec<EntityRc<T>>> {
    let ty = EntityType::of::<T>();
    let roots = collect_roots(mapper, cache, ty, records);

    if !keep_cache {
        debug!(ty = ty.name(), cached = cache.len(), "clearing instance cache");
        cache.clear();
    }

    roots?
        .into_iter()
        .map(|instance| {
            instance.downcast::<T>().ok_or_else(|| Error::Activation {
                type_name: ty.name().to_string(),
                message: format!("resolved an instance of {}", instance.entity_type()),
            })
        })
        .collect()
}

fn collect_roots(
    mapper: &Mapper,
    cache: &mut InstanceCache,
    ty: EntityType,
    records: impl IntoIterator<Item = impl Into<FlatRecord>>,
) -> Result<Vec<Instance>> {
    let descriptor = mapper.registry.descriptor(ty, &mapper.config);
    let mut roots: IndexMap<IdentityKey, Instance> = IndexMap::new();
    let mut count = 0usize;

    for record in records {
        let record = record.into();
        count += 1;

        let resolved = cache.resolve(&mapper.config, &descriptor, &record, None)?;
        let root = roots
            .entry(resolved.key)
            .or_insert(resolved.instance)
            .clone();

        Populator::new(&mapper.config, &mapper.registry, cache).populate(&record, &root, None)?;
    }

    debug!(
        ty = ty.name(),
        records = count,
        distinct = roots.len(),
        "mapped records"
    );
    Ok(roots.into_values().collect())
}

/// View a JSON value as one record; `null` is no record.
pub(crate) fn dynamic_record(value: &serde_json::Value) -> Result<Option<FlatRecord>> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Object(_) => FlatRecord::from_json(value).map(Some),
        other => {
            warn!(kind = json_kind(other), "rejected dynamic input");
            Err(Error::InvalidArgument(format!(
                "Expected a JSON object, found {}",
                json_kind(other)
            )))
        }
    }
}

/// View a JSON value as a sequence of records; `null` is an empty sequence.
pub(crate) fn dynamic_records(values: &serde_json::Value) -> Result<Vec<FlatRecord>> {
    match values {
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::Array(items) => items.iter().map(FlatRecord::from_json).collect(),
        other => {
            warn!(kind = json_kind(other), "rejected dynamic input");
            Err(Error::InvalidArgument(format!(
                "Expected a JSON array of objects, found {}",
                json_kind(other)
            )))
        }
    }
}
