//! Explicit mapping sessions with their own instance cache.

use crate::{
    descriptor::{Entity, EntityRc},
    identity::InstanceCache,
    mapper::{dynamic_record, dynamic_records, map_records, Mapper},
    FlatRecord, Result,
};

/// A mapping session: a [`Mapper`]'s configuration plus an instance cache owned by the caller.
///
/// Instances resolved in one call stay cached for later calls on the same session until the
/// session is cleared, a call passes `keep_cache = false`, or the session is dropped. Sessions
/// never share instances with each other or with the mapper's per-thread cache.
///
/// # Examples
///
/// ```rust
/// use rowgraph::{Entity, Mapper, TypeBuilder, Value};
///
/// #[derive(Default)]
/// struct Customer {
///     customer_id: i32,
///     first_name: String,
/// }
///
/// impl Entity for Customer {
///     fn describe(ty: &mut TypeBuilder<Self>) {
///         ty.default_constructor();
///         ty.field("CustomerId", |c| &mut c.customer_id);
///         ty.field("FirstName", |c| &mut c.first_name);
///     }
/// }
///
/// let mapper = Mapper::new();
/// let mut session = mapper.session();
///
/// let bob = session
///     .map_one::<Customer>([("CustomerId", Value::from(1)), ("FirstName", Value::from("Bob"))], true)?
///     .unwrap();
/// let again = session.map_one::<Customer>([("CustomerId", 1)], true)?.unwrap();
///
/// assert!(std::sync::Arc::ptr_eq(&bob, &again));
/// assert_eq!(again.read().unwrap().first_name, "Bob");
///
/// session.clear();
/// assert!(session.is_empty());
/// # Ok::<(), rowgraph::Error>(())
/// ```
#[derive(Debug)]
pub struct MappingSession<'m> {
    mapper: &'m Mapper,
    cache: InstanceCache,
}

impl<'m> MappingSession<'m> {
    pub(crate) fn new(mapper: &'m Mapper) -> Self {
        MappingSession {
            mapper,
            cache: InstanceCache::new(),
        }
    }

    /// Map `records` into distinct root instances in first-seen order.
    ///
    /// # Errors
    /// Returns the first conversion, assignment, format or activation error. When `keep_cache`
    /// is false the session cache is cleared after the call, whether it succeeded or not.
    pub fn map<T: Entity>(
        &mut self,
        records: impl IntoIterator<Item = impl Into<FlatRecord>>,
        keep_cache: bool,
    ) -> Result<Vec<EntityRc<T>>> {
        map_records(self.mapper, &mut self.cache, records, keep_cache)
    }

    /// Map a single record.
    ///
    /// # Errors
    /// See [`MappingSession::map`].
    pub fn map_one<T: Entity>(
        &mut self,
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
    /// Returns [`crate::Error::InvalidArgument`] for anything but `null` or a flat object.
    pub fn map_dynamic<T: Entity>(
        &mut self,
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
    /// Returns [`crate::Error::InvalidArgument`] for anything but `null` or an array of flat
    /// objects.
    pub fn map_dynamic_all<T: Entity>(
        &mut self,
        values: &serde_json::Value,
        keep_cache: bool,
    ) -> Result<Vec<EntityRc<T>>> {
        let records = dynamic_records(values)?;
        self.map::<T>(records, keep_cache)
    }

    /// Map a sequence of JSON objects.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if any element is not a flat object.
    pub fn map_dynamic_iter<'v, T: Entity>(
        &mut self,
        values: impl IntoIterator<Item = &'v serde_json::Value>,
        keep_cache: bool,
    ) -> Result<Vec<EntityRc<T>>> {
        let records = values
            .into_iter()
            .map(FlatRecord::from_json)
            .collect::<Result<Vec<_>>>()?;
        self.map::<T>(records, keep_cache)
    }

    /// Drop every cached instance
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Number of cached instances
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Returns true if nothing is cached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
