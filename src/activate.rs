//! Instance activation: creating empty entity instances before population.
//!
//! Configured [`TypeActivator`]s get the first chance, lowest [`TypeActivator::order`] first.
//! When none claims a type, the constructor the type registered in [`crate::Entity::describe`]
//! is used. A type without either can not be mapped.

use std::{fmt, sync::Arc};

use crate::{
    descriptor::{Entity, EntityType, Instance, TypeDescriptor},
    Configuration, Error, Result,
};

/// Creates instances of entity types.
pub trait TypeActivator: Send + Sync {
    /// Returns true if this activator creates instances of `ty`
    fn can_create(&self, ty: &EntityType) -> bool;

    /// Create an empty instance of `ty`.
    ///
    /// # Errors
    /// Errors are propagated unchanged and abort the mapping call.
    fn create(&self, ty: &EntityType) -> Result<Instance>;

    /// Position among the configured activators, lowest first
    fn order(&self) -> i32;
}

/// An activator creating one entity type through a closure.
///
/// ```rust
/// use rowgraph::{activate::FnActivator, Entity, Mapper, TypeBuilder};
///
/// struct Account {
///     id: i32,
///     currency: String,
/// }
///
/// impl Entity for Account {
///     fn describe(ty: &mut TypeBuilder<Self>) {
///         ty.field("Id", |a| &mut a.id);
///         ty.field("Currency", |a| &mut a.currency);
///     }
/// }
///
/// let mapper = Mapper::new();
/// mapper.add_activator(FnActivator::new(10, || Account { id: 0, currency: "EUR".into() }));
///
/// let account = mapper.map_one::<Account>([("Id", 1)], false)?.unwrap();
/// assert_eq!(account.read().unwrap().currency, "EUR");
/// # Ok::<(), rowgraph::Error>(())
/// ```
pub struct FnActivator<T> {
    order: i32,
    create: Arc<dyn Fn() -> T + Send + Sync>,
}

impl<T: Entity> FnActivator<T> {
    /// Activate `T` through `create` at position `order`
    pub fn new<F>(order: i32, create: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        FnActivator {
            order,
            create: Arc::new(create),
        }
    }
}

impl<T: Entity> TypeActivator for FnActivator<T> {
    fn can_create(&self, ty: &EntityType) -> bool {
        ty.is::<T>()
    }

    fn create(&self, _ty: &EntityType) -> Result<Instance> {
        Ok(Instance::new((self.create)()))
    }

    fn order(&self) -> i32 {
        self.order
    }
}

impl<T> fmt::Debug for FnActivator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnActivator")
            .field("type", &std::any::type_name::<T>())
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

/// Create an empty instance of the described type.
///
/// # Errors
/// Returns [`Error::Activation`] if no activator or constructor is available, or if an
/// activator produced an instance of another type.
pub(crate) fn activate(config: &Configuration, descriptor: &TypeDescriptor) -> Result<Instance> {
    let ty = descriptor.entity_type();

    if let Some(activator) = config.activator_for(&ty) {
        let instance = activator.create(&ty)?;
        if instance.entity_type() != ty {
            return Err(Error::Activation {
                type_name: ty.name().to_string(),
                message: format!("activator produced an instance of {}", instance.entity_type()),
            });
        }
        return Ok(instance);
    }

    descriptor.construct().ok_or_else(|| Error::Activation {
        type_name: ty.name().to_string(),
        message: "no activator claims the type and it registers no constructor".to_string(),
    })
}
