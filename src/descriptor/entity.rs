//! Mapped entity types and the type-erased handles the mapper passes around.
//!
//! Every entity instance the mapper creates lives behind an [`EntityRc<T>`], so the same
//! instance can be shared between several parents and handed to the caller once mapping
//! returns. Internally the mapper works on [`Instance`], the type-erased form, and tags each
//! one with its [`EntityType`].

use std::{
    any::{Any, TypeId},
    fmt,
    hash::{Hash, Hasher},
    sync::{Arc, RwLock, Weak},
};

use crate::{
    descriptor::{TypeBuilder, TypeShape},
    value::short_type_name,
};

/// A reference-counted, shared mapped instance
pub type EntityRc<T> = Arc<RwLock<T>>;
/// A non-owning mapped instance reference, used for back-references
pub type EntityWeak<T> = Weak<RwLock<T>>;

/// A type the mapper can build from flat records.
///
/// The implementation lists every member that can be populated, optionally marks identifier
/// members, and registers how to construct an empty instance.
///
/// # Examples
///
/// ```rust
/// use rowgraph::{Entity, EntityRc, TypeBuilder};
///
/// #[derive(Default)]
/// struct Order {
///     order_id: i32,
///     total: f64,
/// }
///
/// #[derive(Default)]
/// struct Customer {
///     customer_id: i32,
///     first_name: String,
///     orders: Vec<EntityRc<Order>>,
/// }
///
/// impl Entity for Order {
///     fn describe(ty: &mut TypeBuilder<Self>) {
///         ty.default_constructor();
///         ty.field("OrderId", |o| &mut o.order_id);
///         ty.field("Total", |o| &mut o.total);
///     }
/// }
///
/// impl Entity for Customer {
///     fn describe(ty: &mut TypeBuilder<Self>) {
///         ty.default_constructor();
///         ty.field("CustomerId", |c| &mut c.customer_id);
///         ty.field("FirstName", |c| &mut c.first_name);
///         ty.collection("Orders", |c| &mut c.orders);
///     }
/// }
/// ```
pub trait Entity: Send + Sync + Sized + 'static {
    /// Register the members and constructor of `Self`
    fn describe(ty: &mut TypeBuilder<Self>);
}

/// Runtime identity of an [`Entity`] type.
///
/// Compares and hashes by the Rust [`TypeId`] only.
#[derive(Clone, Copy)]
pub struct EntityType {
    id: TypeId,
    name: &'static str,
    describe: fn() -> TypeShape,
}

impl EntityType {
    /// The runtime identity of `T`
    #[must_use]
    pub fn of<T: Entity>() -> Self {
        EntityType {
            id: TypeId::of::<T>(),
            name: short_type_name(std::any::type_name::<T>()),
            describe: TypeBuilder::<T>::collect,
        }
    }

    /// The Rust type identity
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The short type name, used by naming conventions and diagnostics
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true if this is the type `T`
    #[must_use]
    pub fn is<T: Entity>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    pub(crate) fn shape(&self) -> TypeShape {
        (self.describe)()
    }
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EntityType {}

impl Hash for EntityType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityType").field(&self.name).finish()
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A type-erased, shared entity instance.
///
/// Two `Instance`s are equal exactly when they point at the same allocation, which is the
/// identity notion the mapper uses to deduplicate collection members.
#[derive(Clone)]
pub struct Instance {
    inner: Arc<dyn Any + Send + Sync>,
    ty: EntityType,
}

impl Instance {
    /// Wrap a freshly constructed value
    #[must_use]
    pub fn new<T: Entity>(value: T) -> Self {
        Self::from_rc(Arc::new(RwLock::new(value)))
    }

    /// Wrap an existing shared instance
    #[must_use]
    pub fn from_rc<T: Entity>(rc: EntityRc<T>) -> Self {
        Instance {
            inner: rc,
            ty: EntityType::of::<T>(),
        }
    }

    /// The type of the wrapped instance
    #[must_use]
    pub fn entity_type(&self) -> EntityType {
        self.ty
    }

    /// Recover the typed shared handle
    #[must_use]
    pub fn downcast<T: Entity>(&self) -> Option<EntityRc<T>> {
        Arc::clone(&self.inner).downcast::<RwLock<T>>().ok()
    }

    /// Borrow the typed lock without touching the reference count
    #[must_use]
    pub fn downcast_ref<T: Entity>(&self) -> Option<&RwLock<T>> {
        self.inner.downcast_ref::<RwLock<T>>()
    }

    /// Returns true if both handles point at the same instance
    #[must_use]
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        self.address() == other.address()
    }

    /// Returns true if this handle points at the same instance as `rc`
    #[must_use]
    pub fn is_rc<T: Entity>(&self, rc: &EntityRc<T>) -> bool {
        self.address() == Arc::as_ptr(rc).cast::<()>() as usize
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.inner).cast::<()>() as usize
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Instance {}

impl Hash for Instance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance<{}>@{:#x}", self.ty.name, self.address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{Customer, Order};

    #[test]
    fn test_entity_type_identity() {
        let customer = EntityType::of::<Customer>();
        assert_eq!(customer, EntityType::of::<Customer>());
        assert_ne!(customer, EntityType::of::<Order>());
        assert_eq!(customer.name(), "Customer");
        assert!(customer.is::<Customer>());
        assert!(!customer.is::<Order>());
    }

    #[test]
    fn test_instance_identity_is_by_address() {
        let first = Instance::new(Customer::default());
        let second = Instance::new(Customer::default());

        assert_eq!(first, first.clone());
        assert_ne!(first, second);
        assert_eq!(first.entity_type(), EntityType::of::<Customer>());
    }

    #[test]
    fn test_instance_downcast() {
        let rc = Arc::new(RwLock::new(Customer {
            customer_id: 7,
            ..Customer::default()
        }));
        let instance = Instance::from_rc(Arc::clone(&rc));

        assert!(instance.is_rc(&rc));
        assert!(instance.downcast::<Order>().is_none());

        let back = instance.downcast::<Customer>().unwrap();
        assert!(Arc::ptr_eq(&back, &rc));
        assert_eq!(instance.downcast_ref::<Customer>().unwrap().read().unwrap().customer_id, 7);
    }
}
