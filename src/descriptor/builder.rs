//! Fluent registration of an entity's members and constructor.
//!
//! [`TypeBuilder`] is handed to [`crate::Entity::describe`]. Each registration call turns a
//! typed lens or accessor pair into a [`MemberHandle`] with type-erased operations, so the
//! populator can work with any entity through [`Instance`] alone.
//!
//! # Example
//!
//! ```rust
//! use rowgraph::{Entity, EntityRc, EntityWeak, TypeBuilder};
//!
//! #[derive(Default)]
//! struct Employee {
//!     badge: u32,
//!     name: String,
//!     tags: Vec<String>,
//!     manager: Option<EntityWeak<Employee>>,
//!     reports: Vec<EntityRc<Employee>>,
//! }
//!
//! impl Entity for Employee {
//!     fn describe(ty: &mut TypeBuilder<Self>) {
//!         ty.default_constructor();
//!         ty.field("Badge", |e| &mut e.badge).identifier();
//!         ty.property("Name", |e| e.name.clone(), |e, name| e.name = name);
//!         ty.primitives("Tags", |e| &mut e.tags);
//!         ty.reference("Manager", |e| &mut e.manager);
//!         ty.collection("Reports", |e| &mut e.reports);
//!     }
//! }
//! ```

use std::{
    fmt,
    marker::PhantomData,
    sync::{Arc, RwLock},
};

use crate::{
    descriptor::{
        member::{instance_context, value_context, MemberOps},
        Entity, EntityRc, EntityType, EntityWeak, Instance, MemberAccess, MemberHandle,
        MemberKind,
    },
    Error, Result, ScalarValue, Value,
};

pub(crate) type Constructor = Box<dyn Fn() -> Instance + Send + Sync>;

/// The members and constructor collected from one [`Entity::describe`] call
pub(crate) struct TypeShape {
    pub(crate) members: Vec<MemberHandle>,
    pub(crate) constructor: Option<Constructor>,
}

/// Collects the members and constructor of the entity `T`.
pub struct TypeBuilder<T> {
    members: Vec<MemberHandle>,
    constructor: Option<Constructor>,
    _marker: PhantomData<fn() -> T>,
}

/// Handle to the member registered last, used to mark it as an identifier
pub struct MemberBuilder<'a> {
    member: &'a mut MemberHandle,
}

impl MemberBuilder<'_> {
    /// Mark the member as (part of) the type's identity.
    ///
    /// Marked members are identifiers regardless of naming conventions. Several marked members
    /// form a composite identity in declaration order.
    pub fn identifier(self) -> Self {
        self.member.mark_identifier();
        self
    }
}

/// Find the typed lock behind `instance`, or explain why the owner does not fit.
fn owner<'i, T: Entity>(instance: &'i Instance, member: &'static str) -> Result<&'i RwLock<T>> {
    instance.downcast_ref::<T>().ok_or_else(|| {
        let declaring = EntityType::of::<T>();
        mapping_error!(
            Assignment,
            instance_context(member, declaring.name(), &declaring, instance),
            "Instance is not a {}",
            declaring
        )
    })
}

/// Recover the typed handle of a nested object or explain the mismatch.
fn nested<T: Entity, N: Entity>(
    instance: &Instance,
    member: &'static str,
    target: &dyn fmt::Display,
) -> Result<EntityRc<N>> {
    instance.downcast::<N>().ok_or_else(|| {
        mapping_error!(
            Assignment,
            instance_context(member, EntityType::of::<T>().name(), target, instance),
            "Instance of {} can not be assigned to {}",
            instance.entity_type(),
            target
        )
    })
}

fn rejected<T: Entity, V: ScalarValue>(member: &'static str, value: &Value) -> Error {
    let target = V::scalar_type();
    mapping_error!(
        Assignment,
        value_context(member, EntityType::of::<T>().name(), &target, value),
        "Value of type {} can not be stored as {}",
        value.type_name(),
        target
    )
}

impl<T: Entity> TypeBuilder<T> {
    fn new() -> Self {
        TypeBuilder {
            members: Vec::new(),
            constructor: None,
            _marker: PhantomData,
        }
    }

    pub(crate) fn collect() -> TypeShape {
        let mut builder = Self::new();
        T::describe(&mut builder);
        TypeShape {
            members: builder.members,
            constructor: builder.constructor,
        }
    }

    fn declaring_type() -> &'static str {
        EntityType::of::<T>().name()
    }

    fn push(&mut self, member: MemberHandle) -> MemberBuilder<'_> {
        let index = self.members.len();
        self.members.push(member);
        MemberBuilder {
            member: &mut self.members[index],
        }
    }

    /// Construct empty instances through `T::default()`
    pub fn default_constructor(&mut self) -> &mut Self
    where
        T: Default,
    {
        self.constructor(T::default)
    }

    /// Construct empty instances through `constructor`
    pub fn constructor<F>(&mut self, constructor: F) -> &mut Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.constructor = Some(Box::new(move || Instance::new(constructor())));
        self
    }

    /// Register a scalar field reached through `lens`.
    ///
    /// ## Arguments
    /// * `name` - The member name matched against record keys, ignoring case
    /// * `lens` - Projection from the entity to the field
    pub fn field<V, F>(&mut self, name: &'static str, lens: F) -> MemberBuilder<'_>
    where
        V: ScalarValue,
        F: Fn(&mut T) -> &mut V + Send + Sync + 'static,
    {
        let lens = Arc::new(lens);
        let read = Arc::clone(&lens);

        let get = Box::new(move |instance: &Instance| -> Result<Value> {
            let lock = owner::<T>(instance, name)?;
            let mut guard = write_lock!(lock)?;
            Ok(read(&mut *guard).to_value())
        });
        let set = Box::new(move |instance: &Instance, value: Value| -> Result<()> {
            let lock = owner::<T>(instance, name)?;
            match V::from_value(value) {
                Ok(typed) => {
                    *lens(&mut *write_lock!(lock)?) = typed;
                    Ok(())
                }
                Err(value) => Err(rejected::<T, V>(name, &value)),
            }
        });

        self.push(MemberHandle::new(
            name,
            MemberAccess::Field,
            MemberKind::Scalar(V::scalar_type()),
            Self::declaring_type(),
            MemberOps::Scalar { get, set },
        ))
    }

    /// Register a scalar property with a getter and a setter.
    pub fn property<V, G, S>(&mut self, name: &'static str, getter: G, setter: S) -> MemberBuilder<'_>
    where
        V: ScalarValue,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let get = Box::new(move |instance: &Instance| -> Result<Value> {
            let lock = owner::<T>(instance, name)?;
            let guard = read_lock!(lock)?;
            Ok(getter(&*guard).to_value())
        });
        let set = Box::new(move |instance: &Instance, value: Value| -> Result<()> {
            let lock = owner::<T>(instance, name)?;
            match V::from_value(value) {
                Ok(typed) => {
                    setter(&mut *write_lock!(lock)?, typed);
                    Ok(())
                }
                Err(value) => Err(rejected::<T, V>(name, &value)),
            }
        });

        self.push(MemberHandle::new(
            name,
            MemberAccess::Property,
            MemberKind::Scalar(V::scalar_type()),
            Self::declaring_type(),
            MemberOps::Scalar { get, set },
        ))
    }

    /// Register a single owned nested object
    pub fn object<N, F>(&mut self, name: &'static str, lens: F) -> MemberBuilder<'_>
    where
        N: Entity,
        F: Fn(&mut T) -> &mut Option<EntityRc<N>> + Send + Sync + 'static,
    {
        let kind = MemberKind::Object(EntityType::of::<N>());
        let lens = Arc::new(lens);
        let read = Arc::clone(&lens);
        let target = kind.clone();

        let get = Box::new(move |instance: &Instance| -> Result<Option<Instance>> {
            let lock = owner::<T>(instance, name)?;
            let mut guard = write_lock!(lock)?;
            Ok(read(&mut *guard).as_ref().map(|rc| Instance::from_rc(Arc::clone(rc))))
        });
        let set = Box::new(move |instance: &Instance, object: Option<Instance>| -> Result<()> {
            let lock = owner::<T>(instance, name)?;
            let object = match object {
                Some(object) => Some(nested::<T, N>(&object, name, &target)?),
                None => None,
            };
            *lens(&mut *write_lock!(lock)?) = object;
            Ok(())
        });

        self.push(MemberHandle::new(
            name,
            MemberAccess::Field,
            kind,
            Self::declaring_type(),
            MemberOps::Object { get, set },
        ))
    }

    /// Register a non-owning single reference, typically pointing back at a parent
    pub fn reference<N, F>(&mut self, name: &'static str, lens: F) -> MemberBuilder<'_>
    where
        N: Entity,
        F: Fn(&mut T) -> &mut Option<EntityWeak<N>> + Send + Sync + 'static,
    {
        let kind = MemberKind::ObjectReference(EntityType::of::<N>());
        let lens = Arc::new(lens);
        let read = Arc::clone(&lens);
        let target = kind.clone();

        let get = Box::new(move |instance: &Instance| -> Result<Option<Instance>> {
            let lock = owner::<T>(instance, name)?;
            let mut guard = write_lock!(lock)?;
            Ok(read(&mut *guard)
                .as_ref()
                .and_then(std::sync::Weak::upgrade)
                .map(Instance::from_rc))
        });
        let set = Box::new(move |instance: &Instance, object: Option<Instance>| -> Result<()> {
            let lock = owner::<T>(instance, name)?;
            let object = match object {
                Some(object) => Some(Arc::downgrade(&nested::<T, N>(&object, name, &target)?)),
                None => None,
            };
            *lens(&mut *write_lock!(lock)?) = object;
            Ok(())
        });

        self.push(MemberHandle::new(
            name,
            MemberAccess::Field,
            kind,
            Self::declaring_type(),
            MemberOps::Object { get, set },
        ))
    }

    /// Register a growable collection of nested objects
    pub fn collection<N, F>(&mut self, name: &'static str, lens: F) -> MemberBuilder<'_>
    where
        N: Entity,
        F: Fn(&mut T) -> &mut Vec<EntityRc<N>> + Send + Sync + 'static,
    {
        let kind = MemberKind::ObjectCollection(EntityType::of::<N>());
        let lens = Arc::new(lens);
        let read = Arc::clone(&lens);
        let target = kind.clone();

        let contains = Box::new(move |instance: &Instance, element: &Instance| -> Result<bool> {
            let lock = owner::<T>(instance, name)?;
            let mut guard = write_lock!(lock)?;
            Ok(read(&mut *guard).iter().any(|rc| element.is_rc(rc)))
        });
        let push = Box::new(move |instance: &Instance, element: Instance| -> Result<()> {
            let lock = owner::<T>(instance, name)?;
            let element = nested::<T, N>(&element, name, &target)?;
            lens(&mut *write_lock!(lock)?).push(element);
            Ok(())
        });

        self.push(MemberHandle::new(
            name,
            MemberAccess::Field,
            kind,
            Self::declaring_type(),
            MemberOps::Elements { contains, push },
        ))
    }

    /// Register a fixed-size array of nested objects, rebuilt on every append
    pub fn array<N, F>(&mut self, name: &'static str, lens: F) -> MemberBuilder<'_>
    where
        N: Entity,
        F: Fn(&mut T) -> &mut Box<[EntityRc<N>]> + Send + Sync + 'static,
    {
        let kind = MemberKind::ObjectArray(EntityType::of::<N>());
        let lens = Arc::new(lens);
        let read = Arc::clone(&lens);
        let target = kind.clone();

        let contains = Box::new(move |instance: &Instance, element: &Instance| -> Result<bool> {
            let lock = owner::<T>(instance, name)?;
            let mut guard = write_lock!(lock)?;
            Ok(read(&mut *guard).iter().any(|rc| element.is_rc(rc)))
        });
        let push = Box::new(move |instance: &Instance, element: Instance| -> Result<()> {
            let lock = owner::<T>(instance, name)?;
            let element = nested::<T, N>(&element, name, &target)?;
            let mut guard = write_lock!(lock)?;
            let slot = lens(&mut *guard);
            let mut rebuilt = std::mem::take(slot).into_vec();
            rebuilt.push(element);
            *slot = rebuilt.into_boxed_slice();
            Ok(())
        });

        self.push(MemberHandle::new(
            name,
            MemberAccess::Field,
            kind,
            Self::declaring_type(),
            MemberOps::Elements { contains, push },
        ))
    }

    /// Register a growable collection of scalars, filled from `{name}_$` keys
    pub fn primitives<P, F>(&mut self, name: &'static str, lens: F) -> MemberBuilder<'_>
    where
        P: ScalarValue,
        F: Fn(&mut T) -> &mut Vec<P> + Send + Sync + 'static,
    {
        let push = Box::new(move |instance: &Instance, value: Value| -> Result<()> {
            let lock = owner::<T>(instance, name)?;
            match P::from_value(value) {
                Ok(typed) => {
                    lens(&mut *write_lock!(lock)?).push(typed);
                    Ok(())
                }
                Err(value) => Err(rejected::<T, P>(name, &value)),
            }
        });

        self.push(MemberHandle::new(
            name,
            MemberAccess::Field,
            MemberKind::PrimitiveCollection(P::scalar_type()),
            Self::declaring_type(),
            MemberOps::Values { push },
        ))
    }

    /// Register a fixed-size array of scalars, rebuilt on every append
    pub fn primitive_array<P, F>(&mut self, name: &'static str, lens: F) -> MemberBuilder<'_>
    where
        P: ScalarValue,
        F: Fn(&mut T) -> &mut Box<[P]> + Send + Sync + 'static,
    {
        let push = Box::new(move |instance: &Instance, value: Value| -> Result<()> {
            let lock = owner::<T>(instance, name)?;
            match P::from_value(value) {
                Ok(typed) => {
                    let mut guard = write_lock!(lock)?;
                    let slot = lens(&mut *guard);
                    let mut rebuilt = std::mem::take(slot).into_vec();
                    rebuilt.push(typed);
                    *slot = rebuilt.into_boxed_slice();
                    Ok(())
                }
                Err(value) => Err(rejected::<T, P>(name, &value)),
            }
        });

        self.push(MemberHandle::new(
            name,
            MemberAccess::Field,
            MemberKind::PrimitiveArray(P::scalar_type()),
            Self::declaring_type(),
            MemberOps::Values { push },
        ))
    }
}
