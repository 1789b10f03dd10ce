//! Assignable members of mapped types.
//!
//! A [`MemberHandle`] is built once per member when a type is described and carries
//! everything the populator needs: the member name, its [`MemberKind`], whether it was marked as
//! an identifier, and type-erased accessors that operate on an [`Instance`].

use std::fmt;

use crate::{
    descriptor::{EntityType, Instance},
    error::MemberContext,
    Error, Result, ScalarType, Value,
};

/// How a member is reached on its declaring type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberAccess {
    /// A struct field reached through a lens closure
    Field,
    /// A getter/setter pair
    Property,
}

/// The declared shape of a member, a closed set of container kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// A scalar: primitive, string, bytes, Guid, enum, or `Option` of one of these
    Scalar(ScalarType),
    /// `Option<EntityWeak<N>>`, a non-owning single reference
    ObjectReference(EntityType),
    /// `Option<EntityRc<N>>`, an owned single nested object
    Object(EntityType),
    /// `Vec<EntityRc<N>>`
    ObjectCollection(EntityType),
    /// `Vec<P>` of a scalar type
    PrimitiveCollection(ScalarType),
    /// `Box<[EntityRc<N>]>`
    ObjectArray(EntityType),
    /// `Box<[P]>` of a scalar type
    PrimitiveArray(ScalarType),
}

impl MemberKind {
    /// Returns true for [`MemberKind::Scalar`]
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(self, MemberKind::Scalar(_))
    }

    /// Returns true for members holding at most one nested object
    #[must_use]
    pub fn is_single_object(&self) -> bool {
        matches!(self, MemberKind::Object(_) | MemberKind::ObjectReference(_))
    }

    /// The nested entity type, for object kinds
    #[must_use]
    pub fn entity_type(&self) -> Option<EntityType> {
        match self {
            MemberKind::ObjectReference(ty)
            | MemberKind::Object(ty)
            | MemberKind::ObjectCollection(ty)
            | MemberKind::ObjectArray(ty) => Some(*ty),
            _ => None,
        }
    }

    /// The scalar type, or element type for primitive sequences
    #[must_use]
    pub fn scalar_type(&self) -> Option<&ScalarType> {
        match self {
            MemberKind::Scalar(ty)
            | MemberKind::PrimitiveCollection(ty)
            | MemberKind::PrimitiveArray(ty) => Some(ty),
            _ => None,
        }
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Scalar(ty) => write!(f, "{ty}"),
            MemberKind::ObjectReference(ty) => write!(f, "Weak<{ty}>"),
            MemberKind::Object(ty) => write!(f, "Option<{ty}>"),
            MemberKind::ObjectCollection(ty) => write!(f, "Vec<{ty}>"),
            MemberKind::PrimitiveCollection(ty) => write!(f, "Vec<{ty}>"),
            MemberKind::ObjectArray(ty) => write!(f, "[{ty}]"),
            MemberKind::PrimitiveArray(ty) => write!(f, "[{ty}]"),
        }
    }
}

pub(crate) type ScalarGet = Box<dyn Fn(&Instance) -> Result<Value> + Send + Sync>;
pub(crate) type ScalarSet = Box<dyn Fn(&Instance, Value) -> Result<()> + Send + Sync>;
pub(crate) type ObjectGet = Box<dyn Fn(&Instance) -> Result<Option<Instance>> + Send + Sync>;
pub(crate) type ObjectSet = Box<dyn Fn(&Instance, Option<Instance>) -> Result<()> + Send + Sync>;
pub(crate) type ElementContains = Box<dyn Fn(&Instance, &Instance) -> Result<bool> + Send + Sync>;
pub(crate) type ElementPush = Box<dyn Fn(&Instance, Instance) -> Result<()> + Send + Sync>;
pub(crate) type ValuePush = Box<dyn Fn(&Instance, Value) -> Result<()> + Send + Sync>;

/// Type-erased accessors, one variant per access pattern
pub(crate) enum MemberOps {
    Scalar { get: ScalarGet, set: ScalarSet },
    Object { get: ObjectGet, set: ObjectSet },
    Elements {
        contains: ElementContains,
        push: ElementPush,
    },
    Values { push: ValuePush },
}

/// A single assignable member of a mapped type.
pub struct MemberHandle {
    name: &'static str,
    key: String,
    access: MemberAccess,
    kind: MemberKind,
    identifier: bool,
    declaring_type: &'static str,
    ops: MemberOps,
}

impl MemberHandle {
    pub(crate) fn new(
        name: &'static str,
        access: MemberAccess,
        kind: MemberKind,
        declaring_type: &'static str,
        ops: MemberOps,
    ) -> Self {
        MemberHandle {
            name,
            key: name.to_lowercase(),
            access,
            kind,
            identifier: false,
            declaring_type,
            ops,
        }
    }

    /// The member name as declared
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The lowercased name used for record lookups
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether this is a field or a property
    #[must_use]
    pub fn access(&self) -> MemberAccess {
        self.access
    }

    /// The declared kind
    #[must_use]
    pub fn kind(&self) -> &MemberKind {
        &self.kind
    }

    /// Returns true if the member carries the identifier marker
    #[must_use]
    pub fn is_identifier(&self) -> bool {
        self.identifier
    }

    /// Name of the type declaring this member
    #[must_use]
    pub fn declaring_type(&self) -> &'static str {
        self.declaring_type
    }

    pub(crate) fn mark_identifier(&mut self) {
        self.identifier = true;
    }

    /// Diagnostic context for a rejected `value` on this member
    #[must_use]
    pub fn context(&self, value: &Value) -> MemberContext {
        value_context(self.name, self.declaring_type, &self.kind, value)
    }

    /// Read a scalar member.
    ///
    /// # Errors
    /// Returns [`Error::Assignment`] if the member is not a scalar or `instance` is not of the
    /// declaring type, and [`Error::LockError`] on a poisoned instance.
    pub fn get_value(&self, instance: &Instance) -> Result<Value> {
        match &self.ops {
            MemberOps::Scalar { get, .. } => get(instance),
            _ => Err(self.wrong_kind(&Value::Null, "not a scalar member")),
        }
    }

    /// Store a scalar value whose runtime type already matches the member.
    ///
    /// `Null` stores the type's default, or `None` for optional members.
    ///
    /// # Errors
    /// Returns [`Error::Assignment`] if the value does not fit the member.
    pub fn set_value(&self, instance: &Instance, value: Value) -> Result<()> {
        match &self.ops {
            MemberOps::Scalar { set, .. } => set(instance, value),
            _ => Err(self.wrong_kind(&value, "not a scalar member")),
        }
    }

    /// Read a single nested object (upgrading weak references).
    ///
    /// # Errors
    /// Returns [`Error::Assignment`] for members that are not single objects.
    pub fn get_object(&self, instance: &Instance) -> Result<Option<Instance>> {
        match &self.ops {
            MemberOps::Object { get, .. } => get(instance),
            _ => Err(self.wrong_kind(&Value::Null, "not a single object member")),
        }
    }

    /// Store or clear a single nested object.
    ///
    /// # Errors
    /// Returns [`Error::Assignment`] if `object` is not of the member's entity type.
    pub fn set_object(&self, instance: &Instance, object: Option<Instance>) -> Result<()> {
        match &self.ops {
            MemberOps::Object { set, .. } => set(instance, object),
            _ => Err(self.wrong_kind(&Value::Null, "not a single object member")),
        }
    }

    /// Returns true if the object collection already holds `element` (by identity).
    ///
    /// # Errors
    /// Returns [`Error::Assignment`] for members that are not object collections.
    pub fn contains_element(&self, instance: &Instance, element: &Instance) -> Result<bool> {
        match &self.ops {
            MemberOps::Elements { contains, .. } => contains(instance, element),
            _ => Err(self.wrong_kind(&Value::Null, "not an object collection member")),
        }
    }

    /// Append to an object collection, rebuilding arrays.
    ///
    /// # Errors
    /// Returns [`Error::Assignment`] if `element` is not of the member's entity type.
    pub fn push_element(&self, instance: &Instance, element: Instance) -> Result<()> {
        match &self.ops {
            MemberOps::Elements { push, .. } => push(instance, element),
            _ => Err(self.wrong_kind(&Value::Null, "not an object collection member")),
        }
    }

    /// Append to a primitive collection, rebuilding arrays.
    ///
    /// # Errors
    /// Returns [`Error::Assignment`] if the value does not match the element type.
    pub fn push_value(&self, instance: &Instance, value: Value) -> Result<()> {
        match &self.ops {
            MemberOps::Values { push } => push(instance, value),
            _ => Err(self.wrong_kind(&value, "not a primitive collection member")),
        }
    }

    fn wrong_kind(&self, value: &Value, message: &str) -> Error {
        mapping_error!(Assignment, self.context(value), message)
    }
}

impl fmt::Debug for MemberHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberHandle")
            .field("name", &self.name)
            .field("access", &self.access)
            .field("kind", &self.kind)
            .field("identifier", &self.identifier)
            .field("declaring_type", &self.declaring_type)
            .finish_non_exhaustive()
    }
}

pub(crate) fn value_context(
    member: &str,
    declaring_type: &str,
    target: &dyn fmt::Display,
    value: &Value,
) -> MemberContext {
    MemberContext {
        member: member.to_string(),
        value: value.to_string(),
        value_type: value.type_name(),
        target_type: target.to_string(),
        declaring_type: declaring_type.to_string(),
    }
}

pub(crate) fn instance_context(
    member: &str,
    declaring_type: &str,
    target: &dyn fmt::Display,
    instance: &Instance,
) -> MemberContext {
    MemberContext {
        member: member.to_string(),
        value: format!("{instance:?}"),
        value_type: instance.entity_type().name().to_string(),
        target_type: target.to_string(),
        declaring_type: declaring_type.to_string(),
    }
}
