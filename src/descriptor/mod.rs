//! Per-type metadata: identifier members and the full set of assignable members.
//!
//! Every [`Entity`] describes itself once through a [`TypeBuilder`]. The resulting
//! [`TypeDescriptor`] is immutable and memoized by the [`TypeRegistry`] until it is explicitly
//! invalidated (for example when identifiers are overridden).
//!
//! # Identifier Discovery
//!
//! A member is part of a type's identity when
//! - it was marked with [`MemberBuilder::identifier`], or
//! - its name matches one of the configured naming conventions, ignoring case. The default
//!   conventions are `Id`, `{TypeName}Id` and `{TypeName}Nbr`.
//!
//! An identifier list set explicitly through [`crate::Configuration::add_identifiers`] replaces
//! discovery for that type entirely. An empty identifier list is legal: every record then
//! yields a new instance.
//!
//! # Key Components
//!
//! - [`Entity`] / [`EntityType`] - Mapped types and their runtime identity
//! - [`Instance`] - Type-erased shared instance handle
//! - [`TypeBuilder`] / [`MemberBuilder`] - Member registration
//! - [`MemberHandle`] / [`MemberKind`] / [`MemberAccess`] - One assignable member
//! - [`TypeDescriptor`] - The built metadata of one type
//! - [`TypeRegistry`] - Concurrent descriptor cache
//!
//! # Examples
//!
//! ```rust
//! use rowgraph::{Configuration, Entity, EntityType, TypeBuilder, TypeRegistry};
//!
//! #[derive(Default)]
//! struct Product {
//!     product_nbr: i64,
//!     title: String,
//! }
//!
//! impl Entity for Product {
//!     fn describe(ty: &mut TypeBuilder<Self>) {
//!         ty.default_constructor();
//!         ty.field("ProductNbr", |p| &mut p.product_nbr);
//!         ty.field("Title", |p| &mut p.title);
//!     }
//! }
//!
//! let registry = TypeRegistry::new();
//! let descriptor = registry.descriptor(EntityType::of::<Product>(), &Configuration::default());
//! assert_eq!(descriptor.identifiers(), ["ProductNbr"]);
//! ```

mod builder;
mod entity;
mod member;
mod registry;

pub use builder::{MemberBuilder, TypeBuilder};
pub(crate) use builder::{Constructor, TypeShape};
pub use entity::{Entity, EntityRc, EntityType, EntityWeak, Instance};
pub use member::{MemberAccess, MemberHandle, MemberKind};
pub use registry::TypeRegistry;

use std::{collections::HashMap, fmt};

use crate::Configuration;

/// Immutable metadata of one mapped type.
pub struct TypeDescriptor {
    ty: EntityType,
    identifiers: Vec<String>,
    members: Vec<MemberHandle>,
    by_key: HashMap<String, usize>,
    constructor: Option<Constructor>,
    generation: u64,
}

impl TypeDescriptor {
    /// Describe `ty` and resolve its identifiers against `config`.
    pub(crate) fn build(ty: EntityType, config: &Configuration) -> Self {
        let generation = config.generation();
        let shape = ty.shape();

        let identifiers = config.identifier_override(ty.id()).unwrap_or_else(|| {
            shape
                .members
                .iter()
                .filter(|member| {
                    member.is_identifier()
                        || config.is_conventional_identifier(ty.name(), member.name())
                })
                .map(|member| member.name().to_string())
                .collect()
        });

        let mut by_key = HashMap::with_capacity(shape.members.len());
        for (index, member) in shape.members.iter().enumerate() {
            by_key.entry(member.key().to_string()).or_insert(index);
        }

        TypeDescriptor {
            ty,
            identifiers,
            members: shape.members,
            by_key,
            constructor: shape.constructor,
            generation,
        }
    }

    /// The configuration generation the identifiers were resolved against
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// The described type
    #[must_use]
    pub fn entity_type(&self) -> EntityType {
        self.ty
    }

    /// The short type name
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.ty.name()
    }

    /// Identifier member names, in identity order
    #[must_use]
    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    /// All members in declaration order
    #[must_use]
    pub fn members(&self) -> &[MemberHandle] {
        &self.members
    }

    /// Find a member by name, ignoring case
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&MemberHandle> {
        self.by_key
            .get(&name.to_lowercase())
            .map(|&index| &self.members[index])
    }

    /// Returns true if the type registered a constructor
    #[must_use]
    pub fn has_constructor(&self) -> bool {
        self.constructor.is_some()
    }

    /// Build an empty instance through the registered constructor
    #[must_use]
    pub fn construct(&self) -> Option<Instance> {
        self.constructor.as_ref().map(|constructor| constructor())
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type", &self.ty)
            .field("identifiers", &self.identifiers)
            .field("members", &self.members)
            .field("constructor", &self.constructor.is_some())
            .finish()
    }
}
