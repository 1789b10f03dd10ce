//! Recursive population of an instance from a flat record.
//!
//! For every member of the instance's type the populator looks for a key with the member's
//! name (ignoring case). Scalar members are assigned directly, converting the value first when
//! its runtime type differs from the declared type. Non-scalar members collect every key
//! starting with `{member}_` into a child record, strip that prefix once, and recurse:
//!
//! - **Single objects** resolve the child record's identity under the current instance and are
//!   set to `None` when every child value is `Null`.
//! - **Object collections** resolve and populate one element per record and append it unless
//!   the collection already holds that very instance. All-`Null` groups add nothing.
//! - **Primitive collections** read the element from the child key `$`; a `Null` element is
//!   skipped, a group without `$` is malformed.
//! - **References** are non-owning and only ever point at an instance that already exists
//!   elsewhere in the graph. Non-`Null` child values for one are rejected.
//!
//! A single-object member without any child keys is wired to the parent instance when the
//! parent has the member's type. This is how back-references such as `Order.Customer` get set.

use tracing::trace;

use crate::{
    descriptor::{EntityType, Instance, MemberHandle, MemberKind, TypeRegistry},
    identity::{IdentityKey, InstanceCache},
    Configuration, Error, FlatRecord, Result, ScalarType, Value,
};

/// Key naming the value of a primitive collection element
pub const PRIMITIVE_VALUE_KEY: &str = "$";

/// Walks records into instances, sharing one configuration, registry and instance cache.
pub struct Populator<'a> {
    config: &'a Configuration,
    registry: &'a TypeRegistry,
    cache: &'a mut InstanceCache,
}

impl<'a> Populator<'a> {
    /// Create a populator resolving nested identities through `cache`
    pub fn new(
        config: &'a Configuration,
        registry: &'a TypeRegistry,
        cache: &'a mut InstanceCache,
    ) -> Self {
        Populator {
            config,
            registry,
            cache,
        }
    }

    /// Populate `instance` from `record`; `parent` is the instance the record hangs off.
    ///
    /// # Errors
    /// Returns the first conversion, assignment, format or activation error encountered.
    pub fn populate(
        &mut self,
        record: &FlatRecord,
        instance: &Instance,
        parent: Option<&Instance>,
    ) -> Result<()> {
        let descriptor = self
            .registry
            .descriptor(instance.entity_type(), self.config);

        for member in descriptor.members() {
            let direct = record.get(member.key());

            if let MemberKind::Scalar(target) = member.kind() {
                if let Some(value) = direct {
                    let value = self.coerce(member, target, value.clone())?;
                    member.set_value(instance, value)?;
                }
                continue;
            }

            if let Some(value) = direct.filter(|value| !value.is_null()) {
                return Err(mapping_error!(
                    Assignment,
                    member.context(value),
                    "A scalar value can not be assigned to a nested member"
                ));
            }

            let nested = record.nested(member.key());
            if nested.is_empty() {
                if direct.is_some() && member.kind().is_single_object() {
                    member.set_object(instance, None)?;
                } else if let Some(parent) = parent {
                    self.back_reference(member, instance, parent)?;
                }
                continue;
            }

            match member.kind() {
                MemberKind::Object(ty) => {
                    self.populate_object(member, *ty, &nested, instance)?;
                }
                MemberKind::ObjectReference(_) => {
                    self.populate_reference(member, &nested, instance)?;
                }
                MemberKind::ObjectCollection(ty) | MemberKind::ObjectArray(ty) => {
                    self.populate_element(member, *ty, &nested, instance)?;
                }
                MemberKind::PrimitiveCollection(ty) | MemberKind::PrimitiveArray(ty) => {
                    let value = self.populate_scalar(member, ty, &nested)?;
                    if !value.is_null() {
                        member.push_value(instance, value)?;
                    }
                }
                MemberKind::Scalar(_) => {}
            }
        }

        Ok(())
    }

    /// Read the value of a primitive collection element from its `$` key and convert it to
    /// the element type.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFormat`] if the record has no `$` key, and
    /// [`Error::Conversion`] if the value can not be converted.
    pub fn populate_scalar(
        &self,
        member: &MemberHandle,
        element: &ScalarType,
        record: &FlatRecord,
    ) -> Result<Value> {
        let Some(value) = record.get(PRIMITIVE_VALUE_KEY) else {
            return Err(Error::InvalidFormat(format!(
                "For collections of primitive types, include $ as the name of the member: expected '{}_$' for {}.{}",
                member.name(),
                member.declaring_type(),
                member.name()
            )));
        };

        self.coerce(member, element, value.clone())
    }

    /// Convert `value` to `target` through the configured converters when the runtime type
    /// differs. Unclaimed values pass through unchanged.
    fn coerce(&self, member: &MemberHandle, target: &ScalarType, value: Value) -> Result<Value> {
        let Some(actual) = value.scalar_type() else {
            return Ok(value);
        };
        if target.accepts(&actual) {
            return Ok(value);
        }

        match self.config.converter_for(&value, target) {
            Some(converter) => converter.convert(value.clone(), target).map_err(|error| {
                mapping_error!(Conversion, member.context(&value), error.to_string())
            }),
            None => Ok(value),
        }
    }

    fn back_reference(
        &self,
        member: &MemberHandle,
        instance: &Instance,
        parent: &Instance,
    ) -> Result<()> {
        if member.kind().is_single_object()
            && member.kind().entity_type() == Some(parent.entity_type())
        {
            trace!(
                member = member.name(),
                owner = member.declaring_type(),
                "wiring back-reference to parent"
            );
            member.set_object(instance, Some(parent.clone()))?;
        }
        Ok(())
    }

    /// Weak references never own their target, so values addressed to one have nowhere to
    /// live. An all-`Null` group clears the reference.
    fn populate_reference(
        &self,
        member: &MemberHandle,
        nested: &FlatRecord,
        owner: &Instance,
    ) -> Result<()> {
        match nested.iter().find(|(_, value)| !value.is_null()) {
            None => member.set_object(owner, None),
            Some((key, value)) => Err(mapping_error!(
                Assignment,
                member.context(value),
                "Nested value '{}_{}' can not populate the non-owning reference {}.{}; register the member as an object instead",
                member.name(),
                key,
                member.declaring_type(),
                member.name()
            )),
        }
    }

    fn populate_object(
        &mut self,
        member: &MemberHandle,
        ty: EntityType,
        nested: &FlatRecord,
        owner: &Instance,
    ) -> Result<()> {
        if nested.all_null() {
            trace!(member = member.name(), "all-null nested group, clearing");
            return member.set_object(owner, None);
        }

        let descriptor = self.registry.descriptor(ty, self.config);
        let key = IdentityKey::for_record(&descriptor, nested, Some(owner));

        let existing = if key.is_anonymous() {
            member.get_object(owner)?
        } else {
            None
        };
        let object = match existing {
            Some(object) => object,
            None => {
                self.cache
                    .resolve_key(self.config, &descriptor, key)?
                    .instance
            }
        };

        self.populate(nested, &object, Some(owner))?;
        member.set_object(owner, Some(object))
    }

    fn populate_element(
        &mut self,
        member: &MemberHandle,
        ty: EntityType,
        nested: &FlatRecord,
        owner: &Instance,
    ) -> Result<()> {
        if nested.all_null() {
            trace!(member = member.name(), "all-null collection group, skipping");
            return Ok(());
        }

        let descriptor = self.registry.descriptor(ty, self.config);
        let resolved = self
            .cache
            .resolve(self.config, &descriptor, nested, Some(owner))?;

        self.populate(nested, &resolved.instance, Some(owner))?;

        if resolved.is_new || !member.contains_element(owner, &resolved.instance)? {
            member.push_element(owner, resolved.instance)?;
        }
        Ok(())
    }
}
