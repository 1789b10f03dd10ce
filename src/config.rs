//! Mapper configuration: identifier conventions and overrides, converters and activators.
//!
//! A [`Configuration`] is owned by a [`crate::Mapper`] and shared by every mapping call made
//! through it. All lists are append-only (`boxcar::Vec`) and the per-type identifier overrides
//! live in a `DashMap`, so configuration can be extended from any thread without locking the
//! mapping paths that read it.
//!
//! # Presets
//!
//! - [`Configuration::default`] - Conventions `Id`, `{TypeName}Id`, `{TypeName}Nbr` and the
//!   Guid, enum and value-type converters
//! - [`Configuration::case_insensitive_enums`] - Like the default, but enum constant names match
//!   regardless of case
//! - [`Configuration::empty`] - No conventions and no converters; identifiers come from markers
//!   and overrides only
//!
//! # Examples
//!
//! ```rust
//! use rowgraph::Configuration;
//!
//! let config = Configuration::default();
//! assert!(config.is_conventional_identifier("Customer", "CUSTOMERID"));
//! assert!(config.is_conventional_identifier("Customer", "CustomerNbr"));
//! assert!(!config.is_conventional_identifier("Customer", "OrderId"));
//!
//! config.add_identifier_convention(|type_name| format!("{type_name}Key"));
//! assert!(config.is_conventional_identifier("Customer", "CustomerKey"));
//! ```

use std::{
    any::TypeId,
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use dashmap::DashMap;

use crate::{
    activate::TypeActivator,
    convert::{EnumConverter, GuidConverter, TypeConverter, ValueTypeConverter},
    descriptor::{Entity, EntityType},
    ScalarType, Value,
};

/// Produces an identifier member name from a type name
pub type NamingConvention = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Identifier conventions and overrides, converters and activators of one mapper.
pub struct Configuration {
    conventions: boxcar::Vec<NamingConvention>,
    overrides: DashMap<TypeId, Vec<String>>,
    converters: boxcar::Vec<Arc<dyn TypeConverter>>,
    activators: boxcar::Vec<Arc<dyn TypeActivator>>,
    generation: AtomicU64,
}

impl Default for Configuration {
    fn default() -> Self {
        let config = Configuration::empty();
        config.add_default_conventions();
        config.add_converter(GuidConverter);
        config.add_converter(EnumConverter::new());
        config.add_converter(ValueTypeConverter);
        config
    }
}

impl Configuration {
    /// A configuration without conventions, converters or activators
    #[must_use]
    pub fn empty() -> Self {
        Configuration {
            conventions: boxcar::Vec::new(),
            overrides: DashMap::new(),
            converters: boxcar::Vec::new(),
            activators: boxcar::Vec::new(),
            generation: AtomicU64::new(0),
        }
    }

    /// The default configuration with case-insensitive enum name matching
    #[must_use]
    pub fn case_insensitive_enums() -> Self {
        let config = Configuration::empty();
        config.add_default_conventions();
        config.add_converter(GuidConverter);
        config.add_converter(EnumConverter::new().ignore_case(true));
        config.add_converter(ValueTypeConverter);
        config
    }

    fn add_default_conventions(&self) {
        self.add_identifier_convention(|_| "Id".to_string());
        self.add_identifier_convention(|type_name| format!("{type_name}Id"));
        self.add_identifier_convention(|type_name| format!("{type_name}Nbr"));
    }

    /// Set `T`'s identifier to the single member `name`, replacing any earlier override.
    pub fn add_identifier<T: Entity>(&self, name: impl Into<String>) {
        self.add_identifiers::<T>([name.into()]);
    }

    /// Set `T`'s identifiers, replacing discovery and any earlier override.
    ///
    /// Several names form a composite identity compared in the given order.
    pub fn add_identifiers<T: Entity>(&self, names: impl IntoIterator<Item = impl Into<String>>) {
        self.overrides.insert(
            TypeId::of::<T>(),
            names.into_iter().map(Into::into).collect(),
        );
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// The identifier override of a type, if one was set
    #[must_use]
    pub fn identifier_override(&self, ty: TypeId) -> Option<Vec<String>> {
        self.overrides.get(&ty).map(|names| names.value().clone())
    }

    /// Append a naming convention mapping a type name to an identifier member name
    pub fn add_identifier_convention<F>(&self, convention: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.conventions.push(Box::new(convention));
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Counter bumped by every change to identifier conventions or overrides.
    ///
    /// Descriptors remember the generation they were built against and are rebuilt once it
    /// moves on.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Returns true if `member` matches any convention for `type_name`, ignoring case
    #[must_use]
    pub fn is_conventional_identifier(&self, type_name: &str, member: &str) -> bool {
        self.conventions
            .iter()
            .any(|(_, convention)| convention(type_name).eq_ignore_ascii_case(member))
    }

    /// Register a converter
    pub fn add_converter(&self, converter: impl TypeConverter + 'static) {
        self.converters.push(Arc::new(converter));
    }

    /// The converter handling `value` for members of type `target`: lowest order first, the
    /// earliest registration among equal orders
    #[must_use]
    pub fn converter_for(&self, value: &Value, target: &ScalarType) -> Option<Arc<dyn TypeConverter>> {
        self.converters
            .iter()
            .map(|(_, converter)| converter)
            .filter(|converter| converter.can_convert(value, target))
            .min_by_key(|converter| converter.order())
            .cloned()
    }

    /// Register an activator
    pub fn add_activator(&self, activator: impl TypeActivator + 'static) {
        self.activators.push(Arc::new(activator));
    }

    /// The activator creating `ty`: lowest order first, the earliest registration among equal
    /// orders
    #[must_use]
    pub fn activator_for(&self, ty: &EntityType) -> Option<Arc<dyn TypeActivator>> {
        self.activators
            .iter()
            .map(|(_, activator)| activator)
            .filter(|activator| activator.can_create(ty))
            .min_by_key(|activator| activator.order())
            .cloned()
    }

    /// Number of registered naming conventions
    #[must_use]
    pub fn convention_count(&self) -> usize {
        self.conventions.count()
    }

    /// Number of registered converters
    #[must_use]
    pub fn converter_count(&self) -> usize {
        self.converters.count()
    }

    /// Number of registered activators
    #[must_use]
    pub fn activator_count(&self) -> usize {
        self.activators.count()
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("conventions", &self.convention_count())
            .field("overrides", &self.overrides.len())
            .field("converters", &self.converter_count())
            .field("activators", &self.activator_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test::Customer, Result};

    struct Fixed(i32, &'static str);

    impl TypeConverter for Fixed {
        fn can_convert(&self, _value: &Value, target: &ScalarType) -> bool {
            target.underlying() == &ScalarType::String
        }

        fn convert(&self, _value: Value, _target: &ScalarType) -> Result<Value> {
            Ok(Value::from(self.1))
        }

        fn order(&self) -> i32 {
            self.0
        }
    }

    #[test]
    fn test_presets() {
        let default = Configuration::default();
        assert_eq!(default.convention_count(), 3);
        assert_eq!(default.converter_count(), 3);
        assert_eq!(default.activator_count(), 0);

        let empty = Configuration::empty();
        assert_eq!(empty.convention_count(), 0);
        assert_eq!(empty.converter_count(), 0);
        assert!(!empty.is_conventional_identifier("Customer", "Id"));

        let relaxed = Configuration::case_insensitive_enums();
        assert_eq!(relaxed.convention_count(), 3);
        assert_eq!(relaxed.converter_count(), 3);
    }

    #[test]
    fn test_conventions_ignore_case() {
        let config = Configuration::default();
        assert!(config.is_conventional_identifier("Customer", "id"));
        assert!(config.is_conventional_identifier("Customer", "customerid"));
        assert!(config.is_conventional_identifier("Customer", "CUSTOMERNBR"));
        assert!(!config.is_conventional_identifier("Customer", "Ident"));
    }

    #[test]
    fn test_overrides_replace() {
        let config = Configuration::default();
        assert_eq!(config.identifier_override(TypeId::of::<Customer>()), None);

        config.add_identifiers::<Customer>(["Id", "Name"]);
        assert_eq!(
            config.identifier_override(TypeId::of::<Customer>()),
            Some(vec!["Id".to_string(), "Name".to_string()])
        );

        config.add_identifier::<Customer>("FirstName");
        assert_eq!(
            config.identifier_override(TypeId::of::<Customer>()),
            Some(vec!["FirstName".to_string()])
        );
    }

    #[test]
    fn test_converter_selection_by_order_then_registration() {
        let config = Configuration::empty();
        config.add_converter(Fixed(5, "late"));
        config.add_converter(Fixed(1, "first"));
        config.add_converter(Fixed(1, "tie"));

        let converter = config
            .converter_for(&Value::from(1), &ScalarType::String)
            .unwrap();
        assert_eq!(
            converter.convert(Value::Null, &ScalarType::String).unwrap(),
            Value::from("first")
        );
        assert!(config.converter_for(&Value::from(1), &ScalarType::I4).is_none());
    }

    #[test]
    fn test_default_converter_routing() {
        let config = Configuration::default();
        let guid = config.converter_for(&Value::from("x"), &ScalarType::Guid).unwrap();
        assert_eq!(guid.order(), 100);
        let number = config.converter_for(&Value::from("1"), &ScalarType::I4).unwrap();
        assert_eq!(number.order(), 1000);
        assert!(config
            .converter_for(&Value::from(1), &ScalarType::String)
            .is_none());
    }
}
