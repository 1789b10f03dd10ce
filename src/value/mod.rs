//! Dynamic scalar values carried by flat records, and the scalar types members declare.
//!
//! A flat record stores every cell as a [`Value`]. Each value knows its runtime
//! [`ScalarType`], which the populator compares with the type a member declares before it asks
//! a converter for help. Rust types that can be stored on a scalar member implement
//! [`ScalarValue`], the bridge between the dynamic and the static world.
//!
//! # Key Components
//!
//! - [`Value`] - A single dynamic cell value, `Null` included
//! - [`ScalarType`] - The declared or runtime type of a scalar
//! - [`EnumType`] / [`EnumValue`] - Runtime description of a mapped enum and one of its constants
//! - [`ScalarValue`] - Conversion between a Rust type and [`Value`]
//! - [`MappedEnum`] - Marker for fieldless enums usable as members, see [`crate::mapped_enum!`]
//! - [`FlatRecord`] - A case-insensitive key to value map
//!
//! # Examples
//!
//! ```rust
//! use rowgraph::{ScalarType, ScalarValue, Value};
//!
//! let value = Value::from(42i32);
//! assert_eq!(value.scalar_type(), Some(ScalarType::I4));
//! assert_eq!(i32::from_value(value), Ok(42));
//!
//! // Null lands as the default of non-optional targets
//! assert_eq!(i64::from_value(Value::Null), Ok(0));
//! assert_eq!(Option::<i64>::from_value(Value::Null), Ok(None));
//! ```

mod record;

pub use record::FlatRecord;
pub(crate) use record::json_kind;

use std::{
    any::TypeId,
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use uguid::Guid;

/// A named constant of a mapped enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumConstant {
    /// The variant name
    pub name: &'static str,
    /// The numeric discriminant
    pub discriminant: i64,
}

/// Runtime description of a mapped enum: its identity, display name and named constants.
///
/// Equality and hashing only consider the Rust type identity.
#[derive(Debug, Clone)]
pub struct EnumType {
    id: TypeId,
    name: &'static str,
    constants: Arc<[EnumConstant]>,
}

impl EnumType {
    /// Describe the enum `E`.
    #[must_use]
    pub fn of<E: MappedEnum>() -> Self {
        let constants: Arc<[EnumConstant]> = E::VARIANTS
            .iter()
            .map(|variant| EnumConstant {
                name: (*variant).into(),
                discriminant: variant.discriminant(),
            })
            .collect();

        EnumType {
            id: TypeId::of::<E>(),
            name: short_type_name(std::any::type_name::<E>()),
            constants,
        }
    }

    /// The Rust type identity of the enum
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The short type name (`Gender` rather than `my_crate::model::Gender`)
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// All named constants in declaration order
    #[must_use]
    pub fn constants(&self) -> &[EnumConstant] {
        &self.constants
    }

    /// Find a constant by name, optionally ignoring ASCII case
    #[must_use]
    pub fn by_name(&self, name: &str, ignore_case: bool) -> Option<EnumConstant> {
        self.constants
            .iter()
            .find(|constant| {
                if ignore_case {
                    constant.name.eq_ignore_ascii_case(name)
                } else {
                    constant.name == name
                }
            })
            .copied()
    }

    /// Find a constant by discriminant
    #[must_use]
    pub fn by_discriminant(&self, discriminant: i64) -> Option<EnumConstant> {
        self.constants
            .iter()
            .find(|constant| constant.discriminant == discriminant)
            .copied()
    }

    /// Build the [`Value`] for one of this enum's constants
    #[must_use]
    pub fn value(&self, constant: EnumConstant) -> Value {
        Value::Enum(EnumValue {
            ty: self.clone(),
            name: constant.name,
            discriminant: constant.discriminant,
        })
    }
}

impl PartialEq for EnumType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EnumType {}

impl Hash for EnumType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A constant of a mapped enum carried inside a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    ty: EnumType,
    name: &'static str,
    discriminant: i64,
}

impl EnumValue {
    /// The enum this constant belongs to
    #[must_use]
    pub fn enum_type(&self) -> &EnumType {
        &self.ty
    }

    /// The constant name
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The numeric discriminant
    #[must_use]
    pub fn discriminant(&self) -> i64 {
        self.discriminant
    }
}

/// The type of a scalar: what a member declares, or what a [`Value`] carries at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// `bool`
    Boolean,
    /// `char`
    Char,
    /// `i8`
    I1,
    /// `u8`
    U1,
    /// `i16`
    I2,
    /// `u16`
    U2,
    /// `i32`
    I4,
    /// `u32`
    U4,
    /// `i64`
    I8,
    /// `u64`
    U8,
    /// `f32`
    R4,
    /// `f64`
    R8,
    /// `String`
    String,
    /// `Vec<u8>`
    Bytes,
    /// `uguid::Guid`
    Guid,
    /// A fieldless enum registered with [`crate::mapped_enum!`]
    Enum(EnumType),
    /// `Option<T>` of another scalar type
    Nullable(Box<ScalarType>),
}

impl ScalarType {
    /// The type with any `Nullable` wrapper removed
    #[must_use]
    pub fn underlying(&self) -> &ScalarType {
        match self {
            ScalarType::Nullable(inner) => inner.underlying(),
            other => other,
        }
    }

    /// Returns true for `Option<T>` types
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        matches!(self, ScalarType::Nullable(_))
    }

    /// Returns true if the (unwrapped) type is stored by value rather than as text or bytes
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        !matches!(self.underlying(), ScalarType::String | ScalarType::Bytes)
    }

    /// Returns true if the (unwrapped) type is a mapped enum
    #[must_use]
    pub fn is_enum(&self) -> bool {
        matches!(self.underlying(), ScalarType::Enum(_))
    }

    /// Returns true if the (unwrapped) type is a Guid
    #[must_use]
    pub fn is_guid(&self) -> bool {
        matches!(self.underlying(), ScalarType::Guid)
    }

    /// Returns true if the (unwrapped) type is one of the integer types
    #[must_use]
    pub fn is_integral(&self) -> bool {
        matches!(
            self.underlying(),
            ScalarType::I1
                | ScalarType::U1
                | ScalarType::I2
                | ScalarType::U2
                | ScalarType::I4
                | ScalarType::U4
                | ScalarType::I8
                | ScalarType::U8
        )
    }

    /// Returns true if a value of runtime type `actual` can be stored without conversion
    #[must_use]
    pub fn accepts(&self, actual: &ScalarType) -> bool {
        self == actual || self.underlying() == actual
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarType::Boolean => write!(f, "bool"),
            ScalarType::Char => write!(f, "char"),
            ScalarType::I1 => write!(f, "i8"),
            ScalarType::U1 => write!(f, "u8"),
            ScalarType::I2 => write!(f, "i16"),
            ScalarType::U2 => write!(f, "u16"),
            ScalarType::I4 => write!(f, "i32"),
            ScalarType::U4 => write!(f, "u32"),
            ScalarType::I8 => write!(f, "i64"),
            ScalarType::U8 => write!(f, "u64"),
            ScalarType::R4 => write!(f, "f32"),
            ScalarType::R8 => write!(f, "f64"),
            ScalarType::String => write!(f, "String"),
            ScalarType::Bytes => write!(f, "Vec<u8>"),
            ScalarType::Guid => write!(f, "Guid"),
            ScalarType::Enum(ty) => write!(f, "{}", ty.name()),
            ScalarType::Nullable(inner) => write!(f, "Option<{inner}>"),
        }
    }
}

/// A dynamic cell value of a flat record.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// No value
    #[default]
    Null,
    /// Boolean value
    Boolean(bool),
    /// Character value
    Char(char),
    /// 8-bit signed integer
    I1(i8),
    /// 8-bit unsigned integer
    U1(u8),
    /// 16-bit signed integer
    I2(i16),
    /// 16-bit unsigned integer
    U2(u16),
    /// 32-bit signed integer
    I4(i32),
    /// 32-bit unsigned integer
    U4(u32),
    /// 64-bit signed integer
    I8(i64),
    /// 64-bit unsigned integer
    U8(u64),
    /// 32-bit floating point
    R4(f32),
    /// 64-bit floating point
    R8(f64),
    /// String value
    String(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// A Guid
    Guid(Guid),
    /// A constant of a mapped enum
    Enum(EnumValue),
}

impl Value {
    /// Wrap a constant of a mapped enum
    #[must_use]
    pub fn from_enum<E: MappedEnum>(value: E) -> Self {
        Value::Enum(EnumValue {
            ty: EnumType::of::<E>(),
            name: value.into(),
            discriminant: value.discriminant(),
        })
    }

    /// Returns true for [`Value::Null`]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The runtime type of this value, `None` for `Null`
    #[must_use]
    pub fn scalar_type(&self) -> Option<ScalarType> {
        Some(match self {
            Value::Null => return None,
            Value::Boolean(_) => ScalarType::Boolean,
            Value::Char(_) => ScalarType::Char,
            Value::I1(_) => ScalarType::I1,
            Value::U1(_) => ScalarType::U1,
            Value::I2(_) => ScalarType::I2,
            Value::U2(_) => ScalarType::U2,
            Value::I4(_) => ScalarType::I4,
            Value::U4(_) => ScalarType::U4,
            Value::I8(_) => ScalarType::I8,
            Value::U8(_) => ScalarType::U8,
            Value::R4(_) => ScalarType::R4,
            Value::R8(_) => ScalarType::R8,
            Value::String(_) => ScalarType::String,
            Value::Bytes(_) => ScalarType::Bytes,
            Value::Guid(_) => ScalarType::Guid,
            Value::Enum(value) => ScalarType::Enum(value.ty.clone()),
        })
    }

    /// Display name of the runtime type, `null` for `Null`
    #[must_use]
    pub fn type_name(&self) -> String {
        self.scalar_type()
            .map_or_else(|| "null".to_string(), |ty| ty.to_string())
    }

    /// Widen any integral (or boolean, or enum) value to `i128`
    #[must_use]
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Value::Boolean(value) => Some(i128::from(*value)),
            Value::I1(value) => Some(i128::from(*value)),
            Value::U1(value) => Some(i128::from(*value)),
            Value::I2(value) => Some(i128::from(*value)),
            Value::U2(value) => Some(i128::from(*value)),
            Value::I4(value) => Some(i128::from(*value)),
            Value::U4(value) => Some(i128::from(*value)),
            Value::I8(value) => Some(i128::from(*value)),
            Value::U8(value) => Some(i128::from(*value)),
            Value::Enum(value) => Some(i128::from(value.discriminant)),
            _ => None,
        }
    }

    /// Try to convert to a floating point value
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::R4(value) => Some(f64::from(*value)),
            Value::R8(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            other => other.as_integer().map(|value| value as f64),
        }
    }

    /// The text of a string value
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::I1(a), Value::I1(b)) => a == b,
            (Value::U1(a), Value::U1(b)) => a == b,
            (Value::I2(a), Value::I2(b)) => a == b,
            (Value::U2(a), Value::U2(b)) => a == b,
            (Value::I4(a), Value::I4(b)) => a == b,
            (Value::U4(a), Value::U4(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::U8(a), Value::U8(b)) => a == b,
            (Value::R4(a), Value::R4(b)) => a.to_bits() == b.to_bits(),
            (Value::R8(a), Value::R8(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Guid(a), Value::Guid(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(value) => value.hash(state),
            Value::Char(value) => value.hash(state),
            Value::I1(value) => value.hash(state),
            Value::U1(value) => value.hash(state),
            Value::I2(value) => value.hash(state),
            Value::U2(value) => value.hash(state),
            Value::I4(value) => value.hash(state),
            Value::U4(value) => value.hash(state),
            Value::I8(value) => value.hash(state),
            Value::U8(value) => value.hash(state),
            Value::R4(value) => value.to_bits().hash(state),
            Value::R8(value) => value.to_bits().hash(state),
            Value::String(value) => value.hash(state),
            Value::Bytes(value) => value.hash(state),
            Value::Guid(value) => value.hash(state),
            Value::Enum(value) => value.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::Char(value) => write!(f, "{value}"),
            Value::I1(value) => write!(f, "{value}"),
            Value::U1(value) => write!(f, "{value}"),
            Value::I2(value) => write!(f, "{value}"),
            Value::U2(value) => write!(f, "{value}"),
            Value::I4(value) => write!(f, "{value}"),
            Value::U4(value) => write!(f, "{value}"),
            Value::I8(value) => write!(f, "{value}"),
            Value::U8(value) => write!(f, "{value}"),
            Value::R4(value) => write!(f, "{value}"),
            Value::R8(value) => write!(f, "{value}"),
            Value::String(value) => write!(f, "{value}"),
            Value::Bytes(value) => write!(f, "{value:?}"),
            Value::Guid(value) => write!(f, "{value}"),
            Value::Enum(value) => write!(f, "{}", value.name),
        }
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )+
    };
}

impl_from_primitive!(
    bool => Boolean,
    char => Char,
    i8 => I1,
    u8 => U1,
    i16 => I2,
    u16 => U2,
    i32 => I4,
    u32 => U4,
    i64 => I8,
    u64 => U8,
    f32 => R4,
    f64 => R8,
    String => String,
    Vec<u8> => Bytes,
    Guid => Guid,
);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// A Rust type that can be stored on a scalar member.
///
/// Implemented for the primitive integers and floats, `bool`, `char`, `String`, `Vec<u8>`,
/// [`uguid::Guid`], `Option<T>` of any of these, and enums registered with
/// [`crate::mapped_enum!`].
pub trait ScalarValue: Sized + Send + Sync + 'static {
    /// The declared type of members holding `Self`
    fn scalar_type() -> ScalarType;

    /// Take a value of exactly this type. `Null` yields the type's default (or `None`).
    ///
    /// # Errors
    /// Hands the value back when its runtime type does not match.
    fn from_value(value: Value) -> std::result::Result<Self, Value>;

    /// Produce the dynamic form of `self`
    fn to_value(&self) -> Value;
}

macro_rules! impl_scalar_value {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl ScalarValue for $ty {
                fn scalar_type() -> ScalarType {
                    ScalarType::$variant
                }

                fn from_value(value: Value) -> std::result::Result<Self, Value> {
                    match value {
                        Value::$variant(inner) => Ok(inner),
                        Value::Null => Ok(<$ty>::default()),
                        other => Err(other),
                    }
                }

                fn to_value(&self) -> Value {
                    Value::$variant(self.clone())
                }
            }
        )+
    };
}

impl_scalar_value!(
    bool => Boolean,
    char => Char,
    i8 => I1,
    u8 => U1,
    i16 => I2,
    u16 => U2,
    i32 => I4,
    u32 => U4,
    i64 => I8,
    u64 => U8,
    f32 => R4,
    f64 => R8,
    String => String,
    Vec<u8> => Bytes,
);

impl ScalarValue for Guid {
    fn scalar_type() -> ScalarType {
        ScalarType::Guid
    }

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Guid(inner) => Ok(inner),
            Value::Null => Ok(Guid::ZERO),
            other => Err(other),
        }
    }

    fn to_value(&self) -> Value {
        Value::Guid(*self)
    }
}

impl<T: ScalarValue> ScalarValue for Option<T> {
    fn scalar_type() -> ScalarType {
        ScalarType::Nullable(Box::new(T::scalar_type()))
    }

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, ScalarValue::to_value)
    }
}

/// A fieldless enum that can be stored on scalar members.
///
/// Derive [`strum::VariantArray`] and [`strum::IntoStaticStr`], then register the type with
/// [`crate::mapped_enum!`], which implements this trait and [`ScalarValue`].
pub trait MappedEnum: strum::VariantArray + Into<&'static str> + Copy + Send + Sync + 'static {
    /// The numeric discriminant of this constant
    fn discriminant(self) -> i64;
}

/// Implementation of [`ScalarValue::from_value`] shared by all mapped enums.
///
/// `Null` yields the constant with discriminant 0, mirroring a zeroed enum.
#[doc(hidden)]
pub fn enum_from_value<E: MappedEnum>(value: Value) -> std::result::Result<E, Value> {
    let discriminant = match &value {
        Value::Enum(inner) if inner.ty.id == TypeId::of::<E>() => inner.discriminant,
        Value::Null => 0,
        _ => return Err(value),
    };

    E::VARIANTS
        .iter()
        .find(|variant| variant.discriminant() == discriminant)
        .copied()
        .ok_or(value)
}

/// Registers fieldless enums as scalar member types.
///
/// The enum must derive [`strum::VariantArray`], [`strum::IntoStaticStr`], `Clone` and `Copy`.
///
/// ```rust
/// use strum::{IntoStaticStr, VariantArray};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, VariantArray, IntoStaticStr)]
/// enum Gender {
///     Unknown = 0,
///     Female = 1,
///     Male = 2,
/// }
///
/// rowgraph::mapped_enum!(Gender);
///
/// use rowgraph::ScalarValue;
/// assert_eq!(Gender::from_value(rowgraph::Value::from_enum(Gender::Male)), Ok(Gender::Male));
/// ```
#[macro_export]
macro_rules! mapped_enum {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::MappedEnum for $ty {
                fn discriminant(self) -> i64 {
                    self as i64
                }
            }

            impl $crate::ScalarValue for $ty {
                fn scalar_type() -> $crate::ScalarType {
                    $crate::ScalarType::Enum($crate::EnumType::of::<$ty>())
                }

                fn from_value(
                    value: $crate::Value,
                ) -> ::std::result::Result<Self, $crate::Value> {
                    $crate::value::enum_from_value::<$ty>(value)
                }

                fn to_value(&self) -> $crate::Value {
                    $crate::Value::from_enum(*self)
                }
            }
        )+
    };
}

/// Strip the module path and generic arguments from a `std::any::type_name` result.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::Gender;
    use std::collections::HashSet;

    #[test]
    fn test_scalar_type_of_values() {
        assert_eq!(Value::Null.scalar_type(), None);
        assert_eq!(Value::from(1u8).scalar_type(), Some(ScalarType::U1));
        assert_eq!(Value::from("x").scalar_type(), Some(ScalarType::String));
        assert_eq!(
            Value::from_enum(Gender::Female).scalar_type(),
            Some(ScalarType::Enum(EnumType::of::<Gender>()))
        );
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::from(2.5f64).type_name(), "f64");
    }

    #[test]
    fn test_value_equality_is_variant_sensitive() {
        assert_eq!(Value::from(2i32), Value::from(2i32));
        assert_ne!(Value::from(2i32), Value::from(2i64));
        assert_ne!(Value::from("2"), Value::from(2i32));
        assert_eq!(Value::from(f64::NAN), Value::from(f64::NAN));

        let mut set = HashSet::new();
        set.insert(Value::from(1i32));
        set.insert(Value::from(1i32));
        set.insert(Value::from(1i64));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_option_into_value() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::String("a".to_string()));
    }

    #[test]
    fn test_scalar_value_defaults_on_null() {
        assert_eq!(i32::from_value(Value::Null), Ok(0));
        assert_eq!(String::from_value(Value::Null), Ok(String::new()));
        assert_eq!(bool::from_value(Value::Null), Ok(false));
        assert_eq!(Guid::from_value(Value::Null), Ok(Guid::ZERO));
        assert_eq!(Option::<String>::from_value(Value::Null), Ok(None));
        assert_eq!(Gender::from_value(Value::Null), Ok(Gender::Unknown));
    }

    #[test]
    fn test_scalar_value_rejects_other_types() {
        assert_eq!(i32::from_value(Value::from(1i64)), Err(Value::from(1i64)));
        assert_eq!(
            Option::<i32>::from_value(Value::from("1")),
            Err(Value::from("1"))
        );
        assert!(Gender::from_value(Value::from(2i32)).is_err());
    }

    #[test]
    fn test_nullable_scalar_type() {
        let ty = Option::<i32>::scalar_type();
        assert!(ty.is_nullable());
        assert_eq!(ty.underlying(), &ScalarType::I4);
        assert_eq!(ty.to_string(), "Option<i32>");
        assert!(ty.accepts(&ScalarType::I4));
        assert!(!ty.accepts(&ScalarType::I8));
        assert!(ty.is_value_type());
        assert!(!Option::<String>::scalar_type().is_value_type());
    }

    #[test]
    fn test_enum_type_lookup() {
        let ty = EnumType::of::<Gender>();
        assert_eq!(ty.name(), "Gender");
        assert_eq!(ty.constants().len(), 3);
        assert_eq!(ty.by_name("Male", false).map(|c| c.discriminant), Some(2));
        assert_eq!(ty.by_name("male", false), None);
        assert_eq!(ty.by_name("male", true).map(|c| c.discriminant), Some(2));
        assert_eq!(ty.by_discriminant(1).map(|c| c.name), Some("Female"));
        assert_eq!(ty.value(ty.by_discriminant(2).unwrap()), Value::from_enum(Gender::Male));
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("alloc::string::String"), "String");
        assert_eq!(short_type_name("my::model::Order<my::Detail>"), "Order");
        assert_eq!(short_type_name("Plain"), "Plain");
    }
}
