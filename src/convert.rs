//! Value conversion between the runtime type of a record value and a member's declared type.
//!
//! Converters are consulted only when the two types differ and the value is not `Null`. The
//! configured converters are tried lowest [`TypeConverter::order`] first; among equal orders the
//! one registered first wins. If no converter claims a value it is handed to the member as-is,
//! and the member's setter reports the mismatch.
//!
//! # Built-in Converters
//!
//! | Converter | Order | Targets |
//! |-----------|-------|---------|
//! | [`GuidConverter`] | 100 | `Guid`, `Option<Guid>` |
//! | [`EnumConverter`] | 100 | mapped enums and their `Option` |
//! | [`ValueTypeConverter`] | 1000 | numbers, `bool`, `char` and their `Option` |
//!
//! # Examples
//!
//! ```rust
//! use rowgraph::{convert::ValueTypeConverter, ScalarType, TypeConverter, Value};
//!
//! let converter = ValueTypeConverter;
//! let target = ScalarType::I4;
//!
//! assert!(converter.can_convert(&Value::from(" 42 "), &target));
//! assert_eq!(converter.convert(Value::from(" 42 "), &target)?, Value::I4(42));
//! assert_eq!(converter.convert(Value::from(2.5f64), &target)?, Value::I4(2));
//! # Ok::<(), rowgraph::Error>(())
//! ```

use uguid::Guid;

use crate::{Error, Result, ScalarType, Value};

/// Coerces values into a declared scalar type.
pub trait TypeConverter: Send + Sync {
    /// Returns true if this converter handles `value` for members of type `target`
    fn can_convert(&self, value: &Value, target: &ScalarType) -> bool;

    /// Convert `value` to `target` (or, for `Option` targets, to the wrapped type).
    ///
    /// # Errors
    /// Any error is reported as an [`Error::Conversion`] against the member being populated.
    fn convert(&self, value: Value, target: &ScalarType) -> Result<Value>;

    /// Position among the configured converters, lowest first
    fn order(&self) -> i32;
}

fn not_convertible(value: &Value, target: &ScalarType) -> Error {
    Error::InvalidFormat(format!(
        "Value '{value}' of type {} can not be converted to {target}",
        value.type_name()
    ))
}

/// Converts strings and 16-byte sequences to Guids.
///
/// Strings may be hyphenated, plain 32-digit hex, or wrapped in braces; surrounding whitespace
/// is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuidConverter;

impl GuidConverter {
    fn parse(text: &str) -> Option<Guid> {
        let trimmed = text.trim();
        let inner = trimmed
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .unwrap_or(trimmed);

        if inner.len() == 32 && inner.bytes().all(|b| b.is_ascii_hexdigit()) {
            let hyphenated = format!(
                "{}-{}-{}-{}-{}",
                &inner[..8],
                &inner[8..12],
                &inner[12..16],
                &inner[16..20],
                &inner[20..]
            );
            return Guid::try_parse(&hyphenated).ok();
        }

        Guid::try_parse(inner).ok()
    }
}

impl TypeConverter for GuidConverter {
    fn can_convert(&self, _value: &Value, target: &ScalarType) -> bool {
        target.is_guid()
    }

    fn convert(&self, value: Value, target: &ScalarType) -> Result<Value> {
        let parsed = match &value {
            Value::Guid(guid) => Some(*guid),
            Value::String(text) => Self::parse(text),
            Value::Bytes(bytes) => <[u8; 16]>::try_from(bytes.as_slice())
                .ok()
                .map(Guid::from_bytes),
            _ => None,
        };

        parsed
            .map(Value::Guid)
            .ok_or_else(|| not_convertible(&value, target))
    }

    fn order(&self) -> i32 {
        100
    }
}

/// Converts names, numbers and numeric strings to mapped enum constants.
///
/// Names are compared case-sensitively unless the converter was built with
/// [`EnumConverter::ignore_case`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumConverter {
    ignore_case: bool,
}

impl EnumConverter {
    /// A converter with case-sensitive name matching
    #[must_use]
    pub fn new() -> Self {
        EnumConverter::default()
    }

    /// Set whether constant names match regardless of ASCII case
    #[must_use]
    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }
}

impl TypeConverter for EnumConverter {
    fn can_convert(&self, _value: &Value, target: &ScalarType) -> bool {
        target.is_enum()
    }

    fn convert(&self, value: Value, target: &ScalarType) -> Result<Value> {
        let ScalarType::Enum(ty) = target.underlying() else {
            return Err(not_convertible(&value, target));
        };

        let constant = match &value {
            Value::Enum(inner) if inner.enum_type() == ty => return Ok(value),
            Value::Boolean(_) => None,
            other => match other.as_integer() {
                Some(number) => i64::try_from(number)
                    .ok()
                    .and_then(|number| ty.by_discriminant(number)),
                None => {
                    let text = other.to_string();
                    let text = text.trim();
                    ty.by_name(text, self.ignore_case).or_else(|| {
                        text.parse::<i64>()
                            .ok()
                            .and_then(|number| ty.by_discriminant(number))
                    })
                }
            },
        };

        constant.map(|constant| ty.value(constant)).ok_or_else(|| {
            Error::InvalidFormat(format!(
                "Requested value '{value}' was not found in {}",
                ty.name()
            ))
        })
    }

    fn order(&self) -> i32 {
        100
    }
}

/// General coercion between numbers, booleans, characters and their string forms.
///
/// Handles every value-type target that is neither an enum nor a Guid. Floating point values
/// are rounded half to even when an integer is required; out-of-range results fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueTypeConverter;

impl ValueTypeConverter {
    fn integral(target: &ScalarType, number: i128) -> Option<Value> {
        Some(match target {
            ScalarType::I1 => Value::I1(i8::try_from(number).ok()?),
            ScalarType::U1 => Value::U1(u8::try_from(number).ok()?),
            ScalarType::I2 => Value::I2(i16::try_from(number).ok()?),
            ScalarType::U2 => Value::U2(u16::try_from(number).ok()?),
            ScalarType::I4 => Value::I4(i32::try_from(number).ok()?),
            ScalarType::U4 => Value::U4(u32::try_from(number).ok()?),
            ScalarType::I8 => Value::I8(i64::try_from(number).ok()?),
            ScalarType::U8 => Value::U8(u64::try_from(number).ok()?),
            _ => return None,
        })
    }

    #[allow(clippy::cast_possible_truncation)]
    fn rounded(number: f64) -> Option<i128> {
        let rounded = number.round_ties_even();
        // i128 covers every 64-bit target, anything wider fails the range check later
        if rounded.is_finite() && rounded.abs() < 1e38 {
            Some(rounded as i128)
        } else {
            None
        }
    }

    fn to_integer(value: &Value) -> Option<i128> {
        match value {
            Value::R4(_) | Value::R8(_) => value.as_f64().and_then(Self::rounded),
            Value::Char(c) => Some(i128::from(u32::from(*c))),
            Value::String(text) => {
                let text = text.trim();
                text.parse::<i128>()
                    .ok()
                    .or_else(|| text.parse::<f64>().ok().and_then(Self::rounded))
            }
            other => other.as_integer(),
        }
    }

    fn to_float(value: &Value) -> Option<f64> {
        match value {
            Value::String(text) => text.trim().parse::<f64>().ok(),
            other => other.as_f64(),
        }
    }

    fn to_bool(value: &Value) -> Option<bool> {
        match value {
            Value::String(text) => {
                let text = text.trim();
                if text.eq_ignore_ascii_case("true") {
                    Some(true)
                } else if text.eq_ignore_ascii_case("false") {
                    Some(false)
                } else {
                    text.parse::<f64>().ok().map(|number| number != 0.0)
                }
            }
            Value::R4(_) | Value::R8(_) => value.as_f64().map(|number| number != 0.0),
            other => other.as_integer().map(|number| number != 0),
        }
    }

    fn to_char(value: &Value) -> Option<char> {
        match value {
            Value::String(text) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => None,
                }
            }
            other => other
                .as_integer()
                .and_then(|number| u32::try_from(number).ok())
                .and_then(char::from_u32),
        }
    }
}

impl TypeConverter for ValueTypeConverter {
    fn can_convert(&self, _value: &Value, target: &ScalarType) -> bool {
        target.is_value_type() && !target.is_enum() && !target.is_guid()
    }

    fn convert(&self, value: Value, target: &ScalarType) -> Result<Value> {
        let underlying = target.underlying();
        let converted = match underlying {
            ScalarType::Boolean => Self::to_bool(&value).map(Value::Boolean),
            ScalarType::Char => Self::to_char(&value).map(Value::Char),
            #[allow(clippy::cast_possible_truncation)]
            ScalarType::R4 => Self::to_float(&value).map(|number| Value::R4(number as f32)),
            ScalarType::R8 => Self::to_float(&value).map(Value::R8),
            integral if integral.is_integral() => match Self::to_integer(&value) {
                Some(number) => match Self::integral(integral, number) {
                    Some(converted) => Some(converted),
                    None => {
                        return Err(Error::InvalidFormat(format!(
                            "Value '{value}' was either too large or too small for {underlying}"
                        )))
                    }
                },
                None => None,
            },
            _ => None,
        };

        converted.ok_or_else(|| not_convertible(&value, target))
    }

    fn order(&self) -> i32 {
        1000
    }
}
