use thiserror::Error;

/// Builds an [`Error::Conversion`] or [`Error::Assignment`] from a [`MemberContext`] and a message.
///
/// ```rust, ignore
/// return Err(mapping_error!(Conversion, context, "value is out of range for {}", target));
/// ```
macro_rules! mapping_error {
    // Single string version
    ($variant:ident, $context:expr, $msg:expr) => {
        crate::Error::$variant {
            message: $msg.to_string(),
            context: Box::new($context),
        }
    };

    // Format string with arguments version
    ($variant:ident, $context:expr, $fmt:expr, $($arg:tt)*) => {
        crate::Error::$variant {
            message: format!($fmt, $($arg)*),
            context: Box::new($context),
        }
    };
}

/// Diagnostic context attached to conversion and assignment failures.
///
/// Captures everything needed to explain which value failed to land on which member:
/// the member and its declaring type, the rejected value and the runtime type it had,
/// and the type the member declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberContext {
    /// Name of the member that was being populated
    pub member: String,
    /// Display form of the rejected value
    pub value: String,
    /// Runtime type of the rejected value
    pub value_type: String,
    /// Type the member declares
    pub target_type: String,
    /// Type that declares the member
    pub declaring_type: String,
}

impl std::fmt::Display for MemberContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "An error occurred while mapping the value '{}' of type {} to the member name '{}' of type {} on the {} type.",
            self.value, self.value_type, self.member, self.target_type, self.declaring_type
        )
    }
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every error is fatal to the mapping call that raised it: the orchestrator never catches,
/// retries or returns partial results.
///
/// # Error Categories
///
/// ## Input Errors
/// - [`Error::InvalidArgument`] - Input can not be viewed as a flat key-value record
/// - [`Error::InvalidFormat`] - A primitive element without a `$` key, or unparsable text
///
/// ## Member Errors
/// - [`Error::Conversion`] - A converter failed to coerce a value to the member type
/// - [`Error::Assignment`] - A (converted) value could not be stored on the member
///
/// ## Construction Errors
/// - [`Error::Activation`] - No activator or constructor could create the requested type
/// - [`Error::LockError`] - A shared instance lock was poisoned
///
/// # Examples
///
/// ```rust
/// use rowgraph::{Error, FlatRecord};
///
/// let rejected = FlatRecord::from_json(&serde_json::json!([1, 2, 3]));
/// match rejected {
///     Err(Error::InvalidArgument(message)) => eprintln!("not a record: {message}"),
///     Err(e) => eprintln!("other error: {e}"),
///     Ok(_) => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The supplied object can not be treated as a flat key-value record.
    ///
    /// Raised by the dynamic entry points when the input is neither `null` nor a JSON object
    /// (or, for sequences, an array of JSON objects), and when a record carries nested
    /// arrays or objects as values.
    #[error("{0}")]
    InvalidArgument(String),

    /// A value could not be converted to the declared type of a member.
    ///
    /// # Fields
    ///
    /// * `message` - What the converter reported
    /// * `context` - The member, value and types involved
    #[error("{message}: {context}")]
    Conversion {
        /// The message reported by the failing converter
        message: String,
        /// The member, value and types involved
        context: Box<MemberContext>,
    },

    /// A value could not be stored on a member.
    ///
    /// This happens when no converter claimed the value and its runtime type still does not
    /// match the member, or when a nested member is handed a value of the wrong kind.
    #[error("{message}: {context}")]
    Assignment {
        /// Why the store was rejected
        message: String,
        /// The member, value and types involved
        context: Box<MemberContext>,
    },

    /// Input text or bytes have the wrong shape.
    ///
    /// Returned when an element of a primitive collection is mapped without a `$` key, and by
    /// the stock converters for unparsable Guids, enum names and numbers.
    #[error("{0}")]
    InvalidFormat(String),

    /// No activator or constructor could produce an instance of the requested type.
    #[error("Unable to create an instance of {type_name} - {message}")]
    Activation {
        /// The type that was requested
        type_name: String,
        /// Why creation failed
        message: String,
    },

    /// Failed to lock target.
    ///
    /// Mapped instances are shared behind `RwLock`s; this error is returned when one of them
    /// was poisoned by a panic on another thread.
    #[error("Failed to lock target")]
    LockError,
}
