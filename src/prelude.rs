//! # rowgraph Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the rowgraph library. Import this module to get quick access to everything needed to
//! describe entities and map records into them.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all rowgraph operations
pub use crate::Error;

/// The result type used throughout rowgraph
pub use crate::Result;

/// Diagnostic context of member conversion and assignment errors
pub use crate::MemberContext;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Mapper, its sessions and configuration
pub use crate::{Configuration, Mapper, MappingSession};

// ================================================================================================
// Entity Description
// ================================================================================================

/// Mapped types, their shared handles and member registration
pub use crate::{Entity, EntityRc, EntityType, EntityWeak, MemberBuilder, TypeBuilder};

// ================================================================================================
// Values and Records
// ================================================================================================

/// Dynamic values, scalar types and flat records
pub use crate::{FlatRecord, MappedEnum, ScalarType, ScalarValue, Value};

// ================================================================================================
// Extension Points
// ================================================================================================

/// Converter and activator traits with their stock implementations
pub use crate::{FnActivator, Instance, TypeActivator, TypeConverter};
