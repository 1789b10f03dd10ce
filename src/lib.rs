// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # rowgraph
//!
//! Maps flat, denormalized records (the rows of a SQL join, dictionaries, JSON objects) into
//! strongly typed, nested object graphs.
//!
//! Keys address members by name, ignoring case; an underscore descends into a nested member
//! (`Orders_OrderId` is the `OrderId` of an element of `Orders`). Records that describe the same
//! entity, as identified by its identifier members, collapse into one shared instance, so a
//! join returning one row per order detail becomes one customer holding its orders, each holding
//! its details.
//!
//! ## Features
//!
//! - **Identity resolution** - Convention-based (`Id`, `{TypeName}Id`, `{TypeName}Nbr`), marked,
//!   or explicitly overridden identifiers, composite identities included
//! - **Nested graphs** - Single objects, back-references, collections and arrays of entities
//!   and of primitives
//! - **Value conversion** - Pluggable, ordered converters; Guid, enum and numeric coercion ship
//!   by default
//! - **Instance activation** - Pluggable, ordered activators in front of registered constructors
//! - **Scoped caching** - Per-thread caches for the convenience API and explicit
//!   [`MappingSession`]s
//!
//! ## Quick Start
//!
//! ### Using the Prelude
//!
//! ```rust
//! use rowgraph::prelude::*;
//!
//! #[derive(Default)]
//! struct Customer {
//!     customer_id: i32,
//!     first_name: String,
//!     orders: Vec<EntityRc<Order>>,
//! }
//!
//! #[derive(Default)]
//! struct Order {
//!     order_id: i32,
//!     total: f64,
//! }
//!
//! impl Entity for Customer {
//!     fn describe(ty: &mut TypeBuilder<Self>) {
//!         ty.default_constructor();
//!         ty.field("CustomerId", |c| &mut c.customer_id);
//!         ty.field("FirstName", |c| &mut c.first_name);
//!         ty.collection("Orders", |c| &mut c.orders);
//!     }
//! }
//!
//! impl Entity for Order {
//!     fn describe(ty: &mut TypeBuilder<Self>) {
//!         ty.default_constructor();
//!         ty.field("OrderId", |o| &mut o.order_id);
//!         ty.field("Total", |o| &mut o.total);
//!     }
//! }
//!
//! let rows = vec![
//!     vec![("CustomerId", Value::from(1)), ("FirstName", Value::from("Bob")),
//!          ("Orders_OrderId", Value::from(10)), ("Orders_Total", Value::from(9.5))],
//!     vec![("CustomerId", Value::from(1)), ("FirstName", Value::from("Bob")),
//!          ("Orders_OrderId", Value::from(11)), ("Orders_Total", Value::from(20.0))],
//! ];
//!
//! let customers = Mapper::new().map::<Customer>(rows, false)?;
//! assert_eq!(customers.len(), 1);
//! assert_eq!(customers[0].read().unwrap().orders.len(), 2);
//! # Ok::<(), rowgraph::Error>(())
//! ```
//!
//! ### Dynamic Input
//!
//! ```rust
//! use rowgraph::{Entity, Mapper, TypeBuilder};
//! use serde_json::json;
//!
//! #[derive(Default)]
//! struct Tag {
//!     id: i32,
//!     name: String,
//! }
//!
//! impl Entity for Tag {
//!     fn describe(ty: &mut TypeBuilder<Self>) {
//!         ty.default_constructor();
//!         ty.field("Id", |t| &mut t.id);
//!         ty.field("Name", |t| &mut t.name);
//!     }
//! }
//!
//! let tags = Mapper::new().map_dynamic_all::<Tag>(
//!     &json!([{ "Id": 1, "Name": "rust" }, { "Id": 2, "Name": "sql" }]),
//!     false,
//! )?;
//! assert_eq!(tags.len(), 2);
//! # Ok::<(), rowgraph::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`value`] - Dynamic scalar values, scalar types and flat records
//! - [`descriptor`] - Entity registration, member handles and the descriptor registry
//! - [`convert`] - Value converters
//! - [`activate`] - Instance activators
//! - [`identity`] - Identity keys and the instance cache
//! - [`populate`] - Recursive population of instances from records
//! - [`mapper`] - The mapping entry points and sessions
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`](Result). Errors are fatal to the call that raised
//! them and carry the member, value and types involved:
//!
//! ```rust
//! use rowgraph::{Error, Mapper};
//! # use rowgraph::{Entity, TypeBuilder};
//! # #[derive(Default)]
//! # struct Tag { id: i32 }
//! # impl Entity for Tag {
//! #     fn describe(ty: &mut TypeBuilder<Self>) {
//! #         ty.default_constructor();
//! #         ty.field("Id", |t| &mut t.id);
//! #     }
//! # }
//!
//! match Mapper::new().map_one::<Tag>([("Id", "not a number")], false) {
//!     Err(Error::Conversion { context, .. }) => assert_eq!(context.member, "Id"),
//!     Err(other) => panic!("unexpected error: {other}"),
//!     Ok(_) => panic!("expected a conversion error"),
//! }
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (cache clears and mapping summaries at `debug`, identity
//! resolution and back-reference wiring at `trace`) and never installs a subscriber.

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use rowgraph::prelude::*;
///
/// let mapper = Mapper::with_config(Configuration::case_insensitive_enums());
/// assert_eq!(mapper.config().converter_count(), 3);
/// ```
pub mod prelude;

pub mod activate;
pub mod convert;
pub mod descriptor;
pub mod identity;
pub mod mapper;
pub mod populate;
pub mod value;

mod config;

use std::sync::OnceLock;

/// `rowgraph` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

pub use error::{Error, MemberContext};

pub use activate::{FnActivator, TypeActivator};
pub use config::{Configuration, NamingConvention};
pub use convert::{EnumConverter, GuidConverter, TypeConverter, ValueTypeConverter};
pub use descriptor::{
    Entity, EntityRc, EntityType, EntityWeak, Instance, MemberAccess, MemberBuilder,
    MemberHandle, MemberKind, TypeBuilder, TypeDescriptor, TypeRegistry,
};
pub use identity::{IdentityKey, InstanceCache, Resolved};
pub use mapper::{Mapper, MappingSession};
pub use populate::Populator;
pub use value::{EnumType, EnumValue, FlatRecord, MappedEnum, ScalarType, ScalarValue, Value};

/// The process-wide default mapper behind the free functions of this crate.
///
/// It starts with [`Configuration::default`]; identifiers, conventions, converters and activators
/// added to it apply to every later call of the free functions.
pub fn global() -> &'static Mapper {
    static GLOBAL: OnceLock<Mapper> = OnceLock::new();
    GLOBAL.get_or_init(Mapper::new)
}

/// Map `records` with the [`global`] mapper; see [`Mapper::map`].
///
/// # Errors
/// Returns the first conversion, assignment, format or activation error.
pub fn map<T: Entity>(
    records: impl IntoIterator<Item = impl Into<FlatRecord>>,
    keep_cache: bool,
) -> Result<Vec<EntityRc<T>>> {
    global().map::<T>(records, keep_cache)
}

/// Map one record with the [`global`] mapper; see [`Mapper::map_one`].
///
/// # Errors
/// Returns the first conversion, assignment, format or activation error.
pub fn map_one<T: Entity>(
    record: impl Into<FlatRecord>,
    keep_cache: bool,
) -> Result<Option<EntityRc<T>>> {
    global().map_one::<T>(record, keep_cache)
}

/// Map a JSON object with the [`global`] mapper; see [`Mapper::map_dynamic`].
///
/// # Errors
/// Returns [`Error::InvalidArgument`] for anything but `null` or a flat object.
pub fn map_dynamic<T: Entity>(
    value: &serde_json::Value,
    keep_cache: bool,
) -> Result<Option<EntityRc<T>>> {
    global().map_dynamic::<T>(value, keep_cache)
}

/// Map a JSON array of objects with the [`global`] mapper; see [`Mapper::map_dynamic_all`].
///
/// # Errors
/// Returns [`Error::InvalidArgument`] for anything but `null` or an array of flat objects.
pub fn map_dynamic_all<T: Entity>(
    values: &serde_json::Value,
    keep_cache: bool,
) -> Result<Vec<EntityRc<T>>> {
    global().map_dynamic_all::<T>(values, keep_cache)
}

/// Drop the calling thread's cached instances of the [`global`] mapper
pub fn clear_instance_cache() {
    global().clear_instance_cache();
}

/// Drop the [`global`] mapper's descriptors and the calling thread's cached instances
pub fn clear_all_caches() {
    global().clear_all_caches();
}
