//! Shared entity models for the integration tests.

#![allow(dead_code)]

use rowgraph::{Entity, EntityRc, EntityWeak, FlatRecord, TypeBuilder, Value};
use strum::{IntoStaticStr, VariantArray};
use uguid::Guid;

/// Route the crate's trace events into the test output; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

/// Build a record from literal pairs
pub fn row(pairs: &[(&str, Value)]) -> FlatRecord {
    pairs
        .iter()
        .map(|(key, value)| (*key, value.clone()))
        .collect()
}

#[derive(Debug, Default)]
pub struct Customer {
    pub customer_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub orders: Vec<EntityRc<Order>>,
}

impl Entity for Customer {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.default_constructor();
        ty.field("CustomerId", |c| &mut c.customer_id);
        ty.field("FirstName", |c| &mut c.first_name);
        ty.field("LastName", |c| &mut c.last_name);
        ty.collection("Orders", |c| &mut c.orders);
    }
}

#[derive(Debug, Default)]
pub struct Order {
    pub order_id: i32,
    pub order_total: f64,
    pub customer: Option<EntityWeak<Customer>>,
    pub order_details: Vec<EntityRc<OrderDetail>>,
}

impl Entity for Order {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.default_constructor();
        ty.field("OrderId", |o| &mut o.order_id);
        ty.field("OrderTotal", |o| &mut o.order_total);
        ty.reference("Customer", |o| &mut o.customer);
        ty.collection("OrderDetails", |o| &mut o.order_details);
    }
}

#[derive(Debug, Default)]
pub struct OrderDetail {
    pub order_detail_id: i32,
    pub order_detail_total: f64,
}

impl Entity for OrderDetail {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.default_constructor();
        ty.field("OrderDetailId", |d| &mut d.order_detail_id);
        ty.field("OrderDetailTotal", |d| &mut d.order_detail_total);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, VariantArray, IntoStaticStr)]
pub enum Gender {
    #[default]
    Unknown = 0,
    Female = 1,
    Male = 2,
}

rowgraph::mapped_enum!(Gender);

#[derive(Debug, Default)]
pub struct Person {
    pub id: i32,
    pub name: String,
    pub gender: Gender,
    pub preferred_gender: Option<Gender>,
}

impl Entity for Person {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.default_constructor();
        ty.field("Id", |p| &mut p.id);
        ty.property("Name", |p| p.name.clone(), |p, name| p.name = name);
        ty.field("Gender", |p| &mut p.gender);
        ty.field("PreferredGender", |p| &mut p.preferred_gender);
    }
}

/// Identifies itself by `Id` and nests collections of its own type
#[derive(Debug, Default)]
pub struct NameValue {
    pub id: i32,
    pub name: String,
    pub phones: Vec<EntityRc<NameValue>>,
    pub emails: Vec<EntityRc<NameValue>>,
}

impl Entity for NameValue {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.default_constructor();
        ty.field("Id", |n| &mut n.id);
        ty.field("Name", |n| &mut n.name);
        ty.collection("Phones", |n| &mut n.phones);
        ty.collection("Emails", |n| &mut n.emails);
    }
}

#[derive(Debug, Default)]
pub struct Club {
    pub id: i32,
    pub members: Vec<EntityRc<Member>>,
}

impl Entity for Club {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.default_constructor();
        ty.field("Id", |c| &mut c.id);
        ty.collection("Members", |c| &mut c.members);
    }
}

#[derive(Debug, Default)]
pub struct Member {
    pub id: i32,
    pub sub_members: Vec<EntityRc<SubMember>>,
}

impl Entity for Member {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.default_constructor();
        ty.field("Id", |m| &mut m.id);
        ty.collection("SubMembers", |m| &mut m.sub_members);
    }
}

#[derive(Debug, Default)]
pub struct SubMember {
    pub id: i32,
}

impl Entity for SubMember {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.default_constructor();
        ty.field("Id", |s| &mut s.id);
    }
}

/// No member follows a naming convention
#[derive(Debug, Default)]
pub struct Contact {
    pub code: i32,
    pub name: String,
    pub email: String,
}

impl Entity for Contact {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.default_constructor();
        ty.field("Code", |c| &mut c.code);
        ty.field("Name", |c| &mut c.name);
        ty.field("Email", |c| &mut c.email);
    }
}

#[derive(Debug, Default)]
pub struct Playlist {
    pub id: i32,
    pub songs: Box<[EntityRc<Song>]>,
    pub ratings: Box<[i32]>,
    pub tags: Vec<String>,
}

impl Entity for Playlist {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.default_constructor();
        ty.field("Id", |p| &mut p.id);
        ty.array("Songs", |p| &mut p.songs);
        ty.primitive_array("Ratings", |p| &mut p.ratings);
        ty.primitives("Tags", |p| &mut p.tags);
    }
}

#[derive(Debug, Default)]
pub struct Song {
    pub id: i32,
    pub title: String,
}

impl Entity for Song {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.default_constructor();
        ty.field("Id", |s| &mut s.id);
        ty.field("Title", |s| &mut s.title);
    }
}

#[derive(Debug)]
pub struct Document {
    pub document_nbr: i64,
    pub key: Guid,
    pub alternate: Option<Guid>,
}

impl Default for Document {
    fn default() -> Self {
        Document {
            document_nbr: 0,
            key: Guid::ZERO,
            alternate: None,
        }
    }
}

impl Entity for Document {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.default_constructor();
        ty.field("DocumentNbr", |d| &mut d.document_nbr);
        ty.field("Key", |d| &mut d.key);
        ty.field("Alternate", |d| &mut d.alternate);
    }
}

/// Needs an activator: registers no constructor
#[derive(Debug)]
pub struct Sealed {
    pub id: i32,
    pub origin: &'static str,
}

impl Entity for Sealed {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.field("Id", |s| &mut s.id);
    }
}

/// Composite identity of two marked members
#[derive(Debug, Default)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
    pub label: String,
}

impl Entity for Coordinate {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.default_constructor();
        ty.field("X", |c| &mut c.x).identifier();
        ty.field("Y", |c| &mut c.y).identifier();
        ty.field("Label", |c| &mut c.label);
    }
}
