use strum::{IntoStaticStr, VariantArray};

use crate::{Entity, EntityRc, EntityWeak, FlatRecord, TypeBuilder, Value};

/// Build a record from literal pairs
pub fn record(pairs: &[(&str, Value)]) -> FlatRecord {
    pairs
        .iter()
        .map(|(key, value)| (*key, value.clone()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, VariantArray, IntoStaticStr)]
pub enum Gender {
    #[default]
    Unknown = 0,
    Female = 1,
    Male = 2,
}

crate::mapped_enum!(Gender);

#[derive(Debug, Default)]
pub struct Customer {
    pub customer_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub orders: Vec<EntityRc<Order>>,
    pub address: Option<EntityRc<Address>>,
}

impl Entity for Customer {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.default_constructor();
        ty.field("CustomerId", |c| &mut c.customer_id);
        ty.field("FirstName", |c| &mut c.first_name);
        ty.field("LastName", |c| &mut c.last_name);
        ty.collection("Orders", |c| &mut c.orders);
        ty.object("Address", |c| &mut c.address);
    }
}

#[derive(Debug, Default)]
pub struct Order {
    pub order_id: i32,
    pub total: f64,
    pub customer: Option<EntityWeak<Customer>>,
    pub shipping: Option<EntityRc<Address>>,
}

impl Entity for Order {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.default_constructor();
        ty.field("OrderId", |o| &mut o.order_id);
        ty.field("Total", |o| &mut o.total);
        ty.reference("Customer", |o| &mut o.customer);
        ty.object("Shipping", |o| &mut o.shipping);
    }
}

#[derive(Debug, Default)]
pub struct Address {
    pub id: i32,
    pub city: String,
    pub street: String,
}

impl Entity for Address {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.default_constructor();
        ty.field("Id", |a| &mut a.id);
        ty.field("City", |a| &mut a.city);
        ty.field("Street", |a| &mut a.street);
    }
}

#[derive(Debug, Default)]
pub struct Person {
    pub id: i32,
    pub gender: Gender,
    pub preferred_gender: Option<Gender>,
}

impl Entity for Person {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.default_constructor();
        ty.field("Id", |p| &mut p.id);
        ty.field("Gender", |p| &mut p.gender);
        ty.field("PreferredGender", |p| &mut p.preferred_gender);
    }
}

#[derive(Debug, Default)]
pub struct Tagged {
    pub id: i32,
    pub tags: Vec<String>,
    pub scores: Box<[i32]>,
}

impl Entity for Tagged {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.default_constructor();
        ty.field("Id", |t| &mut t.id);
        ty.primitives("Tags", |t| &mut t.tags);
        ty.primitive_array("Scores", |t| &mut t.scores);
    }
}

/// Identified by two marked members
#[derive(Debug, Default)]
pub struct Pair {
    pub left: i32,
    pub right: i32,
    pub label: String,
}

impl Entity for Pair {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.default_constructor();
        ty.field("Left", |p| &mut p.left).identifier();
        ty.field("Right", |p| &mut p.right).identifier();
        ty.field("Label", |p| &mut p.label);
    }
}

/// No identifiers and no constructor
#[derive(Debug)]
pub struct Keyless {
    pub label: String,
}

impl Entity for Keyless {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.field("Label", |k| &mut k.label);
    }
}
