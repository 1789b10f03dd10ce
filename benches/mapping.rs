//! Benchmarks for record mapping.
//!
//! Measures mapping throughput for the typical shapes of joined result sets:
//! - Flat rows without nesting
//! - One customer per row group with nested orders and details (three-level join)
//! - The same join from JSON input
//! - Repeated mapping against a warm instance cache

extern crate rowgraph;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rowgraph::{Entity, EntityRc, FlatRecord, Mapper, TypeBuilder, Value};
use serde_json::json;
use std::hint::black_box;

#[derive(Default)]
struct Customer {
    customer_id: i32,
    first_name: String,
    last_name: String,
    orders: Vec<EntityRc<Order>>,
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

#[derive(Default)]
struct Order {
    order_id: i32,
    order_total: f64,
    order_details: Vec<EntityRc<OrderDetail>>,
}

impl Entity for Order {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.default_constructor();
        ty.field("OrderId", |o| &mut o.order_id);
        ty.field("OrderTotal", |o| &mut o.order_total);
        ty.collection("OrderDetails", |o| &mut o.order_details);
    }
}

#[derive(Default)]
struct OrderDetail {
    order_detail_id: i32,
    order_detail_total: f64,
}

impl Entity for OrderDetail {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.default_constructor();
        ty.field("OrderDetailId", |d| &mut d.order_detail_id);
        ty.field("OrderDetailTotal", |d| &mut d.order_detail_total);
    }
}

/// `customers` customers with 4 orders of 4 details each, one row per detail
fn joined_rows(customers: i32) -> Vec<FlatRecord> {
    let mut rows = Vec::new();
    for customer in 0..customers {
        for order in 0..4 {
            for detail in 0..4 {
                rows.push(FlatRecord::from([
                    ("CustomerId", Value::from(customer)),
                    ("FirstName", Value::from("Bob")),
                    ("LastName", Value::from("Smith")),
                    ("Orders_OrderId", Value::from(customer * 10 + order)),
                    ("Orders_OrderTotal", Value::from(100.0)),
                    ("Orders_OrderDetails_OrderDetailId", Value::from(order * 10 + detail)),
                    ("Orders_OrderDetails_OrderDetailTotal", Value::from(25.0)),
                ]));
            }
        }
    }
    rows
}

/// Benchmark mapping rows that only carry scalar members.
fn bench_flat_rows(c: &mut Criterion) {
    let mapper = Mapper::new();
    let rows: Vec<FlatRecord> = (0..1000i32)
        .map(|id| {
            FlatRecord::from([
                ("CustomerId", Value::from(id)),
                ("FirstName", Value::from("Bob")),
                ("LastName", Value::from("Smith")),
            ])
        })
        .collect();

    let mut group = c.benchmark_group("flat");
    group.throughput(Throughput::Elements(rows.len() as u64));
    group.bench_function("customers_1000", |b| {
        b.iter(|| {
            let customers = mapper.map::<Customer>(black_box(rows.clone()), false).unwrap();
            black_box(customers)
        });
    });
    group.finish();
}

/// Benchmark the three-level customer / order / detail join at several sizes.
fn bench_nested_join(c: &mut Criterion) {
    let mapper = Mapper::new();
    let mut group = c.benchmark_group("nested_join");

    for customers in [10, 100, 500] {
        let rows = joined_rows(customers);
        group.throughput(Throughput::Elements(rows.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(customers), &rows, |b, rows| {
            b.iter(|| {
                let customers = mapper.map::<Customer>(black_box(rows.clone()), false).unwrap();
                black_box(customers)
            });
        });
    }
    group.finish();
}

/// Benchmark the nested join from JSON objects, including record conversion.
fn bench_dynamic_join(c: &mut Criterion) {
    let mapper = Mapper::new();
    let rows = serde_json::Value::Array(
        (0..100)
            .flat_map(|customer| {
                (0..16).map(move |detail| {
                    json!({
                        "CustomerId": customer,
                        "FirstName": "Bob",
                        "Orders_OrderId": customer * 10 + detail / 4,
                        "Orders_OrderDetails_OrderDetailId": detail,
                    })
                })
            })
            .collect(),
    );

    c.bench_function("dynamic_join_100", |b| {
        b.iter(|| {
            let customers = mapper.map_dynamic_all::<Customer>(black_box(&rows), false).unwrap();
            black_box(customers)
        });
    });
}

/// Benchmark remapping known identities against a warm cache.
fn bench_warm_cache(c: &mut Criterion) {
    let mapper = Mapper::new();
    let rows = joined_rows(100);
    mapper.map::<Customer>(rows.clone(), true).unwrap();

    c.bench_function("warm_cache_100", |b| {
        b.iter(|| {
            let customers = mapper.map::<Customer>(black_box(rows.clone()), true).unwrap();
            black_box(customers)
        });
    });
    mapper.clear_instance_cache();
}

criterion_group!(
    benches,
    bench_flat_rows,
    bench_nested_join,
    bench_dynamic_join,
    bench_warm_cache
);
criterion_main!(benches);
