//! Thread isolation of the per-thread instance caches.

mod common;

use std::sync::{Arc, Barrier};

use common::*;
use rayon::prelude::*;
use rowgraph::{Mapper, Value};

#[test]
fn test_threads_never_share_cached_instances() {
    let mapper = Arc::new(Mapper::new());
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|thread| {
            let mapper = Arc::clone(&mapper);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                let name = format!("worker-{thread}");
                let first = mapper
                    .map_one::<Customer>(
                        row(&[("CustomerId", Value::from(1)), ("FirstName", Value::from(name.as_str()))]),
                        true,
                    )
                    .unwrap()
                    .unwrap();

                barrier.wait();

                let again = mapper
                    .map_one::<Customer>(row(&[("CustomerId", Value::from(1))]), true)
                    .unwrap()
                    .unwrap();
                assert!(Arc::ptr_eq(&first, &again));
                assert_eq!(again.read().unwrap().first_name, name);
                assert_eq!(mapper.cached_instances(), 1);
                first
            })
        })
        .collect();

    let customers: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    for (index, customer) in customers.iter().enumerate() {
        for other in &customers[index + 1..] {
            assert!(!Arc::ptr_eq(customer, other));
        }
    }
    assert_eq!(mapper.cached_instances(), 0);
}

#[test]
fn test_parallel_mapping_produces_complete_graphs() {
    let mapper = Mapper::new();

    let totals: Vec<usize> = (0..64i32)
        .into_par_iter()
        .map(|customer| {
            let rows: Vec<_> = (0..8i32)
                .map(|order| {
                    row(&[
                        ("CustomerId", Value::from(customer)),
                        ("Orders_OrderId", Value::from(order)),
                        ("Orders_OrderDetails_OrderDetailId", Value::from(order * 10)),
                    ])
                })
                .collect();

            let customers = mapper.map::<Customer>(rows, false).unwrap();
            assert_eq!(customers.len(), 1);
            let customer = customers[0].read().unwrap();
            customer
                .orders
                .iter()
                .map(|order| order.read().unwrap().order_details.len())
                .sum()
        })
        .collect();

    assert!(totals.iter().all(|&details| details == 8));
}

#[test]
fn test_configuration_changes_are_visible_across_threads() {
    let mapper = Arc::new(Mapper::new());
    mapper.add_identifiers::<Contact>(["Code"]);

    let worker = {
        let mapper = Arc::clone(&mapper);
        std::thread::spawn(move || {
            mapper
                .map::<Contact>(
                    [
                        row(&[("Code", Value::from(1)), ("Name", Value::from("a"))]),
                        row(&[("Code", Value::from(1)), ("Email", Value::from("a@x"))]),
                    ],
                    false,
                )
                .unwrap()
                .len()
        })
    };

    assert_eq!(worker.join().unwrap(), 1);
}
