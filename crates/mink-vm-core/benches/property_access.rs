use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use mink_vm_core::{Runtime, Value};

fn bench_property_access(c: &mut Criterion) {
    let mut rt = Runtime::new();
    let obj = rt.new_object();
    for i in 0..16 {
        obj.put(&mut rt, &format!("prop{i}"), Value::Number(i as f64), false)
            .unwrap();
    }

    c.bench_function("own_property_get", |b| {
        b.iter(|| black_box(obj.get(&mut rt, "prop7").unwrap()))
    });

    c.bench_function("own_property_put", |b| {
        b.iter(|| obj.put(&mut rt, "prop7", black_box(Value::Number(1.0)), false).unwrap())
    });

    let deep = {
        let mut proto = obj.clone();
        for _ in 0..8 {
            proto = rt.new_base_object(Some(proto), "Object");
        }
        proto
    };
    c.bench_function("chain_property_get", |b| {
        b.iter(|| black_box(deep.get(&mut rt, "prop7").unwrap()))
    });

    c.bench_function("own_enumeration", |b| {
        b.iter(|| obj.enumerate(false, false).count())
    });
}

criterion_group!(benches, bench_property_access);
criterion_main!(benches);
