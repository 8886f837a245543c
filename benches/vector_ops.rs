use advanced_vector::Vector;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn bench_push(c: &mut Criterion) {
	let mut group = c.benchmark_group("push_1000");

	group.bench_function("std_vec", |b| {
		b.iter(|| {
			let mut v = Vec::new();
			for i in 0..1000 {
				v.push(black_box(i));
			}
			v
		})
	});

	group.bench_function("vector", |b| {
		b.iter(|| {
			let mut v = Vector::new();
			for i in 0..1000 {
				v.push(black_box(i));
			}
			v
		})
	});

	group.bench_function("vector_reserved", |b| {
		b.iter(|| {
			let mut v = Vector::new();
			v.reserve(1000);
			for i in 0..1000 {
				v.push(black_box(i));
			}
			v
		})
	});

	group.finish();
}

fn bench_insert_front(c: &mut Criterion) {
	c.bench_function("insert_front_256", |b| {
		b.iter(|| {
			let mut v = Vector::new();
			for i in 0..256 {
				v.insert(0, black_box(i));
			}
			v
		})
	});
}

fn bench_iter(c: &mut Criterion) {
	let v: Vector<i64> = (0..10_000).collect();
	c.bench_function("iter_sum_10k", |b| {
		b.iter(|| {
			let mut sum = 0;
			for &x in black_box(&v) {
				sum += x;
			}
			sum
		})
	});
}

fn bench_clone(c: &mut Criterion) {
	let v: Vector<String> = (0..1000).map(|i| i.to_string()).collect();
	c.bench_function("clone_1000_strings", |b| b.iter(|| black_box(&v).clone()));
}

criterion_group!(benches, bench_push, bench_insert_front, bench_iter, bench_clone);
criterion_main!(benches);
