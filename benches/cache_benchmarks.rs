use criterion::{black_box, criterion_group, criterion_main, Criterion};
use groupcache_rs::{HashRing, SingleFlight, TieredCache, TieredCacheConfig};
use std::num::NonZeroUsize;

fn make_cache(cap: usize, k: usize) -> TieredCache<String, u64> {
    TieredCache::new(TieredCacheConfig::new(cap, NonZeroUsize::new(k).unwrap()))
}

pub fn criterion_benchmark(c: &mut Criterion) {
    const CACHE_SIZE: usize = 1000;

    let mut group = c.benchmark_group("TieredCache");

    group.bench_function("add_cold_keys", |b| {
        let mut cache = make_cache(CACHE_SIZE, 2);
        let mut i: u64 = 0;
        b.iter(|| {
            cache.add(format!("key{i}"), i);
            i += 1;
        });
    });

    group.bench_function("get_protected_hit", |b| {
        let mut cache = make_cache(CACHE_SIZE, 2);
        for i in 0..CACHE_SIZE as u64 {
            let key = format!("key{i}");
            cache.add(key.clone(), i);
            cache.add(key, i); // promote
        }
        let mut i: u64 = 0;
        b.iter(|| {
            let key = format!("key{}", i % CACHE_SIZE as u64);
            black_box(cache.get(&key));
            i += 1;
        });
    });

    group.bench_function("mixed_scan_with_hot_set", |b| {
        let mut cache = make_cache(CACHE_SIZE, 2);
        for i in 0..100u64 {
            let key = format!("hot{i}");
            cache.add(key.clone(), i);
            cache.add(key, i);
        }
        let mut i: u64 = 0;
        b.iter(|| {
            if i % 4 == 0 {
                black_box(cache.get(&format!("hot{}", i % 100)));
            } else {
                cache.add(format!("scan{i}"), i);
            }
            i += 1;
        });
    });

    group.finish();

    let mut group = c.benchmark_group("HashRing");

    group.bench_function("lookup_3_nodes_50_replicas", |b| {
        let mut ring = HashRing::new(50);
        ring.add_nodes(["cache-a:8001", "cache-b:8001", "cache-c:8001"]);
        let mut i: u64 = 0;
        b.iter(|| {
            black_box(ring.lookup(&format!("key{i}")));
            i += 1;
        });
    });

    group.finish();

    let mut group = c.benchmark_group("SingleFlight");

    group.bench_function("uncontended_run", |b| {
        let flight: SingleFlight<u64> = SingleFlight::new();
        let mut i: u64 = 0;
        b.iter(|| {
            let value = flight.run("key", || Ok(i)).unwrap();
            black_box(value);
            i += 1;
        });
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
