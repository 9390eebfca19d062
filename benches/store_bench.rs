use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;
use urlstore::{gen_key, UrlEngine, UrlStore};

fn register_bench(c: &mut Criterion) {
    c.bench_function("register", |b| {
        b.iter_batched(
            || {
                let temp_dir = TempDir::new().unwrap();
                let store = UrlStore::open(temp_dir.path().join("urls.log")).unwrap();
                (store, temp_dir)
            },
            |(store, _temp_dir)| {
                for i in 0..100 {
                    store.register(format!("http://example.com/{}", i)).unwrap();
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn resolve_bench(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let store = UrlStore::open(temp_dir.path().join("urls.log")).unwrap();
    for i in 0..1000 {
        store.register(format!("http://example.com/{}", i)).unwrap();
    }
    let mut rng = SmallRng::from_seed([0; 32]);

    c.bench_function("resolve", |b| {
        b.iter(|| {
            let key = gen_key(rng.gen_range(0..1000));
            assert!(store.resolve(&key).unwrap().is_some());
        })
    });
}

criterion_group!(benches, register_bench, resolve_bench);
criterion_main!(benches);
