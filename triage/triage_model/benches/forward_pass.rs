use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use triage_model::{Classifier, FeedForwardNet};

fn bench_forward(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let net = FeedForwardNet::new(15, &[128, 64], 5, &mut rng).expect("network");
    let x: Vec<f64> = (0..15).map(|i| i as f64 / 15.0).collect();

    c.bench_function("forward_15_128_64_5", |b| {
        b.iter(|| net.predict_proba(black_box(&x)).expect("predict"))
    });
}

criterion_group!(benches, bench_forward);
criterion_main!(benches);
