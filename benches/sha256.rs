use sha2_kernels::{sha256, Backend};

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

pub fn bench_sha256(c: &mut Criterion) {
    let data = vec![0u8; 8192];
    for backend in Backend::ALL {
        if !backend.available() {
            continue;
        }
        c.bench_function(&format!("sha256 8 KiB {:?}", backend), |b| {
            b.iter(|| {
                let mut out = [0u8; 32];
                sha256(&mut out, black_box(&data), backend);
                out
            })
        });
    }
}

criterion_group!(benches, bench_sha256);
criterion_main!(benches);
