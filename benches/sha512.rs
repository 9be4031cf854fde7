use sha2_kernels::{sha512, Backend};

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

pub fn bench_sha512(c: &mut Criterion) {
    let data = vec![0u8; 8192];
    for backend in Backend::ALL {
        if !backend.available() {
            continue;
        }
        c.bench_function(&format!("sha512 8 KiB {:?}", backend), |b| {
            b.iter(|| {
                let mut out = [0u8; 64];
                sha512(&mut out, black_box(&data), backend);
                out
            })
        });
    }
}

criterion_group!(benches, bench_sha512);
criterion_main!(benches);
