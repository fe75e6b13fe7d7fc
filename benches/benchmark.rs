use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dgm::{collapse, diversity_pvalue, Shingles};

const TEMPLATE: &[u8] = b"GATTACACTGGCTAGCTTACGCAATCGGTCAAGTCCATGACTTGACGAAGTCCGGTTACGATGCCATTAGCAT";

fn variant_windows(n: usize) -> Vec<Vec<u8>> {
    (0..n)
        .map(|i| {
            let mut window = TEMPLATE.to_vec();
            window[20] = b"ACGT"[i % 4];
            window[45] = b"ACGT"[(i / 4) % 4];
            window
        })
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    let windows = variant_windows(50);
    let a = Shingles::new(&windows[0], 7);
    let b = Shingles::new(&windows[5], 7);
    c.bench_function("jaccard l7", |bencher| {
        bencher.iter(|| black_box(&a).jaccard(black_box(&b)))
    });
    c.bench_function("collapse 50 windows", |bencher| {
        bencher.iter(|| collapse(black_box(&windows), 7, 0.25))
    });
    c.bench_function("diversity pvalue", |bencher| {
        bencher.iter(|| diversity_pvalue(black_box(&[30, 12, 5, 3]), 0.01))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
