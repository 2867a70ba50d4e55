//! Benchmarks for the clock recovery pipeline.
//!
//! Run with: cargo bench --bench cdr_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use cdr_core::prelude::*;
use cdr_core::square_wave::{
    fill_durations, fill_durations_scalar, fill_squarewave, fill_squarewave_scalar,
};
use cdr_core::waveform::SparseWaveform;

fn capture_with_offsets(len: usize) -> SparseWaveform<bool> {
    let mut cap = SparseWaveform::clock_capture();
    cap.offsets = (0..len as i64).map(|i| i * 1_000_000).collect();
    cap
}

fn bench_squarewave_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("squarewave_fill");

    for &len in &[1_000usize, 64_000, 1_000_000] {
        group.throughput(Throughput::Elements(len as u64));

        group.bench_with_input(BenchmarkId::new("scalar", len), &len, |b, &len| {
            let mut cap = capture_with_offsets(len);
            b.iter(|| fill_squarewave_scalar(black_box(&mut cap)))
        });

        group.bench_with_input(BenchmarkId::new("dispatched", len), &len, |b, &len| {
            let mut cap = capture_with_offsets(len);
            b.iter(|| fill_squarewave(black_box(&mut cap)))
        });
    }

    group.finish();
}

fn bench_duration_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("duration_fill");

    for &len in &[1_000usize, 64_000, 1_000_000] {
        group.throughput(Throughput::Elements(len as u64));

        group.bench_with_input(BenchmarkId::new("scalar", len), &len, |b, &len| {
            let mut cap = capture_with_offsets(len);
            b.iter(|| fill_durations_scalar(black_box(&mut cap)))
        });

        group.bench_with_input(BenchmarkId::new("dispatched", len), &len, |b, &len| {
            let mut cap = capture_with_offsets(len);
            b.iter(|| fill_durations(black_box(&mut cap)))
        });
    }

    group.finish();
}

fn bench_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("refresh");

    // 1 Gbps alternating data sampled at 10 GS/s
    for &nbits in &[1_000usize, 10_000] {
        let samples: Vec<bool> = (0..nbits * 10).map(|i| (i / 10) % 2 == 0).collect();
        let input = InputWaveform::UniformDigital(UniformWaveform::new(100_000, 0, samples));

        group.throughput(Throughput::Elements(nbits as u64));
        group.bench_with_input(BenchmarkId::new("ungated", nbits), &input, |b, input| {
            let mut cdr = CdrFilter::new(CdrParams::new().with_symbol_rate(1.0e9));
            b.iter(|| cdr.refresh(black_box(Some(input)), None).unwrap())
        });

        let gate_len = nbits * 10;
        let gate = GateWaveform::Uniform(UniformWaveform::new(
            100_000,
            0,
            vec![true; gate_len],
        ));
        group.bench_with_input(BenchmarkId::new("gated", nbits), &input, |b, input| {
            let mut cdr = CdrFilter::new(CdrParams::new().with_symbol_rate(1.0e9));
            b.iter(|| cdr.refresh(black_box(Some(input)), Some(&gate)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_squarewave_fill,
    bench_duration_fill,
    bench_refresh
);
criterion_main!(benches);
