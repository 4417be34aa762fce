// Run with:  cargo bench --bench refresh_cycle

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ledcube_framebuffer::bus::ShiftBus;
use ledcube_framebuffer::frame::FrameStore;
use ledcube_framebuffer::refresh::RefreshEngine;
use ledcube_framebuffer::{compute_cycle_steps, Frame, PanelId, Pixel};
use std::hint::black_box;
use std::time::Duration;

/// Bus that only feeds every line change through `black_box`.
struct SinkBus;

impl ShiftBus for SinkBus {
    fn set_data(&mut self, high: bool) {
        black_box(high);
    }

    fn set_clock(&mut self, high: bool) {
        black_box(high);
    }

    fn set_latch(&mut self, high: bool) {
        black_box(high);
    }

    fn set_blank(&mut self, blanked: bool) {
        black_box(blanked);
    }

    fn select_row(&mut self, row: u8) {
        black_box(row);
    }
}

fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(100)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(2))
        .confidence_level(0.95)
        .significance_level(0.05)
}

fn gradient<const BITS: u8>(frames: &mut FrameStore<BITS>) {
    for id in PanelId::CHAIN {
        let panel = frames.panel_mut(Frame::Display, id);
        for y in 0..8 {
            for x in 0..8 {
                let level = (x + y + id.index()) as u8;
                panel.set_pixel(x, y, &Pixel::new(level, level / 2, level / 3));
            }
        }
    }
}

fn bench_cycle<const BITS: u8>(c: &mut Criterion, name: &str) {
    let mut group = c.benchmark_group("refresh_cycle");
    group.throughput(Throughput::Elements(compute_cycle_steps(BITS) as u64));

    let mut frames = FrameStore::<BITS>::default();
    gradient(&mut frames);
    let (_animate, mut display) = frames.split();
    let mut engine = RefreshEngine::<_, BITS>::new(SinkBus);

    group.bench_function(BenchmarkId::new("run_cycle", name), |b| {
        b.iter(|| engine.run_cycle(black_box(&mut display)));
    });
    group.bench_function(BenchmarkId::new("step", name), |b| {
        b.iter(|| engine.step(black_box(&mut display)));
    });

    group.finish();
}

fn refresh_cycle(c: &mut Criterion) {
    bench_cycle::<2>(c, "2bit");
    bench_cycle::<4>(c, "4bit");
}

criterion_group!(name = benches; config = configure_criterion(); targets = refresh_cycle);
criterion_main!(benches);
