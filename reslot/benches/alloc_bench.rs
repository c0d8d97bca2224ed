use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use reslot::presets::BUNDLED_PRESETS;
use treasure_rs::alloc::{Allocator, GreedyProfitAllocator, OptimalAllocator};
use treasure_rs::entities::{Catalog, Ledger};
use treasure_rs::milp::BnbConfig;
use treasure_rs::pricing::PriceModel;

criterion_main!(benches);
criterion_group!(benches, allocation_bench);

/// Refills the emptied treasures of every bundled preset with both strategies
fn allocation_bench(c: &mut Criterion) {
    let catalog = Catalog::enumerate(PriceModel::default());
    let mut group = c.benchmark_group("allocation_bench");
    group.sample_size(10);

    for preset in BUNDLED_PRESETS.iter() {
        let starting = preset.parse().to_allocation(catalog.model());
        let inventory = Ledger::from_allocation(&starting);

        group.bench_with_input(BenchmarkId::new("greedy", preset.name), &inventory, |b, inv| {
            b.iter(|| {
                let mut ledger = inv.clone();
                black_box(GreedyProfitAllocator::fill(&catalog, &mut ledger))
            })
        });
        group.bench_with_input(BenchmarkId::new("optimal", preset.name), &inventory, |b, inv| {
            b.iter(|| {
                let mut ledger = inv.clone();
                let mut optimal = OptimalAllocator::with_config(BnbConfig::default());
                black_box(optimal.allocate(&catalog, &mut ledger).unwrap())
            })
        });
    }
    group.finish();
}
