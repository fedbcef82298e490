use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use sweeper_core::*;

fn first_reveal(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_reveal");
    for preset in Difficulty::ALL {
        let config = preset.config();
        let center = (config.width() / 2, config.height() / 2);
        let rules = Rules {
            safe_zone: SafeZone::Neighborhood,
            ..Rules::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(preset.name()), &config, |b, &config| {
            let mut seed = 0;
            b.iter(|| {
                seed += 1;
                let placer = Box::new(RandomMinePlacer::new(seed));
                let mut board = Board::with_placer(config, rules, placer).unwrap();
                black_box(board.reveal(black_box(center)).unwrap())
            });
        });
    }
    group.finish();
}

fn mine_free_flood_fill(c: &mut Criterion) {
    let config = GameConfig::new((255, 255), 0).unwrap();
    c.bench_function("flood_fill_255x255", |b| {
        b.iter(|| {
            let mut board = Board::with_mines(config, Rules::default(), &[]).unwrap();
            black_box(board.reveal((0, 0)).unwrap())
        });
    });
}

criterion_group!(benches, first_reveal, mine_free_flood_fill);
criterion_main!(benches);
