use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use ordr::catalog::{Catalog, Difficulty, Word};
use ordr::engine::drill::{DrillEngine, DrillSettings, GameMode, Phase, build_pool};
use ordr::engine::matching::is_correct;

fn make_catalog(per_tier: usize) -> Catalog {
    let tier = |prefix: &str| {
        (0..per_tier)
            .map(|i| Word::new(&format!("{prefix}ord{i}"), &format!("word {i}")))
            .collect::<Vec<_>>()
    };
    Catalog {
        easy: tier("e"),
        medium: tier("m"),
        hard: tier("h"),
    }
}

/// One action session answered perfectly, one word every 2 s of simulated
/// time.
fn run_session(catalog: &Catalog, seed: u64) -> u32 {
    let mut engine = DrillEngine::new();
    let mut rng = SmallRng::seed_from_u64(seed);
    let settings = DrillSettings {
        mode: GameMode::Action,
        difficulty: Difficulty::Medium,
        word_count: 10,
        show_translation: true,
        carry_cap: None,
    };
    engine.start(settings, catalog, &mut rng, 0).unwrap();
    let mut now = 0;
    let mut score = 0;
    while engine.phase() != Phase::Ended {
        if engine.phase() == Phase::Answering {
            let word = engine
                .session()
                .and_then(|s| s.current_word())
                .map(|w| w.text.clone())
                .unwrap_or_default();
            engine.submit(&word, now);
        }
        now += 2_000;
        engine.tick(now);
        engine.drain_events();
        score = engine.session().map_or(score, |s| s.score);
    }
    score
}

fn bench_session(c: &mut Criterion) {
    let catalog = make_catalog(50);
    c.bench_function("action session (150 words)", |b| {
        b.iter(|| run_session(black_box(&catalog), 42))
    });
}

fn bench_pool(c: &mut Criterion) {
    let catalog = make_catalog(200);
    c.bench_function("build_pool action (600 words)", |b| {
        let mut rng = SmallRng::seed_from_u64(1);
        b.iter(|| {
            build_pool(
                black_box(&catalog),
                GameMode::Action,
                Difficulty::Easy,
                10,
                &mut rng,
            )
        })
    });
}

fn bench_matching(c: &mut Criterion) {
    c.bench_function("is_correct with normalization", |b| {
        b.iter(|| is_correct(black_box("  Blåbærsyltetøy "), black_box("blåbærsyltetøy")))
    });
}

criterion_group!(benches, bench_session, bench_pool, bench_matching);
criterion_main!(benches);
