//! Benchmarks for ranking and shuffling
//!
//! Run with: cargo bench --package pipeline
//!
//! Ranks a synthetic pool of 200 episodes against an in-memory store
//! holding a few hundred ratings.

use catalog::{Episode, Mood, RatingRecord, Theme, VibeSelection};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pipeline::{Ranker, ScoringEngine, SessionState, ShuffleSelector};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use store::{MemoryStore, submit_rating};
use tokio::runtime::Runtime;

fn synthetic_pool(size: usize) -> Vec<Episode> {
    let categories = ["Comedy", "Music", "Leisure", "News", "Science"];
    (0..size)
        .map(|i| {
            Episode::new(
                format!("bench:{i}"),
                format!("Episode {i} Interview"),
                format!("Show {}", i % 40),
                ((30 + i % 30) * 60) as u32,
            )
            .with_description("A long conversation about everything. ".repeat(i % 8))
            .with_popularity((i % 100) as u8)
            .with_categories([categories[i % categories.len()]])
        })
        .collect()
}

fn seeded_store(rt: &Runtime) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    rt.block_on(async {
        for i in 0..300 {
            let record = RatingRecord::new(
                format!("bench:{}", i % 200),
                (i % 5 + 1) as u8,
                vec![Mood::all()[i % Mood::all().len()]],
                vec![Theme::all()[i % Theme::all().len()]],
            )
            .expect("valid rating");
            submit_rating(store.as_ref(), record)
                .await
                .expect("memory store accepts ratings");
        }
    });
    store
}

fn bench_rank(c: &mut Criterion) {
    let rt = Runtime::new().expect("Failed to build runtime");
    let ranker = Ranker::new(Arc::new(ScoringEngine::new(seeded_store(&rt))));
    let pool = synthetic_pool(200);
    let selection = VibeSelection::new(vec![Mood::Happy], vec![Theme::Laugh], 45);

    c.bench_function("rank_200_episodes", |b| {
        b.iter(|| {
            let mut session = SessionState::new();
            let ranked = rt
                .block_on(ranker.rank(black_box(&pool), black_box(&selection), &mut session))
                .unwrap();
            black_box(ranked)
        })
    });
}

fn bench_shuffle(c: &mut Criterion) {
    let rt = Runtime::new().expect("Failed to build runtime");
    let ranker = Ranker::new(Arc::new(ScoringEngine::new(Arc::new(MemoryStore::new()))));
    let pool = synthetic_pool(200);
    let selection = VibeSelection::new(vec![Mood::Curious], vec![Theme::Learn], 45);
    let mut session = SessionState::new();
    let ranked = rt
        .block_on(ranker.rank(&pool, &selection, &mut session))
        .unwrap();

    c.bench_function("shuffle_until_exhausted", |b| {
        b.iter(|| {
            let mut session = SessionState::new();
            session.begin_search(ranked.clone());
            let mut selector = ShuffleSelector::new(StdRng::seed_from_u64(1));
            let mut count = 0;
            while selector.next(&mut session).is_some() {
                count += 1;
            }
            black_box(count)
        })
    });
}

criterion_group!(benches, bench_rank, bench_shuffle);
criterion_main!(benches);
