use criterion::{black_box, criterion_group, criterion_main, Criterion};

use skillvet_core::bank::QuestionBank;
use skillvet_core::difficulty::DifficultyController;
use skillvet_core::evaluator::HeuristicEvaluator;

fn bench_heuristic_scoring(c: &mut Criterion) {
    let bank = QuestionBank::builtin();
    let question = bank.get("analysis_1").unwrap().clone();
    let evaluator = HeuristicEvaluator::default();
    let response = "First I would use SUMIFS with date criteria, then verify the range. \
                    =SUMIFS(A:A, B:B, \">=\"&DATE(2024,1,1), B:B, \"<\"&DATE(2024,2,1)) is \
                    efficient and avoids helper columns.";

    c.bench_function("heuristic_evaluate", |b| {
        b.iter(|| evaluator.score(black_box(&question), black_box(response)))
    });
}

fn bench_difficulty_adjustment(c: &mut Criterion) {
    c.bench_function("difficulty_adjustment", |b| {
        b.iter(|| {
            let mut controller = DifficultyController::default();
            for i in 0..10u32 {
                let quality = (i % 10) as f64 / 10.0;
                controller.calculate_adjustment(
                    black_box(quality),
                    black_box(60.0),
                    black_box(5.0),
                );
            }
            controller.current()
        })
    });
}

fn bench_selection(c: &mut Criterion) {
    let bank = QuestionBank::builtin();
    c.bench_function("bank_find_match", |b| {
        b.iter(|| bank.find_match(black_box(6.5), None, black_box(&[])))
    });
}

criterion_group!(
    benches,
    bench_heuristic_scoring,
    bench_difficulty_adjustment,
    bench_selection
);
criterion_main!(benches);
