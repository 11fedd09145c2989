use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ledger_tools::parse;

fn sample_journal(transactions: usize) -> String {
    let mut journal = String::from("; generated benchmark journal\n\n");
    for i in 0..transactions {
        journal.push_str(&format!(
            "2016/09/{:02} * Payee {i} ; note {i}\n  Expenses:Food:Takeout    {}.{:02} CAD\n  Assets:Cash\n\n",
            (i % 28) + 1,
            10 + (i % 80),
            i % 100,
        ));
    }
    journal
}

fn benchmark_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for size in [10usize, 100, 1000] {
        let content = sample_journal(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &content, |b, input| {
            b.iter(|| parse("bench.ledger", std::hint::black_box(input)))
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_parser);
criterion_main!(benches);
