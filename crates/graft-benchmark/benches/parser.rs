use std::hint::black_box;

use codspeed_criterion_compat::{
    BenchmarkId, Criterion, Throughput, criterion_group, criterion_main,
};

static SOURCES: [(&str, &str); 2] = [
    ("Simple", "main = 42\n"),
    (
        "Medium",
        "import Standard.Base

## Sums the prices.
total items =
    prices = items.map (i -> i.price * i.count)
    prices.fold 0 (+)

main =
    items = [1, 2, 3]
    (total items) + 1
",
    ),
];

fn benchmark_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("Parser Benchmark");

    for (name, code) in SOURCES {
        group.throughput(Throughput::Bytes(code.len() as u64));
        group.bench_with_input(BenchmarkId::new("parse_module", name), &code, |b, &code| {
            b.iter(|| black_box(graft_parse::parse_module(code)));
        });
        group.bench_with_input(BenchmarkId::new("abstract", name), &code, |b, &code| {
            b.iter(|| black_box(graft_ast::parse_module(code)));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_parser);
criterion_main!(benches);
