use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use parseflow_util::SourceFile;

fn sample_source() -> String {
    let mut source = String::from("FUN fib(n)\n  IF n < 2 THEN\n    RETURN n\n  END\n  RETURN fib(n - 1) + fib(n - 2)\nEND\n");
    for i in 0..100 {
        source.push_str(&format!(
            "VAR r{i} = fib(10) * {i} + LEN([1, 2, 3])\nWHILE r{i} > 100 THEN VAR r{i} = r{i} / 2\n"
        ));
    }
    source
}

fn bench_parse(c: &mut Criterion) {
    let file = Arc::new(SourceFile::new("bench.pf", sample_source()));
    let tokens = parseflow_lex::tokenize(&file).expect("lexes cleanly");
    c.bench_function("parse_200_statements", |b| {
        b.iter(|| {
            parseflow_par::parse(black_box(tokens.clone()), black_box(&file))
                .expect("parses cleanly")
        })
    });
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
