//! Benchmarks for statement splitting on large scripts

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sqlsieve_sql::{classify, split};

/// Generate a script with N mixed statements
fn generate_script(num_statements: usize) -> String {
    let mut script = String::new();

    for i in 0..num_statements {
        match i % 4 {
            0 => script.push_str(&format!(
                "-- table {i}\nCREATE OR REPLACE TABLE stg_t{i} (id NUMBER, note VARCHAR DEFAULT 'a;b');\n"
            )),
            1 => script.push_str(&format!(
                "/* load; {i} */\nINSERT INTO stg_t{} VALUES ({i}, 'it''s');\n",
                i - 1
            )),
            2 => script.push_str(&format!(
                "CREATE PROCEDURE p{i}() RETURNS STRING LANGUAGE SQL AS $$ BEGIN RETURN 'x;y'; END; $$;\n"
            )),
            _ => script.push_str(&format!("SELECT * FROM stg_t{} WHERE note <> ';';\n", i - 3)),
        }
    }

    script
}

fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("split");

    for size in [100, 1_000, 10_000] {
        let script = generate_script(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &script, |b, script| {
            b.iter(|| split(black_box(script)))
        });
    }

    group.finish();
}

fn bench_split_and_classify(c: &mut Criterion) {
    let script = generate_script(1_000);

    c.bench_function("split_and_classify_1000", |b| {
        b.iter(|| {
            split(black_box(&script))
                .iter()
                .map(classify)
                .count()
        })
    });
}

fn bench_unterminated_comment(c: &mut Criterion) {
    let script = format!("/* {}", "SELECT 1; ".repeat(50_000));

    c.bench_function("unterminated_block_comment", |b| {
        b.iter(|| split(black_box(&script)))
    });
}

criterion_group!(benches, bench_split, bench_split_and_classify, bench_unterminated_comment);
criterion_main!(benches);
