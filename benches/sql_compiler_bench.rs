use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use result_filter::lexer::Lexer;
use result_filter::parser::Parser;
use result_filter::{entities, has_project_scope, FilterCompiler};
use std::hint::black_box;

const CASES: &[(&str, &str)] = &[
    ("column", "result=passed"),
    ("numeric", "duration>10"),
    ("json_path", "metadata.jenkins.build)1200"),
    ("array", "metadata.tags*smoke;nightly;regression"),
    ("uuid_regex", "id~^550e8400"),
];

// 基准测试：词法分析性能
fn benchmark_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_performance");

    for (name, expression) in CASES {
        group.bench_with_input(BenchmarkId::new("tokenize", name), expression, |b, expression| {
            b.iter(|| {
                let tokens: Vec<_> = Lexer::new(black_box(expression)).collect();
                black_box(tokens)
            })
        });
    }

    group.finish();
}

// 基准测试：语法分析性能
fn benchmark_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_performance");

    for (name, expression) in CASES {
        // 预先词法分析
        let tokens: Vec<_> = Lexer::new(expression).collect();

        group.bench_with_input(BenchmarkId::new("parse", name), &tokens, |b, tokens| {
            b.iter(|| {
                let mut parser = Parser::new(black_box(tokens));
                match parser.parse() {
                    Ok(expression) => black_box(expression),
                    Err(_) => panic!("解析失败"),
                }
            })
        });
    }

    group.finish();
}

// 基准测试：单条表达式编译性能
fn benchmark_compile(c: &mut Criterion) {
    let compiler = FilterCompiler::new();
    let results = entities::results();
    let mut group = c.benchmark_group("compile_performance");

    for (name, expression) in CASES {
        group.bench_with_input(BenchmarkId::new("compile", name), expression, |b, expression| {
            b.iter(|| match compiler.compile(black_box(expression), &results) {
                Some(predicate) => black_box(predicate),
                None => panic!("编译失败"),
            })
        });
    }

    group.finish();
}

// 基准测试：整组表达式应用到查询
fn benchmark_apply(c: &mut Criterion) {
    let compiler = FilterCompiler::new();
    let results = entities::results();
    let expressions: Vec<&str> = CASES.iter().map(|(_, expression)| *expression).collect();

    let mut group = c.benchmark_group("apply_performance");

    group.bench_function("apply_all", |b| {
        b.iter(|| black_box(compiler.apply(results.select_all(), black_box(&expressions), &results)))
    });
    group.bench_function("project_scope", |b| {
        b.iter(|| black_box(has_project_scope(black_box(&expressions))))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_lexer,
    benchmark_parser,
    benchmark_compile,
    benchmark_apply
);
criterion_main!(benches);
