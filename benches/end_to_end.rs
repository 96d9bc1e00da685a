//! Inference and translation latency on synthetic programs.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use kuda::ast::build::*;
use kuda::ast::{BinOp, Program, Stmt};

/// `n` small functions chained through a Text-typed model field, plus a
/// matrix loop at top level.
fn synthetic_program(n: usize) -> Program {
    let mut statements: Vec<Stmt> = vec![model(
        "Layer",
        vec![
            fun(
                "init",
                &["self", "name", "size"],
                vec![
                    set_self("name", ident("name")),
                    set_self("w", call("mat_rand", vec![ident("size"), ident("size")])),
                ],
            ),
            fun(
                "forward",
                &["self", "x"],
                vec![give(method_call(
                    binop(attr(ident("self"), "w"), BinOp::Mul, ident("x")),
                    "sigmoid",
                    vec![],
                ))],
            ),
        ],
    )];
    for i in 0..n {
        let name = format!("step{}", i);
        let body = if i == 0 {
            vec![give(binop(ident("v"), BinOp::Add, num(1.0)))]
        } else {
            vec![
                assign("t", call(&format!("step{}", i - 1), vec![ident("v")])),
                give(binop(ident("t"), BinOp::Mul, num(2.0))),
            ]
        };
        statements.push(fun(&name, &["v"], body));
    }
    statements.push(assign(
        "layer",
        call("Layer", vec![text("hidden"), num(4.0)]),
    ));
    statements.push(assign("x", call("mat_rand", vec![num(4.0), num(1.0)])));
    statements.push(each(
        "i",
        call("range", vec![num(10.0)]),
        vec![assign(
            "x",
            method_call(ident("layer"), "forward", vec![ident("x")]),
        )],
    ));
    statements.push(out(call(&format!("step{}", n - 1), vec![num(1.0)])));
    program(statements)
}

fn bench_infer(c: &mut Criterion) {
    let small = synthetic_program(10);
    let large = synthetic_program(200);

    let mut group = c.benchmark_group("infer");
    group.bench_function("10_functions", |b| b.iter(|| kuda::infer(black_box(&small))));
    group.bench_function("200_functions", |b| b.iter(|| kuda::infer(black_box(&large))));
    group.finish();
}

fn bench_translate(c: &mut Criterion) {
    let small = synthetic_program(10);
    let large = synthetic_program(200);

    let mut group = c.benchmark_group("translate");
    group.bench_function("10_functions", |b| {
        b.iter(|| kuda::translate(black_box(&small)))
    });
    group.bench_function("200_functions", |b| {
        b.iter(|| kuda::translate(black_box(&large)))
    });
    group.finish();
}

criterion_group!(benches, bench_infer, bench_translate);
criterion_main!(benches);
