//! Check one call of a batched outer product and print the bindings.
//!
//! Usage:
//!   cargo run --example check_call -- 2,7,3 2,7,5

use std::process;

use tensor_contracts::{ArgValue, Binding, CallChecker, RETURN_NAME, Tensor, TensorType};

fn parse_shape(arg: &str) -> Result<Vec<usize>, std::num::ParseIntError> {
    if arg.is_empty() {
        return Ok(Vec::new());
    }
    arg.split(',').map(|s| s.trim().parse()).collect()
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() != 2 {
        eprintln!("Usage: check_call <x-shape> <y-shape>");
        process::exit(1);
    }
    let shapes: Vec<Vec<usize>> = args
        .iter()
        .map(|a| {
            parse_shape(a).unwrap_or_else(|e| {
                eprintln!("Bad shape `{a}`: {e}");
                process::exit(1);
            })
        })
        .collect();

    let types = ["batch: ..., n", "batch: ..., m", "batch: ..., n, m"].map(|literal| {
        TensorType::parse(literal).unwrap_or_else(|e| {
            eprintln!("Bad type `{literal}`: {e}");
            process::exit(1);
        })
    });

    let x = Tensor::new(shapes[0].clone());
    let y = Tensor::new(shapes[1].clone());
    let mut checker = CallChecker::new();
    if let Err(e) = checker.check_arguments(&[
        Binding::new("x", ArgValue::Tensor(&x), &types[0]),
        Binding::new("y", ArgValue::Tensor(&y), &types[1]),
    ]) {
        eprintln!("{e}");
        process::exit(1);
    }

    let symbols = checker.symbols();
    let mut out = symbols.group("batch").unwrap_or_default().to_vec();
    out.extend(symbols.size("n"));
    out.extend(symbols.size("m"));
    let result = Tensor::new(out);
    let ret = Binding::new(RETURN_NAME, ArgValue::Tensor(&result), &types[2]);
    if let Err(e) = checker.check_return(&ret) {
        eprintln!("{e}");
        process::exit(1);
    }

    println!("x: {}", types[0]);
    println!("y: {}", types[1]);
    println!("return: {:?}", result.shape);
    for (name, size) in checker.symbols().sizes() {
        println!("  {name} = {size}");
    }
    for (name, shape) in checker.symbols().groups() {
        println!("  {name} = {shape:?}");
    }
}
