//! Shared helpers for resolver falsification tests.
#![allow(dead_code)]

use std::path::PathBuf;

use tensor_contracts::{CallGuard, CheckError, Inspect, SymbolTable, Tensor};

/// Checks one call through a guard that ignores the global flag.
///
/// `args` are `(name, type literal, tensor)`; `ret` is `(type literal, tensor)`.
pub fn check(
    args: &[(&str, &str, &Tensor)],
    ret: Option<(&str, &Tensor)>,
) -> Result<(), CheckError> {
    let mut guard = CallGuard::always("test");
    let values: Vec<_> = args
        .iter()
        .map(|&(name, literal, tensor)| (name, literal, tensor.inspect()))
        .collect();
    guard.check_arguments(&values)?;
    if let Some((literal, tensor)) = ret {
        guard.check_return(literal, tensor.inspect())?;
    }
    Ok(())
}

/// Like [`check`] but returns the bindings, without a return value.
pub fn bindings(args: &[(&str, &str, &Tensor)]) -> Result<SymbolTable, CheckError> {
    use tensor_contracts::{ArgValue, Binding, TensorType, check_call};

    let types = args
        .iter()
        .map(|(_, literal, _)| TensorType::parse(literal))
        .collect::<Result<Vec<_>, _>>()?;
    let bindings: Vec<Binding<'_>> = args
        .iter()
        .zip(&types)
        .map(|(&(name, _, tensor), ty)| Binding::new(name, ArgValue::Tensor(tensor), ty))
        .collect();
    check_call(&bindings, None)
}

pub fn t(shape: &[usize]) -> Tensor {
    Tensor::new(shape)
}

/// Asserts the call fails with a type mismatch.
pub fn assert_mismatch(result: Result<(), CheckError>) {
    match result {
        Err(CheckError::TypeMismatch { .. }) => {}
        other => panic!("expected a type mismatch, got {other:?}"),
    }
}

/// Asserts the call fails, whatever the reason.
pub fn assert_fails(result: Result<(), CheckError>) {
    assert!(result.is_err(), "expected the call to be rejected");
}

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures")
}
