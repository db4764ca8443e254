use std::collections::{BTreeSet, HashSet};

use crate::dim::DimSize;
use crate::error::{Severity, SpecError, Violation};
use crate::schema::types::{FunctionSignature, SignatureFile};
use crate::types::TensorType;

/// Validate a parsed signature file: every type literal must build, and
/// function names must be unique.
///
/// Returns a list of violations. If any violation has
/// [`Severity::Error`], the file is considered invalid.
pub fn validate_signatures(file: &SignatureFile) -> Vec<Violation> {
    let mut violations = Vec::new();

    if file.version.is_empty() {
        violations.push(Violation {
            severity: Severity::Error,
            rule: "SPEC-007".to_string(),
            message: "version must not be empty".to_string(),
            location: Some("version".to_string()),
        });
    }

    let mut seen = HashSet::new();
    for function in &file.functions {
        if function.name.is_empty() {
            violations.push(Violation {
                severity: Severity::Error,
                rule: "SPEC-004".to_string(),
                message: "function name must not be empty".to_string(),
                location: Some("functions".to_string()),
            });
        } else if !seen.insert(function.name.as_str()) {
            violations.push(Violation {
                severity: Severity::Error,
                rule: "SPEC-003".to_string(),
                message: format!("Duplicate function: {}", function.name),
                location: Some(format!("functions.{}", function.name)),
            });
        }
        validate_function(function, &mut violations);
    }

    violations
}

fn validate_function(function: &FunctionSignature, violations: &mut Vec<Violation>) {
    let name = &function.name;
    let mut arg_symbols = BTreeSet::new();

    for (arg, literal) in function.typed_args() {
        let location = format!("functions.{name}.args.{arg}");
        if let Some(ty) = check_literal(literal, &location, violations) {
            arg_symbols.extend(symbols(&ty));
        }
    }

    if let Some(literal) = &function.returns {
        let location = format!("functions.{name}.returns");
        if let Some(ty) = check_literal(literal, &location, violations) {
            for symbol in symbols(&ty) {
                if !arg_symbols.contains(&symbol) {
                    violations.push(Violation {
                        severity: Severity::Warning,
                        rule: "SPEC-006".to_string(),
                        message: format!(
                            "return symbol `{symbol}` of {name} is not bound by any argument"
                        ),
                        location: Some(location.clone()),
                    });
                }
            }
        }
    }

    if function.typed_args().next().is_none() && function.returns.is_none() {
        violations.push(Violation {
            severity: Severity::Warning,
            rule: "SPEC-005".to_string(),
            message: format!("{name} declares no tensor types; nothing will be checked"),
            location: Some(format!("functions.{name}")),
        });
    }
}

fn check_literal(
    literal: &str,
    location: &str,
    violations: &mut Vec<Violation>,
) -> Option<std::sync::Arc<TensorType>> {
    match TensorType::parse(literal) {
        Ok(ty) => Some(ty),
        Err(err) => {
            let rule = if err.is_unsupported() {
                "SPEC-002"
            } else {
                "SPEC-001"
            };
            violations.push(Violation {
                severity: Severity::Error,
                rule: rule.to_string(),
                message: describe(literal, &err),
                location: Some(location.to_string()),
            });
            None
        }
    }
}

fn describe(literal: &str, err: &SpecError) -> String {
    match err {
        SpecError::Literal { .. } => err.to_string(),
        _ => format!("`{literal}`: {err}"),
    }
}

/// Symbols a type binds: dimension names, size symbols and group names.
pub fn symbols(ty: &TensorType) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    let Some(shape) = ty.shape() else {
        return out;
    };
    for dim in shape.dims() {
        if let Some(name) = dim.name.symbol() {
            out.insert(name.to_string());
        }
        if let DimSize::Symbol(symbol) = &dim.size {
            out.insert(symbol.clone());
        }
    }
    out
}
