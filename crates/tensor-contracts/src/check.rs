//! Checking one call: arguments first, then the return value against the
//! same symbol table.

use tracing::debug;

use crate::diagnostic;
use crate::error::CheckError;
use crate::resolve::{ShapeEntry, SymbolTable, expand, resolve};
use crate::tensor::{ArgValue, TensorLike};
use crate::types::TensorType;

/// Argument name used for return values in diagnostics.
pub const RETURN_NAME: &str = "return";

/// A parameter or return value with its declared type. Values without a
/// declared type are skipped.
#[derive(Debug, Clone, Copy)]
pub struct Binding<'a> {
    pub name: &'a str,
    pub value: ArgValue<'a>,
    pub ty: Option<&'a TensorType>,
}

impl<'a> Binding<'a> {
    pub fn new(name: &'a str, value: ArgValue<'a>, ty: &'a TensorType) -> Self {
        Self {
            name,
            value,
            ty: Some(ty),
        }
    }

    pub fn untyped(name: &'a str, value: ArgValue<'a>) -> Self {
        Self {
            name,
            value,
            ty: None,
        }
    }
}

/// Per-call checking state. Create one per call; never share across
/// concurrent calls.
#[derive(Debug, Default)]
pub struct CallChecker {
    table: SymbolTable,
}

impl CallChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks the arguments of a fresh call. Clears earlier bindings.
    pub fn check_arguments(&mut self, bindings: &[Binding<'_>]) -> Result<(), CheckError> {
        self.table.clear();
        debug!(count = bindings.len(), "checking arguments");
        self.check_phase(bindings)
    }

    /// Checks a return value, reusing the argument bindings.
    pub fn check_return(&mut self, binding: &Binding<'_>) -> Result<(), CheckError> {
        debug!(name = binding.name, "checking return value");
        self.check_phase(std::slice::from_ref(binding))
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.table
    }

    pub fn into_symbols(self) -> SymbolTable {
        self.table
    }

    fn check_phase(&mut self, bindings: &[Binding<'_>]) -> Result<(), CheckError> {
        let mut entries = Vec::new();
        let mut tensors: Vec<(&str, &TensorType, &dyn TensorLike)> = Vec::new();

        for binding in bindings {
            let Some(ty) = binding.ty else {
                continue;
            };
            let tensor = match binding.value {
                ArgValue::Tensor(tensor) => tensor,
                ArgValue::NotTensor(_) => {
                    return Err(CheckError::TypeMismatch {
                        argname: binding.name.to_string(),
                        expected: ty.to_string(),
                        actual: diagnostic::actual(ty, &binding.value),
                    });
                }
            };
            if let Some(spec) = ty.shape() {
                entries.push(ShapeEntry {
                    argname: binding.name,
                    shape: tensor.shape(),
                    spec,
                });
            }
            tensors.push((binding.name, ty, tensor));
        }

        resolve(&entries, &mut self.table)?;

        for (argname, ty, tensor) in tensors {
            let resolved = ty.shape().map(|s| expand(s, &self.table)).transpose()?;
            if !ty.check_with(resolved.as_ref(), tensor) {
                return Err(CheckError::TypeMismatch {
                    argname: argname.to_string(),
                    expected: diagnostic::expected(ty, resolved.as_ref()),
                    actual: diagnostic::actual(ty, &ArgValue::Tensor(tensor)),
                });
            }
        }
        Ok(())
    }
}

/// Checks a whole call and returns the bindings it produced.
pub fn check_call(
    arguments: &[Binding<'_>],
    ret: Option<&Binding<'_>>,
) -> Result<SymbolTable, CheckError> {
    let mut checker = CallChecker::new();
    checker.check_arguments(arguments)?;
    if let Some(ret) = ret {
        checker.check_return(ret)?;
    }
    Ok(checker.into_symbols())
}
