//! Replaying recorded calls against their declared signatures.

use std::sync::Arc;

use tracing::debug;

use crate::check::{Binding, CallChecker, RETURN_NAME};
use crate::error::{CheckError, ReplayError};
use crate::resolve::SymbolTable;
use crate::schema::types::{
    CallFile, FunctionSignature, RecordedCall, RecordedValue, SignatureFile,
};
use crate::tensor::ArgValue;
use crate::types::TensorType;

/// Result of replaying one recorded call.
#[derive(Debug, Clone)]
pub struct CallOutcome {
    pub index: usize,
    pub function: String,
    pub result: Result<SymbolTable, ReplayError>,
}

impl CallOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

fn arg_value(value: &RecordedValue) -> ArgValue<'_> {
    match value {
        RecordedValue::Tensor(tensor) => ArgValue::Tensor(tensor),
        RecordedValue::NotTensor { not_tensor } => ArgValue::NotTensor(not_tensor),
    }
}

/// Checks one recorded call: arguments in declaration order, then the
/// return value if both a return type and a recorded return exist.
pub fn replay_call(
    signature: &FunctionSignature,
    call: &RecordedCall,
) -> Result<SymbolTable, ReplayError> {
    let mut types: Vec<(&str, Arc<TensorType>, &RecordedValue)> = Vec::new();
    for (name, literal) in signature.typed_args() {
        let Some(value) = call.args.get(name) else {
            return Err(ReplayError::MissingArgument {
                function: signature.name.clone(),
                argument: name.to_string(),
            });
        };
        let ty = TensorType::parse(literal).map_err(CheckError::from)?;
        types.push((name, ty, value));
    }

    let bindings: Vec<Binding<'_>> = types
        .iter()
        .map(|(name, ty, value)| Binding::new(name, arg_value(value), ty))
        .collect();

    let mut checker = CallChecker::new();
    checker.check_arguments(&bindings)?;

    if let (Some(literal), Some(value)) = (&signature.returns, &call.returns) {
        let ty = TensorType::parse(literal).map_err(CheckError::from)?;
        checker.check_return(&Binding::new(RETURN_NAME, arg_value(value), &ty))?;
    }
    Ok(checker.into_symbols())
}

/// Replays every call in `calls`, in file order.
pub fn replay_calls(signatures: &SignatureFile, calls: &CallFile) -> Vec<CallOutcome> {
    calls
        .calls
        .iter()
        .enumerate()
        .map(|(index, call)| {
            let result = match signatures.function(&call.function) {
                Some(signature) => replay_call(signature, call),
                None => Err(ReplayError::UnknownFunction {
                    function: call.function.clone(),
                }),
            };
            debug!(index, function = %call.function, ok = result.is_ok(), "replayed call");
            CallOutcome {
                index,
                function: call.function.clone(),
                result,
            }
        })
        .collect()
}
