//! Process-wide activation and the per-call guard used by `#[typechecked]`.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::check::{Binding, CallChecker, RETURN_NAME};
use crate::error::CheckError;
use crate::tensor::ArgValue;
use crate::types::TensorType;

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Turns checking on for the whole process. Returns `true` only for the
/// call that actually enabled it; later calls are no-ops.
pub fn enable() -> bool {
    let newly = ENABLED
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_ok();
    if newly {
        info!("tensor contract checking enabled");
    }
    newly
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Acquire)
}

/// Checks one call of one function. Inert when checking is disabled.
#[derive(Debug)]
pub struct CallGuard {
    function: &'static str,
    checker: Option<CallChecker>,
}

impl CallGuard {
    /// Starts a call; active only if [`enable`] has been called.
    pub fn begin(function: &'static str) -> Self {
        if is_enabled() {
            Self::always(function)
        } else {
            Self {
                function,
                checker: None,
            }
        }
    }

    /// Starts a call that is checked regardless of the global flag.
    pub fn always(function: &'static str) -> Self {
        Self {
            function,
            checker: Some(CallChecker::new()),
        }
    }

    pub fn function(&self) -> &'static str {
        self.function
    }

    pub fn is_active(&self) -> bool {
        self.checker.is_some()
    }

    /// Checks `(name, type literal, value)` for every typed argument.
    pub fn check_arguments(
        &mut self,
        arguments: &[(&str, &str, ArgValue<'_>)],
    ) -> Result<(), CheckError> {
        let Some(checker) = self.checker.as_mut() else {
            return Ok(());
        };
        debug!(function = self.function, "checking call");
        let types = arguments
            .iter()
            .map(|(_, literal, _)| TensorType::parse(literal))
            .collect::<Result<Vec<_>, _>>()?;
        let bindings: Vec<Binding<'_>> = arguments
            .iter()
            .zip(&types)
            .map(|((name, _, value), ty)| Binding::new(name, *value, ty))
            .collect();
        checker.check_arguments(&bindings)
    }

    pub fn check_return(&mut self, literal: &str, value: ArgValue<'_>) -> Result<(), CheckError> {
        let Some(checker) = self.checker.as_mut() else {
            return Ok(());
        };
        let ty = TensorType::parse(literal)?;
        checker.check_return(&Binding::new(RETURN_NAME, value, &ty))
    }
}
