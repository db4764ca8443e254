//! # tensor-contracts
//!
//! Shape, dtype and layout contracts for tensor arguments.
//!
//! A function declares a type per tensor parameter (`batch: ..., n`), and
//! every call is checked as a whole: symbolic dimension names and named
//! dimension groups are bound across all arguments, then against the
//! return value, and any inconsistency is reported with the expected and
//! actual types side by side.
//!
//! ## Modules
//!
//! - [`dim`] - Dimension descriptors and subscript items
//! - [`shape`] - Shape specifications and the elementwise check
//! - [`detail`] - Dtype, layout, floating-point and custom details
//! - [`types`] - Interned composite tensor types and literal parsing
//! - [`resolve`] - Per-call symbol table and the fixed-point resolver
//! - [`check`] - Argument and return checking for one call
//! - [`diagnostic`] - Expected and actual type strings
//! - [`hook`] - Process-wide activation and the per-call guard
//! - [`schema`] - YAML signature files, validation and call replay
//!
//! ## Example
//!
//! ```
//! use tensor_contracts::{ArgValue, Binding, CheckError, Tensor, TensorType, check_call};
//!
//! let x_ty = TensorType::parse("batch, c1").unwrap();
//! let y_ty = TensorType::parse("batch, c2").unwrap();
//! let x = Tensor::new([2, 3]);
//! let y = Tensor::new([3, 4]);
//!
//! let err = check_call(
//!     &[
//!         Binding::new("x", ArgValue::Tensor(&x), &x_ty),
//!         Binding::new("y", ArgValue::Tensor(&y), &y_ty),
//!     ],
//!     None,
//! )
//! .unwrap_err();
//! assert!(matches!(err, CheckError::InconsistentSize { .. }));
//! ```

pub mod check;
pub mod detail;
pub mod diagnostic;
pub mod dim;
pub mod error;
pub mod hook;
mod literal;
pub mod resolve;
pub mod schema;
pub mod shape;
pub mod tensor;
pub mod types;

pub use check::{Binding, CallChecker, RETURN_NAME, check_call};
pub use detail::{AttributeDetail, Detail, DtypeDetail, FloatDetail, LayoutDetail, NamedTensorFlag};
pub use dim::{Dim, DimName, DimSize, Item, SliceSize};
pub use error::{CheckError, ReplayError, Severity, SignatureError, SpecError, Violation};
pub use hook::{CallGuard, enable, is_enabled};
pub use literal::parse_items;
pub use resolve::{ShapeEntry, SymbolTable, resolve};
pub use shape::ShapeSpec;
pub use tensor::{ArgValue, DType, Inspect, Layout, Tensor, TensorLike};
pub use types::TensorType;
