//! Independent predicates composed into a tensor type.
//!
//! A [`Detail`] checks one property of a tensor and can describe what the
//! tensor actually has, for the "got type ..." half of a diagnostic. Third
//! parties add their own by implementing the trait; [`AttributeDetail`] is a
//! small worked example.

use std::fmt;

use crate::tensor::{DType, Layout, TensorLike};

pub trait Detail: fmt::Debug + fmt::Display + Send + Sync {
    /// Field this detail occupies on a tensor type. Two details with the
    /// same key cannot be combined.
    fn key(&self) -> &str;

    fn check(&self, tensor: &dyn TensorLike) -> bool;

    /// What the tensor has for this detail. Empty means omit from
    /// diagnostics.
    fn describe(&self, tensor: &dyn TensorLike) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DtypeDetail(pub DType);

impl fmt::Display for DtypeDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Detail for DtypeDetail {
    fn key(&self) -> &str {
        "dtype"
    }

    fn check(&self, tensor: &dyn TensorLike) -> bool {
        tensor.dtype() == self.0
    }

    fn describe(&self, tensor: &dyn TensorLike) -> String {
        tensor.dtype().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutDetail(pub Layout);

impl fmt::Display for LayoutDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Detail for LayoutDetail {
    fn key(&self) -> &str {
        "layout"
    }

    fn check(&self, tensor: &dyn TensorLike) -> bool {
        tensor.layout() == self.0
    }

    fn describe(&self, tensor: &dyn TensorLike) -> String {
        tensor.layout().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatDetail;

impl fmt::Display for FloatDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("float_detail")
    }
}

impl Detail for FloatDetail {
    fn key(&self) -> &str {
        "float_detail"
    }

    fn check(&self, tensor: &dyn TensorLike) -> bool {
        tensor.is_floating_point()
    }

    fn describe(&self, tensor: &dyn TensorLike) -> String {
        if tensor.is_floating_point() {
            self.to_string()
        } else {
            String::new()
        }
    }
}

/// Switches a type's shape detail into name-checking mode.
///
/// Consumed when the type is built; never stored as a checkable detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedTensorFlag;

impl NamedTensorFlag {
    pub const KEY: &'static str = "named_detail";
}

impl fmt::Display for NamedTensorFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::KEY)
    }
}

impl Detail for NamedTensorFlag {
    fn key(&self) -> &str {
        Self::KEY
    }

    fn check(&self, _tensor: &dyn TensorLike) -> bool {
        unreachable!("named_detail is a mode flag and is never checked directly")
    }

    fn describe(&self, _tensor: &dyn TensorLike) -> String {
        unreachable!("named_detail is a mode flag and is never described")
    }
}

/// Requires a string attribute exposed through [`TensorLike::attribute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDetail {
    key: String,
    value: String,
}

impl AttributeDetail {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for AttributeDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

impl Detail for AttributeDetail {
    fn key(&self) -> &str {
        &self.key
    }

    fn check(&self, tensor: &dyn TensorLike) -> bool {
        tensor.attribute(&self.key) == Some(self.value.as_str())
    }

    fn describe(&self, tensor: &dyn TensorLike) -> String {
        match tensor.attribute(&self.key) {
            Some(value) => format!("{}={value}", self.key),
            None => String::new(),
        }
    }
}
