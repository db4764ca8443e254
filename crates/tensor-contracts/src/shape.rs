//! Shape specifications: an ordered run of [`Dim`]s plus the name-checking mode.

use std::fmt;

use crate::detail::Detail;
use crate::dim::{Dim, DimName, DimSize};
use crate::error::SpecError;
use crate::tensor::TensorLike;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapeSpec {
    dims: Vec<Dim>,
    check_names: bool,
}

impl ShapeSpec {
    /// Builds a specification, rejecting group placements the resolver
    /// cannot split.
    pub fn new(dims: Vec<Dim>, check_names: bool) -> Result<Self, SpecError> {
        validate_groups(&dims)?;
        Ok(Self { dims, check_names })
    }

    /// A derived copy with resolved dims. No placement validation.
    pub(crate) fn update(&self, dims: Vec<Dim>) -> Self {
        Self {
            dims,
            check_names: self.check_names,
        }
    }

    #[must_use]
    pub fn with_check_names(&self, check_names: bool) -> Self {
        Self {
            dims: self.dims.clone(),
            check_names,
        }
    }

    pub fn dims(&self) -> &[Dim] {
        &self.dims
    }

    pub fn check_names(&self) -> bool {
        self.check_names
    }

    pub fn has_group(&self) -> bool {
        self.dims.iter().any(Dim::is_group)
    }

    /// Number of axes the non-group dims consume.
    pub fn min_rank(&self) -> usize {
        self.dims.iter().filter(|d| !d.is_group()).count()
    }

    /// Elementwise check, trailing axes first. Stops at the first group.
    pub fn matches(&self, tensor: &dyn TensorLike) -> bool {
        let shape = tensor.shape();
        if self.has_group() {
            if self.min_rank() > shape.len() {
                return false;
            }
        } else if self.dims.len() != shape.len() {
            return false;
        }

        for (axis, dim) in (0..shape.len()).rev().zip(self.dims.iter().rev()) {
            if dim.is_group() {
                break;
            }
            if self.check_names && !name_matches(&dim.name, tensor.name_at(axis)) {
                return false;
            }
            match &dim.size {
                DimSize::Exact(n) if *n != shape[axis] => return false,
                _ => {}
            }
        }
        true
    }
}

fn name_matches(expected: &DimName, actual: Option<&str>) -> bool {
    match expected {
        DimName::DontCare => true,
        DimName::Unnamed => actual.is_none(),
        DimName::Named(name) => actual == Some(name.as_str()),
    }
}

fn validate_groups(dims: &[Dim]) -> Result<(), SpecError> {
    let mut seen_dim = false;
    let mut seen_named_group = false;
    let mut seen_anonymous_group = false;
    for dim in dims {
        if !dim.is_group() {
            seen_dim = true;
            continue;
        }
        if seen_dim {
            return Err(SpecError::Unsupported {
                message: "Having dimensions to the left of `...` is not currently supported."
                    .to_string(),
            });
        }
        if dim.is_anonymous_group() {
            if seen_named_group {
                return Err(SpecError::Unsupported {
                    message: "Having named `...` to the left of unnamed `...` is not \
                              currently supported."
                        .to_string(),
                });
            }
            if seen_anonymous_group {
                return Err(SpecError::Unsupported {
                    message: "Having more than one unnamed `...` is ambiguous. Name one \
                              of them and pin its size through another argument."
                        .to_string(),
                });
            }
            seen_anonymous_group = true;
        } else {
            seen_named_group = true;
        }
    }
    Ok(())
}

impl fmt::Display for ShapeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_tuple(f, self.dims.iter())
    }
}

fn write_tuple<'a>(
    f: &mut fmt::Formatter<'_>,
    dims: impl ExactSizeIterator<Item = &'a Dim>,
) -> fmt::Result {
    let single = dims.len() == 1;
    f.write_str("(")?;
    for (i, dim) in dims.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{dim}")?;
    }
    if single {
        f.write_str(",")?;
    }
    f.write_str(")")
}

/// The dims a tensor actually has, named where the tensor names its axes.
pub fn actual_dims(tensor: &dyn TensorLike) -> Vec<Dim> {
    tensor
        .shape()
        .iter()
        .enumerate()
        .map(|(axis, &size)| match tensor.name_at(axis) {
            Some(name) => Dim::named_exact(name, size),
            None => Dim::exact(size),
        })
        .collect()
}

impl Detail for ShapeSpec {
    fn key(&self) -> &str {
        "dims"
    }

    fn check(&self, tensor: &dyn TensorLike) -> bool {
        self.matches(tensor)
    }

    fn describe(&self, tensor: &dyn TensorLike) -> String {
        let dims = actual_dims(tensor);
        let actual = self.update(dims);
        actual.to_string()
    }
}
