//! Dimension descriptors and the subscript items they are built from.

use std::fmt;
use std::sync::Arc;

use crate::detail::Detail;
use crate::error::SpecError;
use crate::tensor::{DType, Layout};

/// Name constraint of one axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DimName {
    /// Never compared against the tensor's axis name.
    DontCare,
    /// Under name checking, the tensor's axis must be unnamed.
    Unnamed,
    Named(String),
}

impl DimName {
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            _ => None,
        }
    }
}

/// Size constraint of one axis, or of a run of axes for [`DimSize::Group`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DimSize {
    Exact(usize),
    Wildcard,
    Group,
    /// Must equal the size bound to another symbol.
    Symbol(String),
}

/// One axis constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dim {
    pub name: DimName,
    pub size: DimSize,
}

impl Dim {
    pub fn exact(size: usize) -> Self {
        Self {
            name: DimName::DontCare,
            size: DimSize::Exact(size),
        }
    }

    pub fn any() -> Self {
        Self {
            name: DimName::DontCare,
            size: DimSize::Wildcard,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: DimName::Named(name.into()),
            size: DimSize::Wildcard,
        }
    }

    pub fn named_exact(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: DimName::Named(name.into()),
            size: DimSize::Exact(size),
        }
    }

    pub fn named_group(name: impl Into<String>) -> Self {
        Self {
            name: DimName::Named(name.into()),
            size: DimSize::Group,
        }
    }

    pub fn group() -> Self {
        Self {
            name: DimName::DontCare,
            size: DimSize::Group,
        }
    }

    pub fn unnamed() -> Self {
        Self {
            name: DimName::Unnamed,
            size: DimSize::Wildcard,
        }
    }

    pub fn is_group(&self) -> bool {
        self.size == DimSize::Group
    }

    /// A group with no symbol to bind it to.
    pub fn is_anonymous_group(&self) -> bool {
        self.is_group() && self.name.symbol().is_none()
    }

    /// Converts one subscript element. First matching rule wins.
    pub fn from_item(item: &Item) -> Result<Self, SpecError> {
        match item {
            Item::Int(size) => Ok(Self {
                name: DimName::DontCare,
                size: int_size(*size).ok_or_else(|| SpecError::invalid(item))?,
            }),
            Item::Str(name) => Ok(Self::named(name.clone())),
            Item::NoneName => Ok(Self::unnamed()),
            Item::Slice { name, size, step } => {
                if step.is_some() {
                    return Err(SpecError::invalid(item));
                }
                let size = match size {
                    None if name.is_none() => return Err(SpecError::invalid(item)),
                    None => DimSize::Wildcard,
                    Some(SliceSize::Int(n)) => {
                        int_size(*n).ok_or_else(|| SpecError::invalid(item))?
                    }
                    Some(SliceSize::Group) if name.is_none() => {
                        return Err(SpecError::invalid(item));
                    }
                    Some(SliceSize::Group) => DimSize::Group,
                    Some(SliceSize::Symbol(symbol)) => DimSize::Symbol(symbol.clone()),
                };
                let name = match name {
                    Some(name) => DimName::Named(name.clone()),
                    None => DimName::Unnamed,
                };
                Ok(Self { name, size })
            }
            Item::Group => Ok(Self::group()),
            Item::Any => Ok(Self::any()),
            Item::Bool(_)
            | Item::Dtype(_)
            | Item::Layout(_)
            | Item::Detail(_)
            | Item::FloatFlag
            | Item::NamedFlag => Err(SpecError::invalid(item)),
        }
    }
}

fn int_size(value: i64) -> Option<DimSize> {
    if value == -1 {
        Some(DimSize::Wildcard)
    } else {
        usize::try_from(value).ok().map(DimSize::Exact)
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, &self.size) {
            (DimName::DontCare, DimSize::Group) => f.write_str("..."),
            (DimName::DontCare, DimSize::Wildcard) => f.write_str("-1"),
            (DimName::DontCare, DimSize::Exact(n)) => write!(f, "{n}"),
            (DimName::DontCare, DimSize::Symbol(s)) => write!(f, "_: {s}"),
            (DimName::Unnamed, DimSize::Wildcard) => f.write_str("None"),
            (DimName::Unnamed, DimSize::Group) => f.write_str("None: ..."),
            (DimName::Unnamed, DimSize::Exact(n)) => write!(f, "None: {n}"),
            (DimName::Unnamed, DimSize::Symbol(s)) => write!(f, "None: {s}"),
            (DimName::Named(name), DimSize::Wildcard) => f.write_str(name),
            (DimName::Named(name), DimSize::Group) => write!(f, "{name}: ..."),
            (DimName::Named(name), DimSize::Exact(n)) => write!(f, "{name}: {n}"),
            (DimName::Named(name), DimSize::Symbol(s)) => write!(f, "{name}: {s}"),
        }
    }
}

/// Right-hand side of a `name: size` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SliceSize {
    Int(i64),
    Group,
    Symbol(String),
}

/// One element of a type subscript, before interpretation.
#[derive(Debug, Clone)]
pub enum Item {
    Int(i64),
    /// Never a valid dimension; kept so it can be rejected explicitly.
    Bool(bool),
    Str(String),
    NoneName,
    /// `name: size`. A `None` name means the axis must be unnamed.
    Slice {
        name: Option<String>,
        size: Option<SliceSize>,
        step: Option<i64>,
    },
    Group,
    Any,
    Dtype(DType),
    Layout(Layout),
    Detail(Arc<dyn Detail>),
    FloatFlag,
    NamedFlag,
}

impl Item {
    pub fn slice(name: impl Into<String>, size: SliceSize) -> Self {
        Self::Slice {
            name: Some(name.into()),
            size: Some(size),
            step: None,
        }
    }

    /// Whether this item describes an axis rather than a detail.
    pub fn is_dim(&self) -> bool {
        matches!(
            self,
            Self::Int(_)
                | Self::Bool(_)
                | Self::Str(_)
                | Self::NoneName
                | Self::Slice { .. }
                | Self::Group
                | Self::Any
        )
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Str(s) => f.write_str(s),
            Self::NoneName => f.write_str("None"),
            Self::Slice { name, size, step } => {
                f.write_str(name.as_deref().unwrap_or("None"))?;
                f.write_str(":")?;
                match size {
                    Some(SliceSize::Int(n)) => write!(f, " {n}")?,
                    Some(SliceSize::Group) => f.write_str(" ...")?,
                    Some(SliceSize::Symbol(s)) => write!(f, " {s}")?,
                    None => {}
                }
                if let Some(step) = step {
                    write!(f, ":{step}")?;
                }
                Ok(())
            }
            Self::Group => f.write_str("..."),
            Self::Any => f.write_str("_"),
            Self::Dtype(dtype) => write!(f, "{dtype}"),
            Self::Layout(layout) => write!(f, "{layout}"),
            Self::Detail(detail) => write!(f, "{detail}"),
            Self::FloatFlag => f.write_str("float_detail"),
            Self::NamedFlag => f.write_str("named_detail"),
        }
    }
}
