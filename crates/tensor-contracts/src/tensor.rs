//! The tensor side of the contract: what a checked value must expose.
//!
//! The checker never touches tensor storage. Anything that can report a
//! shape, a dtype and a layout can be checked by implementing
//! [`TensorLike`]; [`Tensor`] is a plain value type implementing it, used by
//! the CLI and the tests.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Scalar element type of a tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Bool,
    U8,
    I8,
    I16,
    I32,
    I64,
    F16,
    Bf16,
    F32,
    F64,
    C64,
    C128,
}

impl DType {
    /// The dtype `float` stands for.
    pub const DEFAULT_FLOAT: DType = DType::F32;

    pub fn is_floating_point(self) -> bool {
        matches!(self, Self::F16 | Self::Bf16 | Self::F32 | Self::F64)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F16 => "f16",
            Self::Bf16 => "bf16",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::C64 => "c64",
            Self::C128 => "c128",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dtype = match s {
            "bool" => Self::Bool,
            "u8" => Self::U8,
            "i8" => Self::I8,
            "i16" => Self::I16,
            "i32" => Self::I32,
            "i64" | "int" => Self::I64,
            "f16" => Self::F16,
            "bf16" => Self::Bf16,
            "f32" => Self::F32,
            "float" => Self::DEFAULT_FLOAT,
            "f64" => Self::F64,
            "c64" => Self::C64,
            "c128" => Self::C128,
            other => return Err(format!("unknown dtype `{other}`")),
        };
        Ok(dtype)
    }
}

/// Memory layout of a tensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    Strided,
    SparseCoo,
    SparseCsr,
}

impl Layout {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strided => "strided",
            Self::SparseCoo => "sparse_coo",
            Self::SparseCsr => "sparse_csr",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strided" => Ok(Self::Strided),
            "sparse_coo" => Ok(Self::SparseCoo),
            "sparse_csr" => Ok(Self::SparseCsr),
            other => Err(format!("unknown layout `{other}`")),
        }
    }
}

/// A value the checker can inspect.
pub trait TensorLike {
    fn shape(&self) -> &[usize];

    fn dtype(&self) -> DType;

    fn layout(&self) -> Layout {
        Layout::Strided
    }

    /// Per-axis names. `None` means no axis is named.
    fn names(&self) -> Option<&[Option<String>]> {
        None
    }

    fn is_floating_point(&self) -> bool {
        self.dtype().is_floating_point()
    }

    /// Extra string attributes, for custom details.
    fn attribute(&self, _key: &str) -> Option<&str> {
        None
    }

    fn name_at(&self, axis: usize) -> Option<&str> {
        self.names()
            .and_then(|names| names.get(axis))
            .and_then(|name| name.as_deref())
    }
}

fn default_dtype() -> DType {
    DType::DEFAULT_FLOAT
}

/// A shape-only tensor description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tensor {
    pub shape: Vec<usize>,
    #[serde(default = "default_dtype")]
    pub dtype: DType,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub names: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Tensor {
    /// A dense `f32` tensor of the given shape.
    pub fn new(shape: impl Into<Vec<usize>>) -> Self {
        Self {
            shape: shape.into(),
            dtype: default_dtype(),
            layout: Layout::Strided,
            names: None,
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_dtype(mut self, dtype: DType) -> Self {
        self.dtype = dtype;
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        self.names = Some(names.into_iter().map(|n| n.map(Into::into)).collect());
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

impl TensorLike for Tensor {
    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn dtype(&self) -> DType {
        self.dtype
    }

    fn layout(&self) -> Layout {
        self.layout
    }

    fn names(&self) -> Option<&[Option<String>]> {
        self.names.as_deref()
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// One argument or return value as seen by the checker.
#[derive(Clone, Copy)]
pub enum ArgValue<'a> {
    Tensor(&'a dyn TensorLike),
    /// Not tensor-like; carries the runtime type name for diagnostics.
    NotTensor(&'a str),
}

impl ArgValue<'_> {
    pub fn not_tensor<T: ?Sized>() -> Self {
        ArgValue::NotTensor(std::any::type_name::<T>())
    }
}

impl fmt::Debug for ArgValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tensor(t) => f
                .debug_struct("Tensor")
                .field("shape", &t.shape())
                .field("dtype", &t.dtype())
                .finish_non_exhaustive(),
            Self::NotTensor(name) => f.debug_tuple("NotTensor").field(name).finish(),
        }
    }
}

/// Conversion of a function argument into an [`ArgValue`].
///
/// Implement this next to [`TensorLike`] for your own tensor type:
///
/// ```
/// use tensor_contracts::{ArgValue, DType, Inspect, TensorLike};
///
/// struct Mine(Vec<usize>);
///
/// impl TensorLike for Mine {
///     fn shape(&self) -> &[usize] { &self.0 }
///     fn dtype(&self) -> DType { DType::F32 }
/// }
///
/// impl Inspect for Mine {
///     fn inspect(&self) -> ArgValue<'_> { ArgValue::Tensor(self) }
/// }
/// ```
pub trait Inspect {
    fn inspect(&self) -> ArgValue<'_>;
}

impl Inspect for Tensor {
    fn inspect(&self) -> ArgValue<'_> {
        ArgValue::Tensor(self)
    }
}

impl<T: Inspect + ?Sized> Inspect for &T {
    fn inspect(&self) -> ArgValue<'_> {
        (**self).inspect()
    }
}

impl<T: Inspect + ?Sized> Inspect for &mut T {
    fn inspect(&self) -> ArgValue<'_> {
        (**self).inspect()
    }
}

impl<T: Inspect + ?Sized> Inspect for Box<T> {
    fn inspect(&self) -> ArgValue<'_> {
        (**self).inspect()
    }
}

impl<T: Inspect + ?Sized> Inspect for Arc<T> {
    fn inspect(&self) -> ArgValue<'_> {
        (**self).inspect()
    }
}

impl<T: Inspect + ?Sized> Inspect for Rc<T> {
    fn inspect(&self) -> ArgValue<'_> {
        (**self).inspect()
    }
}

impl<T: Inspect> Inspect for Option<T> {
    fn inspect(&self) -> ArgValue<'_> {
        match self {
            Some(value) => value.inspect(),
            None => ArgValue::NotTensor("None"),
        }
    }
}

macro_rules! not_tensor {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Inspect for $ty {
                fn inspect(&self) -> ArgValue<'_> {
                    ArgValue::not_tensor::<$ty>()
                }
            }
        )*
    };
}

not_tensor!(
    (), bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32,
    f64, str, String,
);
