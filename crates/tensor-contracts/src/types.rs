//! Composite tensor types: an optional shape plus zero or more details.
//!
//! Types are immutable and interned. Every derivation goes through a
//! process-wide cache keyed by the canonical rendering of all fields, so
//! equal declarations share one `Arc<TensorType>` and compare by pointer.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};

use tracing::trace;

use crate::detail::{Detail, DtypeDetail, FloatDetail, LayoutDetail, NamedTensorFlag};
use crate::diagnostic::render_type;
use crate::dim::{Dim, Item};
use crate::error::SpecError;
use crate::literal::parse_literal;
use crate::shape::ShapeSpec;
use crate::tensor::TensorLike;

pub const TENSOR_TYPE: &str = "TensorType";
pub const NAMED_TENSOR_TYPE: &str = "NamedTensorType";
pub const FLOAT_TENSOR_TYPE: &str = "FloatTensorType";
pub const NAMED_FLOAT_TENSOR_TYPE: &str = "NamedFloatTensorType";

#[derive(Debug, Clone)]
pub struct TensorType {
    class_name: String,
    shape: Option<ShapeSpec>,
    check_names: bool,
    /// Sorted by key.
    details: Vec<Arc<dyn Detail>>,
}

type Cache = RwLock<HashMap<String, Arc<TensorType>>>;

static TYPE_CACHE: OnceLock<Cache> = OnceLock::new();
static LITERAL_CACHE: OnceLock<Cache> = OnceLock::new();

fn cache_get(cache: &OnceLock<Cache>, key: &str) -> Option<Arc<TensorType>> {
    let map = cache.get_or_init(Cache::default);
    let guard = match map.read() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    };
    guard.get(key).cloned()
}

fn cache_insert(cache: &OnceLock<Cache>, key: String, ty: Arc<TensorType>) -> Arc<TensorType> {
    let map = cache.get_or_init(Cache::default);
    let mut guard = match map.write() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    };
    Arc::clone(guard.entry(key).or_insert(ty))
}

fn intern(ty: TensorType) -> Arc<TensorType> {
    let key = ty.cache_key();
    if let Some(existing) = cache_get(&TYPE_CACHE, &key) {
        return existing;
    }
    trace!(key = %key, "interning tensor type");
    cache_insert(&TYPE_CACHE, key, Arc::new(ty))
}

impl TensorType {
    fn empty(class_name: &str) -> Self {
        Self {
            class_name: class_name.to_string(),
            shape: None,
            check_names: false,
            details: Vec::new(),
        }
    }

    /// The unconstrained `TensorType`.
    pub fn base() -> Arc<Self> {
        intern(Self::empty(TENSOR_TYPE))
    }

    /// Base type whose shape checks axis names.
    pub fn named() -> Arc<Self> {
        let mut ty = Self::empty(NAMED_TENSOR_TYPE);
        ty.check_names = true;
        intern(ty)
    }

    /// Base type requiring a floating-point dtype.
    pub fn float() -> Arc<Self> {
        let mut ty = Self::empty(FLOAT_TENSOR_TYPE);
        ty.details.push(Arc::new(FloatDetail));
        intern(ty)
    }

    pub fn named_float() -> Arc<Self> {
        let mut ty = Self::empty(NAMED_FLOAT_TENSOR_TYPE);
        ty.check_names = true;
        ty.details.push(Arc::new(FloatDetail));
        intern(ty)
    }

    /// An unconstrained type reported under a custom class name.
    pub fn with_class(class_name: &str) -> Arc<Self> {
        match class_name {
            TENSOR_TYPE => Self::base(),
            NAMED_TENSOR_TYPE => Self::named(),
            FLOAT_TENSOR_TYPE => Self::float(),
            NAMED_FLOAT_TENSOR_TYPE => Self::named_float(),
            other => intern(Self::empty(other)),
        }
    }

    /// Parses a type literal such as `batch: ..., 3, f32` or
    /// `NamedTensorType[a, b]`. Results are cached by literal text.
    pub fn parse(literal: &str) -> Result<Arc<Self>, SpecError> {
        if let Some(cached) = cache_get(&LITERAL_CACHE, literal) {
            return Ok(cached);
        }
        let parsed = parse_literal(literal)?;
        let mut ty = match &parsed.class {
            Some(class) => Self::with_class(class),
            None => Self::base(),
        };
        for items in &parsed.subscripts {
            ty = ty.subscript(items)?;
        }
        Ok(cache_insert(&LITERAL_CACHE, literal.to_string(), ty))
    }

    /// Derives a type with the given items applied. Fields already set on
    /// `self` cannot be set again.
    ///
    /// An empty item list sets a zero-dimensional shape.
    pub fn subscript(&self, items: &[Item]) -> Result<Arc<Self>, SpecError> {
        let mut next = self.clone();
        let mut dims = Vec::new();
        let mut sets_dims = items.is_empty();
        let mut named = false;

        for item in items {
            if item.is_dim() {
                dims.push(Dim::from_item(item)?);
                sets_dims = true;
                continue;
            }
            match item {
                Item::Dtype(dtype) => next.add_detail(Arc::new(DtypeDetail(*dtype)))?,
                Item::Layout(layout) => next.add_detail(Arc::new(LayoutDetail(*layout)))?,
                Item::FloatFlag => next.add_detail(Arc::new(FloatDetail))?,
                Item::NamedFlag => named = true,
                Item::Detail(detail) if detail.key() == NamedTensorFlag::KEY => named = true,
                Item::Detail(detail) => next.add_detail(Arc::clone(detail))?,
                other => return Err(SpecError::invalid(other)),
            }
        }

        if named {
            next.check_names = true;
            next.shape = next.shape.map(|s| s.with_check_names(true));
        }
        if sets_dims {
            if self.shape.is_some() {
                return Err(self.overwrite("dims"));
            }
            next.shape = Some(ShapeSpec::new(dims, next.check_names)?);
        }
        Ok(intern(next))
    }

    fn add_detail(&mut self, detail: Arc<dyn Detail>) -> Result<(), SpecError> {
        match self
            .details
            .binary_search_by(|existing| existing.key().cmp(detail.key()))
        {
            Ok(_) => Err(self.overwrite(detail.key())),
            Err(index) => {
                self.details.insert(index, detail);
                Ok(())
            }
        }
    }

    fn overwrite(&self, field: &str) -> SpecError {
        SpecError::Overwrite {
            class: self.to_string(),
            field: field.to_string(),
        }
    }

    fn cache_key(&self) -> String {
        let mut key = format!("{}|names={}", self.class_name, self.check_names);
        if let Some(shape) = &self.shape {
            key.push_str(&format!("|dims={shape}"));
        }
        for detail in &self.details {
            key.push_str(&format!("|{}={detail}", detail.key()));
        }
        key
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn shape(&self) -> Option<&ShapeSpec> {
        self.shape.as_ref()
    }

    pub fn check_names(&self) -> bool {
        self.check_names
    }

    /// Non-shape details, sorted by key.
    pub fn details(&self) -> impl Iterator<Item = &dyn Detail> {
        self.details.iter().map(|d| d.as_ref())
    }

    /// Checks every detail against the tensor, shape unresolved.
    pub fn check(&self, tensor: &dyn TensorLike) -> bool {
        self.shape.as_ref().is_none_or(|s| s.matches(tensor))
            && self.details.iter().all(|d| d.check(tensor))
    }

    /// Like [`TensorType::check`] with `shape` standing in for the declared one.
    pub(crate) fn check_with(&self, shape: Option<&ShapeSpec>, tensor: &dyn TensorLike) -> bool {
        shape.is_none_or(|s| s.matches(tensor)) && self.details.iter().all(|d| d.check(tensor))
    }

    /// Pieces of the rendered type, shape first.
    pub(crate) fn pieces(&self, shape: Option<&ShapeSpec>) -> Vec<String> {
        shape
            .map(ToString::to_string)
            .into_iter()
            .chain(self.details.iter().map(ToString::to_string))
            .collect()
    }
}

impl fmt::Display for TensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_type(&self.class_name, self.pieces(self.shape.as_ref())))
    }
}
