//! Per-call symbol binding.
//!
//! The resolver walks every `(argname, shape, spec)` entry of one call and
//! binds symbolic dimension names to sizes and named groups to runs of
//! sizes. An entry can only be aligned once it has at most one group whose
//! extent is still unknown, so entries are taken in a fixed-point loop:
//! the first resolvable entry is bound, which may make later ones
//! resolvable. Alignment is right to left, so a leftmost group absorbs
//! whatever the trailing dims leave over.
//!
//! Exact sizes are not compared here. [`expand`] substitutes the bound
//! values and the final elementwise check catches the rest.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::dim::{Dim, DimName, DimSize};
use crate::error::CheckError;
use crate::shape::ShapeSpec;

/// Sizes and group extents bound during one call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    sizes: BTreeMap<String, usize>,
    groups: BTreeMap<String, Vec<usize>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self, name: &str) -> Option<usize> {
        self.sizes.get(name).copied()
    }

    pub fn group(&self, name: &str) -> Option<&[usize]> {
        self.groups.get(name).map(Vec::as_slice)
    }

    pub fn sizes(&self) -> &BTreeMap<String, usize> {
        &self.sizes
    }

    pub fn groups(&self) -> &BTreeMap<String, Vec<usize>> {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty() && self.groups.is_empty()
    }

    pub fn clear(&mut self) {
        self.sizes.clear();
        self.groups.clear();
    }

    /// Binds `name` to `size`, or checks it against an earlier binding.
    pub fn bind_size(&mut self, name: &str, size: usize) -> Result<(), CheckError> {
        if self.groups.contains_key(name) {
            return Err(CheckError::InconsistentSymbolKind {
                name: name.to_string(),
            });
        }
        match self.sizes.get(name) {
            Some(&bound) if bound != size => Err(CheckError::InconsistentSize {
                name: name.to_string(),
                bound,
                found: size,
            }),
            Some(_) => Ok(()),
            None => {
                trace!(name, size, "bound dimension");
                self.sizes.insert(name.to_string(), size);
                Ok(())
            }
        }
    }

    /// Binds group `name` to `shape`, or checks it against an earlier binding.
    pub fn bind_group(&mut self, name: &str, shape: &[usize]) -> Result<(), CheckError> {
        if self.sizes.contains_key(name) {
            return Err(CheckError::InconsistentSymbolKind {
                name: name.to_string(),
            });
        }
        match self.groups.get(name) {
            Some(bound) if bound.as_slice() != shape => Err(CheckError::InconsistentGroupShape {
                name: name.to_string(),
                bound: bound.clone(),
                found: shape.to_vec(),
            }),
            Some(_) => Ok(()),
            None => {
                trace!(name, ?shape, "bound dimension group");
                self.groups.insert(name.to_string(), shape.to_vec());
                Ok(())
            }
        }
    }
}

/// One tensor of the call, paired with its declared shape.
#[derive(Debug, Clone, Copy)]
pub struct ShapeEntry<'a> {
    pub argname: &'a str,
    pub shape: &'a [usize],
    pub spec: &'a ShapeSpec,
}

/// Binds every symbol in `entries` into `table`.
///
/// Entries are tried in order; ties go to the earliest one.
pub fn resolve(entries: &[ShapeEntry<'_>], table: &mut SymbolTable) -> Result<(), CheckError> {
    let mut pending: Vec<&ShapeEntry<'_>> = entries.iter().collect();
    while !pending.is_empty() {
        let Some(index) = pending
            .iter()
            .position(|entry| free_groups(entry.spec, table) <= 1)
        else {
            return Err(CheckError::Ambiguous {
                argnames: pending.iter().map(|e| e.argname.to_string()).collect(),
            });
        };
        let entry = pending.remove(index);
        debug!(argname = entry.argname, shape = ?entry.shape, spec = %entry.spec, "resolving");
        bind_entry(entry, table)?;
    }
    Ok(())
}

/// Group occurrences whose extent the table cannot supply yet. Anonymous
/// groups always count.
fn free_groups(spec: &ShapeSpec, table: &SymbolTable) -> usize {
    spec.dims()
        .iter()
        .filter(|dim| dim.is_group())
        .filter(|dim| dim.name.symbol().is_none_or(|name| table.group(name).is_none()))
        .count()
}

fn bind_entry(entry: &ShapeEntry<'_>, table: &mut SymbolTable) -> Result<(), CheckError> {
    let dims = entry.spec.dims();
    let shape = entry.shape;
    // axes not yet claimed are shape[..pos]
    let mut pos = shape.len();

    for (index, dim) in dims.iter().enumerate().rev() {
        if !dim.is_group() {
            if pos == 0 {
                return Err(CheckError::Rank {
                    argname: entry.argname.to_string(),
                    rank: shape.len(),
                    required: entry.spec.min_rank(),
                });
            }
            pos -= 1;
            let size = shape[pos];
            if let Some(name) = dim.name.symbol() {
                table.bind_size(name, size)?;
            }
            if let DimSize::Symbol(symbol) = &dim.size {
                table.bind_size(symbol, size)?;
            }
            continue;
        }

        let Some(name) = dim.name.symbol() else {
            // Anonymous groups are leftmost; nothing left of this needs axes.
            pos = 0;
            continue;
        };

        if let Some(bound) = table.group(name) {
            let lo = if index == 0 {
                0
            } else {
                pos.saturating_sub(bound.len())
            };
            if &shape[lo..pos] != bound {
                return Err(CheckError::InconsistentGroupShape {
                    name: name.to_string(),
                    bound: bound.to_vec(),
                    found: shape[lo..pos].to_vec(),
                });
            }
            pos = lo;
        } else {
            let lo = bound_prefix_len(&dims[..index], table)?.min(pos);
            table.bind_group(name, &shape[lo..pos])?;
            pos = lo;
        }
    }
    Ok(())
}

/// Total extent of the groups left of the single free group. They are all
/// bound, otherwise the entry would not have been picked.
fn bound_prefix_len(left: &[Dim], table: &SymbolTable) -> Result<usize, CheckError> {
    left.iter().try_fold(0, |total, dim| {
        let bound = dim
            .name
            .symbol()
            .filter(|_| dim.is_group())
            .and_then(|name| table.group(name));
        debug_assert!(bound.is_some(), "unbound dim `{dim}` left of a free group");
        match bound {
            Some(bound) => Ok(total + bound.len()),
            None => Err(CheckError::Internal(format!(
                "dim `{dim}` left of a free group has no bound extent"
            ))),
        }
    })
}

/// Substitutes bound values: named wildcards and symbol sizes become exact
/// sizes, named groups unroll into one don't-care axis per element.
pub fn expand(spec: &ShapeSpec, table: &SymbolTable) -> Result<ShapeSpec, CheckError> {
    let mut dims = Vec::with_capacity(spec.dims().len());
    for dim in spec.dims() {
        match (&dim.name, &dim.size) {
            (DimName::Named(name), DimSize::Group) => {
                let bound = table.group(name).ok_or_else(|| unbound(name))?;
                dims.extend(bound.iter().map(|&size| Dim::exact(size)));
            }
            (_, DimSize::Symbol(symbol)) => {
                let size = table.size(symbol).ok_or_else(|| unbound(symbol))?;
                dims.push(Dim {
                    name: dim.name.clone(),
                    size: DimSize::Exact(size),
                });
            }
            (DimName::Named(name), DimSize::Wildcard) => {
                let size = table.size(name).ok_or_else(|| unbound(name))?;
                dims.push(Dim::named_exact(name.clone(), size));
            }
            _ => dims.push(dim.clone()),
        }
    }
    Ok(spec.update(dims))
}

fn unbound(name: &str) -> CheckError {
    CheckError::Internal(format!("symbol `{name}` was never bound"))
}
