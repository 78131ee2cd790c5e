//! Scope variables and index lookup.
//!
//! A scope is an ordered list of distinct variables; a variable's position
//! is its row/column in every parameter of the factor. Lookups accept any
//! borrowed form of the variable (`&str` for `String` scopes).

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use crate::error::{FactorError, Result};

/// Identifier of a random variable in a factor scope.
pub trait Variable: Clone + Eq + Hash + fmt::Debug {}

impl<T: Clone + Eq + Hash + fmt::Debug> Variable for T {}

/// Fails with `DuplicateVariable` if any variable appears twice.
pub(crate) fn ensure_distinct<V: Variable>(scope: &[V]) -> Result<()> {
    let mut seen = std::collections::HashSet::with_capacity(scope.len());
    for var in scope {
        if !seen.insert(var) {
            return Err(FactorError::DuplicateVariable(format!("{:?}", var)));
        }
    }
    Ok(())
}

/// Position of `var` in `scope`.
pub(crate) fn position_of<V, Q>(scope: &[V], var: &Q) -> Result<usize>
where
    V: Borrow<Q>,
    Q: Eq + fmt::Debug + ?Sized,
{
    scope
        .iter()
        .position(|v| <V as Borrow<Q>>::borrow(v) == var)
        .ok_or_else(|| FactorError::UnknownVariable(format!("{:?}", var)))
}

/// Observed values realigned to scope order.
///
/// `indices` is ascending and `values[i]` is the observation for the
/// variable at `indices[i]`, whatever order the caller supplied them in.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Observation {
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

/// Sorts `(variable, value)` pairs by the variable's position in `scope`.
pub(crate) fn align_observation<V, Q>(scope: &[V], values: &[(&Q, f64)]) -> Result<Observation>
where
    V: Variable + Borrow<Q>,
    Q: Eq + fmt::Debug + ?Sized,
{
    let mut pairs = Vec::with_capacity(values.len());
    for (var, value) in values {
        pairs.push((position_of(scope, *var)?, *value));
    }
    pairs.sort_by_key(|(idx, _)| *idx);
    if let Some(w) = pairs.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(FactorError::InvalidValues(format!(
            "variable {:?} is given more than one value",
            scope[w[0].0]
        )));
    }
    Ok(Observation {
        indices: pairs.iter().map(|(idx, _)| *idx).collect(),
        values: pairs.iter().map(|(_, value)| *value).collect(),
    })
}

/// Positions of `vars` in `scope`, ascending. Naming a variable twice is an error.
pub(crate) fn sorted_positions<V, Q>(scope: &[V], vars: &[&Q]) -> Result<Vec<usize>>
where
    V: Variable + Borrow<Q>,
    Q: Eq + fmt::Debug + ?Sized,
{
    let mut indices = vars
        .iter()
        .map(|var| position_of(scope, *var))
        .collect::<Result<Vec<_>>>()?;
    indices.sort_unstable();
    if let Some(w) = indices.windows(2).find(|w| w[0] == w[1]) {
        return Err(FactorError::InvalidValues(format!(
            "variable {:?} is named more than once",
            scope[w[0]]
        )));
    }
    Ok(indices)
}

/// Indices `0..n` not present in the ascending list `removed`.
pub(crate) fn complement(n: usize, removed: &[usize]) -> Vec<usize> {
    (0..n).filter(|i| removed.binary_search(i).is_err()).collect()
}
