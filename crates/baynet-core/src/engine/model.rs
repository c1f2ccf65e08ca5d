//! # Probability Models
//!
//! A [`ProbabilityModel`] is the distribution attached to one variable (its
//! *subject*): either an unconditional prior, or a conditional probability
//! table (CPT) over an ordered list of parents.
//!
//! ## Layout
//!
//! Tables are stored densely. Rows follow the Cartesian product of the parent
//! domains with the first parent most significant, so the row of a parent
//! tuple `(i_1, ..., i_n)` is `sum(i_k * stride_k)`. Each row holds one
//! probability per value of the subject's domain, in domain order.
//!
//! Construction validates everything up front; lookups after that are plain
//! indexing.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::engine::distribution::{check_normalized, Distribution, PROBABILITY_TOLERANCE};
use crate::engine::errors::{BayesError, BayesResult};
use crate::engine::variable::Variable;

/// Parent lists are short in practice; keep them inline.
pub(crate) type ParentVec<T> = SmallVec<[T; 4]>;

/// Largest number of probabilities a single table may hold.
pub const MAX_TABLE_ENTRIES: usize = 1 << 24;

/// Distribution of one variable, optionally conditioned on parents.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityModel {
    subject: Variable,
    parents: ParentVec<Variable>,
    strides: ParentVec<usize>,
    table: Vec<f64>,
}

impl ProbabilityModel {
    /// Creates an unconditional distribution over `variable`'s domain.
    ///
    /// Every domain value must be keyed exactly once, probabilities must lie
    /// in `[0, 1]` and sum to one within `1e-9`.
    pub fn create_prior<I, K>(variable: Variable, distribution: I) -> BayesResult<Self>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let row = parse_row(&variable, distribution, "prior")?;
        Ok(Self {
            subject: variable,
            parents: ParentVec::new(),
            strides: ParentVec::new(),
            table: row,
        })
    }

    /// Creates a conditional probability table.
    ///
    /// `table` maps a tuple of parent values (one per parent, in `parents`
    /// order) to a distribution over `variable`'s domain. Every combination of
    /// parent values must appear exactly once.
    pub fn create_conditional<PI, T, P, S, D, K>(
        variable: Variable,
        parents: PI,
        table: T,
    ) -> BayesResult<Self>
    where
        PI: IntoIterator<Item = Variable>,
        T: IntoIterator<Item = (P, D)>,
        P: IntoIterator<Item = S>,
        S: AsRef<str>,
        D: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let parents: ParentVec<Variable> = parents.into_iter().collect();
        validate_parents(&variable, &parents)?;

        let (strides, row_count) = compute_strides(&variable, &parents)?;
        let width = variable.cardinality();
        let mut entries = vec![0.0; row_count * width];
        let mut filled = vec![false; row_count];

        for (combination, distribution) in table {
            let combination: ParentVec<S> = combination.into_iter().collect();
            let label = format_combination(&combination);
            let row_idx = resolve_combination(&variable, &parents, &strides, &combination)?;
            if filled[row_idx] {
                return Err(BayesError::ValidationError(format!(
                    "'{}': row for parents {} is given more than once",
                    variable.name(),
                    label
                )));
            }
            let row = parse_row(&variable, distribution, &format!("row {}", label))?;
            entries[row_idx * width..(row_idx + 1) * width].copy_from_slice(&row);
            filled[row_idx] = true;
        }

        if let Some(missing) = filled.iter().position(|done| !done) {
            let labels = decode_row(&parents, &strides, missing);
            return Err(BayesError::ValidationError(format!(
                "'{}': missing row for parents {}",
                variable.name(),
                format_combination(&labels)
            )));
        }

        Ok(Self {
            subject: variable,
            parents,
            strides,
            table: entries,
        })
    }

    /// Creates a conditional probability table from flat rows.
    ///
    /// Each row lists the parent values followed by the subject value, paired
    /// with `P(value | parents)`, e.g. `(["A", "B", "C"], 1.0)` for a subject
    /// with two parents. Rows are grouped per parent combination and then
    /// validated exactly like [`create_conditional`](Self::create_conditional).
    pub fn create_conditional_from_rows<PI, I, R, S>(
        variable: Variable,
        parents: PI,
        rows: I,
    ) -> BayesResult<Self>
    where
        PI: IntoIterator<Item = Variable>,
        I: IntoIterator<Item = (R, f64)>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let parents: ParentVec<Variable> = parents.into_iter().collect();
        let arity = parents.len() + 1;

        let mut order: Vec<Vec<String>> = Vec::new();
        let mut grouped: FxHashMap<Vec<String>, Vec<(String, f64)>> = FxHashMap::default();
        for (row, p) in rows {
            let cells = row.as_ref();
            if cells.len() != arity {
                return Err(BayesError::ValidationError(format!(
                    "'{}': flat row has {} cells, expected {} ({} parents + value)",
                    variable.name(),
                    cells.len(),
                    arity,
                    parents.len()
                )));
            }
            let key: Vec<String> = cells[..arity - 1]
                .iter()
                .map(|c| c.as_ref().to_string())
                .collect();
            let value = cells[arity - 1].as_ref().to_string();
            let entry = grouped.entry(key.clone()).or_insert_with(|| {
                order.push(key);
                Vec::new()
            });
            entry.push((value, p));
        }

        let table: Vec<(Vec<String>, Vec<(String, f64)>)> = order
            .into_iter()
            .map(|key| {
                let row = grouped.remove(&key).unwrap_or_default();
                (key, row)
            })
            .collect();
        Self::create_conditional(variable, parents, table)
    }

    /// The variable this model describes.
    pub fn subject(&self) -> &Variable {
        &self.subject
    }

    /// Parents in table column order. Empty for a prior.
    pub fn parents(&self) -> &[Variable] {
        &self.parents
    }

    pub fn is_prior(&self) -> bool {
        self.parents.is_empty()
    }

    /// Number of rows in the table (one for a prior).
    pub fn rows(&self) -> usize {
        self.table.len() / self.subject.cardinality()
    }

    /// Returns `P(subject = value | parents = parent_assignment)`.
    ///
    /// `parent_assignment` lists one value per parent in [`parents`](Self::parents)
    /// order; pass an empty slice for a prior.
    pub fn probability<S: AsRef<str>>(
        &self,
        value: &str,
        parent_assignment: &[S],
    ) -> BayesResult<f64> {
        let value_idx = self.subject.index_of(value).ok_or_else(|| {
            BayesError::LookupError(format!(
                "'{}': value '{}' is not in the domain",
                self.subject.name(),
                value
            ))
        })?;
        let row_idx = self.lookup_row(parent_assignment)?;
        Ok(self.entry(row_idx, value_idx))
    }

    /// Full distribution over the subject for one parent combination.
    pub fn row<S: AsRef<str>>(&self, parent_assignment: &[S]) -> BayesResult<Distribution> {
        let row_idx = self.lookup_row(parent_assignment)?;
        let width = self.subject.cardinality();
        Ok(Distribution::from_parts(
            self.subject.shared_domain(),
            self.table[row_idx * width..(row_idx + 1) * width].to_vec(),
        ))
    }

    /// Row index of a parent combination given as domain indices.
    pub(crate) fn row_index<I: IntoIterator<Item = usize>>(&self, parent_values: I) -> usize {
        parent_values
            .into_iter()
            .zip(self.strides.iter())
            .map(|(value, stride)| value * stride)
            .sum()
    }

    #[inline]
    pub(crate) fn entry(&self, row: usize, value: usize) -> f64 {
        self.table[row * self.subject.cardinality() + value]
    }

    fn lookup_row<S: AsRef<str>>(&self, parent_assignment: &[S]) -> BayesResult<usize> {
        if parent_assignment.len() != self.parents.len() {
            return Err(BayesError::LookupError(format!(
                "'{}': expected {} parent values, got {}",
                self.subject.name(),
                self.parents.len(),
                parent_assignment.len()
            )));
        }
        let mut row = 0;
        for ((parent, value), stride) in self
            .parents
            .iter()
            .zip(parent_assignment)
            .zip(self.strides.iter())
        {
            let idx = parent.index_of(value.as_ref()).ok_or_else(|| {
                BayesError::LookupError(format!(
                    "'{}': no table row for parent '{}' = '{}'",
                    self.subject.name(),
                    parent.name(),
                    value.as_ref()
                ))
            })?;
            row += idx * stride;
        }
        Ok(row)
    }
}

fn validate_parents(subject: &Variable, parents: &[Variable]) -> BayesResult<()> {
    if parents.is_empty() {
        return Err(BayesError::ValidationError(format!(
            "'{}': a conditional table needs at least one parent; use create_prior",
            subject.name()
        )));
    }
    for (idx, parent) in parents.iter().enumerate() {
        if parent.name() == subject.name() {
            return Err(BayesError::ValidationError(format!(
                "'{}': a variable cannot be its own parent",
                subject.name()
            )));
        }
        if parents[..idx].iter().any(|p| p.name() == parent.name()) {
            return Err(BayesError::ValidationError(format!(
                "'{}': parent '{}' is listed more than once",
                subject.name(),
                parent.name()
            )));
        }
    }
    Ok(())
}

/// Strides per parent and the total row count.
///
/// Fails when `rows * |subject|` would exceed [`MAX_TABLE_ENTRIES`].
fn compute_strides(
    subject: &Variable,
    parents: &[Variable],
) -> BayesResult<(ParentVec<usize>, usize)> {
    let too_large = || {
        BayesError::ValidationError(format!(
            "'{}': table over {} parents exceeds {} entries",
            subject.name(),
            parents.len(),
            MAX_TABLE_ENTRIES
        ))
    };
    let mut strides: ParentVec<usize> = smallvec::smallvec![0; parents.len()];
    let mut stride: usize = 1;
    for (slot, parent) in parents.iter().enumerate().rev() {
        strides[slot] = stride;
        stride = stride
            .checked_mul(parent.cardinality())
            .filter(|rows| rows.saturating_mul(subject.cardinality()) <= MAX_TABLE_ENTRIES)
            .ok_or_else(too_large)?;
    }
    Ok((strides, stride))
}

fn resolve_combination<S: AsRef<str>>(
    subject: &Variable,
    parents: &[Variable],
    strides: &[usize],
    combination: &[S],
) -> BayesResult<usize> {
    if combination.len() != parents.len() {
        return Err(BayesError::ValidationError(format!(
            "'{}': row {} has {} parent values, expected {}",
            subject.name(),
            format_combination(combination),
            combination.len(),
            parents.len()
        )));
    }
    let mut row = 0;
    for ((parent, value), stride) in parents.iter().zip(combination).zip(strides) {
        let idx = parent.index_of(value.as_ref()).ok_or_else(|| {
            BayesError::ValidationError(format!(
                "'{}': row {} is not a parent combination ('{}' has no value '{}')",
                subject.name(),
                format_combination(combination),
                parent.name(),
                value.as_ref()
            ))
        })?;
        row += idx * stride;
    }
    Ok(row)
}

fn decode_row<'a>(parents: &'a [Variable], strides: &[usize], row: usize) -> Vec<&'a str> {
    parents
        .iter()
        .zip(strides)
        .map(|(parent, stride)| parent.domain()[(row / stride) % parent.cardinality()].as_ref())
        .collect()
}

fn format_combination<S: AsRef<str>>(values: &[S]) -> String {
    let inner: Vec<&str> = values.iter().map(AsRef::as_ref).collect();
    format!("({})", inner.join(", "))
}

/// Maps a `value -> probability` listing onto `variable`'s domain order.
fn parse_row<I, K>(variable: &Variable, distribution: I, context: &str) -> BayesResult<Vec<f64>>
where
    I: IntoIterator<Item = (K, f64)>,
    K: AsRef<str>,
{
    let mut slots: Vec<Option<f64>> = vec![None; variable.cardinality()];
    for (key, p) in distribution {
        let key = key.as_ref();
        let idx = variable.index_of(key).ok_or_else(|| {
            BayesError::ValidationError(format!(
                "'{}' {}: '{}' is not in the domain",
                variable.name(),
                context,
                key
            ))
        })?;
        if slots[idx].replace(p).is_some() {
            return Err(BayesError::ValidationError(format!(
                "'{}' {}: value '{}' is given more than once",
                variable.name(),
                context,
                key
            )));
        }
    }

    let mut row = Vec::with_capacity(slots.len());
    for (idx, slot) in slots.into_iter().enumerate() {
        match slot {
            Some(p) => row.push(p),
            None => {
                return Err(BayesError::ValidationError(format!(
                    "'{}' {}: no probability for value '{}'",
                    variable.name(),
                    context,
                    variable.domain()[idx]
                )))
            }
        }
    }

    check_normalized(&row, PROBABILITY_TOLERANCE).map_err(|reason| {
        BayesError::ValidationError(format!("'{}' {}: {}", variable.name(), context, reason))
    })?;
    Ok(row)
}
