//! Sparse partial-assembly selection.
//!
//! A [`SelectionSet`] names exactly the output entries to compute as an
//! ordered list of (row collocation, row component, column collocation,
//! column component) quadruples, each tied to an output slot. The derived
//! [`SelectionIndex`] groups the entries by unique row collocation point and
//! carries coordinate-keyed lookups for the diagonal block; an absent key
//! means the entry was not requested.

use crate::types::{BemError, Result};
use std::collections::{HashMap, HashSet};

/// One requested output entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionEntry {
    /// Row collocation point.
    pub row_coll: usize,
    /// Row component (load direction), `< dof`.
    pub row_comp: usize,
    /// Column collocation point.
    pub col_coll: usize,
    /// Column component, `< dof`.
    pub col_comp: usize,
    /// Flat output position within one `rows x cols` slab, row index
    /// fastest.
    pub slot: usize,
}

/// An ordered sparse request for a subset of the output entries.
#[derive(Debug, Clone)]
pub struct SelectionSet {
    /// Output shape `[rows, cols]` of one batch slab.
    pub shape: [usize; 2],
    /// The requested entries.
    pub entries: Vec<SelectionEntry>,
}

impl SelectionSet {
    /// Request the cross product of a row and a column DOF list: entry
    /// `(i, j)` of the `row_dofs.len() x col_dofs.len()` output is the matrix
    /// entry at global DOFs `(row_dofs[i], col_dofs[j])`. `dof` is the number
    /// of components per collocation point.
    pub fn from_dof_products(row_dofs: &[usize], col_dofs: &[usize], dof: usize) -> Self {
        let ms = row_dofs.len();
        let mut entries = Vec::with_capacity(ms * col_dofs.len());
        for (j, col_dof) in col_dofs.iter().enumerate() {
            for (i, row_dof) in row_dofs.iter().enumerate() {
                entries.push(SelectionEntry {
                    row_coll: row_dof / dof,
                    row_comp: row_dof % dof,
                    col_coll: col_dof / dof,
                    col_comp: col_dof % dof,
                    slot: j * ms + i,
                });
            }
        }
        Self {
            shape: [ms, col_dofs.len()],
            entries,
        }
    }

    /// Request an explicit list of matrix entries, given as global
    /// (row DOF, column DOF) pairs. The output has one row per pair.
    pub fn from_dof_pairs(pairs: &[(usize, usize)], dof: usize) -> Self {
        let entries = pairs
            .iter()
            .enumerate()
            .map(|(slot, (row_dof, col_dof))| SelectionEntry {
                row_coll: row_dof / dof,
                row_comp: row_dof % dof,
                col_coll: col_dof / dof,
                col_comp: col_dof % dof,
                slot,
            })
            .collect();
        Self {
            shape: [pairs.len(), 1],
            entries,
        }
    }
}

/// Entries of one unique row collocation point.
pub(crate) struct RowRequests {
    /// The row collocation point.
    pub coll: usize,
    /// Indices into [`SelectionSet::entries`].
    pub entries: Vec<usize>,
}

/// Index structures derived once per selection set.
pub(crate) struct SelectionIndex {
    /// Unique row collocation points, in first-appearance order, each with
    /// its entry range.
    pub rows: Vec<RowRequests>,
    /// (collocation, row component, column component) of a requested
    /// diagonal-block entry, mapped to its output slot. Absent means not
    /// requested.
    pub diag_slots: HashMap<(usize, usize, usize), usize>,
    /// Collocation points whose diagonal block is requested in full; for
    /// these the diagonal pass writes through `diag_slots` without
    /// re-checking membership.
    pub block_diagonal: HashSet<usize>,
    /// Collocation points with at least one requested diagonal-block entry.
    pub diag_requested: HashSet<usize>,
    /// Collocation points appearing as a column in any entry.
    pub col_collocations: HashSet<usize>,
}

impl SelectionIndex {
    /// Build the index, validating the selection against the model size.
    pub(crate) fn build(selection: &SelectionSet, dof: usize, n_coll: usize) -> Result<Self> {
        let mut rows: Vec<RowRequests> = Vec::new();
        let mut row_of: HashMap<usize, usize> = HashMap::new();
        let mut diag_slots = HashMap::new();
        let mut col_collocations = HashSet::new();

        for (i, entry) in selection.entries.iter().enumerate() {
            if entry.row_coll >= n_coll || entry.col_coll >= n_coll {
                return Err(BemError::InvalidSelection(
                    "A selection entry refers to a collocation point outside the mesh.",
                ));
            }
            if entry.row_comp >= dof || entry.col_comp >= dof {
                return Err(BemError::InvalidSelection(
                    "A selection entry refers to a component outside the problem's DOF count.",
                ));
            }
            if entry.slot >= selection.shape[0] * selection.shape[1] {
                return Err(BemError::InvalidSelection(
                    "A selection entry's output slot lies outside the output shape.",
                ));
            }
            let row = *row_of.entry(entry.row_coll).or_insert_with(|| {
                rows.push(RowRequests {
                    coll: entry.row_coll,
                    entries: Vec::new(),
                });
                rows.len() - 1
            });
            rows[row].entries.push(i);
            col_collocations.insert(entry.col_coll);
            if entry.row_coll == entry.col_coll {
                diag_slots.insert(
                    (entry.row_coll, entry.row_comp, entry.col_comp),
                    entry.slot,
                );
            }
        }

        let block_diagonal = rows
            .iter()
            .map(|r| r.coll)
            .filter(|coll| {
                (0..dof).all(|k| (0..dof).all(|l| diag_slots.contains_key(&(*coll, k, l))))
            })
            .collect();
        let diag_requested = diag_slots.keys().map(|(coll, _, _)| *coll).collect();

        Ok(Self {
            rows,
            diag_slots,
            block_diagonal,
            diag_requested,
            col_collocations,
        })
    }
}
