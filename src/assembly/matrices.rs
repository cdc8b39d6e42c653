//! Output matrices and their shared-write wrapper.

use crate::types::RlstArray;
use rlst::{rlst_dynamic_array3, RandomAccessByRef, RawAccessMut, Shape};

/// One influence matrix (U or T): split real and imaginary buffers of shape
/// `[rows, cols, n_sets]`, the row index varying fastest within a batch slab.
///
/// Imaginary parts are written only when the corresponding kernel complexity
/// flag is set; for a purely real kernel the imaginary buffer stays zero.
pub struct InfluenceMatrix {
    /// Real parts.
    pub re: RlstArray<f64, 3>,
    /// Imaginary parts.
    pub im: RlstArray<f64, 3>,
}

impl InfluenceMatrix {
    /// Allocate a zeroed matrix.
    pub fn new(rows: usize, cols: usize, n_sets: usize) -> Self {
        Self {
            re: rlst_dynamic_array3!(f64, [rows, cols, n_sets]),
            im: rlst_dynamic_array3!(f64, [rows, cols, n_sets]),
        }
    }

    /// Shape `[rows, cols, n_sets]`.
    pub fn shape(&self) -> [usize; 3] {
        self.re.shape()
    }

    /// Real part of one entry.
    pub fn get_re(&self, row: usize, col: usize, set: usize) -> f64 {
        *self.re.get([row, col, set]).unwrap()
    }

    /// Imaginary part of one entry.
    pub fn get_im(&self, row: usize, col: usize, set: usize) -> f64 {
        *self.im.get([row, col, set]).unwrap()
    }
}

/// Raw pointers into an [`InfluenceMatrix`], shared between assembly workers.
///
/// Workers are partitioned by destination row (each row collocation point's
/// rows are written by exactly one worker), so concurrent accumulation never
/// aliases.
pub(crate) struct RawInfluenceData {
    re: *mut f64,
    im: *mut f64,
    rows: usize,
    slab: usize,
}

unsafe impl Sync for RawInfluenceData {}

impl RawInfluenceData {
    pub(crate) fn new(matrix: &mut InfluenceMatrix) -> Self {
        let shape = matrix.re.shape();
        Self {
            re: matrix.re.data_mut().as_mut_ptr(),
            im: matrix.im.data_mut().as_mut_ptr(),
            rows: shape[0],
            slab: shape[0] * shape[1],
        }
    }

    /// Accumulate into the real part of a dense entry.
    ///
    /// # Safety
    /// The caller must hold exclusive ownership of the destination row.
    pub(crate) unsafe fn add_re(&self, row: usize, col: usize, set: usize, value: f64) {
        *self.re.add(row + self.rows * col + self.slab * set) += value;
    }

    /// Accumulate into the imaginary part of a dense entry.
    ///
    /// # Safety
    /// The caller must hold exclusive ownership of the destination row.
    pub(crate) unsafe fn add_im(&self, row: usize, col: usize, set: usize, value: f64) {
        *self.im.add(row + self.rows * col + self.slab * set) += value;
    }

    /// Accumulate into the real part of a selection slot.
    ///
    /// # Safety
    /// The caller must hold exclusive ownership of the slot's row
    /// collocation point.
    pub(crate) unsafe fn add_slot_re(&self, slot: usize, set: usize, value: f64) {
        *self.re.add(slot + self.slab * set) += value;
    }

    /// Accumulate into the imaginary part of a selection slot.
    ///
    /// # Safety
    /// The caller must hold exclusive ownership of the slot's row
    /// collocation point.
    pub(crate) unsafe fn add_slot_im(&self, slot: usize, set: usize, value: f64) {
        *self.im.add(slot + self.slab * set) += value;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn matrices_start_zeroed() {
        let m = InfluenceMatrix::new(3, 4, 2);
        assert_eq!(m.shape(), [3, 4, 2]);
        for set in 0..2 {
            for col in 0..4 {
                for row in 0..3 {
                    assert_eq!(m.get_re(row, col, set), 0.0);
                    assert_eq!(m.get_im(row, col, set), 0.0);
                }
            }
        }
    }

    #[test]
    fn raw_writes_accumulate() {
        let mut m = InfluenceMatrix::new(2, 2, 2);
        {
            let raw = RawInfluenceData::new(&mut m);
            unsafe {
                raw.add_re(1, 0, 1, 2.5);
                raw.add_re(1, 0, 1, 0.5);
                raw.add_im(0, 1, 0, -1.0);
                raw.add_slot_re(3, 0, 4.0); // slot 3 = (row 1, col 1)
            }
        }
        assert_eq!(m.get_re(1, 0, 1), 3.0);
        assert_eq!(m.get_im(0, 1, 0), -1.0);
        assert_eq!(m.get_re(1, 1, 0), 4.0);
    }
}
