//! Parallel row slicing: the hot path of the CSR engine.

use rayon::prelude::*;

use super::Csr;
use crate::dense::Dense;
use crate::error::{CsrFlowError, Result};

impl Csr {
    /// Materializes a dense submatrix from a selection of (possibly
    /// negative) row indices.
    ///
    /// Output row `i` corresponds to `ixs[i]`: a negative index `k` is
    /// normalized to `k + nrows` before bounds are checked. Out-of-range
    /// indices (after normalization) fail with
    /// [`CsrFlowError::IndexOutOfRange`]. Output rows are scattered in
    /// parallel over disjoint row slices of the result buffer, so no
    /// synchronization between workers is required; the first error
    /// encountered by any worker is the one returned.
    pub fn slice(&self, ixs: &[i64]) -> Result<Dense> {
        let mut out = Dense::zeros(ixs.len(), self.ncols);
        let nrows = self.nrows as i64;

        out.as_mut_slice()
            .par_chunks_mut(self.ncols)
            .zip(ixs.par_iter())
            .try_for_each(|(row_out, &k)| -> Result<()> {
                let mut idx = k;
                if idx < 0 {
                    idx += nrows;
                }
                if idx < 0 || idx >= nrows {
                    return Err(CsrFlowError::IndexOutOfRange { index: k, bound: self.nrows });
                }
                let idx = idx as usize;

                let start = self.indptr[idx] as usize;
                let end = self.indptr[idx + 1] as usize;
                for j in start..end {
                    row_out[self.indices[j] as usize] = self.data[j];
                }
                Ok(())
            })?;

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s1() -> Csr {
        Csr::new(vec![1.0, 4.0, 5.0], vec![0, 0, 1], vec![0, 1, 1, 3], Some(3), Some(3)).unwrap()
    }

    #[test]
    fn slice_with_negative_index_matches_scenario_s1() {
        let m = s1();
        let d = m.slice(&[0, 2, -3]).unwrap();
        assert_eq!(d.nrows(), 3);
        assert_eq!(d.ncols(), 3);
        assert_eq!(d.into_data(), vec![1.0, 0.0, 0.0, 4.0, 5.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn negative_index_equivalence() {
        let m = s1();
        let from_negative = m.slice(&[-3]).unwrap();
        let from_positive = m.slice(&[0]).unwrap();
        assert_eq!(from_negative, from_positive);
    }

    #[test]
    fn out_of_range_positive_index_errors() {
        let m = s1();
        let err = m.slice(&[3]).unwrap_err();
        assert!(matches!(err, CsrFlowError::IndexOutOfRange { index: 3, bound: 3 }));
    }

    #[test]
    fn out_of_range_negative_index_errors() {
        let m = s1();
        let err = m.slice(&[-4]).unwrap_err();
        assert!(matches!(err, CsrFlowError::IndexOutOfRange { bound: 3, .. }));
    }

    #[test]
    fn empty_row_slices_to_all_zeros() {
        let m = s1();
        let d = m.slice(&[1]).unwrap();
        assert_eq!(d.into_data(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn output_row_order_mirrors_input_selection() {
        let m = s1();
        let d = m.slice(&[2, 0]).unwrap();
        assert_eq!(d.get(0, 0), 4.0);
        assert_eq!(d.get(0, 1), 5.0);
        assert_eq!(d.get(1, 0), 1.0);
    }
}
