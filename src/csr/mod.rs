//! Compressed Sparse Row (CSR) matrix: validated storage, binary
//! persistence, a random generator, and parallel row slicing (C3).
//!
//! Binary file layout (host-native byte order, no magic bytes):
//!
//! ```text
//! offset  size     field
//! 0       u32      nrows
//! 4       u32      ncols
//! 8       u32      data_len        (= |data|)
//! …       4*N_d    data            (N_d = data_len float32s)
//! …       u32      indices_len     (= data_len)
//! …       4*N_i    indices         (u32 each)
//! …       u32      indptr_len      (= nrows + 1)
//! …       4*N_p    indptr          (u32 each)
//! ```

mod slice;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use rand::distr::{Bernoulli, Distribution};
use rand::Rng;

use crate::error::{CsrFlowError, Result};
use crate::record::{read_len_prefixed, write_len_prefixed};

/// A compressed sparse row matrix. Row `i`'s non-zero columns are
/// `indices[indptr[i]..indptr[i+1]]` with values `data[indptr[i]..indptr[i+1]]`.
///
/// Immutable after construction; two `Csr`s are equal iff all five
/// attributes match bit-exactly (no float tolerance).
#[derive(Debug, Clone, PartialEq)]
pub struct Csr {
    data: Vec<f32>,
    indices: Vec<u32>,
    indptr: Vec<u32>,
    nrows: usize,
    ncols: usize,
}

impl Csr {
    /// Takes ownership of the three vectors and validates the CSR
    /// invariants. `nrows`/`ncols` must both be supplied or both omitted;
    /// supplying exactly one is an error. When both are omitted, shape is
    /// inferred: `nrows = indptr.len() - 1`, `ncols = max(indices) + 1`.
    pub fn new(
        data: Vec<f32>,
        indices: Vec<u32>,
        indptr: Vec<u32>,
        nrows: Option<usize>,
        ncols: Option<usize>,
    ) -> Result<Self> {
        if indptr.is_empty() {
            return Err(CsrFlowError::InvalidCsr { reason: "index pointer array is empty".into() });
        }
        if indptr[0] != 0 {
            return Err(CsrFlowError::InvalidCsr { reason: "index pointer array should start with 0".into() });
        }
        if indices.is_empty() {
            return Err(CsrFlowError::InvalidCsr { reason: "indices array is empty".into() });
        }
        if data.len() != indices.len() {
            return Err(CsrFlowError::InvalidCsr {
                reason: "indices and data arrays should have same size".into(),
            });
        }
        if *indptr.last().unwrap() as usize > indices.len() {
            return Err(CsrFlowError::InvalidCsr {
                reason: "last value of index pointer should be less than the size of index and data arrays".into(),
            });
        }
        if !indptr.windows(2).all(|w| w[0] <= w[1]) {
            return Err(CsrFlowError::InvalidCsr {
                reason: "index pointer values must form a non-decreasing sequence".into(),
            });
        }

        let max_index = indices.iter().copied().max().unwrap();

        let (nrows, ncols) = match (nrows, ncols) {
            (Some(nr), Some(nc)) => {
                if indptr.len() - 1 > nr {
                    return Err(CsrFlowError::InvalidCsr {
                        reason: format!("indptr implies {} rows, which exceeds supplied nrows {}", indptr.len() - 1, nr),
                    });
                }
                if max_index as usize + 1 > nc {
                    return Err(CsrFlowError::InvalidCsr {
                        reason: format!("max index {} exceeds supplied ncols {}", max_index, nc),
                    });
                }
                (nr, nc)
            }
            (None, None) => (indptr.len() - 1, max_index as usize + 1),
            _ => {
                return Err(CsrFlowError::InvalidCsr {
                    reason: "nrows and ncols must be supplied together or not at all".into(),
                });
            }
        };

        Ok(Self { data, indices, indptr, nrows, ncols })
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn indptr(&self) -> &[u32] {
        &self.indptr
    }

    /// Saves the matrix to `path` in the binary layout documented at the
    /// top of this module.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| CsrFlowError::io("create csr file", Some(path), e))?;
        let mut out = BufWriter::new(file);

        out.write_all(&(self.nrows as u32).to_ne_bytes())
            .map_err(|e| CsrFlowError::io("write nrows", Some(path), e))?;
        out.write_all(&(self.ncols as u32).to_ne_bytes())
            .map_err(|e| CsrFlowError::io("write ncols", Some(path), e))?;

        write_len_prefixed(&mut out, &self.data, "write data", Some(path))?;
        write_len_prefixed(&mut out, &self.indices, "write indices", Some(path))?;
        write_len_prefixed(&mut out, &self.indptr, "write indptr", Some(path))?;
        Ok(())
    }

    /// Loads a matrix previously written by [`Csr::save`]. The shape stored
    /// in the header is passed through to the constructor verbatim, so
    /// shape inference never overrides an explicit on-disk shape.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| CsrFlowError::io("open csr file", Some(path), e))?;
        let mut reader = BufReader::new(file);

        let mut header = [0u8; 4];
        reader.read_exact(&mut header).map_err(|e| CsrFlowError::io("read nrows", Some(path), e))?;
        let nrows = u32::from_ne_bytes(header) as usize;
        reader.read_exact(&mut header).map_err(|e| CsrFlowError::io("read ncols", Some(path), e))?;
        let ncols = u32::from_ne_bytes(header) as usize;

        let data: Vec<f32> = read_len_prefixed(&mut reader, "read data", Some(path))?;
        let indices: Vec<u32> = read_len_prefixed(&mut reader, "read indices", Some(path))?;
        let indptr: Vec<u32> = read_len_prefixed(&mut reader, "read indptr", Some(path))?;

        Self::new(data, indices, indptr, Some(nrows), Some(ncols))
    }

    /// Builds an `nrows x ncols` matrix with each cell independently
    /// present with probability `p` (a proper `Bernoulli(p)` draw), value
    /// uniformly distributed in `[0, 1)`.
    ///
    /// Panics if `p` is not in `[0, 1]`, or if the draw produces no
    /// non-zero cells at all (an empty CSR violates the non-empty-`indices`
    /// invariant and is not a case this generator is meant to produce).
    pub fn random(nrows: usize, ncols: usize, p: f64) -> Self {
        let bernoulli = Bernoulli::new(p).expect("p must be in [0, 1]");
        let mut rng = rand::rng();

        let mut data = Vec::new();
        let mut indices = Vec::new();
        let mut indptr = Vec::with_capacity(nrows + 1);
        indptr.push(0u32);

        for _ in 0..nrows {
            let mut row_nnz = 0u32;
            for col in 0..ncols {
                if bernoulli.sample(&mut rng) {
                    data.push(rng.random::<f32>());
                    indices.push(col as u32);
                    row_nnz += 1;
                }
            }
            indptr.push(indptr.last().unwrap() + row_nnz);
        }

        Self::new(data, indices, indptr, Some(nrows), Some(ncols))
            .expect("random-generated csr with at least one non-zero cell is structurally valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn s1() -> Csr {
        Csr::new(vec![1.0, 4.0, 5.0], vec![0, 0, 1], vec![0, 1, 1, 3], Some(3), Some(3)).unwrap()
    }

    #[test]
    fn construction_infers_shape_when_omitted() {
        let m = Csr::new(vec![1.0, 4.0, 5.0], vec![0, 0, 1], vec![0, 1, 1, 3], None, None).unwrap();
        assert_eq!(m.nrows(), 3);
        assert_eq!(m.ncols(), 2);
    }

    #[test]
    fn construction_rejects_empty_indices() {
        let err = Csr::new(vec![], vec![], vec![0], None, None).unwrap_err();
        match err {
            CsrFlowError::InvalidCsr { reason } => assert_eq!(reason, "indices array is empty"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn construction_rejects_empty_indptr() {
        let err = Csr::new(vec![], vec![], vec![], None, None).unwrap_err();
        assert!(matches!(err, CsrFlowError::InvalidCsr { .. }));
    }

    #[test]
    fn construction_rejects_indptr_not_starting_at_zero() {
        let err = Csr::new(vec![1.0], vec![0], vec![1, 1], None, None).unwrap_err();
        assert!(matches!(err, CsrFlowError::InvalidCsr { .. }));
    }

    #[test]
    fn construction_rejects_data_indices_length_mismatch() {
        let err = Csr::new(vec![1.0, 2.0], vec![0], vec![0, 1], None, None).unwrap_err();
        assert!(matches!(err, CsrFlowError::InvalidCsr { .. }));
    }

    #[test]
    fn construction_rejects_indptr_overrunning_indices() {
        let err = Csr::new(vec![1.0], vec![0], vec![0, 5], None, None).unwrap_err();
        assert!(matches!(err, CsrFlowError::InvalidCsr { .. }));
    }

    #[test]
    fn construction_rejects_non_monotonic_indptr() {
        let err = Csr::new(vec![1.0, 2.0], vec![0, 1], vec![0, 2, 1], None, None).unwrap_err();
        assert!(matches!(err, CsrFlowError::InvalidCsr { .. }));
    }

    #[test]
    fn construction_rejects_one_sided_shape() {
        let err = Csr::new(vec![1.0], vec![0], vec![0, 1], Some(1), None).unwrap_err();
        assert!(matches!(err, CsrFlowError::InvalidCsr { .. }));
        let err = Csr::new(vec![1.0], vec![0], vec![0, 1], None, Some(1)).unwrap_err();
        assert!(matches!(err, CsrFlowError::InvalidCsr { .. }));
    }

    #[test]
    fn construction_rejects_shape_too_small() {
        let err = Csr::new(vec![1.0], vec![5], vec![0, 1], Some(1), Some(3)).unwrap_err();
        assert!(matches!(err, CsrFlowError::InvalidCsr { .. }));
    }

    #[test]
    fn round_trip_through_file_is_bit_exact() {
        let m = s1();
        let file = NamedTempFile::new().unwrap();
        m.save(file.path()).unwrap();
        let loaded = Csr::load(file.path()).unwrap();
        assert_eq!(loaded, m);
    }

    #[test]
    fn random_matches_requested_shape() {
        let m = Csr::random(20, 30, 0.5);
        assert_eq!(m.nrows(), 20);
        assert_eq!(m.ncols(), 30);
        assert!(m.indices().iter().all(|&c| (c as usize) < 30));
    }
}
