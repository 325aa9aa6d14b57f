//! External merge sorter (C4): chunked in-memory sort, spill to numbered
//! run files, then a lazily-pulled k-way priority-queue merge.

mod merge;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use rayon::prelude::*;

pub use merge::Merge;

use crate::error::{CsrFlowError, Result};
use crate::record::Record;
use crate::stream::RecordStream;

/// The smallest wire size any record in this crate can occupy (`Edge` is
/// exactly this size; `Adjacency` with zero targets is too). Used as the
/// floor for `max_mem` so at least one record always fits in the buffer.
const MIN_RECORD_WIRE_SIZE: usize = 8;

/// Sorts a stream of records too large to fit in memory.
///
/// Phase 1 buffers records up to `max_mem` bytes (tracked by each record's
/// on-wire size, not a fixed record count — this generalizes correctly to
/// `Adjacency`'s variable length), sorts the buffer in parallel, and spills
/// it to `scratch_dir/<n>.bin`. Phase 2 opens every run file and returns a
/// [`Merge`] that lazily pulls a globally-sorted sequence out of them via a
/// k-way priority-queue merge. Run files are not deleted automatically —
/// the caller owns `scratch_dir`'s lifecycle.
pub struct ExternalSorter<T: Record + Default> {
    scratch_dir: PathBuf,
    max_mem: usize,
    n_chunks: u32,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Record + Default> ExternalSorter<T> {
    /// `max_mem` is the byte budget for the in-memory buffer, clamped from
    /// below so at least one record always fits.
    pub fn new(scratch_dir: impl Into<PathBuf>, max_mem: usize) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            max_mem: max_mem.max(MIN_RECORD_WIRE_SIZE),
            n_chunks: 0,
            _marker: std::marker::PhantomData,
        }
    }

    fn run_path(&self, n: u32) -> PathBuf {
        self.scratch_dir.join(format!("{n}.bin"))
    }

    fn sort_and_flush(&mut self, buf: &mut Vec<T>) -> Result<()> {
        buf.par_sort_unstable();

        let path = self.run_path(self.n_chunks);
        let file = File::create(&path).map_err(|e| CsrFlowError::io("create run file", Some(&path), e))?;
        let mut writer = BufWriter::new(file);

        for item in buf.iter() {
            if !item.encode(&mut writer) {
                return Err(CsrFlowError::io(
                    "write run file",
                    Some(&path),
                    std::io::Error::other("short write while encoding a record"),
                ));
            }
        }
        writer.flush().map_err(|e| CsrFlowError::io("flush run file", Some(&path), e))?;

        self.n_chunks += 1;
        buf.clear();
        Ok(())
    }

    /// Reads records one by one from `source`, buffering, sorting, and
    /// spilling runs until `source` is exhausted, then opens every run file
    /// and returns the lazily-merged sorted sequence.
    pub fn sort_unstable<R: Read>(&mut self, source: R) -> Result<Merge<T>> {
        let mut buf: Vec<T> = Vec::new();
        let mut buf_bytes = 0usize;

        for record in RecordStream::<R, T>::new(source) {
            buf_bytes += record.wire_size();
            buf.push(record);
            if buf_bytes >= self.max_mem {
                self.sort_and_flush(&mut buf)?;
                buf_bytes = 0;
            }
        }
        if !buf.is_empty() {
            self.sort_and_flush(&mut buf)?;
        }
        drop(buf); // release the buffer before opening run files for the merge

        let mut readers = Vec::with_capacity(self.n_chunks as usize);
        for n in 0..self.n_chunks {
            let path = self.run_path(n);
            let file = File::open(&path).map_err(|e| CsrFlowError::io("open run file", Some(&path), e))?;
            readers.push(BufReader::new(file));
        }

        Ok(Merge::new(readers))
    }

    /// The scratch directory run files are written to.
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Number of run files written by phase 1 so far.
    pub fn run_count(&self) -> u32 {
        self.n_chunks
    }
}
