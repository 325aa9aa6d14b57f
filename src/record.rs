//! Fixed-schema binary records exchanged between the external sorter and its
//! backing run files.
//!
//! Both record types store their fields in host byte order with no padding;
//! endian portability across hosts is explicitly not a goal (see the crate's
//! design notes).

use std::io::{Read, Write};

use crate::error::{CsrFlowError, Result};

/// A scalar that can round-trip through the crate's length-prefixed typed
/// vector format (`u32 length || length * element_size` raw bytes), used by
/// the CSR binary file to store `data`, `indices` and `indptr`.
pub(crate) trait WireScalar: Copy + Default {
    fn to_ne(self) -> [u8; 4];
    fn from_ne(bytes: [u8; 4]) -> Self;
}

impl WireScalar for f32 {
    fn to_ne(self) -> [u8; 4] {
        self.to_ne_bytes()
    }
    fn from_ne(bytes: [u8; 4]) -> Self {
        f32::from_ne_bytes(bytes)
    }
}

impl WireScalar for u32 {
    fn to_ne(self) -> [u8; 4] {
        self.to_ne_bytes()
    }
    fn from_ne(bytes: [u8; 4]) -> Self {
        u32::from_ne_bytes(bytes)
    }
}

/// Writes `items` as a length-prefixed typed vector: `u32 length` followed by
/// `items.len()` native-endian elements.
pub(crate) fn write_len_prefixed<W: Write, T: WireScalar>(
    writer: &mut W,
    items: &[T],
    op: &'static str,
    path: Option<&std::path::Path>,
) -> Result<()> {
    writer
        .write_all(&(items.len() as u32).to_ne_bytes())
        .map_err(|e| CsrFlowError::io(op, path, e))?;
    for &item in items {
        writer.write_all(&item.to_ne()).map_err(|e| CsrFlowError::io(op, path, e))?;
    }
    Ok(())
}

/// Reads a length-prefixed typed vector written by [`write_len_prefixed`].
pub(crate) fn read_len_prefixed<R: Read, T: WireScalar>(
    reader: &mut R,
    op: &'static str,
    path: Option<&std::path::Path>,
) -> Result<Vec<T>> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).map_err(|e| CsrFlowError::io(op, path, e))?;
    let len = u32::from_ne_bytes(len_buf) as usize;

    let mut out = Vec::with_capacity(len);
    let mut elem_buf = [0u8; 4];
    for _ in 0..len {
        reader.read_exact(&mut elem_buf).map_err(|e| CsrFlowError::io(op, path, e))?;
        out.push(T::from_ne(elem_buf));
    }
    Ok(out)
}

/// A fixed-schema record that can be written to and read back from a byte
/// stream, and that has a total order used to drive the external sorter.
///
/// `Edge` and `Adjacency` are the only two implementors; neither wraps nor
/// extends the other.
pub trait Record: Clone + Ord + Send {
    /// Writes the record's binary layout to `sink`. Returns `true` if the
    /// sink remained healthy for the whole write.
    fn encode<W: Write>(&self, sink: &mut W) -> bool;

    /// Attempts to read one record from `source` into `out`. Returns `true`
    /// if a complete record was consumed; on a partial read at end of
    /// stream, returns `false` and leaves `out` unspecified.
    fn decode<R: Read>(source: &mut R, out: &mut Self) -> bool;

    /// Size in bytes this record occupies on the wire. Used by the external
    /// sorter to track its in-memory budget without assuming a fixed
    /// `size_of::<Self>()` (which does not hold for `Adjacency`).
    fn wire_size(&self) -> usize;
}

/// A directed edge `(source, target)` between two 32-bit node ids.
///
/// Wire layout: `u32 source || u32 target`, 8 bytes total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Edge {
    pub source: u32,
    pub target: u32,
}

impl Edge {
    pub fn new(source: u32, target: u32) -> Self {
        Self { source, target }
    }
}

impl Record for Edge {
    fn encode<W: Write>(&self, sink: &mut W) -> bool {
        sink.write_all(&self.source.to_ne_bytes()).is_ok() && sink.write_all(&self.target.to_ne_bytes()).is_ok()
    }

    fn decode<R: Read>(source: &mut R, out: &mut Self) -> bool {
        let mut buf = [0u8; 4];
        if source.read_exact(&mut buf).is_err() {
            return false;
        }
        let src = u32::from_ne_bytes(buf);
        if source.read_exact(&mut buf).is_err() {
            return false;
        }
        out.source = src;
        out.target = u32::from_ne_bytes(buf);
        true
    }

    fn wire_size(&self) -> usize {
        8
    }
}

/// A source node and its ordered list of target nodes.
///
/// Wire layout: `u32 length || u32 source || length * u32 targets`. Note
/// that the length precedes the source — this is the established wire order
/// and must be preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Adjacency {
    pub source: u32,
    pub targets: Vec<u32>,
}

impl Adjacency {
    pub fn new(source: u32, targets: Vec<u32>) -> Self {
        Self { source, targets }
    }
}

impl Record for Adjacency {
    fn encode<W: Write>(&self, sink: &mut W) -> bool {
        let len = self.targets.len() as u32;
        if sink.write_all(&len.to_ne_bytes()).is_err() {
            return false;
        }
        if sink.write_all(&self.source.to_ne_bytes()).is_err() {
            return false;
        }
        for t in &self.targets {
            if sink.write_all(&t.to_ne_bytes()).is_err() {
                return false;
            }
        }
        true
    }

    fn decode<R: Read>(source: &mut R, out: &mut Self) -> bool {
        let mut buf = [0u8; 4];
        if source.read_exact(&mut buf).is_err() {
            return false;
        }
        let len = u32::from_ne_bytes(buf) as usize;
        if source.read_exact(&mut buf).is_err() {
            return false;
        }
        let src = u32::from_ne_bytes(buf);

        let mut targets = Vec::with_capacity(len);
        for _ in 0..len {
            if source.read_exact(&mut buf).is_err() {
                return false;
            }
            targets.push(u32::from_ne_bytes(buf));
        }

        out.source = src;
        out.targets = targets;
        true
    }

    fn wire_size(&self) -> usize {
        8 + 4 * self.targets.len()
    }
}
