//! Pull-model lazy sequence over a byte stream of records (C2).

use std::io::Read;
use std::marker::PhantomData;

use crate::record::Record;

/// A single-pass, restartable-only-by-reopening sequence of `T` over an
/// owned byte source `R`. Terminates the first time `T::decode` reports a
/// short read. Dropping the stream releases `R`.
pub struct RecordStream<R: Read, T: Record> {
    source: R,
    done: bool,
    _marker: PhantomData<T>,
}

impl<R: Read, T: Record> RecordStream<R, T> {
    pub fn new(source: R) -> Self {
        Self { source, done: false, _marker: PhantomData }
    }
}

impl<R: Read, T: Record + Default> Iterator for RecordStream<R, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.done {
            return None;
        }
        let mut out = T::default();
        if T::decode(&mut self.source, &mut out) {
            Some(out)
        } else {
            self.done = true;
            None
        }
    }
}
