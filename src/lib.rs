#![doc = "CSR matrix engine and external merge sorter for graph-feature preparation"]

mod csr;
mod dense;
mod error;
mod record;
mod sort;
mod stream;

#[doc(inline)]
pub use csr::Csr;

#[doc(inline)]
pub use dense::Dense;

#[doc(inline)]
pub use error::CsrFlowError;

#[doc(inline)]
pub use record::{Adjacency, Edge, Record};

#[doc(inline)]
pub use sort::{ExternalSorter, Merge};

#[doc(inline)]
pub use stream::RecordStream;
