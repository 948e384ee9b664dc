//! Set algebra over matrices: unions, batching and duplicate removal

pub mod partition;
pub mod simple;
pub mod union;

pub use partition::disjoint_partition_csr_by_sizes;
pub use union::{disjoint_union_csr, union_csr};
