// Matrix data structures and conversions

pub mod array;
pub mod config;
pub mod conversion;
pub mod coo;
pub mod csr;
pub mod interchange;

pub use array::{AnyIdArray, DataType, Device, IdArray, IdType};
pub use config::{CsrConfig, SystemParameters};
pub use coo::CooMatrix;
pub use csr::CsrMatrix;
pub use interchange::{SparseFormat, SparseMatrix};
