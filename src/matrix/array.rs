//! Index buffers shared by every matrix
//!
//! An [`IdArray`] is a reference-counted, immutable buffer of integer IDs
//! tagged with the [`Device`] it lives on. Matrices hold their `indptr`,
//! `indices` and `data` arrays as `IdArray`s, so cloning a matrix is cheap and
//! never copies entries.

use std::fmt;
use std::hash::Hash;
use std::ops::Deref;
use std::sync::Arc;

use num_traits::{PrimInt, Signed};

/// Element type descriptor of an index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 32-bit signed integer IDs
    Int32,
    /// 64-bit signed integer IDs
    Int64,
}

impl DataType {
    /// Type code used in the persisted array record (signed integer)
    pub const INT_CODE: u8 = 0;

    /// Number of bits per element
    pub fn bits(&self) -> u8 {
        match self {
            DataType::Int32 => 32,
            DataType::Int64 => 64,
        }
    }

    /// Number of bytes per element
    pub fn size_in_bytes(&self) -> usize {
        self.bits() as usize / 8
    }

    /// Largest ID value representable by this type
    pub fn max_value(&self) -> i64 {
        match self {
            DataType::Int32 => i32::MAX as i64,
            DataType::Int64 => i64::MAX,
        }
    }

    /// Recover the type from its persisted code and bit width
    pub fn from_code_bits(code: u8, bits: u8) -> Option<Self> {
        match (code, bits) {
            (Self::INT_CODE, 32) => Some(DataType::Int32),
            (Self::INT_CODE, 64) => Some(DataType::Int64),
            _ => None,
        }
    }
}

/// Location of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Device {
    /// Host memory
    #[default]
    Cpu,
    /// A CUDA device with the given ordinal
    Cuda(i32),
}

impl Device {
    /// Device type code in the persisted array record
    pub fn device_type(&self) -> i32 {
        match self {
            Device::Cpu => 1,
            Device::Cuda(_) => 2,
        }
    }

    /// Device ordinal in the persisted array record
    pub fn device_id(&self) -> i32 {
        match self {
            Device::Cpu => 0,
            Device::Cuda(id) => *id,
        }
    }

    /// Recover a device from its persisted type code and ordinal
    pub fn from_parts(device_type: i32, device_id: i32) -> Option<Self> {
        match device_type {
            1 => Some(Device::Cpu),
            2 => Some(Device::Cuda(device_id)),
            _ => None,
        }
    }
}

/// Integer element types usable as row, column and entry IDs
pub trait IdType:
    PrimInt + Signed + Default + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Descriptor of this element type
    const DTYPE: DataType;

    /// Convert a non-negative position or count into an ID
    fn from_usize(value: usize) -> Self;

    /// Convert a non-negative ID into a position
    fn as_usize(self) -> usize;

    /// Widen the ID to 64 bits
    fn as_i64(self) -> i64;

    /// Wrap a typed buffer into the dtype-erased form
    fn into_any(array: IdArray<Self>) -> AnyIdArray;

    /// Borrow a typed buffer back out of the dtype-erased form
    fn from_any(array: &AnyIdArray) -> Option<IdArray<Self>>;
}

macro_rules! impl_id_type {
    ($ty:ty, $dtype:expr, $variant:ident) => {
        impl IdType for $ty {
            const DTYPE: DataType = $dtype;

            #[inline]
            fn from_usize(value: usize) -> Self {
                value as $ty
            }

            #[inline]
            fn as_usize(self) -> usize {
                self as usize
            }

            #[inline]
            fn as_i64(self) -> i64 {
                self as i64
            }

            fn into_any(array: IdArray<Self>) -> AnyIdArray {
                AnyIdArray::$variant(array)
            }

            fn from_any(array: &AnyIdArray) -> Option<IdArray<Self>> {
                match array {
                    AnyIdArray::$variant(inner) => Some(inner.clone()),
                    _ => None,
                }
            }
        }
    };
}

impl_id_type!(i32, DataType::Int32, Int32);
impl_id_type!(i64, DataType::Int64, Int64);

/// A shared, immutable buffer of IDs living on one device
#[derive(Clone)]
pub struct IdArray<I> {
    buf: Arc<Vec<I>>,
    device: Device,
}

impl<I: IdType> IdArray<I> {
    /// Create a host buffer owning `values`
    pub fn new(values: Vec<I>) -> Self {
        Self::on_device(values, Device::Cpu)
    }

    /// Create a buffer owning `values`, tagged with `device`
    pub fn on_device(values: Vec<I>, device: Device) -> Self {
        Self {
            buf: Arc::new(values),
            device,
        }
    }

    /// Create a host buffer from `usize` values
    pub fn from_usizes(values: &[usize]) -> Self {
        Self::new(values.iter().map(|&v| I::from_usize(v)).collect())
    }

    /// The consecutive range `0..n`
    pub fn range(n: usize, device: Device) -> Self {
        Self::on_device((0..n).map(I::from_usize).collect(), device)
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer has no elements
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The elements as a slice
    pub fn as_slice(&self) -> &[I] {
        &self.buf
    }

    /// Device the buffer lives on
    pub fn device(&self) -> Device {
        self.device
    }

    /// Element type of the buffer
    pub fn dtype(&self) -> DataType {
        I::DTYPE
    }

    /// Copy the buffer to `device`
    ///
    /// Returns an alias of `self` when the buffer already lives there.
    pub fn copy_to(&self, device: Device) -> Self {
        if device == self.device {
            return self.clone();
        }
        Self {
            buf: Arc::new(self.buf.as_ref().clone()),
            device,
        }
    }

    /// Whether both arrays share the same underlying allocation
    pub fn shares_buffer(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.buf, &other.buf)
    }

    /// Exclusive access to the elements, cloning them first if shared
    pub(crate) fn make_mut(&mut self) -> &mut Vec<I> {
        Arc::make_mut(&mut self.buf)
    }

    /// Copy the elements into a fresh vector
    pub fn to_vec(&self) -> Vec<I> {
        self.buf.as_ref().clone()
    }
}

impl<I> Deref for IdArray<I> {
    type Target = [I];

    fn deref(&self) -> &[I] {
        &self.buf
    }
}

impl<I: IdType> From<Vec<I>> for IdArray<I> {
    fn from(values: Vec<I>) -> Self {
        Self::new(values)
    }
}

impl<I: PartialEq> PartialEq for IdArray<I> {
    fn eq(&self, other: &Self) -> bool {
        self.device == other.device && self.buf == other.buf
    }
}

impl<I: Eq> Eq for IdArray<I> {}

impl<I: fmt::Debug> fmt::Debug for IdArray<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.device == Device::Cpu {
            f.debug_list().entries(self.buf.iter()).finish()
        } else {
            write!(f, "{:?}@{:?}", self.buf, self.device)
        }
    }
}

/// An index buffer whose element type is only known at runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyIdArray {
    /// 32-bit IDs
    Int32(IdArray<i32>),
    /// 64-bit IDs
    Int64(IdArray<i64>),
}

impl AnyIdArray {
    /// Element type of the wrapped buffer
    pub fn dtype(&self) -> DataType {
        match self {
            AnyIdArray::Int32(_) => DataType::Int32,
            AnyIdArray::Int64(_) => DataType::Int64,
        }
    }

    /// Device of the wrapped buffer
    pub fn device(&self) -> Device {
        match self {
            AnyIdArray::Int32(a) => a.device(),
            AnyIdArray::Int64(a) => a.device(),
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            AnyIdArray::Int32(a) => a.len(),
            AnyIdArray::Int64(a) => a.len(),
        }
    }

    /// Whether the buffer has no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_to_same_device_aliases() {
        let a = IdArray::<i64>::new(vec![1, 2, 3]);
        let b = a.copy_to(Device::Cpu);
        assert!(a.shares_buffer(&b));

        let c = a.copy_to(Device::Cuda(0));
        assert!(!a.shares_buffer(&c));
        assert_eq!(c.device(), Device::Cuda(0));
        assert_eq!(c.as_slice(), a.as_slice());
    }

    #[test]
    fn test_make_mut_copies_shared_buffer() {
        let a = IdArray::<i32>::new(vec![3, 1, 2]);
        let mut b = a.clone();
        b.make_mut().sort();
        assert_eq!(a.as_slice(), &[3, 1, 2]);
        assert_eq!(b.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_any_roundtrip_checks_dtype() {
        let any = i32::into_any(IdArray::new(vec![0, 1]));
        assert_eq!(any.dtype(), DataType::Int32);
        assert!(i32::from_any(&any).is_some());
        assert!(i64::from_any(&any).is_none());
    }

    #[test]
    fn test_dtype_codes() {
        assert_eq!(DataType::from_code_bits(0, 32), Some(DataType::Int32));
        assert_eq!(DataType::from_code_bits(0, 64), Some(DataType::Int64));
        assert_eq!(DataType::from_code_bits(2, 32), None);
        assert_eq!(Device::from_parts(2, 3), Some(Device::Cuda(3)));
    }
}
