//! # Binary persistence
//!
//! Matrices are stored as little-endian tagged records. A CSR record is the
//! magic value followed by `num_cols`, `num_rows`, the `indptr`, `indices`
//! and `data` array records and the `sorted` byte, in exactly that order.
//!
//! Each array record carries its own magic value, device, rank, element
//! type, shape and byte size, then the raw elements. An absent `data` array
//! is written as a rank-0 record with no elements.
//!
//! Readers are looked up in [`SERIALIZERS`], a static table keyed by the
//! leading magic value of a record.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use tracing::{debug, instrument};

use crate::constants::{CSR_MATRIX_MAGIC, ID_ARRAY_MAGIC, ID_ARRAY_RESERVED, READ_CHUNK_ELEMENTS};
use crate::error::{CsrError, Result};
use crate::matrix::{
    AnyIdArray, CsrMatrix, DataType, Device, IdArray, IdType, SparseFormat, SparseMatrix,
};

/// Reader and writer for one record type
///
/// `read` consumes the record body following the magic value, `write`
/// emits the body without it.
pub struct SerializerEntry {
    /// Human-readable record name
    pub name: &'static str,
    /// Leading magic value of the record
    pub magic: u64,
    /// Envelope format the record holds
    pub format: SparseFormat,
    /// Decode a record body into the envelope
    pub read: fn(&mut dyn Read) -> Result<SparseMatrix>,
    /// Encode the envelope as a record body
    pub write: fn(&SparseMatrix, &mut dyn Write) -> Result<()>,
}

/// Every record type this crate can persist
pub static SERIALIZERS: &[SerializerEntry] = &[SerializerEntry {
    name: "CSRMatrix",
    magic: CSR_MATRIX_MAGIC,
    format: SparseFormat::Csr,
    read: read_csr_body,
    write: write_csr_body,
}];

/// Find the serializer for a leading magic value
pub fn serializer_for_magic(magic: u64) -> Option<&'static SerializerEntry> {
    SERIALIZERS.iter().find(|entry| entry.magic == magic)
}

/// Find the serializer for an envelope format
pub fn serializer_for_format(format: SparseFormat) -> Option<&'static SerializerEntry> {
    SERIALIZERS.iter().find(|entry| entry.format == format)
}

/// Write an envelope as a tagged record
pub fn save_sparse(spmat: &SparseMatrix, writer: &mut dyn Write) -> Result<()> {
    let entry = serializer_for_format(spmat.format).ok_or_else(|| {
        CsrError::UnsupportedFormat(format!("no serializer for {:?}", spmat.format))
    })?;
    writer.write_u64::<LittleEndian>(entry.magic)?;
    (entry.write)(spmat, writer)
}

/// Read a tagged record of any registered type
pub fn load_sparse(reader: &mut dyn Read) -> Result<SparseMatrix> {
    let magic = reader.read_u64::<LittleEndian>()?;
    let entry = serializer_for_magic(magic).ok_or_else(|| {
        CsrError::UnsupportedFormat(format!("no serializer for magic {:#018x}", magic))
    })?;
    debug!(record = entry.name, "loading sparse record");
    (entry.read)(reader)
}

impl<I: IdType> CsrMatrix<I> {
    /// Write this matrix as a CSR record
    #[instrument(skip(self, writer), fields(num_rows = self.num_rows, nnz = self.nnz()))]
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<()> {
        save_sparse(&self.to_sparse_matrix(), writer)
    }

    /// Read a CSR record written by [`CsrMatrix::save`]
    ///
    /// The magic value is checked before anything else is read, and the
    /// decoded matrix is validated before it is returned.
    #[instrument(skip(reader))]
    pub fn load<R: Read>(reader: &mut R) -> Result<Self> {
        let magic = reader.read_u64::<LittleEndian>()?;
        if magic != CSR_MATRIX_MAGIC {
            return Err(CsrError::InvalidMagic {
                expected: CSR_MATRIX_MAGIC,
                found: magic,
            });
        }
        let spmat = read_csr_body(reader)?;
        let csr = CsrMatrix::try_from(spmat)?;
        debug!(num_rows = csr.num_rows, nnz = csr.nnz(), "loaded CSR matrix");
        Ok(csr)
    }
}

fn write_csr_body(spmat: &SparseMatrix, writer: &mut dyn Write) -> Result<()> {
    if spmat.format != SparseFormat::Csr || spmat.indices.len() != 3 || spmat.flags.len() != 1 {
        return Err(CsrError::invalid_format(
            "CSR record needs a Csr envelope with 3 buffers and 1 flag",
        ));
    }
    let indptr = spmat.indices[0]
        .as_ref()
        .ok_or_else(|| CsrError::invalid_format("CSR envelope is missing indptr"))?;
    if spmat.indices[1].is_none() {
        return Err(CsrError::invalid_format("CSR envelope is missing indices"));
    }

    // Columns come before rows in the persisted record
    writer.write_i64::<LittleEndian>(dim_to_i64(spmat.num_cols)?)?;
    writer.write_i64::<LittleEndian>(dim_to_i64(spmat.num_rows)?)?;
    for array in &spmat.indices {
        write_array(array.as_ref(), indptr.dtype(), writer)?;
    }
    writer.write_u8(spmat.flags[0] as u8)?;
    Ok(())
}

fn read_csr_body(reader: &mut dyn Read) -> Result<SparseMatrix> {
    let num_cols = dim_from_i64(reader.read_i64::<LittleEndian>()?, "num_cols")?;
    let num_rows = dim_from_i64(reader.read_i64::<LittleEndian>()?, "num_rows")?;

    let indptr = read_array(reader)?;
    let indices = read_array(reader)?;
    let data = read_array(reader)?;
    if indptr.is_none() || indices.is_none() {
        return Err(CsrError::invalid_format("indptr and indices must be present"));
    }

    let sorted = match reader.read_u8()? {
        0 => false,
        1 => true,
        other => return Err(CsrError::invalid_format(format!("invalid sorted flag {}", other))),
    };

    Ok(SparseMatrix {
        format: SparseFormat::Csr,
        num_rows,
        num_cols,
        indices: vec![indptr, indices, data],
        flags: vec![sorted],
    })
}

/// Write one array record; `None` becomes a rank-0 record of `absent_dtype`
fn write_array(array: Option<&AnyIdArray>, absent_dtype: DataType, writer: &mut dyn Write) -> Result<()> {
    let (device, dtype, ndim) = match array {
        Some(array) => (array.device(), array.dtype(), 1),
        None => (Device::Cpu, absent_dtype, 0),
    };

    writer.write_u64::<LittleEndian>(ID_ARRAY_MAGIC)?;
    writer.write_u64::<LittleEndian>(ID_ARRAY_RESERVED)?;
    writer.write_i32::<LittleEndian>(device.device_type())?;
    writer.write_i32::<LittleEndian>(device.device_id())?;
    writer.write_i32::<LittleEndian>(ndim)?;
    writer.write_u8(DataType::INT_CODE)?;
    writer.write_u8(dtype.bits())?;
    writer.write_u16::<LittleEndian>(1)?;

    let Some(array) = array else {
        writer.write_i64::<LittleEndian>(0)?;
        return Ok(());
    };

    let len = array.len();
    writer.write_i64::<LittleEndian>(dim_to_i64(len)?)?;
    writer.write_i64::<LittleEndian>(dim_to_i64(len * dtype.size_in_bytes())?)?;
    match array {
        AnyIdArray::Int32(values) => {
            for &v in values.iter() {
                writer.write_i32::<LittleEndian>(v)?;
            }
        }
        AnyIdArray::Int64(values) => {
            for &v in values.iter() {
                writer.write_i64::<LittleEndian>(v)?;
            }
        }
    }
    Ok(())
}

fn read_array(reader: &mut dyn Read) -> Result<Option<AnyIdArray>> {
    let magic = reader.read_u64::<LittleEndian>()?;
    if magic != ID_ARRAY_MAGIC {
        return Err(CsrError::InvalidMagic {
            expected: ID_ARRAY_MAGIC,
            found: magic,
        });
    }
    let _reserved = reader.read_u64::<LittleEndian>()?;

    let device_type = reader.read_i32::<LittleEndian>()?;
    let device_id = reader.read_i32::<LittleEndian>()?;
    let device = Device::from_parts(device_type, device_id).ok_or_else(|| {
        CsrError::invalid_format(format!("unknown device type {}", device_type))
    })?;

    let ndim = reader.read_i32::<LittleEndian>()?;
    let code = reader.read_u8()?;
    let bits = reader.read_u8()?;
    let lanes = reader.read_u16::<LittleEndian>()?;
    let dtype = DataType::from_code_bits(code, bits).ok_or_else(|| {
        CsrError::invalid_format(format!("unsupported dtype code {} with {} bits", code, bits))
    })?;
    if lanes != 1 {
        return Err(CsrError::invalid_format(format!("unsupported lane count {}", lanes)));
    }

    let len = match ndim {
        0 => {
            let byte_size = reader.read_i64::<LittleEndian>()?;
            if byte_size != 0 {
                return Err(CsrError::invalid_format("absent array must have no bytes"));
            }
            return Ok(None);
        }
        1 => dim_from_i64(reader.read_i64::<LittleEndian>()?, "array shape")?,
        other => return Err(CsrError::invalid_format(format!("expected a 1-D array, got {} dims", other))),
    };

    let byte_size = reader.read_i64::<LittleEndian>()?;
    let expected = len
        .checked_mul(dtype.size_in_bytes())
        .filter(|&bytes| i64::try_from(bytes).is_ok())
        .ok_or_else(|| CsrError::invalid_format(format!("array shape {} is too large", len)))?;
    if byte_size != expected as i64 {
        return Err(CsrError::LengthMismatch {
            expected,
            got: byte_size.max(0) as usize,
            context: "array byte size",
        });
    }

    let array = match dtype {
        DataType::Int32 => {
            let values = read_elements(reader, len, |r, buf| r.read_i32_into::<LittleEndian>(buf))?;
            AnyIdArray::Int32(IdArray::on_device(values, device))
        }
        DataType::Int64 => {
            let values = read_elements(reader, len, |r, buf| r.read_i64_into::<LittleEndian>(buf))?;
            AnyIdArray::Int64(IdArray::on_device(values, device))
        }
    };
    Ok(Some(array))
}

/// Read `len` elements, growing the buffer one chunk at a time
///
/// The length comes from the stream, so memory is only committed for
/// elements that were actually read.
fn read_elements<R, T, F>(reader: &mut R, len: usize, mut read_into: F) -> Result<Vec<T>>
where
    R: Read + ?Sized,
    T: Copy + Default,
    F: FnMut(&mut R, &mut [T]) -> std::io::Result<()>,
{
    let mut values = Vec::with_capacity(len.min(READ_CHUNK_ELEMENTS));
    while values.len() < len {
        let start = values.len();
        let chunk = (len - start).min(READ_CHUNK_ELEMENTS);
        values.resize(start + chunk, T::default());
        read_into(reader, &mut values[start..])?;
    }
    Ok(values)
}

fn dim_to_i64(value: usize) -> Result<i64> {
    i64::try_from(value).map_err(|_| CsrError::Overflow {
        dtype: DataType::Int64,
        value,
    })
}

fn dim_from_i64(value: i64, field: &str) -> Result<usize> {
    usize::try_from(value).map_err(|_| CsrError::invalid_format(format!("negative {}: {}", field, value)))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn example() -> CsrMatrix<i64> {
        CsrMatrix::new(
            4,
            3,
            vec![0, 2, 3, 3, 5],
            vec![1, 0, 2, 0, 1],
            Some(IdArray::new(vec![4, 3, 2, 1, 0])),
            false,
        )
    }

    fn saved<I: IdType>(csr: &CsrMatrix<I>) -> Vec<u8> {
        let mut buf = Vec::new();
        csr.save(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_round_trip() {
        let csr = example();
        let loaded = CsrMatrix::<i64>::load(&mut Cursor::new(saved(&csr))).unwrap();
        assert_eq!(loaded, csr);

        let plain = CsrMatrix::<i32>::new(2, 2, vec![0, 1, 2], vec![1, 0], None, true);
        let loaded = CsrMatrix::<i32>::load(&mut Cursor::new(saved(&plain))).unwrap();
        assert_eq!(loaded, plain);
        assert!(!loaded.has_data());
    }

    #[test]
    fn test_header_field_order() {
        let buf = saved(&example());
        assert_eq!(&buf[0..8], &CSR_MATRIX_MAGIC.to_le_bytes());
        // num_cols precedes num_rows
        assert_eq!(&buf[8..16], &3i64.to_le_bytes());
        assert_eq!(&buf[16..24], &4i64.to_le_bytes());
        assert_eq!(&buf[24..32], &ID_ARRAY_MAGIC.to_le_bytes());
        assert_eq!(*buf.last().unwrap(), 0);
    }

    #[test]
    fn test_bad_magic() {
        let mut buf = saved(&example());
        buf[0] ^= 0xFF;
        match CsrMatrix::<i64>::load(&mut Cursor::new(buf)) {
            Err(CsrError::InvalidMagic { expected, .. }) => assert_eq!(expected, CSR_MATRIX_MAGIC),
            other => panic!("expected InvalidMagic, got {:?}", other),
        }
    }

    #[test]
    fn test_dtype_mismatch() {
        let buf = saved(&example());
        let err = CsrMatrix::<i32>::load(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, CsrError::DTypeMismatch { .. }));
    }

    #[test]
    fn test_invalid_matrix_rejected_after_read() {
        let mut buf = saved(&CsrMatrix::<i64>::new(1, 2, vec![0, 1], vec![1], None, true));
        // Header, indptr record (32 + 16 + 16), indices record header (32 + 16)
        let col_offset = 24 + 32 + 16 + 16 + 32 + 16;
        buf[col_offset..col_offset + 8].copy_from_slice(&7i64.to_le_bytes());
        let err = CsrMatrix::<i64>::load(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, CsrError::IndexOutOfBounds { index: 7, bound: 2 }));
    }

    #[test]
    fn test_forged_shape_is_rejected() {
        // indptr shape field sits right after the CSR header and the array header
        let shape_offset = 24 + 32;
        let byte_size_offset = shape_offset + 8;

        let mut overflowing = saved(&example());
        overflowing[shape_offset..shape_offset + 8].copy_from_slice(&(1i64 << 61).to_le_bytes());
        overflowing[byte_size_offset..byte_size_offset + 8].copy_from_slice(&0i64.to_le_bytes());
        let err = CsrMatrix::<i64>::load(&mut Cursor::new(overflowing)).unwrap_err();
        assert!(matches!(err, CsrError::InvalidFormat(_)));

        // Consistent but huge sizes must fail on the short stream, not on allocation
        let mut huge = saved(&example());
        huge[shape_offset..shape_offset + 8].copy_from_slice(&(1i64 << 40).to_le_bytes());
        huge[byte_size_offset..byte_size_offset + 8].copy_from_slice(&(1i64 << 43).to_le_bytes());
        let err = CsrMatrix::<i64>::load(&mut Cursor::new(huge)).unwrap_err();
        assert!(matches!(err, CsrError::Io(_)));
    }

    #[test]
    fn test_truncated_stream() {
        let buf = saved(&example());
        let err = CsrMatrix::<i64>::load(&mut Cursor::new(&buf[..buf.len() - 3])).unwrap_err();
        assert!(matches!(err, CsrError::Io(_)));
    }

    #[test]
    fn test_registry_dispatch() {
        let csr = example();
        let spmat = load_sparse(&mut Cursor::new(saved(&csr))).unwrap();
        assert_eq!(spmat, csr.to_sparse_matrix());

        assert_eq!(serializer_for_magic(CSR_MATRIX_MAGIC).unwrap().name, "CSRMatrix");
        assert!(serializer_for_format(SparseFormat::Coo).is_none());

        let err = load_sparse(&mut Cursor::new(0u64.to_le_bytes().to_vec())).unwrap_err();
        assert!(matches!(err, CsrError::UnsupportedFormat(_)));
    }
}
