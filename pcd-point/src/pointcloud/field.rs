use bytemuck::Pod;
use thiserror::Error;

/// Primitive datatype of a reflected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDatatype {
    Float32,
    UInt32,
}

impl FieldDatatype {
    pub fn size_bytes(&self) -> usize {
        match self {
            FieldDatatype::Float32 => 4,
            FieldDatatype::UInt32 => 4,
        }
    }
}

/// One entry of a record's field table: enough for generic code to read or
/// write `count` elements of `datatype` starting at `offset` bytes into a
/// raw record buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub datatype: FieldDatatype,
    pub count: u32,
    pub offset: u32,
}

/// Implemented by point records that publish a field table for generic
/// algorithms (filters, serializers, viewers). The `Pod` bound guarantees
/// any record can be viewed as a plain byte buffer.
pub trait FieldReflect: Pod {
    /// Ordered field table. Names, datatypes, counts and offsets are stable
    /// across builds so persisted buffers stay interpretable.
    fn fields() -> &'static [FieldDescriptor];
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("field `{name}` has datatype {actual:?}, expected {expected:?}")]
    DatatypeMismatch {
        name: &'static str,
        expected: FieldDatatype,
        actual: FieldDatatype,
    },
    #[error("element {index} out of range for field `{name}` (count {count})")]
    ElementOutOfRange {
        name: &'static str,
        index: u32,
        count: u32,
    },
    #[error("record buffer of {len} bytes too short for field `{name}` element {index}")]
    BufferTooShort {
        name: &'static str,
        index: u32,
        len: usize,
    },
}

fn field_span(
    record: &[u8],
    desc: &FieldDescriptor,
    index: u32,
    expected: FieldDatatype,
) -> Result<std::ops::Range<usize>, FieldError> {
    if desc.datatype != expected {
        return Err(FieldError::DatatypeMismatch {
            name: desc.name,
            expected,
            actual: desc.datatype,
        });
    }
    if index >= desc.count {
        return Err(FieldError::ElementOutOfRange {
            name: desc.name,
            index,
            count: desc.count,
        });
    }
    let size = desc.datatype.size_bytes();
    let start = desc.offset as usize + index as usize * size;
    let end = start + size;
    if end > record.len() {
        return Err(FieldError::BufferTooShort {
            name: desc.name,
            index,
            len: record.len(),
        });
    }
    Ok(start..end)
}

pub fn read_f32(record: &[u8], desc: &FieldDescriptor, index: u32) -> Result<f32, FieldError> {
    let span = field_span(record, desc, index, FieldDatatype::Float32)?;
    Ok(bytemuck::pod_read_unaligned(&record[span]))
}

pub fn read_u32(record: &[u8], desc: &FieldDescriptor, index: u32) -> Result<u32, FieldError> {
    let span = field_span(record, desc, index, FieldDatatype::UInt32)?;
    Ok(bytemuck::pod_read_unaligned(&record[span]))
}

pub fn write_f32(
    record: &mut [u8],
    desc: &FieldDescriptor,
    index: u32,
    value: f32,
) -> Result<(), FieldError> {
    let span = field_span(record, desc, index, FieldDatatype::Float32)?;
    record[span].copy_from_slice(bytemuck::bytes_of(&value));
    Ok(())
}

pub fn write_u32(
    record: &mut [u8],
    desc: &FieldDescriptor,
    index: u32,
    value: u32,
) -> Result<(), FieldError> {
    let span = field_span(record, desc, index, FieldDatatype::UInt32)?;
    record[span].copy_from_slice(bytemuck::bytes_of(&value));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCALAR: FieldDescriptor = FieldDescriptor {
        name: "scalar",
        datatype: FieldDatatype::Float32,
        count: 2,
        offset: 4,
    };

    #[test]
    fn read_and_write_through_descriptor() {
        let mut record = [0u8; 16];
        write_f32(&mut record, &SCALAR, 0, 1.5).unwrap();
        write_f32(&mut record, &SCALAR, 1, -2.25).unwrap();
        assert_eq!(read_f32(&record, &SCALAR, 0), Ok(1.5));
        assert_eq!(read_f32(&record, &SCALAR, 1), Ok(-2.25));
    }

    #[test]
    fn datatype_mismatch_is_rejected() {
        let record = [0u8; 16];
        assert_eq!(
            read_u32(&record, &SCALAR, 0),
            Err(FieldError::DatatypeMismatch {
                name: "scalar",
                expected: FieldDatatype::UInt32,
                actual: FieldDatatype::Float32,
            })
        );
    }

    #[test]
    fn element_out_of_range_is_rejected() {
        let record = [0u8; 16];
        assert_eq!(
            read_f32(&record, &SCALAR, 2),
            Err(FieldError::ElementOutOfRange {
                name: "scalar",
                index: 2,
                count: 2,
            })
        );
    }

    #[test]
    fn short_buffer_is_rejected() {
        let record = [0u8; 8];
        assert_eq!(
            read_f32(&record, &SCALAR, 1),
            Err(FieldError::BufferTooShort {
                name: "scalar",
                index: 1,
                len: 8,
            })
        );
    }
}
