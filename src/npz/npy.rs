//! NPY member encoding
//!
//! Both directions go through `ndarray-npy`. Reading works on an in-memory
//! copy of the member: the header is parsed and the element data is
//! borrowed as a view before anything is copied out, so a header that
//! declares more elements than the member holds (or more than fit in
//! `usize`) is rejected without allocating for it.
//!
//! Supported on read: format versions 1.0 to 3.0, C or Fortran order,
//! native (little-endian) byte order for multi-byte types.

use std::io::{Read, Write};

use ndarray::ArrayViewD;
use ndarray_npy::{ViewNpyError, ViewNpyExt, WriteNpyExt};

use crate::array::{for_each_data, Array, Element};
use crate::{Error, Result};

/// NPY magic string
pub const MAGIC: &[u8; 6] = b"\x93NUMPY";

type Decoder = fn(&[u8]) -> Result<Option<Array>>;

/// One decoder per element type, tried in turn until a descriptor matches.
const DECODERS: [Decoder; 11] = [
    view_as::<bool>,
    view_as::<u8>,
    view_as::<i8>,
    view_as::<u16>,
    view_as::<i16>,
    view_as::<u32>,
    view_as::<i32>,
    view_as::<u64>,
    view_as::<i64>,
    view_as::<f32>,
    view_as::<f64>,
];

/// Write `array` as a complete NPY stream.
///
/// # Errors
///
/// Returns [`Error::NpyWrite`] if the writer fails.
pub fn write_npy<W: Write>(writer: &mut W, array: &Array) -> Result<()> {
    for_each_data!(array.data(), values => values.write_npy(&mut *writer))?;
    Ok(())
}

/// Read a complete NPY stream.
///
/// # Errors
///
/// Returns [`Error::Io`] if the reader fails, or [`Error::InvalidNpy`] for
/// anything [`decode_npy`] rejects.
pub fn read_npy<R: Read>(reader: &mut R) -> Result<Array> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    decode_npy(&bytes)
}

/// Decode an NPY stream held in memory.
///
/// # Errors
///
/// Returns [`Error::InvalidNpy`] for a malformed preamble or header, an
/// unsupported or big-endian dtype, a shape whose element count overflows,
/// or data that is shorter or longer than the shape requires.
pub fn decode_npy(bytes: &[u8]) -> Result<Array> {
    // Views need element-aligned data; NumPy pads headers to a multiple of 64.
    let words = aligned_copy(bytes);
    let aligned = &bytemuck::cast_slice::<u64, u8>(&words)[..bytes.len()];

    for decode in DECODERS {
        if let Some(array) = decode(aligned)? {
            return Ok(array);
        }
    }
    Err(Error::InvalidNpy("unsupported dtype descriptor".to_string()))
}

fn view_as<T: Element>(bytes: &[u8]) -> Result<Option<Array>> {
    match ArrayViewD::<T>::view_npy(bytes) {
        Ok(view) => Ok(Some(Array::from_ndarray(view.to_owned()))),
        Err(ViewNpyError::WrongDescriptor(_)) => Ok(None),
        Err(e) => Err(Error::InvalidNpy(e.to_string())),
    }
}

fn aligned_copy(bytes: &[u8]) -> Vec<u64> {
    let mut words = vec![0u64; bytes.len().div_ceil(8)];
    bytemuck::cast_slice_mut::<u64, u8>(&mut words)[..bytes.len()].copy_from_slice(bytes);
    words
}
