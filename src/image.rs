//! Images for metric logging
//!
//! An [`Image`] is an H×W×C host array (or H×W grayscale) with 1, 3 or 4
//! channels. It travels to the tracker as an [`ImagePayload`] with the
//! pixel bytes base64-encoded.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::array::{Array, ArrayData, DType};
use crate::{Error, Result};

const CHANNEL_COUNTS: [usize; 3] = [1, 3, 4];

/// H×W×C image backed by a host array.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pixels: Array,
}

impl Image {
    /// Wrap an `H×W×C` or `H×W` array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidImage`] for other ranks, zero-sized
    /// dimensions, channel counts other than 1, 3 or 4, or dtypes other
    /// than `u8`, `f32` and `f64`.
    pub fn from_array(array: Array) -> Result<Self> {
        if !matches!(array.dtype(), DType::U8 | DType::F32 | DType::F64) {
            return Err(Error::InvalidImage(format!(
                "unsupported pixel dtype {}",
                array.dtype()
            )));
        }
        let shape = array.shape().to_vec();
        let pixels = match shape[..] {
            [h, w] => array.reshape([h, w, 1])?,
            [_, _, c] if CHANNEL_COUNTS.contains(&c) => array,
            [_, _, c] => {
                return Err(Error::InvalidImage(format!(
                    "expected 1, 3 or 4 channels, got {c}"
                )))
            }
            _ => {
                return Err(Error::InvalidImage(format!(
                    "expected an HxWxC or HxW array, got shape {shape:?}"
                )))
            }
        };
        if pixels.is_empty() {
            return Err(Error::InvalidImage("image has no pixels".to_string()));
        }
        Ok(Self { pixels })
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> usize {
        self.pixels.shape()[0]
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> usize {
        self.pixels.shape()[1]
    }

    /// Channel count (1, 3 or 4).
    #[must_use]
    pub fn channels(&self) -> usize {
        self.pixels.shape()[2]
    }

    /// Pixel array, always `H×W×C`.
    #[must_use]
    pub const fn pixels(&self) -> &Array {
        &self.pixels
    }

    /// Wire form of this image.
    #[must_use]
    pub fn to_payload(&self) -> ImagePayload {
        ImagePayload {
            height: self.height(),
            width: self.width(),
            channels: self.channels(),
            dtype: self.pixels.dtype(),
            data: STANDARD.encode(pixel_bytes(&self.pixels)),
        }
    }
}

/// Serialized image as sent to a tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    /// Height in pixels
    pub height: usize,
    /// Width in pixels
    pub width: usize,
    /// Channel count
    pub channels: usize,
    /// Pixel dtype
    pub dtype: DType,
    /// Base64 (standard alphabet) little-endian pixel bytes, row-major HWC
    pub data: String,
}

impl ImagePayload {
    /// Decode back into an [`Image`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidImage`] if the data is not valid base64 or
    /// does not match the declared dimensions.
    pub fn decode(&self) -> Result<Image> {
        let bytes = STANDARD
            .decode(&self.data)
            .map_err(|e| Error::InvalidImage(format!("invalid base64 pixel data: {e}")))?;
        let shape = [self.height, self.width, self.channels];
        let pixels = match self.dtype {
            DType::U8 => Array::from_shape_vec(shape, bytes),
            DType::F32 => Array::from_shape_vec(shape, from_le_chunks(&bytes, f32::from_le_bytes)?),
            DType::F64 => Array::from_shape_vec(shape, from_le_chunks(&bytes, f64::from_le_bytes)?),
            other => {
                return Err(Error::InvalidImage(format!(
                    "unsupported pixel dtype {other}"
                )))
            }
        }
        .map_err(|e| Error::InvalidImage(e.to_string()))?;
        Image::from_array(pixels)
    }
}

/// Little-endian pixel bytes in row-major order.
fn pixel_bytes(pixels: &Array) -> Vec<u8> {
    match pixels.data() {
        ArrayData::U8(values) => values.iter().copied().collect(),
        ArrayData::F32(values) => values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        ArrayData::F64(values) => values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        // other dtypes never pass Image::from_array
        _ => Vec::new(),
    }
}

fn from_le_chunks<T, const N: usize>(
    bytes: &[u8],
    from_le: fn([u8; N]) -> T,
) -> Result<Vec<T>> {
    let chunks = bytes.chunks_exact(N);
    if !chunks.remainder().is_empty() {
        return Err(Error::InvalidImage(format!(
            "{} pixel bytes is not a multiple of {N}",
            bytes.len()
        )));
    }
    chunks
        .map(|chunk| {
            <[u8; N]>::try_from(chunk)
                .map(from_le)
                .map_err(|e| Error::InvalidImage(e.to_string()))
        })
        .collect()
}
