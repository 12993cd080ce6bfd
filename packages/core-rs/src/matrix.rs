use crate::buffer::SharedBuffer;
use crate::dispatch::{ElementKind, MatrixCode};
use crate::dtype::DType;
use crate::element::Element;
use crate::error::{shape_mismatch, ConvertError};
use crate::CoreResult;
use ndarray::{Array2, ArrayView2};
use num_traits::AsPrimitive;

/// Depth codes of the raw matrix type, low three bits of [`Matrix::type_code`].
pub mod depth {
    pub const U8: i32 = 0;
    pub const S8: i32 = 1;
    pub const U16: i32 = 2;
    pub const S16: i32 = 3;
    pub const S32: i32 = 4;
    pub const F32: i32 = 5;
    pub const F64: i32 = 6;
    pub const F16: i32 = 7;
}

const CHANNEL_SHIFT: i32 = 3;
const DEPTH_MASK: i32 = (1 << CHANNEL_SHIFT) - 1;
const MAX_CHANNELS: usize = 512;

/// Dense row-major buffer with `dims = [rows, cols, ...]` and interleaved
/// channels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    pub(crate) dtype: DType,
    pub(crate) channels: usize,
    pub(crate) dims: Vec<usize>,
    pub(crate) buffer: SharedBuffer,
}

impl Matrix {
    pub fn from_vec<T: Element>(data: Vec<T>, dims: &[usize]) -> CoreResult<Self> {
        Matrix::with_channels(data, dims, 1)
    }

    pub fn with_channels<T: Element>(
        data: Vec<T>,
        dims: &[usize],
        channels: usize,
    ) -> CoreResult<Self> {
        Matrix::from_buffer(T::DTYPE, dims, channels, SharedBuffer::from_vec(data))
    }

    pub fn from_bytes(
        dtype: DType,
        dims: &[usize],
        channels: usize,
        data: Vec<u8>,
    ) -> CoreResult<Self> {
        Matrix::from_buffer(dtype, dims, channels, SharedBuffer::from_bytes(data))
    }

    pub fn from_buffer(
        dtype: DType,
        dims: &[usize],
        channels: usize,
        buffer: SharedBuffer,
    ) -> CoreResult<Self> {
        if dims.is_empty() {
            return Err(shape_mismatch("a matrix needs at least one dimension"));
        }
        if channels == 0 {
            return Err(shape_mismatch("a matrix needs at least one channel"));
        }
        if channels > MAX_CHANNELS {
            return Err(ConvertError::UnsupportedChannelCount(channels));
        }
        let expected = dims
            .iter()
            .try_fold(channels, |acc, &extent| acc.checked_mul(extent))
            .and_then(|n| n.checked_mul(dtype.size_of()))
            .ok_or_else(|| shape_mismatch("shape is too large"))?;
        if buffer.len() != expected {
            return Err(shape_mismatch(format!(
                "{} bytes do not match dims {dims:?} x {channels} channel(s) of {dtype}",
                buffer.len()
            )));
        }
        Ok(Matrix {
            dtype,
            channels,
            dims: dims.to_vec(),
            buffer,
        })
    }

    /// Decode a raw `depth + ((channels - 1) << 3)` type code.
    pub fn from_type_code(type_code: i32, dims: &[usize], data: Vec<u8>) -> CoreResult<Self> {
        let (dtype, channels) = decode_type_code(type_code)?;
        Matrix::from_bytes(dtype, dims, channels, data)
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn rows(&self) -> usize {
        self.dims[0]
    }

    pub fn cols(&self) -> usize {
        self.dims.get(1).copied().unwrap_or(1)
    }

    /// Number of scalars, channels included.
    pub fn len(&self) -> usize {
        self.buffer.len() / self.dtype.size_of()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn byte_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn buffer(&self) -> &SharedBuffer {
        &self.buffer
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    pub fn shares_storage_with(&self, buffer: &SharedBuffer) -> bool {
        self.buffer.shares_storage_with(buffer)
    }

    pub fn code(&self) -> CoreResult<MatrixCode> {
        Ok(ElementKind::try_from(self.dtype)?.matrix_code())
    }

    pub fn type_code(&self) -> CoreResult<i32> {
        let depth_code = match self.dtype {
            DType::UInt8 => depth::U8,
            DType::Int8 => depth::S8,
            DType::UInt16 => depth::U16,
            DType::Int16 => depth::S16,
            DType::Int32 => depth::S32,
            DType::Float32 => depth::F32,
            DType::Float64 => depth::F64,
            other => {
                return Err(ConvertError::UnsupportedElementKind(
                    other.as_str().to_string(),
                ))
            }
        };
        Ok(depth_code + (((self.channels as i32) - 1) << CHANNEL_SHIFT))
    }

    pub fn try_as_slice<T: Element>(&self) -> Option<&[T]> {
        if T::DTYPE != self.dtype {
            return None;
        }
        self.buffer.try_as_slice()
    }

    pub fn to_vec<T: Element>(&self) -> CoreResult<Vec<T>> {
        if T::DTYPE != self.dtype {
            return Err(ConvertError::KindMismatch {
                expected: self.dtype,
                found: T::DTYPE,
            });
        }
        Ok(self.buffer.to_vec())
    }

    pub fn to_f64_vec(&self) -> Vec<f64> {
        crate::match_numeric_dtype!(self.dtype, T, {
            self.buffer
                .to_vec::<T>()
                .into_iter()
                .map(AsPrimitive::<f64>::as_)
                .collect()
        })
    }

    pub fn to_array2<T: Element>(&self) -> CoreResult<Array2<T>> {
        if self.rank() != 2 || self.channels != 1 {
            return Err(shape_mismatch(format!(
                "expected a single-channel 2-D matrix, found dims {:?} x {} channel(s)",
                self.dims, self.channels
            )));
        }
        let data = self.to_vec::<T>()?;
        Array2::from_shape_vec((self.dims[0], self.dims[1]), data)
            .map_err(|err| shape_mismatch(err.to_string()))
    }

    pub fn from_array2<T: Element>(array: ArrayView2<'_, T>) -> CoreResult<Self> {
        let (rows, cols) = array.dim();
        Matrix::from_vec(array.iter().copied().collect(), &[rows, cols])
    }
}

pub fn decode_type_code(type_code: i32) -> CoreResult<(DType, usize)> {
    if type_code < 0 {
        return Err(ConvertError::UnsupportedElementKind(format!(
            "type code {type_code}"
        )));
    }
    let channels = ((type_code >> CHANNEL_SHIFT) + 1) as usize;
    if channels > MAX_CHANNELS {
        return Err(ConvertError::UnsupportedChannelCount(channels));
    }
    let dtype = match type_code & DEPTH_MASK {
        depth::U8 => DType::UInt8,
        depth::S8 => DType::Int8,
        depth::U16 => DType::UInt16,
        depth::S16 => DType::Int16,
        depth::S32 => DType::Int32,
        depth::F32 => DType::Float32,
        depth::F64 => DType::Float64,
        _ => return Err(ConvertError::UnsupportedElementKind("float16".into())),
    };
    Ok((dtype, channels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn from_vec_validates_length() {
        let err = Matrix::from_vec(vec![0u8; 5], &[2, 3]).unwrap_err();
        assert!(matches!(err, ConvertError::ShapeMismatch(_)));
        let err = Matrix::with_channels(vec![0u8; 6], &[2, 3], 2).unwrap_err();
        assert!(matches!(err, ConvertError::ShapeMismatch(_)));
        assert!(Matrix::with_channels(vec![0u8; 12], &[2, 3], 2).is_ok());
    }

    #[test]
    fn type_codes_round_trip() {
        let single = Matrix::from_vec(vec![0.0f32; 4], &[2, 2]).unwrap();
        assert_eq!(single.type_code(), Ok(depth::F32));
        assert_eq!(single.code(), Ok(MatrixCode::Float32));

        let triple = Matrix::with_channels(vec![0u8; 12], &[2, 2], 3).unwrap();
        assert_eq!(triple.type_code(), Ok(16));
        assert_eq!(decode_type_code(16), Ok((DType::UInt8, 3)));

        for code in [depth::U8, depth::S8, depth::S32, depth::F32, depth::F64] {
            let (dtype, channels) = decode_type_code(code).unwrap();
            assert_eq!(channels, 1);
            let width = dtype.size_of();
            let matrix = Matrix::from_type_code(code, &[1, 2], vec![0u8; 2 * width]).unwrap();
            assert_eq!(matrix.type_code(), Ok(code));
        }
    }

    #[test]
    fn channel_count_is_capped_at_construction() {
        let widest = Matrix::with_channels(vec![0u8; MAX_CHANNELS], &[1], MAX_CHANNELS).unwrap();
        let code = widest.type_code().unwrap();
        assert_eq!(decode_type_code(code), Ok((DType::UInt8, MAX_CHANNELS)));

        let err = Matrix::with_channels(vec![0u8; MAX_CHANNELS + 1], &[1], MAX_CHANNELS + 1)
            .unwrap_err();
        assert_eq!(err, ConvertError::UnsupportedChannelCount(MAX_CHANNELS + 1));
    }

    #[test]
    fn half_float_depth_is_rejected_by_name() {
        let err = Matrix::from_type_code(depth::F16, &[1, 1], vec![0u8; 2]).unwrap_err();
        assert_eq!(err, ConvertError::UnsupportedElementKind("float16".into()));
    }

    #[test]
    fn sixteen_bit_depths_decode_but_have_no_code() {
        let matrix = Matrix::from_type_code(depth::U16, &[1, 2], vec![0u8; 4]).unwrap();
        assert_eq!(matrix.dtype(), DType::UInt16);
        assert_eq!(
            matrix.code(),
            Err(ConvertError::UnsupportedElementKind("uint16".into()))
        );
    }

    #[test]
    fn ndarray_interop_is_row_major() {
        let array = arr2(&[[1i32, 2, 3], [4, 5, 6]]);
        let matrix = Matrix::from_array2(array.view()).unwrap();
        assert_eq!(matrix.dims(), &[2, 3]);
        assert_eq!(matrix.rows(), 2);
        assert_eq!(matrix.cols(), 3);
        assert_eq!(matrix.to_vec::<i32>().unwrap(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(matrix.to_array2::<i32>().unwrap(), array);
        assert_eq!(matrix.to_f64_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let column = Matrix::from_vec(vec![1i32, 2], &[2]).unwrap();
        assert!(column.to_array2::<i32>().is_err());
    }

    #[test]
    fn typed_access_checks_kind() {
        let matrix = Matrix::from_vec(vec![1.0f64, 2.0], &[1, 2]).unwrap();
        assert!(matrix.try_as_slice::<f32>().is_none());
        assert!(matches!(
            matrix.to_vec::<i32>(),
            Err(ConvertError::KindMismatch { .. })
        ));
        assert_eq!(matrix.to_vec::<f64>().unwrap(), vec![1.0, 2.0]);
    }
}
