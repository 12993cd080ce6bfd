//! Element-kind dispatch.
//!
//! Conversions exist as one generic routine per direction; this module
//! validates rank and channel count, narrows a [`DType`] to one of the five
//! convertible [`ElementKind`]s and hands back the monomorphised routine.

use crate::config::ConvertOptions;
use crate::dtype::DType;
use crate::error::ConvertError;
use crate::image::Image;
use crate::matrix::Matrix;
use crate::{to_image, to_matrix, CoreResult};
use std::fmt;

/// Largest axis count the conversions accept.
pub const MAX_RANK: usize = 3;

/// The closed set of convertible element kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Int8,
    UInt8,
    Int32,
    Float32,
    Float64,
}

/// Matrix-side name of an element kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatrixCode {
    SignedByte,
    UnsignedByte,
    SignedInt32,
    Float32,
    Float64,
}

impl ElementKind {
    pub const ALL: [ElementKind; 5] = [
        ElementKind::Int8,
        ElementKind::UInt8,
        ElementKind::Int32,
        ElementKind::Float32,
        ElementKind::Float64,
    ];

    pub const fn dtype(self) -> DType {
        match self {
            ElementKind::Int8 => DType::Int8,
            ElementKind::UInt8 => DType::UInt8,
            ElementKind::Int32 => DType::Int32,
            ElementKind::Float32 => DType::Float32,
            ElementKind::Float64 => DType::Float64,
        }
    }

    pub const fn size_of(self) -> usize {
        self.dtype().size_of()
    }

    pub const fn matrix_code(self) -> MatrixCode {
        match self {
            ElementKind::Int8 => MatrixCode::SignedByte,
            ElementKind::UInt8 => MatrixCode::UnsignedByte,
            ElementKind::Int32 => MatrixCode::SignedInt32,
            ElementKind::Float32 => MatrixCode::Float32,
            ElementKind::Float64 => MatrixCode::Float64,
        }
    }

    /// Image-side type tag.
    pub const fn image_tag(self) -> &'static str {
        match self {
            ElementKind::Int8 => "ByteType",
            ElementKind::UInt8 => "UnsignedByteType",
            ElementKind::Int32 => "IntType",
            ElementKind::Float32 => "FloatType",
            ElementKind::Float64 => "FloatType64",
        }
    }
}

impl TryFrom<DType> for ElementKind {
    type Error = ConvertError;

    fn try_from(dtype: DType) -> Result<Self, Self::Error> {
        match dtype {
            DType::Int8 => Ok(ElementKind::Int8),
            DType::UInt8 => Ok(ElementKind::UInt8),
            DType::Int32 => Ok(ElementKind::Int32),
            DType::Float32 => Ok(ElementKind::Float32),
            DType::Float64 => Ok(ElementKind::Float64),
            other => Err(ConvertError::UnsupportedElementKind(other.as_str().to_string())),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dtype().as_str())
    }
}

impl MatrixCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            MatrixCode::SignedByte => "SIGNED_BYTE",
            MatrixCode::UnsignedByte => "UNSIGNED_BYTE",
            MatrixCode::SignedInt32 => "SIGNED_INT32",
            MatrixCode::Float32 => "FLOAT32",
            MatrixCode::Float64 => "FLOAT64",
        }
    }

    pub const fn kind(self) -> ElementKind {
        match self {
            MatrixCode::SignedByte => ElementKind::Int8,
            MatrixCode::UnsignedByte => ElementKind::UInt8,
            MatrixCode::SignedInt32 => ElementKind::Int32,
            MatrixCode::Float32 => ElementKind::Float32,
            MatrixCode::Float64 => ElementKind::Float64,
        }
    }
}

impl fmt::Display for MatrixCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn check_rank(rank: usize) -> CoreResult<()> {
    if rank == 0 || rank > MAX_RANK {
        return Err(ConvertError::UnsupportedRank {
            rank,
            expected: "1 to 3 axes",
        });
    }
    Ok(())
}

pub fn check_channels(channels: usize) -> CoreResult<()> {
    if channels != 1 {
        return Err(ConvertError::UnsupportedChannelCount(channels));
    }
    Ok(())
}

/// Rank first, then element kind.
pub fn image_kind(image: &Image) -> CoreResult<ElementKind> {
    check_rank(image.rank())?;
    ElementKind::try_from(image.dtype())
}

/// Rank, then channel count, then element kind.
pub fn matrix_kind(matrix: &Matrix) -> CoreResult<ElementKind> {
    check_rank(matrix.rank())?;
    check_channels(matrix.channels())?;
    ElementKind::try_from(matrix.dtype())
}

pub type ToMatrixFn = fn(&Image, &ConvertOptions) -> Matrix;
pub type ToImageFn = fn(&Matrix) -> CoreResult<Image>;

pub fn to_matrix_routine(kind: ElementKind) -> ToMatrixFn {
    crate::match_element_kind!(kind, T, { to_matrix::convert::<T> as ToMatrixFn })
}

pub fn to_image_routine(kind: ElementKind) -> ToImageFn {
    crate::match_element_kind!(kind, T, { to_image::convert::<T> as ToImageFn })
}
