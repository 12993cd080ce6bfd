//! Image → Matrix.
//!
//! The matrix reuses the image's axis-0-fastest byte order unchanged and
//! only relabels the first two extents: an image of shape `[w, h, d]`
//! becomes a matrix with `dims = [h, w, d]`. A row-major `[h, w]` buffer
//! whose column index varies fastest has exactly the memory order of the
//! `[w, h]` image, so no transpose is ever performed.

use crate::buffer::SharedBuffer;
use crate::config::ConvertOptions;
use crate::dispatch::{image_kind, to_matrix_routine};
use crate::element::Element;
use crate::image::{for_each_position, Image};
use crate::matrix::Matrix;
use crate::metrics::{record_aliased_bytes, record_copy_bytes};
use crate::CoreResult;
use log::debug;

pub fn to_matrix(image: &Image) -> CoreResult<Matrix> {
    to_matrix_with(image, &ConvertOptions::default())
}

pub fn to_matrix_with(image: &Image, options: &ConvertOptions) -> CoreResult<Matrix> {
    let kind = image_kind(image)?;
    Ok(to_matrix_routine(kind)(image, options))
}

/// Swap the first two extents; the slice axis stays in place.
pub fn swap_axes(shape: &[usize]) -> Vec<usize> {
    let mut swapped = shape.to_vec();
    if swapped.len() >= 2 {
        swapped.swap(0, 1);
    }
    swapped
}

/// Copy every element through random access into a fresh axis-0-fastest
/// buffer.
pub fn copy_to_contiguous<T: Element>(image: &Image) -> SharedBuffer {
    let mut bytes = Vec::<u8>::with_capacity(image.byte_len());
    for_each_position(image.shape(), |position| {
        bytes.extend_from_slice(bytemuck::bytes_of(&image.element::<T>(position)))
    });
    record_copy_bytes(bytes.len());
    SharedBuffer::from_bytes(bytes)
}

pub(crate) fn convert<T: Element>(image: &Image, options: &ConvertOptions) -> Matrix {
    debug_assert_eq!(image.dtype(), T::DTYPE);
    let dims = swap_axes(image.shape());
    let buffer = match image.as_contiguous_buffer() {
        Some(buffer) if options.zero_copy && buffer.len() == image.byte_len() => {
            debug!(
                "to_matrix: sharing {} bytes of {} image {:?}",
                buffer.len(),
                T::DTYPE,
                image.shape()
            );
            record_aliased_bytes(buffer.len());
            buffer.clone()
        }
        _ => {
            debug!(
                "to_matrix: copying {} image {:?} element by element",
                T::DTYPE,
                image.shape()
            );
            copy_to_contiguous::<T>(image)
        }
    };
    Matrix {
        dtype: T::DTYPE,
        channels: 1,
        dims,
        buffer,
    }
}

impl TryFrom<&Image> for Matrix {
    type Error = crate::error::ConvertError;

    fn try_from(image: &Image) -> Result<Self, Self::Error> {
        to_matrix(image)
    }
}
