//! Matrix → Image, the inverse of [`to_matrix`](crate::to_matrix::to_matrix).

use crate::dispatch::{matrix_kind, to_image_routine};
use crate::element::Element;
use crate::image::Image;
use crate::matrix::Matrix;
use crate::metrics::record_copy_bytes;
use crate::to_matrix::swap_axes;
use crate::CoreResult;
use log::debug;

pub fn to_image(matrix: &Matrix) -> CoreResult<Image> {
    let kind = matrix_kind(matrix)?;
    to_image_routine(kind)(matrix)
}

/// Always copies: the matrix bytes move, in native byte order, into storage
/// owned by the new image.
pub(crate) fn convert<T: Element>(matrix: &Matrix) -> CoreResult<Image> {
    debug_assert_eq!(matrix.dtype(), T::DTYPE);
    let bytes = matrix.as_bytes().to_vec();
    record_copy_bytes(bytes.len());
    let shape = swap_axes(matrix.dims());
    debug!(
        "to_image: copied {} bytes of {} matrix {:?} into image {:?}",
        matrix.byte_len(),
        T::DTYPE,
        matrix.dims(),
        shape
    );
    Image::from_bytes(T::DTYPE, &shape, bytes)
}

impl TryFrom<&Matrix> for Image {
    type Error = crate::error::ConvertError;

    fn try_from(matrix: &Matrix) -> Result<Self, Self::Error> {
        to_image(matrix)
    }
}
