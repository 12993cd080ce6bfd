//! Moving 3-axis image stacks through the matrix representation one
//! axis-2 plane at a time.

use crate::config::ConvertOptions;
use crate::dispatch::ElementKind;
use crate::error::ConvertError;
use crate::image::Image;
use crate::matrix::Matrix;
use crate::to_image::to_image;
use crate::to_matrix::to_matrix_with;
use crate::CoreResult;
use log::{debug, trace};
use std::ops::{Deref, Index};

/// Per-slice matrices in increasing slice order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatrixSequence {
    matrices: Vec<Matrix>,
}

impl MatrixSequence {
    pub fn new() -> Self {
        MatrixSequence::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        MatrixSequence {
            matrices: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, matrix: Matrix) {
        self.matrices.push(matrix);
    }

    pub fn get(&self, index: usize) -> Option<&Matrix> {
        self.matrices.get(index)
    }

    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Matrix> {
        self.matrices.iter()
    }

    pub fn as_slice(&self) -> &[Matrix] {
        &self.matrices
    }

    pub fn into_vec(self) -> Vec<Matrix> {
        self.matrices
    }
}

impl Deref for MatrixSequence {
    type Target = [Matrix];

    fn deref(&self) -> &[Matrix] {
        &self.matrices
    }
}

impl Index<usize> for MatrixSequence {
    type Output = Matrix;

    fn index(&self, index: usize) -> &Matrix {
        &self.matrices[index]
    }
}

impl From<Vec<Matrix>> for MatrixSequence {
    fn from(matrices: Vec<Matrix>) -> Self {
        MatrixSequence { matrices }
    }
}

impl FromIterator<Matrix> for MatrixSequence {
    fn from_iter<I: IntoIterator<Item = Matrix>>(iter: I) -> Self {
        MatrixSequence {
            matrices: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for MatrixSequence {
    type Item = Matrix;
    type IntoIter = std::vec::IntoIter<Matrix>;

    fn into_iter(self) -> Self::IntoIter {
        self.matrices.into_iter()
    }
}

impl<'a> IntoIterator for &'a MatrixSequence {
    type Item = &'a Matrix;
    type IntoIter = std::slice::Iter<'a, Matrix>;

    fn into_iter(self) -> Self::IntoIter {
        self.matrices.iter()
    }
}

pub fn decompose(image: &Image) -> CoreResult<MatrixSequence> {
    decompose_with(image, &ConvertOptions::default())
}

/// One 2-D matrix per index along axis 2. Images with fewer axes belong to
/// [`to_matrix`](crate::to_matrix::to_matrix).
pub fn decompose_with(image: &Image, options: &ConvertOptions) -> CoreResult<MatrixSequence> {
    if image.rank() != 3 {
        return Err(ConvertError::UnsupportedRank {
            rank: image.rank(),
            expected: "exactly 3 axes (use to_matrix for 1-D and 2-D images)",
        });
    }
    ElementKind::try_from(image.dtype())?;

    let depth = image.shape()[2];
    debug!(
        "decompose: {} image {:?} into {depth} planes",
        image.dtype(),
        image.shape()
    );
    let mut sequence = MatrixSequence::with_capacity(depth);
    for index in 0..depth {
        let plane = image.hyperslice(2, index)?;
        trace!("decompose: plane {index} contiguous={}", plane.is_contiguous());
        sequence.push(to_matrix_with(&plane, options)?);
    }
    Ok(sequence)
}

/// Convert every matrix back to a 2-D image and stack them along a new
/// axis 2, in sequence order.
pub fn assemble(matrices: &[Matrix]) -> CoreResult<Image> {
    if matrices.is_empty() {
        return Err(ConvertError::EmptySequence);
    }
    let mut planes = Vec::with_capacity(matrices.len());
    for (index, matrix) in matrices.iter().enumerate() {
        let plane = to_image(matrix)?;
        if plane.rank() != 2 {
            return Err(ConvertError::UnsupportedRank {
                rank: plane.rank(),
                expected: "2-D planes",
            });
        }
        trace!("assemble: plane {index} {:?}", plane.shape());
        planes.push(plane);
    }
    let image = Image::stack(&planes)?;
    debug!(
        "assemble: stacked {} planes into {} image {:?}",
        planes.len(),
        image.dtype(),
        image.shape()
    );
    Ok(image)
}
