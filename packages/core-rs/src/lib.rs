//! Conversion between axis-0-fastest n-dimensional images and row-major
//! matrices.
//!
//! An image of shape `[w, h, d]` maps onto a matrix with `dims = [h, w, d]`
//! over the same bytes. Contiguous images are shared with the matrix
//! without copying unless [`ConvertOptions::force_copy`] is requested or
//! `IMGMAT_DISABLE_ZERO_COPY` is set. Matrices always come back as freshly
//! allocated images. [`decompose`] and [`assemble`] move 3-axis stacks one
//! axis-2 plane at a time.

pub mod buffer;
pub mod config;
pub mod dispatch;
pub mod dtype;
pub mod element;
pub mod error;
pub mod image;
mod macros;
pub mod matrix;
pub mod metrics;
pub mod stack;
pub mod to_image;
pub mod to_matrix;

pub use buffer::SharedBuffer;
pub use config::ConvertOptions;
pub use dispatch::{ElementKind, MatrixCode};
pub use dtype::DType;
pub use element::Element;
pub use error::ConvertError;
pub use image::{Image, RandomAccessSource};
pub use matrix::Matrix;
pub use metrics::{aliased_bytes_total, copy_bytes_total, snapshot, TransferStats};
pub use stack::{assemble, decompose, decompose_with, MatrixSequence};
pub use to_image::to_image;
pub use to_matrix::{to_matrix, to_matrix_with};

pub type CoreResult<T> = Result<T, ConvertError>;
