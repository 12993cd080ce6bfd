//! Dense N-axis images with axis 0 varying fastest.
//!
//! An [`Image`] either owns (or shares) a contiguous [`SharedBuffer`] laid
//! out in axis-0-fastest order, or reads its elements lazily from any
//! [`RandomAccessSource`]. Conversions only need two capabilities from the
//! storage: random access to a single element, and the optional
//! [`RandomAccessSource::as_contiguous_buffer`] query that enables the
//! zero-copy path.

use crate::buffer::SharedBuffer;
use crate::dtype::DType;
use crate::element::Element;
use crate::error::{shape_mismatch, ConvertError};
use crate::metrics::record_copy_bytes;
use crate::CoreResult;
use ndarray::{ArrayD, ArrayView, Dimension, IxDyn, ShapeBuilder};
use num_traits::AsPrimitive;
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Random access to the elements of an image-shaped data source.
pub trait RandomAccessSource: fmt::Debug + Send + Sync {
    fn dtype(&self) -> DType;

    fn shape(&self) -> &[usize];

    /// Copy the element at `position` into `dst` in native byte order.
    /// `position` has one entry per axis and lies inside `shape`; `dst` is
    /// exactly `dtype().size_of()` bytes long.
    fn read_element(&self, position: &[usize], dst: &mut [u8]);

    /// The backing bytes, when they already form one contiguous
    /// axis-0-fastest buffer.
    fn as_contiguous_buffer(&self) -> Option<&SharedBuffer> {
        None
    }
}

#[derive(Clone, Debug)]
enum Storage {
    Contiguous(SharedBuffer),
    Source(Arc<dyn RandomAccessSource>),
}

#[derive(Clone, Debug)]
pub struct Image {
    dtype: DType,
    shape: Vec<usize>,
    storage: Storage,
}

impl Image {
    pub fn from_vec<T: Element>(data: Vec<T>, shape: &[usize]) -> CoreResult<Self> {
        let len = element_count(shape)?;
        if data.len() != len {
            return Err(shape_mismatch(format!(
                "{} elements do not fill shape {shape:?}",
                data.len()
            )));
        }
        Ok(Image {
            dtype: T::DTYPE,
            shape: shape.to_vec(),
            storage: Storage::Contiguous(SharedBuffer::from_vec(data)),
        })
    }

    pub fn from_bytes(dtype: DType, shape: &[usize], data: Vec<u8>) -> CoreResult<Self> {
        Image::from_buffer(dtype, shape, SharedBuffer::from_bytes(data))
    }

    pub fn from_buffer(dtype: DType, shape: &[usize], buffer: SharedBuffer) -> CoreResult<Self> {
        let expected = element_count(shape)?
            .checked_mul(dtype.size_of())
            .ok_or_else(|| shape_mismatch("shape is too large"))?;
        if buffer.len() != expected {
            return Err(shape_mismatch(format!(
                "{} bytes do not match shape {shape:?} of {dtype}",
                buffer.len()
            )));
        }
        Ok(Image {
            dtype,
            shape: shape.to_vec(),
            storage: Storage::Contiguous(buffer),
        })
    }

    pub fn zeros(dtype: DType, shape: &[usize]) -> CoreResult<Self> {
        let bytes = element_count(shape)?
            .checked_mul(dtype.size_of())
            .ok_or_else(|| shape_mismatch("shape is too large"))?;
        Image::from_buffer(dtype, shape, SharedBuffer::zeroed(bytes))
    }

    /// Wrap an arbitrary element source. The resulting image is not
    /// contiguous unless the source reports a contiguous buffer, which must
    /// then hold exactly one element per position.
    pub fn from_source(source: Arc<dyn RandomAccessSource>) -> CoreResult<Self> {
        let shape = source.shape().to_vec();
        let expected = element_count(&shape)?
            .checked_mul(source.dtype().size_of())
            .ok_or_else(|| shape_mismatch("shape is too large"))?;
        if let Some(buffer) = source.as_contiguous_buffer() {
            if buffer.len() != expected {
                return Err(shape_mismatch(format!(
                    "source buffer of {} bytes does not match shape {shape:?} of {}",
                    buffer.len(),
                    source.dtype()
                )));
            }
        }
        Ok(Image {
            dtype: source.dtype(),
            shape,
            storage: Storage::Source(source),
        })
    }

    /// Lazily evaluated image whose element at `position` is `f(position)`.
    pub fn from_fn<T, F>(shape: &[usize], f: F) -> CoreResult<Self>
    where
        T: Element,
        F: Fn(&[usize]) -> T + Send + Sync + 'static,
    {
        Image::from_source(Arc::new(FnSource {
            shape: shape.to_vec(),
            f,
            _marker: PhantomData,
        }))
    }

    /// Copy an ndarray view, keeping its logical indexing:
    /// `image.get(&[x, y, z]) == array[[x, y, z]]`.
    pub fn from_array<T: Element, D: Dimension>(array: ArrayView<'_, T, D>) -> CoreResult<Self> {
        let shape = array.shape().to_vec();
        // Row-major iteration of the reversed axes visits axis 0 fastest.
        let data: Vec<T> = array.reversed_axes().iter().copied().collect();
        Image::from_vec(data, &shape)
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn byte_len(&self) -> usize {
        self.len() * self.dtype.size_of()
    }

    pub fn is_contiguous(&self) -> bool {
        self.as_contiguous_buffer().is_some()
    }

    pub fn as_contiguous_buffer(&self) -> Option<&SharedBuffer> {
        match &self.storage {
            Storage::Contiguous(buffer) => Some(buffer),
            Storage::Source(source) => source.as_contiguous_buffer(),
        }
    }

    pub fn shares_storage_with(&self, buffer: &SharedBuffer) -> bool {
        self.as_contiguous_buffer()
            .is_some_and(|own| own.shares_storage_with(buffer))
    }

    pub fn get<T: Element>(&self, position: &[usize]) -> CoreResult<T> {
        self.expect_dtype::<T>()?;
        self.check_position(position)?;
        Ok(self.element(position))
    }

    /// Write one element. Non-contiguous images are materialised first and
    /// shared buffers are detached, so aliases never observe the write.
    pub fn set<T: Element>(&mut self, position: &[usize], value: T) -> CoreResult<()> {
        self.expect_dtype::<T>()?;
        let index = self.check_position(position)?;
        let width = self.dtype.size_of();
        let bytes = self.make_contiguous().make_mut();
        bytes[index * width..(index + 1) * width].copy_from_slice(bytemuck::bytes_of(&value));
        Ok(())
    }

    pub fn to_vec<T: Element>(&self) -> CoreResult<Vec<T>> {
        self.expect_dtype::<T>()?;
        if let Some(buffer) = self.as_contiguous_buffer() {
            return Ok(buffer.to_vec());
        }
        let mut out = Vec::with_capacity(self.len());
        for_each_position(&self.shape, |position| out.push(self.element::<T>(position)));
        Ok(out)
    }

    pub fn to_f64_vec(&self) -> Vec<f64> {
        crate::match_numeric_dtype!(self.dtype, T, {
            let mut out = Vec::with_capacity(self.len());
            for_each_position(&self.shape, |position| {
                out.push(AsPrimitive::<f64>::as_(self.element::<T>(position)))
            });
            out
        })
    }

    /// Element bytes in axis-0-fastest order, borrowed when contiguous.
    pub fn contiguous_bytes(&self) -> Cow<'_, [u8]> {
        if let Some(buffer) = self.as_contiguous_buffer() {
            return Cow::Borrowed(buffer.as_bytes());
        }
        let width = self.dtype.size_of();
        let mut bytes = vec![0u8; self.byte_len()];
        let mut offset = 0;
        for_each_position(&self.shape, |position| {
            self.read_element(position, &mut bytes[offset..offset + width]);
            offset += width;
        });
        record_copy_bytes(bytes.len());
        Cow::Owned(bytes)
    }

    pub fn make_contiguous(&mut self) -> &mut SharedBuffer {
        match self.storage {
            Storage::Contiguous(ref mut buffer) => buffer,
            Storage::Source(ref source) => {
                let buffer = match source.as_contiguous_buffer() {
                    Some(buffer) => buffer.clone(),
                    None => SharedBuffer::from_bytes(self.contiguous_bytes().into_owned()),
                };
                self.storage = Storage::Contiguous(buffer);
                self.make_contiguous()
            }
        }
    }

    /// Fix `axis` at `index`, dropping that axis.
    ///
    /// Slicing the last axis of a contiguous image yields a zero-copy window
    /// onto the same buffer; any other slice reads through the parent.
    pub fn hyperslice(&self, axis: usize, index: usize) -> CoreResult<Image> {
        let rank = self.rank();
        if rank < 2 {
            return Err(ConvertError::UnsupportedRank {
                rank,
                expected: "at least 2 axes",
            });
        }
        if axis >= rank {
            return Err(ConvertError::AxisOutOfRange { axis, rank });
        }
        let extent = self.shape[axis];
        if index >= extent {
            return Err(ConvertError::IndexOutOfBounds { index, len: extent });
        }
        let mut shape = self.shape.clone();
        shape.remove(axis);

        if axis == rank - 1 {
            if let Some(buffer) = self.as_contiguous_buffer() {
                let plane_bytes = shape.iter().product::<usize>() * self.dtype.size_of();
                let window = buffer
                    .slice(index * plane_bytes, plane_bytes)
                    .ok_or_else(|| shape_mismatch("slice exceeds image buffer"))?;
                return Image::from_buffer(self.dtype, &shape, window);
            }
        }
        Image::from_source(Arc::new(HyperSlice {
            parent: self.clone(),
            axis,
            index,
            shape,
        }))
    }

    /// Stack equally shaped planes along a new last axis.
    pub fn stack(planes: &[Image]) -> CoreResult<Image> {
        let first = planes.first().ok_or(ConvertError::EmptySequence)?;
        let mut data = Vec::with_capacity(first.byte_len() * planes.len());
        for plane in planes {
            if plane.dtype != first.dtype {
                return Err(ConvertError::KindMismatch {
                    expected: first.dtype,
                    found: plane.dtype,
                });
            }
            if plane.shape != first.shape {
                return Err(shape_mismatch(format!(
                    "cannot stack plane of shape {:?} onto planes of shape {:?}",
                    plane.shape, first.shape
                )));
            }
            data.extend_from_slice(&plane.contiguous_bytes());
        }
        record_copy_bytes(data.len());
        let mut shape = first.shape.clone();
        shape.push(planes.len());
        Image::from_bytes(first.dtype, &shape, data)
    }

    /// Copy into an ndarray with the same logical indexing (Fortran order).
    pub fn to_array<T: Element>(&self) -> CoreResult<ArrayD<T>> {
        let data = self.to_vec::<T>()?;
        ArrayD::from_shape_vec(IxDyn(&self.shape).f(), data)
            .map_err(|err| shape_mismatch(err.to_string()))
    }

    pub(crate) fn element<T: Element>(&self, position: &[usize]) -> T {
        debug_assert_eq!(self.dtype, T::DTYPE);
        match &self.storage {
            Storage::Contiguous(buffer) => buffer.read(linear_index(&self.shape, position)),
            Storage::Source(source) => {
                let mut value = T::zeroed();
                source.read_element(position, bytemuck::bytes_of_mut(&mut value));
                value
            }
        }
    }

    fn expect_dtype<T: Element>(&self) -> CoreResult<()> {
        if T::DTYPE != self.dtype {
            return Err(ConvertError::KindMismatch {
                expected: self.dtype,
                found: T::DTYPE,
            });
        }
        Ok(())
    }

    fn check_position(&self, position: &[usize]) -> CoreResult<usize> {
        if position.len() != self.rank() {
            return Err(shape_mismatch(format!(
                "position {position:?} does not address an image of shape {:?}",
                self.shape
            )));
        }
        for (&index, &len) in position.iter().zip(&self.shape) {
            if index >= len {
                return Err(ConvertError::IndexOutOfBounds { index, len });
            }
        }
        Ok(linear_index(&self.shape, position))
    }
}

impl RandomAccessSource for Image {
    fn dtype(&self) -> DType {
        self.dtype
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn read_element(&self, position: &[usize], dst: &mut [u8]) {
        match &self.storage {
            Storage::Contiguous(buffer) => {
                let width = self.dtype.size_of();
                let start = linear_index(&self.shape, position) * width;
                dst.copy_from_slice(&buffer.as_bytes()[start..start + width]);
            }
            Storage::Source(source) => source.read_element(position, dst),
        }
    }

    fn as_contiguous_buffer(&self) -> Option<&SharedBuffer> {
        Image::as_contiguous_buffer(self)
    }
}

/// Same dtype, same shape and bit-identical elements.
impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.dtype == other.dtype
            && self.shape == other.shape
            && self.contiguous_bytes() == other.contiguous_bytes()
    }
}

struct FnSource<T, F> {
    shape: Vec<usize>,
    f: F,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F> fmt::Debug for FnSource<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSource")
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

impl<T, F> RandomAccessSource for FnSource<T, F>
where
    T: Element,
    F: Fn(&[usize]) -> T + Send + Sync,
{
    fn dtype(&self) -> DType {
        T::DTYPE
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn read_element(&self, position: &[usize], dst: &mut [u8]) {
        let value = (self.f)(position);
        dst.copy_from_slice(bytemuck::bytes_of(&value));
    }
}

#[derive(Debug)]
struct HyperSlice {
    parent: Image,
    axis: usize,
    index: usize,
    shape: Vec<usize>,
}

impl RandomAccessSource for HyperSlice {
    fn dtype(&self) -> DType {
        self.parent.dtype
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn read_element(&self, position: &[usize], dst: &mut [u8]) {
        let mut full = Vec::with_capacity(position.len() + 1);
        full.extend_from_slice(&position[..self.axis]);
        full.push(self.index);
        full.extend_from_slice(&position[self.axis..]);
        self.parent.read_element(&full, dst);
    }
}

fn element_count(shape: &[usize]) -> CoreResult<usize> {
    if shape.is_empty() {
        return Err(shape_mismatch("an image needs at least one axis"));
    }
    shape
        .iter()
        .try_fold(1usize, |acc, &extent| acc.checked_mul(extent))
        .ok_or_else(|| shape_mismatch("shape is too large"))
}

/// Axis-0-fastest linearisation of `position`.
pub fn linear_index(shape: &[usize], position: &[usize]) -> usize {
    position
        .iter()
        .zip(shape)
        .rev()
        .fold(0, |acc, (&index, &extent)| acc * extent + index)
}

/// Visit every position of `shape` in axis-0-fastest order.
pub fn for_each_position(shape: &[usize], mut f: impl FnMut(&[usize])) {
    if shape.iter().any(|&extent| extent == 0) {
        return;
    }
    let mut position = vec![0usize; shape.len()];
    loop {
        f(&position);
        let mut axis = 0;
        loop {
            if axis == shape.len() {
                return;
            }
            position[axis] += 1;
            if position[axis] < shape[axis] {
                break;
            }
            position[axis] = 0;
            axis += 1;
        }
    }
}
