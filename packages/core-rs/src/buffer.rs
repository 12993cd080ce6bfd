use crate::element::Element;
use crate::metrics::record_copy_bytes;
use std::sync::Arc;

/// Reference-counted byte storage shared between images and matrices.
///
/// A buffer is a window (`offset`, `len`, both in bytes) onto an
/// `Arc<Vec<u8>>`. Cloning and [`slice`](SharedBuffer::slice) never copy;
/// [`make_mut`](SharedBuffer::make_mut) copies only when the storage is
/// shared or the window does not cover it entirely.
#[derive(Clone, Debug)]
pub struct SharedBuffer {
    data: Arc<Vec<u8>>,
    offset: usize,
    len: usize,
}

impl SharedBuffer {
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let len = data.len();
        SharedBuffer {
            data: Arc::new(data),
            offset: 0,
            len,
        }
    }

    pub fn from_vec<T: Element>(data: Vec<T>) -> Self {
        SharedBuffer::from_bytes(bytemuck::cast_slice(&data).to_vec())
    }

    pub fn zeroed(len: usize) -> Self {
        SharedBuffer::from_bytes(vec![0u8; len])
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[self.offset..self.offset + self.len]
    }

    /// Zero-copy sub-window, `None` when it would exceed this window.
    pub fn slice(&self, start: usize, len: usize) -> Option<Self> {
        let end = start.checked_add(len)?;
        if end > self.len {
            return None;
        }
        Some(SharedBuffer {
            data: Arc::clone(&self.data),
            offset: self.offset + start,
            len,
        })
    }

    /// True when both buffers are windows onto the same allocation.
    pub fn shares_storage_with(&self, other: &SharedBuffer) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Borrow as a typed slice. Fails on width mismatch or when the window
    /// is not aligned for `T`; use [`to_vec`](SharedBuffer::to_vec) then.
    pub fn try_as_slice<T: Element>(&self) -> Option<&[T]> {
        bytemuck::try_cast_slice(self.as_bytes()).ok()
    }

    /// Reinterpret the bytes as native-endian `T` values.
    pub fn to_vec<T: Element>(&self) -> Vec<T> {
        bytemuck::pod_collect_to_vec(self.as_bytes())
    }

    pub fn read<T: Element>(&self, index: usize) -> T {
        let width = std::mem::size_of::<T>();
        let start = index * width;
        bytemuck::pod_read_unaligned(&self.as_bytes()[start..start + width])
    }

    pub fn make_mut(&mut self) -> &mut [u8] {
        let whole = self.offset == 0 && self.len == self.data.len();
        if !whole || Arc::get_mut(&mut self.data).is_none() {
            let bytes = self.as_bytes().to_vec();
            record_copy_bytes(bytes.len());
            self.data = Arc::new(bytes);
            self.offset = 0;
        }
        let len = self.len;
        &mut Arc::make_mut(&mut self.data)[..len]
    }
}

impl PartialEq for SharedBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for SharedBuffer {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_shares_storage() {
        let buffer = SharedBuffer::from_vec(vec![1u8, 2, 3, 4, 5, 6]);
        let window = buffer.slice(2, 3).expect("window");
        assert_eq!(window.as_bytes(), &[3, 4, 5]);
        assert!(window.shares_storage_with(&buffer));
        assert!(buffer.slice(4, 3).is_none());
    }

    #[test]
    fn make_mut_detaches_shared_storage() {
        let original = SharedBuffer::from_vec(vec![10u8, 20, 30]);
        let mut alias = original.clone();
        alias.make_mut()[0] = 99;
        assert_eq!(original.as_bytes(), &[10, 20, 30]);
        assert_eq!(alias.as_bytes(), &[99, 20, 30]);
        assert!(!alias.shares_storage_with(&original));
    }

    #[test]
    fn make_mut_on_window_only_covers_window() {
        let buffer = SharedBuffer::from_vec(vec![1u8, 2, 3, 4]);
        let mut window = buffer.slice(1, 2).expect("window");
        let bytes = window.make_mut();
        assert_eq!(bytes.len(), 2);
        bytes[1] = 0;
        assert_eq!(window.as_bytes(), &[2, 0]);
        assert_eq!(buffer.as_bytes(), &[1, 2, 3, 4]);
    }

    #[test]
    fn typed_reads_use_native_byte_order() {
        let values = vec![1.5f64, -2.25, f64::MIN_POSITIVE];
        let buffer = SharedBuffer::from_vec(values.clone());
        assert_eq!(buffer.len(), 24);
        assert_eq!(buffer.to_vec::<f64>(), values);
        assert_eq!(buffer.read::<f64>(1), -2.25);
        let window = buffer.slice(8, 16).expect("window");
        assert_eq!(window.to_vec::<f64>(), vec![-2.25, f64::MIN_POSITIVE]);
    }
}
