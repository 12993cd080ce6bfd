use imgmat_core::{
    assemble, decompose, to_image, to_matrix, to_matrix_with, ConvertOptions, DType, ElementKind,
    Image, Matrix, RandomAccessSource,
};
use proptest::prelude::*;
use std::sync::Arc;

/// Hides the contiguous buffer of the wrapped image so conversions take the
/// element-by-element path.
#[derive(Debug)]
struct Opaque(Image);

impl RandomAccessSource for Opaque {
    fn dtype(&self) -> DType {
        self.0.dtype()
    }

    fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    fn read_element(&self, position: &[usize], dst: &mut [u8]) {
        self.0.read_element(position, dst)
    }
}

fn opaque(image: &Image) -> Image {
    Image::from_source(Arc::new(Opaque(image.clone()))).expect("opaque image")
}

fn kind() -> impl Strategy<Value = ElementKind> {
    prop::sample::select(ElementKind::ALL.to_vec())
}

prop_compose! {
    fn small_shape()(rank in 1usize..=3)
                    (shape in prop::collection::vec(1usize..6, rank)) -> Vec<usize> {
        shape
    }
}

prop_compose! {
    fn image_bytes()(kind in kind(), shape in small_shape())
                    (bytes in prop::collection::vec(any::<u8>(),
                        shape.iter().product::<usize>() * kind.size_of()),
                     kind in Just(kind), shape in Just(shape))
                    -> (ElementKind, Vec<usize>, Vec<u8>) {
        (kind, shape, bytes)
    }
}

fn swapped(shape: &[usize]) -> Vec<usize> {
    let mut dims = shape.to_vec();
    if dims.len() >= 2 {
        dims.swap(0, 1);
    }
    dims
}

proptest! {
    #[test]
    fn image_round_trip_is_bit_identical((kind, shape, bytes) in image_bytes()) {
        let image = Image::from_bytes(kind.dtype(), &shape, bytes.clone()).unwrap();
        let matrix = to_matrix(&image).unwrap();
        let dims = swapped(&shape);
        prop_assert_eq!(matrix.dims(), dims.as_slice());
        prop_assert_eq!(matrix.channels(), 1);
        prop_assert_eq!(matrix.as_bytes(), bytes.as_slice());

        let restored = to_image(&matrix).unwrap();
        let restored_bytes = restored.contiguous_bytes();
        prop_assert_eq!(restored.shape(), shape.as_slice());
        prop_assert_eq!(restored.dtype(), kind.dtype());
        prop_assert_eq!(restored_bytes.as_ref(), bytes.as_slice());
    }

    #[test]
    fn copy_path_matches_shared_path((kind, shape, bytes) in image_bytes(),
                                     force in any::<bool>()) {
        let image = Image::from_bytes(kind.dtype(), &shape, bytes).unwrap();
        let shared = to_matrix_with(&image, &ConvertOptions::zero_copy()).unwrap();

        let source = opaque(&image);
        prop_assert!(!source.is_contiguous());
        let options = if force { ConvertOptions::force_copy() } else { ConvertOptions::zero_copy() };
        let copied = to_matrix_with(&source, &options).unwrap();
        prop_assert!(!copied.shares_storage_with(shared.buffer()));
        prop_assert_eq!(&copied, &shared);
        prop_assert_eq!(to_image(&copied).unwrap(), image);
    }

    #[test]
    fn matrix_round_trip_is_bit_identical((kind, dims, bytes) in image_bytes()) {
        let matrix = Matrix::from_bytes(kind.dtype(), &dims, 1, bytes).unwrap();
        let image = to_image(&matrix).unwrap();
        let shape = swapped(&dims);
        prop_assert_eq!(image.shape(), shape.as_slice());
        let restored = to_matrix(&image).unwrap();
        prop_assert_eq!(restored, matrix);
    }

    #[test]
    fn float_payloads_survive(bits in prop::collection::vec(any::<u32>(), 1..32)) {
        let values: Vec<f32> = bits.iter().map(|&b| f32::from_bits(b)).collect();
        let image = Image::from_vec(values, &[bits.len()]).unwrap();
        let restored = to_image(&to_matrix(&image).unwrap()).unwrap();
        let restored_bits: Vec<u32> = restored
            .to_vec::<f32>()
            .unwrap()
            .into_iter()
            .map(f32::to_bits)
            .collect();
        prop_assert_eq!(restored_bits, bits);
    }

    #[test]
    fn stacks_survive_decompose_and_assemble(kind in kind(),
                                             w in 1usize..6, h in 1usize..6, d in 1usize..5,
                                             seed in any::<u8>()) {
        let len = w * h * d * kind.size_of();
        let bytes: Vec<u8> = (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect();
        let image = Image::from_bytes(kind.dtype(), &[w, h, d], bytes).unwrap();

        let sequence = decompose(&image).unwrap();
        prop_assert_eq!(sequence.len(), d);
        let plane_dims = [h, w];
        for matrix in &sequence {
            prop_assert_eq!(matrix.dims(), &plane_dims[..]);
        }
        prop_assert_eq!(assemble(&sequence).unwrap(), image.clone());

        let through_source = decompose(&opaque(&image)).unwrap();
        prop_assert_eq!(through_source, sequence);
    }
}
