use imgmat_core::{assemble, decompose, snapshot, to_image, to_matrix, DType, Image};

fn main() {
    // A 6x4 image with three planes; plane z holds the value 10 * z + x.
    let image = Image::from_fn(&[6, 4, 3], |p: &[usize]| (10 * p[2] + p[0]) as u8)
        .expect("valid image");

    // Single conversion: the first two extents swap, the bytes stay put.
    let plane = image.hyperslice(2, 1).expect("plane 1");
    let matrix = to_matrix(&plane).expect("to_matrix");
    println!(
        "plane 1: image {:?} -> matrix {:?} ({})",
        plane.shape(),
        matrix.dims(),
        matrix.code().expect("convertible kind")
    );
    println!("first row: {:?}", &matrix.to_vec::<u8>().expect("u8")[..matrix.cols()]);
    let back = to_image(&matrix).expect("to_image");
    assert_eq!(back, plane);

    // Stack conversion: one matrix per plane, then back to a single image.
    let sequence = decompose(&image).expect("decompose");
    println!("decomposed into {} matrices", sequence.len());
    let restored = assemble(&sequence).expect("assemble");
    assert_eq!(restored, image);
    println!("assembled image {:?}, contiguous={}", restored.shape(), restored.is_contiguous());

    // Kinds outside the convertible set are reported by name.
    let wide = Image::zeros(DType::UInt16, &[2, 2]).expect("zeros");
    match to_matrix(&wide) {
        Ok(_) => println!("unexpected success"),
        Err(err) => println!("uint16 image: {err} [{}]", err.code()),
    }

    let stats = snapshot();
    println!(
        "copied {} bytes, shared {} bytes",
        stats.copied_bytes, stats.aliased_bytes
    );
}
