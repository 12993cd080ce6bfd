use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use imgmat_core::{assemble, decompose, to_image, to_matrix_with, ConvertOptions, Image};

fn sample_stack(width: usize, height: usize, planes: usize) -> Image {
    let data: Vec<f32> = (0..width * height * planes)
        .map(|i| (i % 251) as f32 * 0.5)
        .collect();
    Image::from_vec(data, &[width, height, planes]).expect("stack")
}

fn bench_to_matrix(c: &mut Criterion) {
    let image = sample_stack(512, 512, 4);
    let lazy = Image::from_fn(&[512, 512, 4], |p: &[usize]| (p[0] ^ p[1]) as f32).expect("lazy");
    for (label, options) in [
        ("shared", ConvertOptions::zero_copy()),
        ("copied", ConvertOptions::force_copy()),
    ] {
        c.bench_with_input(BenchmarkId::new("to_matrix", label), &image, |b, input| {
            b.iter(|| to_matrix_with(black_box(input), &options).expect("to_matrix"))
        });
    }
    c.bench_function("to_matrix/random_access", |b| {
        b.iter(|| to_matrix_with(black_box(&lazy), &ConvertOptions::zero_copy()).expect("to_matrix"))
    });
}

fn bench_to_image(c: &mut Criterion) {
    let image = sample_stack(512, 512, 4);
    let matrix = to_matrix_with(&image, &ConvertOptions::force_copy()).expect("matrix");
    c.bench_function("to_image", |b| {
        b.iter(|| to_image(black_box(&matrix)).expect("to_image"))
    });
}

fn striped_stack() -> Image {
    Image::from_fn(&[1024, 512, 3], |p: &[usize]| {
        let on = (0..3).any(|i| {
            let start = 199 + 200 * i + 50 * p[2];
            (start..=start + 100).contains(&p[0])
        });
        if on {
            255u8
        } else {
            0
        }
    })
    .expect("striped stack")
}

fn bench_stack_round_trip(c: &mut Criterion) {
    let lazy = striped_stack();
    let stored = decompose(&lazy)
        .and_then(|sequence| assemble(&sequence))
        .expect("stored stack");
    for (label, image) in [("stored", &stored), ("lazy", &lazy)] {
        c.bench_with_input(
            BenchmarkId::new("decompose_assemble", label),
            image,
            |b, input| {
                b.iter(|| {
                    let sequence = decompose(black_box(input)).expect("decompose");
                    assemble(&sequence).expect("assemble")
                })
            },
        );
    }
}

criterion_group!(convert, bench_to_matrix, bench_to_image, bench_stack_round_trip);
criterion_main!(convert);
