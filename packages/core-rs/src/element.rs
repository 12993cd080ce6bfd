use crate::dtype::DType;
use bytemuck::Pod;
use num_traits::AsPrimitive;
use std::fmt::Debug;

/// A Rust scalar that can live in an image or matrix buffer.
///
/// `Pod` lets buffers be reinterpreted in native byte order without
/// copying element by element.
pub trait Element: Pod + AsPrimitive<f64> + PartialEq + Debug + Send + Sync + 'static {
    const DTYPE: DType;
}

macro_rules! impl_element {
    ($($t:ty => $variant:ident),+ $(,)?) => {
        $(
            impl Element for $t {
                const DTYPE: DType = DType::$variant;
            }
        )+
    };
}

impl_element! {
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_match_dtype() {
        fn width<T: Element>() -> (usize, usize) {
            (std::mem::size_of::<T>(), T::DTYPE.size_of())
        }
        let pairs = [
            width::<i8>(),
            width::<u16>(),
            width::<i32>(),
            width::<u64>(),
            width::<f32>(),
            width::<f64>(),
        ];
        for (actual, declared) in pairs {
            assert_eq!(actual, declared);
        }
    }
}
