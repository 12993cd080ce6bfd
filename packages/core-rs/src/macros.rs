/// Dispatch a `DType` to its corresponding Rust scalar type (`i8`, `u16`, `f32`, ...).
///
/// ```
/// # use imgmat_core::{dtype::DType, match_numeric_dtype};
/// let dtype = DType::Int16;
/// let size = match_numeric_dtype!(dtype, Ty, {
///     std::mem::size_of::<Ty>()
/// });
/// assert_eq!(size, 2);
/// ```
#[macro_export]
macro_rules! match_numeric_dtype {
    ($dtype:expr, $T:ident, $body:block) => {{
        #[allow(non_snake_case)]
        match $dtype {
            $crate::dtype::DType::Int8 => {
                type $T = i8;
                $body
            }
            $crate::dtype::DType::Int16 => {
                type $T = i16;
                $body
            }
            $crate::dtype::DType::Int32 => {
                type $T = i32;
                $body
            }
            $crate::dtype::DType::Int64 => {
                type $T = i64;
                $body
            }
            $crate::dtype::DType::UInt8 => {
                type $T = u8;
                $body
            }
            $crate::dtype::DType::UInt16 => {
                type $T = u16;
                $body
            }
            $crate::dtype::DType::UInt32 => {
                type $T = u32;
                $body
            }
            $crate::dtype::DType::UInt64 => {
                type $T = u64;
                $body
            }
            $crate::dtype::DType::Float32 => {
                type $T = f32;
                $body
            }
            $crate::dtype::DType::Float64 => {
                type $T = f64;
                $body
            }
        }
    }};
}

/// Dispatch a convertible `ElementKind` to its Rust scalar type.
///
/// ```
/// # use imgmat_core::{dispatch::ElementKind, match_element_kind};
/// let name = match_element_kind!(ElementKind::Float64, Ty, {
///     std::any::type_name::<Ty>()
/// });
/// assert_eq!(name, "f64");
/// ```
#[macro_export]
macro_rules! match_element_kind {
    ($kind:expr, $T:ident, $body:block) => {{
        #[allow(non_snake_case)]
        match $kind {
            $crate::dispatch::ElementKind::Int8 => {
                type $T = i8;
                $body
            }
            $crate::dispatch::ElementKind::UInt8 => {
                type $T = u8;
                $body
            }
            $crate::dispatch::ElementKind::Int32 => {
                type $T = i32;
                $body
            }
            $crate::dispatch::ElementKind::Float32 => {
                type $T = f32;
                $body
            }
            $crate::dispatch::ElementKind::Float64 => {
                type $T = f64;
                $body
            }
        }
    }};
}
