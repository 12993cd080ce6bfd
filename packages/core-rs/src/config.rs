use std::env;
use std::sync::OnceLock;

const DISABLE_ZERO_COPY_ENV: &str = "IMGMAT_DISABLE_ZERO_COPY";

static DISABLE_ZERO_COPY: OnceLock<bool> = OnceLock::new();

/// Whether `IMGMAT_DISABLE_ZERO_COPY` asks for every conversion to copy.
/// Read once per process.
pub fn zero_copy_disabled() -> bool {
    *DISABLE_ZERO_COPY.get_or_init(|| {
        env_flag_enabled(env::var(DISABLE_ZERO_COPY_ENV).ok().as_deref())
    })
}

fn env_flag_enabled(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|value| value.trim().to_ascii_lowercase()),
        Some(ref value) if value == "1" || value == "true" || value == "yes"
    )
}

/// Knobs for [`to_matrix_with`](crate::to_matrix::to_matrix_with) and
/// [`decompose_with`](crate::stack::decompose_with).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Let a contiguous image share its buffer with the produced matrix.
    pub zero_copy: bool,
}

impl ConvertOptions {
    pub fn force_copy() -> Self {
        ConvertOptions { zero_copy: false }
    }

    pub fn zero_copy() -> Self {
        ConvertOptions { zero_copy: true }
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            zero_copy: !zero_copy_disabled(),
        }
    }
}
