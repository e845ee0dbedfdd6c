//! CPU feature detection for the SIMD sample passes.
//!
//! Detection runs once and is cached; every dispatching function in
//! [`crate::core::convert`] goes through [`SimdPath::resolve`] so tests
//! can force a specific implementation path deterministically.

use std::sync::OnceLock;

/// SIMD support information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimdSupport {
    /// x86_64 SSE2 support
    pub sse2: bool,
    /// x86_64 AVX2 support
    pub avx2: bool,
}

static SIMD_SUPPORT: OnceLock<SimdSupport> = OnceLock::new();

fn detect_simd_support() -> SimdSupport {
    #[cfg(target_arch = "x86_64")]
    {
        SimdSupport {
            sse2: is_x86_feature_detected!("sse2"),
            avx2: is_x86_feature_detected!("avx2"),
        }
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        SimdSupport {
            sse2: false,
            avx2: false,
        }
    }
}

/// Get SIMD support information, detecting on first call
pub fn support() -> SimdSupport {
    *SIMD_SUPPORT.get_or_init(detect_simd_support)
}

/// Check if any SIMD path is available
pub fn has_simd_support() -> bool {
    let s = support();
    s.sse2 || s.avx2
}

/// implementation path for the sample passes
///
/// `Auto` picks the widest path the CPU supports. Forcing a path the CPU
/// cannot run clamps down to the next narrower one, so a forced path is
/// always safe to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimdPath {
    /// widest available path
    Auto,
    /// 256-bit AVX2, 8-16 lanes
    Avx2,
    /// 128-bit SSE2, 4-8 lanes
    Sse2,
    /// plain scalar loop
    Scalar,
}

impl SimdPath {
    /// resolve to a concrete, runnable path (never returns `Auto`)
    pub fn resolve(self) -> SimdPath {
        let s = support();
        match self {
            SimdPath::Auto | SimdPath::Avx2 if s.avx2 => SimdPath::Avx2,
            SimdPath::Auto | SimdPath::Avx2 | SimdPath::Sse2 if s.sse2 => SimdPath::Sse2,
            _ => SimdPath::Scalar,
        }
    }
}
