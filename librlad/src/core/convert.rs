//! short<->float sample conversion and the lossy scaling passes
//!
//! Both conversions and both shift passes come in AVX2 (256-bit), SSE2
//! (128-bit) and scalar flavors. The integer shift passes are
//! bit-identical across paths; the float conversions agree within the
//! round-trip tolerances the block codec is specified against (2 LSB in
//! the short domain, 2/65535 in the float domain). Non-finite float
//! input is undefined: the scalar path collapses NaN to 0 while the
//! vector paths produce -32768.

use crate::core::simd::SimdPath;

/// scale factor between the short and float domains
pub const SHORT_SCALE: f32 = 32767.0;

/// inverse scale for short to float
pub const SHORT_SCALE_INV: f32 = 1.0 / 32767.0;

/// bits removed by the lossy quantization pass
pub const QUANT_SHIFT: u32 = 4;

// conversion entry points

/// Convert shorts to normalized floats, `dst[i] = src[i] / 32767`.
///
/// Processes `min(src.len(), dst.len())` elements and returns the count;
/// zero-length input returns 0 without touching either slice.
pub fn convert_i16_to_f32(src: &[i16], dst: &mut [f32]) -> usize {
    convert_i16_to_f32_with(SimdPath::Auto, src, dst)
}

/// [`convert_i16_to_f32`] with an explicit implementation path
pub fn convert_i16_to_f32_with(path: SimdPath, src: &[i16], dst: &mut [f32]) -> usize {
    let n = src.len().min(dst.len());
    if n == 0 {
        return 0;
    }
    let (src, dst) = (&src[..n], &mut dst[..n]);
    match path.resolve() {
        #[cfg(target_arch = "x86_64")]
        SimdPath::Avx2 => unsafe { i16_to_f32_avx2(src, dst) },
        #[cfg(target_arch = "x86_64")]
        SimdPath::Sse2 => unsafe { i16_to_f32_sse2(src, dst) },
        _ => i16_to_f32_scalar(src, dst),
    }
    n
}

/// Convert normalized floats to shorts, `dst[i] = saturate(round(src[i] * 32767))`.
///
/// Rounding is ties-to-even on every path. Processes
/// `min(src.len(), dst.len())` elements and returns the count.
pub fn convert_f32_to_i16(src: &[f32], dst: &mut [i16]) -> usize {
    convert_f32_to_i16_with(SimdPath::Auto, src, dst)
}

/// [`convert_f32_to_i16`] with an explicit implementation path
pub fn convert_f32_to_i16_with(path: SimdPath, src: &[f32], dst: &mut [i16]) -> usize {
    let n = src.len().min(dst.len());
    if n == 0 {
        return 0;
    }
    let (src, dst) = (&src[..n], &mut dst[..n]);
    match path.resolve() {
        #[cfg(target_arch = "x86_64")]
        SimdPath::Avx2 => unsafe { f32_to_i16_avx2(src, dst) },
        #[cfg(target_arch = "x86_64")]
        SimdPath::Sse2 => unsafe { f32_to_i16_sse2(src, dst) },
        _ => f32_to_i16_scalar(src, dst),
    }
    n
}

// lossy scaling passes

/// Arithmetic right-shift of every sample by 4 (the pre-encode pass of
/// lossy mode, dividing by 16 with sign preservation).
pub fn quantize(samples: &mut [i16]) {
    quantize_with(SimdPath::Auto, samples)
}

/// [`quantize`] with an explicit implementation path
pub fn quantize_with(path: SimdPath, samples: &mut [i16]) {
    match path.resolve() {
        #[cfg(target_arch = "x86_64")]
        SimdPath::Avx2 => unsafe { shift_right_avx2(samples) },
        #[cfg(target_arch = "x86_64")]
        SimdPath::Sse2 => unsafe { shift_right_sse2(samples) },
        _ => shift_right_scalar(samples),
    }
}

/// Left-shift of every sample by 4 (the post-decode pass of lossy mode,
/// restoring the 16-bit range).
pub fn dequantize(samples: &mut [i16]) {
    dequantize_with(SimdPath::Auto, samples)
}

/// [`dequantize`] with an explicit implementation path
pub fn dequantize_with(path: SimdPath, samples: &mut [i16]) {
    match path.resolve() {
        #[cfg(target_arch = "x86_64")]
        SimdPath::Avx2 => unsafe { shift_left_avx2(samples) },
        #[cfg(target_arch = "x86_64")]
        SimdPath::Sse2 => unsafe { shift_left_sse2(samples) },
        _ => shift_left_scalar(samples),
    }
}

// scalar kernels

#[inline]
fn saturate_round(x: f32) -> i16 {
    let r = x.round_ties_even();
    if r >= SHORT_SCALE {
        i16::MAX
    } else if r <= -32768.0 {
        i16::MIN
    } else {
        r as i16
    }
}

fn i16_to_f32_scalar(src: &[i16], dst: &mut [f32]) {
    for (s, d) in src.iter().zip(dst.iter_mut()) {
        *d = *s as f32 * SHORT_SCALE_INV;
    }
}

fn f32_to_i16_scalar(src: &[f32], dst: &mut [i16]) {
    for (s, d) in src.iter().zip(dst.iter_mut()) {
        *d = saturate_round(*s * SHORT_SCALE);
    }
}

fn shift_right_scalar(samples: &mut [i16]) {
    for s in samples {
        *s >>= QUANT_SHIFT;
    }
}

fn shift_left_scalar(samples: &mut [i16]) {
    for s in samples {
        // cast through u16: the shift itself must wrap, not trap
        *s = ((*s as u16) << QUANT_SHIFT) as i16;
    }
}

// x86_64 kernels

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn i16_to_f32_avx2(src: &[i16], dst: &mut [f32]) {
    use std::arch::x86_64::*;

    let scale = _mm256_set1_ps(SHORT_SCALE_INV);
    let mut s = src.chunks_exact(8);
    let mut d = dst.chunks_exact_mut(8);
    for (sc, dc) in (&mut s).zip(&mut d) {
        let v = _mm_loadu_si128(sc.as_ptr() as *const __m128i);
        let w = _mm256_cvtepi16_epi32(v);
        let f = _mm256_mul_ps(_mm256_cvtepi32_ps(w), scale);
        _mm256_storeu_ps(dc.as_mut_ptr(), f);
    }
    i16_to_f32_scalar(s.remainder(), d.into_remainder());
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn f32_to_i16_avx2(src: &[f32], dst: &mut [i16]) {
    use std::arch::x86_64::*;

    let scale = _mm256_set1_ps(SHORT_SCALE);
    let mut s = src.chunks_exact(8);
    let mut d = dst.chunks_exact_mut(8);
    for (sc, dc) in (&mut s).zip(&mut d) {
        let f = _mm256_mul_ps(_mm256_loadu_ps(sc.as_ptr()), scale);
        // cvtps rounds ties-to-even, packs saturates to the i16 range
        let v = _mm256_cvtps_epi32(f);
        let p = _mm256_packs_epi32(v, v);
        let q = _mm256_permute4x64_epi64::<0x88>(p);
        _mm_storeu_si128(dc.as_mut_ptr() as *mut __m128i, _mm256_castsi256_si128(q));
    }
    f32_to_i16_scalar(s.remainder(), d.into_remainder());
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn i16_to_f32_sse2(src: &[i16], dst: &mut [f32]) {
    use std::arch::x86_64::*;

    let scale = _mm_set1_ps(SHORT_SCALE_INV);
    let mut s = src.chunks_exact(8);
    let mut d = dst.chunks_exact_mut(8);
    for (sc, dc) in (&mut s).zip(&mut d) {
        let v = _mm_loadu_si128(sc.as_ptr() as *const __m128i);
        // duplicate-then-shift sign-extends each 16-bit lane to 32 bits
        let lo = _mm_srai_epi32::<16>(_mm_unpacklo_epi16(v, v));
        let hi = _mm_srai_epi32::<16>(_mm_unpackhi_epi16(v, v));
        _mm_storeu_ps(dc.as_mut_ptr(), _mm_mul_ps(_mm_cvtepi32_ps(lo), scale));
        _mm_storeu_ps(
            dc.as_mut_ptr().add(4),
            _mm_mul_ps(_mm_cvtepi32_ps(hi), scale),
        );
    }
    i16_to_f32_scalar(s.remainder(), d.into_remainder());
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn f32_to_i16_sse2(src: &[f32], dst: &mut [i16]) {
    use std::arch::x86_64::*;

    let scale = _mm_set1_ps(SHORT_SCALE);
    let mut s = src.chunks_exact(8);
    let mut d = dst.chunks_exact_mut(8);
    for (sc, dc) in (&mut s).zip(&mut d) {
        let lo = _mm_cvtps_epi32(_mm_mul_ps(_mm_loadu_ps(sc.as_ptr()), scale));
        let hi = _mm_cvtps_epi32(_mm_mul_ps(_mm_loadu_ps(sc.as_ptr().add(4)), scale));
        _mm_storeu_si128(dc.as_mut_ptr() as *mut __m128i, _mm_packs_epi32(lo, hi));
    }
    f32_to_i16_scalar(s.remainder(), d.into_remainder());
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn shift_right_avx2(samples: &mut [i16]) {
    use std::arch::x86_64::*;

    let mut chunks = samples.chunks_exact_mut(16);
    for c in &mut chunks {
        let v = _mm256_loadu_si256(c.as_ptr() as *const __m256i);
        let w = _mm256_srai_epi16::<{ QUANT_SHIFT as i32 }>(v);
        _mm256_storeu_si256(c.as_mut_ptr() as *mut __m256i, w);
    }
    shift_right_scalar(chunks.into_remainder());
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn shift_left_avx2(samples: &mut [i16]) {
    use std::arch::x86_64::*;

    let mut chunks = samples.chunks_exact_mut(16);
    for c in &mut chunks {
        let v = _mm256_loadu_si256(c.as_ptr() as *const __m256i);
        let w = _mm256_slli_epi16::<{ QUANT_SHIFT as i32 }>(v);
        _mm256_storeu_si256(c.as_mut_ptr() as *mut __m256i, w);
    }
    shift_left_scalar(chunks.into_remainder());
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn shift_right_sse2(samples: &mut [i16]) {
    use std::arch::x86_64::*;

    let mut chunks = samples.chunks_exact_mut(8);
    for c in &mut chunks {
        let v = _mm_loadu_si128(c.as_ptr() as *const __m128i);
        let w = _mm_srai_epi16::<{ QUANT_SHIFT as i32 }>(v);
        _mm_storeu_si128(c.as_mut_ptr() as *mut __m128i, w);
    }
    shift_right_scalar(chunks.into_remainder());
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn shift_left_sse2(samples: &mut [i16]) {
    use std::arch::x86_64::*;

    let mut chunks = samples.chunks_exact_mut(8);
    for c in &mut chunks {
        let v = _mm_loadu_si128(c.as_ptr() as *const __m128i);
        let w = _mm_slli_epi16::<{ QUANT_SHIFT as i32 }>(v);
        _mm_storeu_si128(c.as_mut_ptr() as *mut __m128i, w);
    }
    shift_left_scalar(chunks.into_remainder());
}
