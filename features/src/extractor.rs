use std::f64::consts::PI;

use chrono::Utc;

use crate::error::FeatureError;
use crate::print::{RawAudioFrame, VoicePrint, MAX_FORMANTS, MFCC_LEN};

/// Shortest pitch period considered by the autocorrelation search, in samples.
pub const MIN_PITCH_LAG: usize = 20;

/// Floor added before the log in the filter-bank energies.
const ENERGY_FLOOR: f64 = 1e-10;

/// Configures feature extraction.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Minimum capture window in seconds (default: 3.0).
    /// Shorter input fails with [`FeatureError::InsufficientAudio`].
    pub min_capture_secs: f32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_capture_secs: 3.0,
        }
    }
}

/// Extracts a [`VoicePrint`] from one capture window.
///
/// The frame must hold at least `min_capture_secs` of audio at its own
/// sample rate. The sample rate travels with the frame and feeds every
/// frequency computation; nothing here assumes a fixed device rate.
pub fn extract(frame: &RawAudioFrame, cfg: &ExtractorConfig) -> Result<VoicePrint, FeatureError> {
    let need = (cfg.min_capture_secs as f64 * frame.sample_rate as f64) as usize;
    let got = frame.samples.len();
    if got < need {
        return Err(FeatureError::InsufficientAudio { need, got });
    }

    let pitch_hz = compute_pitch(&frame.samples, frame.sample_rate);
    let magnitudes = compute_spectrum(&frame.samples);
    let formants = find_formants(&magnitudes);
    let spectral_centroid = spectral_centroid(&magnitudes);
    let mfcc = compute_mfcc(&magnitudes);

    Ok(VoicePrint {
        pitch_hz,
        formants,
        spectral_centroid,
        mfcc,
        captured_at: Utc::now(),
    })
}

/// Estimates the fundamental frequency via autocorrelation.
///
/// Candidate lags run over `[MIN_PITCH_LAG, N/2)`; the lag with the highest
/// positive correlation wins and pitch = sample_rate / lag. Silence (no
/// positive-correlation lag) yields 0.0, never a division by zero.
pub fn compute_pitch(samples: &[f32], sample_rate: u32) -> f32 {
    let n = samples.len();
    if n / 2 <= MIN_PITCH_LAG {
        return 0.0;
    }

    let mut best_corr = 0.0f64;
    let mut best_lag = 0usize;
    for lag in MIN_PITCH_LAG..n / 2 {
        let mut corr = 0.0f64;
        for i in 0..n - lag {
            corr += samples[i] as f64 * samples[i + lag] as f64;
        }
        if corr > best_corr {
            best_corr = corr;
            best_lag = lag;
        }
    }

    if best_lag > 0 {
        sample_rate as f32 / best_lag as f32
    } else {
        0.0
    }
}

/// Computes the per-bin magnitude spectrum of the full buffer.
///
/// The input is zero-padded to the next power of two and run through an
/// in-place radix-2 FFT; all bins, including the conjugate mirror, are
/// returned so the bin layout matches the N-point transform definition.
pub fn compute_spectrum(samples: &[f32]) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }

    let fft_size = next_pow2(samples.len());
    let mut buf = vec![(0.0f64, 0.0f64); fft_size];
    for (slot, &s) in buf.iter_mut().zip(samples.iter()) {
        *slot = (s as f64, 0.0);
    }
    fft(&mut buf);

    buf.iter()
        .map(|&(re, im)| (re * re + im * im).sqrt() as f32)
        .collect()
}

/// Finds formant peaks: strict local maxima of the magnitude spectrum,
/// sorted descending by magnitude, top [`MAX_FORMANTS`] kept.
pub fn find_formants(magnitudes: &[f32]) -> Vec<usize> {
    let mut peaks: Vec<usize> = Vec::new();
    for i in 1..magnitudes.len().saturating_sub(1) {
        if magnitudes[i] > magnitudes[i - 1] && magnitudes[i] > magnitudes[i + 1] {
            peaks.push(i);
        }
    }
    peaks.sort_by(|&a, &b| {
        magnitudes[b]
            .partial_cmp(&magnitudes[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    peaks.truncate(MAX_FORMANTS);
    peaks
}

/// Magnitude-weighted mean bin index: Σ(i·m[i]) / Σ(m[i]).
/// Returns 0.0 when the spectrum is silent, never NaN.
pub fn spectral_centroid(magnitudes: &[f32]) -> f32 {
    let mut weighted = 0.0f64;
    let mut total = 0.0f64;
    for (i, &m) in magnitudes.iter().enumerate() {
        weighted += i as f64 * m as f64;
        total += m as f64;
    }
    if total > 0.0 {
        (weighted / total) as f32
    } else {
        0.0
    }
}

/// Computes the 13-lane pseudo-MFCC vector.
///
/// The spectrum bins are partitioned into 13 equal-width triangular
/// filters on a linear axis (intentionally not mel-warped; stored prints
/// carry the same partition), magnitudes are weight-summed per filter and
/// floored through `ln(sum + 1e-10)`.
pub fn compute_mfcc(magnitudes: &[f32]) -> [f32; MFCC_LEN] {
    let n = magnitudes.len();
    let mut mfcc = [0.0f32; MFCC_LEN];

    for (f, lane) in mfcc.iter_mut().enumerate() {
        let start = f * n / MFCC_LEN;
        let end = (f + 1) * n / MFCC_LEN;
        let center = (start + end) as f64 / 2.0;
        let half_width = (end - start) as f64 / 2.0;

        let mut sum = 0.0f64;
        if half_width > 0.0 {
            for (j, &m) in magnitudes[start..end].iter().enumerate() {
                let w = 1.0 - ((start + j) as f64 - center).abs() / half_width;
                sum += m as f64 * w;
            }
        }
        *lane = (sum + ENERGY_FLOOR).ln() as f32;
    }
    mfcc
}

fn next_pow2(n: usize) -> usize {
    let mut p = 1;
    while p < n {
        p <<= 1;
    }
    p
}

/// In-place Cooley-Tukey FFT.
/// Input length must be a power of 2.
/// Uses (real, imag) tuples instead of a complex number type.
fn fft(x: &mut [(f64, f64)]) {
    let n = x.len();
    if n <= 1 {
        return;
    }

    // Bit-reversal permutation.
    let mut j = 0usize;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j ^= bit;
        if i < j {
            x.swap(i, j);
        }
    }

    // Butterfly operations.
    let mut size = 2;
    while size <= n {
        let half = size / 2;
        let angle = -2.0 * PI / size as f64;
        let wn = (angle.cos(), angle.sin());
        let mut start = 0;
        while start < n {
            let mut w = (1.0, 0.0);
            for k in 0..half {
                let u = x[start + k];
                let t_re = w.0 * x[start + k + half].0 - w.1 * x[start + k + half].1;
                let t_im = w.0 * x[start + k + half].1 + w.1 * x[start + k + half].0;
                x[start + k] = (u.0 + t_re, u.1 + t_im);
                x[start + k + half] = (u.0 - t_re, u.1 - t_im);
                let new_w_re = w.0 * wn.0 - w.1 * wn.1;
                let new_w_im = w.0 * wn.1 + w.1 * wn.0;
                w = (new_w_re, new_w_im);
            }
            start += size;
        }
        size <<= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mono sine at `freq_hz`, unit amplitude scaled to 0.5.
    fn make_sine(freq_hz: f64, n_samples: usize, sample_rate: u32) -> Vec<f32> {
        (0..n_samples)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                (0.5 * (freq_hz * 2.0 * PI * t).sin()) as f32
            })
            .collect()
    }

    fn short_cfg() -> ExtractorConfig {
        ExtractorConfig {
            min_capture_secs: 0.2,
        }
    }

    #[test]
    fn extract_rejects_short_buffer() {
        let frame = RawAudioFrame::new(vec![0.0; 100], 16000);
        let err = extract(&frame, &ExtractorConfig::default()).unwrap_err();
        match err {
            FeatureError::InsufficientAudio { need, got } => {
                assert_eq!(need, 48000);
                assert_eq!(got, 100);
            }
        }
    }

    #[test]
    fn extract_tone() {
        let sr = 8000;
        let frame = RawAudioFrame::new(make_sine(100.0, 2000, sr), sr);
        let print = extract(&frame, &short_cfg()).unwrap();

        // 100 Hz -> period 80 samples at 8 kHz.
        assert!(
            (print.pitch_hz - 100.0).abs() < 5.0,
            "pitch should be ~100 Hz, got {}",
            print.pitch_hz
        );
        assert!(!print.formants.is_empty());
        assert!(print.formants.len() <= MAX_FORMANTS);
        assert!(print.spectral_centroid > 0.0);
    }

    #[test]
    fn extract_silence() {
        let frame = RawAudioFrame::new(vec![0.0; 2000], 8000);
        let print = extract(&frame, &short_cfg()).unwrap();

        assert_eq!(print.pitch_hz, 0.0);
        assert_eq!(print.spectral_centroid, 0.0);
        assert!(print.formants.is_empty());
        // Silent filter energies hit the floor: ln(1e-10).
        for lane in print.mfcc {
            assert!(lane.is_finite());
            assert!((lane - (1e-10f64.ln() as f32)).abs() < 1e-3);
        }
    }

    #[test]
    fn pitch_of_sine() {
        let sr = 8000;
        let samples = make_sine(200.0, 1600, sr);
        let pitch = compute_pitch(&samples, sr);
        // 200 Hz -> period 40 samples.
        assert!((pitch - 200.0).abs() < 10.0, "got {pitch}");
    }

    #[test]
    fn pitch_of_silence_is_zero() {
        let samples = vec![0.0f32; 1600];
        assert_eq!(compute_pitch(&samples, 8000), 0.0);
    }

    #[test]
    fn pitch_tiny_buffer_is_zero() {
        // N/2 <= MIN_PITCH_LAG leaves no candidate lags.
        let samples = vec![0.5f32; 40];
        assert_eq!(compute_pitch(&samples, 8000), 0.0);
    }

    #[test]
    fn spectrum_sine_peaks_at_tone_bin() {
        let sr = 1024;
        // 64 Hz over exactly one FFT-sized window: energy lands in bin 64.
        let samples = make_sine(64.0, 1024, sr);
        let mags = compute_spectrum(&samples);
        assert_eq!(mags.len(), 1024);

        let peak = mags
            .iter()
            .enumerate()
            .take(mags.len() / 2)
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 64);
    }

    #[test]
    fn spectrum_parseval() {
        // sum |x[n]|^2 == (1/N) * sum |X[k]|^2 for the padded length.
        let samples = make_sine(100.0, 256, 8000);
        let mags = compute_spectrum(&samples);
        let n = mags.len() as f64;

        let time_energy: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
        let freq_energy: f64 = mags.iter().map(|&m| (m as f64) * (m as f64)).sum();
        // Magnitudes are stored as f32, so allow for rounding in the sum.
        assert!(
            (time_energy * n - freq_energy).abs() / (time_energy * n) < 1e-5,
            "Parseval violated: {} vs {}",
            time_energy * n,
            freq_energy
        );
    }

    #[test]
    fn spectrum_empty() {
        assert!(compute_spectrum(&[]).is_empty());
    }

    #[test]
    fn formants_pick_top_peaks_descending() {
        //               0    1    2    3    4    5    6    7    8
        let mags = [0.0, 5.0, 0.0, 9.0, 0.0, 2.0, 0.0, 7.0, 0.0];
        let peaks = find_formants(&mags);
        assert_eq!(peaks, vec![3, 7, 1]);
    }

    #[test]
    fn formants_flat_spectrum_has_none() {
        let mags = [1.0f32; 32];
        assert!(find_formants(&mags).is_empty());
    }

    #[test]
    fn centroid_weighted_mean() {
        // All energy in bin 4.
        let mut mags = [0.0f32; 8];
        mags[4] = 2.0;
        assert_eq!(spectral_centroid(&mags), 4.0);
    }

    #[test]
    fn centroid_silence_is_zero_not_nan() {
        let mags = [0.0f32; 64];
        let c = spectral_centroid(&mags);
        assert_eq!(c, 0.0);
        assert!(c.is_finite());
    }

    #[test]
    fn mfcc_has_thirteen_finite_lanes() {
        let samples = make_sine(300.0, 2048, 8000);
        let mags = compute_spectrum(&samples);
        let mfcc = compute_mfcc(&mags);
        assert_eq!(mfcc.len(), MFCC_LEN);
        assert!(mfcc.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn mfcc_of_empty_spectrum_hits_floor() {
        let mfcc = compute_mfcc(&[]);
        for lane in mfcc {
            assert!((lane - (1e-10f64.ln() as f32)).abs() < 1e-3);
        }
    }

    #[test]
    fn fft_impulse() {
        // FFT of [1,0,0,0] is flat: all magnitudes 1.
        let mags = compute_spectrum(&[1.0, 0.0, 0.0, 0.0]);
        for m in mags {
            assert!((m - 1.0).abs() < 1e-6);
        }
    }
}
