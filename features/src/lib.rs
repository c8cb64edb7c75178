//! Acoustic feature extraction and voiceprint similarity scoring.
//!
//! # Architecture
//!
//! The pipeline turns one capture window into a comparable voiceprint:
//!
//! 1. [`extract`]: raw `[-1, 1]` samples -> [`VoicePrint`]
//!    (autocorrelation pitch, FFT magnitude spectrum, top-3 formant peaks,
//!    spectral centroid, 13-lane pseudo-MFCC)
//! 2. [`compare`]: candidate print vs. enrolled print -> score in `[0, 1]`
//!
//! # MFCC Approximation
//!
//! The 13 triangular filters partition the spectrum **linearly**, not on a
//! mel scale. Enrolled prints carry the same approximation, so both sides
//! of every comparison must keep it; a true mel warp here would silently
//! invalidate every stored print.
//!
//! All arithmetic is total on degenerate input: silence yields zero pitch
//! and zero centroid, never NaN and never a division by zero.

mod error;
mod extractor;
mod matcher;
mod print;

pub use error::FeatureError;
pub use extractor::{
    compute_mfcc, compute_pitch, compute_spectrum, extract, find_formants, spectral_centroid,
    ExtractorConfig, MIN_PITCH_LAG,
};
pub use matcher::compare;
pub use print::{RawAudioFrame, VoicePrint, MAX_FORMANTS, MFCC_LEN};
