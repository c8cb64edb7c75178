use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of MFCC lanes in every voiceprint. The fixed-size array makes the
/// length invariant structural rather than checked.
pub const MFCC_LEN: usize = 13;

/// Maximum number of formant peaks kept per print.
pub const MAX_FORMANTS: usize = 3;

/// One capture window of raw audio.
///
/// Samples are mono, in `[-1, 1]`, at the device's actual sample rate.
/// Produced once by the capture collaborator, consumed once by feature
/// extraction, then discarded.
#[derive(Debug, Clone)]
pub struct RawAudioFrame {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl RawAudioFrame {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Capture window length in seconds.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Fixed-shape acoustic signature of one utterance.
///
/// Serialized field names are the persisted-record wire format
/// (`pitchHz`, `spectralCentroid`, `capturedAt`); the stored enrollment
/// record is exactly one of these documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoicePrint {
    /// Estimated fundamental frequency in Hz; 0 for silence.
    pub pitch_hz: f32,

    /// Spectrum bin indices of the strongest local peaks,
    /// descending by peak magnitude. At most [`MAX_FORMANTS`] entries.
    pub formants: Vec<usize>,

    /// Magnitude-weighted mean spectrum bin; 0 for silence.
    pub spectral_centroid: f32,

    /// Log filter-bank energies over a linear 13-filter partition.
    pub mfcc: [f32; MFCC_LEN],

    /// When the source utterance was captured.
    pub captured_at: DateTime<Utc>,
}
