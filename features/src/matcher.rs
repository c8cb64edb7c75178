use crate::print::{VoicePrint, MFCC_LEN};

/// Scores how close a candidate print is to the enrolled one.
///
/// Returns a value in `[0, 1]`; 0.0 when nothing is enrolled. The score is
/// the arithmetic mean of three terms:
///
/// - pitch: `max(0, 1 - |Δpitch| / max(pitch_c, pitch_e, 1))`
/// - spectral centroid: same relative-difference formula
/// - MFCC: mean over the 13 lanes of `max(0, 1 - |Δ| / 10)`
///
/// The result is always finite; degenerate prints (silence, zero pitch)
/// score through the `max(.., 1)` guard instead of dividing by zero.
pub fn compare(candidate: &VoicePrint, enrolled: Option<&VoicePrint>) -> f32 {
    let Some(enrolled) = enrolled else {
        return 0.0;
    };

    let pitch = relative_term(candidate.pitch_hz, enrolled.pitch_hz);
    let centroid = relative_term(candidate.spectral_centroid, enrolled.spectral_centroid);

    let mut mfcc = 0.0f64;
    for (c, e) in candidate.mfcc.iter().zip(enrolled.mfcc.iter()) {
        mfcc += (1.0 - ((*c as f64) - (*e as f64)).abs() / 10.0).max(0.0);
    }
    mfcc /= MFCC_LEN as f64;

    let score = (pitch + centroid + mfcc) / 3.0;
    if score.is_finite() {
        score.clamp(0.0, 1.0) as f32
    } else {
        0.0
    }
}

fn relative_term(c: f32, e: f32) -> f64 {
    let c = c as f64;
    let e = e as f64;
    let denom = c.max(e).max(1.0);
    (1.0 - (c - e).abs() / denom).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_print(pitch_hz: f32, centroid: f32, mfcc_fill: f32) -> VoicePrint {
        VoicePrint {
            pitch_hz,
            formants: vec![10, 22, 31],
            spectral_centroid: centroid,
            mfcc: [mfcc_fill; MFCC_LEN],
            captured_at: Utc::now(),
        }
    }

    #[test]
    fn identical_prints_score_one() {
        let v = make_print(120.0, 48.5, -3.2);
        assert_eq!(compare(&v, Some(&v)), 1.0);
    }

    #[test]
    fn no_enrollment_scores_zero() {
        let v = make_print(120.0, 48.5, -3.2);
        assert_eq!(compare(&v, None), 0.0);
    }

    #[test]
    fn symmetric() {
        let a = make_print(110.0, 40.0, -2.0);
        let b = make_print(180.0, 55.0, -8.5);
        assert_eq!(compare(&a, Some(&b)), compare(&b, Some(&a)));
    }

    #[test]
    fn degenerate_prints_stay_finite() {
        // All-silence candidate against a voiced enrollment.
        let silent = make_print(0.0, 0.0, 1e-10f32.ln());
        let voiced = make_print(140.0, 62.0, -4.0);
        let score = compare(&silent, Some(&voiced));
        assert!(score.is_finite());
        assert!((0.0..=1.0).contains(&score));

        // Silence against silence: relative terms divide by the 1.0 guard.
        let score = compare(&silent, Some(&silent));
        assert_eq!(score, 1.0);
    }

    #[test]
    fn distant_prints_score_low() {
        let a = make_print(80.0, 10.0, -20.0);
        let b = make_print(400.0, 500.0, 20.0);
        let score = compare(&a, Some(&b));
        assert!(score < 0.3, "got {score}");
    }

    #[test]
    fn close_prints_beat_threshold() {
        let a = make_print(120.0, 50.0, -3.0);
        let b = make_print(124.0, 51.5, -3.4);
        let score = compare(&a, Some(&b));
        assert!(score >= 0.7, "got {score}");
    }
}
