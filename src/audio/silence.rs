//! Energy-based silence detection over decoded PCM.
//!
//! Frames of fixed size are reduced to RMS level in dBFS; a run of frames
//! under the threshold lasting at least the minimum duration becomes a
//! silence span. Spans are the cut-point candidates for the splitter.

use crate::transcript::Millis;

/// Frame hop used for level measurement. 30 ms gives enough resolution for
/// pause boundaries without making span lists huge on long recordings.
const FRAME_MS: i64 = 30;

/// A contiguous span of audio below the level threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SilenceSpan {
    pub start: Millis,
    pub end: Millis,
}

impl SilenceSpan {
    pub fn duration(&self) -> Millis {
        self.end - self.start
    }
}

/// Find all silence spans of at least `min_silence` in `samples`.
///
/// `threshold_db` is a dBFS level (e.g. -40.0); frames whose RMS falls below
/// it count as silent. A trailing silent run at end of track is included.
pub fn detect_silence(
    samples: &[f32],
    sample_rate: u32,
    threshold_db: f32,
    min_silence: Millis,
) -> Vec<SilenceSpan> {
    if samples.is_empty() || sample_rate == 0 {
        return Vec::new();
    }

    let frame_len = ((sample_rate as i64 * FRAME_MS) / 1000).max(1) as usize;
    let mut spans = Vec::new();
    let mut run_start: Option<Millis> = None;

    for (i, frame) in samples.chunks(frame_len).enumerate() {
        let frame_start = Millis(i as i64 * FRAME_MS);
        let silent = rms_db(frame) < threshold_db;

        match (silent, run_start) {
            (true, None) => run_start = Some(frame_start),
            (false, Some(start)) => {
                push_if_long_enough(&mut spans, start, frame_start, min_silence);
                run_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = run_start {
        let track_end = Millis::from_samples(samples.len(), sample_rate);
        push_if_long_enough(&mut spans, start, track_end, min_silence);
    }

    spans
}

fn push_if_long_enough(spans: &mut Vec<SilenceSpan>, start: Millis, end: Millis, min: Millis) {
    let span = SilenceSpan { start, end };
    if span.duration() >= min {
        spans.push(span);
    }
}

/// RMS level of one frame in dBFS. Digital silence maps to a floor well below
/// any usable threshold.
fn rms_db(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return -120.0;
    }
    let energy: f32 = frame.iter().map(|s| s * s).sum::<f32>() / frame.len() as f32;
    let rms = energy.sqrt();
    if rms <= 1e-6 {
        -120.0
    } else {
        20.0 * rms.log10()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 16_000;

    fn tone(ms: i64) -> Vec<f32> {
        let n = (SR as i64 * ms / 1000) as usize;
        (0..n)
            .map(|i| (i as f32 * 0.1).sin() * 0.5)
            .collect()
    }

    fn quiet(ms: i64) -> Vec<f32> {
        vec![0.0; (SR as i64 * ms / 1000) as usize]
    }

    #[test]
    fn no_silence_in_steady_tone() {
        let spans = detect_silence(&tone(1000), SR, -40.0, Millis(300));
        assert!(spans.is_empty());
    }

    #[test]
    fn finds_mid_track_pause() {
        let mut samples = tone(1000);
        samples.extend(quiet(600));
        samples.extend(tone(1000));

        let spans = detect_silence(&samples, SR, -40.0, Millis(300));
        assert_eq!(spans.len(), 1);
        let span = spans[0];
        assert!((span.start.0 - 1000).abs() <= FRAME_MS);
        assert!(span.duration() >= Millis(500));
    }

    #[test]
    fn short_pause_ignored() {
        let mut samples = tone(500);
        samples.extend(quiet(120));
        samples.extend(tone(500));

        let spans = detect_silence(&samples, SR, -40.0, Millis(300));
        assert!(spans.is_empty());
    }

    #[test]
    fn trailing_silence_included() {
        let mut samples = tone(500);
        samples.extend(quiet(400));

        let spans = detect_silence(&samples, SR, -40.0, Millis(300));
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].end, Millis(900));
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(detect_silence(&[], SR, -40.0, Millis(300)).is_empty());
    }
}
