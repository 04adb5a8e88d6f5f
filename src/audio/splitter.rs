//! Splits a long track into silence-aligned parts.
//!
//! Cut planning is pure arithmetic over precomputed silence spans; writing
//! part files is a thin adapter kept separate so the planning logic stays
//! trivially testable.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{detect_silence, AudioError, PartAudio, PcmTrack};
use crate::transcript::Millis;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Maximum part duration; tracks at or under this are never split.
    pub part_budget: Millis,
    /// How far before each nominal cut target to look for a pause.
    pub lookback: Millis,
    /// dBFS level under which audio counts as silent.
    pub silence_threshold_db: f32,
    /// Minimum pause duration eligible as a cut point.
    pub min_silence: Millis,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            part_budget: Millis(10 * 60 * 1000),
            lookback: Millis(30 * 1000),
            silence_threshold_db: -40.0,
            min_silence: Millis(400),
        }
    }
}

/// One planned part of the track. Parts are contiguous and cover the track
/// exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioPart {
    pub index: usize,
    pub start: Millis,
    pub end: Millis,
}

impl AudioPart {
    pub fn duration(&self) -> Millis {
        self.end - self.start
    }
}

/// Compute part boundaries for a track of `duration`.
///
/// Nominal targets sit at multiples of the budget. For each target `T` the
/// cut moves back to the latest silence start inside `[T - lookback, T)`,
/// keeping parts as long as allowed while avoiding mid-word cuts; with no
/// eligible pause the cut stays at `T`. Cuts never move backward past the
/// previous cut; when clamping would collapse two cuts, the cut degenerates
/// to the nominal target. The final part always runs to track end.
pub fn plan_parts(duration: Millis, config: &SplitConfig, silences: &[SilenceRef]) -> Vec<AudioPart> {
    if duration <= config.part_budget {
        return vec![AudioPart {
            index: 0,
            start: Millis::ZERO,
            end: duration,
        }];
    }

    let mut cuts: Vec<Millis> = Vec::new();
    let mut prev = Millis::ZERO;
    let mut k: i64 = 1;

    while Millis(k * config.part_budget.0) < duration {
        let target = Millis(k * config.part_budget.0);
        let window_start = target.saturating_sub(config.lookback);

        let mut cut = silences
            .iter()
            .filter(|s| s.start >= window_start && s.start < target)
            .map(|s| s.start)
            .max()
            .unwrap_or(target);

        if cut < prev {
            cut = prev;
        }
        if cut == prev {
            cut = target;
        }

        cuts.push(cut);
        prev = cut;
        k += 1;
    }

    let mut bounds = Vec::with_capacity(cuts.len() + 2);
    bounds.push(Millis::ZERO);
    bounds.extend(cuts);
    bounds.push(duration);

    bounds
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[1] > pair[0])
        .map(|(index, pair)| AudioPart {
            index,
            start: pair[0],
            end: pair[1],
        })
        .collect()
}

/// Silence span view used by the planner; decoupled from detection so plans
/// can be tested with hand-written spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SilenceRef {
    pub start: Millis,
}

impl From<&super::SilenceSpan> for SilenceRef {
    fn from(span: &super::SilenceSpan) -> Self {
        Self { start: span.start }
    }
}

/// Plan parts for a decoded track: detect silences, then compute cut points.
///
/// Materialization is separate ([`write_part`]) so the caller can keep at
/// most one part file alive at a time.
pub fn plan_for_track(track: &PcmTrack, config: &SplitConfig) -> Result<Vec<AudioPart>, AudioError> {
    let duration = track.duration();
    if duration == Millis::ZERO {
        return Err(AudioError::EmptyTrack("zero-length track".to_string()));
    }

    let silences = detect_silence(
        &track.samples,
        track.sample_rate,
        config.silence_threshold_db,
        config.min_silence,
    );
    let refs: Vec<SilenceRef> = silences.iter().map(SilenceRef::from).collect();
    let parts = plan_parts(duration, config, &refs);

    log::info!(
        "planned {} part(s) for {} using {} silence span(s)",
        parts.len(),
        duration,
        silences.len()
    );

    Ok(parts)
}

/// Materialize one planned part as a scoped temp WAV under `work_dir`.
pub fn write_part(
    track: &PcmTrack,
    part: &AudioPart,
    work_dir: &Path,
) -> Result<PartAudio, AudioError> {
    let from = sample_index(part.start, track.sample_rate).min(track.samples.len());
    let to = sample_index(part.end, track.sample_rate).min(track.samples.len());
    let path = work_dir.join(format!("part-{:03}.wav", part.index));
    PartAudio::write(path, &track.samples[from..to], track.sample_rate)
}

fn sample_index(at: Millis, sample_rate: u32) -> usize {
    ((at.0.max(0) as u64 * sample_rate as u64) / 1000) as usize
}
