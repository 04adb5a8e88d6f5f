//! Decode arbitrary audio containers to 16 kHz mono PCM.

use std::path::Path;
use std::time::Instant;

use super::AudioError;
use crate::transcript::Millis;

pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Decoded track, always 16 kHz mono f32.
#[derive(Debug, Clone)]
pub struct PcmTrack {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl PcmTrack {
    pub fn duration(&self) -> Millis {
        Millis::from_samples(self.samples.len(), self.sample_rate)
    }
}

/// Decode `path` to mono f32, downmixing channels and resampling to 16 kHz.
///
/// Corrupt packets are skipped rather than failing the whole file; a track
/// that decodes to zero samples is rejected.
pub fn load_audio(path: &Path) -> Result<PcmTrack, AudioError> {
    use symphonia::core::audio::SampleBuffer;
    use symphonia::core::codecs::DecoderOptions;
    use symphonia::core::errors::Error as SymphoniaError;
    use symphonia::core::formats::FormatOptions;
    use symphonia::core::io::MediaSourceStream;
    use symphonia::core::meta::MetadataOptions;
    use symphonia::core::probe::Hint;

    let start = Instant::now();
    let src = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());
    let hint = Hint::new();

    let fmt_opts: FormatOptions = Default::default();
    let meta_opts: MetadataOptions = Default::default();
    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(|e| AudioError::Decode(format!("failed to probe {}: {e}", path.display())))?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| AudioError::Decode("missing default track".to_string()))?;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::Decode(format!("decoder init failed: {e}")))?;

    let track_id = track.id;
    let mut pcm = track
        .codec_params
        .n_frames
        .and_then(|n| usize::try_from(n).ok())
        .map(Vec::with_capacity)
        .unwrap_or_else(Vec::new);
    let mut sample_rate = track.codec_params.sample_rate;

    while let Ok(packet) = format.next_packet() {
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = decoded.spec();
                sample_rate = sample_rate.or(Some(spec.rate));
                let channels = spec.channels.count();
                let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
                buf.copy_interleaved_ref(decoded);

                if channels == 1 {
                    pcm.extend_from_slice(buf.samples());
                } else {
                    for frame in buf.samples().chunks_exact(channels) {
                        let sum: f32 = frame.iter().copied().sum();
                        pcm.push(sum / channels as f32);
                    }
                }
            }
            Err(err) if matches!(err, SymphoniaError::DecodeError(_)) => {
                log::warn!("skipping corrupt packet: {err}");
                continue;
            }
            Err(err) => {
                return Err(AudioError::Decode(format!(
                    "decode error for {}: {err}",
                    path.display()
                )));
            }
        }
    }

    let sr = sample_rate
        .ok_or_else(|| AudioError::Decode(format!("missing sample rate for {}", path.display())))?;

    let pcm = if sr == TARGET_SAMPLE_RATE {
        pcm
    } else {
        log::info!(
            "resampling {} from {} Hz to {} Hz",
            path.display(),
            sr,
            TARGET_SAMPLE_RATE
        );
        resample_linear(&pcm, sr, TARGET_SAMPLE_RATE)
    };

    if pcm.is_empty() {
        return Err(AudioError::EmptyTrack(path.display().to_string()));
    }

    log::info!(
        "loaded {} samples from {} in {:?}",
        pcm.len(),
        path.display(),
        start.elapsed()
    );

    Ok(PcmTrack {
        samples: pcm,
        sample_rate: TARGET_SAMPLE_RATE,
    })
}

pub(crate) fn resample_linear(input: &[f32], from_sr: u32, to_sr: u32) -> Vec<f32> {
    if from_sr == 0 || to_sr == 0 || input.is_empty() {
        return Vec::new();
    }

    let out_len = ((input.len() as f64) * (to_sr as f64) / (from_sr as f64))
        .ceil()
        .max(1.0) as usize;
    let step = from_sr as f64 / to_sr as f64;

    let mut output = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let pos = (i as f64) * step;
        let idx = pos.floor() as usize;
        let frac = pos - idx as f64;

        let current = input.get(idx).copied().unwrap_or_default();
        let next = input.get(idx + 1).copied().unwrap_or(current);
        output.push(current + (next - current) * (frac as f32));
    }

    output
}
