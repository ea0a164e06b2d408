//! Embedded sound data.
//!
//! The default chime is synthesized in-process so the built-in selection
//! never depends on files next to the executable.

use std::f32::consts::TAU;
use std::sync::OnceLock;

/// Asset reference that resolves to [`default_sound_data`].
pub const EMBEDDED_DEFAULT_REF: &str = "embedded:default";

/// Prefix marking an asset reference as embedded.
pub const EMBEDDED_PREFIX: &str = "embedded:";

/// Sample rate of the default chime.
pub const CHIME_SAMPLE_RATE: u32 = 44_100;

/// Notes of the chime as (frequency in Hz, start in seconds).
const CHIME_NOTES: [(f32, f32); 2] = [(880.0, 0.0), (659.25, 0.35)];

/// Length of the chime in seconds.
const CHIME_SECONDS: f32 = 1.4;

/// Peak amplitude as a fraction of full scale.
const CHIME_GAIN: f32 = 0.45;

/// Default embedded sound data: a two-note 16-bit mono PCM WAV chime.
///
/// Built on first use and kept for the life of the process.
pub fn default_sound_data() -> &'static [u8] {
    static DATA: OnceLock<Vec<u8>> = OnceLock::new();
    DATA.get_or_init(|| encode_wav(&chime_samples(), CHIME_SAMPLE_RATE))
}

/// Resolves an embedded asset reference to its bytes.
///
/// Returns `None` if the reference is not embedded or names an unknown asset.
#[must_use]
pub fn resolve_embedded(asset: &str) -> Option<&'static [u8]> {
    match asset.strip_prefix(EMBEDDED_PREFIX)? {
        "default" => Some(default_sound_data()),
        _ => None,
    }
}

/// Each note is a sine with a short attack and an exponential decay.
fn chime_samples() -> Vec<i16> {
    let rate = CHIME_SAMPLE_RATE as f32;
    let total = (CHIME_SECONDS * rate) as usize;

    (0..total)
        .map(|n| {
            let t = n as f32 / rate;
            let mix: f32 = CHIME_NOTES
                .iter()
                .filter(|(_, start)| t >= *start)
                .map(|(freq, start)| {
                    let local = t - start;
                    let attack = (local / 0.005).min(1.0);
                    let envelope = attack * (-local * 4.0).exp();
                    envelope * (TAU * freq * local).sin()
                })
                .sum();
            let value = (mix * CHIME_GAIN).clamp(-1.0, 1.0);
            (value * f32::from(i16::MAX)) as i16
        })
        .collect()
}

/// Wraps mono 16-bit samples in a RIFF/WAVE container.
fn encode_wav(samples: &[i16], sample_rate: u32) -> Vec<u8> {
    const CHANNELS: u16 = 1;
    const BITS_PER_SAMPLE: u16 = 16;
    let block_align = CHANNELS * BITS_PER_SAMPLE / 8;
    let byte_rate = sample_rate * u32::from(block_align);
    let data_len = (samples.len() * 2) as u32;

    let mut out = Vec::with_capacity(44 + data_len as usize);
    // RIFF header
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    // fmt chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&CHANNELS.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    // data chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }
    out
}
