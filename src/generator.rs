//! Sine tone generation for test signals.
//!
//! A waveform is described as `<channel>:<frequency>[:gain]`, e.g. `0:440`
//! or `1:1000:0.5`. Several waveforms on the same channel are mixed.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::codecs::{Encoder, Sink};
use crate::prelude::*;

const I16_MAX_F: f64 = 32767.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waveform {
    pub channel: usize,
    pub frequency: f64,
    pub gain: f64,
}

impl Waveform {
    /// Value at `frame`, truncated to 16 bits.
    pub fn sample(&self, frame: u32, sample_rate: u32) -> i16 {
        let t = frame as f64 / sample_rate as f64;
        let v = (t * self.frequency * 2.0 * PI).sin() * self.gain;
        (v * I16_MAX_F) as i16
    }
}

impl FromStr for Waveform {
    type Err = WaveError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |what: &str| WaveError::InvalidWaveform(format!("{what} in '{s}'"));

        let parts: Vec<&str> = s.split(':').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(invalid("expected <channel>:<frequency>[:gain]"));
        }

        let channel = parts[0]
            .parse::<usize>()
            .map_err(|_| invalid(&format!("invalid channel '{}' (range 0-)", parts[0])))?;

        let frequency = parts[1]
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .ok_or_else(|| invalid(&format!("invalid frequency '{}' (range 0-)", parts[1])))?;

        let gain = match parts.get(2) {
            Some(g) => g
                .parse::<f64>()
                .ok()
                .filter(|g| (0.0..=1.0).contains(g))
                .ok_or_else(|| invalid(&format!("invalid gain '{g}' (range 0.0 - 1.0)")))?,
            None => 1.0,
        };

        Ok(Waveform {
            channel,
            frequency,
            gain,
        })
    }
}

/// Waveforms grouped by output channel. Channels below the highest one
/// referenced that have no waveform are silent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelMap(Vec<Vec<Waveform>>);

impl ChannelMap {
    pub fn parse<I, S>(descriptions: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut channels: Vec<Vec<Waveform>> = Vec::new();
        for d in descriptions {
            let waveform: Waveform = d.as_ref().parse()?;
            if channels.len() <= waveform.channel {
                channels.resize_with(waveform.channel + 1, Vec::new);
            }
            channels[waveform.channel].push(waveform);
        }
        Ok(ChannelMap(channels))
    }

    pub fn channels(&self) -> usize {
        self.0.len()
    }

    /// Mixed value of `channel` at `frame`. Unknown channels are silent.
    pub fn sample(&self, channel: usize, frame: u32, sample_rate: u32) -> i16 {
        let Some(waveforms) = self.0.get(channel) else {
            return 0;
        };
        let unmixed: Vec<i16> = waveforms
            .iter()
            .map(|w| w.sample(frame, sample_rate))
            .collect();
        mix(&unmixed)
    }
}

impl fmt::Display for ChannelMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (channel, waveforms) in self.0.iter().enumerate() {
            if waveforms.is_empty() {
                write!(f, "{channel}: *none*,")?;
                continue;
            }
            let freqs: Vec<String> = waveforms
                .iter()
                .map(|w| format!("{}({})", w.frequency, w.gain))
                .collect();
            write!(f, "{channel}: {},", freqs.join(","))?;
        }
        Ok(())
    }
}

/// Averages the inputs, clipped to the 16-bit range. An empty slice is silence.
pub fn mix(samples: &[i16]) -> i16 {
    match samples {
        [] => 0,
        [single] => *single,
        _ => {
            let sum: i64 = samples.iter().map(|&s| s as i64).sum();
            let mixed = sum / samples.len() as i64;
            mixed.clamp(i16::MIN as i64, i16::MAX as i64) as i16
        }
    }
}

/// Writes `frames` frames of `map` to `encoder`, one sample per channel in
/// channel order.
pub fn render<W: Sink>(encoder: &mut Encoder<i16, W>, map: &ChannelMap, frames: u32) -> Result<()> {
    let format = encoder.format();
    if map.channels() != format.channels as usize {
        return Err(WaveError::InvalidWaveform(format!(
            "{} described channels for a {} channel stream",
            map.channels(),
            format.channels
        )));
    }

    for frame in 0..frames {
        for channel in 0..map.channels() {
            encoder.write_sample(map.sample(channel, frame, format.sample_rate))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::Format;

    #[test]
    fn mix_averages_and_clips() {
        assert_eq!(mix(&[10, 20]), 15);
        assert_eq!(mix(&[32767, 32767]), 32767);
        assert_eq!(mix(&[-32768, -32768]), -32768);
        assert_eq!(mix(&[-7]), -7);
        assert_eq!(mix(&[]), 0);
    }

    #[test]
    fn parse_waveform() {
        let w: Waveform = "1:440".parse().unwrap();
        assert_eq!(
            w,
            Waveform {
                channel: 1,
                frequency: 440.0,
                gain: 1.0
            }
        );
        let w: Waveform = "0:1000:0.25".parse().unwrap();
        assert_eq!(w.gain, 0.25);
    }

    #[test]
    fn parse_rejects_bad_descriptions() {
        for bad in ["", "0", "0:1:1:1", "-1:440", "x:440", "0:-5", "0:abc", "0:440:1.5", "0:440:-0.1"] {
            let err = bad.parse::<Waveform>().unwrap_err();
            assert!(matches!(err, WaveError::InvalidWaveform(_)), "{bad}");
        }
    }

    #[test]
    fn channel_map_pads_missing_channels() {
        let map = ChannelMap::parse(["2:440", "0:100", "0:200:0.5"]).unwrap();
        assert_eq!(map.channels(), 3);
        assert_eq!(map.sample(1, 10, 8_000), 0);
        assert_eq!(map.sample(3, 2, 8_000), 0);
        assert_eq!(map.sample(usize::MAX, 2, 8_000), 0);
        assert_eq!(map.to_string(), "0: 100(1),200(0.5),1: *none*,2: 440(1),");
    }

    #[test]
    fn sine_starts_at_zero_and_peaks() {
        let w: Waveform = "0:2000".parse().unwrap();
        assert_eq!(w.sample(0, 8_000), 0);
        // quarter period at 2 kHz / 8 kHz
        assert_eq!(w.sample(1, 8_000), 32767);
    }

    #[test]
    fn render_interleaves_channels() {
        let map = ChannelMap::parse(["1:2000"]).unwrap();
        let mut enc: Encoder<i16, _> =
            Encoder::new(Cursor::new(Vec::new()), Format::pcm(2, 8_000, 16)).unwrap();
        render(&mut enc, &map, 2).unwrap();
        assert_eq!(enc.samples_written(), 4);

        let bytes = enc.close().unwrap().into_inner();
        let samples: Vec<i16> = bytes[44..52]
            .chunks(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(samples, [0, 0, 0, 32767]);
    }

    #[test]
    fn render_rejects_channel_count_mismatch() {
        let map = ChannelMap::parse(["0:440", "1:440"]).unwrap();
        let mut enc: Encoder<i16, _> =
            Encoder::new(Cursor::new(Vec::new()), Format::pcm(1, 8_000, 16)).unwrap();
        assert!(render(&mut enc, &map, 1).is_err());
        assert_eq!(enc.samples_written(), 0);
    }
}
