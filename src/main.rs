use std::path::PathBuf;
use std::time::{Duration, Instant};

pub use anyhow::{Context, Result as R, anyhow};
use chrono::Utc;
use clap::Parser;
use log::info;
use riffwave_lib::generator::{self, ChannelMap};
use riffwave_lib::*;

/// Generate sine tone PCM WAVE files
#[derive(Parser)]
#[command(name = "riffwave")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Output filename
    #[arg(short, long, default_value = "output.wav")]
    output: PathBuf,

    /// Waveform to generate, format: '<channel>:<frequency>[:gain]'
    #[arg(short, long = "waveform", default_value = "0:440:1", value_delimiter = ',')]
    waveforms: Vec<String>,

    /// Duration of the waveform (e.g. 500ms, 5s, 2m)
    #[arg(short, long, default_value = "5s", value_parser = parse_duration)]
    duration: Duration,

    /// Samples per second
    #[arg(short = 'r', long, default_value_t = 8_000)]
    sample_rate: u32,
}

fn parse_duration(s: &str) -> R<Duration> {
    let s = s.trim();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (value, unit) = s.split_at(split);
    let value: f64 = value
        .parse()
        .map_err(|_| anyhow!("invalid duration '{s}'"))?;
    let seconds = match unit {
        "ms" => value / 1000.0,
        "" | "s" => value,
        "m" => value * 60.0,
        "h" => value * 3600.0,
        _ => return Err(anyhow!("unknown duration unit '{unit}' in '{s}'")),
    };
    Ok(Duration::try_from_secs_f64(seconds)?)
}

fn main() -> R<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let map = ChannelMap::parse(&cli.waveforms).context("error parsing waveforms")?;
    let channels = u16::try_from(map.channels())
        .map_err(|_| anyhow!("too many channels: {}", map.channels()))?;
    let frames = (cli.sample_rate as f64 * cli.duration.as_secs_f64()) as u32;

    info!(
        "generating a {:?} waveform of {} (frames: {})",
        cli.duration, map, frames
    );
    let start_time = Instant::now();

    let format = Format::pcm(channels, cli.sample_rate, 16);
    let mut encoder: Encoder<i16, _> = Encoder::create(&cli.output, format)
        .with_context(|| format!("error creating {}", cli.output.display()))?;
    encoder.add_info([Info::new(
        Marker::ICRD,
        Utc::now().format("%a, %d %b %Y %H:%M:%S UTC").to_string(),
    )]);

    generator::render(&mut encoder, &map, frames).context("error writing samples")?;
    encoder.close().context("error closing writer")?;

    info!(
        "wrote {} in {:.3} seconds",
        cli.output.display(),
        start_time.elapsed().as_secs_f32()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1.5").unwrap(), Duration::from_millis(1500));
        assert!(parse_duration("5x").is_err());
        assert!(parse_duration("s").is_err());
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["riffwave"]);
        assert_eq!(cli.output, PathBuf::from("output.wav"));
        assert_eq!(cli.waveforms, ["0:440:1"]);
        assert_eq!(cli.duration, Duration::from_secs(5));
        assert_eq!(cli.sample_rate, 8_000);
    }

    #[test]
    fn cli_repeated_and_delimited_waveforms() {
        let cli = Cli::parse_from(["riffwave", "-w", "0:440", "-w", "1:220,1:330:0.5"]);
        assert_eq!(cli.waveforms, ["0:440", "1:220", "1:330:0.5"]);
    }
}
