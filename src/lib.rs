//! Streaming RIFF/WAVE PCM encoder.
//!
//! Samples go straight to a seekable [`Sink`]; the header is written with
//! provisional sizes and patched when the [`Encoder`] is closed. An optional
//! LIST/INFO chunk carries textual metadata.

pub mod codecs;
pub mod error;
pub mod generator;
pub mod info;
pub mod marker;
mod prelude;

pub use codecs::{Encoder, Format, I24, Sample, Sink, WaveInfo, inspect, inspect_file};
pub use error::{Result, WaveError};
pub use info::{Info, InfoList};
pub use marker::Marker;

// Format tags
pub const FORMAT_PCM: u16 = 1;

// Standard bit depths
const BIT_DEPTH_8: u16 = 8;
const BIT_DEPTH_16: u16 = 16;
const BIT_DEPTH_24: u16 = 24;
const BIT_DEPTH_32: u16 = 32;

/// Value of the ISFT entry added when the caller did not supply one.
pub const SOFTWARE: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));
