use thiserror::Error;

use crate::marker::Marker;

pub type Result<T> = std::result::Result<T, WaveError>;

#[derive(Debug, Error)]
pub enum WaveError {
    /// Any failure of the underlying sink or file. The encoder is unusable afterwards.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sample type is {actual} bits wide but the format declares {expected} bits per sample")]
    SampleWidthMismatch { expected: u16, actual: u16 },

    #[error("format must declare at least one channel")]
    NoChannels,

    #[error("{len} bytes is not a whole number of {frame_bits}-bit frames")]
    FrameMisaligned { len: usize, frame_bits: u32 },

    #[error("invalid sample count {samples} for {channels} channels")]
    IncompleteFrame { samples: u64, channels: u16 },

    /// Appending more bytes would overflow a 32-bit RIFF size field.
    #[error("stream would be {size} bytes, beyond the 32-bit RIFF size limit")]
    SizeLimitExceeded { size: u64 },

    #[error("insufficient data: {len} bytes")]
    InsufficientData { len: usize },

    #[error("unexpected tag '{found}', expected '{expected}'")]
    UnexpectedTag { expected: Marker, found: Marker },

    #[error("value of '{marker}' declares {len} bytes but only {remaining} remain")]
    ValueOverrun {
        marker: Marker,
        len: u32,
        remaining: usize,
    },

    #[error("value of '{marker}' is not terminated")]
    MissingTerminator { marker: Marker },

    #[error("value of '{marker}' is not valid UTF-8")]
    InvalidText { marker: Marker },

    #[error("value of '{marker}' contains a NUL byte")]
    EmbeddedTerminator { marker: Marker },

    #[error("value of '{marker}' is too long ({len} bytes)")]
    ValueTooLong { marker: Marker, len: usize },

    #[error("invalid marker length '{text}'")]
    InvalidMarkerLength { text: String },

    #[error("not a RIFF/WAVE stream")]
    NotRiffWave,

    #[error("missing '{0}' chunk")]
    MissingChunk(Marker),

    #[error("chunk '{marker}' declares {len} bytes but only {remaining} remain")]
    TruncatedChunk {
        marker: Marker,
        len: u32,
        remaining: usize,
    },

    #[error("invalid waveform description: {0}")]
    InvalidWaveform(String),
}
