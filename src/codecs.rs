use std::fs::File;
use std::io::BufWriter;

use crate::prelude::*;
mod wav;
pub use wav::{Encoder, WaveInfo, inspect, inspect_file};

/// PCM stream parameters. `byte_rate` and `block_align` are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl Format {
    pub fn pcm(channels: u16, sample_rate: u32, bits_per_sample: u16) -> Self {
        Format {
            audio_format: FORMAT_PCM,
            channels,
            sample_rate,
            bits_per_sample,
        }
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.channels as u32 * self.bits_per_sample as u32 / 8
    }

    pub fn block_align(&self) -> u16 {
        self.channels * self.bits_per_sample / 8
    }
}

/// A fixed-width PCM sample. The width is a property of the type, so an
/// encoder checks it once when it is built instead of on every write.
pub trait Sample: Copy {
    const BITS: u16;

    fn write_le<W: Write>(self, writer: &mut W) -> std::io::Result<()>;
}

/// 8-bit PCM is unsigned, centred on 128.
impl Sample for u8 {
    const BITS: u16 = BIT_DEPTH_8;

    fn write_le<W: Write>(self, writer: &mut W) -> std::io::Result<()> {
        writer.write_u8(self)
    }
}

impl Sample for i16 {
    const BITS: u16 = BIT_DEPTH_16;

    fn write_le<W: Write>(self, writer: &mut W) -> std::io::Result<()> {
        writer.write_i16::<LittleEndian>(self)
    }
}

impl Sample for i32 {
    const BITS: u16 = BIT_DEPTH_32;

    fn write_le<W: Write>(self, writer: &mut W) -> std::io::Result<()> {
        writer.write_i32::<LittleEndian>(self)
    }
}

/// Signed 24-bit sample, three bytes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct I24(i32);

impl I24 {
    pub const MIN: i32 = -0x80_0000;
    pub const MAX: i32 = 0x7F_FFFF;

    /// `None` when `value` does not fit in 24 bits.
    pub fn new(value: i32) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(I24(value))
    }

    /// Keeps the low 24 bits.
    pub fn wrapping(value: i32) -> Self {
        I24((value << 8) >> 8)
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl Sample for I24 {
    const BITS: u16 = BIT_DEPTH_24;

    fn write_le<W: Write>(self, writer: &mut W) -> std::io::Result<()> {
        writer.write_i24::<LittleEndian>(self.0)
    }
}

/// Output of an encoder: appendable, seekable for the header patch, and
/// able to push its contents to stable storage.
pub trait Sink: Write + Seek {
    fn sync(&mut self) -> std::io::Result<()> {
        self.flush()
    }
}

impl Sink for File {
    fn sync(&mut self) -> std::io::Result<()> {
        self.flush()?;
        self.sync_all()
    }
}

impl<W: Sink> Sink for BufWriter<W> {
    fn sync(&mut self) -> std::io::Result<()> {
        self.flush()?;
        self.get_mut().sync()
    }
}

impl Sink for Cursor<Vec<u8>> {}

impl Sink for Cursor<&mut Vec<u8>> {}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn sync(&mut self) -> std::io::Result<()> {
        (**self).sync()
    }
}
