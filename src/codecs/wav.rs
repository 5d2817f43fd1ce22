use std::fs::File;
use std::io::BufWriter;
use std::marker::PhantomData;
use std::path::Path;

use log::{debug, trace, warn};

use crate::codecs::{Format, Sample, Sink};
use crate::prelude::*;

// Header layout
const HEADER_SIZE: usize = 44;
const RIFF_SIZE_OFFSET: u64 = 4;
const DATA_SIZE_OFFSET: u64 = 40;
const CHUNK_HEADER_SIZE: usize = 8;
// RIFF size before data and metadata are counted
const RIFF_SIZE_BASE: u64 = 32;

const STANDARD_FMT_CHUNK_SIZE: u32 = 16;

/// Streaming PCM WAVE writer.
///
/// The 44 byte header is written on the first write with zeroed size fields,
/// samples are appended as they arrive, and [`Encoder::close`] appends the
/// LIST/INFO chunk and patches the RIFF and data sizes in place.
///
/// `S` fixes the sample width; it must match `format.bits_per_sample`.
#[derive(Debug)]
pub struct Encoder<S: Sample, W: Sink> {
    sink: W,

    audio_format: u16,
    channels: u16,
    sample_rate: u32,
    byte_rate: u32,
    block_align: u16,
    bits_per_sample: u16,

    samples: u64,
    data_bytes: u64,
    header_written: bool,
    info: InfoList,
    _sample: PhantomData<S>,
}

impl<S: Sample> Encoder<S, BufWriter<File>> {
    /// Creates (or truncates) `path` and encodes into it.
    pub fn create<P: AsRef<Path>>(path: P, format: Format) -> Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file), format)
    }
}

impl<S: Sample, W: Sink> Encoder<S, W> {
    pub fn new(sink: W, format: Format) -> Result<Self> {
        if format.bits_per_sample != S::BITS {
            return Err(WaveError::SampleWidthMismatch {
                expected: format.bits_per_sample,
                actual: S::BITS,
            });
        }
        if format.channels == 0 {
            return Err(WaveError::NoChannels);
        }

        Ok(Encoder {
            sink,
            audio_format: format.audio_format,
            channels: format.channels,
            sample_rate: format.sample_rate,
            byte_rate: format.byte_rate(),
            block_align: format.block_align(),
            bits_per_sample: format.bits_per_sample,
            samples: 0,
            data_bytes: 0,
            header_written: false,
            info: InfoList::new(),
            _sample: PhantomData,
        })
    }

    pub fn format(&self) -> Format {
        Format {
            audio_format: self.audio_format,
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bits_per_sample,
        }
    }

    pub fn byte_rate(&self) -> u32 {
        self.byte_rate
    }

    pub fn block_align(&self) -> u16 {
        self.block_align
    }

    /// Samples written so far, counted per channel.
    pub fn samples_written(&self) -> u64 {
        self.samples
    }

    /// Queues metadata entries. They are only serialized by [`Encoder::close`].
    pub fn add_info<I: IntoIterator<Item = Info>>(&mut self, info: I) {
        self.info.extend(info);
    }

    /// Writes one channel's sample of one frame.
    pub fn write_sample(&mut self, sample: S) -> Result<()> {
        let len = (S::BITS / 8) as u64;
        self.check_size(len)?;
        self.ensure_header()?;
        sample.write_le(&mut self.sink)?;
        self.samples += 1;
        self.data_bytes += len;
        Ok(())
    }

    /// Writes already encoded, interleaved little-endian samples. The buffer
    /// must hold whole frames.
    pub fn write_raw(&mut self, data: &[u8]) -> Result<usize> {
        let bits = data.len() * 8;
        let frame_bits = self.bits_per_sample as u32 * self.channels as u32;
        if bits % frame_bits as usize != 0 {
            return Err(WaveError::FrameMisaligned {
                len: data.len(),
                frame_bits,
            });
        }

        self.check_size(data.len() as u64)?;

        self.ensure_header()?;
        self.sink.write_all(data)?;
        self.samples += (bits / self.bits_per_sample as usize) as u64;
        self.data_bytes += data.len() as u64;
        Ok(data.len())
    }

    /// Finishes the stream and hands the sink back.
    ///
    /// Fails without touching the sink if the sample count is not a whole
    /// number of frames, or if the metadata would push the stream past the
    /// 32-bit RIFF size limit.
    pub fn close(mut self) -> Result<W> {
        if self.samples % self.channels as u64 != 0 {
            warn!(
                "refusing to close: {} samples for {} channels",
                self.samples, self.channels
            );
            return Err(WaveError::IncompleteFrame {
                samples: self.samples,
                channels: self.channels,
            });
        }

        self.ensure_header()?;
        let meta_size = self.write_meta()?;
        self.write_header(meta_size)?;
        self.sink.sync()?;
        debug!(
            "closed stream: {} samples, {} metadata bytes",
            self.samples, meta_size
        );
        Ok(self.sink)
    }

    fn ensure_header(&mut self) -> Result<()> {
        if !self.header_written {
            self.write_header(0)?;
        }
        Ok(())
    }

    /// Fails if appending `extra` bytes would overflow the RIFF size field.
    fn check_size(&self, extra: u64) -> Result<()> {
        let size = RIFF_SIZE_BASE + self.data_bytes + extra;
        if size > u32::MAX as u64 {
            return Err(WaveError::SizeLimitExceeded { size });
        }
        Ok(())
    }

    /// Writes the full header the first time, patches the two size fields
    /// on every later call and returns to the end of the stream.
    fn write_header(&mut self, meta_size: u32) -> Result<()> {
        let size = RIFF_SIZE_BASE + self.data_bytes + meta_size as u64;
        let riff_size =
            u32::try_from(size).map_err(|_| WaveError::SizeLimitExceeded { size })?;
        // data_bytes <= riff_size, so this cannot fail
        let data_size = self.data_bytes as u32;

        if self.header_written {
            debug!("patching header: riff size {riff_size}, data size {data_size}");
            self.sink.seek(SeekFrom::Start(RIFF_SIZE_OFFSET))?;
            self.sink.write_u32::<LittleEndian>(riff_size)?;
            self.sink.seek(SeekFrom::Start(DATA_SIZE_OFFSET))?;
            self.sink.write_u32::<LittleEndian>(data_size)?;
            self.sink.seek(SeekFrom::End(0))?;
            return Ok(());
        }

        let mut header = Vec::with_capacity(HEADER_SIZE);
        header.write_all(Marker::RIFF.as_bytes())?;
        header.write_u32::<LittleEndian>(riff_size)?;
        header.write_all(Marker::WAVE.as_bytes())?;

        // ---- fmt chunk ----
        header.write_all(Marker::FMT.as_bytes())?;
        header.write_u32::<LittleEndian>(STANDARD_FMT_CHUNK_SIZE)?;
        header.write_u16::<LittleEndian>(self.audio_format)?;
        header.write_u16::<LittleEndian>(self.channels)?;
        header.write_u32::<LittleEndian>(self.sample_rate)?;
        header.write_u32::<LittleEndian>(self.byte_rate)?;
        header.write_u16::<LittleEndian>(self.block_align)?;
        header.write_u16::<LittleEndian>(self.bits_per_sample)?;

        // ---- data chunk ----
        header.write_all(Marker::DATA.as_bytes())?;
        header.write_u32::<LittleEndian>(data_size)?;

        self.sink.write_all(&header)?;
        self.header_written = true;
        debug!(
            "wrote header: {} ch, {} Hz, {} bits",
            self.channels, self.sample_rate, self.bits_per_sample
        );
        Ok(())
    }

    /// Appends the LIST/INFO chunk and returns the number of bytes written.
    fn write_meta(&mut self) -> Result<u32> {
        if !self.info.contains(Marker::ISFT) {
            self.info.push(Info::new(Marker::ISFT, SOFTWARE));
        }
        let payload = self.info.encode()?;
        if payload.is_empty() {
            return Ok(0);
        }

        let size = CHUNK_HEADER_SIZE + payload.len();
        self.check_size(size as u64)?;

        let mut chunk = Vec::with_capacity(size);
        chunk.write_all(Marker::LIST.as_bytes())?;
        chunk.write_u32::<LittleEndian>(payload.len() as u32)?;
        chunk.write_all(&payload)?;

        self.sink.write_all(&chunk)?;
        Ok(chunk.len() as u32)
    }
}

/// Byte-level writes go through [`Encoder::write_raw`].
impl<S: Sample, W: Sink> Write for Encoder<S, W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.write_raw(buf).map_err(|e| match e {
            WaveError::Io(e) => e,
            other => std::io::Error::new(std::io::ErrorKind::InvalidInput, other),
        })
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.sink.flush()
    }
}

/// What [`inspect`] found in a finished stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveInfo {
    pub format: Format,
    pub riff_size: u32,
    pub data_size: u32,
    pub info: InfoList,
}

impl WaveInfo {
    /// Samples per channel.
    pub fn frames(&self) -> u32 {
        match self.format.block_align() {
            0 => 0,
            align => self.data_size / align as u32,
        }
    }
}

pub fn inspect_file<P: AsRef<Path>>(path: P) -> Result<WaveInfo> {
    let file = File::open(path)?;
    let mapped_file = unsafe { memmap2::MmapOptions::new().map(&file)? };
    inspect(&mapped_file)
}

/// Walks the chunks of a stream written by [`Encoder`], reading `fmt `,
/// the `data` size and a `LIST/INFO` chunk if present. Sample data is
/// skipped, other chunks are ignored.
pub fn inspect(input: &[u8]) -> Result<WaveInfo> {
    if input.len() < 12 {
        return Err(WaveError::NotRiffWave);
    }
    let mut cursor = Cursor::new(input);
    if Marker::read_from(&mut cursor)? != Marker::RIFF {
        return Err(WaveError::NotRiffWave);
    }
    let riff_size = cursor.read_u32::<LittleEndian>()?;
    if Marker::read_from(&mut cursor)? != Marker::WAVE {
        return Err(WaveError::NotRiffWave);
    }

    let mut format = None;
    let mut data_size = None;
    let mut info = InfoList::new();

    while input.len() - cursor.position() as usize >= CHUNK_HEADER_SIZE {
        let marker = Marker::read_from(&mut cursor)?;
        let chunk_size = cursor.read_u32::<LittleEndian>()?;
        let start = cursor.position() as usize;
        let remaining = input.len() - start;
        trace!("chunk '{marker}' at {start}, {chunk_size} bytes");

        match marker {
            // Data is allowed to run short: a stream that was never closed
            // still carries a zero size here.
            Marker::DATA => {
                data_size = Some(chunk_size);
                let skip = (chunk_size as usize).min(remaining);
                cursor.set_position((start + skip) as u64);
                continue;
            }
            _ if chunk_size as usize > remaining => {
                return Err(WaveError::TruncatedChunk {
                    marker,
                    len: chunk_size,
                    remaining,
                });
            }
            Marker::FMT => {
                if chunk_size < STANDARD_FMT_CHUNK_SIZE {
                    return Err(WaveError::TruncatedChunk {
                        marker,
                        len: STANDARD_FMT_CHUNK_SIZE,
                        remaining: chunk_size as usize,
                    });
                }
                let audio_format = cursor.read_u16::<LittleEndian>()?;
                let channels = cursor.read_u16::<LittleEndian>()?;
                let sample_rate = cursor.read_u32::<LittleEndian>()?;
                cursor.read_u32::<LittleEndian>()?; // byte rate
                cursor.read_u16::<LittleEndian>()?; // block align
                let bits_per_sample = cursor.read_u16::<LittleEndian>()?;
                format = Some(Format {
                    audio_format,
                    channels,
                    sample_rate,
                    bits_per_sample,
                });
            }
            Marker::LIST => {
                let payload = &input[start..start + chunk_size as usize];
                if payload.starts_with(Marker::INFO.as_bytes()) {
                    info.extend(InfoList::decode(payload)?);
                }
            }
            _ => {}
        }
        cursor.set_position((start + chunk_size as usize) as u64);
    }

    Ok(WaveInfo {
        format: format.ok_or(WaveError::MissingChunk(Marker::FMT))?,
        riff_size,
        data_size: data_size.ok_or(WaveError::MissingChunk(Marker::DATA))?,
        info,
    })
}
