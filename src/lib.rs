// wav-codec -- Reading and writing canonical PCM wave files.
// Copyright (c) 2016 Kevin Brothaler and the riff-wave project authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Reading and writing canonical PCM wave files.
//!
//! The library walks the RIFF chunks of a wave file to find its "fmt " and
//! "data" subchunks, exposes the playback parameters stored there and gives
//! sequential and seekable access to the raw sample bytes. The writer does the
//! reverse: it reserves room for the canonical 44-byte header, accepts raw
//! sample bytes and fills in the header sizes once writing is done.
//!
//! Only uncompressed PCM is supported, with 8-bit unsigned or 16-bit signed
//! little-endian samples. Extended ("WAVE_FORMAT_EXTENSIBLE") and compressed
//! files are rejected with a format error.
//!
//! On top of the codec, [`input::WaveInput`] and [`output::DiskWriter`] model
//! the two sides of a media player: the currently playing file, and a sink
//! that records whatever is being played into a wave file on disk.
//!
//! # The wave file format
//!
//! The wave file format starts with the RIFF file header:
//!
//! Offset | Size | Data       |    Description
//! -----: | ---: | ---------- | ----------------------------------------------
//!      0 |    4 | "RIFF"     | Identifies the main chunk.
//!      4 |    4 | chunk size | The size of the rest of the file. This should be equal to the size of the file minus 8 bytes.
//!      8 |    4 | "WAVE"     | Indicates that this is a wave file.
//!
//! Every chunk after that starts with a 4-byte tag and a 4-byte little-endian
//! size. If the size is odd, a single padding byte follows the chunk body.
//!
//! ## The "fmt " subchunk
//!
//! Offset | Size | Data            | Description
//! -----: | ---: | --------------- | -----------------------------------------
//!     12 |    4 | "fmt "          | Identifies this subchunk.
//!     16 |    4 | subchunk size   | The size of the rest of this subchunk, at least 16.
//!     20 |    2 | format (1)      | The format of the wave data, which will be 1 for uncompressed PCM data.
//!     22 |    2 | num channels    | Indicates if the data is mono, stereo, or something else.
//!     24 |    4 | sample rate     | The sample rate per second.
//!     28 |    4 | byte rate       | The total byte rate per second. Used to convert between seconds and byte offsets.
//!     32 |    2 | block align     | How many bytes are needed for each "frame", where a frame is one sample for each channel.
//!     34 |    2 | bits per sample | 8 for unsigned samples, 16 for signed little-endian samples.
//!
//! ## The "data" subchunk
//!
//! Offset | Size | Data            | Description
//! -----: | ---: | --------------- | -----------------------------------------
//! 36+    |    4 | "data"          | Identifies this subchunk
//! 40+    |    4 | subchunk size   | The length of the audio data in bytes.
//! 44+    |  ... | audio data      | This stores the actual audio data.
//!
//! Other chunks such as "LIST", "fact" or "JUNK" may appear before the "data"
//! subchunk. They are skipped by size without being interpreted.

use std::cmp;
use std::fs::File;
use std::io;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::result;

use byteorder::{ByteOrder, LittleEndian};
use log::{debug, warn};
use thiserror::Error;

#[cfg(test)]
#[macro_use]
mod test_utils;

mod info;
pub mod input;
pub mod output;
mod writer;

pub use info::WaveInfo;
pub use writer::{WaveWriter, WriteError, WriteErrorKind, WriteResult};

// MARK: Error types

/// Represents an error that occurred while reading a wave file.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The file format is incorrect or unsupported.
    #[error("Format error: {0}")]
    Format(FormatErrorKind),
    /// An IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// The reader was closed before this call.
    #[error("the wave reader has been closed")]
    Closed,
}

/// Represents a result when reading a wave file.
pub type ReadResult<T> = result::Result<T, ReadError>;

/// Represents a file format error, when the wave file is incorrect or unsupported.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FormatErrorKind {
    /// The file does not start with "RIFF", a chunk size and "WAVE".
    #[error("not a RIFF WAVE file")]
    NotAWaveFile,
    /// The "data" subchunk was found before any "fmt " subchunk.
    #[error("no fmt_ chunk before the data chunk")]
    NoFormatChunk,
    /// The file ended without a "data" subchunk.
    #[error("no data chunk")]
    NoDataChunk,
    /// This file is not an uncompressed PCM wave file.
    #[error("not an uncompressed PCM wave file (format {0})")]
    UnsupportedFormat(u16),
    /// Only 8-bit and 16-bit PCM files are supported.
    #[error("unsupported bits per sample: {0}")]
    UnsupportedBitsPerSample(u16),
    /// The "fmt " subchunk is missing header data and can't be parsed.
    #[error("fmt_ chunk is too short")]
    FmtChunkTooShort,
    /// The byte rate is zero, so durations and seek offsets can't be computed.
    #[error("byte rate is zero")]
    ByteRateIsZero,
    /// Samples were requested in a different encoding than the file uses.
    #[error("samples requested in a different encoding than the file's")]
    SampleEncodingMismatch,
}

impl From<FormatErrorKind> for ReadError {
    fn from(kind: FormatErrorKind) -> ReadError {
        ReadError::Format(kind)
    }
}

// MARK: Format types

const RIFF_TAG: &[u8; 4] = b"RIFF";
const WAVE_TAG: &[u8; 4] = b"WAVE";
const FMT_TAG: &[u8; 4] = b"fmt ";
const DATA_TAG: &[u8; 4] = b"data";

const FORMAT_UNCOMPRESSED_PCM: u16 = 1;

/// Length of the PCM body of a "fmt " subchunk.
const FMT_BODY_SIZE: u32 = 16;

/// Size of the canonical header written in front of the sample data.
pub const CANONICAL_HEADER_SIZE: u64 = 44;

/// Sample encodings supported by this library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEncoding {
    /// 8-bit unsigned samples.
    UnsignedPcm8,
    /// 16-bit signed little-endian samples.
    SignedPcm16Le,
}

impl AudioEncoding {
    /// Maps a "bits per sample" header value to an encoding.
    pub fn from_bits_per_sample(bits_per_sample: u16) -> Option<AudioEncoding> {
        match bits_per_sample {
            8 => Some(AudioEncoding::UnsignedPcm8),
            16 => Some(AudioEncoding::SignedPcm16Le),
            _ => None,
        }
    }

    pub fn bits_per_sample(self) -> u16 {
        match self {
            AudioEncoding::UnsignedPcm8 => 8,
            AudioEncoding::SignedPcm16Le => 16,
        }
    }

    pub fn bytes_per_sample(self) -> u16 {
        self.bits_per_sample() / 8
    }
}

impl Default for AudioEncoding {
    fn default() -> AudioEncoding {
        AudioEncoding::SignedPcm16Le
    }
}

/// The fields of a PCM "fmt " subchunk, as stored in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub audio_format: u16,
    pub num_channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

impl PcmFormat {
    fn from_bytes(body: &[u8; FMT_BODY_SIZE as usize]) -> PcmFormat {
        PcmFormat {
            audio_format: LittleEndian::read_u16(&body[0..2]),
            num_channels: LittleEndian::read_u16(&body[2..4]),
            sample_rate: LittleEndian::read_u32(&body[4..8]),
            byte_rate: LittleEndian::read_u32(&body[8..12]),
            block_align: LittleEndian::read_u16(&body[12..14]),
            bits_per_sample: LittleEndian::read_u16(&body[14..16]),
        }
    }
}

// MARK: Validation and parsing functions

fn validate_pcm_format(format: &PcmFormat) -> ReadResult<AudioEncoding> {
    if format.audio_format != FORMAT_UNCOMPRESSED_PCM {
        return Err(FormatErrorKind::UnsupportedFormat(format.audio_format).into());
    }

    let encoding = AudioEncoding::from_bits_per_sample(format.bits_per_sample)
        .ok_or(FormatErrorKind::UnsupportedBitsPerSample(format.bits_per_sample))?;

    if format.byte_rate == 0 {
        return Err(FormatErrorKind::ByteRateIsZero.into());
    }

    Ok(encoding)
}

/// Chunk bodies are padded to an even length.
fn padded_size(size: u32) -> u64 {
    u64::from(size) + u64::from(size & 1)
}

/// Like `read_exact`, but reports running out of input as `Ok(false)`.
fn read_exact_or_eof<R>(reader: &mut R, buf: &mut [u8]) -> io::Result<bool>
where
    R: Read + ?Sized,
{
    match reader.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(ref err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(err) => Err(err),
    }
}

/// One step of a walk over the chunks of a wave file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chunk {
    /// A "fmt " subchunk. Its body has been consumed.
    Format(PcmFormat),
    /// A "data" subchunk. Its body has not been consumed; `offset` is where
    /// the sample data begins.
    Data { size: u32, offset: u64 },
    /// Any other subchunk. Its body has been skipped.
    Other { id: [u8; 4], size: u32 },
    /// The source ran out before another chunk header could be read.
    EndOfStream,
}

/// Chunk-level parsing for any seekable byte source.
pub trait ReadWaveExt: Read + Seek {
    /// Validates the "RIFF????WAVE" preamble and returns the RIFF chunk size.
    fn read_riff_preamble(&mut self) -> ReadResult<u32> {
        let mut preamble = [0u8; 12];
        if !read_exact_or_eof(self, &mut preamble)? {
            return Err(FormatErrorKind::NotAWaveFile.into());
        }
        if &preamble[0..4] != RIFF_TAG || &preamble[8..12] != WAVE_TAG {
            return Err(FormatErrorKind::NotAWaveFile.into());
        }
        // The size isn't validated, so that files with an incorrect RIFF
        // size can still be read.
        Ok(LittleEndian::read_u32(&preamble[4..8]))
    }

    /// Reads the next chunk header and handles the chunk according to its tag.
    fn next_chunk(&mut self) -> ReadResult<Chunk> {
        let mut header = [0u8; 8];
        if !read_exact_or_eof(self, &mut header)? {
            return Ok(Chunk::EndOfStream);
        }

        let mut id = [0u8; 4];
        id.copy_from_slice(&header[0..4]);
        let size = LittleEndian::read_u32(&header[4..8]);

        if &id == DATA_TAG {
            let offset = self.seek(SeekFrom::Current(0))?;
            Ok(Chunk::Data { size, offset })
        } else if &id == FMT_TAG {
            if size < FMT_BODY_SIZE {
                return Err(FormatErrorKind::FmtChunkTooShort.into());
            }
            let mut body = [0u8; FMT_BODY_SIZE as usize];
            if !read_exact_or_eof(self, &mut body)? {
                return Err(FormatErrorKind::FmtChunkTooShort.into());
            }
            if size > FMT_BODY_SIZE {
                debug!("skipping {} extra bytes of fmt_ chunk", size - FMT_BODY_SIZE);
            }
            self.skip_over_remainder(u64::from(FMT_BODY_SIZE), padded_size(size))?;
            Ok(Chunk::Format(PcmFormat::from_bytes(&body)))
        } else {
            debug!("skipping {:?} chunk of {} bytes", String::from_utf8_lossy(&id), size);
            self.skip_over_remainder(0, padded_size(size))?;
            Ok(Chunk::Other { id, size })
        }
    }

    fn skip_over_remainder(&mut self, read_so_far: u64, size: u64) -> ReadResult<()> {
        if read_so_far < size {
            let remainder = size - read_so_far;
            // Seeking past the end is fine, the next header read reports
            // the end of the stream.
            self.seek(SeekFrom::Current(remainder as i64))?;
        }
        Ok(())
    }
}

impl<T> ReadWaveExt for T where T: Read + Seek {}

// MARK: Reading

/// Helper struct that takes ownership of a reader and can be used to read data
/// from a PCM wave file.
#[derive(Debug)]
pub struct WaveReader<T>
where
    T: Read + Seek,
{
    ///  Represents the PCM format for this wave file.
    pub pcm_format: PcmFormat,

    encoding: AudioEncoding,

    // The size field of the RIFF header, i.e. the declared file size minus 8.
    riff_size: u32,

    // The byte offset in the file where the actual wave data begins (should be
    // 8 bytes after the beginning of the data subchunk).
    data_begin: u64,

    // The byte offset in the file where the wave data ends. If the subchunk size
    // is larger than the file, reads will come up short before reaching data_end.
    data_end: u64,

    // The current data position, in bytes.
    current_data_offset: u64,

    // A seek target in seconds, applied by the next read.
    pending_seek: Option<u32>,

    current_time: u32,

    source_exhausted: bool,

    path: Option<PathBuf>,

    // The underlying reader that we'll use to read data. None once closed.
    reader: Option<T>,
}

impl<T> WaveReader<T>
where
    T: Read + Seek,
{
    /// Returns a new wave reader for the given reader.
    pub fn new(mut reader: T) -> ReadResult<WaveReader<T>> {
        let riff_size = reader.read_riff_preamble()?;

        let mut pcm_format = None;
        let (data_size, data_begin) = loop {
            match reader.next_chunk()? {
                Chunk::Format(format) => pcm_format = Some(format),
                Chunk::Data { size, offset } => break (size, offset),
                Chunk::Other { .. } => {}
                Chunk::EndOfStream => return Err(FormatErrorKind::NoDataChunk.into()),
            }
        };

        let pcm_format = pcm_format.ok_or(FormatErrorKind::NoFormatChunk)?;
        let encoding = validate_pcm_format(&pcm_format)?;

        Ok(WaveReader {
            pcm_format,
            encoding,
            riff_size,
            data_begin,
            data_end: data_begin + u64::from(data_size),
            current_data_offset: data_begin,
            pending_seek: None,
            current_time: 0,
            source_exhausted: false,
            path: None,
            reader: Some(reader),
        })
    }

    /// Reads up to `buf.len()` bytes of sample data.
    ///
    /// The whole buffer is zeroed first, so a short read leaves silence in the
    /// tail. Returns the number of bytes copied from the file, which is zero
    /// once the data chunk (or the file) is exhausted.
    ///
    /// An odd-sized read on a 16-bit file leaves later `read_samples_as_i16`
    /// calls one byte out of sample alignment.
    pub fn read(&mut self, buf: &mut [u8]) -> ReadResult<usize> {
        let reader = self.reader.as_mut().ok_or(ReadError::Closed)?;
        let byte_rate = u64::from(self.pcm_format.byte_rate);

        if let Some(seconds) = self.pending_seek.take() {
            let target = cmp::min(self.data_begin + u64::from(seconds) * byte_rate,
                                  self.data_end);
            debug!("seeking to {} s (byte {})", seconds, target);
            reader.seek(SeekFrom::Start(target))?;
            self.current_data_offset = target;
            self.source_exhausted = false;
        }

        for b in buf.iter_mut() {
            *b = 0;
        }

        let remaining = self.data_end - self.current_data_offset;
        let wanted = cmp::min(buf.len() as u64, remaining) as usize;
        let mut filled = 0;
        let mut failure = None;
        while filled < wanted {
            match reader.read(&mut buf[filled..wanted]) {
                Ok(0) => {
                    if !self.source_exhausted {
                        warn!("wave data ends {} bytes before the end of the data chunk",
                              self.data_end - self.current_data_offset - filled as u64);
                        self.source_exhausted = true;
                    }
                    break;
                }
                Ok(n) => filled += n,
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        // Bytes consumed before a failure are counted too.
        self.current_data_offset += filled as u64;
        self.current_time = ((self.current_data_offset - self.data_begin) / byte_rate) as u32;
        match failure {
            Some(err) => Err(err.into()),
            None => Ok(filled),
        }
    }

    /// Reads several samples as unsigned 8-bit values. Returns the number of
    /// samples read.
    pub fn read_samples_as_u8(&mut self, buf: &mut [u8]) -> ReadResult<usize> {
        self.expect_encoding(AudioEncoding::UnsignedPcm8)?;
        self.read(buf)
    }

    /// Reads several samples as signed 16-bit values. Returns the number of
    /// samples read. A trailing half sample at the end of a truncated file is
    /// dropped.
    pub fn read_samples_as_i16(&mut self, buf: &mut [i16]) -> ReadResult<usize> {
        self.expect_encoding(AudioEncoding::SignedPcm16Le)?;
        let mut bytes = vec![0u8; buf.len() * 2];
        let read = self.read(&mut bytes)?;
        let samples = read / 2;
        LittleEndian::read_i16_into(&bytes[..samples * 2], &mut buf[..samples]);
        for out in &mut buf[samples..] {
            *out = 0;
        }
        Ok(samples)
    }

    fn expect_encoding(&self, encoding: AudioEncoding) -> ReadResult<()> {
        if self.encoding != encoding {
            return Err(FormatErrorKind::SampleEncodingMismatch.into());
        }
        Ok(())
    }

    /// Requests a seek to `seconds` from the start of the audio data. The
    /// position only changes on the next call to `read`.
    pub fn seek(&mut self, seconds: u32) -> ReadResult<()> {
        if self.reader.is_none() {
            return Err(ReadError::Closed);
        }
        self.pending_seek = Some(seconds);
        Ok(())
    }

    /// The playback position in whole seconds, as of the last read.
    pub fn current_time(&self) -> u32 {
        self.current_time
    }

    /// The length of the audio data in whole seconds.
    pub fn duration(&self) -> u32 {
        (self.data_size() / u64::from(self.pcm_format.byte_rate)) as u32
    }

    pub fn encoding(&self) -> AudioEncoding {
        self.encoding
    }

    /// The byte offset of the first sample in the file.
    pub fn data_offset(&self) -> u64 {
        self.data_begin
    }

    /// The declared length of the sample data in bytes.
    pub fn data_size(&self) -> u64 {
        self.data_end - self.data_begin
    }

    /// The path this reader was opened from, if it was opened with `open`.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref().map(|p| p.as_path())
    }

    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }

    /// Summarizes the parameters of this file.
    pub fn describe(&self) -> WaveInfo {
        WaveInfo {
            channels: self.pcm_format.num_channels,
            sample_rate: self.pcm_format.sample_rate,
            encoding: self.encoding,
            duration_seconds: self.duration(),
            file_size: u64::from(self.riff_size) + 8,
            byte_rate: self.pcm_format.byte_rate,
            block_align: self.pcm_format.block_align,
            bits_per_sample: self.pcm_format.bits_per_sample,
        }
    }

    /// Releases the underlying reader. Closing twice does nothing.
    pub fn close(&mut self) {
        if self.reader.take().is_some() {
            debug!("closed wave reader");
        }
        self.pending_seek = None;
        self.current_time = 0;
    }
}

impl WaveReader<BufReader<File>> {
    /// Opens the wave file at `path` and parses its header.
    pub fn open<P: AsRef<Path>>(path: P) -> ReadResult<WaveReader<BufReader<File>>> {
        let path = path.as_ref();
        debug!("opening wave file {}", path.display());
        let file = File::open(path)?;
        let mut wave_reader = WaveReader::new(BufReader::new(file))?;
        wave_reader.path = Some(path.to_path_buf());
        Ok(wave_reader)
    }
}

/// Returns the duration in seconds of the wave file at `path` without keeping
/// it open.
pub fn inspect<P: AsRef<Path>>(path: P) -> ReadResult<u32> {
    Ok(inspect_info(path)?.duration_seconds)
}

/// Returns a summary of the wave file at `path` without keeping it open.
pub fn inspect_info<P: AsRef<Path>>(path: P) -> ReadResult<WaveInfo> {
    let wave_reader = WaveReader::open(path)?;
    Ok(wave_reader.describe())
}

// MARK: Tests
