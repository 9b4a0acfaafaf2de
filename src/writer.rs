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

use std::convert::TryFrom;
use std::fs::{File, OpenOptions};
use std::io;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;
use std::result;

use byteorder::{LittleEndian, WriteBytesExt};
use log::{debug, warn};
use thiserror::Error;

use super::{AudioEncoding, CANONICAL_HEADER_SIZE};

// MARK: Error types

/// Represents an error that occurred while writing a wave file.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The parameters or the amount of data can't be stored in a wave file.
    #[error("Format error: {0}")]
    Format(WriteErrorKind),
    /// An IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// The writer was closed before this call.
    #[error("the wave writer has been closed")]
    Closed,
}

/// Represents a result when writing a wave file.
pub type WriteResult<T> = result::Result<T, WriteError>;

/// Represents a file format error, when the header can't describe what was written.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WriteErrorKind {
    /// The sample data doesn't fit in the 32-bit size fields of the header.
    #[error("too much sample data for a wave file")]
    DataTooLarge,
    /// The block align or byte rate doesn't fit in its header field.
    #[error("block align or byte rate doesn't fit in the header")]
    HeaderFieldOverflow,
    /// Samples were passed in a different encoding than the writer is set to.
    #[error("samples written in a different encoding than the writer's")]
    SampleEncodingMismatch,
}

impl From<WriteErrorKind> for WriteError {
    fn from(kind: WriteErrorKind) -> WriteError {
        WriteError::Format(kind)
    }
}

// MARK: Writing functions

pub const DEFAULT_CHANNELS: u16 = 2;
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

// The RIFF size field stores the file size minus 8, and an odd data chunk
// gets one more byte of padding.
const MAX_BYTES_WRITTEN: u64 = u32::MAX as u64 + 7;

/// Helper struct that takes ownership of a writer and can be used to write data
/// to a PCM wave file.
///
/// The header is only written when the writer is closed, so the channel count,
/// sample rate and encoding may be changed at any point before that.
#[derive(Debug)]
pub struct WaveWriter<T>
where
    T: Seek + Write,
{
    num_channels: u16,
    sample_rate: u32,
    encoding: AudioEncoding,

    // Running size of the file, header included.
    bytes_written: u64,

    // The underlying writer. None once closed.
    writer: Option<T>,
}

impl<T> WaveWriter<T>
where
    T: Seek + Write,
{
    /// Returns a new wave writer for the given writer, leaving room for the
    /// header at its start.
    pub fn new(num_channels: u16,
               sample_rate: u32,
               encoding: AudioEncoding,
               mut writer: T)
               -> WriteResult<WaveWriter<T>> {
        writer.seek(SeekFrom::Start(CANONICAL_HEADER_SIZE))?;

        Ok(WaveWriter {
            num_channels,
            sample_rate,
            encoding,
            bytes_written: CANONICAL_HEADER_SIZE,
            writer: Some(writer),
        })
    }

    pub fn num_channels(&self) -> u16 {
        self.num_channels
    }

    pub fn set_channels(&mut self, num_channels: u16) {
        self.num_channels = num_channels;
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
    }

    pub fn encoding(&self) -> AudioEncoding {
        self.encoding
    }

    pub fn set_encoding(&mut self, encoding: AudioEncoding) {
        self.encoding = encoding;
    }

    /// The size of the file so far, header included.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }

    /// Appends raw sample bytes to the data chunk.
    pub fn append(&mut self, buf: &[u8]) -> WriteResult<()> {
        let writer = self.writer.as_mut().ok_or(WriteError::Closed)?;
        let total = self.bytes_written + buf.len() as u64;
        if total > MAX_BYTES_WRITTEN {
            return Err(WriteErrorKind::DataTooLarge.into());
        }
        // Bytes accepted before a failure are counted too.
        let mut remaining = buf;
        while !remaining.is_empty() {
            match writer.write(remaining) {
                Ok(0) => return Err(io::Error::from(io::ErrorKind::WriteZero).into()),
                Ok(n) => {
                    self.bytes_written += n as u64;
                    remaining = &remaining[n..];
                }
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    /// Appends signed 16-bit samples, stored little-endian.
    pub fn write_samples_as_i16(&mut self, samples: &[i16]) -> WriteResult<()> {
        if self.encoding != AudioEncoding::SignedPcm16Le {
            return Err(WriteErrorKind::SampleEncodingMismatch.into());
        }
        let mut buf = Vec::with_capacity(samples.len() * 2);
        for &sample in samples {
            buf.write_i16::<LittleEndian>(sample)?;
        }
        self.append(&buf)
    }

    /// Writes the header and releases the underlying writer. Closing twice
    /// does nothing.
    pub fn close(&mut self) -> WriteResult<()> {
        match self.writer.take() {
            Some(mut writer) => self.finalize(&mut writer),
            None => Ok(()),
        }
    }

    /// Writes the header and returns the underlying writer.
    pub fn finish(mut self) -> WriteResult<T> {
        let mut writer = self.writer.take().ok_or(WriteError::Closed)?;
        self.finalize(&mut writer)?;
        Ok(writer)
    }

    fn finalize(&self, writer: &mut T) -> WriteResult<()> {
        let bits_per_sample = self.encoding.bits_per_sample();
        let block_align = u16::try_from(u32::from(self.encoding.bytes_per_sample()) *
                                        u32::from(self.num_channels))
            .map_err(|_| WriteErrorKind::HeaderFieldOverflow)?;
        let byte_rate = self.sample_rate
            .checked_mul(u32::from(block_align))
            .ok_or(WriteErrorKind::HeaderFieldOverflow)?;

        let data_size = self.bytes_written - CANONICAL_HEADER_SIZE;
        let padding = data_size & 1;
        let riff_size = u32::try_from(self.bytes_written + padding - 8)
            .map_err(|_| WriteErrorKind::DataTooLarge)?;
        let data_size = u32::try_from(data_size).map_err(|_| WriteErrorKind::DataTooLarge)?;

        if padding == 1 {
            writer.write_all(&[0])?;
        }

        writer.seek(SeekFrom::Start(0))?;
        writer.write_all(b"RIFF")?;
        writer.write_u32::<LittleEndian>(riff_size)?;
        writer.write_all(b"WAVE")?;
        writer.write_all(b"fmt ")?;
        writer.write_u32::<LittleEndian>(16)?;
        writer.write_u16::<LittleEndian>(1)?;
        writer.write_u16::<LittleEndian>(self.num_channels)?;
        writer.write_u32::<LittleEndian>(self.sample_rate)?;
        writer.write_u32::<LittleEndian>(byte_rate)?;
        writer.write_u16::<LittleEndian>(block_align)?;
        writer.write_u16::<LittleEndian>(bits_per_sample)?;
        writer.write_all(b"data")?;
        writer.write_u32::<LittleEndian>(data_size)?;
        writer.flush()?;

        debug!("wrote wave header: {} channels, {} Hz, {} bits, {} data bytes",
               self.num_channels, self.sample_rate, bits_per_sample, data_size);
        Ok(())
    }
}

impl WaveWriter<BufWriter<File>> {
    /// Creates (or truncates) the file at `path` and returns a writer for
    /// 16-bit stereo at 44,100 samples per second.
    pub fn create<P: AsRef<Path>>(path: P) -> WriteResult<WaveWriter<BufWriter<File>>> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        debug!("creating wave file {}", path.display());
        WaveWriter::new(DEFAULT_CHANNELS,
                        DEFAULT_SAMPLE_RATE,
                        AudioEncoding::SignedPcm16Le,
                        BufWriter::new(file))
    }
}

impl<T> Drop for WaveWriter<T>
where
    T: Seek + Write,
{
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!("failed to finalize wave file: {}", err);
        }
    }
}

// MARK: Tests
