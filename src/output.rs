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

//! The output side of a media player: recording the played stream to disk.

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::PathBuf;

use log::{error, info};

use super::writer::{DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE};
use super::{AudioEncoding, WaveWriter, WriteResult};

/// What a player needs from an output that consumes raw samples.
pub trait AudioSink {
    fn set_channels(&mut self, num_channels: u16);
    fn set_sample_rate(&mut self, sample_rate: u32);
    fn set_encoding(&mut self, encoding: AudioEncoding);
    fn write(&mut self, buf: &[u8]) -> WriteResult<()>;
    fn close(&mut self) -> WriteResult<()>;
}

impl<T> AudioSink for WaveWriter<T>
where
    T: Seek + Write,
{
    fn set_channels(&mut self, num_channels: u16) {
        WaveWriter::set_channels(self, num_channels)
    }

    fn set_sample_rate(&mut self, sample_rate: u32) {
        WaveWriter::set_sample_rate(self, sample_rate)
    }

    fn set_encoding(&mut self, encoding: AudioEncoding) {
        WaveWriter::set_encoding(self, encoding)
    }

    fn write(&mut self, buf: &[u8]) -> WriteResult<()> {
        self.append(buf)
    }

    fn close(&mut self) -> WriteResult<()> {
        WaveWriter::close(self)
    }
}

/// Settings for [`DiskWriter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskWriterConfig {
    /// Directory the recordings go to. The working directory when unset.
    pub output_dir: Option<PathBuf>,
}

impl DiskWriterConfig {
    pub fn new() -> DiskWriterConfig {
        DiskWriterConfig::default()
    }

    pub fn with_output_dir<P: Into<PathBuf>>(mut self, output_dir: P) -> DiskWriterConfig {
        self.output_dir = Some(output_dir.into());
        self
    }

    /// Where the recording of `song_name` is written.
    pub fn output_path(&self, song_name: &str) -> PathBuf {
        let file_name = output_file_name(song_name);
        match self.output_dir {
            Some(ref dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }
}

/// Swaps the extension of `song_name` for ".wav" and replaces colons, which
/// aren't allowed in file names everywhere.
pub fn output_file_name(song_name: &str) -> String {
    let stem = match song_name.rfind('.') {
        Some(dot) => &song_name[..dot],
        None => song_name,
    };
    format!("{}.wav", stem).replace(':', "_")
}

/// Records the samples a player outputs into a wave file named after the
/// current song.
///
/// Stream parameters may be set before or during a recording; they end up in
/// the header written when the recording is closed.
#[derive(Debug)]
pub struct DiskWriter {
    config: DiskWriterConfig,
    num_channels: u16,
    sample_rate: u32,
    encoding: AudioEncoding,
    writer: Option<WaveWriter<BufWriter<File>>>,
}

impl DiskWriter {
    pub fn new(config: DiskWriterConfig) -> DiskWriter {
        DiskWriter {
            config,
            num_channels: DEFAULT_CHANNELS,
            sample_rate: DEFAULT_SAMPLE_RATE,
            encoding: AudioEncoding::default(),
            writer: None,
        }
    }

    pub fn config(&self) -> &DiskWriterConfig {
        &self.config
    }

    /// Starts recording `song_name`, finishing any recording in progress.
    /// Returns the path of the new file.
    pub fn start(&mut self, song_name: &str) -> WriteResult<PathBuf> {
        self.close()?;

        let path = self.config.output_path(song_name);
        let mut wave_writer = match WaveWriter::create(&path) {
            Ok(wave_writer) => wave_writer,
            Err(err) => {
                error!("unable to create file {}: {}", path.display(), err);
                return Err(err);
            }
        };
        wave_writer.set_channels(self.num_channels);
        wave_writer.set_sample_rate(self.sample_rate);
        wave_writer.set_encoding(self.encoding);

        info!("recording to {}", path.display());
        self.writer = Some(wave_writer);
        Ok(path)
    }

    pub fn is_recording(&self) -> bool {
        self.writer.is_some()
    }
}

impl Default for DiskWriter {
    fn default() -> DiskWriter {
        DiskWriter::new(DiskWriterConfig::default())
    }
}

impl AudioSink for DiskWriter {
    fn set_channels(&mut self, num_channels: u16) {
        self.num_channels = num_channels;
        if let Some(ref mut wave_writer) = self.writer {
            wave_writer.set_channels(num_channels);
        }
    }

    fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
        if let Some(ref mut wave_writer) = self.writer {
            wave_writer.set_sample_rate(sample_rate);
        }
    }

    fn set_encoding(&mut self, encoding: AudioEncoding) {
        self.encoding = encoding;
        if let Some(ref mut wave_writer) = self.writer {
            wave_writer.set_encoding(encoding);
        }
    }

    /// Appends to the current recording. Does nothing when not recording.
    fn write(&mut self, buf: &[u8]) -> WriteResult<()> {
        match self.writer {
            Some(ref mut wave_writer) => wave_writer.append(buf),
            None => Ok(()),
        }
    }

    /// Finishes the current recording, if any.
    fn close(&mut self) -> WriteResult<()> {
        match self.writer.take() {
            Some(mut wave_writer) => AudioSink::close(&mut wave_writer),
            None => Ok(()),
        }
    }
}
