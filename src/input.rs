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

//! The input side of a media player: one playing file plus library lookups.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use log::info;

use super::{inspect, inspect_info, AudioEncoding, ReadResult, WaveInfo, WaveReader};

/// What a playback driver needs from an open audio file.
pub trait AudioSource {
    /// Fills `buf` with sample bytes, returning how many came from the file.
    fn read(&mut self, buf: &mut [u8]) -> ReadResult<usize>;
    /// Moves playback to `seconds` from the start.
    fn seek(&mut self, seconds: u32) -> ReadResult<()>;
    fn current_time(&self) -> u32;
    fn describe(&self) -> WaveInfo;
    fn close(&mut self);
}

impl<T> AudioSource for WaveReader<T>
where
    T: Read + Seek,
{
    fn read(&mut self, buf: &mut [u8]) -> ReadResult<usize> {
        WaveReader::read(self, buf)
    }

    fn seek(&mut self, seconds: u32) -> ReadResult<()> {
        WaveReader::seek(self, seconds)
    }

    fn current_time(&self) -> u32 {
        WaveReader::current_time(self)
    }

    fn describe(&self) -> WaveInfo {
        WaveReader::describe(self)
    }

    fn close(&mut self) {
        WaveReader::close(self)
    }
}

/// File extensions handled by [`WaveInput`].
pub const FORMATS: &[&str] = &["wav"];

/// Holds the wave file that is currently playing, if any.
///
/// Length and info lookups for the playing file are answered from the open
/// reader instead of parsing the file again.
#[derive(Default)]
pub struct WaveInput {
    playing: Option<WaveReader<BufReader<File>>>,
}

impl WaveInput {
    pub fn new() -> WaveInput {
        WaveInput { playing: None }
    }

    pub fn formats(&self) -> &'static [&'static str] {
        FORMATS
    }

    /// Starts playing `path`, ending whatever was playing before.
    pub fn start<P: AsRef<Path>>(&mut self, path: P) -> ReadResult<()> {
        self.end();
        let wave_reader = WaveReader::open(path.as_ref())?;
        info!("playing {}", path.as_ref().display());
        self.playing = Some(wave_reader);
        Ok(())
    }

    pub fn end(&mut self) {
        if let Some(mut wave_reader) = self.playing.take() {
            wave_reader.close();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing.is_some()
    }

    /// The playing file as seen by a playback driver.
    pub fn source(&mut self) -> Option<&mut dyn AudioSource> {
        self.playing.as_mut().map(|r| r as &mut dyn AudioSource)
    }

    /// Reads the next block of samples. Returns 0 when nothing is playing.
    pub fn get_stream(&mut self, buf: &mut [u8]) -> ReadResult<usize> {
        match self.source() {
            Some(source) => source.read(buf),
            None => Ok(0),
        }
    }

    /// Seeks the playing file. Ignored when nothing is playing.
    pub fn seek(&mut self, seconds: u32) -> ReadResult<()> {
        match self.source() {
            Some(source) => source.seek(seconds),
            None => Ok(()),
        }
    }

    /// Channels, sample rate and encoding of the playing file.
    pub fn audio_params(&self) -> Option<(u16, u32, AudioEncoding)> {
        self.playing.as_ref().map(|r| {
            (r.pcm_format.num_channels, r.pcm_format.sample_rate, r.encoding())
        })
    }

    pub fn cur_time(&self) -> u32 {
        self.playing.as_ref().map_or(0, |r| r.current_time())
    }

    /// The length of `path` in seconds.
    pub fn get_len<P: AsRef<Path>>(&self, path: P) -> ReadResult<u32> {
        match self.playing_at(path.as_ref()) {
            Some(wave_reader) => Ok(wave_reader.duration()),
            None => inspect(path),
        }
    }

    /// A summary of `path` for the media library.
    pub fn get_info<P: AsRef<Path>>(&self, path: P) -> ReadResult<WaveInfo> {
        match self.playing_at(path.as_ref()) {
            Some(wave_reader) => Ok(wave_reader.describe()),
            None => inspect_info(path),
        }
    }

    fn playing_at(&self, path: &Path) -> Option<&WaveReader<BufReader<File>>> {
        self.playing.as_ref().filter(|r| r.path() == Some(path))
    }
}
