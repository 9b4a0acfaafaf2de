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

use std::fmt;

use super::AudioEncoding;

/// A summary of a wave file, as shown in a media library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveInfo {
    pub channels: u16,
    pub sample_rate: u32,
    pub encoding: AudioEncoding,
    pub duration_seconds: u32,
    /// The file size declared by the RIFF header.
    pub file_size: u64,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

impl WaveInfo {
    /// The summary as a flat list of labelled values, in display order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("File size", format!("{} bytes", self.file_size)),
            ("Length", format!("{} seconds", self.duration_seconds)),
            ("Bits/sample", self.bits_per_sample.to_string()),
            ("Format", "PCM".to_string()),
            ("Channels", self.channels.to_string()),
            ("Samplerate", format!("{} Hz", self.sample_rate)),
            ("Bytes/sec", self.byte_rate.to_string()),
            ("Block align", self.block_align.to_string()),
        ]
    }
}

impl fmt::Display for WaveInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, (label, value)) in self.fields().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", label, value)?;
        }
        Ok(())
    }
}
