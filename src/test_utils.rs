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

//! Fixtures shared by the unit tests.

use byteorder::{LittleEndian, WriteBytesExt};

// This is a helper macro that helps us validate results in our tests.
// Thank you bluss and durka42!
macro_rules! assert_matches {
    ($expected:pat $(if $guard:expr)*, $value:expr) => {
        match $value {
            $expected $(if $guard)* => {},
            ref actual => {
                panic!("assertion failed: `(left matches right)` (left: `{}`, right: `{:?}`",
                    stringify!($expected), actual);
            },
        }
    };
}

pub fn fmt_chunk(audio_format: u16, num_channels: u16, sample_rate: u32, bits: u16) -> Vec<u8> {
    let block_align = num_channels * bits / 8;
    let mut chunk = b"fmt \x10\x00\x00\x00".to_vec();
    chunk.write_u16::<LittleEndian>(audio_format).unwrap();
    chunk.write_u16::<LittleEndian>(num_channels).unwrap();
    chunk.write_u32::<LittleEndian>(sample_rate).unwrap();
    chunk.write_u32::<LittleEndian>(sample_rate * u32::from(block_align)).unwrap();
    chunk.write_u16::<LittleEndian>(block_align).unwrap();
    chunk.write_u16::<LittleEndian>(bits).unwrap();
    chunk
}

pub fn data_chunk(declared_size: u32, body: &[u8]) -> Vec<u8> {
    let mut chunk = b"data".to_vec();
    chunk.write_u32::<LittleEndian>(declared_size).unwrap();
    chunk.extend_from_slice(body);
    chunk
}

pub fn riff(chunks: &[&[u8]]) -> Vec<u8> {
    let body: Vec<u8> = chunks.concat();
    let mut file = b"RIFF".to_vec();
    file.write_u32::<LittleEndian>(body.len() as u32 + 4).unwrap();
    file.extend_from_slice(b"WAVE");
    file.extend_from_slice(&body);
    file
}
