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

extern crate wav_codec;

use std::error::Error;

use wav_codec::{AudioEncoding, ReadResult, WaveReader, WaveWriter, WriteResult};

fn main() -> Result<(), Box<dyn Error>> {
    write_wave()?;
    read_wave()?;
    Ok(())
}

fn write_wave() -> WriteResult<()> {
    let mut wave_writer = WaveWriter::create("hello.wav")?;
    wave_writer.set_channels(1);
    wave_writer.set_encoding(AudioEncoding::SignedPcm16Le);

    let samples: Vec<i16> = (0..44100).map(|n| (n % 200) as i16 * 100).collect();
    wave_writer.write_samples_as_i16(&samples)?;
    wave_writer.close()
}

fn read_wave() -> ReadResult<()> {
    let mut wave_reader = WaveReader::open("hello.wav")?;
    println!("{}", wave_reader.describe());

    let mut buf = [0i16; 4096];
    let mut total = 0;
    loop {
        let read = wave_reader.read_samples_as_i16(&mut buf)?;
        if read == 0 {
            break;
        }
        total += read;
    }
    println!("read {} samples", total);
    Ok(())
}
