extern crate wav_codec;

use std::fs;
use std::path::Path;

use tempfile::tempdir;

use wav_codec::{inspect, inspect_info, AudioEncoding, FormatErrorKind, ReadError, WaveReader,
                WaveWriter};

fn write_wave(path: &Path, channels: u16, sample_rate: u32, encoding: AudioEncoding, payload: &[u8]) {
    let mut wave_writer = WaveWriter::create(path).unwrap();
    wave_writer.set_channels(channels);
    wave_writer.set_sample_rate(sample_rate);
    wave_writer.set_encoding(encoding);
    wave_writer.append(payload).unwrap();
    wave_writer.close().unwrap();
}

// A canonical 16-bit stereo header, split so that chunks can be inserted.
fn header_parts(data_size: u32) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    let preamble = b"RIFF\x00\x00\x00\x00WAVE".to_vec();
    let fmt = b"fmt \x10\x00\x00\x00\
                \x01\x00\x02\x00\x44\xAC\x00\x00\x10\xB1\x02\x00\x04\x00\x10\x00"
        .to_vec();
    let mut data = b"data".to_vec();
    data.extend_from_slice(&data_size.to_le_bytes());
    (preamble, fmt, data)
}

#[test]
fn test_round_trip_through_files() {
    let dir = tempdir().unwrap();

    for &channels in &[1u16, 2] {
        for &sample_rate in &[8000u32, 44100, 48000] {
            for &encoding in &[AudioEncoding::UnsignedPcm8, AudioEncoding::SignedPcm16Le] {
                let block_align = u32::from(encoding.bytes_per_sample() * channels);
                let byte_rate = sample_rate * block_align;
                // A second and a half of audio.
                let payload: Vec<u8> = (0..(byte_rate * 3 / 2)).map(|i| i as u8).collect();

                let path = dir.path().join(format!("{}_{}_{:?}.wav", channels, sample_rate, encoding));
                write_wave(&path, channels, sample_rate, encoding, &payload);

                let mut wave_reader = WaveReader::open(&path).unwrap();
                let info = wave_reader.describe();
                assert_eq!(channels, info.channels);
                assert_eq!(sample_rate, info.sample_rate);
                assert_eq!(encoding, info.encoding);
                assert_eq!(encoding.bits_per_sample(), info.bits_per_sample);
                assert_eq!(block_align as u16, info.block_align);
                assert_eq!(byte_rate, info.byte_rate);
                assert_eq!(payload.len() as u32 / byte_rate, info.duration_seconds);
                assert_eq!(fs::metadata(&path).unwrap().len(), info.file_size);

                let mut read_back = vec![0u8; payload.len() + 16];
                assert_eq!(payload.len(), wave_reader.read(&mut read_back).unwrap());
                assert_eq!(&payload[..], &read_back[..payload.len()]);

                assert_eq!(info, inspect_info(&path).unwrap());
            }
        }
    }
}

#[test]
fn test_unknown_chunk_is_skipped() {
    let dir = tempdir().unwrap();
    let (preamble, fmt, data) = header_parts(8);
    let samples = [1u8, 2, 3, 4, 5, 6, 7, 8];

    let plain = [&preamble[..], &fmt[..], &data[..], &samples[..]].concat();
    let with_junk = [&preamble[..], &b"JUNK\x0A\x00\x00\x00abcdefghij"[..], &fmt[..], &data[..], &samples[..]]
        .concat();
    fs::write(dir.path().join("plain.wav"), plain).unwrap();
    fs::write(dir.path().join("junk.wav"), with_junk).unwrap();

    let mut plain = WaveReader::open(dir.path().join("plain.wav")).unwrap();
    let mut junk = WaveReader::open(dir.path().join("junk.wav")).unwrap();
    assert_eq!(plain.pcm_format, junk.pcm_format);
    assert_eq!(plain.data_size(), junk.data_size());
    assert_eq!(plain.data_offset() + 18, junk.data_offset());

    let mut plain_buf = [0u8; 8];
    let mut junk_buf = [0u8; 8];
    plain.read(&mut plain_buf).unwrap();
    junk.read(&mut junk_buf).unwrap();
    assert_eq!(samples, plain_buf);
    assert_eq!(samples, junk_buf);
}

#[test]
fn test_missing_data_chunk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("no_data.wav");
    let (preamble, fmt, _) = header_parts(0);
    fs::write(&path, [&preamble[..], &fmt[..]].concat()).unwrap();

    match WaveReader::open(&path) {
        Err(ReadError::Format(FormatErrorKind::NoDataChunk)) => {}
        other => panic!("expected NoDataChunk, got {:?}", other.map(|r| r.describe())),
    }
    match inspect(&path) {
        Err(ReadError::Format(FormatErrorKind::NoDataChunk)) => {}
        other => panic!("expected NoDataChunk, got {:?}", other),
    }
}

#[test]
fn test_ieee_float_is_unsupported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("float.wav");
    let (preamble, mut fmt, data) = header_parts(8);
    fmt[8] = 3;
    fs::write(&path, [&preamble[..], &fmt[..], &data[..], &[0u8; 8][..]].concat()).unwrap();

    match WaveReader::open(&path) {
        Err(ReadError::Format(FormatErrorKind::UnsupportedFormat(3))) => {}
        other => panic!("expected UnsupportedFormat, got {:?}", other.map(|r| r.describe())),
    }
}

#[test]
fn test_rifx_is_not_a_wave_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("big_endian.wav");
    let (mut preamble, fmt, data) = header_parts(0);
    preamble[3] = b'X';
    fs::write(&path, [&preamble[..], &fmt[..], &data[..]].concat()).unwrap();

    match WaveReader::open(&path) {
        Err(ReadError::Format(FormatErrorKind::NotAWaveFile)) => {}
        other => panic!("expected NotAWaveFile, got {:?}", other.map(|r| r.describe())),
    }
}

#[test]
fn test_seek_then_read() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("seek.wav");
    // 8-bit mono at 8000 Hz for ten seconds; every byte holds its second.
    let payload: Vec<u8> = (0..80000u32).map(|i| (i / 8000) as u8).collect();
    write_wave(&path, 1, 8000, AudioEncoding::UnsignedPcm8, &payload);

    let mut wave_reader = WaveReader::open(&path).unwrap();
    let mut buf = [0u8; 100];

    wave_reader.seek(5).unwrap();
    assert_eq!(100, wave_reader.read(&mut buf).unwrap());
    assert!(buf.iter().all(|&b| b == 5));
    assert_eq!(5, wave_reader.current_time());

    // Without a seek, reading continues after the last read.
    let mut rest = vec![0u8; 7900];
    assert_eq!(7900, wave_reader.read(&mut rest).unwrap());
    assert_eq!(100, wave_reader.read(&mut buf).unwrap());
    assert!(buf.iter().all(|&b| b == 6));
    assert_eq!(6, wave_reader.current_time());
}

#[test]
fn test_truncated_source() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("truncated.wav");
    let (preamble, fmt, data) = header_parts(1_000_000);
    fs::write(&path, [&preamble[..], &fmt[..], &data[..], &[9u8; 100][..]].concat()).unwrap();

    let mut wave_reader = WaveReader::open(&path).unwrap();
    assert_eq!(1_000_000 / 176_400, wave_reader.describe().duration_seconds);

    let mut buf = [0u8; 64];
    assert_eq!(64, wave_reader.read(&mut buf).unwrap());
    assert_eq!(36, wave_reader.read(&mut buf).unwrap());
    assert!(buf[36..].iter().all(|&b| b == 0));
    assert_eq!(0, wave_reader.read(&mut buf).unwrap());
    assert_eq!(0, wave_reader.read(&mut buf).unwrap());
}

#[test]
fn test_closed_reader_releases_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("closed.wav");
    write_wave(&path, 2, 44100, AudioEncoding::SignedPcm16Le, &[0; 400]);

    let mut wave_reader = WaveReader::open(&path).unwrap();
    wave_reader.close();
    wave_reader.close();

    let mut buf = [0u8; 4];
    match wave_reader.read(&mut buf) {
        Err(ReadError::Closed) => {}
        other => panic!("expected Closed, got {:?}", other),
    }
    assert_eq!(Some(path.as_path()), wave_reader.path());
}
