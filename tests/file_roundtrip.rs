use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use pretty_assertions::assert_eq;
use riffwave_lib::generator::{self, ChannelMap};
use riffwave_lib::*;

#[test]
fn one_second_of_silence_round_trips_through_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("silence.wav");

    let mut encoder: Encoder<i16, _> = Encoder::create(&path, Format::pcm(1, 8_000, 16)).unwrap();
    for _ in 0..8_000 {
        encoder.write_sample(0).unwrap();
    }
    encoder.close().unwrap();

    let found = inspect_file(&path).unwrap();
    assert_eq!(found.format, Format::pcm(1, 8_000, 16));
    assert_eq!(found.data_size, 16_000);
    assert_eq!(found.frames(), 8_000);
    assert_eq!(found.info.iter().filter(|i| i.marker == Marker::ISFT).count(), 1);
    assert_eq!(found.info.get(Marker::ISFT), Some(SOFTWARE));

    let file_len = std::fs::metadata(&path).unwrap().len() as u32;
    let meta_size = file_len - 44 - 16_000;
    assert_eq!(found.riff_size, 32 + 16_000 + meta_size);
}

#[test]
fn metadata_chunk_decodes_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tagged.wav");

    let mut encoder: Encoder<i16, _> = Encoder::create(&path, Format::pcm(2, 8_000, 16)).unwrap();
    encoder.add_info([
        Info::new(Marker::INAM, "two tones"),
        Info::new(Marker::ICRD, "1977-09-26 20:00:00"),
    ]);
    let map = ChannelMap::parse(["0:440", "1:880:0.5"]).unwrap();
    generator::render(&mut encoder, &map, 800).unwrap();
    encoder.close().unwrap();

    let mut bytes = Vec::new();
    let mut file = File::open(&path).unwrap();
    file.seek(SeekFrom::Start(44 + 3_200)).unwrap();
    file.read_to_end(&mut bytes).unwrap();

    assert_eq!(&bytes[..4], b"LIST");
    let len = u32::from_le_bytes(bytes[4..8].try_into().unwrap()) as usize;
    assert_eq!(len, bytes.len() - 8);

    let info = InfoList::decode(&bytes[8..]).unwrap();
    assert_eq!(
        info,
        InfoList::from(vec![
            Info::new(Marker::INAM, "two tones"),
            Info::new(Marker::ICRD, "1977-09-26 20:00:00"),
            Info::new(Marker::ISFT, SOFTWARE),
        ])
    );
}

#[test]
fn failed_close_leaves_provisional_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.wav");

    let mut encoder: Encoder<u8, _> = Encoder::create(&path, Format::pcm(2, 8_000, 8)).unwrap();
    encoder.write_sample(128).unwrap();
    assert!(matches!(
        encoder.close(),
        Err(WaveError::IncompleteFrame { samples: 1, channels: 2 })
    ));

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 45);
    assert_eq!(&bytes[4..8], &32u32.to_le_bytes());
    assert_eq!(&bytes[40..44], &[0, 0, 0, 0]);
}
