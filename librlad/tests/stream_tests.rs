//! Stream container tests for librlad: writer/reader round trips,
//! overflow carry across reads, and stream-level failure paths.

use librlad_audio::{
    decode, decode_f32, encode_lossless, encode_lossy, info, AudioChannels, CodecMode, RladError,
    Reader, Writer, BLOCK_FRAMES, STREAM_HEADER_SIZE,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn smooth_signal(frames: usize, channels: usize, seed: u64) -> Vec<i16> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut value = vec![0i16; channels];
    let mut samples = Vec::with_capacity(frames * channels);
    for _ in 0..frames {
        for v in value.iter_mut() {
            *v = v.saturating_add(rng.gen_range(-600i16..=600));
            samples.push(*v);
        }
    }
    samples
}

// ============================================================================
// End-to-end round trips
// ============================================================================

#[test]
fn test_round_trip_various_lengths() {
    for frames in [1usize, 100, 511, 512, 513, 1024, 1500, 2048] {
        let samples = smooth_signal(frames, 2, frames as u64);
        let data = encode_lossless(&samples, AudioChannels::Stereo, 44100).unwrap();
        let decoded = decode(&data).unwrap();
        assert_eq!(decoded, samples, "at {} frames", frames);
    }
}

#[test]
fn test_round_trip_all_layouts() {
    for channels in [
        AudioChannels::Mono,
        AudioChannels::Stereo,
        AudioChannels::Quadraphonic,
        AudioChannels::FiveOne,
        AudioChannels::SevenOne,
    ] {
        let samples = smooth_signal(700, channels.count(), 7);
        let data = encode_lossless(&samples, channels, 48000).unwrap();
        let decoded = decode(&data).unwrap();
        assert_eq!(decoded, samples, "layout {:?}", channels);
    }
}

#[test]
fn test_lossy_stream_round_trip() {
    let samples = smooth_signal(1300, 1, 13);
    let data = encode_lossy(&samples, AudioChannels::Mono, 22050).unwrap();
    let decoded = decode(&data).unwrap();
    for (d, s) in decoded.iter().zip(samples.iter()) {
        assert_eq!(*d, (s >> 4) << 4);
    }
}

// ============================================================================
// Reader behavior
// ============================================================================

#[test]
fn test_reader_accessors() {
    let samples = smooth_signal(1100, 2, 42);
    let data = encode_lossless(&samples, AudioChannels::Stereo, 96000).unwrap();

    let mut reader = Reader::open(data.as_slice()).unwrap();
    assert_eq!(reader.channels(), AudioChannels::Stereo);
    assert_eq!(reader.sample_rate(), 96000);
    assert_eq!(reader.frame_count(), 1100);
    assert_eq!(reader.remaining(), 1100);
    assert!(reader.is_lossless());

    let mut buf = vec![0i16; 300 * 2];
    assert_eq!(reader.read(&mut buf).unwrap(), 300);
    assert_eq!(reader.remaining(), 800);
}

#[test]
fn test_odd_read_sizes_exercise_overflow() {
    let samples = smooth_signal(1500, 2, 99);
    let data = encode_lossless(&samples, AudioChannels::Stereo, 44100).unwrap();

    // read in prime-sized requests so every block is consumed partially
    let mut reader = Reader::open(data.as_slice()).unwrap();
    let mut collected = Vec::new();
    let mut buf = vec![0i16; 89 * 2];
    loop {
        let n = reader.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        collected.extend_from_slice(&buf[..n * 2]);
    }
    assert_eq!(collected, samples);

    // after the end every further read reports 0 frames
    assert_eq!(reader.read(&mut buf).unwrap(), 0);
    assert_eq!(reader.remaining(), 0);
}

#[test]
fn test_single_frame_reads() {
    let samples = smooth_signal(520, 1, 3);
    let data = encode_lossless(&samples, AudioChannels::Mono, 8000).unwrap();

    let mut reader = Reader::open(data.as_slice()).unwrap();
    let mut collected = Vec::new();
    let mut buf = [0i16; 1];
    while reader.read(&mut buf).unwrap() == 1 {
        collected.push(buf[0]);
    }
    assert_eq!(collected, samples);
}

#[test]
fn test_destination_rounds_down_to_whole_frames() {
    let samples = smooth_signal(600, 2, 5);
    let data = encode_lossless(&samples, AudioChannels::Stereo, 44100).unwrap();

    let mut reader = Reader::open(data.as_slice()).unwrap();
    // 7 shorts = 3.5 stereo frames; only 3 may be written
    let mut buf = [0i16; 7];
    assert_eq!(reader.read(&mut buf).unwrap(), 3);
    assert_eq!(&buf[..6], &samples[..6]);

    // a sub-frame destination reads nothing
    let mut tiny = [0i16; 1];
    assert_eq!(reader.read(&mut tiny).unwrap(), 0);
}

#[test]
fn test_float_reads_match_short_reads() {
    let samples = smooth_signal(900, 2, 17);
    let data = encode_lossless(&samples, AudioChannels::Stereo, 44100).unwrap();

    let floats = decode_f32(&data).unwrap();
    assert_eq!(floats.len(), samples.len());
    for (f, s) in floats.iter().zip(samples.iter()) {
        assert!((f - *s as f32 / 32767.0).abs() < 1e-6);
    }

    // odd-sized float reads take the overflow path too
    let mut reader = Reader::open(data.as_slice()).unwrap();
    let mut collected = Vec::new();
    let mut buf = vec![0.0f32; 101 * 2];
    loop {
        let n = reader.read_f32(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        collected.extend_from_slice(&buf[..n * 2]);
    }
    assert_eq!(collected, floats);
}

#[test]
fn test_full_block_reads_bypass_overflow() {
    let samples = smooth_signal(BLOCK_FRAMES * 3, 1, 8);
    let data = encode_lossless(&samples, AudioChannels::Mono, 44100).unwrap();

    let mut reader = Reader::open(data.as_slice()).unwrap();
    let mut buf = vec![0i16; BLOCK_FRAMES * 3];
    assert_eq!(reader.read(&mut buf).unwrap(), BLOCK_FRAMES * 3);
    assert_eq!(buf, samples);
    assert_eq!(reader.read(&mut buf).unwrap(), 0);
}

// ============================================================================
// Failure paths
// ============================================================================

#[test]
fn test_open_rejects_bad_magic() {
    let samples = smooth_signal(100, 1, 1);
    let mut data = encode_lossless(&samples, AudioChannels::Mono, 44100).unwrap();
    data[0] = b'W';

    let err = Reader::open(data.as_slice()).unwrap_err();
    assert!(matches!(err, RladError::BadFormat { expected: "RLAD", .. }));
}

#[test]
fn test_open_rejects_invalid_channel_count() {
    let samples = smooth_signal(100, 1, 2);
    let mut data = encode_lossless(&samples, AudioChannels::Mono, 44100).unwrap();
    data[5] = 3;

    let err = Reader::open(data.as_slice()).unwrap_err();
    match err {
        RladError::BadFormat { expected, detail } => {
            assert_eq!(expected, "RLAD");
            assert!(detail.contains("invalid channel count"));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_open_short_header() {
    let err = Reader::open(&b"RLAD"[..]).unwrap_err();
    assert!(matches!(err, RladError::IncompleteHeader("stream header")));
}

#[test]
fn test_truncated_block_header() {
    let samples = smooth_signal(600, 1, 4);
    let data = encode_lossless(&samples, AudioChannels::Mono, 44100).unwrap();

    // one byte of the first block's size word, then nothing
    let mut reader = Reader::open(&data[..STREAM_HEADER_SIZE + 1]).unwrap();
    let mut buf = vec![0i16; 1024];
    let err = reader.read(&mut buf).unwrap_err();
    assert!(matches!(err, RladError::IncompleteHeader("block size")));

    // the size word alone, cut before the run counts
    let mut reader = Reader::open(&data[..STREAM_HEADER_SIZE + 2]).unwrap();
    let err = reader.read(&mut buf).unwrap_err();
    assert!(matches!(err, RladError::IncompleteHeader("run counts")));
}

#[test]
fn test_truncated_block_payload() {
    let samples = smooth_signal(400, 1, 6);
    let data = encode_lossless(&samples, AudioChannels::Mono, 44100).unwrap();

    let mut reader = Reader::open(&data[..data.len() - 5]).unwrap();
    let mut buf = vec![0i16; 512];
    let err = reader.read(&mut buf).unwrap_err();
    match err {
        RladError::IncompleteData { op, missing } => {
            assert_eq!(op, "block data read");
            assert_eq!(missing, 5);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_writer_rejects_ragged_input() {
    let writer = Writer::new(CodecMode::Lossless, AudioChannels::Stereo, 44100);
    let err = writer.write_to_vec(&[0i16; 9]).unwrap_err();
    assert!(matches!(
        err,
        RladError::IncompleteFrame { channels: 2, remainder: 1, .. }
    ));

    let err = writer.write_to_vec(&[]).unwrap_err();
    assert!(matches!(err, RladError::InvalidOperation(_)));
}

#[test]
fn test_stream_header_reflects_mode() {
    let samples = smooth_signal(100, 1, 11);

    let lossless = encode_lossless(&samples, AudioChannels::Mono, 44100).unwrap();
    assert!(info(&lossless).unwrap().lossless);

    let lossy = encode_lossy(&samples, AudioChannels::Mono, 44100).unwrap();
    assert!(!info(&lossy).unwrap().lossless);

    // lossy payloads are strictly smaller for the same input
    assert!(lossy.len() < lossless.len());
}
