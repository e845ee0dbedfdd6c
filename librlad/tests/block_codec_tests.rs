//! Block codec tests for librlad: round trips, run layout scenarios and
//! the structural invariants of encoded blocks.

use librlad_audio::{
    AudioChannels, BlockCodec, BlockHeader, CodecMode, RladError, Tier, BLOCK_FRAMES,
    CHUNKS_PER_CHANNEL, CHUNK_SAMPLES,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn encode_block(
    samples: &[i16],
    mode: CodecMode,
    channels: AudioChannels,
) -> (BlockHeader, Vec<u8>) {
    let mut codec = BlockCodec::new(mode, channels);
    let mut payload = Vec::new();
    codec.encode(samples, false, &mut payload).unwrap();
    (codec.block_header().unwrap().clone(), payload)
}

fn decode_block(
    header: BlockHeader,
    payload: &[u8],
    mode: CodecMode,
    channels: AudioChannels,
) -> Vec<i16> {
    let mut codec = BlockCodec::new(mode, channels);
    codec.set_block_header(header).unwrap();
    let mut out = vec![0i16; BLOCK_FRAMES * channels.count()];
    codec.decode_i16(payload, &mut out).unwrap();
    out
}

fn assert_invariants(header: &BlockHeader, mode: CodecMode, payload: &[u8]) {
    // every channel's runs cover exactly 512 samples
    for ch in 0..header.channel_count() {
        let covered: usize = header
            .runs(ch)
            .unwrap()
            .iter()
            .map(|r| r.total_samples())
            .sum();
        assert_eq!(covered, BLOCK_FRAMES, "channel {} run coverage", ch);
    }

    // data size matches both the run tables and the payload
    assert_eq!(header.data_size(), header.computed_data_size(mode));
    assert_eq!(header.data_size(), payload.len());
}

// ============================================================================
// Round-trip properties
// ============================================================================

#[test]
fn test_lossless_round_trip_random_blocks() {
    let mut rng = StdRng::seed_from_u64(100);
    for channels in [AudioChannels::Mono, AudioChannels::Stereo, AudioChannels::SevenOne] {
        let samples: Vec<i16> = (0..BLOCK_FRAMES * channels.count())
            .map(|_| rng.gen())
            .collect();

        let (header, payload) = encode_block(&samples, CodecMode::Lossless, channels);
        assert_invariants(&header, CodecMode::Lossless, &payload);

        let decoded = decode_block(header, &payload, CodecMode::Lossless, channels);
        assert_eq!(decoded, samples);
    }
}

#[test]
fn test_lossy_round_trip_equals_low_bit_zeroed_input() {
    let mut rng = StdRng::seed_from_u64(101);
    // keep neighboring samples close enough for the 12-bit delta range
    let mut value = 0i16;
    let samples: Vec<i16> = (0..BLOCK_FRAMES * 2)
        .map(|_| {
            value = value.saturating_add(rng.gen_range(-8000i16..=8000));
            value
        })
        .collect();

    let (header, payload) = encode_block(&samples, CodecMode::Lossy, AudioChannels::Stereo);
    assert_invariants(&header, CodecMode::Lossy, &payload);

    let decoded = decode_block(header, &payload, CodecMode::Lossy, AudioChannels::Stereo);
    for (d, s) in decoded.iter().zip(samples.iter()) {
        assert_eq!(*d, (s >> 4) << 4);
    }
}

#[test]
fn test_silence_is_one_tiny_run() {
    let samples = vec![0i16; BLOCK_FRAMES];
    let (header, payload) = encode_block(&samples, CodecMode::Lossless, AudioChannels::Mono);

    let runs = header.runs(0).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].tier(), Tier::Tiny);
    assert_eq!(runs[0].count(), CHUNKS_PER_CHANNEL);
    assert_eq!(payload.len(), CHUNKS_PER_CHANNEL * 4);
}

// ============================================================================
// Layout scenarios
// ============================================================================

/// zeros on even indices, 5 * 10^(i/128) on odd: one run per quarter
#[test]
fn test_quarters_layout() {
    let samples: Vec<i16> = (0..BLOCK_FRAMES)
        .map(|i| {
            if i % 2 == 0 {
                0
            } else {
                (5 * 10i32.pow(i as u32 / 128)) as i16
            }
        })
        .collect();

    let (header, payload) = encode_block(&samples, CodecMode::Lossless, AudioChannels::Mono);
    assert_invariants(&header, CodecMode::Lossless, &payload);

    let runs = header.runs(0).unwrap();
    assert_eq!(runs.len(), 4);
    for (i, tier) in [Tier::Tiny, Tier::Small, Tier::Medium, Tier::Full]
        .iter()
        .enumerate()
    {
        assert_eq!(runs[i].tier(), *tier);
        assert_eq!(runs[i].count(), 16);
        assert_eq!(runs[i].total_samples(), 128);
    }
    assert_eq!(header.data_size(), 64 + 128 + 192 + 256);
    assert_eq!(header.data_size(), 640);

    let decoded = decode_block(header, &payload, CodecMode::Lossless, AudioChannels::Mono);
    assert_eq!(decoded, samples);
}

fn all_different_pattern() -> Vec<i16> {
    (0..BLOCK_FRAMES)
        .map(|i| {
            if i % CHUNK_SAMPLES == 0 {
                (5 * 10i32.pow((i as u32 % 32) / 8)) as i16
            } else {
                0
            }
        })
        .collect()
}

/// every chunk lands in a different tier than its neighbor: 64 runs of 1
#[test]
fn test_all_different_layout_lossless() {
    let samples = all_different_pattern();
    let (header, payload) = encode_block(&samples, CodecMode::Lossless, AudioChannels::Mono);
    assert_invariants(&header, CodecMode::Lossless, &payload);

    let runs = header.runs(0).unwrap();
    assert_eq!(runs.len(), 64);
    for (k, run) in runs.iter().enumerate() {
        assert_eq!(run.count(), 1);
        assert_eq!(run.tier() as u8, (k % 4) as u8);
    }
    assert_eq!(header.data_size(), 640);

    let decoded = decode_block(header, &payload, CodecMode::Lossless, AudioChannels::Mono);
    assert_eq!(decoded, samples);
}

#[test]
fn test_all_different_layout_lossy() {
    let samples = all_different_pattern();
    let (header, payload) = encode_block(&samples, CodecMode::Lossy, AudioChannels::Mono);
    assert_invariants(&header, CodecMode::Lossy, &payload);

    let runs = header.runs(0).unwrap();
    assert_eq!(runs.len(), 64);
    assert_eq!(header.data_size(), 32 + 64 + 128 + 192);
    assert_eq!(header.data_size(), 416);
}

/// the same pattern on both channels yields identical run tables
#[test]
fn test_stereo_duplicate_layout() {
    let mono = all_different_pattern();
    let mut stereo = Vec::with_capacity(mono.len() * 2);
    for &s in &mono {
        stereo.push(s);
        stereo.push(s);
    }

    let (header, payload) = encode_block(&stereo, CodecMode::Lossless, AudioChannels::Stereo);
    assert_invariants(&header, CodecMode::Lossless, &payload);

    assert_eq!(header.runs(0).unwrap(), header.runs(1).unwrap());
    assert_eq!(header.data_size(), 2 * 640);

    let decoded = decode_block(header, &payload, CodecMode::Lossless, AudioChannels::Stereo);
    assert_eq!(decoded, stereo);
}

/// a quiet left channel and a loud right channel classify independently
#[test]
fn test_stereo_asymmetric_layout() {
    let mut stereo = vec![0i16; BLOCK_FRAMES * 2];
    for frame in (1..BLOCK_FRAMES).step_by(2) {
        stereo[frame * 2] = 5; // left
        stereo[frame * 2 + 1] = 5000; // right
    }

    let (header, payload) = encode_block(&stereo, CodecMode::Lossless, AudioChannels::Stereo);
    assert_invariants(&header, CodecMode::Lossless, &payload);

    let left = header.runs(0).unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].tier(), Tier::Tiny);
    assert_eq!(left[0].count(), 64);
    assert_eq!(left[0].total_samples(), 512);

    let right = header.runs(1).unwrap();
    assert_eq!(right.len(), 1);
    assert_eq!(right[0].tier(), Tier::Full);
    assert_eq!(right[0].count(), 64);

    assert_eq!(header.data_size(), 256 + 1024);
    assert_eq!(header.data_size(), 1280);

    let decoded = decode_block(header, &payload, CodecMode::Lossless, AudioChannels::Stereo);
    assert_eq!(decoded, stereo);
}

// ============================================================================
// Precondition failures
// ============================================================================

#[test]
fn test_encode_wrong_frame_count() {
    let mut codec = BlockCodec::new(CodecMode::Lossless, AudioChannels::Mono);
    let mut payload = Vec::new();

    let err = codec.encode(&[42i16; 1], false, &mut payload).unwrap_err();
    assert!(err.to_string().starts_with("RLAD encoding must"));

    let err = codec
        .encode(&[42i16; BLOCK_FRAMES + 1], false, &mut payload)
        .unwrap_err();
    assert!(err.to_string().starts_with("RLAD encoding must"));
}

#[test]
fn test_decode_requires_header() {
    let mut codec = BlockCodec::new(CodecMode::Lossless, AudioChannels::Mono);
    let mut out = vec![0i16; BLOCK_FRAMES];
    let err = codec.decode_i16(&[0u8; 64], &mut out).unwrap_err();
    assert!(err.to_string().starts_with("No block header"));
}

#[test]
fn test_decode_short_source() {
    let samples = vec![1234i16; BLOCK_FRAMES];
    let mut codec = BlockCodec::new(CodecMode::Lossless, AudioChannels::Mono);
    let mut payload = Vec::new();
    codec.encode(&samples, false, &mut payload).unwrap();

    let mut out = vec![0i16; BLOCK_FRAMES];
    let err = codec.decode_i16(&payload[..10], &mut out).unwrap_err();
    match err {
        RladError::IncompleteData { op, missing } => {
            assert_eq!(op, "RLAD data decode");
            assert_eq!(missing, payload.len() - 10);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_lossy_rejects_unrepresentable_deltas() {
    // full-scale square wave: quantized deltas of +/-4095 exceed 12 bits
    let samples: Vec<i16> = (0..BLOCK_FRAMES)
        .map(|i| if i % 2 == 0 { i16::MIN } else { i16::MAX })
        .collect();

    let mut codec = BlockCodec::new(CodecMode::Lossy, AudioChannels::Mono);
    let mut payload = Vec::new();
    let err = codec.encode(&samples, false, &mut payload).unwrap_err();
    assert!(matches!(err, RladError::ArithmeticOverflow { .. }));
}

#[test]
fn test_wrapping_accumulator_survives_extremes() {
    // lossless mode must reproduce even full-range alternation exactly
    let samples: Vec<i16> = (0..BLOCK_FRAMES)
        .map(|i| if i % 2 == 0 { i16::MIN } else { i16::MAX })
        .collect();

    let (header, payload) = encode_block(&samples, CodecMode::Lossless, AudioChannels::Mono);
    let decoded = decode_block(header, &payload, CodecMode::Lossless, AudioChannels::Mono);
    assert_eq!(decoded, samples);
}
