//! End-to-end delta scenarios
//!
//! Each scenario pins the exact command stream the delta builder must emit
//! for a known edit of the original, then replays it through the patcher.
//! Expected streams are assembled with an independent encoder so the tests
//! do not lean on the crate's own command writer.

use std::io::Cursor;

use rdelta::{patch, read_signature, write_delta, write_signature, ChecksumType, Signature};

const BLOCK_SIZE: u32 = 100;
/// Four full blocks plus a short tail.
const FULL_BLOCKS: usize = 4;
const TAIL_LEN: usize = 73;

const CHECKSUM_TYPES: [ChecksumType; 4] = [
    ChecksumType::RollsumMd4,
    ChecksumType::RollsumBlake2b,
    ChecksumType::RabinKarpMd4,
    ChecksumType::RabinKarpBlake2b,
];
const STRONG_LENS: [u32; 3] = [8, 16, 32];

/// Deterministic high-entropy bytes (xorshift64*).
fn pseudo_random_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut state = seed.wrapping_mul(0x2545_F491_4F6C_DD1D) | 1;
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        out.extend_from_slice(&state.wrapping_mul(0x2545_F491_4F6C_DD1D).to_be_bytes());
    }
    out.truncate(len);
    out
}

fn original_file() -> Vec<u8> {
    pseudo_random_bytes(0xD1F7, FULL_BLOCKS * BLOCK_SIZE as usize + TAIL_LEN)
}

fn build_signature(original: &[u8], checksum_type: ChecksumType, strong_len: u32) -> Signature {
    let mut stream = Vec::new();
    write_signature(original, &mut stream, checksum_type, BLOCK_SIZE, strong_len).unwrap();
    read_signature(&stream[..]).unwrap()
}

fn build_delta(signature: &Signature, new: &[u8], max_literal_len: u32) -> Vec<u8> {
    let mut delta = Vec::new();
    write_delta(signature, new, &mut delta, max_literal_len).unwrap();
    delta
}

fn apply_patch(original: &[u8], delta: &[u8]) -> Vec<u8> {
    let mut basis = Cursor::new(original.to_vec());
    let mut rebuilt = Vec::new();
    patch(&mut basis, &mut rebuilt, delta).unwrap();
    rebuilt
}

/// Run `check` for every (checksum type, strong length) pairing the hash
/// maximum permits.
fn for_each_config(check: impl Fn(ChecksumType, u32)) {
    for checksum_type in CHECKSUM_TYPES {
        for strong_len in STRONG_LENS {
            if strong_len > checksum_type.max_strong_len() {
                continue;
            }
            check(checksum_type, strong_len);
        }
    }
}

// Independent command encoding, mirroring the wire format by hand.

fn be_width(value: u64) -> usize {
    if value >> 32 != 0 {
        8
    } else if value >> 16 != 0 {
        4
    } else if value >> 8 != 0 {
        2
    } else {
        1
    }
}

fn width_code(width: usize) -> u8 {
    match width {
        1 => 0,
        2 => 1,
        4 => 2,
        _ => 3,
    }
}

fn push_be(out: &mut Vec<u8>, value: u64, width: usize) {
    out.extend_from_slice(&value.to_be_bytes()[8 - width..]);
}

fn push_literal(out: &mut Vec<u8>, data: &[u8]) {
    let length = data.len() as u64;
    if length < 65 {
        out.push(length as u8);
    } else {
        let width = be_width(length);
        out.push(65 + width_code(width));
        push_be(out, length, width);
    }
    out.extend_from_slice(data);
}

fn push_copy(out: &mut Vec<u8>, position: u64, length: u64) {
    let position_width = be_width(position);
    let length_width = be_width(length);
    out.push(69 + 4 * width_code(position_width) + width_code(length_width));
    push_be(out, position, position_width);
    push_be(out, length, length_width);
}

fn new_expected_delta() -> Vec<u8> {
    0x7273_0236u32.to_be_bytes().to_vec()
}

#[test]
fn no_change_copies_full_blocks_and_literals_the_tail() {
    let original = original_file();
    for_each_config(|checksum_type, strong_len| {
        let signature = build_signature(&original, checksum_type, strong_len);
        let delta = build_delta(&signature, &original, 2 * BLOCK_SIZE);

        let mut expected = new_expected_delta();
        for block in 0..FULL_BLOCKS {
            push_copy(
                &mut expected,
                block as u64 * BLOCK_SIZE as u64,
                BLOCK_SIZE as u64,
            );
        }
        push_literal(&mut expected, &original[FULL_BLOCKS * BLOCK_SIZE as usize..]);
        expected.push(0);

        assert_eq!(delta, expected, "{checksum_type:?}/{strong_len}");
        assert_eq!(apply_patch(&original, &delta), original);
    });
}

#[test]
fn prepended_bytes_become_a_leading_literal() {
    let original = original_file();
    let prefix = pseudo_random_bytes(0xBEEF, 37);
    let mut new = prefix.clone();
    new.extend_from_slice(&original);

    for_each_config(|checksum_type, strong_len| {
        let signature = build_signature(&original, checksum_type, strong_len);
        let delta = build_delta(&signature, &new, 2 * BLOCK_SIZE);

        let mut expected = new_expected_delta();
        push_literal(&mut expected, &prefix);
        for block in 0..FULL_BLOCKS {
            push_copy(
                &mut expected,
                block as u64 * BLOCK_SIZE as u64,
                BLOCK_SIZE as u64,
            );
        }
        push_literal(&mut expected, &original[FULL_BLOCKS * BLOCK_SIZE as usize..]);
        expected.push(0);

        assert_eq!(delta, expected, "{checksum_type:?}/{strong_len}");
        assert_eq!(apply_patch(&original, &delta), new);
    });
}

#[test]
fn appended_bytes_merge_into_the_tail_literal() {
    let original = original_file();
    let appended = pseudo_random_bytes(0xF00D, 50);
    let mut new = original.clone();
    new.extend_from_slice(&appended);

    for_each_config(|checksum_type, strong_len| {
        let signature = build_signature(&original, checksum_type, strong_len);
        let delta = build_delta(&signature, &new, 2 * BLOCK_SIZE);

        let mut expected = new_expected_delta();
        for block in 0..FULL_BLOCKS {
            push_copy(
                &mut expected,
                block as u64 * BLOCK_SIZE as u64,
                BLOCK_SIZE as u64,
            );
        }
        // The short original tail and the appended bytes coalesce.
        push_literal(&mut expected, &new[FULL_BLOCKS * BLOCK_SIZE as usize..]);
        expected.push(0);

        assert_eq!(delta, expected, "{checksum_type:?}/{strong_len}");
        assert_eq!(apply_patch(&original, &delta), new);
    });
}

#[test]
fn modified_block_is_sent_as_a_literal() {
    let original = original_file();
    let modified_index = 2usize;
    let begin = modified_index * BLOCK_SIZE as usize;
    let end = begin + BLOCK_SIZE as usize;

    let mut new = original.clone();
    new[begin..end].copy_from_slice(&pseudo_random_bytes(0xC0DE, BLOCK_SIZE as usize));

    for_each_config(|checksum_type, strong_len| {
        let signature = build_signature(&original, checksum_type, strong_len);
        let delta = build_delta(&signature, &new, 2 * BLOCK_SIZE);

        let mut expected = new_expected_delta();
        for block in 0..FULL_BLOCKS {
            if block == modified_index {
                push_literal(&mut expected, &new[begin..end]);
            } else {
                push_copy(
                    &mut expected,
                    block as u64 * BLOCK_SIZE as u64,
                    BLOCK_SIZE as u64,
                );
            }
        }
        push_literal(&mut expected, &original[FULL_BLOCKS * BLOCK_SIZE as usize..]);
        expected.push(0);

        assert_eq!(delta, expected, "{checksum_type:?}/{strong_len}");
        assert_eq!(apply_patch(&original, &delta), new);
    });
}

#[test]
fn removed_block_drops_one_copy() {
    let original = original_file();
    let removed_index = 1usize;
    let begin = removed_index * BLOCK_SIZE as usize;
    let end = begin + BLOCK_SIZE as usize;

    let mut new = original[..begin].to_vec();
    new.extend_from_slice(&original[end..]);

    for_each_config(|checksum_type, strong_len| {
        let signature = build_signature(&original, checksum_type, strong_len);
        let delta = build_delta(&signature, &new, 2 * BLOCK_SIZE);

        let mut expected = new_expected_delta();
        for block in 0..FULL_BLOCKS {
            if block == removed_index {
                continue;
            }
            push_copy(
                &mut expected,
                block as u64 * BLOCK_SIZE as u64,
                BLOCK_SIZE as u64,
            );
        }
        push_literal(&mut expected, &original[FULL_BLOCKS * BLOCK_SIZE as usize..]);
        expected.push(0);

        assert_eq!(delta, expected, "{checksum_type:?}/{strong_len}");
        assert_eq!(apply_patch(&original, &delta), new);
    });
}

#[test]
fn inserted_bytes_at_a_block_boundary_become_a_literal() {
    let original = original_file();
    let inserted = pseudo_random_bytes(0xABCD, 43);
    let insert_at = 2 * BLOCK_SIZE as usize;

    let mut new = original[..insert_at].to_vec();
    new.extend_from_slice(&inserted);
    new.extend_from_slice(&original[insert_at..]);

    for_each_config(|checksum_type, strong_len| {
        let signature = build_signature(&original, checksum_type, strong_len);
        let delta = build_delta(&signature, &new, 2 * BLOCK_SIZE);

        let mut expected = new_expected_delta();
        for block in 0..FULL_BLOCKS {
            if block * BLOCK_SIZE as usize == insert_at {
                push_literal(&mut expected, &inserted);
            }
            push_copy(
                &mut expected,
                block as u64 * BLOCK_SIZE as u64,
                BLOCK_SIZE as u64,
            );
        }
        push_literal(&mut expected, &original[FULL_BLOCKS * BLOCK_SIZE as usize..]);
        expected.push(0);

        assert_eq!(delta, expected, "{checksum_type:?}/{strong_len}");
        assert_eq!(apply_patch(&original, &delta), new);
    });
}

#[test]
fn small_literal_bound_splits_the_tail() {
    let original = original_file();
    let max_literal_len = TAIL_LEN as u32 / 2 + 1;

    for_each_config(|checksum_type, strong_len| {
        let signature = build_signature(&original, checksum_type, strong_len);
        let delta = build_delta(&signature, &original, max_literal_len);

        let tail = &original[FULL_BLOCKS * BLOCK_SIZE as usize..];
        let mut expected = new_expected_delta();
        for block in 0..FULL_BLOCKS {
            push_copy(
                &mut expected,
                block as u64 * BLOCK_SIZE as u64,
                BLOCK_SIZE as u64,
            );
        }
        push_literal(&mut expected, &tail[..max_literal_len as usize]);
        push_literal(&mut expected, &tail[max_literal_len as usize..]);
        expected.push(0);

        assert_eq!(delta, expected, "{checksum_type:?}/{strong_len}");
        assert_eq!(apply_patch(&original, &delta), original);
    });
}

#[test]
fn corrupted_magic_fails_to_patch() {
    let original = original_file();
    let signature = build_signature(&original, ChecksumType::RollsumMd4, 16);
    let mut delta = build_delta(&signature, &original, 2 * BLOCK_SIZE);
    delta[0] ^= 0x01;

    let mut basis = Cursor::new(original);
    let mut rebuilt = Vec::new();
    let err = patch(&mut basis, &mut rebuilt, &delta[..]).unwrap_err();
    assert!(matches!(err, rdelta::Error::Format { .. }));
}

#[test]
fn md4_strong_len_over_sixteen_fails_at_signature_build() {
    let err = write_signature(
        &b"some original"[..],
        &mut Vec::new(),
        ChecksumType::RollsumMd4,
        BLOCK_SIZE,
        17,
    )
    .unwrap_err();
    assert!(matches!(err, rdelta::Error::Config { .. }));
}
