use super::*;
use puzzlebox_api::Error;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn rng(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}

fn params(count: u32, bits: u8) -> PuzzleParameters {
    PuzzleParameters::new(count, bits).unwrap()
}

#[test]
fn full_board_round_trip_agrees_on_candidate() {
    let mut sender_rng = rng(1);
    let mut receiver_rng = rng(2);
    let p = params(4, 4);

    let board = PuzzleBoard::build(&mut sender_rng, &p).unwrap();
    let root = board.commitment();
    let transmission = board.transmission().unwrap();

    let verified = VerifiedBoard::receive(&root, &transmission, &p).unwrap();
    assert_eq!(verified.verified_count(), 4);

    let (index, solved) = verified.choose_and_solve(&mut receiver_rng).unwrap();
    let sender_secret = board.confirm(index).unwrap();

    assert_eq!(sender_secret.as_bytes(), solved.candidate.as_slice());
}

#[test]
fn wrong_root_rejects_every_puzzle() {
    let mut r = rng(3);
    let p = params(4, 4);
    let board = PuzzleBoard::build(&mut r, &p).unwrap();
    let transmission = board.transmission().unwrap();

    let mut root = board.commitment();
    root[0] ^= 0x01;

    let err = VerifiedBoard::receive(&root, &transmission, &p).unwrap_err();
    assert!(matches!(err, Error::BoardCorrupt { .. }));
}

#[test]
fn tampered_ciphertext_is_discarded_not_solved() {
    let mut r = rng(4);
    let p = params(4, 4);
    let board = PuzzleBoard::build(&mut r, &p).unwrap();
    let root = board.commitment();

    let mut transmission = board.transmission().unwrap();
    transmission.puzzles[2].0[0] ^= 0xff;

    let verified = VerifiedBoard::receive(&root, &transmission, &p).unwrap();
    assert_eq!(verified.verified_count(), 3);
    assert!(verified.solve_at(2).is_err());
    assert!(verified.solve_at(0).is_ok());
}

#[test]
fn swapped_puzzles_are_rejected_by_position_check() {
    let mut r = rng(5);
    let p = params(4, 4);
    let board = PuzzleBoard::build(&mut r, &p).unwrap();
    let root = board.commitment();

    let mut transmission = board.transmission().unwrap();
    transmission.puzzles.swap(0, 1);

    let verified = VerifiedBoard::receive(&root, &transmission, &p).unwrap();
    assert_eq!(verified.verified_count(), 2);
}

#[test]
fn parameter_echo_mismatch_is_fatal() {
    let mut r = rng(6);
    let p = params(4, 4);
    let board = PuzzleBoard::build(&mut r, &p).unwrap();
    let root = board.commitment();
    let transmission = board.transmission().unwrap();

    let other = params(4, 5);
    let err = VerifiedBoard::receive(&root, &transmission, &other).unwrap_err();
    assert!(matches!(err, Error::GroupMismatch { .. }));
}

#[test]
fn confirm_rejects_out_of_range_index() {
    let mut r = rng(7);
    let p = params(4, 4);
    let board = PuzzleBoard::build(&mut r, &p).unwrap();
    assert!(board.confirm(4).is_err());
    assert!(board.confirm(0).is_ok());
}

#[test]
fn transmission_wire_round_trip() {
    let mut r = rng(8);
    let p = params(3, 4);
    let board = PuzzleBoard::build(&mut r, &p).unwrap();
    let transmission = board.transmission().unwrap();

    let mut w = WireWriter::new();
    transmission.encode(&mut w);
    let bytes = w.into_bytes();

    let mut reader = WireReader::new(&bytes);
    let decoded = BoardTransmission::decode(&mut reader).unwrap();
    reader.finish().unwrap();
    assert_eq!(decoded, transmission);
}

#[test]
fn truncated_transmission_fails_to_decode() {
    let mut r = rng(9);
    let p = params(3, 4);
    let board = PuzzleBoard::build(&mut r, &p).unwrap();
    let transmission = board.transmission().unwrap();

    let mut w = WireWriter::new();
    transmission.encode(&mut w);
    let bytes = w.into_bytes();

    let mut reader = WireReader::new(&bytes[..bytes.len() - 5]);
    assert!(BoardTransmission::decode(&mut reader).is_err());
}

#[test]
fn hostile_puzzle_count_fails_as_truncation() {
    // A 41-byte message claiming u32::MAX puzzles: parameters echo,
    // salt, count, and no puzzle data. Decoding must fail cleanly
    // without an allocation sized by the claimed count.
    let mut w = WireWriter::new();
    w.put_u32(u32::MAX);
    w.put_u8(8);
    w.put_bytes(&[0u8; SALT_SIZE]);
    w.put_u32(u32::MAX);
    let bytes = w.into_bytes();

    let mut reader = WireReader::new(&bytes);
    assert!(BoardTransmission::decode(&mut reader).is_err());
}

/// The honest receiver solves one puzzle; an eavesdropper who wants the
/// confirmed candidate must expect to solve half the board. Count trial
/// decryptions on both sides and check the gap.
#[test]
fn adversary_work_scales_with_board_size() {
    let mut sender_rng = rng(10);
    let mut receiver_rng = rng(11);
    let p = params(16, 8);

    let board = PuzzleBoard::build(&mut sender_rng, &p).unwrap();
    let root = board.commitment();
    let transmission = board.transmission().unwrap();
    let verified = VerifiedBoard::receive(&root, &transmission, &p).unwrap();

    let (_, honest) = verified.choose_and_solve(&mut receiver_rng).unwrap();

    let mut adversary_attempts = 0u64;
    for index in 0..p.puzzle_count() {
        adversary_attempts += verified.solve_at(index).unwrap().attempts;
    }

    // One puzzle for the honest side, N * 2^(w-1) expected for the
    // board-exhausting adversary; a 2x band on either side keeps the
    // check robust to where the weak values happened to land.
    let expected = u64::from(p.puzzle_count()) * (p.weak_key_space() / 2);
    assert!(honest.attempts <= p.attempt_ceiling());
    assert!(adversary_attempts > honest.attempts);
    assert!(adversary_attempts >= expected / 2);
    assert!(adversary_attempts <= expected * 2);
}
