//! End-to-end exchanges through the facade crate

use num_bigint::BigUint;
use puzzlebox::algorithms::generate_safe_prime;
use puzzlebox::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn rng(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}

/// Drive a full three-call exchange and return both secrets.
fn run(
    protocol_a: Protocol,
    protocol_b: Protocol,
    seed: u64,
) -> Result<(SharedSecret, SharedSecret)> {
    let mut a = ExchangeSession::new(protocol_a, Role::Initiator);
    let mut b = ExchangeSession::new(protocol_b, Role::Responder);
    let mut ar = rng(seed);
    let mut br = rng(seed ^ 0xffff);

    let initiation = a.generate_initiation(&mut ar)?;
    let response = b.respond(&mut br, &initiation)?;
    let a_secret = a.finalize(&mut ar, &response)?;
    let b_secret = b.take_shared_secret()?;
    Ok((a_secret, b_secret))
}

#[test]
fn dh_exchange_over_a_small_group() {
    let mut r = rng(1);
    let group = GroupParameters::new(
        BigUint::from(23u32),
        BigUint::from(5u32),
        Some(BigUint::from(11u32)),
        &mut r,
    )
    .unwrap();

    let (sa, sb) = run(
        Protocol::DiffieHellman(group.clone()),
        Protocol::DiffieHellman(group),
        2,
    )
    .unwrap();
    assert_eq!(sa, sb);
    assert_eq!(sa.len(), 1);
}

#[test]
fn dh_exchange_over_a_generated_group() {
    let mut r = rng(3);
    let p = generate_safe_prime(&mut r, 64).unwrap();
    let group = GroupParameters::new(p, BigUint::from(2u32), None, &mut r).unwrap();

    let (sa, sb) = run(
        Protocol::DiffieHellman(group.clone()),
        Protocol::DiffieHellman(group.clone()),
        4,
    )
    .unwrap();
    assert_eq!(sa, sb);
    assert_eq!(sa.len(), group.element_width());
}

#[test]
#[ignore = "2048-bit exponentiations are slow without optimizations; run with --ignored"]
fn dh_exchange_over_modp_2048() {
    let group = GroupParameters::modp_2048();
    let (sa, sb) = run(
        Protocol::DiffieHellman(group.clone()),
        Protocol::DiffieHellman(group),
        5,
    )
    .unwrap();
    assert_eq!(sa, sb);
    assert_eq!(sa.len(), 256);
}

#[test]
fn puzzle_board_exchange() {
    let params = PuzzleParameters::new(8, 6).unwrap();
    let (sa, sb) = run(
        Protocol::PuzzleBoard(params),
        Protocol::PuzzleBoard(params),
        6,
    )
    .unwrap();
    assert_eq!(sa, sb);
    assert_eq!(sa.len(), 32);
}

#[test]
fn mismatched_groups_abort_the_exchange() {
    let mut r = rng(7);
    let p_a = generate_safe_prime(&mut r, 48).unwrap();
    let p_b = generate_safe_prime(&mut r, 48).unwrap();
    let group_a = GroupParameters::new(p_a, BigUint::from(2u32), None, &mut r).unwrap();
    let group_b = GroupParameters::new(p_b, BigUint::from(2u32), None, &mut r).unwrap();

    let err = run(
        Protocol::DiffieHellman(group_a),
        Protocol::DiffieHellman(group_b),
        8,
    )
    .unwrap_err();
    assert!(matches!(err, Error::GroupMismatch { .. }));
}

#[test]
fn mismatched_board_shapes_abort_the_exchange() {
    let err = run(
        Protocol::PuzzleBoard(PuzzleParameters::new(8, 6).unwrap()),
        Protocol::PuzzleBoard(PuzzleParameters::new(8, 7).unwrap()),
        9,
    )
    .unwrap_err();
    assert!(matches!(err, Error::GroupMismatch { .. }));
}

#[test]
fn tampered_initiation_aborts_the_responder() {
    let params = PuzzleParameters::new(4, 4).unwrap();
    let mut a = ExchangeSession::new(Protocol::PuzzleBoard(params), Role::Initiator);
    let mut b = ExchangeSession::new(Protocol::PuzzleBoard(params), Role::Responder);

    let mut initiation = a.generate_initiation(&mut rng(10)).unwrap();
    // Flip a bit in the commitment root (tag byte, length prefix, root).
    initiation[5] ^= 0x80;

    let err = b.respond(&mut rng(11), &initiation).unwrap_err();
    assert!(matches!(err, Error::BoardCorrupt { .. }));
}

#[test]
fn forged_confirmation_index_is_rejected() {
    let params = PuzzleParameters::new(4, 4).unwrap();
    let mut a = ExchangeSession::new(Protocol::PuzzleBoard(params), Role::Initiator);
    let mut b = ExchangeSession::new(Protocol::PuzzleBoard(params), Role::Responder);

    let initiation = a.generate_initiation(&mut rng(12)).unwrap();
    b.respond(&mut rng(13), &initiation).unwrap();

    let forged = Message::BoardConfirmation { index: 1000 }.encode();
    let err = a.finalize(&mut rng(14), &forged).unwrap_err();
    assert!(matches!(err, Error::InvalidParameter { .. }));
}

#[test]
fn sessions_are_deterministic_under_seeded_rngs() {
    let params = PuzzleParameters::new(4, 4).unwrap();
    let first = run(
        Protocol::PuzzleBoard(params),
        Protocol::PuzzleBoard(params),
        15,
    )
    .unwrap();
    let second = run(
        Protocol::PuzzleBoard(params),
        Protocol::PuzzleBoard(params),
        15,
    )
    .unwrap();
    assert_eq!(first.0, second.0);
}
