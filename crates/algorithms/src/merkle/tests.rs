use super::*;
use puzzlebox_api::Serialize;

fn sample_leaves(n: usize) -> Vec<Vec<u8>> {
    (0..n)
        .map(|i| format!("ciphertext-{}", i).into_bytes())
        .collect()
}

#[test]
fn every_leaf_proves_under_the_root() {
    for n in [1usize, 2, 3, 4, 5, 8, 13, 16] {
        let leaves = sample_leaves(n);
        let tree = MerkleTree::build(&leaves).unwrap();
        let root = tree.root();

        for (i, leaf) in leaves.iter().enumerate() {
            let proof = tree.prove(i).unwrap();
            assert!(
                verify_proof(&root, leaf, &proof),
                "leaf {} of {} failed verification",
                i,
                n
            );
        }
    }
}

#[test]
fn any_flipped_ciphertext_bit_breaks_the_proof() {
    let leaves = sample_leaves(8);
    let tree = MerkleTree::build(&leaves).unwrap();
    let root = tree.root();

    for (i, leaf) in leaves.iter().enumerate() {
        let proof = tree.prove(i).unwrap();
        for byte in 0..leaf.len() {
            for bit in 0..8 {
                let mut tampered = leaf.clone();
                tampered[byte] ^= 1 << bit;
                assert!(
                    !verify_proof(&root, &tampered, &proof),
                    "bit flip at {}:{} in leaf {} went undetected",
                    byte,
                    bit,
                    i
                );
            }
        }
    }
}

#[test]
fn proof_does_not_transfer_between_leaves() {
    let leaves = sample_leaves(8);
    let tree = MerkleTree::build(&leaves).unwrap();
    let root = tree.root();

    let proof_for_2 = tree.prove(2).unwrap();
    assert!(!verify_proof(&root, &leaves[3], &proof_for_2));
}

#[test]
fn tampered_root_rejects_all_proofs() {
    let leaves = sample_leaves(4);
    let tree = MerkleTree::build(&leaves).unwrap();
    let mut root = tree.root();
    root[0] ^= 0x80;

    for (i, leaf) in leaves.iter().enumerate() {
        let proof = tree.prove(i).unwrap();
        assert!(!verify_proof(&root, leaf, &proof));
    }
}

#[test]
fn padding_positions_are_not_provable() {
    let leaves = sample_leaves(5); // padded to 8
    let tree = MerkleTree::build(&leaves).unwrap();
    assert!(tree.prove(5).is_err());
    assert!(tree.prove(7).is_err());
}

#[test]
fn proof_round_trips_through_wire_encoding() {
    let leaves = sample_leaves(6);
    let tree = MerkleTree::build(&leaves).unwrap();
    let proof = tree.prove(4).unwrap();

    let decoded = MerkleProof::from_bytes(&proof.to_bytes()).unwrap();
    assert_eq!(decoded, proof);
    assert!(verify_proof(&tree.root(), &leaves[4], &decoded));
}

#[test]
fn oversized_proof_depth_rejected() {
    let proof = MerkleProof {
        leaf_index: 0,
        siblings: vec![[0u8; DIGEST_SIZE]; 33],
    };
    assert!(!verify_proof(&[0u8; DIGEST_SIZE], b"leaf", &proof));
    assert!(MerkleProof::from_bytes(&proof.to_bytes()).is_err());
}

#[test]
fn index_outside_proof_depth_rejected() {
    let leaves = sample_leaves(4);
    let tree = MerkleTree::build(&leaves).unwrap();
    let mut proof = tree.prove(1).unwrap();
    proof.leaf_index = 4; // claims a position the two siblings cannot address

    assert!(!verify_proof(&tree.root(), &leaves[1], &proof));
}

#[test]
fn empty_leaf_set_rejected() {
    let empty: Vec<Vec<u8>> = Vec::new();
    assert!(MerkleTree::build(&empty).is_err());
}
