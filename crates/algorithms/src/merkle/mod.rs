//! Array-backed Merkle tree with inclusion proofs
//!
//! The tree is an arena: a single `Vec` holding a complete binary tree in
//! heap order (root at index 1, children of `i` at `2i` and `2i+1`), with
//! the leaf layer padded to a power of two by duplicating the last leaf
//! hash. No node is mutated after construction, so a published root can
//! never drift from the tree it commits to.
//!
//! Leaf and interior hashes are domain-separated (`0x00` / `0x01`
//! prefixes), which blocks second-preimage tricks that reinterpret an
//! interior node as a leaf. Root comparison during proof verification is
//! constant-time; it sits on the adversary-facing commitment path.

use crate::suite;
use puzzlebox_api::{validate, Error, Result, Serialize};
use puzzlebox_internal::{ct_eq, WireReader, WireWriter};

/// Digest width of the tree's hash collaborator (SHA-256).
pub const DIGEST_SIZE: usize = 32;

/// Maximum tree depth a proof may claim (2^32 leaves).
const MAX_PROOF_DEPTH: usize = 32;

const LEAF_DOMAIN: u8 = 0x00;
const NODE_DOMAIN: u8 = 0x01;

/// Hash a leaf's content with leaf domain separation.
pub fn leaf_hash(data: &[u8]) -> [u8; DIGEST_SIZE] {
    let mut buf = Vec::with_capacity(1 + data.len());
    buf.push(LEAF_DOMAIN);
    buf.extend_from_slice(data);
    suite::hash(&buf)
}

fn node_hash(left: &[u8; DIGEST_SIZE], right: &[u8; DIGEST_SIZE]) -> [u8; DIGEST_SIZE] {
    let mut buf = [0u8; 1 + 2 * DIGEST_SIZE];
    buf[0] = NODE_DOMAIN;
    buf[1..1 + DIGEST_SIZE].copy_from_slice(left);
    buf[1 + DIGEST_SIZE..].copy_from_slice(right);
    suite::hash(&buf)
}

/// Inclusion proof: a leaf position and its sibling hashes, bottom-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    /// Position of the proven leaf in the padded leaf layer.
    pub leaf_index: u32,
    /// Sibling hashes from the leaf layer up to just below the root.
    pub siblings: Vec<[u8; DIGEST_SIZE]>,
}

impl Serialize for MerkleProof {
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = WireReader::new(bytes);
        let proof = Self::decode(&mut r)?;
        r.finish()?;
        Ok(proof)
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        self.encode(&mut w);
        w.into_bytes()
    }
}

impl MerkleProof {
    /// Append this proof to an in-progress wire message.
    pub fn encode(&self, w: &mut WireWriter) {
        w.put_u32(self.leaf_index);
        w.put_u32(self.siblings.len() as u32);
        for sibling in &self.siblings {
            w.put_bytes(sibling);
        }
    }

    /// Decode a proof from an in-progress wire message.
    pub fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        let leaf_index = r.u32()?;
        let depth = r.u32()? as usize;
        if depth > MAX_PROOF_DEPTH {
            return Err(Error::SerializationError {
                context: "MerkleProof::decode",
                message: format!("proof depth {} exceeds maximum", depth),
            });
        }

        let mut siblings = Vec::with_capacity(depth);
        for _ in 0..depth {
            siblings.push(r.fixed::<DIGEST_SIZE>()?);
        }
        Ok(Self {
            leaf_index,
            siblings,
        })
    }
}

/// Immutable commitment tree over a sequence of byte-string leaves.
pub struct MerkleTree {
    /// Heap-ordered node arena; index 0 unused, root at 1, leaves at
    /// `capacity..capacity + capacity`.
    nodes: Vec<[u8; DIGEST_SIZE]>,
    capacity: usize,
    leaf_count: usize,
}

impl MerkleTree {
    /// Build a tree over the given leaves.
    ///
    /// # Errors
    /// `InvalidParameter` if `leaves` is empty or larger than 2^32.
    pub fn build<T: AsRef<[u8]>>(leaves: &[T]) -> Result<Self> {
        validate::parameter(
            !leaves.is_empty(),
            "MerkleTree::build",
            "tree needs at least one leaf",
        )?;
        validate::parameter(
            leaves.len() <= 1 << MAX_PROOF_DEPTH,
            "MerkleTree::build",
            "leaf count exceeds maximum tree size",
        )?;

        let leaf_count = leaves.len();
        let capacity = leaf_count.next_power_of_two();
        let mut nodes = vec![[0u8; DIGEST_SIZE]; 2 * capacity];

        for (i, leaf) in leaves.iter().enumerate() {
            nodes[capacity + i] = leaf_hash(leaf.as_ref());
        }
        // Pad by repeating the final leaf hash; padding positions are not
        // provable since prove() bounds the index by leaf_count.
        let last = nodes[capacity + leaf_count - 1];
        for i in leaf_count..capacity {
            nodes[capacity + i] = last;
        }

        for i in (1..capacity).rev() {
            let (left, right) = (nodes[2 * i], nodes[2 * i + 1]);
            nodes[i] = node_hash(&left, &right);
        }

        Ok(Self {
            nodes,
            capacity,
            leaf_count,
        })
    }

    /// The committed root.
    pub fn root(&self) -> [u8; DIGEST_SIZE] {
        self.nodes[1]
    }

    /// Number of real (non-padding) leaves.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Produce an inclusion proof for the leaf at `index`.
    ///
    /// # Errors
    /// `InvalidParameter` if `index` is out of range.
    pub fn prove(&self, index: usize) -> Result<MerkleProof> {
        validate::parameter(
            index < self.leaf_count,
            "MerkleTree::prove",
            "leaf index out of range",
        )?;

        let mut siblings = Vec::new();
        let mut pos = self.capacity + index;
        while pos > 1 {
            siblings.push(self.nodes[pos ^ 1]);
            pos >>= 1;
        }

        Ok(MerkleProof {
            leaf_index: index as u32,
            siblings,
        })
    }
}

/// Verify that `leaf_data` is included under `root` at the proof's index.
///
/// Recomputes the path bottom-up and compares against the root in constant
/// time. Returns `false` for any inconsistency; never panics on a
/// malformed proof.
pub fn verify_proof(root: &[u8; DIGEST_SIZE], leaf_data: &[u8], proof: &MerkleProof) -> bool {
    let depth = proof.siblings.len();
    if depth > MAX_PROOF_DEPTH {
        return false;
    }
    // The index must be addressable at the proof's depth.
    if u64::from(proof.leaf_index) >> depth != 0 {
        return false;
    }

    let mut acc = leaf_hash(leaf_data);
    let mut pos = proof.leaf_index;
    for sibling in &proof.siblings {
        acc = if pos & 1 == 1 {
            node_hash(sibling, &acc)
        } else {
            node_hash(&acc, sibling)
        };
        pos >>= 1;
    }

    ct_eq(acc, *root)
}

#[cfg(test)]
mod tests;
