//! Protocol sessions behind the uniform key-exchange surface
//!
//! A session is created once with a [`Protocol`] and a [`Role`] and then
//! driven through the `KeyExchange` calls. Each variant is a small state
//! machine: calls out of protocol order fail with `InvalidState`, and any
//! validation failure moves the session to a terminal aborted state that
//! refuses all further calls. State transitions always replace the prior
//! state, so secrets held by a superseded state are dropped (and wiped)
//! at the transition.

use crate::board::{BoardTransmission, PuzzleBoard, VerifiedBoard};
use crate::dh::{self, DhKeyPair};
use crate::group::GroupParameters;
use crate::puzzle::PuzzleParameters;
use num_bigint::BigUint;
use puzzlebox_algorithms::merkle::DIGEST_SIZE;
use puzzlebox_api::{Error, KeyExchange, Result, SharedSecret};
use puzzlebox_internal::{WireReader, WireWriter};
use rand::{CryptoRng, RngCore};

const TAG_DH_INITIATION: u8 = 0x01;
const TAG_DH_RESPONSE: u8 = 0x02;
const TAG_BOARD_INITIATION: u8 = 0x03;
const TAG_BOARD_CONFIRMATION: u8 = 0x04;

/// Which side of the exchange this session drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Sends the initiation, consumes the response.
    Initiator,
    /// Consumes the initiation, sends the response.
    Responder,
}

/// Protocol variant plus the local copy of its parameters.
///
/// Parameters are always configured out of band on both sides; the copies
/// that arrive on the wire are only ever compared against these, never
/// trusted on their own.
#[derive(Debug, Clone)]
pub enum Protocol {
    /// Finite-field Diffie-Hellman over the given group.
    DiffieHellman(GroupParameters),
    /// Merkle puzzle board with the given board shape.
    PuzzleBoard(PuzzleParameters),
}

/// A protocol message in decoded form.
///
/// The wire form is a one-byte tag followed by length-prefixed fields.
/// Sessions accept exactly the message kind their state expects; any other
/// tag is an `InvalidState` error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// DH opening message: the sender's group copy and public value.
    DhInitiation {
        /// Sender's group parameters, echoed for cross-checking.
        group: GroupParameters,
        /// Sender's ephemeral public value.
        public_value: BigUint,
    },
    /// DH reply carrying the responder's public value.
    DhResponse {
        /// Responder's ephemeral public value.
        public_value: BigUint,
    },
    /// Puzzle board opening message: commitment root, then the board.
    ///
    /// The root appears before the transmission both in this structure and
    /// on the wire, and the receiver binds to it before any ciphertext is
    /// examined.
    BoardInitiation {
        /// Merkle commitment over the board's ciphertexts.
        root: [u8; DIGEST_SIZE],
        /// The full board with per-puzzle inclusion proofs.
        transmission: BoardTransmission,
    },
    /// Puzzle board reply: which puzzle the responder solved.
    BoardConfirmation {
        /// Board index of the solved puzzle.
        index: u32,
    },
}

impl Message {
    /// Encode to the wire form.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        match self {
            Self::DhInitiation {
                group,
                public_value,
            } => {
                w.put_u8(TAG_DH_INITIATION);
                group.encode(&mut w);
                w.put_bytes(&public_value.to_bytes_be());
            }
            Self::DhResponse { public_value } => {
                w.put_u8(TAG_DH_RESPONSE);
                w.put_bytes(&public_value.to_bytes_be());
            }
            Self::BoardInitiation { root, transmission } => {
                w.put_u8(TAG_BOARD_INITIATION);
                w.put_bytes(root);
                transmission.encode(&mut w);
            }
            Self::BoardConfirmation { index } => {
                w.put_u8(TAG_BOARD_CONFIRMATION);
                w.put_u32(*index);
            }
        }
        w.into_bytes()
    }

    /// Decode from the wire form, rejecting trailing bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut r = WireReader::new(bytes);
        let message = match r.u8()? {
            TAG_DH_INITIATION => {
                let group = GroupParameters::decode(&mut r)?;
                let public_value = BigUint::from_bytes_be(r.bytes()?);
                Self::DhInitiation {
                    group,
                    public_value,
                }
            }
            TAG_DH_RESPONSE => Self::DhResponse {
                public_value: BigUint::from_bytes_be(r.bytes()?),
            },
            TAG_BOARD_INITIATION => {
                let root = r.fixed::<DIGEST_SIZE>()?;
                let transmission = BoardTransmission::decode(&mut r)?;
                Self::BoardInitiation { root, transmission }
            }
            TAG_BOARD_CONFIRMATION => Self::BoardConfirmation { index: r.u32()? },
            tag => {
                return Err(Error::SerializationError {
                    context: "Message::decode",
                    message: format!("unknown message tag {:#04x}", tag),
                })
            }
        };
        r.finish()?;
        Ok(message)
    }
}

enum DhState {
    Ready,
    AwaitingResponse(DhKeyPair),
    Derived(SharedSecret),
    Complete,
    Aborted,
}

/// Diffie-Hellman session state machine.
pub struct DhExchange {
    params: GroupParameters,
    role: Role,
    state: DhState,
}

impl DhExchange {
    /// New session over a locally validated group.
    pub fn new(params: GroupParameters, role: Role) -> Self {
        Self {
            params,
            role,
            state: DhState::Ready,
        }
    }
}

impl KeyExchange for DhExchange {
    fn generate_initiation<R: CryptoRng + RngCore>(&mut self, rng: &mut R) -> Result<Vec<u8>> {
        // Replacing the state up front makes every error path terminal.
        let state = core::mem::replace(&mut self.state, DhState::Aborted);
        if self.role != Role::Initiator || !matches!(state, DhState::Ready) {
            return Err(Error::InvalidState {
                context: "DhExchange::generate_initiation",
                expected: "ready initiator",
            });
        }

        let keypair = DhKeyPair::generate(&self.params, rng)?;
        let message = Message::DhInitiation {
            group: self.params.clone(),
            public_value: keypair.public_value().clone(),
        }
        .encode();
        self.state = DhState::AwaitingResponse(keypair);
        Ok(message)
    }

    fn respond<R: CryptoRng + RngCore>(
        &mut self,
        rng: &mut R,
        initiation: &[u8],
    ) -> Result<Vec<u8>> {
        let state = core::mem::replace(&mut self.state, DhState::Aborted);
        if self.role != Role::Responder || !matches!(state, DhState::Ready) {
            return Err(Error::InvalidState {
                context: "DhExchange::respond",
                expected: "ready responder",
            });
        }

        let (group, peer_public) = match Message::decode(initiation)? {
            Message::DhInitiation {
                group,
                public_value,
            } => (group, public_value),
            _ => {
                return Err(Error::InvalidState {
                    context: "DhExchange::respond",
                    expected: "DH initiation message",
                })
            }
        };
        self.params.ensure_matches(&group)?;

        let keypair = DhKeyPair::generate(&self.params, rng)?;
        let secret = dh::derive_shared_secret(&self.params, &keypair, &peer_public, rng)?;
        let message = Message::DhResponse {
            public_value: keypair.public_value().clone(),
        }
        .encode();
        self.state = DhState::Derived(secret);
        Ok(message)
    }

    fn finalize<R: CryptoRng + RngCore>(
        &mut self,
        rng: &mut R,
        response: &[u8],
    ) -> Result<SharedSecret> {
        let state = core::mem::replace(&mut self.state, DhState::Aborted);
        let keypair = match state {
            DhState::AwaitingResponse(keypair) => keypair,
            _ => {
                return Err(Error::InvalidState {
                    context: "DhExchange::finalize",
                    expected: "awaiting response",
                })
            }
        };

        let peer_public = match Message::decode(response)? {
            Message::DhResponse { public_value } => public_value,
            _ => {
                return Err(Error::InvalidState {
                    context: "DhExchange::finalize",
                    expected: "DH response message",
                })
            }
        };

        let secret = dh::derive_shared_secret(&self.params, &keypair, &peer_public, rng)?;
        self.state = DhState::Complete;
        Ok(secret)
    }

    fn take_shared_secret(&mut self) -> Result<SharedSecret> {
        let state = core::mem::replace(&mut self.state, DhState::Aborted);
        match state {
            DhState::Derived(secret) => {
                self.state = DhState::Complete;
                Ok(secret)
            }
            _ => Err(Error::InvalidState {
                context: "DhExchange::take_shared_secret",
                expected: "derived",
            }),
        }
    }
}

enum BoardState {
    Ready,
    AwaitingConfirmation(PuzzleBoard),
    Derived(SharedSecret),
    Complete,
    Aborted,
}

/// Merkle puzzle board session state machine.
///
/// The initiator builds and commits the board; the responder verifies,
/// solves one puzzle, and confirms by index. Both sides end up holding the
/// solved puzzle's candidate as the shared secret.
pub struct PuzzleBoardExchange {
    params: PuzzleParameters,
    role: Role,
    state: BoardState,
}

impl PuzzleBoardExchange {
    /// New session over an agreed board shape.
    pub fn new(params: PuzzleParameters, role: Role) -> Self {
        Self {
            params,
            role,
            state: BoardState::Ready,
        }
    }
}

impl KeyExchange for PuzzleBoardExchange {
    fn generate_initiation<R: CryptoRng + RngCore>(&mut self, rng: &mut R) -> Result<Vec<u8>> {
        let state = core::mem::replace(&mut self.state, BoardState::Aborted);
        if self.role != Role::Initiator || !matches!(state, BoardState::Ready) {
            return Err(Error::InvalidState {
                context: "PuzzleBoardExchange::generate_initiation",
                expected: "ready initiator",
            });
        }

        let board = PuzzleBoard::build(rng, &self.params)?;
        let message = Message::BoardInitiation {
            root: board.commitment(),
            transmission: board.transmission()?,
        }
        .encode();
        self.state = BoardState::AwaitingConfirmation(board);
        Ok(message)
    }

    fn respond<R: CryptoRng + RngCore>(
        &mut self,
        rng: &mut R,
        initiation: &[u8],
    ) -> Result<Vec<u8>> {
        let state = core::mem::replace(&mut self.state, BoardState::Aborted);
        if self.role != Role::Responder || !matches!(state, BoardState::Ready) {
            return Err(Error::InvalidState {
                context: "PuzzleBoardExchange::respond",
                expected: "ready responder",
            });
        }

        let (root, transmission) = match Message::decode(initiation)? {
            Message::BoardInitiation { root, transmission } => (root, transmission),
            _ => {
                return Err(Error::InvalidState {
                    context: "PuzzleBoardExchange::respond",
                    expected: "board initiation message",
                })
            }
        };

        let verified = VerifiedBoard::receive(&root, &transmission, &self.params)?;
        let (index, solved) = verified.choose_and_solve(rng)?;
        let secret = SharedSecret::new(solved.candidate.as_slice().to_vec());
        let message = Message::BoardConfirmation { index }.encode();
        self.state = BoardState::Derived(secret);
        Ok(message)
    }

    fn finalize<R: CryptoRng + RngCore>(
        &mut self,
        _rng: &mut R,
        response: &[u8],
    ) -> Result<SharedSecret> {
        let state = core::mem::replace(&mut self.state, BoardState::Aborted);
        let board = match state {
            BoardState::AwaitingConfirmation(board) => board,
            _ => {
                return Err(Error::InvalidState {
                    context: "PuzzleBoardExchange::finalize",
                    expected: "awaiting confirmation",
                })
            }
        };

        let index = match Message::decode(response)? {
            Message::BoardConfirmation { index } => index,
            _ => {
                return Err(Error::InvalidState {
                    context: "PuzzleBoardExchange::finalize",
                    expected: "board confirmation message",
                })
            }
        };

        let secret = board.confirm(index)?;
        self.state = BoardState::Complete;
        Ok(secret)
    }

    fn take_shared_secret(&mut self) -> Result<SharedSecret> {
        let state = core::mem::replace(&mut self.state, BoardState::Aborted);
        match state {
            BoardState::Derived(secret) => {
                self.state = BoardState::Complete;
                Ok(secret)
            }
            _ => Err(Error::InvalidState {
                context: "PuzzleBoardExchange::take_shared_secret",
                expected: "derived",
            }),
        }
    }
}

enum SessionInner {
    Dh(DhExchange),
    Board(PuzzleBoardExchange),
}

/// A key-agreement session over either protocol variant.
///
/// Thin tagged union over the per-protocol state machines; callers that
/// know the variant statically can use [`DhExchange`] or
/// [`PuzzleBoardExchange`] directly.
pub struct ExchangeSession {
    inner: SessionInner,
}

impl ExchangeSession {
    /// Create a session for the given protocol and role.
    pub fn new(protocol: Protocol, role: Role) -> Self {
        let inner = match protocol {
            Protocol::DiffieHellman(params) => SessionInner::Dh(DhExchange::new(params, role)),
            Protocol::PuzzleBoard(params) => {
                SessionInner::Board(PuzzleBoardExchange::new(params, role))
            }
        };
        Self { inner }
    }
}

impl KeyExchange for ExchangeSession {
    fn generate_initiation<R: CryptoRng + RngCore>(&mut self, rng: &mut R) -> Result<Vec<u8>> {
        match &mut self.inner {
            SessionInner::Dh(s) => s.generate_initiation(rng),
            SessionInner::Board(s) => s.generate_initiation(rng),
        }
    }

    fn respond<R: CryptoRng + RngCore>(
        &mut self,
        rng: &mut R,
        initiation: &[u8],
    ) -> Result<Vec<u8>> {
        match &mut self.inner {
            SessionInner::Dh(s) => s.respond(rng, initiation),
            SessionInner::Board(s) => s.respond(rng, initiation),
        }
    }

    fn finalize<R: CryptoRng + RngCore>(
        &mut self,
        rng: &mut R,
        response: &[u8],
    ) -> Result<SharedSecret> {
        match &mut self.inner {
            SessionInner::Dh(s) => s.finalize(rng, response),
            SessionInner::Board(s) => s.finalize(rng, response),
        }
    }

    fn take_shared_secret(&mut self) -> Result<SharedSecret> {
        match &mut self.inner {
            SessionInner::Dh(s) => s.take_shared_secret(),
            SessionInner::Board(s) => s.take_shared_secret(),
        }
    }
}
