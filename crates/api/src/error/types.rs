//! Error type definitions for key-agreement operations
//!
//! Every cryptographic validation failure is a value of [`Error`], never a
//! panic: all of these conditions are reachable from attacker-supplied
//! input. Error messages describe the check that failed and deliberately
//! never carry key material, exponents, or puzzle plaintext.

/// Primary error type for key-agreement operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Group parameters failed validation (composite modulus, generator
    /// out of range, or generator of small order)
    InvalidGroup {
        /// Operation that rejected the parameters
        context: &'static str,
    },

    /// The two parties' group parameter copies are not byte-identical
    GroupMismatch {
        /// Operation that detected the mismatch
        context: &'static str,
    },

    /// A received public value failed range or subgroup-order validation;
    /// treated as a small-subgroup confinement attempt
    InvalidPublicValue {
        /// Operation that rejected the value
        context: &'static str,
    },

    /// Key generation produced only degenerate values within the bounded
    /// retry budget; the session must abort
    WeakKey {
        /// Operation that exhausted its retries
        context: &'static str,
    },

    /// Puzzle board commitment or solving failed: an inclusion proof did
    /// not verify, the transmission shape was wrong, or the solver
    /// exhausted its attempt ceiling
    BoardCorrupt {
        /// Operation that detected the corruption
        context: &'static str,
    },

    /// Authenticated decryption failed its tag check
    TagMismatch {
        /// Operation whose decryption failed
        context: &'static str,
    },

    /// A session method was called out of protocol order
    InvalidState {
        /// Operation that was attempted
        context: &'static str,
        /// State the session needed to be in
        expected: &'static str,
    },

    /// Malformed caller-supplied parameter
    InvalidParameter {
        /// Operation that rejected the parameter
        context: &'static str,
        /// What was wrong with it
        message: String,
    },

    /// Invalid length error with context
    InvalidLength {
        /// Operation that rejected the input
        context: &'static str,
        /// Expected byte length
        expected: usize,
        /// Actual byte length
        actual: usize,
    },

    /// Wire encoding or decoding error
    SerializationError {
        /// Operation that failed
        context: &'static str,
        /// Codec-level detail (positions only, never input bytes)
        message: String,
    },

    /// The secure random source failed or rejection sampling exceeded its
    /// attempt budget
    RandomGenerationError {
        /// Operation that needed randomness
        context: &'static str,
    },

    /// Other error
    Other {
        /// Operation that failed
        context: &'static str,
        /// Free-form detail
        message: String,
    },
}

/// Result type for key-agreement operations
pub type Result<T> = core::result::Result<T, Error>;

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidGroup { context } => {
                write!(f, "invalid group parameters: {}", context)
            }
            Self::GroupMismatch { context } => {
                write!(f, "group parameter mismatch: {}", context)
            }
            Self::InvalidPublicValue { context } => {
                write!(f, "invalid public value: {}", context)
            }
            Self::WeakKey { context } => {
                write!(f, "degenerate key pair after bounded retries: {}", context)
            }
            Self::BoardCorrupt { context } => {
                write!(f, "puzzle board corrupt: {}", context)
            }
            Self::TagMismatch { context } => {
                write!(f, "authentication tag mismatch: {}", context)
            }
            Self::InvalidState { context, expected } => {
                write!(f, "{}: session not in state {}", context, expected)
            }
            Self::InvalidParameter { context, message } => {
                write!(f, "{}: {}", context, message)
            }
            Self::InvalidLength {
                context,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "{}: invalid length (expected {}, got {})",
                    context, expected, actual
                )
            }
            Self::SerializationError { context, message } => {
                write!(f, "serialization error: {}: {}", context, message)
            }
            Self::RandomGenerationError { context } => {
                write!(f, "random generation error: {}", context)
            }
            Self::Other { context, message } => {
                write!(f, "{}: {}", context, message)
            }
        }
    }
}
