//! Error types for bit array operations

use thiserror::Error;

/// Error type for bit array operations.
///
/// Construction and decoding return these as values. Index and size checks on an existing
/// [crate::BitArray] are contract violations: they panic with the `Display` of the matching
/// variant instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("size must be positive")]
    InvalidSize,
    #[error("index out of range: {index} >= {size}")]
    IndexOutOfRange { index: usize, size: usize },
    #[error("size mismatch: {left} != {right}")]
    SizeMismatch { left: usize, right: usize },
    #[error("invalid character: {0:?}")]
    InvalidCharacter(char),
    #[error("decode error: {0}")]
    Decode(#[from] commonware_codec::Error),
}
