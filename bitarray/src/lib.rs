//! Fixed-size bit arrays.
//!
//! # Overview
//!
//! A [BitArray] holds a fixed number of bits packed into [u8] blocks, bit 0 in the least
//! significant position of the first block. It supports:
//! - Single-bit access (`get`, `set`, `unset`, `toggle`)
//! - In-place bitwise algebra (`and`, `or`, `xor`, `and_not`, `not`)
//! - Shape operations (`reverse`, `rotate`, `shift`, `slice`, `concat`)
//! - Queries (`count_ones`, `leading_zeros`, `trailing_zeros`)
//! - A binary-digit string form and a length-prefixed binary encoding
//!
//! # String Form
//!
//! Strings are written most significant bit first, so bit 0 is the rightmost digit. Spaces are
//! ignored when parsing.
//!
//! ```
//! use bitarray::BitArray;
//!
//! let mut bits: BitArray = "0001".parse().unwrap();
//! bits.rotate(3);
//! assert_eq!(bits.to_string(), "1000");
//!
//! let joined = BitArray::concat(&"0101".parse().unwrap(), &"101".parse().unwrap());
//! assert_eq!(joined.to_string(), "0101101");
//! ```
//!
//! # Binary Encoding
//!
//! [BitArray] implements the `commonware-codec` traits. The encoding is the bit length followed
//! by the raw blocks. Decoding takes a [commonware_codec::RangeCfg] bounding the accepted length.
//!
//! ```
//! use bitarray::BitArray;
//!
//! let bits = BitArray::new(10, &[0, 9]).unwrap();
//! let encoded = bits.marshal();
//! assert_eq!(BitArray::unmarshal(&encoded).unwrap(), bits);
//! ```

mod bitarray;
pub use bitarray::{BitArray, BitIterator};
mod error;
pub use error::Error;
