//! Bit-array implementation
//!
//! The bit-array is a fixed-size sequence of bits packed into [u8] "blocks". Bit `i` lives in
//! block `i / 8` at bit position `i % 8` (least significant bit first). If the size is not a
//! multiple of 8, the last block holds some padding bits that are not part of the array. An
//! invariant of the implementation is that padding bits are always 0, so block-wise comparison,
//! counting, and encoding never need to special-case them.
//!
//! The size is fixed at construction and is always positive.

use crate::Error;
use bytes::{Buf, BufMut};
use commonware_codec::{Decode, EncodeSize, Error as CodecError, FixedSize, RangeCfg, Read, Write};
use core::{
    fmt::{self, Formatter, Write as _},
    ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Index, Not, Range},
    str::FromStr,
};
use tracing::debug;

/// Type alias for the underlying block type.
type Block = u8;

/// Number of bits in a [Block].
const BITS_PER_BLOCK: usize = Block::BITS as usize;

/// Empty block of bits (all bits set to 0).
const EMPTY_BLOCK: Block = 0;

/// Full block of bits (all bits set to 1).
const FULL_BLOCK: Block = Block::MAX;

/// Direction in which bits are moved by [BitArray::shift] and [BitArray::rotate].
#[derive(Clone, Copy)]
enum Direction {
    /// Towards the high-order end (higher indices).
    Left,
    /// Towards the low-order end (lower indices).
    Right,
}

/// A fixed-size array of bits.
///
/// Cloning performs a deep copy of the storage.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitArray {
    /// The underlying storage for the bits.
    storage: Vec<Block>,
    /// The total number of bits (always positive).
    num_bits: usize,
}

impl BitArray {
    /// Creates a new `BitArray` with `size` bits, where the bits at `indices` are set to 1 and
    /// all others are 0.
    ///
    /// Returns [Error::InvalidSize] if `size` is 0 and [Error::IndexOutOfRange] if any index is
    /// not less than `size`.
    pub fn new(size: usize, indices: &[usize]) -> Result<Self, Error> {
        let mut result = Self::zeroes(size)?;
        for &index in indices {
            result.check_index(index)?;
            result.set_bit_unchecked(index);
        }
        Ok(result)
    }

    /// Creates a new `BitArray` with `size` bits, all initialized to zero.
    #[inline]
    pub fn zeroes(size: usize) -> Result<Self, Error> {
        if size == 0 {
            return Err(Error::InvalidSize);
        }
        Ok(Self {
            storage: vec![EMPTY_BLOCK; Self::num_blocks(size)],
            num_bits: size,
        })
    }

    /// Creates a new `BitArray` with `size` bits, all initialized to one.
    #[inline]
    pub fn ones(size: usize) -> Result<Self, Error> {
        let mut result = Self::zeroes(size)?;
        result.set_all();
        Ok(result)
    }

    /// Creates a new `BitArray` from a slice of booleans, where `bools[i]` becomes bit `i`.
    pub fn from_bools(bools: &[bool]) -> Result<Self, Error> {
        let mut result = Self::zeroes(bools.len())?;
        for (index, &value) in bools.iter().enumerate() {
            if value {
                result.set_bit_unchecked(index);
            }
        }
        Ok(result)
    }

    /// Parses a string of binary digits, most significant bit first (the rightmost digit is bit
    /// 0). Space characters are ignored.
    ///
    /// Returns [Error::InvalidCharacter] for any character other than `'0'`, `'1'`, or space and
    /// [Error::InvalidSize] if the string contains no digits.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let digits: Vec<char> = text.chars().filter(|&c| c != ' ').collect();
        let mut result = Self::zeroes(digits.len())?;
        for (position, &digit) in digits.iter().enumerate() {
            let index = digits.len() - 1 - position;
            match digit {
                '1' => result.set_bit_unchecked(index),
                '0' => {}
                other => {
                    debug!(character = ?other, position, "rejected bit array string");
                    return Err(Error::InvalidCharacter(other));
                }
            }
        }
        Ok(result)
    }

    /// Returns the number of bits in the array.
    #[inline]
    pub fn size(&self) -> usize {
        self.num_bits
    }

    /// Gets the value of the bit at `index` (true if 1, false if 0).
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        self.assert_index(index);
        self.get_bit_unchecked(index)
    }

    /// Sets the bit at `index` to 1.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn set(&mut self, index: usize) {
        self.assert_index(index);
        self.set_bit_unchecked(index);
    }

    /// Sets the bit at `index` to 0.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn unset(&mut self, index: usize) {
        self.assert_index(index);
        self.clear_bit_unchecked(index);
    }

    /// Flips the bit at `index` and returns its new value.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn toggle(&mut self, index: usize) -> bool {
        self.assert_index(index);
        self.toggle_bit_unchecked(index);
        self.get_bit_unchecked(index)
    }

    /// Sets the bit at `index` to the specified `value`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn set_to(&mut self, index: usize, value: bool) {
        self.assert_index(index);
        self.set_bit_to_unchecked(index, value);
    }

    /// Sets all bits to 0.
    #[inline]
    pub fn clear(&mut self) {
        self.storage.fill(EMPTY_BLOCK);
    }

    /// Sets all bits to 1.
    #[inline]
    pub fn set_all(&mut self) {
        self.storage.fill(FULL_BLOCK);
        self.clear_trailing_bits();
    }

    /// Returns the number of bits set to 1.
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.storage
            .iter()
            .map(|block| block.count_ones() as usize)
            .sum()
    }

    /// Returns the number of bits set to 0.
    #[inline]
    pub fn count_zeros(&self) -> usize {
        self.num_bits - self.count_ones()
    }

    /// Returns the number of consecutive 0 bits, starting from the highest index.
    pub fn leading_zeros(&self) -> usize {
        let mut count = 0;
        for &block in self.storage.iter().rev() {
            if block == EMPTY_BLOCK {
                count += BITS_PER_BLOCK;
            } else {
                count += block.leading_zeros() as usize;
                break;
            }
        }

        // The padding bits of the last block were counted as zeros above
        count - self.num_padding_bits()
    }

    /// Returns the number of consecutive 0 bits, starting from index 0.
    pub fn trailing_zeros(&self) -> usize {
        let mut count = 0;
        for &block in &self.storage {
            if block == EMPTY_BLOCK {
                count += BITS_PER_BLOCK;
            } else {
                count += block.trailing_zeros() as usize;
                break;
            }
        }
        count.min(self.num_bits)
    }

    /// Performs a bitwise AND with another BitArray.
    ///
    /// # Panics
    ///
    /// Panics if the sizes don't match.
    pub fn and(&mut self, other: &BitArray) {
        self.binary_op(other, |a, b| a & b);
    }

    /// Performs a bitwise OR with another BitArray.
    ///
    /// # Panics
    ///
    /// Panics if the sizes don't match.
    pub fn or(&mut self, other: &BitArray) {
        self.binary_op(other, |a, b| a | b);
    }

    /// Performs a bitwise XOR with another BitArray.
    ///
    /// # Panics
    ///
    /// Panics if the sizes don't match.
    pub fn xor(&mut self, other: &BitArray) {
        self.binary_op(other, |a, b| a ^ b);
    }

    /// Clears every bit that is set in `other` (bitwise AND-NOT).
    ///
    /// # Panics
    ///
    /// Panics if the sizes don't match.
    pub fn and_not(&mut self, other: &BitArray) {
        self.binary_op(other, |a, b| a & !b);
    }

    /// Flips all bits (1s become 0s and vice versa).
    pub fn invert(&mut self) {
        for block in &mut self.storage {
            *block = !*block;
        }
        self.clear_trailing_bits();
    }

    /// Reverses the order of the bits, so bit `i` swaps with bit `size - 1 - i`.
    pub fn reverse(&mut self) {
        let (mut low, mut high) = (0, self.num_bits - 1);
        while low < high {
            let low_bit = self.get_bit_unchecked(low);
            let high_bit = self.get_bit_unchecked(high);
            self.set_bit_to_unchecked(low, high_bit);
            self.set_bit_to_unchecked(high, low_bit);
            low += 1;
            high -= 1;
        }
    }

    /// Rotates the bits by `|n|` positions: towards the high-order end if `n > 0`, towards the
    /// low-order end if `n < 0`. Bits rotated out of one end re-enter at the other.
    ///
    /// `n` is reduced by the remainder of division by the size before its sign is inspected.
    pub fn rotate(&mut self, n: isize) {
        // An array larger than `isize::MAX` bits can never be rotated a full turn
        let n = match isize::try_from(self.num_bits) {
            Ok(size) => n % size,
            Err(_) => n,
        };
        let by = n.unsigned_abs();
        let (direction, wrapped) = match n {
            0 => return,
            n if n > 0 => (
                Direction::Left,
                self.slice(self.num_bits - by, self.num_bits),
            ),
            _ => (Direction::Right, self.slice(0, by)),
        };

        let vacated = self.move_bits(by, direction);
        for (offset, bit) in wrapped.iter().enumerate() {
            self.set_bit_to_unchecked(vacated.start + offset, bit);
        }
    }

    /// Shifts the bits by `|n|` positions: towards the high-order end if `n > 0`, towards the
    /// low-order end if `n < 0`. Bits shifted out are discarded and vacated positions are filled
    /// with 0. Shifting by at least the size clears the array.
    pub fn shift(&mut self, n: isize) {
        let by = n.unsigned_abs();
        if by >= self.num_bits {
            self.clear();
            return;
        }
        let direction = match n {
            0 => return,
            n if n > 0 => Direction::Left,
            _ => Direction::Right,
        };

        for index in self.move_bits(by, direction) {
            self.clear_bit_unchecked(index);
        }
    }

    /// Returns a new `BitArray` holding the bits at indices `[start, end)`, where bit `k` of the
    /// result is bit `start + k` of `self`.
    ///
    /// # Panics
    ///
    /// Panics if `start` or `end - 1` is out of bounds, or if the range is empty.
    pub fn slice(&self, start: usize, end: usize) -> BitArray {
        self.assert_index(start);
        if end <= start {
            panic!("{}", Error::InvalidSize);
        }
        self.assert_index(end - 1);

        let num_bits = end - start;
        let mut result = BitArray {
            storage: vec![EMPTY_BLOCK; Self::num_blocks(num_bits)],
            num_bits,
        };

        // Block-aligned slices can copy whole blocks
        if Self::bit_offset(start) == 0 {
            let first = Self::block_index(start);
            let count = result.storage.len();
            result
                .storage
                .copy_from_slice(&self.storage[first..first + count]);
            result.clear_trailing_bits();
            return result;
        }

        for (offset, index) in (start..end).enumerate() {
            if self.get_bit_unchecked(index) {
                result.set_bit_unchecked(offset);
            }
        }
        result
    }

    /// Returns a new `BitArray` whose low-order bits come from `low` and whose high-order bits
    /// come from `high`.
    ///
    /// This matches the string form: the concatenation of the strings of `high` and `low` parses
    /// to the result.
    pub fn concat(high: &BitArray, low: &BitArray) -> BitArray {
        let num_bits = high.num_bits + low.num_bits;
        let mut result = BitArray {
            storage: vec![EMPTY_BLOCK; Self::num_blocks(num_bits)],
            num_bits,
        };

        // The padding bits of `low` are zero, so its blocks can be copied as-is
        result.storage[..low.storage.len()].copy_from_slice(&low.storage);
        if Self::bit_offset(low.num_bits) == 0 {
            result.storage[low.storage.len()..].copy_from_slice(&high.storage);
            return result;
        }

        for (offset, bit) in high.iter().enumerate() {
            if bit {
                result.set_bit_unchecked(low.num_bits + offset);
            }
        }
        result
    }

    /// Creates an iterator over the bits, starting at index 0.
    pub fn iter(&self) -> BitIterator<'_> {
        BitIterator { array: self, pos: 0 }
    }

    /// Encodes the array as its bit length followed by its blocks.
    ///
    /// # Panics
    ///
    /// Panics if the size does not fit in a [u32].
    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encode_size());
        self.write(&mut buf);
        buf
    }

    /// Decodes an array produced by [BitArray::marshal], rejecting any trailing bytes.
    pub fn unmarshal(bytes: &[u8]) -> Result<Self, Error> {
        Self::decode_cfg(bytes, &(1usize..).into()).map_err(|err| {
            debug!(?err, len = bytes.len(), "rejected bit array encoding");
            Error::Decode(err)
        })
    }

    // ---------- Helper Functions ----------

    /// Calculates the block index for a given bit index.
    #[inline(always)]
    fn block_index(index: usize) -> usize {
        index / BITS_PER_BLOCK
    }

    /// Calculates the bit offset within a block.
    #[inline(always)]
    fn bit_offset(index: usize) -> usize {
        index % BITS_PER_BLOCK
    }

    /// Calculates the number of blocks needed to store `num_bits`.
    #[inline(always)]
    fn num_blocks(num_bits: usize) -> usize {
        num_bits.div_ceil(BITS_PER_BLOCK)
    }

    /// Creates a mask with the first `num_bits` bits set to 1.
    #[inline(always)]
    fn mask_over_first_n_bits(num_bits: usize) -> Block {
        match num_bits {
            BITS_PER_BLOCK => FULL_BLOCK,
            n if n < BITS_PER_BLOCK => FULL_BLOCK.unbounded_shr((BITS_PER_BLOCK - n) as u32),
            _ => panic!("num_bits exceeds block size: {num_bits}"),
        }
    }

    /// Number of unused bits in the last block.
    #[inline(always)]
    fn num_padding_bits(&self) -> usize {
        match Self::bit_offset(self.num_bits) {
            0 => 0,
            used => BITS_PER_BLOCK - used,
        }
    }

    #[inline(always)]
    fn get_bit_unchecked(&self, index: usize) -> bool {
        let block_index = Self::block_index(index);
        let bit_index = Self::bit_offset(index);
        (self.storage[block_index] & (1 << bit_index)) != 0
    }

    #[inline(always)]
    fn set_bit_unchecked(&mut self, index: usize) {
        let block_index = Self::block_index(index);
        let bit_index = Self::bit_offset(index);
        self.storage[block_index] |= 1 << bit_index;
    }

    #[inline(always)]
    fn clear_bit_unchecked(&mut self, index: usize) {
        let block_index = Self::block_index(index);
        let bit_index = Self::bit_offset(index);
        self.storage[block_index] &= !(1 << bit_index);
    }

    #[inline(always)]
    fn toggle_bit_unchecked(&mut self, index: usize) {
        let block_index = Self::block_index(index);
        let bit_index = Self::bit_offset(index);
        self.storage[block_index] ^= 1 << bit_index;
    }

    #[inline(always)]
    fn set_bit_to_unchecked(&mut self, index: usize, value: bool) {
        if value {
            self.set_bit_unchecked(index);
        } else {
            self.clear_bit_unchecked(index);
        }
    }

    /// Returns an error if the index is out of bounds.
    #[inline(always)]
    fn check_index(&self, index: usize) -> Result<(), Error> {
        if index >= self.num_bits {
            return Err(Error::IndexOutOfRange {
                index,
                size: self.num_bits,
            });
        }
        Ok(())
    }

    /// Asserts that the index is within bounds.
    #[inline(always)]
    #[track_caller]
    fn assert_index(&self, index: usize) {
        if let Err(err) = self.check_index(index) {
            panic!("{err}");
        }
    }

    /// Asserts that the sizes of two BitArrays match.
    #[inline(always)]
    #[track_caller]
    fn assert_eq_size(&self, other: &BitArray) {
        if self.num_bits != other.num_bits {
            panic!(
                "{}",
                Error::SizeMismatch {
                    left: self.num_bits,
                    right: other.num_bits,
                }
            );
        }
    }

    /// Helper for binary operations (AND, OR, XOR, AND-NOT).
    #[inline]
    #[track_caller]
    fn binary_op<F: Fn(Block, Block) -> Block>(&mut self, other: &BitArray, op: F) {
        self.assert_eq_size(other);
        for (a, b) in self.storage.iter_mut().zip(other.storage.iter()) {
            *a = op(*a, *b);
        }
        self.clear_trailing_bits();
    }

    /// Moves every bit `by` positions in `direction`, returning the range of positions that no
    /// bit moved into. Requires `0 < by < num_bits`.
    fn move_bits(&mut self, by: usize, direction: Direction) -> Range<usize> {
        match direction {
            Direction::Left => {
                for index in (by..self.num_bits).rev() {
                    let bit = self.get_bit_unchecked(index - by);
                    self.set_bit_to_unchecked(index, bit);
                }
                0..by
            }
            Direction::Right => {
                for index in 0..self.num_bits - by {
                    let bit = self.get_bit_unchecked(index + by);
                    self.set_bit_to_unchecked(index, bit);
                }
                self.num_bits - by..self.num_bits
            }
        }
    }

    /// Clears any bits in storage beyond the last valid bit. Returns true if any bits were cleared.
    #[inline]
    fn clear_trailing_bits(&mut self) -> bool {
        let bit_offset = Self::bit_offset(self.num_bits);
        if bit_offset == 0 {
            // No extra bits to clear
            return false;
        }

        // Storage always holds at least one block
        let last = self.storage.len() - 1;
        let old_block = self.storage[last];
        self.storage[last] &= Self::mask_over_first_n_bits(bit_offset);

        // Check if the last block was modified
        self.storage[last] != old_block
    }
}

// ---------- Converters ----------

impl From<BitArray> for Vec<bool> {
    fn from(array: BitArray) -> Self {
        array.iter().collect()
    }
}

impl FromStr for BitArray {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ---------- Display ----------

impl fmt::Display for BitArray {
    /// Writes the bits most significant first, exactly `size` digits.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut blocks = self.storage.iter().rev();

        // The last block only contributes its used bits
        if let Some(block) = blocks.next() {
            let width = BITS_PER_BLOCK - self.num_padding_bits();
            write!(f, "{block:0width$b}")?;
        }
        for block in blocks {
            write!(f, "{block:0width$b}", width = BITS_PER_BLOCK)?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitArray {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // For very large BitArrays, only show a preview
        const MAX_DISPLAY: usize = 64;
        const HALF_DISPLAY: usize = MAX_DISPLAY / 2;

        // Closure for writing a bit
        let write_bit = |formatter: &mut Formatter<'_>, index: usize| -> fmt::Result {
            formatter.write_char(if self.get_bit_unchecked(index) {
                '1'
            } else {
                '0'
            })
        };

        f.write_str("BitArray[")?;
        if self.num_bits <= MAX_DISPLAY {
            for i in (0..self.num_bits).rev() {
                write_bit(f, i)?;
            }
        } else {
            // Show the highest and lowest bits with an ellipsis
            for i in (self.num_bits - HALF_DISPLAY..self.num_bits).rev() {
                write_bit(f, i)?;
            }

            f.write_str("...")?;

            for i in (0..HALF_DISPLAY).rev() {
                write_bit(f, i)?;
            }
        }
        f.write_str("]")
    }
}

// ---------- Operations ----------

impl Index<usize> for BitArray {
    type Output = bool;

    /// Allows accessing bits using the `[]` operator.
    ///
    /// Panics if out of bounds.
    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        if self.get(index) {
            &true
        } else {
            &false
        }
    }
}

impl BitAnd for &BitArray {
    type Output = BitArray;

    fn bitand(self, rhs: Self) -> Self::Output {
        let mut result = self.clone();
        result.and(rhs);
        result
    }
}

impl BitOr for &BitArray {
    type Output = BitArray;

    fn bitor(self, rhs: Self) -> Self::Output {
        let mut result = self.clone();
        result.or(rhs);
        result
    }
}

impl BitXor for &BitArray {
    type Output = BitArray;

    fn bitxor(self, rhs: Self) -> Self::Output {
        let mut result = self.clone();
        result.xor(rhs);
        result
    }
}

impl Not for &BitArray {
    type Output = BitArray;

    fn not(self) -> Self::Output {
        let mut result = self.clone();
        result.invert();
        result
    }
}

impl BitAndAssign<&BitArray> for BitArray {
    fn bitand_assign(&mut self, rhs: &BitArray) {
        self.and(rhs);
    }
}

impl BitOrAssign<&BitArray> for BitArray {
    fn bitor_assign(&mut self, rhs: &BitArray) {
        self.or(rhs);
    }
}

impl BitXorAssign<&BitArray> for BitArray {
    fn bitxor_assign(&mut self, rhs: &BitArray) {
        self.xor(rhs);
    }
}

// ---------- Codec ----------

impl Write for BitArray {
    fn write(&self, buf: &mut impl BufMut) {
        // Prefix with the number of bits, which is generally larger than the length of the storage
        self.num_bits.write(buf);
        buf.put_slice(&self.storage);
    }
}

impl Read for BitArray {
    type Cfg = RangeCfg;

    fn read_cfg(buf: &mut impl Buf, range: &Self::Cfg) -> Result<Self, CodecError> {
        // Parse length
        let num_bits = usize::read_cfg(buf, range)?;
        if num_bits == 0 {
            return Err(CodecError::Invalid("BitArray", "zero size"));
        }

        // Parse blocks (checking the length first to avoid allocating for a truncated buffer)
        let num_blocks = Self::num_blocks(num_bits);
        if buf.remaining() < num_blocks {
            return Err(CodecError::EndOfBuffer);
        }
        let mut storage = vec![EMPTY_BLOCK; num_blocks];
        buf.copy_to_slice(&mut storage);

        // Ensure there were no trailing bits
        let mut result = BitArray { storage, num_bits };
        if result.clear_trailing_bits() {
            return Err(CodecError::Invalid("BitArray", "trailing bits"));
        }

        Ok(result)
    }
}

impl EncodeSize for BitArray {
    fn encode_size(&self) -> usize {
        self.num_bits.encode_size() + (Block::SIZE * self.storage.len())
    }
}

// ---------- Iterator ----------

/// Iterator over the bits of a [BitArray], starting at index 0.
pub struct BitIterator<'a> {
    /// Reference to the BitArray being iterated over
    array: &'a BitArray,

    /// Current position in the BitArray (0-indexed)
    pos: usize,
}

impl Iterator for BitIterator<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.array.size() {
            return None;
        }

        let bit = self.array.get_bit_unchecked(self.pos);
        self.pos += 1;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.array.size() - self.pos;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BitIterator<'_> {}

impl<'a> IntoIterator for &'a BitArray {
    type Item = bool;
    type IntoIter = BitIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
