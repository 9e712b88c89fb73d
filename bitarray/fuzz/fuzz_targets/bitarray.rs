#![no_main]

use arbitrary::Arbitrary;
use bitarray::{BitArray, Error};
use commonware_codec::{Decode, Encode};
use libfuzzer_sys::fuzz_target;

/// Upper bound on generated sizes to keep iterations fast.
const MAX_SIZE: usize = 4096;

#[derive(Arbitrary, Debug)]
enum BitArrayOperation {
    New(usize, Vec<usize>),
    Parse(String),
    Set(Vec<bool>, usize),
    Unset(Vec<bool>, usize),
    Toggle(Vec<bool>, usize),
    SetAll(Vec<bool>),
    Clear(Vec<bool>),
    And(Vec<bool>, Vec<bool>),
    Or(Vec<bool>, Vec<bool>),
    Xor(Vec<bool>, Vec<bool>),
    AndNot(Vec<bool>, Vec<bool>),
    Invert(Vec<bool>),
    Reverse(Vec<bool>),
    Rotate(Vec<bool>, isize),
    Shift(Vec<bool>, isize),
    Slice(Vec<bool>, usize, usize),
    Concat(Vec<bool>, Vec<bool>),
    Unmarshal(Vec<u8>),
}

fn array(bools: &[bool]) -> Option<BitArray> {
    let bools = &bools[..bools.len().min(MAX_SIZE)];
    BitArray::from_bools(bools).ok()
}

/// Checks the padding and formatting invariants of an array.
fn check(array: &BitArray) {
    let s = array.to_string();
    assert_eq!(s.len(), array.size());
    assert_eq!(BitArray::parse(&s).unwrap(), *array);
    assert!(array.count_ones() <= array.size());
    assert!(array.leading_zeros() <= array.size());
    assert!(array.trailing_zeros() <= array.size());
    assert_eq!(BitArray::unmarshal(&array.marshal()).unwrap(), *array);
}

fn binary(
    a: &[bool],
    b: &[bool],
    op: impl Fn(&mut BitArray, &BitArray),
    expected: impl Fn(bool, bool) -> bool,
) {
    let (Some(mut x), Some(y)) = (array(a), array(b)) else {
        return;
    };
    if x.size() != y.size() {
        return;
    }
    let before = x.clone();
    op(&mut x, &y);
    for i in 0..x.size() {
        assert_eq!(x.get(i), expected(before.get(i), y.get(i)));
    }
    check(&x);
}

fn fuzz(ops: Vec<BitArrayOperation>) {
    for op in ops {
        match op {
            BitArrayOperation::New(size, indices) => {
                let size = size % (MAX_SIZE + 1);
                match BitArray::new(size, &indices) {
                    Ok(array) => {
                        for &i in &indices {
                            assert!(array.get(i));
                        }
                        check(&array);
                    }
                    Err(Error::InvalidSize) => assert_eq!(size, 0),
                    Err(Error::IndexOutOfRange { index, .. }) => assert!(index >= size),
                    Err(err) => panic!("unexpected error: {err}"),
                }
            }

            BitArrayOperation::Parse(text) => match BitArray::parse(&text) {
                Ok(array) => check(&array),
                Err(Error::InvalidSize) => assert!(text.chars().all(|c| c == ' ')),
                Err(Error::InvalidCharacter(c)) => assert!(c != '0' && c != '1' && c != ' '),
                Err(err) => panic!("unexpected error: {err}"),
            },

            BitArrayOperation::Set(bools, index) => {
                let Some(mut array) = array(&bools) else {
                    continue;
                };
                if index < array.size() {
                    array.set(index);
                    assert!(array.get(index));
                    check(&array);
                }
            }

            BitArrayOperation::Unset(bools, index) => {
                let Some(mut array) = array(&bools) else {
                    continue;
                };
                if index < array.size() {
                    array.unset(index);
                    assert!(!array.get(index));
                    check(&array);
                }
            }

            BitArrayOperation::Toggle(bools, index) => {
                let Some(mut array) = array(&bools) else {
                    continue;
                };
                if index < array.size() {
                    let old = array.get(index);
                    assert_eq!(array.toggle(index), !old);
                    check(&array);
                }
            }

            BitArrayOperation::SetAll(bools) => {
                let Some(mut array) = array(&bools) else {
                    continue;
                };
                array.set_all();
                assert_eq!(array.count_ones(), array.size());
                assert_eq!(array.leading_zeros(), 0);
                check(&array);
            }

            BitArrayOperation::Clear(bools) => {
                let Some(mut array) = array(&bools) else {
                    continue;
                };
                array.clear();
                assert_eq!(array.count_ones(), 0);
                assert_eq!(array.leading_zeros(), array.size());
                check(&array);
            }

            BitArrayOperation::And(a, b) => binary(&a, &b, BitArray::and, |x, y| x && y),
            BitArrayOperation::Or(a, b) => binary(&a, &b, BitArray::or, |x, y| x || y),
            BitArrayOperation::Xor(a, b) => binary(&a, &b, BitArray::xor, |x, y| x != y),
            BitArrayOperation::AndNot(a, b) => {
                binary(&a, &b, BitArray::and_not, |x, y| x && !y)
            }

            BitArrayOperation::Invert(bools) => {
                let Some(mut array) = array(&bools) else {
                    continue;
                };
                let ones = array.count_ones();
                array.invert();
                assert_eq!(array.count_zeros(), ones);
                check(&array);
            }

            BitArrayOperation::Reverse(bools) => {
                let Some(original) = array(&bools) else {
                    continue;
                };
                let mut array = original.clone();
                array.reverse();
                check(&array);
                array.reverse();
                assert_eq!(array, original);
            }

            BitArrayOperation::Rotate(bools, n) => {
                let Some(original) = array(&bools) else {
                    continue;
                };
                let mut array = original.clone();
                array.rotate(n);
                assert_eq!(array.count_ones(), original.count_ones());
                check(&array);
                array.rotate(n.wrapping_neg());
                if n != isize::MIN {
                    assert_eq!(array, original);
                }
            }

            BitArrayOperation::Shift(bools, n) => {
                let Some(original) = array(&bools) else {
                    continue;
                };
                let mut array = original.clone();
                array.shift(n);
                assert!(array.count_ones() <= original.count_ones());
                check(&array);
            }

            BitArrayOperation::Slice(bools, start, end) => {
                let Some(array) = array(&bools) else {
                    continue;
                };
                if start < end && end <= array.size() {
                    let sliced = array.slice(start, end);
                    assert_eq!(sliced.size(), end - start);
                    for k in 0..sliced.size() {
                        assert_eq!(sliced.get(k), array.get(start + k));
                    }
                    check(&sliced);
                }
            }

            BitArrayOperation::Concat(a, b) => {
                let (Some(high), Some(low)) = (array(&a), array(&b)) else {
                    continue;
                };
                let joined = BitArray::concat(&high, &low);
                assert_eq!(joined.to_string(), format!("{high}{low}"));
                check(&joined);
            }

            BitArrayOperation::Unmarshal(bytes) => {
                if let Ok(array) = BitArray::unmarshal(&bytes) {
                    check(&array);
                    let reencoded = array.encode();
                    let decoded =
                        BitArray::decode_cfg(reencoded, &(..=array.size()).into()).unwrap();
                    assert_eq!(decoded, array);
                }
            }
        }
    }
}

fuzz_target!(|ops: Vec<BitArrayOperation>| {
    fuzz(ops);
});
