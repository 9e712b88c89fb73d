use bitarray::BitArray;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Sizes straddling block boundaries.
const SIZES: [usize; 12] = [1, 2, 7, 8, 9, 15, 16, 17, 31, 32, 33, 100];

/// Number of random arrays generated per size.
const SAMPLES: usize = 20;

fn random(rng: &mut StdRng, size: usize) -> BitArray {
    let bools: Vec<bool> = (0..size).map(|_| rng.gen()).collect();
    BitArray::from_bools(&bools).unwrap()
}

fn for_each_sample(seed: u64, mut check: impl FnMut(&mut StdRng, BitArray)) {
    let mut rng = StdRng::seed_from_u64(seed);
    for size in SIZES {
        for _ in 0..SAMPLES {
            let array = random(&mut rng, size);
            check(&mut rng, array);
        }
    }
}

#[test]
fn new_sets_exactly_the_given_indices() {
    let mut rng = StdRng::seed_from_u64(0);
    for size in SIZES {
        let indices: Vec<usize> = (0..size).filter(|_| rng.gen_bool(0.3)).collect();
        let array = BitArray::new(size, &indices).unwrap();
        for i in 0..size {
            assert_eq!(array.get(i), indices.contains(&i));
        }
        assert_eq!(array.count_ones(), indices.len());
    }
}

#[test]
fn string_round_trip() {
    for_each_sample(1, |_, array| {
        let s = array.to_string();
        assert_eq!(s.len(), array.size());
        assert_eq!(BitArray::parse(&s).unwrap(), array);
    });
}

#[test]
fn binary_round_trip() {
    for_each_sample(2, |_, array| {
        let encoded = array.marshal();
        assert_eq!(BitArray::unmarshal(&encoded).unwrap(), array);
    });
}

#[test]
fn reverse_is_an_involution() {
    for_each_sample(3, |_, array| {
        let mut reversed = array.clone();
        reversed.reverse();
        for i in 0..array.size() {
            assert_eq!(reversed.get(i), array.get(array.size() - 1 - i));
        }
        reversed.reverse();
        assert_eq!(reversed, array);
    });
}

#[test]
fn rotate_is_invertible() {
    for_each_sample(4, |rng, array| {
        let n: isize = rng.gen_range(-300..300);
        let mut rotated = array.clone();
        rotated.rotate(n);
        assert_eq!(rotated.count_ones(), array.count_ones());
        rotated.rotate(-n);
        assert_eq!(rotated, array);
    });
}

#[test]
fn rotate_matches_index_permutation() {
    for_each_sample(5, |rng, array| {
        let size = array.size();
        let n: isize = rng.gen_range(-300..300);
        let mut rotated = array.clone();
        rotated.rotate(n);
        let by = n.rem_euclid(size as isize) as usize;
        for i in 0..size {
            assert_eq!(rotated.get((i + by) % size), array.get(i));
        }
    });
}

#[test]
fn shift_never_adds_bits() {
    for_each_sample(6, |rng, array| {
        let size = array.size();
        let n: isize = rng.gen_range(-150..150);
        let mut shifted = array.clone();
        shifted.shift(n);
        assert!(shifted.count_ones() <= array.count_ones());
        for i in 0..size {
            let source = i as isize - n;
            let expected = (0..size as isize).contains(&source) && array.get(source as usize);
            assert_eq!(shifted.get(i), expected);
        }
    });
}

#[test]
fn count_complements() {
    for_each_sample(7, |_, array| {
        let inverted = !&array;
        assert_eq!(array.count_ones(), array.size() - inverted.count_ones());
        assert_eq!(array.count_zeros(), inverted.count_ones());
        assert_eq!(!&inverted, array);
    });
}

#[test]
fn bitwise_ops_match_per_bit_logic() {
    for_each_sample(8, |rng, a| {
        let b = random(rng, a.size());
        let and = &a & &b;
        let or = &a | &b;
        let xor = &a ^ &b;
        let mut and_not = a.clone();
        and_not.and_not(&b);
        for i in 0..a.size() {
            assert_eq!(and.get(i), a.get(i) && b.get(i));
            assert_eq!(or.get(i), a.get(i) || b.get(i));
            assert_eq!(xor.get(i), a.get(i) != b.get(i));
            assert_eq!(and_not.get(i), a.get(i) && !b.get(i));
        }

        // Padding never leaks into the string form or the counts
        assert_eq!(or.to_string().len(), a.size());
        assert!(or.count_ones() <= a.size());
    });
}

#[test]
fn leading_and_trailing_zeros_are_bounded() {
    for_each_sample(9, |_, array| {
        let size = array.size();
        let leading = array.leading_zeros();
        let trailing = array.trailing_zeros();
        assert!(leading <= size);
        assert!(trailing <= size);

        let s = array.to_string();
        assert_eq!(leading, s.chars().take_while(|&c| c == '0').count());
        assert_eq!(trailing, s.chars().rev().take_while(|&c| c == '0').count());
    });
}

#[test]
fn slice_and_concat_recompose() {
    for_each_sample(10, |rng, array| {
        let size = array.size();
        if size < 2 {
            return;
        }
        let split = rng.gen_range(1..size);
        let low = array.slice(0, split);
        let high = array.slice(split, size);
        assert_eq!(low.size() + high.size(), size);
        assert_eq!(BitArray::concat(&high, &low), array);
        assert_eq!(
            BitArray::concat(&high, &low).to_string(),
            format!("{high}{low}")
        );
    });
}
