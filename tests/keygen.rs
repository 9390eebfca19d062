use std::collections::HashSet;
use urlstore::{gen_key, Base62, KeyGenerator};

#[test]
fn first_keys_use_single_digits() {
    assert_eq!(gen_key(0), "a");
    assert_eq!(gen_key(1), "b");
    assert_eq!(gen_key(25), "z");
    assert_eq!(gen_key(26), "A");
    assert_eq!(gen_key(52), "0");
    assert_eq!(gen_key(61), "9");
}

#[test]
fn keys_grow_a_digit_past_the_base() {
    assert_eq!(gen_key(62), "ba");
    assert_eq!(gen_key(63), "bb");
    assert_eq!(gen_key(62 * 62 - 1), "99");
    assert_eq!(gen_key(62 * 62), "baa");
}

#[test]
fn largest_sequence_number_has_eleven_digits() {
    let key = gen_key(u64::MAX);
    assert_eq!(key.len(), 11);
    assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[test]
fn keys_are_distinct_and_path_safe() {
    let mut seen = HashSet::new();
    for n in 0..20_000 {
        let key = gen_key(n);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()), "{}", key);
        assert!(seen.insert(key), "duplicate key for {}", n);
    }
}

#[test]
fn base62_generator_matches_gen_key() {
    let keygen = Base62;
    for n in [0_u64, 7, 62, 3844, 1 << 40] {
        assert_eq!(keygen.generate(n), gen_key(n));
    }
}
