use super::*;

use simple_sds::serialize;

//-----------------------------------------------------------------------------

#[test]
fn empty_coverage() {
    for domain_size in [0, 1, 63, 64, 65, 200] {
        let coverage = Coverage::new(domain_size);
        assert_eq!(coverage.domain_size(), domain_size, "Wrong domain size");
        assert!(!coverage.any(), "An empty coverage should have no set bits");
        assert_eq!(coverage.count_ones(), 0, "Wrong number of set bits for domain size {}", domain_size);
        for index in 0..domain_size {
            assert!(!coverage.bit(index), "Bit {} should not be set", index);
        }
    }
}

#[test]
fn filled_coverage() {
    for domain_size in [0, 1, 63, 64, 65, 200] {
        let coverage = Coverage::filled(domain_size);
        assert_eq!(coverage.count_ones(), domain_size, "Wrong number of set bits for domain size {}", domain_size);
        for index in 0..domain_size {
            assert!(coverage.bit(index), "Bit {} should be set", index);
        }
    }
}

#[test]
fn set_and_get() {
    let mut coverage = Coverage::new(130);
    let set: Vec<usize> = vec![0, 1, 63, 64, 100, 129];
    for index in set.iter() {
        coverage.set_bit(*index, true);
    }
    assert!(coverage.any(), "The coverage should have set bits");
    assert_eq!(coverage.count_ones(), set.len(), "Wrong number of set bits");
    let ones: Vec<usize> = coverage.ones().collect();
    assert_eq!(ones, set, "Wrong set bits");

    coverage.set_bit(63, false);
    assert!(!coverage.bit(63), "Bit 63 was not cleared");
    assert_eq!(coverage.count_ones(), set.len() - 1, "Wrong number of set bits after clearing");
}

#[test]
fn from_bits() {
    let bits = [true, false, true, true];
    let coverage = Coverage::from_bits(&bits);
    assert_eq!(coverage.domain_size(), bits.len(), "Wrong domain size");
    for (index, value) in bits.iter().enumerate() {
        assert_eq!(coverage.bit(index), *value, "Wrong bit {}", index);
    }
}

//-----------------------------------------------------------------------------

#[test]
fn set_operations() {
    let first = Coverage::from_bits(&[true, true, false, false]);
    let second = Coverage::from_bits(&[false, true, true, false]);

    let intersection = first.intersection(&second).unwrap();
    assert_eq!(intersection, Coverage::from_bits(&[false, true, false, false]), "Wrong intersection");

    let difference = first.difference(&second).unwrap();
    assert_eq!(difference, Coverage::from_bits(&[true, false, false, false]), "Wrong difference");

    let union = first.union(&second).unwrap();
    assert_eq!(union, Coverage::from_bits(&[true, true, true, false]), "Wrong union");
}

#[test]
fn complement_laws() {
    // intersect(a, complement(a)) is empty and union(a, difference(b, a)) == union(a, b).
    let a = Coverage::from_bits(&[true, false, true, false, true]);
    let b = Coverage::from_bits(&[true, true, false, false, true]);

    let empty = a.intersection(&a.complement()).unwrap();
    assert!(!empty.any(), "The intersection with the complement should be empty");

    let left = a.union(&b.difference(&a).unwrap()).unwrap();
    let right = a.union(&b).unwrap();
    assert_eq!(left, right, "union(a, difference(b, a)) != union(a, b)");
}

#[test]
fn complement_respects_domain() {
    // The padding bits must stay zero so that equality and counts work.
    let coverage = Coverage::new(70);
    let complement = coverage.complement();
    assert_eq!(complement.count_ones(), 70, "Wrong number of set bits in the complement");
    assert_eq!(complement, Coverage::filled(70), "The complement of an empty coverage should be filled");
}

#[test]
fn domain_mismatch() {
    let first = Coverage::new(4);
    let second = Coverage::new(5);
    assert!(first.intersection(&second).is_err(), "Intersection should fail on domain mismatch");
    assert!(first.difference(&second).is_err(), "Difference should fail on domain mismatch");
    assert!(first.union(&second).is_err(), "Union should fail on domain mismatch");
}

//-----------------------------------------------------------------------------

#[test]
fn serialize_coverage() {
    let original = Coverage::from_bits(&[true, false, true, true, false, true]);
    let filename = serialize::temp_file_name("coverage");
    serialize::serialize_to(&original, &filename).unwrap();
    let loaded: Coverage = serialize::load_from(&filename).unwrap();
    assert_eq!(loaded, original, "Serialization changed the coverage");
    std::fs::remove_file(&filename).unwrap();
}

//-----------------------------------------------------------------------------
