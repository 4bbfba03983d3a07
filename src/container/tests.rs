use super::*;

use crate::internal;

use simple_sds::serialize;

use std::fs;

//-----------------------------------------------------------------------------

fn example_jst() -> JournaledSequenceTree {
    internal::build_jst(b"GATTACA", 4, &[
        internal::insertion(0, "TT", &[true, false, false, false]),
        internal::substitution(2, "C", &[true, true, false, false]),
        internal::deletion(4, 2, &[false, true, true, false]),
    ])
}

fn to_bytes(jst: &JournaledSequenceTree) -> Vec<u8> {
    let mut buffer: Vec<u8> = Vec::new();
    jst.serialize(&mut buffer).unwrap();
    buffer
}

//-----------------------------------------------------------------------------

#[test]
fn round_trip_in_memory() {
    let original = example_jst();
    let buffer = to_bytes(&original);
    assert_eq!(buffer.len(), original.size_in_bytes(), "Wrong serialized size");

    let loaded = JournaledSequenceTree::load(&mut buffer.as_slice()).unwrap();
    assert_eq!(loaded, original, "Serialization changed the collection");

    // Serializing again produces byte-identical output.
    assert_eq!(to_bytes(&loaded), buffer, "A round trip changed the serialized bytes");
}

#[test]
fn round_trip_through_a_file() {
    let original = example_jst();
    let filename = serialize::temp_file_name("jst-container");
    original.save(&filename).unwrap();
    let loaded = JournaledSequenceTree::load_from(&filename).unwrap();
    assert_eq!(loaded, original, "The file round trip changed the collection");
    fs::remove_file(&filename).unwrap();
}

#[test]
fn empty_collection() {
    let original = JournaledSequenceTree::new(Vec::new(), 0);
    let buffer = to_bytes(&original);
    let loaded = JournaledSequenceTree::load(&mut buffer.as_slice()).unwrap();
    assert_eq!(loaded, original, "Serialization changed an empty collection");
}

//-----------------------------------------------------------------------------

#[test]
fn invalid_magic() {
    let original = example_jst();
    let mut buffer = to_bytes(&original);
    buffer[0] ^= 0xFF;
    assert!(
        JournaledSequenceTree::load(&mut buffer.as_slice()).is_err(),
        "Loaded a container with an invalid magic number"
    );
}

#[test]
fn invalid_version() {
    let original = example_jst();
    let mut buffer = to_bytes(&original);
    // The version is the second element.
    buffer[8] ^= 0xFF;
    assert!(
        JournaledSequenceTree::load(&mut buffer.as_slice()).is_err(),
        "Loaded a container with an unsupported version"
    );
}

#[test]
fn truncated_container() {
    let original = example_jst();
    let buffer = to_bytes(&original);
    let truncated = &buffer[..buffer.len() - 8];
    assert!(
        JournaledSequenceTree::load(&mut &truncated[..]).is_err(),
        "Loaded a truncated container"
    );
}

#[test]
fn variants_out_of_order() {
    // Write the variants in the wrong order by hand.
    let first = internal::substitution(1, "C", &[true, false]);
    let second = internal::substitution(4, "G", &[false, true]);

    let mut buffer: Vec<u8> = Vec::new();
    MAGIC.serialize(&mut buffer).unwrap();
    VERSION.serialize(&mut buffer).unwrap();
    b"GATTACA".to_vec().serialize(&mut buffer).unwrap();
    2usize.serialize(&mut buffer).unwrap();
    2usize.serialize(&mut buffer).unwrap();
    serialize_variant(&second, &mut buffer).unwrap();
    serialize_variant(&first, &mut buffer).unwrap();

    assert!(
        JournaledSequenceTree::load(&mut buffer.as_slice()).is_err(),
        "Loaded a container with variants out of canonical order"
    );
}

#[test]
fn variant_past_the_end() {
    let variant = internal::substitution(6, "CC", &[true, false]);

    let mut buffer: Vec<u8> = Vec::new();
    MAGIC.serialize(&mut buffer).unwrap();
    VERSION.serialize(&mut buffer).unwrap();
    b"GATTACA".to_vec().serialize(&mut buffer).unwrap();
    2usize.serialize(&mut buffer).unwrap();
    1usize.serialize(&mut buffer).unwrap();
    serialize_variant(&variant, &mut buffer).unwrap();

    assert!(
        JournaledSequenceTree::load(&mut buffer.as_slice()).is_err(),
        "Loaded a container with a variant past the end of the source"
    );
}

#[test]
fn coverage_domain_mismatch() {
    let variant = internal::substitution(1, "C", &[true, false, true]);

    let mut buffer: Vec<u8> = Vec::new();
    MAGIC.serialize(&mut buffer).unwrap();
    VERSION.serialize(&mut buffer).unwrap();
    b"GATTACA".to_vec().serialize(&mut buffer).unwrap();
    2usize.serialize(&mut buffer).unwrap();
    1usize.serialize(&mut buffer).unwrap();
    serialize_variant(&variant, &mut buffer).unwrap();

    assert!(
        JournaledSequenceTree::load(&mut buffer.as_slice()).is_err(),
        "Loaded a container with a mismatching coverage domain"
    );
}

//-----------------------------------------------------------------------------

#[test]
fn traversal_after_round_trip() {
    let original = example_jst();
    let buffer = to_bytes(&original);
    let loaded = JournaledSequenceTree::load(&mut buffer.as_slice()).unwrap();

    let mut original_windows = Vec::new();
    let mut traverser = original.windows(3).unwrap();
    while let Some(cargo) = traverser.next_window() {
        original_windows.push((cargo.sequence().to_vec(), cargo.coverage().clone()));
    }

    let mut loaded_windows = Vec::new();
    let mut traverser = loaded.windows(3).unwrap();
    while let Some(cargo) = traverser.next_window() {
        loaded_windows.push((cargo.sequence().to_vec(), cargo.coverage().clone()));
    }

    assert_eq!(loaded_windows, original_windows, "A round trip changed the traversal");
}

//-----------------------------------------------------------------------------
