// Shared helpers for the tests in this crate.

use crate::breakpoint::Breakpoint;
use crate::coverage::Coverage;
use crate::jst::JournaledSequenceTree;
use crate::variants::Variant;

use std::collections::HashMap;

//-----------------------------------------------------------------------------

// Variant constructors for test fixtures.

pub(crate) fn coverage(bits: &[bool]) -> Coverage {
    Coverage::from_bits(bits)
}

pub(crate) fn substitution(position: usize, alt: &str, bits: &[bool]) -> Variant {
    Variant::new(
        Breakpoint::with_span(position, alt.len()),
        alt.as_bytes().to_vec(),
        coverage(bits)
    ).unwrap()
}

pub(crate) fn insertion(position: usize, alt: &str, bits: &[bool]) -> Variant {
    Variant::new(
        Breakpoint::insertion_at(position),
        alt.as_bytes().to_vec(),
        coverage(bits)
    ).unwrap()
}

pub(crate) fn deletion(position: usize, span: usize, bits: &[bool]) -> Variant {
    Variant::new(
        Breakpoint::with_span(position, span),
        Vec::new(),
        coverage(bits)
    ).unwrap()
}

//-----------------------------------------------------------------------------

// Builds a collection from a reference, a domain size, and a list of variants.

pub(crate) fn build_jst(reference: &[u8], domain_size: usize, events: &[Variant]) -> JournaledSequenceTree {
    let mut jst = JournaledSequenceTree::new(reference.to_vec(), domain_size);
    for event in events {
        let result = jst.insert(event.clone());
        assert!(result.is_ok(), "Failed to insert a variant: {}", result.unwrap_err());
    }
    jst
}

//-----------------------------------------------------------------------------

// The traversal harness. It materializes every derived sequence, enumerates
// the expected (sequence, position) pairs for every full window, and then
// drives the traverser: every emitted window must resolve to known positions
// with the right symbols, every pair must be claimed exactly once, and nothing
// unknown may appear. This checks coverage soundness and uniqueness at the
// same time.

pub(crate) fn check_traversal(reference: &[u8], domain_size: usize, events: &[Variant], window: usize) -> usize {
    let jst = build_jst(reference, domain_size, events);

    // Expected windows per sequence.
    let mut derived: Vec<Vec<u8>> = Vec::with_capacity(domain_size);
    for sequence in 0..domain_size {
        derived.push(jst.sequence(sequence).unwrap());
    }
    let mut expected: HashMap<(usize, usize), bool> = HashMap::new();
    for (sequence, symbols) in derived.iter().enumerate() {
        if symbols.len() >= window {
            for position in 0..=symbols.len() - window {
                expected.insert((sequence, position), false);
            }
        }
    }

    let mut traverser = jst.windows(window).unwrap();
    let mut emissions = 0;
    while let Some(cargo) = traverser.next_window() {
        emissions += 1;
        assert!(cargo.coverage().any(), "Emitted a window with an empty coverage");
        assert_eq!(cargo.sequence().len(), window, "Emitted a window of the wrong size");
        let coordinate = cargo.coordinate();
        let positions = jst.positions(coordinate, cargo.coverage());
        assert!(positions.is_ok(), "Failed to resolve positions: {}", positions.unwrap_err());
        for (sequence, position) in positions.unwrap() {
            let symbols = &derived[sequence];
            assert!(
                position + window <= symbols.len(),
                "Window at position {} does not fit in sequence {}", position, sequence
            );
            assert_eq!(
                &symbols[position..position + window], cargo.sequence(),
                "Wrong symbols at position {} of sequence {}", position, sequence
            );
            let claimed = expected.get_mut(&(sequence, position)).unwrap();
            assert!(!*claimed, "Window at position {} of sequence {} was emitted twice", position, sequence);
            *claimed = true;
        }
    }
    assert!(traverser.is_sink(), "The traverser did not reach the sink");

    for ((sequence, position), claimed) in expected.iter() {
        assert!(
            *claimed,
            "Window at position {} of sequence {} was never emitted", position, sequence
        );
    }

    emissions
}

//-----------------------------------------------------------------------------
