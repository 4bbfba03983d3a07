//! The journaled sequence tree: a source sequence with shared variants.
//!
//! A [`JournaledSequenceTree`] owns the source and the variant store and ties
//! them to a fixed number of derived sequences. It can materialize any derived
//! sequence through a [`crate::Journal`] and resolve traversal coordinates back
//! to per-sequence offsets, which is how search results are reported.

use crate::coverage::Coverage;
use crate::journal::Journal;
use crate::pipeline::{SequenceTree, WindowPipeline};
use crate::traverse::TreeTraverser;
use crate::tree::BreakpointTree;
use crate::variants::{Variant, VariantStore};


//-----------------------------------------------------------------------------

/// A position within the collection, as reported by the traverser.
///
/// Window starts are anchored either on the source sequence or inside the
/// literal of a variant. The anchor is enough to recover the offset of the
/// window in every covered sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Coordinate {
    /// A position on the source sequence.
    Reference(usize),

    /// An offset inside the literal of the variant with the given index.
    Alternate {
        /// Index of the variant in canonical order.
        variant: usize,
        /// Offset inside the literal of the variant.
        offset: usize,
    },
}

//-----------------------------------------------------------------------------

/// A compressed collection of derived sequences: a source plus shared variants.
///
/// The collection represents `domain_size()` sequences, each defined by the
/// variants whose coverage includes it. Conflicting variants on the same
/// sequence are resolved with a first-wins rule in canonical order: a variant
/// is skipped if an already applied variant reaches past its low breakend, and
/// only the first of several insertions at the same position applies.
///
/// # Examples
///
/// ```
/// use jst_base::{Breakpoint, Coverage, JournaledSequenceTree, Variant};
///
/// let mut jst = JournaledSequenceTree::new(b"AAAAAAA".to_vec(), 2);
/// let variant = Variant::new(
///     Breakpoint::with_span(3, 1), b"C".to_vec(), Coverage::from_bits(&[true, false])
/// ).unwrap();
/// jst.insert(variant).unwrap();
///
/// assert_eq!(jst.sequence(0).unwrap(), b"AAACAAA");
/// assert_eq!(jst.sequence(1).unwrap(), b"AAAAAAA");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JournaledSequenceTree {
    source: Vec<u8>,
    store: VariantStore,
}

impl JournaledSequenceTree {
    /// Creates a collection over the given source with no variants.
    pub fn new(source: Vec<u8>, domain_size: usize) -> Self {
        JournaledSequenceTree {
            source,
            store: VariantStore::new(domain_size),
        }
    }

    /// Creates a collection from a source and an existing variant store.
    ///
    /// Fails if a variant reaches past the end of the source.
    pub fn from_parts(source: Vec<u8>, store: VariantStore) -> Result<Self, String> {
        for variant in store.iter() {
            if variant.breakpoint().high_breakend() > source.len() {
                return Err(format!(
                    "JournaledSequenceTree: variant at {} reaches past the end of a source of length {}",
                    variant.breakpoint().low_breakend(), source.len()
                ));
            }
        }
        Ok(JournaledSequenceTree { source, store })
    }

    /// Returns the source sequence.
    #[inline]
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Returns the variant store.
    #[inline]
    pub fn store(&self) -> &VariantStore {
        &self.store
    }

    /// Returns the number of derived sequences in the collection.
    #[inline]
    pub fn domain_size(&self) -> usize {
        self.store.domain_size()
    }

    /// Returns the number of variants in the collection.
    #[inline]
    pub fn variant_count(&self) -> usize {
        self.store.len()
    }

    /// Inserts a variant, keeping the canonical order of the store.
    ///
    /// Fails if the variant reaches past the end of the source, if its coverage
    /// domain does not match, or if an equal variant is already present.
    pub fn insert(&mut self, variant: Variant) -> Result<usize, String> {
        if variant.breakpoint().high_breakend() > self.source.len() {
            return Err(format!(
                "JournaledSequenceTree: variant at {} reaches past the end of a source of length {}",
                variant.breakpoint().low_breakend(), self.source.len()
            ));
        }
        self.store.insert(variant)
    }

    //-------------------------------------------------------------------------

    // Calls the closure for each variant applied by the sequence, in canonical
    // order, with the running shift between source and derived coordinates.
    fn for_each_applied<'s, F: FnMut(usize, &'s Variant, isize)>(&'s self, sequence: usize, mut callback: F) {
        let mut watermark = 0;
        let mut insertion_at: Option<usize> = None;
        let mut shift: isize = 0;
        for (index, variant) in self.store.iter().enumerate() {
            if !variant.coverage().bit(sequence) {
                continue;
            }
            let low = variant.breakpoint().low_breakend();
            if low < watermark {
                continue;
            }
            if variant.is_insertion() {
                if insertion_at == Some(low) {
                    continue;
                }
                insertion_at = Some(low);
            } else {
                watermark = variant.breakpoint().high_breakend();
            }
            callback(index, variant, shift);
            shift += variant.alt().len() as isize - variant.breakpoint().span() as isize;
        }
    }

    /// Materializes the derived sequence with the given identifier.
    ///
    /// The sequence is built by recording the applied variants into a journal
    /// over the source.
    pub fn sequence(&self, sequence: usize) -> Result<Vec<u8>, String> {
        if sequence >= self.domain_size() {
            return Err(format!(
                "JournaledSequenceTree: sequence {} is out of range for domain size {}",
                sequence, self.domain_size()
            ));
        }
        let mut journal = Journal::new(&self.source);
        let mut edits: Vec<(usize, usize, &[u8])> = Vec::new();
        self.for_each_applied(sequence, |_, variant, shift| {
            let start = (variant.breakpoint().low_breakend() as isize + shift) as usize;
            let end = (variant.breakpoint().high_breakend() as isize + shift) as usize;
            edits.push((start, end, variant.alt()));
        });
        for (start, end, alt) in edits {
            journal.record_at(start..end, alt)?;
        }
        Ok(journal.to_vec())
    }

    /// Resolves a coordinate to per-sequence offsets for the covered sequences.
    ///
    /// Returns `(sequence, offset)` pairs in increasing sequence order, where
    /// the offset is a position in the derived sequence. Fails if the coverage
    /// domain does not match the collection, if the coordinate is out of range,
    /// or if a covered sequence does not apply the named variant.
    pub fn positions(&self, coordinate: Coordinate, coverage: &Coverage) -> Result<Vec<(usize, usize)>, String> {
        if coverage.domain_size() != self.domain_size() {
            return Err(format!(
                "JournaledSequenceTree: coverage domain {} does not match domain size {}",
                coverage.domain_size(), self.domain_size()
            ));
        }
        match coordinate {
            Coordinate::Reference(position) => {
                if position > self.source.len() {
                    return Err(format!(
                        "JournaledSequenceTree: position {} is out of range for a source of length {}",
                        position, self.source.len()
                    ));
                }
            }
            Coordinate::Alternate { variant, offset } => {
                let variant = self.store.get(variant).ok_or(format!(
                    "JournaledSequenceTree: variant index {} is out of range", variant
                ))?;
                if offset >= variant.alt().len() {
                    return Err(format!(
                        "JournaledSequenceTree: offset {} is out of range for a literal of length {}",
                        offset, variant.alt().len()
                    ));
                }
            }
        }

        let mut result: Vec<(usize, usize)> = Vec::with_capacity(coverage.count_ones());
        for sequence in coverage.ones() {
            let derived = self.resolve(coordinate, sequence)?;
            result.push((sequence, derived));
        }
        Ok(result)
    }

    // Maps the coordinate to an offset in the given derived sequence.
    fn resolve(&self, coordinate: Coordinate, sequence: usize) -> Result<usize, String> {
        match coordinate {
            Coordinate::Reference(position) => {
                // Shift by every applied variant that ends at or before the
                // position. An insertion at the position itself counts: the
                // window starts after the inserted symbols.
                let mut total: isize = 0;
                self.for_each_applied(sequence, |_, variant, _| {
                    if variant.breakpoint().high_breakend() <= position {
                        total += variant.alt().len() as isize - variant.breakpoint().span() as isize;
                    }
                });
                Ok((position as isize + total) as usize)
            }
            Coordinate::Alternate { variant, offset } => {
                let mut literal_start: Option<usize> = None;
                self.for_each_applied(sequence, |index, applied, shift| {
                    if index == variant {
                        literal_start = Some(
                            (applied.breakpoint().low_breakend() as isize + shift) as usize
                        );
                    }
                });
                let literal_start = literal_start.ok_or(format!(
                    "JournaledSequenceTree: sequence {} does not apply variant {}",
                    sequence, variant
                ))?;
                Ok(literal_start + offset)
            }
        }
    }

    //-------------------------------------------------------------------------

    /// Returns a traverser that emits every distinct window of the given size once.
    ///
    /// This composes the full adaptor pipeline over the raw tree:
    /// labels, colours, trimming and pruning to the window size, left extension
    /// by the window overhang, merging, and seek support.
    pub fn windows(&self, window_size: usize) -> Result<TreeTraverser<WindowPipeline<'_>>, String> {
        if window_size == 0 {
            return Err(String::from("JournaledSequenceTree: the window size must be positive"));
        }
        let overhang = window_size - 1;
        let stage = BreakpointTree::new(self)
            .labelled()
            .coloured()
            .trim(overhang)
            .prune()
            .left_extend(overhang)
            .merge()
            .seek();
        TreeTraverser::new(stage)
    }
}

//-----------------------------------------------------------------------------
