//! Variants and the shared variant store.
//!
//! A [`Variant`] replaces the part of the source covered by its breakpoint with a
//! literal sequence, for the derived sequences named by its coverage bitmap.
//! The [`VariantStore`] keeps the variants of a collection in a canonical total
//! order, which makes the breakpoint sequence tree deterministic.

use crate::breakpoint::Breakpoint;
use crate::coverage::Coverage;

use std::cmp::Ordering;
use std::ops::Range;


//-----------------------------------------------------------------------------

/// A shared edit against the source sequence.
///
/// The combination of breakpoint span and literal length determines the kind of
/// the variant:
///
/// * zero span with a non-empty literal: insertion,
/// * non-zero span with an empty literal: deletion,
/// * non-zero span with a non-empty literal: substitution.
///
/// A zero-span variant with an empty literal would not change anything and is
/// rejected at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variant {
    breakpoint: Breakpoint,
    alt: Vec<u8>,
    coverage: Coverage,
}

impl Variant {
    /// Creates a new variant, or fails if the edit would be empty.
    pub fn new(breakpoint: Breakpoint, alt: Vec<u8>, coverage: Coverage) -> Result<Self, String> {
        if breakpoint.span() == 0 && alt.is_empty() {
            return Err(String::from("Variant: a zero-span variant with an empty literal is not allowed"));
        }
        Ok(Variant { breakpoint, alt, coverage })
    }

    /// Returns the breakpoint of the variant.
    #[inline]
    pub fn breakpoint(&self) -> Breakpoint {
        self.breakpoint
    }

    /// Returns the literal sequence of the variant.
    #[inline]
    pub fn alt(&self) -> &[u8] {
        &self.alt
    }

    /// Returns the coverage of the variant.
    #[inline]
    pub fn coverage(&self) -> &Coverage {
        &self.coverage
    }

    /// Returns `true` if the variant inserts its literal without removing anything.
    pub fn is_insertion(&self) -> bool {
        self.breakpoint.is_insertion()
    }

    /// Returns `true` if the variant removes the covered interval without a replacement.
    pub fn is_deletion(&self) -> bool {
        self.breakpoint.span() > 0 && self.alt.is_empty()
    }

    /// Returns `true` if the variant replaces the covered interval with its literal.
    pub fn is_substitution(&self) -> bool {
        self.breakpoint.span() > 0 && !self.alt.is_empty()
    }

    /// Compares two variants in the canonical order of the store.
    ///
    /// The sort key is (low breakend, insertion before others, span, literal).
    /// Coverage does not participate in the order.
    pub fn canonical_cmp(&self, other: &Variant) -> Ordering {
        let self_key = (
            self.breakpoint.low_breakend(),
            !self.is_insertion(),
            self.breakpoint.span(),
            &self.alt,
        );
        let other_key = (
            other.breakpoint.low_breakend(),
            !other.is_insertion(),
            other.breakpoint.span(),
            &other.alt,
        );
        self_key.cmp(&other_key)
    }
}

//-----------------------------------------------------------------------------

/// An ordered multiset of variants over a single source and a fixed domain.
///
/// Variants are kept in the canonical order defined by [`Variant::canonical_cmp`].
/// Two variants with the same breakpoint and literal are considered duplicates
/// regardless of their coverage, and the second insert is rejected.
///
/// # Examples
///
/// ```
/// use jst_base::{Breakpoint, Coverage, Variant, VariantStore};
///
/// let mut store = VariantStore::new(2);
/// let substitution = Variant::new(
///     Breakpoint::with_span(3, 1), b"C".to_vec(), Coverage::from_bits(&[true, false])
/// ).unwrap();
/// store.insert(substitution).unwrap();
/// let insertion = Variant::new(
///     Breakpoint::insertion_at(3), b"TT".to_vec(), Coverage::from_bits(&[false, true])
/// ).unwrap();
/// store.insert(insertion).unwrap();
///
/// // Insertions sort before substitutions at the same position.
/// assert_eq!(store.len(), 2);
/// assert!(store.get(0).unwrap().is_insertion());
/// assert!(store.get(1).unwrap().is_substitution());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantStore {
    domain_size: usize,
    variants: Vec<Variant>,
}

impl VariantStore {
    /// Creates an empty store for coverages over a domain of the given size.
    pub fn new(domain_size: usize) -> Self {
        VariantStore { domain_size, variants: Vec::new() }
    }

    /// Returns the domain size of the coverages in the store.
    #[inline]
    pub fn domain_size(&self) -> usize {
        self.domain_size
    }

    /// Returns the number of variants in the store.
    #[inline]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Returns `true` if the store is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Returns the variant with the given index in canonical order.
    pub fn get(&self, index: usize) -> Option<&Variant> {
        self.variants.get(index)
    }

    /// Returns an iterator over the variants in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &Variant> {
        self.variants.iter()
    }

    /// Inserts a variant into the store, keeping the canonical order.
    ///
    /// Returns the index of the inserted variant.
    /// Fails if the coverage domain does not match the store or if an equal
    /// variant is already present.
    pub fn insert(&mut self, variant: Variant) -> Result<usize, String> {
        if variant.coverage().domain_size() != self.domain_size {
            return Err(format!(
                "VariantStore: coverage domain {} does not match store domain {}",
                variant.coverage().domain_size(), self.domain_size
            ));
        }
        let index = self.variants.partition_point(|existing| existing.canonical_cmp(&variant) == Ordering::Less);
        if let Some(existing) = self.variants.get(index) {
            if existing.canonical_cmp(&variant) == Ordering::Equal {
                return Err(format!(
                    "VariantStore: duplicate variant at position {}",
                    variant.breakpoint().low_breakend()
                ));
            }
        }
        self.variants.insert(index, variant);
        Ok(index)
    }

    /// Returns the variants whose low breakend is in the given interval, in canonical order.
    pub fn range(&self, interval: Range<usize>) -> &[Variant] {
        let start = self.first_at_or_after(interval.start);
        let end = self.first_at_or_after(interval.end);
        &self.variants[start..end]
    }

    /// Returns the index of the first variant whose low breakend is at or after the given position.
    pub fn first_at_or_after(&self, position: usize) -> usize {
        self.variants.partition_point(|variant| variant.breakpoint().low_breakend() < position)
    }

    /// Returns the index of the first variant that can follow the given one on a path.
    ///
    /// Taking a variant excludes every variant whose low breakend is before the
    /// high breakend of the taken one. Taking an insertion also excludes the
    /// other insertions at the same position, which are sibling alternatives.
    pub fn next_compatible(&self, taken: usize) -> usize {
        let variant = &self.variants[taken];
        if variant.is_insertion() {
            let position = variant.breakpoint().low_breakend();
            let mut index = taken + 1;
            while index < self.variants.len() {
                let next = &self.variants[index];
                if next.is_insertion() && next.breakpoint().low_breakend() == position {
                    index += 1;
                } else {
                    break;
                }
            }
            index
        } else {
            self.first_at_or_after(variant.breakpoint().high_breakend())
        }
    }

    /// Returns `true` if the earlier variant excludes the later one on a shared path.
    ///
    /// A variant conflicts with a later one if its high breakend has not been
    /// passed when the later variant begins, or if both are insertions at the
    /// same position.
    pub fn conflicts(earlier: &Variant, later: &Variant) -> bool {
        let low = later.breakpoint().low_breakend();
        if earlier.breakpoint().high_breakend() > low {
            return true;
        }
        earlier.is_insertion() && later.is_insertion() && earlier.breakpoint().low_breakend() == low
    }

    /// Returns the effective coverage of each variant.
    ///
    /// The effective coverage of a variant subtracts the effective coverages of
    /// all earlier conflicting variants. A sequence is therefore in the
    /// effective coverage exactly when the variant applies to it under the
    /// first-wins conflict rule, which keeps the tree and the materialized
    /// journals consistent.
    pub fn effective_coverages(&self) -> Vec<Coverage> {
        let mut result: Vec<Coverage> = Vec::with_capacity(self.variants.len());
        for (index, variant) in self.variants.iter().enumerate() {
            let mut effective = variant.coverage().clone();
            for earlier in 0..index {
                if Self::conflicts(&self.variants[earlier], variant) {
                    effective.and_not_assign(&result[earlier]);
                }
            }
            result.push(effective);
        }
        result
    }
}

//-----------------------------------------------------------------------------
