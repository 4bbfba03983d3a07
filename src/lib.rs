//! # JST-base: journaled sequence trees for pangenomic collections.
//!
//! This is a prototype for representing a collection of related sequences
//! (e.g. haplotypes) as edits against a shared reference, together with a
//! traversal engine that enumerates fixed-size contexts across all sequences
//! while visiting each distinct context exactly once.
//! Scanning N haplotypes of length L naively costs N * L, but most of the
//! bases are shared. A shared-prefix traversal of the variant structure costs
//! closer to L plus the total span of the variants, which is what makes
//! read-mapping against large collections practical.
//!
//! ### Basic concepts
//!
//! The source sequence is immutable and shared. A variant replaces a half-open
//! interval of the source (a [`Breakpoint`]) with a literal sequence for the
//! derived sequences named by a [`Coverage`] bitmap. The [`VariantStore`]
//! keeps the variants in a canonical order that makes everything downstream
//! deterministic.
//!
//! One derived sequence is materialized through a [`Journal`]: an ordered,
//! non-overlapping segmentation of the derived sequence over the source,
//! updated inline as edits are recorded.
//!
//! The whole collection is traversed through the [`BreakpointTree`]: a virtual
//! tree with a reference child and an alternate child per variant, pruned by
//! coverage. The adaptor pipeline in [`pipeline`] shapes the raw tree for
//! window-based search, and the [`TreeTraverser`] emits one [`Cargo`] per
//! distinct window. A [`Matcher`] consumes the cargo stream; hits are mapped
//! back to per-sequence offsets with [`JournaledSequenceTree::positions`].
//!
//! The collection can be saved to and loaded from a binary container; see
//! [`container`].

pub mod breakpoint;
pub mod container;
pub mod coverage;
pub mod journal;
pub mod jst;
pub mod matcher;
pub mod pipeline;
pub mod traverse;
pub mod tree;
pub mod utils;
pub mod variants;

#[cfg(test)]
pub(crate) mod internal;

pub use breakpoint::Breakpoint;
pub use coverage::Coverage;
pub use journal::{Breakend, Journal, JournalRecord};
pub use jst::{Coordinate, JournaledSequenceTree};
pub use matcher::{Finder, Matcher, NaiveMatcher};
pub use pipeline::{Coloured, Labelled, LeftExtend, Merge, Prune, Seek, SequenceTree, Trim, WindowPipeline};
pub use pipeline::{ColourStage, LabelStage, LeftExtendStage, MergeStage, PruneStage, SeekStage, TrimStage};
pub use traverse::{Cargo, TreeTraverser};
pub use tree::{BreakpointTree, TreeNode};
pub use variants::{Variant, VariantStore};
