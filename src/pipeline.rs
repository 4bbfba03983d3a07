//! The tree adaptor pipeline.
//!
//! Window-based search does not run on the raw tree directly. It runs on a
//! stack of adaptors, each wrapping a tree and contributing one stage of the
//! transformation:
//!
//! 1. [`Labelled`] spells edge labels with per-symbol provenance.
//! 2. [`Coloured`] maintains the path coverage across alternate splits.
//! 3. [`Trim`] truncates branches so that every emitted window overlaps the
//!    branching variant and nothing longer survives to a leaf.
//! 4. [`Prune`] removes subtrees that cannot contribute a new context.
//! 5. [`LeftExtend`] prepends the deterministic preceding context and
//!    withdraws sequences whose context differs from the reference.
//! 6. [`Merge`] returns coverage to the shared path once a window has passed
//!    a variant, so a context is emitted once with the union coverage.
//! 7. [`Seek`] enables random access into the traversal by coordinate.
//!
//! Each wrapper carries a stage object ([`LabelStage`], [`ColourStage`],
//! [`TrimStage`], [`PruneStage`], [`LeftExtendStage`], [`MergeStage`],
//! [`SeekStage`]) that implements the behavior of its stage. The traverser in
//! [`crate::traverse`] is a thin depth-first driver: it collects the stages
//! from the top of a validated stack and lets them shape every step of the
//! walk. The composition is static and monomorphized; a stage missing from
//! the stack is reported when the traverser is built.
//!
//! Ordering matters: trimming must come before pruning so that truncation
//! determines reachability, and the left extension must come after pruning so
//! that dead branches are never extended.
//! [`crate::JournaledSequenceTree::windows`] composes the stack in the right
//! order.

use crate::coverage::Coverage;
use crate::jst::Coordinate;
use crate::tree::BreakpointTree;
use crate::variants::VariantStore;

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// Labelling: spells edge labels and records the provenance of every symbol.
///
/// The provenance anchors each spelled symbol either on the source or inside
/// the literal of a variant, which is what makes windows resolvable back to
/// per-sequence offsets.
#[derive(Clone, Copy, Debug)]
pub struct LabelStage;

impl LabelStage {
    /// Appends a source symbol to a label.
    pub fn spell_reference(
        &self,
        label: &mut Vec<u8>,
        origin: &mut Vec<Coordinate>,
        source: &[u8],
        position: usize,
    ) {
        label.push(source[position]);
        origin.push(Coordinate::Reference(position));
    }

    /// Appends the literal of a variant to a label.
    pub fn spell_literal(
        &self,
        label: &mut Vec<u8>,
        origin: &mut Vec<Coordinate>,
        variant: usize,
        literal: &[u8],
    ) {
        for (offset, symbol) in literal.iter().enumerate() {
            label.push(*symbol);
            origin.push(Coordinate::Alternate { variant, offset });
        }
    }

    /// Returns the window of the label starting at the given position.
    pub fn window<'s>(&self, label: &'s [u8], start: usize, size: usize) -> &'s [u8] {
        &label[start..start + size]
    }

    /// Returns the provenance of the window starting at the given position.
    pub fn provenance(&self, origin: &[Coordinate], start: usize) -> Coordinate {
        origin[start]
    }
}

//-----------------------------------------------------------------------------

/// Colouring: maintains the path coverage across alternate splits.
#[derive(Clone, Copy, Debug)]
pub struct ColourStage;

impl ColourStage {
    /// Returns the coverage of the whole collection.
    pub fn full(&self, tree: &BreakpointTree<'_>) -> Coverage {
        Coverage::filled(tree.domain_size())
    }

    /// Narrows the coverage to the sequences that take the variant.
    pub fn take(&self, tree: &BreakpointTree<'_>, coverage: &Coverage, variant: usize) -> Coverage {
        let mut result = coverage.clone();
        result.and_assign(tree.effective(variant));
        result
    }

    /// Removes the sequences that take the variant from the coverage.
    pub fn bypass(&self, tree: &BreakpointTree<'_>, coverage: &mut Coverage, variant: usize) {
        coverage.and_not_assign(tree.effective(variant));
    }
}

//-----------------------------------------------------------------------------

/// Trimming: truncates a branch once every window overlapping its variant has
/// been spelled.
///
/// Window starts of a branch are bounded by the end of the literal in label
/// coordinates. With a window size of overhang plus one, the spelled overhang
/// past the literal never exceeds the trimming overhang, and no partial window
/// survives to a leaf.
#[derive(Clone, Copy, Debug)]
pub struct TrimStage {
    overhang: usize,
}

impl TrimStage {
    /// Creates a trimming stage with the given overhang.
    pub fn new(overhang: usize) -> Self {
        TrimStage { overhang }
    }

    /// Returns the trimming overhang.
    #[inline]
    pub fn overhang(&self) -> usize {
        self.overhang
    }

    /// Returns the exclusive bound on window starts for a branch with the
    /// given context and literal lengths.
    pub fn cap(&self, context_len: usize, literal_len: usize) -> usize {
        context_len + literal_len
    }

    /// Returns `true` once a branch has emitted every window below its cap.
    pub fn exhausted(&self, start: usize, cap: usize) -> bool {
        start >= cap
    }
}

//-----------------------------------------------------------------------------

/// Pruning: removes subtrees that cannot contribute a new context.
#[derive(Clone, Copy, Debug)]
pub struct PruneStage;

impl PruneStage {
    /// Returns `true` if some sequence still reaches the subtree.
    pub fn reachable(&self, coverage: &Coverage) -> bool {
        coverage.any()
    }
}

//-----------------------------------------------------------------------------

/// Left extension: prepends the deterministic preceding context to a branch.
///
/// Across an alternate split the extension is drawn from the chosen branch;
/// across the reference it is drawn from the reference. An earlier variant
/// whose region reaches into the context makes the reference context wrong for
/// its sequences, so their coverage is withdrawn from the affected windows.
#[derive(Clone, Copy, Debug)]
pub struct LeftExtendStage {
    context: usize,
}

impl LeftExtendStage {
    /// Creates a left extension stage with the given context length.
    pub fn new(context: usize) -> Self {
        LeftExtendStage { context }
    }

    /// Returns the context length.
    #[inline]
    pub fn context(&self) -> usize {
        self.context
    }

    /// Returns the start of the context on the source for a variant at the
    /// given position.
    pub fn context_start(&self, low: usize) -> usize {
        low.saturating_sub(self.context)
    }

    /// Returns the earlier variants whose regions reach into the context of
    /// the branch of the given variant.
    ///
    /// Variants that conflict with the branching variant are not listed: their
    /// sequences are already excluded from its effective coverage.
    pub fn exclusions(
        &self,
        tree: &BreakpointTree<'_>,
        variant: usize,
        context_start: usize,
    ) -> Vec<usize> {
        let store = tree.store();
        // The caller spawns branches from store indexes, so variant is in bounds.
        let branching = store.get(variant).unwrap();
        (0..variant)
            .filter(|earlier| {
                let candidate = store.get(*earlier).unwrap();
                candidate.breakpoint().high_breakend() > context_start
                    && !VariantStore::conflicts(candidate, branching)
            })
            .collect()
    }

    /// Withdraws the excluded coverages from a window at the given coordinate.
    ///
    /// Only windows that start on the source reach into the context; a window
    /// starting inside a literal has no context part. The withdrawal expires
    /// on its own once window starts pass the excluded region.
    pub fn withdraw(
        &self,
        tree: &BreakpointTree<'_>,
        exclusions: &[usize],
        coordinate: Coordinate,
        coverage: &mut Coverage,
    ) {
        if let Coordinate::Reference(position) = coordinate {
            let store = tree.store();
            for excl in exclusions.iter() {
                // Exclusion indexes come from 0..variant in exclusions().
                if position < store.get(*excl).unwrap().breakpoint().high_breakend() {
                    coverage.and_not_assign(tree.effective(*excl));
                }
            }
        }
    }
}

//-----------------------------------------------------------------------------

/// Merging: returns coverage to the shared path once a window has passed a
/// variant.
///
/// A reference window subtracts every variant whose region it overlaps. The
/// subtraction expires as the window slides past the variant, so the sequences
/// of a fully spelled branch rejoin the shared path and the context is emitted
/// once with the union coverage.
#[derive(Clone, Copy, Debug)]
pub struct MergeStage;

impl MergeStage {
    /// Adds the variants whose regions reach a window starting at the position.
    ///
    /// Both comparisons are strict for an insertion: an insertion exactly at a
    /// window boundary does not change the window.
    pub fn activate(
        &self,
        store: &VariantStore,
        active: &mut Vec<usize>,
        next_in: &mut usize,
        start: usize,
        window: usize,
    ) {
        // next_in is in [0, store.len()] and only moves forward.
        while *next_in < store.len()
            && store.get(*next_in).unwrap().breakpoint().low_breakend() < start + window
        {
            active.push(*next_in);
            *next_in += 1;
        }
    }

    /// Drops the variants the window has passed.
    pub fn expire(&self, store: &VariantStore, active: &mut Vec<usize>, start: usize) {
        active.retain(|index| {
            store.get(*index).unwrap().breakpoint().high_breakend() > start
        });
    }

    /// Returns the coverage of a reference window: every sequence except those
    /// on an active alternate.
    pub fn coverage(&self, tree: &BreakpointTree<'_>, full: &Coverage, active: &[usize]) -> Coverage {
        let mut result = full.clone();
        for index in active.iter() {
            result.and_not_assign(tree.effective(*index));
        }
        result
    }

    /// Rebuilds the active set for a window starting at the given position.
    pub fn rebuild(&self, store: &VariantStore, start: usize, window: usize) -> (Vec<usize>, usize) {
        let next_in = store.first_at_or_after(start + window);
        let active = (0..next_in)
            .filter(|index| store.get(*index).unwrap().breakpoint().high_breakend() > start)
            .collect();
        (active, next_in)
    }
}

//-----------------------------------------------------------------------------

/// Seek: random access into the traversal by coordinate.
///
/// Window starts are anchored by the provenance the labelling stage records,
/// so a coordinate names either a source position or an offset inside the
/// literal of the branch-spawning variant. [`crate::TreeTraverser::seek`]
/// rebuilds the walk at that window and completes the rest of the traversal.
#[derive(Clone, Copy, Debug)]
pub struct SeekStage;

impl SeekStage {
    /// Maps an offset inside a literal to a window start in label coordinates.
    pub fn label_position(&self, context_len: usize, offset: usize) -> usize {
        context_len + offset
    }
}

//-----------------------------------------------------------------------------

/// A tree that can be wrapped by adaptors and consumed by the traverser.
///
/// Every stage exposes the underlying raw tree and the stage objects the stack
/// provides so far. The traverser validates the stack at construction time and
/// then drives the stages directly, instead of encoding their presence in
/// trait bounds.
pub trait SequenceTree {
    /// Returns the raw tree at the bottom of the stack.
    fn tree(&self) -> &BreakpointTree<'_>;

    /// Returns the labelling stage, if the stack provides one.
    fn labels(&self) -> Option<&LabelStage> {
        None
    }

    /// Returns the colouring stage, if the stack provides one.
    fn colours(&self) -> Option<&ColourStage> {
        None
    }

    /// Returns the trimming stage, if the stack provides one.
    fn trimming(&self) -> Option<&TrimStage> {
        None
    }

    /// Returns the pruning stage, if the stack provides one.
    fn pruning(&self) -> Option<&PruneStage> {
        None
    }

    /// Returns the left extension stage, if the stack provides one.
    fn extension(&self) -> Option<&LeftExtendStage> {
        None
    }

    /// Returns the merging stage, if the stack provides one.
    fn merging(&self) -> Option<&MergeStage> {
        None
    }

    /// Returns the seek stage, if the stack provides one.
    fn seeking(&self) -> Option<&SeekStage> {
        None
    }

    /// Wraps the tree with edge labels.
    fn labelled(self) -> Labelled<Self>
    where
        Self: Sized,
    {
        Labelled { inner: self, stage: LabelStage }
    }

    /// Wraps the tree with coverage colours.
    fn coloured(self) -> Coloured<Self>
    where
        Self: Sized,
    {
        Coloured { inner: self, stage: ColourStage }
    }

    /// Wraps the tree with branch trimming at the given overhang.
    fn trim(self, overhang: usize) -> Trim<Self>
    where
        Self: Sized,
    {
        Trim { inner: self, stage: TrimStage::new(overhang) }
    }

    /// Wraps the tree with subtree pruning.
    fn prune(self) -> Prune<Self>
    where
        Self: Sized,
    {
        Prune { inner: self, stage: PruneStage }
    }

    /// Wraps the tree with a left extension of the given length.
    fn left_extend(self, context: usize) -> LeftExtend<Self>
    where
        Self: Sized,
    {
        LeftExtend { inner: self, stage: LeftExtendStage::new(context) }
    }

    /// Wraps the tree with branch merging.
    fn merge(self) -> Merge<Self>
    where
        Self: Sized,
    {
        Merge { inner: self, stage: MergeStage }
    }

    /// Wraps the tree with seek support.
    fn seek(self) -> Seek<Self>
    where
        Self: Sized,
    {
        Seek { inner: self, stage: SeekStage }
    }
}

impl<'a> SequenceTree for BreakpointTree<'a> {
    fn tree(&self) -> &BreakpointTree<'_> {
        self
    }
}

//-----------------------------------------------------------------------------

// The wrappers expose their own stage and delegate the rest of the stack.

/// Annotates each edge with its spelled label and per-symbol provenance.
#[derive(Clone, Debug)]
pub struct Labelled<T> {
    inner: T,
    stage: LabelStage,
}

impl<T: SequenceTree> SequenceTree for Labelled<T> {
    fn tree(&self) -> &BreakpointTree<'_> {
        self.inner.tree()
    }

    fn labels(&self) -> Option<&LabelStage> {
        Some(&self.stage)
    }

    fn colours(&self) -> Option<&ColourStage> {
        self.inner.colours()
    }

    fn trimming(&self) -> Option<&TrimStage> {
        self.inner.trimming()
    }

    fn pruning(&self) -> Option<&PruneStage> {
        self.inner.pruning()
    }

    fn extension(&self) -> Option<&LeftExtendStage> {
        self.inner.extension()
    }

    fn merging(&self) -> Option<&MergeStage> {
        self.inner.merging()
    }

    fn seeking(&self) -> Option<&SeekStage> {
        self.inner.seeking()
    }
}

/// Attaches the coverage bitmap of each edge to the cargo.
#[derive(Clone, Debug)]
pub struct Coloured<T> {
    inner: T,
    stage: ColourStage,
}

impl<T: SequenceTree> SequenceTree for Coloured<T> {
    fn tree(&self) -> &BreakpointTree<'_> {
        self.inner.tree()
    }

    fn labels(&self) -> Option<&LabelStage> {
        self.inner.labels()
    }

    fn colours(&self) -> Option<&ColourStage> {
        Some(&self.stage)
    }

    fn trimming(&self) -> Option<&TrimStage> {
        self.inner.trimming()
    }

    fn pruning(&self) -> Option<&PruneStage> {
        self.inner.pruning()
    }

    fn extension(&self) -> Option<&LeftExtendStage> {
        self.inner.extension()
    }

    fn merging(&self) -> Option<&MergeStage> {
        self.inner.merging()
    }

    fn seeking(&self) -> Option<&SeekStage> {
        self.inner.seeking()
    }
}

/// Truncates branches once every window overlapping their variant is spelled.
#[derive(Clone, Debug)]
pub struct Trim<T> {
    inner: T,
    stage: TrimStage,
}

impl<T: SequenceTree> SequenceTree for Trim<T> {
    fn tree(&self) -> &BreakpointTree<'_> {
        self.inner.tree()
    }

    fn labels(&self) -> Option<&LabelStage> {
        self.inner.labels()
    }

    fn colours(&self) -> Option<&ColourStage> {
        self.inner.colours()
    }

    fn trimming(&self) -> Option<&TrimStage> {
        Some(&self.stage)
    }

    fn pruning(&self) -> Option<&PruneStage> {
        self.inner.pruning()
    }

    fn extension(&self) -> Option<&LeftExtendStage> {
        self.inner.extension()
    }

    fn merging(&self) -> Option<&MergeStage> {
        self.inner.merging()
    }

    fn seeking(&self) -> Option<&SeekStage> {
        self.inner.seeking()
    }
}

/// Removes subtrees whose coverage is empty.
#[derive(Clone, Debug)]
pub struct Prune<T> {
    inner: T,
    stage: PruneStage,
}

impl<T: SequenceTree> SequenceTree for Prune<T> {
    fn tree(&self) -> &BreakpointTree<'_> {
        self.inner.tree()
    }

    fn labels(&self) -> Option<&LabelStage> {
        self.inner.labels()
    }

    fn colours(&self) -> Option<&ColourStage> {
        self.inner.colours()
    }

    fn trimming(&self) -> Option<&TrimStage> {
        self.inner.trimming()
    }

    fn pruning(&self) -> Option<&PruneStage> {
        Some(&self.stage)
    }

    fn extension(&self) -> Option<&LeftExtendStage> {
        self.inner.extension()
    }

    fn merging(&self) -> Option<&MergeStage> {
        self.inner.merging()
    }

    fn seeking(&self) -> Option<&SeekStage> {
        self.inner.seeking()
    }
}

/// Prepends the deterministic preceding context to each branch.
#[derive(Clone, Debug)]
pub struct LeftExtend<T> {
    inner: T,
    stage: LeftExtendStage,
}

impl<T: SequenceTree> SequenceTree for LeftExtend<T> {
    fn tree(&self) -> &BreakpointTree<'_> {
        self.inner.tree()
    }

    fn labels(&self) -> Option<&LabelStage> {
        self.inner.labels()
    }

    fn colours(&self) -> Option<&ColourStage> {
        self.inner.colours()
    }

    fn trimming(&self) -> Option<&TrimStage> {
        self.inner.trimming()
    }

    fn pruning(&self) -> Option<&PruneStage> {
        self.inner.pruning()
    }

    fn extension(&self) -> Option<&LeftExtendStage> {
        Some(&self.stage)
    }

    fn merging(&self) -> Option<&MergeStage> {
        self.inner.merging()
    }

    fn seeking(&self) -> Option<&SeekStage> {
        self.inner.seeking()
    }
}

/// Merges sibling subtrees that produce identical suffixes.
#[derive(Clone, Debug)]
pub struct Merge<T> {
    inner: T,
    stage: MergeStage,
}

impl<T: SequenceTree> SequenceTree for Merge<T> {
    fn tree(&self) -> &BreakpointTree<'_> {
        self.inner.tree()
    }

    fn labels(&self) -> Option<&LabelStage> {
        self.inner.labels()
    }

    fn colours(&self) -> Option<&ColourStage> {
        self.inner.colours()
    }

    fn trimming(&self) -> Option<&TrimStage> {
        self.inner.trimming()
    }

    fn pruning(&self) -> Option<&PruneStage> {
        self.inner.pruning()
    }

    fn extension(&self) -> Option<&LeftExtendStage> {
        self.inner.extension()
    }

    fn merging(&self) -> Option<&MergeStage> {
        Some(&self.stage)
    }

    fn seeking(&self) -> Option<&SeekStage> {
        self.inner.seeking()
    }
}

/// Enables random access into the traversal by coordinate.
#[derive(Clone, Debug)]
pub struct Seek<T> {
    inner: T,
    stage: SeekStage,
}

impl<T: SequenceTree> SequenceTree for Seek<T> {
    fn tree(&self) -> &BreakpointTree<'_> {
        self.inner.tree()
    }

    fn labels(&self) -> Option<&LabelStage> {
        self.inner.labels()
    }

    fn colours(&self) -> Option<&ColourStage> {
        self.inner.colours()
    }

    fn trimming(&self) -> Option<&TrimStage> {
        self.inner.trimming()
    }

    fn pruning(&self) -> Option<&PruneStage> {
        self.inner.pruning()
    }

    fn extension(&self) -> Option<&LeftExtendStage> {
        self.inner.extension()
    }

    fn merging(&self) -> Option<&MergeStage> {
        self.inner.merging()
    }

    fn seeking(&self) -> Option<&SeekStage> {
        Some(&self.stage)
    }
}

//-----------------------------------------------------------------------------

/// The full pipeline composed in the canonical order.
pub type WindowPipeline<'a> =
    Seek<Merge<LeftExtend<Prune<Trim<Coloured<Labelled<BreakpointTree<'a>>>>>>>>;

//-----------------------------------------------------------------------------
