//! Depth-first traversal emitting every distinct window exactly once.
//!
//! A [`TreeTraverser`] drives a composed adaptor stack and yields one
//! [`Cargo`] per distinct window of the collection: a fixed-size segment, the
//! coverage of the sequences that contain it, and a [`Coordinate`] anchoring
//! the window start.
//!
//! The traverser itself is a thin driver. It validates the stack, collects the
//! stage objects from [`crate::pipeline`], and walks the tree with an explicit
//! stack of pending subtrees; the stages decide what is spelled
//! ([`crate::pipeline::LabelStage`]), which sequences remain on a path
//! ([`crate::pipeline::ColourStage`]), where a branch ends
//! ([`crate::pipeline::TrimStage`]), which subtrees and windows are dropped
//! ([`crate::pipeline::PruneStage`]), how far the preceding context reaches
//! ([`crate::pipeline::LeftExtendStage`]), and when coverage returns to the
//! shared path ([`crate::pipeline::MergeStage`]).
//!
//! The traversal order is deterministic: the reference spine is walked first,
//! emitting the windows that lie on the source, then the pending alternate
//! subtrees are expanded in canonical variant order, depth first. Within a
//! branch, the reference continuation is walked before the nested alternates.

use crate::coverage::Coverage;
use crate::jst::Coordinate;
use crate::pipeline::{
    ColourStage, LabelStage, LeftExtendStage, MergeStage, PruneStage, SequenceTree, TrimStage,
};
use crate::tree::BreakpointTree;


//-----------------------------------------------------------------------------

/// The payload the traverser yields per window.
///
/// The segment is the window itself. Coverage names the sequences that contain
/// the segment at the offsets recoverable from the coordinate with
/// [`crate::JournaledSequenceTree::positions`].
#[derive(Debug)]
pub struct Cargo<'a> {
    segment: &'a [u8],
    coverage: &'a Coverage,
    coordinate: Coordinate,
}

impl<'a> Cargo<'a> {
    /// Returns the window segment.
    #[inline]
    pub fn sequence(&self) -> &'a [u8] {
        self.segment
    }

    /// Returns the coverage of the window.
    #[inline]
    pub fn coverage(&self) -> &'a Coverage {
        self.coverage
    }

    /// Returns the coordinate of the window start.
    #[inline]
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }
}

//-----------------------------------------------------------------------------

// The stage objects collected from a validated stack.
#[derive(Clone, Copy, Debug)]
struct Stages {
    labels: LabelStage,
    colours: ColourStage,
    trimming: TrimStage,
    pruning: PruneStage,
    extension: LeftExtendStage,
    merging: MergeStage,
}

//-----------------------------------------------------------------------------

// Walks the reference spine, emitting one window per start position. The
// merging stage maintains the set of variants overlapping the window, so the
// coverage of a branch returns to the spine once the window passes it.
#[derive(Clone, Debug)]
struct SpineWalker {
    // Next window start on the source.
    start: usize,

    // Next variant index to activate.
    next_in: usize,

    // Variants whose region may overlap the current window.
    active: Vec<usize>,
}

// Walks one branch: the left context, the literal of the spawning variant, and
// the reference overhang, splitting at nested variants along the way.
#[derive(Clone, Debug)]
struct BranchWalker {
    // Spelled symbols: left context, literals, and reference overhang.
    label: Vec<u8>,

    // Provenance of each spelled symbol.
    origin: Vec<Coordinate>,

    // Next window start in label coordinates.
    start: usize,

    // Exclusive bound on window starts. Fixed at spawn time: every emitted
    // window must overlap the spawning variant. Inherited by nested splits.
    cap: usize,

    // Branch coverage after the taken and skipped variants so far.
    coverage: Coverage,

    // Next source position to spell.
    walk_pos: usize,

    // Next candidate variant on this branch.
    next_variant: usize,

    // Earlier variants that may overlap the left context of early windows.
    left_excls: Vec<usize>,
}

// A pending subtree: a top-level branch that has not been spawned yet, or a
// nested split waiting for its turn.
#[derive(Clone, Debug)]
enum Task {
    Spawn(usize),
    Walker(BranchWalker),
}

#[derive(Clone, Debug)]
enum Walker {
    Spine(SpineWalker),
    Branch(BranchWalker),
    Done,
}

// A single emission before the window bytes are copied out.
struct Emission {
    start: usize,
    coverage: Coverage,
    coordinate: Coordinate,
}

//-----------------------------------------------------------------------------

/// A depth-first driver over a composed adaptor stack.
///
/// See [`crate::JournaledSequenceTree::windows`] for the usual way to build one.
///
/// # Examples
///
/// ```
/// use jst_base::{Breakpoint, Coverage, JournaledSequenceTree, Variant};
///
/// let mut jst = JournaledSequenceTree::new(b"AAAAAAA".to_vec(), 4);
/// let variant = Variant::new(
///     Breakpoint::with_span(5, 1), b"B".to_vec(), Coverage::from_bits(&[false, true, true, false])
/// ).unwrap();
/// jst.insert(variant).unwrap();
///
/// let mut traverser = jst.windows(4).unwrap();
/// let mut windows = Vec::new();
/// while let Some(cargo) = traverser.next_window() {
///     windows.push((cargo.sequence().to_vec(), cargo.coverage().count_ones()));
/// }
/// // Two shared prefix windows, two variant windows, two reference windows.
/// assert_eq!(windows.len(), 6);
/// ```
#[derive(Clone, Debug)]
pub struct TreeTraverser<S: SequenceTree> {
    stage: S,
    stages: Stages,
    window: usize,
    filled: Coverage,
    walker: Walker,
    tasks: Vec<Task>,
    window_buf: Vec<u8>,
    coverage: Coverage,
    coordinate: Coordinate,
    positioned: bool,
    finished: bool,
}

impl<S: SequenceTree> TreeTraverser<S> {
    /// Creates a traverser over the given adaptor stack.
    ///
    /// The stack must provide labels, colours, trimming, pruning, a left
    /// extension equal to the trimming overhang, and merging. The window size
    /// is the trimming overhang plus one.
    pub fn new(stage: S) -> Result<Self, String> {
        let labels = *stage.labels().ok_or(String::from("TreeTraverser: the tree must be labelled"))?;
        let colours = *stage.colours().ok_or(String::from("TreeTraverser: the tree must be coloured"))?;
        let trimming = *stage.trimming().ok_or(String::from("TreeTraverser: the tree must be trimmed"))?;
        let pruning = *stage.pruning().ok_or(String::from("TreeTraverser: the tree must be pruned"))?;
        let extension = *stage.extension().ok_or(String::from("TreeTraverser: the tree must be left-extended"))?;
        if extension.context() != trimming.overhang() {
            return Err(format!(
                "TreeTraverser: left extension {} does not match the trimming overhang {}",
                extension.context(), trimming.overhang()
            ));
        }
        let merging = *stage.merging().ok_or(String::from("TreeTraverser: the tree must be merged"))?;

        let window = trimming.overhang() + 1;
        let filled = colours.full(stage.tree());
        let domain_size = stage.tree().domain_size();
        let mut result = TreeTraverser {
            stage,
            stages: Stages { labels, colours, trimming, pruning, extension, merging },
            window,
            filled,
            walker: Walker::Done,
            tasks: Vec::new(),
            window_buf: Vec::new(),
            coverage: Coverage::new(domain_size),
            coordinate: Coordinate::Reference(0),
            positioned: false,
            finished: false,
        };
        result.reset();
        Ok(result)
    }

    /// Returns the window size of the traverser.
    #[inline]
    pub fn window_size(&self) -> usize {
        self.window
    }

    /// Restarts the traversal from the beginning.
    pub fn reset(&mut self) {
        let variant_count = self.stage.tree().store().len();
        self.tasks.clear();
        for index in (0..variant_count).rev() {
            self.tasks.push(Task::Spawn(index));
        }
        self.walker = Walker::Spine(SpineWalker {
            start: 0,
            next_in: 0,
            active: Vec::new(),
        });
        self.positioned = false;
        self.finished = false;
    }

    /// Moves to the next window.
    ///
    /// Returns `true` if a window is available through [`TreeTraverser::cargo`]
    /// and `false` when the traversal has reached the sink.
    pub fn advance(&mut self) -> bool {
        let k = self.window;
        let stages = self.stages;
        loop {
            let tree = self.stage.tree();
            let step = match &mut self.walker {
                Walker::Done => None,
                Walker::Spine(spine) => spine_step(spine, tree, &self.filled, &stages, k),
                Walker::Branch(branch) => branch_step(branch, tree, &stages, k, &mut self.tasks),
            };

            match step {
                Some(emission) => {
                    self.window_buf.clear();
                    match &self.walker {
                        Walker::Spine(_) => {
                            self.window_buf.extend_from_slice(
                                stages.labels.window(tree.source(), emission.start, k)
                            );
                        }
                        Walker::Branch(branch) => {
                            self.window_buf.extend_from_slice(
                                stages.labels.window(&branch.label, emission.start, k)
                            );
                        }
                        Walker::Done => {}
                    }
                    self.coverage = emission.coverage;
                    self.coordinate = emission.coordinate;
                    self.positioned = true;
                    return true;
                }
                None => {
                    match self.tasks.pop() {
                        Some(Task::Spawn(index)) => {
                            self.walker = match spawn_branch(tree, &stages, index) {
                                Some(walker) => Walker::Branch(walker),
                                None => Walker::Done,
                            };
                        }
                        Some(Task::Walker(walker)) => {
                            self.walker = Walker::Branch(walker);
                        }
                        None => {
                            self.walker = Walker::Done;
                            self.positioned = false;
                            self.finished = true;
                            return false;
                        }
                    }
                }
            }
        }
    }

    /// Returns `true` if the traversal has reached the sink.
    #[inline]
    pub fn is_sink(&self) -> bool {
        self.finished
    }

    /// Returns the cargo of the current window, if the traverser is positioned on one.
    pub fn cargo(&self) -> Option<Cargo<'_>> {
        if !self.positioned {
            return None;
        }
        Some(Cargo {
            segment: &self.window_buf,
            coverage: &self.coverage,
            coordinate: self.coordinate,
        })
    }

    /// Advances and returns the next cargo, or [`None`] at the sink.
    pub fn next_window(&mut self) -> Option<Cargo<'_>> {
        if self.advance() {
            self.cargo()
        } else {
            None
        }
    }

    /// Repositions the traversal at the given coordinate.
    ///
    /// The next call to [`TreeTraverser::advance`] continues from the window
    /// starting at the coordinate, on the branch of the named variant or on the
    /// reference spine, and then completes the rest of the traversal. Requires
    /// a seekable stack.
    pub fn seek(&mut self, coordinate: Coordinate) -> Result<(), String> {
        let seeking = *self.stage.seeking().ok_or(
            String::from("TreeTraverser: the tree does not support seeking")
        )?;
        let stages = self.stages;
        let tree = self.stage.tree();
        let store = tree.store();
        match coordinate {
            Coordinate::Reference(position) => {
                if position + self.window > tree.source().len() {
                    return Err(format!(
                        "TreeTraverser: no window of size {} starts at position {}",
                        self.window, position
                    ));
                }
                let (active, next_in) = stages.merging.rebuild(store, position, self.window);
                self.tasks.clear();
                for index in (0..store.len()).rev() {
                    self.tasks.push(Task::Spawn(index));
                }
                self.walker = Walker::Spine(SpineWalker { start: position, next_in, active });
            }
            Coordinate::Alternate { variant, offset } => {
                let record = store.get(variant).ok_or(format!(
                    "TreeTraverser: variant index {} is out of range", variant
                ))?;
                if offset >= record.alt().len() {
                    return Err(format!(
                        "TreeTraverser: offset {} is out of range for a literal of length {}",
                        offset, record.alt().len()
                    ));
                }
                let mut walker = spawn_branch(tree, &stages, variant).ok_or(format!(
                    "TreeTraverser: no sequence reaches variant {}", variant
                ))?;
                let low = record.breakpoint().low_breakend();
                let context_len = low - stages.extension.context_start(low);
                walker.start = seeking.label_position(context_len, offset);
                self.tasks.clear();
                for index in (variant + 1..store.len()).rev() {
                    self.tasks.push(Task::Spawn(index));
                }
                self.walker = Walker::Branch(walker);
            }
        }
        self.positioned = false;
        self.finished = false;
        Ok(())
    }
}

//-----------------------------------------------------------------------------

// One step of the spine walk. The merging stage tracks the variants whose
// regions overlap the window; the pruning stage drops empty windows.
fn spine_step(
    spine: &mut SpineWalker,
    tree: &BreakpointTree<'_>,
    filled: &Coverage,
    stages: &Stages,
    k: usize,
) -> Option<Emission> {
    let source = tree.source();
    let store = tree.store();
    while spine.start + k <= source.len() {
        stages.merging.activate(store, &mut spine.active, &mut spine.next_in, spine.start, k);
        stages.merging.expire(store, &mut spine.active, spine.start);
        let coverage = stages.merging.coverage(tree, filled, &spine.active);
        let start = spine.start;
        spine.start += 1;
        if stages.pruning.reachable(&coverage) {
            return Some(Emission {
                start,
                coverage,
                coordinate: Coordinate::Reference(start),
            });
        }
    }
    None
}

//-----------------------------------------------------------------------------

// Spawns the branch of the variant with the given index, or nothing if the
// pruning stage rejects it. The extension stage supplies the left context and
// the exclusions; the trimming stage fixes the cap on window starts.
fn spawn_branch(tree: &BreakpointTree<'_>, stages: &Stages, index: usize) -> Option<BranchWalker> {
    let source = tree.source();
    let store = tree.store();
    let coverage = tree.effective(index).clone();
    if !stages.pruning.reachable(&coverage) {
        return None;
    }

    // Task::Spawn indexes come from 0..store.len() in reset() and seek().
    let variant = store.get(index).unwrap();
    let low = variant.breakpoint().low_breakend();
    let context_start = stages.extension.context_start(low);

    let capacity = (low - context_start) + variant.alt().len() + stages.trimming.overhang() + 1;
    let mut label: Vec<u8> = Vec::with_capacity(capacity);
    let mut origin: Vec<Coordinate> = Vec::with_capacity(capacity);
    for position in context_start..low {
        stages.labels.spell_reference(&mut label, &mut origin, source, position);
    }
    stages.labels.spell_literal(&mut label, &mut origin, index, variant.alt());
    let cap = stages.trimming.cap(low - context_start, variant.alt().len());
    let left_excls = stages.extension.exclusions(tree, index, context_start);

    Some(BranchWalker {
        label,
        origin,
        start: 0,
        cap,
        coverage,
        walk_pos: variant.breakpoint().high_breakend(),
        next_variant: store.next_compatible(index),
        left_excls,
    })
}

// One step of a branch walk: emit the next window, spell more symbols, or
// split at a nested variant. Nested take-branches are pushed as pending tasks;
// the current walker continues as the reference side of the split.
fn branch_step(
    branch: &mut BranchWalker,
    tree: &BreakpointTree<'_>,
    stages: &Stages,
    k: usize,
    tasks: &mut Vec<Task>,
) -> Option<Emission> {
    let source = tree.source();
    let store = tree.store();
    loop {
        if stages.trimming.exhausted(branch.start, branch.cap)
            || !stages.pruning.reachable(&branch.coverage)
        {
            return None;
        }

        if branch.start + k <= branch.label.len() {
            // Emit the window at the current start.
            let start = branch.start;
            branch.start += 1;
            let coordinate = stages.labels.provenance(&branch.origin, start);
            let mut coverage = branch.coverage.clone();
            stages.extension.withdraw(tree, &branch.left_excls, coordinate, &mut coverage);
            if stages.pruning.reachable(&coverage) {
                return Some(Emission { start, coverage, coordinate });
            }
            continue;
        }

        // Spell more symbols, splitting at the next variant when we reach it.
        if branch.next_variant < store.len()
            && store.get(branch.next_variant).unwrap().breakpoint().low_breakend() == branch.walk_pos
        {
            // next_variant is in [0, store.len()): checked above, and it only
            // advances through next_compatible() and index + 1 below.
            let index = branch.next_variant;
            let variant = store.get(index).unwrap();

            let taken = stages.colours.take(tree, &branch.coverage, index);
            if stages.pruning.reachable(&taken) {
                let mut take = branch.clone();
                take.coverage = taken;
                stages.labels.spell_literal(&mut take.label, &mut take.origin, index, variant.alt());
                take.walk_pos = variant.breakpoint().high_breakend();
                take.next_variant = store.next_compatible(index);
                tasks.push(Task::Walker(take));
            }

            // The reference side of the split continues here.
            stages.colours.bypass(tree, &mut branch.coverage, index);
            branch.next_variant = index + 1;
            continue;
        }

        if branch.walk_pos < source.len() {
            stages.labels.spell_reference(&mut branch.label, &mut branch.origin, source, branch.walk_pos);
            branch.walk_pos += 1;
            continue;
        }

        // No symbols left for another full window.
        return None;
    }
}

//-----------------------------------------------------------------------------
