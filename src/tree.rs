//! The raw breakpoint sequence tree.
//!
//! The tree is a virtual structure over a source sequence and a variant store.
//! Every root-to-sink path spells one derived sequence representable from the
//! collection, and the coverage at a sink names exactly the sequences that
//! spell it. Nodes are materialized on demand; the tree itself only stores the
//! effective coverages of the variants.
//!
//! The raw tree branches at every variant site. Window-based search uses the
//! adaptor pipeline in [`crate::pipeline`] and the traverser in
//! [`crate::traverse`] on top of the data stored here.

use crate::coverage::Coverage;
use crate::jst::JournaledSequenceTree;
use crate::variants::VariantStore;


//-----------------------------------------------------------------------------

/// A virtual tree of the derived sequences in a journaled sequence tree.
///
/// The tree borrows the source and the variant store and must not outlive them.
/// Construction resolves variant conflicts into effective coverages, which then
/// determine the edges: an alternate edge exists only if some sequence on the
/// current path actually applies the variant.
///
/// # Examples
///
/// ```
/// use jst_base::{Breakpoint, BreakpointTree, Coverage, JournaledSequenceTree, Variant};
///
/// let mut jst = JournaledSequenceTree::new(b"AAAA".to_vec(), 2);
/// let variant = Variant::new(
///     Breakpoint::with_span(1, 1), b"C".to_vec(), Coverage::from_bits(&[true, false])
/// ).unwrap();
/// jst.insert(variant).unwrap();
/// let tree = BreakpointTree::new(&jst);
///
/// let root = tree.root();
/// let children = root.children(&tree);
/// // A reference edge to the variant site.
/// assert_eq!(children.len(), 1);
/// assert_eq!(children[0].sequence(), b"A");
/// // The site has a reference child and an alternate child.
/// assert_eq!(children[0].children(&tree).len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct BreakpointTree<'a> {
    source: &'a [u8],
    store: &'a VariantStore,
    effective: Vec<Coverage>,
}

impl<'a> BreakpointTree<'a> {
    /// Creates a tree over the source and variants of the given collection.
    pub fn new(jst: &'a JournaledSequenceTree) -> Self {
        BreakpointTree {
            source: jst.source(),
            store: jst.store(),
            effective: jst.store().effective_coverages(),
        }
    }

    /// Returns the source sequence.
    #[inline]
    pub fn source(&self) -> &'a [u8] {
        self.source
    }

    /// Returns the variant store.
    #[inline]
    pub fn store(&self) -> &'a VariantStore {
        self.store
    }

    /// Returns the number of derived sequences in the collection.
    #[inline]
    pub fn domain_size(&self) -> usize {
        self.store.domain_size()
    }

    /// Returns the effective coverage of the variant with the given index.
    ///
    /// The effective coverage names the sequences that apply the variant under
    /// the first-wins conflict rule.
    #[inline]
    pub fn effective(&self, index: usize) -> &Coverage {
        &self.effective[index]
    }

    /// Returns the root of the tree.
    ///
    /// The root spells nothing; its children start the traversal at position 0
    /// with all sequences on the path.
    pub fn root(&self) -> TreeNode<'a> {
        TreeNode {
            segment: &[],
            position: 0,
            resume: 0,
            next_variant: 0,
            coverage: Coverage::filled(self.domain_size()),
        }
    }
}

//-----------------------------------------------------------------------------

/// A node in the breakpoint sequence tree.
///
/// A node corresponds to an edge of the virtual tree: it knows the segment the
/// edge spells, the source position where the segment begins, and the coverage
/// of the path so far. Pending high breakends are folded into the index of the
/// next candidate variant, which skips variants excluded by an open alternate.
#[derive(Clone, Debug)]
pub struct TreeNode<'a> {
    // Segment spelled by the incoming edge.
    segment: &'a [u8],

    // Source position where the incoming edge begins. For an alternate edge
    // this is the low breakend of the variant.
    position: usize,

    // Source position where traversal resumes after the edge.
    resume: usize,

    // Index of the next variant that may branch on this path.
    next_variant: usize,

    // Path coverage after the edge.
    coverage: Coverage,
}

impl<'a> TreeNode<'a> {
    /// Returns the segment spelled by the incoming edge.
    #[inline]
    pub fn sequence(&self) -> &'a [u8] {
        self.segment
    }

    /// Returns the source position where the incoming edge begins.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the path coverage after the edge.
    #[inline]
    pub fn coverage(&self) -> &Coverage {
        &self.coverage
    }

    /// Returns `true` if the node is a sink: the end of the source with no
    /// branch points left on the path.
    pub fn is_sink(&self, tree: &BreakpointTree<'a>) -> bool {
        if self.resume < tree.source().len() {
            return false;
        }
        // Insertions at the end of the source may still branch.
        self.next_variant >= tree.store().len()
    }

    /// Expands the children of the node lazily.
    ///
    /// The reference child comes first, followed by the alternate children in
    /// canonical order. An alternate edge is absent if no sequence on the path
    /// applies the variant.
    pub fn children(&self, tree: &BreakpointTree<'a>) -> Vec<TreeNode<'a>> {
        let source = tree.source();
        let store = tree.store();
        let index = self.next_variant;

        if index >= store.len() {
            if self.resume < source.len() {
                return vec![TreeNode {
                    segment: &source[self.resume..],
                    position: self.resume,
                    resume: source.len(),
                    next_variant: index,
                    coverage: self.coverage.clone(),
                }];
            }
            return Vec::new();
        }

        // index < store.len(): handled above. The indexes carried in a node
        // come from next_compatible() and group scans over the store.
        let site = store.get(index).unwrap().breakpoint().low_breakend();
        if site > self.resume {
            // A shared reference edge up to the next branch site.
            return vec![TreeNode {
                segment: &source[self.resume..site],
                position: self.resume,
                resume: site,
                next_variant: index,
                coverage: self.coverage.clone(),
            }];
        }

        // The variants at this site in canonical order.
        let mut end = index;
        while end < store.len() && store.get(end).unwrap().breakpoint().low_breakend() == site {
            end += 1;
        }

        let mut children: Vec<TreeNode<'a>> = Vec::new();

        // Reference child: sequences that stay on the reference at this site.
        let mut on_reference = self.coverage.clone();
        for alt_index in index..end {
            on_reference.and_not_assign(tree.effective(alt_index));
        }
        // end < store.len() in the first arm: the group scan stopped either at
        // the end of the store or at the first variant past this site.
        let next_site = if end < store.len() {
            store.get(end).unwrap().breakpoint().low_breakend()
        } else {
            source.len()
        };
        // At the end of the source the segment is empty, which still separates
        // the sequences that stay on the reference from the insertion branches.
        children.push(TreeNode {
            segment: &source[site..next_site],
            position: site,
            resume: next_site,
            next_variant: end,
            coverage: on_reference,
        });

        // Alternate children. A spanning variant at the same site follows an
        // insertion on the insertion branch, so its direct edge excludes the
        // sequences that take an insertion here first.
        let mut insertions_here = Coverage::new(tree.domain_size());
        for alt_index in index..end {
            let variant = store.get(alt_index).unwrap();
            let mut coverage = self.coverage.clone();
            coverage.and_assign(tree.effective(alt_index));
            coverage.and_not_assign(&insertions_here);
            if variant.is_insertion() {
                insertions_here.or_assign(tree.effective(alt_index));
            }
            if !coverage.any() {
                continue;
            }
            children.push(TreeNode {
                segment: variant.alt(),
                position: site,
                resume: variant.breakpoint().high_breakend(),
                next_variant: store.next_compatible(alt_index),
                coverage,
            });
        }

        children
    }
}

//-----------------------------------------------------------------------------
