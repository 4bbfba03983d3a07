use super::*;

use crate::internal;
use crate::traverse::TreeTraverser;

//-----------------------------------------------------------------------------

#[test]
fn label_stage_spells_with_provenance() {
    let stage = LabelStage;
    let mut label: Vec<u8> = Vec::new();
    let mut origin: Vec<Coordinate> = Vec::new();

    stage.spell_reference(&mut label, &mut origin, b"GATTACA", 2);
    stage.spell_literal(&mut label, &mut origin, 5, b"CC");

    assert_eq!(label, b"TCC", "Wrong spelled label");
    let expected = vec![
        Coordinate::Reference(2),
        Coordinate::Alternate { variant: 5, offset: 0 },
        Coordinate::Alternate { variant: 5, offset: 1 },
    ];
    assert_eq!(origin, expected, "Wrong provenance");

    assert_eq!(stage.window(&label, 1, 2), b"CC", "Wrong window of the label");
    assert_eq!(
        stage.provenance(&origin, 1),
        Coordinate::Alternate { variant: 5, offset: 0 },
        "Wrong provenance for a window start"
    );
}

#[test]
fn colour_stage_narrows_and_bypasses() {
    let jst = internal::build_jst(b"GATTACA", 3, &[
        internal::substitution(1, "C", &[true, true, false]),
    ]);
    let tree = BreakpointTree::new(&jst);
    let stage = ColourStage;

    let full = stage.full(&tree);
    assert_eq!(full, Coverage::filled(3), "Wrong full coverage");

    let taken = stage.take(&tree, &full, 0);
    assert_eq!(taken, internal::coverage(&[true, true, false]), "Wrong coverage after taking the variant");

    let mut rest = full.clone();
    stage.bypass(&tree, &mut rest, 0);
    assert_eq!(rest, internal::coverage(&[false, false, true]), "Wrong coverage after bypassing the variant");
}

#[test]
fn trim_stage_bounds_window_starts() {
    let stage = TrimStage::new(3);
    assert_eq!(stage.overhang(), 3, "Wrong overhang");
    // A branch with a 3-symbol context and a 2-symbol literal emits windows
    // starting anywhere in the context or the literal, and nothing after.
    assert_eq!(stage.cap(3, 2), 5, "Wrong cap");
    assert!(!stage.exhausted(4, 5), "Trimmed a window below the cap");
    assert!(stage.exhausted(5, 5), "Did not trim at the cap");
}

#[test]
fn prune_stage_gates_on_coverage() {
    let stage = PruneStage;
    assert!(stage.reachable(&internal::coverage(&[false, true])), "Pruned a reachable subtree");
    assert!(!stage.reachable(&Coverage::new(2)), "Kept an unreachable subtree");
}

//-----------------------------------------------------------------------------

#[test]
fn left_extend_stage_clamps_the_context() {
    let stage = LeftExtendStage::new(3);
    assert_eq!(stage.context(), 3, "Wrong context length");
    assert_eq!(stage.context_start(5), 2, "Wrong context start");
    assert_eq!(stage.context_start(1), 0, "The context should be clamped at the start of the source");
}

#[test]
fn left_extend_stage_withdraws_changed_contexts() {
    // The deletion reaches into the context of the substitution branch. Its
    // sequences spell a different context, so they are withdrawn from windows
    // whose context overlaps the deletion and kept in the later ones.
    let jst = internal::build_jst(b"aaaaaaaa", 2, &[
        internal::deletion(2, 2, &[true, false]),
        internal::substitution(6, "b", &[true, true]),
    ]);
    let tree = BreakpointTree::new(&jst);
    let stage = LeftExtendStage::new(3);

    let exclusions = stage.exclusions(&tree, 1, 3);
    assert_eq!(exclusions, vec![0], "Wrong exclusions for the branch");

    let mut coverage = internal::coverage(&[true, true]);
    stage.withdraw(&tree, &exclusions, Coordinate::Reference(3), &mut coverage);
    assert_eq!(coverage, internal::coverage(&[false, true]), "The overlapped window kept the deleted sequence");

    let mut coverage = internal::coverage(&[true, true]);
    stage.withdraw(&tree, &exclusions, Coordinate::Reference(4), &mut coverage);
    assert_eq!(coverage, internal::coverage(&[true, true]), "The later window lost the deleted sequence");

    // A window starting inside the literal has no context part.
    let mut coverage = internal::coverage(&[true, true]);
    stage.withdraw(
        &tree, &exclusions,
        Coordinate::Alternate { variant: 1, offset: 0 },
        &mut coverage
    );
    assert_eq!(coverage, internal::coverage(&[true, true]), "A literal window was withdrawn");
}

#[test]
fn left_extend_stage_skips_conflicting_variants() {
    // The overlapped deletion never applies together with the first one, so
    // the effective coverage already excludes its sequences.
    let jst = internal::build_jst(b"aaaaaaaa", 2, &[
        internal::deletion(0, 4, &[true, false]),
        internal::deletion(2, 4, &[true, true]),
    ]);
    let tree = BreakpointTree::new(&jst);
    let stage = LeftExtendStage::new(3);
    assert_eq!(stage.exclusions(&tree, 1, 0), Vec::<usize>::new(), "A conflicting variant was listed");
}

//-----------------------------------------------------------------------------

#[test]
fn merge_stage_returns_coverage_to_the_shared_path() {
    let jst = internal::build_jst(b"aaaaaa", 2, &[
        internal::substitution(3, "b", &[true, false]),
    ]);
    let tree = BreakpointTree::new(&jst);
    let store = jst.store();
    let stage = MergeStage;
    let full = Coverage::filled(2);

    let mut active: Vec<usize> = Vec::new();
    let mut next_in = 0;

    // The window [1, 3) does not reach the variant at 3 yet.
    stage.activate(store, &mut active, &mut next_in, 1, 2);
    stage.expire(store, &mut active, 1);
    assert!(active.is_empty(), "A variant ahead of the window is active");
    assert_eq!(stage.coverage(&tree, &full, &active), full, "Wrong coverage before the variant");

    // The window [2, 4) overlaps the variant.
    stage.activate(store, &mut active, &mut next_in, 2, 2);
    stage.expire(store, &mut active, 2);
    assert_eq!(active, vec![0], "The overlapping variant is not active");
    assert_eq!(
        stage.coverage(&tree, &full, &active),
        internal::coverage(&[false, true]),
        "Wrong coverage over the variant"
    );

    // The window [4, 6) has passed the variant: its sequences return.
    stage.activate(store, &mut active, &mut next_in, 4, 2);
    stage.expire(store, &mut active, 4);
    assert!(active.is_empty(), "A passed variant is still active");
    assert_eq!(stage.coverage(&tree, &full, &active), full, "Coverage did not return to the shared path");
}

#[test]
fn merge_stage_treats_insertion_boundaries_as_shared() {
    // An insertion exactly at a window boundary does not change the window.
    let jst = internal::build_jst(b"aaaaaa", 2, &[
        internal::insertion(3, "b", &[true, false]),
    ]);
    let tree = BreakpointTree::new(&jst);
    let store = jst.store();
    let stage = MergeStage;
    let full = Coverage::filled(2);

    // Window [1, 3): the insertion sits at the end boundary.
    let (active, _) = stage.rebuild(store, 1, 2);
    assert!(active.is_empty(), "An insertion at the window end is active");

    // Window [2, 4): the insertion is strictly inside.
    let (active, _) = stage.rebuild(store, 2, 2);
    assert_eq!(active, vec![0], "An insertion inside the window is not active");
    assert_eq!(
        stage.coverage(&tree, &full, &active),
        internal::coverage(&[false, true]),
        "Wrong coverage over the insertion"
    );

    // Window [3, 5): the insertion sits at the start boundary.
    let (active, _) = stage.rebuild(store, 3, 2);
    assert!(active.is_empty(), "An insertion at the window start is active");
}

#[test]
fn merge_stage_rebuild_matches_the_walk() {
    let jst = internal::build_jst(b"aaaaaaaaaa", 2, &[
        internal::substitution(2, "b", &[true, false]),
        internal::deletion(5, 3, &[false, true]),
    ]);
    let store = jst.store();
    let stage = MergeStage;

    for start in 0..7 {
        let mut active: Vec<usize> = Vec::new();
        let mut next_in = 0;
        for position in 0..=start {
            stage.activate(store, &mut active, &mut next_in, position, 4);
            stage.expire(store, &mut active, position);
        }
        let (rebuilt, rebuilt_next) = stage.rebuild(store, start, 4);
        assert_eq!(rebuilt, active, "Wrong active set for start {}", start);
        assert_eq!(rebuilt_next, next_in, "Wrong activation point for start {}", start);
    }
}

//-----------------------------------------------------------------------------

#[test]
fn seek_stage_positions_inside_the_literal() {
    let stage = SeekStage;
    assert_eq!(stage.label_position(3, 0), 3, "Wrong label position for the literal start");
    assert_eq!(stage.label_position(3, 2), 5, "Wrong label position inside the literal");
}

//-----------------------------------------------------------------------------

#[test]
fn stages_accumulate() {
    let jst = internal::build_jst(b"GATTACA", 2, &[internal::substitution(1, "C", &[true, false])]);
    let tree = BreakpointTree::new(&jst);
    assert!(tree.labels().is_none(), "A raw tree should have no labelling stage");
    assert!(tree.colours().is_none(), "A raw tree should have no colouring stage");
    assert!(tree.trimming().is_none(), "A raw tree should have no trimming stage");
    assert!(tree.pruning().is_none(), "A raw tree should have no pruning stage");
    assert!(tree.extension().is_none(), "A raw tree should have no extension stage");
    assert!(tree.merging().is_none(), "A raw tree should have no merging stage");
    assert!(tree.seeking().is_none(), "A raw tree should have no seek stage");

    let stage = BreakpointTree::new(&jst)
        .labelled()
        .coloured()
        .trim(3)
        .prune()
        .left_extend(3)
        .merge()
        .seek();
    assert!(stage.labels().is_some(), "The stack should be labelled");
    assert!(stage.colours().is_some(), "The stack should be coloured");
    assert_eq!(stage.trimming().map(|trim| trim.overhang()), Some(3), "Wrong trimming overhang");
    assert!(stage.pruning().is_some(), "The stack should be pruned");
    assert_eq!(stage.extension().map(|ext| ext.context()), Some(3), "Wrong left extension");
    assert!(stage.merging().is_some(), "The stack should be merged");
    assert!(stage.seeking().is_some(), "The stack should be seekable");
}

#[test]
fn traverser_requires_the_stack() {
    let jst = internal::build_jst(b"GATTACA", 2, &[internal::substitution(1, "C", &[true, false])]);

    let bare = BreakpointTree::new(&jst);
    assert!(TreeTraverser::new(bare).is_err(), "Built a traverser over a raw tree");

    let unpruned = BreakpointTree::new(&jst).labelled().coloured().trim(3).left_extend(3).merge();
    assert!(TreeTraverser::new(unpruned).is_err(), "Built a traverser without pruning");

    let mismatched = BreakpointTree::new(&jst).labelled().coloured().trim(3).prune().left_extend(2).merge();
    assert!(TreeTraverser::new(mismatched).is_err(), "Built a traverser with a mismatched extension");

    let complete = BreakpointTree::new(&jst).labelled().coloured().trim(3).prune().left_extend(3).merge();
    let traverser = TreeTraverser::new(complete);
    assert!(traverser.is_ok(), "Failed to build a traverser: {}", traverser.unwrap_err());
    assert_eq!(traverser.unwrap().window_size(), 4, "Wrong window size from the trimming overhang");
}

#[test]
fn seeking_requires_the_seek_stage() {
    let jst = internal::build_jst(b"GATTACA", 2, &[internal::substitution(1, "C", &[true, false])]);
    let stage = BreakpointTree::new(&jst).labelled().coloured().trim(2).prune().left_extend(2).merge();
    let mut traverser = TreeTraverser::new(stage).unwrap();
    assert!(
        traverser.seek(Coordinate::Reference(0)).is_err(),
        "Sought without the seek stage"
    );

    let stage = BreakpointTree::new(&jst).labelled().coloured().trim(2).prune().left_extend(2).merge().seek();
    let mut traverser = TreeTraverser::new(stage).unwrap();
    assert!(
        traverser.seek(Coordinate::Reference(0)).is_ok(),
        "Failed to seek with the seek stage"
    );
}

//-----------------------------------------------------------------------------
