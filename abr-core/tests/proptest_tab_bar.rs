use abr_core::nav::{apply_order, NavTab};
use abr_core::tab_bar::{DragOutcome, DraggableTabBar, TabSpan};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

const TAB_WIDTH: u16 = 8;

fn tabs(n: usize) -> Vec<NavTab> {
    (0..n)
        .map(|i| NavTab::new(format!("t{i}"), format!("Tab {i}"), i as u32))
        .collect()
}

fn laid_out(n: usize) -> DraggableTabBar {
    let mut bar = DraggableTabBar::new(tabs(n));
    bar.set_layout(TabSpan::sequential(vec![TAB_WIDTH; n], 0, 0));
    bar
}

fn center(index: usize) -> u16 {
    index as u16 * TAB_WIDTH + TAB_WIDTH / 2
}

proptest! {
    /// Property: one rendered item per tab, exactly one active
    #[test]
    fn prop_items_match_tabs(n in 1usize..12, active in 0usize..12) {
        let mut bar = DraggableTabBar::new(tabs(n));
        bar.select(&format!("t{}", active % n));

        let items = bar.items();
        prop_assert_eq!(items.len(), n);
        prop_assert_eq!(items.iter().filter(|item| item.active).count(), 1);
        prop_assert_eq!(items[active % n].id, format!("t{}", active % n));
    }

    /// Property: dragging tab i just past slot j's midpoint moves it to j
    /// and reports the full new order exactly once
    #[test]
    fn prop_drag_moves_tab(n in 2usize..10, from in 0usize..10, to in 0usize..10) {
        let (from, to) = (from % n, to % n);
        prop_assume!(from != to);

        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        let mut bar = laid_out(n).on_reorder(move |order| sink.lock().unwrap().push(order.to_vec()));

        // moving right, the target's own midpoint has to be crossed
        let drop_x = if from < to { center(to) + 1 } else { center(to) };
        prop_assert!(bar.pointer_down(center(from)));
        bar.pointer_move(drop_x);
        let outcome = bar.pointer_up(drop_x);

        let mut expected: Vec<String> = (0..n).map(|i| format!("t{i}")).collect();
        let moved = expected.remove(from);
        expected.insert(to, moved);

        prop_assert_eq!(outcome, DragOutcome::Reordered(expected.clone()));
        prop_assert_eq!(bar.order(), expected.clone());
        prop_assert_eq!(calls.lock().unwrap().clone(), vec![expected]);
    }

    /// Property: releasing a dragged tab over its own slot never reports a reorder
    #[test]
    fn prop_release_in_place_is_silent(n in 1usize..10, index in 0usize..10, wiggle in 1u16..3) {
        let index = index % n;
        let calls = Arc::new(Mutex::new(0usize));
        let sink = calls.clone();
        let mut bar = laid_out(n).on_reorder(move |_| *sink.lock().unwrap() += 1);

        let x = center(index);
        prop_assert!(bar.pointer_down(x));
        bar.pointer_move(x + wiggle);
        let outcome = bar.pointer_up(x);

        prop_assert_eq!(outcome, DragOutcome::Unchanged);
        prop_assert_eq!(*calls.lock().unwrap(), 0);
        prop_assert_eq!(bar.order(), (0..n).map(|i| format!("t{i}")).collect::<Vec<_>>());
    }

    /// Property: stored orders are permutations of the defaults
    #[test]
    fn prop_apply_order_is_permutation(
        n in 0usize..10,
        stored in prop::collection::vec(0usize..14, 0..14),
    ) {
        let defaults = tabs(n);
        let stored: Vec<String> = stored.into_iter().map(|i| format!("t{i}")).collect();
        let ordered = apply_order(&defaults, &stored);

        let mut ids: Vec<_> = ordered.iter().map(|t| t.id.clone()).collect();
        ids.sort();
        let mut expected: Vec<_> = defaults.iter().map(|t| t.id.clone()).collect();
        expected.sort();
        prop_assert_eq!(ids, expected);
    }
}
