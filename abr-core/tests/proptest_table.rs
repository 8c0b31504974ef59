use abr_core::table::{Column, PaginatedTable, TableOptions};
use proptest::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Row {
    id: usize,
}

fn table(len: usize, page_size: usize) -> PaginatedTable<Row> {
    PaginatedTable::new(
        vec![Column::new("id", "ID")],
        (0..len).map(|id| Row { id }).collect(),
        TableOptions {
            page_size,
            page_size_options: Vec::new(),
            show_page_size: true,
        },
    )
    .unwrap()
}

proptest! {
    /// Property: page count is max(1, ceil(len / size))
    #[test]
    fn prop_page_count(len in 0usize..500, size in 1usize..60) {
        let table = table(len, size);
        prop_assert_eq!(table.page_count(), std::cmp::max(1, len.div_ceil(size)));
    }

    /// Property: page k shows rows k*size .. min((k+1)*size, len) in order
    #[test]
    fn prop_page_slice(len in 0usize..300, size in 1usize..40, page in 0usize..20) {
        let mut table = table(len, size);
        table.go_to_page(page);

        let k = page.min(table.page_count() - 1);
        prop_assert_eq!(table.page_index(), k);

        let start = (k * size).min(len);
        let end = ((k + 1) * size).min(len);
        let ids: Vec<usize> = table.visible_rows().iter().map(|r| r.id).collect();
        prop_assert_eq!(ids, (start..end).collect::<Vec<_>>());

        let cells = table.page_cells();
        prop_assert_eq!(cells.len(), end - start);
        if let Some(first) = cells.first() {
            prop_assert_eq!(first[0].clone(), start.to_string());
        }
    }

    /// Property: changing page size always returns to the first page
    #[test]
    fn prop_page_size_change_resets(len in 1usize..300, size in 1usize..40, page in 0usize..20, new_size in 1usize..40) {
        let mut table = table(len, size);
        table.go_to_page(page);
        table.select_page_size(new_size).unwrap();

        prop_assert_eq!(table.page_index(), 0);
        prop_assert_eq!(table.visible_rows().len(), new_size.min(len));
    }

    /// Property: next/prev never leave the valid page range
    #[test]
    fn prop_navigation_stays_in_bounds(len in 0usize..200, size in 1usize..30, steps in prop::collection::vec(any::<bool>(), 0..40)) {
        let mut table = table(len, size);
        for forward in steps {
            if forward { table.next_page(); } else { table.prev_page(); }
            prop_assert!(table.page_index() < table.page_count());
            prop_assert_eq!(table.has_prev(), table.page_index() > 0);
            prop_assert_eq!(table.has_next(), table.page_index() + 1 < table.page_count());
        }
    }
}
