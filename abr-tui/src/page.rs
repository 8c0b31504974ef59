//! One dashboard page: status tabs over a paginated record table

use abr_core::{
    ClickOutcome, Column, DraggableTabBar, NavTab, Page, PaginatedTable, TableOptions,
};
use ratatui::layout::Constraint;
use serde::Serialize;

use crate::app::{AppEvent, EventSender};

/// Tab id that shows every record
pub const ALL_TAB: &str = "all";

/// A record type shown on one dashboard page
pub trait Record: Serialize + Clone + Send + 'static {
    const PAGE: Page;

    /// `(tab id, label)` for each status, in default tab order
    fn statuses() -> &'static [(&'static str, &'static str)];

    fn status(&self) -> &str;

    /// Short human description for the status bar
    fn describe(&self) -> String;

    fn columns(events: &EventSender) -> Vec<Column<Self>>;

    fn widths() -> &'static [Constraint];
}

/// What the app and renderer need from a page, independent of its row type
pub trait PageView: Send {
    fn page(&self) -> Page;
    fn bar(&self) -> &DraggableTabBar;
    fn bar_mut(&mut self) -> &mut DraggableTabBar;
    /// Tab ids in default order
    fn default_order(&self) -> Vec<String>;
    /// Re-filter the table to the active tab
    fn apply_filter(&mut self);

    fn headers(&self) -> Vec<String>;
    fn page_cells(&self) -> Vec<Vec<String>>;
    fn column_widths(&self) -> Vec<Constraint>;
    fn is_empty(&self) -> bool;
    fn empty_message(&self) -> &'static str;
    fn range_label(&self) -> String;
    fn page_label(&self) -> String;
    fn page_size(&self) -> usize;

    fn next_rows(&mut self) -> bool;
    fn prev_rows(&mut self) -> bool;
    fn first_rows(&mut self) -> bool;
    fn last_rows(&mut self) -> bool;
    /// Step to the next (or previous) offered page size
    fn step_page_size(&mut self, forward: bool) -> Option<usize>;
    fn click_cell(&mut self, row: usize, column: usize) -> ClickOutcome;
}

pub struct PageState<R: Record> {
    records: Vec<R>,
    defaults: Vec<NavTab>,
    bar: DraggableTabBar,
    table: PaginatedTable<R>,
}

impl<R: Record> PageState<R> {
    pub fn new(
        records: Vec<R>,
        options: TableOptions,
        events: &EventSender,
    ) -> abr_core::Result<Self> {
        let defaults = status_tabs(&records);
        let page = R::PAGE;

        let reorder_tx = events.clone();
        let select_tx = events.clone();
        let bar = DraggableTabBar::new(defaults.clone())
            .on_reorder(move |order| {
                let _ = reorder_tx.send(AppEvent::TabsReordered {
                    page,
                    order: order.to_vec(),
                });
            })
            .on_select(move |id| {
                let _ = select_tx.send(AppEvent::TabSelected {
                    page,
                    id: id.to_string(),
                });
            });

        let click_tx = events.clone();
        let table = PaginatedTable::new(R::columns(events), records.clone(), options)?
            .on_row_click(move |row: &R| {
                let _ = click_tx.send(AppEvent::RowClicked {
                    page,
                    summary: row.describe(),
                });
            });

        Ok(Self {
            records,
            defaults,
            bar,
            table,
        })
    }
}

/// "All" plus one tab per status, each counting its matching records
pub fn status_tabs<R: Record>(records: &[R]) -> Vec<NavTab> {
    let mut tabs = vec![NavTab::new(ALL_TAB, "All", records.len() as u32)];
    tabs.extend(R::statuses().iter().map(|(id, label)| {
        let count = records.iter().filter(|r| r.status() == *id).count();
        NavTab::new(*id, *label, count as u32)
    }));
    tabs
}

impl<R: Record> PageView for PageState<R> {
    fn page(&self) -> Page {
        R::PAGE
    }

    fn bar(&self) -> &DraggableTabBar {
        &self.bar
    }

    fn bar_mut(&mut self) -> &mut DraggableTabBar {
        &mut self.bar
    }

    fn default_order(&self) -> Vec<String> {
        abr_core::tab_ids(&self.defaults)
    }

    fn apply_filter(&mut self) {
        let rows = match self.bar.active_id() {
            None | Some(ALL_TAB) => self.records.clone(),
            Some(status) => self
                .records
                .iter()
                .filter(|r| r.status() == status)
                .cloned()
                .collect(),
        };
        self.table.set_data(rows);
    }

    fn headers(&self) -> Vec<String> {
        self.table.headers()
    }

    fn page_cells(&self) -> Vec<Vec<String>> {
        self.table.page_cells()
    }

    fn column_widths(&self) -> Vec<Constraint> {
        R::widths().to_vec()
    }

    fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    fn empty_message(&self) -> &'static str {
        self.table.empty_message()
    }

    fn range_label(&self) -> String {
        self.table.range_label()
    }

    fn page_label(&self) -> String {
        self.table.page_label()
    }

    fn page_size(&self) -> usize {
        self.table.page_size()
    }

    fn next_rows(&mut self) -> bool {
        self.table.next_page()
    }

    fn prev_rows(&mut self) -> bool {
        self.table.prev_page()
    }

    fn first_rows(&mut self) -> bool {
        self.table.first_page()
    }

    fn last_rows(&mut self) -> bool {
        self.table.last_page()
    }

    fn step_page_size(&mut self, forward: bool) -> Option<usize> {
        let size = self.table.adjacent_page_size(forward)?;
        self.table.select_page_size(size).ok()?;
        Some(size)
    }

    fn click_cell(&mut self, row: usize, column: usize) -> ClickOutcome {
        self.table.click_cell(row, column)
    }
}
