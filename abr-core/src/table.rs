//! Generic client-side paginated table.
//!
//! Columns read their value either through a cell renderer or, by default,
//! by looking up `accessor_key` (a dotted path) in the row's serialized
//! form. Missing fields render as empty cells.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{AbrError, Result};

/// Rows per page when none is configured
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Placeholder shown instead of a header-only table
pub const EMPTY_MESSAGE: &str = "No results.";

pub type CellRenderer<Row> = Box<dyn Fn(&Row) -> String + Send + Sync>;
pub type HeaderRenderer = Box<dyn Fn() -> String + Send + Sync>;
pub type RowClickHandler<Row> = Box<dyn FnMut(&Row) + Send>;
pub type CellActionHandler<Row> = Box<dyn FnMut(&Row) + Send>;

/// Column header: fixed text or rendered on demand
pub enum Header {
    Text(String),
    Render(HeaderRenderer),
}

impl Header {
    pub fn text(&self) -> String {
        match self {
            Header::Text(text) => text.clone(),
            Header::Render(render) => render(),
        }
    }
}

/// One table column
pub struct Column<Row> {
    accessor_key: String,
    header: Header,
    cell: Option<CellRenderer<Row>>,
    action: Option<CellActionHandler<Row>>,
}

impl<Row> fmt::Debug for Column<Row> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("accessor_key", &self.accessor_key)
            .field("custom_cell", &self.cell.is_some())
            .field("interactive", &self.action.is_some())
            .finish()
    }
}

impl<Row> Column<Row> {
    pub fn new(accessor_key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            accessor_key: accessor_key.into(),
            header: Header::Text(header.into()),
            cell: None,
            action: None,
        }
    }

    /// Column whose header text is produced by `render`
    pub fn with_header_fn(
        accessor_key: impl Into<String>,
        render: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            accessor_key: accessor_key.into(),
            header: Header::Render(Box::new(render)),
            cell: None,
            action: None,
        }
    }

    /// Render cells with `render` instead of the accessor lookup
    pub fn cell(mut self, render: impl Fn(&Row) -> String + Send + Sync + 'static) -> Self {
        self.cell = Some(Box::new(render));
        self
    }

    /// Make the cell interactive. Clicks on it run `action` and do not
    /// reach the row click handler.
    pub fn action(mut self, action: impl FnMut(&Row) + Send + 'static) -> Self {
        self.action = Some(Box::new(action));
        self
    }

    pub fn accessor_key(&self) -> &str {
        &self.accessor_key
    }

    pub fn header_text(&self) -> String {
        self.header.text()
    }

    pub fn is_interactive(&self) -> bool {
        self.action.is_some()
    }

    fn render(&self, row: &Row, serialized: &Value) -> String {
        match &self.cell {
            Some(render) => render(row),
            None => field_text(serialized, &self.accessor_key),
        }
    }
}

/// Construction-time table options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub show_page_size: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_size_options: Vec::new(),
            show_page_size: false,
        }
    }
}

/// What a click was routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// An interactive cell handled it
    CellAction,
    /// The row click handler ran
    RowClick,
    /// The row exists but nothing listens for clicks
    NoHandler,
    /// No row at that position on the current page
    OutOfRange,
}

/// Column-driven table with client-side pagination
pub struct PaginatedTable<Row> {
    columns: Vec<Column<Row>>,
    data: Vec<Row>,
    options: TableOptions,
    page_index: usize,
    page_size: usize,
    on_row_click: Option<RowClickHandler<Row>>,
}

impl<Row> fmt::Debug for PaginatedTable<Row> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginatedTable")
            .field("columns", &self.columns)
            .field("rows", &self.data.len())
            .field("page_index", &self.page_index)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl<Row> PaginatedTable<Row> {
    /// Build a table. Fails on duplicate accessor keys or a zero page size.
    pub fn new(columns: Vec<Column<Row>>, data: Vec<Row>, options: TableOptions) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.accessor_key.as_str()) {
                return Err(AbrError::DuplicateColumn {
                    key: column.accessor_key.clone(),
                });
            }
        }
        if options.page_size == 0 {
            return Err(AbrError::InvalidPageSize { size: 0 });
        }

        Ok(Self {
            columns,
            data,
            page_size: options.page_size,
            options,
            page_index: 0,
            on_row_click: None,
        })
    }

    pub fn on_row_click(mut self, handler: impl FnMut(&Row) + Send + 'static) -> Self {
        self.on_row_click = Some(Box::new(handler));
        self
    }

    pub fn columns(&self) -> &[Column<Row>] {
        &self.columns
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(Column::header_text).collect()
    }

    pub fn data(&self) -> &[Row] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn empty_message(&self) -> &'static str {
        EMPTY_MESSAGE
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages; an empty table still has one (empty) page.
    pub fn page_count(&self) -> usize {
        self.data.len().div_ceil(self.page_size).max(1)
    }

    /// Rows of the current page, in dataset order
    pub fn visible_rows(&self) -> &[Row] {
        let (start, end) = self.page_bounds();
        &self.data[start..end]
    }

    pub fn has_next(&self) -> bool {
        self.page_index + 1 < self.page_count()
    }

    pub fn has_prev(&self) -> bool {
        self.page_index > 0
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.page_index + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        match self.page_index.checked_sub(1) {
            Some(index) => self.go_to_page(index),
            None => false,
        }
    }

    pub fn first_page(&mut self) -> bool {
        self.go_to_page(0)
    }

    pub fn last_page(&mut self) -> bool {
        self.go_to_page(self.page_count() - 1)
    }

    /// Jump to `index`, clamped to the last page. Returns whether the page
    /// changed.
    pub fn go_to_page(&mut self, index: usize) -> bool {
        let index = index.min(self.page_count() - 1);
        let changed = index != self.page_index;
        self.page_index = index;
        changed
    }

    /// Change rows per page; always returns to the first page.
    pub fn select_page_size(&mut self, size: usize) -> Result<()> {
        if !self.options.show_page_size {
            return Err(AbrError::PageSizeSelectionDisabled);
        }
        let offered =
            self.options.page_size_options.is_empty() || self.options.page_size_options.contains(&size);
        if size == 0 || !offered {
            return Err(AbrError::InvalidPageSize { size });
        }
        self.page_size = size;
        self.page_index = 0;
        Ok(())
    }

    /// The offered page size after (or before) the current one
    pub fn adjacent_page_size(&self, forward: bool) -> Option<usize> {
        let options = &self.options.page_size_options;
        let current = options.iter().position(|&size| size == self.page_size);
        let next = match (current, forward) {
            (Some(idx), true) => idx + 1,
            (Some(idx), false) => idx.checked_sub(1)?,
            (None, true) => options.iter().position(|&size| size > self.page_size)?,
            (None, false) => options.iter().rposition(|&size| size < self.page_size)?,
        };
        options.get(next).copied()
    }

    /// Replace the dataset; pagination restarts at the first page.
    pub fn set_data(&mut self, data: Vec<Row>) {
        self.data = data;
        self.page_index = 0;
    }

    /// "21-25 of 25", or "0 of 0" for an empty table
    pub fn range_label(&self) -> String {
        let (start, end) = self.page_bounds();
        if start == end {
            format!("0 of {}", self.data.len())
        } else {
            format!("{}-{} of {}", start + 1, end, self.data.len())
        }
    }

    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.page_index + 1, self.page_count())
    }

    /// Invoke the row click handler for visible row `row`
    pub fn click_row(&mut self, row: usize) -> ClickOutcome {
        let Some(index) = self.row_index(row) else {
            return ClickOutcome::OutOfRange;
        };
        let target = &self.data[index];
        match self.on_row_click.as_mut() {
            Some(handler) => {
                handler(target);
                ClickOutcome::RowClick
            }
            None => ClickOutcome::NoHandler,
        }
    }

    /// Route a click on visible row `row`, column `column`. Interactive
    /// cells consume the click; everything else becomes a row click.
    pub fn click_cell(&mut self, row: usize, column: usize) -> ClickOutcome {
        let Some(index) = self.row_index(row) else {
            return ClickOutcome::OutOfRange;
        };
        if let Some(action) = self.columns.get_mut(column).and_then(|c| c.action.as_mut()) {
            action(&self.data[index]);
            return ClickOutcome::CellAction;
        }
        self.click_row(row)
    }

    /// Dataset index of visible row `row`, if it is on the current page
    fn row_index(&self, row: usize) -> Option<usize> {
        let (start, end) = self.page_bounds();
        (row < end - start).then(|| start + row)
    }

    fn page_bounds(&self) -> (usize, usize) {
        let len = self.data.len();
        let start = self.page_index.saturating_mul(self.page_size).min(len);
        let end = start.saturating_add(self.page_size).min(len);
        (start, end)
    }
}

impl<Row: Serialize> PaginatedTable<Row> {
    /// Rendered cell text for the current page, row by row
    pub fn page_cells(&self) -> Vec<Vec<String>> {
        self.visible_rows()
            .iter()
            .map(|row| {
                let serialized = serde_json::to_value(row).unwrap_or_else(|err| {
                    warn!(error = %err, "row failed to serialize; rendering empty cells");
                    Value::Null
                });
                self.columns
                    .iter()
                    .map(|column| column.render(row, &serialized))
                    .collect()
            })
            .collect()
    }
}

/// Text at dotted `path` inside `value`, or empty when absent
fn field_text(value: &Value, path: &str) -> String {
    let mut current = value;
    for segment in path.split('.') {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|idx| items.get(idx)),
            _ => None,
        };
        match next {
            Some(next) => current = next,
            None => return String::new(),
        }
    }

    match current {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
