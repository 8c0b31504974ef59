//! Draggable tab bar state machine.
//!
//! Lifecycle: `Idle -> Dragging -> Idle`. A pointer-down over a tab starts a
//! drag; pointer-up either selects the tab (no movement), leaves the order
//! alone (dropped back in its own slot) or moves the tab to the slot chosen
//! by comparing the pointer against sibling midpoints.
//!
//! The bar does no rendering. The host lays tabs out, reports their
//! horizontal spans with [`DraggableTabBar::set_layout`], and draws
//! [`DraggableTabBar::items`].

use std::fmt;

use tracing::{debug, warn};

use crate::error::Result;
use crate::nav::{apply_order, tab_ids, NavTab};

/// Pointer travel (in columns) before a press becomes a drag
pub const DEFAULT_DRAG_THRESHOLD: u16 = 1;

/// Called with the full new id order after a reorder
pub type ReorderHandler = Box<dyn FnMut(&[String]) + Send>;

/// Called with the id of a newly activated tab
pub type SelectHandler = Box<dyn FnMut(&str) + Send>;

/// Horizontal extent of a rendered tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabSpan {
    pub x: u16,
    pub width: u16,
}

impl TabSpan {
    pub fn new(x: u16, width: u16) -> Self {
        Self { x, width }
    }

    /// Lay out `widths` left to right from `start`, `gap` columns apart
    pub fn sequential(widths: impl IntoIterator<Item = u16>, start: u16, gap: u16) -> Vec<TabSpan> {
        let mut x = start;
        widths
            .into_iter()
            .map(|width| {
                let span = TabSpan::new(x, width);
                x = x.saturating_add(width).saturating_add(gap);
                span
            })
            .collect()
    }

    pub fn contains(&self, x: u16) -> bool {
        x >= self.x && u32::from(x) < u32::from(self.x) + u32::from(self.width)
    }

    /// Midpoint doubled, so odd widths stay integral
    fn midpoint2(&self) -> u32 {
        2 * u32::from(self.x) + u32::from(self.width)
    }
}

/// Drag lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        /// Id of the tab being dragged
        id: String,
        origin_x: u16,
        current_x: u16,
        /// Pointer has travelled past the drag threshold
        moved: bool,
    },
}

/// What a pointer-up (or cancel) did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// Order changed; carries the full new order
    Reordered(Vec<String>),
    /// Press and release without movement activated this tab
    Selected(String),
    /// Dropped back in place or clicked the already-active tab
    Unchanged,
    /// Drag abandoned; pre-drag order kept
    Cancelled,
    /// No drag was in progress
    Ignored,
}

/// Handle for an asynchronous order load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Result of applying a finished load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadResult {
    Applied,
    /// Unmounted, or superseded by a newer load or user reorder
    Stale,
    /// Load failed; current order kept
    Failed,
}

/// Render view of one tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabItem<'a> {
    pub id: &'a str,
    pub label: &'a str,
    pub count: u32,
    pub active: bool,
    pub dragging: bool,
}

/// Horizontally reorderable tab strip
pub struct DraggableTabBar {
    tabs: Vec<NavTab>,
    active: Option<String>,
    drag: DragState,
    spans: Vec<TabSpan>,
    drag_threshold: u16,
    generation: u64,
    mounted: bool,
    on_reorder: Option<ReorderHandler>,
    on_select: Option<SelectHandler>,
}

impl fmt::Debug for DraggableTabBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DraggableTabBar")
            .field("tabs", &self.tabs)
            .field("active", &self.active)
            .field("drag", &self.drag)
            .field("spans", &self.spans)
            .field("generation", &self.generation)
            .field("mounted", &self.mounted)
            .finish_non_exhaustive()
    }
}

impl DraggableTabBar {
    /// Create a bar showing `tabs` in the given (default) order.
    /// The first tab starts active.
    pub fn new(tabs: Vec<NavTab>) -> Self {
        let active = tabs.first().map(|t| t.id.clone());
        Self {
            tabs,
            active,
            drag: DragState::Idle,
            spans: Vec::new(),
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            generation: 0,
            mounted: true,
            on_reorder: None,
            on_select: None,
        }
    }

    pub fn with_drag_threshold(mut self, threshold: u16) -> Self {
        self.drag_threshold = threshold.max(1);
        self
    }

    pub fn on_reorder(mut self, handler: impl FnMut(&[String]) + Send + 'static) -> Self {
        self.on_reorder = Some(Box::new(handler));
        self
    }

    pub fn on_select(mut self, handler: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_select = Some(Box::new(handler));
        self
    }

    pub fn tabs(&self) -> &[NavTab] {
        &self.tabs
    }

    /// Current id order
    pub fn order(&self) -> Vec<String> {
        tab_ids(&self.tabs)
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_index(&self) -> Option<usize> {
        let active = self.active.as_deref()?;
        self.position(active)
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    /// Tabs in render order with their active/dragging flags
    pub fn items(&self) -> Vec<TabItem<'_>> {
        let dragged = match &self.drag {
            DragState::Dragging { id, moved: true, .. } => Some(id.as_str()),
            _ => None,
        };
        self.tabs
            .iter()
            .map(|tab| TabItem {
                id: &tab.id,
                label: &tab.label,
                count: tab.count,
                active: self.active.as_deref() == Some(tab.id.as_str()),
                dragging: dragged == Some(tab.id.as_str()),
            })
            .collect()
    }

    /// Replace the tab set (fresh labels and counts), keeping the current
    /// order for ids that survive and appending new ids.
    pub fn set_tabs(&mut self, tabs: Vec<NavTab>) {
        let previous = self.order();
        self.tabs = apply_order(&tabs, &previous);
        if self.order() != previous {
            self.spans.clear();
        }

        let active_survives = self
            .active
            .as_deref()
            .is_some_and(|id| self.position(id).is_some());
        if !active_survives {
            self.active = self.tabs.first().map(|t| t.id.clone());
        }

        if let DragState::Dragging { id, .. } = &self.drag {
            if self.position(id).is_none() {
                debug!(tab = %id, "dragged tab disappeared, cancelling drag");
                self.drag = DragState::Idle;
            }
        }
    }

    /// Record where each tab was drawn, in render order
    pub fn set_layout(&mut self, spans: Vec<TabSpan>) {
        if spans.len() != self.tabs.len() {
            warn!(
                spans = spans.len(),
                tabs = self.tabs.len(),
                "tab layout does not match tab count; pointer input disabled until next layout"
            );
        }
        self.spans = spans;
    }

    /// Index of the tab under `x`
    pub fn hit_test(&self, x: u16) -> Option<usize> {
        if !self.has_layout() {
            return None;
        }
        self.spans.iter().position(|span| span.contains(x))
    }

    /// Activate `id`. Returns false for unknown ids or the already-active tab.
    pub fn select(&mut self, id: &str) -> bool {
        if self.position(id).is_none() || self.active.as_deref() == Some(id) {
            return false;
        }
        self.active = Some(id.to_string());
        if let Some(handler) = self.on_select.as_mut() {
            handler(id);
        }
        true
    }

    /// Activate the tab `delta` slots away from the active one, wrapping.
    pub fn select_offset(&mut self, delta: isize) -> bool {
        let len = self.tabs.len();
        let Some(current) = self.active_index() else {
            return false;
        };
        let next = (current as isize + delta).rem_euclid(len as isize) as usize;
        let id = self.tabs[next].id.clone();
        self.select(&id)
    }

    /// Move the active tab `delta` slots (clamped). Fires `on_reorder` when
    /// the order changes.
    pub fn move_active(&mut self, delta: isize) -> Option<Vec<String>> {
        let from = self.active_index()?;
        let max = self.tabs.len().saturating_sub(1) as isize;
        let to = (from as isize + delta).clamp(0, max) as usize;
        self.commit_move(from, to)
    }

    /// Start a drag if `x` is over a tab. Returns whether a drag started.
    pub fn pointer_down(&mut self, x: u16) -> bool {
        if self.is_dragging() {
            return false;
        }
        let Some(index) = self.hit_test(x) else {
            return false;
        };
        self.drag = DragState::Dragging {
            id: self.tabs[index].id.clone(),
            origin_x: x,
            current_x: x,
            moved: false,
        };
        true
    }

    pub fn pointer_move(&mut self, x: u16) {
        let threshold = self.drag_threshold;
        if let DragState::Dragging {
            origin_x,
            current_x,
            moved,
            ..
        } = &mut self.drag
        {
            *current_x = x;
            if origin_x.abs_diff(x) >= threshold {
                *moved = true;
            }
        }
    }

    /// Finish the gesture at `x`.
    pub fn pointer_up(&mut self, x: u16) -> DragOutcome {
        self.pointer_move(x);
        let DragState::Dragging { id, moved, .. } = std::mem::take(&mut self.drag) else {
            return DragOutcome::Ignored;
        };
        let Some(from) = self.position(&id) else {
            return DragOutcome::Cancelled;
        };

        if !moved {
            return if self.select(&id) {
                DragOutcome::Selected(id)
            } else {
                DragOutcome::Unchanged
            };
        }

        let to = self.drop_index(from, x);
        match self.commit_move(from, to) {
            Some(order) => DragOutcome::Reordered(order),
            None => DragOutcome::Unchanged,
        }
    }

    /// Abandon the gesture (pointer capture lost, Esc). The order is only
    /// committed on pointer-up, so nothing needs restoring.
    pub fn pointer_cancel(&mut self) -> DragOutcome {
        match std::mem::take(&mut self.drag) {
            DragState::Dragging { id, .. } => {
                debug!(tab = %id, "tab drag cancelled");
                DragOutcome::Cancelled
            }
            DragState::Idle => DragOutcome::Ignored,
        }
    }

    /// Order the bar would commit if the pointer were released now
    pub fn preview_order(&self) -> Vec<String> {
        let mut order = self.order();
        if let DragState::Dragging {
            id,
            current_x,
            moved: true,
            ..
        } = &self.drag
        {
            if let Some(from) = self.position(id) {
                let to = self.drop_index(from, *current_x);
                let moved = order.remove(from);
                order.insert(to, moved);
            }
        }
        order
    }

    /// Begin an asynchronous order load; older tickets become stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    /// Apply a finished load unless it is stale.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Option<Vec<String>>>,
    ) -> LoadResult {
        if !self.mounted || ticket.0 != self.generation {
            debug!(ticket = ticket.0, current = self.generation, "discarding stale tab order load");
            return LoadResult::Stale;
        }
        match result {
            Ok(Some(order)) => {
                self.apply_stored_order(&order);
                LoadResult::Applied
            }
            Ok(None) => LoadResult::Applied,
            Err(err) => {
                warn!(error = %err, "tab order load failed, keeping default order");
                LoadResult::Failed
            }
        }
    }

    /// Sort the tabs by a stored order without firing callbacks
    pub fn apply_stored_order(&mut self, order: &[String]) {
        let before = self.order();
        self.tabs = apply_order(&self.tabs, order);
        if self.order() != before {
            self.spans.clear();
        }
    }

    /// Stop accepting async results and pointer input
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.generation += 1;
        self.drag = DragState::Idle;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn has_layout(&self) -> bool {
        self.mounted && !self.spans.is_empty() && self.spans.len() == self.tabs.len()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == id)
    }

    /// Slot for the tab at `from` when released at `x`: the number of
    /// siblings whose midpoint lies left of the pointer.
    fn drop_index(&self, from: usize, x: u16) -> usize {
        if !self.has_layout() {
            return from;
        }
        let pointer2 = 2 * u32::from(x);
        self.spans
            .iter()
            .enumerate()
            .filter(|(idx, span)| *idx != from && span.midpoint2() < pointer2)
            .count()
    }

    fn commit_move(&mut self, from: usize, to: usize) -> Option<Vec<String>> {
        if from == to || from >= self.tabs.len() || to >= self.tabs.len() {
            return None;
        }
        let tab = self.tabs.remove(from);
        self.tabs.insert(to, tab);
        self.spans.clear();
        // a user reorder wins over any load still in flight
        self.generation += 1;

        let order = self.order();
        debug!(from, to, order = ?order, "tabs reordered");
        if let Some(handler) = self.on_reorder.as_mut() {
            handler(&order);
        }
        Some(order)
    }
}
