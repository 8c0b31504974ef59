//! Core application state
//!
//! Component callbacks (tab reorder/select, row clicks, cell actions) and
//! finished store calls all arrive as [`AppEvent`]s on one channel, which the
//! run loop drains between frames.

use abr_core::{
    Access, AbrError, ClickOutcome, DragOutcome, LoadResult, LoadTicket, Page, RouteGuard, Session,
    TabOrderKey, TabOrderStore, TableOptions,
};
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::data;
use crate::page::PageView;

pub type EventSender = UnboundedSender<AppEvent>;

/// Everything that reaches the app from callbacks and background tasks
#[derive(Debug)]
pub enum AppEvent {
    TabsReordered { page: Page, order: Vec<String> },
    TabSelected { page: Page, id: String },
    RowClicked { page: Page, summary: String },
    CellAction {
        page: Page,
        action: &'static str,
        summary: String,
    },
    OrderLoaded {
        page: Page,
        ticket: LoadTicket,
        result: abr_core::Result<Option<Vec<String>>>,
    },
    OrderSaved {
        page: Page,
        result: abr_core::Result<Vec<String>>,
    },
    OrderReset {
        page: Page,
        result: abr_core::Result<()>,
    },
}

/// Startup options
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub session: Option<Session>,
    pub table: TableOptions,
    /// Shown in the status bar ("offline", or the API URL)
    pub backend_label: String,
}

/// Screen regions recorded by the last render, used for mouse hit testing
#[derive(Debug, Clone, Default)]
pub struct HitAreas {
    pub tab_row: Rect,
    pub table_body: Rect,
    pub columns: Vec<Rect>,
}

impl HitAreas {
    /// Visible (row, column) under the pointer
    pub fn cell_at(&self, x: u16, y: u16) -> Option<(usize, usize)> {
        if !self.table_body.contains(Position { x, y }) {
            return None;
        }
        let column = self
            .columns
            .iter()
            .position(|c| x >= c.x && x < c.x.saturating_add(c.width))?;
        Some(((y - self.table_body.y) as usize, column))
    }
}

pub struct App {
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub layout: HitAreas,
    session: Option<Session>,
    guard: RouteGuard,
    pages: Vec<Box<dyn PageView>>,
    current: usize,
    store: TabOrderStore,
    runtime: Handle,
    events: EventSender,
    backend_label: String,
}

impl App {
    /// Build one page per route the session may open.
    pub fn new(
        options: AppOptions,
        store: TabOrderStore,
        runtime: Handle,
        events: EventSender,
    ) -> abr_core::Result<Self> {
        let guard = RouteGuard::default();
        let visible = match &options.session {
            Some(session) => guard.visible_pages(session.role),
            None => Vec::new(),
        };
        let pages = visible
            .into_iter()
            .map(|page| data::build_page(page, options.table.clone(), &events))
            .collect::<abr_core::Result<Vec<_>>>()?;

        Ok(Self {
            should_quit: false,
            status_message: None,
            layout: HitAreas::default(),
            session: options.session,
            guard,
            pages,
            current: 0,
            store,
            runtime,
            events,
            backend_label: options.backend_label,
        })
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn backend_label(&self) -> &str {
        &self.backend_label
    }

    pub fn pages(&self) -> impl Iterator<Item = Page> + '_ {
        self.pages.iter().map(|p| p.page())
    }

    pub fn current_page(&self) -> Option<&dyn PageView> {
        self.pages.get(self.current).map(|p| &**p)
    }

    pub fn current_page_mut(&mut self) -> Option<&mut (dyn PageView + 'static)> {
        self.pages.get_mut(self.current).map(|p| &mut **p)
    }

    fn page_mut(&mut self, page: Page) -> Option<&mut (dyn PageView + 'static)> {
        self.pages
            .iter_mut()
            .find(|p| p.page() == page)
            .map(|p| &mut **p)
    }

    fn key(&self, page: Page) -> Option<TabOrderKey> {
        self.session
            .as_ref()
            .map(|s| TabOrderKey::new(s.user_id.clone(), page.slug()))
    }

    // === Tab order persistence ===

    /// Start loading the stored order of every page
    pub fn load_orders(&mut self) {
        let pages: Vec<Page> = self.pages().collect();
        for page in pages {
            self.load_order(page, false);
        }
    }

    /// Reload the current page's order from the backend, bypassing the cache
    pub fn refresh_current(&mut self) {
        if let Some(page) = self.current_page().map(|p| p.page()) {
            self.load_order(page, true);
            self.set_status(format!("Reloading {} tab order", page.title()));
        }
    }

    fn load_order(&mut self, page: Page, force: bool) {
        let Some(key) = self.key(page) else {
            return;
        };
        let Some(view) = self.page_mut(page) else {
            return;
        };
        let ticket = view.bar_mut().begin_load();
        let store = self.store.clone();
        let events = self.events.clone();
        self.runtime.spawn(async move {
            let result = if force {
                store.refresh(&key).await
            } else {
                store.get_order(&key).await
            };
            let _ = events.send(AppEvent::OrderLoaded {
                page,
                ticket,
                result,
            });
        });
    }

    fn save_order(&mut self, page: Page, order: Vec<String>) {
        let Some(key) = self.key(page) else {
            return;
        };
        let store = self.store.clone();
        let events = self.events.clone();
        self.runtime.spawn(async move {
            let result = store.set_order(&key, order).await;
            let _ = events.send(AppEvent::OrderSaved { page, result });
        });
    }

    /// Put the current page's tabs back in default order and forget the
    /// stored preference
    pub fn reset_current(&mut self) {
        let Some(view) = self.current_page_mut() else {
            return;
        };
        let page = view.page();
        let defaults = view.default_order();
        // supersede any load still in flight
        let _ = view.bar_mut().begin_load();
        view.bar_mut().apply_stored_order(&defaults);

        let Some(key) = self.key(page) else {
            return;
        };
        let store = self.store.clone();
        let events = self.events.clone();
        self.runtime.spawn(async move {
            let result = store.reset_order(&key).await;
            let _ = events.send(AppEvent::OrderReset { page, result });
        });
    }

    // === Event routing ===

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::TabsReordered { page, order } => {
                debug!(page = %page, order = ?order, "saving tab order");
                self.save_order(page, order);
            }
            AppEvent::TabSelected { page, id } => {
                if let Some(view) = self.page_mut(page) {
                    view.apply_filter();
                }
                debug!(page = %page, tab = %id, "tab selected");
            }
            AppEvent::RowClicked { summary, .. } => {
                self.set_status(format!("Selected {}", summary));
            }
            AppEvent::CellAction { action, summary, .. } => {
                self.set_status(format!("{}: {}", action, summary));
            }
            AppEvent::OrderLoaded {
                page,
                ticket,
                result,
            } => {
                let Some(view) = self.page_mut(page) else {
                    return;
                };
                match view.bar_mut().finish_load(ticket, result) {
                    LoadResult::Applied | LoadResult::Stale => {}
                    LoadResult::Failed => {
                        self.set_status(format!(
                            "Could not load saved {} tab order; showing defaults",
                            page.title()
                        ));
                    }
                }
            }
            AppEvent::OrderSaved { page, result } => match result {
                Ok(order) => {
                    info!(page = %page, tabs = order.len(), "tab order saved");
                    self.set_status(format!("Saved {} tab order", page.title()));
                }
                Err(err) => self.report_error("save", page, &err),
            },
            AppEvent::OrderReset { page, result } => match result {
                Ok(()) => self.set_status(format!("Reset {} tabs to default order", page.title())),
                Err(err) => self.report_error("reset", page, &err),
            },
        }
    }

    fn report_error(&mut self, what: &str, page: Page, err: &AbrError) {
        self.set_status(format!("Failed to {} {} tab order: {}", what, page.title(), err));
    }

    // === Navigation ===

    /// Open `page` if the guard allows it, otherwise fall back
    pub fn goto(&mut self, page: Page) {
        match self.guard.check(self.session.as_ref(), page) {
            Access::Granted => {
                if let Some(index) = self.pages.iter().position(|p| p.page() == page) {
                    self.switch_to(index);
                }
            }
            Access::Unauthenticated => self.set_status("Sign in required"),
            Access::Forbidden { fallback } => {
                if let Some(index) = fallback.and_then(|f| self.pages.iter().position(|p| p.page() == f)) {
                    self.switch_to(index);
                }
                self.set_status(format!("No access to {}", page.title()));
            }
        }
    }

    /// Cycle through visible pages
    pub fn cycle_page(&mut self, delta: isize) {
        if self.pages.is_empty() {
            return;
        }
        let len = self.pages.len() as isize;
        let next = (self.current as isize + delta).rem_euclid(len) as usize;
        self.switch_to(next);
    }

    fn switch_to(&mut self, index: usize) {
        if index == self.current {
            return;
        }
        // a drag never survives a page switch
        if let Some(view) = self.current_page_mut() {
            view.bar_mut().pointer_cancel();
        }
        self.current = index;
        self.layout = HitAreas::default();
    }

    // === Tabs ===

    pub fn select_tab(&mut self, delta: isize) {
        if let Some(view) = self.current_page_mut() {
            view.bar_mut().select_offset(delta);
        }
    }

    pub fn move_tab(&mut self, delta: isize) {
        if let Some(view) = self.current_page_mut() {
            view.bar_mut().move_active(delta);
        }
    }

    pub fn cancel_drag(&mut self) -> bool {
        match self.current_page_mut() {
            Some(view) => view.bar_mut().pointer_cancel() == DragOutcome::Cancelled,
            None => false,
        }
    }

    // === Table ===

    pub fn next_rows(&mut self) {
        if let Some(view) = self.current_page_mut() {
            view.next_rows();
        }
    }

    pub fn prev_rows(&mut self) {
        if let Some(view) = self.current_page_mut() {
            view.prev_rows();
        }
    }

    pub fn first_rows(&mut self) {
        if let Some(view) = self.current_page_mut() {
            view.first_rows();
        }
    }

    pub fn last_rows(&mut self) {
        if let Some(view) = self.current_page_mut() {
            view.last_rows();
        }
    }

    pub fn step_page_size(&mut self, forward: bool) {
        let Some(view) = self.current_page_mut() else {
            return;
        };
        if let Some(size) = view.step_page_size(forward) {
            self.set_status(format!("{} rows per page", size));
        }
    }

    // === Mouse ===

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let (x, y) = (mouse.column, mouse.row);
        let on_tabs = self.layout.tab_row.contains(Position { x, y });
        let cell = self.layout.cell_at(x, y);
        let Some(view) = self.current_page_mut() else {
            return;
        };

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if on_tabs {
                    view.bar_mut().pointer_down(x);
                } else if let Some((row, column)) = cell {
                    if view.click_cell(row, column) == ClickOutcome::NoHandler {
                        debug!(row, column, "click on row without handler");
                    }
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => view.bar_mut().pointer_move(x),
            MouseEventKind::Up(MouseButton::Left) => {
                if view.bar_mut().pointer_up(x) == DragOutcome::Cancelled {
                    self.set_status("Tab drag cancelled");
                }
            }
            _ => {}
        }
    }

    /// Stop accepting async results before exit
    pub fn shutdown(&mut self) {
        for view in &mut self.pages {
            view.bar_mut().unmount();
        }
        self.should_quit = true;
    }
}
