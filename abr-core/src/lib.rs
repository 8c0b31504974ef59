pub mod access;
pub mod config;
pub mod error;
pub mod nav;
pub mod tab_bar;
pub mod tab_order;
pub mod table;

pub use access::{Access, Page, Role, RouteGuard, Session};
pub use config::{AbrConfig, DashboardSection, ServerSection};
pub use error::{AbrError, Result};
pub use nav::{apply_order, tab_ids, NavTab, ReplaceOrderRequest, TabOrderDocument, TabOrderKey};
pub use tab_bar::{
    DragOutcome, DragState, DraggableTabBar, LoadResult, LoadTicket, TabItem, TabSpan,
};
pub use tab_order::{
    MemoryTabOrderBackend, OrderChange, OrderState, TabOrderBackend, TabOrderStore,
};
pub use table::{ClickOutcome, Column, Header, PaginatedTable, TableOptions};
