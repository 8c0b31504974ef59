//! Mock field-service records
//!
//! Deterministic so screenshots and tests stay stable.

use abr_core::{Column, Page, TableOptions};
use ratatui::layout::Constraint;
use serde::Serialize;

use crate::app::{AppEvent, EventSender};
use crate::page::{PageState, PageView, Record};

const PEOPLE: [&str; 6] = ["Ana Ruiz", "Ben Okafor", "Chen Wei", "Dana Kim", "Eli Haddad", "Fay Moss"];
const CUSTOMERS: [&str; 5] = ["Northwind", "Blue Harbor", "Acme Plant", "Ridge Dairy", "Civic Center"];

#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub assignee: String,
    pub status: String,
    pub due: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    pub name: String,
    pub city: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkOrder {
    pub number: String,
    pub customer: Customer,
    pub technician: Option<String>,
    pub status: String,
    pub total_cents: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Part {
    pub sku: String,
    pub name: String,
    pub quantity: u32,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub email: String,
    pub name: String,
    pub role: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Opportunity {
    pub name: String,
    pub owner: String,
    pub value_cents: u64,
    pub status: String,
}

fn pick<'a>(items: &[&'a str], i: usize) -> &'a str {
    items[i % items.len()]
}

fn dollars(cents: u64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

fn cell_action<R: Record>(events: &EventSender, action: &'static str) -> impl FnMut(&R) + Send + 'static {
    let tx = events.clone();
    move |row: &R| {
        let _ = tx.send(AppEvent::CellAction {
            page: R::PAGE,
            action,
            summary: row.describe(),
        });
    }
}

pub fn tasks() -> Vec<Task> {
    const TITLES: [&str; 7] = [
        "Replace filter",
        "Inspect boiler",
        "Calibrate sensor",
        "Quote rooftop unit",
        "Follow up invoice",
        "Order belts",
        "Safety walk",
    ];
    const STATUSES: [&str; 4] = ["open", "in_progress", "blocked", "done"];
    (1..=34)
        .map(|i| Task {
            id: format!("T-{i:03}"),
            title: pick(&TITLES, i * 3).to_string(),
            assignee: pick(&PEOPLE, i).to_string(),
            status: pick(&STATUSES, i * 5 % 7).to_string(),
            due: format!("2026-11-{:02}", i % 28 + 1),
        })
        .collect()
}

pub fn work_orders() -> Vec<WorkOrder> {
    const STATUSES: [&str; 4] = ["scheduled", "in_progress", "completed", "cancelled"];
    (1..=27)
        .map(|i| WorkOrder {
            number: format!("WO-{:05}", 10_000 + i * 7),
            customer: Customer {
                name: pick(&CUSTOMERS, i).to_string(),
                city: pick(&["Tacoma", "Olympia", "Everett"], i).to_string(),
            },
            // unassigned orders render an empty technician cell
            technician: (i % 4 != 0).then(|| pick(&PEOPLE, i * 2).to_string()),
            status: pick(&STATUSES, i * 3 % 5).to_string(),
            total_cents: (i as u64 * 13_579) % 250_000 + 9_900,
        })
        .collect()
}

pub fn parts() -> Vec<Part> {
    const NAMES: [&str; 6] = ["V-belt A42", "Air filter 20x25", "Contactor 40A", "Capacitor 45/5", "Igniter", "Thermostat"];
    (1..=22)
        .map(|i| {
            let quantity = (i as u32 * 17) % 60;
            let status = match quantity {
                0..=4 => "backorder",
                5..=14 => "low",
                _ => "in_stock",
            };
            Part {
                sku: format!("P-{:04}", 2_000 + i * 11),
                name: pick(&NAMES, i).to_string(),
                quantity,
                status: status.to_string(),
            }
        })
        .collect()
}

pub fn users() -> Vec<User> {
    const ROLES: [&str; 4] = ["admin", "manager", "technician", "viewer"];
    const STATUSES: [&str; 3] = ["active", "invited", "disabled"];
    PEOPLE
        .iter()
        .enumerate()
        .map(|(i, name)| User {
            email: format!("{}@abr.example", name.to_lowercase().replace(' ', ".")),
            name: name.to_string(),
            role: pick(&ROLES, i).to_string(),
            status: pick(&STATUSES, i * i % 4).to_string(),
        })
        .collect()
}

pub fn opportunities() -> Vec<Opportunity> {
    const STAGES: [&str; 4] = ["lead", "qualified", "won", "lost"];
    (1..=18)
        .map(|i| Opportunity {
            name: format!("{} maintenance plan", pick(&CUSTOMERS, i * 3)),
            owner: pick(&PEOPLE, i + 1).to_string(),
            value_cents: (i as u64 * 731_000) % 4_000_000 + 120_000,
            status: pick(&STAGES, i * 7 % 9).to_string(),
        })
        .collect()
}

impl Record for Task {
    const PAGE: Page = Page::Tasks;

    fn statuses() -> &'static [(&'static str, &'static str)] {
        &[
            ("open", "Open"),
            ("in_progress", "In Progress"),
            ("blocked", "Blocked"),
            ("done", "Done"),
        ]
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn describe(&self) -> String {
        format!("{} {}", self.id, self.title)
    }

    fn columns(events: &EventSender) -> Vec<Column<Self>> {
        vec![
            Column::new("id", "ID"),
            Column::new("title", "Title"),
            Column::new("assignee", "Assignee"),
            Column::new("status", "Status").cell(|t: &Task| t.status.replace('_', " ")),
            Column::new("due", "Due"),
            Column::new("actions", "")
                .cell(|_: &Task| "[open]".to_string())
                .action(cell_action::<Task>(events, "Opened task")),
        ]
    }

    fn widths() -> &'static [Constraint] {
        &[
            Constraint::Length(6),
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(6),
        ]
    }
}

impl Record for WorkOrder {
    const PAGE: Page = Page::WorkOrders;

    fn statuses() -> &'static [(&'static str, &'static str)] {
        &[
            ("scheduled", "Scheduled"),
            ("in_progress", "In Progress"),
            ("completed", "Completed"),
            ("cancelled", "Cancelled"),
        ]
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn describe(&self) -> String {
        format!("{} for {}", self.number, self.customer.name)
    }

    fn columns(events: &EventSender) -> Vec<Column<Self>> {
        vec![
            Column::new("number", "Number"),
            Column::new("customer.name", "Customer"),
            Column::new("customer.city", "City"),
            Column::new("technician", "Technician"),
            Column::new("status", "Status").cell(|w: &WorkOrder| w.status.replace('_', " ")),
            Column::new("total_cents", "Total").cell(|w: &WorkOrder| dollars(w.total_cents)),
            Column::new("actions", "")
                .cell(|_: &WorkOrder| "[dispatch]".to_string())
                .action(cell_action::<WorkOrder>(events, "Dispatched")),
        ]
    }

    fn widths() -> &'static [Constraint] {
        &[
            Constraint::Length(9),
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(10),
        ]
    }
}

impl Record for Part {
    const PAGE: Page = Page::Parts;

    fn statuses() -> &'static [(&'static str, &'static str)] {
        &[
            ("in_stock", "In Stock"),
            ("low", "Low"),
            ("backorder", "Backorder"),
        ]
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn describe(&self) -> String {
        format!("{} {} ({} on hand)", self.sku, self.name, self.quantity)
    }

    fn columns(events: &EventSender) -> Vec<Column<Self>> {
        vec![
            Column::new("sku", "SKU"),
            Column::new("name", "Name"),
            Column::new("quantity", "Qty"),
            Column::new("status", "Status").cell(|p: &Part| p.status.replace('_', " ")),
            Column::new("actions", "")
                .cell(|_: &Part| "[reorder]".to_string())
                .action(cell_action::<Part>(events, "Reorder requested")),
        ]
    }

    fn widths() -> &'static [Constraint] {
        &[
            Constraint::Length(7),
            Constraint::Fill(2),
            Constraint::Length(5),
            Constraint::Length(10),
            Constraint::Length(9),
        ]
    }
}

impl Record for User {
    const PAGE: Page = Page::Users;

    fn statuses() -> &'static [(&'static str, &'static str)] {
        &[
            ("active", "Active"),
            ("invited", "Invited"),
            ("disabled", "Disabled"),
        ]
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn describe(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    fn columns(_events: &EventSender) -> Vec<Column<Self>> {
        vec![
            Column::new("name", "Name"),
            Column::new("email", "Email"),
            Column::with_header_fn("role", || "Role".to_uppercase()),
            Column::new("status", "Status"),
        ]
    }

    fn widths() -> &'static [Constraint] {
        &[
            Constraint::Fill(1),
            Constraint::Fill(2),
            Constraint::Length(11),
            Constraint::Length(9),
        ]
    }
}

impl Record for Opportunity {
    const PAGE: Page = Page::Opportunities;

    fn statuses() -> &'static [(&'static str, &'static str)] {
        &[
            ("lead", "Lead"),
            ("qualified", "Qualified"),
            ("won", "Won"),
            ("lost", "Lost"),
        ]
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.name, dollars(self.value_cents))
    }

    fn columns(_events: &EventSender) -> Vec<Column<Self>> {
        vec![
            Column::new("name", "Opportunity"),
            Column::new("owner", "Owner"),
            Column::new("value_cents", "Value").cell(|o: &Opportunity| dollars(o.value_cents)),
            Column::new("status", "Stage"),
        ]
    }

    fn widths() -> &'static [Constraint] {
        &[
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Length(12),
            Constraint::Length(10),
        ]
    }
}

/// Build the page model for `page` over its mock records
pub fn build_page(
    page: Page,
    options: TableOptions,
    events: &EventSender,
) -> abr_core::Result<Box<dyn PageView>> {
    Ok(match page {
        Page::Tasks => Box::new(PageState::new(tasks(), options, events)?),
        Page::WorkOrders => Box::new(PageState::new(work_orders(), options, events)?),
        Page::Parts => Box::new(PageState::new(parts(), options, events)?),
        Page::Users => Box::new(PageState::new(users(), options, events)?),
        Page::Opportunities => Box::new(PageState::new(opportunities(), options, events)?),
    })
}
