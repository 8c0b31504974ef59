//! Role-based page guard.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AbrError;

/// Staff roles, most privileged first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Technician,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Technician => "technician",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AbrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "technician" | "tech" => Ok(Role::Technician),
            "viewer" => Ok(Role::Viewer),
            other => Err(AbrError::unknown("role", other)),
        }
    }
}

/// Dashboard pages, in navigation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    Tasks,
    WorkOrders,
    Parts,
    Users,
    Opportunities,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Tasks,
        Page::WorkOrders,
        Page::Parts,
        Page::Users,
        Page::Opportunities,
    ];

    /// Route slug, also used as the tab-order page name
    pub fn slug(&self) -> &'static str {
        match self {
            Page::Tasks => "tasks",
            Page::WorkOrders => "work-orders",
            Page::Parts => "parts",
            Page::Users => "users",
            Page::Opportunities => "opportunities",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Tasks => "Tasks",
            Page::WorkOrders => "Work Orders",
            Page::Parts => "Parts",
            Page::Users => "Users",
            Page::Opportunities => "Opportunities",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Page {
    type Err = AbrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Page::ALL
            .into_iter()
            .find(|page| page.slug() == s)
            .ok_or_else(|| AbrError::unknown("page", s))
    }
}

/// Signed-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub role: Role,
}

/// Guard verdict for a navigation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// No session; send the user to sign in
    Unauthenticated,
    /// Role may not see the page; `fallback` is the first page it may see
    Forbidden { fallback: Option<Page> },
}

/// Page → allowed roles policy
#[derive(Debug, Clone)]
pub struct RouteGuard {
    rules: Vec<(Page, Vec<Role>)>,
}

impl Default for RouteGuard {
    fn default() -> Self {
        use Role::*;
        Self {
            rules: vec![
                (Page::Tasks, vec![Admin, Manager, Technician, Viewer]),
                (Page::WorkOrders, vec![Admin, Manager, Technician, Viewer]),
                (Page::Parts, vec![Admin, Manager, Technician]),
                (Page::Users, vec![Admin]),
                (Page::Opportunities, vec![Admin, Manager]),
            ],
        }
    }
}

impl RouteGuard {
    pub fn allows(&self, role: Role, page: Page) -> bool {
        self.rules
            .iter()
            .any(|(p, roles)| *p == page && roles.contains(&role))
    }

    pub fn check(&self, session: Option<&Session>, page: Page) -> Access {
        let Some(session) = session else {
            return Access::Unauthenticated;
        };
        if self.allows(session.role, page) {
            Access::Granted
        } else {
            Access::Forbidden {
                fallback: self.visible_pages(session.role).first().copied(),
            }
        }
    }

    /// Pages `role` may open, in navigation order
    pub fn visible_pages(&self, role: Role) -> Vec<Page> {
        Page::ALL
            .into_iter()
            .filter(|page| self.allows(role, *page))
            .collect()
    }
}
