//! Fetch layer shared by every screen.
//!
//! Lists are memoized for the lifetime of one command run so reference
//! collections used by several form fields are fetched once. After a
//! mutation the owning screen calls [`Queries::refresh`], which is the only
//! way cached rows are replaced: the UI never mutates a list locally, it
//! re-reads whatever the backend now holds.

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::api::{ApiClient, ApiResult};
use crate::model::{BudgetLine, DashboardStats};

/// Where a rendered dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Live,
    Placeholder,
}

pub struct Queries<'a> {
    api: &'a ApiClient,
    cache: RefCell<HashMap<String, Vec<Value>>>,
}

impl<'a> Queries<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Queries {
            api,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn api(&self) -> &ApiClient {
        self.api
    }

    /// Rows for an endpoint, fetched at most once per run.
    pub fn list(&self, endpoint: &str) -> ApiResult<Vec<Value>> {
        if let Some(rows) = self.cache.borrow().get(endpoint) {
            debug!(endpoint, "list served from cache");
            return Ok(rows.clone());
        }
        let rows = self.api.fetch_list(endpoint)?;
        self.cache
            .borrow_mut()
            .insert(endpoint.to_string(), rows.clone());
        Ok(rows)
    }

    pub fn invalidate(&self, endpoint: &str) {
        self.cache.borrow_mut().remove(endpoint);
    }

    /// Drop the cached rows and re-fetch. Called exactly once after each
    /// successful mutation.
    pub fn refresh(&self, endpoint: &str) -> ApiResult<Vec<Value>> {
        self.invalidate(endpoint);
        self.list(endpoint)
    }

    /// Dashboard aggregates. A fetch failure never blocks the page: the
    /// hard-coded sample figures render instead, tagged as such.
    pub fn dashboard(&self) -> (DashboardStats, DataSource) {
        match self.api.dashboard() {
            Ok(stats) => (stats, DataSource::Live),
            Err(err) => {
                warn!(%err, "dashboard fetch failed, falling back to sample data");
                (placeholder_stats(), DataSource::Placeholder)
            }
        }
    }
}

/// Sample figures shown when the dashboard endpoint is unreachable.
pub fn placeholder_stats() -> DashboardStats {
    DashboardStats {
        projects: 4,
        employees: 16,
        architects: 3,
        machines: 12,
        pending_tasks: 6,
        in_progress_tasks: 4,
        done_tasks: 9,
        total_expenses: 48_250.0,
        budgets: vec![
            BudgetLine {
                project: "Riverside Apartments".to_string(),
                planned: 120_000.0,
                actual: 98_500.0,
            },
            BudgetLine {
                project: "Hill Road Bridge".to_string(),
                planned: 250_000.0,
                actual: 261_700.0,
            },
            BudgetLine {
                project: "Mall Renovation".to_string(),
                planned: 75_000.0,
                actual: 42_000.0,
            },
        ],
    }
}
