use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity record the API returns on login/signup. The client mirrors it
/// as-is; the backend remains the source of truth.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Session {
    pub id: i64,
    pub username: String,
    pub role: Option<String>,
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Member,
}

impl Session {
    /// Resolve the stored role string. Anything that is not literally
    /// "admin" (an absent role included) grants member access only.
    pub fn role(&self) -> Role {
        match &self.role {
            Some(role) if role.eq_ignore_ascii_case("admin") => Role::Admin,
            _ => Role::Member,
        }
    }
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }

    pub fn can_manage(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BudgetLine {
    pub project: String,
    #[serde(default)]
    pub planned: f64,
    #[serde(default)]
    pub actual: f64,
}

/// Aggregate counters for the dashboard. Every field defaults so a partial
/// payload still renders.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct DashboardStats {
    #[serde(default)]
    pub projects: i64,
    #[serde(default)]
    pub employees: i64,
    #[serde(default)]
    pub architects: i64,
    #[serde(default)]
    pub machines: i64,
    #[serde(default)]
    pub pending_tasks: i64,
    #[serde(default)]
    pub in_progress_tasks: i64,
    #[serde(default)]
    pub done_tasks: i64,
    #[serde(default)]
    pub total_expenses: f64,
    #[serde(default)]
    pub budgets: Vec<BudgetLine>,
}

// The PHP backend is loose about numeric types: ids and counts arrive as
// numbers or as quoted strings depending on the endpoint.

pub fn value_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn value_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Table-cell text for an optional JSON value.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}
