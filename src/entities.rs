//! Entity descriptors.
//!
//! One table drives every CRUD screen: endpoint, form fields, list columns,
//! and an optional finalize hook that derives fields before submission.

use serde_json::{Map, Value};

use crate::forms::{FieldKind, FieldSpec, Lookup};
use crate::model::value_i64;

pub const TASK_PRIORITIES: [&str; 3] = ["low", "medium", "high"];
pub const TASK_STATUSES: [&str; 3] = ["pending", "in_progress", "done"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKey {
    Projects,
    Employees,
    Architects,
    Machines,
    Expenses,
    BudgetCategories,
    ProjectBudgets,
    Tasks,
    TeamMembers,
    Documents,
}

pub struct EntityDescriptor {
    pub singular: &'static str,
    pub plural: &'static str,
    pub endpoint: &'static str,
    pub fields: &'static [FieldSpec],
    /// (payload key, table header) pairs for the list screen.
    pub columns: &'static [(&'static str, &'static str)],
    /// Derives fields from the collected values right before submission.
    pub finalize: Option<fn(&mut Map<String, Value>)>,
}

/// Machines track how many units remain usable. Never negative, and the
/// subtraction saturates so extreme counts cannot wrap.
pub fn leftover(quantity: i64, used: i64, damaged: i64) -> i64 {
    quantity
        .saturating_sub(used)
        .saturating_sub(damaged)
        .max(0)
}

fn machine_finalize(values: &mut Map<String, Value>) {
    let quantity = values.get("quantity").and_then(value_i64).unwrap_or(0);
    let used = values.get("used").and_then(value_i64).unwrap_or(0);
    let damaged = values.get("damaged").and_then(value_i64).unwrap_or(0);
    values.insert(
        "leftover".to_string(),
        Value::from(leftover(quantity, used, damaged)),
    );
}

const PROJECT_FIELDS: [FieldSpec; 6] = [
    FieldSpec { key: "name", label: "Project name", kind: FieldKind::Text, required: true },
    FieldSpec { key: "client", label: "Client", kind: FieldKind::Text, required: true },
    FieldSpec { key: "budget", label: "Budget", kind: FieldKind::Money, required: true },
    FieldSpec { key: "location", label: "Location", kind: FieldKind::Text, required: true },
    FieldSpec { key: "start_date", label: "Start date", kind: FieldKind::Date, required: true },
    FieldSpec { key: "end_date", label: "End date", kind: FieldKind::Date, required: true },
];

const EMPLOYEE_FIELDS: [FieldSpec; 5] = [
    FieldSpec { key: "name", label: "Full name", kind: FieldKind::Text, required: true },
    FieldSpec { key: "email", label: "Email", kind: FieldKind::Email, required: true },
    FieldSpec { key: "phone", label: "Phone", kind: FieldKind::Phone, required: true },
    FieldSpec { key: "project_id", label: "Project", kind: FieldKind::Lookup(Lookup::Projects), required: true },
    FieldSpec { key: "salary", label: "Salary", kind: FieldKind::Money, required: false },
];

const ARCHITECT_FIELDS: [FieldSpec; 4] = [
    FieldSpec { key: "name", label: "Full name", kind: FieldKind::Text, required: true },
    FieldSpec { key: "email", label: "Email", kind: FieldKind::Email, required: true },
    FieldSpec { key: "phone", label: "Phone", kind: FieldKind::Phone, required: true },
    FieldSpec { key: "project_id", label: "Project", kind: FieldKind::Lookup(Lookup::Projects), required: true },
];

const MACHINE_FIELDS: [FieldSpec; 7] = [
    FieldSpec { key: "name", label: "Machine name", kind: FieldKind::Text, required: true },
    FieldSpec { key: "quantity", label: "Quantity", kind: FieldKind::Count, required: true },
    FieldSpec { key: "unit_price", label: "Unit price", kind: FieldKind::Money, required: true },
    FieldSpec { key: "project_id", label: "Project", kind: FieldKind::Lookup(Lookup::Projects), required: true },
    FieldSpec { key: "supplier_id", label: "Supplier", kind: FieldKind::Lookup(Lookup::Suppliers), required: true },
    FieldSpec { key: "used", label: "Used", kind: FieldKind::Count, required: true },
    FieldSpec { key: "damaged", label: "Damaged", kind: FieldKind::Count, required: true },
];

const EXPENSE_FIELDS: [FieldSpec; 5] = [
    FieldSpec { key: "project_id", label: "Project", kind: FieldKind::Lookup(Lookup::Projects), required: true },
    FieldSpec { key: "category_id", label: "Category", kind: FieldKind::Lookup(Lookup::BudgetCategories), required: true },
    FieldSpec { key: "task_id", label: "Task", kind: FieldKind::Lookup(Lookup::Tasks), required: false },
    FieldSpec { key: "amount", label: "Amount", kind: FieldKind::Money, required: true },
    FieldSpec { key: "description", label: "Description", kind: FieldKind::Text, required: true },
];

const BUDGET_CATEGORY_FIELDS: [FieldSpec; 1] = [
    FieldSpec { key: "name", label: "Category name", kind: FieldKind::Text, required: true },
];

const PROJECT_BUDGET_FIELDS: [FieldSpec; 4] = [
    FieldSpec { key: "project_id", label: "Project", kind: FieldKind::Lookup(Lookup::Projects), required: true },
    FieldSpec { key: "category_id", label: "Category", kind: FieldKind::Lookup(Lookup::BudgetCategories), required: true },
    FieldSpec { key: "planned_amount", label: "Planned amount", kind: FieldKind::Money, required: true },
    FieldSpec { key: "actual_amount", label: "Actual amount", kind: FieldKind::Money, required: true },
];

const TASK_FIELDS: [FieldSpec; 6] = [
    FieldSpec { key: "name", label: "Task name", kind: FieldKind::Text, required: true },
    FieldSpec { key: "project_id", label: "Project", kind: FieldKind::Lookup(Lookup::Projects), required: true },
    FieldSpec { key: "assigned_to", label: "Assigned to", kind: FieldKind::Lookup(Lookup::Users), required: true },
    FieldSpec { key: "deadline", label: "Deadline", kind: FieldKind::Date, required: true },
    FieldSpec { key: "priority", label: "Priority", kind: FieldKind::Choice(&TASK_PRIORITIES), required: true },
    FieldSpec { key: "status", label: "Status", kind: FieldKind::Choice(&TASK_STATUSES), required: true },
];

const TEAM_MEMBER_FIELDS: [FieldSpec; 2] = [
    FieldSpec { key: "project_id", label: "Project", kind: FieldKind::Lookup(Lookup::Projects), required: true },
    FieldSpec { key: "user_id", label: "User", kind: FieldKind::Lookup(Lookup::Users), required: true },
];

const DOCUMENT_FIELDS: [FieldSpec; 3] = [
    FieldSpec { key: "title", label: "Title", kind: FieldKind::Text, required: true },
    FieldSpec { key: "project_id", label: "Project", kind: FieldKind::Lookup(Lookup::Projects), required: true },
    FieldSpec { key: "file", label: "Document file", kind: FieldKind::File, required: true },
];

static PROJECTS: EntityDescriptor = EntityDescriptor {
    singular: "Project",
    plural: "Projects",
    endpoint: "projects.php",
    fields: &PROJECT_FIELDS,
    columns: &[
        ("id", "ID"),
        ("name", "Name"),
        ("client", "Client"),
        ("budget", "Budget"),
        ("location", "Location"),
        ("start_date", "Start"),
        ("end_date", "End"),
    ],
    finalize: None,
};

static EMPLOYEES: EntityDescriptor = EntityDescriptor {
    singular: "Employee",
    plural: "Employees",
    endpoint: "employees.php",
    fields: &EMPLOYEE_FIELDS,
    columns: &[
        ("id", "ID"),
        ("name", "Name"),
        ("email", "Email"),
        ("phone", "Phone"),
        ("project_id", "Project"),
        ("salary", "Salary"),
    ],
    finalize: None,
};

static ARCHITECTS: EntityDescriptor = EntityDescriptor {
    singular: "Architect",
    plural: "Architects",
    endpoint: "architects.php",
    fields: &ARCHITECT_FIELDS,
    columns: &[
        ("id", "ID"),
        ("name", "Name"),
        ("email", "Email"),
        ("phone", "Phone"),
        ("project_id", "Project"),
    ],
    finalize: None,
};

static MACHINES: EntityDescriptor = EntityDescriptor {
    singular: "Machine",
    plural: "Machines",
    endpoint: "machines.php",
    fields: &MACHINE_FIELDS,
    columns: &[
        ("id", "ID"),
        ("name", "Name"),
        ("quantity", "Qty"),
        ("unit_price", "Unit price"),
        ("project_id", "Project"),
        ("supplier_id", "Supplier"),
        ("used", "Used"),
        ("damaged", "Damaged"),
        ("leftover", "Leftover"),
    ],
    finalize: Some(machine_finalize),
};

static EXPENSES: EntityDescriptor = EntityDescriptor {
    singular: "Expense",
    plural: "Expenses",
    endpoint: "expenses.php",
    fields: &EXPENSE_FIELDS,
    columns: &[
        ("id", "ID"),
        ("project_id", "Project"),
        ("category_id", "Category"),
        ("task_id", "Task"),
        ("amount", "Amount"),
        ("description", "Description"),
    ],
    finalize: None,
};

static BUDGET_CATEGORIES: EntityDescriptor = EntityDescriptor {
    singular: "Budget category",
    plural: "Budget categories",
    endpoint: "budget_categories.php",
    fields: &BUDGET_CATEGORY_FIELDS,
    columns: &[("id", "ID"), ("name", "Name")],
    finalize: None,
};

static PROJECT_BUDGETS: EntityDescriptor = EntityDescriptor {
    singular: "Project budget",
    plural: "Project budgets",
    endpoint: "project_budgets.php",
    fields: &PROJECT_BUDGET_FIELDS,
    columns: &[
        ("id", "ID"),
        ("project_id", "Project"),
        ("category_id", "Category"),
        ("planned_amount", "Planned"),
        ("actual_amount", "Actual"),
    ],
    finalize: None,
};

static TASKS: EntityDescriptor = EntityDescriptor {
    singular: "Task",
    plural: "Tasks",
    endpoint: "tasks.php",
    fields: &TASK_FIELDS,
    columns: &[
        ("id", "ID"),
        ("name", "Name"),
        ("project_id", "Project"),
        ("assigned_to", "Assigned to"),
        ("deadline", "Deadline"),
        ("priority", "Priority"),
        ("status", "Status"),
    ],
    finalize: None,
};

static TEAM_MEMBERS: EntityDescriptor = EntityDescriptor {
    singular: "Team member",
    plural: "Team members",
    endpoint: "team_members.php",
    fields: &TEAM_MEMBER_FIELDS,
    columns: &[("id", "ID"), ("project_id", "Project"), ("user_id", "User")],
    finalize: None,
};

static DOCUMENTS: EntityDescriptor = EntityDescriptor {
    singular: "Document",
    plural: "Documents",
    endpoint: "documents.php",
    fields: &DOCUMENT_FIELDS,
    columns: &[
        ("id", "ID"),
        ("title", "Title"),
        ("project_id", "Project"),
        ("file", "File"),
    ],
    finalize: None,
};

pub fn descriptor(key: EntityKey) -> &'static EntityDescriptor {
    match key {
        EntityKey::Projects => &PROJECTS,
        EntityKey::Employees => &EMPLOYEES,
        EntityKey::Architects => &ARCHITECTS,
        EntityKey::Machines => &MACHINES,
        EntityKey::Expenses => &EXPENSES,
        EntityKey::BudgetCategories => &BUDGET_CATEGORIES,
        EntityKey::ProjectBudgets => &PROJECT_BUDGETS,
        EntityKey::Tasks => &TASKS,
        EntityKey::TeamMembers => &TEAM_MEMBERS,
        EntityKey::Documents => &DOCUMENTS,
    }
}
