//! Generic form engine.
//!
//! Every entity modal is the same machine parameterized by field specs:
//! a prompt per field, pure validators that block submission with the
//! message the UI shows, reference lists resolved through the query layer,
//! and a JSON payload ready for POST/PATCH at the end.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Result, bail};
use chrono::{Local, NaiveDate};
use inquire::validator::Validation;
use inquire::{Confirm, DateSelect, InquireError, Password, PasswordDisplayMode, Select, Text};
use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::model::{cell_text, value_i64};
use crate::query::Queries;

const NONE_OPT: &str = "(none)";

/// Reference collections that populate selection fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Projects,
    Users,
    Suppliers,
    BudgetCategories,
    Tasks,
}

impl Lookup {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Lookup::Projects => "projects.php",
            Lookup::Users => "users.php",
            Lookup::Suppliers => "suppliers.php",
            Lookup::BudgetCategories => "budget_categories.php",
            Lookup::Tasks => "tasks.php",
        }
    }

    pub fn label_key(&self) -> &'static str {
        match self {
            Lookup::Users => "username",
            _ => "name",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            Lookup::Projects => "projects",
            Lookup::Users => "users",
            Lookup::Suppliers => "suppliers",
            Lookup::BudgetCategories => "budget categories",
            Lookup::Tasks => "tasks",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Text,
    Email,
    Phone,
    Money,
    Count,
    Date,
    Choice(&'static [&'static str]),
    Lookup(Lookup),
    File,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

#[derive(Debug)]
pub struct FormOutput {
    pub values: Map<String, Value>,
    /// Multipart upload captured by a file field: (part name, local path).
    pub upload: Option<(String, PathBuf)>,
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?[0-9][0-9\s\-()]{6,18}$").expect("phone pattern"))
}

fn required_message(spec: &FieldSpec) -> String {
    match spec.kind {
        FieldKind::Email => "Valid email required.".to_string(),
        FieldKind::Phone => "Valid phone number required.".to_string(),
        _ => format!("{} is required.", spec.label),
    }
}

fn money_message(spec: &FieldSpec) -> String {
    format!("{} must be a non-negative number.", spec.label)
}

fn count_message(spec: &FieldSpec) -> String {
    format!("{} must be a non-negative whole number.", spec.label)
}

/// Validate one raw input against its spec. `Ok(None)` means an optional
/// field was left empty; `Err` carries the message shown at the prompt.
pub fn validate_field(spec: &FieldSpec, raw: &str) -> Result<Option<Value>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return if spec.required {
            Err(required_message(spec))
        } else {
            Ok(None)
        };
    }
    match spec.kind {
        FieldKind::Text => Ok(Some(Value::String(trimmed.to_string()))),
        FieldKind::Email => {
            if email_regex().is_match(trimmed) {
                Ok(Some(Value::String(trimmed.to_string())))
            } else {
                Err("Valid email required.".to_string())
            }
        }
        FieldKind::Phone => {
            if phone_regex().is_match(trimmed) {
                Ok(Some(Value::String(trimmed.to_string())))
            } else {
                Err("Valid phone number required.".to_string())
            }
        }
        FieldKind::Money => {
            let amount: f64 = trimmed.parse().map_err(|_| money_message(spec))?;
            if !amount.is_finite() || amount < 0.0 {
                return Err(money_message(spec));
            }
            match Number::from_f64(amount) {
                Some(number) => Ok(Some(Value::Number(number))),
                None => Err(money_message(spec)),
            }
        }
        FieldKind::Count => {
            let count: i64 = trimmed.parse().map_err(|_| count_message(spec))?;
            if count < 0 {
                return Err(count_message(spec));
            }
            Ok(Some(Value::from(count)))
        }
        FieldKind::Date => match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            Ok(date) => Ok(Some(Value::String(date.to_string()))),
            Err(_) => Err("Valid date required.".to_string()),
        },
        FieldKind::Choice(options) => {
            if options.contains(&trimmed) {
                Ok(Some(Value::String(trimmed.to_string())))
            } else {
                Err(format!(
                    "{} must be one of: {}.",
                    spec.label,
                    options.join(", ")
                ))
            }
        }
        FieldKind::Lookup(_) => match trimmed.parse::<i64>() {
            Ok(id) => Ok(Some(Value::from(id))),
            Err(_) => Err(format!("{} is required.", spec.label)),
        },
        FieldKind::File => {
            if Path::new(trimmed).exists() {
                Ok(Some(Value::String(trimmed.to_string())))
            } else {
                Err(format!("File not found: {trimmed}"))
            }
        }
    }
}

/// Map an inquire result into ours; Esc and Ctrl-C read as a cancel.
pub fn prompted<T>(result: Result<T, InquireError>) -> Result<T> {
    result.map_err(|err| match err {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => {
            anyhow::anyhow!("Cancelled.")
        }
        other => anyhow::anyhow!(other),
    })
}

fn prompt_title(spec: &FieldSpec) -> String {
    if spec.required {
        format!("{}:", spec.label)
    } else {
        format!("{} (Optional):", spec.label)
    }
}

/// One text-style prompt. The validator keeps the user at the field until
/// the input passes, so invalid submissions are blocked client-side.
pub fn prompt_text(spec: &FieldSpec, initial: Option<&str>) -> Result<Option<Value>> {
    let title = prompt_title(spec);
    let validator_spec = *spec;
    let mut prompt = Text::new(&title).with_validator(move |input: &str| {
        match validate_field(&validator_spec, input) {
            Ok(_) => Ok(Validation::Valid),
            Err(message) => Ok(Validation::Invalid(message.into())),
        }
    });
    if let Some(initial) = initial {
        prompt = prompt.with_initial_value(initial);
    }
    let raw = prompted(prompt.prompt())?;
    validate_field(spec, &raw).map_err(|message| anyhow::anyhow!(message))
}

pub fn prompt_password(title: &str) -> Result<String> {
    prompted(
        Password::new(title)
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .with_validator(|input: &str| {
                if input.trim().is_empty() {
                    Ok(Validation::Invalid("Password is required.".into()))
                } else {
                    Ok(Validation::Valid)
                }
            })
            .prompt(),
    )
}

pub fn prompt_required_text(label: &'static str, initial: Option<&str>) -> Result<String> {
    let spec = FieldSpec {
        key: label,
        label,
        kind: FieldKind::Text,
        required: true,
    };
    match prompt_text(&spec, initial)? {
        Some(Value::String(text)) => Ok(text),
        _ => bail!("{label} is required."),
    }
}

fn prompt_lookup(
    queries: &Queries,
    spec: &FieldSpec,
    lookup: Lookup,
    existing: Option<&Map<String, Value>>,
) -> Result<Option<i64>> {
    let rows = queries.list(lookup.endpoint())?;

    // Rows without an id cannot be referenced, skip them.
    let mut choices: Vec<(i64, String)> = Vec::new();
    for row in &rows {
        if let Some(id) = row.get("id").and_then(value_i64) {
            let name = row
                .get(lookup.label_key())
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("record {id}"));
            choices.push((id, format!("{name} (#{id})")));
        }
    }

    if choices.is_empty() {
        if spec.required {
            bail!("No {} available yet. Create one first.", lookup.plural());
        }
        return Ok(None);
    }

    let mut options = Vec::new();
    if !spec.required {
        options.push(NONE_OPT.to_string());
    }
    let offset = options.len();
    options.extend(choices.iter().map(|(_, label)| label.clone()));

    let current = existing.and_then(|map| map.get(spec.key)).and_then(value_i64);
    let start = current
        .and_then(|id| choices.iter().position(|(choice_id, _)| *choice_id == id))
        .map(|index| index + offset)
        .unwrap_or(0);

    let title = prompt_title(spec);
    let chosen = prompted(
        Select::new(&title, options.clone())
            .with_page_size(10)
            .with_starting_cursor(start)
            .prompt(),
    )?;
    let index = options
        .iter()
        .position(|option| *option == chosen)
        .unwrap_or(0);
    if !spec.required && index == 0 {
        return Ok(None);
    }
    Ok(Some(choices[index - offset].0))
}

/// File selection: native dialog first, plain path prompt as fallback
/// (the dialog is unavailable on headless terminals).
pub fn prompt_file(spec: &FieldSpec, required: bool) -> Result<Option<PathBuf>> {
    let use_dialog = prompted(
        Confirm::new(&format!("Pick the {} with a file dialog?", spec.label.to_lowercase()))
            .with_default(true)
            .prompt(),
    )?;
    if use_dialog {
        if let Some(path) = rfd::FileDialog::new().set_title(spec.label).pick_file() {
            return Ok(Some(path));
        }
        println!("❌ No file selected. Falling back to manual input.");
    }

    let effective = FieldSpec { required, ..*spec };
    let title = prompt_title(&effective);
    let raw = prompted(
        Text::new(&title)
            .with_validator(move |input: &str| match validate_field(&effective, input) {
                Ok(_) => Ok(Validation::Valid),
                Err(message) => Ok(Validation::Invalid(message.into())),
            })
            .prompt(),
    )?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(PathBuf::from(trimmed)))
    }
}

/// Run the whole form: one prompt per field, defaults taken from the
/// existing record in edit mode.
pub fn run_form(
    queries: &Queries,
    fields: &[FieldSpec],
    mode: FormMode,
    existing: Option<&Map<String, Value>>,
) -> Result<FormOutput> {
    let mut values = Map::new();
    let mut upload = None;

    for spec in fields {
        match spec.kind {
            FieldKind::Date => {
                let default = existing
                    .and_then(|map| map.get(spec.key))
                    .map(|value| cell_text(Some(value)))
                    .and_then(|text| NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok())
                    .unwrap_or_else(|| Local::now().date_naive());
                let title = prompt_title(spec);
                let date = prompted(DateSelect::new(&title).with_default(default).prompt())?;
                values.insert(spec.key.to_string(), Value::String(date.to_string()));
            }
            FieldKind::Choice(options) => {
                let current = existing
                    .and_then(|map| map.get(spec.key))
                    .and_then(Value::as_str);
                let start = current
                    .and_then(|value| options.iter().position(|option| *option == value))
                    .unwrap_or(0);
                let title = prompt_title(spec);
                let choice = prompted(
                    Select::new(&title, options.to_vec())
                        .with_starting_cursor(start)
                        .prompt(),
                )?;
                values.insert(spec.key.to_string(), Value::String(choice.to_string()));
            }
            FieldKind::Lookup(lookup) => {
                if let Some(id) = prompt_lookup(queries, spec, lookup, existing)? {
                    values.insert(spec.key.to_string(), Value::from(id));
                }
            }
            FieldKind::File => {
                let required = spec.required && mode == FormMode::Create;
                if let Some(path) = prompt_file(spec, required)? {
                    upload = Some((spec.key.to_string(), path));
                }
            }
            _ => {
                let initial = existing
                    .and_then(|map| map.get(spec.key))
                    .map(|value| cell_text(Some(value)))
                    .filter(|text| !text.is_empty());
                if let Some(value) = prompt_text(spec, initial.as_deref())? {
                    values.insert(spec.key.to_string(), value);
                }
            }
        }
    }

    Ok(FormOutput { values, upload })
}
