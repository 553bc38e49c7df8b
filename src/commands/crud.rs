//! Shared list/add/edit/delete flow, driven by entity descriptors.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{Cell, Table};
use inquire::{Confirm, Select};
use serde_json::{Map, Value};
use tracing::debug;

use crate::api::{ApiError, Body, Method};
use crate::entities::EntityDescriptor;
use crate::forms::{self, FieldKind, FormMode};
use crate::model::{cell_text, value_f64, value_i64};
use crate::query::Queries;
use crate::session::AppContext;

#[derive(Subcommand)]
pub enum EntityAction {
    /// Show all records
    List,
    /// Create a new record
    Add,
    /// Update an existing record
    Edit,
    /// Remove a record
    Delete,
}

pub fn run(ctx: &AppContext, desc: &'static EntityDescriptor, action: &EntityAction) -> Result<()> {
    match action {
        EntityAction::List => {
            ctx.require_session()?;
            let queries = Queries::new(&ctx.api);
            let rows = queries.list(desc.endpoint)?;
            render_table(desc, &rows);
        }
        EntityAction::Add => {
            ctx.require_admin()?;
            let queries = Queries::new(&ctx.api);
            println!("\n--- New {} ---", desc.singular);
            let output = forms::run_form(&queries, desc.fields, FormMode::Create, None)?;
            let rows = submit_entity(&queries, desc, output.values, output.upload, None)?;
            println!("✅ {} created.", desc.singular);
            render_table(desc, &rows);
        }
        EntityAction::Edit => {
            ctx.require_admin()?;
            let queries = Queries::new(&ctx.api);
            let rows = queries.list(desc.endpoint)?;
            let Some(row) = pick_row(desc, &rows)? else {
                return Ok(());
            };
            let id = row
                .get("id")
                .and_then(value_i64)
                .context("The selected record has no id.")?;
            println!("\n--- Edit {} #{} ---", desc.singular, id);
            let row = row.clone();
            let output = forms::run_form(&queries, desc.fields, FormMode::Edit, Some(&row))?;
            let rows = submit_entity(&queries, desc, output.values, output.upload, Some(id))?;
            println!("✅ {} updated.", desc.singular);
            render_table(desc, &rows);
        }
        EntityAction::Delete => {
            ctx.require_admin()?;
            let queries = Queries::new(&ctx.api);
            let rows = queries.list(desc.endpoint)?;
            let Some(row) = pick_row(desc, &rows)? else {
                return Ok(());
            };
            let id = row
                .get("id")
                .and_then(value_i64)
                .context("The selected record has no id.")?;
            let sure = forms::prompted(
                Confirm::new(&format!("Delete {} #{}?", desc.singular.to_lowercase(), id))
                    .with_default(false)
                    .prompt(),
            )?;
            if !sure {
                println!("❌ Aborted.");
                return Ok(());
            }
            let rows = delete_entity(&queries, desc, id)?;
            println!("🗑️ {} deleted.", desc.singular);
            render_table(desc, &rows);
        }
    }
    Ok(())
}

/// Finalize, submit, then refresh the list exactly once. Create goes as
/// POST, edit as PATCH with the id folded into the payload. A failed
/// submission never triggers a refresh.
pub fn submit_entity(
    queries: &Queries,
    desc: &EntityDescriptor,
    mut values: Map<String, Value>,
    upload: Option<(String, PathBuf)>,
    existing_id: Option<i64>,
) -> Result<Vec<Value>, ApiError> {
    if let Some(finalize) = desc.finalize {
        finalize(&mut values);
    }
    if let Some(id) = existing_id {
        values.insert("id".to_string(), Value::from(id));
    }
    debug!(
        endpoint = desc.endpoint,
        edit = existing_id.is_some(),
        "submitting record"
    );
    match upload {
        Some((part, path)) => {
            let fields = values
                .iter()
                .map(|(key, value)| (key.clone(), cell_text(Some(value))))
                .collect();
            let body = Body::Multipart {
                fields,
                file: Some((part, path)),
            };
            let method = if existing_id.is_some() {
                Method::Patch
            } else {
                Method::Post
            };
            queries.api().submit(method, desc.endpoint, body)?;
        }
        None if existing_id.is_some() => queries.api().update(desc.endpoint, values)?,
        None => queries.api().create(desc.endpoint, values)?,
    }
    queries.refresh(desc.endpoint)
}

pub fn delete_entity(
    queries: &Queries,
    desc: &EntityDescriptor,
    id: i64,
) -> Result<Vec<Value>, ApiError> {
    queries.api().delete(desc.endpoint, id)?;
    queries.refresh(desc.endpoint)
}

/// Let the user pick a record from the list. Rows without an id are not
/// selectable.
fn pick_row<'a>(
    desc: &EntityDescriptor,
    rows: &'a [Value],
) -> Result<Option<&'a Map<String, Value>>> {
    let mut labeled: Vec<(&'a Map<String, Value>, String)> = Vec::new();
    for row in rows {
        if let Some(map) = row.as_object() {
            if let Some(id) = map.get("id").and_then(value_i64) {
                let summary = row_summary(desc, map);
                if summary.is_empty() {
                    labeled.push((map, format!("#{id}")));
                } else {
                    labeled.push((map, format!("#{id} {summary}")));
                }
            }
        }
    }
    if labeled.is_empty() {
        println!("(None found)");
        return Ok(None);
    }

    let options: Vec<String> = labeled.iter().map(|(_, label)| label.clone()).collect();
    let title = format!("Which {}?", desc.singular.to_lowercase());
    let chosen = forms::prompted(
        Select::new(&title, options.clone())
            .with_page_size(10)
            .prompt(),
    )?;
    let index = options
        .iter()
        .position(|option| *option == chosen)
        .unwrap_or(0);
    Ok(Some(labeled[index].0))
}

/// First non-id column with a value, as the human-readable row label.
fn row_summary(desc: &EntityDescriptor, map: &Map<String, Value>) -> String {
    for (key, _) in desc.columns {
        if *key == "id" {
            continue;
        }
        let text = cell_text(map.get(*key));
        if !text.is_empty() {
            return text;
        }
    }
    String::new()
}

pub fn render_table(desc: &EntityDescriptor, rows: &[Value]) {
    println!("\n--- All {} ---", desc.plural);
    if rows.is_empty() {
        println!("(None found)");
        return;
    }

    let mut table = Table::new();
    let header: Vec<Cell> = desc
        .columns
        .iter()
        .map(|(_, header)| Cell::new(header))
        .collect();
    table.set_header(header);

    for row in rows {
        let map = row.as_object();
        let cells: Vec<Cell> = desc
            .columns
            .iter()
            .map(|(key, _)| {
                let value = map.and_then(|m| m.get(*key));
                if is_money_column(desc, key) {
                    if let Some(amount) = value.and_then(value_f64) {
                        return Cell::new(format!("${amount:.2}"));
                    }
                }
                Cell::new(cell_text(value))
            })
            .collect();
        table.add_row(cells);
    }

    println!("{table}");
}

fn is_money_column(desc: &EntityDescriptor, key: &str) -> bool {
    desc.fields
        .iter()
        .any(|field| field.key == key && matches!(field.kind, FieldKind::Money))
}
