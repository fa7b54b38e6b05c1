// Entry Store - dated numeric observations tagged with a type name
//
// The type name is checked against the Type Catalog inside the write
// transaction. There is no foreign key: deleting or renaming a DataType
// later leaves existing entries untouched.

use crate::entities::data_type::data_type_exists;
use crate::error::{StoreError, StoreResult};
use chrono::{Datelike, NaiveDate};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior};
use serde::{Deserialize, Serialize};

const NOT_FOUND: &str = "Data entry not found";

// Dates are stored as `YYYY-MM-DD` text and compared as strings, which only
// orders correctly for four-digit, unsigned years.
const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

fn check_date(field: &str, date: NaiveDate) -> StoreResult<()> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        return Err(StoreError::Validation(format!(
            "{}: must be between 0001-01-01 and 9999-12-31, got {}",
            field, date
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEntry {
    pub id: i64,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub value: f64,
}

/// Full replacement for a DataEntry: used by both create and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEntryInput {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub value: f64,
}

impl DataEntryInput {
    pub fn new(date: NaiveDate, entry_type: &str, value: f64) -> Self {
        DataEntryInput {
            date,
            entry_type: entry_type.to_string(),
            value,
        }
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.entry_type.is_empty() {
            return Err(StoreError::Validation(
                "type: must contain at least 1 character".to_string(),
            ));
        }
        check_date("date", self.date)
    }

    fn into_entry(self, id: i64) -> DataEntry {
        DataEntry {
            id,
            date: self.date,
            entry_type: self.entry_type,
            value: self.value,
        }
    }
}

/// Optional list filters, AND-composed. Bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EntryFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
}

impl EntryFilter {
    pub fn validate(&self) -> StoreResult<()> {
        if let Some(start) = self.start_date {
            check_date("start_date", start)?;
        }
        if let Some(end) = self.end_date {
            check_date("end_date", end)?;
        }
        Ok(())
    }
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<DataEntry> {
    Ok(DataEntry {
        id: row.get(0)?,
        date: row.get(1)?,
        entry_type: row.get(2)?,
        value: row.get(3)?,
    })
}

fn entry_exists(conn: &Connection, id: i64) -> StoreResult<bool> {
    let found = conn
        .query_row("SELECT 1 FROM data_entries WHERE id = ?1", [id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

pub fn create_data_entry(conn: &mut Connection, input: &DataEntryInput) -> StoreResult<DataEntry> {
    input.validate()?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    if !data_type_exists(&tx, &input.entry_type)? {
        return Err(StoreError::InvalidReference);
    }

    tx.execute(
        "INSERT INTO data_entries (date, type, value) VALUES (?1, ?2, ?3)",
        params![input.date, input.entry_type, input.value],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    tracing::debug!(id, entry_type = %input.entry_type, "data entry created");

    Ok(input.clone().into_entry(id))
}

pub fn list_data_entries(conn: &Connection, filter: &EntryFilter) -> StoreResult<Vec<DataEntry>> {
    filter.validate()?;

    let mut sql = String::from("SELECT id, date, type, value FROM data_entries WHERE 1 = 1");
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(start) = filter.start_date {
        bind_values.push(Value::Text(start.format("%Y-%m-%d").to_string()));
        sql.push_str(&format!(" AND date >= ?{}", bind_values.len()));
    }
    if let Some(end) = filter.end_date {
        bind_values.push(Value::Text(end.format("%Y-%m-%d").to_string()));
        sql.push_str(&format!(" AND date <= ?{}", bind_values.len()));
    }
    // An empty type string means "no type filter"
    if let Some(entry_type) = filter.entry_type.as_deref().filter(|t| !t.is_empty()) {
        bind_values.push(Value::Text(entry_type.to_string()));
        sql.push_str(&format!(" AND type = ?{}", bind_values.len()));
    }
    sql.push_str(" ORDER BY id");

    let mut stmt = conn.prepare(&sql)?;
    let entries = stmt
        .query_map(params_from_iter(bind_values), from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(entries)
}

pub fn get_data_entry(conn: &Connection, id: i64) -> StoreResult<DataEntry> {
    conn.query_row(
        "SELECT id, date, type, value FROM data_entries WHERE id = ?1",
        [id],
        from_row,
    )
    .optional()?
    .ok_or(StoreError::NotFound(NOT_FOUND))
}

/// Overwrite every field of an existing entry after re-checking its type
pub fn update_data_entry(
    conn: &mut Connection,
    id: i64,
    input: &DataEntryInput,
) -> StoreResult<DataEntry> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    if !entry_exists(&tx, id)? {
        return Err(StoreError::NotFound(NOT_FOUND));
    }
    input.validate()?;
    if !data_type_exists(&tx, &input.entry_type)? {
        return Err(StoreError::InvalidReference);
    }

    tx.execute(
        "UPDATE data_entries SET date = ?2, type = ?3, value = ?4 WHERE id = ?1",
        params![id, input.date, input.entry_type, input.value],
    )?;
    tx.commit()?;

    tracing::debug!(id, entry_type = %input.entry_type, "data entry updated");

    Ok(input.clone().into_entry(id))
}

pub fn delete_data_entry(conn: &mut Connection, id: i64) -> StoreResult<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let removed = tx.execute("DELETE FROM data_entries WHERE id = ?1", [id])?;
    if removed == 0 {
        return Err(StoreError::NotFound(NOT_FOUND));
    }
    tx.commit()?;

    tracing::debug!(id, "data entry deleted");

    Ok(())
}
