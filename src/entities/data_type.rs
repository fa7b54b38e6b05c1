// Type Catalog - named categories that data entries point at by name
//
// Names are unique (enforced by the UNIQUE column) and 1-50 characters long.
// Deleting a type never touches entries that still carry its name.

use crate::error::{StoreError, StoreResult};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use serde::{Deserialize, Serialize};

pub const NAME_MAX_CHARS: usize = 50;
pub const DEFAULT_LIST_LIMIT: u32 = 100;

const NOT_FOUND: &str = "Data type not found";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataType {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Full replacement for a DataType: used by both create and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTypeInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl DataTypeInput {
    pub fn new(name: &str, description: Option<&str>) -> Self {
        DataTypeInput {
            name: name.to_string(),
            description: description.map(str::to_string),
        }
    }

    pub fn validate(&self) -> StoreResult<()> {
        let chars = self.name.chars().count();

        if chars == 0 {
            return Err(StoreError::Validation(
                "name: must contain at least 1 character".to_string(),
            ));
        }
        if chars > NAME_MAX_CHARS {
            return Err(StoreError::Validation(format!(
                "name: must contain at most {} characters",
                NAME_MAX_CHARS
            )));
        }

        Ok(())
    }
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<DataType> {
    Ok(DataType {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

pub fn create_data_type(conn: &mut Connection, input: &DataTypeInput) -> StoreResult<DataType> {
    input.validate()?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    tx.execute(
        "INSERT INTO data_types (name, description) VALUES (?1, ?2)",
        params![input.name, input.description],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    tracing::debug!(id, name = %input.name, "data type created");

    Ok(DataType {
        id,
        name: input.name.clone(),
        description: input.description.clone(),
    })
}

/// Page through types in id order
pub fn list_data_types(conn: &Connection, skip: u32, limit: u32) -> StoreResult<Vec<DataType>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, description
         FROM data_types
         ORDER BY id
         LIMIT ?1 OFFSET ?2",
    )?;

    let types = stmt
        .query_map(params![limit, skip], from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(types)
}

pub fn get_data_type(conn: &Connection, id: i64) -> StoreResult<DataType> {
    conn.query_row(
        "SELECT id, name, description FROM data_types WHERE id = ?1",
        [id],
        from_row,
    )
    .optional()?
    .ok_or(StoreError::NotFound(NOT_FOUND))
}

/// True when some DataType carries exactly this name
pub fn data_type_exists(conn: &Connection, name: &str) -> StoreResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM data_types WHERE name = ?1 LIMIT 1",
            [name],
            |_| Ok(()),
        )
        .optional()?;

    Ok(found.is_some())
}

/// Overwrite every field of an existing type
pub fn update_data_type(
    conn: &mut Connection,
    id: i64,
    input: &DataTypeInput,
) -> StoreResult<DataType> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    // Missing ids report NotFound ahead of any input problem
    let exists = tx
        .query_row("SELECT 1 FROM data_types WHERE id = ?1", [id], |_| Ok(()))
        .optional()?
        .is_some();
    if !exists {
        return Err(StoreError::NotFound(NOT_FOUND));
    }

    input.validate()?;

    tx.execute(
        "UPDATE data_types SET name = ?2, description = ?3 WHERE id = ?1",
        params![id, input.name, input.description],
    )?;
    tx.commit()?;

    tracing::debug!(id, name = %input.name, "data type updated");

    Ok(DataType {
        id,
        name: input.name.clone(),
        description: input.description.clone(),
    })
}

pub fn delete_data_type(conn: &mut Connection, id: i64) -> StoreResult<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let removed = tx.execute("DELETE FROM data_types WHERE id = ?1", [id])?;
    if removed == 0 {
        return Err(StoreError::NotFound(NOT_FOUND));
    }
    tx.commit()?;

    tracing::debug!(id, "data type deleted");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{count_rows, setup_database};

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    #[test]
    fn test_create_assigns_ids() {
        let mut conn = test_conn();

        let rain = create_data_type(&mut conn, &DataTypeInput::new("rainfall", None)).unwrap();
        let temp = create_data_type(
            &mut conn,
            &DataTypeInput::new("temperature", Some("daily mean, celsius")),
        )
        .unwrap();

        assert_eq!(rain.id, 1);
        assert_eq!(temp.id, 2);
        assert_eq!(temp.description.as_deref(), Some("daily mean, celsius"));
        assert_eq!(get_data_type(&conn, 2).unwrap(), temp);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut conn = test_conn();
        create_data_type(&mut conn, &DataTypeInput::new("rainfall", None)).unwrap();

        let err = create_data_type(&mut conn, &DataTypeInput::new("rainfall", Some("again")))
            .unwrap_err();

        assert!(matches!(err, StoreError::Validation(_)), "got {:?}", err);
        assert_eq!(count_rows(&conn, "data_types").unwrap(), 1);
    }

    #[test]
    fn test_name_length_bounds() {
        let mut conn = test_conn();

        let empty = create_data_type(&mut conn, &DataTypeInput::new("", None));
        assert!(matches!(empty, Err(StoreError::Validation(_))));

        let long = "x".repeat(NAME_MAX_CHARS + 1);
        let too_long = create_data_type(&mut conn, &DataTypeInput::new(&long, None));
        assert!(matches!(too_long, Err(StoreError::Validation(_))));

        // 50 multi-byte characters is still within bounds
        let exact = "é".repeat(NAME_MAX_CHARS);
        assert!(create_data_type(&mut conn, &DataTypeInput::new(&exact, None)).is_ok());

        assert_eq!(count_rows(&conn, "data_types").unwrap(), 1);
    }

    #[test]
    fn test_list_pages() {
        let mut conn = test_conn();
        for name in ["a", "b", "c", "d"] {
            create_data_type(&mut conn, &DataTypeInput::new(name, None)).unwrap();
        }

        let all = list_data_types(&conn, 0, DEFAULT_LIST_LIMIT).unwrap();
        assert_eq!(all.len(), 4);

        let page: Vec<String> = list_data_types(&conn, 1, 2)
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(page, vec!["b", "c"]);

        assert!(list_data_types(&conn, 10, 5).unwrap().is_empty());
    }

    #[test]
    fn test_update_overwrites_all_fields() {
        let mut conn = test_conn();
        let created = create_data_type(
            &mut conn,
            &DataTypeInput::new("rainfall", Some("mm per day")),
        )
        .unwrap();

        let updated =
            update_data_type(&mut conn, created.id, &DataTypeInput::new("precipitation", None))
                .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "precipitation");
        assert_eq!(updated.description, None);
        assert_eq!(get_data_type(&conn, created.id).unwrap(), updated);
    }

    #[test]
    fn test_update_to_taken_name_rejected() {
        let mut conn = test_conn();
        create_data_type(&mut conn, &DataTypeInput::new("rainfall", None)).unwrap();
        let temp = create_data_type(&mut conn, &DataTypeInput::new("temperature", None)).unwrap();

        let err = update_data_type(&mut conn, temp.id, &DataTypeInput::new("rainfall", None))
            .unwrap_err();

        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(get_data_type(&conn, temp.id).unwrap().name, "temperature");
    }

    #[test]
    fn test_missing_id_is_not_found() {
        let mut conn = test_conn();

        assert!(matches!(get_data_type(&conn, 42), Err(StoreError::NotFound(_))));
        assert!(matches!(
            update_data_type(&mut conn, 42, &DataTypeInput::new("x", None)),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(delete_data_type(&mut conn, 42), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_delete_then_exists() {
        let mut conn = test_conn();
        let rain = create_data_type(&mut conn, &DataTypeInput::new("rainfall", None)).unwrap();
        assert!(data_type_exists(&conn, "rainfall").unwrap());

        delete_data_type(&mut conn, rain.id).unwrap();

        assert!(!data_type_exists(&conn, "rainfall").unwrap());
        assert!(matches!(get_data_type(&conn, rain.id), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let mut conn = test_conn();
        let first = create_data_type(&mut conn, &DataTypeInput::new("a", None)).unwrap();
        delete_data_type(&mut conn, first.id).unwrap();

        let second = create_data_type(&mut conn, &DataTypeInput::new("a", None)).unwrap();
        assert!(second.id > first.id);
    }
}
