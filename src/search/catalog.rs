use anyhow::Result;

use crate::db::types::{ResultSet, Value};
use crate::search::ident::quote_identifier;
use crate::search::ColumnTarget;

/// Column types whose values can be matched with LIKE. Everything else is
/// skipped during enumeration rather than cast speculatively.
pub const TEXT_TYPES: [&str; 6] = ["char", "nchar", "varchar", "nvarchar", "text", "ntext"];

/// Online, accessible databases visible to the login. `@P1 = 1` widens the
/// list to the four system databases.
pub const DATABASES_SQL: &str = r#"
SELECT name
FROM sys.databases
WHERE state = 0
  AND HAS_DBACCESS(name) = 1
  AND (@P1 = 1 OR database_id > 4)
ORDER BY name;
"#;

/// Build the text-column enumeration query for one database.
///
/// When `database` is given the INFORMATION_SCHEMA views are addressed with a
/// three-part name, so the same connection can enumerate any database the
/// login can see. `@P1`/`@P2` narrow to a single schema/table when bound
/// non-null. Ordinal ordering keeps the synthesized legs in catalog order.
pub fn text_columns_sql(database: Option<&str>) -> Result<String> {
    let prefix = match database {
        Some(name) => format!("{}.", quote_identifier(name)?),
        None => String::new(),
    };
    Ok(format!(
        r#"
SELECT c.TABLE_SCHEMA, c.TABLE_NAME, c.COLUMN_NAME, c.DATA_TYPE, c.CHARACTER_MAXIMUM_LENGTH
FROM {prefix}INFORMATION_SCHEMA.COLUMNS c
INNER JOIN {prefix}INFORMATION_SCHEMA.TABLES t
    ON c.TABLE_SCHEMA = t.TABLE_SCHEMA AND c.TABLE_NAME = t.TABLE_NAME
WHERE t.TABLE_TYPE = 'BASE TABLE'
  AND c.DATA_TYPE IN ({types})
  AND (@P1 IS NULL OR c.TABLE_SCHEMA = @P1)
  AND (@P2 IS NULL OR c.TABLE_NAME = @P2)
ORDER BY c.TABLE_SCHEMA, c.TABLE_NAME, c.ORDINAL_POSITION;
"#,
        prefix = prefix,
        types = text_type_list(),
    ))
}

fn text_type_list() -> String {
    TEXT_TYPES
        .iter()
        .map(|t| format!("'{}'", t))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Map enumeration rows onto column targets, preserving catalog order.
pub fn column_targets_from_rows(database: &str, set: &ResultSet) -> Vec<ColumnTarget> {
    let mut targets = Vec::with_capacity(set.rows.len());
    for row in &set.rows {
        let (Some(schema), Some(table), Some(column), Some(data_type)) = (
            value_text(row, 0),
            value_text(row, 1),
            value_text(row, 2),
            value_text(row, 3),
        ) else {
            continue;
        };
        targets.push(ColumnTarget {
            database: database.to_string(),
            schema,
            table,
            column,
            data_type,
            max_length: value_int(row, 4),
        });
    }
    targets
}

pub fn database_names_from_rows(set: &ResultSet) -> Vec<String> {
    set.rows
        .iter()
        .filter_map(|row| value_text(row, 0))
        .collect()
}

fn value_text(row: &[Value], idx: usize) -> Option<String> {
    match row.get(idx) {
        Some(Value::Text(s)) => Some(s.clone()),
        _ => None,
    }
}

fn value_int(row: &[Value], idx: usize) -> Option<i64> {
    match row.get(idx) {
        Some(Value::Int(v)) => Some(*v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::types::Column;
    use crate::error::{classify_error, ErrorKind};

    fn enumeration_set() -> ResultSet {
        let columns = [
            "TABLE_SCHEMA",
            "TABLE_NAME",
            "COLUMN_NAME",
            "DATA_TYPE",
            "CHARACTER_MAXIMUM_LENGTH",
        ]
        .iter()
        .map(|name| Column {
            name: name.to_string(),
        })
        .collect();
        ResultSet {
            columns,
            rows: vec![
                vec![
                    Value::Text("dbo".into()),
                    Value::Text("Users".into()),
                    Value::Text("Email".into()),
                    Value::Text("nvarchar".into()),
                    Value::Int(255),
                ],
                vec![
                    Value::Text("dbo".into()),
                    Value::Text("Users".into()),
                    Value::Text("Bio".into()),
                    Value::Text("ntext".into()),
                    Value::Int(1073741823),
                ],
            ],
        }
    }

    #[test]
    fn current_database_query_has_no_prefix() {
        let sql = text_columns_sql(None).unwrap();
        assert!(sql.contains("FROM INFORMATION_SCHEMA.COLUMNS c"));
        assert!(sql.contains("INNER JOIN INFORMATION_SCHEMA.TABLES t"));
        assert!(sql.contains("'BASE TABLE'"));
        assert!(sql.contains("ORDER BY c.TABLE_SCHEMA, c.TABLE_NAME, c.ORDINAL_POSITION"));
        for ty in TEXT_TYPES {
            assert!(sql.contains(&format!("'{}'", ty)), "missing type {}", ty);
        }
    }

    #[test]
    fn named_database_is_bracket_quoted() {
        let sql = text_columns_sql(Some("Sales Data")).unwrap();
        assert!(sql.contains("FROM [Sales Data].INFORMATION_SCHEMA.COLUMNS c"));
        assert!(sql.contains("INNER JOIN [Sales Data].INFORMATION_SCHEMA.TABLES t"));
    }

    #[test]
    fn bad_database_name_is_rejected() {
        let err = text_columns_sql(Some("")).unwrap_err();
        assert_eq!(classify_error(&err), ErrorKind::InvalidIdentifier);
    }

    #[test]
    fn database_list_excludes_system_unless_asked() {
        assert!(DATABASES_SQL.contains("HAS_DBACCESS(name) = 1"));
        assert!(DATABASES_SQL.contains("state = 0"));
        assert!(DATABASES_SQL.contains("(@P1 = 1 OR database_id > 4)"));
    }

    #[test]
    fn maps_rows_in_catalog_order() {
        let targets = column_targets_from_rows("appdb", &enumeration_set());
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].database, "appdb");
        assert_eq!(targets[0].schema, "dbo");
        assert_eq!(targets[0].table, "Users");
        assert_eq!(targets[0].column, "Email");
        assert_eq!(targets[0].data_type, "nvarchar");
        assert_eq!(targets[0].max_length, Some(255));
        assert_eq!(targets[1].column, "Bio");
    }

    #[test]
    fn skips_malformed_rows() {
        let mut set = enumeration_set();
        set.rows.push(vec![Value::Null, Value::Null]);
        let targets = column_targets_from_rows("appdb", &set);
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn extracts_database_names() {
        let set = ResultSet {
            columns: vec![Column {
                name: "name".to_string(),
            }],
            rows: vec![
                vec![Value::Text("alpha".into())],
                vec![Value::Text("beta".into())],
            ],
        };
        assert_eq!(database_names_from_rows(&set), vec!["alpha", "beta"]);
    }
}
