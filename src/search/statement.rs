use anyhow::Result;

use crate::error::{AppError, ErrorKind};
use crate::search::ident::{quote_identifier, quote_literal};
use crate::search::ColumnTarget;

/// Synthesize one search statement for a set of columns in a single database.
///
/// Each qualifying column contributes exactly one sub-query selecting its
/// origin labels plus the value cast to `nvarchar(max)`, filtered by
/// `LIKE @P1`. Sub-queries are joined with `UNION ALL` so duplicate values
/// in different columns stay visible; the caller binds the pattern once and
/// it is reused by every leg. No ORDER BY is imposed, so row order is
/// whatever the engine produces.
pub fn build_statement(targets: &[ColumnTarget]) -> Result<String> {
    if targets.is_empty() {
        return Err(AppError::new(
            ErrorKind::EmptyScope,
            "No text-capable columns to search in this scope",
        )
        .into());
    }

    let mut legs = Vec::with_capacity(targets.len());
    for target in targets {
        legs.push(build_leg(target)?);
    }
    Ok(legs.join("\nUNION ALL\n"))
}

fn build_leg(target: &ColumnTarget) -> Result<String> {
    let database = quote_identifier(&target.database)?;
    let schema = quote_identifier(&target.schema)?;
    let table = quote_identifier(&target.table)?;
    let column = quote_identifier(&target.column)?;

    // Three-part naming keeps the cross-database case on the same code path
    // as the single-database one.
    Ok(format!(
        "SELECT {db_label} AS [database], {schema_label} AS [schema], {table_label} AS [table], {column_label} AS [column], \
         CAST({column} AS nvarchar(max)) AS [value] \
         FROM {database}.{schema}.{table} \
         WHERE {column} LIKE @P1 ESCAPE '\\'",
        db_label = quote_literal(&target.database),
        schema_label = quote_literal(&target.schema),
        table_label = quote_literal(&target.table),
        column_label = quote_literal(&target.column),
        database = database,
        schema = schema,
        table = table,
        column = column,
    ))
}

/// Turn a user substring into the value bound for `@P1`.
///
/// The substring is matched literally: LIKE metacharacters in it are escaped
/// before the surrounding wildcards are added, so searching for `100%` finds
/// rows containing the four characters `100%` and nothing else.
pub fn contains_pattern(pattern: &str) -> String {
    format!("%{}%", escape_like(pattern))
}

fn escape_like(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for ch in pattern.chars() {
        if matches!(ch, '\\' | '%' | '_' | '[') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{classify_error, ErrorKind};

    fn target(table: &str, column: &str) -> ColumnTarget {
        ColumnTarget {
            database: "appdb".to_string(),
            schema: "dbo".to_string(),
            table: table.to_string(),
            column: column.to_string(),
            data_type: "nvarchar".to_string(),
            max_length: Some(50),
        }
    }

    #[test]
    fn single_column_has_no_union() {
        let sql = build_statement(&[target("Users", "Email")]).unwrap();
        assert!(!sql.contains("UNION ALL"));
        assert!(sql.contains("FROM [appdb].[dbo].[Users]"));
        assert!(sql.contains("[Email] LIKE @P1 ESCAPE '\\'"));
    }

    #[test]
    fn one_leg_per_column_no_trailing_union() {
        let targets = vec![
            target("Users", "Email"),
            target("Users", "Name"),
            target("Orders", "Notes"),
        ];
        let sql = build_statement(&targets).unwrap();
        assert_eq!(sql.matches("UNION ALL").count(), 2);
        assert_eq!(sql.matches("LIKE @P1").count(), 3);
        assert!(!sql.trim_end().ends_with("UNION ALL"));
    }

    #[test]
    fn labels_carry_origin() {
        let sql = build_statement(&[target("Orders", "Notes")]).unwrap();
        assert!(sql.contains("N'appdb' AS [database]"));
        assert!(sql.contains("N'dbo' AS [schema]"));
        assert!(sql.contains("N'Orders' AS [table]"));
        assert!(sql.contains("N'Notes' AS [column]"));
    }

    #[test]
    fn awkward_names_stay_inside_quoting() {
        let mut t = target("Order Details", "Ship Address");
        t.schema = "sales".to_string();
        let sql = build_statement(&[t]).unwrap();
        assert!(sql.contains("FROM [appdb].[sales].[Order Details]"));
        assert!(sql.contains("[Ship Address] LIKE @P1"));
    }

    #[test]
    fn label_quotes_are_doubled() {
        let sql = build_statement(&[target("O'Brien", "Name")]).unwrap();
        assert!(sql.contains("N'O''Brien' AS [table]"));
        assert!(sql.contains("FROM [appdb].[dbo].[O'Brien]"));
    }

    #[test]
    fn empty_target_list_is_empty_scope() {
        let err = build_statement(&[]).unwrap_err();
        assert_eq!(classify_error(&err), ErrorKind::EmptyScope);
    }

    #[test]
    fn unquotable_name_aborts_synthesis() {
        let mut t = target("Users", "Email");
        t.column = "bad\u{0}name".to_string();
        let err = build_statement(&[t]).unwrap_err();
        assert_eq!(classify_error(&err), ErrorKind::InvalidIdentifier);
    }

    #[test]
    fn pattern_wildcards_are_escaped() {
        assert_eq!(contains_pattern("abc"), "%abc%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("[x]"), "%\\[x]%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn pattern_never_lands_in_statement_text() {
        let sql = build_statement(&[target("Users", "Email")]).unwrap();
        // The pattern travels as a bound parameter; the statement only ever
        // references the placeholder.
        assert!(sql.contains("@P1"));
        assert!(!sql.contains('%'));
    }
}
