use anyhow::Result;
use serde_json::json;
use tiberius::Query;

use crate::cli::{CliArgs, ObjectsArgs};
use crate::commands::common;
use crate::config::OutputFormat;
use crate::db::client;
use crate::db::executor;
use crate::db::types::Value;
use crate::output::{json as json_out, table, Pagination, TableOptions};
use crate::search::statement;

const LIMIT_DEFAULT: u64 = 50;
const LIMIT_MAX: u64 = 500;

pub fn run(args: &CliArgs, cmd: &ObjectsArgs) -> Result<()> {
    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);

    let limit = common::parse_limit(cmd.limit, LIMIT_DEFAULT, LIMIT_MAX);
    let offset = common::parse_offset(cmd.offset);
    let bound = statement::contains_pattern(&cmd.pattern);
    let include_system = if cmd.include_system { 1i32 } else { 0i32 };

    let (rows, total) = tokio::runtime::Runtime::new()?.block_on(async {
        let mut client = client::connect(&resolved.connection).await?;

        let mut list_query = Query::new(list_sql(cmd));
        list_query.bind(bound.as_str());
        list_query.bind(include_system);
        list_query.bind(offset as i64);
        list_query.bind(limit as i64);
        let list_sets = executor::run_query(list_query, &mut client).await?;
        let list_set = list_sets.into_iter().next().unwrap_or_default();

        let mut count_query = Query::new(count_sql(cmd));
        count_query.bind(bound.as_str());
        count_query.bind(include_system);
        let count_sets = executor::run_query(count_query, &mut client).await?;
        let total = count_sets
            .first()
            .and_then(|rs| rs.rows.first())
            .and_then(|row| row.first())
            .and_then(value_as_u64)
            .unwrap_or(0);

        Ok::<_, anyhow::Error>((list_set, total))
    })?;

    let count = rows.rows.len() as u64;
    let paging = build_paging(total, count, offset, limit);

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "pattern": cmd.pattern,
            "total": paging.total,
            "count": paging.count,
            "offset": paging.offset,
            "limit": paging.limit,
            "hasMore": paging.has_more,
            "nextOffset": paging.next_offset,
            "objects": json_out::result_set_rows_to_objects(&rows),
        });
        let body = json_out::render(&payload, common::json_pretty(&resolved))?;
        if !args.quiet {
            println!("{}", body);
        }
        return Ok(());
    }

    if args.quiet {
        return Ok(());
    }

    if rows.rows.is_empty() {
        println!("No matches.");
        return Ok(());
    }

    let mut options = TableOptions::default();
    if paging.total > 0 {
        let page_limit = if count == 0 { limit } else { count };
        options.pagination = Some(Pagination {
            total: Some(paging.total),
            offset: paging.offset,
            limit: page_limit,
        });
    }
    let rendered = table::render_result_set_table(&rows, format, &options);
    println!("{}", rendered);

    Ok(())
}

/// One sub-query per requested name source: object names always, column
/// names with --columns, module bodies with --definitions. The pattern rides
/// along as @P1 in every leg; only fixed type-code lists are spliced into
/// the text.
fn match_legs(cmd: &ObjectsArgs) -> String {
    let types = type_codes(cmd.object_type.as_deref());
    let mut legs = vec![format!(
        r#"    SELECT s.name AS schemaName,
           o.name AS objectName,
           o.type_desc AS objectType,
           N'name' AS matchKind,
           o.name AS matchText
    FROM sys.objects o
    JOIN sys.schemas s ON s.schema_id = o.schema_id
    WHERE o.name LIKE @P1 ESCAPE '\'
      AND (@P2 = 1 OR o.is_ms_shipped = 0)
      AND o.type IN {types}"#
    )];

    if cmd.columns {
        legs.push(format!(
            r#"    SELECT s.name AS schemaName,
           o.name AS objectName,
           o.type_desc AS objectType,
           N'column' AS matchKind,
           c.name AS matchText
    FROM sys.columns c
    JOIN sys.objects o ON o.object_id = c.object_id
    JOIN sys.schemas s ON s.schema_id = o.schema_id
    WHERE c.name LIKE @P1 ESCAPE '\'
      AND (@P2 = 1 OR o.is_ms_shipped = 0)
      AND o.type IN {types}"#
        ));
    }

    if cmd.definitions {
        legs.push(format!(
            r#"    SELECT s.name AS schemaName,
           o.name AS objectName,
           o.type_desc AS objectType,
           N'definition' AS matchKind,
           LEFT(m.definition, 160) AS matchText
    FROM sys.sql_modules m
    JOIN sys.objects o ON o.object_id = m.object_id
    JOIN sys.schemas s ON s.schema_id = o.schema_id
    WHERE m.definition LIKE @P1 ESCAPE '\'
      AND (@P2 = 1 OR o.is_ms_shipped = 0)
      AND o.type IN {types}"#
        ));
    }

    legs.join("\n    UNION ALL\n")
}

fn list_sql(cmd: &ObjectsArgs) -> String {
    format!(
        r#"
WITH matches AS (
{legs}
),
numbered AS (
    SELECT matches.*, ROW_NUMBER() OVER (ORDER BY schemaName, objectName, matchKind) AS rownum
    FROM matches
)
SELECT schemaName AS [schema],
       objectName AS objectName,
       objectType AS objectType,
       matchKind AS matchKind,
       matchText AS matchText
FROM numbered
WHERE rownum BETWEEN (@P3 + 1) AND (@P3 + @P4)
ORDER BY rownum;
"#,
        legs = match_legs(cmd)
    )
}

fn count_sql(cmd: &ObjectsArgs) -> String {
    format!(
        "SELECT COUNT(*) AS total FROM (\n{legs}\n) AS matches;",
        legs = match_legs(cmd)
    )
}

fn type_codes(object_type: Option<&str>) -> &'static str {
    match object_type {
        Some("table") => "('U')",
        Some("view") => "('V')",
        Some("proc") => "('P')",
        Some("function") => "('FN','IF','TF')",
        Some("trigger") => "('TR')",
        _ => "('U','V','P','FN','IF','TF','TR')",
    }
}

#[derive(Debug, Clone)]
struct Paging {
    total: u64,
    count: u64,
    offset: u64,
    limit: u64,
    has_more: bool,
    next_offset: Option<u64>,
}

fn build_paging(total: u64, count: u64, offset: u64, limit: u64) -> Paging {
    let has_more = offset + count < total;
    let next_offset = has_more.then(|| offset + limit);
    Paging {
        total,
        count,
        offset,
        limit,
        has_more,
        next_offset,
    }
}

fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Int(v) => (*v).try_into().ok(),
        Value::Float(v) => Some(*v as u64),
        Value::Text(s) => s.parse::<u64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> ObjectsArgs {
        ObjectsArgs {
            pattern: "needle".to_string(),
            object_type: None,
            columns: false,
            definitions: false,
            include_system: false,
            limit: None,
            offset: None,
        }
    }

    #[test]
    fn single_leg_has_no_union() {
        let sql = list_sql(&base_args());
        assert!(!sql.contains("UNION ALL"));
        assert!(sql.contains("LIKE @P1 ESCAPE"));
    }

    #[test]
    fn each_extra_source_adds_a_leg() {
        let mut args = base_args();
        args.columns = true;
        args.definitions = true;
        let sql = list_sql(&args);
        assert_eq!(sql.matches("UNION ALL").count(), 2);
        assert!(sql.contains("sys.columns"));
        assert!(sql.contains("sys.sql_modules"));
    }

    #[test]
    fn pattern_text_never_lands_in_sql() {
        let mut args = base_args();
        args.pattern = "'; DROP TABLE Users; --".to_string();
        let sql = list_sql(&args);
        assert!(!sql.contains("DROP TABLE"));
    }

    #[test]
    fn type_filter_narrows_codes() {
        assert_eq!(type_codes(Some("table")), "('U')");
        assert_eq!(type_codes(Some("function")), "('FN','IF','TF')");
        assert_eq!(type_codes(None), "('U','V','P','FN','IF','TF','TR')");
    }

    #[test]
    fn paging_reports_next_offset() {
        let paging = build_paging(100, 10, 0, 10);
        assert!(paging.has_more);
        assert_eq!(paging.next_offset, Some(10));

        let done = build_paging(10, 10, 0, 10);
        assert!(!done.has_more);
        assert_eq!(done.next_offset, None);
    }
}
