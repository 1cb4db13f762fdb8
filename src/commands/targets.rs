use anyhow::Result;
use serde_json::json;

use crate::cli::{CliArgs, TargetsArgs};
use crate::commands::common;
use crate::config::OutputFormat;
use crate::db::client;
use crate::db::types::{Column, ResultSet, Value};
use crate::error::{AppError, ErrorKind};
use crate::output::{json as json_out, table, TableOptions};
use crate::search::{self, ColumnTarget};

pub fn run(args: &CliArgs, cmd: &TargetsArgs) -> Result<()> {
    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);

    let scope = common::resolve_scope(
        cmd.table.as_deref(),
        cmd.schema.as_deref(),
        cmd.all_databases,
        cmd.include_system,
        &resolved,
    )?;

    let targets = tokio::runtime::Runtime::new()?.block_on(async {
        let mut client = client::connect(&resolved.connection).await?;
        search::enumerate_scope(&scope, &mut client).await
    })?;

    // Same contract as a search: a scope with nothing to scan is an error,
    // not an empty listing.
    if targets.is_empty() {
        return Err(AppError::new(
            ErrorKind::EmptyScope,
            "No text-capable columns to search in this scope",
        )
        .into());
    }

    let total = targets.len();
    let shown = match cmd.limit {
        Some(limit) if (limit as usize) < total => limit as usize,
        _ => total,
    };

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "total": total,
            "count": shown,
            "targets": &targets[..shown],
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

    let rendered = table::render_result_set_table(
        &targets_result_set(&targets[..shown]),
        format,
        &TableOptions::default(),
    );
    println!("{}", rendered);
    if shown < total {
        println!("Showing {} of {} text columns", shown, total);
    }

    Ok(())
}

fn targets_result_set(targets: &[ColumnTarget]) -> ResultSet {
    ResultSet {
        columns: ["database", "schema", "table", "column", "type", "length"]
            .into_iter()
            .map(Column::new)
            .collect(),
        rows: targets
            .iter()
            .map(|target| {
                vec![
                    Value::Text(target.database.clone()),
                    Value::Text(target.schema.clone()),
                    Value::Text(target.table.clone()),
                    Value::Text(target.column.clone()),
                    Value::Text(target.data_type.clone()),
                    length_cell(target.max_length),
                ]
            })
            .collect(),
    }
}

// CHARACTER_MAXIMUM_LENGTH reports -1 for (max) columns.
fn length_cell(max_length: Option<i64>) -> Value {
    match max_length {
        Some(-1) => Value::Text("max".to_string()),
        Some(n) => Value::Int(n),
        None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(column: &str, data_type: &str, max_length: Option<i64>) -> ColumnTarget {
        ColumnTarget {
            database: "shop".to_string(),
            schema: "dbo".to_string(),
            table: "Orders".to_string(),
            column: column.to_string(),
            data_type: data_type.to_string(),
            max_length,
        }
    }

    #[test]
    fn renders_max_for_unbounded_columns() {
        let rs = targets_result_set(&[
            target("Notes", "nvarchar", Some(-1)),
            target("Code", "char", Some(10)),
            target("Legacy", "text", None),
        ]);
        assert_eq!(rs.rows[0][5], Value::Text("max".to_string()));
        assert_eq!(rs.rows[1][5], Value::Int(10));
        assert_eq!(rs.rows[2][5], Value::Null);
    }
}
