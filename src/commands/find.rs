use anyhow::Result;
use serde_json::json;

use crate::cli::{CliArgs, FindArgs};
use crate::commands::common;
use crate::config::OutputFormat;
use crate::db::client;
use crate::db::types::{Column, ResultSet, Value};
use crate::output::{csv, json as json_out, table, TableOptions};
use crate::search::{self, SearchHit, SearchPlan};

const MAX_ROWS_DEFAULT: u64 = 200;
const MAX_ROWS_MAX: u64 = 2_000;

pub fn run(args: &CliArgs, cmd: &FindArgs) -> Result<()> {
    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);

    let scope = common::resolve_scope(
        cmd.table.as_deref(),
        cmd.schema.as_deref(),
        cmd.all_databases,
        cmd.include_system,
        &resolved,
    )?;
    let max_rows = common::parse_limit(cmd.max_rows, MAX_ROWS_DEFAULT, MAX_ROWS_MAX);

    let (plan, hits) = tokio::runtime::Runtime::new()?.block_on(async {
        let mut client = client::connect(&resolved.connection).await?;
        let targets = search::enumerate_scope(&scope, &mut client).await?;
        let plan = search::plan_from_targets(&targets)?;
        if cmd.show_sql {
            return Ok::<_, anyhow::Error>((plan, None));
        }
        let hits = search::execute_plan(&plan, &cmd.pattern, &mut client).await?;
        Ok((plan, Some(hits)))
    })?;

    let Some(hits) = hits else {
        return print_plan(args, &resolved, format, &cmd.pattern, &plan);
    };

    // The CSV export always carries every match; --max-rows only trims the
    // terminal rendering.
    let csv_path = match cmd.csv.as_deref() {
        Some(path) => {
            csv::write_result_set(path, &hits_result_set(&hits))?;
            Some(path.to_path_buf())
        }
        None => None,
    };

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "pattern": cmd.pattern,
            "databases": plan.database_names(),
            "columnsSearched": plan.column_count(),
            "total": hits.len(),
            "matches": hits,
            "csvPath": csv_path.as_ref().map(|p| p.display().to_string()),
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

    if hits.is_empty() {
        println!("No matches.");
        if let Some(path) = csv_path {
            println!("CSV written: {}", path.display());
        }
        return Ok(());
    }

    let shown = hits.len().min(max_rows as usize);
    let display = hits_result_set(&hits[..shown]);
    let rendered = table::render_result_set_table(&display, format, &TableOptions::default());
    println!("{}", rendered);
    if shown < hits.len() {
        println!(
            "Showing {} of {} matches (raise --max-rows or use --csv for the rest)",
            shown,
            hits.len()
        );
    }
    if let Some(path) = csv_path {
        println!("CSV written: {}", path.display());
    }

    Ok(())
}

fn print_plan(
    args: &CliArgs,
    resolved: &crate::config::ResolvedConfig,
    format: OutputFormat,
    pattern: &str,
    plan: &SearchPlan,
) -> Result<()> {
    if matches!(format, OutputFormat::Json) {
        let statements = plan
            .statements
            .iter()
            .map(|stmt| {
                json!({
                    "database": stmt.database,
                    "columns": stmt.columns,
                    "sql": stmt.sql,
                })
            })
            .collect::<Vec<_>>();
        let payload = json!({
            "pattern": pattern,
            "databases": plan.database_names(),
            "columnsSearched": plan.column_count(),
            "statements": statements,
        });
        let body = json_out::render(&payload, common::json_pretty(resolved))?;
        if !args.quiet {
            println!("{}", body);
        }
        return Ok(());
    }

    if args.quiet {
        return Ok(());
    }

    for stmt in &plan.statements {
        println!("-- {} ({} columns, pattern bound as @P1)", stmt.database, stmt.columns);
        println!("{}", stmt.sql);
        println!();
    }
    Ok(())
}

fn hits_result_set(hits: &[SearchHit]) -> ResultSet {
    ResultSet {
        columns: ["database", "schema", "table", "column", "value"]
            .into_iter()
            .map(Column::new)
            .collect(),
        rows: hits
            .iter()
            .map(|hit| {
                vec![
                    Value::Text(hit.database.clone()),
                    Value::Text(hit.schema.clone()),
                    Value::Text(hit.table.clone()),
                    Value::Text(hit.column.clone()),
                    Value::Text(hit.value.clone()),
                ]
            })
            .collect(),
    }
}
