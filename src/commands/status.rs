use std::time::Instant;

use anyhow::Result;
use serde_json::json;
use tiberius::Query;

use crate::cli::{CliArgs, StatusArgs};
use crate::commands::common;
use crate::config::OutputFormat;
use crate::db::client;
use crate::db::executor;
use crate::db::types::{ResultSet, Value};
use crate::output::{json as json_out, table, TableOptions};

const PROBE_SQL: &str = "SELECT @@SERVERNAME AS serverName, \
     @@VERSION AS serverVersion, \
     DB_NAME() AS currentDatabase, \
     CONVERT(nvarchar(128), DATABASEPROPERTYEX(DB_NAME(), 'Collation')) AS databaseCollation, \
     CONVERT(varchar(33), SYSDATETIMEOFFSET(), 127) AS currentTime";

struct Probe {
    server_name: String,
    server_version: String,
    database: String,
    collation: String,
    server_time: String,
}

impl Probe {
    fn from_result_sets(result_sets: &[ResultSet]) -> Self {
        Probe {
            server_name: field(result_sets, "serverName"),
            server_version: field(result_sets, "serverVersion"),
            database: field(result_sets, "currentDatabase"),
            collation: field(result_sets, "databaseCollation"),
            server_time: field(result_sets, "currentTime"),
        }
    }
}

pub fn run(args: &CliArgs, _cmd: &StatusArgs) -> Result<()> {
    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);

    let started = Instant::now();
    let result_sets = tokio::runtime::Runtime::new()?.block_on(async {
        let mut client = client::connect(&resolved.connection).await?;
        executor::run_query(Query::new(PROBE_SQL), &mut client).await
    })?;
    let latency_ms = started.elapsed().as_millis();

    let probe = Probe::from_result_sets(&result_sets);

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "status": "ok",
            "latencyMs": latency_ms,
            "serverName": probe.server_name,
            "serverVersion": probe.server_version,
            "currentDatabase": probe.database,
            "databaseCollation": probe.collation,
            "timestamp": probe.server_time,
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

    // @@VERSION spans several lines; the table keeps the first. The collation
    // row matters because it decides whether searches are case-sensitive.
    let version_line = probe
        .server_version
        .lines()
        .next()
        .unwrap_or("unknown")
        .trim()
        .to_string();
    let rows = vec![
        ("Status".to_string(), "ok".to_string()),
        ("LatencyMs".to_string(), latency_ms.to_string()),
        ("Server".to_string(), probe.server_name),
        ("Version".to_string(), version_line),
        ("CurrentDatabase".to_string(), probe.database),
        ("Collation".to_string(), probe.collation),
        ("Timestamp".to_string(), probe.server_time),
    ];

    let rendered = table::render_key_value_table("Status", &rows, format, &TableOptions::default());
    println!("{}", rendered);

    Ok(())
}

/// Pulls a named column out of the first row of the first result set.
fn field(result_sets: &[ResultSet], name: &str) -> String {
    let Some(rs) = result_sets.first() else {
        return "unknown".to_string();
    };
    let Some(row) = rs.rows.first() else {
        return "unknown".to_string();
    };
    let found = rs
        .columns
        .iter()
        .position(|col| col.name == name)
        .and_then(|idx| row.get(idx));
    match found {
        Some(Value::Null) | None => "unknown".to_string(),
        Some(v) => v.as_display(),
    }
}
