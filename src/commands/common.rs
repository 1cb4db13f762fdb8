use anyhow::Result;

use crate::cli::CliArgs;
use crate::config::OutputFormat;
use crate::config::{self, CliOverrides, ResolvedConfig};
use crate::error::{AppError, ErrorKind};
use crate::output;
use crate::search::{ident, SearchScope};

pub fn overrides_from_args(args: &CliArgs) -> CliOverrides {
    CliOverrides {
        config_path: args.config_path.clone(),
        env_file: args.env_file.clone(),
        profile: args.profile.clone(),
        server: args.server.clone(),
        port: args.port,
        database: args.database.clone(),
        user: args.user.clone(),
        password: args.password.clone(),
        timeout_ms: args.timeout_ms,
        encrypt: args.encrypt,
        trust_cert: args.trust_cert,
    }
}

pub fn load_config(args: &CliArgs) -> Result<ResolvedConfig> {
    let overrides = overrides_from_args(args);
    config::load_from_system(&overrides)
        .map_err(|err| AppError::new(ErrorKind::Config, err.to_string()).into())
}

pub fn output_format(args: &CliArgs, resolved: &ResolvedConfig) -> OutputFormat {
    output::select_format(&args.output, &resolved.settings)
}

pub fn json_pretty(resolved: &ResolvedConfig) -> bool {
    resolved.settings.output.json_pretty
}

/// Turn the shared scope flags into a search scope.
///
/// A `--table` value may embed its schema as `schema.name`; the embedded
/// schema wins over `--schema`, which wins over the profile's first default
/// schema, which falls back to dbo. Identifiers are checked here so a bad
/// name fails before a connection is attempted.
pub fn resolve_scope(
    table: Option<&str>,
    schema: Option<&str>,
    all_databases: bool,
    include_system: bool,
    resolved: &ResolvedConfig,
) -> Result<SearchScope> {
    if all_databases {
        return Ok(SearchScope::AllDatabases { include_system });
    }
    let Some(table) = table else {
        return Ok(SearchScope::Database);
    };

    let (embedded, table_name) = match table.split_once('.') {
        Some((schema_part, table_part)) => (Some(schema_part), table_part),
        None => (None, table),
    };
    let schema_name = embedded
        .or(schema)
        .map(str::to_string)
        .or_else(|| resolved.connection.default_schemas.first().cloned())
        .unwrap_or_else(|| "dbo".to_string());

    ident::validate_identifier(&schema_name)?;
    ident::validate_identifier(table_name)?;

    Ok(SearchScope::Table {
        schema: schema_name,
        table: table_name.to_string(),
    })
}

pub fn parse_limit(value: Option<u64>, default: u64, max: u64) -> u64 {
    match value {
        Some(v) if v < 1 => default,
        Some(v) if v > max => max,
        Some(v) => v,
        None => default,
    }
}

pub fn parse_offset(value: Option<u64>) -> u64 {
    // Offsets are bound into queries as i64; clamp instead of letting the
    // cast wrap to a negative page start.
    value.unwrap_or(0).min(i64::MAX as u64)
}
