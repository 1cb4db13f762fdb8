pub mod catalog;
pub mod ident;
pub mod statement;

use anyhow::Result;
use serde::Serialize;
use tiberius::Query;
use tracing::debug;

use crate::db::executor;
use crate::db::types::{ResultSet, Value};
use crate::error::{AppError, ErrorKind};

/// Where to look for matches.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchScope {
    /// One table in the connected database.
    Table { schema: String, table: String },
    /// Every base table in the connected database.
    Database,
    /// Every accessible database on the server.
    AllDatabases { include_system: bool },
}

/// A text-capable column in a base table, as enumerated from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnTarget {
    pub database: String,
    pub schema: String,
    pub table: String,
    pub column: String,
    pub data_type: String,
    pub max_length: Option<i64>,
}

/// One matched cell, labeled with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub database: String,
    pub schema: String,
    pub table: String,
    pub column: String,
    pub value: String,
}

/// The statement synthesized for one database plus the column count behind it.
#[derive(Debug, Clone)]
pub struct DatabaseStatement {
    pub database: String,
    pub sql: String,
    pub columns: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SearchPlan {
    pub statements: Vec<DatabaseStatement>,
}

impl SearchPlan {
    pub fn column_count(&self) -> usize {
        self.statements.iter().map(|s| s.columns).sum()
    }

    pub fn database_names(&self) -> Vec<String> {
        self.statements.iter().map(|s| s.database.clone()).collect()
    }
}

/// Enumerate every text-capable column the scope covers.
///
/// Targets come from the live catalog on every call; nothing is remembered
/// between searches, so a dropped column disappears from the next run. For
/// the server-wide scope each database is enumerated in turn over the same
/// connection, using three-part names instead of USE.
pub async fn enumerate_scope(
    scope: &SearchScope,
    client: &mut tiberius::Client<tokio_util::compat::Compat<tokio::net::TcpStream>>,
) -> Result<Vec<ColumnTarget>> {
    match scope {
        SearchScope::Table { schema, table } => {
            connected_database_targets(Some(schema.as_str()), Some(table.as_str()), client).await
        }
        SearchScope::Database => connected_database_targets(None, None, client).await,
        SearchScope::AllDatabases { include_system } => {
            let mut list_query = Query::new(catalog::DATABASES_SQL);
            list_query.bind(if *include_system { 1i32 } else { 0i32 });
            let sets = executor::run_query(list_query, client).await?;
            let names =
                catalog::database_names_from_rows(&sets.into_iter().next().unwrap_or_default());
            debug!("enumerating text columns across {} databases", names.len());

            let mut targets = Vec::new();
            for name in names {
                let mut query = Query::new(catalog::text_columns_sql(Some(&name))?);
                query.bind(Option::<&str>::None);
                query.bind(Option::<&str>::None);
                let sets = executor::run_query(query, client).await.map_err(|err| {
                    anyhow::Error::from(AppError::new(
                        ErrorKind::Execution,
                        format!("Column enumeration failed in database '{}': {}", name, err),
                    ))
                })?;
                let set = sets.into_iter().next().unwrap_or_default();
                targets.extend(catalog::column_targets_from_rows(&name, &set));
            }
            Ok(targets)
        }
    }
}

async fn connected_database_targets(
    schema: Option<&str>,
    table: Option<&str>,
    client: &mut tiberius::Client<tokio_util::compat::Compat<tokio::net::TcpStream>>,
) -> Result<Vec<ColumnTarget>> {
    let database = current_database(client).await?;
    let mut query = Query::new(catalog::text_columns_sql(None)?);
    query.bind(schema);
    query.bind(table);
    let sets = executor::run_query(query, client).await?;
    let set = sets.into_iter().next().unwrap_or_default();
    Ok(catalog::column_targets_from_rows(&database, &set))
}

async fn current_database(
    client: &mut tiberius::Client<tokio_util::compat::Compat<tokio::net::TcpStream>>,
) -> Result<String> {
    let sets = executor::run_query(Query::new("SELECT DB_NAME() AS [database];"), client).await?;
    let name = sets
        .first()
        .and_then(|rs| rs.rows.first())
        .and_then(|row| row.first())
        .and_then(|value| match value {
            Value::Text(s) => Some(s.clone()),
            _ => None,
        });
    name.ok_or_else(|| {
        AppError::new(ErrorKind::Internal, "Could not determine the connected database").into()
    })
}

/// Turn enumerated targets into one statement per database, preserving the
/// order targets were enumerated in.
pub fn plan_from_targets(targets: &[ColumnTarget]) -> Result<SearchPlan> {
    if targets.is_empty() {
        return Err(AppError::new(
            ErrorKind::EmptyScope,
            "No text-capable columns to search in this scope",
        )
        .into());
    }

    let mut groups: Vec<(String, Vec<ColumnTarget>)> = Vec::new();
    for target in targets {
        match groups.iter_mut().find(|(name, _)| *name == target.database) {
            Some((_, list)) => list.push(target.clone()),
            None => groups.push((target.database.clone(), vec![target.clone()])),
        }
    }

    let mut statements = Vec::with_capacity(groups.len());
    for (database, list) in groups {
        let sql = statement::build_statement(&list)?;
        statements.push(DatabaseStatement {
            database,
            sql,
            columns: list.len(),
        });
    }
    Ok(SearchPlan { statements })
}

/// Run each database's statement in turn and collect the labeled matches.
///
/// The pattern travels as the single bound parameter of every statement. A
/// database whose statement fails aborts the run with an error naming it;
/// databases that simply have no matching rows contribute nothing.
pub async fn execute_plan(
    plan: &SearchPlan,
    pattern: &str,
    client: &mut tiberius::Client<tokio_util::compat::Compat<tokio::net::TcpStream>>,
) -> Result<Vec<SearchHit>> {
    let bound = statement::contains_pattern(pattern);
    let mut hits = Vec::new();
    for stmt in &plan.statements {
        debug!(
            "searching {} columns in database '{}'",
            stmt.columns, stmt.database
        );
        let mut query = Query::new(stmt.sql.as_str());
        query.bind(bound.as_str());
        let sets = executor::run_query(query, client).await.map_err(|err| {
            anyhow::Error::from(AppError::new(
                ErrorKind::Execution,
                format!("Search failed in database '{}': {}", stmt.database, err),
            ))
        })?;
        for set in &sets {
            hits.extend(hits_from_rows(set));
        }
    }
    Ok(hits)
}

/// Map result rows onto hits. Rows arrive as (database, schema, table,
/// column, value) in the order the legs emitted them.
pub fn hits_from_rows(set: &ResultSet) -> Vec<SearchHit> {
    let mut hits = Vec::with_capacity(set.rows.len());
    for row in &set.rows {
        let text = |idx: usize| -> Option<String> {
            match row.get(idx) {
                Some(Value::Text(s)) => Some(s.clone()),
                Some(Value::Null) | None => None,
                Some(other) => Some(other.as_display()),
            }
        };
        let (Some(database), Some(schema), Some(table), Some(column)) =
            (text(0), text(1), text(2), text(3))
        else {
            continue;
        };
        hits.push(SearchHit {
            database,
            schema,
            table,
            column,
            value: text(4).unwrap_or_default(),
        });
    }
    hits
}
