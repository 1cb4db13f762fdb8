use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::env;
use std::ffi::OsStr;
use std::sync::atomic::{AtomicU32, Ordering};

pub fn integration_enabled() -> bool {
    env::var("SSGREP_INTEGRATION_TESTS")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

pub fn run_json<I, S>(args: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = cargo_bin_cmd!("ssgrep");
    cmd.args(args);
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("json")
}

static FIXTURE_COUNTER: AtomicU32 = AtomicU32::new(0);

/// A table name no other test (or earlier run) will collide with.
pub fn unique_table(prefix: &str) -> String {
    format!(
        "{}_{}_{}",
        prefix,
        std::process::id(),
        FIXTURE_COUNTER.fetch_add(1, Ordering::Relaxed)
    )
}

/// Run fixture statements in tempdb over the same settings the binary under
/// test resolves from the environment. This is the only place the suite
/// writes anything, and it never leaves tempdb.
pub fn run_tempdb_sql(statements: &[String]) {
    let overrides = ssgrep::config::CliOverrides {
        database: Some("tempdb".to_string()),
        ..Default::default()
    };
    let resolved =
        ssgrep::config::load_from_system(&overrides).expect("resolve connection settings");

    tokio::runtime::Runtime::new()
        .expect("tokio runtime")
        .block_on(async {
            let mut client = ssgrep::db::client::connect(&resolved.connection)
                .await
                .expect("connect to tempdb");
            for statement in statements {
                let stream = client
                    .simple_query(statement.as_str())
                    .await
                    .expect("run fixture statement");
                stream.into_results().await.expect("drain fixture results");
            }
        });
}
