use std::path::Path;

use anyhow::{Context, Result};

use crate::db::types::ResultSet;

pub fn write_result_set(path: &Path, result_set: &ResultSet) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create CSV file {}", path.display()))?;
    let headers = result_set
        .columns
        .iter()
        .map(|col| col.name.as_str())
        .collect::<Vec<_>>();
    writer.write_record(headers)?;
    for row in &result_set.rows {
        let record = row.iter().map(|value| value.as_csv()).collect::<Vec<_>>();
        writer.write_record(record)?;
    }
    writer.flush()?;
    Ok(())
}
