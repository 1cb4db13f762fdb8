use anyhow::Result;
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

use crate::db::types::{Column, ResultSet, Value};
use crate::error::{AppError, ErrorKind};

pub async fn run_query(
    query: tiberius::Query<'_>,
    client: &mut tiberius::Client<tokio_util::compat::Compat<tokio::net::TcpStream>>,
) -> Result<Vec<ResultSet>> {
    let stream = query
        .query(client)
        .await
        .map_err(|err| AppError::new(ErrorKind::Execution, err.to_string()))?;
    collect_result_sets(stream).await
}

pub async fn collect_result_sets(stream: tiberius::QueryStream<'_>) -> Result<Vec<ResultSet>> {
    let result_sets = stream
        .into_results()
        .await
        .map_err(|err| AppError::new(ErrorKind::Execution, err.to_string()))?;
    let mut output = Vec::new();

    for rows in result_sets {
        let columns = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|col| Column::new(col.name()))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let values = row.cells().map(|(_, data)| map_column_data(data)).collect();
            records.push(values);
        }

        output.push(ResultSet {
            columns,
            rows: records,
        });
    }

    Ok(output)
}

fn map_column_data(data: &tiberius::ColumnData<'_>) -> Value {
    use tiberius::ColumnData::*;
    match data {
        U8(value) => value.map(|v| Value::Int(v as i64)).unwrap_or(Value::Null),
        I16(value) => value.map(|v| Value::Int(v as i64)).unwrap_or(Value::Null),
        I32(value) => value.map(|v| Value::Int(v as i64)).unwrap_or(Value::Null),
        I64(value) => value.map(Value::Int).unwrap_or(Value::Null),
        F32(value) => value.map(|v| Value::Float(v as f64)).unwrap_or(Value::Null),
        F64(value) => value.map(Value::Float).unwrap_or(Value::Null),
        Bit(value) => value.map(Value::Bool).unwrap_or(Value::Null),
        String(value) => value
            .as_ref()
            .map(|v| Value::Text(v.to_string()))
            .unwrap_or(Value::Null),
        Guid(value) => value
            .as_ref()
            .map(|v| Value::Text(v.to_string()))
            .unwrap_or(Value::Null),
        Binary(value) => value
            .as_ref()
            .map(|v| Value::Text(format!("{:?}", v)))
            .unwrap_or(Value::Null),
        Numeric(value) => value
            .as_ref()
            .map(|v| Value::Text(v.to_string()))
            .unwrap_or(Value::Null),
        Xml(value) => value
            .as_ref()
            .map(|v| Value::Text(v.to_string()))
            .unwrap_or(Value::Null),
        // Legacy datetime: days since 1900-01-01, fragments in 1/300ths of a
        // second.
        DateTime(value) => value
            .as_ref()
            .and_then(|v| {
                let date = date_from_1900(v.days() as i64)?;
                let time =
                    NaiveTime::from_num_seconds_from_midnight_opt(v.seconds_fragments() / 300, 0)?;
                Some(Value::Text(
                    NaiveDateTime::new(date, time)
                        .format("%Y-%m-%d %H:%M:%S")
                        .to_string(),
                ))
            })
            .unwrap_or(Value::Null),
        // Smalldatetime carries minutes in the fragments field.
        SmallDateTime(value) => value
            .as_ref()
            .and_then(|v| {
                let date = date_from_1900(v.days() as i64)?;
                let time = NaiveTime::from_num_seconds_from_midnight_opt(
                    u32::from(v.seconds_fragments()) * 60,
                    0,
                )?;
                Some(Value::Text(
                    NaiveDateTime::new(date, time)
                        .format("%Y-%m-%d %H:%M:00")
                        .to_string(),
                ))
            })
            .unwrap_or(Value::Null),
        #[cfg(feature = "tds73")]
        Time(value) => value
            .as_ref()
            .and_then(|v| {
                Some(Value::Text(
                    time_from_tds(*v)?.format("%H:%M:%S%.f").to_string(),
                ))
            })
            .unwrap_or(Value::Null),
        #[cfg(feature = "tds73")]
        Date(value) => value
            .as_ref()
            .and_then(|v| {
                Some(Value::Text(
                    date_from_ce(v.days() as i64)?.format("%Y-%m-%d").to_string(),
                ))
            })
            .unwrap_or(Value::Null),
        #[cfg(feature = "tds73")]
        DateTime2(value) => value
            .as_ref()
            .and_then(|v| {
                let date = date_from_ce(v.date().days() as i64)?;
                let time = time_from_tds(v.time())?;
                Some(Value::Text(
                    NaiveDateTime::new(date, time)
                        .format("%Y-%m-%d %H:%M:%S%.f")
                        .to_string(),
                ))
            })
            .unwrap_or(Value::Null),
        #[cfg(feature = "tds73")]
        DateTimeOffset(value) => value
            .as_ref()
            .and_then(|v| {
                let date = date_from_ce(v.datetime2().date().days() as i64)?;
                let time = time_from_tds(v.datetime2().time())?;
                let offset = v.offset();
                let sign = if offset >= 0 { '+' } else { '-' };
                let abs = offset.abs();
                Some(Value::Text(format!(
                    "{} {} {}{:02}:{:02}",
                    date.format("%Y-%m-%d"),
                    time.format("%H:%M:%S%.f"),
                    sign,
                    abs / 60,
                    abs % 60
                )))
            })
            .unwrap_or(Value::Null),
    }
}

fn date_from_1900(days: i64) -> Option<NaiveDate> {
    let epoch = NaiveDate::from_ymd_opt(1900, 1, 1)?;
    if days >= 0 {
        epoch.checked_add_days(Days::new(days as u64))
    } else {
        epoch.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

/// TDS 7.3 date types count days from 0001-01-01; chrono's day 1 is the same
/// date, hence the off-by-one.
#[cfg(feature = "tds73")]
fn date_from_ce(days: i64) -> Option<NaiveDate> {
    let days = i32::try_from(days).ok()?;
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(1)?)
}

#[cfg(feature = "tds73")]
fn time_from_tds(time: tiberius::time::Time) -> Option<NaiveTime> {
    let exp = 9u32.checked_sub(u32::from(time.scale()))?;
    let nanos = time.increments().checked_mul(10u64.checked_pow(exp)?)?;
    let secs = u32::try_from(nanos / 1_000_000_000).ok()?;
    let frac = (nanos % 1_000_000_000) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, frac)
}
