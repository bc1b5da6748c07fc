use anyhow::Result;
use chrono::{Days, NaiveDate};

use crate::db::types::{Column, ResultSet, Value};
use crate::error::{AppError, ErrorKind};

pub async fn collect_result_sets(stream: tiberius::QueryStream<'_>) -> Result<Vec<ResultSet>> {
    let result_sets = stream
        .into_results()
        .await
        .map_err(|err| AppError::new(ErrorKind::Query, err.to_string()))?;

    Ok(result_sets
        .into_iter()
        .map(|rows| {
            let columns = match rows.first() {
                Some(row) => row
                    .columns()
                    .iter()
                    .map(|col| Column::named(col.name()))
                    .collect(),
                None => Vec::new(),
            };
            let rows = rows
                .iter()
                .map(|row| row.cells().map(|(_, data)| map_column_data(data)).collect())
                .collect();
            ResultSet { columns, rows }
        })
        .collect())
}

fn opt<T>(value: Option<T>, f: impl FnOnce(T) -> Value) -> Value {
    value.map(f).unwrap_or(Value::Null)
}

fn opt_ref<T>(value: &Option<T>, f: impl FnOnce(&T) -> Value) -> Value {
    value.as_ref().map(f).unwrap_or(Value::Null)
}

fn map_column_data(data: &tiberius::ColumnData<'_>) -> Value {
    use tiberius::ColumnData::*;
    match data {
        U8(value) => opt(*value, |v| Value::Int(v as i64)),
        I16(value) => opt(*value, |v| Value::Int(v as i64)),
        I32(value) => opt(*value, |v| Value::Int(v as i64)),
        I64(value) => opt(*value, Value::Int),
        F32(value) => opt(*value, |v| Value::Float(v as f64)),
        F64(value) => opt(*value, Value::Float),
        Bit(value) => opt(*value, Value::Bool),
        String(value) => opt_ref(value, |v| Value::Text(v.to_string())),
        Guid(value) => opt_ref(value, |v| Value::Text(v.to_string())),
        Binary(value) => opt_ref(value, |v| Value::Text(hex_literal(v))),
        Numeric(value) => opt_ref(value, |v| Value::Text(v.to_string())),
        Xml(value) => opt_ref(value, |v| Value::Text(v.to_string())),
        // days since 1900-01-01, seconds_fragments in 1/300th seconds
        DateTime(value) => opt_ref(value, |v| {
            let date = date_from_1900(v.days() as i64);
            let total_secs = v.seconds_fragments() / 300;
            Value::Text(format!(
                "{} {:02}:{:02}:{:02}",
                date.format("%Y-%m-%d"),
                total_secs / 3600,
                (total_secs % 3600) / 60,
                total_secs % 60
            ))
        }),
        // days since 1900-01-01, seconds_fragments in minutes
        SmallDateTime(value) => opt_ref(value, |v| {
            let date = date_from_1900(v.days() as i64);
            let total_mins = v.seconds_fragments();
            Value::Text(format!(
                "{} {:02}:{:02}:00",
                date.format("%Y-%m-%d"),
                total_mins / 60,
                total_mins % 60
            ))
        }),
        #[cfg(feature = "tds73")]
        Time(value) => opt(*value, |v| Value::Text(format_tds_time(v))),
        #[cfg(feature = "tds73")]
        Date(value) => opt(*value, |v| {
            Value::Text(date_from_year1(v.days() as i64).format("%Y-%m-%d").to_string())
        }),
        #[cfg(feature = "tds73")]
        DateTime2(value) => opt(*value, |v| {
            let date = date_from_year1(v.date().days() as i64);
            Value::Text(format!(
                "{} {}",
                date.format("%Y-%m-%d"),
                format_tds_time(v.time())
            ))
        }),
        #[cfg(feature = "tds73")]
        DateTimeOffset(value) => opt(*value, |v| {
            let date = date_from_year1(v.datetime2().date().days() as i64);
            let time = format_tds_time(v.datetime2().time());
            let offset_mins = v.offset();
            let sign = if offset_mins >= 0 { '+' } else { '-' };
            let abs_mins = offset_mins.abs();
            Value::Text(format!(
                "{} {} {}{:02}:{:02}",
                date.format("%Y-%m-%d"),
                time,
                sign,
                abs_mins / 60,
                abs_mins % 60
            ))
        }),
    }
}

fn hex_literal(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold("0x".to_string(), |mut out, byte| {
        let _ = write!(out, "{:02X}", byte);
        out
    })
}

/// TDS legacy datetime epoch.
fn date_from_1900(days: i64) -> NaiveDate {
    epoch_plus_days(NaiveDate::from_ymd_opt(1900, 1, 1).expect("valid epoch"), days)
}

/// TDS 7.3 date types count days from 0001-01-01.
#[cfg(feature = "tds73")]
fn date_from_year1(days: i64) -> NaiveDate {
    epoch_plus_days(NaiveDate::from_ymd_opt(1, 1, 1).expect("valid epoch"), days)
}

fn epoch_plus_days(base: NaiveDate, days: i64) -> NaiveDate {
    if days < 0 {
        return base;
    }
    base.checked_add_days(Days::new(days as u64)).unwrap_or(base)
}

#[cfg(feature = "tds73")]
fn format_tds_time(time: tiberius::time::Time) -> String {
    let nanos = time.increments() * 10u64.pow(9 - time.scale() as u32);
    let total_secs = nanos / 1_000_000_000;
    let frac_nanos = nanos % 1_000_000_000;
    let base = format!(
        "{:02}:{:02}:{:02}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60
    );
    if frac_nanos == 0 {
        return base;
    }
    let frac = format!("{:09}", frac_nanos);
    format!("{}.{}", base, frac.trim_end_matches('0'))
}
