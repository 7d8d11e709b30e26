//! Conversions between field types and the values SQLite stores.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::types::{Type, Value};
use rust_decimal::Decimal;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const DATETIME_T_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

fn conversion_error<E>(column: usize, ty: Type, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, ty, Box::new(err))
}

pub fn date_to_sql(value: &NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

pub fn date_from_sql(column: usize, value: String) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(&value, DATE_FORMAT).map_err(|e| conversion_error(column, Type::Text, e))
}

pub fn optional_date_to_sql(value: &Option<NaiveDate>) -> Option<String> {
    value.as_ref().map(date_to_sql)
}

pub fn optional_date_from_sql(column: usize, value: Option<String>) -> rusqlite::Result<Option<NaiveDate>> {
    value.map(|v| date_from_sql(column, v)).transpose()
}

pub fn time_to_sql(value: &NaiveTime) -> String {
    value.format(TIME_FORMAT).to_string()
}

pub fn time_from_sql(column: usize, value: String) -> rusqlite::Result<NaiveTime> {
    NaiveTime::parse_from_str(&value, TIME_FORMAT).map_err(|e| conversion_error(column, Type::Text, e))
}

pub fn optional_time_to_sql(value: &Option<NaiveTime>) -> Option<String> {
    value.as_ref().map(time_to_sql)
}

pub fn optional_time_from_sql(column: usize, value: Option<String>) -> rusqlite::Result<Option<NaiveTime>> {
    value.map(|v| time_from_sql(column, v)).transpose()
}

pub fn datetime_to_sql(value: &NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

pub fn datetime_from_sql(column: usize, value: String) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&value, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(&value, DATETIME_T_FORMAT))
        .map_err(|e| conversion_error(column, Type::Text, e))
}

pub fn optional_datetime_to_sql(value: &Option<NaiveDateTime>) -> Option<String> {
    value.as_ref().map(datetime_to_sql)
}

pub fn optional_datetime_from_sql(column: usize, value: Option<String>) -> rusqlite::Result<Option<NaiveDateTime>> {
    value.map(|v| datetime_from_sql(column, v)).transpose()
}

pub fn decimal_to_sql(value: &Decimal) -> String {
    value.to_string()
}

pub fn decimal_from_sql(column: usize, value: Value) -> rusqlite::Result<Decimal> {
    match value {
        Value::Integer(i) => Ok(Decimal::from(i)),
        Value::Real(f) => Decimal::try_from(f).map_err(|e| conversion_error(column, Type::Real, e)),
        Value::Text(s) => Decimal::from_str(&s).map_err(|e| conversion_error(column, Type::Text, e)),
        other => Err(rusqlite::Error::InvalidColumnType(column, String::new(), other.data_type())),
    }
}

pub fn optional_decimal_to_sql(value: &Option<Decimal>) -> Option<String> {
    value.as_ref().map(decimal_to_sql)
}

pub fn optional_decimal_from_sql(column: usize, value: Option<Value>) -> rusqlite::Result<Option<Decimal>> {
    value.map(|v| decimal_from_sql(column, v)).transpose()
}
