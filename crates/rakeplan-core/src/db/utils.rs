//! Column conversion helpers shared by the query modules.

use jiff::{civil::Date, Timestamp};
use rusqlite::types::Type;

/// Wrap a parse failure as a rusqlite conversion error for column `idx`.
fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

/// Parse a stored RFC 3339 timestamp.
pub(crate) fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<Timestamp> {
    value
        .parse::<Timestamp>()
        .map_err(|e| conversion_error(idx, e))
}

/// Parse an optional stored timestamp.
pub(crate) fn parse_optional_timestamp(
    idx: usize,
    value: Option<String>,
) -> rusqlite::Result<Option<Timestamp>> {
    value.map(|v| parse_timestamp(idx, &v)).transpose()
}

/// Parse a stored `YYYY-MM-DD` date.
pub(crate) fn parse_date(idx: usize, value: &str) -> rusqlite::Result<Date> {
    value.parse::<Date>().map_err(|e| conversion_error(idx, e))
}

/// Parse a stored JSON column.
pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(
    idx: usize,
    value: &str,
) -> rusqlite::Result<T> {
    serde_json::from_str(value).map_err(|e| conversion_error(idx, e))
}

/// Parse a stored enum column through its `FromStr` implementation.
pub(crate) fn parse_enum<T>(idx: usize, value: &str) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    value.parse::<T>().map_err(|reason| {
        conversion_error(
            idx,
            std::io::Error::new(std::io::ErrorKind::InvalidData, reason),
        )
    })
}
