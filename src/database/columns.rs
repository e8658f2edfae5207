use rusqlite::Row;
use rusqlite::types::Type;

/// Reads a TEXT column holding an enum tag.
pub fn parse_tag<T>(row: &Row, idx: usize, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unexpected value '{}'", raw).into(),
        )
    })
}
