//! Record parser: raw EONET records to typed [`Category`] and [`Event`] values.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::error::ParseError;
use super::types::{RawCategory, RawEvent};
use crate::model::{Category, Event};

/// Parse an RFC 3339 / ISO-8601 timestamp into UTC.
fn parse_timestamp(field: &'static str, raw: &str) -> Result<DateTime<Utc>, ParseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ParseError::invalid(field, format!("{raw:?}: {e}")))
}

fn decode<T: serde::de::DeserializeOwned>(raw: &Value) -> Result<T, ParseError> {
    if !raw.is_object() {
        return Err(ParseError::NotAnObject);
    }
    T::deserialize(raw).map_err(|e| ParseError::invalid("record", e.to_string()))
}

/// Convert a raw category record.
pub fn parse_category(raw: &Value) -> Result<Category, ParseError> {
    let record: RawCategory = decode(raw)?;

    let id = record
        .id
        .map(|id| id.into_string())
        .ok_or(ParseError::MissingField("id"))?;
    let name = record.title.ok_or(ParseError::MissingField("title"))?;

    Ok(Category {
        id,
        name,
        description: record.description.unwrap_or_default(),
        link: record.link,
        events: Vec::new(),
    })
}

/// Convert a raw event record.
///
/// The ordering date is the record's `date` field, falling back to the first
/// geometry entry as reported by the live API.
pub fn parse_event(raw: &Value) -> Result<Event, ParseError> {
    let record: RawEvent = decode(raw)?;

    let id = record
        .id
        .map(|id| id.into_string())
        .ok_or(ParseError::MissingField("id"))?;
    let title = record.title.ok_or(ParseError::MissingField("title"))?;

    let date = match record.date {
        Some(date) => parse_timestamp("date", &date)?,
        None => {
            let first = record
                .geometry
                .into_iter()
                .next()
                .and_then(|g| g.date)
                .ok_or(ParseError::MissingField("date"))?;
            parse_timestamp("geometry.date", &first)?
        }
    };

    let closed = record
        .closed
        .as_deref()
        .map(|c| parse_timestamp("closed", c))
        .transpose()?;

    Ok(Event {
        id,
        title,
        description: record.description.unwrap_or_default(),
        closed,
        categories: record
            .categories
            .into_iter()
            .map(|c| c.into_id())
            .collect(),
        date,
    })
}

/// Parse a batch of category records, dropping the malformed ones.
///
/// Categories are returned sorted by name.
pub fn parse_categories(raw: &[Value]) -> Vec<Category> {
    let mut categories: Vec<Category> = raw
        .iter()
        .filter_map(|record| match parse_category(record) {
            Ok(category) => Some(category),
            Err(e) => {
                tracing::debug!(error = %e, "Dropping malformed category record");
                None
            }
        })
        .collect();
    categories.sort_by(|a, b| a.name.cmp(&b.name));
    categories
}

/// Parse a batch of event records, dropping the malformed ones.
pub fn parse_events(raw: &[Value]) -> Vec<Event> {
    raw.iter()
        .filter_map(|record| match parse_event(record) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::debug!(error = %e, "Dropping malformed event record");
                None
            }
        })
        .collect()
}
