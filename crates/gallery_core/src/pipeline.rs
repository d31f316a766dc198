//! Shared filter → dedup → sort stage applied after every tab predicate.

use std::{cmp::Reverse, collections::HashSet};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use shared::{PipelineOptions, Record, SortDirection, SortField};

const DATE_FORMATS: &[&str] = &["%d/%b/%Y", "%d-%b-%y", "%Y-%m-%d", "%d/%m/%Y"];

/// Runs `items` through the photo filter, the one-per-subspecies dedup and
/// the sort, in that order. Deterministic and free of side effects.
pub fn apply(items: impl IntoIterator<Item = Record>, options: &PipelineOptions) -> Vec<Record> {
    let mut results: Vec<Record> = items.into_iter().collect();

    if options.only_photos {
        results.retain(Record::has_any_photo);
    }

    if options.one_per_subspecies {
        results = one_per_subspecies_sex(results);
    }

    sort_records(&mut results, &options.sort_field, options.sort_direction);
    results
}

/// Keeps the first record seen for each `Subspecies_Form|Sex` pair.
pub fn one_per_subspecies_sex(items: Vec<Record>) -> Vec<Record> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|record| seen.insert(record.subspecies_sex_key()))
        .collect()
}

/// Stable sort; `Row Number` leaves the input order untouched.
pub fn sort_records(items: &mut [Record], field: &SortField, direction: SortDirection) {
    match (field, direction) {
        (SortField::RowNumber, _) => {}
        (SortField::PreservationDate, SortDirection::Asc) => {
            items.sort_by_cached_key(date_key);
        }
        (SortField::PreservationDate, SortDirection::Desc) => {
            items.sort_by_cached_key(|record| Reverse(date_key(record)));
        }
        (SortField::Field(name), SortDirection::Asc) => {
            items.sort_by_cached_key(|record| text_key(record, name));
        }
        (SortField::Field(name), SortDirection::Desc) => {
            items.sort_by_cached_key(|record| Reverse(text_key(record, name)));
        }
    }
}

fn date_key(record: &Record) -> NaiveDateTime {
    record
        .preservation_date()
        .and_then(|raw| parse_date(&raw))
        .unwrap_or_default()
}

fn text_key(record: &Record, field: &str) -> String {
    record.text(field).unwrap_or_default()
}

/// Parses the date spellings found in the catalogue exports. `None` for
/// anything else; callers treat that as the Unix epoch.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_utc());
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(parsed);
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
#[path = "tests/pipeline_tests.rs"]
mod tests;
