//! Timeline transformer: events grouped under their day key.

use serde_json::Value;
use tracing::warn;

use crate::error::IngestionResult;
use crate::ingestion::record::Cell;
use crate::mapping::{ResolvedRow, fields};
use crate::types::{TimelineData, TimelineDay, TimelineEvent, TimelineSummary, TimelineTag};

use super::{calendar, tree};

/// Group one event per row under its day.
///
/// `dates` gives the day key (normalised to `YYYY-MM-DD` when it parses), `times` the event time,
/// and `summaries`, `types`, `authors`, `descriptions` the event fields. `tags` is a comma separated
/// list. The first non-blank `titles` cell of a day becomes its summary title.
pub fn from_rows(rows: &[ResolvedRow]) -> TimelineData {
    let mut data = TimelineData::default();
    for (n, row) in rows.iter().enumerate() {
        let cell = row
            .get(fields::DATES)
            .and_then(|r| r.first())
            .cloned()
            .unwrap_or(Cell::Empty);
        if cell.is_empty() {
            warn!(row = n + 1, "skipping timeline row without a date");
            continue;
        }
        let key = calendar::calendar_date(&cell).unwrap_or_else(|| cell.to_text());

        let tags: Vec<TimelineTag> = row
            .texts(fields::TAGS)
            .iter()
            .flat_map(|t| t.split(','))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|name| TimelineTag {
                name: name.to_string(),
            })
            .collect();

        let day = data.days.entry(key).or_default();
        if day.summary.is_none() {
            day.summary = row
                .text(fields::TITLES)
                .map(|title| TimelineSummary { title });
        }
        day.events.push(TimelineEvent {
            summary: row.text_or_default(fields::SUMMARIES),
            date: row.text_or_default(fields::TIMES),
            kind: row.text_or_default(fields::TYPES),
            author: row.text_or_default(fields::AUTHORS),
            tags: (!tags.is_empty()).then_some(tags),
            description: row.text(fields::DESCRIPTIONS),
        });
    }
    data
}

/// Read repeated `<day>` elements, each with a `<date>`, an optional `<summary><title>` and
/// repeated `<events>`.
pub fn from_tree(data: &Value) -> IngestionResult<TimelineData> {
    let mut out = TimelineData::default();
    for day in tree::all(data, "day") {
        let Some(key) = tree::field_text(day, "date") else {
            warn!("skipping timeline day without a date");
            continue;
        };
        let summary = tree::first(day, "summary")
            .and_then(|s| tree::field_text(s, "title"))
            .map(|title| TimelineSummary { title });
        let events = tree::all(day, "events")
            .iter()
            .map(|e| {
                let tags: Vec<TimelineTag> = tree::all(e, "tags")
                    .iter()
                    .filter_map(|t| tree::field_text(t, "name").or_else(|| tree::value_text(t)))
                    .filter(|name| !name.is_empty())
                    .map(|name| TimelineTag { name })
                    .collect();
                TimelineEvent {
                    summary: tree::field_text(e, "summary").unwrap_or_default(),
                    date: tree::field_text(e, "date").unwrap_or_default(),
                    kind: tree::field_text(e, "type").unwrap_or_default(),
                    author: tree::field_text(e, "author").unwrap_or_default(),
                    tags: (!tags.is_empty()).then_some(tags),
                    description: tree::field_text(e, "description"),
                }
            })
            .collect::<Vec<_>>();

        let entry: &mut TimelineDay = out.days.entry(key).or_default();
        if entry.summary.is_none() {
            entry.summary = summary;
        }
        entry.events.extend(events);
    }
    Ok(out)
}
