use std::collections::HashMap;

use crate::models::{ContributionEvent, LeaderboardEntry};

#[derive(Debug)]
struct Totals<'a> {
    subject_id: &'a str,
    display_name: Option<&'a str>,
    hours: f64,
}

/// Aggregate contribution events into a ranked leaderboard
///
/// Sums hours per subject, orders by total descending, breaks ties by
/// subject id ascending and keeps the first `top_n`. Ranks are sequential
/// with no shared positions. Each call is a full recompute from `events`;
/// nothing is carried over from earlier runs.
///
/// Hours are expected to be finite and non-negative; sources are
/// responsible for dropping anything else.
pub fn aggregate(events: &[ContributionEvent], top_n: usize) -> Vec<LeaderboardEntry> {
    if top_n == 0 || events.is_empty() {
        return Vec::new();
    }

    let mut by_subject: HashMap<&str, Totals<'_>> = HashMap::new();
    for event in events {
        let totals = by_subject
            .entry(event.subject_id.as_str())
            .or_insert_with(|| Totals {
                subject_id: event.subject_id.as_str(),
                display_name: None,
                hours: 0.0,
            });

        totals.hours += event.hours;
        if totals.display_name.is_none() {
            totals.display_name = event
                .display_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty());
        }
    }

    let mut ranked: Vec<Totals<'_>> = by_subject.into_values().collect();
    ranked.sort_by(|a, b| {
        b.hours
            .total_cmp(&a.hours)
            .then_with(|| a.subject_id.cmp(b.subject_id))
    });

    ranked
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(index, totals)| LeaderboardEntry {
            subject_id: totals.subject_id.to_string(),
            display_name: totals.display_name.map(str::to_string),
            total_hours: totals.hours,
            rank: index + 1,
        })
        .collect()
}
