//! Skill affinity between a query's required tags and a candidate's tags.
//!
//! The score is a bag-of-words heuristic: a required tag counts as matched
//! when it and some candidate tag contain one another (case-insensitive),
//! so "teach" matches "Teaching" and "teaching kids" matches "teaching".
//! It is not semantic similarity and must stay plain string containment.

use crate::models::RequiredTags;

/// Lower-case the candidate's tags, dropping blanks
///
/// A blank candidate tag would be a substring of every required tag.
fn normalize(candidate_tags: &[String]) -> Vec<String> {
    candidate_tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[inline]
fn tag_matches(required: &str, candidate_tags: &[String]) -> bool {
    candidate_tags
        .iter()
        .any(|tag| tag.contains(required) || required.contains(tag.as_str()))
}

/// Required tags that the candidate covers, in sorted order
pub fn matched_tags(required: &RequiredTags, candidate_tags: &[String]) -> Vec<String> {
    if required.is_empty() {
        return Vec::new();
    }

    let candidate_tags = normalize(candidate_tags);
    required
        .iter()
        .filter(|tag| tag_matches(tag, &candidate_tags))
        .map(str::to_string)
        .collect()
}

/// Affinity score in `[0, 1]`
///
/// Returns `0.0` when nothing is required; an empty query must not lift
/// every candidate equally.
pub fn affinity(required: &RequiredTags, candidate_tags: &[String]) -> f64 {
    if required.is_empty() {
        return 0.0;
    }

    let matched = matched_tags(required, candidate_tags).len();
    matched as f64 / required.len() as f64
}
