//! Constraint mining over expectation suites.
//!
//! Every function here is total: a missing suite, a suite without an
//! `expectations` list, or entries with unexpected shapes simply contribute
//! nothing. Suites are often generated upstream and partial data must not
//! block sample generation.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{Days, NaiveDate, NaiveTime};
use rand::Rng;
use serde::Serialize;
use serde_json::Value;

use crate::pattern::generate_sample_with;
use crate::suite::{
    EXPECT_COLUMN_VALUES_TO_BE_IN_SET, EXPECT_COLUMN_VALUES_TO_MATCH_REGEX,
    EXPECT_COLUMN_VALUES_TO_MATCH_STRFTIME_FORMAT, raw_expectations,
};

pub const HINT_LOB: &str = "lob";
pub const HINT_STATES: &str = "states";
pub const HINT_DESCRIPTION_EXAMPLES: &str = "description_examples";

/// Longest token accepted from a description example list.
pub const MAX_EXAMPLE_LEN: usize = 50;

/// Labels that upstream spreadsheets leak into value sets.
const PLACEHOLDER_LABELS: &[&str] = &[
    "CLIENT MBRID",
    "MEMBER_ID",
    "FIRST NAME",
    "LAST NAME",
    "MemberLastName",
    "MemberFirstName",
    "CHASE LOAD DATE",
    "LOAD DATE",
    "DATE",
];

const EXAMPLE_MARKERS: [&str; 2] = ["Ex:", "Example:"];

/// Hint kind to hint values for one column.
pub type ColumnHints = BTreeMap<String, Vec<String>>;

/// Everything the suite says about one column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnConstraints {
    /// Raw value-set entries, placeholders included.
    pub allowed_values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strftime_format: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata_hints: ColumnHints,
}

/// Column to stringified `value_set` for every in-set expectation.
///
/// The last rule for a column wins. Null entries are dropped and empty sets
/// are ignored.
pub fn extract_value_sets(suite: Option<&Value>) -> BTreeMap<String, Vec<String>> {
    let mut value_sets = BTreeMap::new();
    for expectation in raw_expectations(suite) {
        if !expectation.is(EXPECT_COLUMN_VALUES_TO_BE_IN_SET) {
            continue;
        }
        let Some(column) = expectation.column() else {
            continue;
        };
        let values: Vec<String> = expectation
            .kwargs
            .get("value_set")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(stringify)
            .collect();
        if !values.is_empty() {
            value_sets.insert(column.to_string(), values);
        }
    }
    value_sets
}

/// Column to regex for every match-regex expectation; last rule wins.
pub fn extract_regex_patterns(suite: Option<&Value>) -> BTreeMap<String, String> {
    extract_column_kwarg(suite, EXPECT_COLUMN_VALUES_TO_MATCH_REGEX, "regex")
}

/// Column to strftime format for every date-format expectation; last rule wins.
pub fn extract_strftime_formats(suite: Option<&Value>) -> BTreeMap<String, String> {
    extract_column_kwarg(
        suite,
        EXPECT_COLUMN_VALUES_TO_MATCH_STRFTIME_FORMAT,
        "strftime_format",
    )
}

fn extract_column_kwarg(
    suite: Option<&Value>,
    expectation_type: &str,
    key: &str,
) -> BTreeMap<String, String> {
    let mut found = BTreeMap::new();
    for expectation in raw_expectations(suite) {
        if !expectation.is(expectation_type) {
            continue;
        }
        if let Some(column) = expectation.column()
            && let Some(value) = expectation.kwarg_str(key)
        {
            found.insert(column.to_string(), value.to_string());
        }
    }
    found
}

/// Hints documented in expectation metadata, keyed by column.
///
/// Hints from different rules for the same column are merged by hint kind;
/// a later rule replaces only the kinds it carries.
pub fn extract_metadata_hints(suite: Option<&Value>) -> BTreeMap<String, ColumnHints> {
    let mut hints: BTreeMap<String, ColumnHints> = BTreeMap::new();
    for expectation in raw_expectations(suite) {
        let Some(column) = expectation.column() else {
            continue;
        };

        let mut found = ColumnHints::new();
        for kind in [HINT_LOB, HINT_STATES] {
            if let Some(values) = expectation.meta.get(kind).and_then(Value::as_array) {
                found.insert(kind.to_string(), values.iter().filter_map(stringify).collect());
            }
        }
        if let Some(description) = expectation.meta.get("description").and_then(Value::as_str) {
            let examples = extract_description_examples(description);
            // An example-free description keeps examples from earlier rules.
            if !examples.is_empty() {
                found.insert(HINT_DESCRIPTION_EXAMPLES.to_string(), examples);
            }
        }

        if !found.is_empty() {
            hints.entry(column.to_string()).or_default().extend(found);
        }
    }
    hints
}

/// Values listed after `Ex:` (or `Example:`) up to the next full stop.
///
/// `"Valid LOBs. Ex: MD, ME, MP. See notes."` yields `["MD", "ME", "MP"]`.
pub fn extract_description_examples(description: &str) -> Vec<String> {
    let Some(fragment) = EXAMPLE_MARKERS
        .iter()
        .find_map(|marker| description.split(marker).nth(1))
    else {
        return Vec::new();
    };
    let sentence = fragment.split('.').next().unwrap_or_default();
    sentence
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty() && token.chars().count() <= MAX_EXAMPLE_LEN)
        .map(str::to_string)
        .collect()
}

/// Allowed values for `column`, with placeholder entries removed.
///
/// Only value-set rules count; metadata hints describe where a rule applies,
/// not what the column holds. `None` when nothing survives.
pub fn get_constraints_for_column(suite: Option<&Value>, column: &str) -> Option<Vec<String>> {
    let values = extract_value_sets(suite).remove(column)?;
    let filtered: Vec<String> = values
        .into_iter()
        .filter(|value| !looks_like_column_name(value))
        .collect();
    (!filtered.is_empty()).then_some(filtered)
}

/// Whether `value` reads like a column label rather than data.
pub fn looks_like_column_name(value: &str) -> bool {
    if value.trim().is_empty() {
        return true;
    }
    let upper = value.to_uppercase();
    if PLACEHOLDER_LABELS
        .iter()
        .any(|label| label.to_uppercase() == upper)
    {
        return true;
    }
    value.contains('_') && upper == value && value.split_whitespace().count() <= 4
}

pub fn get_regex_for_column(suite: Option<&Value>, column: &str) -> Option<String> {
    extract_regex_patterns(suite).remove(column)
}

pub fn get_strftime_format_for_column(suite: Option<&Value>, column: &str) -> Option<String> {
    extract_strftime_formats(suite).remove(column)
}

/// All constraints in the suite, grouped per column.
pub fn extract_column_constraints(suite: Option<&Value>) -> BTreeMap<String, ColumnConstraints> {
    let mut constraints: BTreeMap<String, ColumnConstraints> = BTreeMap::new();
    for (column, values) in extract_value_sets(suite) {
        constraints.entry(column).or_default().allowed_values = values;
    }
    for (column, regex) in extract_regex_patterns(suite) {
        constraints.entry(column).or_default().regex_pattern = Some(regex);
    }
    for (column, format) in extract_strftime_formats(suite) {
        constraints.entry(column).or_default().strftime_format = Some(format);
    }
    for (column, hints) in extract_metadata_hints(suite) {
        constraints.entry(column).or_default().metadata_hints = hints;
    }
    tracing::debug!(event = "constraints_extracted", columns = constraints.len());
    constraints
}

/// Produce one plausible value for `column`.
///
/// Preference order: a random surviving allowed value, then a sample
/// synthesized from the column regex, then a random date rendered with the
/// column strftime format. `None` when the suite says nothing usable.
pub fn sample_value_for_column<R: Rng + ?Sized>(
    suite: Option<&Value>,
    column: &str,
    rng: &mut R,
) -> Option<String> {
    if let Some(values) = get_constraints_for_column(suite, column) {
        return Some(values[rng.random_range(0..values.len())].clone());
    }
    if let Some(regex) = get_regex_for_column(suite, column) {
        return Some(generate_sample_with(&regex, rng));
    }
    let format = get_strftime_format_for_column(suite, column)?;
    let sample = sample_formatted_datetime(&format, rng);
    if sample.is_none() {
        tracing::warn!(
            event = "strftime_format_unusable",
            column = %column,
            format = %format
        );
    }
    sample
}

const SAMPLE_DATE_SPAN_DAYS: u64 = 365 * 30;

/// Random instant between 2000-01-01 and roughly 2030, rendered with `format`.
///
/// Formats chrono cannot parse, or that need data a naive datetime lacks such
/// as a UTC offset, yield `None`.
fn sample_formatted_datetime<R: Rng + ?Sized>(format: &str, rng: &mut R) -> Option<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(2000, 1, 1)?
        .checked_add_days(Days::new(rng.random_range(0..=SAMPLE_DATE_SPAN_DAYS)))?;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(rng.random_range(0..86_400), 0)?;
    let mut rendered = String::new();
    write!(rendered, "{}", date.and_time(time).format_with_items(items.iter())).ok()?;
    Some(rendered)
}

fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        other => Some(other.to_string()),
    }
}
