//! Expectation suite documents.
//!
//! Suites written by tablespec use the typed [`ExpectationSuite`]. Suites read
//! back from disk are frequently produced by other tools, so extraction works
//! over raw [`Value`] documents through [`raw_expectations`], which tolerates
//! missing or mistyped fields.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const EXPECT_TABLE_COLUMN_COUNT_TO_EQUAL: &str = "expect_table_column_count_to_equal";
pub const EXPECT_TABLE_COLUMNS_TO_MATCH_ORDERED_LIST: &str =
    "expect_table_columns_to_match_ordered_list";
pub const EXPECT_COLUMN_TO_EXIST: &str = "expect_column_to_exist";
pub const EXPECT_COLUMN_VALUES_TO_BE_OF_TYPE: &str = "expect_column_values_to_be_of_type";
pub const EXPECT_COLUMN_VALUES_TO_NOT_BE_NULL: &str = "expect_column_values_to_not_be_null";
pub const EXPECT_COLUMN_VALUE_LENGTHS_TO_BE_BETWEEN: &str =
    "expect_column_value_lengths_to_be_between";
pub const EXPECT_COLUMN_VALUES_TO_BE_UNIQUE: &str = "expect_column_values_to_be_unique";
pub const EXPECT_COLUMN_VALUES_TO_BE_IN_SET: &str = "expect_column_values_to_be_in_set";
pub const EXPECT_COLUMN_VALUES_TO_MATCH_REGEX: &str = "expect_column_values_to_match_regex";
pub const EXPECT_COLUMN_VALUES_TO_MATCH_STRFTIME_FORMAT: &str =
    "expect_column_values_to_match_strftime_format";

/// A single declarative data-quality rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expectation {
    #[serde(rename = "type")]
    pub expectation_type: String,
    #[serde(default)]
    pub kwargs: Map<String, Value>,
    #[serde(default)]
    pub meta: Map<String, Value>,
}

impl Expectation {
    pub fn new(expectation_type: impl Into<String>) -> Self {
        Self {
            expectation_type: expectation_type.into(),
            kwargs: Map::new(),
            meta: Map::new(),
        }
    }

    pub fn kwarg(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.kwargs.insert(key.to_string(), value.into());
        self
    }

    pub fn meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.meta.insert(key.to_string(), value.into());
        self
    }

    /// Target column, when the rule applies to a single column.
    pub fn column(&self) -> Option<&str> {
        self.kwargs.get("column").and_then(Value::as_str)
    }
}

/// Named collection of expectations for one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectationSuite {
    pub name: String,
    #[serde(default)]
    pub meta: Map<String, Value>,
    #[serde(default)]
    pub expectations: Vec<Expectation>,
}

impl ExpectationSuite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meta: Map::new(),
            expectations: Vec::new(),
        }
    }

    /// Untyped form accepted by the constraint extractors.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    pub fn to_yaml(&self) -> serde_yaml::Result<String> {
        serde_yaml::to_string(self)
    }
}

static EMPTY_MAP: LazyLock<Map<String, Value>> = LazyLock::new(Map::new);

/// Borrowed view of one expectation inside an untrusted suite document.
///
/// Missing `kwargs` or `meta` read as empty maps and a missing `type` reads
/// as the empty string.
#[derive(Debug, Clone, Copy)]
pub struct RawExpectation<'a> {
    pub expectation_type: &'a str,
    pub kwargs: &'a Map<String, Value>,
    pub meta: &'a Map<String, Value>,
}

impl<'a> RawExpectation<'a> {
    pub fn is(&self, expectation_type: &str) -> bool {
        self.expectation_type == expectation_type
    }

    /// Non-empty `kwargs.column`.
    pub fn column(&self) -> Option<&'a str> {
        self.kwarg_str("column")
    }

    /// Non-empty string-valued kwarg.
    pub fn kwarg_str(&self, key: &str) -> Option<&'a str> {
        self.kwargs
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// Iterate the well-formed entries of `suite["expectations"]`.
///
/// A missing suite, a missing or non-list `expectations` key and non-mapping
/// entries all contribute nothing.
pub fn raw_expectations(suite: Option<&Value>) -> impl Iterator<Item = RawExpectation<'_>> {
    suite
        .and_then(|suite| suite.get("expectations"))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|entry| {
            let entry = entry.as_object()?;
            Some(RawExpectation {
                expectation_type: entry.get("type").and_then(Value::as_str).unwrap_or_default(),
                kwargs: entry
                    .get("kwargs")
                    .and_then(Value::as_object)
                    .unwrap_or(&EMPTY_MAP),
                meta: entry
                    .get("meta")
                    .and_then(Value::as_object)
                    .unwrap_or(&EMPTY_MAP),
            })
        })
}
