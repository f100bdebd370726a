use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::{Value, json};

use tablespec_gx::constraints::{HINT_DESCRIPTION_EXAMPLES, HINT_LOB, HINT_STATES};
use tablespec_gx::{
    extract_column_constraints, extract_metadata_hints, extract_regex_patterns,
    extract_strftime_formats, extract_value_sets, get_constraints_for_column,
    get_regex_for_column, get_strftime_format_for_column, sample_value_for_column,
};

fn claims_suite() -> Value {
    json!({
        "name": "claims_suite",
        "expectations": [
            {
                "type": "expect_column_values_to_be_in_set",
                "kwargs": {"column": "Status", "value_set": ["A", "B", "C"]},
                "meta": {"description": "Claim status codes"}
            },
            {
                "type": "expect_column_values_to_be_in_set",
                "kwargs": {"column": "MemberKey", "value_set": ["MEMBER_ID", "X1"]}
            },
            {
                "type": "expect_column_values_to_match_regex",
                "kwargs": {"column": "ClaimId", "regex": "^[A-Z]{3}\\d{4}$"},
                "meta": {"lob": ["MD"]}
            },
            {
                "type": "expect_column_values_to_not_be_null",
                "kwargs": {"column": "ClaimId"},
                "meta": {"states": ["NY", "NJ"]}
            },
            {
                "type": "expect_column_values_to_match_strftime_format",
                "kwargs": {"column": "ServiceDate", "strftime_format": "%Y%m%d"}
            },
            {
                "type": "expect_column_values_to_be_in_set",
                "kwargs": {"column": "Lob", "value_set": ["MD"]},
                "meta": {"description": "Valid LOBs. Ex: MD, ME, MP. See notes."}
            }
        ]
    })
}

#[test]
fn value_sets_round_trip() {
    let suite = claims_suite();
    let sets = extract_value_sets(Some(&suite));
    assert_eq!(sets["Status"], vec!["A", "B", "C"]);
    assert_eq!(
        get_constraints_for_column(Some(&suite), "Status"),
        Some(vec!["A".to_string(), "B".to_string(), "C".to_string()])
    );
}

#[test]
fn placeholder_values_are_filtered() {
    let suite = claims_suite();
    assert_eq!(
        get_constraints_for_column(Some(&suite), "MemberKey"),
        Some(vec!["X1".to_string()])
    );
}

#[test]
fn only_placeholders_means_no_constraints() {
    let suite = json!({
        "expectations": [{
            "type": "expect_column_values_to_be_in_set",
            "kwargs": {"column": "Name", "value_set": ["FIRST NAME", "last name", " "]}
        }]
    });
    assert_eq!(get_constraints_for_column(Some(&suite), "Name"), None);
    assert_eq!(get_constraints_for_column(Some(&suite), "Other"), None);
}

#[test]
fn metadata_hints_merge_across_rules() {
    let suite = claims_suite();
    let hints = extract_metadata_hints(Some(&suite));
    let claim_hints = &hints["ClaimId"];
    assert_eq!(claim_hints[HINT_LOB], vec!["MD"]);
    assert_eq!(claim_hints[HINT_STATES], vec!["NY", "NJ"]);
    assert!(!hints.contains_key("ServiceDate"));
    // Hints never leak into allowed values.
    assert_eq!(get_constraints_for_column(Some(&suite), "ClaimId"), None);
}

#[test]
fn description_examples_become_hints() {
    let suite = claims_suite();
    let hints = extract_metadata_hints(Some(&suite));
    assert_eq!(hints["Lob"][HINT_DESCRIPTION_EXAMPLES], vec!["MD", "ME", "MP"]);
    // A description without an example marker contributes no hint.
    assert!(!hints.contains_key("Status"));
}

#[test]
fn later_description_without_examples_keeps_earlier_examples() {
    let suite = json!({
        "expectations": [
            {
                "type": "expect_column_values_to_not_be_null",
                "kwargs": {"column": "Lob"},
                "meta": {"description": "Line of business. Ex: MD, ME."}
            },
            {
                "type": "expect_column_to_exist",
                "kwargs": {"column": "Lob"},
                "meta": {"description": "Column must exist.", "lob": ["MD"]}
            }
        ]
    });
    let hints = extract_metadata_hints(Some(&suite));
    assert_eq!(hints["Lob"][HINT_DESCRIPTION_EXAMPLES], vec!["MD", "ME"]);
    assert_eq!(hints["Lob"][HINT_LOB], vec!["MD"]);
}

#[test]
fn later_rules_win_for_single_valued_constraints() {
    let suite = json!({
        "expectations": [
            {"type": "expect_column_values_to_be_in_set", "kwargs": {"column": "C", "value_set": ["1"]}},
            {"type": "expect_column_values_to_be_in_set", "kwargs": {"column": "C", "value_set": ["2", "3"]}},
            {"type": "expect_column_values_to_match_regex", "kwargs": {"column": "C", "regex": "^a$"}},
            {"type": "expect_column_values_to_match_regex", "kwargs": {"column": "C", "regex": "^b$"}},
            {"type": "expect_column_values_to_match_strftime_format", "kwargs": {"column": "C", "strftime_format": "%Y"}},
            {"type": "expect_column_values_to_match_strftime_format", "kwargs": {"column": "C", "strftime_format": "%m"}}
        ]
    });
    assert_eq!(extract_value_sets(Some(&suite))["C"], vec!["2", "3"]);
    assert_eq!(get_regex_for_column(Some(&suite), "C").as_deref(), Some("^b$"));
    assert_eq!(
        get_strftime_format_for_column(Some(&suite), "C").as_deref(),
        Some("%m")
    );
}

#[test]
fn missing_or_malformed_suites_yield_nothing() {
    let garbage = [
        json!({}),
        json!({"expectations": []}),
        json!({"expectations": null}),
        json!({"expectations": "oops"}),
        json!({"expectations": [1, "two", null, [3]]}),
        json!({"expectations": [{"type": 7, "kwargs": [], "meta": "x"}]}),
        json!({"expectations": [{"type": "expect_column_values_to_be_in_set"}]}),
        json!({"expectations": [{
            "type": "expect_column_values_to_be_in_set",
            "kwargs": {"column": 12, "value_set": "ABC"}
        }]}),
        json!({"expectations": [{
            "type": "expect_column_values_to_match_regex",
            "kwargs": {"column": "C", "regex": ""}
        }]}),
        json!([1, 2, 3]),
        json!("suite"),
    ];

    assert!(extract_value_sets(None).is_empty());
    assert!(extract_column_constraints(None).is_empty());
    for suite in &garbage {
        assert!(extract_value_sets(Some(suite)).is_empty(), "{suite}");
        assert!(extract_regex_patterns(Some(suite)).is_empty(), "{suite}");
        assert!(extract_strftime_formats(Some(suite)).is_empty(), "{suite}");
        assert!(extract_metadata_hints(Some(suite)).is_empty(), "{suite}");
        assert!(extract_column_constraints(Some(suite)).is_empty(), "{suite}");
    }
}

#[test]
fn column_constraints_combine_every_extraction() {
    let suite = claims_suite();
    let constraints = extract_column_constraints(Some(&suite));

    let claim = &constraints["ClaimId"];
    assert!(claim.allowed_values.is_empty());
    assert_eq!(claim.regex_pattern.as_deref(), Some("^[A-Z]{3}\\d{4}$"));
    assert_eq!(claim.metadata_hints.len(), 2);

    let member = &constraints["MemberKey"];
    assert_eq!(member.allowed_values, vec!["MEMBER_ID", "X1"]);

    let service = &constraints["ServiceDate"];
    assert_eq!(service.strftime_format.as_deref(), Some("%Y%m%d"));
    assert!(service.regex_pattern.is_none());
}

#[test]
fn samples_prefer_allowed_values_then_regex_then_dates() {
    let suite = claims_suite();
    let mut rng = ChaCha8Rng::seed_from_u64(21);
    for _ in 0..50 {
        let status = sample_value_for_column(Some(&suite), "Status", &mut rng).expect("status");
        assert!(["A", "B", "C"].contains(&status.as_str()));

        let member = sample_value_for_column(Some(&suite), "MemberKey", &mut rng).expect("member");
        assert_eq!(member, "X1");

        let claim = sample_value_for_column(Some(&suite), "ClaimId", &mut rng).expect("claim");
        assert_eq!(claim.len(), 7);
        assert!(claim[..3].chars().all(|ch| ch.is_ascii_uppercase()));
        assert!(claim[3..].chars().all(|ch| ch.is_ascii_digit()));

        let date = sample_value_for_column(Some(&suite), "ServiceDate", &mut rng).expect("date");
        assert!(chrono::NaiveDate::parse_from_str(&date, "%Y%m%d").is_ok(), "{date}");
    }
    assert_eq!(sample_value_for_column(Some(&suite), "Unknown", &mut rng), None);
    assert_eq!(sample_value_for_column(None, "Status", &mut rng), None);
}
