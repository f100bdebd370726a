use tablespec_core::{ColumnProfiling, Umf};
use tablespec_gx::suite::{
    EXPECT_COLUMN_TO_EXIST, EXPECT_COLUMN_VALUE_LENGTHS_TO_BE_BETWEEN,
    EXPECT_COLUMN_VALUES_TO_BE_OF_TYPE, EXPECT_COLUMN_VALUES_TO_BE_UNIQUE,
    EXPECT_COLUMN_VALUES_TO_MATCH_STRFTIME_FORMAT, EXPECT_COLUMN_VALUES_TO_NOT_BE_NULL,
    EXPECT_TABLE_COLUMN_COUNT_TO_EQUAL, EXPECT_TABLE_COLUMNS_TO_MATCH_ORDERED_LIST,
};
use tablespec_gx::{
    Expectation, Strictness, build_expectation_suite, extract_strftime_formats,
    generate_baseline_expectations, load_expectations_for_table, save_expectation_suite,
    suite_path,
};

const MEMBERS_UMF: &str = r#"
version: "1.0"
table_name: Members
columns:
  - name: MEMBER_KEY
    data_type: VARCHAR
    length: 12
    nullable:
      MD: false
      MP: false
      ME: true
  - name: BIRTH_DATE
    data_type: DATE
    nullable: false
  - name: PLAN_CODE
    data_type: VARCHAR
"#;

fn members() -> Umf {
    serde_yaml::from_str(MEMBERS_UMF).expect("umf fixture")
}

fn profiled_members() -> Umf {
    let yaml = format!(
        "{MEMBERS_UMF}profiling_metadata:\n  profiled_at: \"2026-01-05T10:00:00Z\"\n  tool: pulseflow-profiler\n  version: \"1.0.0\"\n  total_rows: 500\n"
    );
    let mut umf: Umf = serde_yaml::from_str(&yaml).expect("profiled fixture");
    let profiling = |completeness: f64, distinct: u64| -> ColumnProfiling {
        serde_json::from_value(serde_json::json!({
            "completeness": completeness,
            "approximate_num_distinct": distinct
        }))
        .expect("profiling")
    };
    umf.columns[0].profiling = Some(profiling(1.0, 500));
    umf.columns[2].profiling = Some(profiling(0.9, 500));
    umf
}

fn types_for<'a>(expectations: &'a [Expectation], column: &str) -> Vec<&'a str> {
    expectations
        .iter()
        .filter(|expectation| expectation.column() == Some(column))
        .map(|expectation| expectation.expectation_type.as_str())
        .collect()
}

#[test]
fn structural_rules_lead_the_baseline() {
    let expectations = generate_baseline_expectations(&members(), true);
    assert_eq!(expectations[0].expectation_type, EXPECT_TABLE_COLUMN_COUNT_TO_EQUAL);
    assert_eq!(expectations[0].kwargs["value"], 3);
    assert_eq!(
        expectations[1].expectation_type,
        EXPECT_TABLE_COLUMNS_TO_MATCH_ORDERED_LIST
    );
    assert_eq!(
        expectations[1].kwargs["column_list"],
        serde_json::json!(["MEMBER_KEY", "BIRTH_DATE", "PLAN_CODE"])
    );
    assert!(
        expectations
            .iter()
            .all(|expectation| expectation.meta["generated_from"] == "baseline")
    );

    let without = generate_baseline_expectations(&members(), false);
    assert_eq!(without.len(), expectations.len() - 2);
}

#[test]
fn column_rules_follow_umf_metadata() {
    let expectations = generate_baseline_expectations(&members(), false);

    assert_eq!(
        types_for(&expectations, "MEMBER_KEY"),
        vec![
            EXPECT_COLUMN_TO_EXIST,
            EXPECT_COLUMN_VALUES_TO_BE_OF_TYPE,
            EXPECT_COLUMN_VALUES_TO_NOT_BE_NULL,
            EXPECT_COLUMN_VALUE_LENGTHS_TO_BE_BETWEEN,
        ]
    );
    assert_eq!(
        types_for(&expectations, "BIRTH_DATE"),
        vec![
            EXPECT_COLUMN_TO_EXIST,
            EXPECT_COLUMN_VALUES_TO_BE_OF_TYPE,
            EXPECT_COLUMN_VALUES_TO_NOT_BE_NULL,
            EXPECT_COLUMN_VALUES_TO_MATCH_STRFTIME_FORMAT,
        ]
    );
    assert_eq!(
        types_for(&expectations, "PLAN_CODE"),
        vec![EXPECT_COLUMN_TO_EXIST, EXPECT_COLUMN_VALUES_TO_BE_OF_TYPE]
    );

    let not_null = expectations
        .iter()
        .find(|expectation| {
            expectation.expectation_type == EXPECT_COLUMN_VALUES_TO_NOT_BE_NULL
                && expectation.column() == Some("MEMBER_KEY")
        })
        .expect("not-null rule");
    assert_eq!(not_null.meta["lob"], serde_json::json!(["MD", "MP"]));

    let length = expectations
        .iter()
        .find(|expectation| expectation.expectation_type == EXPECT_COLUMN_VALUE_LENGTHS_TO_BE_BETWEEN)
        .expect("length rule");
    assert_eq!(length.kwargs["max_value"], 12);

    let date_type = expectations
        .iter()
        .find(|expectation| {
            expectation.expectation_type == EXPECT_COLUMN_VALUES_TO_BE_OF_TYPE
                && expectation.column() == Some("BIRTH_DATE")
        })
        .expect("type rule");
    assert_eq!(date_type.kwargs["type_"], "StringType");
}

#[test]
fn suite_carries_table_metadata() {
    let suite = build_expectation_suite(&members(), "specs/members.umf.yaml", Strictness::Medium);
    assert_eq!(suite.name, "Members_suite");
    assert_eq!(suite.meta["table_name"], "Members");
    assert_eq!(suite.meta["generated_by"], "tablespec");
    assert_eq!(suite.meta["strictness"], "medium");
    assert_eq!(suite.meta["source_umf"], "specs/members.umf.yaml");
    assert_eq!(
        suite.expectations,
        generate_baseline_expectations(&members(), true)
    );
}

#[test]
fn strict_suites_add_uniqueness_for_fully_distinct_columns() {
    let umf = profiled_members();

    let strict = build_expectation_suite(&umf, "members.umf.yaml", Strictness::Strict);
    let unique: Vec<&Expectation> = strict
        .expectations
        .iter()
        .filter(|expectation| expectation.expectation_type == EXPECT_COLUMN_VALUES_TO_BE_UNIQUE)
        .collect();
    assert_eq!(unique.len(), 1);
    assert_eq!(unique[0].column(), Some("MEMBER_KEY"));
    assert_eq!(unique[0].meta["generated_from"], "profiling");

    for strictness in [Strictness::Loose, Strictness::Medium] {
        let suite = build_expectation_suite(&umf, "members.umf.yaml", strictness);
        assert!(
            suite
                .expectations
                .iter()
                .all(|expectation| expectation.expectation_type != EXPECT_COLUMN_VALUES_TO_BE_UNIQUE)
        );
    }
}

#[test]
fn saved_suites_load_back_for_extraction() {
    let dir = tempfile::tempdir().expect("tempdir");
    let suite = build_expectation_suite(&members(), "members.umf.yaml", Strictness::Medium);

    let path = save_expectation_suite(&suite, "Members", dir.path()).expect("save");
    assert_eq!(path, suite_path("Members", dir.path()));
    assert!(path.ends_with("tables/Members.expectations.yaml"));

    let loaded = load_expectations_for_table("Members", dir.path()).expect("loaded");
    assert_eq!(loaded["name"], "Members_suite");
    let formats = extract_strftime_formats(Some(&loaded));
    assert_eq!(formats["BIRTH_DATE"], "%Y%m%d");
}

#[test]
fn missing_or_broken_suite_files_load_as_none() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(load_expectations_for_table("Members", dir.path()).is_none());

    let path = suite_path("Broken", dir.path());
    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    std::fs::write(&path, "expectations: [unclosed").expect("write");
    assert!(load_expectations_for_table("Broken", dir.path()).is_none());
}
