use std::fs;

use tablespec_core::{
    Nullability, Umf, load_umf_from_yaml, save_umf_to_yaml, validate_umf_directory,
    validate_umf_file,
};

const CLAIMS_UMF: &str = r#"version: "1.0"
table_name: Medical_Claims
source_file: Outreach Data Layouts v2.5.xlsx
sheet_name: Medical Claims
description: Healthcare claims and billing information
columns:
  - name: PBPTYPE
    data_type: VARCHAR
    position: A
    description: Line of Business
    nullable:
      MD: false
      MP: false
      ME: false
    sample_values: [MEDICAID, MEDICARE, MARKETPLACE]
    length: 20
  - name: CLAIM_AMOUNT
    data_type: DECIMAL
    precision: 12
    scale: 2
relationships:
  foreign_keys:
    - column: PBPTYPE
      references: Plans.PBPTYPE
  suggested_indexes:
    - name: idx_pbptype
      columns: [PBPTYPE]
metadata:
  pipeline_phase: 4
  source_file_modified: "2024-03-01T08:30:00"
"#;

#[test]
fn loads_and_saves_umf_yaml() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = dir.path().join("Medical_Claims.umf.yaml");
    fs::write(&source, CLAIMS_UMF).expect("write fixture");

    let umf = load_umf_from_yaml(&source).expect("load umf");
    assert_eq!(umf.table_name, "Medical_Claims");
    assert_eq!(umf.column_names(), vec!["PBPTYPE", "CLAIM_AMOUNT"]);
    let pbptype = umf.column("PBPTYPE").expect("column");
    assert!(matches!(pbptype.nullable, Some(Nullability::PerLob(_))));
    assert!(pbptype.is_required());
    let indexes = umf
        .relationships
        .as_ref()
        .and_then(|relationships| relationships.indexes.as_ref())
        .expect("indexes");
    assert_eq!(indexes[0].name, "idx_pbptype");
    assert_eq!(umf.source_file_modified(), Some("2024-03-01T08:30:00"));

    let target = dir.path().join("out/nested/Medical_Claims.umf.yaml");
    save_umf_to_yaml(&umf, &target).expect("save umf");
    let reloaded: Umf = load_umf_from_yaml(&target).expect("reload umf");
    assert_eq!(reloaded, umf);

    let saved = fs::read_to_string(&target).expect("read saved");
    assert!(
        saved
            .lines()
            .all(|line| !line.trim_end().ends_with(": null") && !line.trim_end().ends_with(": ~")),
        "absent fields must be omitted"
    );
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_umf_from_yaml(&dir.path().join("missing.umf.yaml")).unwrap_err();
    assert!(err.to_string().contains("UMF file not found"));
}

#[test]
fn validates_files_in_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("good.umf.yaml"), CLAIMS_UMF).expect("write good");
    fs::write(
        dir.path().join("bad.umf.yaml"),
        "version: one\ntable_name: Bad\ncolumns: []\n",
    )
    .expect("write bad");
    fs::write(dir.path().join("broken.umf.yaml"), "columns: [unclosed\n").expect("write broken");
    fs::write(dir.path().join("ignored.yaml"), "not: umf\n").expect("write ignored");

    let results = validate_umf_directory(dir.path(), ".umf.yaml").expect("validate dir");
    assert_eq!(results.len(), 3);
    assert_eq!(results.get(&dir.path().join("good.umf.yaml")), Some(&true));
    assert_eq!(results.get(&dir.path().join("bad.umf.yaml")), Some(&false));
    assert_eq!(results.get(&dir.path().join("broken.umf.yaml")), Some(&false));

    let report = validate_umf_file(&dir.path().join("broken.umf.yaml")).expect("report");
    assert_eq!(report.errors[0].code, "invalid_yaml");
}

#[test]
fn empty_directory_yields_no_results() {
    let dir = tempfile::tempdir().expect("tempdir");
    let results = validate_umf_directory(dir.path(), ".umf.yaml").expect("validate dir");
    assert!(results.is_empty());
    assert!(validate_umf_directory(&dir.path().join("nope"), ".umf.yaml").is_err());
}
