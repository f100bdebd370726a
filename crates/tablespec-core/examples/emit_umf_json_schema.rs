use tablespec_core::umf_json_schema;

fn main() {
    let schema = umf_json_schema();
    let json = serde_json::to_string_pretty(&schema).expect("serialize json schema");
    println!("{json}");
}
