use clap::Parser;
use sail_cli::args::CliArgs;
use std::io::Write;

fn write_defs(json: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().expect("temp file");
    f.write_all(json.as_bytes()).expect("write defs");
    f
}

#[test]
fn register_definition_checks_cleanly_with_the_stub_oracle() {
    let defs = r#"[
        {
            "Register": {
                "id": 0,
                "span": { "start": 0, "end": 1 },
                "name": { "name": "PC" },
                "typ": { "Id": { "name": "bits64" } },
                "effect": 0
            }
        }
    ]"#;
    let file = write_defs(defs);
    let args = CliArgs::parse_from([
        "sail-check",
        "--oracle",
        "stub",
        file.path().to_str().unwrap(),
    ]);
    let code = sail_cli::driver::run(&args).expect("driver run");
    assert_eq!(code, 0);
}

#[test]
fn malformed_json_surfaces_as_an_anyhow_error() {
    let file = write_defs("not json");
    let args = CliArgs::parse_from([
        "sail-check",
        "--oracle",
        "stub",
        file.path().to_str().unwrap(),
    ]);
    assert!(sail_cli::driver::run(&args).is_err());
}
