use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn bin() -> Command {
    Command::cargo_bin("scrapcore").unwrap()
}

fn write_config(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("source.json");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(body.as_bytes()).unwrap();
    path
}

fn valid_config_json(listing_url: &str) -> String {
    serde_json::json!({
        "source_id": "jobs",
        "engine": { "type": "http" },
        "entrypoints": [{
            "url": listing_url,
            "paging": { "mode": "page", "start": 1, "pages": 1, "step": 1 }
        }],
        "discovery": {
            "link_extract": { "method": "css", "selector": "a[href]" }
        }
    })
    .to_string()
}

#[test]
fn help_lists_every_subcommand() {
    bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("doctor"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("capture-fixture"));
}

#[test]
fn version_flag_prints_the_crate_version() {
    bin().arg("--version").assert().success();
}

#[test]
fn validate_accepts_a_well_formed_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, &valid_config_json("https://fix.test/jobs?page={page}"));

    bin()
        .arg("validate")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("valid: 1 source"));
}

#[test]
fn validate_rejects_a_malformed_config_with_fatal_exit() {
    let dir = tempfile::tempdir().unwrap();
    let mut bad = serde_json::from_str::<serde_json::Value>(&valid_config_json(
        "https://fix.test/jobs?page={page}",
    ))
    .unwrap();
    bad["engine"]["timeout_s"] = serde_json::json!(0.0);
    let config = write_config(&dir, &bad.to_string());

    bin().arg("validate").arg("--config").arg(&config).assert().code(2);
}

#[test]
fn plan_lists_expanded_listing_urls_without_network_access() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        &dir,
        &valid_config_json("https://unreachable.invalid/jobs?page={page}"),
    );

    bin()
        .arg("plan")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("jobs (1 listing page(s))"))
        .stdout(predicate::str::contains("https://unreachable.invalid/jobs?page=1"));
}

#[test]
fn plan_only_filters_to_the_named_source() {
    let dir = tempfile::tempdir().unwrap();
    let doc = serde_json::json!({
        "sources": [
            serde_json::from_str::<serde_json::Value>(&valid_config_json(
                "https://unreachable.invalid/a?page={page}"
            ))
            .unwrap(),
        ]
    });
    let mut first = doc["sources"][0].clone();
    first["source_id"] = serde_json::json!("alpha");
    let mut second = first.clone();
    second["source_id"] = serde_json::json!("beta");
    second["entrypoints"][0]["url"] = serde_json::json!("https://unreachable.invalid/b?page={page}");
    let combined = serde_json::json!({ "sources": [first, second] });
    let config = write_config(&dir, &combined.to_string());

    bin()
        .arg("plan")
        .arg("--config")
        .arg(&config)
        .arg("--only")
        .arg("beta")
        .assert()
        .success()
        .stdout(predicate::str::contains("beta ("))
        .stdout(predicate::str::contains("alpha (").not());
}

#[test]
fn run_dry_run_writes_no_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        &dir,
        &valid_config_json("https://unreachable.invalid/jobs?page={page}"),
    );
    let results = dir.path().join("results");

    bin()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--dry-run")
        .arg("--results")
        .arg(&results)
        .assert()
        .success()
        .stdout(predicate::str::contains("would fetch 1 listing page(s)"));

    assert!(!results.exists());
}

#[test]
fn run_with_no_matching_source_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        &dir,
        &valid_config_json("https://unreachable.invalid/jobs?page={page}"),
    );

    bin()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--only")
        .arg("does-not-exist")
        .assert()
        .code(2);
}

#[test]
fn doctor_reports_on_the_http_transport() {
    bin()
        .arg("doctor")
        .assert()
        .stdout(predicate::str::contains("http transport"));
}
