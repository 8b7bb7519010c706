//! Scenario files run end to end

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use certchain_cli::{run_scenario, Scenario};
use certchain_core::{Address, CertStage, ContentHash, RegistryConfig, TokenId};

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(name)
}

#[test]
fn test_demo_scenario_runs_clean() {
    let config = RegistryConfig::from_toml_file(demo("registry.toml")).unwrap();
    let scenario = Scenario::from_toml_file(demo("certification.toml")).unwrap();

    let (registry, report) = run_scenario(&scenario, config).unwrap();

    assert!(report.is_clean(), "unexpected steps: {:?}", report.unexpected().collect::<Vec<_>>());
    assert_eq!(report.total_supply, 1);

    let id = TokenId::new(1);
    assert_eq!(
        registry.owner_of(id).unwrap(),
        Address::from("0x00000000000000000000000000000000000000c3")
    );
    assert_eq!(registry.cert_stage(id).unwrap(), CertStage::Audited2);

    let audits = registry.get_cert_audit(id).unwrap();
    assert_eq!(audits.first.timestamp, 1_700_086_400);
    assert_eq!(audits.second.timestamp, 1_700_172_800);
    assert_eq!(
        registry.get_cert_data(id).unwrap().qms_hash,
        ContentHash::of("quality manual v1")
    );
}

#[test]
fn test_mismatched_expectation_is_reported() {
    let scenario = Scenario::from_toml_str(
        r#"
        start_time = 5

        [[steps]]
        action = "mint"
        to = "alice"
        expect = "REGISTRY_NOT_FOUND"

        [[steps]]
        action = "clear_approval"
        caller = "alice"
        token = 1
        "#,
    )
    .unwrap();

    let (_, report) = run_scenario(&scenario, RegistryConfig::default()).unwrap();

    let unexpected: Vec<_> = report.unexpected().map(|step| step.index).collect();
    assert_eq!(unexpected, vec![0]);
    assert_eq!(report.steps[1].detail.as_deref(), Some("nothing to clear"));
    assert!(report.steps[1].events.is_empty());
}

#[test]
fn test_report_serializes_to_json() {
    let scenario = Scenario::from_toml_str(
        "start_time = 1\n[[steps]]\naction = \"mint\"\nto = \"alice\"\n",
    )
    .unwrap();
    let (_, report) = run_scenario(&scenario, RegistryConfig::default()).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["steps"][0]["events"][0]["event"], "ownership_changed");
    assert_eq!(json["steps"][0]["events"][0]["id"], 1);
}

#[test]
fn test_scenario_file_loading() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scenario.toml");
    std::fs::write(
        &path,
        "name = \"from disk\"\nstart_time = 1\n[[steps]]\naction = \"mint\"\nto = \"alice\"\n",
    )
    .unwrap();

    let scenario = Scenario::from_toml_file(&path).unwrap();
    assert_eq!(scenario.name, "from disk");
    assert_eq!(scenario.steps.len(), 1);

    let missing = Scenario::from_toml_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(missing.to_string().contains("absent.toml"));

    let broken = dir.path().join("broken.toml");
    std::fs::write(&broken, "[[steps]]\naction = \"mint\"\n").unwrap();
    assert!(Scenario::from_toml_file(&broken).is_err());
}
