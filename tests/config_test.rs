use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;

use balrogworker::config::{ConfigError, Origin, verify_args_with_env};
use balrogworker::hashing::{HashAlgorithm, get_hash};
use balrogworker::naming::possible_names;
use balrogworker::task::{SigningChannels, load_task};

fn environ() -> BTreeMap<String, String> {
    [
        ("BALROG_API_ROOT", "https://balrog.example.com/api"),
        ("BALROG_USERNAME", "ffxbld"),
        ("BALROG_PASSWORD", "secret"),
        ("S3_BUCKET", "net-mozaws-prod-delivery-firefox"),
        ("AWS_ACCESS_KEY_ID", "AKIA"),
        ("AWS_SECRET_ACCESS_KEY", "shh"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Resolve config, load the task, hash and name an artifact: the handoffs the
/// worker makes before any network call.
#[test]
fn startup_sequence() {
    let temp_dir = TempDir::new().unwrap();
    let taskdef = temp_dir.path().join("test_taskdef.json");
    fs::write(
        &taskdef,
        r#"{"payload": {"parent_task_artifacts_url": "www.taskcluster.net", "signing_cert": "nightly"}}"#,
    )
    .unwrap();

    let config = verify_args_with_env(
        ["--taskdef", taskdef.to_str().unwrap(), "--dummy"],
        &environ(),
    )
    .unwrap();
    assert!(config.dummy);
    assert_eq!(config.origin("api_root"), Some(Origin::Env("BALROG_API_ROOT")));

    let payload = load_task(&config.taskdef, &SigningChannels::default()).unwrap();
    assert_eq!(payload.signing_cert, "nightly");

    let digest = get_hash(&payload.parent_task_artifacts_url, HashAlgorithm::Md5);
    assert_eq!(digest.len(), 32);

    let names = possible_names("firefox/target.complete.mar", 2);
    assert_eq!(names[2], "firefox/target.complete-2.mar");
}

#[test]
fn empty_environment_fails_on_first_required_setting() {
    let err = verify_args_with_env(["--taskdef", "t.json"], &BTreeMap::<String, String>::new()).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MissingRequiredSetting { setting: "api_root", .. }
    ));
}

#[test]
fn empty_env_value_counts_as_unset() {
    let mut env = environ();
    env.insert("AWS_ACCESS_KEY_ID".to_string(), String::new());

    let err = verify_args_with_env(["--taskdef", "t.json"], &env).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MissingRequiredSetting { setting: "aws_key_id", .. }
    ));
}
