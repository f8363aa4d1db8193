use super::*;

use std::collections::HashMap;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn missing_file_and_env_yield_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = load_settings_from(dir.path().join("absent.toml"), env_from(&[]));
    assert_eq!(settings, Settings::default());
}

#[test]
fn file_values_are_overridden_by_env() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(SETTINGS_FILE);
    fs::write(
        &path,
        concat!(
            "endpoint = \"https://file.example.com\"\n",
            "deployment = \"file-model\"\n",
            "api_key = \"file-key\"\n",
        ),
    )
    .expect("write settings");

    let settings = load_settings_from(
        &path,
        env_from(&[("APP__DEPLOYMENT", "env-model"), ("OPENAI_API_KEY", "env-key")]),
    );

    assert_eq!(settings.endpoint, "https://file.example.com");
    assert_eq!(settings.deployment, "env-model");
    assert_eq!(settings.api_key.as_deref(), Some("env-key"));
}

#[test]
fn unparsable_file_is_ignored() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(SETTINGS_FILE);
    fs::write(&path, "this is = = not toml").expect("write settings");

    let settings = load_settings_from(&path, env_from(&[]));
    assert_eq!(settings, Settings::default());
}

#[test]
fn completion_config_requires_api_key() {
    let err = CompletionConfig::from_settings(Settings::default()).expect_err("must fail");
    assert!(err.to_string().contains("missing completion API key"));

    let blank = Settings {
        api_key: Some("   ".into()),
        ..Settings::default()
    };
    assert!(CompletionConfig::from_settings(blank).is_err());
}

#[test]
fn completion_config_rejects_bad_endpoint() {
    let settings = Settings {
        endpoint: "not a url".into(),
        api_key: Some("k".into()),
        ..Settings::default()
    };
    let err = CompletionConfig::from_settings(settings).expect_err("must fail");
    assert!(err.to_string().contains("invalid completion endpoint"));
}

#[test]
fn builds_deployment_url_with_api_version() {
    let config = CompletionConfig::from_settings(Settings {
        endpoint: "https://example.openai.azure.com/".into(),
        api_key: Some("secret".into()),
        ..Settings::default()
    })
    .expect("config");

    let url = config.chat_completions_url().expect("url");
    assert_eq!(
        url.as_str(),
        concat!(
            "https://example.openai.azure.com/openai/deployments/gpt-4o-mini",
            "/chat/completions?api-version=2024-08-01-preview"
        )
    );
}

#[test]
fn debug_output_redacts_api_key() {
    let config = CompletionConfig::from_settings(Settings {
        api_key: Some("super-secret".into()),
        ..Settings::default()
    })
    .expect("config");
    let rendered = format!("{config:?}");
    assert!(!rendered.contains("super-secret"));
}
