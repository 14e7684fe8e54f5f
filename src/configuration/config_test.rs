use std::fs;

use anyhow::Result;
use tempdir::TempDir;

use super::Config;
use super::ConfigKey;
use crate::application::cli;

fn write_config(dir: &TempDir, contents: &str) -> Result<String> {
    let file_path = dir.path().join("config.toml");
    fs::write(&file_path, contents)?;
    return Ok(file_path.to_string_lossy().to_string());
}

#[test]
fn it_serializes_to_valid_toml() {
    let res = Config::serialize_default(cli::build());
    let doc = res.parse::<toml_edit::Document>().unwrap();

    assert_eq!(
        doc.get("api-url").and_then(|e| return e.as_str()),
        Some("http://localhost:8000")
    );
    assert_eq!(
        doc.get("request-timeout").and_then(|e| return e.as_integer()),
        Some(60000)
    );
    assert!(doc.get("state-file").is_some());
    assert!(doc.get("config-file").is_none());
    assert!(res.starts_with("# Base URL of the Lectern backend.\napi-url = "));
}

#[test]
fn it_falls_back_to_defaults_for_unset_keys() {
    assert_eq!(Config::default(ConfigKey::RequestTimeout), "60000");
    assert!(Config::default(ConfigKey::StateFile).ends_with("state.yaml"));
    assert!(Config::default(ConfigKey::ConfigFile).ends_with("config.toml"));
}

#[tokio::test]
async fn it_loads_config_from_file() -> Result<()> {
    let dir = TempDir::new("lectern-config")?;
    let config_file = write_config(
        &dir,
        "api-url = \"http://lectern.test:9000\"\nrequest-timeout = 1500\n",
    )?;

    let matches = cli::build().try_get_matches_from(vec!["lectern", "-c", &config_file])?;
    Config::load(cli::build(), vec![&matches]).await?;

    assert_eq!(Config::get(ConfigKey::ApiURL), "http://lectern.test:9000");
    assert_eq!(Config::get(ConfigKey::RequestTimeout), "1500");
    return Ok(());
}

#[tokio::test]
async fn it_fails_on_negative_numbers() -> Result<()> {
    let dir = TempDir::new("lectern-config")?;
    let config_file = write_config(&dir, "request-timeout = -1\n")?;

    let matches = cli::build().try_get_matches_from(vec!["lectern", "-c", &config_file])?;
    let res = Config::load(cli::build(), vec![&matches]).await;

    insta::assert_snapshot!(res.unwrap_err().to_string(), @"config.toml has an invalid value for key 'request-timeout': -1");
    return Ok(());
}

#[tokio::test]
async fn it_fails_on_non_scalar_values() -> Result<()> {
    let dir = TempDir::new("lectern-config")?;
    let config_file = write_config(&dir, "api-url = [\"a\", \"b\"]\n")?;

    let matches = cli::build().try_get_matches_from(vec!["lectern", "-c", &config_file])?;
    let res = Config::load(cli::build(), vec![&matches]).await;

    assert!(res.is_err());
    return Ok(());
}

#[tokio::test]
async fn it_fails_on_a_non_numeric_timeout() -> Result<()> {
    let matches = cli::build().try_get_matches_from(vec![
        "lectern",
        "-c",
        "./test/missing-config.toml",
        "--request-timeout",
        "soon",
    ])?;
    let res = Config::load(cli::build(), vec![&matches]).await;

    insta::assert_snapshot!(res.unwrap_err().to_string(), @"request-timeout must be a number of milliseconds, got 'soon'");
    return Ok(());
}

#[tokio::test]
async fn it_fails_to_load_broken_toml() -> Result<()> {
    let matches =
        cli::build().try_get_matches_from(vec!["lectern", "-c", "./test/bad-config.toml"])?;
    let res = Config::load(cli::build(), vec![&matches]).await;
    assert!(res.is_err());
    return Ok(());
}
