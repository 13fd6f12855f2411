#![allow(clippy::expect_used, clippy::unwrap_used)]

//! Config file lookup and loading.

use tailbox_cli::config::{load_config, Config, ConfigEnv, ConfigError};

#[test]
fn missing_default_file_yields_defaults() {
    let home = tempfile::tempdir().unwrap();
    let env = ConfigEnv {
        home: Some(home.path().to_path_buf()),
        ..ConfigEnv::default()
    };
    assert_eq!(load_config(&env).unwrap(), Config::default());
}

#[test]
fn default_file_under_xdg_is_loaded() {
    let xdg = tempfile::tempdir().unwrap();
    let dir = xdg.path().join("tailbox");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        "height = 3\nwait_message = \"tailing api\"\npace_ms = 0\nshow_labels = true\n",
    )
    .unwrap();

    let env = ConfigEnv {
        xdg_config_home: Some(xdg.path().to_path_buf()),
        ..ConfigEnv::default()
    };
    let config = load_config(&env).unwrap();
    assert_eq!(config.height, 3);
    assert_eq!(config.wait_message, "tailing api");
    assert_eq!(config.pace_ms, 0);
    assert!(config.show_labels);
    assert_eq!(config.tail, 50);
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let env = ConfigEnv {
        explicit: Some(path.clone()),
        ..ConfigEnv::default()
    };
    let err = load_config(&env).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains(&path.display().to_string()));
}

#[test]
fn env_config_path_is_used_when_no_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tailbox.toml");
    std::fs::write(&path, "no_color = true\n").unwrap();

    let env = ConfigEnv {
        tailbox_config: Some(path),
        home: Some(dir.path().to_path_buf()),
        ..ConfigEnv::default()
    };
    assert!(load_config(&env).unwrap().no_color);
}

#[test]
fn malformed_file_reports_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tailbox.toml");
    std::fs::write(&path, "height = \"tall\"\n").unwrap();

    let env = ConfigEnv {
        explicit: Some(path),
        ..ConfigEnv::default()
    };
    assert!(matches!(
        load_config(&env).unwrap_err(),
        ConfigError::Parse { .. }
    ));
}
