//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use std::fs;
use std::path::PathBuf;

use serial_test::serial;
use tiltbox::config::{AppConfig, SpawnShape};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tiltbox-config-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
#[serial]
fn test_default_file_matches_builtin_defaults() {
    let config = AppConfig::load().unwrap();
    let builtin = AppConfig::default();
    assert_eq!(config.window.title, builtin.window.title);
    assert_eq!(config.physics.gravity, builtin.physics.gravity);
    assert_eq!(config.physics.velocity_iterations, builtin.physics.velocity_iterations);
    assert_eq!(config.spawn.texture, builtin.spawn.texture);
    assert_eq!(config.tilt, builtin.tilt);
    assert!((config.physics.time_step - builtin.physics.time_step).abs() < 1e-6);
}

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("TILTBOX_WINDOW__TITLE", "Test From Env");
    std::env::set_var("TILTBOX_SPAWN__SHAPE", "circle");
    let config = AppConfig::load();
    std::env::remove_var("TILTBOX_WINDOW__TITLE");
    std::env::remove_var("TILTBOX_SPAWN__SHAPE");

    let config = config.unwrap();
    assert_eq!(config.window.title, "Test From Env");
    assert_eq!(config.spawn.shape, SpawnShape::Circle);
}

#[test]
#[serial]
fn test_user_file_overrides_default() {
    let dir = scratch_dir("user");
    fs::write(dir.join("default.toml"), "[window]\ntitle = \"Base\"\nwidth = 640\n").unwrap();
    fs::write(dir.join("user.toml"), "[window]\ntitle = \"Mine\"\n").unwrap();

    let config = AppConfig::load_from(&dir).unwrap();
    assert_eq!(config.window.title, "Mine");
    assert_eq!(config.window.width, 640);
    // Untouched sections keep their defaults
    assert_eq!(config.arena.pixels_per_meter, 32.0);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
#[serial]
fn test_missing_directory_uses_defaults() {
    let config = AppConfig::load_from("does/not/exist").unwrap();
    assert_eq!(config.window.width, AppConfig::default().window.width);
}

#[test]
#[serial]
fn test_bad_value_is_an_error() {
    let dir = scratch_dir("bad");
    fs::write(dir.join("default.toml"), "[frame]\nmax_steps_per_frame = \"lots\"\n").unwrap();

    let err = AppConfig::load_from(&dir).unwrap_err();
    assert!(err.to_string().starts_with("Configuration error"));

    let _ = fs::remove_dir_all(&dir);
}
