// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::*;
use std::io::Write;
use std::time::Duration;

#[test]
fn test_defaults_without_config_files() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load_from(dir.path()).unwrap();

    assert_eq!(settings.queue.max_attempts, 3);
    assert_eq!(settings.scheduler.tick_interval_secs, 60);
    assert_eq!(settings.browser.navigation_timeout_ms, 65_000);
    assert_eq!(settings.workers.per_source_limit, 1);
    assert!(settings.browser.remote_url.is_none());
    assert!(!settings.metrics.enabled);
}

#[test]
fn test_default_toml_overrides_builtin_values() {
    let dir = tempfile::tempdir().unwrap();
    let mut file = std::fs::File::create(dir.path().join("default.toml")).unwrap();
    writeln!(
        file,
        "[workers]\ncount = 9\n\n[browser]\nremote_url = \"ws://127.0.0.1:9222\""
    )
    .unwrap();

    let settings = Settings::load_from(dir.path()).unwrap();

    assert_eq!(settings.workers.count, 9);
    assert_eq!(
        settings.browser.remote_url.as_deref(),
        Some("ws://127.0.0.1:9222")
    );
    // untouched keys keep their defaults
    assert_eq!(settings.workers.fetch_concurrency, 4);
}

#[test]
fn test_queue_retry_policy_has_no_jitter() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load_from(dir.path()).unwrap();
    let policy = settings.queue.retry_policy();

    assert_eq!(policy.jitter_factor, 0.0);
    assert_eq!(policy.max_attempts, 3);
    assert_eq!(policy.calculate_backoff(1), Duration::from_secs(30));
    assert_eq!(policy.calculate_backoff(2), Duration::from_secs(60));
}

#[test]
fn test_database_pool_settings() {
    let dir = tempfile::tempdir().unwrap();
    let defaults = Settings::load_from(dir.path()).unwrap();
    assert!(!defaults.database.sqlx_logging);
    assert_eq!(defaults.database.max_lifetime, Some(3600));

    let mut file = std::fs::File::create(dir.path().join("default.toml")).unwrap();
    writeln!(file, "[database]\nsqlx_logging = true\nmax_lifetime = 120").unwrap();
    let settings = Settings::load_from(dir.path()).unwrap();

    assert!(settings.database.sqlx_logging);
    assert_eq!(settings.database.max_lifetime, Some(120));
}
