//! configure hook tests.
//!
//! Validation must fail before any file is touched, so none of these tests
//! need a dist directory on disk.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use deploy_compress::{
    CompressError, CompressPlugin, ConfigMap, DeployContext, DeployPlugin,
};
use serde_json::{json, Value};

/// Log sink shared with a test subscriber
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn missing_config_lines(&self) -> Vec<String> {
        let raw = self.0.lock().unwrap();
        String::from_utf8_lossy(&raw)
            .lines()
            .filter(|line| line.contains("- Missing config: "))
            .map(str::to_string)
            .collect()
    }
}

fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, CapturedLogs) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();

    let out = tracing::subscriber::with_default(subscriber, f);
    (out, logs)
}

fn full_config() -> ConfigMap {
    ConfigMap::new()
        .with("filePattern", "**/*.*")
        .with("ignorePattern", "**/specific.thing")
        .with("zopfli", false)
        .with("compression", json!(["best"]))
        .with("keep", false)
        .with("distDir", "tmp/dist-deploy")
        .with("distFiles", json!([]))
}

fn configure(config: ConfigMap) -> Result<(), CompressError> {
    let context = DeployContext::new("tmp/dist", Vec::new()).with_config(config);
    CompressPlugin::new("compress").configure(&context)
}

#[test]
fn test_missing_config_reports_every_key() {
    let context = DeployContext::new("tmp/dist", Vec::new());
    let resolution = CompressPlugin::new("compress")
        .resolve(&context, true)
        .unwrap();

    assert_eq!(resolution.defaulted.len(), 7);
    assert!(resolution.config.file_pattern.contains("woff2"));
}

#[test]
fn test_full_config_reports_nothing() {
    let context = DeployContext::new("tmp/dist", Vec::new()).with_config(full_config());
    let resolution = CompressPlugin::new("compress")
        .resolve(&context, true)
        .unwrap();

    assert!(resolution.defaulted.is_empty());
}

#[test]
fn test_rejects_unknown_compression_token() {
    let err = configure(full_config().with("compression", json!(["rar"]))).unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"The "compression" config option has a wrong value: "rar""#
    );
}

#[test]
fn test_accepts_single_string_compression() {
    assert!(configure(full_config().with("compression", "gzip")).is_ok());
}

#[test]
fn test_rejects_best_with_other_tokens() {
    for keep in [false, true] {
        let err = configure(
            full_config()
                .with("compression", json!(["best", "gzip"]))
                .with("keep", keep),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"The "compression" config cannot combine "best" with other values"#
        );
    }
}

#[test]
fn test_gzip_and_brotli_need_keep() {
    let both = full_config().with("compression", json!(["gzip", "brotli"]));

    let err = configure(both.clone()).unwrap_err();
    assert!(matches!(err, CompressError::MultipleCodecsWithoutKeep));

    assert!(configure(both.with("keep", true)).is_ok());
}

#[test]
fn test_null_ignore_pattern_is_accepted() {
    assert!(configure(full_config().with("ignorePattern", Value::Null)).is_ok());
}

#[test]
fn test_rejects_invalid_glob() {
    let err = configure(full_config().with("ignorePattern", "{unclosed")).unwrap_err();
    assert!(matches!(err, CompressError::InvalidPattern { .. }));
}

#[test]
fn test_errors_are_deterministic() {
    let config = full_config().with("compression", json!(["gzip", "lz4", "brotli"]));
    let first = configure(config.clone()).unwrap_err().to_string();
    let second = configure(config).unwrap_err().to_string();
    assert_eq!(first, second);
    assert!(first.contains("\"lz4\""));
}

#[test]
fn test_configure_logs_one_line_per_missing_key() {
    let context = DeployContext::new("tmp/dist", vec!["a.js".to_string()]);
    let plugin = CompressPlugin::new("compress");

    let (result, logs) = with_captured_logs(|| plugin.configure(&context));
    result.unwrap();

    let lines = logs.missing_config_lines();
    assert_eq!(lines.len(), 7);
    for key in [
        "filePattern",
        "ignorePattern",
        "compression",
        "zopfli",
        "keep",
        "distDir",
        "distFiles",
    ] {
        let needle = format!("- Missing config: {key}, using default: ");
        assert_eq!(
            lines.iter().filter(|line| line.contains(&needle)).count(),
            1,
            "expected exactly one line for {key}"
        );
    }
    assert!(lines
        .iter()
        .any(|line| line.contains("- Missing config: keep, using default: `false`")));
}

#[test]
fn test_configure_logs_nothing_when_all_keys_set() {
    let context = DeployContext::new("tmp/dist", Vec::new()).with_config(full_config());
    let plugin = CompressPlugin::new("compress");

    let (result, logs) = with_captured_logs(|| plugin.configure(&context));
    result.unwrap();

    assert!(logs.missing_config_lines().is_empty());
}

#[test]
fn test_quiet_resolve_logs_nothing() {
    let context = DeployContext::new("tmp/dist", Vec::new());
    let plugin = CompressPlugin::new("compress");

    let (resolution, logs) = with_captured_logs(|| plugin.resolve(&context, false));

    assert_eq!(resolution.unwrap().defaulted.len(), 7);
    assert!(logs.missing_config_lines().is_empty());
}
