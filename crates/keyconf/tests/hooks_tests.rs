//! Decode hook behavior through the public Config API

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use keyconf::{Config, Error, HookOutcome, TargetType, ValueKind, hook, options};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
struct Timeouts {
    timeout: Duration,
}

#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
struct Listener {
    address: String,
    port: u16,
    verbose: bool,
}

fn from_yaml(yaml: impl Into<String>, extra: Vec<keyconf::Hook>) -> Config {
    Config::init([
        options::reader(Cursor::new(yaml.into())),
        options::hooks(extra),
    ])
    .unwrap()
}

#[rstest]
#[case("5s", Duration::from_secs(5))]
#[case("1h30m", Duration::from_secs(5_400))]
#[case("1.5h", Duration::from_secs(5_400))]
#[case("250ms", Duration::from_millis(250))]
fn duration_literals(#[case] literal: &str, #[case] expected: Duration) {
    let config = from_yaml(format!("test:\n  timeout: {literal}\n"), Vec::new());

    let mut dst = Timeouts::default();
    config.get("test", &mut dst).unwrap();

    assert_eq!(dst.timeout, expected);
}

#[test]
fn integer_duration_is_nanoseconds() {
    let config = from_yaml("test:\n  timeout: 5\n", Vec::new());

    let mut dst = Timeouts::default();
    config.get("test", &mut dst).unwrap();

    assert_eq!(dst.timeout, Duration::from_nanos(5));
}

#[test]
fn invalid_duration_fails_decode() {
    let config = from_yaml("test:\n  timeout: notADuration\n", Vec::new());

    let mut dst = Timeouts {
        timeout: Duration::from_secs(1),
    };
    let err = config.get("test", &mut dst).unwrap_err();

    assert!(
        err.to_string()
            .contains("unable to convert notADuration into a std::time::Duration"),
        "{err}"
    );
    match err {
        Error::TypeCoercion { path, .. } => assert_eq!(path, "test.timeout"),
        other => panic!("expected a coercion error, got {other:?}"),
    }
    assert_eq!(dst.timeout, Duration::from_secs(1));
}

#[test]
fn invalid_duration_message() {
    let config = from_yaml("test:\n  timeout: soon\n", Vec::new());

    let err = config.get("test", &mut Timeouts::default()).unwrap_err();

    insta::assert_snapshot!(
        err.to_string(),
        @"error decoding 'test.timeout': unable to convert soon into a std::time::Duration"
    );
}

#[test]
fn lenient_scalars_from_strings() {
    let config = from_yaml(
        "listener:\n  address: 10\n  port: \"8443\"\n  verbose: \"true\"\n",
        Vec::new(),
    );

    let mut dst = Listener::default();
    config.get("listener", &mut dst).unwrap();

    assert_eq!(
        dst,
        Listener {
            address: "10".into(),
            port: 8443,
            verbose: true,
        }
    );
}

#[test]
fn unparseable_scalar_is_a_decode_error() {
    let config = from_yaml("listener:\n  port: eighty\n", Vec::new());

    let err = config.get("listener", &mut Listener::default()).unwrap_err();

    match err {
        Error::Decode { path, .. } => assert_eq!(path, "listener.port"),
        other => panic!("expected a decode error, got {other:?}"),
    }
}

#[test]
fn caller_hook_runs_after_builtins() {
    let named_ports = hook(|from, to: &TargetType, data: &Value| {
        match (from, to, data.as_str()) {
            (ValueKind::String, TargetType::Uint, Some("https")) => {
                HookOutcome::Transformed(json!(443))
            }
            _ => HookOutcome::Passthrough,
        }
    });
    let config = from_yaml("listener:\n  port: https\n", vec![named_ports]);

    let mut dst = Listener::default();
    config.get("listener", &mut dst).unwrap();

    assert_eq!(dst.port, 443);
}

#[test]
fn builtin_transform_wins_over_caller_hook() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let spy = hook(move |_, to: &TargetType, _: &Value| {
        if to.is_duration() {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        HookOutcome::Passthrough
    });
    let config = from_yaml("test:\n  timeout: 2s\n", vec![spy]);

    let mut dst = Timeouts::default();
    config.get("test", &mut dst).unwrap();

    assert_eq!(dst.timeout, Duration::from_secs(2));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn first_caller_transform_wins() {
    let first = hook(|_, to: &TargetType, _: &Value| match to {
        TargetType::Str => HookOutcome::Transformed(json!("first")),
        _ => HookOutcome::Passthrough,
    });
    let second = hook(|_, to: &TargetType, _: &Value| match to {
        TargetType::Str => HookOutcome::Transformed(json!("second")),
        _ => HookOutcome::Passthrough,
    });
    let config = from_yaml("listener:\n  address: original\n", vec![first, second]);

    let mut dst = Listener::default();
    config.get("listener", &mut dst).unwrap();

    assert_eq!(dst.address, "first");
}

#[test]
fn failing_hook_aborts_decode() {
    let reject = hook(|_, to: &TargetType, data: &Value| match (to, data.as_str()) {
        (TargetType::Str, Some("forbidden")) => HookOutcome::Failed("address is blocked".into()),
        _ => HookOutcome::Passthrough,
    });
    let config = from_yaml(
        "listener:\n  address: forbidden\n  port: 80\n",
        vec![reject],
    );

    let mut dst = Listener {
        port: 1,
        ..Listener::default()
    };
    let err = config.get("listener", &mut dst).unwrap_err();

    assert_eq!(
        err.to_string(),
        "error decoding 'listener.address': address is blocked"
    );
    assert_eq!(dst.port, 1);
}

#[test]
fn hooks_only_see_configured_values() {
    let reject = hook(|_, _: &TargetType, data: &Value| match data.as_str() {
        Some("forbidden") => HookOutcome::Failed("address is blocked".into()),
        _ => HookOutcome::Passthrough,
    });
    let config = from_yaml("listener:\n  port: 80\n", vec![reject]);

    let mut dst = Listener {
        address: "forbidden".into(),
        ..Listener::default()
    };
    config.get("listener", &mut dst).unwrap();

    assert_eq!(dst.port, 80);
    assert_eq!(dst.address, "");
}
