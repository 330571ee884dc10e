//! Cloud cross-browser test dispatch.
//!
//! `connect` serves the unit-test pages locally; `dispatch` submits them to
//! the Sauce Labs grid against the configured browser matrix and blocks on
//! completion. Transient grid failures are retried up to the configured
//! ceiling; exhausting it fails the run like any other transformation.

use std::fs;
use std::path::Path;
use std::process::Child;
use std::thread;
use std::time::Duration;

use crate::config::BrandkitConfig;
use crate::error::{Error, Result, TransformFailedDetails};
use crate::signal::EnvSignal;
use crate::task::TaskDefinition;
use crate::utils::command;

const SAUCE_API: &str = "https://saucelabs.com/rest/v1";
const RETRY_DELAY: Duration = Duration::from_secs(3);
const POLL_DELAY: Duration = Duration::from_secs(5);
const POLL_LIMIT: u32 = 120;

/// Spawn the configured static server backing the test URLs. The handle is
/// held by the executor and killed when the run ends.
pub(crate) fn connect(
    config: &BrandkitConfig,
    root: &Path,
    _task: &TaskDefinition,
) -> Result<Child> {
    let (program, args) = config.tools.serve.split_first().ok_or_else(|| {
        Error::config_invalid_value("tools.serve", None, "Static server command is empty")
    })?;
    command::spawn_in(root, program, args, "static server")
}

pub(crate) fn dispatch(
    config: &BrandkitConfig,
    root: &Path,
    signal: &EnvSignal,
    task: &TaskDefinition,
) -> Result<()> {
    let username = signal.sauce_username.as_deref().ok_or_else(|| {
        Error::config_missing_key("SAUCE_USERNAME", None)
            .with_hint("Export SAUCE_USERNAME alongside SAUCE_ACCESS_KEY")
    })?;
    let access_key = signal.sauce_access_key.as_deref().ok_or_else(|| {
        Error::config_missing_key("SAUCE_ACCESS_KEY", None)
    })?;

    let browsers = load_browsers(&config.browsers_file(root))?;
    let urls = task.option_str_list("urls");
    let concurrency = task.option_u64("concurrency").unwrap_or(10);
    let max_retries = task.option_u64("maxRetries").unwrap_or(3) as u32;

    let client = reqwest::blocking::Client::new();
    let base = format!("{}/{}", SAUCE_API, username);

    for url in &urls {
        let payload = serde_json::json!({
            "platforms": browsers,
            "url": url,
            "framework": "qunit",
            "concurrency": concurrency,
            // Opaque CI build identifier, if the environment provides one.
            "build": signal.build_id,
        });

        let submitted = with_retries(max_retries, || {
            post_json(&client, &format!("{}/js-tests", base), username, access_key, &payload)
        })?;

        let ids = submitted
            .get("js tests")
            .and_then(|v| v.as_array())
            .cloned()
            .ok_or_else(|| {
                Error::dispatch_failed(1, format!("Grid returned no test ids: {}", submitted))
            })?;

        let status_payload = serde_json::json!({ "js tests": ids });
        let completed = poll_until_complete(
            &client,
            &format!("{}/js-tests/status", base),
            username,
            access_key,
            &status_payload,
            max_retries,
        )?;

        check_results(task, url, &completed)?;
    }

    Ok(())
}

fn load_browsers(path: &Path) -> Result<serde_json::Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
    })?;
    serde_yml::from_str(&content).map_err(|e| {
        Error::config_invalid_value(
            "browsers_file",
            Some(path.display().to_string()),
            e.to_string(),
        )
    })
}

/// Retry transient grid failures (transport errors and 5xx responses) with a
/// fixed delay. Client errors are not transient and fail immediately.
fn with_retries<F>(max_retries: u32, mut attempt: F) -> Result<serde_json::Value>
where
    F: FnMut() -> std::result::Result<serde_json::Value, TransientError>,
{
    let mut last = String::new();
    for n in 0..=max_retries {
        match attempt() {
            Ok(value) => return Ok(value),
            Err(TransientError::Fatal(err)) => return Err(err),
            Err(TransientError::Transient(msg)) => {
                last = msg;
                if n < max_retries {
                    thread::sleep(RETRY_DELAY);
                }
            }
        }
    }
    Err(Error::dispatch_failed(max_retries + 1, last))
}

enum TransientError {
    Transient(String),
    Fatal(Error),
}

fn post_json(
    client: &reqwest::blocking::Client,
    url: &str,
    username: &str,
    access_key: &str,
    payload: &serde_json::Value,
) -> std::result::Result<serde_json::Value, TransientError> {
    let response = client
        .post(url)
        .basic_auth(username, Some(access_key))
        .json(payload)
        .send()
        .map_err(|e| TransientError::Transient(e.to_string()))?;

    let status = response.status();
    if status.is_server_error() {
        return Err(TransientError::Transient(format!("Grid returned {}", status)));
    }
    if !status.is_success() {
        return Err(TransientError::Fatal(Error::dispatch_failed(
            1,
            format!("Grid rejected request: {}", status),
        )));
    }

    response
        .json::<serde_json::Value>()
        .map_err(|e| TransientError::Transient(e.to_string()))
}

fn poll_until_complete(
    client: &reqwest::blocking::Client,
    url: &str,
    username: &str,
    access_key: &str,
    payload: &serde_json::Value,
    max_retries: u32,
) -> Result<serde_json::Value> {
    for _ in 0..POLL_LIMIT {
        let status = with_retries(max_retries, || {
            post_json(client, url, username, access_key, payload)
        })?;

        if status.get("completed").and_then(|v| v.as_bool()) == Some(true) {
            return Ok(status);
        }
        thread::sleep(POLL_DELAY);
    }

    Err(Error::dispatch_failed(
        POLL_LIMIT,
        "Grid did not complete within the polling window",
    ))
}

fn check_results(task: &TaskDefinition, url: &str, status: &serde_json::Value) -> Result<()> {
    let tests = status
        .get("js tests")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    let failed: Vec<String> = tests
        .iter()
        .filter(|t| !test_passed(t))
        .map(|t| {
            format!(
                "{} on {}",
                url,
                t.get("platform").map(|p| p.to_string()).unwrap_or_default()
            )
        })
        .collect();

    if failed.is_empty() {
        return Ok(());
    }

    Err(Error::transform_failed(TransformFailedDetails {
        task: task.name.clone(),
        command: "saucelabs js-tests".to_string(),
        exit_code: None,
        stdout: String::new(),
        stderr: failed.join("\n"),
    }))
}

fn test_passed(test: &serde_json::Value) -> bool {
    let result = match test.get("result") {
        Some(r) => r,
        None => return false,
    };
    result
        .get("failed")
        .and_then(|v| v.as_u64())
        .map(|failed| failed == 0)
        .unwrap_or(false)
}
