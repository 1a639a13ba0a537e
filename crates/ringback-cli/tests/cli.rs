use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::thread;
use tempfile::TempDir;

const PROXY_VARS: [&str; 6] = [
    "HTTP_PROXY",
    "http_proxy",
    "HTTPS_PROXY",
    "https_proxy",
    "ALL_PROXY",
    "all_proxy",
];

fn ringback(temp: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("ringback");
    cmd.current_dir(temp.path())
        .env("XDG_CONFIG_HOME", temp.path().join("xdg"))
        .env_remove("RUST_LOG");
    for var in PROXY_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn write_config(temp: &TempDir, contents: &str) -> PathBuf {
    let path = temp.path().join("config.toml");
    fs::write(&path, contents).expect("write config");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&path).expect("metadata").permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&path, perms).expect("chmod");
    }
    path
}

fn write_contacts(dir: &Path) -> PathBuf {
    let path = dir.join("contacts.csv");
    fs::write(
        &path,
        "email,first_name\nada@example.com,Ada\ngrace@example.com,Grace\n",
    )
    .expect("write contacts");
    path
}

fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}/search")
}

/// Answers every request with a ready WebDriver status reply.
fn serve_ready_driver() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let body = r#"{"value":{"ready":true,"message":"ready"}}"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    format!("http://{addr}")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf8")
}

#[test]
fn run_missing_source_exits_not_found() {
    let temp = TempDir::new().expect("temp dir");
    let output = ringback(&temp)
        .args(["run", "missing.csv"])
        .output()
        .expect("run command");

    assert_eq!(output.status.code(), Some(2), "output: {:?}", output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing.csv"));
}

#[test]
fn run_rejects_source_without_required_columns() {
    let temp = TempDir::new().expect("temp dir");
    fs::write(temp.path().join("contacts.csv"), "mail,name\na@x.com,Ann\n").expect("write");

    let output = ringback(&temp)
        .args(["run", "contacts.csv"])
        .output()
        .expect("run command");

    assert_eq!(output.status.code(), Some(3), "output: {:?}", output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("email"));
    assert!(stderr.contains("first_name"));
}

#[test]
fn run_with_nothing_pending_creates_results_file() {
    let temp = TempDir::new().expect("temp dir");
    fs::write(temp.path().join("contacts.csv"), "email,first_name\n").expect("write");

    let output = ringback(&temp)
        .args(["run", "contacts.csv"])
        .output()
        .expect("run command");

    assert!(output.status.success(), "command failed: {:?}", output);
    let text = stdout(&output);
    assert!(text.contains("Created result.csv file"));
    assert!(text.contains("Remaining pending contacts: 0"));
    assert_eq!(
        fs::read_to_string(temp.path().join("result.csv")).expect("results"),
        "first_name,phone_number\n"
    );
}

#[test]
fn run_prompts_for_quoted_path() {
    let temp = TempDir::new().expect("temp dir");
    fs::write(temp.path().join("empty list.csv"), "email,first_name\n").expect("write");

    let output = ringback(&temp)
        .arg("run")
        .write_stdin("  \"empty list.csv\"\n")
        .output()
        .expect("run command");

    assert!(output.status.success(), "command failed: {:?}", output);
    let text = stdout(&output);
    assert!(text.starts_with("Enter the path to your CSV file: "));
    assert!(text.contains("Processing 0 records..."));
}

#[test]
fn run_without_api_key_fails_before_processing() {
    let temp = TempDir::new().expect("temp dir");
    let source = write_contacts(temp.path());
    let config = write_config(
        &temp,
        "[search]\napi_key_env = \"RINGBACK_TEST_MISSING_KEY\"\n",
    );

    let output = ringback(&temp)
        .env_remove("RINGBACK_TEST_MISSING_KEY")
        .args(["--config", config.to_str().expect("config path")])
        .args(["run", source.to_str().expect("source path")])
        .output()
        .expect("run command");

    assert_eq!(output.status.code(), Some(3), "output: {:?}", output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("RINGBACK_TEST_MISSING_KEY"));
    assert_eq!(
        fs::read_to_string(&source).expect("source"),
        "email,first_name\nada@example.com,Ada\ngrace@example.com,Grace\n"
    );
}

#[test]
fn run_keeps_contacts_pending_when_search_is_unreachable() {
    let temp = TempDir::new().expect("temp dir");
    let source = write_contacts(temp.path());
    let config = write_config(
        &temp,
        &format!(
            "results_path = \"out.csv\"\n[search]\napi_key = \"test-key\"\nendpoint = \"{}\"\ntimeout_secs = 5\n[lookup]\nwebdriver_url = \"{}\"\npage_load_wait_ms = 0\n",
            closed_port_url(),
            serve_ready_driver()
        ),
    );

    let output = ringback(&temp)
        .args(["--json", "--config", config.to_str().expect("config path")])
        .args(["run", source.to_str().expect("source path")])
        .output()
        .expect("run command");

    assert!(output.status.success(), "command failed: {:?}", output);
    let report: Value = serde_json::from_slice(&output.stdout).expect("parse json");
    assert_eq!(report["processed"], 2);
    assert_eq!(report["retry"], 2);
    assert_eq!(report["matched"], 0);
    assert_eq!(report["remaining"], 2);
    assert_eq!(report["results_created"], true);
    assert_eq!(
        fs::read_to_string(&source).expect("source"),
        "email,first_name\nada@example.com,Ada\ngrace@example.com,Grace\n"
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("out.csv")).expect("results"),
        "first_name,phone_number\n"
    );
}

#[test]
fn status_reports_pending_and_stored_counts() {
    let temp = TempDir::new().expect("temp dir");
    write_contacts(temp.path());
    fs::write(
        temp.path().join("result.csv"),
        "first_name,phone_number\nAlan,5550100\n",
    )
    .expect("write results");

    let output = ringback(&temp)
        .args(["--json", "status", "contacts.csv"])
        .output()
        .expect("run command");

    assert!(output.status.success(), "command failed: {:?}", output);
    let report: Value = serde_json::from_slice(&output.stdout).expect("parse json");
    assert_eq!(report["pending"], 2);
    assert_eq!(report["stored"], 1);
}

#[test]
fn extract_prints_candidates_from_stdin() {
    let temp = TempDir::new().expect("temp dir");
    let output = ringback(&temp)
        .arg("extract")
        .write_stdin("call 555-0100 or +1 202 555 0199, again 555-0100")
        .output()
        .expect("run command");

    assert!(output.status.success(), "command failed: {:?}", output);
    assert_eq!(stdout(&output), "5550100\n2025550199\n");
}

#[test]
fn extract_reads_file_as_json() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("snippets.txt");
    fs::write(&path, "Reach us at +88 01712345678").expect("write");

    let output = ringback(&temp)
        .args(["--json", "extract", "--file", path.to_str().expect("path")])
        .output()
        .expect("run command");

    assert!(output.status.success(), "command failed: {:?}", output);
    let found: Value = serde_json::from_slice(&output.stdout).expect("parse json");
    assert_eq!(found, serde_json::json!(["01712345678"]));
}

#[test]
fn extract_missing_file_exits_not_found() {
    let temp = TempDir::new().expect("temp dir");
    let output = ringback(&temp)
        .args(["extract", "--file", "missing.txt"])
        .output()
        .expect("run command");

    assert_eq!(output.status.code(), Some(2), "output: {:?}", output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found: text file missing.txt"));
}
