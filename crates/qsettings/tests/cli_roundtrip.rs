#![cfg(all(unix, feature = "cli"))]

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const DEFINITION: &str = r#"{
    "tabs": [
        {
            "name": "Grave Escape",
            "fields": [
                { "type": "boolean", "title": "Always send Escape if Alt is pressed", "qsid": 1, "bit": 0 },
                { "type": "boolean", "title": "Always send Escape if Control is pressed", "qsid": 1, "bit": 1 }
            ]
        },
        {
            "name": "Tap-Hold",
            "fields": [
                { "type": "integer", "title": "Tapping Term", "qsid": 7, "width": 2 },
                { "type": "integer", "title": "Mouse key delay", "qsid": 9, "width": 4 },
                { "type": "integer", "title": "Combo term", "qsid": 12, "width": 2 }
            ]
        }
    ]
}"#;

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/qscli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn wait_for_socket(path: &Path, timeout: Duration) {
    let start = Instant::now();
    while !path.exists() {
        assert!(start.elapsed() < timeout, "socket never appeared");
        thread::sleep(Duration::from_millis(25));
    }
}

fn qsettings() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_qsettings"));
    cmd.arg("--log-level").arg("error");
    cmd
}

fn spawn_keyboard(dir: &Path, extra: &[&str]) -> (Child, PathBuf, PathBuf) {
    let schema = dir.join("qmk_settings.json");
    std::fs::write(&schema, DEFINITION).expect("definition should be writable");
    let sock = dir.join("kb.sock");

    let child = qsettings()
        .arg("serve")
        .arg(&sock)
        .arg("--schema")
        .arg(&schema)
        .args(extra)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("serve should start");
    wait_for_socket(&sock, Duration::from_secs(3));
    (child, sock, schema)
}

fn run_json(args: &[&OsStr]) -> (Output, serde_json::Value) {
    let output = qsettings()
        .args(args)
        .arg("--format")
        .arg("json")
        .output()
        .expect("command should run");
    let json = serde_json::from_slice(&output.stdout).unwrap_or(serde_json::Value::Null);
    (output, json)
}

fn setting(json: &serde_json::Value, qsid: u64) -> Option<u64> {
    json["settings"]
        .as_array()?
        .iter()
        .find(|row| row["qsid"].as_u64() == Some(qsid))?["value"]
        .as_u64()
}

#[test]
fn discover_dump_and_set_against_virtual_keyboard() {
    let dir = unique_temp_dir("roundtrip");
    let (mut child, sock, schema) = spawn_keyboard(
        &dir,
        &["--supported", "1,7,9", "--value", "7=200", "--value", "9=70000"],
    );

    let (output, json) = run_json(&[OsStr::new("discover"), sock.as_os_str()]);
    assert!(output.status.success(), "discover failed: {output:?}");
    assert_eq!(json["supported"], serde_json::json!([1, 7, 9]));
    assert_eq!(json["count"], 3);

    let (output, json) = run_json(&[
        OsStr::new("dump"),
        sock.as_os_str(),
        OsStr::new("--schema"),
        schema.as_os_str(),
    ]);
    assert!(output.status.success(), "dump failed: {output:?}");
    assert_eq!(json["supported"], 3);
    assert_eq!(setting(&json, 1), Some(0));
    assert_eq!(setting(&json, 7), Some(200));
    assert_eq!(setting(&json, 9), Some(70000));
    assert_eq!(setting(&json, 12), None);

    let (output, json) = run_json(&[
        OsStr::new("set"),
        sock.as_os_str(),
        OsStr::new("--schema"),
        schema.as_os_str(),
        OsStr::new("--qsid"),
        OsStr::new("7"),
        OsStr::new("--value"),
        OsStr::new("175"),
    ]);
    assert!(output.status.success(), "set failed: {output:?}");
    assert_eq!(setting(&json, 7), Some(175));

    let (_, json) = run_json(&[
        OsStr::new("dump"),
        sock.as_os_str(),
        OsStr::new("--schema"),
        schema.as_os_str(),
    ]);
    assert_eq!(setting(&json, 7), Some(175));

    let _ = child.kill();
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn set_rejects_out_of_range_value() {
    let dir = unique_temp_dir("range");
    let (mut child, sock, schema) = spawn_keyboard(&dir, &[]);

    let output = qsettings()
        .arg("set")
        .arg(&sock)
        .arg("--schema")
        .arg(&schema)
        .arg("--qsid")
        .arg("7")
        .arg("--value")
        .arg("65536")
        .output()
        .expect("set should run");
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("out of range"), "stderr: {stderr}");

    let _ = child.kill();
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn set_rejects_qsid_outside_definition() {
    let dir = unique_temp_dir("unknown");
    let schema = dir.join("qmk_settings.json");
    std::fs::write(&schema, DEFINITION).expect("definition should be writable");

    // Rejected before any connection attempt.
    let output = qsettings()
        .arg("set")
        .arg(dir.join("missing.sock"))
        .arg("--schema")
        .arg(&schema)
        .arg("--qsid")
        .arg("300")
        .arg("--value")
        .arg("1")
        .output()
        .expect("set should run");
    assert_eq!(output.status.code(), Some(64));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_socket_exits_with_failure() {
    let dir = unique_temp_dir("missing");
    let output = qsettings()
        .arg("discover")
        .arg(dir.join("nope.sock"))
        .arg("--timeout")
        .arg("200ms")
        .output()
        .expect("discover should run");
    assert_eq!(output.status.code(), Some(1));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn serve_stops_on_interrupt_with_idle_client() {
    let dir = unique_temp_dir("interrupt");
    let (mut child, sock, _schema) = spawn_keyboard(&dir, &[]);

    // Connected but silent: the server is parked waiting for a report.
    let idle = std::os::unix::net::UnixStream::connect(&sock).expect("client should connect");
    thread::sleep(Duration::from_millis(200));

    let status = Command::new("kill")
        .arg("-INT")
        .arg(child.id().to_string())
        .status()
        .expect("kill should run");
    assert!(status.success());

    let deadline = Instant::now() + Duration::from_secs(3);
    let exit = loop {
        if let Some(exit) = child.try_wait().expect("child status should be readable") {
            break exit;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            panic!("serve did not stop after SIGINT");
        }
        thread::sleep(Duration::from_millis(25));
    };
    assert_eq!(exit.code(), Some(0));
    assert!(!sock.exists(), "socket file should be removed on shutdown");

    drop(idle);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn serve_rejects_supported_qsid_outside_definition() {
    let dir = unique_temp_dir("supported");
    let schema = dir.join("qmk_settings.json");
    std::fs::write(&schema, DEFINITION).expect("definition should be writable");

    let output = qsettings()
        .arg("serve")
        .arg(dir.join("kb.sock"))
        .arg("--schema")
        .arg(&schema)
        .arg("--supported")
        .arg("1,300")
        .output()
        .expect("serve should run");
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("qsid 300"), "stderr: {stderr}");
    assert!(!dir.join("kb.sock").exists());

    let _ = std::fs::remove_dir_all(&dir);
}
