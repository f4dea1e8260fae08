use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const PASSWORD: &str = "correct horse battery";

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_vajournal"))
}

/// Isolated XDG homes so a run never touches the real config or data.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        std::fs::create_dir_all(dir.path().join("config")).expect("config dir");
        std::fs::create_dir_all(dir.path().join("data")).expect("data dir");
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn store_path(&self) -> PathBuf {
        self.path().join("data").join("vajournal").join("journal.db")
    }

    fn command(&self, password: Option<&str>) -> Command {
        let mut cmd = Command::new(bin());
        cmd.env("XDG_CONFIG_HOME", self.path().join("config"))
            .env("XDG_DATA_HOME", self.path().join("data"))
            .env("NO_COLOR", "1")
            .env_remove("VAJOURNAL_STORE")
            .env_remove("VAJOURNAL_USER")
            .env_remove("VAJOURNAL_CONFIG")
            .env_remove("VAJOURNAL_PASSWORD")
            .stdin(Stdio::null());
        if let Some(password) = password {
            cmd.env("VAJOURNAL_PASSWORD", password);
        }
        cmd
    }

    fn run(&self, password: Option<&str>, args: &[&str]) -> Output {
        self.command(password)
            .args(args)
            .output()
            .expect("run vajournal")
    }

    /// `init` plus `register alice`.
    fn ready() -> Self {
        let sandbox = Sandbox::new();
        let output = sandbox.run(None, &["init", "--kdf-iterations", "100000"]);
        assert_success(&output, "init");
        let output = sandbox.run(Some(PASSWORD), &["register", "alice", "--no-input"]);
        assert_success(&output, "register");
        sandbox
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn assert_success(output: &Output, what: &str) {
    assert!(
        output.status.success(),
        "{} failed: stdout={}, stderr={}",
        what,
        stdout(output),
        stderr(output)
    );
}

#[test]
fn test_init_creates_store_and_config() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(None, &["init"]);
    assert_success(&output, "init");

    assert!(sandbox.store_path().exists());
    let config_path = sandbox.path().join("config").join("vajournal").join("config.toml");
    let config = std::fs::read_to_string(&config_path).expect("config written");
    assert!(config.contains("[store]"));
    assert!(config.contains("salt_policy = \"fixed\""));

    let output = sandbox.run(None, &["init"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("already exists"));
}

#[test]
fn test_write_then_read_text_entry() {
    let sandbox = Sandbox::ready();

    let output = sandbox.run(
        Some(PASSWORD),
        &["write", "--body", "slept well, walked the dog", "--no-input"],
    );
    assert_success(&output, "write");
    assert!(stdout(&output).contains("Saved entry"));

    let output = sandbox.run(Some(PASSWORD), &["read", "--no-input"]);
    assert_success(&output, "read");
    assert!(stdout(&output).contains("slept well, walked the dog"));

    let raw = std::fs::read(sandbox.store_path()).expect("read store");
    let needle = b"walked the dog";
    assert!(!raw.windows(needle.len()).any(|window| window == needle));
}

#[test]
fn test_read_json_lists_newest_first() {
    let sandbox = Sandbox::ready();
    for (body, date) in [("older", "2024-01-01"), ("newer", "2024-02-01")] {
        let output = sandbox.run(
            Some(PASSWORD),
            &["write", "--body", body, "--date", date, "--no-input"],
        );
        assert_success(&output, "write");
    }

    let output = sandbox.run(Some(PASSWORD), &["read", "--json", "--no-input"]);
    assert_success(&output, "read --json");
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("json output");
    assert_eq!(value["journal"], "default");
    let entries = value["entries"].as_array().expect("entries array");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["text"], "newer");
    assert_eq!(entries[1]["text"], "older");
    assert_eq!(value["unreadable"].as_array().map(Vec::len), Some(0));

    let output = sandbox.run(
        Some(PASSWORD),
        &["read", "--json", "--limit", "1", "--no-input"],
    );
    assert_success(&output, "read --limit");
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("json output");
    assert_eq!(value["entries"].as_array().map(Vec::len), Some(1));
}

#[test]
fn test_wrong_password_exits_auth_failed() {
    let sandbox = Sandbox::ready();
    let output = sandbox.run(Some("Correct Horse Battery"), &["journals", "--no-input"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("Incorrect username or password"));

    let output = sandbox.run(
        Some(PASSWORD),
        &["--user", "mallory", "journals", "--no-input"],
    );
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_missing_password_without_tty_is_invalid_input() {
    let sandbox = Sandbox::ready();
    let output = sandbox.run(None, &["journals", "--no-input"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("VAJOURNAL_PASSWORD"));
}

#[test]
fn test_missing_store_exits_not_found() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(Some(PASSWORD), &["--user", "alice", "journals", "--no-input"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("vajournal init"));

    let missing = sandbox.path().join("nowhere.db");
    let output = sandbox.run(
        Some(PASSWORD),
        &[
            "--store",
            missing.to_str().expect("utf8 path"),
            "--user",
            "alice",
            "journals",
            "--no-input",
        ],
    );
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_journals_and_duplicates() {
    let sandbox = Sandbox::ready();

    let output = sandbox.run(Some(PASSWORD), &["create-journal", "dreams", "--no-input"]);
    assert_success(&output, "create-journal");

    let output = sandbox.run(Some(PASSWORD), &["create-journal", "dreams", "--no-input"]);
    assert_eq!(output.status.code(), Some(4));

    let output = sandbox.run(Some(PASSWORD), &["journals", "--json", "--no-input"]);
    assert_success(&output, "journals");
    let names: Vec<String> = serde_json::from_str(&stdout(&output)).expect("json names");
    assert_eq!(names, vec!["default".to_string(), "dreams".to_string()]);

    let output = sandbox.run(
        Some(PASSWORD),
        &["read", "--journal", "nightmares", "--no-input"],
    );
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("vajournal journals"));
}

#[test]
fn test_register_twice_is_rejected() {
    let sandbox = Sandbox::ready();
    let output = sandbox.run(Some(PASSWORD), &["register", "alice", "--no-input"]);
    assert_eq!(output.status.code(), Some(4));

    let output = sandbox.run(Some("short"), &["register", "bob", "--no-input"]);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_attach_and_save_media() {
    let sandbox = Sandbox::ready();
    let drawing = sandbox.path().join("sketch.png");
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.extend_from_slice(&[0u8, 1, 2, 3, 255]);
    std::fs::write(&drawing, &bytes).expect("write drawing");

    let output = sandbox.run(
        Some(PASSWORD),
        &[
            "attach",
            drawing.to_str().expect("utf8 path"),
            "--kind",
            "drawing",
            "--no-input",
        ],
    );
    assert_success(&output, "attach");

    let out_dir = sandbox.path().join("out");
    let output = sandbox.run(
        Some(PASSWORD),
        &[
            "read",
            "--kind",
            "drawing",
            "--out",
            out_dir.to_str().expect("utf8 path"),
            "--no-input",
        ],
    );
    assert_success(&output, "read --out");

    let saved: Vec<PathBuf> = std::fs::read_dir(&out_dir)
        .expect("out dir")
        .map(|entry| entry.expect("dir entry").path())
        .collect();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].extension().and_then(|e| e.to_str()), Some("png"));
    assert_eq!(std::fs::read(&saved[0]).expect("saved file"), bytes);

    let output = sandbox.run(
        Some(PASSWORD),
        &[
            "attach",
            sandbox.path().join("missing.ogg").to_str().expect("utf8 path"),
            "--kind",
            "audio",
            "--no-input",
        ],
    );
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_check_reports_ok() {
    let sandbox = Sandbox::ready();
    let output = sandbox.run(
        Some(PASSWORD),
        &["write", "--body", "first entry", "--no-input"],
    );
    assert_success(&output, "write");

    let output = sandbox.run(None, &["check"]);
    assert_success(&output, "check");
    assert!(stdout(&output).contains("Integrity check: OK"));

    let output = sandbox.run(Some(PASSWORD), &["check", "--decrypt", "--no-input"]);
    assert_success(&output, "check --decrypt");
    assert!(stdout(&output).contains("1 readable, 0 unreadable"));
}

#[test]
fn test_backup_copy_is_readable() {
    let sandbox = Sandbox::ready();
    let output = sandbox.run(
        Some(PASSWORD),
        &["write", "--body", "kept safe", "--no-input"],
    );
    assert_success(&output, "write");

    let backup = sandbox.path().join("backups").join("journal.db");
    let backup_arg = backup.to_str().expect("utf8 path");
    let output = sandbox.run(None, &["backup", backup_arg]);
    assert_success(&output, "backup");
    assert!(backup.exists());

    let output = sandbox.run(None, &["backup", backup_arg]);
    assert_eq!(output.status.code(), Some(4));
    let output = sandbox.run(None, &["backup", backup_arg, "--force"]);
    assert_success(&output, "backup --force");

    let store_alias = sandbox
        .store_path()
        .parent()
        .expect("store dir")
        .join(".")
        .join("journal.db");
    let output = sandbox.run(
        None,
        &["backup", store_alias.to_str().expect("utf8 path"), "--force"],
    );
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("store itself"));

    let output = sandbox.run(
        Some(PASSWORD),
        &["--store", backup_arg, "read", "--no-input"],
    );
    assert_success(&output, "read from backup");
    assert!(stdout(&output).contains("kept safe"));
}

#[test]
fn test_completions_generate() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(None, &["completions", "bash"]);
    assert_success(&output, "completions");
    assert!(stdout(&output).contains("vajournal"));
}
