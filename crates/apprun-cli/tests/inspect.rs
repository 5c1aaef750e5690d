//! `apprun-inspect` against temporary installation roots.
#![cfg(unix)]

use std::path::Path;
use std::process::{Command, Output};

fn make_root() -> tempfile::TempDir {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    std::fs::create_dir_all(root.join("bin")).unwrap();
    std::fs::write(
        root.join("apprun.toml"),
        "version = \"29.4\"\ntriple = \"aarch64-unknown-linux-gnu\"\nsubtools = [\"etags\"]\n",
    )
    .unwrap();
    for tool in ["emacs", "emacsclient", "etags"] {
        std::fs::write(root.join("bin").join(tool), "").unwrap();
    }
    tmp
}

fn inspect(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_apprun-inspect"))
        .arg("--root")
        .arg(root)
        .args(args)
        .env_remove("APPRUN_PATH_POLICY")
        .env_remove("APPRUN_EXTRA_PATH")
        .output()
        .unwrap()
}

fn json(output: &Output) -> serde_json::Value {
    assert!(output.status.success(), "{output:?}");
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_plan_subtool_json() {
    let tmp = make_root();
    let plan = json(&inspect(tmp.path(), &["--json", "plan", "etags", "-o", "TAGS"]));

    assert_eq!(plan["kind"], "subtool");
    assert_eq!(
        plan["target"],
        tmp.path().join("bin/etags").display().to_string()
    );
    assert_eq!(plan["args"], serde_json::json!(["-o", "TAGS"]));
    assert_eq!(plan["policy"], "sanitize");
    assert_eq!(
        plan["env"]["EMACSPATH"],
        tmp.path()
            .join("libexec/emacs/29.4/aarch64-unknown-linux-gnu")
            .display()
            .to_string()
    );
}

#[test]
fn test_plan_as_alternate_with_overrides() {
    let tmp = make_root();
    let plan = json(&inspect(
        tmp.path(),
        &[
            "plan",
            "--json",
            "--as",
            "emacsclient-29",
            "--policy",
            "preserve",
            "--extra-path",
            "/srv/tools",
            "--",
            "-c",
        ],
    ));

    assert_eq!(plan["kind"], "alternate");
    assert_eq!(plan["args"], serde_json::json!(["-c"]));
    assert_eq!(plan["policy"], "preserve");
    let path = plan["env"]["PATH"].as_str().unwrap();
    let bin = tmp.path().join("bin").display().to_string();
    assert!(path.starts_with(&format!("{bin}:/srv/tools")), "{path}");
}

#[test]
fn test_plan_missing_target_fails() {
    let tmp = make_root();
    std::fs::remove_file(tmp.path().join("bin/emacs")).unwrap();
    let out = inspect(tmp.path(), &["plan", "file.txt"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("not found"));
}

#[test]
fn test_check_reports_missing_tools() {
    let tmp = make_root();
    let report = json(&inspect(tmp.path(), &["--json", "check"]));
    assert_eq!(report["dump"]["present"], false);
    let tools = report["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 3);
    assert!(tools.iter().all(|t| t["present"] == true));

    std::fs::remove_file(tmp.path().join("bin/etags")).unwrap();
    let out = inspect(tmp.path(), &["check"]);
    assert!(!out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("missing"), "{stdout}");
    assert!(String::from_utf8_lossy(&out.stderr).contains("etags"));
}

#[test]
fn test_manifest_prints_effective_toml() {
    let tmp = make_root();
    let out = inspect(tmp.path(), &["manifest"]);
    assert!(out.status.success(), "{out:?}");
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("version = \"29.4\""), "{text}");
    assert!(text.contains("default_tool = \"emacs\""), "{text}");
    assert!(text.contains("EMACSLOADPATH"), "{text}");
}
