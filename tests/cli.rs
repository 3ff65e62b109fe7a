use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::time::{Duration, UNIX_EPOCH};
use tempfile::tempdir;

fn parse_jsonl(stdout: &[u8]) -> Vec<Value> {
    let s = String::from_utf8_lossy(stdout);
    s.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str::<Value>(l).expect("valid jsonl line"))
        .collect()
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Pin a file's mtime so canonical selection is deterministic
fn set_mtime(path: &Path, secs: u64) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
}

fn faqc() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("faqc"))
}

const FAQ: &str = "# FAQ\n\nThe compiler answers the questions below.\n\n\
    ## Install {#install}\n\nDownload the toolchain and run the installer script.\n\n\
    ## Docs\n\nStart with [install](#install), everything else follows.\n";

#[test]
fn check_lists_documents_in_stable_order() {
    let temp = tempdir().unwrap();

    write_file(&temp.path().join("b.md"), "# B\n\nAnswers about bees.\n");
    write_file(&temp.path().join("a.md"), "# A\n\nAnswers about ants.\n");
    write_file(&temp.path().join("sub/zz.md"), "# Z\n\nAnswers about zebras.\n");

    let mut cmd = faqc();
    cmd.arg("check").arg(temp.path()).arg("--quiet");

    let assert = cmd.assert().success();
    let items = parse_jsonl(&assert.get_output().stdout);

    let paths: Vec<_> = items
        .iter()
        .map(|v| v.get("path").and_then(|p| p.as_str()).unwrap().to_string())
        .collect();

    assert_eq!(paths, vec!["a.md", "b.md", "sub/zz.md"]);
    for item in &items {
        assert_eq!(item.get("kind").and_then(|v| v.as_str()), Some("document"));
        assert_eq!(item.get("severity").and_then(|v| v.as_str()), Some("info"));
    }
}

#[test]
fn check_exits_one_on_broken_link() {
    let temp = tempdir().unwrap();
    write_file(
        &temp.path().join("faq.md"),
        "# FAQ\n\nSee [setup](#setup) for details.\n",
    );

    let mut cmd = faqc();
    cmd.arg("check").arg(temp.path()).arg("--quiet");

    let assert = cmd.assert().failure().code(1);
    let items = parse_jsonl(&assert.get_output().stdout);

    let link = items
        .iter()
        .find(|v| v.get("kind").and_then(|k| k.as_str()) == Some("link"))
        .expect("broken link item");
    assert_eq!(link.get("severity").and_then(|v| v.as_str()), Some("error"));
    let issue = &link.get("issues").unwrap().as_array().unwrap()[0];
    assert_eq!(
        issue.get("code").and_then(|v| v.as_str()),
        Some("BROKEN_LINK")
    );
    assert!(issue
        .get("message")
        .and_then(|v| v.as_str())
        .unwrap()
        .contains("setup"));
}

#[test]
fn check_exits_one_on_duplicate_anchor_but_keeps_other_documents() {
    let temp = tempdir().unwrap();
    write_file(
        &temp.path().join("bad.md"),
        "## Setup\n\nFirst answer.\n\n## Setup\n\nSecond answer.\n",
    );
    write_file(&temp.path().join("good.md"), FAQ);

    let mut cmd = faqc();
    cmd.arg("check").arg(temp.path()).arg("--quiet");

    let assert = cmd.assert().failure().code(1);
    let items = parse_jsonl(&assert.get_output().stdout);

    let error = items
        .iter()
        .find(|v| v.get("kind").and_then(|k| k.as_str()) == Some("error"))
        .expect("duplicate anchor item");
    assert_eq!(error.get("path").and_then(|v| v.as_str()), Some("bad.md"));
    assert_eq!(
        error.get("issues").unwrap().as_array().unwrap()[0]
            .get("code")
            .and_then(|v| v.as_str()),
        Some("DUPLICATE_ANCHOR")
    );

    // bad.md is excluded, good.md still listed as a document
    let docs: Vec<_> = items
        .iter()
        .filter(|v| v.get("kind").and_then(|k| k.as_str()) == Some("document"))
        .filter_map(|v| v.get("path").and_then(|p| p.as_str()))
        .collect();
    assert_eq!(docs, vec!["good.md"]);
}

#[cfg(unix)]
#[test]
fn check_exits_one_when_a_source_cannot_be_read() {
    let temp = tempdir().unwrap();
    write_file(&temp.path().join("good.md"), FAQ);
    std::os::unix::fs::symlink(temp.path().join("gone.md"), temp.path().join("bad.md")).unwrap();

    let mut cmd = faqc();
    cmd.arg("check").arg(temp.path()).arg("--quiet");

    let assert = cmd.assert().failure().code(1);
    let items = parse_jsonl(&assert.get_output().stdout);

    let failed = items
        .iter()
        .find(|v| {
            v.get("issues").and_then(|i| i.as_array()).is_some_and(|issues| {
                issues
                    .iter()
                    .any(|i| i.get("code").and_then(|c| c.as_str()) == Some("READ_FAILED"))
            })
        })
        .expect("read failure item");
    assert_eq!(failed.get("path").and_then(|v| v.as_str()), Some("bad.md"));
    assert_eq!(
        failed.get("severity").and_then(|v| v.as_str()),
        Some("error")
    );

    // The readable document is still checked
    let docs: Vec<_> = items
        .iter()
        .filter(|v| v.get("kind").and_then(|k| k.as_str()) == Some("document"))
        .filter_map(|v| v.get("path").and_then(|p| p.as_str()))
        .collect();
    assert_eq!(docs, vec!["good.md"]);
}

#[test]
fn check_accepts_matching_mixed_case_anchors() {
    let temp = tempdir().unwrap();
    write_file(
        &temp.path().join("ref.md"),
        "# Reference\n\n## API Notes {#API}\n\nSee [api](#API).\n",
    );

    let mut cmd = faqc();
    cmd.arg("check").arg(temp.path()).arg("--quiet");

    let assert = cmd.assert().success();
    let items = parse_jsonl(&assert.get_output().stdout);
    assert!(!items
        .iter()
        .any(|v| v.get("kind").and_then(|k| k.as_str()) == Some("link")));
}

#[test]
fn build_writes_pages_index_and_manifest() {
    let temp = tempdir().unwrap();
    let out = tempdir().unwrap();
    write_file(&temp.path().join("faq.md"), FAQ);

    let mut cmd = faqc();
    cmd.arg("build").arg(temp.path()).arg(out.path()).arg("--quiet");

    let assert = cmd.assert().success();
    let items = parse_jsonl(&assert.get_output().stdout);

    let outputs: Vec<_> = items
        .iter()
        .filter(|v| v.get("kind").and_then(|k| k.as_str()) == Some("output"))
        .filter_map(|v| v.get("path").and_then(|p| p.as_str()))
        .collect();
    assert!(outputs.contains(&"faq.html"));
    assert!(outputs.contains(&"index.html"));
    assert!(outputs.contains(&"manifest.json"));

    let page = fs::read_to_string(out.path().join("faq.html")).unwrap();
    assert!(page.contains("<h2 id=\"install\">Install</h2>"));
    assert!(page.contains("href=\"#install\""));

    let manifest: Value =
        serde_json::from_str(&fs::read_to_string(out.path().join("manifest.json")).unwrap())
            .unwrap();
    assert!(manifest
        .get("generator")
        .and_then(|v| v.as_str())
        .unwrap()
        .starts_with("faqc"));
    assert!(manifest
        .get("documents")
        .and_then(|v| v.as_object())
        .unwrap()
        .contains_key("faq.md"));
}

#[test]
fn build_collapses_copies_and_reports_canonical() {
    let temp = tempdir().unwrap();
    let out = tempdir().unwrap();
    write_file(&temp.path().join("faq.md"), FAQ);
    write_file(&temp.path().join("faq_copy.md"), &format!("{}\n", FAQ));
    set_mtime(&temp.path().join("faq.md"), 2_000);
    set_mtime(&temp.path().join("faq_copy.md"), 1_000);

    let mut cmd = faqc();
    cmd.arg("build").arg(temp.path()).arg(out.path()).arg("--quiet");

    // Collapsing is a warning, not an error
    let assert = cmd.assert().success();
    let items = parse_jsonl(&assert.get_output().stdout);

    let dup = items
        .iter()
        .find(|v| v.get("kind").and_then(|k| k.as_str()) == Some("duplicate"))
        .expect("duplicate item");
    assert_eq!(
        dup.get("path").and_then(|v| v.as_str()),
        Some("faq_copy.md")
    );
    assert_eq!(
        dup.get("data")
            .and_then(|d| d.get("canonical"))
            .and_then(|v| v.as_str()),
        Some("faq.md")
    );

    assert!(out.path().join("faq.html").exists());
    assert!(!out.path().join("faq_copy.html").exists());
}

#[test]
fn build_twice_is_byte_identical() {
    let temp = tempdir().unwrap();
    let out = tempdir().unwrap();
    write_file(&temp.path().join("faq.md"), FAQ);

    faqc()
        .arg("build")
        .arg(temp.path())
        .arg(out.path())
        .arg("--quiet")
        .assert()
        .success();
    let first = fs::read(out.path().join("manifest.json")).unwrap();
    let first_page = fs::read(out.path().join("faq.html")).unwrap();

    faqc()
        .arg("build")
        .arg(temp.path())
        .arg(out.path())
        .arg("--quiet")
        .assert()
        .success();
    assert_eq!(fs::read(out.path().join("manifest.json")).unwrap(), first);
    assert_eq!(fs::read(out.path().join("faq.html")).unwrap(), first_page);
}

#[test]
fn anchor_list_reports_explicit_and_derived_anchors() {
    let temp = tempdir().unwrap();
    write_file(&temp.path().join("faq.md"), FAQ);

    let mut cmd = faqc();
    cmd.arg("anchor").arg("list").arg(temp.path()).arg("--quiet");

    let assert = cmd.assert().success();
    let items = parse_jsonl(&assert.get_output().stdout);

    let by_anchor = |name: &str| {
        items
            .iter()
            .find(|v| {
                v.get("data").and_then(|d| d.get("anchor")).and_then(|a| a.as_str()) == Some(name)
            })
            .unwrap_or_else(|| panic!("anchor {} present", name))
    };

    let install = by_anchor("install");
    assert_eq!(
        install
            .get("data")
            .and_then(|d| d.get("explicit"))
            .and_then(|v| v.as_bool()),
        Some(true)
    );
    assert_eq!(
        install.get("excerpt").and_then(|v| v.as_str()),
        Some("Install")
    );

    let docs = by_anchor("docs");
    assert_eq!(
        docs.get("data")
            .and_then(|d| d.get("explicit"))
            .and_then(|v| v.as_bool()),
        Some(false)
    );
}

#[test]
fn collapse_with_threshold_one_keeps_tweaked_copy() {
    let temp = tempdir().unwrap();
    write_file(&temp.path().join("faq.md"), FAQ);
    write_file(
        &temp.path().join("faq_copy.md"),
        &FAQ.replace("Download", "Fetch"),
    );

    let mut cmd = faqc();
    cmd.arg("collapse")
        .arg(temp.path())
        .arg("--threshold")
        .arg("1.0")
        .arg("--quiet");

    let assert = cmd.assert().success();
    let items = parse_jsonl(&assert.get_output().stdout);

    let docs = items
        .iter()
        .filter(|v| v.get("kind").and_then(|k| k.as_str()) == Some("document"))
        .count();
    assert_eq!(docs, 2);
    assert!(!items
        .iter()
        .any(|v| v.get("kind").and_then(|k| k.as_str()) == Some("duplicate")));
}

#[test]
fn md_format_groups_findings() {
    let temp = tempdir().unwrap();
    write_file(
        &temp.path().join("faq.md"),
        "# FAQ\n\nSee [gone](#gone).\n",
    );

    let mut cmd = faqc();
    cmd.arg("--format")
        .arg("md")
        .arg("check")
        .arg(temp.path())
        .arg("--quiet");

    let assert = cmd.assert().failure().code(1);
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("## Broken Links"));
    assert!(stdout.contains("BROKEN_LINK"));
}

#[test]
fn summary_goes_to_stderr_unless_quiet() {
    let temp = tempdir().unwrap();
    write_file(&temp.path().join("faq.md"), FAQ);

    let mut cmd = faqc();
    cmd.arg("--no-color").arg("check").arg(temp.path());
    let assert = cmd.assert().success();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("1 document(s)"), "stderr: {}", stderr);

    let mut cmd = faqc();
    cmd.arg("--no-color").arg("--quiet").arg("check").arg(temp.path());
    let assert = cmd.assert().success();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(!stderr.contains("document(s)"), "stderr: {}", stderr);
}

#[test]
fn check_missing_input_directory_fails() {
    let mut cmd = faqc();
    cmd.arg("check").arg("/nonexistent/faq-dir").arg("--quiet");
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("input directory does not exist"));
}
