use predicates::prelude::*;
use serde_json::{json, Value};
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
    template_path: PathBuf,
    data_path: PathBuf,
}

fn build_workspace() -> Result<Workspace, Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let template_path = dir.path().join("invoice.json");
    let data_path = dir.path().join("record.json");

    let template = json!({
        "paragraphs": [{"runs": [
            {"text": "Invoice for {{NA"},
            {"text": "ME}}, total {{TOTAL}}"}
        ]}]
    });
    fs::write(&template_path, serde_json::to_string(&template)?)?;

    let record = json!({
        "name": "Ada",
        "total": ["19.99", "5.00"],
        "settings": {
            "fieldMappings": [
                {"sourceField": "name", "placeholder": "NAME"},
                {"sourceField": "total", "placeholder": "TOTAL"}
            ]
        }
    });
    fs::write(&data_path, serde_json::to_string(&record)?)?;

    Ok(Workspace {
        dir,
        template_path,
        data_path,
    })
}

fn generated_output(dir: &TempDir) -> Result<Value, Box<dyn Error>> {
    let out_dir = dir.path().join("out");
    for entry in fs::read_dir(&out_dir)? {
        let entry = entry?;
        if entry.path().extension().and_then(|e| e.to_str()) == Some("json") {
            return Ok(serde_json::from_str(&fs::read_to_string(entry.path())?)?);
        }
    }
    Err("no generated document found".into())
}

#[test]
fn merge_produces_document() -> Result<(), Box<dyn Error>> {
    let ws = build_workspace()?;
    let out_dir = ws.dir.path().join("out");

    assert_cmd::Command::cargo_bin("docfill")?
        .args([
            "merge",
            ws.template_path.to_str().unwrap(),
            ws.data_path.to_str().unwrap(),
            "-o",
            out_dir.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("replacements"));

    let merged = generated_output(&ws.dir)?;
    let text: String = merged["paragraphs"][0]["runs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|run| run["text"].as_str().unwrap())
        .collect();
    // Arrays default to their first element.
    assert_eq!(text, "Invoice for Ada, total 19.99");
    Ok(())
}

#[test]
fn merge_array_handling_flag_overrides_settings() -> Result<(), Box<dyn Error>> {
    let ws = build_workspace()?;
    let out_dir = ws.dir.path().join("out");

    assert_cmd::Command::cargo_bin("docfill")?
        .args([
            "merge",
            ws.template_path.to_str().unwrap(),
            ws.data_path.to_str().unwrap(),
            "-o",
            out_dir.to_str().unwrap(),
            "--array-handling",
            "join-comma",
        ])
        .assert()
        .success();

    let merged = generated_output(&ws.dir)?;
    let text: String = merged["paragraphs"][0]["runs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|run| run["text"].as_str().unwrap())
        .collect();
    assert_eq!(text, "Invoice for Ada, total 19.99, 5.00");
    Ok(())
}

#[test]
fn merge_missing_template_fails() -> Result<(), Box<dyn Error>> {
    let ws = build_workspace()?;
    assert_cmd::Command::cargo_bin("docfill")?
        .args([
            "merge",
            ws.dir.path().join("absent.json").to_str().unwrap(),
            ws.data_path.to_str().unwrap(),
        ])
        .assert()
        .failure();
    Ok(())
}

#[test]
fn templates_table_lists_entries() -> Result<(), Box<dyn Error>> {
    let ws = build_workspace()?;
    assert_cmd::Command::cargo_bin("docfill")?
        .args(["templates", ws.dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("invoice.json"));
    Ok(())
}

#[test]
fn templates_json_output_parses() -> Result<(), Box<dyn Error>> {
    let ws = build_workspace()?;
    let output = assert_cmd::Command::cargo_bin("docfill")?
        .args([
            "templates",
            ws.dir.path().to_str().unwrap(),
            "--format",
            "json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: Value = serde_json::from_slice(&output)?;
    let names: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"invoice.json"));
    // record.json sits in the same directory and is also a document template;
    // only non-template .txt files are filtered out.
    assert!(names.contains(&"record.json"));
    Ok(())
}

#[test]
fn serve_answers_ping_and_exits_on_eof() -> Result<(), Box<dyn Error>> {
    let mut request = Vec::new();
    let body = serde_json::to_vec(&json!({"action": "ping"}))?;
    request.extend_from_slice(&(body.len() as u32).to_le_bytes());
    request.extend_from_slice(&body);

    let output = assert_cmd::Command::cargo_bin("docfill")?
        .arg("serve")
        .write_stdin(request)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let len = u32::from_le_bytes(output[..4].try_into()?) as usize;
    let response: Value = serde_json::from_slice(&output[4..4 + len])?;
    assert_eq!(response["message"], json!("pong"));
    Ok(())
}
