mod common;

use common::{Script, ScriptedService, CHECK_TEMPLATE, MODIFY_TEMPLATE};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use translation_proofreader::{App, Config};

fn write_json(path: &Path, value: &Value) {
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn config_in(dir: &TempDir) -> Config {
    let root = dir.path();
    std::fs::create_dir_all(root.join("en")).unwrap();
    std::fs::create_dir_all(root.join("zh")).unwrap();
    Config {
        en_folder: root.join("en").display().to_string(),
        zh_folder: root.join("zh").display().to_string(),
        modified_folder: root.join("out").display().to_string(),
        report_folder: root.join("report").display().to_string(),
        file_selection: Some("all".to_string()),
        max_workers: 2,
        item_timeout_secs: 5,
        poll_interval_ms: 10,
        batch_size: 2,
        check_prompt: CHECK_TEMPLATE.to_string(),
        modify_prompt: MODIFY_TEMPLATE.to_string(),
        ..Config::default()
    }
}

#[tokio::test]
async fn test_run_writes_modified_copy_and_reports() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let root = dir.path();

    write_json(
        &root.join("zh/quest_zh-sc.json"),
        &json!([
            {"name": "npc", "message": "今天天气很好"},
            {"name": "npc", "message": "你好"},
            {"name": "hero", "text": ""},
            {"name": "hero", "message": "再见"},
        ]),
    );
    write_json(
        &root.join("en/quest_en.json"),
        &json!([
            {"name": "npc", "message": "Today weather is good"},
            {"name": "npc", "message": "Hello"},
            {"name": "hero", "text": ""},
            {"name": "hero", "message": "Goodbye", "extra": 1},
        ]),
    );

    let service = ScriptedService::new()
        .script(
            "今天天气很好",
            Script::score(60).with_modify(r#"{"modified_text": "The weather is nice today."}"#),
        )
        .script("你好", Script::score(95))
        .script("再见", Script::failing());

    let app = App::with_client(config, Arc::new(service)).unwrap();
    app.run().await.unwrap();

    let modified = read_json(&root.join("out/quest_en.json"));
    assert_eq!(modified[0]["message"], "The weather is nice today.");
    assert_eq!(modified[1]["message"], "Hello");
    assert_eq!(modified[2]["text"], "");
    assert_eq!(modified[3]["message"], "Goodbye");
    assert_eq!(modified[3]["extra"], 1);

    let file_report = read_json(&root.join("report/quest_report.json"));
    assert_eq!(file_report["file_info"]["total_items"], 3);
    assert_eq!(file_report["file_info"]["modified_items"], 1);
    let indices: Vec<_> = file_report["reports"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["original_index"].as_u64().unwrap())
        .collect();
    assert_eq!(indices, vec![0, 1, 3]);

    let summary = read_json(&root.join("report/summary_report.json"));
    assert_eq!(summary["summary"]["total_items"], 3);
    assert_eq!(summary["summary"]["correct_items"], 1);
    assert!(summary["generated_at"].is_string());

    // 输入文件保持不变
    let original = read_json(&root.join("en/quest_en.json"));
    assert_eq!(original[0]["message"], "Today weather is good");
}

#[tokio::test]
async fn test_mismatched_lengths_skip_file() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let root = dir.path();

    write_json(&root.join("zh/a_zh-sc.json"), &json!([{"message": "一"}, {"message": "二"}]));
    write_json(&root.join("en/a_en.json"), &json!([{"message": "one"}]));

    let app = App::with_client(config, Arc::new(ScriptedService::new())).unwrap();
    app.run().await.unwrap();

    assert!(!root.join("out/a_en.json").exists());
    assert!(!root.join("report/summary_report.json").exists());
}

#[tokio::test]
async fn test_invalid_selection_processes_nothing() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir);
    config.file_selection = Some("first".to_string());
    let root = dir.path();

    write_json(&root.join("zh/b_zh-sc.json"), &json!([{"message": "一"}]));
    write_json(&root.join("en/b_en.json"), &json!([{"message": "one"}]));

    let service = Arc::new(ScriptedService::new());
    let app = App::with_client(config, service.clone()).unwrap();
    app.run().await.unwrap();

    assert_eq!(service.check_calls(), 0);
    assert!(!root.join("out").exists());
}

#[test]
fn test_zero_workers_rejected_at_startup() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir);
    config.max_workers = 0;
    assert!(App::with_client(config, Arc::new(ScriptedService::new())).is_err());
}
