//! End-to-end tests: JSON Lines snapshot stream -> two JSON tables on disk.

use std::io::Write;
use std::path::Path;

use frametab_core::prelude::*;
use frametab_export::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg64;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Popo/Nana vs Fox; Nana dies on the last frame, Fox fires lasers.
fn stream() -> String {
    let lines = [
        r#"{"frame": -200, "menu_state": "CHARACTER_SELECT"}"#,
        r#"{"frame": -123, "stage": "FINAL_DESTINATION", "startAt": "2023-05-02T03:39:34Z",
            "players": [
              {"port": 1, "character": "POPO", "action": "STANDING", "stock": 4,
               "nana": {"character": "NANA", "action": "STANDING", "percent": 0.0}},
              {"port": 2, "character": "FOX", "action": "STANDING", "stock": 4}]}"#,
        r#"{"frame": -122, "stage": "FINAL_DESTINATION", "startAt": "2023-05-02T03:39:34Z",
            "players": [
              {"port": 1, "character": "POPO", "action": "STANDING", "stock": 4},
              {"port": 2, "character": "FOX", "action": "STANDING", "stock": 4,
               "controller_state": {"buttons": {"BUTTON_B": true}, "main_stick": [0.5, 0.0]}}],
            "projectiles": [{"owner": 2, "type": "FOX_LASER"}, {"owner": 2, "type": "FOX_LASER"},
                            {"owner": 2, "type": "FOX_LASER"}]}"#,
    ];
    // One snapshot per line.
    lines
        .iter()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

fn write_stream(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("game.jsonl");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "{}", stream()).unwrap();
    path
}

fn init_logs() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn column<'a>(doc: &'a serde_json::Value, name: &str) -> &'a serde_json::Value {
    doc["columns"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == name)
        .unwrap_or_else(|| panic!("no column {name}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn jsonl_replay_exports_two_tables() {
    init_logs();
    let dir = tempfile::tempdir().unwrap();
    let input = write_stream(dir.path());

    let source = JsonLinesSource::open(&input).unwrap();
    let export = export_replay(source, &ExportOptions::default()).unwrap();
    assert_eq!(export.stats.frames, 2);
    assert_eq!(export.stats.skipped, 1);
    assert!(export.stats.dropped.is_clean());

    let name = OutputName::new(&export.meta, &mut Pcg64::seed_from_u64(9));
    assert!(name
        .base()
        .starts_with("final_destination_popo_vs_fox_2023_05_02t033934z_"));

    let [p1_path, p2_path] = write_replay(dir.path(), &name, &export, DEFAULT_EXTENSION).unwrap();
    let p1 = read_json(&p1_path);
    let p2 = read_json(&p2_path);

    assert_eq!(p1["rows"], 2);
    assert_eq!(p1["schema_fingerprint"], p2["schema_fingerprint"]);
    let names = |doc: &serde_json::Value| -> Vec<serde_json::Value> {
        doc["columns"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].clone())
            .collect()
    };
    assert_eq!(names(&p1), names(&p2));
    assert_eq!(names(&p1).len(), Schema::canonical().len());

    // p1 view: Popo is self.
    assert_eq!(column(&p1, "self_port")["values"], serde_json::json!([1, 1]));
    assert_eq!(column(&p2, "self_port")["values"], serde_json::json!([2, 2]));
    assert_eq!(
        column(&p2, "self_btn_BUTTON_B")["values"],
        serde_json::json!([false, true])
    );
    assert_eq!(column(&p2, "self_main_x")["type"], "float32");
    assert_eq!(column(&p2, "self_main_x")["values"], serde_json::json!([0.0, 0.5]));

    // Nana present, then gone: placeholder NaN written as null.
    assert_eq!(
        column(&p1, "self_nana_percent")["values"],
        serde_json::json!([0.0, null])
    );
    assert_eq!(
        column(&p1, "opp_nana_stock")["values"],
        serde_json::json!([-1, -1])
    );

    // Three lasers on the second frame, five empty slots.
    assert_eq!(column(&p1, "proj2_owner")["values"], serde_json::json!([-1, 2]));
    assert_eq!(column(&p1, "proj3_owner")["values"], serde_json::json!([-1, -1]));
    assert_eq!(column(&p1, "proj7_type")["values"], serde_json::json!([-1, -1]));
}

#[test]
fn malformed_line_fails_the_replay() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.jsonl");
    std::fs::write(&path, "{\"frame\": 0}\n{\"frame\": \"zero\"}\n").unwrap();

    let err = export_replay(JsonLinesSource::open(&path).unwrap(), &ExportOptions::default())
        .unwrap_err();
    assert!(format!("{err:#}").contains("line 2"));
}

#[test]
fn unknown_labels_export_as_sentinel() {
    let snaps = vec![Snapshot {
        stage: Some("NOT_A_REAL_STAGE".to_owned()),
        players: vec![PlayerEntry {
            port: 1,
            state: ParticipantState {
                body: CharacterState {
                    character: Some("NOT_A_REAL_CHARACTER".to_owned()),
                    ..Default::default()
                },
                nana: None,
            },
        }],
        ..Default::default()
    }];
    let export = export_replay(from_snapshots(snaps), &ExportOptions::default()).unwrap();
    let stage = export.p1.column("stage").and_then(|c| c.get(0));
    assert_eq!(stage, Some(Value::Int(-1)));
    let character = export.p1.column("self_character").and_then(|c| c.get(0));
    assert_eq!(character, Some(Value::Int(-1)));
    assert_eq!(export.stats.dropped.missing_participants, 1);
}
