use kanban_core::store::{self, tasks_key};
use kanban_core::{Kanban, KeyValueSlot, MemorySlot, Task, User};

const LEGACY: &str = r#"[{"id":5,"text":"Legacy","completed":false}]"#;

fn legacy_slot() -> MemorySlot {
    let mut slot = MemorySlot::new();
    slot.set(&tasks_key("u2"), LEGACY).unwrap();
    slot
}

#[test]
fn legacy_collection_is_migrated_and_written_back() {
    let mut slot = legacy_slot();
    let writes = slot.writes();

    let loaded = store::load(&mut slot, "u2").unwrap();

    assert!(loaded.migrated);
    assert_eq!(loaded.next_id, 6);
    assert_eq!(
        loaded.tasks,
        vec![Task {
            id: 5,
            text: "Legacy".to_string(),
            completed: false,
            owner_id: "u2".to_string(),
            comments: Vec::new(),
        }]
    );

    assert_eq!(slot.writes(), writes + 1);
    let raw = slot.get(&tasks_key("u2")).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json[0]["comments"], serde_json::json!([]));
}

#[test]
fn second_load_finds_migrated_data_and_does_not_write() {
    let mut slot = legacy_slot();
    store::load(&mut slot, "u2").unwrap();
    let after_first = slot.get(&tasks_key("u2")).unwrap();
    let writes = slot.writes();

    let loaded = store::load(&mut slot, "u2").unwrap();

    assert!(!loaded.migrated);
    assert_eq!(slot.writes(), writes);
    assert_eq!(slot.get(&tasks_key("u2")).unwrap(), after_first);
}

#[test]
fn migrated_board_continues_the_id_sequence() {
    let mut kanban = Kanban::open(legacy_slot()).unwrap();
    kanban
        .login(User::new("u2", "Bob", "bob@example.com"))
        .unwrap();

    assert_eq!(kanban.add_task("New").unwrap(), 6);
    kanban.add_comment(5, "still here").unwrap();
    assert_eq!(kanban.task(5).unwrap().comments.len(), 1);
}

#[test]
fn mixed_shapes_only_touch_legacy_records() {
    let mut slot = MemorySlot::new();
    slot.set(
        &tasks_key("u3"),
        r#"[
            {"id":1,"text":"new","completed":true,"ownerId":"u3","comments":[]},
            {"id":2,"text":"old","completed":false,"userId":"u3"}
        ]"#,
    )
    .unwrap();

    let loaded = store::load(&mut slot, "u3").unwrap();

    assert!(loaded.migrated);
    assert!(loaded.tasks[0].completed);
    assert!(loaded.tasks[1].comments.is_empty());
    assert_eq!(loaded.tasks[1].owner_id, "u3");
    assert_eq!(loaded.next_id, 3);
}
