use std::cell::Cell;
use std::io;
use std::rc::Rc;

use kanban_core::store::{self, tasks_key};
use kanban_core::{
    Column, CoreError, Kanban, KeyValueSlot, MemorySlot, StoreError, User, ValidationError,
};
use rstest::{fixture, rstest};

#[fixture]
fn alice() -> User {
    User::new("u1", "Alice", "alice@example.com")
}

#[fixture]
fn kanban(alice: User) -> Kanban<MemorySlot> {
    let mut kanban = Kanban::open(MemorySlot::new()).unwrap();
    kanban.login(alice).unwrap();
    kanban
}

fn stored(kanban: &Kanban<MemorySlot>, owner_id: &str) -> Option<String> {
    kanban.slot().get(&tasks_key(owner_id)).unwrap()
}

#[rstest]
fn add_toggle_comment_end_to_end(mut kanban: Kanban<MemorySlot>) {
    let id = kanban.add_task("Buy milk").unwrap();
    assert_eq!(id, 1);

    let raw = stored(&kanban, "u1").unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{
            "id": 1,
            "text": "Buy milk",
            "completed": false,
            "ownerId": "u1",
            "comments": []
        }])
    );

    kanban.toggle_completion(1).unwrap();
    assert!(kanban.task(1).unwrap().completed);

    kanban.add_comment(1, "done").unwrap();
    let comments = &kanban.task(1).unwrap().comments;
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].content, "done");
    assert_eq!(comments[0].author_id, "u1");
    assert_eq!(comments[0].author_name, "Alice");

    let reloaded = store::load(&mut kanban.into_slot(), "u1").unwrap();
    assert!(reloaded.tasks[0].completed);
    assert_eq!(reloaded.tasks[0].comments.len(), 1);
}

#[rstest]
#[case(&["a"])]
#[case(&["a", "b", "c"])]
fn add_then_load_has_one_more_task_with_larger_id(
    mut kanban: Kanban<MemorySlot>,
    #[case] existing: &[&str],
) {
    for text in existing {
        kanban.add_task(text).unwrap();
    }
    let before = kanban.tasks().to_vec();

    kanban.add_task("one more").unwrap();

    let loaded = store::load(&mut kanban.into_slot(), "u1").unwrap();
    assert_eq!(loaded.tasks.len(), before.len() + 1);
    let new_id = loaded.tasks.last().unwrap().id;
    assert!(before.iter().all(|t| t.id < new_id));
}

#[rstest]
fn blank_input_is_rejected_without_writing(mut kanban: Kanban<MemorySlot>) {
    kanban.add_task("keep").unwrap();
    let writes = kanban.slot().writes();

    assert!(matches!(
        kanban.add_task("   "),
        Err(CoreError::Validation(ValidationError::EmptyTaskText))
    ));
    assert!(matches!(
        kanban.add_comment(1, "  "),
        Err(CoreError::Validation(ValidationError::EmptyComment))
    ));

    assert!(kanban.task(1).unwrap().comments.is_empty());
    assert_eq!(kanban.slot().writes(), writes);
    assert_eq!(kanban.next_id(), Some(2));
}

#[rstest]
fn toggling_twice_restores_the_collection(mut kanban: Kanban<MemorySlot>) {
    kanban.add_task("a").unwrap();
    kanban.add_task("b").unwrap();
    let before = kanban.tasks().to_vec();

    kanban.toggle_completion(2).unwrap();
    kanban.toggle_completion(2).unwrap();

    assert_eq!(kanban.tasks(), before.as_slice());
}

#[rstest]
fn unknown_ids_are_tolerated(mut kanban: Kanban<MemorySlot>) {
    kanban.add_task("a").unwrap();
    let before = stored(&kanban, "u1");

    kanban.toggle_completion(42).unwrap();
    kanban.add_comment(42, "hello").unwrap();

    assert_eq!(stored(&kanban, "u1"), before);
}

#[rstest]
fn drop_on_own_column_never_writes(mut kanban: Kanban<MemorySlot>) {
    kanban.add_task("a").unwrap();
    let before = stored(&kanban, "u1");
    let writes = kanban.slot().writes();

    for _ in 0..3 {
        kanban.start_drag(1);
        assert!(!kanban.drop_on(Column::Incomplete).unwrap());
    }

    assert_eq!(kanban.slot().writes(), writes);
    assert_eq!(stored(&kanban, "u1"), before);
    assert_eq!(kanban.dragging(), None);
}

#[rstest]
fn drop_across_columns_moves_and_persists(mut kanban: Kanban<MemorySlot>) {
    kanban.add_task("a").unwrap();
    kanban.add_task("b").unwrap();

    kanban.start_drag(2);
    assert!(kanban.drop_on(Column::Completed).unwrap());

    let partition = kanban.partition();
    assert_eq!(partition.counts(), (1, 1));
    assert_eq!(partition.completed[0].id, 2);

    let loaded = store::load(&mut kanban.into_slot(), "u1").unwrap();
    assert!(loaded.tasks[1].completed);
}

#[rstest]
fn starting_a_second_drag_abandons_the_first(mut kanban: Kanban<MemorySlot>) {
    kanban.add_task("a").unwrap();
    kanban.add_task("b").unwrap();

    kanban.start_drag(1);
    kanban.start_drag(2);
    kanban.drop_on(Column::Completed).unwrap();

    assert!(!kanban.task(1).unwrap().completed);
    assert!(kanban.task(2).unwrap().completed);
}

#[rstest]
fn drop_with_nothing_in_flight_is_a_no_op(mut kanban: Kanban<MemorySlot>) {
    let writes = kanban.slot().writes();
    assert!(!kanban.drop_on(Column::Completed).unwrap());
    assert_eq!(kanban.slot().writes(), writes);
}

#[test]
fn owners_keep_separate_collections_and_sequences() {
    let mut kanban = Kanban::open(MemorySlot::new()).unwrap();

    kanban.login_by_id("1").unwrap();
    kanban.add_task("tanaka's").unwrap();
    kanban.add_task("tanaka's second").unwrap();

    kanban.login_by_id("2").unwrap();
    assert!(kanban.tasks().is_empty());
    assert_eq!(kanban.add_task("sato's").unwrap(), 1);

    kanban.login_by_id("1").unwrap();
    assert_eq!(kanban.tasks().len(), 2);
    assert!(kanban.tasks().iter().all(|t| t.owner_id == "1"));
}

#[test]
fn signed_out_mutations_are_refused() {
    let mut kanban = Kanban::open(MemorySlot::new()).unwrap();
    assert!(matches!(kanban.add_task("x"), Err(CoreError::NoSession)));
    assert!(matches!(kanban.toggle_completion(1), Err(CoreError::NoSession)));
    assert!(kanban.tasks().is_empty());
}

#[test]
fn login_by_unknown_id_fails() {
    let mut kanban = Kanban::open(MemorySlot::new()).unwrap();
    assert!(matches!(
        kanban.login_by_id("nobody"),
        Err(CoreError::UnknownUser(id)) if id == "nobody"
    ));
}

#[test]
fn register_starts_an_empty_board() {
    let mut kanban = Kanban::open(MemorySlot::new()).unwrap();
    let user = kanban.register("Dana", "dana@example.com").unwrap();

    assert_eq!(kanban.current_user(), Some(&user));
    assert_eq!(kanban.next_id(), Some(1));
    assert_eq!(kanban.users().unwrap().len(), 4);
}

#[rstest]
fn logout_clears_board_and_session(mut kanban: Kanban<MemorySlot>) {
    kanban.add_task("a").unwrap();
    kanban.start_drag(1);

    kanban.logout().unwrap();

    assert!(kanban.current_user().is_none());
    assert!(kanban.tasks().is_empty());
    assert_eq!(kanban.dragging(), None);

    let reopened = Kanban::open(kanban.into_slot()).unwrap();
    assert!(reopened.current_user().is_none());
}

#[rstest]
fn corrupt_tasks_recover_to_an_empty_board(alice: User) {
    let mut slot = MemorySlot::new();
    slot.set(&tasks_key("u1"), "not json at all").unwrap();

    let mut kanban = Kanban::open(slot).unwrap();
    kanban.login(alice).unwrap();

    assert!(kanban.tasks().is_empty());
    assert_eq!(kanban.next_id(), Some(1));
    let warning = kanban.take_warning().unwrap();
    assert!(warning.contains("reset"));
    assert!(kanban.take_warning().is_none());

    kanban.add_task("fresh start").unwrap();
    let loaded = store::load(&mut kanban.into_slot(), "u1").unwrap();
    assert_eq!(loaded.tasks.len(), 1);
}

/// Memory slot whose writes can be made to fail from outside the board.
struct FlakySlot {
    inner: MemorySlot,
    failing: Rc<Cell<bool>>,
}

impl KeyValueSlot for FlakySlot {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.failing.get() {
            return Err(io::Error::new(io::ErrorKind::Other, "disk full").into());
        }
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key)
    }
}

#[rstest]
fn failed_write_leaves_the_board_untouched(alice: User) {
    let failing = Rc::new(Cell::new(false));
    let slot = FlakySlot {
        inner: MemorySlot::new(),
        failing: Rc::clone(&failing),
    };
    let mut kanban = Kanban::open(slot).unwrap();
    kanban.login(alice).unwrap();
    kanban.add_task("Saved").unwrap();

    failing.set(true);
    assert!(matches!(kanban.add_task("Lost"), Err(CoreError::Store(_))));
    assert!(matches!(kanban.toggle_completion(1), Err(CoreError::Store(_))));
    assert!(matches!(kanban.add_comment(1, "lost"), Err(CoreError::Store(_))));
    kanban.start_drag(1);
    assert!(matches!(kanban.drop_on(Column::Completed), Err(CoreError::Store(_))));

    assert_eq!(kanban.tasks().len(), 1);
    assert!(!kanban.tasks()[0].completed);
    assert!(kanban.tasks()[0].comments.is_empty());
    assert_eq!(kanban.next_id(), Some(2));

    failing.set(false);
    assert_eq!(kanban.add_task("Next").unwrap(), 2);
    let reloaded = store::load(&mut kanban.into_slot().inner, "u1").unwrap();
    let texts: Vec<_> = reloaded.tasks.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["Saved", "Next"]);
}

#[rstest]
fn exhausted_ids_are_refused_without_writing(mut kanban: Kanban<MemorySlot>) {
    kanban.add_task("first").unwrap();
    let raw = format!(
        r#"[{{"id":{},"text":"last","completed":false,"ownerId":"u1","comments":[]}}]"#,
        i64::MAX - 1
    );
    let mut slot = kanban.into_slot();
    slot.set(&tasks_key("u1"), &raw).unwrap();

    let mut kanban = Kanban::open(slot).unwrap();
    assert_eq!(kanban.next_id(), Some(i64::MAX));
    let writes = kanban.slot().writes();

    match kanban.add_task("one too many") {
        Err(CoreError::Validation(e)) => assert_eq!(e, ValidationError::TaskIdsExhausted),
        other => panic!("expected exhausted ids, got {other:?}"),
    }
    assert_eq!(kanban.slot().writes(), writes);
    assert_eq!(kanban.tasks().len(), 1);
}

#[rstest]
fn overflowing_stored_ids_recover_like_corrupt_data(alice: User) {
    let mut slot = MemorySlot::new();
    let raw = format!(
        r#"[{{"id":{},"text":"last","completed":false,"ownerId":"u1","comments":[]}}]"#,
        i64::MAX
    );
    slot.set(&tasks_key("u1"), &raw).unwrap();

    let mut kanban = Kanban::open(slot).unwrap();
    kanban.login(alice).unwrap();

    assert!(kanban.tasks().is_empty());
    assert_eq!(kanban.next_id(), Some(1));
    assert!(kanban.take_warning().is_some());
}
