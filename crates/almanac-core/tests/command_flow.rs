use almanac_core::commands::{add_task, delete_task, edit_task};
use almanac_core::datastore::DataStore;
use almanac_core::interact::Interact;
use almanac_core::task::Task;
use chrono::NaiveDate;
use tempfile::tempdir;

/// Scripted dialogs: records alerts, answers confirm/request_text from
/// preset values.
#[derive(Default)]
struct ScriptedInteract {
    alerts: Vec<String>,
    confirm_answer: bool,
    text_reply: Option<String>,
}

impl Interact for ScriptedInteract {
    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn confirm(&mut self, _prompt: &str) -> anyhow::Result<bool> {
        Ok(self.confirm_answer)
    }

    fn request_text(&mut self, _prompt: &str, _default: &str) -> anyhow::Result<Option<String>> {
        Ok(self.text_reply.clone())
    }
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn args(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(ToString::to_string).collect()
}

#[test]
fn add_appends_and_persists() {
    let temp = tempdir().expect("tempdir");
    let store = DataStore::open(temp.path()).expect("open datastore");
    let mut interact = ScriptedInteract::default();
    let mut tasks = Vec::new();

    let id = add_task(
        &mut tasks,
        &store,
        &mut interact,
        &args(&["buy", "milk", "date:2024-05-12"]),
        day(2024, 5, 10),
    )
    .expect("add task")
    .expect("task created");

    assert_eq!(tasks.len(), 1);
    let created = tasks.iter().find(|task| task.id == id).expect("by id");
    assert_eq!(created.text, "buy milk");
    assert_eq!(created.date, day(2024, 5, 12));
    assert!(interact.alerts.is_empty());

    // Persisted immediately: a fresh load sees the new task.
    assert_eq!(store.load_tasks(), tasks);
}

#[test]
fn add_ids_are_unique_and_monotonic() {
    let temp = tempdir().expect("tempdir");
    let store = DataStore::open(temp.path()).expect("open datastore");
    let mut interact = ScriptedInteract::default();
    let mut tasks = Vec::new();
    let today = day(2024, 5, 10);

    for text in ["one", "two", "three"] {
        add_task(
            &mut tasks,
            &store,
            &mut interact,
            &args(&[text, "date:today"]),
            today,
        )
        .expect("add task")
        .expect("task created");
    }

    let ids: Vec<u64> = tasks.iter().map(|task| task.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn add_without_text_alerts_and_leaves_state() {
    let temp = tempdir().expect("tempdir");
    let store = DataStore::open(temp.path()).expect("open datastore");
    let mut interact = ScriptedInteract::default();
    let mut tasks = Vec::new();

    let created = add_task(
        &mut tasks,
        &store,
        &mut interact,
        &args(&["date:2024-05-12"]),
        day(2024, 5, 10),
    )
    .expect("add runs");

    assert!(created.is_none());
    assert!(tasks.is_empty());
    assert_eq!(interact.alerts.len(), 1);
    assert!(store.load_tasks().is_empty());
}

#[test]
fn add_without_date_alerts_and_leaves_state() {
    let temp = tempdir().expect("tempdir");
    let store = DataStore::open(temp.path()).expect("open datastore");
    let mut interact = ScriptedInteract::default();
    let mut tasks = Vec::new();

    let created = add_task(
        &mut tasks,
        &store,
        &mut interact,
        &args(&["buy", "milk"]),
        day(2024, 5, 10),
    )
    .expect("add runs");

    assert!(created.is_none());
    assert!(tasks.is_empty());
    assert_eq!(interact.alerts.len(), 1);
}

#[test]
fn edit_replaces_only_text() {
    let temp = tempdir().expect("tempdir");
    let store = DataStore::open(temp.path()).expect("open datastore");
    let mut tasks = vec![
        Task::new(1, "old text".to_string(), day(2024, 5, 1)),
        Task::new(2, "other".to_string(), day(2024, 5, 2)),
    ];
    let mut interact = ScriptedInteract {
        text_reply: Some("  new text  ".to_string()),
        ..Default::default()
    };

    let changed = edit_task(&mut tasks, &store, &mut interact, 1).expect("edit");
    assert!(changed);
    assert_eq!(tasks[0].text, "new text");
    assert_eq!(tasks[0].id, 1);
    assert_eq!(tasks[0].date, day(2024, 5, 1));
    assert_eq!(tasks[1].text, "other");
    assert_eq!(store.load_tasks(), tasks);
}

#[test]
fn edit_cancel_or_whitespace_changes_nothing() {
    let temp = tempdir().expect("tempdir");
    let store = DataStore::open(temp.path()).expect("open datastore");
    let mut tasks = vec![Task::new(1, "keep me".to_string(), day(2024, 5, 1))];
    store.save_tasks(&tasks).expect("seed snapshot");

    let mut cancelled = ScriptedInteract::default();
    assert!(!edit_task(&mut tasks, &store, &mut cancelled, 1).expect("edit"));
    assert_eq!(tasks[0].text, "keep me");

    let mut blank = ScriptedInteract {
        text_reply: Some("   ".to_string()),
        ..Default::default()
    };
    assert!(!edit_task(&mut tasks, &store, &mut blank, 1).expect("edit"));
    assert_eq!(tasks[0].text, "keep me");
}

#[test]
fn edit_unknown_id_is_an_error() {
    let temp = tempdir().expect("tempdir");
    let store = DataStore::open(temp.path()).expect("open datastore");
    let mut tasks = Vec::new();
    let mut interact = ScriptedInteract::default();

    assert!(edit_task(&mut tasks, &store, &mut interact, 42).is_err());
}

#[test]
fn delete_confirmed_removes_exactly_one() {
    let temp = tempdir().expect("tempdir");
    let store = DataStore::open(temp.path()).expect("open datastore");
    let mut tasks = vec![
        Task::new(1, "a".to_string(), day(2024, 5, 1)),
        Task::new(2, "b".to_string(), day(2024, 5, 2)),
        Task::new(3, "c".to_string(), day(2024, 5, 3)),
    ];
    let mut interact = ScriptedInteract {
        confirm_answer: true,
        ..Default::default()
    };

    let removed = delete_task(&mut tasks, &store, &mut interact, 2).expect("delete");
    assert!(removed);
    let ids: Vec<u64> = tasks.iter().map(|task| task.id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(store.load_tasks(), tasks);
}

#[test]
fn delete_declined_is_a_noop() {
    let temp = tempdir().expect("tempdir");
    let store = DataStore::open(temp.path()).expect("open datastore");
    let mut tasks = vec![Task::new(1, "a".to_string(), day(2024, 5, 1))];
    store.save_tasks(&tasks).expect("seed snapshot");
    let mut interact = ScriptedInteract::default();

    let removed = delete_task(&mut tasks, &store, &mut interact, 1).expect("delete");
    assert!(!removed);
    assert_eq!(tasks.len(), 1);
    assert_eq!(store.load_tasks(), tasks);
}

#[test]
fn delete_unknown_id_is_a_noop() {
    let temp = tempdir().expect("tempdir");
    let store = DataStore::open(temp.path()).expect("open datastore");
    let mut tasks = vec![Task::new(1, "a".to_string(), day(2024, 5, 1))];
    let mut interact = ScriptedInteract {
        confirm_answer: true,
        ..Default::default()
    };

    let removed = delete_task(&mut tasks, &store, &mut interact, 99).expect("delete");
    assert!(!removed);
    assert_eq!(tasks.len(), 1);
}
