use chrono::NaiveDate;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use taskboard_core::{
    Board, BoardPersistence, BoardSnapshot, Category, CategoryService, NewTask, PersistError,
    PersistResult, ServiceError, SqliteBoardStore, StoreError, Task, TaskFilter, TaskPriority,
    TaskService,
};
use uuid::Uuid;

/// In-memory backend whose saves can be switched to fail.
#[derive(Clone, Default)]
struct FlakyStore {
    saved: Arc<Mutex<Option<BoardSnapshot>>>,
    initial: BoardSnapshot,
    fail_saves: Arc<AtomicBool>,
}

impl BoardPersistence for FlakyStore {
    fn load_all(&self) -> PersistResult<BoardSnapshot> {
        Ok(self.initial.clone())
    }

    fn save(&self, snapshot: &BoardSnapshot) -> PersistResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(PersistError::Backend("disk full".to_string()));
        }
        *self.saved.lock() = Some(snapshot.clone());
        Ok(())
    }
}

fn services(board: &Board) -> (TaskService, CategoryService) {
    (
        TaskService::new(board.clone()),
        CategoryService::new(board.clone()),
    )
}

#[test]
fn sqlite_round_trip_preserves_board() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");

    let before = {
        let board = Board::with_persistence(SqliteBoardStore::open(&path).unwrap())
            .ok()
            .unwrap();
        let (tasks, categories) = services(&board);

        let work = categories.create_category("Work").unwrap();
        categories.create_category("Home").unwrap();
        let first = tasks
            .create_task(NewTask {
                title: "Quarterly report".to_string(),
                due_date: NaiveDate::from_ymd_opt(2026, 12, 31),
                category_id: Some(work.id),
                priority: Some(TaskPriority::High),
            })
            .unwrap();
        let dropped = tasks.create_task(NewTask::new("Scratch")).unwrap();
        tasks.create_task(NewTask::new("Laundry")).unwrap();
        tasks.toggle_complete(first.id).unwrap();
        tasks.delete_task(dropped.id).unwrap();

        board.snapshot()
    };
    assert_eq!(before.next_seq, 4);

    let reopened = Board::with_persistence(SqliteBoardStore::open(&path).unwrap())
        .ok()
        .unwrap();
    assert_eq!(reopened.snapshot(), before);

    let (tasks, categories) = services(&reopened);
    let names: Vec<_> = categories
        .list_categories()
        .into_iter()
        .map(|category| category.name)
        .collect();
    assert_eq!(names, vec!["Work", "Home"]);

    let created = tasks.create_task(NewTask::new("After reopen")).unwrap();
    assert_eq!(created.created_seq, 4);
}

#[test]
fn cascade_delete_is_persisted() {
    let store = SqliteBoardStore::open_in_memory().unwrap();
    let board = Board::with_persistence(store).ok().unwrap();
    let (tasks, categories) = services(&board);

    let work = categories.create_category("Work").unwrap();
    let task = tasks
        .create_task(NewTask {
            category_id: Some(work.id),
            ..NewTask::new("Report")
        })
        .unwrap();
    categories.delete_category(work.id).unwrap();

    let snapshot = board.snapshot();
    assert!(snapshot.categories.is_empty());
    assert_eq!(snapshot.tasks[0].id, task.id);
    assert_eq!(snapshot.tasks[0].category_id, None);
}

#[test]
fn every_successful_mutation_is_saved() {
    let store = FlakyStore::default();
    let board = Board::with_persistence(store.clone()).ok().unwrap();
    let (tasks, _) = services(&board);

    tasks.create_task(NewTask::new("Saved")).unwrap();
    assert_eq!(store.saved.lock().as_ref(), Some(&board.snapshot()));

    let err = tasks.create_task(NewTask::new("  ")).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(store.saved.lock().as_ref().map(|s| s.tasks.len()), Some(1));
}

#[test]
fn failed_save_leaves_board_unchanged() {
    let store = FlakyStore::default();
    let board = Board::with_persistence(store.clone()).ok().unwrap();
    let (tasks, categories) = services(&board);

    let work = categories.create_category("Work").unwrap();
    let task = tasks
        .create_task(NewTask {
            category_id: Some(work.id),
            ..NewTask::new("Report")
        })
        .unwrap();
    let before = board.snapshot();

    store.fail_saves.store(true, Ordering::SeqCst);
    let err = categories.delete_category(work.id).unwrap_err();
    assert!(matches!(err, ServiceError::Persistence(PersistError::Backend(_))));
    assert!(tasks.create_task(NewTask::new("Lost")).is_err());
    assert_eq!(board.snapshot(), before);
    assert_eq!(tasks.get_task(task.id).unwrap().category_id, Some(work.id));

    store.fail_saves.store(false, Ordering::SeqCst);
    let retried = tasks.create_task(NewTask::new("Kept")).unwrap();
    assert_eq!(retried.created_seq, 2);
    assert_eq!(tasks.list_tasks(&TaskFilter::default()).len(), 2);
}

#[test]
fn invalid_stored_board_is_rejected_on_open() {
    let categories: Vec<_> = (0..6)
        .map(|index| Category::new(format!("Category {index}")))
        .collect();
    let store = FlakyStore {
        initial: BoardSnapshot {
            categories,
            ..BoardSnapshot::default()
        },
        ..FlakyStore::default()
    };
    let err = Board::with_persistence(store).err().unwrap();
    assert!(matches!(err, PersistError::InvalidData(_)));

    let mut orphan = Task::new(Uuid::new_v4(), "Orphan", 1);
    orphan.category_id = Some(Uuid::new_v4());
    let store = FlakyStore {
        initial: BoardSnapshot {
            tasks: vec![orphan],
            next_seq: 2,
            ..BoardSnapshot::default()
        },
        ..FlakyStore::default()
    };
    assert!(Board::with_persistence(store).is_err());
}

#[test]
fn snapshot_serializes_to_stable_shape() {
    let board = Board::new();
    let (tasks, categories) = services(&board);
    let home = categories.create_category("Home").unwrap();
    tasks
        .create_task(NewTask {
            due_date: NaiveDate::from_ymd_opt(2026, 1, 2),
            category_id: Some(home.id),
            priority: Some(TaskPriority::Medium),
            ..NewTask::new("Dishes")
        })
        .unwrap();

    let value = serde_json::to_value(board.snapshot()).unwrap();
    assert_eq!(value["next_seq"], 2);
    assert_eq!(value["categories"][0]["name"], "Home");
    let task = &value["tasks"][0];
    assert_eq!(task["title"], "Dishes");
    assert_eq!(task["completed"], false);
    assert_eq!(task["due_date"], "2026-01-02");
    assert_eq!(task["priority"], "medium");
    assert_eq!(task["category_id"], home.id.to_string());
    assert_eq!(task["created_seq"], 1);

    let decoded: BoardSnapshot = serde_json::from_value(value).unwrap();
    assert_eq!(decoded, board.snapshot());
}

#[test]
fn exhausted_sequence_rejects_new_tasks() {
    let store = FlakyStore {
        initial: BoardSnapshot {
            next_seq: u64::MAX,
            ..BoardSnapshot::default()
        },
        ..FlakyStore::default()
    };
    let board = Board::with_persistence(store.clone()).ok().unwrap();
    let (tasks, _) = services(&board);

    let err = tasks.create_task(NewTask::new("One too many")).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Store(StoreError::SequenceExhausted)
    ));
    assert!(tasks.list_tasks(&TaskFilter::default()).is_empty());
    assert!(store.saved.lock().is_none());
}
