//! Integration tests for the SQLite store adapter behind a full session.
//!
//! The in-memory lifecycle tests cover dispatch semantics; these prove the
//! same flows hold when the port is backed by sqlite, including reopening a
//! database file to pick up persisted progress.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use lectern::content::{Lesson, Objective, Subject, Topic};
use lectern::state::BOOKMARKS_KEY;
use lectern::{
    Action, Config, ContentLibrary, Database, EmojiStatus, PreferenceManager, ProgressStore,
    Session,
};

fn library() -> Arc<ContentLibrary> {
    let subject = Subject {
        id: "physics".into(),
        title: "Physics".into(),
        description: "Mechanics".into(),
        topics: vec![Topic {
            id: "t1".into(),
            title: "Kinematics".into(),
            description: String::new(),
            lessons: vec![Lesson {
                id: "l1".into(),
                title: "Velocity".into(),
                objectives: vec![
                    Objective {
                        id: "o1".into(),
                        text: "Define average velocity".into(),
                    },
                    Objective {
                        id: "o2".into(),
                        text: "Distinguish speed from velocity".into(),
                    },
                ],
                sections: Vec::new(),
            }],
        }],
    };
    Arc::new(ContentLibrary::from_subjects(vec![subject]).unwrap())
}

async fn session(db: Database) -> Session<Database> {
    let prefs = PreferenceManager::load(&Config::default(), &db).await;
    Session::open(library(), db, "physics", prefs)
        .await
        .unwrap()
}

#[tokio::test]
async fn dispatch_writes_snapshot_rows() {
    let db = Database::open(":memory:").await.unwrap();
    let mut s = session(db.clone()).await;

    s.dispatch(Action::ToggleObjective {
        objective_id: "o1".into(),
    })
    .await
    .unwrap();
    s.dispatch(Action::ToggleBookmark {
        lesson_id: "l1".into(),
    })
    .await
    .unwrap();

    let snapshot = db.get("progress-physics").await.unwrap().unwrap();
    assert_eq!(snapshot["o1"]["completed"], serde_json::json!(true));
    assert_eq!(
        db.get(BOOKMARKS_KEY).await.unwrap(),
        Some(serde_json::json!(["l1"]))
    );
}

#[tokio::test]
async fn session_restart_over_same_store_restores_progress() {
    let db = Database::open(":memory:").await.unwrap();
    {
        let mut s = session(db.clone()).await;
        s.dispatch(Action::ToggleObjective {
            objective_id: "o1".into(),
        })
        .await
        .unwrap();
        s.dispatch(Action::SetEmoji {
            objective_id: "o2".into(),
            status: EmojiStatus::Neutral,
        })
        .await
        .unwrap();
        s.dispatch(Action::AddComment {
            objective_id: "o1".into(),
            text: "velocity is displacement over time".into(),
        })
        .await
        .unwrap();
    }

    let s = session(db).await;
    let view = s.subject_view();
    let lesson = &view.topics[0].lessons[0];
    assert!(lesson.objectives[0].completed);
    assert_eq!(lesson.objectives[1].emoji, EmojiStatus::Neutral);
    assert_eq!(
        lesson.objectives[0].comments[0].text,
        "velocity is displacement over time"
    );
    assert_eq!(lesson.done_count, 1);
}

#[tokio::test]
async fn reopening_a_database_file_picks_up_progress() {
    let dir = std::env::temp_dir().join(format!("lectern-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("reopen.db");
    let path = path.to_str().unwrap();

    {
        let db = Database::open(path).await.unwrap();
        let mut s = session(db).await;
        s.dispatch(Action::ToggleObjective {
            objective_id: "o2".into(),
        })
        .await
        .unwrap();
    }

    let db = Database::open(path).await.unwrap();
    let s = session(db).await;
    assert!(s.subject_view().topics[0].lessons[0].objectives[1].completed);

    std::fs::remove_file(path).ok();
}

#[tokio::test]
async fn preferences_share_the_store_with_progress() {
    let db = Database::open(":memory:").await.unwrap();
    {
        let mut s = session(db.clone()).await;
        s.dispatch(Action::SetExpandAll(true)).await.unwrap();
        s.dispatch(Action::ToggleObjective {
            objective_id: "o1".into(),
        })
        .await
        .unwrap();
    }

    let s = session(db).await;
    assert!(s.expand_all());
    assert!(s.subject_view().topics[0].lessons[0].objectives[0].completed);
}
