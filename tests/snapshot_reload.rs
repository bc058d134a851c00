//! Integration tests for the reload loop: preference changes and library
//! updates republish the drawer, and published snapshots stay untouched.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use podnav::drawer::{ItemKind, NavBadge, NavTag};
use podnav::library::{
    DrawerDataSource, Library, LibraryError, LibraryFeed, LibraryFile, NavDrawerData,
};
use podnav::preferences::{PreferenceStore, Preferences};
use podnav::publish::{rebuild_snapshot, run_reload_loop, ReloadEvent, SnapshotPublisher};

const WAIT: Duration = Duration::from_secs(5);

/// In-memory source whose contents and failure mode can be changed mid-test.
struct TestSource {
    library: Mutex<Library>,
    fail: AtomicBool,
    loads: AtomicUsize,
}

impl TestSource {
    fn new(library: Library) -> Arc<Self> {
        Arc::new(Self {
            library: Mutex::new(library),
            fail: AtomicBool::new(false),
            loads: AtomicUsize::new(0),
        })
    }
}

impl DrawerDataSource for TestSource {
    fn load(&self, prefs: &Preferences) -> Result<NavDrawerData, LibraryError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(LibraryError::InvalidFeed {
                id: 0,
                title: "broken".to_string(),
            });
        }
        Ok(self.library.lock().unwrap().drawer_data(&prefs.open_folders))
    }
}

fn library_feed(id: i64, title: &str, counter: u32, tags: &[&str]) -> LibraryFeed {
    LibraryFeed {
        id,
        title: title.to_string(),
        image_url: None,
        last_update_failed: false,
        counter,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

fn sample_library() -> Library {
    Library {
        queue_size: 2,
        new_items: 5,
        feeds: vec![
            library_feed(1, "Daily Brief", 3, &["News"]),
            library_feed(2, "Compiler Hour", 1, &[]),
        ],
        ..Library::default()
    }
}

struct Harness {
    store: PreferenceStore,
    publisher: SnapshotPublisher,
    events: mpsc::Sender<ReloadEvent>,
    task: JoinHandle<()>,
}

impl Harness {
    fn start(source: Arc<dyn DrawerDataSource>) -> Self {
        let store = PreferenceStore::new(Preferences::default());
        let initial = source.load(&store.current()).unwrap();
        let publisher = SnapshotPublisher::new(rebuild_snapshot(&store.current(), initial));
        let (events, rx) = mpsc::channel(8);
        let task = tokio::spawn(run_reload_loop(
            source,
            store.subscribe(),
            rx,
            publisher.clone(),
        ));
        Self {
            store,
            publisher,
            events,
            task,
        }
    }

    async fn shutdown(self) {
        self.events.send(ReloadEvent::Shutdown).await.unwrap();
        tokio::time::timeout(WAIT, self.task)
            .await
            .expect("reload loop did not stop")
            .unwrap();
    }
}

#[tokio::test]
async fn test_hide_republishes_and_keeps_old_snapshot() {
    let harness = Harness::start(TestSource::new(sample_library()));
    let mut snapshots = harness.publisher.subscribe();
    snapshots.borrow_and_update();

    let old = harness.publisher.current();
    let old_rows: Vec<String> = (0..old.len()).map(|p| format!("{:?}", old.kind_at(p))).collect();

    assert!(harness.store.hide(&[NavTag::Queue, NavTag::Episodes]));
    tokio::time::timeout(WAIT, snapshots.changed())
        .await
        .expect("no snapshot published")
        .unwrap();

    let new = harness.publisher.current();
    assert!(!Arc::ptr_eq(&old, &new));
    assert_eq!(new.len(), old.len() - 2);
    assert!(matches!(new.kind_at(0), ItemKind::NavEntry(NavTag::Subscriptions)));

    // The snapshot handed out before the change reads exactly as before
    let rows_after: Vec<String> = (0..old.len()).map(|p| format!("{:?}", old.kind_at(p))).collect();
    assert_eq!(rows_after, old_rows);
    assert!(matches!(old.kind_at(0), ItemKind::NavEntry(NavTag::Queue)));

    harness.shutdown().await;
}

#[tokio::test]
async fn test_open_folder_republishes_children() {
    let harness = Harness::start(TestSource::new(sample_library()));
    let mut snapshots = harness.publisher.subscribe();
    snapshots.borrow_and_update();
    let closed_len = harness.publisher.current().len();

    assert!(harness.store.set_folder_open("News", true));
    tokio::time::timeout(WAIT, snapshots.changed())
        .await
        .expect("no snapshot published")
        .unwrap();

    assert_eq!(harness.publisher.current().len(), closed_len + 1);
    harness.shutdown().await;
}

#[tokio::test]
async fn test_library_changed_event_reloads() {
    let source = TestSource::new(sample_library());
    let harness = Harness::start(source.clone());
    let mut snapshots = harness.publisher.subscribe();
    snapshots.borrow_and_update();
    assert_eq!(
        harness.publisher.current().badge(NavTag::Queue),
        NavBadge::Count(2)
    );

    source.library.lock().unwrap().queue_size = 9;
    harness.events.send(ReloadEvent::LibraryChanged).await.unwrap();
    tokio::time::timeout(WAIT, snapshots.changed())
        .await
        .expect("no snapshot published")
        .unwrap();

    assert_eq!(
        harness.publisher.current().badge(NavTag::Queue),
        NavBadge::Count(9)
    );
    harness.shutdown().await;
}

#[tokio::test]
async fn test_failed_load_keeps_previous_snapshot() {
    let source = TestSource::new(sample_library());
    let harness = Harness::start(source.clone());
    let before = harness.publisher.current();
    let snapshots = harness.publisher.subscribe();

    source.fail.store(true, Ordering::SeqCst);
    harness.events.send(ReloadEvent::LibraryChanged).await.unwrap();

    // Events are handled in order, so the failed load finishes before shutdown
    let publisher = harness.publisher.clone();
    harness.shutdown().await;

    assert_eq!(source.loads.load(Ordering::SeqCst), 2);
    assert!(!snapshots.has_changed().unwrap_or(false));
    assert!(Arc::ptr_eq(&before, &publisher.current()));
}

#[tokio::test]
async fn test_library_file_source_rereads_on_change() {
    let dir = std::env::temp_dir().join("podnav_reload_library_file");
    std::fs::remove_dir_all(&dir).ok();
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("library.toml");
    std::fs::write(
        &path,
        r#"
queue_size = 1

[[feeds]]
id = 1
title = "Daily Brief"
counter = 2
"#,
    )
    .unwrap();

    let harness = Harness::start(Arc::new(LibraryFile::new(&path)));
    let mut snapshots = harness.publisher.subscribe();
    snapshots.borrow_and_update();
    assert_eq!(
        harness.publisher.current().badge(NavTag::Subscriptions),
        NavBadge::Count(2)
    );

    std::fs::write(
        &path,
        r#"
queue_size = 1

[[feeds]]
id = 1
title = "Daily Brief"
counter = 2

[[feeds]]
id = 2
title = "Compiler Hour"
counter = 4
"#,
    )
    .unwrap();
    harness.events.send(ReloadEvent::LibraryChanged).await.unwrap();
    tokio::time::timeout(WAIT, snapshots.changed())
        .await
        .expect("no snapshot published")
        .unwrap();

    let snapshot = harness.publisher.current();
    assert_eq!(snapshot.badge(NavTag::Subscriptions), NavBadge::Count(6));
    assert_eq!(snapshot.tree().roots().len(), 2);

    harness.shutdown().await;
    std::fs::remove_dir_all(&dir).ok();
}
