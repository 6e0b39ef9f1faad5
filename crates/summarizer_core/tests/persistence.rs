use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use summarizer_core::persistence::{self, PersistenceError, QUARANTINE_KEY};
use summarizer_core::seed::seed_summaries;
use summarizer_core::{
    KnowledgeLevel, MemoryStorage, OutputType, PersistedState, PortError, PortResult,
    RehydrationOutcome, SourceType, StateStorage, Store, SummaryDraft, SummaryLength,
    STORAGE_KEY,
};

fn draft(
    source_type: SourceType,
    output_type: OutputType,
    summary_length: SummaryLength,
    knowledge_level: KnowledgeLevel,
) -> SummaryDraft {
    SummaryDraft {
        title: format!("{source_type:?} as {output_type:?}"),
        content: "body with \"quotes\" and unicode: résumé".to_string(),
        source: "https://example.com/a?b=c".to_string(),
        source_type,
        output_type,
        summary_length,
        knowledge_level,
        is_favorite: summary_length == SummaryLength::Long,
        tags: vec!["dup".into(), "dup".into(), knowledge_level.to_string()],
    }
}

#[test]
fn round_trip_preserves_every_field() {
    let storage = Arc::new(MemoryStorage::new());
    let mut store = Store::open(storage.clone());

    let combos = [
        (SourceType::Video, OutputType::Text, SummaryLength::Short, KnowledgeLevel::Beginner),
        (SourceType::Article, OutputType::Video, SummaryLength::Medium, KnowledgeLevel::Intermediate),
        (SourceType::Text, OutputType::Text, SummaryLength::Long, KnowledgeLevel::Advanced),
    ];
    for (source_type, output_type, length, level) in combos {
        store.add_summary(draft(source_type, output_type, length, level));
    }
    store.toggle_theme();

    let raw = storage.get(STORAGE_KEY).expect("state should be written");
    let decoded = persistence::decode(&raw).unwrap();
    assert!(decoded.is_dark_mode);
    assert_eq!(decoded.summaries.as_slice(), store.state().summaries());

    // Timestamps and enumerations have an explicit textual form.
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let first = &value["state"]["summaries"][0];
    assert_eq!(first["sourceType"], "text");
    assert_eq!(first["outputType"], "text");
    assert_eq!(first["summaryLength"], "long");
    assert_eq!(first["knowledgeLevel"], "advanced");
    let created_at = first["createdAt"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(created_at).is_ok());
}

#[test]
fn restart_restores_only_the_declared_subset() {
    let storage = Arc::new(MemoryStorage::new());
    {
        let mut store = Store::open(storage.clone());
        store.toggle_theme();
        store.toggle_sidebar();
        store.set_is_loading(true);
        store.set_current_summary(Some("3")).unwrap();
        store.delete_summary("5");
    }

    let store = Store::open(storage);
    assert_eq!(store.rehydration(), &RehydrationOutcome::Restored);
    let state = store.state();
    assert!(state.is_dark_mode());
    assert_eq!(state.summaries().len(), 4);
    assert!(state.summary("5").is_none());
    assert!(state.is_sidebar_open());
    assert!(!state.is_loading());
    assert!(state.current_summary().is_none());
}

#[test]
fn transient_mutations_do_not_write() {
    let storage = Arc::new(MemoryStorage::new());
    let mut store = Store::open(storage.clone());
    store.toggle_sidebar();
    store.set_is_loading(true);
    store.set_current_summary(Some("1")).unwrap();
    assert!(storage.get(STORAGE_KEY).is_none());
}

#[test]
fn first_run_uses_seed() {
    let store = Store::in_memory();
    assert_eq!(store.rehydration(), &RehydrationOutcome::FirstRun);
    assert_eq!(store.state().summaries(), seed_summaries().as_slice());
}

#[test]
fn corrupt_state_fails_closed_and_is_preserved() {
    let corrupt = r#"{"state":{"isDarkMode":true,"summaries":[{"id":"1","tit"#;
    let storage = Arc::new(MemoryStorage::with_value(STORAGE_KEY, corrupt));

    let mut store = Store::open(storage.clone());
    assert!(matches!(store.rehydration(), RehydrationOutcome::Recovered { .. }));
    assert_eq!(store.state().summaries(), seed_summaries().as_slice());
    assert!(!store.state().is_dark_mode());
    assert_eq!(storage.get(STORAGE_KEY).as_deref(), Some(corrupt));
    assert_eq!(storage.get(QUARANTINE_KEY).as_deref(), Some(corrupt));

    // Later writes replace the main record but the copy survives.
    store.toggle_theme();
    assert_ne!(storage.get(STORAGE_KEY).as_deref(), Some(corrupt));
    assert_eq!(storage.get(QUARANTINE_KEY).as_deref(), Some(corrupt));
}

#[test]
fn wrong_shape_fails_closed() {
    for raw in [
        "",
        "null",
        "[]",
        r#"{"state":{"isDarkMode":"yes","summaries":[]},"version":0}"#,
        r#"{"state":{"isDarkMode":false,"summaries":[{"id":"1","title":"t","content":"c","source":"s","sourceType":"podcast","outputType":"text","summaryLength":"short","knowledgeLevel":"beginner","createdAt":"2024-01-01T00:00:00Z","isFavorite":false,"tags":[]}]},"version":0}"#,
    ] {
        let store = Store::open(MemoryStorage::with_value(STORAGE_KEY, raw));
        assert!(
            matches!(store.rehydration(), RehydrationOutcome::Recovered { .. }),
            "{raw:?} should be rejected"
        );
        assert_eq!(store.state().summaries(), seed_summaries().as_slice());
    }
}

/// Reads return whatever was configured; writes fail and are counted.
struct ReadOnlyStorage {
    value: Option<String>,
    writes: AtomicUsize,
}

impl StateStorage for ReadOnlyStorage {
    fn read(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.value.clone().filter(|_| key == STORAGE_KEY))
    }

    fn write(&self, _key: &str, _value: &str) -> PortResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(PortError::Storage("read-only".to_string()))
    }
}

#[test]
fn unpreservable_corruption_suspends_persistence() {
    let storage = Arc::new(ReadOnlyStorage {
        value: Some("{not json".to_string()),
        writes: AtomicUsize::new(0),
    });
    let mut store = Store::open(storage.clone());
    assert!(store.is_persistence_suspended());
    assert_eq!(storage.writes.load(Ordering::SeqCst), 1);

    store.toggle_theme();
    store.toggle_favorite("1");
    assert_eq!(storage.writes.load(Ordering::SeqCst), 1);
    assert!(store.state().is_dark_mode());
}

#[test]
fn failed_writes_never_reach_the_caller() {
    let storage = Arc::new(ReadOnlyStorage {
        value: None,
        writes: AtomicUsize::new(0),
    });
    let mut store = Store::open(storage.clone());
    assert!(!store.is_persistence_suspended());

    store.toggle_theme();
    store.delete_summary("1");
    assert_eq!(storage.writes.load(Ordering::SeqCst), 2);
    assert!(store.state().is_dark_mode());
    assert_eq!(store.state().summaries().len(), 4);
}

#[test]
fn with_state_starts_from_given_subset() {
    let persisted = PersistedState {
        is_dark_mode: true,
        summaries: Vec::new(),
    };
    let mut store =
        Store::with_state(persisted, MemoryStorage::new()).expect("empty subset is valid");
    assert!(store.state().is_dark_mode());
    assert!(store.state().summaries().is_empty());

    store.add_summary(draft(
        SourceType::Text,
        OutputType::Text,
        SummaryLength::Short,
        KnowledgeLevel::Beginner,
    ));
    assert_eq!(store.state().summaries().len(), 1);
}

#[test]
fn with_state_rejects_duplicate_ids() {
    let mut persisted = PersistedState::seed();
    let copy = persisted.summaries[0].clone();
    persisted.summaries.push(copy);

    let result = Store::with_state(persisted, MemoryStorage::new());
    assert!(matches!(result, Err(PersistenceError::DuplicateId(id)) if id == "1"));
}

#[test]
fn repeated_corruption_keeps_every_copy() {
    let first = "{first broken record";
    let second = "{second broken record";
    let storage = Arc::new(MemoryStorage::with_value(STORAGE_KEY, first));
    let _ = Store::open(storage.clone());
    assert_eq!(storage.get(QUARANTINE_KEY).as_deref(), Some(first));

    storage.write(STORAGE_KEY, second).unwrap();
    let store = Store::open(storage.clone());
    assert!(!store.is_persistence_suspended());
    assert_eq!(storage.get(QUARANTINE_KEY).as_deref(), Some(first));
    let next_slot = format!("{QUARANTINE_KEY}.1");
    assert_eq!(storage.get(&next_slot).as_deref(), Some(second));

    // The same record seen again reuses its slot.
    storage.write(STORAGE_KEY, second).unwrap();
    let _ = Store::open(storage.clone());
    assert!(storage.get(&format!("{QUARANTINE_KEY}.2")).is_none());
}
