use survey_core::model::{Category, ParticipantId, RatingDraft, Response, Session, Trial, TrialId};
use survey_core::time::fixed_now;

use storage::repository::{KeyValueStore, keys};
use storage::session_store::SessionStore;
use storage::sqlite::SqliteStore;

fn build_trials(count: u64) -> Vec<Trial> {
    (1..=count)
        .map(|i| Trial::new(TrialId::new(i), format!("image_{i:03}.jpg"), Category::Denoised))
        .collect()
}

fn answer(session: &mut Session, participant: &ParticipantId, guess: Category) {
    let trial = session.current_trial().expect("trial available").clone();
    let rating = RatingDraft {
        quality: Some(8),
        guessed_category: Some(guess),
        comment: "fine \"detail\"".to_string(),
    }
    .validate()
    .expect("valid rating");
    let response = Response::new(participant.clone(), &trial, rating, fixed_now());
    session.record_response(response).expect("record");
}

#[tokio::test]
async fn sqlite_kv_round_trip() {
    let store = SqliteStore::connect("sqlite:file:memdb_kv?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");

    assert_eq!(store.get("missing").await.expect("get"), None);

    store.set("k", "v1").await.expect("set");
    store.set("k", "v2").await.expect("overwrite");
    assert_eq!(store.get("k").await.expect("get").as_deref(), Some("v2"));

    store.remove("k").await.expect("remove");
    assert_eq!(store.get("k").await.expect("get"), None);
}

#[tokio::test]
async fn sqlite_session_round_trip_preserves_state() {
    let store = SessionStore::sqlite("sqlite:file:memdb_session?mode=memory&cache=shared")
        .await
        .expect("init");

    let participant = ParticipantId::parse("qrs").expect("participant");
    let mut session = Session::new(build_trials(3), fixed_now());
    answer(&mut session, &participant, Category::Denoised);
    answer(&mut session, &participant, Category::Noisy);

    store.save(&participant, &session).await.expect("save");

    let (loaded_id, loaded) = store
        .load_current()
        .await
        .expect("load")
        .expect("session present");
    assert_eq!(loaded_id, participant);
    assert_eq!(loaded.cursor(), 2);
    assert_eq!(loaded.trials(), session.trials());
    assert_eq!(loaded.responses(), session.responses());
    assert!(!loaded.is_complete());
}

#[tokio::test]
async fn sqlite_corrupted_session_is_treated_as_absent() {
    let kv = SqliteStore::connect("sqlite:file:memdb_corrupt?mode=memory&cache=shared")
        .await
        .expect("connect");
    kv.migrate().await.expect("migrate");

    kv.set(keys::CURRENT_USER, "{\"version\":1,\"id\":\"TUV\"}")
        .await
        .expect("set user");
    kv.set(keys::CURRENT_SESSION, "definitely not json")
        .await
        .expect("set session");

    let store = SessionStore::new(std::sync::Arc::new(kv));
    assert!(store.load_current().await.expect("load").is_none());
}

#[tokio::test]
async fn sqlite_clear_for_removes_identity_keys() {
    let store = SessionStore::sqlite("sqlite:file:memdb_clear?mode=memory&cache=shared")
        .await
        .expect("init");

    let participant = ParticipantId::parse("wxy").expect("participant");
    let session = Session::new(build_trials(1), fixed_now());
    store.save(&participant, &session).await.expect("save");

    store.clear_for(&participant).await.expect("clear");
    assert!(store.load_current().await.expect("load").is_none());
    assert!(store.load_for(&participant).await.expect("load").is_none());
}
