use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use services::{Clock, SurveyController, SurveyState, responses_to_csv};
use storage::repository::InMemoryStore;
use storage::session_store::SessionStore;
use survey_core::model::{Category, ParticipantId, RatingDraft, SurveyConfig};
use survey_core::time::fixed_now;

fn draft(quality: u8, guess: Category, comment: &str) -> RatingDraft {
    RatingDraft {
        quality: Some(quality),
        guessed_category: Some(guess),
        comment: comment.to_string(),
    }
}

#[tokio::test]
async fn full_survey_run_persists_and_exports() {
    let kv = InMemoryStore::new();
    let store = SessionStore::new(Arc::new(kv.clone()));
    let mut controller = SurveyController::new(Clock::fixed(fixed_now()), store);

    let participant = ParticipantId::parse("xyz").unwrap();
    let config = SurveyConfig::new(4, 25, 5);
    let mut rng = StdRng::seed_from_u64(99);

    controller
        .start_session(participant.clone(), &config, &mut rng)
        .await;
    assert_eq!(controller.progress(), (0, 5));

    // Interrupt mid-session and recover from storage.
    controller
        .submit_response(draft(7, Category::Denoised, "ok \"great\""))
        .await
        .unwrap();
    controller
        .submit_response(draft(3, Category::Noisy, ""))
        .await
        .unwrap();

    let mut recovered =
        SurveyController::new(Clock::fixed(fixed_now()), SessionStore::new(Arc::new(kv)));
    assert!(recovered.resume_current().await.unwrap());
    assert_eq!(recovered.state(), SurveyState::InProgress);
    assert_eq!(recovered.progress(), (2, 5));

    // Finish the run.
    while recovered.state() == SurveyState::InProgress {
        recovered
            .submit_response(draft(5, Category::Original, ""))
            .await
            .unwrap();
    }
    assert_eq!(recovered.state(), SurveyState::Complete);

    let stats = recovered.stats().unwrap();
    assert_eq!(stats.total(), 5);
    assert!(!stats.accuracy_percent().is_nan());
    for category in Category::ALL {
        assert!(stats.mean_quality(category).is_finite());
    }

    let csv = recovered.export_csv().unwrap();
    assert_eq!(csv.lines().count(), 6);
    assert!(csv.starts_with("rater,timestamp,image_id,"));
    assert!(csv.contains("\"ok \"\"great\"\"\""));

    let exported = responses_to_csv(recovered.session().unwrap().responses());
    assert_eq!(exported, csv);
}
