//! End-to-end ceremony flows through the assembled services

use async_trait::async_trait;
use chrono::Duration;
use holocron_cache::{CacheConfig, CacheFactory, MemoryBackend};
use holocron_core::prelude::*;
use holocron_core::{
    EventKind, FixedClock, NotificationConfig, NotificationDispatcher, NotificationError,
    NotificationEvent, NotificationWorkerPool, ServiceContext, TtlConfig,
};
use holocron_test_utils::{answers, choice_item, epoch, scale_item, text_item};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Recorder {
    events: Mutex<Vec<NotificationEvent>>,
}

#[async_trait]
impl NotificationDispatcher for Recorder {
    async fn dispatch(&self, event: &NotificationEvent) -> Result<(), NotificationError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

impl Recorder {
    fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().iter().map(|e| e.kind).collect()
    }
}

struct World {
    app: Holocron,
    recorder: Arc<Recorder>,
    clock: Arc<FixedClock>,
    leader: UserId,
    member: UserId,
    team_id: String,
}

async fn world() -> World {
    let recorder = Arc::new(Recorder::default());
    let clock = Arc::new(FixedClock::new(epoch()));
    let app = Holocron::with_clock(
        &HolocronConfig::default(),
        Arc::new(MemoryDocumentStore::new()),
        recorder.clone(),
        clock.clone(),
    )
    .await;

    let leader = UserId::from("lead@x.com");
    let member = UserId::from("real@x.com");
    let team_id = app
        .teams()
        .create_team(Some(&leader), "Platform")
        .await
        .unwrap()
        .team
        .id;
    app.teams().join_team(Some(&member), &team_id).await.unwrap();

    World {
        app,
        recorder,
        clock,
        leader,
        member,
        team_id,
    }
}

fn retro_draft(team_id: &str) -> TemplateDraft {
    let mut draft = TemplateDraft::new(epoch());
    draft.team_id = team_id.to_string();
    draft.title = "Sprint Retro".to_string();
    draft.items = vec![
        scale_item("mood"),
        choice_item(
            "topics",
            vec![ChoiceOption::new("A"), ChoiceOption::new("B")],
        ),
        text_item("notes"),
    ];
    draft
}

#[tokio::test]
async fn anonymized_responses_depend_on_reader_role() {
    let w = world().await;
    let mut draft = retro_draft(&w.team_id);
    draft.facilitation_settings.is_anonymized = true;
    draft.shared_with_emails = vec![w.member.to_string()];
    let template = w
        .app
        .ceremonies()
        .create_template(Some(&w.leader), draft)
        .await
        .unwrap();

    w.app
        .ceremonies()
        .submit_response(
            Some(&w.member),
            ResponseSubmission::new(template.id(), answers(vec![("mood", Answer::scale(4))])),
        )
        .await
        .unwrap();

    let as_member = w
        .app
        .ceremonies()
        .list_responses(Some(&w.member), template.id(), TimeRange::all())
        .await
        .unwrap();
    assert_eq!(as_member[0].user_id, "anonymous");

    let as_leader = w
        .app
        .ceremonies()
        .list_responses(Some(&w.leader), template.id(), TimeRange::all())
        .await
        .unwrap();
    assert_eq!(as_leader[0].user_id, "real@x.com");

    w.app.shutdown().await;
}

#[tokio::test]
async fn team_health_matches_worked_example() {
    let w = world().await;
    let first = w
        .app
        .ceremonies()
        .create_template(Some(&w.leader), retro_draft(&w.team_id))
        .await
        .unwrap();
    let second = w
        .app
        .ceremonies()
        .create_template(Some(&w.leader), retro_draft(&w.team_id))
        .await
        .unwrap();

    let submissions = [
        (first.id(), &w.member, answers(vec![("mood", Answer::scale(4))])),
        (second.id(), &w.member, answers(vec![("mood", Answer::scale(5))])),
        (second.id(), &w.leader, answers(vec![("notes", Answer::text("big blocker"))])),
    ];
    for (template_id, user, given) in submissions {
        w.app
            .ceremonies()
            .submit_response(Some(user), ResponseSubmission::new(template_id, given))
            .await
            .unwrap();
    }

    let metrics = w
        .app
        .ceremonies()
        .get_team_health(Some(&w.member), &w.team_id, TimeRange::all())
        .await
        .unwrap();
    let values: Vec<f64> = metrics.iter().map(|m| m.value).collect();
    assert_eq!(values, vec![75.0, 4.5, 1.0]);
    assert!(metrics.iter().all(|m| m.timestamp == epoch()));
}

#[tokio::test]
async fn cross_tab_and_summary_through_the_service() {
    let w = world().await;
    let template = w
        .app
        .ceremonies()
        .create_template(Some(&w.leader), retro_draft(&w.team_id))
        .await
        .unwrap();

    for (user, topics) in [(&w.leader, vec!["A"]), (&w.member, vec!["A", "B"])] {
        w.app
            .ceremonies()
            .submit_response(
                Some(user),
                ResponseSubmission::new(
                    template.id(),
                    answers(vec![
                        ("mood", Answer::scale(3)),
                        ("topics", Answer::choice(topics)),
                    ]),
                ),
            )
            .await
            .unwrap();
    }

    let groups = w
        .app
        .ceremonies()
        .cross_tabulate(Some(&w.leader), template.id(), "mood", "topics", TimeRange::all())
        .await
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].key, "3");
    assert_eq!(groups[0].count, 2);
    assert_eq!(
        groups[0].distribution,
        vec![("A".to_string(), 2), ("B".to_string(), 1)]
    );

    let summaries = w
        .app
        .ceremonies()
        .summarize_responses(Some(&w.leader), template.id(), TimeRange::all())
        .await
        .unwrap();
    let ids: Vec<&str> = summaries.iter().map(|s| s.question_id.as_str()).collect();
    assert_eq!(ids, ["mood", "topics", "notes"]);
}

#[tokio::test]
async fn notifications_follow_the_ceremony() {
    let w = world().await;
    let mut draft = retro_draft(&w.team_id);
    draft.notification_settings.webhook_urls = vec!["https://hooks.example.com/retro".to_string()];
    let template = w
        .app
        .ceremonies()
        .create_template(Some(&w.leader), draft)
        .await
        .unwrap();

    for user in [&w.member, &w.leader] {
        w.clock.advance(Duration::minutes(5));
        w.app
            .ceremonies()
            .submit_response(Some(user), ResponseSubmission::new(template.id(), Default::default()))
            .await
            .unwrap();
    }
    w.app.shutdown().await;

    // Two workers may deliver out of order
    let mut kinds = w.recorder.kinds();
    kinds.sort_by_key(|k| *k as u8);
    assert_eq!(
        kinds,
        vec![
            EventKind::CeremonyStarted,
            EventKind::ResponseSubmitted,
            EventKind::ResponseSubmitted,
            EventKind::CeremonyCompleted,
        ]
    );

    let events = w.recorder.events.lock();
    let completed = events
        .iter()
        .find(|e| e.kind == EventKind::CeremonyCompleted)
        .unwrap();
    assert_eq!(completed.team_name, "Platform");
    assert_eq!(completed.total_members, 2);
    assert_eq!(completed.total_responses, 2);
    assert_eq!(completed.user_email.as_deref(), Some("lead@x.com"));
    assert_eq!(w.app.notification_stats().delivered, 4);
}

#[tokio::test]
async fn no_destinations_no_events() {
    let w = world().await;
    let template = w
        .app
        .ceremonies()
        .create_template(Some(&w.leader), retro_draft(&w.team_id))
        .await
        .unwrap();
    w.app
        .ceremonies()
        .submit_response(Some(&w.member), ResponseSubmission::new(template.id(), Default::default()))
        .await
        .unwrap();
    w.app.shutdown().await;

    assert!(w.recorder.kinds().is_empty());
}

#[tokio::test]
async fn store_outage_surfaces_as_internal_and_cache_keeps_serving() {
    let store = Arc::new(MemoryDocumentStore::new());
    let backend = MemoryBackend::new();
    let caches = CacheFactory::with_memory_backend(CacheConfig::default(), backend.clone());
    let ctx = Arc::new(
        ServiceContext::new(
            store.clone(),
            &caches,
            TtlConfig::default(),
            Arc::new(FixedClock::new(epoch())),
        )
        .with_notifier(Arc::new(NotificationWorkerPool::start(
            &NotificationConfig::default(),
            Arc::new(LoggingDispatcher),
        ))),
    );
    let teams = TeamService::new(ctx.clone());
    let ceremonies = CeremonyService::new(ctx);

    let leader = UserId::from("lead@x.com");
    let team = teams.create_team(Some(&leader), "Platform").await.unwrap().team;
    let mut draft = retro_draft(&team.id);
    draft.is_public = true;
    let template = ceremonies
        .create_template(Some(&leader), draft)
        .await
        .unwrap();
    assert!(!backend.is_empty());

    store.set_unavailable(true);
    let cached = ceremonies.get_template(None, template.id()).await.unwrap();
    assert_eq!(cached, template);

    let err = ceremonies
        .list_templates_for_team(Some(&leader), &team.id)
        .await
        .unwrap_err();
    assert!(matches!(err, CeremonyError::Internal(_)));

    // A broken cache only costs hits
    store.set_unavailable(false);
    backend.set_unavailable(true);
    let fresh = ceremonies.get_template(None, template.id()).await.unwrap();
    assert_eq!(fresh, template);
}

#[tokio::test]
async fn missing_template_is_not_found() {
    let w = world().await;
    let err = w
        .app
        .ceremonies()
        .submit_response(Some(&w.member), ResponseSubmission::new("ghost", Default::default()))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "not_found");
    assert_eq!(err.to_string(), "not found: template ghost not found");
}
