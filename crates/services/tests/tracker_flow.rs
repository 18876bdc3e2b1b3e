use std::sync::Arc;

use chrono::NaiveDate;
use services::{
    Access, AppServices, AuthError, Clock, GoalServiceError, InMemoryIdentityProvider, Route,
    WeeklyLogServiceError, authorize,
};
use storage::repository::Storage;
use tracker_core::model::{GoalDraft, Level, Role, SugarCraving, WeeklyEntryDraft};
use tracker_core::progress::SortOrder;
use tracker_core::time::fixed_now;

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, m, d).unwrap()
}

fn goal_draft() -> GoalDraft {
    GoalDraft {
        start_date: Some(date(10, 1)),
        end_date: Some(date(12, 31)),
        initial_weight: Some(80.0),
        target_weight: Some(70.0),
        initial_waist: Some(100.0),
        target_waist: Some(90.0),
        height: Some(170.0),
    }
}

fn week(m: u32, d: u32, weight: f64, waist: f64) -> WeeklyEntryDraft {
    WeeklyEntryDraft {
        weight: Some(weight),
        waist: Some(waist),
        errors: 1,
        physical_activity: true,
        sleep: 8.0,
        meditation: false,
        water: 2.5,
        body_weight_perception: Level::High,
        energy: Level::Medium,
        sugar_craving: SugarCraving::Little,
        ..WeeklyEntryDraft::new(date(m, d))
    }
}

#[tokio::test]
async fn goal_log_dashboard_flow_on_sqlite() {
    let services = AppServices::new_sqlite(
        "sqlite:file:memdb_tracker_flow?mode=memory&cache=shared",
        Clock::fixed(fixed_now()),
        None,
    )
    .await
    .expect("services");

    assert!(matches!(
        services.weekly_log().record(week(10, 8, 79.0, 99.0)).await,
        Err(WeeklyLogServiceError::GoalMissing)
    ));

    let mut invalid = goal_draft();
    invalid.target_weight = Some(85.0);
    assert!(matches!(
        services.goals().save(invalid).await,
        Err(GoalServiceError::Validation(_))
    ));
    assert_eq!(services.goals().load().await.value, None);

    let goal = services.goals().save(goal_draft()).await.expect("save goal");
    assert_eq!(services.goals().load().await.value, Some(goal));

    for (m, d, weight, waist) in [(11, 5, 75.0, 95.0), (10, 8, 79.0, 99.0), (10, 22, 77.0, 97.0)] {
        services
            .weekly_log()
            .record(week(m, d, weight, waist))
            .await
            .expect("record");
    }

    let listed = services.weekly_log().list(SortOrder::Ascending).await;
    let dates: Vec<NaiveDate> = listed.value.iter().map(|e| e.date()).collect();
    assert_eq!(dates, vec![date(10, 8), date(10, 22), date(11, 5)]);

    let loaded = services.progress().dashboard().await;
    assert!(!loaded.has_notices());
    let dashboard = loaded.value.expect("dashboard");
    assert_eq!(dashboard.latest.as_ref().map(|e| e.date()), Some(date(11, 5)));
    assert_eq!(dashboard.overall_percent, Some(50.0));
    assert_eq!(dashboard.stats.as_ref().map(|s| s.weeks_logged), Some(3));
    // Fixed clock sits on 2023-11-14.
    assert_eq!(dashboard.timeline.elapsed_days, 44);

    let charts = services.progress().charts().await.value.expect("charts");
    assert_eq!(charts.weight.len(), 3);
    assert_eq!(charts.weight[0].label, "Oct 8");
    let assessment = charts.self_assessment.expect("assessment");
    assert_eq!(
        (
            assessment.body_weight_perception,
            assessment.energy,
            assessment.sugar_control
        ),
        (100.0, 50.0, 75.0)
    );
}

#[tokio::test]
async fn auth_and_route_guard_flow() {
    let provider = InMemoryIdentityProvider::new()
        .with_user("admin@example.com", "pw", Role::Patient)
        .with_user("coach@example.com", "pw", Role::Admin);
    let storage = Storage::in_memory();
    let services = AppServices::from_storage(
        &storage,
        Clock::fixed(fixed_now()),
        Some(Arc::new(provider.clone())),
    );
    let auth = services.auth();

    assert_eq!(auth.restore_session().await.unwrap(), None);
    assert_eq!(
        authorize("/dashboard", auth.current_user().as_ref()),
        Access::Redirect(Route::Login)
    );

    // The address alone grants nothing.
    let user = auth.sign_in("admin@example.com", "pw").await.unwrap();
    assert_eq!(user.role, Role::Patient);
    assert_eq!(
        authorize("/admin", auth.current_user().as_ref()),
        Access::NotFound
    );
    assert!(matches!(
        auth.list_patients().await,
        Err(AuthError::Forbidden)
    ));

    auth.sign_out().await.unwrap();
    auth.sign_in("coach@example.com", "pw").await.unwrap();
    assert_eq!(
        authorize("/admin/patients", auth.current_user().as_ref()),
        Access::Allow(Route::Admin("patients".into()))
    );
    let patients = auth.list_patients().await.unwrap();
    assert_eq!(patients.len(), 1);

    let restarted = AppServices::from_storage(
        &storage,
        Clock::fixed(fixed_now()),
        Some(Arc::new(provider)),
    );
    let restored = restarted.auth().restore_session().await.unwrap();
    assert_eq!(restored.map(|u| u.email), Some("coach@example.com".to_string()));
}
