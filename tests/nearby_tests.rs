mod helpers;

use std::time::Duration;

use axum::http::StatusCode;
use cleanup_dispatch::entities::account::AccountRole;
use cleanup_dispatch::entities::task::SizeClass;
use cleanup_dispatch::geo::GeoPoint;
use cleanup_dispatch::init::{spawn_geo_resync, warm_geo_index};
use cleanup_dispatch::middleware::mw_ctx::{create_ctx_state, CtxState};
use cleanup_dispatch::models::view::task::NearbyTaskView;
use cleanup_dispatch::services::task_service::NearbyQuery;
use helpers::account_helpers::register_account;
use helpers::task_helpers::{
    claim_task, complete_task, dispatch_service, lat_north_of, nearby_tasks, submit_task,
};

const LAT: f64 = 35.6762;
const LNG: f64 = 139.6503;

test_with_server!(results_sorted_by_distance, |server, ctx_state, config| {
    let reporter = register_account(&server, AccountRole::Reporter).await;
    let picker = register_account(&server, AccountRole::Picker).await;
    let far = submit_task(&server, &reporter, lat_north_of(LAT, 5_000.0), LNG, SizeClass::Large).await;
    let mid = submit_task(&server, &reporter, lat_north_of(LAT, 500.0), LNG, SizeClass::Small).await;
    let near = submit_task(&server, &reporter, lat_north_of(LAT, 10.0), LNG, SizeClass::Small).await;

    let list = nearby_tasks(&server, &picker, LAT, LNG, 1_000.0)
        .await
        .json::<Vec<NearbyTaskView>>();
    let ids: Vec<&str> = list.iter().map(|t| t.task_id.as_str()).collect();
    assert_eq!(ids, vec![near.as_str(), mid.as_str()]);
    assert!(list[0].distance_meters < list[1].distance_meters);
    assert!(list.iter().all(|t| t.distance_meters <= 1_000.0));

    let res = server
        .get(&format!("/api/tasks/nearby?lat={LAT}&lng={LNG}&radius=10000&limit=2"))
        .add_header("Authorization", picker.bearer())
        .await;
    res.assert_status_ok();
    let list = res.json::<Vec<NearbyTaskView>>();
    let ids: Vec<&str> = list.iter().map(|t| t.task_id.as_str()).collect();
    assert_eq!(ids, vec![near.as_str(), mid.as_str()]);

    let list = nearby_tasks(&server, &picker, LAT, LNG, 10_000.0)
        .await
        .json::<Vec<NearbyTaskView>>();
    assert_eq!(list.last().map(|t| t.task_id.as_str()), Some(far.as_str()));
});

test_with_server!(empty_area_returns_empty_list, |server, ctx_state, config| {
    let picker = register_account(&server, AccountRole::Picker).await;
    let res = nearby_tasks(&server, &picker, 0.0, 0.0, 500.0).await;
    res.assert_status_ok();
    assert!(res.json::<Vec<NearbyTaskView>>().is_empty());
});

test_with_server!(rejects_bad_parameters, |server, ctx_state, config| {
    let picker = register_account(&server, AccountRole::Picker).await;

    nearby_tasks(&server, &picker, LAT, LNG, 0.0)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    nearby_tasks(&server, &picker, LAT, LNG, config.nearby_max_radius_m + 1.0)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    nearby_tasks(&server, &picker, 91.0, LNG, 100.0)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .get(&format!("/api/tasks/nearby?lat={LAT}&lng={LNG}&limit=0"))
        .add_header("Authorization", picker.bearer())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .get(&format!("/api/tasks/nearby?lat={LAT}&lng={LNG}"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
});

test_with_server!(stale_index_entries_are_evicted, |server, ctx_state, config| {
    let reporter = register_account(&server, AccountRole::Reporter).await;
    let picker = register_account(&server, AccountRole::Picker).await;
    let done = submit_task(&server, &reporter, LAT, LNG, SizeClass::Small).await;
    let open = submit_task(&server, &reporter, lat_north_of(LAT, 20.0), LNG, SizeClass::Small).await;
    claim_task(&server, &picker, &done).await.assert_status_ok();
    complete_task(&server, &picker, &done).await.assert_status_ok();

    // simulate an index that missed the removal
    ctx_state.geo_index.insert(&done, GeoPoint { lat: LAT, lng: LNG });
    ctx_state.geo_index.insert("vanished", GeoPoint { lat: LAT, lng: LNG });

    let list = nearby_tasks(&server, &picker, LAT, LNG, 100.0)
        .await
        .json::<Vec<NearbyTaskView>>();
    let ids: Vec<&str> = list.iter().map(|t| t.task_id.as_str()).collect();
    assert_eq!(ids, vec![open.as_str()]);
    assert!(!ctx_state.geo_index.contains(&done));
    assert!(!ctx_state.geo_index.contains("vanished"));
});

test_with_server!(warm_up_restores_open_tasks, |server, ctx_state, config| {
    let reporter = register_account(&server, AccountRole::Reporter).await;
    let picker = register_account(&server, AccountRole::Picker).await;
    let open = submit_task(&server, &reporter, LAT, LNG, SizeClass::Medium).await;
    let claimed = submit_task(&server, &reporter, LAT, LNG + 0.001, SizeClass::Medium).await;
    claim_task(&server, &picker, &claimed).await.assert_status_ok();

    ctx_state.geo_index.rebuild(Vec::new());
    assert!(ctx_state.geo_index.is_empty());

    let count = warm_geo_index(&ctx_state).await.unwrap();
    assert_eq!(count, 1);
    assert!(ctx_state.geo_index.contains(&open));
    assert!(!ctx_state.geo_index.contains(&claimed));
});

async fn wait_for_index(instance: &CtxState, id: &str, present: bool) -> bool {
    for _ in 0..50 {
        if instance.geo_index.contains(id) == present {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

test_with_server!(resync_picks_up_tasks_from_other_instance, |server, ctx_state, config| {
    let reporter = register_account(&server, AccountRole::Reporter).await;
    let picker = register_account(&server, AccountRole::Picker).await;
    // second process sharing the same database with its own index
    let other = create_ctx_state(ctx_state.db.clone(), &config);
    warm_geo_index(&other).await.unwrap();

    let task_id = submit_task(&server, &reporter, LAT, LNG, SizeClass::Small).await;
    let query = || NearbyQuery {
        lat: LAT,
        lng: LNG,
        radius: Some(100.0),
        limit: None,
    };
    assert!(dispatch_service(&other).nearby(query()).await.unwrap().is_empty());

    let resync = spawn_geo_resync(other.clone(), Duration::from_millis(100));
    assert!(wait_for_index(&other, &task_id, true).await);
    let list = dispatch_service(&other).nearby(query()).await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].task_id, task_id);

    claim_task(&server, &picker, &task_id).await.assert_status_ok();
    assert!(wait_for_index(&other, &task_id, false).await);
    resync.abort();
});
