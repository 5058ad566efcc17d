mod helpers;

use axum::http::StatusCode;
use cleanup_dispatch::database::repository_traits::RepositoryCore;
use cleanup_dispatch::entities::account::AccountRole;
use cleanup_dispatch::entities::task::SizeClass;
use cleanup_dispatch::models::view::leaderboard::LeaderboardEntryView;
use cleanup_dispatch::services::points_ledger::PointsLedger;
use helpers::account_helpers::create_account_with_id;

test_with_server!(ties_rank_by_account_id, |server, ctx_state, config| {
    let a = create_account_with_id(&ctx_state, "a", "Ann", AccountRole::Picker).await;
    create_account_with_id(&ctx_state, "b", "Bob", AccountRole::Picker).await;
    create_account_with_id(&ctx_state, "c", "Cid", AccountRole::Picker).await;
    create_account_with_id(&ctx_state, "r", "Rita", AccountRole::Reporter).await;

    let ledger = PointsLedger::new(&ctx_state.db.points_credits, &ctx_state.tariff);
    let awards = [
        ("b", "t_b", SizeClass::Large),
        ("a", "t_a", SizeClass::Large),
        ("c", "t_c1", SizeClass::Small),
        ("c", "t_c2", SizeClass::Small),
        ("c", "t_c3", SizeClass::Small),
    ];
    for (account, task, size) in awards {
        let picker = ctx_state.db.accounts.get_thing(account);
        let task = ctx_state.db.tasks.get_thing(task);
        ledger.award(&picker, &task, size).await.unwrap();
    }

    let res = server
        .get("/api/leaderboard")
        .add_header("Authorization", a.bearer())
        .await;
    res.assert_status_ok();
    let board: Vec<(String, u64, u32)> = res
        .json::<Vec<LeaderboardEntryView>>()
        .into_iter()
        .map(|e| (e.account_id, e.points, e.rank))
        .collect();
    assert_eq!(
        board,
        vec![
            ("a".to_string(), 50, 1),
            ("b".to_string(), 50, 2),
            ("c".to_string(), 30, 3),
        ]
    );

    let res = server
        .get("/api/leaderboard?limit=2")
        .add_header("Authorization", a.bearer())
        .await;
    let board = res.json::<Vec<LeaderboardEntryView>>();
    assert_eq!(board.len(), 2);
    assert_eq!(board[1].display_name, "Bob");
});

test_with_server!(limit_is_validated, |server, ctx_state, config| {
    let a = create_account_with_id(&ctx_state, "a", "Ann", AccountRole::Picker).await;

    server
        .get("/api/leaderboard?limit=0")
        .add_header("Authorization", a.bearer())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let res = server
        .get("/api/leaderboard?limit=5000")
        .add_header("Authorization", a.bearer())
        .await;
    res.assert_status_ok();
    assert_eq!(res.json::<Vec<LeaderboardEntryView>>().len(), 1);

    server
        .get("/api/leaderboard")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
});
