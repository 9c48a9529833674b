mod common;

use serde_json::json;

use common::setup_test_db;
use urbanista::adapters::sqlite::SqliteSessionRepository;
use urbanista::domain::models::SessionTurn;
use urbanista::domain::ports::SessionRepository;

fn turn(session_id: &str, number: i64, query: &str) -> SessionTurn {
    SessionTurn::new(
        session_id,
        number,
        query,
        json!({ "intent": "tabular" }),
        json!([]),
        "resposta",
        0.8,
    )
}

#[tokio::test]
async fn test_append_and_read_back() {
    let pool = setup_test_db().await;
    let repo = SqliteSessionRepository::new(pool);

    repo.append(&turn("s-1", 1, "primeira pergunta"))
        .await
        .expect("append failed");

    let turns = repo.recent_turns("s-1", 10).await.expect("read failed");
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].query, "primeira pergunta");
    assert_eq!(turns[0].context["intent"], "tabular");
}

#[tokio::test]
async fn test_max_turn_number_is_zero_for_empty_session() {
    let pool = setup_test_db().await;
    let repo = SqliteSessionRepository::new(pool);

    let max = repo.max_turn_number("unknown").await.expect("max failed");
    assert_eq!(max, 0);
}

#[tokio::test]
async fn test_recent_turns_ordered_and_limited() {
    let pool = setup_test_db().await;
    let repo = SqliteSessionRepository::new(pool);

    for n in 1..=5 {
        repo.append(&turn("s-1", n, &format!("pergunta {n}")))
            .await
            .expect("append failed");
    }
    repo.append(&turn("s-2", 1, "outra sessão"))
        .await
        .expect("append failed");

    let turns = repo.recent_turns("s-1", 3).await.expect("read failed");
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[0].turn_number, 5);
    assert_eq!(turns[2].turn_number, 3);

    assert_eq!(repo.max_turn_number("s-1").await.expect("max failed"), 5);
    assert_eq!(repo.max_turn_number("s-2").await.expect("max failed"), 1);
}
