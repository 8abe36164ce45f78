use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use preflop_quiz::chart::Chart;
use preflop_quiz::format::ActionGroup;
use preflop_quiz::grade::Selection;
use preflop_quiz::session::{SessionState, SessionStatus};
use preflop_quiz::web;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::time::{Duration, sleep};

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct SelectionPayload {
    selection: Selection,
}

async fn spawn_server() -> anyhow::Result<(String, tokio::task::JoinHandle<()>)> {
    let chart = Chart::from_json_str(include_str!("../data/sample_chart.json"))?;
    let app: Router = web::router(Arc::new(chart));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    sleep(Duration::from_millis(25)).await;
    Ok((format!("http://{}", addr), server))
}

#[tokio::test]
async fn web_api_supports_quiz_flow() -> anyhow::Result<()> {
    let (base_url, server) = spawn_server().await?;
    let client = Client::builder().build()?;

    let mut state: SessionState = client
        .post(format!("{}/api/sessions", base_url))
        .json(&json!({ "rounds": 2, "seed": 31 }))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(state.status, SessionStatus::AwaitingAnswers);
    assert!(!state.patterns.is_empty());
    assert!(state.patterns.iter().all(|view| view.canonical.is_none()));

    let selection = Selection::new(state.patterns[0].pattern, ActionGroup::SbOpen);
    state = client
        .post(format!("{}/api/sessions/{}/selections", base_url, state.session_id))
        .json(&SelectionPayload { selection })
        .send()
        .await?
        .json()
        .await?;
    assert!(state.selections.contains(&selection));

    state = client
        .post(format!("{}/api/sessions/{}/check", base_url, state.session_id))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(state.status, SessionStatus::Reviewing);
    assert!(state.last_result.is_some());
    assert!(state.score.total >= 1);

    state = client
        .post(format!("{}/api/sessions/{}/next", base_url, state.session_id))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(state.round, 2);
    assert_eq!(state.status, SessionStatus::AwaitingAnswers);

    let fetched: SessionState = client
        .get(format!("{}/api/sessions/{}", base_url, state.session_id))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(fetched.hand, state.hand);

    server.abort();
    let _ = server.await;
    Ok(())
}

#[tokio::test]
async fn web_api_reports_errors() -> anyhow::Result<()> {
    let (base_url, server) = spawn_server().await?;
    let client = Client::builder().build()?;

    let missing = client
        .get(format!("{}/api/sessions/{}", base_url, uuid_nil()))
        .send()
        .await?;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let state: SessionState = client
        .post(format!("{}/api/sessions", base_url))
        .json(&json!({ "seed": 5 }))
        .send()
        .await?
        .json()
        .await?;

    let early = client
        .post(format!("{}/api/sessions/{}/next", base_url, state.session_id))
        .send()
        .await?;
    assert_eq!(early.status(), StatusCode::CONFLICT);

    let malformed = client
        .post(format!("{}/api/sessions/{}/selections", base_url, state.session_id))
        .json(&json!({ "selection": "9-sb-open" }))
        .send()
        .await?;
    assert_eq!(malformed.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorBody = malformed.json().await?;
    assert!(body.error.contains("9-sb-open"), "{}", body.error);

    let garbled = client
        .post(format!("{}/api/sessions/{}/selections", base_url, state.session_id))
        .json(&json!({ "selection": "double" }))
        .send()
        .await?;
    assert_eq!(garbled.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorBody = garbled.json().await?;
    assert_eq!(body.error, "invalid selection `double`");

    let health = client.get(format!("{}/healthz", base_url)).send().await?;
    assert_eq!(health.text().await?, "ok");

    server.abort();
    let _ = server.await;
    Ok(())
}

fn uuid_nil() -> &'static str {
    "00000000-0000-0000-0000-000000000000"
}
