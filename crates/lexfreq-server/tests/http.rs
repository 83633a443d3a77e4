use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use lexfreq_core::Collapser;
use lexfreq_core::fixture::StaticFrequency;
use lexfreq_server::handlers::{AppState, router};
use lexfreq_wordnet::WordNetLexicon;

fn make_state() -> AppState {
    let tempdir = tempfile::tempdir().unwrap();
    let dict = tempdir.path();
    std::fs::write(dict.join("index.noun"), "run n 1 0 1 0 00558061\n").unwrap();
    std::fs::write(dict.join("index.verb"), "run v 1 0 1 0 01926311\n").unwrap();
    std::fs::write(dict.join("index.adj"), "").unwrap();
    std::fs::write(dict.join("index.adv"), "").unwrap();
    std::fs::write(dict.join("verb.exc"), "ran run\n").unwrap();
    let lexicon = WordNetLexicon::load(dict).unwrap();

    let frequency = StaticFrequency::new()
        .with("run_VERB", 2000, [10.0, 12.0, 14.0])
        .with("runs_VERB", 2000, [3.0, 4.0, 5.0])
        .with("running_VERB", 2000, [1.0, 1.0, 1.0])
        .with("ran_VERB", 2000, [2.0, 2.0, 2.0])
        .with("run_NOUN", 2000, [5.0, 5.0, 5.0])
        .with("he_PRON", 2000, [100.0, 110.0, 120.0])
        .with("him_PRON", 2000, [40.0, 45.0, 50.0]);

    let collapser = Collapser::new(Arc::new(lexicon), Arc::new(frequency)).with_parallelism(1);
    AppState {
        collapser: Arc::new(collapser),
        max_words: 4,
    }
}

async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
    let app = router(make_state());
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let body = serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

fn error_of(body: &serde_json::Value) -> String {
    body["error"]
        .as_str()
        .unwrap_or_default()
        .to_lowercase()
}

#[tokio::test]
async fn healthz_ok() {
    let app = router(make_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn lexemes_returns_series_per_category() {
    let (status, body) = get("/v1/lexemes?words=running&start=2000&end=2002").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "series");
    assert_eq!(body["strategy"], "observed");
    assert_eq!(
        body["families"]["run"],
        serde_json::json!(["ran", "run", "running", "runs"])
    );

    let entries = body["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(
        entries[0],
        serde_json::json!({"base": "run", "category": "noun", "years": [2000, 2001, 2002], "values": [5.0, 5.0, 5.0]})
    );
    assert_eq!(entries[1]["category"], "verb");
    assert_eq!(entries[1]["values"], serde_json::json!([16.0, 19.0, 22.0]));
}

#[tokio::test]
async fn lexemes_totals_with_canonical_categories() {
    let (status, body) =
        get("/v1/lexemes?words=run&start=2000&end=2002&mode=total&strategy=canonical").await;
    assert_eq!(status, StatusCode::OK);
    let entries = body["entries"].as_array().unwrap();
    let verb = entries
        .iter()
        .find(|e| e["category"] == "verb")
        .expect("verb entry");
    assert_eq!(verb["total"], 57.0);
    assert!(verb.get("values").is_none());
    assert!(body["skipped"]["absent_terms"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn lexemes_folds_pronoun_case_forms() {
    let (status, body) = get("/v1/lexemes?words=he,him,himself&start=2000&end=2002").await;
    assert_eq!(status, StatusCode::OK);
    let entries = body["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["base"], "he");
    assert_eq!(entries[0]["category"], "pron");
    assert_eq!(entries[0]["values"], serde_json::json!([140.0, 155.0, 170.0]));
    assert_eq!(
        body["skipped"]["dropped_bases"],
        serde_json::json!(["him", "himself"])
    );
}

#[tokio::test]
async fn lexemes_requires_words() {
    let (status, body) = get("/v1/lexemes?start=2000&end=2002").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_of(&body).contains("words"));

    let (status, _) = get("/v1/lexemes?words=,,&start=2000&end=2002").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn lexemes_rejects_inverted_range() {
    let (status, body) = get("/v1/lexemes?words=run&start=2005&end=2000").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_of(&body).contains("after"));
}

#[tokio::test]
async fn lexemes_rejects_bad_years_and_options() {
    let (status, body) = get("/v1/lexemes?words=run&start=then&end=2000").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_of(&body).contains("start"));

    let (status, body) = get("/v1/lexemes?words=run&start=2000").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_of(&body).contains("end is required"));

    let (status, body) = get("/v1/lexemes?words=run&start=2000&end=2001&mode=mean").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_of(&body).contains("mode"));

    let (status, body) = get("/v1/lexemes?words=run&start=2000&end=2001&strategy=both").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_of(&body).contains("strategy"));
}

#[tokio::test]
async fn lexemes_caps_word_count() {
    let (status, body) = get("/v1/lexemes?words=a,b,c,d,e&start=2000&end=2001").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_of(&body).contains("at most 4"));
}
