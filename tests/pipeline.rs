use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tempfile::tempdir;

use menu_sommelier::budget::{CostGovernor, SqliteLedgerStore, SystemClock};
use menu_sommelier::llm::{ChatRequest, ChatTransport, LlmError, RetryConfig, TransportResponse};
use menu_sommelier::menu::TasteVector;
use menu_sommelier::recommend::{RecommendationSelector, MAX_RECOMMENDATIONS};
use menu_sommelier::vision::VisionExtractionClient;
use menu_sommelier::{DietaryTag, MenuError, MenuPipeline, RecommendOptions, UserProfile};

struct ScriptedTransport {
    replies: Mutex<VecDeque<TransportResponse>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    fn new(replies: Vec<TransportResponse>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(&self, _request: &ChatRequest) -> Result<TransportResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LlmError::transport("no reply scripted"))
    }
}

fn reply(content: &str, prompt_tokens: u64, completion_tokens: u64) -> TransportResponse {
    TransportResponse {
        status: 200,
        body: json!({
            "choices": [{"message": {"role": "assistant", "content": content}, "finish_reason": "stop"}],
            "usage": {
                "prompt_tokens": prompt_tokens,
                "completion_tokens": completion_tokens,
                "total_tokens": prompt_tokens + completion_tokens
            }
        })
        .to_string(),
    }
}

fn rate_limited() -> TransportResponse {
    TransportResponse {
        status: 429,
        body: r#"{"error":{"message":"slow down"}}"#.to_string(),
    }
}

fn menu_reply() -> String {
    let mut items = vec![
        json!({"name_original": "Cochinita pibil", "name_translated": "Slow-roasted pork",
               "ingredients": ["pork", "achiote", "orange"], "price": 16,
               "estimated_flavors": {"Spiciness": 40, "Richness": 80}}),
        json!({"name_translated": "Shrimp aguachile", "ingredients": ["shrimp", "lime", "chili"],
               "price": "$18.00", "estimated_flavors": {"Spiciness": 90, "Freshness": 90}}),
    ];
    for i in 0..8 {
        items.push(json!({
            "name_translated": format!("Veggie taco {i}"),
            "ingredients": ["corn tortilla", "beans"],
            "price": 4 + i,
            "estimated_flavors": {"Spiciness": i * 10}
        }));
    }
    format!("Here is the menu:\n```json\n{}\n```", json!({ "menu_items": items }))
}

fn pipeline(
    transport: Arc<ScriptedTransport>,
    governor: Arc<CostGovernor>,
) -> MenuPipeline {
    let client = VisionExtractionClient::new(transport, governor, "gpt-4o")
        .with_retry(RetryConfig::new(3, Duration::ZERO));
    MenuPipeline::new(Arc::new(client), RecommendationSelector::default())
}

#[tokio::test]
async fn recommends_top_dishes_after_transient_failures() {
    let dir = tempdir().unwrap();
    let ledger = dir.path().join("ledger.db");
    let governor = Arc::new(
        CostGovernor::new(
            10.0,
            Arc::new(SqliteLedgerStore::open(&ledger).unwrap()),
            Arc::new(SystemClock),
        )
        .unwrap(),
    );
    let transport = ScriptedTransport::new(vec![
        rate_limited(),
        reply(&menu_reply(), 2000, 1000),
    ]);
    let pipeline = pipeline(transport.clone(), governor.clone());

    let profile = UserProfile::new("diner@example.com")
        .with_taste_vector(TasteVector::neutral().with("Spiciness", 100.0))
        .with_dietary_tags([DietaryTag::Kosher]);

    let recs = pipeline
        .recommend(b"\xff\xd8jpeg", &profile, RecommendOptions::default())
        .await
        .unwrap();

    assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    assert_eq!(recs.len(), MAX_RECOMMENDATIONS);
    assert!(recs
        .iter()
        .all(|r| !r.item.name_translated.contains("pork") && !r.item.name_translated.contains("Shrimp")));
    assert_eq!(recs[0].item.name_translated, "Veggie taco 7");
    assert!(recs.windows(2).all(|w| w[0].match_score >= w[1].match_score));
    assert!(recs.iter().all(|r| (0.0..=1.0).contains(&r.match_score)));

    // 2K prompt + 1K completion tokens at gpt-4o rates, persisted to disk.
    let expected = 2.0 * 0.005 + 0.015;
    assert!((governor.status().await.unwrap().spent - expected).abs() < 1e-9);
    drop(pipeline);
    drop(governor);

    let reopened = CostGovernor::new(
        10.0,
        Arc::new(SqliteLedgerStore::open(&ledger).unwrap()),
        Arc::new(SystemClock),
    )
    .unwrap();
    assert!((reopened.status().await.unwrap().spent - expected).abs() < 1e-9);
}

#[tokio::test]
async fn stops_calling_the_model_once_the_budget_is_spent() {
    let dir = tempdir().unwrap();
    let governor = Arc::new(
        CostGovernor::new(
            0.01,
            Arc::new(SqliteLedgerStore::open(&dir.path().join("ledger.db")).unwrap()),
            Arc::new(SystemClock),
        )
        .unwrap(),
    );
    let transport = ScriptedTransport::new(vec![
        reply(&menu_reply(), 2000, 1000),
        reply(&menu_reply(), 2000, 1000),
    ]);
    let pipeline = pipeline(transport.clone(), governor);
    let profile = UserProfile::new("diner@example.com");

    pipeline
        .recommend(b"jpeg", &profile, RecommendOptions::default())
        .await
        .unwrap();

    let err = pipeline
        .recommend(b"jpeg", &profile, RecommendOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MenuError::DailyCostExceeded { .. }));
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
}
