use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use httpmock::prelude::*;
use realty_hub::adapters::{DisabledChat, MemoryStore, OpenAiChatClient, OpenAiSettings};
use realty_hub::core::forecast_model::BaselineRule;
use realty_hub::domain::ports::ChatModel;
use realty_hub::{app, AppConfig, AppState, ForecastModel};
use serde_json::{json, Value};
use tokio::net::TcpListener;

const MODEL: &str = r#"{
    "forecast": {"2026": 200000, "2027": 210000},
    "lower": {"2026": 190000, "2027": 195000},
    "upper": {"2026": 210000, "2027": 225000},
    "confidence": 95
}"#;

struct TestServer {
    base_url: String,
    client: reqwest::Client,
}

impl TestServer {
    async fn start(chat: Arc<dyn ChatModel>) -> Result<Self> {
        let model = ForecastModel::from_json_str(MODEL, BaselineRule::EarliestYear)?;
        let state = AppState::new(
            AppConfig::default(),
            Arc::new(model),
            Arc::new(MemoryStore::new()),
            chat,
        );

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;
        tokio::spawn(async move {
            axum::serve(listener, app::router(state)).await.unwrap();
        });

        Ok(Self {
            base_url: format!("http://{}", address),
            client: reqwest::Client::new(),
        })
    }

    async fn without_llm() -> Result<Self> {
        Self::start(Arc::new(DisabledChat)).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, path: &str, body: Value) -> Result<reqwest::Response> {
        Ok(self.client.post(self.url(path)).json(&body).send().await?)
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    async fn delete(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self.client.delete(self.url(path)).send().await?)
    }
}

fn mock_llm(server: &MockServer) -> Arc<dyn ChatModel> {
    Arc::new(
        OpenAiChatClient::new(OpenAiSettings {
            endpoint: server.url("/v1"),
            api_key: "sk-test".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            timeout: Duration::from_secs(5),
        })
        .unwrap(),
    )
}

#[tokio::test]
async fn test_health_reports_model() -> Result<()> {
    let server = TestServer::without_llm().await?;

    let body: Value = server.get("/health").await?.json().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model_years"], 2);
    assert_eq!(body["baseline_year"], 2026);
    Ok(())
}

#[tokio::test]
async fn test_forecast_single_price() -> Result<()> {
    let server = TestServer::without_llm().await?;

    let response = server.post("/api/forecast", json!({"price": 300000})).await?;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await?;

    assert_eq!(body["confidence"], "95%");
    assert_eq!(body["forecast"][0]["year"], 2026);
    assert_eq!(body["forecast"][0]["projectedPrice"], 300000.0);
    assert_eq!(body["forecast"][0]["minPrice"], 285000.0);
    assert_eq!(body["forecast"][0]["maxPrice"], 315000.0);
    assert_eq!(body["forecast"][1]["projectedPrice"], 315000.0);

    // 沒有價格時不算錯誤，只是沒有預測點
    let body: Value = server.post("/api/forecast", json!({})).await?.json().await?;
    assert_eq!(body["forecast"], json!([]));
    assert_eq!(body["confidence"], "95%");

    let response = server.post("/api/forecast", json!({"price": -1})).await?;
    assert_eq!(response.status(), 400);
    Ok(())
}

#[tokio::test]
async fn test_favorites_lifecycle_and_batch_forecast() -> Result<()> {
    let server = TestServer::without_llm().await?;

    let response = server
        .post(
            "/api/favorites",
            json!({
                "userId": "u1", "zpid": 123, "title": "Cozy Family Home",
                "city": "Austin", "price": 300000, "bedrooms": 3, "bathrooms": 2
            }),
        )
        .await?;
    assert_eq!(response.status(), 201);
    let priced_id = response.json::<Value>().await?["id"]
        .as_str()
        .unwrap()
        .to_string();

    server
        .post("/api/favorites", json!({"userId": "u1", "title": "Lot without price"}))
        .await?;
    server
        .post("/api/favorites", json!({"userId": "u2", "title": "Someone else", "price": 1}))
        .await?;

    let body: Value = server.get("/api/favorites?userId=u1").await?.json().await?;
    assert_eq!(body["favorites"].as_array().unwrap().len(), 2);

    let body: Value = server
        .get("/api/forecast/favorites?userId=u1")
        .await?
        .json()
        .await?;
    let forecasts = body["forecasts"].as_array().unwrap();
    assert_eq!(forecasts.len(), 1);
    assert_eq!(forecasts[0]["home"]["_id"], priced_id.as_str());
    assert_eq!(forecasts[0]["home"]["title"], "Cozy Family Home");
    assert_eq!(forecasts[0]["forecast"][1]["maxPrice"], 337500.0);
    assert_eq!(forecasts[0]["confidence"], "95%");

    let response = server.delete(&format!("/api/favorites/{}", priced_id)).await?;
    assert_eq!(response.status(), 204);
    let response = server.delete(&format!("/api/favorites/{}", priced_id)).await?;
    assert_eq!(response.status(), 404);

    let response = server.get("/api/favorites").await?;
    assert_eq!(response.status(), 400);
    Ok(())
}

#[tokio::test]
async fn test_users_and_duplicate_email() -> Result<()> {
    let server = TestServer::without_llm().await?;

    let response = server
        .post("/api/users", json!({"name": "Ana", "email": "Ana@Example.com"}))
        .await?;
    assert_eq!(response.status(), 201);
    let user: Value = response.json().await?;
    assert_eq!(user["email"], "ana@example.com");

    let response = server
        .post("/api/users", json!({"name": "Ana again", "email": "ana@example.com"}))
        .await?;
    assert_eq!(response.status(), 409);

    let id = user["_id"].as_str().unwrap();
    let fetched: Value = server.get(&format!("/api/users/{}", id)).await?.json().await?;
    assert_eq!(fetched["name"], "Ana");

    let body: Value = server.get("/api/users").await?.json().await?;
    assert_eq!(body["users"].as_array().unwrap().len(), 1);

    assert_eq!(server.get("/api/users/missing").await?.status(), 404);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_registrations_with_same_email() -> Result<()> {
    let server = Arc::new(TestServer::without_llm().await?);

    let requests: Vec<_> = (0..16)
        .map(|i| {
            let server = server.clone();
            tokio::spawn(async move {
                server
                    .post(
                        "/api/users",
                        json!({"name": format!("Ana {}", i), "email": "ana@example.com"}),
                    )
                    .await
                    .map(|response| response.status().as_u16())
            })
        })
        .collect();

    let mut statuses = Vec::new();
    for request in requests {
        statuses.push(request.await??);
    }
    assert_eq!(statuses.iter().filter(|s| **s == 201).count(), 1);
    assert_eq!(statuses.iter().filter(|s| **s == 409).count(), 15);

    let body: Value = server.get("/api/users").await?.json().await?;
    assert_eq!(body["users"].as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_listing_search() -> Result<()> {
    let server = TestServer::without_llm().await?;

    for (title, city, price, kind) in [
        ("Downtown Loft", "Denver", 410000, "condo"),
        ("Ranch House", "Austin", 350000, "house"),
        ("Lake Cabin", "Denver", 275000, "house"),
    ] {
        let response = server
            .post(
                "/api/listings",
                json!({"title": title, "city": city, "price": price, "propertyType": kind}),
            )
            .await?;
        assert_eq!(response.status(), 201);
    }

    let body: Value = server.get("/api/search?q=denver").await?.json().await?;
    let titles: Vec<&str> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Lake Cabin", "Downtown Loft"]);

    let body: Value = server
        .get("/api/search?property_type=house&max_price=300000")
        .await?
        .json()
        .await?;
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert_eq!(body["results"][0]["title"], "Lake Cabin");

    let response = server.get("/api/search?min_price=10&max_price=1").await?;
    assert_eq!(response.status(), 400);
    Ok(())
}

#[tokio::test]
async fn test_recently_viewed_upserts_pair() -> Result<()> {
    let server = TestServer::without_llm().await?;

    for home in ["h1", "h2", "h1"] {
        let response = server
            .post("/api/recently-viewed", json!({"userId": "u1", "homeId": home}))
            .await?;
        assert_eq!(response.status(), 200);
    }

    let body: Value = server.get("/api/recently-viewed?userId=u1").await?.json().await?;
    let views = body["recentlyViewed"].as_array().unwrap();
    assert_eq!(views.len(), 2);
    assert_eq!(views[0]["homeId"], "h1");

    let response = server
        .post("/api/recently-viewed", json!({"userId": "u1"}))
        .await?;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "Missing userId or homeId");
    Ok(())
}

#[tokio::test]
async fn test_mortgage_calculator() -> Result<()> {
    let server = TestServer::without_llm().await?;

    let body: Value = server
        .post(
            "/api/mortgage",
            json!({"principal": 350000, "annual_rate_percent": 3.5, "years": 30}),
        )
        .await?
        .json()
        .await?;
    assert_eq!(body["monthly_payment"], 1571.66);

    let response = server
        .post(
            "/api/mortgage",
            json!({"principal": 0, "annual_rate_percent": 3.5, "years": 30}),
        )
        .await?;
    assert_eq!(response.status(), 400);
    Ok(())
}

#[tokio::test]
async fn test_chat_without_llm_is_unavailable() -> Result<()> {
    let server = TestServer::without_llm().await?;

    let response = server.post("/api/chat", json!({"message": "hi"})).await?;
    assert_eq!(response.status(), 503);
    Ok(())
}

#[tokio::test]
async fn test_chat_proxies_to_llm() -> Result<()> {
    let llm = MockServer::start();
    let llm_mock = llm.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .body_contains("How do I get a mortgage?");
        then.status(200).json_body(json!({
            "choices": [{"message": {"role": "assistant", "content": "Start with a pre-approval."}}]
        }));
    });
    let server = TestServer::start(mock_llm(&llm)).await?;

    let body: Value = server
        .post("/api/chat", json!({"message": "How do I get a mortgage?"}))
        .await?
        .json()
        .await?;

    llm_mock.assert();
    assert_eq!(body["reply"], "Start with a pre-approval.");

    let response = server.post("/api/chat", json!({"message": "  "})).await?;
    assert_eq!(response.status(), 400);
    Ok(())
}

#[tokio::test]
async fn test_generate_tasks_replaces_previous_list() -> Result<()> {
    let llm = MockServer::start();
    let content = "```json\n[{\"title\": \"Check credit report\", \"category\": \"finance\", \
        \"due_date\": \"2025-08-01\", \"priority\": \"high\"}, {\"title\": \"Get home inspection\", \
        \"category\": \"inspection\", \"due_date\": \"2025-09-01\", \"priority\": \"medium\"}]\n```";
    let llm_mock = llm.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        }));
    });
    let server = TestServer::start(mock_llm(&llm)).await?;

    let request = json!({
        "user_id": "demo-user-id-123",
        "credit_score": "720",
        "refinancing_info": "first-time buyer"
    });
    server.post("/api/tasks/generate", request.clone()).await?;
    let body: Value = server.post("/api/tasks/generate", request).await?.json().await?;

    llm_mock.assert_hits(2);
    let tasks = body["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["priority"], "high");
    assert_eq!(tasks[0]["completed"], false);

    let listed: Value = server
        .get("/api/tasks?user_id=demo-user-id-123")
        .await?
        .json()
        .await?;
    let listed = listed["tasks"].as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["title"], "Check credit report");

    let id = listed[0]["_id"].as_str().unwrap();
    assert_eq!(server.delete(&format!("/api/tasks/{}", id)).await?.status(), 204);
    let listed: Value = server
        .get("/api/tasks?user_id=demo-user-id-123")
        .await?
        .json()
        .await?;
    assert_eq!(listed["tasks"].as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_generate_tasks_upstream_failure() -> Result<()> {
    let llm = MockServer::start();
    llm.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(500);
    });
    let server = TestServer::start(mock_llm(&llm)).await?;

    let response = server
        .post("/api/tasks/generate", json!({"user_id": "u1", "credit_score": 700}))
        .await?;
    assert_eq!(response.status(), 502);
    Ok(())
}
