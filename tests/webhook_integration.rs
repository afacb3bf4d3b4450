//! End-to-end tests for the paid checkout and settlement flow.
//!
//! These tests drive the billing surface over HTTP:
//! 1. an owner starts a checkout and receives a hosted payment link
//! 2. the provider delivers a signed confirmation to the webhook route
//! 3. the owner-facing surfaces reflect the activated plan
//!
//! Webhook bodies are signed with the same HMAC-SHA256 recipe the
//! provider uses, over the exact bytes posted to the route. Uses
//! in-memory implementations to test the stack without external
//! dependencies.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tower::ServiceExt;

use tillflow_billing::adapters::auth::StaticTokenVerifier;
use tillflow_billing::adapters::http::middleware::{auth_middleware, AuthState};
use tillflow_billing::adapters::http::subscription::{
    subscription_router, SubscriptionAppState, PAYOS_SIGNATURE_HEADER,
};
use tillflow_billing::domain::foundation::{
    AccountId, AccountRole, AuthenticatedAccount, DomainError, ErrorCode, EventEnvelope, StoreId,
    SubscriptionId, Timestamp,
};
use tillflow_billing::domain::subscription::{
    PaymentHistoryRecord, PaymentMethod, PayosWebhookVerifier, PlanDuration, Subscription,
    SubscriptionStatus,
};
use tillflow_billing::ports::{
    AccountDirectory, CheckoutLink, CheckoutRequest, EventPublisher, Notice, NotificationStore,
    PaymentError, PaymentGateway, PaymentHistoryRepository, SubscriptionRepository,
};

const TEST_SECRET: &str = "payos-checksum-test-key";
const OWNER_TOKEN: &str = "owner-token";

// =============================================================================
// Test Infrastructure
// =============================================================================

/// In-memory subscription store for testing
struct InMemorySubscriptions {
    rows: Mutex<Vec<Subscription>>,
}

impl InMemorySubscriptions {
    fn with_rows(rows: Vec<Subscription>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }

    fn latest_for(&self, account_id: &AccountId) -> Option<Subscription> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.account_id == *account_id)
            .max_by_key(|r| *r.created_at.as_datetime())
            .cloned()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptions {
    async fn insert_trial_if_absent(
        &self,
        trial: &Subscription,
    ) -> Result<Subscription, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows.iter().find(|r| r.account_id == trial.account_id) {
            return Ok(existing.clone());
        }
        rows.push(trial.clone());
        Ok(trial.clone())
    }

    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        self.rows.lock().unwrap().push(subscription.clone());
        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|r| r.id == subscription.id) {
            Some(slot) => {
                *slot = subscription.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                "Subscription not found",
            )),
        }
    }

    async fn find_by_id(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == *id)
            .cloned())
    }

    async fn find_latest_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self.latest_for(account_id))
    }

    async fn find_pending_for_order(
        &self,
        account_id: &AccountId,
        duration: PlanDuration,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                r.account_id == *account_id
                    && r.status == SubscriptionStatus::Pending
                    && r.pending.as_ref().is_some_and(|p| p.plan_duration == duration)
            })
            .max_by_key(|r| *r.updated_at.as_datetime())
            .cloned())
    }

    async fn find_lapsed_trials(&self, now: Timestamp) -> Result<Vec<Subscription>, DomainError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                r.status == SubscriptionStatus::Trial
                    && r.trial_ends_at.is_some_and(|t| !t.is_after(&now))
            })
            .cloned()
            .collect())
    }

    async fn find_lapsed_actives(&self, now: Timestamp) -> Result<Vec<Subscription>, DomainError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                r.status == SubscriptionStatus::Active
                    && r.expires_at.is_some_and(|t| !t.is_after(&now))
            })
            .cloned()
            .collect())
    }
}

/// Directory stub with a recordable premium mirror and fixed counters.
struct SharedDirectory {
    premium: Mutex<HashMap<AccountId, bool>>,
}

impl SharedDirectory {
    fn new() -> Self {
        Self {
            premium: Mutex::new(HashMap::new()),
        }
    }

    fn premium_flag(&self, account_id: &AccountId) -> Option<bool> {
        self.premium.lock().unwrap().get(account_id).copied()
    }
}

#[async_trait]
impl AccountDirectory for SharedDirectory {
    async fn current_store_of(
        &self,
        _staff_id: &AccountId,
    ) -> Result<Option<StoreId>, DomainError> {
        Ok(None)
    }

    async fn owner_of_store(&self, _store_id: &StoreId) -> Result<Option<AccountId>, DomainError> {
        Ok(None)
    }

    async fn set_premium(
        &self,
        account_id: &AccountId,
        is_premium: bool,
    ) -> Result<(), DomainError> {
        self.premium.lock().unwrap().insert(*account_id, is_premium);
        Ok(())
    }

    async fn count_stores(&self, _owner_id: &AccountId) -> Result<u64, DomainError> {
        Ok(2)
    }

    async fn count_staff(&self, _owner_id: &AccountId) -> Result<u64, DomainError> {
        Ok(5)
    }
}

/// Publisher that records every envelope it sees.
struct RecordingPublisher {
    events: Mutex<Vec<EventEnvelope>>,
}

impl RecordingPublisher {
    fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    fn event_types(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type.clone())
            .collect()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        self.events.lock().unwrap().extend(events);
        Ok(())
    }
}

/// Append-only in-memory payment ledger.
struct InMemoryLedger {
    records: Mutex<Vec<PaymentHistoryRecord>>,
}

impl InMemoryLedger {
    fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    fn records(&self) -> Vec<PaymentHistoryRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentHistoryRepository for InMemoryLedger {
    async fn append(&self, record: &PaymentHistoryRecord) -> Result<(), DomainError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn list_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<PaymentHistoryRecord>, DomainError> {
        let mut rows: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.account_id == *account_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.as_datetime().cmp(a.created_at.as_datetime()));
        Ok(rows)
    }

    async fn total_paid_by_account(&self, account_id: &AccountId) -> Result<i64, DomainError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.account_id == *account_id)
            .map(|r| r.amount)
            .sum())
    }

    async fn count_by_account(&self, account_id: &AccountId) -> Result<u64, DomainError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.account_id == *account_id)
            .count() as u64)
    }
}

/// Notification store that keeps everything it is asked to record.
struct RecordingNotices {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotices {
    fn new() -> Self {
        Self {
            notices: Mutex::new(Vec::new()),
        }
    }

    fn titles(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.title.clone())
            .collect()
    }
}

#[async_trait]
impl NotificationStore for RecordingNotices {
    async fn record(&self, notice: &Notice) -> Result<(), DomainError> {
        self.notices.lock().unwrap().push(notice.clone());
        Ok(())
    }
}

/// Gateway stub that returns a deterministic hosted checkout link.
struct StubGateway;

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_checkout(&self, request: CheckoutRequest) -> Result<CheckoutLink, PaymentError> {
        Ok(CheckoutLink {
            checkout_url: format!("https://pay.example.com/web/{}", request.order_code),
            qr_data_url: "00020101021238570010A000000727".to_string(),
            payment_link_id: Some("plink_test_1".to_string()),
        })
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

fn fresh_trial(account_id: AccountId) -> Subscription {
    Subscription::create_trial(SubscriptionId::new(), account_id)
}

fn active_subscription(account_id: AccountId) -> Subscription {
    let mut subscription = fresh_trial(account_id);
    subscription.activate(PlanDuration::ThreeMonths).unwrap();
    subscription
}

fn sign(body: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(TEST_SECRET.as_bytes()).unwrap();
    mac.update(body.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn settlement_body(order_code: &str, amount: i64) -> String {
    serde_json::json!({
        "code": "00",
        "desc": "success",
        "success": true,
        "data": { "orderCode": order_code, "amount": amount }
    })
    .to_string()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// The routed app plus handles onto every in-memory port behind it.
struct Harness {
    app: Router,
    repository: Arc<InMemorySubscriptions>,
    directory: Arc<SharedDirectory>,
    publisher: Arc<RecordingPublisher>,
    ledger: Arc<InMemoryLedger>,
    notices: Arc<RecordingNotices>,
}

impl Harness {
    fn new(verifier: StaticTokenVerifier, rows: Vec<Subscription>) -> Self {
        let repository = Arc::new(InMemorySubscriptions::with_rows(rows));
        let directory = Arc::new(SharedDirectory::new());
        let publisher = Arc::new(RecordingPublisher::new());
        let ledger = Arc::new(InMemoryLedger::new());
        let notices = Arc::new(RecordingNotices::new());

        let state = SubscriptionAppState {
            subscription_repository: repository.clone(),
            payment_history: ledger.clone(),
            account_directory: directory.clone(),
            payment_gateway: Arc::new(StubGateway),
            event_publisher: publisher.clone(),
            notification_store: notices.clone(),
            webhook_verifier: Some(PayosWebhookVerifier::new(TEST_SECRET)),
        };
        let auth_state: AuthState = Arc::new(verifier);

        let app = Router::new()
            .nest("/api", subscription_router())
            .with_state(state)
            .layer(axum::middleware::from_fn_with_state(
                auth_state,
                auth_middleware,
            ));

        Self {
            app,
            repository,
            directory,
            publisher,
            ledger,
            notices,
        }
    }

    fn for_owner(rows_for: impl FnOnce(AccountId) -> Vec<Subscription>) -> (Self, AccountId) {
        let (verifier, owner_id) = StaticTokenVerifier::new().with_owner(OWNER_TOKEN);
        (Self::new(verifier, rows_for(owner_id)), owner_id)
    }

    async fn send(&self, request: Request<Body>) -> axum::response::Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, path: &str, token: Option<&str>) -> axum::response::Response {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn post_checkout(&self, token: &str, plan_duration: u32) -> axum::response::Response {
        let body = serde_json::json!({ "plan_duration": plan_duration }).to_string();
        let request = Request::builder()
            .method("POST")
            .uri("/api/subscriptions/checkout")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Starts a checkout and returns the issued order code.
    async fn checkout_order_code(&self, plan_duration: u32) -> String {
        let response = self.post_checkout(OWNER_TOKEN, plan_duration).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        body["order_code"].as_str().unwrap().to_string()
    }

    async fn deliver_webhook(
        &self,
        body: String,
        signature: Option<String>,
    ) -> axum::response::Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/payments/webhook")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(signature) = signature {
            builder = builder.header(PAYOS_SIGNATURE_HEADER, signature);
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    /// Full happy path: checkout for three months, then a signed
    /// confirmation for the catalog amount.
    async fn settle_three_month_plan(&self) -> String {
        let order_code = self.checkout_order_code(3).await;
        let body = settlement_body(&order_code, 799_000);
        let signature = sign(&body);
        let response = self.deliver_webhook(body, Some(signature)).await;
        assert_eq!(response.status(), StatusCode::OK);
        order_code
    }
}

// =============================================================================
// Checkout Tests
// =============================================================================

#[tokio::test]
async fn checkout_issues_hosted_payment_link() {
    let (harness, owner_id) = Harness::for_owner(|owner| vec![fresh_trial(owner)]);

    let response = harness.post_checkout(OWNER_TOKEN, 3).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["amount"], 799_000);
    let order_code = body["order_code"].as_str().unwrap();
    assert!(order_code.starts_with("SUB_"));
    assert_eq!(
        body["checkout_url"],
        format!("https://pay.example.com/web/{order_code}")
    );
    assert!(!body["qr_code_url"].as_str().unwrap().is_empty());

    let row = harness.repository.latest_for(&owner_id).unwrap();
    assert_eq!(row.status, SubscriptionStatus::Pending);
    assert_eq!(row.pending.unwrap().order_code, order_code);
}

#[tokio::test]
async fn checkout_rejects_unknown_duration() {
    let (harness, _owner_id) = Harness::for_owner(|owner| vec![fresh_trial(owner)]);

    let response = harness.post_checkout(OWNER_TOKEN, 4).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error_code"], "PLAN_INVALID");
}

#[tokio::test]
async fn checkout_conflicts_with_a_running_plan() {
    let (harness, owner_id) = Harness::for_owner(|owner| vec![active_subscription(owner)]);

    let response = harness.post_checkout(OWNER_TOKEN, 6).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error_code"], "ALREADY_ACTIVE");

    let row = harness.repository.latest_for(&owner_id).unwrap();
    assert_eq!(row.status, SubscriptionStatus::Active);
}

#[tokio::test]
async fn checkout_requires_an_owner_session() {
    let staff = AuthenticatedAccount::new(AccountId::new(), AccountRole::Staff);
    let verifier = StaticTokenVerifier::new().with_account("staff-token", staff);
    let harness = Harness::new(verifier, Vec::new());

    let response = harness.post_checkout("staff-token", 3).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error_code"], "FORBIDDEN");
}

#[tokio::test]
async fn checkout_requires_authentication() {
    let (harness, _owner_id) = Harness::for_owner(|owner| vec![fresh_trial(owner)]);

    let body = serde_json::json!({ "plan_duration": 3 }).to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/api/subscriptions/checkout")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    let response = harness.send(request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error_code"], "UNAUTHENTICATED");
}

// =============================================================================
// Webhook Settlement Tests
// =============================================================================

#[tokio::test]
async fn signed_confirmation_activates_the_plan() {
    let (harness, owner_id) = Harness::for_owner(|owner| vec![fresh_trial(owner)]);

    harness.settle_three_month_plan().await;

    let row = harness.repository.latest_for(&owner_id).unwrap();
    assert_eq!(row.status, SubscriptionStatus::Active);
    assert_eq!(row.plan_duration, Some(PlanDuration::ThreeMonths));
    assert!(row.pending.is_none());

    assert_eq!(harness.directory.premium_flag(&owner_id), Some(true));
    assert!(harness
        .publisher
        .event_types()
        .contains(&"subscription.activated".to_string()));
    assert!(harness
        .notices
        .titles()
        .contains(&"Subscription activated".to_string()));

    let records = harness.ledger.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].amount, 799_000);
    assert_eq!(records[0].method, PaymentMethod::Gateway);
}

#[tokio::test]
async fn settled_plan_shows_on_the_current_surface() {
    let (harness, _owner_id) = Harness::for_owner(|owner| vec![fresh_trial(owner)]);

    harness.settle_three_month_plan().await;

    let response = harness
        .get("/api/subscriptions/current", Some(OWNER_TOKEN))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["summary"]["type"], "premium");
    assert_eq!(body["summary"]["duration"], 3);
    assert_eq!(body["summary"]["auto_renew"], true);
    assert!(body["days_remaining"].as_u64().unwrap() >= 85);
}

#[tokio::test]
async fn replayed_confirmation_is_not_applied_twice() {
    let (harness, owner_id) = Harness::for_owner(|owner| vec![fresh_trial(owner)]);

    let order_code = harness.settle_three_month_plan().await;

    let body = settlement_body(&order_code, 799_000);
    let signature = sign(&body);
    let response = harness.deliver_webhook(body, Some(signature)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error_code"], "PENDING_ORDER_NOT_FOUND");

    let row = harness.repository.latest_for(&owner_id).unwrap();
    assert_eq!(row.status, SubscriptionStatus::Active);
    assert_eq!(harness.ledger.records().len(), 1);
}

#[tokio::test]
async fn tampered_payload_is_rejected() {
    let (harness, owner_id) = Harness::for_owner(|owner| vec![fresh_trial(owner)]);

    let order_code = harness.checkout_order_code(3).await;
    let genuine = settlement_body(&order_code, 799_000);
    let forged = settlement_body(&order_code, 1);
    let response = harness.deliver_webhook(forged, Some(sign(&genuine))).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error_code"], "INVALID_SIGNATURE");

    let row = harness.repository.latest_for(&owner_id).unwrap();
    assert_eq!(row.status, SubscriptionStatus::Pending);
    assert!(harness.ledger.records().is_empty());
}

#[tokio::test]
async fn unsigned_delivery_is_rejected() {
    let (harness, _owner_id) = Harness::for_owner(|owner| vec![fresh_trial(owner)]);

    let order_code = harness.checkout_order_code(3).await;
    let body = settlement_body(&order_code, 799_000);
    let response = harness.deliver_webhook(body, None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error_code"], "MISSING_SIGNATURE");
}

#[tokio::test]
async fn foreign_order_code_is_acknowledged_without_effect() {
    let (harness, owner_id) = Harness::for_owner(|owner| vec![fresh_trial(owner)]);

    let body = settlement_body("POS-INVOICE-000077", 500_000);
    let signature = sign(&body);
    let response = harness.deliver_webhook(body, Some(signature)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["error_code"], "ORDER_IGNORED");

    let row = harness.repository.latest_for(&owner_id).unwrap();
    assert_eq!(row.status, SubscriptionStatus::Trial);
    assert!(harness.ledger.records().is_empty());
}

// =============================================================================
// Owner Surface Tests
// =============================================================================

#[tokio::test]
async fn history_records_the_settled_payment() {
    let (harness, _owner_id) = Harness::for_owner(|owner| vec![fresh_trial(owner)]);

    harness.settle_three_month_plan().await;

    let response = harness
        .get("/api/subscriptions/history", Some(OWNER_TOKEN))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let payments = body["payments"].as_array().unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0]["amount"], 799_000);
    assert_eq!(payments[0]["plan_duration"], 3);
    assert_eq!(payments[0]["method"], "gateway");
    assert_eq!(payments[0]["status"], "success");
}

#[tokio::test]
async fn usage_reports_tenancy_counters() {
    let (harness, _owner_id) = Harness::for_owner(|owner| vec![fresh_trial(owner)]);

    harness.settle_three_month_plan().await;

    let response = harness
        .get("/api/subscriptions/usage", Some(OWNER_TOKEN))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "active");
    assert_eq!(body["store_count"], 2);
    assert_eq!(body["staff_count"], 5);
    assert_eq!(body["payment_count"], 1);
    assert_eq!(body["total_paid"], 799_000);
}

#[tokio::test]
async fn plan_catalog_is_public() {
    let (harness, _owner_id) = Harness::for_owner(|_owner| Vec::new());

    let response = harness.get("/api/subscriptions/plans", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let plans = body["plans"].as_array().unwrap();
    assert_eq!(plans.len(), 3);
    assert_eq!(plans[0]["duration_months"], 1);
    assert_eq!(plans[0]["amount"], 299_000);
    assert_eq!(plans[2]["duration_months"], 6);
    assert_eq!(plans[2]["amount"], 1_499_000);
}

#[tokio::test]
async fn cancel_switches_off_auto_renew() {
    let (harness, owner_id) = Harness::for_owner(|owner| vec![fresh_trial(owner)]);

    harness.settle_three_month_plan().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/subscriptions/cancel")
        .header(header::AUTHORIZATION, format!("Bearer {OWNER_TOKEN}"))
        .body(Body::empty())
        .unwrap();
    let response = harness.send(request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let row = harness.repository.latest_for(&owner_id).unwrap();
    assert_eq!(row.status, SubscriptionStatus::Active);
    assert!(!row.auto_renew);

    let response = harness
        .get("/api/subscriptions/current", Some(OWNER_TOKEN))
        .await;
    let body = body_json(response).await;
    assert_eq!(body["summary"]["auto_renew"], false);
}
