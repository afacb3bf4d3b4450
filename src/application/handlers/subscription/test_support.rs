//! Shared in-memory fakes for the subscription handler tests.
//!
//! Every handler in this module drives the same small set of ports, so
//! the mocks live here once instead of being repeated per file. They
//! reproduce the behavior the handlers can actually observe: the
//! conditional trial insert returns the surviving row, the latest-row
//! lookup sorts by creation time, and the lapsed scans compare clocks
//! the way the real store does. Failure flags turn individual
//! operations into simulated infrastructure errors.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{
    AccountId, DomainError, ErrorCode, EventEnvelope, StoreId, SubscriptionId, Timestamp,
};
use crate::domain::subscription::{
    OrderCode, PaymentHistoryRecord, PaymentStatus, PendingCheckout, PlanDuration, PlanOffer,
    Subscription, SubscriptionStatus,
};
use crate::ports::{
    AccountDirectory, CheckoutLink, CheckoutRequest, EventPublisher, Notice, NotificationStore,
    PaymentError, PaymentGateway, PaymentHistoryRepository, SubscriptionRepository,
};

// ════════════════════════════════════════════════════════════════════════════
// Subscription Repository
// ════════════════════════════════════════════════════════════════════════════

pub(crate) struct MockSubscriptionRepository {
    rows: Mutex<Vec<Subscription>>,
    fail_inserts: bool,
    fail_updates: bool,
    fail_reads: bool,
}

impl MockSubscriptionRepository {
    pub(crate) fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            fail_inserts: false,
            fail_updates: false,
            fail_reads: false,
        }
    }

    pub(crate) fn with_row(subscription: Subscription) -> Self {
        let repo = Self::new();
        repo.seed(subscription);
        repo
    }

    /// Every operation fails with a database error.
    pub(crate) fn failing() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            fail_inserts: true,
            fail_updates: true,
            fail_reads: true,
        }
    }

    /// Reads succeed, writes fail. Used to exercise self-heal and
    /// persistence-failure paths against a readable row.
    pub(crate) fn failing_writes(subscription: Subscription) -> Self {
        let repo = Self {
            rows: Mutex::new(Vec::new()),
            fail_inserts: true,
            fail_updates: true,
            fail_reads: false,
        };
        repo.seed(subscription);
        repo
    }

    pub(crate) fn seed(&self, subscription: Subscription) {
        self.rows.lock().unwrap().push(subscription);
    }

    pub(crate) fn rows(&self) -> Vec<Subscription> {
        self.rows.lock().unwrap().clone()
    }

    /// The newest row for an account, mirroring `find_latest_by_account`.
    pub(crate) fn latest_for(&self, account_id: &AccountId) -> Option<Subscription> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.account_id == *account_id)
            .max_by_key(|s| s.created_at)
            .cloned()
    }

    fn database_error() -> DomainError {
        DomainError::new(ErrorCode::DatabaseError, "Simulated database failure")
    }
}

#[async_trait]
impl SubscriptionRepository for MockSubscriptionRepository {
    async fn insert_trial_if_absent(
        &self,
        trial: &Subscription,
    ) -> Result<Subscription, DomainError> {
        if self.fail_inserts {
            return Err(Self::database_error());
        }
        let mut rows = self.rows.lock().unwrap();
        let existing = rows
            .iter()
            .filter(|s| s.account_id == trial.account_id)
            .max_by_key(|s| s.created_at)
            .cloned();
        match existing {
            Some(winner) => Ok(winner),
            None => {
                rows.push(trial.clone());
                Ok(trial.clone())
            }
        }
    }

    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        if self.fail_inserts {
            return Err(Self::database_error());
        }
        self.rows.lock().unwrap().push(subscription.clone());
        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        if self.fail_updates {
            return Err(Self::database_error());
        }
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|s| s.id == subscription.id) {
            Some(slot) => {
                *slot = subscription.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                "Subscription row not found",
            )),
        }
    }

    async fn find_by_id(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, DomainError> {
        if self.fail_reads {
            return Err(Self::database_error());
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == *id)
            .cloned())
    }

    async fn find_latest_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<Subscription>, DomainError> {
        if self.fail_reads {
            return Err(Self::database_error());
        }
        Ok(self.latest_for(account_id))
    }

    async fn find_pending_for_order(
        &self,
        account_id: &AccountId,
        duration: PlanDuration,
    ) -> Result<Option<Subscription>, DomainError> {
        if self.fail_reads {
            return Err(Self::database_error());
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| {
                s.account_id == *account_id
                    && s.status == SubscriptionStatus::Pending
                    && s.pending
                        .as_ref()
                        .is_some_and(|p| p.plan_duration == duration)
            })
            .max_by_key(|s| s.updated_at)
            .cloned())
    }

    async fn find_lapsed_trials(
        &self,
        now: Timestamp,
    ) -> Result<Vec<Subscription>, DomainError> {
        if self.fail_reads {
            return Err(Self::database_error());
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| {
                s.status == SubscriptionStatus::Trial
                    && s.trial_ends_at.is_some_and(|ends| !now.is_before(&ends))
            })
            .cloned()
            .collect())
    }

    async fn find_lapsed_actives(
        &self,
        now: Timestamp,
    ) -> Result<Vec<Subscription>, DomainError> {
        if self.fail_reads {
            return Err(Self::database_error());
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| {
                s.status == SubscriptionStatus::Active
                    && s.expires_at.is_some_and(|ends| !now.is_before(&ends))
            })
            .cloned()
            .collect())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Account Directory
// ════════════════════════════════════════════════════════════════════════════

pub(crate) struct MockAccountDirectory {
    staff_stores: Mutex<HashMap<AccountId, StoreId>>,
    store_owners: Mutex<HashMap<StoreId, AccountId>>,
    premium_flags: Mutex<HashMap<AccountId, bool>>,
    store_count: u64,
    staff_count: u64,
    fail_premium_writes: bool,
    fail_counts: bool,
}

impl MockAccountDirectory {
    pub(crate) fn new() -> Self {
        Self {
            staff_stores: Mutex::new(HashMap::new()),
            store_owners: Mutex::new(HashMap::new()),
            premium_flags: Mutex::new(HashMap::new()),
            store_count: 1,
            staff_count: 0,
            fail_premium_writes: false,
            fail_counts: false,
        }
    }

    /// Wires a staff account through its store to the owning account.
    pub(crate) fn with_staff_chain(staff: AccountId, store: StoreId, owner: AccountId) -> Self {
        let directory = Self::new();
        directory.staff_stores.lock().unwrap().insert(staff, store);
        directory.store_owners.lock().unwrap().insert(store, owner);
        directory
    }

    pub(crate) fn with_counts(stores: u64, staff: u64) -> Self {
        Self {
            store_count: stores,
            staff_count: staff,
            ..Self::new()
        }
    }

    pub(crate) fn failing_premium_writes() -> Self {
        Self {
            fail_premium_writes: true,
            ..Self::new()
        }
    }

    pub(crate) fn failing_counts() -> Self {
        Self {
            fail_counts: true,
            ..Self::new()
        }
    }

    /// The premium mirror value written for an account, if any write landed.
    pub(crate) fn premium_flag(&self, account_id: &AccountId) -> Option<bool> {
        self.premium_flags.lock().unwrap().get(account_id).copied()
    }
}

#[async_trait]
impl AccountDirectory for MockAccountDirectory {
    async fn current_store_of(
        &self,
        staff_id: &AccountId,
    ) -> Result<Option<StoreId>, DomainError> {
        Ok(self.staff_stores.lock().unwrap().get(staff_id).copied())
    }

    async fn owner_of_store(&self, store_id: &StoreId) -> Result<Option<AccountId>, DomainError> {
        Ok(self.store_owners.lock().unwrap().get(store_id).copied())
    }

    async fn set_premium(
        &self,
        account_id: &AccountId,
        is_premium: bool,
    ) -> Result<(), DomainError> {
        if self.fail_premium_writes {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated premium mirror failure",
            ));
        }
        self.premium_flags
            .lock()
            .unwrap()
            .insert(*account_id, is_premium);
        Ok(())
    }

    async fn count_stores(&self, _owner_id: &AccountId) -> Result<u64, DomainError> {
        if self.fail_counts {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated directory failure",
            ));
        }
        Ok(self.store_count)
    }

    async fn count_staff(&self, _owner_id: &AccountId) -> Result<u64, DomainError> {
        if self.fail_counts {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated directory failure",
            ));
        }
        Ok(self.staff_count)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Payment Gateway
// ════════════════════════════════════════════════════════════════════════════

pub(crate) struct MockPaymentGateway {
    requests: Mutex<Vec<CheckoutRequest>>,
    should_fail: bool,
}

impl MockPaymentGateway {
    pub(crate) fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            should_fail: false,
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            should_fail: true,
        }
    }

    pub(crate) fn requests(&self) -> Vec<CheckoutRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutLink, PaymentError> {
        if self.should_fail {
            return Err(PaymentError::provider("Simulated gateway failure"));
        }
        let link = CheckoutLink {
            checkout_url: format!("https://pay.test/checkout/{}", request.order_code),
            qr_data_url: format!("data:image/png;base64,qr-{}", request.order_code),
            payment_link_id: Some(format!("pl_{}", request.order_code)),
        };
        self.requests.lock().unwrap().push(request);
        Ok(link)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Event Publisher
// ════════════════════════════════════════════════════════════════════════════

pub(crate) struct MockEventPublisher {
    published_events: Mutex<Vec<EventEnvelope>>,
    fail_publish: bool,
}

impl MockEventPublisher {
    pub(crate) fn new() -> Self {
        Self {
            published_events: Mutex::new(Vec::new()),
            fail_publish: false,
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            published_events: Mutex::new(Vec::new()),
            fail_publish: true,
        }
    }

    pub(crate) fn published_events(&self) -> Vec<EventEnvelope> {
        self.published_events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for MockEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        if self.fail_publish {
            return Err(DomainError::new(
                ErrorCode::InternalError,
                "Simulated publish failure",
            ));
        }
        self.published_events.lock().unwrap().push(event);
        Ok(())
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Notification Store
// ════════════════════════════════════════════════════════════════════════════

pub(crate) struct MockNotificationStore {
    recorded: Mutex<Vec<Notice>>,
    should_fail: bool,
}

impl MockNotificationStore {
    pub(crate) fn new() -> Self {
        Self {
            recorded: Mutex::new(Vec::new()),
            should_fail: false,
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            recorded: Mutex::new(Vec::new()),
            should_fail: true,
        }
    }

    pub(crate) fn recorded(&self) -> Vec<Notice> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationStore for MockNotificationStore {
    async fn record(&self, notice: &Notice) -> Result<(), DomainError> {
        if self.should_fail {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated notification failure",
            ));
        }
        self.recorded.lock().unwrap().push(notice.clone());
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Payment History Repository
// ════════════════════════════════════════════════════════════════════════════

pub(crate) struct MockPaymentHistoryRepository {
    records: Mutex<Vec<PaymentHistoryRecord>>,
    fail_appends: bool,
    fail_reads: bool,
}

impl MockPaymentHistoryRepository {
    pub(crate) fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail_appends: false,
            fail_reads: false,
        }
    }

    pub(crate) fn failing_appends() -> Self {
        Self {
            fail_appends: true,
            ..Self::new()
        }
    }

    pub(crate) fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::new()
        }
    }

    pub(crate) fn records(&self) -> Vec<PaymentHistoryRecord> {
        self.records.lock().unwrap().clone()
    }

    fn database_error() -> DomainError {
        DomainError::new(ErrorCode::DatabaseError, "Simulated ledger failure")
    }
}

#[async_trait]
impl PaymentHistoryRepository for MockPaymentHistoryRepository {
    async fn append(&self, record: &PaymentHistoryRecord) -> Result<(), DomainError> {
        if self.fail_appends {
            return Err(Self::database_error());
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn list_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<PaymentHistoryRecord>, DomainError> {
        if self.fail_reads {
            return Err(Self::database_error());
        }
        let mut records: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.account_id == *account_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn total_paid_by_account(&self, account_id: &AccountId) -> Result<i64, DomainError> {
        if self.fail_reads {
            return Err(Self::database_error());
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.account_id == *account_id && r.status == PaymentStatus::Success)
            .map(|r| r.amount)
            .sum())
    }

    async fn count_by_account(&self, account_id: &AccountId) -> Result<u64, DomainError> {
        if self.fail_reads {
            return Err(Self::database_error());
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.account_id == *account_id && r.status == PaymentStatus::Success)
            .count() as u64)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Subscription Fixtures
// ════════════════════════════════════════════════════════════════════════════

/// A trial created just now, clock still running.
pub(crate) fn fresh_trial(account_id: AccountId) -> Subscription {
    Subscription::create_trial(SubscriptionId::new(), account_id)
}

/// A trial whose window elapsed days ago, status not yet converged.
pub(crate) fn lapsed_trial(account_id: AccountId) -> Subscription {
    let mut subscription = fresh_trial(account_id);
    subscription.trial_started_at = Some(Timestamp::now().minus_days(20));
    subscription.trial_ends_at = Some(Timestamp::now().minus_days(6));
    subscription
}

/// An active subscription with most of its paid window remaining.
pub(crate) fn active_subscription(
    account_id: AccountId,
    duration: PlanDuration,
) -> Subscription {
    let mut subscription = fresh_trial(account_id);
    subscription
        .activate(duration)
        .expect("trial rows accept activation");
    subscription
}

/// An active subscription whose paid window elapsed, status not yet
/// converged.
pub(crate) fn lapsed_active(account_id: AccountId) -> Subscription {
    let mut subscription = active_subscription(account_id, PlanDuration::OneMonth);
    subscription.started_at = Some(Timestamp::now().minus_days(45));
    subscription.expires_at = Some(Timestamp::now().minus_days(10));
    subscription
}

/// An expired row that went through a paid period before lapsing.
pub(crate) fn expired_premium(account_id: AccountId) -> Subscription {
    let mut subscription = lapsed_active(account_id);
    subscription.expire().expect("lapsed actives can expire");
    subscription
}

/// An expired row that only ever held a trial.
pub(crate) fn expired_trial(account_id: AccountId) -> Subscription {
    let mut subscription = lapsed_trial(account_id);
    subscription.expire().expect("lapsed trials can expire");
    subscription
}

/// A PENDING row with an outstanding checkout, plus its order code.
pub(crate) fn pending_checkout_row(
    account_id: AccountId,
    duration: PlanDuration,
) -> (Subscription, String) {
    let order_code = OrderCode::issue(account_id, duration).to_string();
    let pending = PendingCheckout::new(
        order_code.clone(),
        PlanOffer::for_duration(duration).amount,
        duration,
        "https://pay.test/checkout/fixture",
        "data:image/png;base64,fixture",
    );
    let row = Subscription::create_pending(SubscriptionId::new(), account_id, pending);
    (row, order_code)
}
