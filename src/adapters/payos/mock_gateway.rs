//! Mock payment gateway for testing and credential-less development.
//!
//! Issues deterministic checkout links derived from the order code, so
//! the rest of the flow (pending block, webhook correlation) can be
//! exercised without merchant credentials. Supports error injection and
//! call tracking for integration tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::{CheckoutLink, CheckoutRequest, PaymentError, PaymentGateway};

/// Mock payment gateway.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentGateway::new();
/// let link = mock.create_checkout(request).await?;
///
/// // Inject a failure for the next call
/// mock.fail_next(PaymentError::network("connection reset"));
/// ```
#[derive(Default)]
pub struct MockPaymentGateway {
    /// Requests seen, for assertions.
    requests: Mutex<Vec<CheckoutRequest>>,

    /// Error to return on the next call, consumed once.
    next_error: Mutex<Option<PaymentError>>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `create_checkout` call fail with the given error.
    pub fn fail_next(&self, error: PaymentError) {
        *self.next_error.lock().expect("mock lock poisoned") = Some(error);
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<CheckoutRequest> {
        self.requests.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutLink, PaymentError> {
        if let Some(error) = self.next_error.lock().expect("mock lock poisoned").take() {
            return Err(error);
        }

        let link = CheckoutLink {
            checkout_url: format!("https://pay.mock.local/checkout/{}", request.order_code),
            qr_data_url: format!("data:image/png;base64,mock-qr-{}", request.order_code),
            payment_link_id: Some(format!("mock_{}", request.order_code)),
        };

        self.requests
            .lock()
            .expect("mock lock poisoned")
            .push(request);

        Ok(link)
    }
}
