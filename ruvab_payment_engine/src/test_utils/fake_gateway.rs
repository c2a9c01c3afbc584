use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use rpg_common::{Paise, Secret};

use crate::{
    helpers::sign_payment,
    traits::{GatewayError, GatewayOrder, GatewayOrderRequest, GatewayPayment, PaymentGateway},
};

pub const FAKE_KEY_ID: &str = "rzp_test_fake_key";
pub const FAKE_KEY_SECRET: &str = "fake_gateway_secret";

/// An in-memory gateway that records every call made to it.
#[derive(Clone)]
pub struct FakeGateway {
    key_id: String,
    secret: Secret<String>,
    state: Arc<Mutex<FakeGatewayState>>,
}

#[derive(Default)]
struct FakeGatewayState {
    create_calls: usize,
    fetch_calls: usize,
    next_order_handles: Vec<String>,
    order_requests: Vec<GatewayOrderRequest>,
    payments: HashMap<String, GatewayPayment>,
    create_error: Option<GatewayError>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self::new(FAKE_KEY_ID, FAKE_KEY_SECRET)
    }
}

impl FakeGateway {
    pub fn new(key_id: &str, secret: &str) -> Self {
        Self {
            key_id: key_id.to_string(),
            secret: Secret::new(secret.to_string()),
            state: Arc::new(Mutex::new(FakeGatewayState::default())),
        }
    }

    /// The next call to `create_order` returns this handle instead of a generated one.
    pub fn with_next_order_handle(self, handle: &str) -> Self {
        self.state.lock().unwrap().next_order_handles.push(handle.to_string());
        self
    }

    pub fn fail_create_with(&self, error: GatewayError) {
        self.state.lock().unwrap().create_error = Some(error);
    }

    /// Makes a payment known to the gateway, so that `fetch_payment` can find it.
    pub fn add_payment(&self, payment: GatewayPayment) {
        self.state.lock().unwrap().payments.insert(payment.id.clone(), payment);
    }

    pub fn sign(&self, order_handle: &str, payment_handle: &str) -> String {
        sign_payment(order_handle, payment_handle, &self.secret).unwrap()
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }

    pub fn fetch_calls(&self) -> usize {
        self.state.lock().unwrap().fetch_calls
    }

    pub fn last_order_request(&self) -> Option<GatewayOrderRequest> {
        self.state.lock().unwrap().order_requests.last().cloned()
    }

    /// A captured UPI payment, as the gateway would report it.
    pub fn captured_payment(payment_handle: &str, order_handle: &str, amount: Paise) -> GatewayPayment {
        GatewayPayment {
            id: payment_handle.to_string(),
            order_id: Some(order_handle.to_string()),
            amount,
            currency: "INR".to_string(),
            status: "captured".to_string(),
            method: Some("upi".to_string()),
            vpa: Some("asha@okbank".to_string()),
            fee: Some(Paise::from(1_180)),
            tax: Some(Paise::from(180)),
            ..Default::default()
        }
    }

    pub fn failed_payment(payment_handle: &str, order_handle: &str, amount: Paise) -> GatewayPayment {
        GatewayPayment {
            id: payment_handle.to_string(),
            order_id: Some(order_handle.to_string()),
            amount,
            currency: "INR".to_string(),
            status: "failed".to_string(),
            method: Some("card".to_string()),
            error_description: Some("Payment was declined by the bank".to_string()),
            ..Default::default()
        }
    }
}

impl PaymentGateway for FakeGateway {
    fn public_key(&self) -> &str {
        self.key_id.as_str()
    }

    fn signing_secret(&self) -> &Secret<String> {
        &self.secret
    }

    async fn create_order(&self, request: GatewayOrderRequest) -> Result<GatewayOrder, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;
        if let Some(e) = state.create_error.take() {
            return Err(e);
        }
        let id = if state.next_order_handles.is_empty() {
            format!("order_fake{:06}", state.create_calls)
        } else {
            state.next_order_handles.remove(0)
        };
        let order =
            GatewayOrder { id, amount: request.amount, currency: request.currency.clone(), status: "created".into() };
        state.order_requests.push(request);
        Ok(order)
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.fetch_calls += 1;
        state
            .payments
            .get(payment_id)
            .cloned()
            .ok_or_else(|| GatewayError::Rejected { status: 400, message: "The id provided does not exist".into() })
    }
}
