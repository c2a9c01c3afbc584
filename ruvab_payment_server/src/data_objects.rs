use std::fmt::Display;

use rpg_common::{Paise, PaiseConversionError};
use ruvab_payment_engine::{
    checkout_objects::{CheckoutOrder, CheckoutRequest, OrderWithPayments, PaymentVerification, VerifiedPayment},
    db_types::{Order, OrderId, Payment},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

//--------------------------------------   POST /payment/create-order   -------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Amount in whole rupees. Converted to paise before it reaches the engine.
    pub amount: i64,
    #[serde(default)]
    pub service_type: String,
    #[serde(default)]
    pub customer_email: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub description: Option<String>,
}

impl CreateOrderRequest {
    pub fn into_checkout_request(self) -> Result<CheckoutRequest, PaiseConversionError> {
        let amount = Paise::from_rupees(self.amount)?;
        let present = |s: &Option<String>| s.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        let mut request = CheckoutRequest::new(amount, &self.service_type, &self.customer_email);
        if let Some(name) = present(&self.customer_name) {
            request = request.with_customer_name(&name);
        }
        if let Some(phone) = present(&self.customer_phone) {
            request = request.with_customer_phone(&phone);
        }
        if let Some(description) = present(&self.description) {
            request = request.with_description(&description);
        }
        Ok(request)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order_id: OrderId,
    pub remote_order_handle: String,
    /// Amount in paise, as the gateway's checkout widget expects.
    pub amount: Paise,
    pub currency: String,
    pub public_key: String,
}

impl From<CheckoutOrder> for CreateOrderResponse {
    fn from(order: CheckoutOrder) -> Self {
        Self {
            success: true,
            order_id: order.order_id,
            remote_order_handle: order.razorpay_order_id,
            amount: order.amount,
            currency: order.currency,
            public_key: order.public_key,
        }
    }
}

//--------------------------------------      POST /payment/verify      -------------------------------------------------
/// The field names the gateway's checkout widget hands back are accepted as aliases, so that a frontend can forward
/// them untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    #[serde(default, alias = "razorpay_order_id")]
    pub remote_order_handle: String,
    #[serde(default, alias = "razorpay_payment_id")]
    pub remote_payment_handle: String,
    #[serde(default, alias = "razorpay_signature")]
    pub signature: String,
    #[serde(default)]
    pub order_id: String,
}

impl From<VerifyPaymentRequest> for PaymentVerification {
    fn from(req: VerifyPaymentRequest) -> Self {
        PaymentVerification::new(
            OrderId::from(req.order_id),
            &req.remote_order_handle,
            &req.remote_payment_handle,
            &req.signature,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub message: String,
    pub payment_id: String,
}

impl From<VerifiedPayment> for VerifyPaymentResponse {
    fn from(verified: VerifiedPayment) -> Self {
        let message = if verified.newly_recorded {
            "Payment verified successfully"
        } else {
            "Payment was already verified"
        };
        Self { success: true, message: message.to_string(), payment_id: verified.razorpay_payment_id }
    }
}

//--------------------------------------   GET /payment/order/{order_id}  -----------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusResponse {
    pub success: bool,
    pub order: Order,
    pub payments: Vec<Payment>,
}

impl From<OrderWithPayments> for OrderStatusResponse {
    fn from(value: OrderWithPayments) -> Self {
        Self { success: true, order: value.order, payments: value.payments }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: Order,
}
