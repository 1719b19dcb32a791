//! Checkout: delivery address, payment choice, pricing and the outcome type.
//!
//! The order flow itself lives on [`crate::Storefront::checkout`]; this module
//! holds the pieces it is assembled from.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::domain::value_objects::{field_error, require_digits, require_text, Money};
use crate::FieldErrors;

/// Orders at or above this subtotal ship free.
pub const FREE_DELIVERY_THRESHOLD: Money = Money::new(999);
pub const DELIVERY_CHARGE: Money = Money::new(99);

pub const INDIAN_STATES: &[&str] = &[
    "Andhra Pradesh", "Arunachal Pradesh", "Assam", "Bihar", "Chhattisgarh",
    "Goa", "Gujarat", "Haryana", "Himachal Pradesh", "Jharkhand", "Karnataka",
    "Kerala", "Madhya Pradesh", "Maharashtra", "Manipur", "Meghalaya", "Mizoram",
    "Nagaland", "Odisha", "Punjab", "Rajasthan", "Sikkim", "Tamil Nadu",
    "Telangana", "Tripura", "Uttar Pradesh", "Uttarakhand", "West Bengal",
    "Delhi", "Jammu & Kashmir", "Ladakh",
];

pub fn delivery_charge(subtotal: Money) -> Money {
    if subtotal >= FREE_DELIVERY_THRESHOLD { Money::ZERO } else { DELIVERY_CHARGE }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSummary {
    pub subtotal: Money,
    pub delivery_charge: Money,
    pub grand_total: Money,
}

impl PriceSummary {
    pub fn for_subtotal(subtotal: Money) -> Self {
        let delivery_charge = delivery_charge(subtotal);
        Self { subtotal, delivery_charge, grand_total: subtotal + delivery_charge }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Card/UPI through the payment gateway. Simulated with a delay.
    #[default]
    #[serde(alias = "razorpay")]
    Online,
    #[serde(alias = "cod")]
    CashOnDelivery,
}

impl PaymentMethod {
    /// Label stored with the order and sent to the remote service.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Online => "Razorpay",
            Self::CashOnDelivery => "Cash on Delivery",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AddressForm {
    #[validate(custom = "name_required")]
    pub name: String,
    #[validate(custom = "phone_valid")]
    pub phone: String,
    #[validate(custom = "address_required")]
    pub address1: String,
    #[serde(default)]
    pub address2: String,
    #[validate(custom = "city_required")]
    pub city: String,
    #[validate(custom = "state_known")]
    pub state: String,
    #[validate(custom = "pincode_valid")]
    pub pincode: String,
}

impl AddressForm {
    pub fn check(&self) -> Result<(), FieldErrors> { self.validate().map_err(FieldErrors::from) }

    /// One-line summary sent to the remote service, e.g.
    /// `Rahul Sharma, 9876543210, 12 MG Road, Mumbai, Maharashtra - 400001`.
    pub fn summary(&self) -> String {
        let mut line = format!("{}, {}, {}", self.name, self.phone, self.address1);
        if !self.address2.is_empty() {
            line.push_str(", ");
            line.push_str(&self.address2);
        }
        line.push_str(&format!(", {}, {} - {}", self.city, self.state, self.pincode));
        line
    }
}

fn name_required(value: &str) -> Result<(), ValidationError> { require_text(value, "Name is required") }
fn phone_valid(value: &str) -> Result<(), ValidationError> { require_digits(value, 10, "Valid 10-digit phone required") }
fn address_required(value: &str) -> Result<(), ValidationError> { require_text(value, "Address is required") }
fn city_required(value: &str) -> Result<(), ValidationError> { require_text(value, "City is required") }
fn pincode_valid(value: &str) -> Result<(), ValidationError> { require_digits(value, 6, "Valid 6-digit pincode required") }

fn state_known(value: &str) -> Result<(), ValidationError> {
    if INDIAN_STATES.contains(&value) { Ok(()) } else { Err(field_error("state", "State is required")) }
}

/// Client-side order id used when the remote service does not assign one.
pub fn fallback_order_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("ZTK{}{}", Utc::now().timestamp_millis(), &suffix[..4].to_uppercase())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum LocalReason {
    /// No remote service or identity configured.
    NoRemoteIdentity,
    /// The remote call was attempted and failed; carries the error text.
    RemoteFailed(String),
}

/// Where an order ended up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Recording {
    Remote,
    LocalOnly { reason: LocalReason },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOutcome {
    pub order_id: String,
    pub total_amount: Money,
    pub recording: Recording,
}

impl CheckoutOutcome {
    pub fn recorded_remotely(&self) -> bool { matches!(self.recording, Recording::Remote) }
}
