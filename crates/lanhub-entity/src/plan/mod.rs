//! Fixed reservation plans and payment methods.

pub mod model;
pub mod payment;

pub use model::{CURRENCY, PLANS, Plan, duration_text, plan_for};
pub use payment::PaymentMethod;
