//! Outbound mail composition. Delivery transport is an operational concern
//! handled outside this service; the default transport renders the message
//! into the structured log stream. Every call site treats sending as
//! best-effort and must never fail a request on a mail error.

use rust_decimal::Decimal;

use crate::error::AppResult;

pub struct Mail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

pub fn send(mail: Mail) -> AppResult<()> {
    tracing::info!(
        to = %mail.to,
        subject = %mail.subject,
        body = %mail.body,
        "outbound email"
    );
    Ok(())
}

pub fn order_confirmation(
    to: &str,
    order_id: uuid::Uuid,
    total: Decimal,
    shipping_address: &str,
    payment_method: &str,
) -> Mail {
    Mail {
        to: to.to_string(),
        subject: format!("Order Confirmation #{order_id}"),
        body: format!(
            "Thank you for your order! Total: ${total}\nShipping to: {shipping_address}\nPayment Method: {payment_method}"
        ),
    }
}

pub fn activation(to: &str, site_domain: &str, uidb64: &str, token: &str) -> Mail {
    Mail {
        to: to.to_string(),
        subject: "Activate your account".to_string(),
        body: format!(
            "Welcome! Confirm your email to activate your account:\nhttp://{site_domain}/api/auth/activate/{uidb64}/{token}"
        ),
    }
}

pub fn password_reset(to: &str, site_domain: &str, uidb64: &str, token: &str) -> Mail {
    Mail {
        to: to.to_string(),
        subject: "Password Reset Request".to_string(),
        body: format!(
            "A password reset was requested for your account. Reset it here:\nhttp://{site_domain}/api/auth/password-reset/confirm?uid={uidb64}&token={token}"
        ),
    }
}

pub fn welcome(to: &str) -> Mail {
    Mail {
        to: to.to_string(),
        subject: "Welcome to Our Site!".to_string(),
        body: "Welcome to our site! We're glad to have you.".to_string(),
    }
}
