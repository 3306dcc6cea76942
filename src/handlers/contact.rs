use axum::{Json, extract::State};
use serde::Serialize;

use crate::service::contact::{ContactMessage, Delivery};
use crate::{BiolinkError, router::BiolinkState};

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: &'static str,
}

/// POST /api/contact
pub async fn submit_contact(
    State(state): State<BiolinkState>,
    Json(msg): Json<ContactMessage>,
) -> Result<Json<ContactResponse>, BiolinkError> {
    msg.validate()?;
    let message = match state.mailer.deliver(&msg).await {
        Delivery::Sent => "Message sent successfully!",
        Delivery::Logged => "Message received!",
    };
    Ok(Json(ContactResponse {
        success: true,
        message,
    }))
}
