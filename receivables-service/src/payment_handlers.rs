use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use common_auth::{ensure_role, AuthContext};
use common_http_errors::{ApiError, ApiResult, ApiSuccess};
use common_money::AmountInput;

use crate::transfer::{record_payment, PaymentInput, PaymentOutcome};
use crate::{AppState, PAYMENT_ROLES};

/// Body of `POST /payments`. Everything except `customerId` and `amount`
/// is optional; field presence is checked here rather than by the JSON
/// layer so the caller gets one consistent message.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub customer_id: Option<String>,
    pub amount: Option<AmountInput>,
    pub method: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

pub async fn create_payment(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<CreatePaymentRequest>,
) -> ApiResult<(StatusCode, Json<ApiSuccess<PaymentOutcome>>)> {
    ensure_role(&auth, PAYMENT_ROLES)?;

    let raw_customer = payload
        .customer_id
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let (raw_customer, raw_amount) = match (raw_customer, payload.amount) {
        (Some(customer), Some(amount)) => (customer, amount),
        _ => {
            return Err(ApiError::bad_request(
                "missing_fields",
                "customerId and amount are required.",
            ))
        }
    };

    let customer_id = Uuid::parse_str(raw_customer).map_err(|_| {
        ApiError::bad_request("invalid_customer_id", "customerId must be a valid id.")
    })?;
    let amount = raw_amount
        .into_amount()
        .map_err(|err| ApiError::bad_request("invalid_amount", err.to_string()))?;

    let outcome = record_payment(
        state.ledger.as_ref(),
        PaymentInput {
            customer_id,
            amount,
            method: payload.method,
            date: payload.date,
            reference: payload.reference,
            notes: payload.notes,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(ApiSuccess::new(outcome))))
}
