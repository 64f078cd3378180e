use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use common_http_errors::ApiError;
use common_money::Amount;

use crate::store::{Debtor, LedgerEntry, LedgerStore, NewLedgerEntry, StoreError};

pub const ENTRY_STATUS_PAID: &str = "Paid";
pub const DEFAULT_PAYMENT_METHOD: &str = "Cash";

#[derive(Debug, Clone)]
pub struct PaymentInput {
    pub customer_id: Uuid,
    pub amount: Amount,
    pub method: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentOutcome {
    pub debtor: Debtor,
    pub payment: LedgerEntry,
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("unknown debtor {0}")]
    UnknownDebtor(Uuid),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<TransferError> for ApiError {
    fn from(value: TransferError) -> Self {
        match value {
            TransferError::UnknownDebtor(_) => {
                ApiError::not_found("customer_not_found", "Customer not found.")
            }
            TransferError::Store(err) => ApiError::internal(err),
        }
    }
}

/// Moves a payment onto a debtor's balance and writes the matching log
/// entry as one unit. Either both land or neither does. Submitting the
/// same input twice records two payments; duplicate suppression is the
/// caller's job.
pub async fn record_payment(
    store: &dyn LedgerStore,
    input: PaymentInput,
) -> Result<PaymentOutcome, TransferError> {
    let PaymentInput {
        customer_id,
        amount,
        method,
        date,
        reference,
        notes,
    } = input;

    let mut tx = store.begin().await?;

    let Some(debtor) = tx.debtor_for_update(customer_id).await? else {
        tx.rollback().await?;
        warn!(customer_id = %customer_id, "payment for unknown debtor");
        return Err(TransferError::UnknownDebtor(customer_id));
    };

    let amount = amount.into_inner();
    let updated = tx.apply_payment(debtor.id, &amount).await?;

    let entry = NewLedgerEntry {
        business_id: debtor.business_id,
        name: debtor.name,
        date: date.unwrap_or_else(Utc::now),
        amount: amount.clone(),
        status: ENTRY_STATUS_PAID.to_string(),
        payment_method: sanitize(method).unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string()),
        notes: compose_notes(reference.as_deref(), notes.as_deref()),
    };
    let payment = tx.insert_entry(entry).await?;

    tx.commit().await?;
    info!(customer_id = %updated.id, amount = %amount, "recorded debtor payment");

    Ok(PaymentOutcome {
        debtor: updated,
        payment,
    })
}

fn sanitize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn compose_notes(reference: Option<&str>, notes: Option<&str>) -> String {
    let mut parts = vec!["Payment received".to_string()];
    if let Some(reference) = reference.map(str::trim).filter(|v| !v.is_empty()) {
        parts.push(format!("Ref: {reference}"));
    }
    if let Some(notes) = notes.map(str::trim).filter(|v| !v.is_empty()) {
        parts.push(notes.to_string());
    }
    parts.join(". ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryLedgerStore;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    fn amount(value: &str) -> Amount {
        Amount::new(dec(value)).unwrap()
    }

    fn payment(customer_id: Uuid, value: &str) -> PaymentInput {
        PaymentInput {
            customer_id,
            amount: amount(value),
            method: None,
            date: None,
            reference: None,
            notes: None,
        }
    }

    async fn seeded_store(balance: &str, paid: &str) -> (MemoryLedgerStore, Debtor) {
        let store = MemoryLedgerStore::new();
        let debtor = Debtor {
            id: Uuid::new_v4(),
            business_id: Some(Uuid::new_v4()),
            name: "Kisumu Fuels Ltd".to_string(),
            amount: dec(balance),
            paid_amount: dec(paid),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        store.insert_debtor(debtor.clone()).await;
        (store, debtor)
    }

    #[tokio::test]
    async fn applies_balance_and_writes_log() {
        let (store, debtor) = seeded_store("500.00", "0.00").await;

        let outcome = record_payment(&store, payment(debtor.id, "200.00"))
            .await
            .unwrap();

        assert_eq!(outcome.debtor.amount, dec("300.00"));
        assert_eq!(outcome.debtor.paid_amount, dec("200.00"));
        assert_eq!(outcome.payment.status, "Paid");
        assert_eq!(outcome.payment.payment_method, "Cash");
        assert_eq!(outcome.payment.notes, "Payment received");
        assert_eq!(outcome.payment.name, debtor.name);
        assert_eq!(outcome.payment.business_id, debtor.business_id);

        let stored = store.debtor(debtor.id).await.unwrap();
        assert_eq!(stored.amount, dec("300.00"));
        assert_eq!(store.entries().await.len(), 1);
    }

    #[tokio::test]
    async fn passes_through_method_reference_and_notes() {
        let (store, debtor) = seeded_store("500.00", "0.00").await;
        let when = Utc::now() - chrono::Duration::days(3);

        let input = PaymentInput {
            customer_id: debtor.id,
            amount: amount("150.75"),
            method: Some("Mpesa".to_string()),
            date: Some(when),
            reference: Some("R-1001".to_string()),
            notes: Some("Monthly settlement".to_string()),
        };
        let outcome = record_payment(&store, input).await.unwrap();

        assert_eq!(outcome.payment.payment_method, "Mpesa");
        assert_eq!(outcome.payment.date, when);
        assert_eq!(
            outcome.payment.notes,
            "Payment received. Ref: R-1001. Monthly settlement"
        );
    }

    #[tokio::test]
    async fn blank_method_falls_back_to_cash() {
        let (store, debtor) = seeded_store("500.00", "0.00").await;

        let mut input = payment(debtor.id, "10.00");
        input.method = Some("   ".to_string());
        let outcome = record_payment(&store, input).await.unwrap();

        assert_eq!(outcome.payment.payment_method, "Cash");
    }

    #[tokio::test]
    async fn unknown_debtor_changes_nothing() {
        let (store, debtor) = seeded_store("500.00", "0.00").await;

        let err = record_payment(&store, payment(Uuid::new_v4(), "200.00"))
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::UnknownDebtor(_)));
        let stored = store.debtor(debtor.id).await.unwrap();
        assert_eq!(stored.amount, dec("500.00"));
        assert!(store.entries().await.is_empty());
    }

    #[tokio::test]
    async fn entry_failure_rolls_back_balance() {
        let (store, debtor) = seeded_store("500.00", "0.00").await;
        store.fail_next_entry_insert();

        let err = record_payment(&store, payment(debtor.id, "200.00"))
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::Store(_)));
        let stored = store.debtor(debtor.id).await.unwrap();
        assert_eq!(stored.amount, dec("500.00"));
        assert_eq!(stored.paid_amount, dec("0.00"));
        assert!(store.entries().await.is_empty());
    }

    #[tokio::test]
    async fn repeat_payments_stack() {
        let (store, debtor) = seeded_store("500.00", "0.00").await;

        record_payment(&store, payment(debtor.id, "100.00"))
            .await
            .unwrap();
        record_payment(&store, payment(debtor.id, "100.00"))
            .await
            .unwrap();

        let stored = store.debtor(debtor.id).await.unwrap();
        assert_eq!(stored.amount, dec("300.00"));
        assert_eq!(stored.paid_amount, dec("200.00"));
        assert_eq!(store.entries().await.len(), 2);
    }

    #[test]
    fn notes_embed_reference_and_free_text() {
        assert_eq!(compose_notes(None, None), "Payment received");
        assert_eq!(compose_notes(Some("R-7"), None), "Payment received. Ref: R-7");
        assert_eq!(compose_notes(None, Some("July")), "Payment received. July");
        assert_eq!(
            compose_notes(Some(" R-7 "), Some(" July ")),
            "Payment received. Ref: R-7. July"
        );
        assert_eq!(compose_notes(Some(""), Some("  ")), "Payment received");
    }
}
