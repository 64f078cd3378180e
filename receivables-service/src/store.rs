use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// A customer carrying a balance. `amount` is what they still owe,
/// `paid_amount` the running total they have settled.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Debtor {
    pub id: Uuid,
    pub business_id: Option<Uuid>,
    pub name: String,
    pub amount: BigDecimal,
    pub paid_amount: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of the transaction log. Entries are written once and never
/// updated afterwards.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: Uuid,
    pub business_id: Option<Uuid>,
    pub name: String,
    pub date: DateTime<Utc>,
    pub amount: BigDecimal,
    pub status: String,
    pub payment_method: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub business_id: Option<Uuid>,
    pub name: String,
    pub date: DateTime<Utc>,
    pub amount: BigDecimal,
    pub status: String,
    pub payment_method: String,
    pub notes: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store failure: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(value: sqlx::Error) -> Self {
        Self::Backend(value.to_string())
    }
}

/// Opens transactions over the ledger. Everything done through the
/// returned [`LedgerTx`] becomes visible to other callers only on
/// `commit`; dropping the transaction without committing discards it.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, StoreError>;
}

#[async_trait]
pub trait LedgerTx: Send {
    /// Fetches the debtor and claims it for the rest of the transaction,
    /// so concurrent transfers against the same debtor serialize.
    async fn debtor_for_update(&mut self, id: Uuid) -> Result<Option<Debtor>, StoreError>;

    /// Moves `amount` from the outstanding balance to the paid total and
    /// touches `updated_at`. The debtor must already be claimed.
    async fn apply_payment(&mut self, id: Uuid, amount: &BigDecimal)
        -> Result<Debtor, StoreError>;

    async fn insert_entry(&mut self, entry: NewLedgerEntry) -> Result<LedgerEntry, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
