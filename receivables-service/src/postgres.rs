use async_trait::async_trait;
use bigdecimal::BigDecimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::store::{Debtor, LedgerEntry, LedgerStore, LedgerTx, NewLedgerEntry, StoreError};

/// Ledger store backed by Postgres. Both writes of a transfer ride one
/// `sqlx` transaction; returning early drops it, which rolls it back.
#[derive(Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgLedgerTx { tx }))
    }
}

struct PgLedgerTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerTx for PgLedgerTx {
    async fn debtor_for_update(&mut self, id: Uuid) -> Result<Option<Debtor>, StoreError> {
        let debtor = sqlx::query_as::<_, Debtor>(
            "SELECT id, business_id, name, amount, paid_amount, created_at, updated_at
             FROM debtors
             WHERE id = $1
             FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(debtor)
    }

    async fn apply_payment(
        &mut self,
        id: Uuid,
        amount: &BigDecimal,
    ) -> Result<Debtor, StoreError> {
        let debtor = sqlx::query_as::<_, Debtor>(
            "UPDATE debtors
             SET amount = amount - $2,
                 paid_amount = paid_amount + $2,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING id, business_id, name, amount, paid_amount, created_at, updated_at",
        )
        .bind(id)
        .bind(amount)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(debtor)
    }

    async fn insert_entry(&mut self, entry: NewLedgerEntry) -> Result<LedgerEntry, StoreError> {
        let row = sqlx::query_as::<_, LedgerEntry>(
            "INSERT INTO transactions (id, business_id, name, date, amount, status, payment_method, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id, business_id, name, date, amount, status, payment_method, notes, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(entry.business_id)
        .bind(&entry.name)
        .bind(entry.date)
        .bind(&entry.amount)
        .bind(&entry.status)
        .bind(&entry.payment_method)
        .bind(&entry.notes)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
