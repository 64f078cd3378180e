use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::store::{Debtor, LedgerEntry, LedgerStore, LedgerTx, NewLedgerEntry, StoreError};

#[derive(Default, Clone)]
struct MemoryState {
    debtors: HashMap<Uuid, Debtor>,
    entries: Vec<LedgerEntry>,
}

/// Ledger store backed by process memory, used in tests and local
/// development. A transaction takes the store lock, mutates a copy of
/// the state, and swaps the copy in on commit, so readers never observe
/// half of a transfer.
#[derive(Clone, Default)]
pub struct MemoryLedgerStore {
    state: Arc<Mutex<MemoryState>>,
    fail_next_insert: Arc<AtomicBool>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_debtor(&self, debtor: Debtor) {
        self.state.lock().await.debtors.insert(debtor.id, debtor);
    }

    pub async fn debtor(&self, id: Uuid) -> Option<Debtor> {
        self.state.lock().await.debtors.get(&id).cloned()
    }

    pub async fn entries(&self) -> Vec<LedgerEntry> {
        self.state.lock().await.entries.clone()
    }

    /// Arms a one-shot failure for the next `insert_entry`, letting tests
    /// drive the rollback path.
    pub fn fail_next_entry_insert(&self) {
        self.fail_next_insert.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, StoreError> {
        let guard = self.state.clone().lock_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(MemoryLedgerTx {
            guard,
            working,
            fail_next_insert: self.fail_next_insert.clone(),
        }))
    }
}

struct MemoryLedgerTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    fail_next_insert: Arc<AtomicBool>,
}

#[async_trait]
impl LedgerTx for MemoryLedgerTx {
    async fn debtor_for_update(&mut self, id: Uuid) -> Result<Option<Debtor>, StoreError> {
        Ok(self.working.debtors.get(&id).cloned())
    }

    async fn apply_payment(
        &mut self,
        id: Uuid,
        amount: &BigDecimal,
    ) -> Result<Debtor, StoreError> {
        let debtor = self
            .working
            .debtors
            .get_mut(&id)
            .ok_or_else(|| StoreError::Backend("apply_payment on unknown debtor".into()))?;
        debtor.amount = &debtor.amount - amount;
        debtor.paid_amount = &debtor.paid_amount + amount;
        debtor.updated_at = Utc::now();
        Ok(debtor.clone())
    }

    async fn insert_entry(&mut self, entry: NewLedgerEntry) -> Result<LedgerEntry, StoreError> {
        if self.fail_next_insert.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Backend("entry insert failed by request".into()));
        }
        let row = LedgerEntry {
            id: Uuid::new_v4(),
            business_id: entry.business_id,
            name: entry.name,
            date: entry.date,
            amount: entry.amount,
            status: entry.status,
            payment_method: entry.payment_method,
            notes: entry.notes,
            created_at: Utc::now(),
        };
        self.working.entries.push(row.clone());
        Ok(row)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryLedgerTx {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    fn debtor(amount: &str, paid: &str) -> Debtor {
        Debtor {
            id: Uuid::new_v4(),
            business_id: Some(Uuid::new_v4()),
            name: "Wanjiku Hardware".to_string(),
            amount: dec(amount),
            paid_amount: dec(paid),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn entry_for(debtor: &Debtor, amount: &str) -> NewLedgerEntry {
        NewLedgerEntry {
            business_id: debtor.business_id,
            name: debtor.name.clone(),
            date: Utc::now(),
            amount: dec(amount),
            status: "Paid".to_string(),
            payment_method: "Cash".to_string(),
            notes: "Payment received".to_string(),
        }
    }

    #[tokio::test]
    async fn commit_publishes_changes() {
        let store = MemoryLedgerStore::new();
        let seeded = debtor("500.00", "0.00");
        let id = seeded.id;
        store.insert_debtor(seeded.clone()).await;

        let mut tx = store.begin().await.unwrap();
        let found = tx.debtor_for_update(id).await.unwrap().unwrap();
        assert_eq!(found.amount, dec("500.00"));
        tx.apply_payment(id, &dec("200.00")).await.unwrap();
        tx.insert_entry(entry_for(&seeded, "200.00")).await.unwrap();
        tx.commit().await.unwrap();

        let stored = store.debtor(id).await.unwrap();
        assert_eq!(stored.amount, dec("300.00"));
        assert_eq!(stored.paid_amount, dec("200.00"));
        assert_eq!(store.entries().await.len(), 1);
    }

    #[tokio::test]
    async fn rollback_discards_changes() {
        let store = MemoryLedgerStore::new();
        let seeded = debtor("500.00", "0.00");
        let id = seeded.id;
        store.insert_debtor(seeded.clone()).await;

        let mut tx = store.begin().await.unwrap();
        tx.apply_payment(id, &dec("200.00")).await.unwrap();
        tx.insert_entry(entry_for(&seeded, "200.00")).await.unwrap();
        tx.rollback().await.unwrap();

        let stored = store.debtor(id).await.unwrap();
        assert_eq!(stored.amount, dec("500.00"));
        assert_eq!(stored.paid_amount, dec("0.00"));
        assert!(store.entries().await.is_empty());
    }

    #[tokio::test]
    async fn dropping_a_transaction_discards_it() {
        let store = MemoryLedgerStore::new();
        let seeded = debtor("500.00", "0.00");
        let id = seeded.id;
        store.insert_debtor(seeded.clone()).await;

        {
            let mut tx = store.begin().await.unwrap();
            tx.apply_payment(id, &dec("200.00")).await.unwrap();
            // No commit.
        }

        let stored = store.debtor(id).await.unwrap();
        assert_eq!(stored.amount, dec("500.00"));
        assert!(store.entries().await.is_empty());
    }

    #[tokio::test]
    async fn forced_insert_failure_trips_once() {
        let store = MemoryLedgerStore::new();
        let seeded = debtor("100.00", "0.00");
        store.insert_debtor(seeded.clone()).await;
        store.fail_next_entry_insert();

        let mut tx = store.begin().await.unwrap();
        let err = tx
            .insert_entry(entry_for(&seeded, "50.00"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        drop(tx);

        let mut tx = store.begin().await.unwrap();
        tx.insert_entry(entry_for(&seeded, "50.00")).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(store.entries().await.len(), 1);
    }
}
