//! # Integration Test Flows
//!
//! Tests that the receipt lookup, issuance, draw, and invalidation engines
//! work together correctly through the `RaffleApi` surface.
//!
//! ## Flows Tested
//!
//! 1. **Receipt lookup → issuance**: a receipt fetched from the external
//!    source feeds an issuance request end to end
//! 2. **Transactional issuance**: a mid-transaction storage failure rolls
//!    the whole batch back, and a later retry still issues the full quota
//! 3. **Draw vs. invalidation race**: every entry leaves `Active` at most
//!    once, whichever operation gets there first

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use raffle_core::{
        Client, EntryId, EntryLookup, EntryQuery, EntryRepository, EntryStatus, EntryTransaction,
        EntryUpdate, InMemoryClientDirectory, InMemoryEntryRepository, IssueRequest, NewEntry,
        RaffleApi, RaffleConfig, RaffleEntry, RaffleError, RaffleService, Receipt, ReceiptQuery,
        ReceiptRow, TabularReceiptSource,
    };

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    fn receipt_fixtures() -> Vec<ReceiptRow> {
        vec![ReceiptRow {
            number: 4242,
            series: 1,
            receipt: Receipt {
                branch_code: 7,
                tax_id: "123.456.789-01".to_string(),
                receipt_key: "NFE-7-4242".to_string(),
                total_value_cents: 17_500,
            },
        }]
    }

    fn client_fixtures() -> InMemoryClientDirectory {
        InMemoryClientDirectory::with_clients(&[Client {
            id: 10,
            tax_id: "12345678901".to_string(),
        }])
    }

    /// Repository wrapper whose transactions fail after a set number of
    /// writes, to exercise the rollback path.
    #[derive(Clone)]
    struct FlakyRepository {
        inner: InMemoryEntryRepository,
        writes_left: Arc<AtomicU32>,
    }

    impl FlakyRepository {
        fn failing_after(inner: InMemoryEntryRepository, writes: u32) -> Self {
            Self {
                inner,
                writes_left: Arc::new(AtomicU32::new(writes)),
            }
        }
    }

    #[async_trait]
    impl EntryRepository for FlakyRepository {
        async fn find_many(&self, query: &EntryQuery) -> Result<Vec<RaffleEntry>, RaffleError> {
            self.inner.find_many(query).await
        }

        async fn count(&self, query: &EntryQuery) -> Result<u64, RaffleError> {
            self.inner.count(query).await
        }

        async fn update_many(
            &self,
            query: &EntryQuery,
            change: EntryUpdate,
        ) -> Result<u64, RaffleError> {
            self.inner.update_many(query, change).await
        }

        async fn begin(&self) -> Result<Box<dyn EntryTransaction>, RaffleError> {
            Ok(Box::new(FlakyTransaction {
                inner: self.inner.begin().await?,
                writes_left: Arc::clone(&self.writes_left),
            }))
        }
    }

    struct FlakyTransaction {
        inner: Box<dyn EntryTransaction>,
        writes_left: Arc<AtomicU32>,
    }

    impl FlakyTransaction {
        fn consume_write(&self) -> Result<(), RaffleError> {
            let left = self.writes_left.load(Ordering::SeqCst);
            if left == 0 {
                return Err(RaffleError::Storage("simulated storage outage".into()));
            }
            self.writes_left.store(left - 1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[async_trait]
    impl EntryTransaction for FlakyTransaction {
        async fn create(&mut self, entry: NewEntry) -> Result<RaffleEntry, RaffleError> {
            self.consume_write()?;
            self.inner.create(entry).await
        }

        async fn update(
            &mut self,
            id: EntryId,
            change: EntryUpdate,
        ) -> Result<RaffleEntry, RaffleError> {
            self.consume_write()?;
            self.inner.update(id, change).await
        }

        async fn commit(self: Box<Self>) -> Result<(), RaffleError> {
            self.inner.commit().await
        }

        async fn rollback(self: Box<Self>) -> Result<(), RaffleError> {
            self.inner.rollback().await
        }
    }

    // =========================================================================
    // INTEGRATION TESTS: RECEIPT LOOKUP → ISSUANCE → DRAW → INVALIDATION
    // =========================================================================

    /// A receipt fetched by number and series drives the full lifecycle.
    #[tokio::test]
    async fn test_receipt_lookup_feeds_full_lifecycle() {
        let repository = InMemoryEntryRepository::new();
        let service = RaffleService::new(
            repository.clone(),
            client_fixtures(),
            TabularReceiptSource::new(receipt_fixtures(), 2),
            RaffleConfig::default(),
        );

        // Lookup: tax id comes back normalized, ready for issuance.
        let receipts = service
            .lookup_receipt(ReceiptQuery::by_number_and_series(4242, 1))
            .await
            .unwrap();
        assert_eq!(receipts.len(), 1);
        let receipt = &receipts[0];
        assert_eq!(receipt.tax_id, "12345678901");

        // Issue straight from the looked-up receipt: R$ 175.00 -> 3 entries.
        let issued = service
            .issue(IssueRequest {
                receipt_key: receipt.receipt_key.clone(),
                branch_code: receipt.branch_code,
                tax_id: receipt.tax_id.clone(),
                total_value_cents: receipt.total_value_cents,
            })
            .await
            .unwrap();
        assert_eq!(issued.len(), 3);

        // The client sees their entries.
        let mine = service
            .find_entries(EntryLookup {
                client_tax_id: Some("12345678901".to_string()),
                ..EntryLookup::default()
            })
            .await
            .unwrap();
        assert_eq!(mine.len(), 3);

        // Draw one winner, sweep the rest.
        let winner = service.draw(7).await.unwrap();
        assert_eq!(winner.status, EntryStatus::Drawn);

        let swept = service.invalidate(7).await.unwrap();
        assert_eq!(swept, 2);

        // Nothing left to draw or sweep.
        assert!(matches!(
            service.draw(7).await,
            Err(RaffleError::NoActiveEntries { .. })
        ));
        assert!(matches!(
            service.invalidate(7).await,
            Err(RaffleError::NoActiveEntries { .. })
        ));
    }

    // =========================================================================
    // INTEGRATION TESTS: TRANSACTIONAL ISSUANCE
    // =========================================================================

    /// A storage failure halfway through the batch leaves no entries behind,
    /// and a retry issues the full quota.
    #[tokio::test]
    async fn test_mid_transaction_failure_rolls_back_whole_batch() {
        let store = InMemoryEntryRepository::new();
        // Quota 3 needs six writes (create + code assignment per entry);
        // allow three, so the outage hits mid-batch.
        let repository = FlakyRepository::failing_after(store.clone(), 3);
        let service = RaffleService::new(
            repository,
            client_fixtures(),
            TabularReceiptSource::new(receipt_fixtures(), 2),
            RaffleConfig::default(),
        );

        let request = IssueRequest {
            receipt_key: "NFE-7-4242".to_string(),
            branch_code: 7,
            tax_id: "12345678901".to_string(),
            total_value_cents: 17_500,
        };

        let result = service.issue(request.clone()).await;
        assert!(matches!(result, Err(RaffleError::Storage(_))));
        assert!(store.is_empty(), "rollback must leave no partial entries");

        // A healthy service over the same store can still issue the full
        // quota: the failed attempt consumed none of it.
        let healthy = RaffleService::new(
            store.clone(),
            client_fixtures(),
            TabularReceiptSource::new(receipt_fixtures(), 2),
            RaffleConfig::default(),
        );
        let issued = healthy.issue(request).await.unwrap();
        assert_eq!(issued.len(), 3);
        assert!(issued.iter().all(|e| e.raffle_number.is_some()));
    }

    // =========================================================================
    // INTEGRATION TESTS: DRAW VS. INVALIDATION RACE
    // =========================================================================

    /// Whatever the interleaving, each entry transitions out of `Active`
    /// exactly once and at most one entry ends up `Drawn`.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_draw_and_invalidation_race_is_single_transition() {
        for _ in 0..20 {
            let repository = InMemoryEntryRepository::new();
            let service = Arc::new(RaffleService::new(
                repository.clone(),
                client_fixtures(),
                TabularReceiptSource::new(receipt_fixtures(), 2),
                RaffleConfig::default(),
            ));

            service
                .issue(IssueRequest {
                    receipt_key: "NFE-7-4242".to_string(),
                    branch_code: 7,
                    tax_id: "12345678901".to_string(),
                    total_value_cents: 17_500,
                })
                .await
                .unwrap();

            let draw = {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.draw(7).await })
            };
            let sweep = {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.invalidate(7).await })
            };

            let draw = draw.await.unwrap();
            let sweep = sweep.await.unwrap();

            let drawn = repository
                .count(&EntryQuery {
                    status: Some(EntryStatus::Drawn),
                    ..EntryQuery::default()
                })
                .await
                .unwrap();
            let inactive = repository
                .count(&EntryQuery {
                    status: Some(EntryStatus::Inactive),
                    ..EntryQuery::default()
                })
                .await
                .unwrap();
            let active = repository
                .count(&EntryQuery::active_in_branch(7))
                .await
                .unwrap();

            // Every entry left Active through exactly one of the two paths.
            assert_eq!(drawn, draw.is_ok() as u64);
            assert_eq!(inactive, sweep.unwrap_or(0));
            assert_eq!(drawn + inactive, 3);
            assert_eq!(active, 0);
        }
    }
}
