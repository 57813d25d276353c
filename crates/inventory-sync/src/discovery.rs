//! Sibling discovery.
//!
//! Pages through the backend's prefix search and keeps only the variants
//! whose own SKU derives the requested group.

use std::time::Duration;

use log::debug;

use crate::client::InventoryClient;
use crate::errors::ClientError;
use crate::models::VariantRecord;
use crate::sku::GroupKey;

/// Variants requested per search page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Pause between two consecutive search pages.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(200);

/// Enumerate every variant of `group`, in backend order.
///
/// The backend search is a prefix match, so each record is re-validated and
/// variants of other groups (for example `BXAAA-160-1` when looking for
/// `BXAAA`) are dropped. All pages are consumed before returning.
pub async fn find_siblings(
    client: &dyn InventoryClient,
    group: &GroupKey,
    page_size: u32,
    page_delay: Duration,
) -> Result<Vec<VariantRecord>, ClientError> {
    let mut siblings = Vec::new();
    let mut cursor: Option<String> = None;
    let mut page = 0usize;

    loop {
        let result = client
            .search_by_group_prefix(group, page_size, cursor.as_deref())
            .await?;
        page += 1;

        let returned = result.records.len();
        let before = siblings.len();
        siblings.extend(
            result
                .records
                .into_iter()
                .filter(|record| record.sku.as_deref().is_some_and(|sku| group.contains(sku))),
        );
        debug!(
            "[Discovery] {}: page {} returned {} variants, {} in group",
            group,
            page,
            returned,
            siblings.len() - before
        );

        // A page that claims more results without a cursor would loop forever.
        match (result.has_next_page, result.next_cursor) {
            (true, Some(next)) => cursor = Some(next),
            _ => break,
        }

        tokio::time::sleep(page_delay).await;
    }

    Ok(siblings)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::models::{InventoryLevel, VariantPage, WriteOutcome};
    use crate::testing::InMemoryInventory;

    /// Backend whose every search page claims more results but has no cursor.
    #[derive(Default)]
    struct CursorlessBackend {
        searches: AtomicUsize,
    }

    #[async_trait]
    impl InventoryClient for CursorlessBackend {
        async fn search_by_group_prefix(
            &self,
            _group: &GroupKey,
            _page_size: u32,
            _cursor: Option<&str>,
        ) -> Result<VariantPage, ClientError> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            Ok(VariantPage {
                records: vec![VariantRecord::new("v1", "BXAAA-1", "i1")],
                has_next_page: true,
                next_cursor: None,
            })
        }

        async fn read_quantity(&self, _: &str) -> Result<Option<InventoryLevel>, ClientError> {
            Ok(None)
        }

        async fn write_quantity(&self, _: &str, _: &str, _: i64) -> Result<WriteOutcome, ClientError> {
            Ok(WriteOutcome::Applied)
        }

        async fn resolve_inventory_item_id(&self, _: &str) -> Result<Option<String>, ClientError> {
            Ok(None)
        }

        async fn find_variant_by_sku(&self, _: &str) -> Result<Option<VariantRecord>, ClientError> {
            Ok(None)
        }
    }

    fn group(sku: &str) -> GroupKey {
        GroupKey::derive(sku).unwrap()
    }

    #[tokio::test]
    async fn test_finds_all_group_members() {
        let backend = Arc::new(InMemoryInventory::new());
        backend.add_variant("v1", "BXAAA-1", "i1", 5, "loc");
        backend.add_variant("v2", "BXAAA-2", "i2", 5, "loc");
        backend.add_variant("v3", "BXAAD-1", "i3", 5, "loc");

        let siblings = find_siblings(backend.as_ref(), &group("BXAAA-1"), 100, Duration::ZERO)
            .await
            .unwrap();

        let skus: Vec<_> = siblings.iter().map(|s| s.sku_or_empty()).collect();
        assert_eq!(skus, vec!["BXAAA-1", "BXAAA-2"]);
    }

    #[tokio::test]
    async fn test_drops_prefix_false_positives() {
        let backend = Arc::new(InMemoryInventory::new());
        backend.add_variant("v1", "BXAAA-1", "i1", 5, "loc");
        backend.add_variant("v2", "BXAAAB-1", "i2", 5, "loc");
        backend.add_variant("v3", "BXAAA-160-1", "i3", 5, "loc");
        backend.add_variant("v4", "BXAAA-X", "i4", 5, "loc");

        let siblings = find_siblings(backend.as_ref(), &group("BXAAA-1"), 100, Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(siblings.len(), 1);
        assert_eq!(siblings[0].inventory_item_id, "i1");
    }

    #[tokio::test]
    async fn test_consumes_every_page() {
        let backend = Arc::new(InMemoryInventory::new());
        for n in 1..=25 {
            backend.add_variant(
                &format!("v{}", n),
                &format!("BXAAA-{}", n),
                &format!("i{}", n),
                5,
                "loc",
            );
        }

        let siblings = find_siblings(backend.as_ref(), &group("BXAAA-1"), 10, Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(siblings.len(), 25);
        assert_eq!(backend.search_calls(), 3);
        assert_eq!(siblings[24].sku_or_empty(), "BXAAA-25");
    }

    #[tokio::test]
    async fn test_missing_cursor_ends_pagination() {
        let backend = CursorlessBackend::default();

        let siblings = find_siblings(&backend, &group("BXAAA-1"), 100, Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(siblings, vec![VariantRecord::new("v1", "BXAAA-1", "i1")]);
        assert_eq!(backend.searches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_group() {
        let backend = Arc::new(InMemoryInventory::new());
        let siblings = find_siblings(backend.as_ref(), &group("BXAAA-1"), 100, Duration::ZERO)
            .await
            .unwrap();
        assert!(siblings.is_empty());
        assert_eq!(backend.search_calls(), 1);
    }

    #[tokio::test]
    async fn test_search_error_is_returned() {
        let backend = Arc::new(InMemoryInventory::new());
        backend.fail_searches(ClientError::api(503, "unavailable"));

        let error = find_siblings(backend.as_ref(), &group("BXAAA-1"), 100, Duration::ZERO)
            .await
            .unwrap_err();
        assert_eq!(error, ClientError::api(503, "unavailable"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_paces_between_pages_only() {
        let backend = Arc::new(InMemoryInventory::new());
        for n in 1..=3 {
            backend.add_variant(
                &format!("v{}", n),
                &format!("BXAAA-{}", n),
                &format!("i{}", n),
                1,
                "loc",
            );
        }

        let start = tokio::time::Instant::now();
        find_siblings(backend.as_ref(), &group("BXAAA-1"), 1, DEFAULT_PAGE_DELAY)
            .await
            .unwrap();

        // Three pages, two pauses.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(400));
        assert!(elapsed < Duration::from_millis(600));
    }
}
