use crate::error::StoreError;
use crate::store::TimeSeriesStore;
use parking_lot::RwLock;
use std::sync::Arc;

/// A shared, swappable reference to the current store.
///
/// Readers take a cheap `Arc` clone and keep a consistent view for as long as
/// they hold it; a reload builds a complete new store off to the side and
/// swaps the pointer. The store itself is never mutated in place.
#[derive(Debug, Clone, Default)]
pub struct StoreHandle {
    current: Arc<RwLock<Option<Arc<TimeSeriesStore>>>>,
}

impl StoreHandle {
    /// A handle with no store yet; reads fail with `StoreError::NotLoaded`.
    pub fn unloaded() -> Self {
        Self::default()
    }

    pub fn new(store: TimeSeriesStore) -> Self {
        let handle = Self::unloaded();
        handle.replace(store);
        handle
    }

    /// The store as of now.
    pub fn current(&self) -> Result<Arc<TimeSeriesStore>, StoreError> {
        self.current.read().clone().ok_or(StoreError::NotLoaded)
    }

    /// Installs a new store, returning the one it replaced.
    pub fn replace(&self, store: TimeSeriesStore) -> Option<Arc<TimeSeriesStore>> {
        let store = Arc::new(store);
        tracing::info!(
            symbols = store.symbol_count(),
            bars = store.bar_count(),
            "market data store installed"
        );
        self.current.write().replace(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{DailyBar, Symbol};

    fn store_with_close(close: f64) -> TimeSeriesStore {
        TimeSeriesStore::build(
            [Symbol { symbol: "S".into(), name: "S".into(), description: None }],
            [DailyBar {
                symbol: "S".into(),
                date: "2020-01-02".parse().unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: None,
            }],
        )
    }

    #[test]
    fn unloaded_handle_reports_not_loaded() {
        let handle = StoreHandle::unloaded();
        assert!(matches!(handle.current(), Err(StoreError::NotLoaded)));
    }

    #[test]
    fn readers_keep_their_view_across_a_swap() {
        let handle = StoreHandle::new(store_with_close(1.0));
        let before = handle.current().unwrap();

        let previous = handle.replace(store_with_close(2.0)).unwrap();
        let after = handle.current().unwrap();

        let day = "2020-01-02".parse().unwrap();
        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!(before.bar("S", day).unwrap().close, 1.0);
        assert_eq!(after.bar("S", day).unwrap().close, 2.0);
    }

    #[test]
    fn clones_share_the_same_slot() {
        let handle = StoreHandle::unloaded();
        let reader = handle.clone();
        handle.replace(store_with_close(3.0));
        assert_eq!(reader.current().unwrap().bar_count(), 1);
    }
}
