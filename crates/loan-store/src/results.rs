use std::fmt;

use crate::error::StoreResult;

/// One row of a rich-query result: the key and the raw stored bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryRecord {
    pub key: String,
    pub value: Vec<u8>,
}

impl QueryRecord {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

type RecordIter<'a> = Box<dyn Iterator<Item = StoreResult<QueryRecord>> + 'a>;
type ReleaseHook<'a> = Box<dyn FnOnce() + 'a>;

/// Lazy, finite, non-restartable stream of query records.
///
/// The backend attaches a release hook when it hands out a result set. The
/// hook runs exactly once: when the stream is exhausted, when [`close`] is
/// called, or when the value is dropped (which covers early returns and
/// errors raised mid-iteration).
///
/// [`close`]: QueryResults::close
pub struct QueryResults<'a> {
    records: Option<RecordIter<'a>>,
    release: Option<ReleaseHook<'a>>,
}

impl<'a> QueryResults<'a> {
    /// Wrap a record iterator.
    pub fn new(records: impl Iterator<Item = StoreResult<QueryRecord>> + 'a) -> Self {
        Self {
            records: Some(Box::new(records)),
            release: None,
        }
    }

    /// A result set with no records.
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    /// Attach the hook that frees backend resources held by this result set.
    pub fn on_release(mut self, hook: impl FnOnce() + 'a) -> Self {
        self.release = Some(Box::new(hook));
        self
    }

    /// Release the result set without draining it.
    pub fn close(mut self) {
        self.release_now();
    }

    /// Returns `true` once the backend resources have been released.
    pub fn is_released(&self) -> bool {
        self.records.is_none()
    }

    fn release_now(&mut self) {
        self.records = None;
        if let Some(hook) = self.release.take() {
            hook();
        }
    }
}

impl Iterator for QueryResults<'_> {
    type Item = StoreResult<QueryRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.records.as_mut()?.next();
        if next.is_none() {
            self.release_now();
        }
        next
    }
}

impl Drop for QueryResults<'_> {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for QueryResults<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryResults")
            .field("released", &self.is_released())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::StoreError;

    fn records(n: usize) -> Vec<StoreResult<QueryRecord>> {
        (0..n)
            .map(|i| Ok(QueryRecord::new(format!("k{i}"), b"{}".to_vec())))
            .collect()
    }

    #[test]
    fn exhaustion_releases_once() {
        let released = Cell::new(0);
        let mut results = QueryResults::new(records(2).into_iter())
            .on_release(|| released.set(released.get() + 1));

        assert!(results.next().is_some());
        assert!(results.next().is_some());
        assert_eq!(released.get(), 0);
        assert!(results.next().is_none());
        assert_eq!(released.get(), 1);
        assert!(results.is_released());

        // Not restartable.
        assert!(results.next().is_none());
        drop(results);
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn close_releases_without_draining() {
        let released = Cell::new(false);
        let results = QueryResults::new(records(5).into_iter()).on_release(|| released.set(true));
        results.close();
        assert!(released.get());
    }

    #[test]
    fn drop_after_error_releases() {
        let released = Cell::new(false);
        {
            let items = vec![
                Ok(QueryRecord::new("a", b"{}".to_vec())),
                Err(StoreError::Backend("cursor lost".into())),
                Ok(QueryRecord::new("b", b"{}".to_vec())),
            ];
            let mut results = QueryResults::new(items.into_iter()).on_release(|| released.set(true));
            assert!(results.next().unwrap().is_ok());
            assert!(results.next().unwrap().is_err());
            assert!(!released.get());
        }
        assert!(released.get());
    }

    #[test]
    fn empty_yields_nothing() {
        let mut results = QueryResults::empty();
        assert!(results.next().is_none());
        assert!(results.is_released());
    }

    #[test]
    fn debug_format() {
        let results = QueryResults::empty();
        assert!(format!("{results:?}").contains("released"));
    }
}
