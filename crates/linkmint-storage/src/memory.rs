use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use linkmint_core::store::Result;
use linkmint_core::{ShortCode, StoreError, UrlMapping, UrlStore};

#[derive(Debug, Clone)]
struct Row {
    url: String,
    created_at: Timestamp,
}

/// In-memory implementation of [`UrlStore`] using DashMap.
///
/// Insert goes through DashMap's entry API, which holds the shard lock
/// between the existence check and the write, so two concurrent inserts of
/// the same code cannot both succeed.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    rows: DashMap<ShortCode, Row>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored mappings.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl UrlStore for InMemoryStore {
    async fn insert_unique(&self, code: &ShortCode, url: &str) -> Result<()> {
        match self.rows.entry(code.clone()) {
            Entry::Occupied(_) => Err(StoreError::UniqueViolation(code.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(Row {
                    url: url.to_owned(),
                    created_at: Timestamp::now(),
                });
                Ok(())
            }
        }
    }

    async fn find_by_code(&self, code: &ShortCode) -> Result<UrlMapping> {
        let row = self
            .rows
            .get(code)
            .ok_or_else(|| StoreError::NotFound(code.to_string()))?;

        Ok(UrlMapping {
            code: code.clone(),
            url: row.url.clone(),
            created_at: row.created_at,
        })
    }
}
