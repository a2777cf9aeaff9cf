//! Storage seam for entities.
//!
//! Query execution lives behind `Repository`; the crate only ships an
//! in-memory implementation, which is what the server runs on.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;

use crate::entity::{Dated, Entity};
use crate::error::{BlackbookError, BlackbookResult, short_type_name};
use crate::mapping::Value;

pub trait Repository<E: Entity>: Send + Sync {
    fn find_all(&self) -> BlackbookResult<Vec<E>>;

    fn find_by_id(&self, id: &str) -> BlackbookResult<Option<E>>;

    fn find_by_id_in(&self, ids: &BTreeSet<String>) -> BlackbookResult<Vec<E>>;

    /// Insert or replace by id, returning what was stored.
    fn save(&self, entity: E) -> BlackbookResult<E>;

    fn delete_by_id(&self, id: &str) -> BlackbookResult<()>;
}

/// Repositories of records that sit on a calendar date.
pub trait DatedRepository<E: Entity + Dated>: Repository<E> {
    /// Records dated within `from..=to`. Undated records never match.
    fn find_by_date_between(&self, from: NaiveDate, to: NaiveDate) -> BlackbookResult<Vec<E>>;
}

/// Something that may still point at records by id.
pub trait Referrer: Send + Sync {
    /// Names the first record that refers to `id`, if there is one.
    fn referring_to(&self, id: &str) -> BlackbookResult<Option<String>>;
}

/// Records of `E` whose `field` holds an id or a set of ids.
pub struct FieldReferrer<E> {
    repository: Arc<dyn Repository<E>>,
    field: &'static str,
}

impl<E: Entity> FieldReferrer<E> {
    pub fn new(repository: Arc<dyn Repository<E>>, field: &'static str) -> Self {
        FieldReferrer { repository, field }
    }
}

impl<E: Entity> Referrer for FieldReferrer<E> {
    fn referring_to(&self, id: &str) -> BlackbookResult<Option<String>> {
        let refers = |row: &E| match row.get(self.field) {
            Some(Value::Text(target)) => target == id,
            Some(Value::TextSet(targets)) => targets.contains(id),
            _ => false,
        };
        Ok(self
            .repository
            .find_all()?
            .iter()
            .find(|row| refers(row))
            .map(|row| format!("{} {}", short_type_name::<E>(), row.id())))
    }
}

/// A repository held in a map, ordered by id.
pub struct InMemoryRepository<E> {
    rows: RwLock<BTreeMap<String, E>>,
}

impl<E> Default for InMemoryRepository<E> {
    fn default() -> Self {
        InMemoryRepository {
            rows: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> BlackbookResult<RwLockReadGuard<'_, BTreeMap<String, E>>> {
        self.rows.read().map_err(|_| poisoned::<E>())
    }

    fn write(&self) -> BlackbookResult<RwLockWriteGuard<'_, BTreeMap<String, E>>> {
        self.rows.write().map_err(|_| poisoned::<E>())
    }
}

fn poisoned<E>() -> BlackbookError {
    BlackbookError::Repository(format!("{} store is poisoned", short_type_name::<E>()))
}

impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    fn find_all(&self) -> BlackbookResult<Vec<E>> {
        Ok(self.read()?.values().cloned().collect())
    }

    fn find_by_id(&self, id: &str) -> BlackbookResult<Option<E>> {
        Ok(self.read()?.get(id).cloned())
    }

    fn find_by_id_in(&self, ids: &BTreeSet<String>) -> BlackbookResult<Vec<E>> {
        let rows = self.read()?;
        Ok(ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
    }

    fn save(&self, entity: E) -> BlackbookResult<E> {
        self.write()?.insert(entity.id().to_string(), entity.clone());
        Ok(entity)
    }

    fn delete_by_id(&self, id: &str) -> BlackbookResult<()> {
        self.write()?.remove(id);
        Ok(())
    }
}

impl<E: Entity + Dated> DatedRepository<E> for InMemoryRepository<E> {
    fn find_by_date_between(&self, from: NaiveDate, to: NaiveDate) -> BlackbookResult<Vec<E>> {
        let rows = self.read()?;
        let mut found: Vec<E> = rows
            .values()
            .filter(|row| row.date().is_some_and(|date| from <= date && date <= to))
            .cloned()
            .collect();
        found.sort_by_key(|row| row.date());
        Ok(found)
    }
}
