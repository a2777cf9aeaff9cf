//! Reference resolvers, keyed by the business object type they produce.

use std::collections::{BTreeSet, HashMap};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::BlackbookResult;
use crate::mapping::{BusinessObject, ErasedBo, TypeKey};

/// Resolves ids to business objects of type `T`.
pub trait Mapper<T: BusinessObject>: Send + Sync {
    fn map_single(&self, id: &str) -> BlackbookResult<T>;

    fn map_multiple(&self, ids: &BTreeSet<String>) -> BlackbookResult<Vec<T>> {
        ids.iter().map(|id| self.map_single(id)).collect()
    }
}

/// A `Mapper` backed by a closure.
pub struct MapperFn<F>(pub F);

impl<T, F> Mapper<T> for MapperFn<F>
where
    T: BusinessObject,
    F: Fn(&str) -> BlackbookResult<T> + Send + Sync,
{
    fn map_single(&self, id: &str) -> BlackbookResult<T> {
        (self.0)(id)
    }
}

trait ErasedMapper: Send + Sync {
    fn resolve_one(&self, id: &str) -> BlackbookResult<ErasedBo>;

    fn resolve_many(&self, ids: &BTreeSet<String>) -> BlackbookResult<Vec<ErasedBo>>;
}

struct Typed<T, M: ?Sized> {
    mapper: Arc<M>,
    _target: PhantomData<fn() -> T>,
}

impl<T, M> ErasedMapper for Typed<T, M>
where
    T: BusinessObject,
    M: Mapper<T> + ?Sized,
{
    fn resolve_one(&self, id: &str) -> BlackbookResult<ErasedBo> {
        let bo = self.mapper.map_single(id)?;
        Ok(Box::new(bo))
    }

    fn resolve_many(&self, ids: &BTreeSet<String>) -> BlackbookResult<Vec<ErasedBo>> {
        let bos = self.mapper.map_multiple(ids)?;
        Ok(bos.into_iter().map(|bo| Box::new(bo) as ErasedBo).collect())
    }
}

/// The mappers one service may use to hydrate references.
#[derive(Clone, Default)]
pub struct MapperRegistry {
    mappers: HashMap<TypeKey, Arc<dyn ErasedMapper>>,
}

impl MapperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `mapper` as the resolver for `T`, replacing any previous one.
    pub fn with<T, M>(mut self, mapper: Arc<M>) -> Self
    where
        T: BusinessObject,
        M: Mapper<T> + ?Sized + 'static,
    {
        let typed: Arc<dyn ErasedMapper> = Arc::new(Typed::<T, M> {
            mapper,
            _target: PhantomData,
        });
        self.mappers.insert(TypeKey::of::<T>(), typed);
        self
    }

    pub(crate) fn resolve_one(&self, key: &TypeKey, id: &str) -> Option<BlackbookResult<ErasedBo>> {
        self.mappers.get(key).map(|mapper| mapper.resolve_one(id))
    }

    pub(crate) fn resolve_many(
        &self,
        key: &TypeKey,
        ids: &BTreeSet<String>,
    ) -> Option<BlackbookResult<Vec<ErasedBo>>> {
        self.mappers.get(key).map(|mapper| mapper.resolve_many(ids))
    }
}
