//! Pool registry.
//!
//! Pools are stored in a [`Slab`] and indexed by id. Pools are never
//! removed, so ids are assigned from the running count:
//! `id = (count + 1) * 100 + type`.

use std::collections::HashMap;

use alloy_primitives::Address;
use slab::Slab;

use crate::error::{NucleusError, Result};
use crate::pools::{Pool, PoolKind};
use crate::types::{Location, PoolId, PoolType};

/// Every pool ever created.
#[derive(Debug, Clone, Default)]
pub struct PoolRegistry {
    /// Pool storage
    pools: Slab<Pool>,

    /// Pool id to slab key
    index: HashMap<PoolId, usize>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pools created so far
    #[inline]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// The id the next pool of this type will receive.
    pub fn next_id(&self, pool_type: PoolType) -> PoolId {
        PoolId::new(self.pools.len() as u64 + 1, pool_type)
    }

    /// Register a pool and return its id.
    pub fn insert(&mut self, owner: Address, kind: PoolKind) -> PoolId {
        let id = self.next_id(kind.pool_type());
        let key = self.pools.insert(Pool { id, owner, kind });
        self.index.insert(id, key);
        id
    }

    pub fn contains(&self, id: PoolId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: PoolId) -> Result<&Pool> {
        self.index
            .get(&id)
            .and_then(|key| self.pools.get(*key))
            .ok_or(NucleusError::PoolDoesNotExist(id))
    }

    pub fn get_mut(&mut self, id: PoolId) -> Result<&mut Pool> {
        self.index
            .get(&id)
            .and_then(|key| self.pools.get_mut(*key))
            .ok_or(NucleusError::PoolDoesNotExist(id))
    }

    pub fn owner_of(&self, id: PoolId) -> Result<Address> {
        self.get(id).map(|pool| pool.owner)
    }

    /// Fail with `NotAuthorized` unless `caller` owns the pool.
    pub fn ensure_owner(&self, id: PoolId, caller: Address) -> Result<&Pool> {
        let pool = self.get(id)?;
        if pool.owner != caller {
            return Err(NucleusError::NotAuthorized {
                caller,
                location: Location::Pool(id),
            });
        }
        Ok(pool)
    }

    pub fn set_owner(&mut self, id: PoolId, owner: Address) -> Result<Address> {
        let pool = self.get_mut(id)?;
        Ok(std::mem::replace(&mut pool.owner, owner))
    }

    /// Ids of pools owned by `owner`, ascending.
    pub fn owned_by(&self, owner: Address) -> Vec<PoolId> {
        let mut ids: Vec<_> = self
            .pools
            .iter()
            .filter(|(_, pool)| pool.owner == owner)
            .map(|(_, pool)| pool.id)
            .collect();
        ids.sort();
        ids
    }

    /// All pools, ascending by id.
    pub fn iter(&self) -> impl Iterator<Item = &Pool> {
        let mut pools: Vec<_> = self.pools.iter().map(|(_, pool)| pool).collect();
        pools.sort_by_key(|pool| pool.id);
        pools.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pools::{GridOrderPool, LimitOrderPool};
    use crate::types::{ExchangeRate, TradeRequestConfig};

    fn limit() -> PoolKind {
        PoolKind::Limit(LimitOrderPool {
            token_a: Address::repeat_byte(1),
            token_b: Address::repeat_byte(2),
            request: TradeRequestConfig {
                exchange_rate: ExchangeRate::new(1, 1),
                location_b: Location::Internal(Address::repeat_byte(3)),
            },
        })
    }

    #[test]
    fn test_ids_follow_count_and_type() {
        let mut registry = PoolRegistry::new();
        let owner = Address::repeat_byte(0x0A);
        let first = registry.insert(owner, limit());
        let second = registry.insert(owner, PoolKind::Grid(GridOrderPool::new()));
        let third = registry.insert(owner, limit());

        assert_eq!(first.get(), 101);
        assert_eq!(second.get(), 202);
        assert_eq!(third.get(), 301);
        assert_eq!(second.pool_type(), Some(PoolType::Grid));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_missing_pool() {
        let registry = PoolRegistry::new();
        let id = PoolId::new(1, PoolType::Limit);
        assert_eq!(registry.get(id), Err(NucleusError::PoolDoesNotExist(id)));
        assert!(!registry.contains(id));
    }

    #[test]
    fn test_ownership() {
        let mut registry = PoolRegistry::new();
        let alice = Address::repeat_byte(0x0A);
        let bob = Address::repeat_byte(0x0B);
        let id = registry.insert(alice, limit());

        assert!(registry.ensure_owner(id, alice).is_ok());
        assert!(matches!(
            registry.ensure_owner(id, bob),
            Err(NucleusError::NotAuthorized { .. })
        ));

        assert_eq!(registry.set_owner(id, bob), Ok(alice));
        assert_eq!(registry.owner_of(id), Ok(bob));
        assert!(registry.owned_by(alice).is_empty());
        assert_eq!(registry.owned_by(bob), vec![id]);
    }
}
