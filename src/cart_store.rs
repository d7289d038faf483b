//! Session-scoped carts.
//!
//! A cart maps menu item ids to quantities and lives only in memory, keyed by the session id
//! carried in the caller's token. Every write refreshes the cart's deadline; carts idle for
//! longer than the TTL read as empty and are dropped by [`CartStore::evict_expired`].

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::one::RefMut;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub type CartEntries = BTreeMap<Uuid, i32>;

/// Upper bound for one line's quantity.
pub const MAX_QUANTITY: i32 = 999;

fn too_many() -> AppError {
    AppError::BadRequest(format!("quantity must be at most {MAX_QUANTITY}"))
}

#[derive(Debug, Clone)]
struct SessionCart {
    items: CartEntries,
    touched: Instant,
}

impl SessionCart {
    fn new(now: Instant) -> Self {
        Self {
            items: CartEntries::new(),
            touched: now,
        }
    }
}

#[derive(Debug)]
pub struct CartStore {
    carts: DashMap<Uuid, SessionCart>,
    ttl: Duration,
}

impl CartStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            carts: DashMap::new(),
            ttl,
        }
    }

    /// Add `quantity` of an item, merging with what is already in the cart.
    pub fn add(&self, session: Uuid, item_id: Uuid, quantity: i32) -> AppResult<i32> {
        self.add_at(session, item_id, quantity, Instant::now())
    }

    pub fn add_at(
        &self,
        session: Uuid,
        item_id: Uuid,
        quantity: i32,
        now: Instant,
    ) -> AppResult<i32> {
        if quantity <= 0 {
            return Err(AppError::BadRequest(
                "quantity must be greater than 0".to_string(),
            ));
        }
        let mut cart = self.touch(session, now);
        let current = cart.items.get(&item_id).copied().unwrap_or(0);
        let merged = current
            .checked_add(quantity)
            .filter(|q| *q <= MAX_QUANTITY)
            .ok_or_else(too_many)?;
        cart.items.insert(item_id, merged);
        Ok(merged)
    }

    /// Replace an item's quantity. Zero or less removes it.
    pub fn set(&self, session: Uuid, item_id: Uuid, quantity: i32) -> AppResult<()> {
        self.set_at(session, item_id, quantity, Instant::now())
    }

    pub fn set_at(
        &self,
        session: Uuid,
        item_id: Uuid,
        quantity: i32,
        now: Instant,
    ) -> AppResult<()> {
        if quantity > MAX_QUANTITY {
            return Err(too_many());
        }
        let mut cart = self.touch(session, now);
        if quantity <= 0 {
            cart.items.remove(&item_id);
        } else {
            cart.items.insert(item_id, quantity);
        }
        Ok(())
    }

    pub fn clear(&self, session: Uuid) {
        self.carts.remove(&session);
    }

    pub fn snapshot(&self, session: Uuid) -> CartEntries {
        self.snapshot_at(session, Instant::now())
    }

    pub fn snapshot_at(&self, session: Uuid, now: Instant) -> CartEntries {
        match self.carts.get(&session) {
            Some(cart) if !self.is_expired(&cart, now) => cart.items.clone(),
            _ => CartEntries::new(),
        }
    }

    pub fn is_empty(&self, session: Uuid) -> bool {
        self.snapshot(session).is_empty()
    }

    pub fn evict_expired(&self) -> usize {
        self.evict_expired_at(Instant::now())
    }

    pub fn evict_expired_at(&self, now: Instant) -> usize {
        let before = self.carts.len();
        self.carts
            .retain(|_, cart| now.saturating_duration_since(cart.touched) < self.ttl);
        before.saturating_sub(self.carts.len())
    }

    pub fn session_count(&self) -> usize {
        self.carts.len()
    }

    /// Fetch or create the session's cart and refresh its deadline.
    fn touch(&self, session: Uuid, now: Instant) -> RefMut<'_, Uuid, SessionCart> {
        let mut cart = self
            .carts
            .entry(session)
            .or_insert_with(|| SessionCart::new(now));
        if self.is_expired(&cart, now) {
            cart.items.clear();
        }
        cart.touched = now;
        cart
    }

    fn is_expired(&self, cart: &SessionCart, now: Instant) -> bool {
        now.saturating_duration_since(cart.touched) >= self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CartStore {
        CartStore::new(Duration::from_secs(60))
    }

    #[test]
    fn add_merges_quantities() {
        let carts = store();
        let session = Uuid::new_v4();
        let item = Uuid::new_v4();

        assert_eq!(carts.add(session, item, 2).unwrap(), 2);
        assert_eq!(carts.add(session, item, 3).unwrap(), 5);
        assert_eq!(carts.snapshot(session).get(&item), Some(&5));
    }

    #[test]
    fn add_rejects_non_positive_quantity() {
        let carts = store();
        let session = Uuid::new_v4();
        assert!(matches!(
            carts.add(session, Uuid::new_v4(), 0),
            Err(AppError::BadRequest(_))
        ));
        assert!(carts.is_empty(session));
    }

    #[test]
    fn set_replaces_and_removes() {
        let carts = store();
        let session = Uuid::new_v4();
        let item = Uuid::new_v4();
        let other = Uuid::new_v4();

        carts.add(session, item, 4).unwrap();
        carts.add(session, other, 1).unwrap();
        carts.set(session, item, 1).unwrap();
        assert_eq!(carts.snapshot(session).get(&item), Some(&1));

        carts.set(session, item, 0).unwrap();
        let entries = carts.snapshot(session);
        assert!(!entries.contains_key(&item));
        assert_eq!(entries.get(&other), Some(&1));

        carts.set(session, other, -3).unwrap();
        assert!(carts.is_empty(session));
    }

    #[test]
    fn sessions_are_isolated() {
        let carts = store();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let item = Uuid::new_v4();

        carts.add(a, item, 2).unwrap();
        assert!(carts.is_empty(b));

        carts.clear(a);
        assert!(carts.is_empty(a));
    }

    #[test]
    fn idle_carts_are_evicted() {
        let carts = store();
        let idle = Uuid::new_v4();
        carts.add(idle, Uuid::new_v4(), 1).unwrap();
        assert_eq!(carts.session_count(), 1);

        assert_eq!(carts.evict_expired_at(Instant::now()), 0);
        let later = Instant::now() + Duration::from_secs(61);
        assert_eq!(carts.evict_expired_at(later), 1);
        assert_eq!(carts.session_count(), 0);
    }

    #[test]
    fn expired_cart_reads_empty() {
        let carts = CartStore::new(Duration::ZERO);
        let session = Uuid::new_v4();
        carts.set(session, Uuid::new_v4(), 2).unwrap();
        assert!(carts.is_empty(session));
    }

    #[test]
    fn writes_refresh_the_deadline() {
        let carts = store();
        let session = Uuid::new_v4();
        let item = Uuid::new_v4();
        let start = Instant::now();

        carts.add_at(session, item, 1, start).unwrap();
        carts
            .set_at(session, item, 3, start + Duration::from_secs(50))
            .unwrap();

        let later = start + Duration::from_secs(100);
        assert_eq!(carts.snapshot_at(session, later).get(&item), Some(&3));
        assert_eq!(carts.evict_expired_at(later), 0);

        let idle = start + Duration::from_secs(111);
        assert!(carts.snapshot_at(session, idle).is_empty());
        assert_eq!(carts.evict_expired_at(idle), 1);
    }

    #[test]
    fn quantities_are_bounded() {
        let carts = store();
        let session = Uuid::new_v4();
        let item = Uuid::new_v4();

        assert!(matches!(
            carts.set(session, item, i32::MAX),
            Err(AppError::BadRequest(_))
        ));
        carts.set(session, item, MAX_QUANTITY).unwrap();
        assert!(matches!(
            carts.add(session, item, 1),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            carts.add(session, Uuid::new_v4(), i32::MAX),
            Err(AppError::BadRequest(_))
        ));
        assert_eq!(carts.snapshot(session).get(&item), Some(&MAX_QUANTITY));
    }
}
