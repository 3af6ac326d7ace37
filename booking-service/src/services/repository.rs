//! Keyed marketplace state.
//!
//! The prototype held users and bookings in flat arrays and scanned them on
//! every lookup. Here both collections are indexed by id (plus a phone index
//! for login), and every mutation runs as a single state transition behind
//! one lock, persisted before the result is returned.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use service_core::error::AppError;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Booking, User, WalletEntry, WALLET_LOG_CAP};

use super::store::{Snapshot, SnapshotStore};

#[derive(Default)]
pub struct MarketplaceState {
    users: HashMap<Uuid, User>,
    phone_index: HashMap<String, Uuid>,
    bookings: HashMap<Uuid, Booking>,
    /// Most-recent-first, matching the prototype's prepend ordering.
    booking_order: Vec<Uuid>,
    /// Per-user wallet audit, newest first, capped. Not persisted.
    wallet_logs: HashMap<Uuid, Vec<WalletEntry>>,
}

impl MarketplaceState {
    fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut state = Self::default();
        for user in snapshot.users {
            state.phone_index.insert(user.phone.clone(), user.id);
            state.users.insert(user.id, user);
        }
        for booking in snapshot.bookings {
            state.booking_order.push(booking.id);
            state.bookings.insert(booking.id, booking);
        }
        state
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            users: self.users.values().cloned().collect(),
            bookings: self
                .booking_order
                .iter()
                .filter_map(|id| self.bookings.get(id))
                .cloned()
                .collect(),
        }
    }

    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn user_mut(&mut self, id: Uuid) -> Option<&mut User> {
        // Phone numbers never change, so the phone index stays valid.
        self.users.get_mut(&id)
    }

    pub fn user_by_phone(&self, phone: &str) -> Option<&User> {
        self.phone_index.get(phone).and_then(|id| self.users.get(id))
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn insert_user(&mut self, user: User) -> Result<(), AppError> {
        if self.phone_index.contains_key(&user.phone) {
            return Err(AppError::Conflict(anyhow!(
                "phone number {} is already registered",
                user.phone
            )));
        }
        self.phone_index.insert(user.phone.clone(), user.id);
        self.users.insert(user.id, user);
        Ok(())
    }

    pub fn booking(&self, id: Uuid) -> Option<&Booking> {
        self.bookings.get(&id)
    }

    pub fn booking_mut(&mut self, id: Uuid) -> Option<&mut Booking> {
        self.bookings.get_mut(&id)
    }

    /// Prepend, keeping the collection most-recent-first.
    pub fn insert_booking(&mut self, booking: Booking) {
        self.booking_order.insert(0, booking.id);
        self.bookings.insert(booking.id, booking);
    }

    pub fn bookings_newest_first(&self) -> impl Iterator<Item = &Booking> {
        self.booking_order
            .iter()
            .filter_map(|id| self.bookings.get(id))
    }

    pub fn push_wallet_entry(&mut self, user_id: Uuid, entry: WalletEntry) {
        let log = self.wallet_logs.entry(user_id).or_default();
        log.insert(0, entry);
        log.truncate(WALLET_LOG_CAP);
    }

    pub fn wallet_log(&self, user_id: Uuid) -> &[WalletEntry] {
        self.wallet_logs
            .get(&user_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Clone)]
pub struct MarketplaceRepository {
    state: Arc<RwLock<MarketplaceState>>,
    store: Arc<dyn SnapshotStore>,
}

impl MarketplaceRepository {
    /// Load the snapshot and build the indexes. A malformed snapshot aborts
    /// startup.
    pub async fn open(store: Arc<dyn SnapshotStore>) -> Result<Self, AppError> {
        let snapshot = store
            .load()
            .await
            .map_err(AppError::StorageError)?
            .unwrap_or_default();

        tracing::info!(
            users = snapshot.users.len(),
            bookings = snapshot.bookings.len(),
            "loaded marketplace snapshot"
        );

        Ok(Self {
            state: Arc::new(RwLock::new(MarketplaceState::from_snapshot(snapshot))),
            store,
        })
    }

    /// Run a read-only closure against the current state.
    pub async fn read<T>(&self, f: impl FnOnce(&MarketplaceState) -> T) -> T {
        let state = self.state.read().await;
        f(&state)
    }

    /// Apply a mutation as a single state transition and persist the result.
    /// Nothing is written when the closure fails.
    pub async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut MarketplaceState) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut state = self.state.write().await;
        let out = f(&mut state)?;
        self.store
            .persist(&state.snapshot())
            .await
            .map_err(AppError::StorageError)?;
        Ok(out)
    }
}
