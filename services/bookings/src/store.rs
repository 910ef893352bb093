//! Booking storage
//!
//! The dashboards keep bookings in memory only; `InMemoryBookingStore` is the
//! one implementation. Callers depend on the trait so a real store can be
//! swapped in.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use shared::types::{Booking, BookingId};

use crate::error::StoreError;

pub trait BookingStore: Send + Sync {
    fn get(&self, id: &str) -> Option<Booking>;

    fn insert(&self, booking: Booking) -> Result<(), StoreError>;

    /// Replace an existing booking; the id must already be present.
    fn update(&self, booking: Booking) -> Result<(), StoreError>;

    /// Replace an existing booking only if `guard` accepts the stored copy.
    /// The check and the write happen as one step; a rejected guard returns
    /// `Conflict` with the stored status.
    fn update_if(
        &self,
        booking: Booking,
        guard: &dyn Fn(&Booking) -> bool,
    ) -> Result<(), StoreError>;

    fn bookings_for_user(&self, user_id: &str) -> Vec<Booking>;
}

#[derive(Debug, Default)]
pub struct InMemoryBookingStore {
    bookings: DashMap<BookingId, Booking>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bookings(bookings: impl IntoIterator<Item = Booking>) -> Self {
        let store = Self::new();
        for booking in bookings {
            store.bookings.insert(booking.id.clone(), booking);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }
}

impl BookingStore for InMemoryBookingStore {
    fn get(&self, id: &str) -> Option<Booking> {
        self.bookings.get(id).map(|entry| entry.value().clone())
    }

    fn insert(&self, booking: Booking) -> Result<(), StoreError> {
        match self.bookings.entry(booking.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateBooking(booking.id)),
            Entry::Vacant(slot) => {
                slot.insert(booking);
                Ok(())
            }
        }
    }

    fn update(&self, booking: Booking) -> Result<(), StoreError> {
        match self.bookings.get_mut(&booking.id) {
            Some(mut existing) => {
                *existing = booking;
                Ok(())
            }
            None => Err(StoreError::BookingNotFound(booking.id)),
        }
    }

    fn update_if(
        &self,
        booking: Booking,
        guard: &dyn Fn(&Booking) -> bool,
    ) -> Result<(), StoreError> {
        // get_mut holds the shard write lock across the check
        match self.bookings.get_mut(&booking.id) {
            Some(mut existing) if guard(existing.value()) => {
                *existing = booking;
                Ok(())
            }
            Some(existing) => Err(StoreError::Conflict {
                booking_id: booking.id,
                status: existing.status,
            }),
            None => Err(StoreError::BookingNotFound(booking.id)),
        }
    }

    fn bookings_for_user(&self, user_id: &str) -> Vec<Booking> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        bookings.sort_by(|a, b| a.id.cmp(&b.id));
        bookings
    }
}
