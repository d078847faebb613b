//! # Plant Store
//!
//! The in-memory system of record for a plant collection.
//!
//! ## Ownership
//!
//! [`PlantStore`] is a plain owned value: every mutation takes `&mut self`,
//! so a single owner serializes writes for free. Code that needs the store
//! on several threads (e.g. the [`HealthMonitor`]) shares it through
//! [`SharedStore`], which funnels every operation through one mutex.
//!
//! ## Persistence
//!
//! After each successful mutation the full collection is handed to the
//! [`SnapshotGateway`]. A failed save is logged and counted but never
//! undoes the mutation or fails the operation.
//!
//! ## Change Notification
//!
//! [`PlantStore::subscribe`] returns a [`Subscription`] receiving one
//! [`StoreEvent`] per mutation. Dropping the subscription (or calling
//! [`PlantStore::unsubscribe`]) stops delivery.

mod clock;
mod monitor;

use std::sync::mpsc;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use thiserror::Error;

use crate::domain::{
    health, schedule, CollectionStats, HealthChange, NewPlant, Plant, PlantId, PlantPatch,
    ValidationError, WateringUrgency,
};
use crate::storage::{ensure_unique_ids, SnapshotError, SnapshotGateway};

pub use clock::{Clock, FixedClock, SystemClock};
pub use monitor::HealthMonitor;

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Plant not found: {0}")]
    NotFound(PlantId),
}

/// A mutation that was applied to the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StoreEvent {
    Added { id: PlantId },
    Updated { id: PlantId },
    Removed { id: PlantId },
    Watered { id: PlantId },
    Fertilized { id: PlantId },
    HealthChanged { changes: Vec<HealthChange> },
}

/// Handle identifying a subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Receiving end of a store subscription
pub struct Subscription {
    id: SubscriptionId,
    events: mpsc::Receiver<StoreEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns the next event without blocking
    pub fn try_next(&self) -> Option<StoreEvent> {
        self.events.try_recv().ok()
    }

    /// Returns all events delivered so far
    pub fn drain(&self) -> Vec<StoreEvent> {
        self.events.try_iter().collect()
    }

    /// The underlying channel, for blocking or timed receives
    pub fn receiver(&self) -> &mpsc::Receiver<StoreEvent> {
        &self.events
    }
}

/// Owned collection of plants in insertion order
pub struct PlantStore {
    plants: Vec<Plant>,
    gateway: Box<dyn SnapshotGateway>,
    clock: Arc<dyn Clock>,
    subscribers: Vec<(SubscriptionId, mpsc::Sender<StoreEvent>)>,
    next_subscriber: u64,
    id_sequence: u64,
    failed_saves: u64,
}

impl PlantStore {
    /// Opens a store with the collection loaded from `gateway`
    pub fn open(
        gateway: Box<dyn SnapshotGateway>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SnapshotError> {
        let plants = gateway.load()?;
        Self::with_plants(plants, gateway, clock)
    }

    /// Creates a store around an already loaded collection
    ///
    /// Fails with [`SnapshotError::DuplicateId`] if two plants share an ID.
    pub fn with_plants(
        plants: Vec<Plant>,
        gateway: Box<dyn SnapshotGateway>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SnapshotError> {
        ensure_unique_ids(&plants)?;
        Ok(Self {
            plants,
            gateway,
            clock,
            subscribers: Vec::new(),
            next_subscriber: 0,
            id_sequence: 0,
            failed_saves: 0,
        })
    }

    /// The date the store considers "today"
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn get(&self, id: &PlantId) -> Option<&Plant> {
        self.plants.iter().find(|p| p.id() == id)
    }

    /// All plants in insertion order
    pub fn list(&self) -> &[Plant] {
        &self.plants
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }

    pub fn stats(&self) -> CollectionStats {
        CollectionStats::compute(&self.plants, self.today())
    }

    /// The `limit` plants due for watering soonest
    pub fn upcoming(&self, limit: usize) -> Vec<(&Plant, WateringUrgency)> {
        schedule::upcoming_waterings(&self.plants, self.today(), limit)
    }

    /// Number of snapshot saves that failed since the store was opened
    pub fn failed_saves(&self) -> u64 {
        self.failed_saves
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a plant with a freshly issued ID
    pub fn add(&mut self, data: NewPlant) -> Result<Plant, StoreError> {
        data.validate()?;

        let id = self.issue_id(&data.name);
        let plant = Plant::new(id.clone(), data, self.today());
        self.plants.push(plant.clone());

        tracing::info!("Added plant {} ({})", plant.id(), plant.name);
        self.commit(StoreEvent::Added { id });
        Ok(plant)
    }

    /// Merges `patch` into an existing plant
    ///
    /// Schedule dates are not recomputed: changing the water tier takes
    /// effect at the next `water`.
    pub fn update(&mut self, id: &PlantId, patch: PlantPatch) -> Result<Plant, StoreError> {
        patch.validate()?;

        let plant = self.find_mut(id)?;
        plant.apply(patch);
        let updated = plant.clone();

        self.commit(StoreEvent::Updated { id: id.clone() });
        Ok(updated)
    }

    /// Deletes a plant and its history
    pub fn remove(&mut self, id: &PlantId) -> Result<Plant, StoreError> {
        let index = self
            .plants
            .iter()
            .position(|p| p.id() == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let removed = self.plants.remove(index);

        tracing::info!("Removed plant {} ({})", removed.id(), removed.name);
        self.commit(StoreEvent::Removed { id: id.clone() });
        Ok(removed)
    }

    /// Records a watering today and reschedules from the water tier
    pub fn water(&mut self, id: &PlantId, notes: &str) -> Result<Plant, StoreError> {
        let today = self.today();
        let plant = self.find_mut(id)?;
        plant.record_watering(today, notes);
        let watered = plant.clone();

        self.commit(StoreEvent::Watered { id: id.clone() });
        Ok(watered)
    }

    /// Records a fertilizing today and schedules the next in 30 days
    pub fn fertilize(&mut self, id: &PlantId, notes: &str) -> Result<Plant, StoreError> {
        let today = self.today();
        let plant = self.find_mut(id)?;
        plant.record_fertilizing(today, notes);
        let fertilized = plant.clone();

        self.commit(StoreEvent::Fertilized { id: id.clone() });
        Ok(fertilized)
    }

    /// Recomputes health statuses from watering adherence
    ///
    /// Rules are evaluated against the statuses stored before the scan.
    /// When nothing changes the store is left untouched: no save and no
    /// event.
    pub fn scan_health(&mut self) -> Vec<HealthChange> {
        let changes = health::assess(&self.plants, self.today());
        if changes.is_empty() {
            return changes;
        }

        for change in &changes {
            if let Some(plant) = self.plants.iter_mut().find(|p| p.id() == &change.id) {
                plant.set_health(change.to);
            }
            tracing::info!(
                plant_id = %change.id,
                days_overdue = change.days_overdue,
                "Health of {} changed: {} -> {}",
                change.name,
                change.from,
                change.to
            );
        }

        self.commit(StoreEvent::HealthChanged {
            changes: changes.clone(),
        });
        changes
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Starts delivering store events to a new subscriber
    pub fn subscribe(&mut self) -> Subscription {
        let id = SubscriptionId(self.next_subscriber);
        self.next_subscriber += 1;

        let (tx, rx) = mpsc::channel();
        self.subscribers.push((id, tx));
        Subscription { id, events: rx }
    }

    /// Stops delivering events; returns false if the id was unknown
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn find_mut(&mut self, id: &PlantId) -> Result<&mut Plant, StoreError> {
        self.plants
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    /// Issues an ID not used by any plant in the store
    fn issue_id(&mut self, name: &str) -> PlantId {
        loop {
            self.id_sequence += 1;
            let id = PlantId::generate(name, Utc::now(), self.id_sequence);
            if self.get(&id).is_none() {
                return id;
            }
            tracing::debug!("Generated plant ID {} already in use, retrying", id);
        }
    }

    /// Persists the collection and notifies subscribers
    fn commit(&mut self, event: StoreEvent) {
        if let Err(e) = self.gateway.save(&self.plants) {
            self.failed_saves += 1;
            tracing::warn!(
                failed_saves = self.failed_saves,
                "Failed to save plant snapshot: {}",
                e
            );
        }

        // Disconnected subscribers are dropped on the way
        self.subscribers
            .retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }
}

/// Cloneable handle that serializes access to one [`PlantStore`]
#[derive(Clone)]
pub struct SharedStore(Arc<Mutex<PlantStore>>);

impl SharedStore {
    pub fn new(store: PlantStore) -> Self {
        Self(Arc::new(Mutex::new(store)))
    }

    /// Locks the store for a sequence of operations
    pub fn lock(&self) -> MutexGuard<'_, PlantStore> {
        self.0.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CareAction, CareLevel, HealthStatus};
    use crate::storage::MemorySnapshot;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    /// Gateway whose every save fails
    struct BrokenDisk;

    impl SnapshotGateway for BrokenDisk {
        fn load(&self) -> Result<Vec<Plant>, SnapshotError> {
            Ok(Vec::new())
        }

        fn save(&self, _plants: &[Plant]) -> Result<(), SnapshotError> {
            Err(SnapshotError::Unavailable("disk full".to_string()))
        }
    }

    fn make_store(today: &str) -> (PlantStore, MemorySnapshot, Arc<FixedClock>) {
        let snapshot = MemorySnapshot::new();
        let clock = Arc::new(FixedClock::new(date(today)));
        let store = PlantStore::open(Box::new(snapshot.clone()), clock.clone()).unwrap();
        (store, snapshot, clock)
    }

    fn new_plant(name: &str, tier: CareLevel) -> NewPlant {
        let mut data = NewPlant::new(name, "Living Room");
        data.water_needs = Some(tier);
        data
    }

    #[test]
    fn add_assigns_id_and_seeds_history() {
        let (mut store, _, _) = make_store("2023-04-01");
        let plant = store.add(new_plant("Monstera", CareLevel::Medium)).unwrap();

        assert!(plant.id().as_str().starts_with("p-"));
        assert_eq!(plant.care_history().len(), 1);
        assert_eq!(plant.care_history()[0].action, CareAction::Added);
        assert_eq!(store.get(plant.id()), Some(&plant));
    }

    #[test]
    fn rapid_adds_with_same_name_get_unique_ids() {
        let (mut store, _, _) = make_store("2023-04-01");
        for _ in 0..200 {
            store.add(new_plant("Fern", CareLevel::High)).unwrap();
        }

        let mut ids: Vec<_> = store.list().iter().map(|p| p.id().clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn add_rejects_missing_required_fields() {
        let (mut store, snapshot, _) = make_store("2023-04-01");
        let err = store.add(NewPlant::new("", "Hall")).unwrap_err();

        assert_eq!(err, StoreError::Validation(ValidationError { field: "name" }));
        assert!(store.is_empty());
        assert!(snapshot.saved().is_none());
    }

    #[test]
    fn list_keeps_insertion_order() {
        let (mut store, _, _) = make_store("2023-04-01");
        let a = store.add(new_plant("A", CareLevel::Low)).unwrap();
        let b = store.add(new_plant("B", CareLevel::Low)).unwrap();
        let c = store.add(new_plant("C", CareLevel::Low)).unwrap();

        store.remove(b.id()).unwrap();

        let names: Vec<_> = store.list().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert!(store.get(a.id()).is_some());
        assert!(store.get(c.id()).is_some());
    }

    #[test]
    fn missing_ids_are_reported() {
        let (mut store, snapshot, _) = make_store("2023-04-01");
        let ghost: PlantId = "ghost".parse().unwrap();

        assert_eq!(
            store.water(&ghost, "").unwrap_err(),
            StoreError::NotFound(ghost.clone())
        );
        assert!(store.fertilize(&ghost, "").is_err());
        assert!(store.update(&ghost, PlantPatch::default()).is_err());
        assert!(store.remove(&ghost).is_err());
        assert!(snapshot.saved().is_none());
    }

    #[test]
    fn water_reschedules_by_tier() {
        let (mut store, _, clock) = make_store("2023-03-01");
        let low = store.add(new_plant("Cactus", CareLevel::Low)).unwrap();
        let medium = store.add(new_plant("Monstera", CareLevel::Medium)).unwrap();
        let high = store.add(new_plant("Fern", CareLevel::High)).unwrap();

        clock.set(date("2023-04-01"));

        assert_eq!(
            store.water(low.id(), "").unwrap().next_watering(),
            date("2023-04-15")
        );
        assert_eq!(
            store.water(medium.id(), "").unwrap().next_watering(),
            date("2023-04-08")
        );
        let watered = store.water(high.id(), "misted too").unwrap();
        assert_eq!(watered.last_watered(), date("2023-04-01"));
        assert_eq!(watered.next_watering(), date("2023-04-04"));

        let entry = watered.care_history().last().unwrap();
        assert_eq!(entry.action, CareAction::Watered);
        assert_eq!(entry.notes, "misted too");
        assert_eq!(entry.date, date("2023-04-01"));
    }

    #[test]
    fn fertilize_schedules_thirty_days_out() {
        let (mut store, _, clock) = make_store("2023-03-01");
        let plant = store.add(new_plant("Fern", CareLevel::High)).unwrap();

        clock.set(date("2023-04-01"));
        let fertilized = store.fertilize(plant.id(), "half strength").unwrap();

        assert_eq!(fertilized.last_fertilized(), Some(date("2023-04-01")));
        assert_eq!(fertilized.next_fertilizing(), Some(date("2023-05-01")));
        assert_eq!(fertilized.care_history().len(), 2);
    }

    #[test]
    fn update_merges_without_rescheduling() {
        let (mut store, _, _) = make_store("2023-04-01");
        let plant = store.add(new_plant("Fern", CareLevel::Low)).unwrap();

        let updated = store
            .update(
                plant.id(),
                PlantPatch {
                    name: Some("Boston Fern".to_string()),
                    water_needs: Some(CareLevel::High),
                    ..PlantPatch::default()
                },
            )
            .unwrap();

        assert_eq!(updated.name, "Boston Fern");
        assert_eq!(updated.water_needs, CareLevel::High);
        assert_eq!(updated.next_watering(), plant.next_watering());
        assert_eq!(updated.care_history(), plant.care_history());
    }

    #[test]
    fn update_rejects_blank_location() {
        let (mut store, _, _) = make_store("2023-04-01");
        let plant = store.add(new_plant("Fern", CareLevel::Low)).unwrap();

        let err = store
            .update(
                plant.id(),
                PlantPatch {
                    location: Some("   ".to_string()),
                    ..PlantPatch::default()
                },
            )
            .unwrap_err();

        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.get(plant.id()).unwrap().location, "Living Room");
    }

    #[test]
    fn every_mutation_is_saved() {
        let (mut store, snapshot, _) = make_store("2023-04-01");
        let plant = store.add(new_plant("Fern", CareLevel::Low)).unwrap();
        assert_eq!(snapshot.saved().unwrap().len(), 1);

        store.water(plant.id(), "").unwrap();
        assert_eq!(snapshot.saved().unwrap()[0].care_history().len(), 2);

        store.remove(plant.id()).unwrap();
        assert!(snapshot.saved().unwrap().is_empty());
    }

    #[test]
    fn failed_save_keeps_mutation() {
        let clock = Arc::new(FixedClock::new(date("2023-04-01")));
        let mut store = PlantStore::open(Box::new(BrokenDisk), clock).unwrap();

        let plant = store.add(new_plant("Fern", CareLevel::Low)).unwrap();
        store.water(plant.id(), "").unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(plant.id()).unwrap().care_history().len(), 2);
        assert_eq!(store.failed_saves(), 2);
    }

    #[test]
    fn duplicate_ids_fail_to_open() {
        let (mut source, _, clock) = make_store("2023-04-01");
        let plant = source.add(new_plant("Fern", CareLevel::Low)).unwrap();
        let other = source.add(new_plant("Ivy", CareLevel::High)).unwrap();

        let snapshot = MemorySnapshot::with_initial(vec![plant.clone(), other, plant.clone()]);
        let err = PlantStore::open(Box::new(snapshot.clone()), clock).err().unwrap();

        assert!(matches!(err, SnapshotError::DuplicateId(ref id) if id == plant.id()));
        assert!(snapshot.saved().is_none());
    }

    #[test]
    fn health_scenarios() {
        let (mut store, _, clock) = make_store("2023-04-01");
        let plant = store.add(new_plant("Monstera", CareLevel::Medium)).unwrap();
        assert_eq!(plant.next_watering(), date("2023-04-08"));

        clock.set(date("2023-04-11"));
        assert!(store.scan_health().is_empty());
        assert_eq!(store.get(plant.id()).unwrap().health(), HealthStatus::Good);

        clock.set(date("2023-04-12"));
        store.scan_health();
        assert_eq!(
            store.get(plant.id()).unwrap().health(),
            HealthStatus::NeedsAttention
        );

        clock.set(date("2023-04-16"));
        store.scan_health();
        assert_eq!(store.get(plant.id()).unwrap().health(), HealthStatus::Critical);

        store.water(plant.id(), "").unwrap();
        let changes = store.scan_health();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].from, HealthStatus::Critical);
        assert_eq!(store.get(plant.id()).unwrap().health(), HealthStatus::Good);
    }

    #[test]
    fn unchanged_scan_is_silent() {
        let (mut store, snapshot, _) = make_store("2023-04-01");
        store.add(new_plant("Fern", CareLevel::Low)).unwrap();
        let saved_before = snapshot.saved();

        let sub = store.subscribe();
        assert!(store.scan_health().is_empty());

        assert!(sub.drain().is_empty());
        assert_eq!(snapshot.saved(), saved_before);
    }

    #[test]
    fn scan_is_a_fixed_point() {
        let (mut store, _, clock) = make_store("2023-04-01");
        store.add(new_plant("Fern", CareLevel::High)).unwrap();
        store.add(new_plant("Cactus", CareLevel::Low)).unwrap();

        clock.set(date("2023-04-20"));
        let first = store.scan_health();
        let statuses: Vec<_> = store.list().iter().map(|p| p.health()).collect();

        assert!(!first.is_empty());
        assert!(store.scan_health().is_empty());
        let again: Vec<_> = store.list().iter().map(|p| p.health()).collect();
        assert_eq!(statuses, again);
    }

    #[test]
    fn subscribers_receive_events_until_unsubscribed() {
        let (mut store, _, _) = make_store("2023-04-01");
        let sub = store.subscribe();

        let plant = store.add(new_plant("Fern", CareLevel::Low)).unwrap();
        store.water(plant.id(), "").unwrap();

        assert_eq!(
            sub.drain(),
            vec![
                StoreEvent::Added {
                    id: plant.id().clone()
                },
                StoreEvent::Watered {
                    id: plant.id().clone()
                },
            ]
        );

        assert!(store.unsubscribe(sub.id()));
        assert!(!store.unsubscribe(sub.id()));
        store.fertilize(plant.id(), "").unwrap();
        assert!(sub.try_next().is_none());
    }

    #[test]
    fn dropped_subscriptions_are_pruned() {
        let (mut store, _, _) = make_store("2023-04-01");
        let sub = store.subscribe();
        assert_eq!(store.subscriber_count(), 1);

        drop(sub);
        store.add(new_plant("Fern", CareLevel::Low)).unwrap();
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn stats_follow_the_clock() {
        let (mut store, _, clock) = make_store("2023-04-01");
        store.add(new_plant("Fern", CareLevel::High)).unwrap();
        store.add(new_plant("Cactus", CareLevel::Low)).unwrap();

        assert_eq!(store.stats().needs_watering, 0);

        clock.set(date("2023-04-04"));
        let stats = store.stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.needs_watering, 1);
        assert_eq!(stats.needs_attention, 0);
    }

    #[test]
    fn shared_store_serializes_writers() {
        let (store, snapshot, _) = make_store("2023-04-01");
        let shared = SharedStore::new(store);

        let handles: Vec<_> = (0..4)
            .map(|n| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        shared
                            .lock()
                            .add(new_plant(&format!("Plant {}-{}", n, i), CareLevel::Low))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.lock().len(), 100);
        assert_eq!(snapshot.saved().unwrap().len(), 100);
    }
}
