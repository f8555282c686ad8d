//! Keyed object pool
//!
//! Instances live in one slot arena and are addressed by `InstanceId`. Each key
//! owns a FIFO queue of inactive ids plus the template new instances are cloned
//! from. An active instance belongs to exactly one key until it is released.

use std::collections::{HashMap, VecDeque};

/// Handle to a pooled instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u32);

/// Why an instance went back to its pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnReason {
    /// Left the visible area on its own
    OffScreen,
    /// Swept up by a restart or menu return
    Drained,
}

/// Emitted on every successful release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Returned {
    pub key: String,
    pub id: InstanceId,
    pub reason: ReturnReason,
}

/// Pool failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Key was never registered
    #[error("pool with key '{0}' not found")]
    UnknownKey(String),
    /// Id does not name a live instance
    #[error("no pooled instance {0:?}")]
    UnknownInstance(InstanceId),
    /// Instance is already inactive
    #[error("instance {0:?} is not active")]
    NotActive(InstanceId),
}

#[derive(Debug, Clone)]
struct Slot<T> {
    value: T,
    key: String,
    active: bool,
}

#[derive(Debug, Clone)]
struct KeyedQueue<T> {
    template: T,
    inactive: VecDeque<InstanceId>,
}

/// Keyed pool of reusable `T`
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<Option<Slot<T>>>,
    queues: HashMap<String, KeyedQueue<T>>,
    returned: Vec<Returned>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            queues: HashMap::new(),
            returned: Vec::new(),
        }
    }
}

impl<T: Clone> Pool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template and pre-allocate `initial_count` inactive instances.
    /// Registering an existing key is a no-op.
    pub fn register(&mut self, key: &str, template: T, initial_count: usize) {
        if self.queues.contains_key(key) {
            return;
        }
        let mut inactive = VecDeque::with_capacity(initial_count);
        for _ in 0..initial_count {
            inactive.push_back(self.alloc(key, template.clone(), false));
        }
        self.queues.insert(
            key.to_string(),
            KeyedQueue {
                template,
                inactive,
            },
        );
        log::debug!("Registered pool '{}' with {} instances", key, initial_count);
    }

    pub fn is_registered(&self, key: &str) -> bool {
        self.queues.contains_key(key)
    }

    /// Take an inactive instance (oldest first) or clone a new one from the template
    pub fn acquire(&mut self, key: &str) -> Result<InstanceId, PoolError> {
        let Some(queue) = self.queues.get_mut(key) else {
            log::error!("Pool with key '{}' not found!", key);
            return Err(PoolError::UnknownKey(key.to_string()));
        };

        while let Some(id) = queue.inactive.pop_front() {
            // Skip entries destroyed since they were queued
            if let Some(Some(slot)) = self.slots.get_mut(id.0 as usize) {
                slot.active = true;
                return Ok(id);
            }
        }

        let template = queue.template.clone();
        Ok(self.alloc(key, template, true))
    }

    /// Deactivate an instance and queue it for reuse
    pub fn release(
        &mut self,
        key: &str,
        id: InstanceId,
        reason: ReturnReason,
    ) -> Result<(), PoolError> {
        let Some(queue) = self.queues.get_mut(key) else {
            log::error!("Pool with key '{}' not found! Destroying {:?}", key, id);
            self.destroy(id);
            return Err(PoolError::UnknownKey(key.to_string()));
        };
        let slot = self
            .slots
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(PoolError::UnknownInstance(id))?;
        if !slot.active {
            log::warn!("Ignoring double release of {:?} to '{}'", id, key);
            return Err(PoolError::NotActive(id));
        }

        slot.active = false;
        slot.key = key.to_string();
        queue.inactive.push_back(id);
        self.returned.push(Returned {
            key: key.to_string(),
            id,
            reason,
        });
        Ok(())
    }

    /// Release every active instance to the pool it was acquired from
    pub fn release_all_active(&mut self, reason: ReturnReason) -> usize {
        let active: Vec<(InstanceId, String)> = self
            .iter_active()
            .map(|(id, key, _)| (id, key.to_string()))
            .collect();
        let count = active.len();
        for (id, key) in active {
            let _ = self.release(&key, id, reason);
        }
        count
    }

    /// Remove an instance outright
    pub fn destroy(&mut self, id: InstanceId) {
        if let Some(slot) = self.slots.get_mut(id.0 as usize) {
            *slot = None;
        }
    }

    /// Drain pending return notifications
    pub fn take_returned(&mut self) -> Vec<Returned> {
        std::mem::take(&mut self.returned)
    }

    pub fn is_active(&self, id: InstanceId) -> bool {
        self.slot(id).is_some_and(|s| s.active)
    }

    pub fn key_of(&self, id: InstanceId) -> Option<&str> {
        self.slot(id).map(|s| s.key.as_str())
    }

    pub fn get(&self, id: InstanceId) -> Option<&T> {
        self.slot(id).map(|s| &s.value)
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut T> {
        self.slots
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .map(|s| &mut s.value)
    }

    /// Active instances in id order
    pub fn iter_active(&self) -> impl Iterator<Item = (InstanceId, &str, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.as_ref()
                .filter(|s| s.active)
                .map(|s| (InstanceId(i as u32), s.key.as_str(), &s.value))
        })
    }

    /// Active instances in id order, mutable
    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (InstanceId, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, slot)| {
            slot.as_mut()
                .filter(|s| s.active)
                .map(|s| (InstanceId(i as u32), &mut s.value))
        })
    }

    pub fn active_count(&self) -> usize {
        self.iter_active().count()
    }

    /// Inactive instances waiting under `key`
    pub fn inactive_count(&self, key: &str) -> usize {
        self.queues.get(key).map_or(0, |q| q.inactive.len())
    }

    /// Total live instances (active and inactive)
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, id: InstanceId) -> Option<&Slot<T>> {
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn alloc(&mut self, key: &str, value: T, active: bool) -> InstanceId {
        let id = InstanceId(self.slots.len() as u32);
        self.slots.push(Some(Slot {
            value,
            key: key.to_string(),
            active,
        }));
        id
    }
}
