//! Object pool for per-frame entities (meteors, trail particles, sparkles)
//!
//! Storage is allocated up front to `initial_capacity`, grows one record
//! at a time up to `max_capacity`, and is then reused forever. The slot's
//! `active` flag is the only source of truth for whether a record is live.

mod handle;

pub use handle::{AcquireOutcome, Acquired, ExhaustionPolicy, PoolHandle};

use crate::core::error::{FxError, FxResult};

struct Slot<T> {
    value: T,
    generation: u32,
    active: bool,
    /// Acquisition order, used to find the oldest active slot.
    stamp: u64,
}

pub struct ObjectPool<T> {
    slots: Vec<Slot<T>>,
    /// Inactive slot indices; last released is reused first.
    free: Vec<u32>,
    factory: Box<dyn Fn() -> T>,
    reset: Box<dyn Fn(&mut T)>,
    max_capacity: usize,
    active: usize,
    clock: u64,
    policy: ExhaustionPolicy,
    recycled_total: u64,
}

impl<T> ObjectPool<T> {
    /// `initial_capacity` is clamped to `max_capacity`, which is at least 1.
    pub fn new<F, R>(factory: F, reset: R, initial_capacity: usize, max_capacity: usize) -> Self
    where
        F: Fn() -> T + 'static,
        R: Fn(&mut T) + 'static,
    {
        let max_capacity = max_capacity.max(1);
        let initial = initial_capacity.min(max_capacity);

        let mut slots = Vec::with_capacity(max_capacity);
        for _ in 0..initial {
            slots.push(Slot { value: factory(), generation: 0, active: false, stamp: 0 });
        }
        // Reverse so slot 0 is handed out first.
        let free = (0..initial as u32).rev().collect();

        Self {
            slots,
            free,
            factory: Box::new(factory),
            reset: Box::new(reset),
            max_capacity,
            active: 0,
            clock: 0,
            policy: ExhaustionPolicy::default(),
            recycled_total: 0,
        }
    }

    pub fn with_policy(mut self, policy: ExhaustionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Hand out a reset record. Never exceeds `max_capacity` live records.
    pub fn acquire(&mut self) -> FxResult<Acquired> {
        self.clock += 1;
        let stamp = self.clock;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.active = true;
            slot.stamp = stamp;
            self.active += 1;
            return Ok(Acquired {
                handle: PoolHandle { index, generation: slot.generation },
                outcome: AcquireOutcome::FromFreeList,
            });
        }

        if self.slots.len() < self.max_capacity {
            let index = self.slots.len() as u32;
            self.slots.push(Slot { value: (self.factory)(), generation: 0, active: true, stamp });
            self.active += 1;
            return Ok(Acquired {
                handle: PoolHandle { index, generation: 0 },
                outcome: AcquireOutcome::Grown,
            });
        }

        match self.policy {
            ExhaustionPolicy::Refuse => Err(FxError::PoolExhausted { capacity: self.max_capacity }),
            ExhaustionPolicy::RecycleOldest => {
                let index = self.oldest_active().ok_or(FxError::PoolExhausted {
                    capacity: self.max_capacity,
                })?;
                if self.recycled_total == 0 {
                    fx_warn!("pool full at {} records, recycling oldest", self.max_capacity);
                }
                self.recycled_total += 1;

                let slot = &mut self.slots[index];
                (self.reset)(&mut slot.value);
                slot.generation = slot.generation.wrapping_add(1);
                slot.stamp = stamp;
                Ok(Acquired {
                    handle: PoolHandle { index: index as u32, generation: slot.generation },
                    outcome: AcquireOutcome::RecycledOldest,
                })
            }
        }
    }

    /// Reset the record and return its slot to the free list.
    /// Returns false for a stale handle (already released or recycled).
    pub fn release(&mut self, handle: PoolHandle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index()) else {
            return false;
        };
        if !slot.active || slot.generation != handle.generation {
            return false;
        }
        (self.reset)(&mut slot.value);
        slot.active = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.active -= 1;
        true
    }

    /// Release every active record (effect teardown).
    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.active {
                (self.reset)(&mut slot.value);
                slot.active = false;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
        self.active = 0;
    }

    #[inline]
    pub fn is_live(&self, handle: PoolHandle) -> bool {
        self.slots
            .get(handle.index())
            .map_or(false, |s| s.active && s.generation == handle.generation)
    }

    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        let slot = self.slots.get(handle.index())?;
        (slot.active && slot.generation == handle.generation).then_some(&slot.value)
    }

    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index())?;
        (slot.active && slot.generation == handle.generation).then_some(&mut slot.value)
    }

    pub fn iter_active(&self) -> impl Iterator<Item = (PoolHandle, &T)> + '_ {
        self.slots.iter().enumerate().filter(|(_, s)| s.active).map(|(i, s)| {
            (PoolHandle { index: i as u32, generation: s.generation }, &s.value)
        })
    }

    pub fn for_each_active_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(PoolHandle, &mut T),
    {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.active {
                f(PoolHandle { index: i as u32, generation: slot.generation }, &mut slot.value);
            }
        }
    }

    /// Visit active records; every record for which `keep` returns false is
    /// released in place. No allocation.
    pub fn retain_active<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(PoolHandle, &mut T) -> bool,
    {
        let mut released = 0;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if !slot.active {
                continue;
            }
            let handle = PoolHandle { index: i as u32, generation: slot.generation };
            if !keep(handle, &mut slot.value) {
                (self.reset)(&mut slot.value);
                slot.active = false;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(i as u32);
                released += 1;
            }
        }
        self.active -= released;
        released
    }

    fn oldest_active(&self) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.active)
            .min_by_key(|(_, s)| s.stamp)
            .map(|(i, _)| i)
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.active
    }

    /// Records constructed so far.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    #[inline]
    pub fn recycled_total(&self) -> u64 {
        self.recycled_total
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.active >= self.max_capacity
    }
}

#[cfg(test)]
#[path = "pool/tests.rs"]
mod tests;
