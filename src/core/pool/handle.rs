/// Ticket for one acquired slot. A handle goes stale the moment its slot
/// is released or recycled, so two live owners can never share a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    pub(super) index: u32,
    pub(super) generation: u32,
}

impl PoolHandle {
    #[inline]
    pub fn index(&self) -> usize {
        self.index as usize
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// How `acquire` satisfied the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// Took a constructed, inactive slot off the free list.
    FromFreeList,
    /// Constructed a new record (below max capacity).
    Grown,
    /// Pool was full: the least recently acquired active slot was reset
    /// and handed out; its previous handle is now stale.
    RecycledOldest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Acquired {
    pub handle: PoolHandle,
    pub outcome: AcquireOutcome,
}

/// Behaviour once `max_capacity` records are active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExhaustionPolicy {
    #[default]
    RecycleOldest,
    Refuse,
}
