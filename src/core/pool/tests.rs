use super::*;
use crate::core::random::FastRandom;

#[derive(Debug, Default, Clone, PartialEq)]
struct Record {
    active: bool,
    life: f32,
}

fn record_pool(initial: usize, max: usize) -> ObjectPool<Record> {
    ObjectPool::new(Record::default, |r: &mut Record| *r = Record::default(), initial, max)
}

#[test]
fn six_acquires_then_seventh_recycles_oldest() {
    let mut pool = record_pool(4, 6);
    assert_eq!(pool.capacity(), 4);

    let mut handles = Vec::new();
    for i in 0..6 {
        let acquired = pool.acquire().unwrap();
        let rec = pool.get_mut(acquired.handle).unwrap();
        rec.active = true;
        rec.life = i as f32;
        handles.push(acquired.handle);
    }
    let distinct: std::collections::HashSet<_> = handles.iter().map(|h| h.index()).collect();
    assert_eq!(distinct.len(), 6);
    assert_eq!(pool.capacity(), 6);
    assert!(pool.is_full());

    let seventh = pool.acquire().unwrap();
    assert_eq!(seventh.outcome, AcquireOutcome::RecycledOldest);
    assert_eq!(seventh.handle.index(), handles[0].index());
    // Recycled record comes back reset, first owner's handle is stale.
    assert_eq!(pool.get(seventh.handle), Some(&Record::default()));
    assert!(pool.get(handles[0]).is_none());
    assert_eq!(pool.capacity(), 6);
    assert_eq!(pool.active_count(), 6);
    assert_eq!(pool.recycled_total(), 1);
}

#[test]
fn refuse_policy_reports_exhaustion() {
    let mut pool = record_pool(1, 2).with_policy(ExhaustionPolicy::Refuse);
    pool.acquire().unwrap();
    pool.acquire().unwrap();
    assert_eq!(pool.acquire(), Err(FxError::PoolExhausted { capacity: 2 }));
    assert_eq!(pool.active_count(), 2);
}

#[test]
fn consecutive_acquires_never_alias() {
    let mut pool = record_pool(2, 8);
    let a = pool.acquire().unwrap().handle;
    let b = pool.acquire().unwrap().handle;
    assert_ne!(a.index(), b.index());
}

#[test]
fn release_resets_and_reuses_slot_with_new_generation() {
    let mut pool = record_pool(2, 2);
    let a = pool.acquire().unwrap().handle;
    pool.get_mut(a).unwrap().life = 9.0;

    assert!(pool.release(a));
    assert!(!pool.release(a), "double release must be rejected");
    assert!(pool.get(a).is_none());

    let again = pool.acquire().unwrap();
    assert_eq!(again.outcome, AcquireOutcome::FromFreeList);
    assert_eq!(again.handle.index(), a.index());
    assert_ne!(again.handle.generation(), a.generation());
    assert_eq!(pool.get(again.handle).unwrap().life, 0.0);
}

#[test]
fn grows_past_initial_capacity_up_to_max() {
    let mut pool = record_pool(0, 3);
    assert_eq!(pool.capacity(), 0);
    let outcomes: Vec<_> = (0..3).map(|_| pool.acquire().unwrap().outcome).collect();
    assert!(outcomes.iter().all(|o| *o == AcquireOutcome::Grown));
    assert_eq!(pool.capacity(), 3);
}

#[test]
fn active_count_never_exceeds_max_under_random_traffic() {
    let mut pool = record_pool(3, 10);
    let mut rng = FastRandom::new(1234);
    let mut held: Vec<PoolHandle> = Vec::new();

    for _ in 0..5_000 {
        if rng.chance(0.6) {
            let acquired = pool.acquire().unwrap();
            if acquired.outcome == AcquireOutcome::RecycledOldest {
                held.retain(|h| pool.is_live(*h));
            }
            held.push(acquired.handle);
        } else if !held.is_empty() {
            let h = held.swap_remove(rng.index(held.len()));
            assert!(pool.release(h));
        }
        assert!(pool.active_count() <= pool.max_capacity());
        assert_eq!(pool.active_count(), held.len());
    }
}

#[test]
fn retain_active_releases_finished_records() {
    let mut pool = record_pool(4, 4);
    for i in 0..4 {
        let h = pool.acquire().unwrap().handle;
        pool.get_mut(h).unwrap().life = i as f32;
    }
    let released = pool.retain_active(|_, r| r.life < 2.0);
    assert_eq!(released, 2);
    assert_eq!(pool.active_count(), 2);
    assert!(pool.iter_active().all(|(_, r)| r.life < 2.0));
}

#[test]
fn clear_releases_everything() {
    let mut pool = record_pool(2, 5);
    let handles: Vec<_> = (0..5).map(|_| pool.acquire().unwrap().handle).collect();
    pool.clear();
    assert_eq!(pool.active_count(), 0);
    assert!(handles.iter().all(|h| pool.get(*h).is_none()));
    // Everything is reusable without growing.
    for _ in 0..5 {
        assert_eq!(pool.acquire().unwrap().outcome, AcquireOutcome::FromFreeList);
    }
}
