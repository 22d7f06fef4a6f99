//! Randomized operation sequences against the store's idempotence and
//! duplicate-delivery guarantees.

use campusboard::engine::{CollectionStore, Keyed};
use proptest::prelude::*;
use uuid::Uuid;

/// Minimal keyed entity; the store is generic over anything with an ID.
#[derive(Debug, Clone, PartialEq)]
struct Entry {
    id: Uuid,
    label: u8,
}

impl Keyed for Entry {
    fn key(&self) -> Uuid {
        self.id
    }
}

/// Store operation over a small pool of entity slots, so sequences actually
/// collide on the same IDs.
#[derive(Debug, Clone)]
enum Op {
    Insert(usize, u8),
    Append(usize, u8),
    Replace(usize, u8),
    Remove(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..8usize, any::<u8>()).prop_map(|(slot, label)| Op::Insert(slot, label)),
        (0..8usize, any::<u8>()).prop_map(|(slot, label)| Op::Append(slot, label)),
        (0..8usize, any::<u8>()).prop_map(|(slot, label)| Op::Replace(slot, label)),
        (0..8usize).prop_map(Op::Remove),
    ]
}

fn run(store: &mut CollectionStore<Entry>, ids: &[Uuid], op: &Op) {
    match *op {
        Op::Insert(slot, label) => {
            store.insert_at_head(Entry {
                id: ids[slot],
                label,
            });
        }
        Op::Append(slot, label) => {
            store.append(Entry {
                id: ids[slot],
                label,
            });
        }
        Op::Replace(slot, label) => {
            store.replace(ids[slot], |entry| entry.label = label);
        }
        Op::Remove(slot) => {
            store.remove(ids[slot]);
        }
    }
}

fn snapshot(store: &CollectionStore<Entry>) -> Vec<Entry> {
    store.iter().cloned().collect()
}

proptest! {
    /// No operation sequence ever produces two entries with the same ID.
    #[test]
    fn ids_stay_unique(ops in prop::collection::vec(op(), 0..64)) {
        let ids: Vec<Uuid> = (0..8).map(|_| Uuid::new_v4()).collect();
        let mut store = CollectionStore::new();
        for operation in &ops {
            run(&mut store, &ids, operation);
            let mut seen = std::collections::HashSet::new();
            for entry in store.iter() {
                prop_assert!(seen.insert(entry.id));
            }
        }
    }

    /// Redelivering any single operation immediately is a no-op.
    #[test]
    fn duplicate_delivery_is_noop(ops in prop::collection::vec(op(), 1..32)) {
        let ids: Vec<Uuid> = (0..8).map(|_| Uuid::new_v4()).collect();
        let mut once = CollectionStore::new();
        let mut twice = CollectionStore::new();
        for operation in &ops {
            run(&mut once, &ids, operation);
            run(&mut twice, &ids, operation);
            run(&mut twice, &ids, operation);
            prop_assert_eq!(snapshot(&once), snapshot(&twice));
        }
    }

    /// Once removed, an ID never reappears, whatever arrives afterwards.
    #[test]
    fn removal_is_terminal(
        before in prop::collection::vec(op(), 0..16),
        after in prop::collection::vec(op(), 0..16),
        slot in 0..8usize,
    ) {
        let ids: Vec<Uuid> = (0..8).map(|_| Uuid::new_v4()).collect();
        let mut store = CollectionStore::new();
        for operation in &before {
            run(&mut store, &ids, operation);
        }
        store.remove(ids[slot]);
        for operation in &after {
            run(&mut store, &ids, operation);
            prop_assert!(!store.contains(ids[slot]));
        }
    }

    /// A full resync is authoritative: the store afterwards holds exactly
    /// the server list, regardless of what happened before.
    #[test]
    fn replace_all_is_authoritative(
        before in prop::collection::vec(op(), 0..32),
        keep in prop::collection::vec(0..8usize, 0..8),
    ) {
        let ids: Vec<Uuid> = (0..8).map(|_| Uuid::new_v4()).collect();
        let mut store = CollectionStore::new();
        for operation in &before {
            run(&mut store, &ids, operation);
        }

        let mut fresh = Vec::new();
        let mut used = std::collections::HashSet::new();
        for slot in keep {
            if used.insert(slot) {
                fresh.push(Entry { id: ids[slot], label: 0 });
            }
        }
        store.replace_all(fresh.clone());
        prop_assert_eq!(snapshot(&store), fresh);
    }
}
