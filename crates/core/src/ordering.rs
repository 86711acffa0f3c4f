//! Index-preserving reassembly of store rows fetched by id.
//!
//! Batched `id = ANY($1)` queries return rows in arbitrary order. Search hits
//! and foreign-key lists carry a meaningful order, so results are put back in
//! the order of the driving id list.

use std::collections::HashMap;

use crate::types::DbId;

/// Reorder `items` to follow `ids`.
///
/// Ids with no matching item are returned in the second vector (in driving
/// order) so callers can log stale references. Duplicate ids yield the item
/// once, at its first position.
pub fn order_by_ids<T>(
    ids: &[DbId],
    items: Vec<T>,
    id_of: impl Fn(&T) -> DbId,
) -> (Vec<T>, Vec<DbId>) {
    let mut by_id: HashMap<DbId, T> = items.into_iter().map(|i| (id_of(&i), i)).collect();
    let mut ordered = Vec::with_capacity(ids.len());
    let mut missing = Vec::new();

    for id in ids {
        match by_id.remove(id) {
            Some(item) => ordered.push(item),
            None if ordered.iter().any(|i| id_of(i) == *id) => {}
            None => missing.push(*id),
        }
    }

    (ordered, missing)
}
