//! Ordering policy for reconciled messages.
//!
//! The display order is ascending by `created_at`, with ties kept in
//! first-seen order. The input id sequence encodes that first-seen
//! order: bulk replacement passes ids in arrival order, incremental
//! insertion passes the previous ordering with the new id appended.
//! A stable sort then preserves ties across recomputations.

use std::collections::HashMap;
use std::sync::Arc;

use crate::models::Message;

/// Produce the display ordering for the given ids.
///
/// Ids without a backing message are dropped rather than sorted on a
/// missing key; the caller keeps the id list and the map in lockstep,
/// so this only matters for malformed input.
pub(crate) fn sorted_ids(
    ids: impl IntoIterator<Item = i64>,
    messages_by_id: &HashMap<i64, Arc<Message>>,
) -> Vec<i64> {
    let mut ordered: Vec<i64> = ids
        .into_iter()
        .filter(|id| messages_by_id.contains_key(id))
        .collect();
    ordered.sort_by_key(|id| messages_by_id[id].created_at);
    ordered
}
