//! Block grouping of planned calls.

use crate::{encode::CallKind, types::BalanceQuery};
use std::collections::HashMap;

/// A call queued inside a block group, remembering the input slot it
/// answers.
#[derive(Clone, Debug)]
pub struct PlannedCall {
    /// Index into the originating query slice.
    pub index: usize,
    /// The lowered call.
    pub kind: CallKind,
}

/// Calls that share a target block and travel in one aggregate.
#[derive(Clone, Debug)]
pub struct BlockGroup {
    /// Block number the group executes against.
    pub block: u64,
    /// Member calls, in input order.
    pub calls: Vec<PlannedCall>,
}

/// Block groups in first-seen order.
///
/// Group order and member order both derive from input order, which makes
/// planning deterministic for a given query slice. Request ids are assigned
/// from group positions and the demultiplexer scatters through the recorded
/// indices, so this ordering is load-bearing.
#[derive(Clone, Debug, Default)]
pub struct BlockGroups {
    groups: Vec<BlockGroup>,
}

impl BlockGroups {
    /// Plans a query slice into per-block groups.
    ///
    /// Every query lands in exactly one group, keyed by its raw block
    /// number. Duplicate queries each get their own slot.
    pub fn plan(queries: &[BalanceQuery]) -> Self {
        let mut groups: Vec<BlockGroup> = Vec::new();
        let mut positions: HashMap<u64, usize> = HashMap::new();

        for (index, query) in queries.iter().enumerate() {
            let position = *positions.entry(query.block).or_insert_with(|| {
                groups.push(BlockGroup { block: query.block, calls: Vec::new() });
                groups.len() - 1
            });
            groups[position].calls.push(PlannedCall { index, kind: CallKind::from_query(query) });
        }

        Self { groups }
    }

    /// Number of groups, equal to the number of distinct blocks planned.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True when no queries were planned.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterates groups in first-seen block order.
    pub fn iter(&self) -> impl Iterator<Item = &BlockGroup> {
        self.groups.iter()
    }
}
