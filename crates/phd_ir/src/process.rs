//! Process definitions: the `always_comb`/`always_ff` blocks a module lowers to.

use crate::ids::SignalId;
use crate::stmt::Stmt;
use serde::{Deserialize, Serialize};

/// A clock/reset edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    /// Rising edge (0→1), `.posedge`.
    Posedge,
    /// Falling edge (1→0), `.negedge`.
    Negedge,
}

/// A signal with its associated edge, e.g. `clk.posedge` or `rst_n.negedge`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EdgeSensitivity {
    /// The signal being monitored.
    pub signal: SignalId,
    /// The edge to trigger on.
    pub edge: Edge,
}

/// The classification of a process: combinational, or sequential under a
/// specific clock edge with an optional async reset edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProcessKind {
    /// Lowers to `always_comb`.
    Combinational,
    /// Lowers to `always_ff @(<clock> [or <reset>])`.
    Sequential {
        /// The clock edge, in source order first.
        clock: EdgeSensitivity,
        /// An optional async reset edge.
        reset: Option<EdgeSensitivity>,
    },
}

/// One emitted `always_comb`/`always_ff` block.
///
/// A module has at most one [`ProcessKind::Combinational`] process (all
/// combinational assignments collected into it in source order) and one
/// process per distinct `(clock, reset)` edge tuple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Process {
    /// Combinational, or sequential under a specific edge tuple.
    pub kind: ProcessKind,
    /// The statements assigned to this process, in source order.
    pub body: Vec<Stmt>,
}

impl Process {
    /// Returns `true` if this sequential process's edge tuple matches
    /// `clock`/`reset`, so assignments under it belong in the same block.
    pub fn matches_edges(&self, clock: EdgeSensitivity, reset: Option<EdgeSensitivity>) -> bool {
        match &self.kind {
            ProcessKind::Combinational => false,
            ProcessKind::Sequential { clock: c, reset: r } => {
                edges_eq(*c, clock) && options_edges_eq(*r, reset)
            }
        }
    }
}

fn edges_eq(a: EdgeSensitivity, b: EdgeSensitivity) -> bool {
    a.signal == b.signal && a.edge == b.edge
}

fn options_edges_eq(a: Option<EdgeSensitivity>, b: Option<EdgeSensitivity>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => edges_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}
