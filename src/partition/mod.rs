//! Two-level work partitioning
//!
//! Trees are spread over distributed workers by a [`PartitionPolicy`] that every
//! worker can evaluate on its own. Inside a worker, a [`LanePlan`] cuts each
//! assigned tree's vertex range into blocks for the lane pool.

mod lanes;

use crate::universe::TreeIndex;
use crate::IstError;
use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

pub use lanes::{LaneBlock, LanePlan};

/// How tree indices are dealt out to workers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionPolicy {
    /// Consecutive slices of `trees / workers`, the first `trees % workers` workers take one more
    #[default]
    Contiguous,
    /// Tree `t` belongs to worker `t mod workers`
    Modulo,
}

impl PartitionPolicy {
    /// Tree indices owned by each worker, indexed by worker id
    pub fn assign(self, trees: usize, workers: usize) -> Vec<Vec<TreeIndex>> {
        let mut owned = vec![Vec::new(); workers];
        if workers == 0 {
            return owned;
        }

        match self {
            PartitionPolicy::Contiguous => {
                let per = trees / workers;
                let rem = trees % workers;
                let mut next = 1;
                for (w, slot) in owned.iter_mut().enumerate() {
                    let size = per + usize::from(w < rem);
                    slot.extend((next..next + size).map(|t| t as TreeIndex));
                    next += size;
                }
            }
            PartitionPolicy::Modulo => {
                for t in 1..=trees {
                    owned[t % workers].push(t as TreeIndex);
                }
            }
        }

        owned
    }

    /// Worker that owns tree `t`, computed without materializing the assignment
    pub fn owner_of(self, t: TreeIndex, trees: usize, workers: usize) -> usize {
        let t = t as usize;
        match self {
            PartitionPolicy::Modulo => t % workers,
            PartitionPolicy::Contiguous => {
                let per = trees / workers;
                let rem = trees % workers;
                let k = t - 1;
                let wide = rem * (per + 1);
                if k < wide {
                    k / (per + 1)
                } else {
                    rem + (k - wide) / per
                }
            }
        }
    }

    /// Lowercase policy name
    pub fn as_str(self) -> &'static str {
        match self {
            PartitionPolicy::Contiguous => "contiguous",
            PartitionPolicy::Modulo => "modulo",
        }
    }
}

impl fmt::Display for PartitionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartitionPolicy {
    type Err = IstError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "contiguous" => Ok(PartitionPolicy::Contiguous),
            "modulo" => Ok(PartitionPolicy::Modulo),
            other => Err(IstError::Usage(format!(
                "unknown partition policy '{}', expected contiguous or modulo",
                other
            ))),
        }
    }
}
