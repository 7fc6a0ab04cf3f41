use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::catalog::CatalogRow;

/// A dataset partition. Allocation always processes splits in the order
/// `Train`, `Valid`, `Test`, regardless of how the caller ordered them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Valid,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Valid, Split::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Valid => "valid",
            Split::Test => "test",
        }
    }

    /// Manifest file name for this split, e.g. `train.json`.
    pub fn json_file(&self) -> &'static str {
        match self {
            Split::Train => "train.json",
            Split::Valid => "valid.json",
            Split::Test => "test.json",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(Split::Train),
            "valid" => Ok(Split::Valid),
            "test" => Ok(Split::Test),
            other => Err(format!("unknown split '{other}', expected train, valid or test")),
        }
    }
}

/// Groups catalog row indices into maximal contiguous runs sharing a session
/// prefix. Contiguity is assumed, not verified: a catalog not sorted by
/// session yields fragmented groups.
pub fn session_groups(catalog: &[CatalogRow]) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut current_prefix: Option<&str> = None;

    for (i, row) in catalog.iter().enumerate() {
        let prefix = row.session_prefix();
        match current_prefix {
            Some(p) if p == prefix => current.push(i),
            _ => {
                if !current.is_empty() {
                    groups.push(std::mem::take(&mut current));
                }
                current_prefix = Some(prefix);
                current.push(i);
            }
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

/// Allocates each session group's indices across the requested splits.
///
/// Ratios are positionally aligned with `splits`; a split whose position has
/// no ratio silently allocates zero rows. Per group: `train` takes a shuffled
/// `floor(group_size * ratio / ratio_sum)` slice; `valid` does the same when
/// `test` is requested, otherwise it takes the whole remaining pool
/// unshuffled; `test` absorbs whatever remains. One RNG is seeded per run and
/// consumed split-major then group-minor, so iteration order is part of the
/// reproducibility contract.
pub fn split_sets(
    catalog: &[CatalogRow],
    splits: &[Split],
    split_ratio: &[u32],
    seed: u64,
) -> HashMap<Split, Vec<usize>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pools = session_groups(catalog);
    let group_sizes: Vec<usize> = pools.iter().map(Vec::len).collect();
    let ratio_sum: u64 = split_ratio.iter().map(|&r| u64::from(r)).sum();

    let quota = |group_size: usize, ratio: u32| -> usize {
        if ratio_sum == 0 {
            return 0;
        }
        ((group_size as u64 * u64::from(ratio)) / ratio_sum) as usize
    };

    let mut assignment: HashMap<Split, Vec<usize>> = HashMap::new();
    for split in Split::ALL {
        if !splits.contains(&split) {
            continue;
        }
        let ratio = splits
            .iter()
            .position(|s| *s == split)
            .and_then(|i| split_ratio.get(i).copied())
            .unwrap_or(0);

        let assigned = assignment.entry(split).or_default();
        for (pool, &group_size) in pools.iter_mut().zip(&group_sizes) {
            match split {
                Split::Train => {
                    pool.shuffle(&mut rng);
                    let n = quota(group_size, ratio);
                    assigned.extend(pool.drain(0..n.min(pool.len())));
                }
                Split::Valid => {
                    if splits.contains(&Split::Test) {
                        pool.shuffle(&mut rng);
                        let n = quota(group_size, ratio);
                        assigned.extend(pool.drain(0..n.min(pool.len())));
                    } else {
                        assigned.extend(pool.drain(..));
                    }
                }
                Split::Test => {
                    assigned.extend(pool.drain(..));
                }
            }
        }
    }
    assignment
}
