use std::{collections::BTreeMap, fmt};

use itertools::{Itertools, MinMaxResult};
use tracing::debug;

use crate::results::{Implementation, Pattern};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchmarkPoint {
    pub cpu_time: f64,
    pub enlarge_step: f64,
}

/// One series per implementation, points in run order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SeriesSet(BTreeMap<Implementation, Vec<BenchmarkPoint>>);

impl SeriesSet {
    pub fn get(&self, implementation: Implementation) -> Option<&[BenchmarkPoint]> {
        self.0.get(&implementation).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Implementation, &[BenchmarkPoint])> {
        self.0.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn max_cpu_time(&self) -> Option<f64> {
        self.0
            .values()
            .flatten()
            .map(|p| p.cpu_time)
            .reduce(f64::max)
    }
}

pub fn load_pattern(pattern: &Pattern) -> SeriesSet {
    let series = Implementation::ALL
        .into_iter()
        .map(|implementation| {
            let points = pattern
                .runs
                .iter()
                .map(|run| BenchmarkPoint {
                    cpu_time: run.measurement(implementation).duration_nsec_per_item,
                    enlarge_step: run.enlarge_step,
                })
                .collect::<Vec<_>>();
            debug!(
                "{}: {} points for {implementation}",
                pattern.name,
                points.len()
            );
            (implementation, points)
        })
        .collect();
    SeriesSet(series)
}

/// Range of `num_items` over the runs of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemCountSummary {
    pub min: u64,
    pub max: u64,
}

impl ItemCountSummary {
    pub fn of(pattern: &Pattern) -> Option<Self> {
        match pattern.runs.iter().map(|run| run.num_items).minmax() {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(n) => Some(ItemCountSummary { min: n, max: n }),
            MinMaxResult::MinMax(min, max) => Some(ItemCountSummary { min, max }),
        }
    }

    pub fn is_uniform(&self) -> bool {
        self.min == self.max
    }
}

impl fmt::Display for ItemCountSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_uniform() {
            write!(f, "{}", self.min)
        } else {
            write!(f, "[{}-{}]", self.min, self.max)
        }
    }
}
