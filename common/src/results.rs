use std::{
    collections::HashMap,
    fmt,
    path::Path,
    sync::LazyLock,
};

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::error::{ReportError, Result};

static NUMBERED_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z]+)_([1-9][0-9]*)$").expect("static regex"));

/// The allocators compared by the memory pool benchmark, in chart order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Implementation {
    BoostIntrusivePool,
    PlainMalloc,
}

impl Implementation {
    pub const ALL: [Implementation; 2] =
        [Implementation::BoostIntrusivePool, Implementation::PlainMalloc];

    pub fn name(&self) -> &'static str {
        match self {
            Implementation::BoostIntrusivePool => "boost_intrusive_pool",
            Implementation::PlainMalloc => "plain_malloc",
        }
    }
}

impl fmt::Display for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub duration_nsec_per_item: f64,
    pub duration_nsec: Option<f64>,
    pub num_items_freed: Option<f64>,
    pub max_active_items: Option<f64>,
    pub max_rss: Option<f64>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    #[serde(deserialize_with = "deserialize_count")]
    pub num_items: u64,
    pub enlarge_step: f64,
    pub initial_size: Option<f64>,
    #[serde(alias = "boost_intrusive_pool_item")]
    pub boost_intrusive_pool: Measurement,
    pub plain_malloc: Measurement,
}

impl Run {
    pub fn measurement(&self, implementation: Implementation) -> &Measurement {
        match implementation {
            Implementation::BoostIntrusivePool => &self.boost_intrusive_pool,
            Implementation::PlainMalloc => &self.plain_malloc,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub name: String,
    pub desc: String,
    /// Runs in `run_1, run_2, ...` order.
    pub runs: Vec<Run>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultsDocument {
    pub timing_type: Option<String>,
    /// Patterns in `pattern_1, pattern_2, ...` order.
    pub patterns: Vec<Pattern>,
}

#[derive(Deserialize)]
struct RawDocument {
    timing_type: Option<String>,
    #[serde(flatten)]
    patterns: HashMap<String, RawPattern>,
}

#[derive(Deserialize)]
struct RawPattern {
    #[serde(alias = "type")]
    desc: String,
    #[serde(flatten)]
    runs: HashMap<String, Run>,
}

impl ResultsDocument {
    /// Decodes and validates a whole results file. `path` only labels errors.
    pub fn from_json(bytes: &[u8], path: &Path) -> Result<Self> {
        let raw: RawDocument =
            serde_json::from_slice(bytes).map_err(|err| ReportError::from_json(path, err))?;

        let within = path.display().to_string();
        let patterns = numbered(raw.patterns, "pattern", &within)?
            .into_iter()
            .map(|(name, raw)| {
                let runs = numbered(raw.runs, "run", &name)?
                    .into_iter()
                    .map(|(_, run)| run)
                    .collect();
                Ok(Pattern {
                    name,
                    desc: raw.desc,
                    runs,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ResultsDocument {
            timing_type: raw.timing_type,
            patterns,
        })
    }

    pub fn pattern(&self, name: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.name == name)
    }
}

/// Orders `<prefix>_<n>` entries by `n`, requiring `1..=len` without gaps.
fn numbered<T>(
    entries: HashMap<String, T>,
    prefix: &'static str,
    within: &str,
) -> Result<Vec<(String, T)>> {
    let expected = match prefix {
        "pattern" => "pattern_<n>",
        _ => "run_<n>",
    };
    let mut indexed = entries
        .into_iter()
        .map(|(key, value)| {
            let index = NUMBERED_KEY
                .captures(&key)
                .filter(|caps| &caps[1] == prefix)
                .and_then(|caps| caps[2].parse::<usize>().ok());
            match index {
                Some(index) => Ok((index, key, value)),
                None => Err(ReportError::MalformedKey { key, expected }),
            }
        })
        .collect::<Result<Vec<_>>>()?;
    indexed.sort_unstable_by_key(|(index, _, _)| *index);

    for (position, (index, _, _)) in indexed.iter().enumerate() {
        if *index != position + 1 {
            return Err(ReportError::MissingKey {
                key: format!("{prefix}_{}", position + 1),
                within: within.to_owned(),
            });
        }
    }
    Ok(indexed
        .into_iter()
        .map(|(_, key, value)| (key, value))
        .collect())
}

/// Item counts are written as doubles by the benchmark; accept any integral number.
fn deserialize_count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    struct CountVisitor;

    impl de::Visitor<'_> for CountVisitor {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative integral item count")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<u64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<u64, E> {
            u64::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<u64, E> {
            if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 {
                Ok(v as u64)
            } else {
                Err(E::invalid_value(de::Unexpected::Float(v), &self))
            }
        }
    }

    deserializer.deserialize_any(CountVisitor)
}
