//! Rollups over post records: quartiles per platform and mean likes per
//! group. Groups are reported in the order their key first appears in the
//! input.

use crate::data::Record;
use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

/// Five-number summary of a set of like counts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Quartiles {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl Quartiles {
    pub fn from_values(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::InvalidInput(
                "cannot compute quartiles of an empty set".into(),
            ));
        }
        if values.iter().any(|v| v.is_nan()) {
            return Err(Error::InvalidInput("cannot compute quartiles of NaN".into()));
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Ok(Quartiles {
            min: sorted[0],
            q1: quantile(&sorted, 0.25)?,
            median: quantile(&sorted, 0.5)?,
            q3: quantile(&sorted, 0.75)?,
            max: sorted[sorted.len() - 1],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlatformQuartiles {
    pub platform: String,
    #[serde(flatten)]
    pub quartiles: Quartiles,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlatformPostTypeAverage {
    pub platform: String,
    pub post_type: String,
    pub avg_likes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DateAverage {
    pub date: NaiveDate,
    pub avg_likes: f64,
}

/// Linear-interpolation quantile of already sorted data.
/// Index is `p * (n - 1)`, interpolated between floor and ceil.
pub fn quantile(sorted_data: &[f64], p: f64) -> Result<f64> {
    let n = sorted_data.len();
    if n == 0 {
        return Err(Error::InvalidInput(
            "cannot compute a quantile of an empty set".into(),
        ));
    }
    if p.is_nan() {
        return Err(Error::InvalidInput("quantile probability is NaN".into()));
    }
    if n == 1 {
        return Ok(sorted_data[0]);
    }

    let rank = p.clamp(0.0, 1.0) * (n - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = rank.ceil() as usize;

    if lower_idx == upper_idx {
        Ok(sorted_data[lower_idx])
    } else {
        let weight = rank - lower_idx as f64;
        Ok(sorted_data[lower_idx] * (1.0 - weight) + sorted_data[upper_idx] * weight)
    }
}

/// Quartiles of the `likes` of the given records
pub fn quartiles<'a, I>(records: I) -> Result<Quartiles>
where
    I: IntoIterator<Item = &'a Record>,
{
    let values: Vec<f64> = records.into_iter().map(|r| r.likes as f64).collect();
    Quartiles::from_values(&values)
}

/// Mean likes; `None` for an empty slice
pub fn mean_likes(records: &[&Record]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let sum: u128 = records.iter().map(|r| r.likes as u128).sum();
    Some(sum as f64 / records.len() as f64)
}

/// Group records by key, preserving first-occurrence order of keys
pub fn group_by<'a, K, I, F>(records: I, key: F) -> Vec<(K, Vec<&'a Record>)>
where
    I: IntoIterator<Item = &'a Record>,
    K: Eq + Hash + Clone,
    F: Fn(&Record) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&'a Record>)> = Vec::new();

    for record in records {
        let k = key(record);
        match index.get(&k) {
            Some(&i) => groups[i].1.push(record),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![record]));
            }
        }
    }

    groups
}

/// Mean likes per group
pub fn group_average<'a, K, I, F>(records: I, key: F) -> Vec<(K, f64)>
where
    I: IntoIterator<Item = &'a Record>,
    K: Eq + Hash + Clone,
    F: Fn(&Record) -> K,
{
    group_by(records, key)
        .into_iter()
        .filter_map(|(k, members)| mean_likes(&members).map(|avg| (k, avg)))
        .collect()
}

/// Two-level rollup: outer keys in first-occurrence order, inner keys in
/// first-occurrence order within each outer group.
pub fn group_average2<'a, K1, K2, I, F1, F2>(
    records: I,
    outer: F1,
    inner: F2,
) -> Vec<(K1, K2, f64)>
where
    I: IntoIterator<Item = &'a Record>,
    K1: Eq + Hash + Clone,
    K2: Eq + Hash + Clone,
    F1: Fn(&Record) -> K1,
    F2: Fn(&Record) -> K2,
{
    let mut out = Vec::new();
    for (k1, members) in group_by(records, outer) {
        for (k2, avg) in group_average(members, &inner) {
            out.push((k1.clone(), k2, avg));
        }
    }
    out
}

pub fn quartiles_by_platform(records: &[Record]) -> Result<Vec<PlatformQuartiles>> {
    group_by(records, |r| r.platform.clone())
        .into_iter()
        .map(|(platform, members)| {
            Ok(PlatformQuartiles {
                platform,
                quartiles: quartiles(members)?,
            })
        })
        .collect()
}

pub fn average_by_platform_post_type(records: &[Record]) -> Vec<PlatformPostTypeAverage> {
    group_average2(records, |r| r.platform.clone(), |r| r.post_type.clone())
        .into_iter()
        .map(|(platform, post_type, avg_likes)| PlatformPostTypeAverage {
            platform,
            post_type,
            avg_likes,
        })
        .collect()
}

/// Mean likes per date, sorted chronologically
pub fn average_by_date(records: &[Record]) -> Vec<DateAverage> {
    let mut out: Vec<DateAverage> = group_average(records, |r| r.date)
        .into_iter()
        .map(|(date, avg_likes)| DateAverage { date, avg_likes })
        .collect();
    out.sort_by_key(|d| d.date);
    out
}
