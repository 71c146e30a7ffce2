//! String parameter filters partition the cache, with case and locale
//! normalization applied consistently on every node.
//!
//! Each requested value is classified with the local filter model first: values
//! the filter does not allow must be rejected everywhere, values falling
//! into a partition already fetched must hit everywhere, and values opening
//! a new partition must go through a full miss-then-hit cycle.

use std::collections::HashSet;

use tracing::info;

use super::setup::truncate_everywhere;
use crate::cluster::{ConsistencyChecker, TruncatePolicy};
use crate::config::keys::{MANUAL_TRUNCATE_ON_CHANGE, PARAMETER_FILTER};
use crate::config::ConfigSchema;
use crate::error::HarnessError;
use crate::harness::Harness;
use crate::http::Transport;
use crate::rest::resources::{
    find_parameter_filter, parameter_filter_normalization, AddParameterFilter, CaseNormalization,
    Normalization, RemoveParameterFilters, ReplaceParameterFilter, StringParameterFilter,
};
use crate::wmts::TileRequest;

const GRIDSET: &str = "EPSG:4326";
const KEY: &str = "FOO";
const DEFAULT_VALUE: &str = "defaultFoo";
const PARAMETER: &str = "foo";
/// Filters the server adds to every layer.
const BUILT_IN_FILTERS: [&str; 1] = ["STYLES"];

pub(super) fn schema() -> ConfigSchema {
    ConfigSchema::new().entry(PARAMETER_FILTER, MANUAL_TRUNCATE_ON_CHANGE, "false")
}

fn case_sensitive() -> StringParameterFilter {
    StringParameterFilter::new(KEY, DEFAULT_VALUE, ["a", "b", "c", "A"])
}

fn upper_english() -> StringParameterFilter {
    StringParameterFilter::new(KEY, DEFAULT_VALUE, ["a", "b", "c"])
        .with_normalization(CaseNormalization::Upper, "en")
}

fn lower_turkish() -> StringParameterFilter {
    StringParameterFilter::new(KEY, DEFAULT_VALUE, ["i", "ı", "c"])
        .with_normalization(CaseNormalization::Lower, "tr")
}

/// Tracks which partitions of the current filter hold cached tiles.
struct PartitionTracker<'c, 'a, T: Transport> {
    checker: &'c ConsistencyChecker<'a, T>,
    filter: StringParameterFilter,
    first_key: TileRequest,
    second_key: TileRequest,
    cached: HashSet<String>,
}

impl<'c, 'a, T: Transport> PartitionTracker<'c, 'a, T> {
    fn new(checker: &'c ConsistencyChecker<'a, T>, layer: &str, filter: StringParameterFilter) -> Self {
        let first_key = TileRequest::new(layer, GRIDSET, "image/png", 2, 1, 2);
        let second_key = first_key.at(2, 2, 3);
        Self {
            checker,
            filter,
            first_key,
            second_key,
            cached: HashSet::new(),
        }
    }

    /// Requests both keys with `value` for the parameter, or without it.
    fn request(&mut self, value: Option<&str>) -> Result<(), HarnessError> {
        let keys = match value {
            Some(v) => (
                self.first_key.clone().with_parameter(PARAMETER, v),
                self.second_key.clone().with_parameter(PARAMETER, v),
            ),
            None => (self.first_key.clone(), self.second_key.clone()),
        };

        match self.filter.partition(value) {
            None => {
                info!(value, "Value not allowed by filter");
                self.checker.expect_rejected_everywhere(&keys.0)?;
            }
            Some(partition) if self.cached.contains(&partition) => {
                info!(value, partition = %partition, "Value shares a cached partition");
                self.checker.expect_hit_everywhere(&keys.0, None)?;
                self.checker.expect_hit_everywhere(&keys.1, None)?;
            }
            Some(partition) => {
                info!(value, partition = %partition, "Value opens a new partition");
                self.checker.coherence_cycle(&keys.0, &keys.1, None)?;
                self.cached.insert(partition);
            }
        }
        Ok(())
    }
}

fn verify_filter<T: Transport>(
    harness: &Harness<T>,
    expected: Option<&Normalization>,
) -> Result<(), HarnessError> {
    let description = match expected {
        Some(n) => format!("parameter filter {} normalizing {} in {}", KEY, n.case, n.locale),
        None => format!("parameter filter {}", KEY),
    };
    harness.checker().verify_everywhere(
        |node| harness.layer_uri(node),
        |layer| {
            find_parameter_filter(layer, KEY).is_some_and(|f| f.name == "stringParameterFilter")
                && parameter_filter_normalization(layer, KEY).as_ref() == expected
        },
        &description,
    )?;
    Ok(())
}

/// Replaces the filter through the first node and waits for every node to
/// report it.
fn replace_filter<T: Transport>(
    harness: &Harness<T>,
    policy: TruncatePolicy,
    filter: &StringParameterFilter,
) -> Result<(), HarnessError> {
    let first = harness.cluster().first();
    harness
        .rest()
        .update(&harness.layer_uri(first), ReplaceParameterFilter(filter.clone()))?;
    verify_filter(harness, filter.normalize.as_ref())?;
    harness.checker().after_invalidation(policy, harness.layer())?;
    Ok(())
}

pub(super) fn run<T: Transport>(harness: &Harness<T>) -> Result<(), HarnessError> {
    let policy = TruncatePolicy::from_manual_flag(
        harness
            .config()
            .get_bool(PARAMETER_FILTER, MANUAL_TRUNCATE_ON_CHANGE)?,
    );
    let checker = harness.checker();
    let first = harness.cluster().first();

    truncate_everywhere(harness)?;
    harness.rest().update_on_all(
        harness.cluster(),
        |node| harness.layer_uri(node),
        RemoveParameterFilters::keeping(BUILT_IN_FILTERS),
    )?;

    info!(key = KEY, "Adding case sensitive parameter filter");
    harness
        .rest()
        .update(&harness.layer_uri(first), AddParameterFilter(case_sensitive()))?;
    verify_filter(harness, None)?;

    let mut tracker = PartitionTracker::new(&checker, harness.layer(), case_sensitive());
    tracker.request(None)?;
    tracker.request(Some("a"))?;
    tracker.request(Some("b"))?;
    tracker.request(Some("X"))?;
    tracker.request(Some("A"))?;

    info!(key = KEY, "Switching to upper case normalization in en");
    replace_filter(harness, policy, &upper_english())?;
    let mut tracker = PartitionTracker::new(&checker, harness.layer(), upper_english());
    tracker.request(None)?;
    tracker.request(Some("a"))?;
    tracker.request(Some("A"))?;

    info!(key = KEY, "Switching to lower case normalization in tr");
    replace_filter(harness, policy, &lower_turkish())?;
    let mut tracker = PartitionTracker::new(&checker, harness.layer(), lower_turkish());
    tracker.request(None)?;
    tracker.request(Some("i"))?;
    tracker.request(Some("İ"))?;
    tracker.request(Some("I"))?;
    tracker.request(Some("ı"))?;

    info!(key = KEY, "Restoring upper case normalization in en");
    replace_filter(harness, policy, &upper_english())?;
    Ok(())
}
