//! Merging a single `key<op>value` filter into [`TokenParams`]
//!
//! Invalid input never fails: a value that does not fit its key is dropped
//! and the parameters are left as they were.

use crate::params::{MultiValue, TokenParams, TokenType};
use crate::vocab::{FilterKey, FilterOperator, Shape};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

// Leading numeric prefixes, matching how browsers read numbers out of free text
// (`parseFloat("5abc") == 5`, `parseInt("137.5") == 137`). ASCII digits only.
static FLOAT_PREFIX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?").ok());
static INT_PREFIX: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+").ok());

/// Read the longest leading decimal number. Non-finite results are rejected.
pub fn parse_float(value: &str) -> Option<f64> {
    let re = FLOAT_PREFIX.as_ref()?;
    let m = re.find(value.trim_start())?;
    m.as_str().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Read the longest leading integer. Values outside `i64` are rejected.
pub fn parse_int(value: &str) -> Option<i64> {
    let re = INT_PREFIX.as_ref()?;
    let m = re.find(value.trim_start())?;
    m.as_str().parse::<i64>().ok()
}

/// Read a whole numeric string as a chain id, truncating a fractional part
/// (`137.0` and `137.9` are both 137). Values outside `i64` are rejected.
pub fn parse_chain_id(value: &str) -> Option<i64> {
    // i64::MAX is not representable; 2^63 is the first value past it
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;

    let value = value.trim();
    if let Ok(id) = value.parse::<i64>() {
        return Some(id);
    }
    let n = value.parse::<f64>().ok().filter(|n| n.is_finite())?.trunc();
    (-LIMIT..LIMIT).contains(&n).then_some(n as i64)
}

/// Apply one filter to `params` in place.
///
/// Returns whether `params` was changed. `false` covers every silently
/// dropped case: disallowed operator, non-numeric range or chain value, or a
/// `type` other than `defi`/`base`.
pub fn apply_filter(
    params: &mut TokenParams,
    key: FilterKey,
    op: FilterOperator,
    value: &str,
) -> bool {
    if !key.accepts(op) {
        debug!(%key, %op, "operator not supported by key, dropped");
        return false;
    }

    let applied = match key.shape() {
        Shape::Array => match params.array_slot(key) {
            Some(slot) => {
                *slot = Some(match slot.take() {
                    Some(mut existing) => {
                        existing.push(value.to_string());
                        existing
                    }
                    None => MultiValue::One(value.to_string()),
                });
                true
            }
            None => false,
        },
        Shape::Range => match (parse_float(value), params.range_slots(key)) {
            (Some(n), Some((from, to))) => {
                match op {
                    FilterOperator::Eq => {
                        *from = Some(n);
                        *to = Some(n);
                    }
                    FilterOperator::Gt => *from = Some(n),
                    FilterOperator::Lt => *to = Some(n),
                }
                true
            }
            _ => false,
        },
        Shape::Scalar => apply_scalar(params, key, value),
    };

    if !applied {
        debug!(%key, %op, value, "filter value rejected, dropped");
    }
    applied
}

fn apply_scalar(params: &mut TokenParams, key: FilterKey, value: &str) -> bool {
    match key {
        FilterKey::Type => match TokenType::parse(value) {
            Some(token_type) => {
                params.token_type = Some(token_type);
                true
            }
            None => false,
        },
        FilterKey::ChainId => match parse_int(value) {
            Some(id) => {
                params.chain_id = Some(id);
                true
            }
            None => false,
        },
        FilterKey::ProtocolSlug => {
            params.protocol_slug = Some(value.to_string());
            true
        }
        FilterKey::Project => {
            params.project = Some(value.to_string());
            true
        }
        _ => false,
    }
}

impl TokenParams {
    /// Builder form of [`apply_filter`].
    pub fn with_filter(mut self, key: FilterKey, op: FilterOperator, value: &str) -> Self {
        apply_filter(&mut self, key, op, value);
        self
    }
}
