//! Active filter chips derived from [`TokenParams`]
//!
//! A [`Filter`] is a view of one constraint. The parameters stay the source of
//! truth; chips are recomputed from them and edits go back through
//! [`add_filter`] and [`remove_filter`].

use crate::apply::apply_filter;
use crate::params::TokenParams;
use crate::vocab::{FilterKey, FilterOperator, Shape};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Range {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<f64>,
    },
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// One user-visible active filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub key: FilterKey,
    pub value: FilterValue,
}

impl Filter {
    pub fn new(key: FilterKey, value: FilterValue) -> Self {
        Self { key, value }
    }
}

/// Project `params` into chips: one per array element, one per populated
/// range bound (a single equality chip when both bounds are equal), one per
/// scalar.
pub fn active_filters(params: &TokenParams) -> Vec<Filter> {
    let mut filters = Vec::new();

    for key in FilterKey::ALL {
        match key.shape() {
            Shape::Array => {
                for value in params.array(key).into_iter().flatten() {
                    filters.push(Filter::new(key, FilterValue::Text(value.clone())));
                }
            }
            Shape::Range => match params.range(key) {
                (Some(from), Some(to)) if from == to => {
                    filters.push(Filter::new(key, FilterValue::Text(from.to_string())));
                }
                (from, to) => {
                    if from.is_some() {
                        filters.push(Filter::new(key, FilterValue::Range { from, to: None }));
                    }
                    if to.is_some() {
                        filters.push(Filter::new(key, FilterValue::Range { from: None, to }));
                    }
                }
            },
            Shape::Scalar => {
                if let Some(text) = scalar_text(params, key) {
                    filters.push(Filter::new(key, FilterValue::Text(text)));
                }
            }
        }
    }

    filters
}

fn scalar_text(params: &TokenParams, key: FilterKey) -> Option<String> {
    match key {
        FilterKey::ProtocolSlug => params.protocol_slug.clone(),
        FilterKey::Project => params.project.clone(),
        FilterKey::Type => params.token_type.map(|t| t.as_str().to_string()),
        FilterKey::ChainId => params.chain_id.map(|id| id.to_string()),
        _ => None,
    }
}

/// Copy of `params` with one more filter.
///
/// Text values follow the `key:value` rules of the applier. A range value sets
/// whichever bounds it carries and is ignored for non-range keys.
pub fn add_filter(params: &TokenParams, key: FilterKey, value: &FilterValue) -> TokenParams {
    let mut next = params.clone();
    match value {
        FilterValue::Text(text) => {
            apply_filter(&mut next, key, FilterOperator::Eq, text);
        }
        FilterValue::Range { from, to } => match next.range_slots(key) {
            Some((from_slot, to_slot)) => {
                if from.is_some() {
                    *from_slot = *from;
                }
                if to.is_some() {
                    *to_slot = *to;
                }
            }
            None => debug!(%key, "range value for non-range key, dropped"),
        },
    }
    next
}

/// Copy of `params` without a filter.
///
/// With no `value` the whole key is cleared. Otherwise only the matching
/// array element or the range bounds carried by `value` are removed.
pub fn remove_filter(
    params: &TokenParams,
    key: FilterKey,
    value: Option<&FilterValue>,
) -> TokenParams {
    let mut next = params.clone();

    if let Some(slot) = next.array_slot(key) {
        *slot = match (value, slot.take()) {
            (Some(FilterValue::Text(text)), Some(existing)) => existing.without(text),
            _ => None,
        };
        return next;
    }

    if let Some((from_slot, to_slot)) = next.range_slots(key) {
        match value {
            Some(FilterValue::Range { from, to }) => {
                if from.is_some() {
                    *from_slot = None;
                }
                if to.is_some() {
                    *to_slot = None;
                }
            }
            _ => {
                *from_slot = None;
                *to_slot = None;
            }
        }
        return next;
    }

    match key {
        FilterKey::ProtocolSlug => next.protocol_slug = None,
        FilterKey::Project => next.project = None,
        FilterKey::Type => next.token_type = None,
        FilterKey::ChainId => next.chain_id = None,
        _ => {}
    }
    next
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::params::{MultiValue, TokenType};
    use crate::parser::parse_filter_query;

    fn text(key: FilterKey, value: &str) -> Filter {
        Filter::new(key, FilterValue::from(value))
    }

    #[test]
    fn test_projection() {
        let params =
            parse_filter_query("address:0xA address:0xB apy:5 tvl>10 type:defi", &mut ()).unwrap();
        assert_eq!(
            active_filters(&params),
            vec![
                text(FilterKey::Address, "0xA"),
                text(FilterKey::Address, "0xB"),
                text(FilterKey::Apy, "5"),
                Filter::new(
                    FilterKey::Tvl,
                    FilterValue::Range {
                        from: Some(10.0),
                        to: None
                    }
                ),
                text(FilterKey::Type, "defi"),
                text(FilterKey::ChainId, "1"),
            ]
        );
    }

    #[test]
    fn test_projection_split_bounds() {
        let params = parse_filter_query("apy>3 apy<9", &mut ()).unwrap();
        let chips: Vec<_> = active_filters(&params)
            .into_iter()
            .filter(|f| f.key == FilterKey::Apy)
            .collect();
        assert_eq!(chips.len(), 2);
        assert_eq!(
            chips[1].value,
            FilterValue::Range {
                from: None,
                to: Some(9.0)
            }
        );
    }

    #[test]
    fn test_add_does_not_mutate_input() {
        let params = TokenParams::default();
        let next = add_filter(&params, FilterKey::Address, &"0xA".into());
        assert!(params.is_empty());
        assert_eq!(next.address, Some(MultiValue::from("0xA")));
        let next = add_filter(&next, FilterKey::Address, &"0xB".into());
        assert_eq!(next.address.unwrap().len(), 2);
    }

    #[test]
    fn test_add_range_destructures() {
        let range = FilterValue::Range {
            from: Some(1.0),
            to: Some(4.0),
        };
        let next = add_filter(&TokenParams::default(), FilterKey::Tvl, &range);
        assert_eq!((next.tvl_from, next.tvl_to), (Some(1.0), Some(4.0)));

        let lower = FilterValue::Range {
            from: Some(2.0),
            to: None,
        };
        let next = add_filter(&next, FilterKey::Tvl, &lower);
        assert_eq!((next.tvl_from, next.tvl_to), (Some(2.0), Some(4.0)));

        let ignored = add_filter(&TokenParams::default(), FilterKey::Project, &range);
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_add_text_is_validated() {
        let next = add_filter(&TokenParams::default(), FilterKey::Type, &"stable".into());
        assert_eq!(next.token_type, None);
        let next = add_filter(&next, FilterKey::Apy, &"7".into());
        assert_eq!((next.apy_from, next.apy_to), (Some(7.0), Some(7.0)));
    }

    #[test]
    fn test_remove_array_element() {
        let params = parse_filter_query("address:0xA address:0xB", &mut ()).unwrap();
        let next = remove_filter(&params, FilterKey::Address, Some(&"0xA".into()));
        assert_eq!(next.address, Some(MultiValue::from("0xB")));
        let next = remove_filter(&next, FilterKey::Address, Some(&"0xB".into()));
        assert_eq!(next.address, None);
    }

    #[test]
    fn test_remove_range_bound() {
        let params = parse_filter_query("apy>3 apy<9", &mut ()).unwrap();
        let upper = FilterValue::Range {
            from: None,
            to: Some(9.0),
        };
        let next = remove_filter(&params, FilterKey::Apy, Some(&upper));
        assert_eq!((next.apy_from, next.apy_to), (Some(3.0), None));
        let next = remove_filter(&params, FilterKey::Apy, None);
        assert_eq!((next.apy_from, next.apy_to), (None, None));
    }

    #[test]
    fn test_remove_scalar() {
        let params = parse_filter_query("type:base chainId:10", &mut ()).unwrap();
        assert_eq!(params.token_type, Some(TokenType::Base));
        let next = remove_filter(&params, FilterKey::Type, None);
        assert_eq!(next.token_type, None);
        assert_eq!(next.chain_id, Some(10));
    }

    #[test]
    fn test_filter_json_shape() {
        let chip = Filter::new(
            FilterKey::Apy,
            FilterValue::Range {
                from: Some(3.0),
                to: None,
            },
        );
        assert_eq!(
            serde_json::to_value(&chip).unwrap(),
            serde_json::json!({"key": "apy", "value": {"from": 3.0}})
        );
        let parsed: Filter =
            serde_json::from_str(r#"{"key": "underlyingTokens", "value": "0xA"}"#).unwrap();
        assert_eq!(parsed, text(FilterKey::UnderlyingTokens, "0xA"));
    }
}
