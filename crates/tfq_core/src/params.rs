//! The structured filter state exchanged with the token API

use crate::vocab::FilterKey;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Chain assumed by the text query entry point when none is given
pub const DEFAULT_CHAIN_ID: i64 = 1;

/// Value of an array-shaped field.
///
/// A field holding one item may be either variant; the two are equal.
/// Count-sensitive code goes through [`MultiValue::as_slice`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MultiValue {
    One(String),
    Many(Vec<String>),
}

impl MultiValue {
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::One(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.as_slice().iter()
    }

    /// Append, promoting a single value to a sequence. Duplicates are kept.
    pub fn push(&mut self, value: String) {
        match self {
            Self::One(first) => {
                let first = std::mem::take(first);
                *self = Self::Many(vec![first, value]);
            }
            Self::Many(values) => values.push(value),
        }
    }

    /// Remove every occurrence of `value`, returning `None` once nothing is left.
    pub fn without(&self, value: &str) -> Option<Self> {
        let rest: Vec<String> = self.iter().filter(|v| *v != value).cloned().collect();
        match rest.len() {
            0 => None,
            1 => rest.into_iter().next().map(Self::One),
            _ => Some(Self::Many(rest)),
        }
    }
}

impl PartialEq for MultiValue {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl From<&str> for MultiValue {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<Vec<String>> for MultiValue {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

impl<'a> IntoIterator for &'a MultiValue {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Token kind accepted by the `type` filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Defi,
    Base,
}

impl TokenType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Defi => "defi",
            Self::Base => "base",
        }
    }

    /// Exact, case-sensitive match on `defi` or `base`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "defi" => Some(Self::Defi),
            "base" => Some(Self::Base),
            _ => None,
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// An empty array constrains nothing and is read as an unset field.
fn non_empty<'de, D>(deserializer: D) -> Result<Option<MultiValue>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<MultiValue>::deserialize(deserializer)?.filter(|v| !v.is_empty()))
}

fn is_unset(value: &Option<MultiValue>) -> bool {
    value.as_ref().is_none_or(MultiValue::is_empty)
}

/// Structured filter state. A `None` field leaves that dimension unconstrained.
///
/// Range filters are flattened into independent `*_from`/`*_to` fields. An
/// empty array field is equivalent to `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenParams {
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "is_unset")]
    pub address: Option<MultiValue>,
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "is_unset")]
    pub underlying_tokens: Option<MultiValue>,
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "is_unset")]
    pub underlying_tokens_exact: Option<MultiValue>,
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "is_unset")]
    pub primary_address: Option<MultiValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apy_from: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apy_to: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvl_from: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvl_to: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub token_type: Option<TokenType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_metadata: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<u64>,
}

impl TokenParams {
    /// Seed used by the text query entry point.
    pub fn with_default_chain() -> Self {
        Self {
            chain_id: Some(DEFAULT_CHAIN_ID),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Current value of an array-shaped key; `None` for other shapes and for
    /// an empty array.
    pub fn array(&self, key: FilterKey) -> Option<&MultiValue> {
        let value = match key {
            FilterKey::Address => self.address.as_ref(),
            FilterKey::UnderlyingTokens => self.underlying_tokens.as_ref(),
            FilterKey::UnderlyingTokensExact => self.underlying_tokens_exact.as_ref(),
            FilterKey::PrimaryAddress => self.primary_address.as_ref(),
            _ => None,
        };
        value.filter(|v| !v.is_empty())
    }

    pub(crate) fn array_slot(&mut self, key: FilterKey) -> Option<&mut Option<MultiValue>> {
        match key {
            FilterKey::Address => Some(&mut self.address),
            FilterKey::UnderlyingTokens => Some(&mut self.underlying_tokens),
            FilterKey::UnderlyingTokensExact => Some(&mut self.underlying_tokens_exact),
            FilterKey::PrimaryAddress => Some(&mut self.primary_address),
            _ => None,
        }
    }

    /// `(from, to)` bounds of a range-shaped key; both `None` for other shapes.
    pub fn range(&self, key: FilterKey) -> (Option<f64>, Option<f64>) {
        match key {
            FilterKey::Apy => (self.apy_from, self.apy_to),
            FilterKey::Tvl => (self.tvl_from, self.tvl_to),
            _ => (None, None),
        }
    }

    pub(crate) fn range_slots(
        &mut self,
        key: FilterKey,
    ) -> Option<(&mut Option<f64>, &mut Option<f64>)> {
        match key {
            FilterKey::Apy => Some((&mut self.apy_from, &mut self.apy_to)),
            FilterKey::Tvl => Some((&mut self.tvl_from, &mut self.tvl_to)),
            _ => None,
        }
    }
}

impl PartialEq for TokenParams {
    fn eq(&self, other: &Self) -> bool {
        let Self {
            address: _,
            underlying_tokens: _,
            underlying_tokens_exact: _,
            primary_address: _,
            apy_from,
            apy_to,
            tvl_from,
            tvl_to,
            protocol_slug,
            project,
            token_type,
            chain_id,
            include_metadata,
            page,
            cursor,
        } = self;

        FilterKey::ALL
            .into_iter()
            .all(|key| self.array(key) == other.array(key))
            && *apy_from == other.apy_from
            && *apy_to == other.apy_to
            && *tvl_from == other.tvl_from
            && *tvl_to == other.tvl_to
            && *protocol_slug == other.protocol_slug
            && *project == other.project
            && *token_type == other.token_type
            && *chain_id == other.chain_id
            && *include_metadata == other.include_metadata
            && *page == other.page
            && *cursor == other.cursor
    }
}
