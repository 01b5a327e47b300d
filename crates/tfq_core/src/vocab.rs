//! Filter vocabulary: the closed set of filter keys and their operator rules

use serde::{Deserialize, Serialize};
use std::fmt;

/// A filterable dimension of the token listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKey {
    /// Token address: `address:0x...`
    Address,
    /// Underlying token address: `underlyingTokens:0x...`
    UnderlyingTokens,
    /// Exact underlying composition: `underlyingTokensExact:0x...`
    UnderlyingTokensExact,
    /// Primary contract address: `primaryAddress:0x...`
    PrimaryAddress,
    /// Annual percentage yield: `apy:5`, `apy>3`, `apy<9`
    Apy,
    /// Total value locked: `tvl>1000000`
    Tvl,
    /// Protocol slug: `protocolSlug:aave-v3`
    ProtocolSlug,
    /// Project name: `project:compound`
    Project,
    /// Token type, `defi` or `base`
    Type,
    /// Network chain id: `chainId:137`
    ChainId,
}

/// How values of a key are stored in [`crate::TokenParams`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A single string or number
    Scalar,
    /// A set of values merged by key
    Array,
    /// A `from`/`to` pair stored as two top-level fields
    Range,
}

/// Separator between key and value in a filter token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    /// `:` equality, or append for array keys
    #[serde(rename = ":")]
    Eq,
    /// `>` lower bound of a range
    #[serde(rename = ">")]
    Gt,
    /// `<` upper bound of a range
    #[serde(rename = "<")]
    Lt,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 3] = [Self::Eq, Self::Gt, Self::Lt];

    pub fn as_char(self) -> char {
        match self {
            Self::Eq => ':',
            Self::Gt => '>',
            Self::Lt => '<',
        }
    }

    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            ':' => Some(Self::Eq),
            '>' => Some(Self::Gt),
            '<' => Some(Self::Lt),
            _ => None,
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// Alternate spellings accepted on input. Output always uses the canonical name.
static ALIASES: [(&str, FilterKey); 4] = [
    ("underlying", FilterKey::UnderlyingTokens),
    ("underlyingExact", FilterKey::UnderlyingTokensExact),
    ("protocol", FilterKey::ProtocolSlug),
    ("chain", FilterKey::ChainId),
];

impl FilterKey {
    /// Every key, in canonical serialization order.
    pub const ALL: [FilterKey; 10] = [
        Self::Address,
        Self::UnderlyingTokens,
        Self::UnderlyingTokensExact,
        Self::PrimaryAddress,
        Self::Apy,
        Self::Tvl,
        Self::ProtocolSlug,
        Self::Project,
        Self::Type,
        Self::ChainId,
    ];

    /// Canonical spelling, identical to the matching `TokenParams` field name
    pub fn name(self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::UnderlyingTokens => "underlyingTokens",
            Self::UnderlyingTokensExact => "underlyingTokensExact",
            Self::PrimaryAddress => "primaryAddress",
            Self::Apy => "apy",
            Self::Tvl => "tvl",
            Self::ProtocolSlug => "protocolSlug",
            Self::Project => "project",
            Self::Type => "type",
            Self::ChainId => "chainId",
        }
    }

    /// Resolve a canonical name or an accepted alias.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.name() == name)
            .or_else(|| {
                ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == name)
                    .map(|&(_, key)| key)
            })
    }

    pub fn shape(self) -> Shape {
        match self {
            Self::Address
            | Self::UnderlyingTokens
            | Self::UnderlyingTokensExact
            | Self::PrimaryAddress => Shape::Array,
            Self::Apy | Self::Tvl => Shape::Range,
            Self::ProtocolSlug | Self::Project | Self::Type | Self::ChainId => Shape::Scalar,
        }
    }

    /// Only range keys take `>` and `<`.
    pub fn accepts(self, op: FilterOperator) -> bool {
        op == FilterOperator::Eq || self.shape() == Shape::Range
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Address => "Position address",
            Self::UnderlyingTokens => "Underlying token address",
            Self::UnderlyingTokensExact => "Exact underlying token address",
            Self::PrimaryAddress => "Primary contract address",
            Self::Apy => "Annual percentage yield",
            Self::Tvl => "Total value locked",
            Self::ProtocolSlug => "Protocol slug",
            Self::Project => "Project name",
            Self::Type => "Token type (defi or base)",
            Self::ChainId => "Blockchain network ID",
        }
    }

    /// Sample value for help output
    pub fn example(self) -> &'static str {
        match self {
            Self::Address
            | Self::UnderlyingTokens
            | Self::UnderlyingTokensExact
            | Self::PrimaryAddress => "0x1234...5678",
            Self::Apy => "5.5",
            Self::Tvl => "1000000",
            Self::ProtocolSlug => "aave",
            Self::Project => "compound",
            Self::Type => "defi",
            Self::ChainId => "1",
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn spellings() -> impl Iterator<Item = &'static str> {
    FilterKey::ALL
        .into_iter()
        .map(FilterKey::name)
        .chain(ALIASES.iter().map(|&(alias, _)| alias))
}

pub fn is_valid_key(name: &str) -> bool {
    FilterKey::from_name(name).is_some()
}

/// True while `partial` is still being typed: a non-empty strict prefix of
/// some accepted spelling that is not itself a key.
pub fn is_key_prefix(partial: &str) -> bool {
    !partial.is_empty()
        && !is_valid_key(partial)
        && spellings().any(|name| name.starts_with(partial))
}

pub fn shape_of(key: FilterKey) -> Shape {
    key.shape()
}

/// Documentation text for a raw key, falling back to the text itself.
pub fn description_of(name: &str) -> &str {
    FilterKey::from_name(name).map_or(name, |key| key.description())
}

/// Keys whose name or description contains `search`, ignoring case.
pub fn key_suggestions(search: &str) -> Vec<FilterKey> {
    let needle = search.to_lowercase();
    FilterKey::ALL
        .into_iter()
        .filter(|key| {
            key.name().to_lowercase().contains(&needle)
                || key.description().to_lowercase().contains(&needle)
        })
        .collect()
}
