//! Serialization of [`TokenParams`] to query strings and URLs
//!
//! Three encodings exist and they are not interchangeable:
//! - the filter query (`address:0x1 apy>3`), the inverse of [`crate::parser`];
//! - the shareable URL (`?address%5B%5D=0x1&apyFrom=3`), a public bookmark format;
//! - the upstream API query (`?address=0x1&apyFrom=3&page=1`).

use crate::Error;
use crate::apply::parse_chain_id;
use crate::params::{DEFAULT_CHAIN_ID, MultiValue, TokenParams, TokenType};
use crate::vocab::{FilterKey, FilterOperator};
use std::fmt;
use url::Url;
use url::form_urlencoded::Serializer;

const ARRAY_KEYS: [FilterKey; 4] = [
    FilterKey::Address,
    FilterKey::UnderlyingTokens,
    FilterKey::UnderlyingTokensExact,
    FilterKey::PrimaryAddress,
];

/// Canonical filter query for `params`.
///
/// Tokens are emitted in a fixed order. Range bounds collapse to a single
/// `key:value` token when equal, and `chainId:1` is omitted.
pub fn to_query_string(params: &TokenParams) -> String {
    let mut tokens: Vec<String> = Vec::new();
    let mut push = |key: FilterKey, op: FilterOperator, value: &dyn fmt::Display| {
        tokens.push(format!("{key}{op}{value}"));
    };

    for key in ARRAY_KEYS {
        for value in params.array(key).map(MultiValue::as_slice).unwrap_or_default() {
            push(key, FilterOperator::Eq, value);
        }
    }

    for key in [FilterKey::Apy, FilterKey::Tvl] {
        match params.range(key) {
            (Some(from), Some(to)) if from == to => push(key, FilterOperator::Eq, &from),
            (from, to) => {
                if let Some(from) = from {
                    push(key, FilterOperator::Gt, &from);
                }
                if let Some(to) = to {
                    push(key, FilterOperator::Lt, &to);
                }
            }
        }
    }

    if let Some(slug) = params.protocol_slug.as_deref().filter(|s| !s.is_empty()) {
        push(FilterKey::ProtocolSlug, FilterOperator::Eq, &slug);
    }
    if let Some(project) = params.project.as_deref().filter(|s| !s.is_empty()) {
        push(FilterKey::Project, FilterOperator::Eq, &project);
    }
    if let Some(token_type) = params.token_type {
        push(FilterKey::Type, FilterOperator::Eq, &token_type);
    }
    if let Some(chain_id) = params.chain_id.filter(|&id| id != DEFAULT_CHAIN_ID) {
        push(FilterKey::ChainId, FilterOperator::Eq, &chain_id);
    }

    tokens.join(" ")
}

impl TokenParams {
    pub fn to_query_string(&self) -> String {
        to_query_string(self)
    }
}

impl fmt::Display for TokenParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_query_string(self))
    }
}

fn url_pairs(params: &TokenParams) -> Serializer<'static, String> {
    let mut pairs = Serializer::new(String::new());

    if let Some(chain_id) = params.chain_id {
        pairs.append_pair("chainId", &chain_id.to_string());
    }
    for key in ARRAY_KEYS {
        // always bracketed so a single value reads back as a list
        let name = format!("{key}[]");
        for value in params.array(key).map(MultiValue::as_slice).unwrap_or_default() {
            pairs.append_pair(&name, value);
        }
    }
    let numbers = [
        ("apyFrom", params.apy_from),
        ("apyTo", params.apy_to),
        ("tvlFrom", params.tvl_from),
        ("tvlTo", params.tvl_to),
    ];
    for (name, value) in numbers {
        if let Some(value) = value {
            pairs.append_pair(name, &value.to_string());
        }
    }
    if let Some(slug) = &params.protocol_slug {
        pairs.append_pair("protocolSlug", slug);
    }
    if let Some(project) = &params.project {
        pairs.append_pair("project", project);
    }
    if let Some(token_type) = params.token_type {
        pairs.append_pair("type", token_type.as_str());
    }
    if let Some(include) = params.include_metadata {
        pairs.append_pair("includeMetadata", if include { "true" } else { "false" });
    }
    if let Some(page) = params.page {
        pairs.append_pair("page", &page.to_string());
    }
    if let Some(cursor) = params.cursor {
        pairs.append_pair("cursor", &cursor.to_string());
    }

    pairs
}

fn join_query(base_url: &str, query: &str) -> String {
    if query.is_empty() {
        return base_url.to_string();
    }
    let sep = match base_url.rfind('?') {
        None => "?",
        Some(_) if base_url.ends_with(['?', '&']) => "",
        Some(_) => "&",
    };
    format!("{base_url}{sep}{query}")
}

/// Shareable URL: every populated field appended to `base_url` as a query
/// parameter, array fields as repeated `key[]`. `chainId` is kept as given.
pub fn to_url(params: &TokenParams, base_url: &str) -> String {
    join_query(base_url, &url_pairs(params).finish())
}

/// Read a shareable URL back into [`TokenParams`].
///
/// Only an unparseable URL is an error; parameters that fail coercion are
/// skipped. Array fields also accept unbracketed repeated keys, and the
/// legacy `protocol` name is read when `protocolSlug` is absent.
pub fn from_url(url: &str) -> Result<TokenParams, Error> {
    let parsed = Url::parse(url)?;
    let pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();

    let first = |name: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    };
    let all = |name: &str| -> Vec<String> {
        pairs
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
            .collect()
    };
    let array = |key: FilterKey| {
        let mut values = all(&format!("{key}[]"));
        if values.is_empty() {
            values = all(key.name());
        }
        (!values.is_empty()).then_some(MultiValue::Many(values))
    };
    let number = |name: &str| {
        first(name)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|n| n.is_finite())
    };

    Ok(TokenParams {
        address: array(FilterKey::Address),
        underlying_tokens: array(FilterKey::UnderlyingTokens),
        underlying_tokens_exact: array(FilterKey::UnderlyingTokensExact),
        primary_address: array(FilterKey::PrimaryAddress),
        apy_from: number("apyFrom"),
        apy_to: number("apyTo"),
        tvl_from: number("tvlFrom"),
        tvl_to: number("tvlTo"),
        protocol_slug: first("protocolSlug").or_else(|| first("protocol")).map(str::to_string),
        project: first("project").map(str::to_string),
        token_type: first("type").and_then(TokenType::parse),
        chain_id: first("chainId").and_then(parse_chain_id),
        include_metadata: first("includeMetadata").map(|v| v == "true"),
        page: first("page").and_then(|v| v.trim().parse().ok()),
        cursor: first("cursor").and_then(|v| v.trim().parse().ok()),
    })
}

/// Query string for the upstream `/tokens` endpoint.
///
/// Arrays repeat the plain key, `includeMetadata` defaults to `true` and
/// `page` to `1`.
pub fn to_api_query(params: &TokenParams) -> String {
    let mut pairs = Serializer::new(String::new());

    if let Some(chain_id) = params.chain_id {
        pairs.append_pair("chainId", &chain_id.to_string());
    }
    for key in [
        FilterKey::Address,
        FilterKey::UnderlyingTokens,
        FilterKey::UnderlyingTokensExact,
    ] {
        for value in params.array(key).map(MultiValue::as_slice).unwrap_or_default() {
            pairs.append_pair(key.name(), value);
        }
    }
    let numbers = [
        ("apyFrom", params.apy_from),
        ("apyTo", params.apy_to),
        ("tvlFrom", params.tvl_from),
        ("tvlTo", params.tvl_to),
    ];
    for (name, value) in numbers {
        if let Some(value) = value {
            pairs.append_pair(name, &value.to_string());
        }
    }
    if let Some(slug) = params.protocol_slug.as_deref().filter(|s| !s.is_empty()) {
        pairs.append_pair("protocolSlug", slug);
    }
    if let Some(project) = params.project.as_deref().filter(|s| !s.is_empty()) {
        pairs.append_pair("project", project);
    }
    if let Some(token_type) = params.token_type {
        pairs.append_pair("type", token_type.as_str());
    }
    let include = params.include_metadata.unwrap_or(true);
    pairs.append_pair("includeMetadata", if include { "true" } else { "false" });
    pairs.append_pair("page", &params.page.unwrap_or(1).to_string());

    pairs.finish()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::parser::parse_filter_query;

    #[test]
    fn test_default_chain_omitted() {
        assert_eq!(to_query_string(&TokenParams::with_default_chain()), "");
        let params = TokenParams {
            chain_id: Some(137),
            ..TokenParams::default()
        };
        assert_eq!(to_query_string(&params), "chainId:137");
    }

    #[test]
    fn test_range_collapse() {
        let params = TokenParams::default().with_filter(FilterKey::Apy, FilterOperator::Eq, "5");
        assert_eq!(params.to_query_string(), "apy:5");

        let params = TokenParams::default()
            .with_filter(FilterKey::Apy, FilterOperator::Gt, "3")
            .with_filter(FilterKey::Apy, FilterOperator::Lt, "9");
        assert_eq!(params.to_query_string(), "apy>3 apy<9");
    }

    #[test]
    fn test_field_order() {
        let params = TokenParams {
            chain_id: Some(10),
            token_type: Some(TokenType::Defi),
            project: Some("compound".into()),
            protocol_slug: Some("compound-v3".into()),
            tvl_to: Some(2.5),
            apy_from: Some(1.0),
            primary_address: Some(MultiValue::from("0xP")),
            underlying_tokens_exact: Some(MultiValue::from("0xE")),
            underlying_tokens: Some(MultiValue::Many(vec!["0xU1".into(), "0xU2".into()])),
            address: Some(MultiValue::from("0xA")),
            ..TokenParams::default()
        };
        assert_eq!(
            params.to_string(),
            "address:0xA underlyingTokens:0xU1 underlyingTokens:0xU2 \
             underlyingTokensExact:0xE primaryAddress:0xP apy>1 tvl<2.5 \
             protocolSlug:compound-v3 project:compound type:defi chainId:10"
        );
    }

    #[test]
    fn test_query_string_round_trip() {
        let query = "address:0xA address:0xB underlyingTokens:0xC apy>3 tvl:1000000 \
                     protocolSlug:aave-v3 type:base chainId:137";
        let params = parse_filter_query(query, &mut ()).unwrap();
        assert_eq!(to_query_string(&params), query);
        assert_eq!(parse_filter_query(&to_query_string(&params), &mut ()), Some(params));
    }

    #[test]
    fn test_aliases_serialize_canonically() {
        let params = parse_filter_query("underlying:0xA protocol:aave chain:56", &mut ()).unwrap();
        assert_eq!(
            params.to_query_string(),
            "underlyingTokens:0xA protocolSlug:aave chainId:56"
        );
    }

    #[test]
    fn test_to_url() {
        let params = TokenParams {
            address: Some(MultiValue::Many(vec!["0xA".into(), "0xB".into()])),
            apy_from: Some(3.5),
            token_type: Some(TokenType::Defi),
            chain_id: Some(1),
            include_metadata: Some(false),
            ..TokenParams::default()
        };
        assert_eq!(
            to_url(&params, "https://example.com/tokens"),
            "https://example.com/tokens?chainId=1&address%5B%5D=0xA&address%5B%5D=0xB\
             &apyFrom=3.5&type=defi&includeMetadata=false"
        );
    }

    #[test]
    fn test_to_url_singleton_is_bracketed() {
        let params = TokenParams {
            underlying_tokens: Some(MultiValue::from("0xA")),
            ..TokenParams::default()
        };
        assert_eq!(
            to_url(&params, "https://example.com"),
            "https://example.com?underlyingTokens%5B%5D=0xA"
        );
    }

    #[test]
    fn test_to_url_empty_and_existing_query() {
        assert_eq!(
            to_url(&TokenParams::default(), "https://example.com/x"),
            "https://example.com/x"
        );
        let params = TokenParams {
            project: Some("a b".into()),
            ..TokenParams::default()
        };
        assert_eq!(
            to_url(&params, "https://example.com/?embed=1"),
            "https://example.com/?embed=1&project=a+b"
        );
    }

    #[test]
    fn test_from_url() {
        let params = from_url(
            "https://example.com/?address%5B%5D=0xA&address[]=0xB&apyTo=9&tvlFrom=abc\
             &protocol=aave&type=lp&includeMetadata=true&chainId=137",
        )
        .unwrap();
        assert_eq!(
            params.address,
            Some(MultiValue::Many(vec!["0xA".into(), "0xB".into()]))
        );
        assert_eq!(params.apy_to, Some(9.0));
        assert_eq!(params.tvl_from, None);
        assert_eq!(params.protocol_slug.as_deref(), Some("aave"));
        assert_eq!(params.token_type, None);
        assert_eq!(params.include_metadata, Some(true));
        assert_eq!(params.chain_id, Some(137));
    }

    #[test]
    fn test_from_url_prefers_canonical_protocol() {
        let params =
            from_url("https://example.com/?protocol=old&protocolSlug=new").unwrap();
        assert_eq!(params.protocol_slug.as_deref(), Some("new"));
    }

    #[test]
    fn test_from_url_fractional_chain_id() {
        let params = from_url("https://example.com/?chainId=137.0").unwrap();
        assert_eq!(params.chain_id, Some(137));
        let params = from_url("https://example.com/?chainId=99999999999999999999").unwrap();
        assert_eq!(params.chain_id, None);
    }

    #[test]
    fn test_empty_array_url_round_trip() {
        let params = TokenParams {
            address: Some(MultiValue::Many(Vec::new())),
            chain_id: Some(5),
            ..TokenParams::default()
        };
        let url = to_url(&params, "https://example.com/");
        assert_eq!(url, "https://example.com/?chainId=5");
        assert_eq!(from_url(&url).unwrap(), params);
    }

    #[test]
    fn test_from_url_unbracketed_arrays() {
        let params = from_url("https://example.com/?address=0xA&address=0xB").unwrap();
        assert_eq!(params.address.unwrap().len(), 2);
    }

    #[test]
    fn test_from_url_invalid() {
        assert!(matches!(from_url("not a url"), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_url_round_trip() {
        let params = TokenParams {
            address: Some(MultiValue::from("0xA")),
            primary_address: Some(MultiValue::Many(vec!["0xP".into(), "0xP".into()])),
            tvl_from: Some(1e6),
            tvl_to: Some(2e6),
            protocol_slug: Some("uniswap-v3".into()),
            project: Some("uni swap&co".into()),
            token_type: Some(TokenType::Base),
            chain_id: Some(42161),
            include_metadata: Some(true),
            page: Some(2),
            ..TokenParams::default()
        };
        let url = to_url(&params, "https://example.com/share");
        assert_eq!(from_url(&url).unwrap(), params);
    }

    #[test]
    fn test_api_query_defaults() {
        let params = TokenParams {
            chain_id: Some(1),
            address: Some(MultiValue::Many(vec!["0xA".into(), "0xB".into()])),
            apy_from: Some(2.0),
            ..TokenParams::default()
        };
        assert_eq!(
            to_api_query(&params),
            "chainId=1&address=0xA&address=0xB&apyFrom=2&includeMetadata=true&page=1"
        );
    }
}
