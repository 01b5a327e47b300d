//! tfq_core - token filter query library
//!
//! Parses the compact filter language of the token explorer widget
//! (`address:0x... apy>3 tvl<1000000 type:defi`) into [`TokenParams`], and
//! serializes parameters back into query text, shareable URLs and the
//! upstream API query.

pub mod apply;
pub mod filters;
pub mod lexer;
pub mod params;
pub mod parser;
pub mod serialize;
pub mod suggest;
pub mod vocab;

pub use apply::apply_filter;
pub use filters::{Filter, FilterValue, active_filters, add_filter, remove_filter};
pub use params::{DEFAULT_CHAIN_ID, MultiValue, TokenParams, TokenType};
pub use parser::{
    Callbacks, ParseEvent, ParseObserver, parse_events, parse_filter_query, parse_query,
};
pub use serialize::{from_url, to_api_query, to_query_string, to_url};
pub use vocab::{FilterKey, FilterOperator, Shape};

/// Error type for URL decoding, the only fallible operation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Parse a filter query with no observer, seeding `chainId = 1`
///
/// # Returns
/// The parameters, or `None` if the query holds no complete filter
///
/// # Example
/// ```
/// use tfq_core::{parse, MultiValue};
///
/// let params = parse("address:0xAAA apy>3").unwrap();
/// assert_eq!(params.address, Some(MultiValue::from("0xAAA")));
/// assert_eq!(params.apy_from, Some(3.0));
/// assert_eq!(params.chain_id, Some(1));
/// assert_eq!(params.to_query_string(), "address:0xAAA apy>3");
/// ```
pub fn parse(query: &str) -> Option<TokenParams> {
    parse_filter_query(query, &mut ())
}
