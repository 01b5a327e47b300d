//! Tokenizer for filter queries
//!
//! A query is a whitespace-separated list of `key<op>value` tokens. Tokens are
//! never rejected here: classification against the vocabulary happens in
//! [`crate::parser`].

use crate::vocab::FilterOperator;
use smallvec::SmallVec;

/// One whitespace-delimited token split into its parts
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedToken<'a> {
    /// Text before the first operator character (possibly partial or invalid)
    pub key: &'a str,
    pub operator: Option<FilterOperator>,
    /// Text after the operator; `None` when empty
    pub value: Option<&'a str>,
    /// Byte offset of the token within the query
    pub position: usize,
}

/// Split a query on runs of whitespace. A blank query yields no tokens.
pub fn split_tokens(query: &str) -> SmallVec<[&str; 8]> {
    query.split_whitespace().collect()
}

/// Split a query into parsed tokens, keeping each token's offset.
pub fn tokenize(query: &str) -> Vec<ParsedToken<'_>> {
    let base = query.as_ptr() as usize;
    split_tokens(query)
        .into_iter()
        .map(|token| {
            let mut parsed = parse_token(token);
            parsed.position = token.as_ptr() as usize - base;
            parsed
        })
        .collect()
}

/// Split a single token at the leftmost of `:`, `>` or `<`.
///
/// The leftmost occurrence wins regardless of which operator it is, so a
/// value may itself contain operator characters: `address:0x12:34` has the
/// value `0x12:34`.
pub fn parse_token(token: &str) -> ParsedToken<'_> {
    let split = token
        .char_indices()
        .find_map(|(idx, ch)| FilterOperator::from_char(ch).map(|op| (idx, op)));

    match split {
        Some((idx, op)) => {
            let value = &token[idx + 1..];
            ParsedToken {
                key: &token[..idx],
                operator: Some(op),
                value: (!value.is_empty()).then_some(value),
                position: 0,
            }
        }
        None => ParsedToken {
            key: token,
            operator: None,
            value: None,
            position: 0,
        },
    }
}
