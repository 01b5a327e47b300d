//! Parser for filter queries
//!
//! Parsing is a single left-to-right pass over the tokens. Alongside building
//! [`TokenParams`], the parser reports incomplete input to a [`ParseObserver`]
//! so a search box can offer completions while the user is still typing.

use crate::apply::apply_filter;
use crate::lexer::{ParsedToken, tokenize};
use crate::params::TokenParams;
use crate::vocab::{FilterKey, FilterOperator, is_key_prefix};
use serde::Serialize;
use tracing::trace;

/// Receives progress notifications during a single parse.
///
/// Hooks run synchronously in token order. Every hook defaults to doing
/// nothing, so an observer only implements what it needs.
pub trait ParseObserver {
    /// A token is a strict prefix of some key: `addr`
    fn filter_selecting(&mut self, _partial: &str) {}

    /// A key is complete but has no value yet: `apy>` or bare `apy` (reported with `:`)
    fn filter_selected(&mut self, _key: FilterKey, _op: FilterOperator) {}

    /// Fires at most once, after the last token, if any filter was recognized
    fn filter(&mut self, _params: &TokenParams) {}
}

impl ParseObserver for () {}

/// Observer notifications as data, for callers that fold over events
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ParseEvent {
    FilterSelecting { partial: String },
    FilterSelected { key: FilterKey, operator: FilterOperator },
    Filter { params: TokenParams },
}

impl ParseObserver for Vec<ParseEvent> {
    fn filter_selecting(&mut self, partial: &str) {
        self.push(ParseEvent::FilterSelecting {
            partial: partial.to_string(),
        });
    }

    fn filter_selected(&mut self, key: FilterKey, operator: FilterOperator) {
        self.push(ParseEvent::FilterSelected { key, operator });
    }

    fn filter(&mut self, params: &TokenParams) {
        self.push(ParseEvent::Filter {
            params: params.clone(),
        });
    }
}

type SelectingHook<'a> = Box<dyn FnMut(&str) + 'a>;
type SelectedHook<'a> = Box<dyn FnMut(FilterKey, FilterOperator) + 'a>;
type FilterHook<'a> = Box<dyn FnMut(&TokenParams) + 'a>;

/// Closure-based observer; unset hooks are skipped.
#[derive(Default)]
pub struct Callbacks<'a> {
    filter_selecting: Option<SelectingHook<'a>>,
    filter_selected: Option<SelectedHook<'a>>,
    filter: Option<FilterHook<'a>>,
}

impl<'a> Callbacks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_filter_selecting(mut self, f: impl FnMut(&str) + 'a) -> Self {
        self.filter_selecting = Some(Box::new(f));
        self
    }

    pub fn on_filter_selected(mut self, f: impl FnMut(FilterKey, FilterOperator) + 'a) -> Self {
        self.filter_selected = Some(Box::new(f));
        self
    }

    pub fn on_filter(mut self, f: impl FnMut(&TokenParams) + 'a) -> Self {
        self.filter = Some(Box::new(f));
        self
    }
}

impl ParseObserver for Callbacks<'_> {
    fn filter_selecting(&mut self, partial: &str) {
        if let Some(f) = self.filter_selecting.as_mut() {
            f(partial);
        }
    }

    fn filter_selected(&mut self, key: FilterKey, op: FilterOperator) {
        if let Some(f) = self.filter_selected.as_mut() {
            f(key, op);
        }
    }

    fn filter(&mut self, params: &TokenParams) {
        if let Some(f) = self.filter.as_mut() {
            f(params);
        }
    }
}

/// How far along a single token is
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenClass<'a> {
    /// `key<op>value` with an operator the key accepts
    Complete {
        key: FilterKey,
        op: FilterOperator,
        value: &'a str,
    },
    /// Known key, value still missing
    AwaitingValue { key: FilterKey, op: FilterOperator },
    /// Strict prefix of a key
    PartialKey(&'a str),
    /// Unknown key, empty key, or an operator the key rejects
    Ignored,
}

pub fn classify<'a>(token: &ParsedToken<'a>) -> TokenClass<'a> {
    if token.key.is_empty() {
        return TokenClass::Ignored;
    }

    match FilterKey::from_name(token.key) {
        Some(key) => match (token.operator, token.value) {
            (Some(op), Some(value)) if key.accepts(op) => TokenClass::Complete { key, op, value },
            (Some(_), Some(_)) => TokenClass::Ignored,
            (Some(op), None) => TokenClass::AwaitingValue { key, op },
            (None, _) => TokenClass::AwaitingValue {
                key,
                op: FilterOperator::Eq,
            },
        },
        None if is_key_prefix(token.key) => TokenClass::PartialKey(token.key),
        None => TokenClass::Ignored,
    }
}

/// Parse `query` on top of `seed`.
///
/// Returns `None` when no complete filter was recognized, even if the seed
/// itself is non-empty. A complete filter whose value is then rejected (for
/// example `apy:abc`) still counts as recognized.
pub fn parse_query<O: ParseObserver + ?Sized>(
    query: &str,
    seed: TokenParams,
    observer: &mut O,
) -> Option<TokenParams> {
    let mut params = seed;
    let mut found = false;

    for token in tokenize(query) {
        match classify(&token) {
            TokenClass::Complete { key, op, value } => {
                trace!(position = token.position, %key, %op, value, "complete filter");
                apply_filter(&mut params, key, op, value);
                found = true;
            }
            TokenClass::AwaitingValue { key, op } => {
                trace!(position = token.position, %key, %op, "key awaiting value");
                observer.filter_selected(key, op);
            }
            TokenClass::PartialKey(partial) => {
                trace!(position = token.position, partial, "partial key");
                observer.filter_selecting(partial);
            }
            TokenClass::Ignored => {
                trace!(position = token.position, key = token.key, "token ignored");
            }
        }
    }

    if found {
        observer.filter(&params);
        Some(params)
    } else {
        None
    }
}

/// Text query entry point: parses on top of `chainId = 1`.
pub fn parse_filter_query<O: ParseObserver + ?Sized>(
    query: &str,
    observer: &mut O,
) -> Option<TokenParams> {
    parse_query(query, TokenParams::with_default_chain(), observer)
}

/// [`parse_filter_query`] with the observer notifications returned as a list.
pub fn parse_events(query: &str) -> (Option<TokenParams>, Vec<ParseEvent>) {
    let mut events = Vec::new();
    let params = parse_filter_query(query, &mut events);
    (params, events)
}
