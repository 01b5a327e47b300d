use serde_json::json;
use tfq_core::{Filter, FilterKey, FilterValue, TokenParams};
use wasm_bindgen::prelude::*;

fn params_from_json(params_json: &str) -> Result<TokenParams, String> {
    serde_json::from_str(params_json).map_err(|e| format!("JSON parse error: {}", e))
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn key_from_name(key: &str) -> Result<FilterKey, String> {
    FilterKey::from_name(key).ok_or_else(|| format!("unknown filter key: {}", key))
}

/// Parse a filter query; `null` when nothing was recognized.
#[wasm_bindgen(js_name = parseQuery)]
pub fn parse_query(query: &str) -> Result<String, String> {
    to_json(&tfq_core::parse(query))
}

/// Parse a filter query and report the autocomplete events alongside the result.
#[wasm_bindgen(js_name = parseQueryEvents)]
pub fn parse_query_events(query: &str) -> Result<String, String> {
    let (params, events) = tfq_core::parse_events(query);
    to_json(&json!({ "params": params, "events": events }))
}

#[wasm_bindgen(js_name = toQueryString)]
pub fn to_query_string(params_json: &str) -> Result<String, String> {
    Ok(tfq_core::to_query_string(&params_from_json(params_json)?))
}

#[wasm_bindgen(js_name = toUrl)]
pub fn to_url(params_json: &str, base_url: &str) -> Result<String, String> {
    Ok(tfq_core::to_url(&params_from_json(params_json)?, base_url))
}

#[wasm_bindgen(js_name = fromUrl)]
pub fn from_url(url: &str) -> Result<String, String> {
    let params = tfq_core::from_url(url).map_err(|e| e.to_string())?;
    to_json(&params)
}

#[wasm_bindgen(js_name = activeFilters)]
pub fn active_filters(params_json: &str) -> Result<String, String> {
    to_json(&tfq_core::active_filters(&params_from_json(params_json)?))
}

/// `filter_json` is a `{ key, value }` chip, value a string or `{ from, to }`.
#[wasm_bindgen(js_name = addFilter)]
pub fn add_filter(params_json: &str, filter_json: &str) -> Result<String, String> {
    let params = params_from_json(params_json)?;
    let filter: Filter =
        serde_json::from_str(filter_json).map_err(|e| format!("JSON parse error: {}", e))?;
    to_json(&tfq_core::add_filter(&params, filter.key, &filter.value))
}

/// Remove a whole key, or one chip when `value_json` is given.
#[wasm_bindgen(js_name = removeFilter)]
pub fn remove_filter(
    params_json: &str,
    key: &str,
    value_json: Option<String>,
) -> Result<String, String> {
    let params = params_from_json(params_json)?;
    let key = key_from_name(key)?;
    let value: Option<FilterValue> = value_json
        .map(|v| serde_json::from_str(&v))
        .transpose()
        .map_err(|e| format!("JSON parse error: {}", e))?;
    to_json(&tfq_core::remove_filter(&params, key, value.as_ref()))
}

#[wasm_bindgen(js_name = keySuggestions)]
pub fn key_suggestions(search: &str) -> Result<String, String> {
    let keys: Vec<_> = tfq_core::vocab::key_suggestions(search)
        .into_iter()
        .map(|key| {
            json!({
                "key": key,
                "description": key.description(),
                "example": key.example(),
            })
        })
        .collect();
    to_json(&keys)
}
