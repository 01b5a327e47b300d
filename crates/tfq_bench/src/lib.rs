//! Benchmark inputs for the filter query engine.

/// A query of `n` filters cycling through every key and operator shape
pub fn generated_query(n: usize) -> String {
    (0..n)
        .map(|i| match i % 8 {
            0 => format!("address:0x{i:040x}"),
            1 => format!("underlyingTokens:0x{i:040x}"),
            2 => format!("apy>{}", i % 50),
            3 => format!("apy<{}.5", 50 + i % 50),
            4 => format!("tvl:{}", i * 1000),
            5 => "protocolSlug:aave-v3".to_string(),
            6 => "type:defi".to_string(),
            _ => format!("chainId:{}", 1 + i % 3),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keystroke-by-keystroke prefixes of `query`, as a search box sees them
pub fn typing_prefixes(query: &str) -> Vec<&str> {
    query
        .char_indices()
        .map(|(idx, ch)| &query[..idx + ch.len_utf8()])
        .collect()
}
