//! Search index source derivation.
//!
//! The searchable representation of a document is derived from its extracted
//! text plus its filename, so a document with an empty text layer remains
//! discoverable by name. The Postgres store computes
//! `to_tsvector('english', extracted_text || ' ' || file_name)` inside the
//! completion UPDATE; this module provides the same derivation for non-SQL
//! implementations (the in-memory test fixtures) and pins the contract with
//! unit tests.

/// Build the raw text an index is derived from: extracted text followed by
/// the filename. The filename is always present, even when the text is empty.
pub fn index_source(extracted_text: &str, file_name: &str) -> String {
    let text = extracted_text.trim();
    if text.is_empty() {
        return file_name.to_string();
    }
    let mut out = String::with_capacity(text.len() + file_name.len() + 1);
    out.push_str(text);
    out.push(' ');
    out.push_str(file_name);
    out
}

/// Lowercased alphanumeric tokens of the index source.
pub fn index_tokens(extracted_text: &str, file_name: &str) -> Vec<String> {
    tokenize(&index_source(extracted_text, file_name))
}

/// Tokenize a user query the same way index sources are tokenized.
pub fn query_tokens(query: &str) -> Vec<String> {
    tokenize(query)
}

fn tokenize(input: &str) -> Vec<String> {
    input
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}
