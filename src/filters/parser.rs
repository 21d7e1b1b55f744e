//! Filter query parser for sessions.
//!
//! Parses user-provided filter expressions into an AST ([`FilterExpr`]) for evaluation.
//!
//! # Syntax
//!
//! ```text
//! filter_expr := field_filter (operator field_filter)*
//! field_filter := field_name:value | field_name:"quoted value"
//! operator := AND | OR (case-insensitive)
//! field_name := project | tag | since | until | messages (case-insensitive)
//! ```
//!
//! # Supported Fields
//!
//! - `project:path` - Project path substring (supports ~ expansion)
//! - `tag:name` - Sessions carrying the tag
//! - `since:YYYY-MM-DD` / `until:YYYY-MM-DD` - Last update on or after / on or before the date
//! - `messages:N` - Sessions with at least N messages
//!
//! # Examples
//!
//! ```rust
//! # use ccsearch::filters::parser::parse_filter;
//! // Same field gets implicit OR, different fields implicit AND
//! let expr = parse_filter("tag:work tag:urgent project:api").unwrap();
//!
//! // Explicit operators and quoted values
//! let expr = parse_filter("project:\"my project\" OR since:2024-01-01").unwrap();
//! ```
//!
//! # Validation
//!
//! - `since`/`until` dates must be YYYY-MM-DD and semantically valid
//! - `messages` must be a non-negative integer
//! - Empty field names or values are rejected

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;

use super::ast::{FieldFilter, FilterExpr, FilterField, FilterOperator};

/// Token types produced by the tokenizer
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// field:value or field:"quoted value"
    FieldValue { field: String, value: String },
    /// AND keyword
    And,
    /// OR keyword
    Or,
}

/// Tokenize filter input string into tokens
///
/// Supports:
/// - field:value patterns
/// - field:"quoted value" with spaces
/// - AND/OR keywords (case-insensitive)
/// - Whitespace separation
fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        // Skip whitespace
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        // Try to parse a word or field:value
        let word = read_word(&mut chars);

        if word.is_empty() {
            return Err(anyhow!("Unexpected character in filter input"));
        }

        // Check if it's an operator keyword
        match word.to_uppercase().as_str() {
            "AND" => tokens.push(Token::And),
            "OR" => tokens.push(Token::Or),
            _ => {
                // Try to parse as field:value
                if let Some(colon_pos) = word.find(':') {
                    let field = word[..colon_pos].to_string();
                    let mut value = word[colon_pos + 1..].to_string();

                    // Check if value starts with quote
                    if value.starts_with('"') {
                        // Need to read quoted value
                        value = read_quoted_value(&mut chars, &value)?;
                    }

                    if field.is_empty() || value.is_empty() {
                        return Err(anyhow!("Invalid field:value format: {}", word));
                    }

                    tokens.push(Token::FieldValue { field, value });
                } else {
                    return Err(anyhow!(
                        "Invalid token: '{}' (expected field:value or AND/OR)",
                        word
                    ));
                }
            }
        }
    }

    Ok(tokens)
}

/// Read a word (until whitespace or end)
fn read_word(chars: &mut std::iter::Peekable<std::str::Chars>) -> String {
    let mut word = String::new();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            break;
        }
        word.push(ch);
        chars.next();
    }

    word
}

/// Read a quoted value, handling the case where word already contains the opening quote
fn read_quoted_value(
    chars: &mut std::iter::Peekable<std::str::Chars>,
    initial: &str,
) -> Result<String> {
    // initial is like "foo or "foo bar" depending on if quote was mid-word
    let mut value = initial[1..].to_string(); // Remove opening quote

    // If the initial part already has closing quote, we're done
    if let Some(quote_pos) = value.find('"') {
        return Ok(value[..quote_pos].to_string());
    }

    // Otherwise keep reading until closing quote
    for ch in chars.by_ref() {
        if ch == '"' {
            return Ok(value);
        }
        value.push(ch);
    }

    Err(anyhow!("Unterminated quoted string"))
}

/// Parse field name into FilterField enum
fn parse_field(field: &str) -> Result<FilterField> {
    match field.to_lowercase().as_str() {
        "project" => Ok(FilterField::Project),
        "tag" => Ok(FilterField::Tag),
        "since" => Ok(FilterField::Since),
        "until" => Ok(FilterField::Until),
        "messages" => Ok(FilterField::Messages),
        _ => Err(anyhow!("Unknown field: '{}' (valid fields: {})", field, FilterField::NAMES)),
    }
}

/// Parse filter string into FilterExpr
///
/// Examples:
/// - "tag:work" → single filter
/// - "tag:work since:2024-01-01" → two filters with implicit AND
/// - "tag:work OR messages:10" → two filters with explicit OR
/// - "project:foo project:bar" → two filters with implicit OR (same field)
pub fn parse_filter(input: &str) -> Result<FilterExpr> {
    if input.trim().is_empty() {
        return Ok(FilterExpr::new());
    }

    let tokens = tokenize(input).context("Failed to tokenize filter")?;

    if tokens.is_empty() {
        return Ok(FilterExpr::new());
    }

    let mut expr = FilterExpr::new();
    let mut expecting_filter = true;
    let mut last_field: Option<FilterField> = None;

    for token in tokens {
        match token {
            Token::FieldValue { field, value } => {
                let filter_field = parse_field(&field)?;

                // Validate value based on field type
                validate_value(&filter_field, &value)?;

                // Add implicit operator if we're not expecting a filter
                // (meaning there was no explicit operator between filters)
                if !expecting_filter && !expr.filters.is_empty() {
                    // Need to add implicit operator
                    let implicit_op = if let Some(prev_field) = last_field {
                        if prev_field == filter_field {
                            FilterOperator::Or // Same field → OR
                        } else {
                            FilterOperator::And // Different field → AND
                        }
                    } else {
                        FilterOperator::And
                    };
                    expr.add_operator(implicit_op);
                }

                expr.add_filter(FieldFilter::new(filter_field, value));
                last_field = Some(filter_field);
                expecting_filter = false;
            }
            Token::And => {
                if expecting_filter {
                    return Err(anyhow!("Unexpected AND operator (expected field:value)"));
                }
                expr.add_operator(FilterOperator::And);
                expecting_filter = true;
            }
            Token::Or => {
                if expecting_filter {
                    return Err(anyhow!("Unexpected OR operator (expected field:value)"));
                }
                expr.add_operator(FilterOperator::Or);
                expecting_filter = true;
            }
        }
    }

    if expecting_filter {
        return Err(anyhow!("Filter ended with operator (expected field:value)"));
    }

    // Validate operators count
    if expr.operators.len() != expr.filters.len().saturating_sub(1) {
        return Err(anyhow!(
            "Internal parser error: operator count mismatch (filters: {}, operators: {})",
            expr.filters.len(),
            expr.operators.len()
        ));
    }

    Ok(expr)
}

/// Validate filter value based on field type
fn validate_value(field: &FilterField, value: &str) -> Result<()> {
    match field {
        FilterField::Since | FilterField::Until => {
            if !is_valid_date_format(value) {
                return Err(anyhow!("Invalid date format: '{}' (expected YYYY-MM-DD)", value));
            }
            Ok(())
        }
        FilterField::Messages => {
            value
                .parse::<usize>()
                .map(|_| ())
                .map_err(|_| anyhow!("Invalid message count: '{}' (expected a number)", value))
        }
        FilterField::Project | FilterField::Tag => {
            if value.trim().is_empty() {
                return Err(anyhow!("Filter value cannot be empty"));
            }
            Ok(())
        }
    }
}

/// Check if string is valid YYYY-MM-DD format
fn is_valid_date_format(s: &str) -> bool {
    // Enforce strict YYYY-MM-DD format (10 chars)
    if s.len() != 10 {
        return false;
    }
    // Use chrono for semantic validation (e.g., reject 2024-02-31)
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}
