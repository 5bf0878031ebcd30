//! Python string literal evaluation.
//!
//! Only `str` constants are recognised: f-strings, t-strings and bytes yield
//! `None`. Implicit concatenation and redundant parentheses are folded the way
//! the Python compiler folds them.

use crate::extractor::{strip_parens, NodeExtractor};
use tree_sitter::Node;

/// Evaluate an expression node to the `str` constant it denotes, if any.
pub fn string_value(node: Node<'_>, source: &str) -> Option<String> {
    let node = strip_parens(node);
    match node.kind() {
        "string" => parse_string_literal(node.text(source)),
        "concatenated_string" => {
            let mut cursor = node.walk();
            let mut value = String::new();
            for part in node.named_children(&mut cursor) {
                if part.kind() == "comment" {
                    continue;
                }
                value.push_str(&parse_string_literal(part.text(source))?);
            }
            Some(value)
        }
        _ => None,
    }
}

/// Decode the source text of a single string token.
pub fn parse_string_literal(text: &str) -> Option<String> {
    let quote_at = text.find(['\'', '"'])?;
    let prefix = &text[..quote_at];
    if !prefix.chars().all(|c| "rRuUbBfFtT".contains(c)) {
        return None;
    }
    if prefix.chars().any(|c| "bBfFtT".contains(c)) {
        return None;
    }
    let raw = prefix.chars().any(|c| c == 'r' || c == 'R');

    let quoted = &text[quote_at..];
    let quote = quoted.chars().next()?;
    let triple: String = std::iter::repeat_n(quote, 3).collect();
    let delimiter = if quoted.len() >= 6 && quoted.starts_with(&triple) {
        triple.as_str()
    } else {
        &quoted[..1]
    };

    let body = quoted
        .strip_prefix(delimiter)?
        .strip_suffix(delimiter)?;

    if raw {
        Some(body.to_string())
    } else {
        Some(decode_escapes(body))
    }
}

fn decode_escapes(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{0B}'),
            '0'..='7' => {
                let mut value = next.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.extend(char::from_u32(value));
            }
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = chars.clone().take(width).collect();
                let decoded = (digits.len() == width)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(ch) => {
                        out.push(ch);
                        for _ in 0..width {
                            chars.next();
                        }
                    }
                    None => {
                        out.push('\\');
                        out.push(next);
                    }
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    out
}
