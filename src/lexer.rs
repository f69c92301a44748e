// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tokenizer for the PO file format.
//!
//! The format is line oriented:
//!
//! - `#` starts a comment line (`#:` references, `#,` flags, `#|`
//!   previous strings, plain `#` translator comments),
//! - `msgid`, `msgid_plural` and `msgstr` introduce quoted strings,
//! - `msgstr[N]` supplies the translation for plural form `N`,
//! - a line holding just a quoted string continues the previous keyword,
//! - quoted strings use `\"`, `\\`, `\n`, `\t` and `\r` escapes.
//!
//! The tokenizer decodes escapes and labels every token with the 1-based
//! line it starts on; the grammar itself is enforced by [`crate::parser`].

use crate::ParseError;

/// A lexical token and the line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// The `msgid` keyword.
    Msgid,
    /// The `msgid_plural` keyword.
    MsgidPlural,
    /// The `msgstr` keyword, also emitted for the `msgstr[N]` form.
    Msgstr,
    /// A decoded double-quoted string fragment.
    Str(String),
    /// The `[N]` index of a `msgstr[N]` line.
    PluralForm(usize),
    /// A raw comment line, including the leading `#` marker.
    Comment(String),
}

impl TokenKind {
    /// How the token reads in a syntax-error message.
    pub(crate) fn describe(&self) -> String {
        match self {
            TokenKind::Msgid => "msgid".to_string(),
            TokenKind::MsgidPlural => "msgid_plural".to_string(),
            TokenKind::Msgstr => "msgstr".to_string(),
            TokenKind::Str(value) => value.clone(),
            TokenKind::PluralForm(index) => format!("msgstr[{index}]"),
            TokenKind::Comment(comment) => comment.clone(),
        }
    }
}

/// Tokenize PO source text.
pub fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let lineno = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with('#') {
            tokens.push(Token {
                kind: TokenKind::Comment(trimmed.to_string()),
                line: lineno,
            });
            continue;
        }

        let mut rest = if let Some(after) = trimmed.strip_prefix("msgid_plural") {
            tokens.push(Token {
                kind: TokenKind::MsgidPlural,
                line: lineno,
            });
            after.trim_start()
        } else if let Some(after) = trimmed.strip_prefix("msgid") {
            tokens.push(Token {
                kind: TokenKind::Msgid,
                line: lineno,
            });
            after.trim_start()
        } else if let Some(after) = trimmed.strip_prefix("msgstr") {
            tokens.push(Token {
                kind: TokenKind::Msgstr,
                line: lineno,
            });
            let after = after.trim_start();
            match after.strip_prefix('[') {
                Some(bracketed) => {
                    let (index, after) = bracketed.split_once(']').ok_or_else(|| ParseError {
                        line: lineno,
                        message: "missing ']' after msgstr[".to_string(),
                    })?;
                    let index = index.trim().parse::<usize>().map_err(|_| ParseError {
                        line: lineno,
                        message: format!("invalid plural form index: '{}'", index.trim()),
                    })?;
                    tokens.push(Token {
                        kind: TokenKind::PluralForm(index),
                        line: lineno,
                    });
                    after.trim_start()
                }
                None => after,
            }
        } else if trimmed.starts_with('"') {
            trimmed
        } else {
            return Err(ParseError {
                line: lineno,
                message: format!("unknown keyword: '{trimmed}'"),
            });
        };

        while !rest.is_empty() {
            if !rest.starts_with('"') {
                return Err(ParseError {
                    line: lineno,
                    message: format!("unexpected text: '{rest}'"),
                });
            }
            let (value, remaining) = scan_string(rest, lineno)?;
            tokens.push(Token {
                kind: TokenKind::Str(value),
                line: lineno,
            });
            rest = remaining.trim_start();
        }
    }
    Ok(tokens)
}

/// Decode one quoted string starting at `rest` (which begins with `"`).
/// Returns the decoded value and the text after the closing quote.
fn scan_string(rest: &str, lineno: usize) -> Result<(String, &str), ParseError> {
    let mut value = String::new();
    let mut chars = rest[1..].char_indices();
    while let Some((idx, c)) = chars.next() {
        match c {
            '"' => return Ok((value, &rest[1 + idx + 1..])),
            '\\' => match chars.next() {
                Some((_, 'n')) => value.push('\n'),
                Some((_, 't')) => value.push('\t'),
                Some((_, 'r')) => value.push('\r'),
                Some((_, '"')) => value.push('"'),
                Some((_, '\\')) => value.push('\\'),
                Some((_, other)) => {
                    return Err(ParseError {
                        line: lineno,
                        message: format!("invalid escape: '\\{other}'"),
                    })
                }
                None => break,
            },
            _ => value.push(c),
        }
    }
    Err(ParseError {
        line: lineno,
        message: "unterminated string".to_string(),
    })
}
