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

//! Parser turning a PO token stream into a validated [`Catalog`].
//!
//! The grammar is order dependent: comments bind to the `msgid` that
//! immediately follows them, a `msgid` takes one or more string
//! fragments, an optional `msgid_plural` makes the entry plural, and the
//! translation is a single `msgstr` (singular) or one or more
//! `msgstr[N]` groups (plural). Any token that cannot extend the current
//! state aborts parsing with a syntax error at that token's line, and a
//! repeated identity key aborts with a duplicate error at the first
//! occurrence's line.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::OnceLock;

use regex::Regex;

use crate::catalog::{Catalog, Message, MessageKey, PluralTranslation, Translation};
use crate::lexer::{Token, TokenKind};
use crate::ParseError;

/// Matches one `file:line` reference inside a `#:` comment. Filenames
/// may contain spaces but not colons.
fn reference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([^:\s][^:]*):(\d+)").unwrap())
}

struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// A syntax error at the upcoming token, or at end of input.
    fn syntax_error(&self) -> ParseError {
        match self.peek() {
            Some(token) => syntax_error(token.line, &token.kind.describe()),
            None => {
                let line = self.tokens.last().map_or(0, |token| token.line);
                syntax_error(line, "end of file")
            }
        }
    }
}

fn syntax_error(line: usize, token: &str) -> ParseError {
    ParseError {
        line,
        message: format!("syntax error before: {token}"),
    }
}

/// Parse a token stream into a catalog.
///
/// The header is taken from the first entry when it is singular with an
/// empty `msgid`; that entry is excluded from the message list and from
/// duplicate detection. An empty token stream parses to an empty
/// catalog.
pub fn parse(tokens: &[Token]) -> Result<Catalog, ParseError> {
    let mut cursor = Cursor { tokens, pos: 0 };
    let mut catalog = Catalog::default();
    let mut seen: HashMap<MessageKey, usize> = HashMap::new();
    let mut first = true;

    loop {
        let mut raw_comments = Vec::new();
        while let Some(token) = cursor.peek() {
            match &token.kind {
                TokenKind::Comment(text) => {
                    raw_comments.push(text.clone());
                    cursor.bump();
                }
                _ => break,
            }
        }

        let Some(token) = cursor.bump() else {
            if raw_comments.is_empty() {
                break;
            }
            // Comments that precede nothing cannot be attached.
            return Err(cursor.syntax_error());
        };
        if token.kind != TokenKind::Msgid {
            return Err(syntax_error(token.line, &token.kind.describe()));
        }

        let source_line = token.line;
        let msgid = parse_fragments(&mut cursor)?;
        let (comments, references, flags) = split_comments(raw_comments);

        let message = match cursor.peek().map(|token| &token.kind) {
            Some(TokenKind::MsgidPlural) => {
                cursor.bump();
                let msgid_plural = parse_fragments(&mut cursor)?;
                let msgstr = parse_plural_groups(&mut cursor)?;
                Message::Plural(PluralTranslation {
                    msgid,
                    msgid_plural,
                    msgstr,
                    comments,
                    flags,
                    references,
                    source_line,
                })
            }
            _ => {
                match cursor.peek().map(|token| &token.kind) {
                    Some(TokenKind::Msgstr) => cursor.bump(),
                    _ => return Err(cursor.syntax_error()),
                };
                // `msgstr[N]` needs a preceding `msgid_plural`.
                if let Some(token) = cursor.peek() {
                    if matches!(token.kind, TokenKind::PluralForm(_)) {
                        return Err(syntax_error(token.line, &token.kind.describe()));
                    }
                }
                let msgstr = parse_fragments(&mut cursor)?;
                Message::Singular(Translation {
                    msgid,
                    msgstr,
                    comments,
                    flags,
                    references,
                    source_line,
                })
            }
        };

        if first {
            first = false;
            if let Message::Singular(translation) = &message {
                if translation.msgid.concat().is_empty() {
                    catalog.header = translation.msgstr.clone();
                    continue;
                }
            }
        }

        let key = message.key();
        if let Some(&original_line) = seen.get(&key) {
            return Err(duplicate_error(&key, original_line));
        }
        seen.insert(key, message.source_line());
        catalog.messages.push(message);
    }

    Ok(catalog)
}

/// One or more consecutive string fragments.
fn parse_fragments(cursor: &mut Cursor) -> Result<Vec<String>, ParseError> {
    let mut fragments = Vec::new();
    while let Some(token) = cursor.peek() {
        match &token.kind {
            TokenKind::Str(value) => {
                fragments.push(value.clone());
                cursor.bump();
            }
            _ => break,
        }
    }
    if fragments.is_empty() {
        return Err(cursor.syntax_error());
    }
    Ok(fragments)
}

/// One or more `msgstr` + `msgstr[N]` + fragments groups.
fn parse_plural_groups(cursor: &mut Cursor) -> Result<BTreeMap<usize, Vec<String>>, ParseError> {
    let mut forms = BTreeMap::new();
    loop {
        match cursor.peek().map(|token| &token.kind) {
            Some(TokenKind::Msgstr) => cursor.bump(),
            _ if forms.is_empty() => return Err(cursor.syntax_error()),
            _ => break,
        };
        let Some(token) = cursor.peek() else {
            return Err(cursor.syntax_error());
        };
        match &token.kind {
            TokenKind::PluralForm(index) => {
                let index = *index;
                cursor.bump();
                forms.insert(index, parse_fragments(cursor)?);
            }
            // A singular-style `msgstr` after `msgid_plural`.
            kind => return Err(syntax_error(token.line, &kind.describe())),
        }
    }
    Ok(forms)
}

fn duplicate_error(key: &MessageKey, original_line: usize) -> ParseError {
    let message = match key {
        MessageKey::Singular { msgid } => {
            format!("found duplicate on line {original_line} for msgid: '{msgid}'")
        }
        MessageKey::Plural {
            msgid,
            msgid_plural,
        } => format!(
            "found duplicate on line {original_line} for msgid: '{msgid}' \
             and msgid_plural: '{msgid_plural}'"
        ),
    };
    ParseError {
        line: original_line,
        message,
    }
}

/// Split raw comment lines into translator comments, `#:` references
/// and `#,` flags. Malformed reference text is ignored; unknown flags
/// are kept.
fn split_comments(
    raw: Vec<String>,
) -> (Vec<String>, Vec<(String, usize)>, BTreeSet<String>) {
    let mut comments = Vec::new();
    let mut references = Vec::new();
    let mut flags = BTreeSet::new();
    for line in raw {
        if let Some(contents) = line.strip_prefix("#:") {
            for captures in reference_regex().captures_iter(contents) {
                if let Ok(lineno) = captures[2].parse::<usize>() {
                    references.push((captures[1].to_string(), lineno));
                }
            }
        } else if let Some(contents) = line.strip_prefix("#,") {
            for flag in contents.split([',', ' ']) {
                let flag = flag.trim();
                if !flag.is_empty() {
                    flags.insert(flag.to_string());
                }
            }
        } else {
            comments.push(line);
        }
    }
    (comments, references, flags)
}
