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

//! The data model for PO catalogs.
//!
//! A [`Catalog`] is an ordered sequence of [`Message`] entries plus the
//! header taken from the distinguished entry with an empty `msgid`.
//! Messages are value objects: operations such as
//! [`Message::mark_as_fuzzy`] return updated copies and never mutate in
//! place, and the merge engine composes fresh messages instead of editing
//! its inputs.

use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;

/// A singular translation entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translation {
    /// Original-language message id, kept as the quoted fragments from
    /// the PO file. Fragments are concatenated for comparison and when
    /// deciding whether an entry is the header.
    pub msgid: Vec<String>,
    /// Translated text fragments.
    pub msgstr: Vec<String>,
    /// Translator and other comment lines, in source order. Reference
    /// (`#:`) and flag (`#,`) lines live in `references` and `flags`
    /// instead.
    pub comments: Vec<String>,
    /// Control flags such as `"fuzzy"`. Unknown flags are preserved.
    pub flags: BTreeSet<String>,
    /// `(file, line)` pairs parsed from `#:` comment lines.
    pub references: Vec<(String, usize)>,
    /// Line number of the `msgid` keyword in the source file.
    pub source_line: usize,
}

/// A plural translation entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluralTranslation {
    pub msgid: Vec<String>,
    pub msgid_plural: Vec<String>,
    /// Translations per plural-form index. The indices are whatever the
    /// source supplied and need not be contiguous.
    pub msgstr: BTreeMap<usize, Vec<String>>,
    pub comments: Vec<String>,
    pub flags: BTreeSet<String>,
    pub references: Vec<(String, usize)>,
    pub source_line: usize,
}

/// A catalog entry, either singular or plural.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Singular(Translation),
    Plural(PluralTranslation),
}

/// The identity key of a message within a catalog.
///
/// Two messages of different kinds never share a key, even when their
/// `msgid`s coincide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageKey {
    Singular { msgid: String },
    Plural { msgid: String, msgid_plural: String },
}

impl Message {
    /// The concatenated `msgid`.
    pub fn msgid(&self) -> String {
        match self {
            Message::Singular(translation) => translation.msgid.concat(),
            Message::Plural(translation) => translation.msgid.concat(),
        }
    }

    /// The identity key: `msgid` for singular messages,
    /// `(msgid, msgid_plural)` for plural ones.
    pub fn key(&self) -> MessageKey {
        match self {
            Message::Singular(translation) => MessageKey::Singular {
                msgid: translation.msgid.concat(),
            },
            Message::Plural(translation) => MessageKey::Plural {
                msgid: translation.msgid.concat(),
                msgid_plural: translation.msgid_plural.concat(),
            },
        }
    }

    /// Whether `self` and `other` identify the same message.
    pub fn is_same(&self, other: &Message) -> bool {
        self.key() == other.key()
    }

    pub fn comments(&self) -> &[String] {
        match self {
            Message::Singular(translation) => &translation.comments,
            Message::Plural(translation) => &translation.comments,
        }
    }

    pub fn flags(&self) -> &BTreeSet<String> {
        match self {
            Message::Singular(translation) => &translation.flags,
            Message::Plural(translation) => &translation.flags,
        }
    }

    pub fn references(&self) -> &[(String, usize)] {
        match self {
            Message::Singular(translation) => &translation.references,
            Message::Plural(translation) => &translation.references,
        }
    }

    pub fn source_line(&self) -> usize {
        match self {
            Message::Singular(translation) => translation.source_line,
            Message::Plural(translation) => translation.source_line,
        }
    }

    /// Whether extraction tooling stamped this message with source
    /// references. Hand-written messages have none.
    pub fn is_autogenerated(&self) -> bool {
        !self.references().is_empty()
    }

    /// Whether at least one reference path matches `exclude`. Messages
    /// without references are never protected.
    pub fn is_protected(&self, exclude: &Regex) -> bool {
        self.is_autogenerated() && self.references().iter().any(|(file, _)| exclude.is_match(file))
    }

    /// A copy of this message with the `"fuzzy"` flag set.
    pub fn mark_as_fuzzy(&self) -> Message {
        let mut message = self.clone();
        match &mut message {
            Message::Singular(translation) => translation.flags.insert("fuzzy".to_string()),
            Message::Plural(translation) => translation.flags.insert("fuzzy".to_string()),
        };
        message
    }
}

/// Find the first message in `messages` with the same key as `target`.
pub fn find<'a>(messages: &'a [Message], target: &Message) -> Option<&'a Message> {
    messages.iter().find(|message| message.is_same(target))
}

/// An ordered PO catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// The `msgstr` fragments of the entry with the empty `msgid`. Empty
    /// when the file has no header entry.
    pub header: Vec<String>,
    pub messages: Vec<Message>,
}
