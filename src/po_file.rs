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

//! Reading, writing and rendering PO files.
//!
//! [`parse`] and [`write`] are the file-level entry points; [`dump`]
//! renders a catalog to PO text. The rendered form is stable: dumping,
//! parsing and dumping again yields the same text, which is what lets
//! the merge orchestration skip writes when nothing changed.

use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::catalog::{Catalog, Message};
use crate::lexer;
use crate::parser;
use crate::ParseError;

/// Parse PO text into a catalog.
pub fn parse_str(text: &str) -> Result<Catalog, ParseError> {
    let tokens = lexer::tokenize(text)?;
    parser::parse(&tokens)
}

/// Read and parse the PO file at `path`.
pub fn parse(path: &Path) -> anyhow::Result<Catalog> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let catalog = parse_str(&text)
        .with_context(|| format!("Could not parse {} as PO file", path.display()))?;
    Ok(catalog)
}

/// Render `catalog` as PO text.
pub fn dump(catalog: &Catalog) -> String {
    let mut out = String::new();
    if !catalog.header.is_empty() {
        out.push_str("msgid \"\"\n");
        push_fragments(&mut out, "msgstr", &catalog.header);
    }
    for message in &catalog.messages {
        if !out.is_empty() {
            out.push('\n');
        }
        for comment in message.comments() {
            out.push_str(comment);
            out.push('\n');
        }
        for (file, line) in message.references() {
            out.push_str(&format!("#: {file}:{line}\n"));
        }
        if !message.flags().is_empty() {
            let flags: Vec<&str> = message.flags().iter().map(String::as_str).collect();
            out.push_str(&format!("#, {}\n", flags.join(" ")));
        }
        match message {
            Message::Singular(translation) => {
                push_fragments(&mut out, "msgid", &translation.msgid);
                push_fragments(&mut out, "msgstr", &translation.msgstr);
            }
            Message::Plural(translation) => {
                push_fragments(&mut out, "msgid", &translation.msgid);
                push_fragments(&mut out, "msgid_plural", &translation.msgid_plural);
                for (index, fragments) in &translation.msgstr {
                    push_fragments(&mut out, &format!("msgstr[{index}]"), fragments);
                }
            }
        }
    }
    out
}

/// Serialize `catalog` to `path`.
pub fn write(catalog: &Catalog, path: &Path) -> anyhow::Result<()> {
    fs::write(path, dump(catalog)).with_context(|| format!("Failed to write {}", path.display()))
}

/// Write `keyword "fragment"` plus one continuation line per extra
/// fragment.
fn push_fragments(out: &mut String, keyword: &str, fragments: &[String]) {
    let (first, rest) = match fragments.split_first() {
        Some((first, rest)) => (first.as_str(), rest),
        None => ("", &[] as &[String]),
    };
    out.push_str(&format!("{keyword} \"{}\"\n", escape(first)));
    for fragment in rest {
        out.push_str(&format!("\"{}\"\n", escape(fragment)));
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PluralTranslation, Translation};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn fragments(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn test_dump_singular() {
        let catalog = Catalog {
            header: fragments(&["", "Language: it\n"]),
            messages: vec![Message::Singular(Translation {
                msgid: fragments(&["hello"]),
                msgstr: fragments(&["ciao"]),
                comments: fragments(&["# translator note"]),
                flags: ["fuzzy"].iter().map(|s| s.to_string()).collect(),
                references: vec![("src/main.rs".to_string(), 4)],
                source_line: 0,
            })],
        };
        assert_eq!(
            dump(&catalog),
            "msgid \"\"\n\
             msgstr \"\"\n\
             \"Language: it\\n\"\n\
             \n\
             # translator note\n\
             #: src/main.rs:4\n\
             #, fuzzy\n\
             msgid \"hello\"\n\
             msgstr \"ciao\"\n"
        );
    }

    #[test]
    fn test_dump_plural() {
        let catalog = Catalog {
            header: Vec::new(),
            messages: vec![Message::Plural(PluralTranslation {
                msgid: fragments(&["one"]),
                msgid_plural: fragments(&["many"]),
                msgstr: BTreeMap::from([
                    (0, fragments(&["uno"])),
                    (1, fragments(&["molti"])),
                ]),
                ..PluralTranslation::default()
            })],
        };
        assert_eq!(
            dump(&catalog),
            "msgid \"one\"\n\
             msgid_plural \"many\"\n\
             msgstr[0] \"uno\"\n\
             msgstr[1] \"molti\"\n"
        );
    }

    #[test]
    fn test_dump_escapes() {
        let catalog = Catalog {
            header: Vec::new(),
            messages: vec![Message::Singular(Translation {
                msgid: fragments(&["a\nb\t\"c\"\\"]),
                msgstr: fragments(&[""]),
                ..Translation::default()
            })],
        };
        assert_eq!(
            dump(&catalog),
            "msgid \"a\\nb\\t\\\"c\\\"\\\\\"\nmsgstr \"\"\n"
        );
    }

    #[test]
    fn test_dump_parse_dump_is_stable() {
        let text = "msgid \"\"\n\
                    msgstr \"\"\n\
                    \"Language: fr\\n\"\n\
                    \"Plural-Forms: nplurals=2\\n\"\n\
                    \n\
                    # a comment\n\
                    #: lib/a.ex:1\n\
                    #: lib/b c.ex:22\n\
                    #, fuzzy\n\
                    msgid \"hel\"\n\
                    \"lo\"\n\
                    msgstr \"salut\"\n\
                    \n\
                    msgid \"one\"\n\
                    msgid_plural \"many\"\n\
                    msgstr[0] \"un\"\n\
                    msgstr[1] \"beaucoup\"\n";
        let first = dump(&parse_str(text).unwrap());
        let second = dump(&parse_str(&first).unwrap());
        assert_eq!(first, second);
        assert_eq!(first, text);
    }

    #[test]
    fn test_write_and_parse_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("it.po");
        let catalog = Catalog {
            header: fragments(&["Language: it\n"]),
            messages: vec![Message::Singular(Translation {
                msgid: fragments(&["hello"]),
                msgstr: fragments(&["ciao"]),
                source_line: 4,
                ..Translation::default()
            })],
        };
        write(&catalog, &path).unwrap();
        assert_eq!(parse(&path).unwrap(), catalog);
    }

    #[test]
    fn test_parse_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(parse(&dir.path().join("missing.po")).is_err());
    }
}
