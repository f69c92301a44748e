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

//! Parsing and merging of Gettext PO translation catalogs.
//!
//! The crate covers the full path from PO text to a reconciled catalog:
//! [`lexer`] turns raw text into tokens, [`parser`] builds a validated
//! [`catalog::Catalog`] from them, and [`merge`] reconciles an existing
//! locale catalog with an authoritative POT template while preserving the
//! human-entered translations. [`po_file`] holds the file-level entry
//! points and the serializer that renders a catalog back to PO syntax.

use std::fmt;

pub mod catalog;
pub mod lexer;
pub mod merge;
pub mod parser;
pub mod po_file;

/// A grammar violation or duplicate key found while reading a catalog.
///
/// Parsing never returns a partial catalog: the first error aborts the
/// file and carries the offending 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}
