/*
 * parsers.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Mimestream, a streaming MIME parser.
 *
 * Mimestream is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Mimestream is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Mimestream.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Registry of field body parsers keyed by lower-cased field name.

use std::collections::HashMap;
use std::fmt;

use super::content_disposition::{parse_content_disposition, ContentDisposition};
use super::content_id::{parse_content_id, ContentId};
use super::content_type::{parse_content_type, ContentType};
use super::mime_version::MimeVersion;
use super::RawField;
use crate::util::unfold;

/// Typed value of a recognised `Content-*` or `MIME-Version` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedField {
    ContentType(ContentType),
    ContentDisposition(ContentDisposition),
    ContentId(ContentId),
    ContentDescription(String),
    ContentLanguage(Vec<String>),
    ContentLocation(String),
    ContentMd5(String),
    MimeVersion(MimeVersion),
}

pub trait FieldParser {
    /// `None` when the body is not usable.
    fn parse(&self, body: &str) -> Option<ParsedField>;
}

impl<F> FieldParser for F
where
    F: Fn(&str) -> Option<ParsedField>,
{
    fn parse(&self, body: &str) -> Option<ParsedField> {
        self(body)
    }
}

pub struct FieldParsers {
    parsers: HashMap<String, Box<dyn FieldParser>>,
}

impl FieldParsers {
    pub fn empty() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Replaces any parser already registered under `name`.
    pub fn register(&mut self, name: &str, parser: impl FieldParser + 'static) {
        self.parsers.insert(name.to_ascii_lowercase(), Box::new(parser));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parsers.contains_key(&name.to_ascii_lowercase())
    }

    /// `None` when no parser is registered for the field or its body is unusable.
    pub fn parse(&self, field: &RawField) -> Option<ParsedField> {
        self.parsers
            .get(&field.name().to_ascii_lowercase())?
            .parse(field.body())
    }
}

impl Default for FieldParsers {
    fn default() -> Self {
        let mut parsers = Self::empty();
        parsers.register("content-type", |body: &str| {
            parse_content_type(body).map(ParsedField::ContentType)
        });
        parsers.register("content-disposition", |body: &str| {
            parse_content_disposition(body).map(ParsedField::ContentDisposition)
        });
        parsers.register("content-id", |body: &str| {
            parse_content_id(body).map(ParsedField::ContentId)
        });
        parsers.register("content-description", |body: &str| {
            Some(ParsedField::ContentDescription(body.trim().to_owned()))
        });
        parsers.register("content-language", parse_language);
        parsers.register("content-location", |body: &str| {
            let location: String = unfold(body).split_whitespace().collect();
            (!location.is_empty()).then_some(ParsedField::ContentLocation(location))
        });
        parsers.register("content-md5", |body: &str| {
            let digest = body.trim();
            (!digest.is_empty()).then(|| ParsedField::ContentMd5(digest.to_owned()))
        });
        parsers.register("mime-version", |body: &str| {
            MimeVersion::parse(body).map(ParsedField::MimeVersion)
        });
        parsers
    }
}

impl fmt::Debug for FieldParsers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.parsers.keys().collect();
        names.sort();
        f.debug_struct("FieldParsers").field("fields", &names).finish()
    }
}

/// Comma-separated language tags (RFC 3282), comments removed.
fn parse_language(body: &str) -> Option<ParsedField> {
    let body = super::parameter::strip_comments(body);
    let tags: Vec<String> = body
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect();
    (!tags.is_empty()).then_some(ParsedField::ContentLanguage(tags))
}
