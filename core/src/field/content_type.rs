/*
 * content_type.rs
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

//! Content-Type header (RFC 2045).

use std::collections::HashMap;
use std::fmt;

use super::parameter::{parse_parameter_list, strip_comments, Parameter};
use crate::util::is_token;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    media_type: String,
    sub_type: String,
    parameter_map: HashMap<String, String>,
}

impl ContentType {
    /// Type names and parameter names are stored lower-cased.
    pub fn new(
        media_type: impl Into<String>,
        sub_type: impl Into<String>,
        parameters: Vec<Parameter>,
    ) -> Self {
        let mut parameter_map = HashMap::with_capacity(parameters.len());
        for param in parameters {
            parameter_map
                .entry(param.name().to_ascii_lowercase())
                .or_insert_with(|| param.value().to_owned());
        }
        Self {
            media_type: media_type.into().to_ascii_lowercase(),
            sub_type: sub_type.into().to_ascii_lowercase(),
            parameter_map,
        }
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    /// `type/subtype`.
    pub fn mime_type(&self) -> String {
        format!("{}/{}", self.media_type, self.sub_type)
    }

    pub fn is_mime_type(&self, media: &str, sub: &str) -> bool {
        self.media_type.eq_ignore_ascii_case(media) && self.sub_type.eq_ignore_ascii_case(sub)
    }

    pub fn is_multipart(&self) -> bool {
        self.media_type == "multipart"
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameter_map
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameter_map.contains_key(&name.to_ascii_lowercase())
    }

    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameter_map
    }

    pub fn boundary(&self) -> Option<&str> {
        self.parameter("boundary")
    }

    pub fn charset(&self) -> Option<&str> {
        self.parameter("charset")
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.media_type, self.sub_type)?;
        let mut names: Vec<_> = self.parameter_map.keys().collect();
        names.sort();
        for name in names {
            write!(f, "; {}=\"{}\"", name, self.parameter_map[name].replace('"', "\\\""))?;
        }
        Ok(())
    }
}

/// Parses a Content-Type value. `None` unless both type and subtype are tokens.
/// The first occurrence of a repeated parameter wins.
pub fn parse_content_type(value: &str) -> Option<ContentType> {
    let value = strip_comments(value);
    let (type_part, params_part) = match value.find(';') {
        Some(i) => (&value[..i], &value[i + 1..]),
        None => (&value[..], ""),
    };
    let (media, sub) = type_part.trim().split_once('/')?;
    let (media, sub) = (media.trim(), sub.trim());
    if !is_token(media) || !is_token(sub) {
        return None;
    }
    Some(ContentType::new(media, sub, parse_parameter_list(params_part)))
}
