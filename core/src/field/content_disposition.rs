/*
 * content_disposition.rs
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

//! Content-Disposition header (RFC 2183).

use std::collections::HashMap;

use super::parameter::{parse_parameter_list, strip_comments, Parameter};
use crate::util::is_token;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition {
    disposition_type: String,
    parameter_map: HashMap<String, String>,
}

impl ContentDisposition {
    pub fn new(disposition_type: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        let mut parameter_map = HashMap::with_capacity(parameters.len());
        for param in parameters {
            parameter_map
                .entry(param.name().to_ascii_lowercase())
                .or_insert_with(|| param.value().to_owned());
        }
        Self {
            disposition_type: disposition_type.into().to_ascii_lowercase(),
            parameter_map,
        }
    }

    pub fn disposition_type(&self) -> &str {
        &self.disposition_type
    }

    pub fn is_disposition_type(&self, t: &str) -> bool {
        self.disposition_type.eq_ignore_ascii_case(t)
    }

    pub fn is_inline(&self) -> bool {
        self.disposition_type == "inline"
    }

    pub fn is_attachment(&self) -> bool {
        self.disposition_type == "attachment"
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameter_map
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameter_map
    }

    pub fn filename(&self) -> Option<&str> {
        self.parameter("filename")
    }

    /// `size` parameter, if present and numeric.
    pub fn size(&self) -> Option<u64> {
        self.parameter("size")?.trim().parse().ok()
    }
}

pub fn parse_content_disposition(value: &str) -> Option<ContentDisposition> {
    let value = strip_comments(value);
    let (disp_part, params_part) = match value.find(';') {
        Some(i) => (&value[..i], &value[i + 1..]),
        None => (&value[..], ""),
    };
    let disp_part = disp_part.trim();
    if !is_token(disp_part) {
        return None;
    }
    Some(ContentDisposition::new(disp_part, parse_parameter_list(params_part)))
}
