/*
 * config.rs
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

//! Parser limits and policy flags. Immutable once built; cloned into each parse.
//!
//! Limits are given as signed integers where zero or a negative value disables the limit,
//! and are read back as `Option`s (`None` meaning unbounded).

const DEFAULT_MAX_LINE_LEN: i64 = 1000;
const DEFAULT_MAX_HEADER_COUNT: i64 = 1000;
const DEFAULT_MAX_HEADER_LEN: i64 = 10000;
const UNLIMITED: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeConfig {
    strict_parsing: bool,
    max_line_len: i64,
    max_header_count: i64,
    max_header_len: i64,
    max_content_len: i64,
    count_line_numbers: bool,
    malformed_header_starts_body: bool,
    headless_parsing: Option<String>,
}

impl Default for MimeConfig {
    fn default() -> Self {
        Self {
            strict_parsing: false,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            max_header_count: DEFAULT_MAX_HEADER_COUNT,
            max_header_len: DEFAULT_MAX_HEADER_LEN,
            max_content_len: UNLIMITED,
            count_line_numbers: false,
            malformed_header_starts_body: false,
            headless_parsing: None,
        }
    }
}

impl MimeConfig {
    pub fn builder() -> MimeConfigBuilder {
        MimeConfigBuilder::default()
    }

    /// No limits at all.
    pub fn lenient() -> Self {
        Self::builder()
            .max_line_len(UNLIMITED)
            .max_header_count(UNLIMITED)
            .max_header_len(UNLIMITED)
            .max_content_len(UNLIMITED)
            .build()
    }

    /// Strict parsing; malformed headers are never reinterpreted as body.
    pub fn strict() -> Self {
        Self::builder()
            .strict_parsing(true)
            .malformed_header_starts_body(false)
            .build()
    }

    /// Builder seeded with this configuration.
    pub fn to_builder(&self) -> MimeConfigBuilder {
        MimeConfigBuilder {
            config: self.clone(),
        }
    }

    pub fn is_strict_parsing(&self) -> bool {
        self.strict_parsing
    }

    pub fn max_line_len(&self) -> Option<usize> {
        limit(self.max_line_len)
    }

    pub fn max_header_count(&self) -> Option<usize> {
        limit(self.max_header_count)
    }

    pub fn max_header_len(&self) -> Option<usize> {
        limit(self.max_header_len)
    }

    pub fn max_content_len(&self) -> Option<u64> {
        u64::try_from(self.max_content_len).ok().filter(|&n| n > 0)
    }

    pub fn is_count_line_numbers(&self) -> bool {
        self.count_line_numbers
    }

    pub fn is_malformed_header_starts_body(&self) -> bool {
        self.malformed_header_starts_body
    }

    /// Content type assumed for input without a header block.
    pub fn headless_parsing(&self) -> Option<&str> {
        self.headless_parsing.as_deref()
    }
}

fn limit(value: i64) -> Option<usize> {
    usize::try_from(value).ok().filter(|&n| n > 0)
}

#[derive(Debug, Clone, Default)]
pub struct MimeConfigBuilder {
    config: MimeConfig,
}

impl MimeConfigBuilder {
    pub fn strict_parsing(mut self, strict: bool) -> Self {
        self.config.strict_parsing = strict;
        self
    }

    pub fn max_line_len(mut self, len: i64) -> Self {
        self.config.max_line_len = len;
        self
    }

    pub fn max_header_count(mut self, count: i64) -> Self {
        self.config.max_header_count = count;
        self
    }

    pub fn max_header_len(mut self, len: i64) -> Self {
        self.config.max_header_len = len;
        self
    }

    pub fn max_content_len(mut self, len: i64) -> Self {
        self.config.max_content_len = len;
        self
    }

    pub fn count_line_numbers(mut self, count: bool) -> Self {
        self.config.count_line_numbers = count;
        self
    }

    pub fn malformed_header_starts_body(mut self, enabled: bool) -> Self {
        self.config.malformed_header_starts_body = enabled;
        self
    }

    pub fn headless_parsing(mut self, content_type: Option<impl Into<String>>) -> Self {
        self.config.headless_parsing = content_type.map(Into::into);
        self
    }

    pub fn build(self) -> MimeConfig {
        self.config
    }
}
