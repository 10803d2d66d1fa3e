/*
 * content_id.rs
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

//! Content-ID (RFC 2045): &lt;local@domain&gt;

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentId {
    local_part: String,
    domain: String,
}

impl ContentId {
    pub fn new(local_part: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            local_part: local_part.into(),
            domain: domain.into(),
        }
    }

    pub fn local_part(&self) -> &str {
        &self.local_part
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}@{}>", self.local_part, self.domain)
    }
}

/// Parse a single Content-ID value, with or without angle brackets.
pub fn parse_content_id(value: &str) -> Option<ContentId> {
    let value = value.trim();
    let value = value.strip_prefix('<').unwrap_or(value);
    let value = value.strip_suffix('>').unwrap_or(value);
    let (local, domain) = value.rsplit_once('@')?;
    let (local, domain) = (local.trim(), domain.trim());
    if local.is_empty() || domain.is_empty() {
        return None;
    }
    Some(ContentId::new(local, domain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracketed_and_bare() {
        let id = parse_content_id(" <part1.abc@example.com> ").unwrap();
        assert_eq!(id.local_part(), "part1.abc");
        assert_eq!(id.domain(), "example.com");
        assert_eq!(id.to_string(), "<part1.abc@example.com>");
        assert_eq!(parse_content_id("x@y"), Some(ContentId::new("x", "y")));
    }

    #[test]
    fn rejects_incomplete() {
        assert!(parse_content_id("<>").is_none());
        assert!(parse_content_id("<nodomain@>").is_none());
        assert!(parse_content_id("no-at-sign").is_none());
    }
}
