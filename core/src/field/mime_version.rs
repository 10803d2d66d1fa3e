/*
 * mime_version.rs
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

//! MIME-Version header (RFC 2045).

use std::fmt;

use super::parameter::strip_comments;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MimeVersion {
    pub major: u32,
    pub minor: u32,
}

impl MimeVersion {
    pub const V1_0: MimeVersion = MimeVersion { major: 1, minor: 0 };

    /// Accepts `major.minor` with optional comments and whitespace, e.g. `1.0 (generated)`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = strip_comments(s);
        let (major, minor) = s.split_once('.')?;
        let digits = |part: &str| -> Option<u32> {
            let part: String = part.chars().filter(|c| !c.is_whitespace()).collect();
            part.parse().ok()
        };
        Some(Self {
            major: digits(major)?,
            minor: digits(minor)?,
        })
    }
}

impl fmt::Display for MimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
