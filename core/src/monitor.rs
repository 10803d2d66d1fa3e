/*
 * monitor.rs
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

//! Recoverable parse events and the monitors that decide whether they are fatal.

use std::fmt;

/// Recoverable irregularities met while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// End of stream inside the header block.
    HeadersPrematureEnd,
    /// Header line without a valid `name:` prefix.
    InvalidHeader,
    /// Whitespace between a header name and its colon (RFC 822 syntax).
    ObsoleteHeader,
    /// End of stream before the closing boundary of a multipart body.
    MimeBodyPrematureEnd,
}

impl Event {
    pub fn message(&self) -> &'static str {
        match self {
            Event::HeadersPrematureEnd => "Unexpected end of headers detected. Higher level boundary detected or EOF reached.",
            Event::InvalidHeader => "Invalid header encountered",
            Event::ObsoleteHeader => "Obsolete header encountered",
            Event::MimeBodyPrematureEnd => "Body part ended prematurely. Boundary detected in header or EOF reached.",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Strategy consulted for every recoverable event.
pub trait DecodeMonitor {
    /// Returns true to turn the event into a hard failure, false to carry on with `action`.
    fn warn(&self, message: &str, action: &str) -> bool;

    /// Whether the monitor wants to hear about events at all.
    fn is_listening(&self) -> bool {
        true
    }
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentMonitor;

impl DecodeMonitor for SilentMonitor {
    fn warn(&self, _message: &str, _action: &str) -> bool {
        false
    }

    fn is_listening(&self) -> bool {
        false
    }
}

/// Escalates every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictMonitor;

impl DecodeMonitor for StrictMonitor {
    fn warn(&self, _message: &str, _action: &str) -> bool {
        true
    }
}
