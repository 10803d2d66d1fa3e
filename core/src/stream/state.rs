/*
 * state.rs
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

use std::fmt;

/// Parser positions reported by [`MimeTokenStream::next`](super::MimeTokenStream::next).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityState {
    StartMessage,
    EndMessage,
    /// Unparsed entity, only produced in [`RecursionMode::Raw`].
    RawEntity,
    StartHeader,
    Field,
    EndHeader,
    StartMultipart,
    EndMultipart,
    Preamble,
    Epilogue,
    StartBodyPart,
    EndBodyPart,
    Body,
    EndOfStream,
}

impl EntityState {
    /// States in which a content stream can be obtained.
    pub fn has_content(self) -> bool {
        matches!(
            self,
            EntityState::Body
                | EntityState::Preamble
                | EntityState::Epilogue
                | EntityState::StartMultipart
                | EntityState::RawEntity
        )
    }
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityState::StartMessage => "Start message",
            EntityState::EndMessage => "End message",
            EntityState::RawEntity => "Raw entity",
            EntityState::StartHeader => "Start header",
            EntityState::Field => "Field",
            EntityState::EndHeader => "End header",
            EntityState::StartMultipart => "Start multipart",
            EntityState::EndMultipart => "End multipart",
            EntityState::Preamble => "Preamble",
            EntityState::Epilogue => "Epilogue",
            EntityState::StartBodyPart => "Start bodypart",
            EntityState::EndBodyPart => "End bodypart",
            EntityState::Body => "Body",
            EntityState::EndOfStream => "End of stream",
        })
    }
}

/// How nested structure is expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecursionMode {
    /// Embedded messages are parsed as child entities.
    #[default]
    Recurse,
    /// Embedded messages are left as opaque bodies.
    NoRecurse,
    /// Multipart and message structure is ignored: every header is followed by one body.
    Flat,
    /// Parts and embedded messages are handed out unparsed.
    Raw,
}
