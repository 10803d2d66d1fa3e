/*
 * lib.rs
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

//! Streaming, pull-based MIME parser (RFC 2045/2046, RFC 5322 headers).
//!
//! [`MimeTokenStream`] turns a byte stream into a flat sequence of [`EntityState`]s with
//! header fields, body descriptors and content streams along the way, reading no more
//! than the current line or buffer. [`MimeStreamParser`] drives the same stream and
//! pushes every state to a [`ContentHandler`].

pub mod codec;
mod config;
pub mod descriptor;
mod error;
pub mod field;
mod handler;
pub mod input;
mod monitor;
mod parser;
mod stream;
pub mod util;

pub use codec::{decoded, TextReader};
pub use config::{MimeConfig, MimeConfigBuilder};
pub use descriptor::{
    BodyDescriptor, BodyDescriptorBuilder, ContentFields, DefaultBodyDescriptorBuilder,
    MaximalBodyDescriptorBuilder,
};
pub use error::{MimeError, Result};
pub use field::{
    FieldBuilder, FieldParser, FieldParsers, LenientFieldBuilder, ParsedField, RawField,
    StrictFieldBuilder,
};
pub use handler::ContentHandler;
pub use monitor::{DecodeMonitor, Event, SilentMonitor, StrictMonitor};
pub use parser::{MimeStreamParser, StopHandle};
pub use stream::{EntityState, MimeTokenStream, RecursionMode};
