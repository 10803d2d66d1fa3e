/*
 * mod.rs
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

//! Pull parser: [`MimeTokenStream`] walks a message one [`EntityState`] at a time.
//!
//! ```no_run
//! use mimestream_core::{EntityState, MimeConfig, MimeTokenStream};
//! # fn main() -> mimestream_core::Result<()> {
//! let mut stream = MimeTokenStream::new(MimeConfig::default());
//! stream.parse(std::io::stdin());
//! loop {
//!     match stream.next()? {
//!         EntityState::Field => println!("{}", stream.field().unwrap()),
//!         EntityState::EndOfStream => break,
//!         _ => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod context;
mod entity;
mod raw;
mod state;

use std::io::Read;
use std::rc::Rc;

use tracing::{debug, trace};

use self::context::ParseContext;
use self::entity::{EntityStateMachine, MimeEntity};
pub use self::state::{EntityState, RecursionMode};
use crate::codec::TextReader;
use crate::config::MimeConfig;
use crate::descriptor::{BodyDescriptor, BodyDescriptorBuilder, DefaultBodyDescriptorBuilder};
use crate::error::{MimeError, Result};
use crate::field::{FieldBuilder, ParsedField, RawField, StrictFieldBuilder};
use crate::input::SharedInput;
use crate::monitor::{DecodeMonitor, SilentMonitor, StrictMonitor};

/// Streaming MIME parser. Nested entities are kept on an explicit stack, so the caller
/// sees one flat sequence of states however deep the message is.
pub struct MimeTokenStream {
    ctx: ParseContext,
    body_builder: Option<Box<dyn BodyDescriptorBuilder>>,
    entities: Vec<Box<dyn EntityStateMachine>>,
    state: EntityState,
    recursion_mode: RecursionMode,
    failed: bool,
}

impl Default for MimeTokenStream {
    fn default() -> Self {
        Self::new(MimeConfig::default())
    }
}

impl MimeTokenStream {
    /// Uses a [`StrictMonitor`] when `config` asks for strict parsing, a [`SilentMonitor`]
    /// otherwise, and a [`StrictFieldBuilder`] limited to the configured header length.
    pub fn new(config: MimeConfig) -> Self {
        let monitor: Rc<dyn DecodeMonitor> = if config.is_strict_parsing() {
            Rc::new(StrictMonitor)
        } else {
            Rc::new(SilentMonitor)
        };
        let field_builder = Box::new(StrictFieldBuilder::new(config.max_header_len()));
        Self {
            ctx: ParseContext {
                config,
                monitor,
                field_builder,
                stopped: false,
            },
            body_builder: None,
            entities: Vec::new(),
            state: EntityState::EndOfStream,
            recursion_mode: RecursionMode::default(),
            failed: false,
        }
    }

    pub fn with_monitor(mut self, monitor: Rc<dyn DecodeMonitor>) -> Self {
        self.ctx.monitor = monitor;
        self
    }

    pub fn with_field_builder(mut self, field_builder: Box<dyn FieldBuilder>) -> Self {
        self.ctx.field_builder = field_builder;
        self
    }

    /// Every parse starts from `body_builder.new_root()`.
    pub fn with_body_descriptor_builder(mut self, body_builder: Box<dyn BodyDescriptorBuilder>) -> Self {
        self.body_builder = Some(body_builder);
        self
    }

    /// Starts parsing `input`; the state is [`EntityState::StartMessage`] afterwards.
    pub fn parse<R: Read + 'static>(&mut self, input: R) {
        let builder = self.root_builder();
        self.start(Box::new(input), EntityState::StartMessage, builder);
    }

    /// Parses a body without a header block, typed by `content_type`. Advances once, to
    /// the first state after the header, and returns the synthetic Content-Type field.
    pub fn parse_headless<R: Read + 'static>(&mut self, input: R, content_type: &str) -> Result<RawField> {
        let field = RawField::new("Content-Type", content_type);
        let mut builder = self.root_builder();
        builder.add_field(&field)?;
        self.start(Box::new(input), EntityState::EndHeader, builder);
        self.next()?;
        Ok(field)
    }

    fn root_builder(&self) -> Box<dyn BodyDescriptorBuilder> {
        match &self.body_builder {
            Some(prototype) => prototype.new_root(),
            None => Box::new(DefaultBodyDescriptorBuilder::new(Rc::clone(&self.ctx.monitor))),
        }
    }

    fn start(&mut self, input: Box<dyn Read>, state: EntityState, builder: Box<dyn BodyDescriptorBuilder>) {
        let config = &self.ctx.config;
        let input = SharedInput::new(input, config.max_line_len(), config.is_count_line_numbers());
        let root = MimeEntity::new(
            input,
            builder,
            state,
            EntityState::EndMessage,
            self.recursion_mode,
            0,
        );
        self.ctx.field_builder.reset();
        self.ctx.stopped = false;
        self.entities.clear();
        self.entities.push(Box::new(root));
        self.state = state;
        self.failed = false;
        debug!(%state, mode = ?self.recursion_mode, "parse started");
    }

    /// Advances to the next state. Fails with [`MimeError::IllegalState`] after
    /// [`EntityState::EndOfStream`] or after an earlier failure.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<EntityState> {
        if self.failed {
            return Err(MimeError::IllegalState("parser failed earlier"));
        }
        if self.state == EntityState::EndOfStream {
            return Err(MimeError::IllegalState("no more tokens are available"));
        }
        self.advance().inspect_err(|e| {
            debug!(error = %e, "parse failed");
            self.failed = true;
        })
    }

    fn advance(&mut self) -> Result<EntityState> {
        while let Some(current) = self.entities.last_mut() {
            if let Some(child) = current.advance(&mut self.ctx)? {
                self.entities.push(child);
                trace!(depth = self.entities.len(), "entered child entity");
            }
            let Some(top) = self.entities.last() else {
                break;
            };
            self.state = top.state();
            if self.state != EntityState::EndOfStream {
                return Ok(self.state);
            }
            self.entities.pop();
            trace!(depth = self.entities.len(), "left entity");
            if let Some(parent) = self.entities.last_mut() {
                parent.set_recursion_mode(self.recursion_mode);
            }
        }
        self.state = EntityState::EndOfStream;
        Ok(self.state)
    }

    pub fn state(&self) -> EntityState {
        self.state
    }

    /// Current header field; `None` outside [`EntityState::Field`].
    pub fn field(&self) -> Option<&RawField> {
        self.entities.last()?.field()
    }

    /// Structured value of the current field, when the body descriptor builder parsed it.
    pub fn parsed_field(&self) -> Option<&ParsedField> {
        self.entities.last()?.parsed_field()
    }

    pub fn field_name(&self) -> Option<&str> {
        self.field().map(RawField::name)
    }

    pub fn field_value(&self) -> Option<&str> {
        self.field().map(RawField::body)
    }

    /// Descriptor of the current entity, available from [`EntityState::EndHeader`] on.
    pub fn body_descriptor(&self) -> Option<&BodyDescriptor> {
        self.entities.last()?.body_descriptor()
    }

    /// Undecoded content of the current body, preamble, epilogue or raw entity.
    pub fn content_stream(&mut self) -> Result<Box<dyn Read + '_>> {
        let entity = self
            .entities
            .last_mut()
            .ok_or(MimeError::IllegalState("no current entity"))?;
        entity.content_stream(&self.ctx)
    }

    /// Like [`content_stream`](Self::content_stream), with base64 and quoted-printable
    /// transfer encodings removed.
    pub fn decoded_content_stream(&mut self) -> Result<Box<dyn Read + '_>> {
        let entity = self
            .entities
            .last_mut()
            .ok_or(MimeError::IllegalState("no current entity"))?;
        entity.decoded_content_stream(&self.ctx)
    }

    /// Decoded content converted to UTF-8 from the body's charset.
    pub fn reader(&mut self) -> Result<TextReader<Box<dyn Read + '_>>> {
        let charset = self
            .body_descriptor()
            .and_then(BodyDescriptor::charset)
            .map(str::to_owned);
        let stream = self.decoded_content_stream()?;
        TextReader::new(stream, charset.as_deref())
    }

    pub fn is_raw(&self) -> bool {
        self.state == EntityState::RawEntity
    }

    pub fn recursion_mode(&self) -> RecursionMode {
        self.recursion_mode
    }

    /// Takes effect for entities created from now on, and for the current one.
    pub fn set_recursion_mode(&mut self, mode: RecursionMode) {
        self.recursion_mode = mode;
        if let Some(current) = self.entities.last_mut() {
            current.set_recursion_mode(mode);
        }
    }

    /// Discards the unread input. The remaining end states are still produced, so every
    /// start event gets its matching end event, and no further events are reported.
    pub fn stop(&mut self) {
        debug!(depth = self.entities.len(), "parse stopped");
        for entity in &mut self.entities {
            entity.stop();
        }
        self.ctx.stopped = true;
    }

    pub fn config(&self) -> &MimeConfig {
        &self.ctx.config
    }

    /// Line of the message the parser has read up to, when line counting is on.
    pub fn line_number(&self) -> Option<usize> {
        if !self.ctx.config.is_count_line_numbers() {
            return None;
        }
        self.entities.last().map(|entity| entity.line_number())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    const MULTIPART: &str = "Content-Type: multipart/mixed;boundary=1729\r\n\r\n\
        Hello!\r\n--1729\r\n\r\nblah\r\n--1729--\r\nBye";

    fn read_all(stream: &mut MimeTokenStream) -> String {
        let mut content = String::new();
        stream
            .content_stream()
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        content
    }

    #[test]
    fn multipart_sequence() {
        let mut stream = MimeTokenStream::default();
        stream.parse(MULTIPART.as_bytes());
        assert_eq!(stream.state(), EntityState::StartMessage);

        let mut seen = Vec::new();
        loop {
            let state = stream.next().unwrap();
            let detail = match state {
                EntityState::Field => stream.field_name().unwrap().to_owned(),
                EntityState::Preamble | EntityState::Body | EntityState::Epilogue => {
                    read_all(&mut stream)
                }
                _ => String::new(),
            };
            seen.push((state, detail));
            if state == EntityState::EndOfStream {
                break;
            }
        }
        let expected = [
            (EntityState::StartHeader, ""),
            (EntityState::Field, "Content-Type"),
            (EntityState::EndHeader, ""),
            (EntityState::StartMultipart, ""),
            (EntityState::Preamble, "Hello!"),
            (EntityState::StartBodyPart, ""),
            (EntityState::StartHeader, ""),
            (EntityState::EndHeader, ""),
            (EntityState::Body, "blah"),
            (EntityState::EndBodyPart, ""),
            (EntityState::Epilogue, "Bye"),
            (EntityState::EndMultipart, ""),
            (EntityState::EndMessage, ""),
            (EntityState::EndOfStream, ""),
        ];
        let seen: Vec<_> = seen.iter().map(|(s, d)| (*s, d.as_str())).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn next_after_end_of_stream() {
        let mut stream = MimeTokenStream::default();
        assert!(matches!(stream.next(), Err(MimeError::IllegalState(_))));
        stream.parse(&b"Subject: x\r\n\r\nbody"[..]);
        while stream.next().unwrap() != EntityState::EndOfStream {}
        assert!(matches!(stream.next(), Err(MimeError::IllegalState(_))));
    }

    #[test]
    fn failure_is_sticky() {
        let mut stream = MimeTokenStream::new(MimeConfig::strict());
        stream.parse(&b"Subject: x"[..]);
        assert_eq!(stream.next().unwrap(), EntityState::StartHeader);
        assert_eq!(stream.next().unwrap(), EntityState::Field);
        assert!(stream.next().is_err());
        assert!(matches!(stream.next(), Err(MimeError::IllegalState(_))));
    }

    #[test]
    fn field_only_in_field_state() {
        let mut stream = MimeTokenStream::default();
        stream.parse(&b"Subject: folded\r\n line\r\n\r\n"[..]);
        stream.next().unwrap();
        assert!(stream.field().is_none());
        stream.next().unwrap();
        assert_eq!(stream.field_value(), Some("folded line"));
        assert_eq!(stream.next().unwrap(), EntityState::EndHeader);
        assert!(stream.field().is_none());
        assert!(matches!(stream.content_stream(), Err(MimeError::IllegalState(_))));
    }

    #[test]
    fn reused_for_second_message() {
        let mut stream = MimeTokenStream::default();
        stream.parse(MULTIPART.as_bytes());
        stream.next().unwrap();
        stream.parse(&b"Content-Type: text/html\r\n\r\n<p>"[..]);
        let mut states = Vec::new();
        loop {
            let state = stream.next().unwrap();
            states.push(state);
            if state == EntityState::Body {
                assert_eq!(stream.body_descriptor().unwrap().mime_type(), "text/html");
            }
            if state == EntityState::EndOfStream {
                break;
            }
        }
        assert_eq!(states.len(), 6);
    }
}
