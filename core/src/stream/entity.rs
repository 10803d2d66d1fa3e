/*
 * entity.rs
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

use std::io::{self, Read};

use bytes::BytesMut;
use tracing::{debug, trace};

use super::context::ParseContext;
use super::raw::RawEntity;
use super::state::{EntityState, RecursionMode};
use crate::codec;
use crate::descriptor::{BodyDescriptor, BodyDescriptorBuilder};
use crate::error::{MimeError, Result};
use crate::field::{ParsedField, RawField};
use crate::input::{LimitedReader, SharedInput};
use crate::monitor::Event;
use crate::util::{content_len, is_message, is_multipart, is_valid_boundary};

/// One level of the parse: a message, body part or raw entity.
pub(crate) trait EntityStateMachine {
    fn state(&self) -> EntityState;

    fn set_recursion_mode(&mut self, mode: RecursionMode);

    /// Moves to the next state. Returns the child entity when the parser has to descend
    /// into a body part or an embedded message.
    fn advance(&mut self, ctx: &mut ParseContext) -> Result<Option<Box<dyn EntityStateMachine>>>;

    /// Current field, only in [`EntityState::Field`].
    fn field(&self) -> Option<&RawField>;

    fn parsed_field(&self) -> Option<&ParsedField>;

    fn body_descriptor(&self) -> Option<&BodyDescriptor>;

    fn content_stream(&mut self, ctx: &ParseContext) -> Result<Box<dyn Read + '_>>;

    fn decoded_content_stream(&mut self, ctx: &ParseContext) -> Result<Box<dyn Read + '_>>;

    /// Lines consumed since the start of the message.
    fn line_number(&self) -> usize;

    /// Drops unread input; remaining states are still produced.
    fn stop(&mut self);
}

type Child = Option<Box<dyn EntityStateMachine>>;

pub(crate) struct MimeEntity {
    state: EntityState,
    end_state: EntityState,
    recursion_mode: RecursionMode,
    input: SharedInput,
    body_builder: Box<dyn BodyDescriptorBuilder>,
    body: Option<BodyDescriptor>,
    field: Option<RawField>,
    parsed_field: Option<ParsedField>,
    /// Look-ahead line: the first line of the next field, or the blank line ending the header.
    line_buf: BytesMut,
    /// Physical lines of the field being read.
    field_buf: BytesMut,
    header_count: usize,
    end_of_header: bool,
    /// End of input inside the header, reported once the last field was handed out.
    headers_premature_end: bool,
    base_line: usize,
    field_line: usize,
}

impl MimeEntity {
    pub fn new(
        input: SharedInput,
        body_builder: Box<dyn BodyDescriptorBuilder>,
        start_state: EntityState,
        end_state: EntityState,
        recursion_mode: RecursionMode,
        base_line: usize,
    ) -> Self {
        let headless = start_state == EntityState::EndHeader;
        Self {
            state: start_state,
            end_state,
            recursion_mode,
            input,
            body: headless.then(|| body_builder.build()),
            body_builder,
            field: None,
            parsed_field: None,
            line_buf: BytesMut::with_capacity(128),
            field_buf: BytesMut::with_capacity(128),
            header_count: 0,
            end_of_header: headless,
            headers_premature_end: false,
            base_line,
            field_line: base_line + 1,
        }
    }

    fn current_line(&self) -> usize {
        let pending = usize::from(self.line_buf.last() == Some(&b'\n'));
        (self.base_line + self.input.lines_consumed()).saturating_sub(pending)
    }

    fn descriptor(&self) -> Result<&BodyDescriptor> {
        self.body
            .as_ref()
            .ok_or(MimeError::IllegalState("body descriptor not available before end of header"))
    }

    /// Reads the next header field. Returns false at the end of the header.
    fn next_field(&mut self, ctx: &mut ParseContext) -> Result<bool> {
        self.field = None;
        self.parsed_field = None;
        loop {
            if self.end_of_header {
                if std::mem::take(&mut self.headers_premature_end) {
                    self.field_line = self.current_line() + 1;
                    ctx.report(Event::HeadersPrematureEnd, ctx.line(self.field_line))?;
                }
                self.line_buf.clear();
                self.body = Some(self.body_builder.build());
                return Ok(false);
            }
            ctx.field_builder.reset();
            self.field_buf.clear();
            self.field_line = self.current_line() + 1;
            self.read_raw_field(ctx)?;
            if self.field_buf.is_empty() {
                continue;
            }
            self.header_count += 1;
            if ctx
                .config
                .max_header_count()
                .is_some_and(|max| self.header_count > max)
            {
                return Err(MimeError::MaxHeaderCount);
            }
            match ctx.field_builder.build() {
                Ok(Some(field)) => {
                    if field.is_obsolete_syntax() {
                        ctx.report(Event::ObsoleteHeader, ctx.line(self.field_line))?;
                    }
                    self.parsed_field = self.body_builder.add_field(&field)?;
                    self.field = Some(field);
                    return Ok(true);
                }
                Ok(None) => {}
                Err(MimeError::InvalidField(reason)) => {
                    debug!(line = self.field_line, %reason, "invalid header field");
                    ctx.report(Event::InvalidHeader, ctx.line(self.field_line))?;
                    if ctx.config.is_malformed_header_starts_body() {
                        self.push_back_field(ctx)?;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Collects one field and its continuation lines, leaving the next line in `line_buf`.
    fn read_raw_field(&mut self, ctx: &mut ParseContext) -> Result<()> {
        loop {
            if !self.line_buf.is_empty() {
                ctx.field_builder.append(&self.line_buf)?;
                self.field_buf.extend_from_slice(&self.line_buf);
                self.line_buf.clear();
            }
            if self.input.read_line(&mut self.line_buf)? == 0 {
                self.end_of_header = true;
                self.headers_premature_end = true;
                return Ok(());
            }
            if content_len(&self.line_buf) == 0 {
                self.end_of_header = true;
                return Ok(());
            }
            if !self.field_buf.is_empty() && !matches!(self.line_buf[0], b' ' | b'\t') {
                return Ok(());
            }
        }
    }

    /// Returns the malformed field and the look-ahead line to the input; the body starts there.
    fn push_back_field(&mut self, ctx: &ParseContext) -> Result<()> {
        let raw = ctx
            .field_builder
            .raw()
            .ok_or(MimeError::Event(Event::InvalidHeader))?;
        let mut pushback = BytesMut::with_capacity(raw.len() + self.line_buf.len());
        pushback.extend_from_slice(raw);
        pushback.extend_from_slice(&self.line_buf);
        if !self.input.unread(&pushback) {
            return Err(MimeError::Event(Event::InvalidHeader));
        }
        debug!(line = self.field_line, "malformed header starts body");
        self.line_buf.clear();
        self.end_of_header = true;
        self.headers_premature_end = false;
        Ok(())
    }

    fn end_header(&mut self, ctx: &ParseContext) -> Result<Child> {
        let mime_type = self.descriptor()?.mime_type();
        if self.recursion_mode == RecursionMode::Flat {
            self.state = EntityState::Body;
        } else if is_multipart(mime_type) {
            self.state = EntityState::StartMultipart;
            self.input.close_part();
        } else if self.recursion_mode != RecursionMode::NoRecurse && is_message(mime_type) {
            self.state = EntityState::Body;
            return self.next_message(ctx).map(Some);
        } else {
            self.state = EntityState::Body;
        }
        Ok(None)
    }

    fn start_multipart(&mut self, ctx: &ParseContext) -> Result<Child> {
        if self.input.is_used() {
            // the caller consumed the raw multipart body
            self.drain(ctx)?;
            self.state = EntityState::EndMultipart;
            return Ok(None);
        }
        self.create_part(ctx)?;
        self.state = EntityState::Preamble;
        if !self.input.part_is_empty() {
            return Ok(None);
        }
        self.next_part(ctx)
    }

    /// Finishes the current part; descends into the next one or moves on to the epilogue.
    fn next_part(&mut self, ctx: &ParseContext) -> Result<Child> {
        self.drain(ctx)?;
        if self.input.part_eof() && !self.input.part_is_last() {
            ctx.report(Event::MimeBodyPrematureEnd, ctx.line(self.current_line()))?;
        } else if !self.input.part_is_last() {
            self.create_part(ctx)?;
            let source = Box::new(self.input.lower_reader());
            return Ok(Some(self.child_entity(
                ctx,
                EntityState::StartBodyPart,
                EntityState::EndBodyPart,
                source,
            )));
        }
        let empty = self.input.part_fully_consumed()?;
        self.input.close_part();
        self.state = if empty {
            EntityState::EndMultipart
        } else {
            EntityState::Epilogue
        };
        Ok(None)
    }

    fn create_part(&self, ctx: &ParseContext) -> Result<()> {
        let boundary = self
            .descriptor()?
            .boundary()
            .ok_or_else(|| MimeError::InvalidBoundary("missing boundary parameter".to_owned()))?;
        if boundary.is_empty() {
            return Err(MimeError::InvalidBoundary("empty boundary".to_owned()));
        }
        if let Some(max) = ctx.config.max_line_len().filter(|&max| boundary.len() + 2 > max) {
            return Err(MimeError::InvalidBoundary(format!(
                "{} bytes do not fit in a line of {max}",
                boundary.len()
            )));
        }
        let strict = ctx.config.is_strict_parsing();
        if strict && !is_valid_boundary(boundary) {
            return Err(MimeError::InvalidBoundary(boundary.to_owned()));
        }
        trace!(boundary, "opening part");
        self.input.open_part(boundary, strict)?;
        Ok(())
    }

    fn next_message(&self, ctx: &ParseContext) -> Result<Box<dyn EntityStateMachine>> {
        let transfer_encoding = self.descriptor()?.transfer_encoding();
        let source = codec::decoded(Box::new(self.input.lower_reader()), transfer_encoding);
        Ok(self.child_entity(ctx, EntityState::StartMessage, EntityState::EndMessage, source))
    }

    fn child_entity(
        &self,
        ctx: &ParseContext,
        start_state: EntityState,
        end_state: EntityState,
        source: Box<dyn Read>,
    ) -> Box<dyn EntityStateMachine> {
        let line = self.current_line();
        if self.recursion_mode == RecursionMode::Raw {
            debug!(line, "raw entity");
            return Box::new(RawEntity::new(
                source,
                line,
                ctx.config.max_content_len(),
            ));
        }
        debug!(state = %start_state, line, "child entity");
        let config = &ctx.config;
        let input = SharedInput::new(
            source,
            config.max_line_len(),
            config.is_count_line_numbers(),
        );
        Box::new(MimeEntity::new(
            input,
            self.body_builder.new_child(),
            start_state,
            end_state,
            self.recursion_mode,
            line,
        ))
    }

    /// Reads whatever the data stream still holds.
    fn drain(&self, ctx: &ParseContext) -> Result<()> {
        if !self.input.data_eof() {
            io::copy(&mut self.limited_stream(ctx), &mut io::sink())?;
        }
        Ok(())
    }

    fn limited_stream(&self, ctx: &ParseContext) -> Box<dyn Read> {
        let reader = self.input.reader();
        match ctx.config.max_content_len() {
            Some(limit) => Box::new(LimitedReader::new(reader, limit)),
            None => Box::new(reader),
        }
    }

    fn check_content_state(&self) -> Result<()> {
        if self.state.has_content() {
            Ok(())
        } else {
            Err(MimeError::IllegalState("no content stream in this state"))
        }
    }
}

impl EntityStateMachine for MimeEntity {
    fn state(&self) -> EntityState {
        self.state
    }

    fn set_recursion_mode(&mut self, mode: RecursionMode) {
        self.recursion_mode = mode;
    }

    fn advance(&mut self, ctx: &mut ParseContext) -> Result<Child> {
        let child = match self.state {
            EntityState::StartMessage | EntityState::StartBodyPart => {
                self.state = EntityState::StartHeader;
                None
            }
            EntityState::StartHeader | EntityState::Field => {
                let more = self
                    .next_field(ctx)
                    .map_err(|e| e.at_line(ctx.line(self.field_line)))?;
                self.state = if more {
                    EntityState::Field
                } else {
                    EntityState::EndHeader
                };
                None
            }
            EntityState::EndHeader => self.end_header(ctx)?,
            EntityState::StartMultipart => self.start_multipart(ctx)?,
            EntityState::Preamble => self.next_part(ctx)?,
            EntityState::Epilogue => {
                self.state = EntityState::EndMultipart;
                None
            }
            EntityState::Body | EntityState::EndMultipart => {
                self.state = self.end_state;
                None
            }
            state if state == self.end_state => {
                self.state = EntityState::EndOfStream;
                None
            }
            _ => return Err(MimeError::IllegalState("entity already finished")),
        };
        trace!(state = %self.state, "entity advanced");
        Ok(child)
    }

    fn field(&self) -> Option<&RawField> {
        match self.state {
            EntityState::Field => self.field.as_ref(),
            _ => None,
        }
    }

    fn parsed_field(&self) -> Option<&ParsedField> {
        match self.state {
            EntityState::Field => self.parsed_field.as_ref(),
            _ => None,
        }
    }

    fn body_descriptor(&self) -> Option<&BodyDescriptor> {
        self.body.as_ref()
    }

    fn content_stream(&mut self, ctx: &ParseContext) -> Result<Box<dyn Read + '_>> {
        self.check_content_state()?;
        Ok(self.limited_stream(ctx))
    }

    fn decoded_content_stream(&mut self, ctx: &ParseContext) -> Result<Box<dyn Read + '_>> {
        self.check_content_state()?;
        let transfer_encoding = self.descriptor()?.transfer_encoding();
        Ok(codec::decoded(self.limited_stream(ctx), transfer_encoding))
    }

    fn line_number(&self) -> usize {
        self.current_line()
    }

    fn stop(&mut self) {
        self.input.truncate();
    }
}
