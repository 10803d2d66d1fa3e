/*
 * parser.rs
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

//! Push parser: drives a [`MimeTokenStream`] and forwards each state to a [`ContentHandler`].

use std::cell::Cell;
use std::io::Read;
use std::rc::Rc;

use tracing::debug;

use crate::config::MimeConfig;
use crate::error::{MimeError, Result};
use crate::handler::ContentHandler;
use crate::stream::{EntityState, MimeTokenStream, RecursionMode};

/// Lets a handler end parsing early. Obtained from [`MimeStreamParser::stop_handle`].
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Rc<Cell<bool>>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.get()
    }
}

pub struct MimeStreamParser<H> {
    stream: MimeTokenStream,
    handler: H,
    content_decoding: bool,
    stop: StopHandle,
}

impl<H: ContentHandler> MimeStreamParser<H> {
    pub fn new(config: MimeConfig, handler: H) -> Self {
        Self::with_token_stream(MimeTokenStream::new(config), handler)
    }

    /// Wraps a preconfigured stream, e.g. one with a custom monitor or builders.
    pub fn with_token_stream(stream: MimeTokenStream, handler: H) -> Self {
        Self {
            stream,
            handler,
            content_decoding: false,
            stop: StopHandle::default(),
        }
    }

    /// Whether [`ContentHandler::body`] receives transfer-decoded content. Off by default.
    pub fn set_content_decoding(&mut self, decode: bool) {
        self.content_decoding = decode;
    }

    pub fn is_content_decoding(&self) -> bool {
        self.content_decoding
    }

    pub fn recursion_mode(&self) -> RecursionMode {
        self.stream.recursion_mode()
    }

    pub fn set_recursion_mode(&mut self, mode: RecursionMode) {
        self.stream.set_recursion_mode(mode);
    }

    pub fn is_raw(&self) -> bool {
        self.recursion_mode() == RecursionMode::Raw
    }

    /// Handle for stopping from inside a handler callback.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Discards the rest of the input being parsed; every started entity is still ended.
    pub fn stop(&mut self) {
        self.stop.stop();
        self.stream.stop();
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Parses `input` to the end, calling the handler for every state. A message with
    /// no header block is parsed headless when the configuration names a content type.
    pub fn parse<R: Read + 'static>(&mut self, input: R) -> Result<()> {
        self.stop.0.set(false);
        let headless = self.stream.config().headless_parsing().map(str::to_owned);
        match headless {
            Some(content_type) => {
                let field = self.stream.parse_headless(input, &content_type)?;
                self.handler.start_message()?;
                self.handler.start_header()?;
                self.handler.field(&field)?;
                self.handler.end_header()?;
            }
            None => self.stream.parse(input),
        }
        loop {
            if self.stop.is_stopped() {
                self.stream.stop();
            }
            match self.stream.state() {
                EntityState::StartMessage => self.handler.start_message()?,
                EntityState::EndMessage => self.handler.end_message()?,
                EntityState::RawEntity => {
                    let mut input = self.stream.content_stream()?;
                    self.handler.raw(&mut input)?;
                }
                EntityState::StartHeader => self.handler.start_header()?,
                EntityState::Field => {
                    if let Some(field) = self.stream.field() {
                        self.handler.field(field)?;
                    }
                }
                EntityState::EndHeader => self.handler.end_header()?,
                EntityState::StartMultipart => {
                    if let Some(body) = self.stream.body_descriptor() {
                        self.handler.start_multipart(body)?;
                    }
                }
                EntityState::EndMultipart => self.handler.end_multipart()?,
                EntityState::Preamble => {
                    let mut input = self.stream.content_stream()?;
                    self.handler.preamble(&mut input)?;
                }
                EntityState::Epilogue => {
                    let mut input = self.stream.content_stream()?;
                    self.handler.epilogue(&mut input)?;
                }
                EntityState::StartBodyPart => self.handler.start_body_part()?,
                EntityState::EndBodyPart => self.handler.end_body_part()?,
                EntityState::Body => {
                    let body = self
                        .stream
                        .body_descriptor()
                        .cloned()
                        .ok_or(MimeError::IllegalState("body without descriptor"))?;
                    let mut input = if self.content_decoding {
                        self.stream.decoded_content_stream()?
                    } else {
                        self.stream.content_stream()?
                    };
                    self.handler.body(&body, &mut input)?;
                }
                EntityState::EndOfStream => break,
            }
            self.stream.next()?;
        }
        debug!("parse complete");
        Ok(())
    }
}
