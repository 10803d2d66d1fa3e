/*
 * default.rs
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

use std::rc::Rc;

use tracing::{debug, warn};

use super::{BodyDescriptor, BodyDescriptorBuilder};
use crate::error::{MimeError, Result};
use crate::field::{parse_content_type, ContentType, ParsedField, RawField};
use crate::monitor::DecodeMonitor;
use crate::util::is_same_mime_type;

const CONTENT_TYPE: &str = "content-type";
const CONTENT_TRANSFER_ENCODING: &str = "content-transfer-encoding";
const CONTENT_LENGTH: &str = "content-length";

/// Understands Content-Type, Content-Transfer-Encoding and Content-Length.
/// The first occurrence of each wins, even when its value turns out unusable.
pub struct DefaultBodyDescriptorBuilder {
    parent_mime_type: Option<String>,
    monitor: Rc<dyn DecodeMonitor>,
    content_type: Option<ContentType>,
    transfer_encoding: Option<String>,
    content_length: Option<u64>,
    seen_content_type: bool,
    seen_transfer_encoding: bool,
    seen_content_length: bool,
}

impl DefaultBodyDescriptorBuilder {
    pub fn new(monitor: Rc<dyn DecodeMonitor>) -> Self {
        Self::with_parent(None, monitor)
    }

    /// Builder for an entity nested in a body of type `parent_mime_type`.
    pub fn with_parent(parent_mime_type: Option<String>, monitor: Rc<dyn DecodeMonitor>) -> Self {
        Self {
            parent_mime_type,
            monitor,
            content_type: None,
            transfer_encoding: None,
            content_length: None,
            seen_content_type: false,
            seen_transfer_encoding: false,
            seen_content_length: false,
        }
    }

    /// Whether `name` is one of the fields this builder interprets.
    pub fn recognises(name: &str) -> bool {
        [CONTENT_TYPE, CONTENT_TRANSFER_ENCODING, CONTENT_LENGTH]
            .iter()
            .any(|known| name.eq_ignore_ascii_case(known))
    }

    pub(crate) fn monitor(&self) -> &Rc<dyn DecodeMonitor> {
        &self.monitor
    }

    pub(crate) fn child(&self) -> Self {
        Self::with_parent(Some(self.resolved_mime_type()), Rc::clone(&self.monitor))
    }

    fn resolved_mime_type(&self) -> String {
        match &self.content_type {
            Some(ct) => ct.mime_type(),
            None if self.parent_is_digest() => "message/rfc822".to_owned(),
            None => "text/plain".to_owned(),
        }
    }

    fn parent_is_digest(&self) -> bool {
        is_same_mime_type(self.parent_mime_type.as_deref(), "multipart/digest")
    }

    fn add_content_type(&mut self, field: &RawField) -> Option<ParsedField> {
        let content_type = parse_content_type(field.body())?;
        if content_type.is_multipart() && content_type.boundary().is_none() {
            debug!(content_type = %content_type, "multipart type without boundary, using default type");
        } else {
            self.content_type = Some(content_type.clone());
        }
        Some(ParsedField::ContentType(content_type))
    }

    fn add_content_length(&mut self, field: &RawField) -> Result<()> {
        let value = field.body().trim();
        match value.parse::<u64>() {
            Ok(length) => self.content_length = Some(length),
            Err(_) => {
                if self
                    .monitor
                    .warn(&format!("Invalid content length: {value}"), "ignoring Content-Length header")
                {
                    return Err(MimeError::InvalidField(format!(
                        "invalid Content-Length header: {value}"
                    )));
                }
                warn!(value, "ignoring invalid Content-Length header");
            }
        }
        Ok(())
    }
}

impl BodyDescriptorBuilder for DefaultBodyDescriptorBuilder {
    fn reset(&mut self) {
        self.content_type = None;
        self.transfer_encoding = None;
        self.content_length = None;
        self.seen_content_type = false;
        self.seen_transfer_encoding = false;
        self.seen_content_length = false;
    }

    fn add_field(&mut self, field: &RawField) -> Result<Option<ParsedField>> {
        let name = field.name();
        if name.eq_ignore_ascii_case(CONTENT_TYPE) {
            if !std::mem::replace(&mut self.seen_content_type, true) {
                return Ok(self.add_content_type(field));
            }
        } else if name.eq_ignore_ascii_case(CONTENT_TRANSFER_ENCODING) {
            if !std::mem::replace(&mut self.seen_transfer_encoding, true) {
                let value = field.body().trim().to_ascii_lowercase();
                if !value.is_empty() {
                    self.transfer_encoding = Some(value);
                }
            }
        } else if name.eq_ignore_ascii_case(CONTENT_LENGTH)
            && !std::mem::replace(&mut self.seen_content_length, true)
        {
            self.add_content_length(field)?;
        }
        Ok(None)
    }

    fn build(&self) -> BodyDescriptor {
        let descriptor = match &self.content_type {
            Some(content_type) => BodyDescriptor::from_content_type(content_type),
            None if self.parent_is_digest() => BodyDescriptor::new("message", "rfc822"),
            None => BodyDescriptor::new("text", "plain"),
        };
        let charset = match descriptor.charset() {
            None if descriptor.media_type() == "text" => Some("us-ascii".to_owned()),
            other => other.map(str::to_owned),
        };
        descriptor
            .with_charset(charset)
            .with_transfer_encoding(self.transfer_encoding.clone())
            .with_content_length(self.content_length)
    }

    fn new_child(&self) -> Box<dyn BodyDescriptorBuilder> {
        Box::new(self.child())
    }

    fn new_root(&self) -> Box<dyn BodyDescriptorBuilder> {
        Box::new(Self::new(Rc::clone(&self.monitor)))
    }
}
