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

//! Body descriptors: what the `Content-*` fields of an entity say about its body.

mod default;
mod maximal;

pub use default::DefaultBodyDescriptorBuilder;
pub use maximal::MaximalBodyDescriptorBuilder;

use crate::error::Result;
use crate::field::{ContentDisposition, ContentId, ContentType, MimeVersion, ParsedField, RawField};
use crate::util::{is_message, is_multipart};

const DEFAULT_TRANSFER_ENCODING: &str = "7bit";

/// Values of the optional `Content-*` fields, filled in by richer builders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFields {
    pub content_id: Option<ContentId>,
    pub description: Option<String>,
    pub disposition: Option<ContentDisposition>,
    pub language: Option<Vec<String>>,
    pub location: Option<String>,
    pub md5: Option<String>,
    pub mime_version: Option<MimeVersion>,
}

/// Immutable snapshot of an entity's body framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyDescriptor {
    mime_type: String,
    media_type: String,
    sub_type: String,
    boundary: Option<String>,
    charset: Option<String>,
    transfer_encoding: String,
    content_length: Option<u64>,
    content_type: Option<ContentType>,
    fields: ContentFields,
}

impl BodyDescriptor {
    /// `media/sub` body, `7bit` encoded, with nothing else declared.
    pub fn new(media_type: &str, sub_type: &str) -> Self {
        let media_type = media_type.to_ascii_lowercase();
        let sub_type = sub_type.to_ascii_lowercase();
        Self {
            mime_type: format!("{media_type}/{sub_type}"),
            media_type,
            sub_type,
            boundary: None,
            charset: None,
            transfer_encoding: DEFAULT_TRANSFER_ENCODING.to_owned(),
            content_length: None,
            content_type: None,
            fields: ContentFields::default(),
        }
    }

    /// Takes type, boundary and charset from a parsed Content-Type.
    /// The boundary is kept only for multipart types.
    pub fn from_content_type(content_type: &ContentType) -> Self {
        let mut descriptor = Self::new(content_type.media_type(), content_type.sub_type());
        if content_type.is_multipart() {
            descriptor.boundary = content_type.boundary().map(str::to_owned);
        }
        descriptor.charset = content_type.charset().map(str::to_owned);
        descriptor.content_type = Some(content_type.clone());
        descriptor
    }

    pub fn with_charset(mut self, charset: Option<String>) -> Self {
        self.charset = charset;
        self
    }

    /// `None` leaves the `7bit` default in place.
    pub fn with_transfer_encoding(mut self, transfer_encoding: Option<String>) -> Self {
        if let Some(encoding) = transfer_encoding {
            self.transfer_encoding = encoding;
        }
        self
    }

    pub fn with_content_length(mut self, content_length: Option<u64>) -> Self {
        self.content_length = content_length;
        self
    }

    pub fn with_fields(mut self, fields: ContentFields) -> Self {
        self.fields = fields;
        self
    }

    /// Lower-cased `type/subtype`.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    /// Set only for multipart bodies.
    pub fn boundary(&self) -> Option<&str> {
        self.boundary.as_deref()
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// Lower-cased; `7bit` when undeclared.
    pub fn transfer_encoding(&self) -> &str {
        &self.transfer_encoding
    }

    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// The Content-Type field this descriptor was derived from, absent for defaulted types.
    pub fn content_type(&self) -> Option<&ContentType> {
        self.content_type.as_ref()
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.content_type.as_ref()?.parameter(name)
    }

    pub fn is_multipart(&self) -> bool {
        is_multipart(&self.mime_type)
    }

    pub fn is_message(&self) -> bool {
        is_message(&self.mime_type)
    }

    pub fn fields(&self) -> &ContentFields {
        &self.fields
    }

    pub fn content_id(&self) -> Option<&ContentId> {
        self.fields.content_id.as_ref()
    }

    pub fn content_description(&self) -> Option<&str> {
        self.fields.description.as_deref()
    }

    pub fn content_disposition(&self) -> Option<&ContentDisposition> {
        self.fields.disposition.as_ref()
    }

    pub fn content_language(&self) -> Option<&[String]> {
        self.fields.language.as_deref()
    }

    pub fn content_location(&self) -> Option<&str> {
        self.fields.location.as_deref()
    }

    pub fn content_md5(&self) -> Option<&str> {
        self.fields.md5.as_deref()
    }

    pub fn mime_version(&self) -> Option<MimeVersion> {
        self.fields.mime_version
    }
}

/// Accumulates the fields of one entity's header into a [`BodyDescriptor`].
pub trait BodyDescriptorBuilder {
    /// Forgets every field added so far; the parent type is kept.
    fn reset(&mut self);

    /// Returns the parsed value when the field is recognised.
    /// Fails only when the monitor escalates an unusable value.
    fn add_field(&mut self, field: &RawField) -> Result<Option<ParsedField>>;

    fn build(&self) -> BodyDescriptor;

    /// Fresh builder for an entity nested in this one.
    fn new_child(&self) -> Box<dyn BodyDescriptorBuilder>;

    /// Fresh builder of the same kind for a top-level entity.
    fn new_root(&self) -> Box<dyn BodyDescriptorBuilder>;
}
