/*
 * maximal.rs
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

use std::collections::HashSet;
use std::rc::Rc;

use super::{BodyDescriptor, BodyDescriptorBuilder, ContentFields, DefaultBodyDescriptorBuilder};
use crate::error::Result;
use crate::field::{FieldParsers, ParsedField, RawField};
use crate::monitor::DecodeMonitor;

/// Extends [`DefaultBodyDescriptorBuilder`] with every field a [`FieldParsers`] registry
/// knows: Content-ID, Content-Description, Content-Disposition, Content-Language,
/// Content-Location, Content-MD5 and MIME-Version by default.
pub struct MaximalBodyDescriptorBuilder {
    inner: DefaultBodyDescriptorBuilder,
    parsers: Rc<FieldParsers>,
    fields: ContentFields,
    seen: HashSet<String>,
}

impl MaximalBodyDescriptorBuilder {
    pub fn new(monitor: Rc<dyn DecodeMonitor>) -> Self {
        Self::with_parsers(monitor, FieldParsers::default())
    }

    pub fn with_parsers(monitor: Rc<dyn DecodeMonitor>, parsers: FieldParsers) -> Self {
        Self::from_parts(DefaultBodyDescriptorBuilder::new(monitor), Rc::new(parsers))
    }

    fn from_parts(inner: DefaultBodyDescriptorBuilder, parsers: Rc<FieldParsers>) -> Self {
        Self {
            inner,
            parsers,
            fields: ContentFields::default(),
            seen: HashSet::new(),
        }
    }

    fn store(&mut self, parsed: &ParsedField) {
        let fields = &mut self.fields;
        match parsed.clone() {
            ParsedField::ContentId(id) => fields.content_id = Some(id),
            ParsedField::ContentDescription(text) => fields.description = Some(text),
            ParsedField::ContentDisposition(disposition) => fields.disposition = Some(disposition),
            ParsedField::ContentLanguage(tags) => fields.language = Some(tags),
            ParsedField::ContentLocation(location) => fields.location = Some(location),
            ParsedField::ContentMd5(digest) => fields.md5 = Some(digest),
            ParsedField::MimeVersion(version) => fields.mime_version = Some(version),
            ParsedField::ContentType(_) => {}
        }
    }
}

impl BodyDescriptorBuilder for MaximalBodyDescriptorBuilder {
    fn reset(&mut self) {
        self.inner.reset();
        self.fields = ContentFields::default();
        self.seen.clear();
    }

    fn add_field(&mut self, field: &RawField) -> Result<Option<ParsedField>> {
        if DefaultBodyDescriptorBuilder::recognises(field.name()) {
            return self.inner.add_field(field);
        }
        let name = field.name().to_ascii_lowercase();
        if !self.parsers.contains(&name) || !self.seen.insert(name) {
            return Ok(None);
        }
        let parsed = self.parsers.parse(field);
        if let Some(parsed) = &parsed {
            self.store(parsed);
        }
        Ok(parsed)
    }

    fn build(&self) -> BodyDescriptor {
        self.inner.build().with_fields(self.fields.clone())
    }

    fn new_child(&self) -> Box<dyn BodyDescriptorBuilder> {
        Box::new(Self::from_parts(self.inner.child(), Rc::clone(&self.parsers)))
    }

    fn new_root(&self) -> Box<dyn BodyDescriptorBuilder> {
        let inner = DefaultBodyDescriptorBuilder::new(Rc::clone(self.inner.monitor()));
        Box::new(Self::from_parts(inner, Rc::clone(&self.parsers)))
    }
}
