/*
 * handler.rs
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

//! Callback interface driven by [`MimeStreamParser`](crate::MimeStreamParser).

use std::io::Read;

use crate::descriptor::BodyDescriptor;
use crate::error::Result;
use crate::field::RawField;

/// Receives parse events in document order. Every method defaults to doing nothing.
/// Content streams are only valid for the duration of the call; whatever is left unread
/// is skipped.
pub trait ContentHandler {
    fn start_message(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_message(&mut self) -> Result<()> {
        Ok(())
    }

    fn start_header(&mut self) -> Result<()> {
        Ok(())
    }

    fn field(&mut self, _field: &RawField) -> Result<()> {
        Ok(())
    }

    fn end_header(&mut self) -> Result<()> {
        Ok(())
    }

    fn start_multipart(&mut self, _body: &BodyDescriptor) -> Result<()> {
        Ok(())
    }

    fn end_multipart(&mut self) -> Result<()> {
        Ok(())
    }

    fn preamble(&mut self, _input: &mut dyn Read) -> Result<()> {
        Ok(())
    }

    fn epilogue(&mut self, _input: &mut dyn Read) -> Result<()> {
        Ok(())
    }

    fn start_body_part(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_body_part(&mut self) -> Result<()> {
        Ok(())
    }

    /// Leaf body; `input` is transfer-decoded when content decoding is enabled.
    fn body(&mut self, _body: &BodyDescriptor, _input: &mut dyn Read) -> Result<()> {
        Ok(())
    }

    /// Unparsed entity, in [`RecursionMode::Raw`](crate::RecursionMode::Raw) only.
    fn raw(&mut self, _input: &mut dyn Read) -> Result<()> {
        Ok(())
    }
}
