/*
 * error.rs
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

//! Parse errors.

use std::io;

use thiserror::Error;

use crate::monitor::Event;

/// Hard failures raised while pulling tokens or reading content streams.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MimeError {
    #[error("maximum line length limit exceeded")]
    MaxLineLength,

    #[error("maximum header limit exceeded")]
    MaxHeaderCount,

    #[error("maximum header length limit exceeded")]
    MaxHeaderLength,

    #[error("input stream limit exceeded")]
    MaxContentLength,

    /// Header bytes without a usable `name:` prefix.
    #[error("invalid MIME field: {0}")]
    InvalidField(String),

    /// Multipart boundary that cannot delimit parts (empty, too long, or illegal when strict).
    #[error("invalid multipart boundary: {0}")]
    InvalidBoundary(String),

    #[error("unsupported charset: {0}")]
    UnsupportedCharset(String),

    /// A recoverable event the monitor chose to escalate.
    #[error("{0}")]
    Event(Event),

    /// Part body ended without its closing boundary (strict parsing).
    #[error("unexpected end of stream")]
    UnexpectedEndOfStream,

    #[error("invalid state: {0}")]
    IllegalState(&'static str),

    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<MimeError>,
    },

    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
}

impl MimeError {
    /// Attaches a line number, if one is known.
    pub fn at_line(self, line: Option<usize>) -> Self {
        match line {
            Some(line) if !matches!(self, MimeError::AtLine { .. }) => MimeError::AtLine {
                line,
                source: Box::new(self),
            },
            _ => self,
        }
    }

    /// The underlying error without any line annotation.
    pub fn root(&self) -> &MimeError {
        match self {
            MimeError::AtLine { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn line_number(&self) -> Option<usize> {
        match self {
            MimeError::AtLine { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Unwraps parse errors that travelled through a `Read` implementation.
impl From<io::Error> for MimeError {
    fn from(err: io::Error) -> Self {
        if !err.get_ref().is_some_and(|inner| inner.is::<MimeError>()) {
            return MimeError::Io(err);
        }
        let kind = err.kind();
        match err.into_inner().map(|inner| inner.downcast::<MimeError>()) {
            Some(Ok(inner)) => *inner,
            Some(Err(other)) => MimeError::Io(io::Error::new(kind, other)),
            None => MimeError::Io(io::Error::from(kind)),
        }
    }
}

impl From<MimeError> for io::Error {
    fn from(err: MimeError) -> Self {
        match err {
            MimeError::Io(inner) => inner,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}

pub type Result<T> = std::result::Result<T, MimeError>;
