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

//! Transfer decoding and charset decoding over content streams.

mod base64;
mod quoted_printable;
mod text;

use std::io::{self, Read};

pub use self::base64::{Base64Decoder, Base64Reader};
pub use self::quoted_printable::{QuotedPrintableDecoder, QuotedPrintableReader};
pub use self::text::TextReader;

const CHUNK_SIZE: usize = 4096;

/// Incremental byte decoder: fed successive chunks, then finished once.
pub trait StreamDecoder {
    /// Decodes as much of `input` as possible into `output`, keeping any undecidable tail.
    fn decode(&mut self, input: &[u8], output: &mut Vec<u8>);

    /// Flushes whatever is still held at end of input.
    fn finish(&mut self, output: &mut Vec<u8>);
}

/// `Read` adapter applying a [`StreamDecoder`] to an inner reader.
pub struct DecodingReader<R, D> {
    inner: R,
    decoder: D,
    chunk: Box<[u8]>,
    decoded: Vec<u8>,
    pos: usize,
    finished: bool,
}

impl<R: Read, D: StreamDecoder> DecodingReader<R, D> {
    pub fn with_decoder(inner: R, decoder: D) -> Self {
        Self {
            inner,
            decoder,
            chunk: vec![0; CHUNK_SIZE].into_boxed_slice(),
            decoded: Vec::with_capacity(CHUNK_SIZE),
            pos: 0,
            finished: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read, D: StreamDecoder> Read for DecodingReader<R, D> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        loop {
            if self.pos < self.decoded.len() {
                let n = out.len().min(self.decoded.len() - self.pos);
                out[..n].copy_from_slice(&self.decoded[self.pos..self.pos + n]);
                self.pos += n;
                return Ok(n);
            }
            if self.finished {
                return Ok(0);
            }
            self.decoded.clear();
            self.pos = 0;
            let n = loop {
                match self.inner.read(&mut self.chunk) {
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    other => break other?,
                }
            };
            if n == 0 {
                self.decoder.finish(&mut self.decoded);
                self.finished = true;
            } else {
                self.decoder.decode(&self.chunk[..n], &mut self.decoded);
            }
        }
    }
}

pub fn is_base64(transfer_encoding: &str) -> bool {
    transfer_encoding.trim().eq_ignore_ascii_case("base64")
}

pub fn is_quoted_printable(transfer_encoding: &str) -> bool {
    transfer_encoding.trim().eq_ignore_ascii_case("quoted-printable")
}

/// Wraps `source` in the decoder matching `transfer_encoding`; identity for anything else.
pub fn decoded<'a>(source: Box<dyn Read + 'a>, transfer_encoding: &str) -> Box<dyn Read + 'a> {
    if is_base64(transfer_encoding) {
        Box::new(Base64Reader::new(source))
    } else if is_quoted_printable(transfer_encoding) {
        Box::new(QuotedPrintableReader::new(source))
    } else {
        source
    }
}
