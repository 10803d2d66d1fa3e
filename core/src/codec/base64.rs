/*
 * base64.rs
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

//! Base64 Content-Transfer-Encoding (RFC 2045).

use std::io::Read;

use super::{DecodingReader, StreamDecoder};

const INVALID: i8 = -1;

const DECODE_TABLE: [i8; 256] = {
    let mut t = [INVALID; 256];
    let mut i = 0u8;
    while i < 26 {
        t[(b'A' + i) as usize] = i as i8;
        t[(b'a' + i) as usize] = (26 + i) as i8;
        i += 1;
    }
    let mut i = 0u8;
    while i < 10 {
        t[(b'0' + i) as usize] = (52 + i) as i8;
        i += 1;
    }
    t[b'+' as usize] = 62;
    t[b'/' as usize] = 63;
    t
};

/// Whitespace and characters outside the alphabet are skipped. Decoding stops at padding.
#[derive(Debug, Default)]
pub struct Base64Decoder {
    quantum: u32,
    bits: u32,
    finished: bool,
}

impl Base64Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn flush(&mut self, output: &mut Vec<u8>) {
        if self.bits >= 8 {
            output.push((self.quantum >> (self.bits - 8)) as u8);
        }
        if self.bits >= 16 {
            output.push((self.quantum >> (self.bits - 16)) as u8);
        }
        self.quantum = 0;
        self.bits = 0;
    }
}

impl StreamDecoder for Base64Decoder {
    fn decode(&mut self, input: &[u8], output: &mut Vec<u8>) {
        for &b in input {
            if self.finished {
                return;
            }
            if b == b'=' {
                self.flush(output);
                self.finished = true;
                continue;
            }
            let value = DECODE_TABLE[b as usize];
            if value == INVALID {
                continue;
            }
            self.quantum = (self.quantum << 6) | value as u32;
            self.bits += 6;
            if self.bits == 24 {
                output.extend_from_slice(&[
                    (self.quantum >> 16) as u8,
                    (self.quantum >> 8) as u8,
                    self.quantum as u8,
                ]);
                self.quantum = 0;
                self.bits = 0;
            }
        }
    }

    fn finish(&mut self, output: &mut Vec<u8>) {
        if !self.finished {
            self.flush(output);
            self.finished = true;
        }
    }
}

pub type Base64Reader<R> = DecodingReader<R, Base64Decoder>;

impl<R: Read> DecodingReader<R, Base64Decoder> {
    pub fn new(inner: R) -> Self {
        Self::with_decoder(inner, Base64Decoder::new())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use ::base64::Engine;

    use super::*;

    fn decode_all(input: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        Base64Reader::new(input).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn decodes_wrapped_lines() {
        let data: Vec<u8> = (0u8..=255).collect();
        let encoded = ::base64::engine::general_purpose::STANDARD.encode(&data);
        let wrapped: Vec<u8> = encoded
            .as_bytes()
            .chunks(76)
            .flat_map(|line| line.iter().copied().chain(*b"\r\n"))
            .collect();
        assert_eq!(decode_all(&wrapped), data);
    }

    #[test]
    fn padding_ends_data() {
        assert_eq!(decode_all(b"aGk=\r\ntrailing junk"), b"hi");
        assert_eq!(decode_all(b"aGV5"), b"hey");
        assert_eq!(decode_all(b"aGV5IQ=="), b"hey!");
    }

    #[test]
    fn unpadded_tail_and_noise() {
        assert_eq!(decode_all(b"aG\tV5I*Q"), b"hey!");
        assert!(decode_all(b"").is_empty());
    }

    #[test]
    fn split_across_chunks() {
        let mut decoder = Base64Decoder::new();
        let mut out = Vec::new();
        decoder.decode(b"aGVs", &mut out);
        decoder.decode(b"bG", &mut out);
        decoder.decode(b"8=", &mut out);
        decoder.finish(&mut out);
        assert_eq!(out, b"hello");
    }
}
