/*
 * quoted_printable.rs
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

//! Quoted-Printable Content-Transfer-Encoding (RFC 2045).

use std::io::Read;

use super::{DecodingReader, StreamDecoder};

const HEX_DECODE: [i8; 256] = {
    let mut t = [-1i8; 256];
    let mut i = 0u8;
    while i < 10 {
        t[(b'0' + i) as usize] = i as i8;
        i += 1;
    }
    let mut i = 0u8;
    while i < 6 {
        t[(b'A' + i) as usize] = (10 + i) as i8;
        t[(b'a' + i) as usize] = (10 + i) as i8;
        i += 1;
    }
    t
};

fn hex(b: u8) -> Option<u8> {
    u8::try_from(HEX_DECODE[b as usize]).ok()
}

fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Handles `=XX` escapes and soft line breaks (`=CRLF`, `=LF`, with optional blanks after
/// the `=`). Blanks before a hard line break are dropped; malformed escapes are kept verbatim.
#[derive(Debug, Default)]
pub struct QuotedPrintableDecoder {
    pending: Vec<u8>,
}

impl QuotedPrintableDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Decodes `data`, returning how many bytes were consumed.
/// Unless `last`, stops before a tail that needs more input to decide.
fn decode_chunk(data: &[u8], output: &mut Vec<u8>, last: bool) -> usize {
    let mut i = 0;
    while i < data.len() {
        match data[i] {
            b'=' => {
                let rest = &data[i + 1..];
                let blanks = rest.iter().take_while(|&&c| is_blank(c)).count();
                match (rest.get(blanks), rest.get(blanks + 1)) {
                    (Some(b'\n'), _) => {
                        i += blanks + 2;
                        continue;
                    }
                    (Some(b'\r'), Some(b'\n')) => {
                        i += blanks + 3;
                        continue;
                    }
                    (Some(b'\r'), None) | (None, _) if !last => return i,
                    _ => {}
                }
                if rest.len() < 2 && !last {
                    return i;
                }
                match (rest.first().copied().and_then(hex), rest.get(1).copied().and_then(hex)) {
                    (Some(high), Some(low)) => {
                        output.push(high << 4 | low);
                        i += 3;
                    }
                    _ => {
                        output.push(b'=');
                        i += 1;
                    }
                }
            }
            b' ' | b'\t' => {
                let blanks = data[i..].iter().take_while(|&&c| is_blank(c)).count();
                let end = i + blanks;
                match (data.get(end), data.get(end + 1)) {
                    (Some(b'\n'), _) | (Some(b'\r'), Some(b'\n')) => {}
                    (Some(b'\r'), None) | (None, _) if !last => return i,
                    (None, _) => {}
                    _ => output.extend_from_slice(&data[i..end]),
                }
                i = end;
            }
            b => {
                output.push(b);
                i += 1;
            }
        }
    }
    data.len()
}

impl StreamDecoder for QuotedPrintableDecoder {
    fn decode(&mut self, input: &[u8], output: &mut Vec<u8>) {
        if self.pending.is_empty() {
            let consumed = decode_chunk(input, output, false);
            self.pending.extend_from_slice(&input[consumed..]);
        } else {
            self.pending.extend_from_slice(input);
            let data = std::mem::take(&mut self.pending);
            let consumed = decode_chunk(&data, output, false);
            self.pending.extend_from_slice(&data[consumed..]);
        }
    }

    fn finish(&mut self, output: &mut Vec<u8>) {
        let data = std::mem::take(&mut self.pending);
        decode_chunk(&data, output, true);
    }
}

pub type QuotedPrintableReader<R> = DecodingReader<R, QuotedPrintableDecoder>;

impl<R: Read> DecodingReader<R, QuotedPrintableDecoder> {
    pub fn new(inner: R) -> Self {
        Self::with_decoder(inner, QuotedPrintableDecoder::new())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    fn decode_all(input: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        QuotedPrintableReader::new(input).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn escapes_and_soft_breaks() {
        assert_eq!(decode_all(b"caf=C3=A9 au lait"), "caf\u{e9} au lait".as_bytes());
        assert_eq!(decode_all(b"long=\r\nline=\nend"), b"longlineend");
        assert_eq!(decode_all(b"padded=  \r\nbreak"), b"paddedbreak");
        assert_eq!(decode_all(b"lower =3d case"), b"lower = case");
    }

    #[test]
    fn hard_breaks_drop_trailing_blanks() {
        assert_eq!(decode_all(b"a  \r\nb\t\nc  "), b"a\r\nb\nc");
        assert_eq!(decode_all(b"keep  inner"), b"keep  inner");
    }

    #[test]
    fn malformed_kept() {
        assert_eq!(decode_all(b"=ZZ and =4"), b"=ZZ and =4");
        assert_eq!(decode_all(b"end="), b"end=");
    }

    #[test]
    fn split_across_chunks() {
        let mut decoder = QuotedPrintableDecoder::new();
        let mut out = Vec::new();
        decoder.decode(b"x=", &mut out);
        decoder.decode(b"4", &mut out);
        decoder.decode(b"1 ", &mut out);
        decoder.decode(b"=\r", &mut out);
        decoder.decode(b"\ny  ", &mut out);
        decoder.decode(b"\r\n", &mut out);
        decoder.finish(&mut out);
        assert_eq!(out, b"xA y\r\n");
    }
}
