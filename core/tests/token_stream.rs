/*
 * token_stream.rs
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

use std::io::Read;
use std::rc::Rc;

use mimestream_core::{
    EntityState, MaximalBodyDescriptorBuilder, MimeError, MimeTokenStream,
    ParsedField, SilentMonitor,
};

/// Pulls every state, recording field names and the content of bodies,
/// preambles and epilogues.
fn walk(stream: &mut MimeTokenStream) -> Vec<(EntityState, String)> {
    let mut seen = Vec::new();
    loop {
        let state = stream.next().unwrap();
        let detail = match state {
            EntityState::Field => stream.field_name().unwrap().to_owned(),
            EntityState::Body | EntityState::Preamble | EntityState::Epilogue => {
                let mut content = String::new();
                stream
                    .decoded_content_stream()
                    .unwrap()
                    .read_to_string(&mut content)
                    .unwrap();
                content
            }
            _ => String::new(),
        };
        seen.push((state, detail));
        if state == EntityState::EndOfStream {
            return seen;
        }
    }
}

fn states(seen: &[(EntityState, String)]) -> Vec<EntityState> {
    seen.iter().map(|(state, _)| *state).collect()
}

fn parse(input: &'static str) -> Vec<(EntityState, String)> {
    let mut stream = MimeTokenStream::default();
    stream.parse(input.as_bytes());
    walk(&mut stream)
}

#[test]
fn single_part_message() {
    let mut stream = MimeTokenStream::default();
    stream.parse(
        &b"From: alice@example.org\r\nSubject: a long\r\n\tsubject\r\nTo: bob@example.org\r\n\r\nHello Bob\r\n"[..],
    );
    let mut fields = Vec::new();
    let mut sequence = Vec::new();
    loop {
        let state = stream.next().unwrap();
        sequence.push(state);
        match state {
            EntityState::Field => {
                let field = stream.field().unwrap();
                fields.push((field.name().to_owned(), field.body().to_owned()));
            }
            EntityState::Body => {
                let descriptor = stream.body_descriptor().unwrap();
                assert_eq!(descriptor.mime_type(), "text/plain");
                assert_eq!(descriptor.charset(), Some("us-ascii"));
                let mut body = String::new();
                stream.content_stream().unwrap().read_to_string(&mut body).unwrap();
                assert_eq!(body, "Hello Bob\r\n");
            }
            EntityState::EndOfStream => break,
            _ => {}
        }
    }
    assert_eq!(
        sequence,
        [
            EntityState::StartHeader,
            EntityState::Field,
            EntityState::Field,
            EntityState::Field,
            EntityState::EndHeader,
            EntityState::Body,
            EntityState::EndMessage,
            EntityState::EndOfStream,
        ]
    );
    assert_eq!(
        fields,
        [
            ("From".to_owned(), "alice@example.org".to_owned()),
            ("Subject".to_owned(), "a long\tsubject".to_owned()),
            ("To".to_owned(), "bob@example.org".to_owned()),
        ]
    );
}

#[test]
fn nested_multipart() {
    let seen = parse(
        "Content-Type: multipart/mixed; boundary=outer\r\n\r\n\
         --outer\r\n\
         Content-Type: multipart/alternative; boundary=inner\r\n\r\n\
         --inner\r\n\r\ntext\r\n\
         --inner\r\nContent-Type: text/html\r\n\r\n<p>html</p>\r\n\
         --inner--\r\n\
         --outer\r\nContent-Type: application/octet-stream\r\n\r\nbinary\r\n\
         --outer--\r\n",
    );
    let bodies: Vec<&str> = seen
        .iter()
        .filter(|(state, _)| *state == EntityState::Body)
        .map(|(_, body)| body.as_str())
        .collect();
    assert_eq!(bodies, ["text", "<p>html</p>", "binary"]);
    let states = states(&seen);
    let count = |wanted: EntityState| states.iter().filter(|&&s| s == wanted).count();
    assert_eq!(count(EntityState::StartMultipart), 2);
    assert_eq!(count(EntityState::EndMultipart), 2);
    assert_eq!(count(EntityState::StartBodyPart), 4);
    assert_eq!(count(EntityState::EndBodyPart), 4);
    assert_eq!(states.last(), Some(&EntityState::EndOfStream));
}

#[test]
fn embedded_message() {
    let seen = parse(
        "Content-Type: message/rfc822\r\n\r\n\
         Subject: inner\r\n\r\n\
         inner body",
    );
    assert_eq!(
        states(&seen),
        [
            EntityState::StartHeader,
            EntityState::Field,
            EntityState::EndHeader,
            EntityState::StartMessage,
            EntityState::StartHeader,
            EntityState::Field,
            EntityState::EndHeader,
            EntityState::Body,
            EntityState::EndMessage,
            EntityState::EndMessage,
            EntityState::EndOfStream,
        ]
    );
    assert_eq!(seen[5].1, "Subject");
    assert_eq!(seen[7].1, "inner body");
}

#[test]
fn base64_embedded_message() {
    // "Subject: hi\r\n\r\nsecret"
    let seen = parse(
        "Content-Type: message/rfc822\r\nContent-Transfer-Encoding: base64\r\n\r\n\
         U3ViamVjdDogaGkNCg0Kc2VjcmV0\r\n",
    );
    assert!(seen.contains(&(EntityState::Field, "Subject".to_owned())));
    assert!(seen.contains(&(EntityState::Body, "secret".to_owned())));
}

#[test]
fn digest_parts_default_to_messages() {
    let mut stream = MimeTokenStream::default();
    stream.parse(
        &b"Content-Type: multipart/digest; boundary=d\r\n\r\n\
           --d\r\n\r\nSubject: first\r\n\r\none\r\n\
           --d--\r\n"[..],
    );
    let mut message_starts = 0;
    loop {
        match stream.next().unwrap() {
            EntityState::StartMessage => message_starts += 1,
            EntityState::Body => {
                assert_eq!(stream.body_descriptor().unwrap().mime_type(), "text/plain");
            }
            EntityState::EndOfStream => break,
            _ => {}
        }
    }
    assert_eq!(message_starts, 1);
}

#[test]
fn transfer_decoding() {
    let seen = parse(
        "Content-Type: multipart/mixed; boundary=b\r\n\r\n\
         --b\r\nContent-Transfer-Encoding: base64\r\n\r\nSGVsbG8s\r\nIHdvcmxk\r\n\
         --b\r\nContent-Transfer-Encoding: quoted-printable\r\n\r\nsoft=\r\nbreak =3D ok\r\n\
         --b--\r\n",
    );
    let bodies: Vec<&str> = seen
        .iter()
        .filter(|(state, _)| *state == EntityState::Body)
        .map(|(_, body)| body.as_str())
        .collect();
    assert_eq!(bodies, ["Hello, world", "softbreak = ok"]);
}

#[test]
fn charset_reader() {
    let mut stream = MimeTokenStream::default();
    stream.parse(
        &b"Content-Type: text/plain; charset=iso-8859-1\r\n\
           Content-Transfer-Encoding: quoted-printable\r\n\r\ncaf=E9"[..],
    );
    while stream.next().unwrap() != EntityState::Body {}
    let mut text = String::new();
    stream.reader().unwrap().read_to_string(&mut text).unwrap();
    assert_eq!(text, "caf\u{e9}");
}

#[test]
fn unsupported_charset() {
    let mut stream = MimeTokenStream::default();
    stream.parse(&b"Content-Type: text/plain; charset=x-no-such-charset\r\n\r\ntext"[..]);
    while stream.next().unwrap() != EntityState::Body {}
    assert!(matches!(stream.reader(), Err(MimeError::UnsupportedCharset(_))));
}

#[test]
fn parsed_fields() {
    let mut stream = MimeTokenStream::default().with_body_descriptor_builder(Box::new(
        MaximalBodyDescriptorBuilder::new(Rc::new(SilentMonitor)),
    ));
    stream.parse(
        &b"MIME-Version: 1.0\r\n\
           Content-Type: image/png; name=\"dot.png\"\r\n\
           Content-Disposition: attachment; filename=dot.png\r\n\
           Content-ID: <dot@example.org>\r\n\r\n"[..],
    );
    let mut parsed = Vec::new();
    loop {
        match stream.next().unwrap() {
            EntityState::Field => parsed.push(stream.parsed_field().cloned()),
            EntityState::Body => {
                let descriptor = stream.body_descriptor().unwrap();
                assert_eq!(descriptor.mime_type(), "image/png");
                assert_eq!(descriptor.charset(), None);
                assert!(descriptor.content_disposition().unwrap().is_attachment());
                assert_eq!(descriptor.content_id().unwrap().to_string(), "<dot@example.org>");
            }
            EntityState::EndOfStream => break,
            _ => {}
        }
    }
    assert!(matches!(parsed[0], Some(ParsedField::MimeVersion(_))));
    assert!(matches!(
        &parsed[1],
        Some(ParsedField::ContentType(ct)) if ct.parameter("name") == Some("dot.png")
    ));
    assert!(matches!(parsed[2], Some(ParsedField::ContentDisposition(_))));
    assert!(matches!(parsed[3], Some(ParsedField::ContentId(_))));
}

#[test]
fn headless_multipart() {
    let mut stream = MimeTokenStream::default();
    let field = stream
        .parse_headless(
            &b"--h\r\nContent-Type: text/html\r\n\r\n<b>x</b>\r\n--h--\r\n"[..],
            "multipart/mixed; boundary=h",
        )
        .unwrap();
    assert_eq!(field.name(), "Content-Type");
    assert_eq!(stream.state(), EntityState::StartMultipart);
    assert_eq!(stream.body_descriptor().unwrap().boundary(), Some("h"));
    let seen = walk(&mut stream);
    assert_eq!(
        states(&seen),
        [
            EntityState::StartBodyPart,
            EntityState::StartHeader,
            EntityState::Field,
            EntityState::EndHeader,
            EntityState::Body,
            EntityState::EndBodyPart,
            EntityState::EndMultipart,
            EntityState::EndMessage,
            EntityState::EndOfStream,
        ]
    );
    assert_eq!(seen[4].1, "<b>x</b>");
}

#[test]
fn unread_content_is_skipped() {
    let mut stream = MimeTokenStream::default();
    stream.parse(
        &b"Content-Type: multipart/mixed; boundary=b\r\n\r\npreamble\r\n\
           --b\r\n\r\nfirst\r\n--b\r\n\r\nsecond\r\n--b--\r\nepilogue\r\n"[..],
    );
    let mut states = Vec::new();
    loop {
        let state = stream.next().unwrap();
        states.push(state);
        if state == EntityState::EndOfStream {
            break;
        }
    }
    assert_eq!(
        states.iter().filter(|&&s| s == EntityState::Body).count(),
        2
    );
    assert!(states.contains(&EntityState::Epilogue));
}

#[test]
fn consumed_multipart_body() {
    let mut stream = MimeTokenStream::default();
    stream.parse(&b"Content-Type: multipart/mixed; boundary=b\r\n\r\n--b\r\n\r\npart\r\n--b--\r\n"[..]);
    while stream.next().unwrap() != EntityState::StartMultipart {}
    let mut raw = String::new();
    stream.content_stream().unwrap().read_to_string(&mut raw).unwrap();
    assert_eq!(raw, "--b\r\n\r\npart\r\n--b--\r\n");
    assert_eq!(stream.next().unwrap(), EntityState::EndMultipart);
    assert_eq!(stream.next().unwrap(), EntityState::EndMessage);
}

/// Hands out at most `step` bytes per read, like a slow socket.
struct Trickle {
    data: &'static [u8],
    step: usize,
}

impl Read for Trickle {
    fn read(&mut self, out: &mut [u8]) -> std::io::Result<usize> {
        let n = self.step.min(out.len()).min(self.data.len());
        out[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

#[test]
fn read_chunking_does_not_change_events() {
    const NESTED: &str = "Content-Type: multipart/mixed; boundary=outer\r\n\r\n\
        --outer\r\nContent-Type: multipart/alternative; boundary=inner\r\n\r\n\
        --inner\r\n\r\nplain --outer\r\nstill plain\r\n\
        --inner\r\nContent-Type: text/html\r\n\r\n<p>x --inner</p>\r\n\
        --inner--\r\n\
        --outer\r\nContent-Type: message/rfc822\r\n\r\nSubject: inner\r\n\r\nforwarded\r\n\
        --outer--\r\n";
    let expected = parse(NESTED);
    assert!(!states(&expected).contains(&EntityState::Preamble));
    assert!(expected.contains(&(EntityState::Body, "plain --outer\r\nstill plain".to_owned())));
    assert!(expected.contains(&(EntityState::Body, "<p>x --inner</p>".to_owned())));
    for step in 1..=NESTED.len() {
        let mut stream = MimeTokenStream::default();
        stream.parse(Trickle {
            data: NESTED.as_bytes(),
            step,
        });
        assert_eq!(walk(&mut stream), expected, "step {step}");
    }
}
