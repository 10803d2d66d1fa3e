/*
 * recursion.rs
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

use mimestream_core::{
    ContentHandler, EntityState, MimeConfig, MimeStreamParser, MimeTokenStream, RecursionMode,
    Result,
};

const MESSAGE: &str = "Content-Type: multipart/mixed; boundary=b\r\n\r\n\
    --b\r\nContent-Type: text/plain\r\n\r\nnote\r\n\
    --b\r\nContent-Type: message/rfc822\r\n\r\nSubject: forwarded\r\n\r\ninner\r\n\
    --b--\r\n";

fn walk(mode: RecursionMode) -> Vec<(EntityState, String)> {
    let mut stream = MimeTokenStream::default();
    stream.set_recursion_mode(mode);
    stream.parse(MESSAGE.as_bytes());
    let mut seen = Vec::new();
    loop {
        let state = stream.next().unwrap();
        let detail = match state {
            EntityState::Body | EntityState::RawEntity => {
                let mut content = String::new();
                stream
                    .content_stream()
                    .unwrap()
                    .read_to_string(&mut content)
                    .unwrap();
                content
            }
            EntityState::Field => stream.field_value().unwrap().to_owned(),
            _ => String::new(),
        };
        seen.push((state, detail));
        if state == EntityState::EndOfStream {
            return seen;
        }
    }
}

fn details(seen: &[(EntityState, String)], wanted: EntityState) -> Vec<&str> {
    seen.iter()
        .filter(|(state, _)| *state == wanted)
        .map(|(_, detail)| detail.as_str())
        .collect()
}

#[test]
fn recurse() {
    let seen = walk(RecursionMode::Recurse);
    assert_eq!(details(&seen, EntityState::Body), ["note", "inner"]);
    assert!(details(&seen, EntityState::Field).contains(&"forwarded"));
    assert_eq!(
        seen.iter().filter(|(s, _)| *s == EntityState::StartMessage).count(),
        1
    );
}

#[test]
fn no_recurse() {
    let seen = walk(RecursionMode::NoRecurse);
    assert_eq!(
        details(&seen, EntityState::Body),
        ["note", "Subject: forwarded\r\n\r\ninner"]
    );
    assert!(!seen.iter().any(|(s, _)| *s == EntityState::StartMessage));
}

#[test]
fn flat() {
    let seen = walk(RecursionMode::Flat);
    let states: Vec<EntityState> = seen.iter().map(|(s, _)| *s).collect();
    assert_eq!(
        states,
        [
            EntityState::StartHeader,
            EntityState::Field,
            EntityState::EndHeader,
            EntityState::Body,
            EntityState::EndMessage,
            EntityState::EndOfStream,
        ]
    );
    assert!(seen[3].1.starts_with("--b\r\nContent-Type: text/plain"));
    assert!(seen[3].1.ends_with("--b--\r\n"));
}

#[test]
fn raw() {
    let seen = walk(RecursionMode::Raw);
    assert_eq!(
        details(&seen, EntityState::RawEntity),
        [
            "Content-Type: text/plain\r\n\r\nnote",
            "Content-Type: message/rfc822\r\n\r\nSubject: forwarded\r\n\r\ninner",
        ]
    );
    assert!(!seen.iter().any(|(s, _)| *s == EntityState::StartBodyPart));
    assert_eq!(
        seen.iter().rev().nth(2).map(|(s, _)| *s),
        Some(EntityState::EndMultipart)
    );
}

#[test]
fn raw_entities_have_no_decoded_stream() {
    let mut stream = MimeTokenStream::default();
    stream.set_recursion_mode(RecursionMode::Raw);
    stream.parse(MESSAGE.as_bytes());
    while stream.next().unwrap() != EntityState::RawEntity {}
    assert!(stream.is_raw());
    assert!(stream.body_descriptor().is_none());
    assert!(stream.decoded_content_stream().is_err());
}

#[test]
fn mode_change_mid_stream() {
    let mut stream = MimeTokenStream::default();
    stream.parse(MESSAGE.as_bytes());
    let mut bodies = Vec::new();
    loop {
        match stream.next().unwrap() {
            EntityState::StartMultipart => stream.set_recursion_mode(RecursionMode::NoRecurse),
            EntityState::Body => {
                let mut body = String::new();
                stream.content_stream().unwrap().read_to_string(&mut body).unwrap();
                bodies.push(body);
            }
            EntityState::EndOfStream => break,
            _ => {}
        }
    }
    assert_eq!(bodies, ["note", "Subject: forwarded\r\n\r\ninner"]);
}

#[derive(Default)]
struct RawCollector {
    raw: Vec<String>,
    bodies: usize,
}

impl ContentHandler for RawCollector {
    fn raw(&mut self, input: &mut dyn Read) -> Result<()> {
        let mut content = String::new();
        input.read_to_string(&mut content)?;
        self.raw.push(content);
        Ok(())
    }

    fn body(&mut self, _body: &mimestream_core::BodyDescriptor, _input: &mut dyn Read) -> Result<()> {
        self.bodies += 1;
        Ok(())
    }
}

#[test]
fn stream_parser_raw_mode() {
    let mut parser = MimeStreamParser::new(MimeConfig::default(), RawCollector::default());
    parser.set_recursion_mode(RecursionMode::Raw);
    assert!(parser.is_raw());
    parser.parse(MESSAGE.as_bytes()).unwrap();
    let collector = parser.into_handler();
    assert_eq!(collector.raw.len(), 2);
    assert_eq!(collector.bodies, 0);
}
