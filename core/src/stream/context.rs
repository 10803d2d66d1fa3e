/*
 * context.rs
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

use tracing::warn;

use crate::config::MimeConfig;
use crate::error::{MimeError, Result};
use crate::field::FieldBuilder;
use crate::monitor::{DecodeMonitor, Event};

/// State shared by every entity of one parse.
pub(crate) struct ParseContext {
    pub config: MimeConfig,
    pub monitor: Rc<dyn DecodeMonitor>,
    pub field_builder: Box<dyn FieldBuilder>,
    pub stopped: bool,
}

impl ParseContext {
    /// Offers `event` to the monitor. Nothing is reported once parsing was stopped.
    pub fn report(&self, event: Event, line: Option<usize>) -> Result<()> {
        if self.stopped {
            return Ok(());
        }
        if self.monitor.is_listening() && self.monitor.warn(event.message(), "ignoring") {
            return Err(MimeError::Event(event).at_line(line));
        }
        warn!(?event, line, "{event}; ignoring");
        Ok(())
    }

    /// Line number to attach to errors, when line counting is on.
    pub fn line(&self, line: usize) -> Option<usize> {
        self.config.is_count_line_numbers().then_some(line)
    }
}
