//! Line rendering.
//!
//! A line is `[prefix ]` + header + body + `\n`, where the header carries the
//! date and time selected by [`Flags`] and the body carries the source location, the
//! stamp's message prefix and the message itself.

use std::fmt::Write as _;

use chrono::{DateTime, Local, Utc};

use crate::flags::Flags;
use crate::scope::SourceLocation;

/// Everything needed to render one line.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LineParts<'a> {
    pub prefix: &'a str,
    pub flags: Flags,
    pub stamp_prefix: &'a str,
    pub context_id: &'a str,
    pub message: &'a str,
    pub location: Option<&'a SourceLocation>,
    /// Always append a newline to the message. When unset the line is still terminated,
    /// but a message already ending in `\n` is not terminated twice.
    pub newline: bool,
}

pub(crate) fn render(parts: &LineParts<'_>, now: DateTime<Utc>) -> String {
    let mut line = String::with_capacity(
        parts.prefix.len() + parts.stamp_prefix.len() + parts.message.len() + 48,
    );

    if !parts.prefix.is_empty() {
        line.push_str(parts.prefix);
        line.push(' ');
    }
    write_header(&mut line, parts.flags, now);
    write_body(&mut line, parts);
    if parts.newline {
        line.push('\n');
    }
    if !line.ends_with('\n') {
        line.push('\n');
    }
    line
}

fn write_header(line: &mut String, flags: Flags, now: DateTime<Utc>) {
    if !flags.intersects(Flags::DATE | Flags::TIME | Flags::MICROSECONDS) {
        return;
    }
    if flags.contains(Flags::UTC) {
        write_timestamp(line, flags, now);
    } else {
        write_timestamp(line, flags, now.with_timezone(&Local));
    }
}

fn write_timestamp<Tz>(line: &mut String, flags: Flags, at: DateTime<Tz>)
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    // Writing into a String cannot fail.
    if flags.contains(Flags::DATE) {
        let _ = write!(line, "{} ", at.format("%Y/%m/%d"));
    }
    if flags.intersects(Flags::TIME | Flags::MICROSECONDS) {
        let _ = write!(line, "{}", at.format("%H:%M:%S"));
        if flags.contains(Flags::MICROSECONDS) {
            let _ = write!(line, "{}", at.format("%.6f"));
        }
        line.push(' ');
    }
}

fn write_body(line: &mut String, parts: &LineParts<'_>) {
    let location = parts.location;

    if parts.stamp_prefix.is_empty() {
        if let Some(location) = location {
            let _ = write!(line, "{} ({}): ", location.file, location.line);
        }
    } else {
        match location {
            Some(location) if parts.flags.renders_location() => {
                if parts.flags.contains(Flags::LONG_FILE) {
                    let _ = write!(line, "{} ({}) ", location.file, location.line);
                } else {
                    let _ = write!(line, "{} ({}) ", location.short_file(), location.line);
                }
            }
            _ => {}
        }
        line.push_str(parts.stamp_prefix);
        line.push_str(": ");
    }

    if !parts.context_id.is_empty() {
        let _ = write!(line, "(Context:{}) ", parts.context_id);
    }
    line.push_str(parts.message);
}
