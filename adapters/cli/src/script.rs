//! Scripted operator input for headless runs.
//!
//! Each non-empty line holds one directive, optionally prefixed with
//! `@<frame>` to schedule it. Unscheduled lines run on the frame of the line
//! before them. `#` starts a comment. Besides the command vocabulary, two
//! pointer directives are understood: `click <x> <y>` toggles the wall under
//! a pixel and `inspect <x> <y>` reports the agent under a pixel.

use glam::Vec2;
use thiserror::Error;

/// Malformed script content.
#[derive(Debug, Error, PartialEq)]
pub(crate) enum ScriptError {
    #[error("line {line}: invalid frame marker '{marker}'")]
    Frame { line: usize, marker: String },
    #[error("line {line}: frame {frame} precedes an earlier entry")]
    OutOfOrder { line: usize, frame: u64 },
    #[error("line {line}: '{directive}' expects two pixel coordinates")]
    Pixel {
        line: usize,
        directive: &'static str,
    },
}

/// Work requested by a single script line.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Directive {
    Command(String),
    Click(Vec2),
    Inspect(Vec2),
}

/// Directives ordered by the frame they run on.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Script {
    entries: Vec<(u64, Directive)>,
    cursor: usize,
}

impl Script {
    pub(crate) fn parse(source: &str) -> Result<Self, ScriptError> {
        let mut entries = Vec::new();
        let mut frame = 0;

        for (index, raw) in source.lines().enumerate() {
            let line = index + 1;
            let content = raw.split('#').next().unwrap_or_default().trim();
            if content.is_empty() {
                continue;
            }

            let body = match content.strip_prefix('@') {
                Some(rest) => {
                    let (marker, body) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                    let scheduled = marker.parse::<u64>().map_err(|_| ScriptError::Frame {
                        line,
                        marker: marker.to_owned(),
                    })?;
                    if scheduled < frame {
                        return Err(ScriptError::OutOfOrder {
                            line,
                            frame: scheduled,
                        });
                    }
                    frame = scheduled;
                    body.trim()
                }
                None => content,
            };
            if body.is_empty() {
                continue;
            }

            entries.push((frame, directive(body, line)?));
        }

        Ok(Self { entries, cursor: 0 })
    }

    /// Removes and returns the directives scheduled up to `frame`.
    pub(crate) fn due(&mut self, frame: u64) -> &[(u64, Directive)] {
        let start = self.cursor;
        while self
            .entries
            .get(self.cursor)
            .is_some_and(|(scheduled, _)| *scheduled <= frame)
        {
            self.cursor += 1;
        }
        &self.entries[start..self.cursor]
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

fn directive(body: &str, line: usize) -> Result<Directive, ScriptError> {
    let mut words = body.split_whitespace();
    let keyword = words.next().unwrap_or_default().to_ascii_lowercase();
    let pointer: Option<fn(Vec2) -> Directive> = match keyword.as_str() {
        "click" => Some(Directive::Click),
        "inspect" => Some(Directive::Inspect),
        _ => None,
    };
    let Some(pointer) = pointer else {
        return Ok(Directive::Command(body.to_owned()));
    };

    let x = words.next().and_then(|raw| raw.parse::<f32>().ok());
    let y = words.next().and_then(|raw| raw.parse::<f32>().ok());
    match (x, y) {
        (Some(x), Some(y)) => Ok(pointer(Vec2::new(x, y))),
        _ => Err(ScriptError::Pixel {
            line,
            directive: if keyword == "click" { "click" } else { "inspect" },
        }),
    }
}
