//! Transaction log parsing
//!
//! Runtime logs interleave output from every program a transaction invokes.
//! The parser tracks the invocation stack so that only `Program data:` lines
//! emitted while our program is executing are decoded as its events.

use base64::Engine;
use regex::Regex;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use crate::codec::{Codec, DecodedEvent};

lazy_static::lazy_static! {
    static ref INVOKE: Regex =
        Regex::new(r"^Program ([1-9A-HJ-NP-Za-km-z]{32,44}) invoke \[(\d+)\]$").expect("valid invoke pattern");
    static ref EXIT: Regex =
        Regex::new(r"^Program ([1-9A-HJ-NP-Za-km-z]{32,44}) (success|failed)").expect("valid exit pattern");
    static ref DATA: Regex = Regex::new(r"^Program data: (.+)$").expect("valid data pattern");
    static ref RETURN: Regex =
        Regex::new(r"^Program return: ([1-9A-HJ-NP-Za-km-z]{32,44}) (.+)$").expect("valid return pattern");
    static ref CUSTOM_ERROR: Regex =
        Regex::new(r"custom program error: 0x([0-9a-fA-F]+)").expect("valid error pattern");
}

/// Events and return data recovered from one transaction's logs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLogs {
    /// Events emitted by the program, in log order
    pub events: Vec<DecodedEvent>,
    /// Raw return data set by the program, if any
    pub return_data: Option<Vec<u8>>,
}

/// Extracts a program's events from transaction logs
#[derive(Debug, Clone)]
pub struct EventParser {
    program_id: Pubkey,
    codec: Codec,
}

impl EventParser {
    /// Parser for events of `program_id` described by `codec`'s schema
    pub fn new(program_id: Pubkey, codec: Codec) -> Self {
        Self { program_id, codec }
    }

    /// Decode every event and the return data in `logs`
    ///
    /// Lines that cannot be decoded are skipped; a program may emit data
    /// that is not one of its declared events.
    pub fn parse_logs<S: AsRef<str>>(&self, logs: &[S]) -> ParsedLogs {
        let mut stack: Vec<Pubkey> = Vec::new();
        let mut parsed = ParsedLogs::default();

        for line in logs {
            let line = line.as_ref();
            if let Some(caps) = INVOKE.captures(line) {
                match Pubkey::from_str(&caps[1]) {
                    Ok(program) => stack.push(program),
                    Err(_) => tracing::warn!(line, "Unparseable program id in invoke line"),
                }
            } else if EXIT.is_match(line) {
                stack.pop();
            } else if let Some(caps) = DATA.captures(line) {
                if stack.last() != Some(&self.program_id) {
                    continue;
                }
                let Some(bytes) = decode_base64(&caps[1], line) else {
                    continue;
                };
                match self.codec.decode_event(&bytes) {
                    Ok(event) => parsed.events.push(event),
                    Err(e) => tracing::trace!(error = %e, "Skipping undecodable program data"),
                }
            } else if let Some(caps) = RETURN.captures(line) {
                if Pubkey::from_str(&caps[1]).ok() == Some(self.program_id) {
                    parsed.return_data = decode_base64(&caps[2], line);
                }
            }
        }
        parsed
    }

    /// Decode only the events in `logs`
    pub fn parse_events<S: AsRef<str>>(&self, logs: &[S]) -> Vec<DecodedEvent> {
        self.parse_logs(logs).events
    }
}

fn decode_base64(text: &str, line: &str) -> Option<Vec<u8>> {
    match base64::engine::general_purpose::STANDARD.decode(text.trim()) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::warn!(line, error = %e, "Invalid base64 in program log");
            None
        }
    }
}

/// Custom error code from a runtime error message or log line
///
/// Matches `custom program error: 0x1770` and returns `6000`.
pub fn parse_custom_error(message: &str) -> Option<u32> {
    let caps = CUSTOM_ERROR.captures(message)?;
    u32::from_str_radix(&caps[1], 16).ok()
}
