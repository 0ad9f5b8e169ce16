// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Modified UTF-8.
//!
//! ```text
//! U+0001 ..= U+007F   0xxxxxxx
//! U+0000, U+0080 ..   110xxxxx 10xxxxxx
//! U+0800 ..= U+FFFF   1110xxxx 10xxxxxx 10xxxxxx
//! ```
//!
//! The string is encoded as UTF-16 code units, so a supplementary character
//! becomes two 3-byte surrogate sequences.

use crate::error::{IonError, Result};

/// Longest encoded form that fits the 2-byte length prefix.
pub const MAX_ENCODED_LEN: usize = u16::MAX as usize;

pub fn encode(s: &str) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(s.len());
    for unit in s.encode_utf16() {
        push_unit(&mut buf, unit);
    }
    if buf.len() > MAX_ENCODED_LEN {
        return Err(IonError::Unsupported(format!(
            "string of {} encoded bytes exceeds {}",
            buf.len(),
            MAX_ENCODED_LEN
        )));
    }
    Ok(buf)
}

fn push_unit(buf: &mut Vec<u8>, unit: u16) {
    match unit {
        0x0001..=0x007F => buf.push(unit as u8),
        0x0000 | 0x0080..=0x07FF => {
            buf.push(0xC0 | (unit >> 6) as u8);
            buf.push(0x80 | (unit & 0x3F) as u8);
        }
        _ => {
            buf.push(0xE0 | (unit >> 12) as u8);
            buf.push(0x80 | ((unit >> 6) & 0x3F) as u8);
            buf.push(0x80 | (unit & 0x3F) as u8);
        }
    }
}

pub fn decode(bytes: &[u8]) -> Result<String> {
    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let b0 = bytes[i];
        let unit = match b0 >> 4 {
            0x0..=0x7 => {
                i += 1;
                u16::from(b0)
            }
            0xC | 0xD => {
                let b1 = continuation(bytes, i + 1)?;
                i += 2;
                (u16::from(b0 & 0x1F) << 6) | b1
            }
            0xE => {
                let b1 = continuation(bytes, i + 1)?;
                let b2 = continuation(bytes, i + 2)?;
                i += 3;
                (u16::from(b0 & 0x0F) << 12) | (b1 << 6) | b2
            }
            _ => {
                return Err(IonError::corrupt(format!(
                    "malformed modified UTF-8 at byte {}",
                    i
                )))
            }
        };
        units.push(unit);
    }

    String::from_utf16(&units).map_err(|_| IonError::corrupt("unpaired surrogate in string"))
}

fn continuation(bytes: &[u8], at: usize) -> Result<u16> {
    match bytes.get(at) {
        Some(b) if b & 0xC0 == 0x80 => Ok(u16::from(b & 0x3F)),
        Some(_) => Err(IonError::corrupt(format!(
            "malformed modified UTF-8 at byte {}",
            at
        ))),
        None => Err(IonError::corrupt("truncated modified UTF-8 sequence")),
    }
}
