//! The line oriented text representation.
//!
//! One instruction per line as `<mnemonic>\t<arg>`. Blank lines and
//! lines starting with `;` are comments. Arguments default to decimal
//! and accept the base prefixes `0x`/`x`, `0o`/`o` and `0b`/`b`.

use crate::{
    error::DecodeError,
    opcode::{Op, OpCode, Value},
};

/// The recognized base prefixes, longest selector first per base.
const BASES: &[(&str, u32)] = &[("x", 16), ("o", 8), ("b", 2)];

/// Parses one argument, honoring an optional base prefix.
fn parse_value(s: &str) -> Result<Value, DecodeError> {
    let lower = s.to_ascii_lowercase();
    let mut digits = s;
    let mut base = 10;
    for &(selector, b) in BASES {
        let long = ["0", selector].concat();
        if lower.starts_with(&long) {
            digits = &s[long.len()..];
            base = b;
            break;
        }
        if lower.starts_with(selector) {
            digits = &s[selector.len()..];
            base = b;
            break;
        }
    }
    Ok(Value::from_str_radix(digits, base)?)
}

/// Parses the fields of one instruction line. A missing argument counts
/// as `0`.
fn parse_op(fields: &[&str]) -> Result<Op, DecodeError> {
    let kind = OpCode::from_name(fields[0])
        .ok_or_else(|| DecodeError::UnknownOpcode(fields[0].to_string()))?;
    let arg = match fields.get(1) {
        Some(raw) => parse_value(raw)?,
        None => 0,
    };
    Ok(Op::new(kind, arg))
}

/// Will decode a single line. Comments and blank lines decode to
/// `None`.
pub fn decode_line(line: &str) -> Result<Option<Op>, DecodeError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(';') {
        return Ok(None);
    }
    let fields: Vec<&str> = line.split_whitespace().collect();
    parse_op(&fields).map(Some)
}

/// Will decode a whole program, reporting the offending line on
/// failure.
pub fn unmarshal(data: &[u8]) -> Result<Vec<Op>, DecodeError> {
    let text = std::str::from_utf8(data).map_err(DecodeError::from)?;
    let mut out = Vec::new();
    for (i, line) in text.lines().enumerate() {
        match decode_line(line) {
            Ok(Some(op)) => out.push(op),
            Ok(None) => continue,
            Err(err) => {
                return Err(DecodeError::Line {
                    line: i + 1,
                    source: Box::new(err),
                })
            }
        }
    }
    Ok(out)
}

/// Will encode a single instruction as one line, without the newline.
pub fn encode_line(op: Op) -> String {
    format!("{}\t{}", op.kind.name(), op.arg)
}

/// Will encode a whole program.
pub fn marshal(code: &[Op]) -> String {
    let mut out = String::new();
    for &op in code {
        out.push_str(&encode_line(op));
        out.push('\n');
    }
    out
}
