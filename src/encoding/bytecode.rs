//! The framed binary representation.
//!
//! The layout is a four byte magic, a four byte version, the
//! instruction count as a little endian `u64` and then one
//! `{kind, arg}` byte pair per instruction.

use std::io::Read;

use crate::{
    error::DecodeError,
    opcode::{Op, OpCode, Value},
};

/// The file magic.
pub const MAGIC: [u8; 4] = [4, 3, 2, 1];

/// The format version.
pub const VERSION: [u8; 4] = [0, 0, 1, 0];

/// Reads an exactly sized chunk off the reader.
fn read_array<const N: usize>(r: &mut impl Read) -> Result<[u8; N], DecodeError> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

/// Will encode a whole program.
pub fn marshal(code: &[Op]) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAGIC.len() + VERSION.len() + 8 + 2 * code.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&VERSION);
    out.extend_from_slice(&(code.len() as u64).to_le_bytes());
    for op in code {
        out.push(op.kind as i8 as u8);
        out.push(op.arg as u8);
    }
    out
}

/// Will decode a whole program, verifying magic and version first.
pub fn unmarshal(data: &[u8]) -> Result<Vec<Op>, DecodeError> {
    let mut r = data;
    let magic: [u8; 4] = read_array(&mut r)?;
    if magic != MAGIC {
        return Err(DecodeError::Magic {
            want: MAGIC,
            got: magic,
        });
    }
    let version: [u8; 4] = read_array(&mut r)?;
    if version != VERSION {
        return Err(DecodeError::Version {
            want: VERSION,
            got: version,
        });
    }
    let length = u64::from_le_bytes(read_array(&mut r)?);
    let mut out = Vec::with_capacity(length.min(u16::MAX as u64) as usize);
    for _ in 0..length {
        let pair: [u8; 2] = read_array(&mut r)?;
        out.push(Op::new(
            OpCode::from_i8(pair[0] as i8).unwrap_or(OpCode::Noop),
            pair[1] as Value,
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryInto;

    fn sample_code() -> Vec<Op> {
        vec![
            Op::new(OpCode::Push, 42),
            Op::new(OpCode::Push, -43),
            Op::new(OpCode::Compare, 0),
            Op::new(OpCode::JumpIf, -2),
            Op::new(OpCode::Noop, 0),
        ]
    }

    #[test]
    fn test_roundtrip() {
        let code = sample_code();
        assert_eq!(code, unmarshal(&marshal(&code)).unwrap());
    }

    #[test]
    fn test_roundtrip_empty() {
        assert!(unmarshal(&marshal(&[])).unwrap().is_empty());
    }

    #[test]
    fn test_frame_layout() {
        let data = marshal(&sample_code());
        assert_eq!(&MAGIC, &data[..4]);
        assert_eq!(&VERSION, &data[4..8]);
        assert_eq!(5, u64::from_le_bytes(data[8..16].try_into().unwrap()));
        assert_eq!(16 + 2 * 5, data.len());
    }

    #[test]
    fn test_wrong_magic() {
        let mut data = marshal(&sample_code());
        data[0] = 9;
        let err = unmarshal(&data).unwrap_err();
        assert!(matches!(err, DecodeError::Magic { .. }), "got {}", err);
        assert!(err.to_string().starts_with("wrong magic detected"));
    }

    #[test]
    fn test_wrong_version() {
        let mut data = marshal(&sample_code());
        data[6] = 9;
        let err = unmarshal(&data).unwrap_err();
        assert!(matches!(err, DecodeError::Version { .. }), "got {}", err);
    }

    #[test]
    fn test_truncated_input() {
        let data = marshal(&sample_code());
        for cut in [2, 6, 12, data.len() - 1] {
            assert!(unmarshal(&data[..cut]).is_err(), "cut at {}", cut);
        }
    }

    #[test]
    fn test_unknown_kind_decodes_to_noop() {
        let mut data = marshal(&[Op::new(OpCode::Push, 7)]);
        let kind_offset = data.len() - 2;
        data[kind_offset] = 99;
        assert_eq!(
            vec![Op::new(OpCode::Noop, 7)],
            unmarshal(&data).unwrap()
        );
    }
}
