//! The json representation.
//!
//! A program is an array of `{"o": <opcode>, "a": <arg>}` objects. Zero
//! valued fields are omitted on encode and default on decode, so a
//! plain `noop` is just `{}`.

use serde::{Deserialize, Serialize};

use crate::{
    error::DecodeError,
    opcode::{Op, OpCode},
};

/// The wire form of one instruction.
#[derive(Debug, Default, Serialize, Deserialize)]
struct OpField {
    #[serde(rename = "o", default, skip_serializing_if = "is_zero")]
    kind: i8,
    #[serde(rename = "a", default, skip_serializing_if = "is_zero")]
    arg: i8,
}

fn is_zero(v: &i8) -> bool {
    *v == 0
}

impl From<Op> for OpField {
    fn from(op: Op) -> Self {
        Self {
            kind: op.kind as i8,
            arg: op.arg,
        }
    }
}

impl From<OpField> for Op {
    fn from(field: OpField) -> Self {
        Op::new(OpCode::from_i8(field.kind).unwrap_or(OpCode::Noop), field.arg)
    }
}

/// Will encode a whole program.
pub fn marshal(code: &[Op]) -> Result<Vec<u8>, DecodeError> {
    let fields: Vec<OpField> = code.iter().map(|&op| op.into()).collect();
    Ok(serde_json::to_vec(&fields)?)
}

/// Will decode a whole program.
pub fn unmarshal(data: &[u8]) -> Result<Vec<Op>, DecodeError> {
    let fields: Vec<OpField> = serde_json::from_slice(data)?;
    Ok(fields.into_iter().map(Op::from).collect())
}
