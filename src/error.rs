use std::io;

use thiserror::Error;

/// Errors surfaced while turning bytes into a program.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("at line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<DecodeError>,
    },
    #[error("unknown opcode: {0:?}")]
    UnknownOpcode(String),
    #[error("could not parse opcode arg: {0}")]
    BadValue(#[from] std::num::ParseIntError),
    #[error("program text is not valid utf-8: {0}")]
    Text(#[from] std::str::Utf8Error),
    #[error("wrong magic detected: want {want:?}, got {got:?}")]
    Magic { want: [u8; 4], got: [u8; 4] },
    #[error("version mismatch: want {want:?}, got {got:?}")]
    Version { want: [u8; 4], got: [u8; 4] },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Errors surfaced by the program loader and saver.
#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("unknown encoding: {0:?}")]
    Unknown(String),
    #[error("could not determine encoding for {0:?}")]
    Undetermined(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Io(#[from] io::Error),
}
