//! The program representations and the loader/saver on top of them.
//!
//! Three formats exist, all bidirectional and round trip exact modulo
//! whitespace: a line oriented [`human`](human) text format, a framed
//! [`bytecode`](bytecode) format and a [`json`](json) format. The
//! loader picks the format from an explicit choice or the file
//! extension.

pub mod bytecode;
pub mod human;
pub mod json;

use std::{
    fmt, fs,
    io::{self, Read, Write},
    path::Path,
    str::FromStr,
};

use crate::{error::EncodingError, opcode::Op};

/// The filename standing in for standard input and output.
pub const STDIO_FILENAME: &str = "-";

/// The available program representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// The line oriented text format, extension `.evo`.
    Text,
    /// The framed binary format, extension `.evox`.
    Binary,
    /// The json format, extension `.json`.
    Json,
}

impl Encoding {
    /// All encodings a user can pick from.
    pub const ALL: &'static [Encoding] = &[Encoding::Text, Encoding::Binary, Encoding::Json];

    /// The user facing name of the encoding.
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Text => "text",
            Encoding::Binary => "bin",
            Encoding::Json => "json",
        }
    }

    /// Will guess the encoding from the extension of `path`.
    pub fn for_path(path: &str) -> Option<Encoding> {
        match Path::new(path).extension()?.to_str()? {
            "evo" => Some(Encoding::Text),
            "evox" => Some(Encoding::Binary),
            "json" => Some(Encoding::Json),
            _ => None,
        }
    }
}

impl FromStr for Encoding {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Encoding::Text),
            "bin" => Ok(Encoding::Binary),
            "json" => Ok(Encoding::Json),
            _ => Err(EncodingError::Unknown(s.to_string())),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Resolves the encoding to use for `path`, either the explicit choice
/// or whatever the extension suggests.
fn resolve(path: &str, encoding: Option<Encoding>) -> Result<Encoding, EncodingError> {
    encoding
        .or_else(|| Encoding::for_path(path))
        .ok_or_else(|| EncodingError::Undetermined(path.to_string()))
}

/// Will load a program from `path`, or from standard input for
/// [`STDIO_FILENAME`](STDIO_FILENAME).
pub fn load(path: &str, encoding: Option<Encoding>) -> Result<Vec<Op>, EncodingError> {
    let encoding = resolve(path, encoding)?;
    let data = if path == STDIO_FILENAME {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        buf
    } else {
        fs::read(path)?
    };
    let code = match encoding {
        Encoding::Text => human::unmarshal(&data)?,
        Encoding::Binary => bytecode::unmarshal(&data)?,
        Encoding::Json => json::unmarshal(&data)?,
    };
    log::debug!("loaded {} ops from {:?} as {}", code.len(), path, encoding);
    Ok(code)
}

/// Will save a program to `path`, or to standard output for
/// [`STDIO_FILENAME`](STDIO_FILENAME).
pub fn save(path: &str, encoding: Option<Encoding>, code: &[Op]) -> Result<(), EncodingError> {
    let encoding = resolve(path, encoding)?;
    let data = match encoding {
        Encoding::Text => human::marshal(code).into_bytes(),
        Encoding::Binary => bytecode::marshal(code),
        Encoding::Json => json::marshal(code)?,
    };
    if path == STDIO_FILENAME {
        io::stdout().write_all(&data)?;
    } else {
        fs::write(path, &data)?;
    }
    log::debug!("saved {} ops to {:?} as {}", code.len(), path, encoding);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::{Op, OpCode};

    #[test]
    fn test_for_path() {
        assert_eq!(Some(Encoding::Text), Encoding::for_path("prog.evo"));
        assert_eq!(Some(Encoding::Binary), Encoding::for_path("prog.evox"));
        assert_eq!(Some(Encoding::Json), Encoding::for_path("dir/prog.json"));
        assert_eq!(None, Encoding::for_path("prog.txt"));
        assert_eq!(None, Encoding::for_path("prog"));
        assert_eq!(None, Encoding::for_path(STDIO_FILENAME));
    }

    #[test]
    fn test_from_str() {
        for &enc in Encoding::ALL {
            assert_eq!(enc, enc.name().parse().unwrap());
        }
        assert!("evo".parse::<Encoding>().is_err());
    }

    #[test]
    fn test_load_undetermined() {
        let err = load("prog.txt", None).unwrap_err();
        assert_eq!(
            "could not determine encoding for \"prog.txt\"",
            err.to_string()
        );
    }

    #[test]
    fn test_save_load_roundtrip() {
        let code = vec![
            Op::new(OpCode::Push, 5),
            Op::new(OpCode::Store, 0),
            Op::new(OpCode::Noop, 0),
        ];
        let path = std::env::temp_dir().join("evo_encoding_roundtrip.evox");
        let path = path.to_str().unwrap();

        save(path, None, &code).unwrap();
        let got = load(path, None).unwrap();
        let _ = fs::remove_file(path);

        assert_eq!(code, got);
    }
}
