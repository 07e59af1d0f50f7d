use anyhow::{anyhow, Result};
use mpersist_decoder::{ParserConfig, PERSIST_MAGIC};
use std::env;
use std::path::PathBuf;

pub const ENV_VAR_MAGIC: &str = "MPERSIST_MAGIC";

pub const ENV_VAR_NAMES: &str = "MPERSIST_NAMES";

/// A magic given as 8 hex digits, e.g. `4d508001`.
pub fn parse_magic_hex(s: &str) -> Result<[u8; 4]> {
    let s = s.trim();
    if s.len() != 8 || !s.is_ascii() {
        return Err(anyhow!("A magic is 8 hex digits; got {s:?}."));
    }
    let mut magic = [0u8; 4];
    for (i, b) in magic.iter_mut().enumerate() {
        *b = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)?;
    }
    Ok(magic)
}

/// The flag wins over the environment, which wins over the persister's magic.
pub fn parser_config(magic_arg: Option<&str>) -> Result<ParserConfig> {
    let magic = match magic_arg {
        Some(s) => parse_magic_hex(s)?,
        None => match env::var(ENV_VAR_MAGIC) {
            Ok(s) => parse_magic_hex(&s)?,
            Err(_) => PERSIST_MAGIC,
        },
    };
    Ok(ParserConfig {
        magic,
        ..ParserConfig::default()
    })
}

pub fn names_path(names_arg: Option<PathBuf>) -> Option<PathBuf> {
    names_arg.or_else(|| env::var(ENV_VAR_NAMES).ok().map(PathBuf::from))
}
