use anyhow::{anyhow, Result};
use derive_more::Deref;
use mpersist_decoder::Resolver;
use mpersist_types::graph::Datum;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// A fixed table of externally resolved objects.
///
/// The names file has one entry per line: a name, then optionally whitespace and a description.
/// The object a name resolves to is its description, or the name itself.
/// Blank lines and lines starting with `#` are skipped.
#[derive(Deref, Default, Debug)]
pub struct NameRegistry(HashMap<Vec<u8>, Datum>);

impl NameRegistry {
    pub fn parse(text: &str) -> Self {
        let mut reg = Self::default();
        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (name, desc) = match line.split_once(char::is_whitespace) {
                None => (line, line),
                Some((name, desc)) => (name, desc.trim()),
            };
            reg.insert(name, Datum::str(desc));
        }
        reg
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    pub fn insert<N: Into<Vec<u8>>>(&mut self, name: N, dat: Datum) {
        self.0.insert(name.into(), dat);
    }
}

impl Resolver for NameRegistry {
    fn resolve(&self, name: &[u8]) -> Result<Datum> {
        self.0
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("{:?} is not registered", String::from_utf8_lossy(name)))
    }
}
