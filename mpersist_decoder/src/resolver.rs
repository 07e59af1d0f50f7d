use anyhow::{anyhow, Result};
use mpersist_types::graph::Datum;

/// Supplies objects that a stream names instead of containing.
///
/// A failure does not abort the parse; the named object decodes to an error value instead.
/// Implementations shared between threads must tolerate concurrent calls.
pub trait Resolver {
    fn resolve(&self, name: &[u8]) -> Result<Datum>;
}

impl<F> Resolver for F
where
    F: Fn(&[u8]) -> Result<Datum>,
{
    fn resolve(&self, name: &[u8]) -> Result<Datum> {
        self(name)
    }
}

/// Knows no names.
pub struct NoResolver;

impl Resolver for NoResolver {
    fn resolve(&self, name: &[u8]) -> Result<Datum> {
        Err(anyhow!(
            "No resolver for {:?}.",
            String::from_utf8_lossy(name)
        ))
    }
}
