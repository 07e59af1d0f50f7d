use crate::dispatch::Decoder;
use crate::{ByteCursor, DecodeError, ReferenceTable, Resolver};
use anyhow::{anyhow, bail, Result};
use log::info;
use mpersist_types::graph::{NodeId, ObjectGraph};
use mpersist_types::serde::FormatVersion;
use shorthand::ShortHand;


/// The four bytes opening every stream the persister writes.
pub const PERSIST_MAGIC: [u8; 4] = *b"MP\x80\x01";

/// Each nesting level costs several stack frames of the decoder.
pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Clone, Debug)]
pub struct ParserConfig {
    pub magic: [u8; 4],
    /// Decode with this revision regardless of the header's version line.
    pub version_override: Option<FormatVersion>,
    /// Deepest nesting of values, top-level values counting as depth 1.
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            magic: PERSIST_MAGIC,
            version_override: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ParserState {
    Unstarted,
    HeaderValidated,
    Streaming,
    Done,
    /// A step failed. The parser accepts no further steps.
    Failed,
}

/// The two metadata lines, without their line feeds.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Header {
    pub format_name: String,
    pub version_line: String,
    pub version: FormatVersion,
}

pub enum HeaderOutcome {
    /// The leading bytes are not the configured magic. Not an error: the buffer is something else.
    NotThisFormat { found: Vec<u8> },
    Accepted(Header),
}

pub enum ParseOutcome {
    NotThisFormat { found: Vec<u8> },
    Parsed(Snapshot),
}

/// Everything one complete parse produced.
#[derive(ShortHand, Debug)]
#[shorthand(disable(get))]
pub struct Snapshot {
    #[shorthand(enable(get))]
    header: Header,
    #[shorthand(enable(get))]
    graph: ObjectGraph,
    root: NodeId,
    /// Values decoded directly by the streaming loop, in stream order.
    #[shorthand(enable(get))]
    top_level: Vec<NodeId>,
    #[shorthand(enable(get))]
    table: ReferenceTable,
}

impl Snapshot {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn version(&self) -> FormatVersion {
        self.header.version
    }
}

/// Drives one buffer through `Unstarted -> HeaderValidated -> Streaming -> Done`.
pub struct Parser<'b, 'r> {
    config: ParserConfig,
    state: ParserState,
    header: Option<Header>,
    top_level: Vec<NodeId>,
    dec: Decoder<'b, 'r>,
}

impl<'b, 'r> Parser<'b, 'r> {
    pub fn new(buf: &'b [u8], resolver: &'r dyn Resolver) -> Self {
        Self::with_config(buf, resolver, ParserConfig::default())
    }

    pub fn with_config(buf: &'b [u8], resolver: &'r dyn Resolver, config: ParserConfig) -> Self {
        let version = config.version_override.unwrap_or(FormatVersion::V1);
        let dec = Decoder::new(ByteCursor::new(buf), version, resolver, config.max_depth);
        Self {
            config,
            state: ParserState::Unstarted,
            header: None,
            top_level: vec![],
            dec,
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    /// Offsets filed so far. After a failure, only values that completed before it.
    pub fn reference_table(&self) -> &ReferenceTable {
        &self.dec.table
    }

    pub fn graph(&self) -> &ObjectGraph {
        &self.dec.graph
    }

    pub fn offset(&self) -> usize {
        self.dec.cur.tell()
    }

    pub fn read_header(&mut self) -> Result<HeaderOutcome> {
        match self.state {
            ParserState::Unstarted => {}
            ParserState::Failed => bail!(DecodeError::Poisoned),
            state => bail!("The header was already read; the parser is {state:?}."),
        }

        let res = self.do_read_header();
        match &res {
            Err(_) => self.state = ParserState::Failed,
            Ok(HeaderOutcome::NotThisFormat { .. }) => {}
            Ok(HeaderOutcome::Accepted(header)) => {
                info!(
                    "Accepted header {:?} {:?}; decoding as {:?}.",
                    header.format_name, header.version_line, header.version
                );
                self.dec.version = header.version;
                self.header = Some(header.clone());
                self.state = ParserState::HeaderValidated;
            }
        }
        res
    }

    fn do_read_header(&mut self) -> Result<HeaderOutcome> {
        let cur = &mut self.dec.cur;

        let magic = cur.read(Some(self.config.magic.len() + 1));
        if magic.len() <= self.config.magic.len()
            || magic[..self.config.magic.len()] != self.config.magic
            || magic[self.config.magic.len()] != b'\n'
        {
            let found = magic.iter().copied().take(self.config.magic.len()).collect();
            cur.seek(0)?;
            return Ok(HeaderOutcome::NotThisFormat { found });
        }

        let mut lines = vec![];
        for _ in 0..2 {
            let offset = cur.tell();
            let line = cur.readline()?;
            let line = &line[..line.len() - 1];
            match std::str::from_utf8(line) {
                Err(_) => bail!(DecodeError::InvalidUtf8 { offset }),
                Ok(line) => lines.push(String::from(line)),
            }
        }
        let version_line = lines.pop().unwrap_or_default();
        let format_name = lines.pop().unwrap_or_default();

        let version = match self.config.version_override {
            Some(version) => version,
            None => match FormatVersion::from_version_line(&version_line)? {
                None => bail!(DecodeError::UnknownFormatVersion {
                    version: version_line
                }),
                Some(version) => version,
            },
        };

        Ok(HeaderOutcome::Accepted(Header {
            format_name,
            version_line,
            version,
        }))
    }

    /// One streaming step: decodes the next top-level value.
    ///
    /// `Ok(None)` means the stream was already exhausted; the parser is now `Done`.
    pub fn decode_next(&mut self) -> Result<Option<NodeId>> {
        match self.state {
            ParserState::Unstarted => bail!("The header has not been read."),
            ParserState::Failed => bail!(DecodeError::Poisoned),
            ParserState::Done => bail!(DecodeError::EndOfStream {
                offset: self.dec.cur.tell()
            }),
            ParserState::HeaderValidated | ParserState::Streaming => {}
        }

        if self.dec.cur.is_at_end() {
            self.state = ParserState::Done;
            return Ok(None);
        }

        self.state = ParserState::Streaming;
        match self.dec.load() {
            Err(e) => {
                self.state = ParserState::Failed;
                Err(e)
            }
            Ok(id) => {
                self.top_level.push(id);
                if self.dec.cur.is_at_end() {
                    self.state = ParserState::Done;
                }
                Ok(Some(id))
            }
        }
    }

    /// Reads the header unless already read, then streams to the end.
    pub fn parse(mut self) -> Result<ParseOutcome> {
        if self.state == ParserState::Unstarted {
            if let HeaderOutcome::NotThisFormat { found } = self.read_header()? {
                return Ok(ParseOutcome::NotThisFormat { found });
            }
        }
        while self.state != ParserState::Done {
            self.decode_next()?;
        }

        let root = self.dec.root.ok_or(DecodeError::MissingRoot)?;
        let header = self
            .header
            .ok_or_else(|| anyhow!("Streaming finished without a header."))?;
        debug_assert_eq!(self.dec.graph.pending_count(), 0);

        info!(
            "Decoded {} values into {} nodes; root is {root:?}.",
            self.top_level.len(),
            self.dec.graph.len()
        );

        Ok(ParseOutcome::Parsed(Snapshot {
            header,
            graph: self.dec.graph,
            root,
            top_level: self.top_level,
            table: self.dec.table,
        }))
    }
}

/// Parses a buffer that must be a persist stream.
pub fn decode_snapshot(buf: &[u8], resolver: &dyn Resolver) -> Result<Snapshot> {
    match Parser::new(buf, resolver).parse()? {
        ParseOutcome::NotThisFormat { found } => Err(anyhow!(DecodeError::Format { found })),
        ParseOutcome::Parsed(snap) => Ok(snap),
    }
}
