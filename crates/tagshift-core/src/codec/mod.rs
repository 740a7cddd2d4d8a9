//! Binary encoding of tag trees.
//!
//! Every node is written as its type id followed by its payload. The root
//! additionally carries a (usually empty) name:
//!
//! ```text
//! root      := type-id:u8 name:string payload
//! string    := length:u16 utf8-bytes
//! compound  := (type-id:u8 name:string payload)* 0x00
//! list      := element-type-id:u8 count:i32 payload*
//! arrays    := length:i32 element*
//! ```
//!
//! Scalars are fixed-width big-endian. Written streams are always gzip
//! framed; reads detect the gzip magic and accept both forms.

mod batch;
mod reader;
mod writer;

use std::io::{BufReader, Cursor, ErrorKind, Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::error::Result;
use crate::tag::TagValue;

pub use batch::BATCH_SENTINEL;

/// First two bytes of every gzip member.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Tunables for encoding and decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    /// gzip level, 0 (store) to 9 (best).
    pub compression_level: u32,
    /// Deepest compound/list nesting accepted on decode.
    pub max_depth: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            compression_level: 6,
            max_depth: 512,
        }
    }
}

/// Reads and writes tag trees in the binary format.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagCodec {
    options: CodecOptions,
}

impl TagCodec {
    pub fn new(options: CodecOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Write `tree` gzip framed with an empty root name.
    pub fn write<W: Write>(&self, tree: &TagValue, writer: W) -> Result<()> {
        self.write_named("", tree, writer)
    }

    /// Write `tree` gzip framed under the root name `name`.
    pub fn write_named<W: Write>(&self, name: &str, tree: &TagValue, writer: W) -> Result<()> {
        let level = Compression::new(self.options.compression_level.min(9));
        let mut encoder = GzEncoder::new(writer, level);
        writer::write_root(&mut encoder, name, tree)?;
        encoder.finish()?.flush()?;
        Ok(())
    }

    /// Write `tree` without gzip framing, for embedding in other streams.
    pub fn write_uncompressed<W: Write>(&self, tree: &TagValue, mut writer: W) -> Result<()> {
        writer::write_root(&mut writer, "", tree)?;
        Ok(())
    }

    /// Read one tree, discarding the root name.
    pub fn read<R: Read>(&self, reader: R) -> Result<TagValue> {
        self.read_named(reader).map(|(_, tree)| tree)
    }

    /// Read one tree and its root name. Gzip framing is detected from the
    /// first two bytes.
    pub fn read_named<R: Read>(&self, mut reader: R) -> Result<(String, TagValue)> {
        let mut magic = [0u8; GZIP_MAGIC.len()];
        let filled = read_up_to(&mut reader, &mut magic)?;
        let compressed = is_gzip(&magic[..filled]);
        let stream = Cursor::new(magic).take(filled as u64).chain(reader);
        if compressed {
            let mut decoder = BufReader::new(GzDecoder::new(stream));
            reader::read_root(&mut decoder, self.options.max_depth)
        } else {
            reader::read_root(&mut BufReader::new(stream), self.options.max_depth)
        }
    }

    /// Encode to an in-memory gzip framed buffer.
    pub fn to_bytes(&self, tree: &TagValue) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write(tree, &mut out)?;
        Ok(out)
    }

    pub fn from_bytes(&self, bytes: &[u8]) -> Result<TagValue> {
        self.read(bytes)
    }
}

/// Fill `buf` unless the stream ends first; returns the bytes read.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Whether `bytes` start with the gzip magic number.
pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}
