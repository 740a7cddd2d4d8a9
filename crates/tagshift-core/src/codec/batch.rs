//! Batch container: many trees in one stream.
//!
//! Each tree is gzip encoded on its own and written as an `i32` big-endian
//! byte length followed by the blob. A zero length terminates the batch.
//! Readers also stop cleanly at end of stream.

use std::io::{ErrorKind, Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::TagCodec;
use crate::error::{Result, TagError};
use crate::tag::TagValue;

/// Length prefix marking the end of a batch.
pub const BATCH_SENTINEL: i32 = 0;

impl TagCodec {
    /// Write `trees` as a sentinel-terminated batch.
    pub fn write_batch<W: Write>(&self, trees: &[TagValue], mut writer: W) -> Result<()> {
        for tree in trees {
            let blob = self.to_bytes(tree)?;
            let length = i32::try_from(blob.len()).map_err(|_| TagError::InvalidLength {
                what: "batch entry",
                length: blob.len() as i64,
            })?;
            writer.write_all(&length.to_be_bytes())?;
            writer.write_all(&blob)?;
        }
        writer.write_all(&BATCH_SENTINEL.to_be_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Read trees until the sentinel or end of stream.
    pub fn read_batch<R: Read>(&self, mut reader: R) -> Result<Vec<TagValue>> {
        let mut trees = Vec::new();
        while let Some(length) = read_entry_length(&mut reader)? {
            if length == BATCH_SENTINEL {
                break;
            }
            let length = u64::try_from(length).map_err(|_| TagError::InvalidLength {
                what: "batch entry",
                length: i64::from(length),
            })?;
            let mut blob = Vec::new();
            (&mut reader).take(length).read_to_end(&mut blob)?;
            if blob.len() as u64 != length {
                return Err(std::io::Error::from(ErrorKind::UnexpectedEof).into());
            }
            trees.push(self.from_bytes(&blob)?);
        }
        Ok(trees)
    }

    /// Batch encode `trees` and wrap the bytes in standard Base64.
    pub fn encode_batch_base64(&self, trees: &[TagValue]) -> Result<String> {
        let mut bytes = Vec::new();
        self.write_batch(trees, &mut bytes)?;
        Ok(STANDARD.encode(bytes))
    }

    /// Inverse of [`TagCodec::encode_batch_base64`]. Surrounding whitespace is
    /// ignored and blank input decodes to an empty batch.
    pub fn decode_batch_base64(&self, text: &str) -> Result<Vec<TagValue>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let bytes = STANDARD.decode(text)?;
        self.read_batch(bytes.as_slice())
    }
}

/// `None` at a clean end of stream; an error if the stream ends inside the
/// length prefix.
fn read_entry_length<R: Read>(reader: &mut R) -> Result<Option<i32>> {
    let mut buf = [0u8; 4];
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(std::io::Error::from(ErrorKind::UnexpectedEof).into()),
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(Some(i32::from_be_bytes(buf)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::compound_of;

    fn sample() -> Vec<TagValue> {
        vec![
            compound_of([("id", TagValue::String("minecraft:diamond_sword".into()))]),
            TagValue::compound(),
            compound_of([("Count", TagValue::Byte(64))]),
        ]
    }

    #[test]
    fn test_batch_round_trip() {
        let codec = TagCodec::default();
        let mut bytes = Vec::new();
        codec.write_batch(&sample(), &mut bytes).unwrap();
        assert_eq!(&bytes[bytes.len() - 4..], &[0, 0, 0, 0]);
        assert_eq!(codec.read_batch(bytes.as_slice()).unwrap(), sample());
    }

    #[test]
    fn test_batch_stops_at_sentinel() {
        let codec = TagCodec::default();
        let mut bytes = Vec::new();
        codec.write_batch(&sample()[..1], &mut bytes).unwrap();
        // Anything after the sentinel is not part of the batch.
        bytes.extend_from_slice(&[0xde, 0xad]);
        assert_eq!(codec.read_batch(bytes.as_slice()).unwrap().len(), 1);
    }

    #[test]
    fn test_batch_without_sentinel_ends_at_eof() {
        let codec = TagCodec::default();
        let mut bytes = Vec::new();
        codec.write_batch(&sample(), &mut bytes).unwrap();
        bytes.truncate(bytes.len() - 4);
        assert_eq!(codec.read_batch(bytes.as_slice()).unwrap().len(), 3);
    }

    #[test]
    fn test_truncated_entry_is_io_error() {
        let codec = TagCodec::default();
        let mut bytes = Vec::new();
        codec.write_batch(&sample(), &mut bytes).unwrap();
        bytes.truncate(10);
        assert!(matches!(codec.read_batch(bytes.as_slice()), Err(TagError::Io(_))));
    }

    #[test]
    fn test_base64_transport() {
        let codec = TagCodec::default();
        let text = codec.encode_batch_base64(&sample()).unwrap();
        assert!(text.is_ascii());
        assert_eq!(codec.decode_batch_base64(&format!("  {text}\n")).unwrap(), sample());
        assert!(codec.decode_batch_base64("").unwrap().is_empty());
        assert!(matches!(
            codec.decode_batch_base64("not base64!"),
            Err(TagError::Base64(_))
        ));
    }
}
