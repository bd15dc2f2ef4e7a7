//! DAAP/DMAP tagged-chunk decoding.
//!
//! Every chunk on the wire is:
//!
//! ```text
//! +--------+----------------+------------------+
//! | tag(4) | length(4, BE)  | content(length)  |
//! +--------+----------------+------------------+
//! ```
//!
//! Content is either a scalar or, for container tags, a further sequence of
//! chunks. [`decode`] walks the buffer once, recursing into containers, and
//! returns a single flat [`DecodedRecord`] holding every tag the
//! [`Dictionary`] recognizes. Unknown tags are skipped, which is what keeps
//! older receivers working against newer senders.
//!
//! ## Duplicate names
//!
//! Entries are written in scan order, so when the same qualified name occurs
//! more than once (for example in two sibling `mlit` items) the last
//! occurrence wins.

pub mod dictionary;

use std::collections::HashMap;

use crate::error::{FormatErrorKind, RaopError, Result};
pub use dictionary::{Dictionary, StaticDictionary, TagKind, TagSpec};

/// Size of a chunk header: 4-byte tag plus 4-byte length.
pub const HEADER_LEN: usize = 8;

/// Maximum container nesting accepted by the decoder.
pub const MAX_DEPTH: usize = 32;

/// A decoded scalar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    Text(String),
    Blob(Vec<u8>),
}

impl TagValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Any unsigned integer kind, widened.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            TagValue::U8(v) => Some(v.into()),
            TagValue::U16(v) => Some(v.into()),
            TagValue::U32(v) => Some(v.into()),
            TagValue::U64(v) => Some(v),
            _ => None,
        }
    }
}

/// Flat mapping from qualified tag name to value.
pub type DecodedRecord = HashMap<String, TagValue>;

/// Decode `buf` against the built-in dictionary.
///
/// ```
/// use raop::daap::{self, TagValue};
///
/// let mut buf = b"minm".to_vec();
/// buf.extend_from_slice(&5u32.to_be_bytes());
/// buf.extend_from_slice(b"Hello");
///
/// let record = daap::decode(&buf).unwrap();
/// assert_eq!(record["dmap.itemname"], TagValue::Text("Hello".into()));
/// ```
pub fn decode(buf: &[u8]) -> Result<DecodedRecord> {
    decode_with(buf, &StaticDictionary)
}

/// Decode `buf` against a caller-supplied dictionary.
///
/// Fails without a partial result on the first structural error.
pub fn decode_with<D: Dictionary + ?Sized>(buf: &[u8], dictionary: &D) -> Result<DecodedRecord> {
    let mut record = DecodedRecord::new();
    decode_chunks(buf, dictionary, 0, &mut record)?;
    Ok(record)
}

/// Walk one chunk sequence, writing recognized scalars into `record`.
///
/// Container children are decoded straight into the same map; this is the
/// flattening step and keeps last-write-wins in scan order.
fn decode_chunks<D: Dictionary + ?Sized>(
    mut buf: &[u8],
    dictionary: &D,
    depth: usize,
    record: &mut DecodedRecord,
) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(RaopError::Format(FormatErrorKind::TooDeep));
    }

    while !buf.is_empty() {
        if buf.len() < HEADER_LEN {
            return Err(RaopError::Format(FormatErrorKind::TruncatedHeader {
                remaining: buf.len(),
            }));
        }

        let (header, rest) = buf.split_at(HEADER_LEN);
        let tag: [u8; 4] = [header[0], header[1], header[2], header[3]];
        let declared = u32::from_be_bytes([header[4], header[5], header[6], header[7]]) as usize;

        if declared > rest.len() {
            return Err(RaopError::OutOfBounds {
                tag: tag_name(&tag),
                declared,
                remaining: rest.len(),
            });
        }

        let (content, tail) = rest.split_at(declared);
        buf = tail;

        let Some(spec) = dictionary.lookup(&tag) else {
            tracing::trace!(tag = %tag_name(&tag), len = declared, "skipping unknown tag");
            continue;
        };

        if spec.kind == TagKind::Container {
            decode_chunks(content, dictionary, depth + 1, record)?;
        } else {
            let value = decode_scalar(&tag, spec.kind, content)?;
            record.insert(spec.name.to_string(), value);
        }
    }

    Ok(())
}

fn decode_scalar(tag: &[u8; 4], kind: TagKind, content: &[u8]) -> Result<TagValue> {
    if let Some(expected) = kind.fixed_width()
        && content.len() != expected
    {
        return Err(RaopError::Format(FormatErrorKind::WrongWidth {
            tag: tag_name(tag),
            expected,
            actual: content.len(),
        }));
    }

    let value = match kind {
        TagKind::U8 => TagValue::U8(content[0]),
        TagKind::I8 => TagValue::I8(i8::from_be_bytes([content[0]])),
        TagKind::U16 => TagValue::U16(u16::from_be_bytes([content[0], content[1]])),
        TagKind::U32 => TagValue::U32(u32::from_be_bytes([
            content[0], content[1], content[2], content[3],
        ])),
        TagKind::U64 => {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(content);
            TagValue::U64(u64::from_be_bytes(bytes))
        }
        TagKind::Text => TagValue::Text(String::from_utf8_lossy(content).into_owned()),
        TagKind::Blob => TagValue::Blob(content.to_vec()),
        TagKind::Container => unreachable!("containers are handled by decode_chunks"),
    };
    Ok(value)
}

fn tag_name(tag: &[u8; 4]) -> String {
    String::from_utf8_lossy(tag).into_owned()
}
