//! The host's native compressed tag stream
//!
//! A gzip-framed, big-endian stream holding one named root compound. Strings
//! use the host's modified UTF-8 (NUL as two bytes, supplementary characters
//! as surrogate pairs). Nesting deeper than [`MAX_DEPTH`] is rejected.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use super::tag::{RawTag, TagKind};
use super::HostFault;

pub const MAX_DEPTH: usize = 512;

/// Encode a root compound into the compressed stream
pub fn write_compressed(root: &RawTag, root_name: &str) -> Result<Vec<u8>, HostFault> {
    if root.kind() != TagKind::Compound {
        return Err(HostFault::Codec(format!(
            "root tag must be a compound, got {}",
            root.kind()
        )));
    }
    let mut raw = Vec::new();
    raw.push(TagKind::Compound.id());
    write_string(&mut raw, root_name)?;
    write_payload(&mut raw, root, 0)?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&raw)
        .map_err(|e| HostFault::Codec(e.to_string()))?;
    encoder.finish().map_err(|e| HostFault::Codec(e.to_string()))
}

/// Decode the compressed stream into its root name and compound
pub fn read_compressed(bytes: &[u8]) -> Result<(String, RawTag), HostFault> {
    let mut raw = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut raw)
        .map_err(|e| HostFault::Codec(format!("gzip: {}", e)))?;

    let mut cursor = Cursor { data: &raw, pos: 0 };
    let id = cursor.u8()?;
    if id != TagKind::Compound.id() {
        return Err(HostFault::Codec(format!(
            "root tag must be a compound, got type id {}",
            id
        )));
    }
    let name = cursor.string()?;
    let root = cursor.payload(TagKind::Compound, 0)?;
    Ok((name, root))
}

fn write_string(out: &mut Vec<u8>, s: &str) -> Result<(), HostFault> {
    let encoded = encode_modified_utf8(s);
    let len = u16::try_from(encoded.len())
        .map_err(|_| HostFault::Codec(format!("string of {} bytes is too long", encoded.len())))?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(&encoded);
    Ok(())
}

fn write_len(out: &mut Vec<u8>, len: usize) -> Result<(), HostFault> {
    let len =
        i32::try_from(len).map_err(|_| HostFault::Codec(format!("length {} too large", len)))?;
    out.extend_from_slice(&len.to_be_bytes());
    Ok(())
}

fn write_payload(out: &mut Vec<u8>, tag: &RawTag, depth: usize) -> Result<(), HostFault> {
    if depth > MAX_DEPTH {
        return Err(HostFault::Codec(format!(
            "tag nesting deeper than {}",
            MAX_DEPTH
        )));
    }
    match tag {
        RawTag::End => {}
        RawTag::Byte(v) => out.push(*v as u8),
        RawTag::Short(v) => out.extend_from_slice(&v.to_be_bytes()),
        RawTag::Int(v) => out.extend_from_slice(&v.to_be_bytes()),
        RawTag::Long(v) => out.extend_from_slice(&v.to_be_bytes()),
        RawTag::Float(v) => out.extend_from_slice(&v.to_be_bytes()),
        RawTag::Double(v) => out.extend_from_slice(&v.to_be_bytes()),
        RawTag::ByteArray(bytes) => {
            write_len(out, bytes.len())?;
            out.extend_from_slice(bytes);
        }
        RawTag::String(s) => write_string(out, s)?,
        RawTag::List { element, items } => {
            let element = if items.is_empty() {
                TagKind::End
            } else {
                *element
            };
            out.push(element.id());
            write_len(out, items.len())?;
            for item in items {
                write_payload(out, item, depth + 1)?;
            }
        }
        RawTag::Compound(map) => {
            for (key, value) in map {
                out.push(value.kind().id());
                write_string(out, key)?;
                write_payload(out, value, depth + 1)?;
            }
            out.push(TagKind::End.id());
        }
        RawTag::IntArray(values) => {
            write_len(out, values.len())?;
            for v in values {
                out.extend_from_slice(&v.to_be_bytes());
            }
        }
        RawTag::LongArray(values) => {
            write_len(out, values.len())?;
            for v in values {
                out.extend_from_slice(&v.to_be_bytes());
            }
        }
    }
    Ok(())
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], HostFault> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| HostFault::Codec("unexpected end of stream".to_string()))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], HostFault> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    fn u8(&mut self) -> Result<u8, HostFault> {
        Ok(self.take(1)?[0])
    }

    fn len(&mut self) -> Result<usize, HostFault> {
        let len = i32::from_be_bytes(self.array()?);
        usize::try_from(len).map_err(|_| HostFault::Codec(format!("negative length {}", len)))
    }

    fn string(&mut self) -> Result<String, HostFault> {
        let len = u16::from_be_bytes(self.array()?) as usize;
        decode_modified_utf8(self.take(len)?)
    }

    fn payload(&mut self, kind: TagKind, depth: usize) -> Result<RawTag, HostFault> {
        if depth > MAX_DEPTH {
            return Err(HostFault::Codec(format!(
                "tag nesting deeper than {}",
                MAX_DEPTH
            )));
        }
        Ok(match kind {
            TagKind::End => RawTag::End,
            TagKind::Byte => RawTag::Byte(self.u8()? as i8),
            TagKind::Short => RawTag::Short(i16::from_be_bytes(self.array()?)),
            TagKind::Int => RawTag::Int(i32::from_be_bytes(self.array()?)),
            TagKind::Long => RawTag::Long(i64::from_be_bytes(self.array()?)),
            TagKind::Float => RawTag::Float(f32::from_be_bytes(self.array()?)),
            TagKind::Double => RawTag::Double(f64::from_be_bytes(self.array()?)),
            TagKind::ByteArray => {
                let len = self.len()?;
                RawTag::ByteArray(self.take(len)?.to_vec())
            }
            TagKind::String => RawTag::String(self.string()?),
            TagKind::List => {
                let element = self.kind()?;
                let len = self.len()?;
                if element == TagKind::End && len > 0 {
                    return Err(HostFault::Codec(
                        "list of end tags with non-zero length".to_string(),
                    ));
                }
                let mut items = Vec::with_capacity(len.min(4096));
                for _ in 0..len {
                    items.push(self.payload(element, depth + 1)?);
                }
                RawTag::List { element, items }
            }
            TagKind::Compound => {
                let mut map = BTreeMap::new();
                loop {
                    let child = self.kind()?;
                    if child == TagKind::End {
                        break;
                    }
                    let key = self.string()?;
                    let value = self.payload(child, depth + 1)?;
                    map.insert(key, value);
                }
                RawTag::Compound(map)
            }
            TagKind::IntArray => {
                let len = self.len()?;
                let mut values = Vec::with_capacity(len.min(4096));
                for _ in 0..len {
                    values.push(i32::from_be_bytes(self.array()?));
                }
                RawTag::IntArray(values)
            }
            TagKind::LongArray => {
                let len = self.len()?;
                let mut values = Vec::with_capacity(len.min(4096));
                for _ in 0..len {
                    values.push(i64::from_be_bytes(self.array()?));
                }
                RawTag::LongArray(values)
            }
        })
    }

    fn kind(&mut self) -> Result<TagKind, HostFault> {
        let id = self.u8()?;
        TagKind::from_id(id).ok_or_else(|| HostFault::Codec(format!("unknown tag type id {}", id)))
    }
}

fn encode_modified_utf8(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for unit in s.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | ((unit >> 6) & 0x1F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | ((unit >> 12) & 0x0F) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out
}

fn decode_modified_utf8(bytes: &[u8]) -> Result<String, HostFault> {
    let malformed = || HostFault::Codec("malformed modified UTF-8".to_string());
    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 {
            units.push(b as u16);
            i += 1;
        } else if b & 0xE0 == 0xC0 {
            let b2 = *bytes.get(i + 1).ok_or_else(malformed)?;
            units.push((((b & 0x1F) as u16) << 6) | (b2 & 0x3F) as u16);
            i += 2;
        } else if b & 0xF0 == 0xE0 {
            let b2 = *bytes.get(i + 1).ok_or_else(malformed)?;
            let b3 = *bytes.get(i + 2).ok_or_else(malformed)?;
            units.push(
                (((b & 0x0F) as u16) << 12) | (((b2 & 0x3F) as u16) << 6) | (b3 & 0x3F) as u16,
            );
            i += 3;
        } else {
            return Err(malformed());
        }
    }
    String::from_utf16(&units).map_err(|_| malformed())
}
