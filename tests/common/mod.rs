//! Builds small synthetic archives for the decode tests.
#![allow(dead_code)]

use wzreader::{
    offset::{offset_key, version_checksum, version_hash},
    reader::PKG1_MAGIC,
    WzCrypto,
};

const DESCRIPTION: &[u8] = b"Package file v1.0 Copyright 2002 Wizet, ZMS\0";

/// Offset of the root directory in every built archive
pub const START: usize = 16 + DESCRIPTION.len();

/// Little-endian byte writer that masks strings the way archives store them.
pub struct Writer {
    pub buf: Vec<u8>,
    crypto: WzCrypto,
}

impl Writer {
    pub fn new(iv: &[u8]) -> Self {
        Self {
            buf: Vec::new(),
            crypto: WzCrypto::from_iv(iv),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    pub fn i8(&mut self, v: i8) -> &mut Self {
        self.u8(v as u8)
    }

    pub fn i16(&mut self, v: i16) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    pub fn i64(&mut self, v: i64) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    pub fn u64(&mut self, v: u64) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    pub fn f32(&mut self, v: f32) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    pub fn f64(&mut self, v: f64) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    pub fn bytes(&mut self, v: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(v);
        self
    }

    pub fn patch_i32(&mut self, pos: usize, v: i32) {
        self.buf[pos..pos + 4].copy_from_slice(&v.to_le_bytes());
    }

    pub fn compressed(&mut self, v: i32) -> &mut Self {
        if (-127..=127).contains(&v) {
            self.i8(v as i8)
        } else {
            self.i8(-128).i32(v)
        }
    }

    pub fn string(&mut self, s: &str) -> &mut Self {
        if s.is_empty() {
            return self.u8(0);
        }
        if s.is_ascii() {
            let mut bytes = s.as_bytes().to_vec();
            if bytes.len() < 128 {
                self.i8(-(bytes.len() as i32) as i8);
            } else {
                self.i8(-128).i32(bytes.len() as i32);
            }
            self.crypto.crypt_ascii(&mut bytes);
            self.bytes(&bytes)
        } else {
            let units = s.encode_utf16().count();
            let mut bytes = s
                .encode_utf16()
                .flat_map(|unit| unit.to_le_bytes().to_vec())
                .collect::<Vec<u8>>();
            if units < 127 {
                self.u8(units as u8);
            } else {
                self.u8(127).i32(units as i32);
            }
            self.crypto.crypt_unicode(&mut bytes);
            self.bytes(&bytes)
        }
    }

    /// Inline string block as used for property type names.
    pub fn type_name(&mut self, s: &str) -> &mut Self {
        self.u8(0x73).string(s)
    }

    /// Inline string block as used for item names.
    pub fn name(&mut self, s: &str) -> &mut Self {
        self.u8(0x00).string(s)
    }

    /// String block pointing `offset` bytes past the image start.
    pub fn pooled(&mut self, offset: i32) -> &mut Self {
        self.u8(0x1B).i32(offset)
    }

    pub fn list(&mut self, count: i32) -> &mut Self {
        self.type_name("Property").u16(0).compressed(count)
    }

    /// Nested property item, its byte size patched in after `body`.
    pub fn item_property(
        &mut self,
        name: &str,
        body: impl FnOnce(&mut Self),
    ) -> &mut Self {
        self.name(name).u8(9);
        let size_pos = self.len();
        self.i32(0);
        let begin = self.len();
        body(self);
        let size = (self.len() - begin) as i32;
        self.patch_i32(size_pos, size);
        self
    }
}

pub enum Entry {
    Dir(String, Vec<Entry>),
    Image(String, Vec<u8>),
    /// Name stored out of line, relative to the package start
    Pooled(Box<Entry>),
    /// Slot skipped by readers
    Unknown,
}

pub fn dir(name: &str, children: Vec<Entry>) -> Entry {
    Entry::Dir(name.to_string(), children)
}

pub fn image(name: &str, body: Vec<u8>) -> Entry {
    Entry::Image(name.to_string(), body)
}

pub fn pooled(entry: Entry) -> Entry {
    Entry::Pooled(Box::new(entry))
}

/// Serialized image body built with a fresh writer for `iv`.
pub fn image_body(iv: &[u8], build: impl FnOnce(&mut Writer)) -> Vec<u8> {
    let mut writer = Writer::new(iv);
    build(&mut writer);
    writer.buf
}

pub struct ArchiveBuilder {
    writer: Writer,
    start: u32,
    hash: u32,
}

impl ArchiveBuilder {
    pub fn build(iv: &[u8], version: u32, root: &[Entry]) -> Vec<u8> {
        let start = START as u32;
        let hash = version_hash(version);
        let mut builder = Self {
            writer: Writer::new(iv),
            start,
            hash,
        };
        builder
            .writer
            .bytes(&PKG1_MAGIC)
            .u64(0)
            .u32(start)
            .bytes(DESCRIPTION)
            .u16(version_checksum(hash));
        builder.write_directory(root);
        let size = builder.writer.len() as u64;
        builder.writer.buf[4..12].copy_from_slice(&size.to_le_bytes());
        builder.writer.buf
    }

    fn write_offset(&mut self, pos: usize, target: usize) {
        let encrypted = offset_key(pos as u32, self.start, self.hash)
            ^ (target as u32).wrapping_sub(self.start.wrapping_mul(2));
        self.writer.buf[pos..pos + 4].copy_from_slice(&encrypted.to_le_bytes());
    }

    fn write_directory(&mut self, entries: &[Entry]) {
        self.writer.compressed(entries.len() as i32);
        let mut children = Vec::new();
        let mut pool = Vec::new();
        for entry in entries {
            let (entry, is_pooled) = match entry {
                Entry::Pooled(inner) => (inner.as_ref(), true),
                entry => (entry, false),
            };
            let (kind, name) = match entry {
                Entry::Dir(name, _) => (3u8, name),
                Entry::Image(name, _) => (4u8, name),
                Entry::Unknown => {
                    self.writer
                        .u8(1)
                        .bytes(&[0x12, 0, 0, 0])
                        .u16(0)
                        .u32(0xDEAD_BEEF);
                    continue;
                }
                Entry::Pooled(_) => panic!("nested pooled entry"),
            };
            if is_pooled {
                self.writer.u8(2);
                pool.push((self.writer.len(), kind, name.clone()));
                self.writer.i32(0);
            } else {
                self.writer.u8(kind).string(name);
            }
            self.writer.compressed(100).compressed(0x1234);
            children.push((self.writer.len(), entry));
            self.writer.u32(0);
        }
        for (field_pos, entry) in children {
            let target = self.writer.len();
            match entry {
                Entry::Dir(_, nested) => self.write_directory(nested),
                Entry::Image(_, body) => {
                    self.writer.bytes(body);
                }
                _ => unreachable!(),
            }
            self.write_offset(field_pos, target);
        }
        for (field_pos, kind, name) in pool {
            let pos = self.writer.len();
            self.writer.u8(kind).string(&name);
            let relative = (pos - self.start as usize) as i32;
            self.writer.patch_i32(field_pos, relative);
        }
    }
}
