//! Decoding of the package header and the directory tree.

use crate::{
    archive::{WzDirectory, WzImage, WzPackage},
    buffer::WzBuffer,
    crypto::WzCrypto,
    error::{Result, TagKind, WzError},
    offset::{read_offset, version_checksum, version_hash},
    property::WzProperty,
};
use scroll::{Pread, LE};

mod property;
mod string;

/// "PKG1"
pub const PKG1_MAGIC: [u8; 4] = [0x50, 0x4B, 0x47, 0x31];

/// Deepest directory or property nesting accepted. Must fit the default
/// 2 MB thread stack in unoptimized builds.
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Pread, Copy, Clone)]
struct PackageHeader {
    magic: [u8; 4],
    size: u64,
    start: u32,
}

/// Values every encoded offset in a package is decoded against.
#[derive(Debug, Clone, Copy)]
struct OffsetContext {
    start: u32,
    hash: u32,
}

/// One decode session over an archive held in memory.
///
/// The reader owns the string keystream, so decoding the same archive
/// again reuses what was already generated.
#[derive(Debug)]
pub struct WzReader<'a> {
    data: &'a [u8],
    crypto: WzCrypto,
    version: u32,
}

impl<'a> WzReader<'a> {
    pub fn new(data: &'a [u8], crypto: WzCrypto, version: u32) -> Self {
        Self {
            data,
            crypto,
            version,
        }
    }

    pub fn build(data: &'a [u8], iv: &[u8], version: u32) -> Self {
        Self::new(data, WzCrypto::from_iv(iv), version)
    }

    pub fn get_buffer(&self, offset: usize) -> WzBuffer<'a> {
        WzBuffer::with_offset(self.data, offset)
    }

    pub fn crypto(&self) -> &WzCrypto {
        &self.crypto
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn read_package(&mut self) -> Result<WzPackage> {
        let header = self
            .data
            .pread_with::<PackageHeader>(0, LE)
            .map_err(|_| WzError::OutOfBounds {
                offset: 0,
                size: 16,
                len: self.data.len(),
            })?;
        log::debug!("Header: {:X?}", header);
        if header.magic != PKG1_MAGIC {
            return Err(WzError::MalformedHeader {
                expected: PKG1_MAGIC,
                found: header.magic,
            });
        }

        let mut buffer = self.get_buffer(header.start as usize);
        let version_header = buffer.read_u16()?;
        let hash = version_hash(self.version);
        let computed_header = version_checksum(hash);
        log::debug!(
            "Version {} hash {:#X} checksum {:#X}",
            self.version,
            hash,
            computed_header
        );
        if version_header != computed_header {
            return Err(WzError::VersionMismatch {
                version: self.version,
                expected: computed_header,
                found: version_header,
            });
        }

        let context = OffsetContext {
            start: header.start,
            hash,
        };
        let directory = self.read_directory(context, &mut buffer, 0)?;
        Ok(WzPackage {
            start: header.start,
            hash,
            size: header.size,
            directory,
        })
    }

    fn read_directory(
        &mut self,
        context: OffsetContext,
        buffer: &mut WzBuffer<'a>,
        depth: usize,
    ) -> Result<WzDirectory> {
        if depth > MAX_DEPTH {
            return Err(WzError::structural(
                buffer.offset(),
                "directory nesting too deep",
            ));
        }
        let mut directory = WzDirectory::default();
        let size = buffer.read_compressed_int()?;
        for _ in 0..size {
            let mut child_type = buffer.read_u8()?;
            let child_name = match child_type {
                1 => {
                    // 01 XX 00 00 00 00 00 OFFSET
                    buffer.add_offset(4 + 2);
                    read_offset(buffer, context.start, context.hash)?;
                    continue;
                }
                2 => {
                    let string_offset = buffer.read_i32()?;
                    let original_offset = buffer.offset();
                    buffer.seek_relative(context.start as usize, string_offset);
                    child_type = buffer.read_u8()?;
                    let name = self.read_string(buffer)?;
                    buffer.set_offset(original_offset);
                    name
                }
                3 | 4 => self.read_string(buffer)?,
                _ => {
                    return Err(WzError::unknown_tag(
                        TagKind::DirectoryEntry,
                        child_type,
                    ))
                }
            };
            // neither is checked against the child's contents
            let child_size = buffer.read_compressed_int()?;
            let child_checksum = buffer.read_compressed_int()?;
            let child_offset =
                read_offset(buffer, context.start, context.hash)?;
            log::trace!(
                "Entry {:?} type {} size {} checksum {:#X} offset {:#X}",
                child_name,
                child_type,
                child_size,
                child_checksum,
                child_offset
            );

            let original_offset = buffer.offset();
            buffer.set_offset(child_offset);
            match child_type {
                3 => {
                    let child =
                        self.read_directory(context, buffer, depth + 1)?;
                    directory.directories.insert(child_name, child);
                }
                4 => {
                    let image = self.read_image(child_offset, buffer)?;
                    directory.images.insert(child_name, image);
                }
                _ => {
                    return Err(WzError::unknown_tag(
                        TagKind::DirectoryEntry,
                        child_type,
                    ))
                }
            }
            buffer.set_offset(original_offset);
        }
        Ok(directory)
    }

    fn read_image(
        &mut self,
        offset: usize,
        buffer: &mut WzBuffer<'a>,
    ) -> Result<WzImage> {
        log::debug!("Reading image at {:#X}", offset);
        match self.read_property(offset, buffer, 0)? {
            WzProperty::List(property) => Ok(WzImage { offset, property }),
            other => Err(WzError::structural(
                offset,
                format!("image property is {}, not a list", other.get_name()),
            )),
        }
    }
}
