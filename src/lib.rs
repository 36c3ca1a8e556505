#![deny(
    rust_2018_idioms,
    unreachable_pub,
    unsafe_code,
    unused_imports,
    unused_mut,
    missing_debug_implementations
)]

pub mod archive;
pub mod buffer;
pub mod crypto;
pub mod error;
pub mod offset;
pub mod property;
pub mod reader;

pub use archive::{WzDirectory, WzImage, WzPackage};
pub use crypto::{IvPreset, WzCrypto};
pub use error::{Result, WzError};
pub use property::{WzListProperty, WzProperty, WzValue};
pub use reader::WzReader;

/// Decodes a whole archive held in memory.
pub fn read_package(data: &[u8], iv: &[u8], version: u32) -> Result<WzPackage> {
    WzReader::build(data, iv, version).read_package()
}
