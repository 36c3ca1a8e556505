use super::WzReader;
use crate::{
    buffer::WzBuffer,
    error::{Result, TagKind, WzError},
};
use encoding_rs::{UTF_16LE, WINDOWS_1252};

impl<'a> WzReader<'a> {
    /// Reads a length prefixed, masked string stored inline.
    pub fn read_string(&mut self, buffer: &mut WzBuffer<'a>) -> Result<String> {
        let offset = buffer.offset();
        let length = buffer.read_i8()?;
        if length < 0 {
            let length = match length {
                -128 => long_length(buffer, offset)?,
                _ => usize::from(length.unsigned_abs()),
            };
            let mut array = buffer.read_array(length)?;
            self.crypto.crypt_ascii(&mut array);
            Ok(WINDOWS_1252
                .decode_without_bom_handling(&array)
                .0
                .into_owned())
        } else if length > 0 {
            let length = match length {
                127 => long_length(buffer, offset)?,
                _ => length as usize,
            };
            let mut array = buffer.read_array(length.saturating_mul(2))?;
            self.crypto.crypt_unicode(&mut array);
            Ok(UTF_16LE.decode_without_bom_handling(&array).0.into_owned())
        } else {
            Ok(String::new())
        }
    }

    /// Reads a string that is either inline or stored elsewhere in the
    /// image starting at `image_offset`.
    pub fn read_string_block(
        &mut self,
        image_offset: usize,
        buffer: &mut WzBuffer<'a>,
    ) -> Result<String> {
        let string_type = buffer.read_u8()?;
        match string_type {
            0x00 | 0x73 => self.read_string(buffer),
            0x01 | 0x1B => {
                let string_offset = buffer.read_i32()?;
                let original_offset = buffer.offset();
                buffer.seek_relative(image_offset, string_offset);
                let string = self.read_string(buffer)?;
                buffer.set_offset(original_offset);
                Ok(string)
            }
            _ => Err(WzError::unknown_tag(
                TagKind::StringBlock,
                format!("{:#04X}", string_type),
            )),
        }
    }
}

fn long_length(buffer: &mut WzBuffer<'_>, offset: usize) -> Result<usize> {
    let length = buffer.read_i32()?;
    if length < 0 {
        return Err(WzError::structural(
            offset,
            format!("negative string length {}", length),
        ));
    }
    Ok(length as usize)
}
