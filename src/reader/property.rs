use super::{WzReader, MAX_DEPTH};
use crate::{
    buffer::WzBuffer,
    error::{Result, TagKind, WzError},
    property::{
        WzCanvasProperty, WzConvexProperty, WzListProperty, WzProperty,
        WzSoundProperty, WzUolProperty, WzValue, WzVectorProperty,
    },
};
use bytes::Bytes;

/// Media type GUIDs that precede the wave format block of a sound
const SOUND_HEADER_SIZE: usize = 51;

impl<'a> WzReader<'a> {
    pub(super) fn read_property(
        &mut self,
        image_offset: usize,
        buffer: &mut WzBuffer<'a>,
        depth: usize,
    ) -> Result<WzProperty> {
        if depth > MAX_DEPTH {
            return Err(WzError::structural(
                buffer.offset(),
                "property nesting too deep",
            ));
        }
        let property_type = self.read_string_block(image_offset, buffer)?;
        match property_type.as_str() {
            "Property" => {
                // reserved
                buffer.add_offset(2);
                Ok(WzProperty::List(
                    self.read_list_items(image_offset, buffer, depth)?,
                ))
            }
            "Canvas" => {
                buffer.add_offset(1);
                let properties = if buffer.read_u8()? == 1 {
                    buffer.add_offset(2);
                    self.read_list_items(image_offset, buffer, depth)?
                } else {
                    WzListProperty::new()
                };
                let width = buffer.read_compressed_int()?;
                let height = buffer.read_compressed_int()?;
                let format = buffer.read_compressed_int()?;
                let format2 = buffer.read_compressed_int()?;
                buffer.add_offset(4);
                let size_offset = buffer.offset();
                // stored size counts the byte skipped below
                let data_size = non_negative(
                    buffer.read_i32()?.saturating_sub(1),
                    size_offset,
                    "canvas data size",
                )?;
                buffer.add_offset(1);
                let data = Bytes::from(buffer.read_array(data_size)?);
                Ok(WzProperty::Canvas(WzCanvasProperty {
                    properties,
                    width,
                    height,
                    format,
                    format2,
                    data,
                }))
            }
            "Shape2D#Vector2D" => {
                let x = buffer.read_compressed_int()?;
                let y = buffer.read_compressed_int()?;
                Ok(WzProperty::Vector(WzVectorProperty { x, y }))
            }
            "Shape2D#Convex2D" => {
                let size = buffer.read_compressed_int()?;
                let properties = (0..size)
                    .map(|_| {
                        self.read_property(image_offset, buffer, depth + 1)
                    })
                    .collect::<Result<Vec<WzProperty>>>()?;
                Ok(WzProperty::Convex(WzConvexProperty { properties }))
            }
            "Sound_DX8" => {
                buffer.add_offset(1);
                let size_offset = buffer.offset();
                let data_size = non_negative(
                    buffer.read_compressed_int()?,
                    size_offset,
                    "sound data size",
                )?;
                let duration = buffer.read_compressed_int()?;
                let header_offset = buffer.offset();
                buffer.add_offset(SOUND_HEADER_SIZE);
                let format_size = buffer.read_u8()?;
                buffer.add_offset(usize::from(format_size));
                let header_size = buffer.offset() - header_offset;
                let header = Bytes::copy_from_slice(
                    buffer.slice(header_offset, header_size)?,
                );
                let data = Bytes::copy_from_slice(
                    buffer.slice(buffer.offset(), data_size)?,
                );
                buffer.add_offset(data_size);
                Ok(WzProperty::Sound(WzSoundProperty {
                    duration,
                    header,
                    data,
                }))
            }
            "UOL" => {
                buffer.add_offset(1);
                let uol = self.read_string_block(image_offset, buffer)?;
                Ok(WzProperty::Uol(WzUolProperty { uol }))
            }
            _ => Err(WzError::unknown_tag(
                TagKind::PropertyType,
                property_type,
            )),
        }
    }

    fn read_list_items(
        &mut self,
        image_offset: usize,
        buffer: &mut WzBuffer<'a>,
        depth: usize,
    ) -> Result<WzListProperty> {
        let mut items = WzListProperty::new();
        let size = buffer.read_compressed_int()?;
        for _ in 0..size {
            let item_name = self.read_string_block(image_offset, buffer)?;
            let item_type = buffer.read_u8()?;
            let value = match item_type {
                0 => WzValue::Null,
                2 | 11 => WzValue::Short(buffer.read_i16()?),
                3 | 19 => WzValue::Int(buffer.read_compressed_int()?),
                20 => WzValue::Long(buffer.read_i64()?),
                4 => match buffer.read_i8()? {
                    0x00 => WzValue::Float(0.0),
                    -128 => WzValue::Float(buffer.read_f32()?),
                    float_type => {
                        return Err(WzError::UnsupportedVariant {
                            kind: "float",
                            value: i64::from(float_type),
                        })
                    }
                },
                5 => WzValue::Double(buffer.read_f64()?),
                8 => WzValue::String(
                    self.read_string_block(image_offset, buffer)?,
                ),
                9 => {
                    let size_offset = buffer.offset();
                    let property_size = non_negative(
                        buffer.read_i32()?,
                        size_offset,
                        "property size",
                    )?;
                    let property_offset = buffer.offset();
                    let property =
                        self.read_property(image_offset, buffer, depth + 1)?;
                    // the declared size wins over what the parse consumed
                    buffer.set_offset(
                        property_offset.saturating_add(property_size),
                    );
                    WzValue::Property(property)
                }
                _ => {
                    return Err(WzError::unknown_tag(
                        TagKind::ListItem,
                        item_type,
                    ))
                }
            };
            log::trace!("Item {:?} type {}", item_name, item_type);
            items.insert(item_name, value);
        }
        Ok(items)
    }
}

fn non_negative(value: i32, offset: usize, what: &str) -> Result<usize> {
    if value < 0 {
        return Err(WzError::structural(
            offset,
            format!("negative {} {}", what, value),
        ));
    }
    Ok(value as usize)
}
