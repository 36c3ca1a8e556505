use bytes::Bytes;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// Decoded property variants. The type name stored in the archive selects
/// the variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum WzProperty {
    List(WzListProperty),
    Canvas(WzCanvasProperty),
    Vector(WzVectorProperty),
    Convex(WzConvexProperty),
    Sound(WzSoundProperty),
    Uol(WzUolProperty),
}

impl WzProperty {
    pub fn get_name(&self) -> &str {
        match self {
            Self::List(_) => "Property",
            Self::Canvas(_) => "Canvas",
            Self::Vector(_) => "Shape2D#Vector2D",
            Self::Convex(_) => "Shape2D#Convex2D",
            Self::Sound(_) => "Sound_DX8",
            Self::Uol(_) => "UOL",
        }
    }
}

/// Value of one named item in a property list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WzValue {
    Null,
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Property(WzProperty),
}

/// Named items in the order they were first stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WzListProperty {
    items: Vec<(String, WzValue)>,
    /// Position of each name in `items`
    index: HashMap<String, usize>,
}

impl WzListProperty {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repeated name replaces the earlier value in place.
    pub fn insert(&mut self, name: String, value: WzValue) {
        match self.index.get(&name) {
            Some(&i) => self.items[i].1 = value,
            None => {
                self.index.insert(name.clone(), self.items.len());
                self.items.push((name, value));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&WzValue> {
        self.index.get(name).map(|&i| &self.items[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WzValue)> {
        self.items.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Serialize for WzListProperty {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.items.iter().map(|(n, v)| (n, v)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WzCanvasProperty {
    pub properties: WzListProperty,
    pub width: i32,
    pub height: i32,
    pub format: i32,
    pub format2: i32,
    /// Compressed pixel data, as stored
    #[serde(serialize_with = "serialize_len")]
    pub data: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WzVectorProperty {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WzConvexProperty {
    pub properties: Vec<WzProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WzSoundProperty {
    pub duration: i32,
    /// Media type header followed by the wave format block
    #[serde(serialize_with = "serialize_len")]
    pub header: Bytes,
    #[serde(serialize_with = "serialize_len")]
    pub data: Bytes,
}

/// Path alias to another node, left unresolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WzUolProperty {
    pub uol: String,
}

fn serialize_len<S: Serializer>(
    data: &Bytes,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(data.len() as u64)
}
