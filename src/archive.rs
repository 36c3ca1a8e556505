use crate::property::WzListProperty;
use serde::Serialize;
use std::collections::HashMap;

/// Root of a decoded archive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WzPackage {
    /// Offset of the root directory, anchor for every encoded offset
    pub start: u32,
    pub hash: u32,
    /// Size declared in the header, not used for traversal
    pub size: u64,
    pub directory: WzDirectory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WzDirectory {
    pub directories: HashMap<String, WzDirectory>,
    pub images: HashMap<String, WzImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WzImage {
    /// Absolute offset of the serialized property list
    pub offset: usize,
    pub property: WzListProperty,
}

impl WzDirectory {
    pub fn find_dir(&self, dir_names: &[String]) -> Option<&WzDirectory> {
        if dir_names.is_empty() {
            Some(self)
        } else {
            self.directories
                .get(&dir_names[0])?
                .find_dir(&dir_names[1..])
        }
    }

    /// Looks up an image by slash separated path, e.g. `"Mob/0100100.img"`.
    pub fn get_image(&self, path: &str) -> Option<&WzImage> {
        let mut parts = path
            .split('/')
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect::<Vec<String>>();
        let image_name = parts.pop()?;
        self.find_dir(&parts)?.images.get(&image_name)
    }

    /// All images below this directory with their slash separated paths.
    pub fn get_all_images<'a>(
        &'a self,
    ) -> Box<dyn Iterator<Item = (String, &'a WzImage)> + 'a> {
        Box::new(
            self.images
                .iter()
                .map(|(name, image)| (name.clone(), image))
                .chain(self.directories.iter().flat_map(|(dir_name, dir)| {
                    dir.get_all_images().map(move |(path, image)| {
                        (format!("{}/{}", dir_name, path), image)
                    })
                })),
        )
    }
}
