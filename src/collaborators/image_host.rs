use std::{fs, path::Path};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::info;
use serde::Deserialize;

use crate::errors::{Error, Result};

#[derive(Debug, Clone)]
pub struct ImageFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn from_path(path: &Path) -> Result<ImageFile> {
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| Error::validation("image path has no file name"))?;
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let mime_type = match extension.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "svg" => "image/svg+xml",
            _ => "application/octet-stream",
        };
        Ok(ImageFile {
            name,
            mime_type: mime_type.to_string(),
            bytes,
        })
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Where an uploaded image can be fetched from. Only `url` ends up in the record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageUpload {
    pub url: String,
}

pub trait ImageHost {
    fn upload(&self, file: &ImageFile) -> Result<ImageUpload>;
}

/// Embeds the image itself as a `data:` URL. Used when no hosting service is configured.
pub struct DataUrlImageHost;

impl ImageHost for DataUrlImageHost {
    fn upload(&self, file: &ImageFile) -> Result<ImageUpload> {
        if !file.is_image() {
            return Err(Error::validation(format!("{} is not an image", file.name)));
        }
        info!(file = file.name.as_str(), size = file.bytes.len(); "Embedding image as data URL");
        Ok(ImageUpload {
            url: format!("data:{};base64,{}", file.mime_type, STANDARD.encode(&file.bytes)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn data_url_encodes_bytes() {
        let file = ImageFile {
            name: "dot.png".to_string(),
            mime_type: "image/png".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        };
        let upload = DataUrlImageHost.upload(&file).unwrap();
        assert_eq!(upload.url, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn non_images_are_refused() {
        let file = ImageFile {
            name: "notes.txt".to_string(),
            mime_type: "application/octet-stream".to_string(),
            bytes: b"hello".to_vec(),
        };
        assert!(DataUrlImageHost.upload(&file).is_err());
    }

    #[test]
    fn mime_type_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Front.JPG");
        fs::File::create(&path).unwrap().write_all(b"jpeg").unwrap();
        let file = ImageFile::from_path(&path).unwrap();
        assert_eq!(file.name, "Front.JPG");
        assert_eq!(file.mime_type, "image/jpeg");
        assert_eq!(file.bytes, b"jpeg");
    }
}
