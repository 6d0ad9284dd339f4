use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// One image handed to the pipeline: its filename within the property plus
/// the encoded payload sent to the classifier.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub filename: String,
    pub data_url: String,
}

/// List supported image files in a property folder, sorted by filename so
/// re-runs see the same input order.
pub fn list_image_files(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.exists() {
        bail!("image folder not found: {}", folder.display());
    }
    if !folder.is_dir() {
        bail!("expected directory for images: {}", folder.display());
    }

    let mut images = Vec::new();
    for entry in std::fs::read_dir(folder)
        .with_context(|| format!("failed to read image folder {}", folder.display()))?
    {
        let path = entry?.path();
        if path.is_file() && has_supported_extension(&path) {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

pub fn encode_image_to_data_url(path: &Path) -> Result<String> {
    let mime = match extension_of(path).as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    };
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read image {}", path.display()))?;
    Ok(format!("data:{mime};base64,{}", BASE64.encode(bytes)))
}

/// Load every supported image in `folder` as a pipeline input.
pub fn load_images_from_folder(folder: &Path) -> Result<Vec<ImageInput>> {
    let mut inputs = Vec::new();
    for path in list_image_files(folder)? {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("image path has no valid filename: {}", path.display()))?
            .to_string();
        inputs.push(ImageInput {
            filename,
            data_url: encode_image_to_data_url(&path)?,
        });
    }
    Ok(inputs)
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

fn has_supported_extension(path: &Path) -> bool {
    extension_of(path)
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}
