//! Art slots: images read from disk for the imagery panel.
//!
//! A slot whose file is missing or has an unknown extension is simply
//! unavailable; the layout leaves it out.

use std::path::Path;

use tracing::warn;

use crate::config::ArtSlotConfig;
use crate::model::{ArtSlot, ImageData};

/// Load every configured slot. Never fails.
pub async fn load_slots(slots: &[ArtSlotConfig]) -> Vec<ArtSlot> {
    let mut loaded = Vec::with_capacity(slots.len());
    for slot in slots {
        let image = match load_image(&slot.path).await {
            Ok(image) => image,
            Err(e) => {
                warn!(
                    target: "art",
                    slot = %slot.name,
                    path = %slot.path.display(),
                    "art unavailable: {e:#}"
                );
                None
            }
        };
        loaded.push(ArtSlot {
            name: slot.name.clone(),
            image,
        });
    }
    loaded
}

async fn load_image(path: &Path) -> anyhow::Result<Option<ImageData>> {
    let Some(mime) = mime_for(path) else {
        anyhow::bail!("unsupported image type");
    };
    if !tokio::fs::try_exists(path).await? {
        return Ok(None);
    }
    let bytes = tokio::fs::read(path).await?;
    Ok(Some(ImageData { mime, bytes }))
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_by_extension() {
        assert_eq!(mime_for(Path::new("a.PNG")), Some("image/png"));
        assert_eq!(mime_for(Path::new("a.jpeg")), Some("image/jpeg"));
        assert_eq!(mime_for(Path::new("a.svg")), Some("image/svg+xml"));
        assert_eq!(mime_for(Path::new("a.gif")), None);
        assert_eq!(mime_for(Path::new("noext")), None);
    }

    #[tokio::test]
    async fn missing_and_present_files() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("left.png");
        std::fs::write(&present, [0x89, b'P', b'N', b'G']).unwrap();

        let slots = vec![
            ArtSlotConfig {
                name: "left".into(),
                path: present,
            },
            ArtSlotConfig {
                name: "right".into(),
                path: dir.path().join("right.png"),
            },
            ArtSlotConfig {
                name: "odd".into(),
                path: dir.path().join("odd.bmp"),
            },
        ];
        let loaded = load_slots(&slots).await;
        assert_eq!(loaded.len(), 3);
        assert!(loaded[0].is_available());
        assert_eq!(loaded[0].image.as_ref().unwrap().mime, "image/png");
        assert!(!loaded[1].is_available());
        assert!(!loaded[2].is_available());
    }
}
