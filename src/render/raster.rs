//! SVG -> 8-bit grayscale PNG.

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use resvg::tiny_skia;
use tracing::debug;

/// Holds the font database so it is built once per process.
#[derive(Clone)]
pub struct Rasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl Rasterizer {
    /// System fonts plus any `.ttf`/`.otf`/`.ttc` in `fonts_dir`. When
    /// `family` is set it becomes the generic sans-serif family.
    pub fn new(fonts_dir: Option<&Path>, family: Option<&str>) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        if let Some(dir) = fonts_dir {
            load_fonts_from_dir(&mut db, dir);
        }
        if let Some(family) = family {
            db.set_sans_serif_family(family);
        }
        debug!(target: "render", faces = db.len(), "font database ready");
        Self {
            fontdb: Arc::new(db),
        }
    }

    /// Rasterize SVG markup onto a white background and encode it as PNG.
    pub fn render_png(&self, svg: &str) -> Result<Vec<u8>> {
        let opts = usvg::Options {
            fontdb: self.fontdb.clone(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(svg, &opts).context("parse svg")?;

        let size = tree.size().to_int_size();
        let (width, height) = (size.width(), size.height());
        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| anyhow!("failed to allocate {width}x{height} pixmap"))?;
        pixmap.fill(tiny_skia::Color::WHITE);
        resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

        // Opaque background, so premultiplied RGBA equals straight RGBA.
        let rgba = image::RgbaImage::from_raw(width, height, pixmap.take())
            .ok_or_else(|| anyhow!("pixmap buffer size mismatch"))?;
        let gray = image::DynamicImage::ImageRgba8(rgba).into_luma8();

        let mut buf = Vec::new();
        image::DynamicImage::ImageLuma8(gray)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .context("encode png")?;
        Ok(buf)
    }
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            debug!(target: "render", path = %path.display(), "skipping font: {e}");
        }
    }
}
