// Copyright (c) 2026 0xAditya

//! Snapshot of the About panel written out as one paged PDF document.
//!
//! The card is rasterized once and embedded as a single image; every page
//! shows that image shifted up by one page height.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use image::{Rgb as Pixel, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use thiserror::Error;

use crate::canvas::{Canvas, Texel, WIDE_TAIL};
use crate::palette::Rgb;
use crate::runtime::{Rect, CELL_H, CELL_W};

pub const EXPORT_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_SCALE: u32 = 2;
pub const DEFAULT_NAME: &str = "AdityaKumarTiwari_Resume";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export region is not on screen")]
    RegionNotFound,
    #[error("captured region is empty")]
    EmptyCapture,
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("pdf assembly failed: {0}")]
    Pdf(#[from] lopdf::Error),
}

#[derive(Clone, Debug)]
pub struct ExportOptions {
    pub dir: PathBuf,
    pub name: String,
    /// Rows of cells per page; the whole capture when `None`.
    pub page_rows: Option<u16>,
    pub scale: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            name: DEFAULT_NAME.to_string(),
            page_rows: None,
            scale: DEFAULT_SCALE,
        }
    }
}

/// Cells copied out of the composed frame.
#[derive(Clone, Debug)]
pub struct Capture {
    pub cols: u16,
    pub rows: u16,
    pub texels: Vec<Texel>,
}

pub fn capture(canvas: &Canvas, region: Option<Rect>) -> Result<Capture, ExportError> {
    let region = region.ok_or(ExportError::RegionNotFound)?;
    let clipped = region.clip(canvas.width, canvas.height);
    if clipped.is_empty() {
        return Err(ExportError::EmptyCapture);
    }
    let texels = canvas.region(clipped).ok_or(ExportError::RegionNotFound)?;
    if texels.is_empty() {
        return Err(ExportError::EmptyCapture);
    }
    Ok(Capture {
        cols: clipped.w,
        rows: clipped.h,
        texels,
    })
}

/// Rough share of a cell covered by a glyph.
fn ink(ch: char) -> f32 {
    match ch {
        ' ' | WIDE_TAIL => 0.0,
        '█' | '●' => 1.0,
        '▌' => 0.5,
        '·' | '.' | ',' | '\'' | '`' => 0.15,
        '•' | ':' | ';' | '-' | '_' | '~' => 0.3,
        '─' | '│' | '╭' | '╮' | '╰' | '╯' | '┃' => 0.4,
        c if c.is_ascii_uppercase() || c.is_ascii_digit() => 0.55,
        c if c.is_ascii_alphabetic() => 0.45,
        _ => 0.5,
    }
}

fn blend(fg: Rgb, bg: Rgb, a: f32) -> Pixel<u8> {
    let c = fg.over(bg, a);
    Pixel([c.0, c.1, c.2])
}

/// Paints one cell into a `bw x bh` block.
fn paint_cell(img: &mut RgbImage, t: &Texel, x0: u32, y0: u32, bw: u32, bh: u32) {
    let bg = Pixel([t.bg.0, t.bg.1, t.bg.2]);
    for y in 0..bh {
        for x in 0..bw {
            img.put_pixel(x0 + x, y0 + y, bg);
        }
    }

    let code = t.ch as u32;
    if (0x2801..=0x28FF).contains(&code) {
        // Braille: one square dot per set bit on a 2x4 grid.
        let bits = (code - 0x2800) as u8;
        let layout = [(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2), (0, 3), (1, 3)];
        let (dw, dh) = (bw / 2, bh / 4);
        for (i, (dx, dy)) in layout.iter().enumerate() {
            if bits & (1 << i) == 0 {
                continue;
            }
            for y in dh / 4..dh - dh / 4 {
                for x in dw / 4..dw - dw / 4 {
                    img.put_pixel(x0 + dx * dw + x, y0 + dy * dh + y, blend(t.fg, t.bg, 1.0));
                }
            }
        }
        return;
    }

    let weight = ink(t.ch);
    if weight <= 0.0 {
        return;
    }
    let (mx, my) = (bw / 8, bh / 5);
    let px = blend(t.fg, t.bg, weight);
    for y in my..bh - my {
        for x in mx..bw - mx {
            img.put_pixel(x0 + x, y0 + y, px);
        }
    }
}

pub fn rasterize(cap: &Capture, scale: u32) -> RgbImage {
    let scale = scale.max(1);
    let bw = CELL_W as u32 * scale;
    let bh = CELL_H as u32 * scale;
    let mut img = RgbImage::new(cap.cols as u32 * bw, cap.rows as u32 * bh);
    for (i, t) in cap.texels.iter().enumerate() {
        let cx = (i % cap.cols as usize) as u32;
        let cy = (i / cap.cols as usize) as u32;
        paint_cell(&mut img, t, cx * bw, cy * bh, bw, bh);
    }
    img
}

/// Vertical offsets at which the full image is placed on successive pages.
pub fn page_offsets(image_height: u32, page_height: u32) -> Vec<i64> {
    let mut offsets = vec![0];
    if page_height == 0 {
        return offsets;
    }
    let (ih, ph) = (image_height as i64, page_height as i64);
    let mut remaining = ih - ph;
    while remaining > 0 {
        offsets.push(remaining - ih);
        remaining -= ph;
    }
    offsets
}

pub fn document_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.pdf", name))
}

/// Builds the paged document: one image object, one page per offset.
pub fn build_document(img: &RgbImage, page_h: u32) -> Result<Document, ExportError> {
    let (iw, ih) = (img.width() as i64, img.height() as i64);
    let ph = page_h as i64;
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => iw,
            "Height" => ih,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        img.as_raw().clone(),
    ));

    let mut kids: Vec<Object> = Vec::new();
    for offset in page_offsets(img.height(), page_h) {
        // PDF space grows upward; place the image top `offset` pixels below the page top.
        let bottom = ph - (offset + ih);
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![iw.into(), 0.into(), 0.into(), ih.into(), 0.into(), bottom.into()],
                ),
                Operation::new("Do", vec!["Im0".into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), iw.into(), ph.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();
    Ok(doc)
}

/// Rasterizes the capture and writes `<name>.pdf`. Returns the file written.
///
/// The document is saved under a `.part` name and renamed into place, so a
/// failed or interrupted job never leaves a truncated `.pdf` behind.
pub fn export(cap: &Capture, opts: &ExportOptions) -> Result<PathBuf, ExportError> {
    if cap.texels.is_empty() || cap.cols == 0 || cap.rows == 0 {
        return Err(ExportError::EmptyCapture);
    }
    let img = rasterize(cap, opts.scale);
    let page_h = match opts.page_rows {
        Some(rows) if rows > 0 => (rows as f32 * CELL_H) as u32 * opts.scale.max(1),
        _ => img.height(),
    };
    let mut doc = build_document(&img, page_h)?;
    fs::create_dir_all(&opts.dir)?;

    let path = document_path(&opts.dir, &opts.name);
    let part = path.with_extension("pdf.part");
    let saved = doc
        .save(&part)
        .map_err(ExportError::from)
        .and_then(|_| fs::rename(&part, &path).map_err(ExportError::from));
    if let Err(e) = saved {
        let _ = fs::remove_file(&part);
        return Err(e);
    }
    tracing::debug!(path = %path.display(), pages = doc.get_pages().len(), "wrote export");
    Ok(path)
}

/// Writes the capture on a worker thread; failures only reach the log.
pub fn spawn_export(cap: Capture, opts: ExportOptions) -> Option<JoinHandle<()>> {
    let spawned = thread::Builder::new()
        .name("export".to_string())
        .spawn(move || match export(&cap, &opts) {
            Ok(path) => tracing::info!(path = %path.display(), "export finished"),
            Err(e) => tracing::error!("export failed: {}", e),
        });
    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::error!("export failed: {}", e);
            None
        }
    }
}

/// A one-shot delayed export request.
#[derive(Debug, Default)]
pub struct ExportSchedule {
    due: Option<Instant>,
}

impl ExportSchedule {
    /// Returns false when an export is already pending.
    pub fn request(&mut self, now: Instant) -> bool {
        if self.due.is_some() {
            return false;
        }
        self.due = Some(now + EXPORT_DELAY);
        true
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    /// True exactly once, on the first call at or after the deadline.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{BLACK, NEON_GREEN, PANEL_BG};

    #[test]
    fn single_page_when_image_fits() {
        assert_eq!(page_offsets(100, 100), vec![0]);
        assert_eq!(page_offsets(80, 100), vec![0]);
    }

    #[test]
    fn offsets_walk_down_the_image() {
        assert_eq!(page_offsets(100, 40), vec![0, -40, -80]);
        assert_eq!(page_offsets(120, 40), vec![0, -40, -80]);
        assert_eq!(page_offsets(10, 0), vec![0]);
    }

    #[test]
    fn capture_requires_a_region() {
        let canvas = Canvas::new(10, 5, BLACK);
        assert!(matches!(capture(&canvas, None), Err(ExportError::RegionNotFound)));
        assert!(matches!(
            capture(&canvas, Some(Rect::new(20, 20, 4, 4))),
            Err(ExportError::EmptyCapture)
        ));
        let cap = capture(&canvas, Some(Rect::new(8, 3, 5, 5))).unwrap();
        assert_eq!((cap.cols, cap.rows), (2, 2));
    }

    #[test]
    fn rasterize_fills_cell_blocks() {
        let mut canvas = Canvas::new(2, 1, PANEL_BG);
        canvas.put(1, 0, '█', NEON_GREEN, false);
        let cap = capture(&canvas, Some(canvas.bounds())).unwrap();
        let img = rasterize(&cap, 1);
        assert_eq!(img.dimensions(), (16, 16));
        assert_eq!(img.get_pixel(0, 0), &Pixel([PANEL_BG.0, PANEL_BG.1, PANEL_BG.2]));
        assert_eq!(img.get_pixel(12, 8), &Pixel([NEON_GREEN.0, NEON_GREEN.1, NEON_GREEN.2]));
    }

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("termfolio-{}-{}", tag, std::process::id()))
    }

    #[test]
    fn export_writes_one_paged_document() {
        let dir = temp_dir("export");
        let canvas = Canvas::new(20, 30, PANEL_BG);
        let cap = capture(&canvas, Some(canvas.bounds())).unwrap();
        let opts = ExportOptions {
            dir: dir.clone(),
            name: "resume".to_string(),
            page_rows: Some(10),
            scale: 1,
        };
        let path = export(&cap, &opts).unwrap();
        assert_eq!(path, dir.join("resume.pdf"));

        let files: Vec<_> = std::fs::read_dir(&dir).unwrap().map(|e| e.unwrap().file_name()).collect();
        assert_eq!(files, vec![std::ffi::OsString::from("resume.pdf")]);

        let doc = Document::load(&path).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn single_page_without_page_rows() {
        let canvas = Canvas::new(6, 4, PANEL_BG);
        let cap = capture(&canvas, Some(canvas.bounds())).unwrap();
        let img = rasterize(&cap, 1);
        let doc = build_document(&img, img.height()).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn failed_save_leaves_no_file() {
        let dir = temp_dir("export-fail");
        std::fs::create_dir_all(&dir).unwrap();
        // A directory squatting on the partial file name makes the save fail.
        std::fs::create_dir_all(dir.join("resume.pdf.part")).unwrap();
        let canvas = Canvas::new(4, 4, PANEL_BG);
        let cap = capture(&canvas, Some(canvas.bounds())).unwrap();
        let opts = ExportOptions {
            dir: dir.clone(),
            name: "resume".to_string(),
            page_rows: None,
            scale: 1,
        };
        assert!(export(&cap, &opts).is_err());
        assert!(!dir.join("resume.pdf").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn schedule_fires_once_after_delay() {
        let t0 = Instant::now();
        let mut s = ExportSchedule::default();
        assert!(s.request(t0));
        assert!(!s.request(t0));
        assert!(!s.take_due(t0 + Duration::from_millis(499)));
        assert!(s.take_due(t0 + EXPORT_DELAY));
        assert!(!s.take_due(t0 + Duration::from_secs(2)));
        assert!(!s.is_pending());
    }
}
