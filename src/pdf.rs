//! PDF output through `lopdf`.
//!
//! [`PdfCanvas`] builds the page tree in memory and writes it on
//! [`save`](DocumentCanvas::save). Staged JPEGs are embedded as-is with the
//! `DCTDecode` filter; anything that is not a baseline RGB or grayscale JPEG
//! is re-encoded first.
//!
//! The document is written to `<name>.partial` and renamed into place, so a
//! failed save never leaves a truncated file at the requested path.

use std::{
    fs,
    io::Cursor,
    path::{Path, PathBuf},
};

use image::{ImageDecoder, ImageFormat, codecs::jpeg::JpegDecoder, codecs::jpeg::JpegEncoder};
use lopdf::{
    Dictionary, Document, Object, ObjectId, Stream, dictionary,
    content::{Content, Operation},
};

use crate::{
    canvas::{Color, DashPattern, DocumentCanvas},
    error::FlipbookError,
    geometry::Rect,
};

/// Resource name of the one font every page uses.
const FONT_NAME: &str = "F1";

/// Quality used when an image has to be re-encoded for embedding.
const REENCODE_QUALITY: u8 = 95;

/// Control-point distance for approximating a quarter circle with a cubic
/// Bézier curve.
const KAPPA: f32 = 0.552_284_8;

/// A [`DocumentCanvas`] that produces a PDF file.
///
/// # Example
///
/// ```no_run
/// use flipbook::{DocumentCanvas, PdfCanvas, geometry::{A4_HEIGHT, A4_WIDTH}};
///
/// let mut canvas = PdfCanvas::create("out.pdf", A4_WIDTH, A4_HEIGHT, "Demo");
/// canvas.draw_text("Hello", 72.0, 720.0, 14.0)?;
/// canvas.save()?;
/// # Ok::<(), flipbook::FlipbookError>(())
/// ```
pub struct PdfCanvas {
    document: Document,
    path: PathBuf,
    width: f32,
    height: f32,
    pages_id: ObjectId,
    font_id: ObjectId,
    page_ids: Vec<ObjectId>,
    operations: Vec<Operation>,
    page_images: Dictionary,
    image_count: usize,
}

impl PdfCanvas {
    /// Start a document of `width` × `height` point pages, to be saved at
    /// `path`. `title` goes into the document information dictionary.
    pub fn create(path: impl Into<PathBuf>, width: f32, height: f32, title: &str) -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        let font_id = document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let info_id = document.add_object(dictionary! {
            "Title" => Object::string_literal(win_ansi(title)),
            "Producer" => Object::string_literal(format!("flipbook {}", env!("CARGO_PKG_VERSION"))),
        });
        document.trailer.set("Info", info_id);

        Self {
            document,
            path: path.into(),
            width,
            height,
            pages_id,
            font_id,
            page_ids: Vec::new(),
            operations: Vec::new(),
            page_images: Dictionary::new(),
            image_count: 0,
        }
    }

    /// Where the document will be written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pages finished so far.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn set_fill(&mut self, color: Color) {
        self.operations.push(Operation::new(
            "rg",
            vec![color.red.into(), color.green.into(), color.blue.into()],
        ));
    }

    fn embed_image(&mut self, image: &Path) -> Result<ObjectId, FlipbookError> {
        let jpeg = EmbeddableJpeg::load(image)?;
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(jpeg.width),
                "Height" => i64::from(jpeg.height),
                "ColorSpace" => jpeg.color_space,
                "BitsPerComponent" => 8_i64,
                "Filter" => "DCTDecode",
            },
            jpeg.bytes,
        )
        .with_compression(false);
        Ok(self.document.add_object(stream))
    }

    fn write_document(&mut self, partial: &Path) -> Result<(), FlipbookError> {
        let kids: Vec<Object> = self.page_ids.iter().map(|&id| id.into()).collect();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
            "MediaBox" => Object::Array(vec![0_i64.into(), 0_i64.into(), self.width.into(), self.height.into()]),
        };
        self.document
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.document.trailer.set("Root", catalog_id);
        self.document.compress();

        self.document
            .save(partial)
            .map_err(|error| FlipbookError::DocumentError(format!("{}: {error}", partial.display())))?;
        fs::rename(partial, &self.path)?;
        Ok(())
    }
}

impl DocumentCanvas for PdfCanvas {
    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32) -> Result<(), FlipbookError> {
        self.set_fill(Color::BLACK);
        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![FONT_NAME.into(), size.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]),
            Operation::new("ET", vec![]),
        ]);
        Ok(())
    }

    fn draw_image(&mut self, image: &Path, area: Rect) -> Result<(), FlipbookError> {
        let image_id = self.embed_image(image)?;
        let name = format!("Im{}", self.image_count);
        self.image_count += 1;
        self.page_images.set(name.as_bytes().to_vec(), image_id);

        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    area.width.into(),
                    0_i64.into(),
                    0_i64.into(),
                    area.height.into(),
                    area.x.into(),
                    area.y.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
        Ok(())
    }

    fn fill_circle(
        &mut self,
        center_x: f32,
        center_y: f32,
        radius: f32,
        color: Color,
    ) -> Result<(), FlipbookError> {
        let (cx, cy, r) = (center_x, center_y, radius);
        let k = radius * KAPPA;
        self.set_fill(color);
        self.operations.extend([
            Operation::new("m", vec![(cx + r).into(), cy.into()]),
            curve([cx + r, cy + k, cx + k, cy + r, cx, cy + r]),
            curve([cx - k, cy + r, cx - r, cy + k, cx - r, cy]),
            curve([cx - r, cy - k, cx - k, cy - r, cx, cy - r]),
            curve([cx + k, cy - r, cx + r, cy - k, cx + r, cy]),
            Operation::new("h", vec![]),
            Operation::new("f", vec![]),
        ]);
        Ok(())
    }

    fn stroke_rect(&mut self, area: Rect, dash: Option<DashPattern>) -> Result<(), FlipbookError> {
        self.operations.push(Operation::new("q", vec![]));
        if let Some(dash) = dash {
            self.operations.push(Operation::new(
                "d",
                vec![Object::Array(vec![dash.on.into(), dash.off.into()]), 0_i64.into()],
            ));
        }
        self.operations.extend([
            Operation::new(
                "re",
                vec![
                    area.x.into(),
                    area.y.into(),
                    area.width.into(),
                    area.height.into(),
                ],
            ),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);
        Ok(())
    }

    fn show_page(&mut self) -> Result<(), FlipbookError> {
        let content = Content {
            operations: std::mem::take(&mut self.operations),
        };
        let content_id = self
            .document
            .add_object(Stream::new(dictionary! {}, content.encode()?));

        let resources_id = self.document.add_object(dictionary! {
            "Font" => dictionary! { FONT_NAME => self.font_id },
            "XObject" => std::mem::replace(&mut self.page_images, Dictionary::new()),
        });

        let page_id = self.document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        self.page_ids.push(page_id);
        Ok(())
    }

    fn save(&mut self) -> Result<(), FlipbookError> {
        if !self.operations.is_empty() || self.page_ids.is_empty() {
            self.show_page()?;
        }

        let partial = partial_path(&self.path);
        let result = self.write_document(&partial);
        if result.is_err() {
            let _ = fs::remove_file(&partial);
        }
        result?;

        log::debug!(
            "Wrote {} page(s) to {}",
            self.page_ids.len(),
            self.path.display()
        );
        Ok(())
    }
}

fn curve(points: [f32; 6]) -> Operation {
    Operation::new("c", points.iter().map(|&value| value.into()).collect())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

/// Map text to single-byte WinAnsi, replacing what the base font cannot show.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match u32::from(ch) {
            code @ 0x20..=0x7e | code @ 0xa0..=0xff => code as u8,
            _ => b'?',
        })
        .collect()
}

/// JPEG bytes ready to be wrapped in a `DCTDecode` image stream.
struct EmbeddableJpeg {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    color_space: &'static str,
}

impl EmbeddableJpeg {
    fn load(path: &Path) -> Result<Self, FlipbookError> {
        let bytes = fs::read(path)?;

        if image::guess_format(&bytes).ok() == Some(ImageFormat::Jpeg) {
            let decoder = JpegDecoder::new(Cursor::new(&bytes))?;
            let (width, height) = decoder.dimensions();
            let color_space = match decoder.color_type() {
                image::ColorType::Rgb8 => Some("DeviceRGB"),
                image::ColorType::L8 => Some("DeviceGray"),
                _ => None,
            };
            if let Some(color_space) = color_space {
                return Ok(Self {
                    bytes,
                    width,
                    height,
                    color_space,
                });
            }
        }

        log::debug!("Re-encoding {} for embedding", path.display());
        let rgb = image::load_from_memory(&bytes)?.to_rgb8();
        let mut encoded = Vec::new();
        JpegEncoder::new_with_quality(&mut encoded, REENCODE_QUALITY).encode_image(&rgb)?;
        Ok(Self {
            bytes: encoded,
            width: rgb.width(),
            height: rgb.height(),
            color_space: "DeviceRGB",
        })
    }
}
