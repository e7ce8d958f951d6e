//! Raster image to single-page PDF.
//!
//! The image is normalized to 8-bit RGB and embedded as a Flate-compressed
//! DeviceRGB XObject on a page sized 1 pt per pixel (72 DPI). No timestamps
//! or document IDs are written, so the same input always yields the same bytes.

use crate::error::{ConversionError, Result};
use image::RgbImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::debug;

/// Resource name of the page image.
const IMAGE_NAME: &str = "Im0";

/// Decode `bytes` as a raster image and wrap it in a one-page PDF.
pub fn image_to_pdf(bytes: &[u8]) -> Result<Vec<u8>> {
    let format = image::guess_format(bytes)
        .map_err(|e| ConversionError::Decode(format!("unrecognized image format: {}", e)))?;

    let image = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ConversionError::Decode(format!("{:?} image: {}", format, e)))?;

    let rgb = image.to_rgb8();
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(ConversionError::Decode("image has no pixels".to_string()));
    }

    debug!(
        "Embedding {:?} image {}x{} into PDF",
        format,
        rgb.width(),
        rgb.height()
    );

    rgb_to_pdf(&rgb)
}

/// Write an RGB image as the only page of a new PDF.
pub fn rgb_to_pdf(image: &RgbImage) -> Result<Vec<u8>> {
    let width = i64::from(image.width());
    let height = i64::from(image.height());

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        image.as_raw().clone(),
    );
    let image_id = doc.add_object(image_stream);

    // Scale the unit square to the page and paint the image into it.
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    width.into(),
                    0.into(),
                    0.into(),
                    height.into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_bytes = content
        .encode()
        .map_err(|e| ConversionError::encode("PDF", e))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content_bytes));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                IMAGE_NAME => image_id,
            },
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| ConversionError::encode("PDF", e))?;
    Ok(buffer)
}
