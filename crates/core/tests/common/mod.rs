//! Shared helpers for integration tests: input builders and dependency checks.

#![allow(dead_code)]

use docshift_core::{ConversionKind, Dispatcher, DispatcherBuilder};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::io::{Cursor, Read};

/// Letter size in points.
pub const PAGE_WIDTH: i64 = 612;
pub const PAGE_HEIGHT: i64 = 792;

/// A run of text drawn at (`x`, `y`) in Helvetica.
pub struct TextItem<'a> {
    pub x: i64,
    pub y: i64,
    pub size: i64,
    pub text: &'a str,
}

pub fn item(x: i64, y: i64, text: &str) -> TextItem<'_> {
    TextItem {
        x,
        y,
        size: 12,
        text,
    }
}

/// Build a Letter-size PDF with one page per entry of `pages`.
pub fn pdf_with_text(pages: &[Vec<TextItem<'_>>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for items in pages {
        let mut operations = vec![Operation::new("BT", vec![])];
        for item in items {
            operations.push(Operation::new("Tf", vec!["F1".into(), item.size.into()]));
            operations.push(Operation::new(
                "Tm",
                vec![
                    1.into(),
                    0.into(),
                    0.into(),
                    1.into(),
                    item.x.into(),
                    item.y.into(),
                ],
            ));
            operations.push(Operation::new("Tj", vec![Object::string_literal(item.text)]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
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
            "Resources" => resources_id,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// `count` pages, each carrying a heading and one paragraph line.
pub fn text_pdf(count: usize) -> Vec<u8> {
    let headings: Vec<String> = (1..=count).map(|n| format!("Page {} heading", n)).collect();
    let pages: Vec<Vec<TextItem<'_>>> = headings
        .iter()
        .map(|heading| {
            vec![
                item(72, 720, heading),
                item(72, 690, "The quick brown fox jumps over the lazy dog."),
            ]
        })
        .collect();
    pdf_with_text(&pages)
}

/// One page holding a three-column price table; the last row has no quantity.
pub fn table_pdf() -> Vec<u8> {
    let rows: [[&str; 3]; 4] = [
        ["Item", "Qty", "Unit price"],
        ["Apple", "3", "1.25"],
        ["Banana", "12", "0.5"],
        ["Cherry", "", "7"],
    ];
    let columns = [72, 220, 340];

    let mut items = Vec::new();
    for (r, row) in rows.iter().enumerate() {
        let y = 700 - 20 * r as i64;
        for (c, text) in row.iter().enumerate() {
            if !text.is_empty() {
                items.push(item(columns[c], y, text));
            }
        }
    }
    pdf_with_text(&[items])
}

/// A one-page PDF protected by the standard security handler with a user
/// password, so it cannot be opened without one.
pub fn password_protected_pdf() -> Vec<u8> {
    let owner = "4F".repeat(32);
    let user = "5A".repeat(32);
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] >>".to_string(),
        format!(
            "<< /Filter /Standard /V 1 /R 2 /Length 40 /O <{}> /U <{}> /P -44 >>",
            owner, user
        ),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_start = pdf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        xref.push_str(&format!("{:010} 00000 n \n", offset));
    }
    let id = "0123456789ABCDEF0123456789ABCDEF";
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R /Encrypt 4 0 R /ID [<{}> <{}>] >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        id,
        id,
        xref_start
    ));
    pdf.extend_from_slice(xref.as_bytes());
    pdf
}

/// Encode a solid-color RGB image.
pub fn solid_image(width: u32, height: u32, color: [u8; 3], format: ImageFormat) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)));
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

/// Read a named entry of a zip archive.
pub fn zip_entry(bytes: &[u8], name: &str) -> Vec<u8> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut data = Vec::new();
    entry.read_to_end(&mut data).unwrap();
    data
}

/// Entry names of a zip archive in archive order.
pub fn zip_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

pub fn dispatcher() -> Dispatcher {
    DispatcherBuilder::new().build().unwrap()
}

/// Whether pdfium could be bound; prints a skip notice when it could not.
pub fn pdf_engine_ready(dispatcher: &Dispatcher) -> bool {
    if dispatcher.is_available(ConversionKind::PdfToImages) {
        return true;
    }
    eprintln!("Skipping test: pdfium library not found (set PDFIUM_DYNAMIC_LIB_PATH)");
    false
}
