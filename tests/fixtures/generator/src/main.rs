//! Sample input generator for docshift.
//!
//! Writes one or more inputs for every conversion kind into
//! `tests/fixtures/output`, including malformed files for failure paths.

use anyhow::{Context, Result};
use docx_rs::{BreakType, Docx, Paragraph, Run, Table, TableCell, TableRow};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use rust_xlsxwriter::{Format, Workbook};
use std::fs;
use std::path::Path;

fn main() -> Result<()> {
    let output_dir = Path::new("tests/fixtures/output");
    fs::create_dir_all(output_dir)?;

    println!("Generating fixtures in {}\n", output_dir.display());

    // Image to PDF
    generate_images(output_dir)?;

    // PDF to images / Excel / Word
    generate_text_pdf(output_dir)?;
    generate_table_pdf(output_dir)?;

    // Word / Excel to PDF
    generate_report_docx(output_dir)?;
    generate_ledger_xlsx(output_dir)?;

    // Failure paths
    write_fixture(output_dir, "corrupt.pdf", b"%PDF-1.7\nthis is not a PDF body")?;
    write_fixture(output_dir, "corrupt.docx", b"PK\x03\x04 truncated archive")?;
    write_fixture(output_dir, "not-an-image.png", b"plain text with a png extension")?;

    println!("\nDone.");
    Ok(())
}

fn write_fixture(output_dir: &Path, name: &str, bytes: &[u8]) -> Result<()> {
    let path = output_dir.join(name);
    println!("  Creating: {}", path.display());
    fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))
}

/// A diagonal gradient saved in every format the image converter accepts.
fn generate_images(output_dir: &Path) -> Result<()> {
    let image = RgbImage::from_fn(320, 200, |x, y| {
        Rgb([(x * 255 / 319) as u8, (y * 255 / 199) as u8, 128])
    });
    let image = DynamicImage::ImageRgb8(image);

    for (name, format) in [
        ("gradient.png", ImageFormat::Png),
        ("gradient.jpg", ImageFormat::Jpeg),
        ("gradient.bmp", ImageFormat::Bmp),
        ("gradient.gif", ImageFormat::Gif),
    ] {
        let path = output_dir.join(name);
        println!("  Creating: {}", path.display());
        image.save_with_format(&path, format)?;
    }
    Ok(())
}

/// Letter-size pages of Helvetica text at absolute positions.
fn pdf_from_lines(pages: &[Vec<(i64, i64, String)>]) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
        ];
        for (x, y, text) in lines {
            operations.push(Operation::new(
                "Tm",
                vec![1.into(), 0.into(), 0.into(), 1.into(), (*x).into(), (*y).into()],
            ));
            operations.push(Operation::new("Tj", vec![Object::string_literal(text.as_str())]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations }.encode()?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
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
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

/// Three pages of headings and paragraphs.
fn generate_text_pdf(output_dir: &Path) -> Result<()> {
    let pages: Vec<Vec<(i64, i64, String)>> = (1..=3)
        .map(|n| {
            vec![
                (72, 720, format!("Chapter {}", n)),
                (72, 690, "Sphinx of black quartz, judge my vow.".to_string()),
                (72, 675, "Pack my box with five dozen liquor jugs.".to_string()),
                (72, 630, "A second paragraph after a wider gap.".to_string()),
            ]
        })
        .collect();
    write_fixture(output_dir, "chapters.pdf", &pdf_from_lines(&pages)?)
}

/// A price list laid out in three columns.
fn generate_table_pdf(output_dir: &Path) -> Result<()> {
    let rows = [
        ["Item", "Qty", "Unit price"],
        ["Apple", "3", "1.25"],
        ["Banana", "12", "0.5"],
        ["Cherry", "", "7"],
        ["Dragon fruit", "1", "4.80"],
    ];
    let columns = [72, 220, 340];

    let mut lines = Vec::new();
    for (r, row) in rows.iter().enumerate() {
        let y = 700 - 20 * r as i64;
        for (c, text) in row.iter().enumerate() {
            if !text.is_empty() {
                lines.push((columns[c], y, text.to_string()));
            }
        }
    }
    write_fixture(output_dir, "price-list.pdf", &pdf_from_lines(&[lines])?)
}

fn generate_report_docx(output_dir: &Path) -> Result<()> {
    let path = output_dir.join("report.docx");
    println!("  Creating: {}", path.display());

    let table = Table::new(vec![
        TableRow::new(vec![
            TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("Quarter"))),
            TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("Revenue"))),
        ]),
        TableRow::new(vec![
            TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("Q1"))),
            TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("10400"))),
        ]),
    ]);

    let docx = Docx::new()
        .add_paragraph(
            Paragraph::new().add_run(Run::new().add_text("Quarterly report").bold().size(36)),
        )
        .add_paragraph(
            Paragraph::new().add_run(Run::new().add_text("Revenue grew in every region.")),
        )
        .add_table(table)
        .add_paragraph(Paragraph::new().add_run(Run::new().add_break(BreakType::Page)))
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Appendix")));

    let file = fs::File::create(&path)?;
    docx.build().pack(file)?;
    Ok(())
}

fn generate_ledger_xlsx(output_dir: &Path) -> Result<()> {
    let path = output_dir.join("ledger.xlsx");
    println!("  Creating: {}", path.display());

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet().set_name("Ledger")?;
    sheet.write_string_with_format(0, 0, "Date", &bold)?;
    sheet.write_string_with_format(0, 1, "Description", &bold)?;
    sheet.write_string_with_format(0, 2, "Amount", &bold)?;
    let entries = [
        ("2024-01-05", "Office rent", -1200.0),
        ("2024-01-12", "Invoice 1042", 3400.0),
        ("2024-01-20", "Utilities", -180.5),
    ];
    for (i, (date, description, amount)) in entries.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, *date)?;
        sheet.write_string(row, 1, *description)?;
        sheet.write_number(row, 2, *amount)?;
    }
    sheet.set_column_width(1, 20.0)?;

    let summary = workbook.add_worksheet().set_name("Summary")?;
    summary.write_string(0, 0, "Balance")?;
    summary.write_number(0, 1, entries.iter().map(|e| e.2).sum::<f64>())?;

    workbook.save(&path)?;
    Ok(())
}
