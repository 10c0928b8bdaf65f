use crate::config::AppConfig;
use crate::error::AppError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

const A4_WIDTH: f32 = 595.276;
const A4_HEIGHT: f32 = 841.89;
const MM_TO_PT: f32 = 72.0 / 25.4;

/// Printed cell size; barcodes must come out at 50mm x 30mm to scan.
const CELL_WIDTH: f32 = 50.0 * MM_TO_PT;
const CELL_HEIGHT: f32 = 30.0 * MM_TO_PT;

const FOOTER_FONT_SIZE: i64 = 8;
const HEADER_FONT_SIZE: i64 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    pub columns: usize,
    pub rows: usize,
}

impl GridSpec {
    pub const DEFAULT: GridSpec = GridSpec { columns: 4, rows: 5 };
    pub const DENSE: GridSpec = GridSpec { columns: 5, rows: 6 };

    pub fn per_page(&self) -> usize {
        self.columns * self.rows
    }

    pub fn page_count(&self, images: usize) -> usize {
        (images + self.per_page() - 1) / self.per_page()
    }

    /// Margins that spread the grid evenly across the page.
    pub fn margins(&self) -> (f32, f32) {
        let margin_x = (A4_WIDTH - self.columns as f32 * CELL_WIDTH) / (self.columns as f32 + 1.0);
        let margin_y = (A4_HEIGHT - self.rows as f32 * CELL_HEIGHT) / (self.rows as f32 + 1.0);
        (margin_x, margin_y)
    }

    /// Bottom-left corner of cell `i` on its page, in PDF coordinates
    /// (origin at the bottom-left, cells filled top-down in reading order).
    pub fn cell_position(&self, i: usize) -> (f32, f32) {
        let (margin_x, margin_y) = self.margins();
        let row = (i / self.columns) as f32;
        let col = (i % self.columns) as f32;
        let x = margin_x + col * (CELL_WIDTH + margin_x);
        let y = A4_HEIGHT - margin_y - (row + 1.0) * (CELL_HEIGHT + margin_y);
        (x, y)
    }
}

/// Category folders get the dense grid once they outgrow a single default page.
pub fn grid_for_category(image_count: usize) -> GridSpec {
    if image_count <= 20 {
        GridSpec::DEFAULT
    } else {
        GridSpec::DENSE
    }
}

fn text_ops(font_name: &str, size: i64, x: f32, y: f32, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font_name.into(), size.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(text)]),
        Operation::new("ET", vec![]),
    ]
}

/// Builds one multi-page PDF tiling `images` onto the grid. Returns the page
/// count. A failed image embed is logged and its cell left empty.
fn build_sheet(
    images: &[PathBuf],
    grid: GridSpec,
    header: Option<&str>,
    footer_suffix: &str,
    output: &Path,
) -> Result<usize, AppError> {
    let total_pages = grid.page_count(images.len());

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });

    let mut kids: Vec<Object> = Vec::new();
    for (page_index, page_images) in images.chunks(grid.per_page()).enumerate() {
        log::debug!("Laying out page {}/{}", page_index + 1, total_pages);

        let mut operations = Vec::new();
        if let Some(title) = header {
            operations.extend(text_ops(
                "F2",
                HEADER_FONT_SIZE,
                50.0,
                A4_HEIGHT - 20.0,
                &format!("{} - Barcodes", title),
            ));
        }
        let footer = format!(
            "Page {} of {} | {}",
            page_index + 1,
            total_pages,
            footer_suffix
        );
        operations.extend(text_ops("F1", FOOTER_FONT_SIZE, 10.0, 10.0, &footer));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! {
                    "F1" => font_id,
                    "F2" => bold_font_id,
                },
            },
            "MediaBox" => vec![0.into(), 0.into(), A4_WIDTH.into(), A4_HEIGHT.into()],
        });

        for (i, image_path) in page_images.iter().enumerate() {
            let (x, y) = grid.cell_position(i);
            let embed = lopdf::xobject::image(image_path).and_then(|stream| {
                doc.insert_image(page_id, stream, (x, y), (CELL_WIDTH, CELL_HEIGHT))
                    .map(|_| ())
            });
            if let Err(e) = embed {
                log::warn!("Error adding {}: {}", image_path.display(), e);
            }
        }

        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => total_pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();
    doc.save(output)?;

    Ok(total_pages)
}

fn is_excluded(config: &AppConfig, name: &str) -> bool {
    config.excluded_dirs.contains(name) || name.starts_with('.')
}

/// Category folders (immediate subdirectories of the barcode root) and their
/// PNGs, both in sorted order so page layout is reproducible.
fn collect_by_category(config: &AppConfig) -> Result<Vec<(String, Vec<PathBuf>)>, AppError> {
    let root = Path::new(&config.barcode_root);
    let mut categories = Vec::new();

    if !root.is_dir() {
        return Ok(categories);
    }

    let mut folders: Vec<PathBuf> = std::fs::read_dir(root)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    folders.sort();

    for folder in folders {
        let Some(name) = folder.file_name().and_then(|n| n.to_str()).map(String::from) else {
            continue;
        };
        if is_excluded(config, &name) {
            continue;
        }

        let mut images: Vec<PathBuf> = std::fs::read_dir(&folder)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .and_then(|e| e.to_str())
                        .map(|e| e.eq_ignore_ascii_case(&config.image_extension))
                        .unwrap_or(false)
            })
            .collect();
        images.sort();

        if !images.is_empty() {
            categories.push((name, images));
        }
    }

    Ok(categories)
}

fn title_case(folder_name: &str) -> String {
    folder_name
        .replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSummary {
    pub output: PathBuf,
    pub barcodes: usize,
    pub pages: usize,
}

/// One PDF with every barcode across all category folders.
pub fn create_combined_sheet(config: &AppConfig) -> Result<Option<SheetSummary>, AppError> {
    let images: Vec<PathBuf> = collect_by_category(config)?
        .into_iter()
        .flat_map(|(_, images)| images)
        .collect();

    if images.is_empty() {
        log::warn!("No barcode files found. Run the render step first.");
        return Ok(None);
    }
    log::info!("Found {} barcode files", images.len());

    std::fs::create_dir_all(&config.sheet_output_dir)?;
    let output = Path::new(&config.sheet_output_dir).join("all_barcodes.pdf");
    let pages = build_sheet(
        &images,
        GridSpec::DEFAULT,
        None,
        "Generated from inventory catalog",
        &output,
    )?;

    log::info!("PDF created successfully: {}", output.display());
    Ok(Some(SheetSummary {
        output,
        barcodes: images.len(),
        pages,
    }))
}

/// One PDF per category folder, with a category header on every page.
pub fn create_category_sheets(config: &AppConfig) -> Result<Vec<SheetSummary>, AppError> {
    let categories = collect_by_category(config)?;
    if categories.is_empty() {
        log::warn!("No folders with barcodes found.");
        return Ok(Vec::new());
    }

    std::fs::create_dir_all(&config.sheet_output_dir)?;

    let mut summaries = Vec::new();
    for (name, images) in categories {
        log::info!("Creating PDF for {} ({} barcodes)", name, images.len());

        let output = Path::new(&config.sheet_output_dir).join(format!("{}_barcodes.pdf", name));
        let footer = format!("{} | {} total barcodes", name, images.len());
        let pages = build_sheet(
            &images,
            grid_for_category(images.len()),
            Some(&title_case(&name)),
            &footer,
            &output,
        )?;

        log::info!("Created: {}", output.display());
        summaries.push(SheetSummary {
            output,
            barcodes: images.len(),
            pages,
        });
    }

    Ok(summaries)
}

/// Interactive entry point: asks which sheets to produce, then prints
/// printing guidance.
pub fn run_interactive(config: &AppConfig) -> Result<(), AppError> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    writeln!(stdout, "Barcode PDF Generator")?;
    writeln!(stdout, "====================\n")?;
    writeln!(stdout, "Choose an option:")?;
    writeln!(stdout, "1. Create one PDF with all barcodes")?;
    writeln!(stdout, "2. Create separate PDFs by category")?;
    writeln!(stdout, "3. Both")?;
    write!(stdout, "Enter choice (1/2/3): ")?;
    stdout.flush()?;

    let mut choice = String::new();
    stdin.lock().read_line(&mut choice)?;
    let choice = choice.trim();

    if matches!(choice, "1" | "3") {
        writeln!(stdout, "\nCreating combined PDF...")?;
        if let Some(summary) = create_combined_sheet(config)? {
            writeln!(
                stdout,
                "PDF created: {} ({} barcodes, {} pages)",
                summary.output.display(),
                summary.barcodes,
                summary.pages
            )?;
        }
    }
    if matches!(choice, "2" | "3") {
        writeln!(stdout, "\nCreating category-specific PDFs...")?;
        for summary in create_category_sheets(config)? {
            writeln!(
                stdout,
                "Created: {} ({} barcodes, {} pages)",
                summary.output.display(),
                summary.barcodes,
                summary.pages
            )?;
        }
    }

    writeln!(stdout, "\nDone! You can now print the PDF files.")?;
    writeln!(stdout, "\nPrinting tips:")?;
    writeln!(stdout, "- Use 'Actual Size' or '100%' scaling when printing")?;
    writeln!(stdout, "- Do NOT use 'Fit to Page' as it will change barcode dimensions")?;
    writeln!(stdout, "- Each barcode should print as 50mm x 30mm")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_for_exact_and_ragged_fills() {
        let grid = GridSpec::DEFAULT;
        assert_eq!(grid.per_page(), 20);
        assert_eq!(grid.page_count(20), 1);
        assert_eq!(grid.page_count(21), 2);
        assert_eq!(grid.page_count(40), 2);
        assert_eq!(grid.page_count(1), 1);
    }

    #[test]
    fn test_margins_spread_grid_evenly() {
        let grid = GridSpec::DEFAULT;
        let (margin_x, margin_y) = grid.margins();
        let used_width = grid.columns as f32 * CELL_WIDTH + (grid.columns as f32 + 1.0) * margin_x;
        let used_height = grid.rows as f32 * CELL_HEIGHT + (grid.rows as f32 + 1.0) * margin_y;
        assert!((used_width - A4_WIDTH).abs() < 0.01);
        assert!((used_height - A4_HEIGHT).abs() < 0.01);
    }

    #[test]
    fn test_cell_positions_fill_reading_order_top_down() {
        let grid = GridSpec::DEFAULT;
        let (margin_x, margin_y) = grid.margins();

        let (x0, y0) = grid.cell_position(0);
        assert!((x0 - margin_x).abs() < 0.01);
        assert!((y0 - (A4_HEIGHT - margin_y - (CELL_HEIGHT + margin_y))).abs() < 0.01);

        // Next cell in the same row moves right, same y.
        let (x1, y1) = grid.cell_position(1);
        assert!(x1 > x0);
        assert!((y1 - y0).abs() < 0.01);

        // First cell of the second row drops down, same x.
        let (x4, y4) = grid.cell_position(grid.columns);
        assert!((x4 - x0).abs() < 0.01);
        assert!(y4 < y0);
    }

    #[test]
    fn test_category_grid_density_switch() {
        assert_eq!(grid_for_category(1), GridSpec::DEFAULT);
        assert_eq!(grid_for_category(20), GridSpec::DEFAULT);
        assert_eq!(grid_for_category(21), GridSpec::DENSE);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("Baking_Supplies"), "Baking Supplies");
        assert_eq!(title_case("cleaning"), "Cleaning");
        assert_eq!(title_case("snacks_and_candy"), "Snacks And Candy");
    }
}
