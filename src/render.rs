use crate::catalog::{load_catalog, CatalogItem};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::normalize::{clean_filename, truncate_text};
use ab_glyph::{FontVec, PxScale};
use barcoders::sym::code128::Code128;
use image::{imageops, Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Pixels per Code 128 module.
const MODULE_WIDTH: u32 = 2;
const BAR_HEIGHT: u32 = 60;
const QUIET_ZONE: u32 = 20;
/// Band above the bars holding the product name.
const TOP_BAND: u32 = 30;
/// Gap plus human-readable number under the bars.
const NUMBER_BAND: u32 = 20;
/// Bottom band; taller when a price is printed.
const PRICE_BAND: u32 = 35;
const PLAIN_BOTTOM_BAND: u32 = 15;

const NAME_SCALE: f32 = 16.0;
const NUMBER_SCALE: f32 = 12.0;
const PRICE_SCALE: f32 = 18.0;
const MAX_NAME_CHARS: usize = 28;
const CURRENCY_PREFIX: &str = "₱";

/// 50mm x 30mm at 150 DPI.
const TARGET_WIDTH: u32 = 295;
const TARGET_HEIGHT: u32 = 177;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    pub processed: usize,
    pub skipped: usize,
}

fn label_dimensions(module_count: usize, has_price: bool) -> (u32, u32) {
    let width = module_count as u32 * MODULE_WIDTH + 2 * QUIET_ZONE;
    let bottom = if has_price { PRICE_BAND } else { PLAIN_BOTTOM_BAND };
    (width, TOP_BAND + BAR_HEIGHT + NUMBER_BAND + bottom)
}

fn draw_centered(canvas: &mut RgbImage, font: &FontVec, scale: f32, y: i32, text: &str) {
    let scale = PxScale::from(scale);
    let (text_width, _) = text_size(scale, font, text);
    let x = ((canvas.width() as i32 - text_width as i32) / 2).max(0);
    draw_text_mut(canvas, BLACK, x, y, scale, font, text);
}

/// Composes one label: product name band, Code 128 bars with the
/// human-readable number, and a price band when a price is present.
fn compose_label(font: &FontVec, item: &CatalogItem, number: &str) -> Result<RgbImage, AppError> {
    // Charset B covers the printable ASCII range.
    let code = Code128::new(format!("Ɓ{}", number))
        .map_err(|e| AppError::Barcode(format!("{} is not encodable: {:?}", number, e)))?;
    let modules = code.encode();

    let (width, height) = label_dimensions(modules.len(), item.price.is_some());
    let mut canvas = RgbImage::from_pixel(width, height, WHITE);

    for (i, module) in modules.iter().enumerate() {
        if *module != 1 {
            continue;
        }
        let x0 = QUIET_ZONE + i as u32 * MODULE_WIDTH;
        for x in x0..x0 + MODULE_WIDTH {
            for y in TOP_BAND..TOP_BAND + BAR_HEIGHT {
                canvas.put_pixel(x, y, BLACK);
            }
        }
    }

    let display_name = truncate_text(&item.name, MAX_NAME_CHARS);
    draw_centered(&mut canvas, font, NAME_SCALE, 5, &display_name);

    let number_y = (TOP_BAND + BAR_HEIGHT + 5) as i32;
    draw_centered(&mut canvas, font, NUMBER_SCALE, number_y, number);

    if let Some(price) = &item.price {
        let price_y = (TOP_BAND + BAR_HEIGHT + NUMBER_BAND + 12) as i32;
        draw_centered(&mut canvas, font, PRICE_SCALE, price_y, &format!("{}{}", CURRENCY_PREFIX, price));
    }

    Ok(canvas)
}

fn render_label(
    config: &AppConfig,
    font: &FontVec,
    item: &CatalogItem,
    number: &str,
) -> Result<PathBuf, AppError> {
    let canvas = compose_label(font, item, number)?;

    let folder = PathBuf::from(&config.barcode_root).join(clean_filename(&item.category));
    std::fs::create_dir_all(&folder)?;
    let path = folder.join(format!(
        "{}.png",
        clean_filename(&format!("{}-{}", item.sku, number))
    ));

    let resized = imageops::resize(
        &canvas,
        TARGET_WIDTH,
        TARGET_HEIGHT,
        imageops::FilterType::Lanczos3,
    );
    resized.save(&path)?;

    Ok(path)
}

/// Renders every catalog row carrying a barcode number into a labeled PNG
/// under its category folder. Rows without a number, and rows whose render
/// fails, are logged and counted; the batch never aborts on one item.
pub fn render_catalog(config: &AppConfig) -> Result<RenderStats, AppError> {
    let items = load_catalog(&config.catalog_path)?;

    let (renderable, missing): (Vec<_>, Vec<_>) =
        items.iter().partition(|i| i.barcode_number.is_some());
    for item in &missing {
        log::warn!("No barcode number for {} - {}, skipping", item.sku, item.name);
    }
    if renderable.is_empty() {
        log::info!("Completed! Processed: 0, Skipped: {}", missing.len());
        return Ok(RenderStats {
            processed: 0,
            skipped: missing.len(),
        });
    }

    let font_data = std::fs::read(&config.font_path).map_err(|e| {
        AppError::Font(format!("cannot read font {}: {}", config.font_path, e))
    })?;
    let font = FontVec::try_from_vec(font_data)
        .map_err(|_| AppError::Font(format!("{} is not a usable font", config.font_path)))?;

    let processed = AtomicUsize::new(0);
    let skipped = AtomicUsize::new(missing.len());

    renderable.par_iter().for_each(|item| {
        let number = item.barcode_number.as_deref().unwrap_or_default();
        match render_label(config, &font, item, number) {
            Ok(path) => {
                log::info!("Generated barcode: {}", path.display());
                processed.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                log::warn!("Error generating barcode for {} - {}: {}", item.sku, item.name, e);
                skipped.fetch_add(1, Ordering::Relaxed);
            }
        }
    });

    let stats = RenderStats {
        processed: processed.load(Ordering::Relaxed),
        skipped: skipped.load(Ordering::Relaxed),
    };
    log::info!("Completed! Processed: {}, Skipped: {}", stats.processed, stats.skipped);
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn config_for(dir: &TempDir, catalog: &str) -> AppConfig {
        let catalog_path = dir.path().join("items.csv");
        std::fs::write(&catalog_path, catalog).unwrap();
        AppConfig {
            barcode_root: dir.path().join("out").to_string_lossy().to_string(),
            catalog_path: catalog_path.to_string_lossy().to_string(),
            excluded_dirs: HashSet::new(),
            image_extension: "png".to_string(),
            web_port: 0,
            log_level: "info".to_string(),
            font_path: dir.path().join("missing.ttf").to_string_lossy().to_string(),
            sheet_output_dir: ".".to_string(),
        }
    }

    #[test]
    fn test_rows_without_barcode_are_skipped_without_output() {
        let dir = TempDir::new().unwrap();
        let config = config_for(
            &dir,
            "SKU,Name,Category,Barcode Number,Price\n\
             10000,Baking Soda,Pantry,,\n\
             10001,Baking Powder,Pantry,,\n",
        );

        // All rows lack a number, so the renderer never needs the font.
        let stats = render_catalog(&config).unwrap();
        assert_eq!(stats, RenderStats { processed: 0, skipped: 2 });
        assert!(!PathBuf::from(&config.barcode_root).exists());
    }

    #[test]
    fn test_empty_catalog_renders_nothing() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir, "SKU,Name,Category,Barcode Number,Price\n");
        let stats = render_catalog(&config).unwrap();
        assert_eq!(stats, RenderStats::default());
    }

    #[test]
    fn test_label_dimensions_grow_for_price_band() {
        let (w_plain, h_plain) = label_dimensions(100, false);
        let (w_priced, h_priced) = label_dimensions(100, true);
        assert_eq!(w_plain, 100 * MODULE_WIDTH + 2 * QUIET_ZONE);
        assert_eq!(w_plain, w_priced);
        assert_eq!(h_priced - h_plain, PRICE_BAND - PLAIN_BOTTOM_BAND);
    }

    #[test]
    fn test_code128_modules_have_bar_structure() {
        let modules = Code128::new("Ɓ527341680526".to_string()).unwrap().encode();
        assert!(!modules.is_empty());
        // Code 128 symbols always start with a bar and end with a bar.
        assert_eq!(modules.first(), Some(&1));
        assert_eq!(modules.last(), Some(&1));
    }
}
