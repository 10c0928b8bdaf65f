use crate::config::AppConfig;
use crate::error::AppError;
use crate::index::CatalogIndex;
use crate::lookup::{resolve, LookupRequest};
use crate::printer::PrintAction;
use actix_files::NamedFile;
use actix_web::{web, App, HttpResponse, HttpServer};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

async fn index_page() -> Result<NamedFile, AppError> {
    NamedFile::open_async("./static/index.html").await.map_err(|e| {
        log::error!("Error serving index.html: {}", e);
        AppError::Io(e)
    })
}

async fn barcode_lookup(
    index: web::Data<Arc<CatalogIndex>>,
    query: web::Query<LookupRequest>,
) -> Result<HttpResponse, AppError> {
    log::debug!("Lookup request: {:?}", query);
    let outcome = resolve(index.get_ref(), &query)?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Rejects any relative path that would escape the barcode root.
fn safe_join(root: &str, relative: &str) -> Result<PathBuf, AppError> {
    let rel = Path::new(relative);
    if rel
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(AppError::NotFound(format!("Invalid image path: {}", relative)));
    }
    Ok(Path::new(root).join(rel))
}

async fn barcode_image(
    path: web::Path<String>,
    app_config: web::Data<Arc<AppConfig>>,
) -> Result<NamedFile, AppError> {
    let relative = path.into_inner();
    log::debug!("Image request for {}", relative);

    let full = safe_join(&app_config.barcode_root, &relative)?;
    if !full.is_file() {
        return Err(AppError::NotFound(format!("No such image: {}", relative)));
    }
    Ok(NamedFile::open_async(&full).await?)
}

async fn print_barcode(
    path: web::Path<String>,
    app_config: web::Data<Arc<AppConfig>>,
    printer: web::Data<Arc<dyn PrintAction>>,
) -> HttpResponse {
    let relative = path.into_inner();

    let full = match safe_join(&app_config.barcode_root, &relative) {
        Ok(p) => p,
        Err(_) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "success": false,
                "error": "File not found",
            }))
        }
    };
    if !full.is_file() {
        return HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "error": "File not found",
        }));
    }

    match printer.open_for_print(&full) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Image opened in the viewer for printing!",
        })),
        Err(e) => {
            log::error!("Print action failed for {:?}: {}", full, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": e.to_string(),
            }))
        }
    }
}

pub async fn start_web_server(
    config: Arc<AppConfig>,
    index: Arc<CatalogIndex>,
    printer: Arc<dyn PrintAction>,
) -> std::io::Result<()> {
    let port = config.web_port;
    let config_data = web::Data::new(config);
    let index_data = web::Data::new(index);
    let printer_data = web::Data::new(printer);

    log::info!("Starting web server on port: {}", port);

    HttpServer::new(move || {
        App::new()
            .app_data(config_data.clone())
            .app_data(index_data.clone())
            .app_data(printer_data.clone())
            .service(web::resource("/").to(index_page))
            .service(web::resource("/barcode").route(web::get().to(barcode_lookup)))
            .service(web::resource("/barcode_image/{filename:.*}").route(web::get().to(barcode_image)))
            .service(web::resource("/print_barcode/{filename:.*}").route(web::post().to(print_barcode)))
            .service(actix_files::Files::new("/static", "./static"))
    })
    .bind(format!("0.0.0.0:{}", port))?
    .run()
    .await
}
