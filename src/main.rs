//! Command-line companion: summarizes annotation files.
//!
//! Usage: `roi-annotator [<annotations.json>...]`
//!
//! Without arguments, every `.json` file in the configured annotation folder
//! is summarized.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use roi_annotator::format::{ImportResult, load_annotations};
use roi_annotator::{AppConfig, ShapeKind};

fn main() -> ExitCode {
    let config = AppConfig::load_from_default_path().unwrap_or_default();

    // RUST_LOG still wins over the configured level
    let level = config.preferences.log_level.to_level_filter();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .init();

    let mut paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        match &config.preferences.annotation_folder {
            Some(folder) => match annotation_files_in(folder) {
                Ok(found) => paths = found,
                Err(e) => {
                    log::error!("Failed to read annotation folder {:?}: {}", folder, e);
                    return ExitCode::FAILURE;
                }
            },
            None => {
                eprintln!("Usage: roi-annotator [<annotations.json>...]");
                return ExitCode::FAILURE;
            }
        }
    }

    let mut failed = false;
    for path in &paths {
        match load_annotations(path) {
            Ok(result) => print_summary(path, &result),
            Err(e) => {
                log::error!("Failed to load {:?}: {}", path, e);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// JSON files in `folder`, sorted by name.
fn annotation_files_in(folder: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
            files.push(path);
        }
    }
    files.sort();
    log::debug!("Found {} annotation files in {:?}", files.len(), folder);
    Ok(files)
}

fn print_summary(path: &Path, result: &ImportResult) {
    let count = |kind: ShapeKind| result.shapes.iter().filter(|s| s.kind() == kind).count();

    println!(
        "{}: {} shapes ({} rectangles, {} trapezoids, {} polygons)",
        path.display(),
        result.shapes.len(),
        count(ShapeKind::Rectangle),
        count(ShapeKind::Trapezoid),
        count(ShapeKind::Polygon),
    );

    let mut classes: Vec<&str> = result.shapes.iter().map(|s| s.class_name.as_str()).collect();
    classes.sort_unstable();
    classes.dedup();
    for class in classes {
        let n = result.shapes.iter().filter(|s| s.class_name == class).count();
        let label = if class.is_empty() { "<unlabelled>" } else { class };
        println!("  {:<20} {}", label, n);
    }

    for warning in &result.warnings {
        println!("  warning: {}", warning);
    }
}
