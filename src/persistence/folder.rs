//! A backend over a local folder of scanned images.
//!
//! Tables of `<folder>/<name>` are stored as `{"tables": [...]}` in
//! `<folder>/.tables/<name>.json`; document states of all images share
//! `<folder>/.tables/document_states.json`. Predictions need a model server
//! and are not offered.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::TABLES_DIR;
use crate::model::{Cell, DocumentState, Image, Table};
use crate::persistence::backend::Backend;
use crate::persistence::error::PersistenceError;

/// Supported image file extensions (lowercase).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif", "webp"];

const DOCUMENT_STATES_FILE: &str = "document_states.json";

/// Check if a path has a supported image extension.
fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// On-disk layout of a table file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct TablesFile {
    #[serde(default)]
    tables: Vec<Table>,
}

/// Folder-backed storage for images and their tables.
#[derive(Debug, Clone)]
pub struct FolderBackend {
    folder: PathBuf,
}

impl FolderBackend {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    fn tables_dir(&self) -> PathBuf {
        self.folder.join(TABLES_DIR)
    }

    fn tables_path(&self, image_name: &str) -> PathBuf {
        self.tables_dir().join(format!("{}.json", image_name))
    }

    fn image_path(&self, image_name: &str) -> Result<PathBuf, PersistenceError> {
        let path = self.folder.join(image_name);
        if !path.is_file() {
            return Err(PersistenceError::ImageNotFound { path });
        }
        Ok(path)
    }

    fn load_document_states(&self) -> Result<BTreeMap<String, DocumentState>, PersistenceError> {
        let path = self.tables_dir().join(DOCUMENT_STATES_FILE);
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), PersistenceError> {
        std::fs::create_dir_all(self.tables_dir())?;
        let json = serde_json::to_string_pretty(value)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl Backend for FolderBackend {
    fn fetch_images(&mut self) -> Result<Vec<Image>, PersistenceError> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.folder)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_image_file(path))
            .collect();
        // Sort by filename for consistent ordering
        paths.sort();

        let states = self.load_document_states()?;
        let mut images = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                log::warn!("Skipping image with non UTF-8 name: {:?}", path);
                continue;
            };
            let (width, height) = match image::image_dimensions(&path) {
                Ok(dimensions) => dimensions,
                Err(e) => {
                    log::warn!("Skipping unreadable image {:?}: {}", path, e);
                    continue;
                }
            };
            let mut image = Image::new(name, path.to_string_lossy(), width, height);
            if let Some(state) = states.get(name) {
                image.document_state = *state;
                image.finished = *state == DocumentState::Done;
            }
            images.push(image);
        }
        log::info!("Found {} images in {:?}", images.len(), self.folder);
        Ok(images)
    }

    fn fetch_tables(&mut self, image_name: &str) -> Result<Vec<Table>, PersistenceError> {
        self.image_path(image_name)?;
        let path = self.tables_path(image_name);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let json = std::fs::read_to_string(&path)?;
        let file: TablesFile = serde_json::from_str(&json)?;
        log::debug!("Loaded {} tables from {:?}", file.tables.len(), path);
        Ok(file.tables)
    }

    fn save_tables(&mut self, image_name: &str, tables: &[Table]) -> Result<(), PersistenceError> {
        self.image_path(image_name)?;
        let file = TablesFile {
            tables: tables.to_vec(),
        };
        self.write_json(&self.tables_path(image_name), &file)
    }

    fn save_document_state(
        &mut self,
        image_name: &str,
        state: DocumentState,
    ) -> Result<(), PersistenceError> {
        self.image_path(image_name)?;
        let mut states = self.load_document_states()?;
        states.insert(image_name.to_string(), state);
        self.write_json(&self.tables_dir().join(DOCUMENT_STATES_FILE), &states)
    }

    fn predict_table_structure(
        &mut self,
        _image_name: &str,
        _table: &Table,
    ) -> Result<Vec<f32>, PersistenceError> {
        Err(PersistenceError::Unsupported("table structure prediction"))
    }

    fn predict_table_contents(
        &mut self,
        _image_name: &str,
        _table: &Table,
    ) -> Result<Vec<Vec<Cell>>, PersistenceError> {
        Err(PersistenceError::Unsupported("table content prediction"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    /// Fresh folder with two small scans and a text file.
    fn scan_folder(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "table-annotator-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).expect("create folder");
        image::RgbImage::new(40, 30)
            .save(dir.join("b_page.png"))
            .expect("write png");
        image::RgbImage::new(20, 10)
            .save(dir.join("a_page.png"))
            .expect("write png");
        std::fs::write(dir.join("notes.txt"), "not an image").expect("write txt");
        dir
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("scan.PNG")));
        assert!(is_image_file(Path::new("dir/scan.tif")));
        assert!(!is_image_file(Path::new("scan.json")));
        assert!(!is_image_file(Path::new("scan")));
    }

    #[test]
    fn test_fetch_images_sorted_with_dimensions() {
        let dir = scan_folder("images");
        let mut backend = FolderBackend::new(&dir);
        let images = backend.fetch_images().expect("fetch");
        let names: Vec<_> = images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a_page.png", "b_page.png"]);
        assert_eq!((images[1].width, images[1].height), (40, 30));
        assert_eq!(images[1].center, Point::new(20.0, 15.0));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_fetch_images_skips_unreadable_file() {
        let dir = scan_folder("unreadable");
        std::fs::write(dir.join("c_page.png"), "not a png").expect("write bogus png");
        let mut backend = FolderBackend::new(&dir);
        let images = backend.fetch_images().expect("fetch");
        let names: Vec<_> = images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a_page.png", "b_page.png"]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_tables_roundtrip_through_folder() {
        let dir = scan_folder("tables");
        let mut backend = FolderBackend::new(&dir);
        assert!(backend.fetch_tables("a_page.png").expect("fetch").is_empty());

        let tables = vec![Table::new(Point::new(1.0, 1.0), Point::new(15.0, 9.0), 0.5)];
        backend.save_tables("a_page.png", &tables).expect("save");
        assert!(dir.join(".tables").join("a_page.png.json").is_file());
        assert_eq!(backend.fetch_tables("a_page.png").expect("fetch"), tables);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unknown_image_rejected() {
        let dir = scan_folder("unknown");
        let mut backend = FolderBackend::new(&dir);
        assert!(matches!(
            backend.save_tables("missing.png", &[]),
            Err(PersistenceError::ImageNotFound { .. })
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_document_states_persist() {
        let dir = scan_folder("states");
        let mut backend = FolderBackend::new(&dir);
        backend
            .save_document_state("b_page.png", DocumentState::Done)
            .expect("save");
        let images = backend.fetch_images().expect("fetch");
        assert_eq!(images[0].document_state, DocumentState::Todo);
        assert_eq!(images[1].document_state, DocumentState::Done);
        assert!(images[1].finished);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_predictions_unsupported() {
        let dir = scan_folder("predict");
        let mut backend = FolderBackend::new(&dir);
        let table = Table::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0), 0.0);
        assert!(matches!(
            backend.predict_table_structure("a_page.png", &table),
            Err(PersistenceError::Unsupported(_))
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
