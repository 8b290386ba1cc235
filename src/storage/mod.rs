// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};
use crate::extractors::{ExtractOptions, ListingRecord, LISTING_HEADERS};
use crate::utils::error::StorageError;

pub struct StorageManager {
    base_dir: PathBuf,
    delimiter: u8,
}

impl StorageManager {
    /// Creates a new StorageManager writing into `base_dir` with the given field delimiter
    pub fn new<P: AsRef<Path>>(base_dir: P, delimiter: u8) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path, delimiter })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Writes the listings table. The header row is always written, so an
    /// empty `records` slice still produces a well-formed file.
    pub fn save_listings(&self, file_name: &str, records: &[ListingRecord]) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(file_name);

        // Header is written by hand; serde only emits it once a row exists
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .from_path(&file_path)?;

        writer.write_record(LISTING_HEADERS)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        tracing::info!("Saved {} listings to {}", records.len(), file_path.display());

        Ok(file_path)
    }

    /// Saves metadata about the run in JSON format, next to the table
    pub fn save_listings_metadata(
        &self,
        file_name: &str,
        source: &Path,
        records: &[ListingRecord],
        options: &ExtractOptions,
    ) -> Result<PathBuf, StorageError> {
        let stem = Path::new(file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.to_string());
        let file_path = self.base_dir.join(format!("{}_meta.json", stem));

        // Count sentinel cells per column
        let mut missing = serde_json::Map::new();
        for (column, header) in LISTING_HEADERS.iter().enumerate() {
            let count = records
                .iter()
                .filter(|record| record.cells()[column] == options.sentinel)
                .count();
            missing.insert(header.to_string(), serde_json::json!(count));
        }

        let metadata = serde_json::json!({
            "source": source.display().to_string(),
            "output_file": file_name,
            "record_count": records.len(),
            "unavailable_counts": missing,
            "sentinel": options.sentinel,
            "missing_details": options.missing_details,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str)
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());

        Ok(file_path)
    }
}
