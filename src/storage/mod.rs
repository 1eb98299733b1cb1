// src/storage/mod.rs
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use serde::de::DeserializeOwned;
use crate::analysis::Summary;
use crate::gradcafe::models::{NormalizedRecord, RawEntry};
use crate::pipeline::RunStats;
use crate::utils::error::StorageError;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Reads raw listing entries, one JSON object per line
    pub fn load_raw_entries<P: AsRef<Path>>(path: P) -> Result<Vec<RawEntry>, StorageError> {
        read_json_lines(path.as_ref())
    }

    /// Reads cleaned records back from a JSON-lines file
    pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<NormalizedRecord>, StorageError> {
        read_json_lines(path.as_ref())
    }

    /// Writes cleaned records as JSON lines
    pub fn save_records(&self, records: &[NormalizedRecord], filename: &str) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(filename);

        let file = fs::File::create(&file_path)
            .map_err(StorageError::IoError)?;
        let mut writer = BufWriter::new(file);

        for record in records {
            serde_json::to_writer(&mut writer, record)
                .map_err(|e| StorageError::SerializationError(e.to_string()))?;
            writer.write_all(b"\n")
                .map_err(StorageError::IoError)?;
        }
        writer.flush().map_err(StorageError::IoError)?;

        tracing::info!("Saved {} records to {}", records.len(), file_path.display());

        Ok(file_path)
    }

    /// Saves metadata about the run in JSON format, next to the records file
    pub fn save_run_metadata(&self, stats: &RunStats, records_file: &str, input: &Path) -> Result<PathBuf, StorageError> {
        let stem = Path::new(records_file)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("applicant_data");
        let file_path = self.base_dir.join(format!("{}_meta.json", stem));

        let metadata = serde_json::json!({
            "input": input.display().to_string(),
            "records_file": records_file,
            "stats": stats,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        write_pretty_json(&file_path, &metadata)?;
        tracing::info!("Saved metadata to {}", file_path.display());

        Ok(file_path)
    }

    /// Saves the aggregate summary as pretty JSON
    pub fn save_summary(&self, summary: &Summary) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join("summary.json");
        write_pretty_json(&file_path, summary)?;
        tracing::info!("Saved summary to {}", file_path.display());
        Ok(file_path)
    }
}

fn write_pretty_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| StorageError::SerializationError(e.to_string()))?;
    fs::write(path, json).map_err(StorageError::IoError)
}

fn read_json_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StorageError> {
    let file = fs::File::open(path).map_err(StorageError::IoError)?;
    let reader = BufReader::new(file);
    let mut items = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(StorageError::IoError)?;
        let line = line.trim();
        if line.is_empty() {
            continue; // Ignore blank lines
        }

        let item = serde_json::from_str(line).map_err(|e| StorageError::MalformedLine {
            path: path.display().to_string(),
            line: index + 1,
            message: e.to_string(),
        })?;
        items.push(item);
    }

    tracing::debug!("Read {} lines from {}", items.len(), path.display());
    Ok(items)
}
