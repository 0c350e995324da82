//! Artifact writers (spec §4.7). JSONL writers are single-writer-per-file,
//! append-only, `tokio::fs`-based — grounded in `riptide-persistence`'s
//! adapter pattern, simplified down to one small writer per output kind
//! rather than the teacher's full Postgres/Redis adapters (out of scope
//! here). CSV and Parquet are optional, feature-equal alternatives for
//! `items_valid` only, never the sole implementation of an artifact.

use arrow::array::StringArray;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::file::properties::WriterProperties;
use scrapcore_types::{ErrorKind, Item, ItemsFormat, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Append-only JSONL writer: one JSON value per line, UTF-8,
/// newline-terminated (spec §4.7).
pub struct JsonlWriter {
    file: Mutex<File>,
}

impl JsonlWriter {
    pub async fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(ErrorKind::Io)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(ErrorKind::Io)?;
        Ok(Self { file: Mutex::new(file) })
    }

    pub async fn write<T: Serialize>(&self, value: &T) -> Result<()> {
        let mut line = serde_json::to_string(value).map_err(ErrorKind::Json)?;
        line.push('\n');
        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await.map_err(ErrorKind::Io)?;
        Ok(())
    }
}

/// Plain-text, timestamped line log (`run.log` / `source.log`).
pub struct LineLogWriter {
    file: Mutex<File>,
}

impl LineLogWriter {
    pub async fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(ErrorKind::Io)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(ErrorKind::Io)?;
        Ok(Self { file: Mutex::new(file) })
    }

    pub async fn log(&self, line: &str) -> Result<()> {
        let entry = format!("{} {}\n", chrono::Utc::now().to_rfc3339(), line);
        let mut file = self.file.lock().await;
        file.write_all(entry.as_bytes()).await.map_err(ErrorKind::Io)?;
        Ok(())
    }
}

/// CSV writer for `items_valid`. Writes the header once, on first use.
pub struct CsvItemWriter {
    file: Mutex<File>,
    header_written: std::sync::atomic::AtomicBool,
}

impl CsvItemWriter {
    pub async fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(ErrorKind::Io)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(ErrorKind::Io)?;
        Ok(Self {
            file: Mutex::new(file),
            header_written: std::sync::atomic::AtomicBool::new(false),
        })
    }

    pub async fn write(&self, item: &Item) -> Result<()> {
        let mut buf = Vec::new();
        {
            let mut csv_writer = csv::WriterBuilder::new().has_headers(false).from_writer(&mut buf);
            csv_writer
                .write_record([&item.url, item.title.as_deref().unwrap_or(""), &item.text])
                .map_err(|e| ErrorKind::Persist(format!("csv encode failed: {e}")))?;
            csv_writer
                .flush()
                .map_err(|e| ErrorKind::Persist(format!("csv flush failed: {e}")))?;
        }

        let mut file = self.file.lock().await;
        if !self.header_written.swap(true, std::sync::atomic::Ordering::SeqCst) {
            file.write_all(b"url,title,text\n").await.map_err(ErrorKind::Io)?;
        }
        file.write_all(&buf).await.map_err(ErrorKind::Io)?;
        Ok(())
    }
}

/// Parquet writer for `items_valid`. Parquet's columnar layout isn't
/// append-friendly the way JSONL/CSV are, so items are buffered in memory
/// for the run and the file is written once, on `finalize`.
pub struct ParquetItemWriter {
    path: PathBuf,
    buffer: Mutex<Vec<Item>>,
}

impl ParquetItemWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            buffer: Mutex::new(Vec::new()),
        }
    }

    pub async fn write(&self, item: &Item) -> Result<()> {
        self.buffer.lock().await.push(item.clone());
        Ok(())
    }

    pub async fn finalize(&self) -> Result<()> {
        let items = self.buffer.lock().await;
        if items.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(ErrorKind::Io)?;
        }

        let schema = Arc::new(Schema::new(vec![
            Field::new("url", DataType::Utf8, false),
            Field::new("title", DataType::Utf8, true),
            Field::new("text", DataType::Utf8, false),
        ]));

        let urls: Vec<&str> = items.iter().map(|i| i.url.as_str()).collect();
        let titles: Vec<Option<&str>> = items.iter().map(|i| i.title.as_deref()).collect();
        let texts: Vec<&str> = items.iter().map(|i| i.text.as_str()).collect();

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(urls)),
                Arc::new(StringArray::from(titles)),
                Arc::new(StringArray::from(texts)),
            ],
        )
        .map_err(|e| ErrorKind::Persist(format!("parquet batch construction failed: {e}")))?;

        let path = self.path.clone();
        let props = WriterProperties::builder().build();
        tokio::task::spawn_blocking(move || -> std::result::Result<(), String> {
            let file = std::fs::File::create(&path).map_err(|e| e.to_string())?;
            let mut writer = ArrowWriter::try_new(file, schema, Some(props)).map_err(|e| e.to_string())?;
            writer.write(&batch).map_err(|e| e.to_string())?;
            writer.close().map_err(|e| e.to_string())?;
            Ok(())
        })
        .await
        .map_err(|e| ErrorKind::Persist(format!("parquet writer task panicked: {e}")))?
        .map_err(ErrorKind::Persist)?;

        Ok(())
    }
}

/// `items_valid` writer, format-selected by `storage.items_format`.
pub enum ItemsWriter {
    Jsonl(JsonlWriter),
    Csv(CsvItemWriter),
    Parquet(ParquetItemWriter),
}

impl ItemsWriter {
    pub async fn create(stem: impl AsRef<Path>, format: ItemsFormat) -> Result<Self> {
        let stem = stem.as_ref();
        Ok(match format {
            ItemsFormat::Jsonl => {
                Self::Jsonl(JsonlWriter::create(stem.with_extension("jsonl")).await?)
            }
            ItemsFormat::Csv => Self::Csv(CsvItemWriter::create(stem.with_extension("csv")).await?),
            ItemsFormat::Parquet => {
                if let Some(parent) = stem.parent() {
                    fs::create_dir_all(parent).await.map_err(ErrorKind::Io)?;
                }
                Self::Parquet(ParquetItemWriter::new(stem.with_extension("parquet")))
            }
        })
    }

    pub async fn write(&self, item: &Item) -> Result<()> {
        match self {
            ItemsWriter::Jsonl(w) => w.write(item).await,
            ItemsWriter::Csv(w) => w.write(item).await,
            ItemsWriter::Parquet(w) => w.write(item).await,
        }
    }

    pub async fn finalize(&self) -> Result<()> {
        if let ItemsWriter::Parquet(w) = self {
            w.finalize().await
        } else {
            Ok(())
        }
    }
}
