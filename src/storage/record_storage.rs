use std::{
    future::Future,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Result;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
};
use tracing::{debug, warn};
use uuid::Uuid;

use super::entities::WeightEntity;

const RECORD_FILE_NAME: &str = "weights.jsonl";
const TEMPORARY_FILE_NAME: &str = "weights.jsonl.tmp";
const LOCK_FILE_NAME: &str = "weights.lock";

/// Interface for abstracting storage of weight records.
pub trait RecordStorage {
    /// Adds records to the end of the store.
    fn append(&self, entities: Vec<WeightEntity>) -> impl Future<Output = Result<()>>;

    /// Retrieves every readable record in the order they were written. Unreadable lines are
    /// reported and left in the file.
    fn get_all(&self) -> impl Future<Output = Result<Vec<WeightEntity>>> + Send;

    /// Overwrites the whole store, unreadable lines included.
    fn replace_all(&self, entities: Vec<WeightEntity>) -> impl Future<Output = Result<()>>;

    /// Deletes a record. Returns whether anything was removed.
    fn remove(&self, id: Uuid) -> impl Future<Output = Result<bool>>;
}

/// A line of the record file. Lines that can't be read are carried through rewrites as they are.
#[derive(Debug)]
enum StoredLine {
    Record(WeightEntity),
    Unreadable(Vec<u8>),
}

/// The main realization of [RecordStorage]. Records are kept as JSON lines in a single file.
///
/// Every access holds a lock on a separate lock file, so the record file itself can be replaced
/// by a rename.
pub struct RecordStorageImpl {
    path: PathBuf,
    temporary_path: PathBuf,
    lock_path: PathBuf,
}

impl RecordStorageImpl {
    pub fn new(record_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&record_dir)?;

        Ok(Self {
            path: record_dir.join(RECORD_FILE_NAME),
            temporary_path: record_dir.join(TEMPORARY_FILE_NAME),
            lock_path: record_dir.join(LOCK_FILE_NAME),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn open_lock(&self) -> std::io::Result<File> {
        File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)
            .await
    }

    /// Reads every non-blank line. A missing file is an empty store.
    async fn read_lines(path: &Path) -> std::io::Result<Vec<StoredLine>> {
        let file = match File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e),
        };
        let mut segments = BufReader::new(file).split(b'\n');
        let mut lines = vec![];
        while let Some(segment) = segments.next_segment().await? {
            if let Some(line) = parse_line(path, segment) {
                lines.push(line);
            }
        }
        Ok(lines)
    }

    async fn get_all_inner(&self) -> Result<Vec<WeightEntity>> {
        debug!("Extracting {:?}", self.path);
        let lock = self.open_lock().await?;
        lock.lock_shared()?;
        let lines = Self::read_lines(&self.path).await;
        lock.unlock_async().await?;

        Ok(lines?
            .into_iter()
            .filter_map(|v| match v {
                StoredLine::Record(entity) => Some(entity),
                StoredLine::Unreadable(_) => None,
            })
            .collect())
    }

    /// Read-modify-write of the whole file under an exclusive lock.
    async fn rewrite_with<T>(
        &self,
        update: impl FnOnce(Vec<StoredLine>) -> (Vec<StoredLine>, T),
    ) -> Result<T> {
        let lock = self.open_lock().await?;

        // Semi-safe acquire-release for a file
        lock.lock_exclusive()?;
        let result = self.rewrite_locked(update).await;
        lock.unlock_async().await?;
        result
    }

    /// Writes the new content next to the record file and renames it over, an interrupted
    /// rewrite leaves the old file intact.
    async fn rewrite_locked<T>(
        &self,
        update: impl FnOnce(Vec<StoredLine>) -> (Vec<StoredLine>, T),
    ) -> Result<T> {
        let current = Self::read_lines(&self.path).await?;
        let (updated, result) = update(current);

        let mut buffer = Vec::<u8>::new();
        for line in &updated {
            match line {
                StoredLine::Record(entity) => serde_json::to_writer(&mut buffer, entity)?,
                StoredLine::Unreadable(raw) => buffer.extend_from_slice(raw),
            }
            buffer.push(b'\n');
        }

        let mut file = File::create(&self.temporary_path).await?;
        file.write_all(&buffer).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&self.temporary_path, &self.path).await?;
        Ok(result)
    }
}

impl RecordStorage for RecordStorageImpl {
    async fn append(&self, entities: Vec<WeightEntity>) -> Result<()> {
        let buffer = to_lines(&entities)?;
        let lock = self.open_lock().await?;

        lock.lock_exclusive()?;
        let result = async {
            let mut file = File::options()
                .append(true)
                .create(true)
                .open(&self.path)
                .await?;
            file.write_all(&buffer).await?;
            file.flush().await
        }
        .await;
        lock.unlock_async().await?;
        Ok(result?)
    }

    async fn get_all(&self) -> Result<Vec<WeightEntity>> {
        self.get_all_inner().await
    }

    async fn replace_all(&self, entities: Vec<WeightEntity>) -> Result<()> {
        self.rewrite_with(|_| (entities.into_iter().map(StoredLine::Record).collect(), ()))
            .await
    }

    async fn remove(&self, id: Uuid) -> Result<bool> {
        self.rewrite_with(|mut lines| {
            let before = lines.len();
            lines.retain(|v| !matches!(v, StoredLine::Record(entity) if entity.id == id));
            let removed = lines.len() != before;
            (lines, removed)
        })
        .await
    }
}

fn parse_line(path: &Path, segment: Vec<u8>) -> Option<StoredLine> {
    if segment.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    let line = match String::from_utf8(segment) {
        Ok(line) => line,
        Err(e) => {
            warn!("During reading in path {path:?} found a line that isn't UTF-8: {e}");
            return Some(StoredLine::Unreadable(e.into_bytes()));
        }
    };
    match serde_json::from_str::<WeightEntity>(&line) {
        Ok(v) => Some(StoredLine::Record(v)),
        Err(e) => {
            // ignore illegal values. Might happen after an interrupted append
            warn!(
                "During parsing in path {:?} found illegal json string {}:  {e}",
                path, line
            );
            Some(StoredLine::Unreadable(line.into_bytes()))
        }
    }
}

fn to_lines(entities: &[WeightEntity]) -> Result<Vec<u8>> {
    let mut buffer = Vec::<u8>::new();
    for entity in entities {
        serde_json::to_writer(&mut buffer, entity)?;
        buffer.push(b'\n');
    }
    Ok(buffer)
}
