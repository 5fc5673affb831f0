use message::ChainId;
use num_bigint::BigUint;
use parking_lot::Mutex;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Subdirectory of the user's home directory used when no checkpoint
/// directory is configured.
pub const DEFAULT_SUBDIR: &str = ".relayer/blockstore";

#[derive(Debug, Error)]
pub enum BlockstoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("corrupt checkpoint {path}: {contents:?}")]
    Corrupt { path: PathBuf, contents: String },
}

/// Sink for processed-block checkpoints.
pub trait Blockstorer: Send + Sync {
    fn store_block(&self, height: &BigUint) -> Result<(), BlockstoreError>;
}

/// Discards every checkpoint. For dry runs and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyStore;

impl Blockstorer for EmptyStore {
    fn store_block(&self, _height: &BigUint) -> Result<(), BlockstoreError> {
        Ok(())
    }
}

/// Durable record of the last fully processed block height for one
/// (operator, chain) pair.
///
/// The height lives in a plain-text file, `<operator>-<chain id>.block`,
/// holding its decimal digits and nothing else. Writes go through a temp
/// file plus atomic rename, so a reader sees either the previous checkpoint
/// or the new one, never a torn value.
#[derive(Debug)]
pub struct Blockstore {
    dir: PathBuf,
    full_path: PathBuf,
    // Serializes store_block calls on this instance. Other keys use other
    // instances and never contend.
    write_lock: Mutex<()>,
}

impl Blockstore {
    /// `dir` of `None` resolves to [`DEFAULT_SUBDIR`] under the user's home
    /// directory. The directory itself is created lazily on first store.
    pub fn new(dir: Option<PathBuf>, chain: ChainId, operator: &str) -> Result<Self, BlockstoreError> {
        let dir = match dir {
            Some(dir) => dir,
            None => default_dir()?,
        };
        let full_path = dir.join(format!("{operator}-{chain}.block"));
        Ok(Self {
            dir,
            full_path,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the checkpoint file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.full_path
    }

    /// Durably record `height` as the latest processed block.
    ///
    /// The value is written to a temp file, fsynced, read back and compared
    /// against what was written, and only then renamed over the checkpoint
    /// file. On any failure the previous checkpoint stays authoritative; the
    /// temp file may be left behind for diagnosis. No retries happen here,
    /// retry policy belongs to the caller.
    pub fn store_block(&self, height: &BigUint) -> Result<(), BlockstoreError> {
        let _guard = self.write_lock.lock();

        fs::create_dir_all(&self.dir)?;

        let tmp_path = self.tmp_path();
        let mut tmp = File::create(&tmp_path)?;
        tmp.write_all(height.to_string().as_bytes())?;
        tmp.sync_all()?;
        drop(tmp);

        let readback = fs::read_to_string(&tmp_path)?;
        match readback.parse::<BigUint>() {
            Ok(parsed) if parsed == *height => {}
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "checkpoint readback mismatch at {}: wrote {height}, found {readback:?}",
                        tmp_path.display()
                    ),
                )
                .into());
            }
        }

        fs::rename(&tmp_path, &self.full_path)?;
        debug!(path = %self.full_path.display(), %height, "stored checkpoint");
        Ok(())
    }

    /// Last successfully persisted height, or zero when no checkpoint file
    /// exists yet.
    ///
    /// An empty or non-numeric file reports [`BlockstoreError::Corrupt`]
    /// instead of defaulting to zero: resuming from an unknown point risks
    /// reprocessing or skipping real blocks.
    pub fn load_latest(&self) -> Result<BigUint, BlockstoreError> {
        let contents = match fs::read_to_string(&self.full_path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BigUint::default()),
            Err(err) => return Err(err.into()),
        };
        contents.parse::<BigUint>().map_err(|_| BlockstoreError::Corrupt {
            path: self.full_path.clone(),
            contents,
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut path = self.full_path.clone().into_os_string();
        path.push(".tmp");
        path.into()
    }
}

impl Blockstorer for Blockstore {
    fn store_block(&self, height: &BigUint) -> Result<(), BlockstoreError> {
        Blockstore::store_block(self, height)
    }
}

fn default_dir() -> Result<PathBuf, BlockstoreError> {
    let home = std::env::home_dir().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "home directory is not available")
    })?;
    Ok(home.join(DEFAULT_SUBDIR))
}
