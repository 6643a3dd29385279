use std::path::{Path, PathBuf};
use chrono::Duration;
use tracing::info;

#[derive(Debug)]
pub struct VitrineConfig {
    pub workdir: PathBuf,
    pub db_path: PathBuf,
    pub listen_addr: String,
    /// Heartbeat age past which an online device is reported unresponsive.
    pub heartbeat_timeout: Duration,
}

impl VitrineConfig {
    pub fn new(workdir: &str, listen_addr: String, heartbeat_timeout: std::time::Duration) -> anyhow::Result<Self> {
        let workdir = Self::get_or_create_workdir(workdir)?;
        let db_path = Self::get_or_create_db_path(&workdir)?;
        let heartbeat_timeout = Duration::from_std(heartbeat_timeout)
            .map_err(|_| anyhow::anyhow!("heartbeat timeout is out of range"))?;
        Ok(Self { workdir, db_path, listen_addr, heartbeat_timeout })
    }

    fn get_or_create_workdir(workdir: &str) -> anyhow::Result<PathBuf> {
        let workdir = Path::new(workdir);
        if !workdir.exists() {
            std::fs::create_dir_all(workdir)?;
        }
        if !workdir.is_dir() {
            anyhow::bail!("workdir is not a directory");
        }
        let workdir = workdir.canonicalize()?;
        info!("workdir: {}", workdir.display());
        Ok(workdir)
    }

    fn get_or_create_db_path(workdir: &Path) -> anyhow::Result<PathBuf> {
        let db_path = workdir.join("vitrine.db.json");
        if !db_path.exists() {
            std::fs::write(&db_path, "")?;
        }
        if !db_path.is_file() {
            anyhow::bail!("db_path is not a file");
        }
        info!("db_path: {}", db_path.display());
        Ok(db_path)
    }
}
