use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::ProjectDirs;

pub const ITEMS_PER_PAGE: u32 = 25;
pub const DEFAULT_AUTO_REFETCH_SECS: u64 = 30;
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Per-view settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListViewConfig {
    /// Fixed rows per page. The pagination UI offers no size changer.
    pub page_size: u32,
    /// Seconds between automatic refetches. `None` disables the toggle.
    pub auto_refetch: Option<u64>,
}

impl Default for ListViewConfig {
    fn default() -> Self {
        Self {
            page_size: ITEMS_PER_PAGE,
            auto_refetch: None,
        }
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("com", "hellhbbd", "listview")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))?;
    Ok(project_dirs.data_local_dir().join("listview.sqlite"))
}
