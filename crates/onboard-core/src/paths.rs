use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const ONBOARD_DIR: &str = ".onboard";
pub const CONFIG_FILE: &str = ".onboard/config.yaml";

/// Default file name of the hand-off database, relative to [`ONBOARD_DIR`].
pub const HANDOFF_DB_FILE: &str = "handoff.redb";

/// Key under which the finished answer set waits for the signup step.
pub const HANDOFF_KEY: &str = "onboardingData";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn onboard_dir(root: &Path) -> PathBuf {
    root.join(ONBOARD_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn handoff_db_path(root: &Path, file_name: &str) -> PathBuf {
    onboard_dir(root).join(file_name)
}

pub fn is_initialized(root: &Path) -> bool {
    config_path(root).exists()
}
