use anyhow::Context;
use onboard_core::{config::Config, io, paths};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing onboarding in: {}", root.display());

    let dir = paths::onboard_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let config = if paths::is_initialized(root) {
        println!("  exists:  {}", paths::CONFIG_FILE);
        Config::load(root).context("failed to load config.yaml")?
    } else {
        let cfg = Config::new();
        cfg.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
        cfg
    };

    let db_entry = format!("{}/{}", paths::ONBOARD_DIR, config.handoff.db_file);
    io::ensure_gitignore_entry(root, &db_entry).context("failed to update .gitignore")?;

    Ok(())
}
