pub mod config;
pub mod estimate;
pub mod handoff;
pub mod init;
pub mod report;
pub mod steps;
pub mod walk;

use anyhow::Context;
use onboard_core::answers::OnboardingAnswers;
use std::path::Path;

/// Read and check an answer file.
pub fn load_answers(path: &Path) -> anyhow::Result<OnboardingAnswers> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let answers: OnboardingAnswers = serde_yaml::from_str(&data)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    answers
        .validate()
        .with_context(|| format!("invalid answers in {}", path.display()))?;
    Ok(answers)
}
