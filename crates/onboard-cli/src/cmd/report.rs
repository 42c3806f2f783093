use crate::cmd::estimate::print_metrics;
use crate::cmd::load_answers;
use crate::output::{print_fields, print_json};
use anyhow::Context;
use onboard_core::config::Config;
use onboard_core::consistency::ConsistencyValidator;
use onboard_core::report::ConfirmationReport;
use onboard_core::store::{HandoffStore, RedbHandoffStore};
use onboard_core::OnboardError;
use std::path::Path;

pub fn run(root: &Path, file: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let answers = match file {
        Some(path) => load_answers(path)?,
        None => {
            let store = RedbHandoffStore::open(&config.handoff_db_path(root))
                .context("failed to open hand-off store")?;
            let data = store.load()?.ok_or(OnboardError::NoHandoffRecord)?.data;
            data.validate().context("invalid answers in hand-off record")?;
            data
        }
    };

    let validator = ConsistencyValidator::new(config.estimator.consistency_tolerance);
    let today = chrono::Local::now().date_naive();
    let report = ConfirmationReport::build(&answers, &validator, today);

    if json {
        return print_json(&report);
    }

    match (&report.nome, &report.data_nascimento) {
        (Some(nome), Some(date)) => println!("{nome} ({date})"),
        (Some(nome), None) => println!("{nome}"),
        _ => {}
    }
    let rows: Vec<(&str, String)> = report
        .summary
        .iter()
        .map(|r| (r.label, r.value.clone()))
        .collect();
    print_fields(&rows);
    println!();
    print_metrics(&report.metrics, report.consistency.as_ref());
    Ok(())
}
