use crate::cmd::load_answers;
use crate::output::{print_fields, print_json};
use anyhow::Context;
use onboard_core::config::Config;
use onboard_core::consistency::{ConsistencyReport, ConsistencyValidator};
use onboard_core::metrics::{DerivedMetrics, MetricsEstimator};
use std::path::Path;

pub fn run(root: &Path, file: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let answers = load_answers(file)?;

    let metrics = MetricsEstimator::estimate(&answers);
    let consistency =
        ConsistencyValidator::new(config.estimator.consistency_tolerance).check(&answers);

    if json {
        return print_json(&serde_json::json!({
            "metrics": metrics,
            "consistency": consistency,
        }));
    }
    print_metrics(&metrics, consistency.as_ref());
    Ok(())
}

/// Text rendering shared with `report`. Sections without data are skipped.
pub fn print_metrics(metrics: &DerivedMetrics, consistency: Option<&ConsistencyReport>) {
    let mut fields = Vec::new();
    if let Some(bmi) = &metrics.bmi {
        fields.push(("IMC", format!("{:.1} ({})", bmi.value, bmi.class)));
    }
    if let Some(kcal) = metrics.daily_calories {
        fields.push(("Calorias/dia", format!("{kcal} kcal")));
    }
    if let Some(liters) = metrics.daily_water_liters {
        fields.push(("Água/dia", format!("{liters:.1} L")));
    }
    if let Some(t) = &metrics.transformation {
        fields.push((
            "Gordura corporal",
            format!("{} -> {}", t.body_fat.current, t.body_fat.future),
        ));
        if let Some(age) = &t.fitness_age {
            fields.push((
                "Idade fitness",
                format!("{} -> {} anos", age.current, age.future),
            ));
        }
        fields.push((
            "Músculos",
            format!("{}/5 -> {}/5", t.muscle_level.current, t.muscle_level.future),
        ));
    }

    if fields.is_empty() {
        println!("Not enough answers to estimate anything.");
    } else {
        print_fields(&fields);
    }
    if let Some(note) = consistency.and_then(ConsistencyReport::note) {
        println!("\n{note}");
    }
}
