use crate::output::{print_json, print_table};
use onboard_core::steps::{definitions, Selection, StepKind, TOTAL_STEPS};

fn kind_label(kind: StepKind) -> &'static str {
    match kind {
        StepKind::Entry => "entry",
        StepKind::Question {
            selection: Selection::Single,
        } => "single",
        StepKind::Question {
            selection: Selection::Multiple,
        } => "multiple",
        StepKind::Interstitial => "interstitial",
        StepKind::Input => "input",
    }
}

pub fn run(json: bool) -> anyhow::Result<()> {
    if json {
        let steps: Vec<serde_json::Value> = definitions()
            .map(|d| {
                serde_json::json!({
                    "position": d.id.position(),
                    "id": d.id,
                    "legacy": d.legacy,
                    "kind": d.kind,
                    "title": d.title,
                    "auto_advance": d.kind.auto_advances(),
                })
            })
            .collect();
        return print_json(&serde_json::json!({
            "total_steps": TOTAL_STEPS,
            "steps": steps,
        }));
    }

    let rows = definitions()
        .map(|d| {
            vec![
                d.id.position().to_string(),
                d.legacy.to_string(),
                d.id.to_string(),
                kind_label(d.kind).to_string(),
                d.title.to_string(),
            ]
        })
        .collect();
    print_table(&["POS", "LEGACY", "STEP", "KIND", "TITLE"], rows);
    Ok(())
}
