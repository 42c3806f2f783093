use crate::cmd::load_answers;
use crate::output::{print_json, print_table};
use anyhow::Context;
use onboard_core::answers::OnboardingAnswers;
use onboard_core::config::Config;
use onboard_core::feedback::{self, Feedback};
use onboard_core::flow::{Answer, StepFlowController};
use onboard_core::steps::StepId;
use onboard_core::store::{OnboardingStore, RedbHandoffStore};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct Transition {
    position: usize,
    step: StepId,
    legacy: &'static str,
    progress: f64,
    /// "auto" for a fired selection ticket, "continue" for an explicit press.
    via: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    feedback: Option<Feedback>,
}

/// Turn a finished answer record into the inputs a user would give, grouped
/// by the screen they belong to and in screen order.
fn script(answers: &OnboardingAnswers) -> Vec<Answer> {
    let mut out = Vec::new();
    out.extend(answers.age_band().map(Answer::AgeBand));
    out.extend(answers.sexo.map(Answer::Sex));
    out.extend(answers.tipo_corpo.map(Answer::BodyType));
    out.extend(answers.altura.map(Answer::Height));
    out.extend(answers.peso_atual.map(Answer::Weight));
    out.extend(answers.agua_diaria.map(Answer::WaterIntake));
    out.extend(answers.objetivo.map(Answer::Objective));
    out.extend(answers.experiencia.map(Answer::Experience));
    out.extend(answers.frequencia_semanal.map(Answer::Frequency));
    out.extend(answers.tempo_disponivel.map(Answer::SessionDuration));
    out.extend(answers.local_treino.map(Answer::Location));
    out.extend(
        answers
            .problemas_anteriores
            .iter()
            .cloned()
            .map(Answer::PriorObstacle),
    );
    out.extend(
        answers
            .objetivos_adicionais
            .iter()
            .cloned()
            .map(Answer::AdditionalGoal),
    );
    out.extend(answers.lesoes.iter().cloned().map(Answer::Injury));
    out.extend(answers.nome.clone().map(Answer::Name));
    out.extend(answers.data_nascimento.clone().map(Answer::BirthDate));
    out
}

fn feedback_for(c: &StepFlowController) -> Option<Feedback> {
    let a = c.answers();
    match c.current() {
        StepId::WaterFeedback => a.agua_diaria.and_then(feedback::water),
        StepId::ExperienceFeedback => a.experiencia.and_then(feedback::experience),
        _ => None,
    }
}

fn record(c: &StepFlowController, via: &'static str) -> Transition {
    let step = c.current();
    Transition {
        position: c.position(),
        step,
        legacy: step.def().legacy,
        progress: c.progress_percent(),
        via,
        feedback: feedback_for(c),
    }
}

pub fn run(
    root: &Path,
    file: &Path,
    finalize: bool,
    realtime: bool,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let input = load_answers(file)?;

    let mut c = StepFlowController::new(OnboardingStore::new(), config.flow.clone());
    let mut pending = script(&input).into_iter().peekable();
    let mut transitions = Vec::new();

    c.advance()?;
    transitions.push(record(&c, "continue"));

    while !c.current().is_terminal() {
        let step = c.current();
        let mut moved = false;
        while let Some(answer) = pending.next_if(|a| a.step() == step) {
            if let Some(ticket) = c.answer(answer)? {
                if realtime {
                    std::thread::sleep(ticket.delay);
                }
                moved = c.fire(ticket)?.is_some();
            }
        }
        if moved {
            transitions.push(record(&c, "auto"));
            continue;
        }
        c.advance()
            .with_context(|| format!("walk stopped at step {step} ({})", step.def().legacy))?;
        transitions.push(record(&c, "continue"));
    }
    for answer in pending {
        c.answer(answer)?;
    }
    let blocker = c.blocker();

    let record = if finalize {
        let store = RedbHandoffStore::open(&config.handoff_db_path(root))
            .context("failed to open hand-off store")?;
        Some(c.finalize(&store).context("failed to finalize onboarding")?)
    } else {
        None
    };

    if json {
        return print_json(&serde_json::json!({
            "session": c.session(),
            "transitions": transitions,
            "finalized": record.is_some(),
            "blocker": blocker,
            "record": record,
        }));
    }

    let rows = transitions
        .iter()
        .map(|t| {
            vec![
                t.position.to_string(),
                t.legacy.to_string(),
                t.step.to_string(),
                t.via.to_string(),
                format!("{:.0}%", t.progress),
            ]
        })
        .collect();
    print_table(&["POS", "LEGACY", "STEP", "VIA", "PROGRESS"], rows);

    for t in &transitions {
        if let Some(f) = &t.feedback {
            println!("\n[{}] {}\n  {}\n  {}", t.step, f.title, f.message, f.recommendation);
        }
    }

    println!();
    match (&record, blocker) {
        (Some(r), _) => println!("Finalized session {}: answers saved for signup.", r.session),
        (None, Some(reason)) => println!("Reached the last step; still missing: {reason}"),
        (None, None) => println!("Reached the last step. Run with --finalize to save the answers."),
    }
    Ok(())
}
