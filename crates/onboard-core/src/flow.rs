//! The step-flow controller.
//!
//! The controller owns the current step, the transient answer store, and a
//! generation counter. Every step change bumps the generation, so an
//! [`AutoAdvance`] ticket handed out for a selection becomes stale the moment
//! the user navigates away; firing a stale ticket is a no-op. The caller
//! owns the clock: it waits `ticket.delay` and then calls [`fire`].
//!
//! [`fire`]: StepFlowController::fire

use crate::answers::OnboardingAnswers;
use crate::config::FlowConfig;
use crate::error::{OnboardError, Result};
use crate::steps::{StepDef, StepId, StepKind, TOTAL_STEPS};
use crate::store::{HandoffRecord, HandoffStore, OnboardingStore};
use crate::types::{
    AgeBand, BodyType, Experience, Objective, SessionDuration, Sex, TrainingLocation, WaterIntake,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Answer
// ---------------------------------------------------------------------------

/// One user input, tagged with the screen it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", content = "value", rename_all = "snake_case")]
pub enum Answer {
    AgeBand(AgeBand),
    Sex(Sex),
    BodyType(BodyType),
    Height(f64),
    Weight(f64),
    WaterIntake(WaterIntake),
    Objective(Objective),
    Experience(Experience),
    Frequency(u8),
    SessionDuration(SessionDuration),
    Location(TrainingLocation),
    /// Toggles one prior-obstacle option.
    PriorObstacle(String),
    /// Toggles one additional-goal option.
    AdditionalGoal(String),
    /// Toggles one injury option; "Nenhuma" clears them all.
    Injury(String),
    Name(String),
    /// Raw keystrokes, masked to DD/MM/AAAA.
    BirthDate(String),
}

impl Answer {
    pub fn step(&self) -> StepId {
        match self {
            Answer::AgeBand(_) => StepId::AgeBand,
            Answer::Sex(_) => StepId::Sex,
            Answer::BodyType(_) => StepId::BodyType,
            Answer::Height(_) => StepId::Height,
            Answer::Weight(_) => StepId::Weight,
            Answer::WaterIntake(_) => StepId::WaterIntake,
            Answer::Objective(_) => StepId::Objective,
            Answer::Experience(_) => StepId::Experience,
            Answer::Frequency(_) => StepId::Frequency,
            Answer::SessionDuration(_) => StepId::SessionDuration,
            Answer::Location(_) => StepId::Location,
            Answer::PriorObstacle(_) => StepId::PriorObstacles,
            Answer::AdditionalGoal(_) => StepId::AdditionalGoals,
            Answer::Injury(_) => StepId::Injuries,
            Answer::Name(_) => StepId::Name,
            Answer::BirthDate(_) => StepId::BirthDate,
        }
    }

    fn apply(&self, answers: &mut OnboardingAnswers) -> Result<()> {
        match self {
            Answer::AgeBand(band) => answers.set_age_band(*band),
            Answer::Sex(sex) => {
                if answers.set_sex(*sex) {
                    debug!(sex = %sex, "cleared body type not offered for new sex");
                }
            }
            Answer::BodyType(bt) => answers.set_body_type(*bt)?,
            Answer::Height(cm) => answers.set_height(*cm)?,
            Answer::Weight(kg) => answers.set_weight(*kg)?,
            Answer::WaterIntake(w) => answers.set_water(*w),
            Answer::Objective(o) => answers.set_objective(*o),
            Answer::Experience(e) => answers.set_experience(*e),
            Answer::Frequency(f) => answers.set_frequency(*f)?,
            Answer::SessionDuration(d) => answers.set_duration(*d),
            Answer::Location(l) => answers.set_location(*l),
            Answer::PriorObstacle(o) => answers.toggle_obstacle(o)?,
            Answer::AdditionalGoal(g) => answers.toggle_goal(g)?,
            Answer::Injury(i) => answers.toggle_injury(i)?,
            Answer::Name(n) => answers.set_name(n),
            Answer::BirthDate(raw) => answers.input_birth_date(raw),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AutoAdvance
// ---------------------------------------------------------------------------

/// A scheduled advance issued after a single-choice selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoAdvance {
    pub from: StepId,
    pub delay: Duration,
    generation: u64,
}

// ---------------------------------------------------------------------------
// StepFlowController
// ---------------------------------------------------------------------------

pub struct StepFlowController {
    store: OnboardingStore,
    current: StepId,
    generation: u64,
    timing: FlowConfig,
    finalized: bool,
}

impl StepFlowController {
    pub fn new(store: OnboardingStore, timing: FlowConfig) -> Self {
        Self {
            store,
            current: StepId::Landing,
            generation: 0,
            timing,
            finalized: false,
        }
    }

    pub fn session(&self) -> Uuid {
        self.store.session()
    }

    pub fn current(&self) -> StepId {
        self.current
    }

    pub fn current_def(&self) -> &'static StepDef {
        self.current.def()
    }

    pub fn answers(&self) -> &OnboardingAnswers {
        self.store.answers()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn position(&self) -> usize {
        self.current.position()
    }

    pub fn progress_percent(&self) -> f64 {
        self.position() as f64 / TOTAL_STEPS as f64 * 100.0
    }

    /// Inline message explaining why Continue is disabled, if it is.
    pub fn blocker(&self) -> Option<&'static str> {
        (self.current_def().blocker)(self.store.answers())
    }

    pub fn can_advance(&self) -> bool {
        self.blocker().is_none() && !self.current.is_terminal()
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Move to the next step. Also serves as "Continuar" and "Entendi".
    pub fn advance(&mut self) -> Result<StepId> {
        self.ensure_open()?;
        if let Some(reason) = self.blocker() {
            return Err(OnboardError::Incomplete {
                step: self.current,
                reason: reason.to_string(),
            });
        }
        let next = self
            .current
            .next()
            .ok_or(OnboardError::AtTerminal(self.current))?;
        self.move_to(next);
        Ok(next)
    }

    /// Move to the previous step. Answers are kept.
    pub fn retreat(&mut self) -> Result<StepId> {
        self.ensure_open()?;
        let prev = self.current.prev().ok_or(OnboardError::AtStart)?;
        self.move_to(prev);
        Ok(prev)
    }

    /// Drop any pending auto-advance, e.g. when the screen goes away.
    pub fn cancel_pending(&mut self) {
        self.generation += 1;
    }

    fn move_to(&mut self, step: StepId) {
        let from = self.current;
        self.current = step;
        self.generation += 1;
        debug!(
            session = %self.store.session(),
            from = %from,
            to = %step,
            position = step.position(),
            "step changed"
        );
    }

    fn ensure_open(&self) -> Result<()> {
        if self.finalized {
            Err(OnboardError::Finalized)
        } else {
            Ok(())
        }
    }

    // -----------------------------------------------------------------------
    // Answers and auto-advance
    // -----------------------------------------------------------------------

    /// Record an answer for the current step. Single-choice steps return a
    /// ticket; the caller waits for its delay and passes it to [`fire`].
    ///
    /// [`fire`]: Self::fire
    pub fn answer(&mut self, answer: Answer) -> Result<Option<AutoAdvance>> {
        self.ensure_open()?;
        if answer.step() != self.current {
            return Err(OnboardError::WrongStep(self.current));
        }
        answer.apply(self.store.answers_mut())?;

        let def = self.current_def();
        if !def.kind.auto_advances() {
            return Ok(None);
        }
        let into_interstitial = self
            .current
            .next()
            .is_some_and(|n| n.def().kind == StepKind::Interstitial);
        let delay = if into_interstitial {
            self.timing.feedback_delay()
        } else {
            self.timing.auto_advance_delay()
        };
        // A newer selection supersedes any ticket still waiting.
        self.generation += 1;
        Ok(Some(AutoAdvance {
            from: self.current,
            delay,
            generation: self.generation,
        }))
    }

    /// Execute a ticket. Returns `Ok(None)` when the ticket went stale.
    pub fn fire(&mut self, ticket: AutoAdvance) -> Result<Option<StepId>> {
        if self.finalized || ticket.generation != self.generation || ticket.from != self.current
        {
            debug!(
                session = %self.store.session(),
                from = %ticket.from,
                current = %self.current,
                "discarding stale auto-advance"
            );
            return Ok(None);
        }
        self.advance().map(Some)
    }

    // -----------------------------------------------------------------------
    // Finalize
    // -----------------------------------------------------------------------

    /// Hand the completed answer set to the durable slot. Only valid on the
    /// last step once it is complete; the transient store is emptied.
    pub fn finalize(&mut self, slot: &dyn HandoffStore) -> Result<HandoffRecord> {
        self.ensure_open()?;
        if !self.current.is_terminal() {
            return Err(OnboardError::NotFinished(self.current));
        }
        if let Some(reason) = self.blocker() {
            return Err(OnboardError::Incomplete {
                step: self.current,
                reason: reason.to_string(),
            });
        }
        let record = HandoffRecord::new(self.store.session(), self.store.answers().clone());
        slot.save(&record)?;
        self.store.take();
        self.finalized = true;
        self.generation += 1;
        info!(session = %record.session, "onboarding finalized");
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
