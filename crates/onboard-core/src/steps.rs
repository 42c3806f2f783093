use crate::answers::OnboardingAnswers;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// StepId
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    Landing,
    AgeBand,
    Sex,
    BodyType,
    Height,
    Weight,
    WaterIntake,
    WaterFeedback,
    Objective,
    Experience,
    ExperienceFeedback,
    Frequency,
    SessionDuration,
    Location,
    PriorObstacles,
    AdditionalGoals,
    Injuries,
    Name,
    BirthDate,
}

impl StepId {
    pub fn as_str(self) -> &'static str {
        match self {
            StepId::Landing => "landing",
            StepId::AgeBand => "age_band",
            StepId::Sex => "sex",
            StepId::BodyType => "body_type",
            StepId::Height => "height",
            StepId::Weight => "weight",
            StepId::WaterIntake => "water_intake",
            StepId::WaterFeedback => "water_feedback",
            StepId::Objective => "objective",
            StepId::Experience => "experience",
            StepId::ExperienceFeedback => "experience_feedback",
            StepId::Frequency => "frequency",
            StepId::SessionDuration => "session_duration",
            StepId::Location => "location",
            StepId::PriorObstacles => "prior_obstacles",
            StepId::AdditionalGoals => "additional_goals",
            StepId::Injuries => "injuries",
            StepId::Name => "name",
            StepId::BirthDate => "birth_date",
        }
    }

    pub fn def(self) -> &'static StepDef {
        QUESTIONS
            .iter()
            .chain(INTERSTITIALS)
            .find(|d| d.id == self)
            .unwrap_or(&LANDING)
    }

    /// Zero-based position in the flow; the landing screen is 0 and the last
    /// question is [`TOTAL_STEPS`].
    pub fn position(self) -> usize {
        flow().iter().position(|s| *s == self).unwrap_or(0)
    }

    pub fn next(self) -> Option<StepId> {
        flow().get(self.position() + 1).copied()
    }

    pub fn prev(self) -> Option<StepId> {
        self.position().checked_sub(1).and_then(|i| flow().get(i).copied())
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StepId {
    type Err = crate::error::OnboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        flow()
            .iter()
            .copied()
            .find(|id| id.as_str() == s || id.def().legacy == s)
            .ok_or_else(|| crate::error::OnboardError::InvalidValue {
                field: "step",
                value: s.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// StepKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// Picking an option schedules an automatic advance.
    Single,
    /// Options toggle; the user presses Continue.
    Multiple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepKind {
    Entry,
    Question { selection: Selection },
    Interstitial,
    Input,
}

impl StepKind {
    pub fn auto_advances(self) -> bool {
        matches!(
            self,
            StepKind::Question {
                selection: Selection::Single
            }
        )
    }

    /// Whether the footer shows an explicit Continue/Entendi control.
    pub fn shows_continue(self) -> bool {
        !matches!(
            self,
            StepKind::Question {
                selection: Selection::Single
            }
        )
    }
}

// ---------------------------------------------------------------------------
// StepDef
// ---------------------------------------------------------------------------

/// A fn-pointer step definition. `blocker` returns the inline message that
/// keeps Continue disabled, or `None` when the step is complete.
pub struct StepDef {
    pub id: StepId,
    /// Legacy numeric label ("4.5" and friends), kept for display.
    pub legacy: &'static str,
    pub title: &'static str,
    pub kind: StepKind,
    pub blocker: fn(&OnboardingAnswers) -> Option<&'static str>,
    /// Interstitial screen inserted right after this question.
    pub followed_by: Option<StepId>,
}

impl StepDef {
    pub fn is_complete(&self, answers: &OnboardingAnswers) -> bool {
        (self.blocker)(answers).is_none()
    }

    pub fn continue_label(&self) -> &'static str {
        match self.kind {
            StepKind::Interstitial => "Entendi",
            _ if self.id.is_terminal() => "Finalizar",
            _ => "Continuar",
        }
    }
}

const SINGLE: StepKind = StepKind::Question {
    selection: Selection::Single,
};
const MULTIPLE: StepKind = StepKind::Question {
    selection: Selection::Multiple,
};

fn always(_: &OnboardingAnswers) -> Option<&'static str> {
    None
}

fn require<T>(value: &Option<T>, message: &'static str) -> Option<&'static str> {
    if value.is_some() {
        None
    } else {
        Some(message)
    }
}

static LANDING: StepDef = StepDef {
    id: StepId::Landing,
    legacy: "0",
    title: "Pare de Perder Tempo com Treinos Genéricos que Não Funcionam",
    kind: StepKind::Entry,
    blocker: always,
    followed_by: None,
};

/// Question screens in presentation order. Interstitials are spliced in
/// after the question that names them in `followed_by`.
static QUESTIONS: &[StepDef] = &[
    StepDef {
        id: StepId::AgeBand,
        legacy: "1",
        title: "Qual é a sua idade?",
        kind: SINGLE,
        blocker: |a| require(&a.idade, "Selecione sua faixa de idade"),
        followed_by: None,
    },
    StepDef {
        id: StepId::Sex,
        legacy: "2",
        title: "Qual é o seu sexo?",
        kind: SINGLE,
        blocker: |a| require(&a.sexo, "Selecione seu sexo"),
        followed_by: None,
    },
    StepDef {
        id: StepId::BodyType,
        legacy: "3",
        title: "Qual é o seu tipo de corpo atual?",
        kind: SINGLE,
        blocker: |a| require(&a.tipo_corpo, "Selecione seu tipo de corpo"),
        followed_by: None,
    },
    StepDef {
        id: StepId::Height,
        legacy: "4",
        title: "Qual é a sua altura?",
        kind: StepKind::Input,
        blocker: |a| match a.altura {
            None => Some("Informe sua altura"),
            Some(_) if !a.height_in_range() => Some("Altura deve estar entre 100 e 250 cm"),
            Some(_) => None,
        },
        followed_by: None,
    },
    StepDef {
        id: StepId::Weight,
        legacy: "4.5",
        title: "Qual é o seu peso atual?",
        kind: StepKind::Input,
        blocker: |a| match a.peso_atual {
            None => Some("Informe seu peso"),
            Some(_) if !a.weight_in_range() => Some("Peso deve estar entre 30 e 300 kg"),
            Some(_) => None,
        },
        followed_by: None,
    },
    StepDef {
        id: StepId::WaterIntake,
        legacy: "5",
        title: "Quanta água você bebe diariamente?",
        kind: SINGLE,
        blocker: |a| require(&a.agua_diaria, "Selecione seu consumo de água"),
        followed_by: Some(StepId::WaterFeedback),
    },
    StepDef {
        id: StepId::Objective,
        legacy: "6",
        title: "Qual é o seu objetivo principal?",
        kind: SINGLE,
        blocker: |a| require(&a.objetivo, "Selecione seu objetivo"),
        followed_by: None,
    },
    StepDef {
        id: StepId::Experience,
        legacy: "7",
        title: "Qual é o seu nível de experiência?",
        kind: SINGLE,
        blocker: |a| require(&a.experiencia, "Selecione seu nível"),
        followed_by: Some(StepId::ExperienceFeedback),
    },
    StepDef {
        id: StepId::Frequency,
        legacy: "8",
        title: "Quantas vezes por semana você pode treinar?",
        kind: SINGLE,
        blocker: |a| require(&a.frequencia_semanal, "Selecione a frequência semanal"),
        followed_by: None,
    },
    StepDef {
        id: StepId::SessionDuration,
        legacy: "9",
        title: "Quanto tempo você tem para cada treino?",
        kind: SINGLE,
        blocker: |a| require(&a.tempo_disponivel, "Selecione a duração do treino"),
        followed_by: None,
    },
    StepDef {
        id: StepId::Location,
        legacy: "10",
        title: "Onde você vai treinar?",
        kind: SINGLE,
        blocker: |a| require(&a.local_treino, "Selecione o local do treino"),
        followed_by: None,
    },
    StepDef {
        id: StepId::PriorObstacles,
        legacy: "11",
        title: "O que te impediu de alcançar seus objetivos antes?",
        kind: MULTIPLE,
        blocker: always,
        followed_by: None,
    },
    StepDef {
        id: StepId::AdditionalGoals,
        legacy: "12",
        title: "Você tem outros objetivos além do principal?",
        kind: MULTIPLE,
        blocker: always,
        followed_by: None,
    },
    StepDef {
        id: StepId::Injuries,
        legacy: "13",
        title: "Você tem alguma lesão ou limitação?",
        kind: MULTIPLE,
        blocker: always,
        followed_by: None,
    },
    StepDef {
        id: StepId::Name,
        legacy: "14",
        title: "Qual é o seu nome?",
        kind: StepKind::Input,
        blocker: |a| {
            if a.has_name() {
                None
            } else {
                Some("Informe seu nome")
            }
        },
        followed_by: None,
    },
    StepDef {
        id: StepId::BirthDate,
        legacy: "15",
        title: "Qual é a sua data de nascimento?",
        kind: StepKind::Input,
        blocker: |a| {
            if a.birth_date_complete() {
                None
            } else {
                Some("Digite a data completa (DD/MM/AAAA)")
            }
        },
        followed_by: None,
    },
];

/// Feedback screens. Each is only reachable once the answer it comments on
/// exists, which is also what keeps "Entendi" enabled.
static INTERSTITIALS: &[StepDef] = &[
    StepDef {
        id: StepId::WaterFeedback,
        legacy: "5.5",
        title: "Sua hidratação",
        kind: StepKind::Interstitial,
        blocker: |a| require(&a.agua_diaria, "Selecione seu consumo de água"),
        followed_by: None,
    },
    StepDef {
        id: StepId::ExperienceFeedback,
        legacy: "7.5",
        title: "Seu condicionamento",
        kind: StepKind::Interstitial,
        blocker: |a| require(&a.experiencia, "Selecione seu nível"),
        followed_by: None,
    },
];

/// Number of forward transitions from the landing screen to the last step.
pub const TOTAL_STEPS: usize = 18;

/// The ordered flow: landing, then each question followed by its
/// interstitial when it declares one.
pub fn flow() -> &'static [StepId] {
    static FLOW: OnceLock<Vec<StepId>> = OnceLock::new();
    FLOW.get_or_init(|| {
        let mut order = vec![LANDING.id];
        for q in QUESTIONS {
            order.push(q.id);
            if let Some(inter) = q.followed_by {
                order.push(inter);
            }
        }
        order
    })
}

pub fn definitions() -> impl Iterator<Item = &'static StepDef> {
    flow().iter().map(|id| id.def())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn flow_matches_legacy_numbering() {
        let legacy: Vec<&str> = definitions().map(|d| d.legacy).collect();
        assert_eq!(
            legacy,
            vec![
                "0", "1", "2", "3", "4", "4.5", "5", "5.5", "6", "7", "7.5", "8", "9", "10",
                "11", "12", "13", "14", "15"
            ]
        );
        assert_eq!(flow().len() - 1, TOTAL_STEPS);
    }

    #[test]
    fn next_and_prev_are_mirrors() {
        for id in flow() {
            if let Some(n) = id.next() {
                assert_eq!(n.prev(), Some(*id));
            }
        }
        assert_eq!(StepId::Landing.prev(), None);
        assert!(StepId::BirthDate.is_terminal());
    }

    #[test]
    fn interstitials_follow_their_questions() {
        assert_eq!(StepId::WaterIntake.next(), Some(StepId::WaterFeedback));
        assert_eq!(StepId::WaterFeedback.next(), Some(StepId::Objective));
        assert_eq!(StepId::Experience.next(), Some(StepId::ExperienceFeedback));
        assert_eq!(StepId::ExperienceFeedback.next(), Some(StepId::Frequency));
    }

    #[test]
    fn every_step_has_its_own_definition() {
        for id in flow() {
            assert_eq!(id.def().id, *id);
        }
    }

    #[test]
    fn parse_by_name_or_legacy_number() {
        assert_eq!(StepId::from_str("7.5").unwrap(), StepId::ExperienceFeedback);
        assert_eq!(StepId::from_str("weight").unwrap(), StepId::Weight);
        assert!(StepId::from_str("16").is_err());
    }

    #[test]
    fn continue_labels() {
        assert_eq!(StepId::WaterFeedback.def().continue_label(), "Entendi");
        assert_eq!(StepId::Height.def().continue_label(), "Continuar");
        assert_eq!(StepId::BirthDate.def().continue_label(), "Finalizar");
    }

    #[test]
    fn only_single_choice_questions_auto_advance() {
        let auto: Vec<StepId> = definitions()
            .filter(|d| d.kind.auto_advances())
            .map(|d| d.id)
            .collect();
        assert_eq!(
            auto,
            vec![
                StepId::AgeBand,
                StepId::Sex,
                StepId::BodyType,
                StepId::WaterIntake,
                StepId::Objective,
                StepId::Experience,
                StepId::Frequency,
                StepId::SessionDuration,
                StepId::Location,
            ]
        );
    }

    #[test]
    fn height_blocker_reports_range() {
        let mut a = OnboardingAnswers::new();
        let def = StepId::Height.def();
        assert_eq!((def.blocker)(&a), Some("Informe sua altura"));
        a.set_height(260.0).unwrap();
        assert_eq!((def.blocker)(&a), Some("Altura deve estar entre 100 e 250 cm"));
        a.set_height(180.0).unwrap();
        assert!(def.is_complete(&a));
    }
}
