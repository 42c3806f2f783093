use crate::error::OnboardError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Helper macro for answer enums carried verbatim on the wire
// ---------------------------------------------------------------------------

macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        $name:ident, field: $field:literal {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub fn all() -> &'static [$name] {
                &[$($name::$variant),+]
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = OnboardError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::all()
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| OnboardError::InvalidValue {
                        field: $field,
                        value: s.to_string(),
                    })
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Sex
// ---------------------------------------------------------------------------

labeled_enum! {
    Sex, field: "sexo" {
        Masculino => "Masculino",
        Feminino => "Feminino",
    }
}

// ---------------------------------------------------------------------------
// BodyType
// ---------------------------------------------------------------------------

labeled_enum! {
    /// Self-reported body type. The offered options depend on [`Sex`];
    /// `Obesidade` is shared by both lists.
    BodyType, field: "tipoCorpo" {
        Ectomorfo => "Ectomorfo",
        Mesomorfo => "Mesomorfo",
        Endomorfo => "Endomorfo",
        EmForma => "Em Forma",
        Sobrepeso => "Sobrepeso",
        AcimaDoPeso => "Acima do Peso",
        Obesidade => "Obesidade",
    }
}

impl BodyType {
    pub fn for_sex(sex: Sex) -> &'static [BodyType] {
        match sex {
            Sex::Masculino => &[
                BodyType::Ectomorfo,
                BodyType::Mesomorfo,
                BodyType::Endomorfo,
                BodyType::Obesidade,
            ],
            Sex::Feminino => &[
                BodyType::EmForma,
                BodyType::Sobrepeso,
                BodyType::AcimaDoPeso,
                BodyType::Obesidade,
            ],
        }
    }

    pub fn offered_to(self, sex: Sex) -> bool {
        Self::for_sex(sex).contains(&self)
    }
}

// ---------------------------------------------------------------------------
// AgeBand
// ---------------------------------------------------------------------------

labeled_enum! {
    AgeBand, field: "idade" {
        From18To29 => "18-29",
        From30To39 => "30-39",
        From40To49 => "40-49",
        Over50 => "50+",
    }
}

impl AgeBand {
    /// The integer stored in the answers when the band is picked.
    pub fn representative_age(self) -> u8 {
        match self {
            AgeBand::From18To29 => 25,
            AgeBand::From30To39 => 35,
            AgeBand::From40To49 => 45,
            AgeBand::Over50 => 55,
        }
    }

    pub fn from_age(age: u8) -> Option<AgeBand> {
        match age {
            18..=29 => Some(AgeBand::From18To29),
            30..=39 => Some(AgeBand::From30To39),
            40..=49 => Some(AgeBand::From40To49),
            50..=u8::MAX => Some(AgeBand::Over50),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// WaterIntake
// ---------------------------------------------------------------------------

labeled_enum! {
    WaterIntake, field: "aguaDiaria" {
        LessThanTwoGlasses => "Menos de 2 copos",
        TwoToSixGlasses => "2-6 copos",
        SevenToTenGlasses => "7-10 copos",
        MoreThanTenGlasses => "Mais de 10 copos",
        CoffeeOrTeaOnly => "Bebo apenas café ou chá",
    }
}

// ---------------------------------------------------------------------------
// Experience / Objective / TrainingLocation
// ---------------------------------------------------------------------------

labeled_enum! {
    Experience, field: "experiencia" {
        Iniciante => "Iniciante",
        Intermediario => "Intermediário",
        Avancado => "Avançado",
    }
}

labeled_enum! {
    Objective, field: "objetivo" {
        Emagrecimento => "Emagrecimento",
        Hipertrofia => "Hipertrofia",
        Forca => "Força",
    }
}

labeled_enum! {
    TrainingLocation, field: "localTreino" {
        Casa => "Casa",
        Academia => "Academia",
        Misto => "Misto",
    }
}

// ---------------------------------------------------------------------------
// SessionDuration (carried as minutes)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum SessionDuration {
    Min30,
    Min45,
    Min60,
    Min75,
}

impl SessionDuration {
    pub fn all() -> &'static [SessionDuration] {
        &[
            SessionDuration::Min30,
            SessionDuration::Min45,
            SessionDuration::Min60,
            SessionDuration::Min75,
        ]
    }

    pub fn minutes(self) -> u16 {
        match self {
            SessionDuration::Min30 => 30,
            SessionDuration::Min45 => 45,
            SessionDuration::Min60 => 60,
            SessionDuration::Min75 => 75,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionDuration::Min30 => "30 a 45 minutos",
            SessionDuration::Min45 => "45 a 60 minutos",
            SessionDuration::Min60 => "60 a 75 minutos",
            SessionDuration::Min75 => "Mais de 75 minutos",
        }
    }
}

impl TryFrom<u16> for SessionDuration {
    type Error = OnboardError;

    fn try_from(minutes: u16) -> Result<Self, Self::Error> {
        Self::all()
            .iter()
            .copied()
            .find(|d| d.minutes() == minutes)
            .ok_or_else(|| OnboardError::InvalidValue {
                field: "tempoDisponivel",
                value: minutes.to_string(),
            })
    }
}

impl From<SessionDuration> for u16 {
    fn from(d: SessionDuration) -> u16 {
        d.minutes()
    }
}

impl fmt::Display for SessionDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.minutes())
    }
}

impl std::str::FromStr for SessionDuration {
    type Err = OnboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let minutes: u16 = s.trim().parse().map_err(|_| OnboardError::InvalidValue {
            field: "tempoDisponivel",
            value: s.to_string(),
        })?;
        SessionDuration::try_from(minutes)
    }
}

// ---------------------------------------------------------------------------
// Ranges and multi-select option lists
// ---------------------------------------------------------------------------

pub const HEIGHT_RANGE_CM: (f64, f64) = (100.0, 250.0);
pub const WEIGHT_RANGE_KG: (f64, f64) = (30.0, 300.0);
pub const FREQUENCY_RANGE: (u8, u8) = (2, 6);

pub const PRIOR_OBSTACLES: &[&str] = &[
    "Falta de motivação",
    "Não tinha um plano claro",
    "Meus treinos eram muito duros",
    "Falta de tempo",
];

pub const ADDITIONAL_GOALS: &[&str] = &[
    "Melhorar o sono",
    "Criar um hábito físico",
    "Sentir-se mais saudável",
    "Reduzir o estresse",
    "Aumentar a energia",
];

pub const INJURY_OPTIONS: &[&str] = &["Joelho", "Ombro", "Coluna", "Pulso", "Tornozelo"];

/// Choosing this option clears the injury set.
pub const NO_INJURY: &str = "Nenhuma";

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn labels_parse_back() {
        for bt in BodyType::all() {
            assert_eq!(BodyType::from_str(bt.as_str()).unwrap(), *bt);
        }
        assert_eq!(Experience::from_str("Intermediário").unwrap(), Experience::Intermediario);
        assert!(Objective::from_str("Cardio").is_err());
    }

    #[test]
    fn body_type_domain_depends_on_sex() {
        assert!(BodyType::Ectomorfo.offered_to(Sex::Masculino));
        assert!(!BodyType::Ectomorfo.offered_to(Sex::Feminino));
        assert!(BodyType::EmForma.offered_to(Sex::Feminino));
        assert!(BodyType::Obesidade.offered_to(Sex::Masculino));
        assert!(BodyType::Obesidade.offered_to(Sex::Feminino));
    }

    #[test]
    fn serde_uses_wire_labels() {
        let json = serde_json::to_string(&BodyType::AcimaDoPeso).unwrap();
        assert_eq!(json, "\"Acima do Peso\"");
        let parsed: WaterIntake = serde_json::from_str("\"2-6 copos\"").unwrap();
        assert_eq!(parsed, WaterIntake::TwoToSixGlasses);
    }

    #[test]
    fn session_duration_is_minutes_on_the_wire() {
        assert_eq!(serde_json::to_string(&SessionDuration::Min45).unwrap(), "45");
        let parsed: SessionDuration = serde_json::from_str("75").unwrap();
        assert_eq!(parsed, SessionDuration::Min75);
        assert!(serde_json::from_str::<SessionDuration>("50").is_err());
    }

    #[test]
    fn age_band_representatives_round_trip() {
        for band in AgeBand::all() {
            assert_eq!(AgeBand::from_age(band.representative_age()), Some(*band));
        }
        assert_eq!(AgeBand::from_age(17), None);
        assert_eq!(AgeBand::from_age(72), Some(AgeBand::Over50));
    }
}
