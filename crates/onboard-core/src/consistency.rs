//! Cross-check of the self-reported body type against computed BMI.
//!
//! The result only annotates the confirmation screen. It never changes the
//! answers and never blocks the flow; the body type stays authoritative.

use crate::answers::OnboardingAnswers;
use crate::metrics::Bmi;
use crate::types::{BodyType, Sex};
use serde::Serialize;

/// BMI band each body type is expected to fall in, per sex.
const EXPECTED_BMI: &[(Sex, BodyType, (f64, f64))] = &[
    (Sex::Feminino, BodyType::EmForma, (18.5, 24.9)),
    (Sex::Feminino, BodyType::Sobrepeso, (25.0, 29.9)),
    (Sex::Feminino, BodyType::AcimaDoPeso, (25.0, 29.9)),
    (Sex::Feminino, BodyType::Obesidade, (30.0, 50.0)),
    (Sex::Masculino, BodyType::Ectomorfo, (18.5, 24.9)),
    (Sex::Masculino, BodyType::Mesomorfo, (20.0, 27.0)),
    (Sex::Masculino, BodyType::Endomorfo, (25.0, 29.9)),
    (Sex::Masculino, BodyType::Obesidade, (30.0, 50.0)),
];

pub const DEFAULT_TOLERANCE: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyReport {
    pub consistent: bool,
    pub body_type: BodyType,
    pub bmi: f64,
    pub expected_min: f64,
    pub expected_max: f64,
}

impl ConsistencyReport {
    /// "a - b", one decimal each.
    pub fn expected_band(&self) -> String {
        format!("{:.1} - {:.1}", self.expected_min, self.expected_max)
    }

    /// Advisory note for the confirmation screen, present only when the
    /// body type and BMI disagree.
    pub fn note(&self) -> Option<String> {
        if self.consistent {
            return None;
        }
        Some(format!(
            "Nota: O IMC calculado ({:.1}) está fora da faixa esperada para \"{}\" (IMC esperado: {}). Usamos o tipo de corpo informado como referência principal.",
            self.bmi,
            self.body_type,
            self.expected_band()
        ))
    }
}

pub struct ConsistencyValidator {
    tolerance: f64,
}

impl ConsistencyValidator {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// `None` when there is no body type or no BMI to compare.
    pub fn check(&self, answers: &OnboardingAnswers) -> Option<ConsistencyReport> {
        let body_type = answers.tipo_corpo?;
        let bmi = Bmi::from_measurements(answers.altura?, answers.peso_atual?)?;
        // A record without sex is compared against the male bands.
        let sex = answers.sexo.unwrap_or(Sex::Masculino);
        let (min, max) = EXPECTED_BMI
            .iter()
            .find(|(s, bt, _)| *s == sex && *bt == body_type)
            .map(|(_, _, band)| *band)
            .unwrap_or((0.0, 0.0));
        let consistent = bmi.value >= min - self.tolerance && bmi.value <= max + self.tolerance;
        Some(ConsistencyReport {
            consistent,
            body_type,
            bmi: bmi.value,
            expected_min: min,
            expected_max: max,
        })
    }
}

impl Default for ConsistencyValidator {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}
