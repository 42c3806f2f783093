use crate::error::{OnboardError, Result};
use crate::types::{
    AgeBand, BodyType, Experience, Objective, SessionDuration, Sex, TrainingLocation,
    WaterIntake, ADDITIONAL_GOALS, FREQUENCY_RANGE, HEIGHT_RANGE_CM, INJURY_OPTIONS, NO_INJURY,
    PRIOR_OBSTACLES, WEIGHT_RANGE_KG,
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

const BIRTH_DATE_DIGITS: usize = 8;

// ---------------------------------------------------------------------------
// OnboardingAnswers
// ---------------------------------------------------------------------------

/// The answer set accumulated over one onboarding session.
///
/// Field names on the wire are the ones the signup collaborator expects
/// inside its `onboarding` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingAnswers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_nascimento: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idade: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sexo: Option<Sex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altura: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peso_atual: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_corpo: Option<BodyType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agua_diaria: Option<WaterIntake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiencia: Option<Experience>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objetivo: Option<Objective>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequencia_semanal: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo_disponivel: Option<SessionDuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_treino: Option<TrainingLocation>,
    #[serde(default)]
    pub problemas_anteriores: Vec<String>,
    #[serde(default)]
    pub objetivos_adicionais: Vec<String>,
    #[serde(default)]
    pub lesoes: Vec<String>,
}

impl OnboardingAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Single-choice answers
    // -----------------------------------------------------------------------

    pub fn set_age_band(&mut self, band: AgeBand) {
        self.idade = Some(band.representative_age());
    }

    pub fn age_band(&self) -> Option<AgeBand> {
        self.idade.and_then(AgeBand::from_age)
    }

    /// Set the sex. A body type that the new sex is not offered is cleared,
    /// since the two answers share one domain. Returns true if it was cleared.
    pub fn set_sex(&mut self, sex: Sex) -> bool {
        self.sexo = Some(sex);
        match self.tipo_corpo {
            Some(bt) if !bt.offered_to(sex) => {
                self.tipo_corpo = None;
                true
            }
            _ => false,
        }
    }

    /// Set the body type, checked against the options offered for the chosen
    /// sex. Without a sex the male list applies, as on the selection screen.
    pub fn set_body_type(&mut self, body_type: BodyType) -> Result<()> {
        let sex = self.sexo.unwrap_or(Sex::Masculino);
        if !body_type.offered_to(sex) {
            return Err(OnboardError::BodyTypeOutOfDomain {
                body_type: body_type.to_string(),
                sex: sex.to_string(),
            });
        }
        self.tipo_corpo = Some(body_type);
        Ok(())
    }

    pub fn set_water(&mut self, water: WaterIntake) {
        self.agua_diaria = Some(water);
    }

    pub fn set_experience(&mut self, experience: Experience) {
        self.experiencia = Some(experience);
    }

    pub fn set_objective(&mut self, objective: Objective) {
        self.objetivo = Some(objective);
    }

    pub fn set_frequency(&mut self, per_week: u8) -> Result<()> {
        let (min, max) = FREQUENCY_RANGE;
        if !(min..=max).contains(&per_week) {
            return Err(OnboardError::InvalidValue {
                field: "frequenciaSemanal",
                value: per_week.to_string(),
            });
        }
        self.frequencia_semanal = Some(per_week);
        Ok(())
    }

    pub fn set_duration(&mut self, duration: SessionDuration) {
        self.tempo_disponivel = Some(duration);
    }

    pub fn set_location(&mut self, location: TrainingLocation) {
        self.local_treino = Some(location);
    }

    // -----------------------------------------------------------------------
    // Free-form inputs
    // -----------------------------------------------------------------------

    /// Store the typed height. Out-of-range values are kept so the step can
    /// show its inline message; only non-numbers are refused.
    pub fn set_height(&mut self, cm: f64) -> Result<()> {
        self.altura = Some(finite("altura", cm)?);
        Ok(())
    }

    pub fn set_weight(&mut self, kg: f64) -> Result<()> {
        self.peso_atual = Some(finite("pesoAtual", kg)?);
        Ok(())
    }

    pub fn height_in_range(&self) -> bool {
        in_range(self.altura, HEIGHT_RANGE_CM)
    }

    pub fn weight_in_range(&self) -> bool {
        in_range(self.peso_atual, WEIGHT_RANGE_KG)
    }

    pub fn set_name(&mut self, name: &str) {
        self.nome = if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        };
    }

    pub fn has_name(&self) -> bool {
        self.nome.as_deref().is_some_and(|n| !n.trim().is_empty())
    }

    /// Apply raw keystrokes to the birth-date field through the input mask.
    pub fn input_birth_date(&mut self, raw: &str) {
        let masked = mask_birth_date(raw);
        self.data_nascimento = if masked.is_empty() { None } else { Some(masked) };
    }

    pub fn birth_date_digit_count(&self) -> usize {
        self.data_nascimento
            .as_deref()
            .map(|d| d.chars().filter(char::is_ascii_digit).count())
            .unwrap_or(0)
    }

    pub fn birth_date_complete(&self) -> bool {
        self.birth_date_digit_count() == BIRTH_DATE_DIGITS
    }

    /// The birth date as a calendar date, if all eight digits form one.
    pub fn birth_date(&self) -> Option<NaiveDate> {
        let raw = self.data_nascimento.as_deref()?;
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.len() != BIRTH_DATE_DIGITS {
            return None;
        }
        let day: u32 = digits[0..2].parse().ok()?;
        let month: u32 = digits[2..4].parse().ok()?;
        let year: i32 = digits[4..8].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }

    /// Whole years between the birth date and `today`.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let born = self.birth_date()?;
        let mut years = today.year() - born.year();
        if (today.month(), today.day()) < (born.month(), born.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }

    // -----------------------------------------------------------------------
    // Multi-select answers
    // -----------------------------------------------------------------------

    pub fn toggle_obstacle(&mut self, option: &str) -> Result<()> {
        toggle(&mut self.problemas_anteriores, PRIOR_OBSTACLES, "problemasAnteriores", option)
    }

    pub fn toggle_goal(&mut self, option: &str) -> Result<()> {
        toggle(&mut self.objetivos_adicionais, ADDITIONAL_GOALS, "objetivosAdicionais", option)
    }

    /// Toggle an injury. "Nenhuma" clears the set: an empty set means none.
    pub fn toggle_injury(&mut self, option: &str) -> Result<()> {
        if option == NO_INJURY {
            self.lesoes.clear();
            return Ok(());
        }
        toggle(&mut self.lesoes, INJURY_OPTIONS, "lesoes", option)
    }

    pub fn has_no_injuries(&self) -> bool {
        self.lesoes.is_empty()
    }

    // -----------------------------------------------------------------------
    // Validation of records read back from storage
    // -----------------------------------------------------------------------

    /// Check the cross-field invariants that the typed setters enforce, for
    /// records that arrive by deserialization.
    pub fn validate(&self) -> Result<()> {
        if let (Some(sex), Some(bt)) = (self.sexo, self.tipo_corpo) {
            if !bt.offered_to(sex) {
                return Err(OnboardError::BodyTypeOutOfDomain {
                    body_type: bt.to_string(),
                    sex: sex.to_string(),
                });
            }
        }
        if let Some(age) = self.idade {
            let banded = AgeBand::from_age(age).map(AgeBand::representative_age);
            if banded != Some(age) {
                return Err(OnboardError::InvalidValue {
                    field: "idade",
                    value: age.to_string(),
                });
            }
        }
        for (field, value, range) in [
            ("altura", self.altura, HEIGHT_RANGE_CM),
            ("pesoAtual", self.peso_atual, WEIGHT_RANGE_KG),
        ] {
            if let Some(v) = value {
                if !in_range(Some(v), range) {
                    return Err(OnboardError::InvalidValue {
                        field,
                        value: v.to_string(),
                    });
                }
            }
        }
        if let Some(freq) = self.frequencia_semanal {
            let (min, max) = FREQUENCY_RANGE;
            if !(min..=max).contains(&freq) {
                return Err(OnboardError::InvalidValue {
                    field: "frequenciaSemanal",
                    value: freq.to_string(),
                });
            }
        }
        for (field, values, allowed) in [
            ("problemasAnteriores", &self.problemas_anteriores, PRIOR_OBSTACLES),
            ("objetivosAdicionais", &self.objetivos_adicionais, ADDITIONAL_GOALS),
            ("lesoes", &self.lesoes, INJURY_OPTIONS),
        ] {
            if let Some(bad) = values.iter().find(|v| !allowed.contains(&v.as_str())) {
                return Err(OnboardError::InvalidValue {
                    field,
                    value: bad.clone(),
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn finite(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(OnboardError::InvalidValue {
            field,
            value: value.to_string(),
        })
    }
}

fn in_range(value: Option<f64>, (min, max): (f64, f64)) -> bool {
    value.is_some_and(|v| v >= min && v <= max)
}

fn toggle(
    set: &mut Vec<String>,
    allowed: &[&str],
    field: &'static str,
    option: &str,
) -> Result<()> {
    if !allowed.contains(&option) {
        return Err(OnboardError::InvalidValue {
            field,
            value: option.to_string(),
        });
    }
    if let Some(pos) = set.iter().position(|v| v == option) {
        set.remove(pos);
    } else {
        set.push(option.to_string());
    }
    Ok(())
}

/// Reduce input to at most eight digits and render it as `DD`, `DD/MM` or
/// `DD/MM/AAAA` depending on how many were typed.
pub fn mask_birth_date(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(char::is_ascii_digit)
        .take(BIRTH_DATE_DIGITS)
        .collect();
    match digits.len() {
        0..=2 => digits,
        3..=4 => format!("{}/{}", &digits[..2], &digits[2..]),
        _ => format!("{}/{}/{}", &digits[..2], &digits[2..4], &digits[4..]),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn birth_date_mask_progresses() {
        assert_eq!(mask_birth_date(""), "");
        assert_eq!(mask_birth_date("1"), "1");
        assert_eq!(mask_birth_date("150"), "15/0");
        assert_eq!(mask_birth_date("1503"), "15/03");
        assert_eq!(mask_birth_date("15031990"), "15/03/1990");
        assert_eq!(mask_birth_date("15/03/1990 extra 42"), "15/03/1990");
        assert_eq!(mask_birth_date("a1b5c0d3"), "15/03");
    }

    #[test]
    fn birth_date_completeness_counts_digits() {
        let mut a = OnboardingAnswers::new();
        a.input_birth_date("1503199");
        assert_eq!(a.birth_date_digit_count(), 7);
        assert!(!a.birth_date_complete());
        a.input_birth_date("15031990");
        assert!(a.birth_date_complete());
        assert_eq!(a.data_nascimento.as_deref(), Some("15/03/1990"));
    }

    #[test]
    fn age_on_accounts_for_birthday_not_yet_reached() {
        let mut a = OnboardingAnswers::new();
        a.input_birth_date("15031990");
        let before = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        let on = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(a.age_on(before), Some(33));
        assert_eq!(a.age_on(on), Some(34));
    }

    #[test]
    fn impossible_birth_date_has_no_age() {
        let mut a = OnboardingAnswers::new();
        a.input_birth_date("31021990");
        assert!(a.birth_date_complete());
        assert_eq!(a.birth_date(), None);
        assert_eq!(a.age_on(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()), None);
    }

    #[test]
    fn body_type_checked_against_sex() {
        let mut a = OnboardingAnswers::new();
        a.set_sex(Sex::Feminino);
        assert!(a.set_body_type(BodyType::Ectomorfo).is_err());
        a.set_body_type(BodyType::EmForma).unwrap();
        assert_eq!(a.tipo_corpo, Some(BodyType::EmForma));
    }

    #[test]
    fn changing_sex_clears_foreign_body_type() {
        let mut a = OnboardingAnswers::new();
        a.set_sex(Sex::Masculino);
        a.set_body_type(BodyType::Mesomorfo).unwrap();
        assert!(a.set_sex(Sex::Feminino));
        assert_eq!(a.tipo_corpo, None);

        a.set_body_type(BodyType::Obesidade).unwrap();
        assert!(!a.set_sex(Sex::Masculino));
        assert_eq!(a.tipo_corpo, Some(BodyType::Obesidade));
    }

    #[test]
    fn frequency_outside_range_rejected() {
        let mut a = OnboardingAnswers::new();
        assert!(a.set_frequency(1).is_err());
        assert!(a.set_frequency(7).is_err());
        a.set_frequency(4).unwrap();
        assert_eq!(a.frequencia_semanal, Some(4));
    }

    #[test]
    fn height_kept_even_when_out_of_range() {
        let mut a = OnboardingAnswers::new();
        a.set_height(90.0).unwrap();
        assert_eq!(a.altura, Some(90.0));
        assert!(!a.height_in_range());
        a.set_height(175.0).unwrap();
        assert!(a.height_in_range());
        assert!(a.set_height(f64::NAN).is_err());
    }

    #[test]
    fn multi_select_toggles_and_none_clears() {
        let mut a = OnboardingAnswers::new();
        a.toggle_injury("Joelho").unwrap();
        a.toggle_injury("Ombro").unwrap();
        a.toggle_injury("Joelho").unwrap();
        assert_eq!(a.lesoes, vec!["Ombro".to_string()]);
        a.toggle_injury(NO_INJURY).unwrap();
        assert!(a.has_no_injuries());
        assert!(a.toggle_goal("Voar").is_err());
    }

    #[test]
    fn wire_format_uses_collaborator_field_names() {
        let mut a = OnboardingAnswers::new();
        a.set_age_band(AgeBand::From30To39);
        a.set_sex(Sex::Masculino);
        a.set_weight(82.5).unwrap();
        a.set_duration(SessionDuration::Min60);
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["idade"], 35);
        assert_eq!(json["sexo"], "Masculino");
        assert_eq!(json["pesoAtual"], 82.5);
        assert_eq!(json["tempoDisponivel"], 60);
        assert!(json.get("altura").is_none());
        assert_eq!(json["lesoes"], serde_json::json!([]));
    }

    #[test]
    fn validate_catches_tampered_records() {
        let json = r#"{"sexo":"Feminino","tipoCorpo":"Endomorfo"}"#;
        let a: OnboardingAnswers = serde_json::from_str(json).unwrap();
        assert!(matches!(
            a.validate(),
            Err(OnboardError::BodyTypeOutOfDomain { .. })
        ));

        let json = r#"{"frequenciaSemanal":9}"#;
        let a: OnboardingAnswers = serde_json::from_str(json).unwrap();
        assert!(a.validate().is_err());
    }

    #[test]
    fn validate_rejects_measurements_out_of_range() {
        let json = r#"{"sexo":"Masculino","altura":5000}"#;
        let a: OnboardingAnswers = serde_json::from_str(json).unwrap();
        assert!(matches!(
            a.validate(),
            Err(OnboardError::InvalidValue { field: "altura", .. })
        ));

        let json = r#"{"altura":175,"pesoAtual":-20}"#;
        let a: OnboardingAnswers = serde_json::from_str(json).unwrap();
        assert!(matches!(
            a.validate(),
            Err(OnboardError::InvalidValue { field: "pesoAtual", .. })
        ));

        let json = r#"{"altura":100,"pesoAtual":300}"#;
        let a: OnboardingAnswers = serde_json::from_str(json).unwrap();
        assert!(a.validate().is_ok());
    }

    #[test]
    fn validate_accepts_only_band_ages() {
        for age in [25, 35, 45, 55] {
            let json = format!(r#"{{"idade":{age}}}"#);
            let a: OnboardingAnswers = serde_json::from_str(&json).unwrap();
            assert!(a.validate().is_ok(), "age {age}");
        }
        for age in [30, 17, 200] {
            let json = format!(r#"{{"idade":{age}}}"#);
            let a: OnboardingAnswers = serde_json::from_str(&json).unwrap();
            assert!(matches!(
                a.validate(),
                Err(OnboardError::InvalidValue { field: "idade", .. })
            ));
        }
    }

    #[test]
    fn band_answer_keeps_a_validated_age() {
        let json = r#"{"idade":35}"#;
        let loaded: OnboardingAnswers = serde_json::from_str(json).unwrap();
        loaded.validate().unwrap();
        let mut replayed = OnboardingAnswers::new();
        replayed.set_age_band(loaded.age_band().unwrap());
        assert_eq!(replayed.idade, loaded.idade);
    }
}
