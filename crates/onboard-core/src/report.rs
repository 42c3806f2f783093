use crate::answers::OnboardingAnswers;
use crate::consistency::{ConsistencyReport, ConsistencyValidator};
use crate::metrics::{DerivedMetrics, MetricsEstimator};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub label: &'static str,
    pub value: String,
}

impl SummaryRow {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

/// Everything the confirmation screen shows before signup. Nothing here is
/// sent to the signup endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_nascimento: Option<String>,
    /// Age from the birth date, when it parses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    pub summary: Vec<SummaryRow>,
    pub metrics: DerivedMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistency: Option<ConsistencyReport>,
}

impl ConfirmationReport {
    pub fn build(
        answers: &OnboardingAnswers,
        validator: &ConsistencyValidator,
        today: NaiveDate,
    ) -> Self {
        Self {
            nome: answers.nome.clone(),
            data_nascimento: answers.data_nascimento.clone(),
            age: answers.age_on(today),
            summary: summary_rows(answers, today),
            metrics: MetricsEstimator::estimate(answers),
            consistency: validator.check(answers),
        }
    }

    /// The advisory note, when body type and BMI disagree.
    pub fn note(&self) -> Option<String> {
        self.consistency.as_ref().and_then(ConsistencyReport::note)
    }
}

/// Label/value rows for every answered field, in screen order. Name and
/// birth date are shown separately and left out.
pub fn summary_rows(answers: &OnboardingAnswers, today: NaiveDate) -> Vec<SummaryRow> {
    let mut rows = Vec::new();

    let age = answers
        .age_on(today)
        .filter(|a| *a > 0)
        .or(answers.idade.map(u32::from));
    if let Some(age) = age {
        rows.push(SummaryRow::new("Idade", format!("{age} anos")));
    }
    if let Some(sex) = answers.sexo {
        rows.push(SummaryRow::new("Sexo", sex.as_str()));
    }
    if let Some(h) = answers.altura {
        rows.push(SummaryRow::new("Altura", format!("{h} cm")));
    }
    if let Some(w) = answers.peso_atual {
        rows.push(SummaryRow::new("Peso", format!("{w} kg")));
    }
    if let Some(bt) = answers.tipo_corpo {
        rows.push(SummaryRow::new("Tipo de Corpo", bt.as_str()));
    }
    if let Some(water) = answers.agua_diaria {
        rows.push(SummaryRow::new("Consumo de Água", water.as_str()));
    }
    if let Some(exp) = answers.experiencia {
        rows.push(SummaryRow::new("Nível", exp.as_str()));
    }
    if let Some(obj) = answers.objetivo {
        rows.push(SummaryRow::new("Objetivo", obj.as_str()));
    }
    if let Some(f) = answers.frequencia_semanal {
        rows.push(SummaryRow::new("Frequência", format!("{f}x por semana")));
    }
    if let Some(d) = answers.tempo_disponivel {
        rows.push(SummaryRow::new(
            "Duração do Treino",
            format!("{} minutos", d.minutes()),
        ));
    }
    if let Some(loc) = answers.local_treino {
        rows.push(SummaryRow::new("Local do Treino", loc.as_str()));
    }
    for (label, list) in [
        ("Problemas Anteriores", &answers.problemas_anteriores),
        ("Objetivos Adicionais", &answers.objetivos_adicionais),
        ("Limitações", &answers.lesoes),
    ] {
        if !list.is_empty() {
            rows.push(SummaryRow::new(label, list.join(", ")));
        }
    }
    rows
}
