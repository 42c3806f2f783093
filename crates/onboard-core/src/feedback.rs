//! Content of the two interstitial screens: how the user's water intake and
//! training experience compare with other users.

use crate::types::{Experience, WaterIntake};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    Excelente,
    Bom,
    Regular,
    Baixo,
    MuitoBaixo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Feedback {
    /// Share of users giving the same answer.
    pub share_percent: u8,
    pub standing: Standing,
    pub tone: Tone,
    pub title: &'static str,
    pub message: &'static str,
    pub recommendation: &'static str,
    /// Fill level of the gauge graphic.
    pub gauge_percent: u8,
    /// Whether the gauge is drawn in the positive color.
    pub positive: bool,
}

// ---------------------------------------------------------------------------
// Water
// ---------------------------------------------------------------------------

struct Row {
    share: u8,
    standing: Standing,
    tone: Tone,
    message: &'static str,
    recommendation: &'static str,
}

const WATER: &[(WaterIntake, Row)] = &[
    (
        WaterIntake::LessThanTwoGlasses,
        Row {
            share: 15,
            standing: Standing::MuitoBaixo,
            tone: Tone::Error,
            message: "Você bebe menos água do que 85% dos usuários*",
            recommendation: "Sua hidratação está muito abaixo do recomendado. Tente aumentar gradualmente para 7-10 copos por dia.",
        },
    ),
    (
        WaterIntake::TwoToSixGlasses,
        Row {
            share: 35,
            standing: Standing::Baixo,
            tone: Tone::Warning,
            message: "Você bebe menos água do que 65% dos usuários*",
            recommendation: "Sua hidratação está abaixo do ideal. O recomendado é 7-10 copos por dia para melhor desempenho.",
        },
    ),
    (
        WaterIntake::SevenToTenGlasses,
        Row {
            share: 40,
            standing: Standing::Bom,
            tone: Tone::Success,
            message: "Você bebe mais água do que 60% dos usuários*",
            recommendation: "Parabéns! Você está no nível ideal de hidratação. Continue assim para manter seu desempenho.",
        },
    ),
    (
        WaterIntake::MoreThanTenGlasses,
        Row {
            share: 8,
            standing: Standing::Excelente,
            tone: Tone::Success,
            message: "Uau! Impressionante! Você bebe mais água do que 92% dos usuários*",
            recommendation: "Excelente! Você está muito bem hidratado. Continue mantendo esse hábito saudável.",
        },
    ),
    (
        WaterIntake::CoffeeOrTeaOnly,
        Row {
            share: 2,
            standing: Standing::MuitoBaixo,
            tone: Tone::Error,
            message: "Você bebe menos água do que 98% dos usuários*",
            recommendation: "Café e chá não substituem água pura. Tente adicionar pelo menos 4-6 copos de água por dia.",
        },
    ),
];

pub fn water(intake: WaterIntake) -> Option<Feedback> {
    let row = WATER.iter().find(|(w, _)| *w == intake).map(|(_, r)| r)?;
    let (gauge_percent, positive) = match row.standing {
        Standing::Excelente => (95, true),
        Standing::Bom => (70, true),
        Standing::Regular => (50, false),
        Standing::Baixo => (30, false),
        Standing::MuitoBaixo => (10, false),
    };
    let title = match row.standing {
        Standing::Excelente => "Uau! Impressionante!",
        Standing::Bom => "Ótimo! Continue assim!",
        Standing::Baixo => "Atenção!",
        _ => "Precisamos melhorar!",
    };
    Some(Feedback {
        share_percent: row.share,
        standing: row.standing,
        tone: row.tone,
        title,
        message: row.message,
        recommendation: row.recommendation,
        gauge_percent,
        positive,
    })
}

// ---------------------------------------------------------------------------
// Experience
// ---------------------------------------------------------------------------

const EXPERIENCE: &[(Experience, Row)] = &[
    (
        Experience::Iniciante,
        Row {
            share: 45,
            standing: Standing::Regular,
            tone: Tone::Success,
            message: "Você está no mesmo nível de 45% dos usuários*",
            recommendation: "Perfeito! Vamos começar do básico e construir sua base de forma segura. Cada treino te levará mais longe.",
        },
    ),
    (
        Experience::Intermediario,
        Row {
            share: 40,
            standing: Standing::Regular,
            tone: Tone::Success,
            message: "Você está no mesmo nível de 40% dos usuários*",
            recommendation: "Ótimo! Você já tem uma base. Vamos intensificar gradualmente e alcançar novos patamares.",
        },
    ),
    (
        Experience::Avancado,
        Row {
            share: 15,
            standing: Standing::Excelente,
            tone: Tone::Success,
            message: "Uau! Impressionante! Você está no mesmo nível de apenas 15% dos usuários*",
            recommendation: "Excelente! Você está em ótima forma. Vamos criar treinos desafiadores para manter e superar seu nível atual.",
        },
    ),
];

pub fn experience(level: Experience) -> Option<Feedback> {
    let row = EXPERIENCE.iter().find(|(e, _)| *e == level).map(|(_, r)| r)?;
    let (gauge_percent, positive) = match row.standing {
        Standing::Excelente => (95, true),
        Standing::Bom => (75, true),
        Standing::Regular => (60, true),
        _ => (30, false),
    };
    let title = match row.standing {
        Standing::Excelente => "Uau! Impressionante!",
        Standing::Bom => "Ótimo! Continue assim!",
        Standing::Regular => "Ótimo! Vamos começar!",
        _ => "Vamos melhorar juntos!",
    };
    Some(Feedback {
        share_percent: row.share,
        standing: row.standing,
        tone: row.tone,
        title,
        message: row.message,
        recommendation: row.recommendation,
        gauge_percent,
        positive,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_water_answer_has_feedback() {
        let total: u32 = WaterIntake::all()
            .iter()
            .map(|w| u32::from(water(*w).unwrap().share_percent))
            .sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn low_water_is_a_warning() {
        let f = water(WaterIntake::TwoToSixGlasses).unwrap();
        assert_eq!(f.standing, Standing::Baixo);
        assert_eq!(f.tone, Tone::Warning);
        assert_eq!(f.title, "Atenção!");
        assert_eq!(f.gauge_percent, 30);
        assert!(!f.positive);
    }

    #[test]
    fn coffee_only_needs_improvement() {
        let f = water(WaterIntake::CoffeeOrTeaOnly).unwrap();
        assert_eq!(f.title, "Precisamos melhorar!");
        assert_eq!(f.gauge_percent, 10);
    }

    #[test]
    fn experience_shares_and_titles() {
        let total: u32 = Experience::all()
            .iter()
            .map(|e| u32::from(experience(*e).unwrap().share_percent))
            .sum();
        assert_eq!(total, 100);
        let beginner = experience(Experience::Iniciante).unwrap();
        assert_eq!(beginner.title, "Ótimo! Vamos começar!");
        assert!(beginner.positive);
        assert_eq!(experience(Experience::Avancado).unwrap().gauge_percent, 95);
    }
}
