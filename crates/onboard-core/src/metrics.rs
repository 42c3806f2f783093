//! Derived metrics shown on the confirmation screen.
//!
//! Everything here is a pure function of [`OnboardingAnswers`]. The body-fat,
//! fitness-age and muscle heuristics are expressed as lookup tables keyed by
//! (sex, body type), BMI class, experience tier, objective and weekly
//! frequency, so each number can be traced to one table row.
//!
//! A metric whose inputs are missing is `None`; callers omit that section.

use crate::answers::OnboardingAnswers;
use crate::types::{BodyType, Experience, Objective, Sex};
use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// BMI
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BmiClass {
    #[serde(rename = "Abaixo do peso")]
    AbaixoDoPeso,
    #[serde(rename = "Peso normal")]
    PesoNormal,
    Sobrepeso,
    Obesidade,
}

impl BmiClass {
    pub fn of(bmi: f64) -> BmiClass {
        if bmi < 18.5 {
            BmiClass::AbaixoDoPeso
        } else if bmi < 25.0 {
            BmiClass::PesoNormal
        } else if bmi < 30.0 {
            BmiClass::Sobrepeso
        } else {
            BmiClass::Obesidade
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BmiClass::AbaixoDoPeso => "Abaixo do peso",
            BmiClass::PesoNormal => "Peso normal",
            BmiClass::Sobrepeso => "Sobrepeso",
            BmiClass::Obesidade => "Obesidade",
        }
    }
}

impl fmt::Display for BmiClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body-mass index, unrounded.
pub fn bmi(height_cm: f64, weight_kg: f64) -> f64 {
    let m = height_cm / 100.0;
    weight_kg / (m * m)
}

/// BMI rounded to one decimal. The rounded value is the one classified and
/// fed into the other heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bmi {
    pub value: f64,
    pub class: BmiClass,
}

impl Bmi {
    pub fn from_measurements(height_cm: f64, weight_kg: f64) -> Option<Bmi> {
        if height_cm.is_nan() || height_cm <= 0.0 || !weight_kg.is_finite() {
            return None;
        }
        let value = round1(bmi(height_cm, weight_kg));
        Some(Bmi {
            value,
            class: BmiClass::of(value),
        })
    }
}

// ---------------------------------------------------------------------------
// Calories and water
// ---------------------------------------------------------------------------

/// Weekly-frequency activity multipliers, highest threshold first.
const ACTIVITY_MULTIPLIERS: &[(u8, f64)] = &[(5, 1.55), (3, 1.375), (0, 1.2)];

/// Mifflin-St Jeor basal rate times an activity multiplier. Any sex other
/// than Masculino uses the female constant.
pub fn daily_calories(
    sex: Option<Sex>,
    weight_kg: f64,
    height_cm: f64,
    age: u8,
    frequency: Option<u8>,
) -> i64 {
    let sex_constant = if sex == Some(Sex::Masculino) { 5.0 } else { -161.0 };
    let bmr = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age) + sex_constant;
    let multiplier = tier(frequency.unwrap_or(0), ACTIVITY_MULTIPLIERS, 1.2);
    (bmr * multiplier).round() as i64
}

/// 35 ml per kg, in liters rounded to one decimal.
pub fn daily_water_liters(weight_kg: f64) -> f64 {
    round1(weight_kg * 35.0 / 1000.0)
}

// ---------------------------------------------------------------------------
// Lookup tables
// ---------------------------------------------------------------------------

/// Baseline body-fat range by self-reported body type.
const BODY_FAT_BY_TYPE: &[(Sex, BodyType, (f64, f64))] = &[
    (Sex::Feminino, BodyType::EmForma, (18.0, 22.0)),
    (Sex::Feminino, BodyType::Sobrepeso, (25.0, 30.0)),
    (Sex::Feminino, BodyType::AcimaDoPeso, (30.0, 35.0)),
    (Sex::Feminino, BodyType::Obesidade, (35.0, 40.0)),
    (Sex::Masculino, BodyType::Ectomorfo, (12.0, 16.0)),
    (Sex::Masculino, BodyType::Mesomorfo, (18.0, 22.0)),
    (Sex::Masculino, BodyType::Endomorfo, (22.0, 27.0)),
    (Sex::Masculino, BodyType::Obesidade, (27.0, 32.0)),
];

/// Body-fat range from BMI, used only when no body type was given.
const BODY_FAT_BY_BMI: &[(Sex, BmiClass, (f64, f64))] = &[
    (Sex::Feminino, BmiClass::AbaixoDoPeso, (18.0, 22.0)),
    (Sex::Feminino, BmiClass::PesoNormal, (22.0, 27.0)),
    (Sex::Feminino, BmiClass::Sobrepeso, (28.0, 33.0)),
    (Sex::Feminino, BmiClass::Obesidade, (35.0, 40.0)),
    (Sex::Masculino, BmiClass::AbaixoDoPeso, (10.0, 14.0)),
    (Sex::Masculino, BmiClass::PesoNormal, (14.0, 18.0)),
    (Sex::Masculino, BmiClass::Sobrepeso, (20.0, 25.0)),
    (Sex::Masculino, BmiClass::Obesidade, (27.0, 32.0)),
];

const MUSCLE_BY_TYPE: &[(Sex, BodyType, f64)] = &[
    (Sex::Feminino, BodyType::EmForma, 3.0),
    (Sex::Feminino, BodyType::Sobrepeso, 2.0),
    (Sex::Feminino, BodyType::AcimaDoPeso, 1.5),
    (Sex::Feminino, BodyType::Obesidade, 1.0),
    (Sex::Masculino, BodyType::Ectomorfo, 2.0),
    (Sex::Masculino, BodyType::Mesomorfo, 3.0),
    (Sex::Masculino, BodyType::Endomorfo, 2.5),
    (Sex::Masculino, BodyType::Obesidade, 1.5),
];

const MUSCLE_BY_BMI: &[(BmiClass, f64)] = &[
    (BmiClass::AbaixoDoPeso, 2.0),
    (BmiClass::PesoNormal, 2.5),
    (BmiClass::Sobrepeso, 2.0),
    (BmiClass::Obesidade, 1.5),
];

const FITNESS_AGE_BY_BMI: &[(BmiClass, f64)] = &[
    (BmiClass::AbaixoDoPeso, 1.0),
    (BmiClass::PesoNormal, 0.0),
    (BmiClass::Sobrepeso, 3.0),
    (BmiClass::Obesidade, 6.0),
];

/// Per-experience values, in the order Iniciante, Intermediário, Avançado.
type ByExperience = [f64; 3];

const FAT_EXPERIENCE_DELTA: ByExperience = [0.0, -0.5, -1.0];
const FITNESS_AGE_EXPERIENCE_DELTA: ByExperience = [2.0, -1.0, -3.0];
const FITNESS_AGE_EXPERIENCE_IMPROVEMENT: ByExperience = [0.5, 0.0, -0.5];
const MUSCLE_EXPERIENCE_DELTA: ByExperience = [0.0, 0.5, 1.0];

/// Weekly-frequency tiers, highest threshold first. Absent frequency is 0.
type FrequencyTiers = &'static [(u8, f64)];

const FAT_FREQUENCY_DELTA: FrequencyTiers = &[(5, -1.0), (3, -0.5)];
const FITNESS_AGE_FREQUENCY_DELTA: FrequencyTiers = &[(5, -2.0), (3, -1.0), (2, 0.0), (0, 1.0)];
const MUSCLE_FREQUENCY_DELTA: FrequencyTiers = &[(5, 0.5), (3, 0.3)];
const MUSCLE_GAIN_FREQUENCY_BONUS: FrequencyTiers = &[(5, 0.3), (3, 0.2)];

/// Six-month deltas that depend on the primary objective.
struct ObjectivePlan {
    objective: Option<Objective>,
    fat_reduction: f64,
    fat_frequency_bonus: FrequencyTiers,
    /// Extra reduction for beginners.
    fat_beginner_bonus: f64,
    fitness_age_improvement: f64,
    fitness_age_frequency_bonus: FrequencyTiers,
    muscle_gain: ByExperience,
}

const OBJECTIVE_PLANS: &[ObjectivePlan] = &[
    ObjectivePlan {
        objective: Some(Objective::Emagrecimento),
        fat_reduction: 4.0,
        fat_frequency_bonus: &[(4, 1.5), (3, 0.5)],
        fat_beginner_bonus: 0.5,
        fitness_age_improvement: 2.0,
        fitness_age_frequency_bonus: &[(4, 1.0), (3, 0.5)],
        muscle_gain: [1.0, 0.7, 0.5],
    },
    ObjectivePlan {
        objective: Some(Objective::Hipertrofia),
        fat_reduction: 2.0,
        fat_frequency_bonus: &[(4, 1.0), (3, 0.5)],
        fat_beginner_bonus: 0.0,
        fitness_age_improvement: 2.5,
        fitness_age_frequency_bonus: &[(4, 1.5), (3, 0.5)],
        muscle_gain: [1.5, 1.0, 0.7],
    },
    ObjectivePlan {
        objective: Some(Objective::Forca),
        fat_reduction: 3.0,
        fat_frequency_bonus: &[(4, 1.0), (3, 0.5)],
        fat_beginner_bonus: 0.0,
        fitness_age_improvement: 2.5,
        fitness_age_frequency_bonus: &[(4, 1.5), (3, 0.5)],
        muscle_gain: [1.5, 1.0, 0.7],
    },
    ObjectivePlan {
        objective: None,
        fat_reduction: 3.0,
        fat_frequency_bonus: &[],
        fat_beginner_bonus: 0.0,
        fitness_age_improvement: 2.0,
        fitness_age_frequency_bonus: &[],
        muscle_gain: [1.0, 0.7, 0.7],
    },
];

const MAX_FAT_REDUCTION: f64 = 6.0;
const MAX_FITNESS_AGE_IMPROVEMENT: f64 = 4.0;
const MAX_MUSCLE_GAIN: f64 = 2.0;
const FITNESS_AGE_FLOOR_YEARS: i32 = 8;
const MUSCLE_LEVELS: (f64, f64) = (1.0, 5.0);

fn body_fat_floor(sex: Sex) -> f64 {
    match sex {
        Sex::Feminino => 16.0,
        Sex::Masculino => 8.0,
    }
}

fn default_body_fat(sex: Sex) -> (f64, f64) {
    match sex {
        Sex::Feminino => (22.0, 25.0),
        Sex::Masculino => (18.0, 22.0),
    }
}

// ---------------------------------------------------------------------------
// Table helpers
// ---------------------------------------------------------------------------

fn tier(frequency: u8, tiers: &[(u8, f64)], otherwise: f64) -> f64 {
    tiers
        .iter()
        .find(|(min, _)| frequency >= *min)
        .map(|(_, v)| *v)
        .unwrap_or(otherwise)
}

fn by_experience(experience: Experience, values: ByExperience) -> f64 {
    match experience {
        Experience::Iniciante => values[0],
        Experience::Intermediario => values[1],
        Experience::Avancado => values[2],
    }
}

fn lookup<K: PartialEq + Copy, V: Copy>(table: &[(K, V)], key: K) -> Option<V> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

fn lookup_pair<A: PartialEq, B: PartialEq, V: Copy>(table: &[(A, B, V)], a: A, b: B) -> Option<V> {
    table
        .iter()
        .find(|(ka, kb, _)| *ka == a && *kb == b)
        .map(|(_, _, v)| *v)
}

fn plan_for(objective: Option<Objective>) -> &'static ObjectivePlan {
    OBJECTIVE_PLANS
        .iter()
        .find(|p| p.objective == objective)
        .unwrap_or(&OBJECTIVE_PLANS[OBJECTIVE_PLANS.len() - 1])
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BodyFatRange {
    pub min: u32,
    pub max: u32,
}

impl BodyFatRange {
    pub fn midpoint(&self) -> f64 {
        f64::from(self.min) + f64::from(self.max - self.min) / 2.0
    }
}

impl fmt::Display for BodyFatRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}%", self.min, self.max)
    }
}

/// Today's value and the six-month projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Projection<T> {
    pub current: T,
    pub future: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transformation {
    pub body_fat: Projection<BodyFatRange>,
    /// Needs an age; omitted otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fitness_age: Option<Projection<u32>>,
    pub muscle_level: Projection<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi: Option<Bmi>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_calories: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_water_liters: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transformation: Option<Transformation>,
}

// ---------------------------------------------------------------------------
// MetricsEstimator
// ---------------------------------------------------------------------------

/// Inputs shared by the transformation heuristics, with absent answers
/// resolved to their defaults.
struct Profile {
    sex: Sex,
    body_type: Option<BodyType>,
    bmi: Option<BmiClass>,
    experience: Experience,
    frequency: u8,
    plan: &'static ObjectivePlan,
}

pub struct MetricsEstimator;

impl MetricsEstimator {
    pub fn estimate(answers: &OnboardingAnswers) -> DerivedMetrics {
        let bmi = match (answers.altura, answers.peso_atual) {
            (Some(h), Some(w)) => Bmi::from_measurements(h, w),
            _ => None,
        };
        let daily_calories = match (answers.peso_atual, answers.altura, answers.idade) {
            (Some(w), Some(h), Some(age)) => Some(daily_calories(
                answers.sexo,
                w,
                h,
                age,
                answers.frequencia_semanal,
            )),
            _ => None,
        };
        DerivedMetrics {
            bmi,
            daily_calories,
            daily_water_liters: answers.peso_atual.map(daily_water_liters),
            transformation: Self::transformation(answers, bmi),
        }
    }

    fn transformation(answers: &OnboardingAnswers, bmi: Option<Bmi>) -> Option<Transformation> {
        let profile = Profile {
            sex: answers.sexo?,
            body_type: answers.tipo_corpo,
            bmi: bmi.map(|b| b.class),
            experience: answers.experiencia.unwrap_or(Experience::Iniciante),
            frequency: answers.frequencia_semanal.unwrap_or(0),
            plan: plan_for(answers.objetivo),
        };

        let fat_now = body_fat_current(&profile);
        let muscle_now = muscle_current(&profile);
        let fitness_age = answers.idade.map(|age| {
            let current = fitness_age_current(&profile, age);
            Projection {
                current,
                future: fitness_age_future(&profile, age, current),
            }
        });

        Some(Transformation {
            body_fat: Projection {
                current: fat_now,
                future: body_fat_future(&profile, fat_now),
            },
            fitness_age,
            muscle_level: Projection {
                current: muscle_now,
                future: muscle_future(&profile, muscle_now),
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Body fat
// ---------------------------------------------------------------------------

fn body_fat_current(p: &Profile) -> BodyFatRange {
    let floor = body_fat_floor(p.sex);
    let base = match p.body_type {
        Some(bt) => lookup_pair(BODY_FAT_BY_TYPE, p.sex, bt),
        None => p.bmi.and_then(|c| lookup_pair(BODY_FAT_BY_BMI, p.sex, c)),
    };
    let (mut min, mut max) = base.unwrap_or_else(|| default_body_fat(p.sex));

    for delta in [
        by_experience(p.experience, FAT_EXPERIENCE_DELTA),
        tier(p.frequency, FAT_FREQUENCY_DELTA, 0.0),
    ] {
        if delta != 0.0 {
            min = (min + delta).max(floor);
            max = (max + delta).max(floor);
        }
    }

    let min = floor.max(min.round());
    let max = (min + 1.0).max(max.round());
    BodyFatRange {
        min: min as u32,
        max: max as u32,
    }
}

fn body_fat_future(p: &Profile, now: BodyFatRange) -> BodyFatRange {
    let floor = body_fat_floor(p.sex);
    let plan = p.plan;
    let mut reduction = plan.fat_reduction + tier(p.frequency, plan.fat_frequency_bonus, 0.0);
    if p.experience == Experience::Iniciante {
        reduction += plan.fat_beginner_bonus;
    }
    let reduction = reduction.min(MAX_FAT_REDUCTION);

    let future = floor.max(now.midpoint() - reduction);
    let min = floor.max((future - 1.0).round());
    let max = (future + 1.0).round();
    BodyFatRange {
        min: min as u32,
        max: max as u32,
    }
}

// ---------------------------------------------------------------------------
// Fitness age
// ---------------------------------------------------------------------------

fn fitness_age_current(p: &Profile, age: u8) -> u32 {
    let age = f64::from(age);
    let mut years = age;
    if let Some(class) = p.bmi {
        years += lookup(FITNESS_AGE_BY_BMI, class).unwrap_or(0.0);
    }
    years += by_experience(p.experience, FITNESS_AGE_EXPERIENCE_DELTA);
    years += tier(p.frequency, FITNESS_AGE_FREQUENCY_DELTA, 0.0);
    years.clamp(age - 5.0, age + 10.0) as u32
}

fn fitness_age_future(p: &Profile, age: u8, current: u32) -> u32 {
    let plan = p.plan;
    let improvement = (plan.fitness_age_improvement
        + tier(p.frequency, plan.fitness_age_frequency_bonus, 0.0)
        + by_experience(p.experience, FITNESS_AGE_EXPERIENCE_IMPROVEMENT))
    .min(MAX_FITNESS_AGE_IMPROVEMENT);
    let projected = (f64::from(current) - improvement).round() as i32;
    let floor = i32::from(age) - FITNESS_AGE_FLOOR_YEARS;
    projected.max(floor).max(0) as u32
}

// ---------------------------------------------------------------------------
// Muscle level
// ---------------------------------------------------------------------------

fn clamp_level(level: f64) -> u8 {
    let (lo, hi) = MUSCLE_LEVELS;
    level.round().clamp(lo, hi) as u8
}

fn muscle_current(p: &Profile) -> u8 {
    let base = match p.body_type {
        Some(bt) => lookup_pair(MUSCLE_BY_TYPE, p.sex, bt),
        None => p.bmi.and_then(|c| lookup(MUSCLE_BY_BMI, c)),
    }
    .unwrap_or(2.0);
    clamp_level(
        base + by_experience(p.experience, MUSCLE_EXPERIENCE_DELTA)
            + tier(p.frequency, MUSCLE_FREQUENCY_DELTA, 0.0),
    )
}

fn muscle_future(p: &Profile, current: u8) -> u8 {
    let gain = (by_experience(p.experience, p.plan.muscle_gain)
        + tier(p.frequency, MUSCLE_GAIN_FREQUENCY_BONUS, 0.0))
    .min(MAX_MUSCLE_GAIN);
    clamp_level(f64::from(current) + gain)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
