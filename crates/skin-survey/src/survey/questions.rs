use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four independent bipolar skin dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Axis {
    #[serde(rename = "OD")]
    OilyDry,
    #[serde(rename = "SR")]
    SensitiveResistant,
    #[serde(rename = "PN")]
    PigmentedNonPigmented,
    #[serde(rename = "WT")]
    WrinkledTight,
}

impl Axis {
    /// Evaluation order; also the order of letters in a type code.
    pub const ALL: [Axis; 4] = [
        Axis::OilyDry,
        Axis::SensitiveResistant,
        Axis::PigmentedNonPigmented,
        Axis::WrinkledTight,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Axis::OilyDry => "OD",
            Axis::SensitiveResistant => "SR",
            Axis::PigmentedNonPigmented => "PN",
            Axis::WrinkledTight => "WT",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Axis::OilyDry => "Oily <-> Dry (OD)",
            Axis::SensitiveResistant => "Sensitive <-> Resistant (SR)",
            Axis::PigmentedNonPigmented => "Pigmented <-> Non-pigmented (PN)",
            Axis::WrinkledTight => "Wrinkle-prone <-> Tight (WT)",
        }
    }

    pub fn low_letter(self) -> Letter {
        match self {
            Axis::OilyDry => Letter::D,
            Axis::SensitiveResistant => Letter::R,
            Axis::PigmentedNonPigmented => Letter::N,
            Axis::WrinkledTight => Letter::T,
        }
    }

    pub fn high_letter(self) -> Letter {
        match self {
            Axis::OilyDry => Letter::O,
            Axis::SensitiveResistant => Letter::S,
            Axis::PigmentedNonPigmented => Letter::P,
            Axis::WrinkledTight => Letter::W,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Letter assigned to one end of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Letter {
    O,
    D,
    S,
    R,
    P,
    N,
    W,
    T,
}

impl Letter {
    pub fn as_char(self) -> char {
        match self {
            Letter::O => 'O',
            Letter::D => 'D',
            Letter::S => 'S',
            Letter::R => 'R',
            Letter::P => 'P',
            Letter::N => 'N',
            Letter::W => 'W',
            Letter::T => 'T',
        }
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// How a raw answer is interpreted before aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scoring {
    Direct,
    /// Agreement points toward the low end of the axis, so the answer is flipped (`6 - x`).
    Reversed,
}

impl Scoring {
    pub fn is_reversed(self) -> bool {
        matches!(self, Scoring::Reversed)
    }
}

/// Static questionnaire item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: &'static str,
    pub axis: Axis,
    pub prompt: &'static str,
    pub scoring: Scoring,
    pub high_letter: Letter,
}

const fn question(
    id: &'static str,
    axis: Axis,
    prompt: &'static str,
    scoring: Scoring,
    high_letter: Letter,
) -> Question {
    Question {
        id,
        axis,
        prompt,
        scoring,
        high_letter,
    }
}

use Axis::{OilyDry, PigmentedNonPigmented, SensitiveResistant, WrinkledTight};
use Scoring::{Direct, Reversed};

/// The twelve primary items, three per axis, grouped in axis order.
pub const PRIMARY_QUESTIONS: [Question; 12] = [
    question(
        "Q1",
        OilyDry,
        "Within 30 minutes of cleansing, my face feels tight or dry.",
        Reversed,
        Letter::O,
    ),
    question(
        "Q2",
        OilyDry,
        "By the afternoon my T-zone (forehead and nose) looks shiny.",
        Direct,
        Letter::O,
    ),
    question(
        "Q3",
        OilyDry,
        "Foundation often flakes and makes dead skin stand out.",
        Reversed,
        Letter::O,
    ),
    question(
        "Q4",
        SensitiveResistant,
        "New products often cause burning, stinging, or itching.",
        Direct,
        Letter::S,
    ),
    question(
        "Q5",
        SensitiveResistant,
        "Redness shows up easily with changes in season or temperature.",
        Direct,
        Letter::S,
    ),
    question(
        "Q6",
        SensitiveResistant,
        "I have a history of allergies, atopic skin, acne, or similar trouble.",
        Direct,
        Letter::S,
    ),
    question(
        "Q7",
        PigmentedNonPigmented,
        "Spots and blemishes form easily or linger for a long time.",
        Direct,
        Letter::P,
    ),
    question(
        "Q8",
        PigmentedNonPigmented,
        "I often skip sunscreen when I go out.",
        Direct,
        Letter::P,
    ),
    question(
        "Q9",
        PigmentedNonPigmented,
        "Brown or red marks (PIH/PIE) stay long after acne or wounds.",
        Direct,
        Letter::P,
    ),
    question(
        "Q10",
        WrinkledTight,
        "Expression lines around the eyes or mouth are getting more defined.",
        Direct,
        Letter::W,
    ),
    question(
        "Q11",
        WrinkledTight,
        "My skin loses elasticity sharply after an all-nighter or stress.",
        Direct,
        Letter::W,
    ),
    question(
        "Q12",
        WrinkledTight,
        "Fine dryness lines appear easily in dry environments.",
        Direct,
        Letter::W,
    ),
];

/// Supplementary items asked only when an axis lands in the indifference band.
pub const TIE_BREAKER_QUESTIONS: [Question; 8] = [
    question(
        "OD_TB1",
        OilyDry,
        "An hour after applying only toner, I often blot shine off my T-zone.",
        Direct,
        Letter::O,
    ),
    question(
        "OD_TB2",
        OilyDry,
        "Foundation or cushion often lifts and highlights flaky patches.",
        Reversed,
        Letter::O,
    ),
    question(
        "SR_TB1",
        SensitiveResistant,
        "Even mild exfoliants or retinoids easily cause stinging or redness.",
        Direct,
        Letter::S,
    ),
    question(
        "SR_TB2",
        SensitiveResistant,
        "I barely react to fragrance, alcohol, or essential oils.",
        Reversed,
        Letter::S,
    ),
    question(
        "PN_TB1",
        PigmentedNonPigmented,
        "After summer outdoor activity my tone darkens quickly and recovers slowly.",
        Direct,
        Letter::P,
    ),
    question(
        "PN_TB2",
        PigmentedNonPigmented,
        "Marks (PIH/PIE) remain for weeks after a breakout clears.",
        Direct,
        Letter::P,
    ),
    question(
        "WT_TB1",
        WrinkledTight,
        "Lines from expression habits such as frowning do not fade easily.",
        Direct,
        Letter::W,
    ),
    question(
        "WT_TB2",
        WrinkledTight,
        "Moisturizer alone quickly smooths out my dryness lines.",
        Reversed,
        Letter::W,
    ),
];

pub fn primary_for(axis: Axis) -> impl Iterator<Item = &'static Question> {
    PRIMARY_QUESTIONS
        .iter()
        .filter(move |question| question.axis == axis)
}

pub fn tie_breakers_for(axis: Axis) -> impl Iterator<Item = &'static Question> {
    TIE_BREAKER_QUESTIONS
        .iter()
        .filter(move |question| question.axis == axis)
}

/// The tie-breaker surfaced when the primary average is undecided.
pub fn first_tie_breaker(axis: Axis) -> &'static Question {
    match axis {
        Axis::OilyDry => &TIE_BREAKER_QUESTIONS[0],
        Axis::SensitiveResistant => &TIE_BREAKER_QUESTIONS[2],
        Axis::PigmentedNonPigmented => &TIE_BREAKER_QUESTIONS[4],
        Axis::WrinkledTight => &TIE_BREAKER_QUESTIONS[6],
    }
}

pub fn find_primary(id: &str) -> Option<&'static Question> {
    PRIMARY_QUESTIONS.iter().find(|question| question.id == id)
}

pub fn find_tie_breaker(id: &str) -> Option<&'static Question> {
    TIE_BREAKER_QUESTIONS
        .iter()
        .find(|question| question.id == id)
}

pub fn find(id: &str) -> Option<&'static Question> {
    find_primary(id).or_else(|| find_tie_breaker(id))
}

/// Serializable view of the full questionnaire.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionCatalog {
    pub axes: Vec<AxisSection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AxisSection {
    pub axis: Axis,
    pub title: &'static str,
    pub low_letter: Letter,
    pub high_letter: Letter,
    pub primary: Vec<Question>,
    pub tie_breakers: Vec<Question>,
}

impl QuestionCatalog {
    pub fn standard() -> Self {
        let axes = Axis::ALL
            .iter()
            .map(|&axis| AxisSection {
                axis,
                title: axis.title(),
                low_letter: axis.low_letter(),
                high_letter: axis.high_letter(),
                primary: primary_for(axis).copied().collect(),
                tie_breakers: tie_breakers_for(axis).copied().collect(),
            })
            .collect();

        Self { axes }
    }
}
