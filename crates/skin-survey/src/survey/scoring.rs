//! Baumann survey scoring.
//!
//! Every function here is pure: responses go in, an [`EvaluationResult`] comes out. Unknown
//! answers are scored as the neutral midpoint and penalize confidence instead of failing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::questions::{first_tie_breaker, primary_for, Axis, Letter, Question, Scoring};

/// Averages at or below this value resolve to the axis' low letter.
pub const LOW_THRESHOLD: f64 = 2.6;
/// Averages at or above this value resolve to the axis' high letter.
pub const HIGH_THRESHOLD: f64 = 3.4;
/// Fallback split used when a tie-break still leaves the axis inside the band.
pub const MAJORITY_SPLIT: f64 = 3.0;
/// Added to the primary stdev once a tie-break item is folded in.
pub const TIE_BREAK_STDEV_PENALTY: f64 = 0.2;

/// A single answer on the 1-5 agreement scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Likert(u8);

impl Likert {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    pub const NEUTRAL: Likert = Likert(3);

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&value)
            .then_some(Likert(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Likert {
    type Error = InvalidLikert;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Likert::new(value).ok_or(InvalidLikert(value))
    }
}

impl From<Likert> for u8 {
    fn from(value: Likert) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("answer {0} is outside the 1-5 scale")]
pub struct InvalidLikert(pub u8);

/// Answers keyed by question id. A missing key and an explicit `None` both mean "unknown".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Responses(BTreeMap<String, Option<Likert>>);

impl Responses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, question_id: &str) -> Option<Likert> {
        self.0.get(question_id).copied().flatten()
    }

    pub fn set(&mut self, question_id: impl Into<String>, value: Option<Likert>) {
        self.0.insert(question_id.into(), value);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<Likert>)> {
        self.0.iter().map(|(id, value)| (id.as_str(), *value))
    }
}

impl<K: Into<String>> FromIterator<(K, Option<Likert>)> for Responses {
    fn from_iter<I: IntoIterator<Item = (K, Option<Likert>)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(id, value)| (id.into(), value))
                .collect(),
        )
    }
}

/// Flips a raw answer for reverse-scored items.
pub fn apply_reverse(raw: Likert, scoring: Scoring) -> u8 {
    match scoring {
        Scoring::Direct => raw.value(),
        Scoring::Reversed => 6 - raw.value(),
    }
}

/// Aggregate statistics over one axis' primary answers.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisStats {
    pub average: f64,
    pub unknown_count: usize,
    pub stdev: f64,
    pub scored: Vec<u8>,
}

/// `values` must be aligned with `questions`. Unknown answers are substituted with the
/// neutral value before reverse scoring.
pub fn compute_axis_stats(values: &[Option<Likert>], questions: &[&Question]) -> AxisStats {
    debug_assert_eq!(values.len(), questions.len());

    let unknown_count = values.iter().filter(|value| value.is_none()).count();
    let scored: Vec<u8> = values
        .iter()
        .zip(questions)
        .map(|(value, question)| {
            apply_reverse(value.unwrap_or(Likert::NEUTRAL), question.scoring)
        })
        .collect();

    let count = scored.len().max(1) as f64;
    let average = scored.iter().map(|&value| f64::from(value)).sum::<f64>() / count;
    let variance = scored
        .iter()
        .map(|&value| (f64::from(value) - average).powi(2))
        .sum::<f64>()
        / count;

    AxisStats {
        average,
        unknown_count,
        stdev: variance.sqrt(),
        scored,
    }
}

/// `None` means the average sits inside the indifference band.
pub fn decide_letter(average: f64, axis: Axis) -> Option<Letter> {
    if average <= LOW_THRESHOLD {
        Some(axis.low_letter())
    } else if average >= HIGH_THRESHOLD {
        Some(axis.high_letter())
    } else {
        None
    }
}

pub fn compute_confidence(stdev: f64, unknown_count: usize, used_tie_break: bool) -> u8 {
    let penalty = stdev * 10.0
        + unknown_count as f64 * 5.0
        + if used_tie_break { 5.0 } else { 0.0 };
    (100.0 - penalty).round().clamp(0.0, 100.0) as u8
}

/// Per-axis outcome of an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisResult {
    pub axis: Axis,
    /// Rounded to two decimals; letters are decided on the unrounded value.
    pub average: f64,
    pub letter: Option<Letter>,
    pub confidence: u8,
    pub used_tie_break: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tie_break_id: Option<String>,
}

impl AxisResult {
    /// Position along the axis, 0.0 at the low end and 1.0 at the high end.
    pub fn position(&self) -> f64 {
        (self.average - 1.0) / 4.0
    }

    pub fn is_decided(&self) -> bool {
        self.letter.is_some()
    }
}

/// Tie-breaker that must be answered before the axis can resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTieBreak {
    pub axis: Axis,
    pub question_id: String,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub axes: Vec<AxisResult>,
    pub pending_tie_breaks: Vec<PendingTieBreak>,
    pub type_code: Option<String>,
    pub overall_confidence: Option<f64>,
}

impl EvaluationResult {
    pub fn is_final(&self) -> bool {
        self.type_code.is_some()
    }

    pub fn axis(&self, axis: Axis) -> Option<&AxisResult> {
        self.axes.iter().find(|result| result.axis == axis)
    }

    /// Where `axis` landed between its low (0.0) and high (1.0) letter.
    pub fn axis_position(&self, axis: Axis) -> Option<f64> {
        self.axis(axis).map(AxisResult::position)
    }

    pub fn pending_axes(&self) -> Vec<Axis> {
        self.pending_tie_breaks
            .iter()
            .map(|pending| pending.axis)
            .collect()
    }
}

/// Scores all four axes, escalating undecided ones to their first tie-breaker.
pub fn evaluate(responses: &Responses, tie_breaks: &Responses) -> EvaluationResult {
    let mut axes = Vec::with_capacity(Axis::ALL.len());
    let mut pending_tie_breaks = Vec::new();
    let mut letters = Vec::with_capacity(Axis::ALL.len());
    let mut confidences = Vec::with_capacity(Axis::ALL.len());

    for axis in Axis::ALL {
        let questions: Vec<&Question> = primary_for(axis).collect();
        let values: Vec<Option<Likert>> = questions
            .iter()
            .map(|question| responses.get(question.id))
            .collect();

        let AxisStats {
            mut average,
            unknown_count,
            mut stdev,
            ..
        } = compute_axis_stats(&values, &questions);

        let mut letter = decide_letter(average, axis);
        let mut used_tie_break = false;
        let mut tie_break_id = None;

        if letter.is_none() {
            let tie_breaker = first_tie_breaker(axis);
            tie_break_id = Some(tie_breaker.id.to_string());

            let Some(answer) = tie_breaks.get(tie_breaker.id) else {
                axes.push(AxisResult {
                    axis,
                    average: round_to(average, 2),
                    letter: None,
                    confidence: compute_confidence(stdev, unknown_count, false),
                    used_tie_break: false,
                    tie_break_id,
                });
                pending_tie_breaks.push(PendingTieBreak {
                    axis,
                    question_id: tie_breaker.id.to_string(),
                    prompt: tie_breaker.prompt.to_string(),
                });
                letters.push(None);
                continue;
            };

            let count = questions.len() as f64;
            let tie_break_scored = f64::from(apply_reverse(answer, tie_breaker.scoring));
            average = (average * count + tie_break_scored) / (count + 1.0);
            stdev += TIE_BREAK_STDEV_PENALTY;
            used_tie_break = true;
            letter = Some(decide_letter(average, axis).unwrap_or(if average >= MAJORITY_SPLIT {
                axis.high_letter()
            } else {
                axis.low_letter()
            }));
        }

        let confidence = compute_confidence(stdev, unknown_count, used_tie_break);
        axes.push(AxisResult {
            axis,
            average: round_to(average, 2),
            letter,
            confidence,
            used_tie_break,
            tie_break_id,
        });
        letters.push(letter);
        confidences.push(confidence);
    }

    let type_code = letters
        .iter()
        .copied()
        .collect::<Option<Vec<Letter>>>()
        .map(|letters| letters.iter().map(|letter| letter.as_char()).collect());

    let overall_confidence = (!confidences.is_empty()).then(|| {
        let total: f64 = confidences.iter().map(|&value| f64::from(value)).sum();
        round_to(total / confidences.len() as f64, 1)
    });

    EvaluationResult {
        axes,
        pending_tie_breaks,
        type_code,
        overall_confidence,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
