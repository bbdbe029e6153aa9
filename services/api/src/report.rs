use clap::Args;
use skin_survey::error::AppError;
use skin_survey::survey::{evaluate, EvaluationResult, QuestionCatalog, Responses};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// JSON object mapping primary question ids (Q1..Q12) to 1-5 or null
    #[arg(long)]
    pub(crate) responses: PathBuf,
    /// Optional JSON object with tie-breaker answers (e.g. OD_TB1)
    #[arg(long)]
    pub(crate) tie_breaks: Option<PathBuf>,
    /// Print the raw evaluation as JSON instead of the text summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_questions() {
    print!("{}", render_questions(&QuestionCatalog::standard()));
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        responses,
        tie_breaks,
        json,
    } = args;

    let responses = load_responses(&responses)?;
    let tie_breaks = match tie_breaks {
        Some(path) => load_responses(&path)?,
        None => Responses::new(),
    };

    let result = evaluate(&responses, &tie_breaks);
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_evaluation(&result));
    }

    Ok(())
}

fn load_responses(path: &Path) -> Result<Responses, AppError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub(crate) fn render_questions(catalog: &QuestionCatalog) -> String {
    let mut lines = vec![
        "Answer each item from 1 (not at all) to 5 (very much); leave it out if unsure."
            .to_string(),
    ];

    for section in &catalog.axes {
        lines.push(format!(
            "\n{} [{} <- -> {}]",
            section.title, section.low_letter, section.high_letter
        ));
        for question in &section.primary {
            lines.push(format!("- {}: {}", question.id, question.prompt));
        }
        lines.push("  Tie-breakers".to_string());
        for question in &section.tie_breakers {
            let reversed = if question.scoring.is_reversed() {
                " (reversed)"
            } else {
                ""
            };
            lines.push(format!("  - {}: {}{}", question.id, question.prompt, reversed));
        }
    }

    finish(lines)
}

pub(crate) fn render_evaluation(result: &EvaluationResult) -> String {
    let mut lines = Vec::new();

    match (&result.type_code, result.overall_confidence) {
        (Some(code), Some(confidence)) => {
            lines.push(format!("Baumann type: {code} | confidence {confidence}/100"));
        }
        _ => lines.push("Baumann type: undecided".to_string()),
    }

    for axis in &result.axes {
        let letter = axis
            .letter
            .map(|letter| letter.to_string())
            .unwrap_or_else(|| "?".to_string());
        let tie_break_note = if axis.used_tie_break {
            " | tie-breaker applied"
        } else {
            ""
        };
        lines.push(format!(
            "- {}: avg {:.2} -> {} (confidence {}) | {} <- {:.2} -> {}{}",
            axis.axis,
            axis.average,
            letter,
            axis.confidence,
            axis.axis.low_letter(),
            axis.position(),
            axis.axis.high_letter(),
            tie_break_note
        ));
    }

    if !result.pending_tie_breaks.is_empty() {
        lines.push("\nAnswer these tie-breakers to finish:".to_string());
        for pending in &result.pending_tie_breaks {
            lines.push(format!(
                "- [{}] {}: {}",
                pending.axis, pending.question_id, pending.prompt
            ));
        }
    }

    finish(lines)
}

fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
