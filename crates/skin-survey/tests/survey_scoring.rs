//! End-to-end scoring scenarios exercised through the public survey API.

use skin_survey::survey::questions::{first_tie_breaker, PRIMARY_QUESTIONS};
use skin_survey::survey::{
    evaluate, Axis, Letter, Likert, RespondentProfile, Responses, SessionId, SessionPhase,
    SkinDiagnosisPayload, SurveySession,
};

fn responses_from(values: [Option<u8>; 12]) -> Responses {
    PRIMARY_QUESTIONS
        .iter()
        .zip(values)
        .map(|(question, value)| (question.id, value.and_then(Likert::new)))
        .collect()
}

#[test]
fn neutral_survey_needs_one_tie_breaker_per_axis() {
    let responses = responses_from([Some(3); 12]);

    let result = evaluate(&responses, &Responses::new());

    assert!(result.type_code.is_none());
    let pending: Vec<&str> = result
        .pending_tie_breaks
        .iter()
        .map(|pending| pending.question_id.as_str())
        .collect();
    assert_eq!(pending, vec!["OD_TB1", "SR_TB1", "PN_TB1", "WT_TB1"]);
    assert!(result.axes.iter().all(|axis| axis.average == 3.0));
}

#[test]
fn answering_every_pending_tie_breaker_always_yields_a_code() {
    let fixtures = [
        [Some(3); 12],
        [None; 12],
        [
            Some(2),
            Some(3),
            Some(4),
            Some(3),
            Some(3),
            Some(3),
            Some(2),
            Some(4),
            Some(3),
            None,
            Some(3),
            Some(3),
        ],
    ];

    for fixture in fixtures {
        let responses = responses_from(fixture);
        let first = evaluate(&responses, &Responses::new());
        assert!(!first.pending_tie_breaks.is_empty());

        for answer in [None, Some(1), Some(3), Some(5)] {
            let tie_breaks: Responses = first
                .pending_tie_breaks
                .iter()
                .map(|pending| {
                    (
                        pending.question_id.clone(),
                        Some(answer.and_then(Likert::new).unwrap_or(Likert::NEUTRAL)),
                    )
                })
                .collect();

            let second = evaluate(&responses, &tie_breaks);
            assert!(second.is_final(), "fixture {fixture:?} answer {answer:?}");
            assert_eq!(second.type_code.as_ref().map(String::len), Some(4));
        }
    }
}

#[test]
fn all_unknown_answers_score_neutral_with_reduced_confidence() {
    let result = evaluate(&Responses::new(), &Responses::new());

    for axis in &result.axes {
        assert_eq!(axis.average, 3.0);
        assert_eq!(axis.confidence, 85);
        assert!(axis.letter.is_none());
    }
    assert_eq!(result.overall_confidence, None);
}

#[test]
fn strong_answers_produce_expected_type_code() {
    let responses = responses_from([
        Some(5),
        Some(1),
        Some(5),
        Some(1),
        Some(1),
        Some(2),
        Some(5),
        Some(4),
        Some(5),
        Some(1),
        Some(1),
        Some(1),
    ]);

    let result = evaluate(&responses, &Responses::new());

    assert_eq!(result.type_code.as_deref(), Some("DRPT"));
    assert_eq!(
        result.axis(Axis::OilyDry).and_then(|axis| axis.letter),
        Some(Letter::D)
    );
    assert!(result
        .overall_confidence
        .map(|confidence| confidence > 90.0)
        .unwrap_or(false));
}

#[test]
fn session_walkthrough_produces_backend_payload() {
    let mut session = SurveySession::new(
        SessionId("svy-walkthrough".to_string()),
        RespondentProfile {
            user_id: 3,
            nickname: None,
            birth_year: None,
            gender: "na".to_string(),
        },
    );

    for question in PRIMARY_QUESTIONS.iter() {
        let value = if question.axis == Axis::SensitiveResistant {
            Likert::new(3)
        } else {
            Likert::new(5)
        };
        session.answer(question.id, value).expect("answer accepted");
    }
    session.score().expect("first pass");
    assert_eq!(
        session.phase,
        SessionPhase::AnsweringTieBreak {
            pending: vec![Axis::SensitiveResistant]
        }
    );

    session
        .answer(first_tie_breaker(Axis::SensitiveResistant).id, Likert::new(1))
        .expect("tie-break accepted");
    let result = session.score().expect("second pass").clone();
    assert_eq!(result.type_code.as_deref(), Some("DRPW"));

    let payload = SkinDiagnosisPayload::from_result(&result, &session.profile)
        .expect("payload builds");
    assert_eq!(payload.skin_type_code, "DRPW");
    assert!(payload.skin_axes_json.contains("\"SR\""));
    session.mark_submitted().expect("marks submitted");
}
