//! Unit tests for the question parser and answer form.

use super::*;
use pretty_assertions::assert_eq;

// ============================================================================
// Marker handling
// ============================================================================

#[test]
fn test_single_marker_line() {
    assert_eq!(
        parse_questions("question#What is your name?"),
        vec!["What is your name?".to_string()]
    );
}

#[test]
fn test_two_markers_in_order() {
    let text = "\
question#**What was the size of your team at XYZ Corp?**
question#  How many users did the E-commerce Platform serve?  ";

    assert_eq!(
        parse_questions(text),
        vec![
            "What was the size of your team at XYZ Corp?".to_string(),
            "How many users did the E-commerce Platform serve?".to_string(),
        ]
    );
}

#[test]
fn test_marker_without_question_mark_is_dropped() {
    assert!(parse_questions("question#Please elaborate").is_empty());
}

#[test]
fn test_length_and_question_mark_boundaries() {
    // 20 characters, no '?'
    let twenty = "Please elaborate now";
    assert_eq!(twenty.len(), 20);
    assert!(parse_questions(&format!("question#{twenty}")).is_empty());

    // 21 characters with '?'
    let twenty_one = "What is your job now?";
    assert_eq!(twenty_one.len(), 21);
    assert_eq!(
        parse_questions(&format!("question#{twenty_one}")),
        vec![twenty_one.to_string()]
    );
}

#[test]
fn test_marked_question_skips_length_filter() {
    // Marked questions only need a '?'; the length filter is for unmarked lines.
    assert_eq!(parse_questions("question#Why?"), vec!["Why?".to_string()]);
    assert_eq!(
        parse_questions("question#Your GPA?"),
        vec!["Your GPA?".to_string()]
    );
    assert!(parse_questions("Why?").is_empty());
}

#[test]
fn test_continuation_lines_are_joined() {
    let text = "\
question#For your role at XYZ Corp:
what was the size of your team,
including direct reports?
question#What certifications do you hold that are relevant?";

    assert_eq!(
        parse_questions(text),
        vec![
            "For your role at XYZ Corp: what was the size of your team, including direct reports?"
                .to_string(),
            "What certifications do you hold that are relevant?".to_string(),
        ]
    );
}

#[test]
fn test_structural_lines_do_not_extend_question() {
    let text = "\
question#What was your annual marketing budget?
## Projects
- bullet that is not part of the question, is it really?
**Bold heading that looks like a question, does it not?**
continued text";

    assert_eq!(
        parse_questions(text),
        vec!["What was your annual marketing budget? continued text".to_string()]
    );
}

#[test]
fn test_ordinal_prefix_is_stripped() {
    let text = "question#3. What specific revenue targets did you achieve?";
    assert_eq!(
        parse_questions(text),
        vec!["What specific revenue targets did you achieve?".to_string()]
    );
}

#[test]
fn test_bare_marker_does_not_open_question() {
    let text = "question#\nWhat was the scale of the applications you worked on?";
    assert_eq!(
        parse_questions(text),
        vec!["What was the scale of the applications you worked on?".to_string()]
    );
}

// ============================================================================
// Standalone questions
// ============================================================================

#[test]
fn test_clean_output_is_recovered() {
    let questions = vec![
        "What was the size of your team at XYZ Corp?".to_string(),
        "Which performance metrics did you improve, and by how much?".to_string(),
        "What was your GPA, and did you receive any academic honors?".to_string(),
    ];

    let reparsed = parse_questions(&questions.join("\n"));
    assert_eq!(reparsed, questions);
    assert_eq!(parse_questions(&reparsed.join("\n")), reparsed);
}

#[test]
fn test_short_standalone_line_is_ignored() {
    assert!(parse_questions("Is this a question?").is_empty());
}

#[test]
fn test_standalone_heading_is_ignored() {
    assert!(parse_questions("# What should the heading of this section be?").is_empty());
    assert!(parse_questions("**What should the heading of this section be?**").is_empty());
}

#[test]
fn test_standalone_list_item_is_kept() {
    assert_eq!(
        parse_questions("- What was your annual marketing budget last year?"),
        vec!["- What was your annual marketing budget last year?".to_string()]
    );
}

// ============================================================================
// Noise
// ============================================================================

#[test]
fn test_empty_and_noise_input() {
    assert!(parse_questions("").is_empty());
    assert!(parse_questions("   \n\n\t").is_empty());
    assert!(parse_questions("CV Clarification Form\nInstructions:\n- answer everything").is_empty());
}

#[test]
fn test_generated_form_shape() {
    let text = "\
CV Clarification Form - [Candidate Name]
Thank you for submitting your resume. Please answer the following questions.
Instructions:
- Please answer all questions with specific details and numbers where possible

question#For your previous position at ABC Inc: What were your key achievements?

question#What specific industry certifications do you currently hold?

QUESTION COUNT SUMMARY:
- Work Experience: 1 question
TOTAL QUESTIONS: 2/35 maximum";

    // trailing plain lines are absorbed by the last open question
    assert_eq!(
        parse_questions(text),
        vec![
            "For your previous position at ABC Inc: What were your key achievements?".to_string(),
            "What specific industry certifications do you currently hold? \
             QUESTION COUNT SUMMARY: TOTAL QUESTIONS: 2/35 maximum"
                .to_string(),
        ]
    );
}

// ============================================================================
// QuestionForm
// ============================================================================

fn answers(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(q, a)| (q.to_string(), a.to_string()))
        .collect()
}

#[test]
fn test_form_pairs_questions_with_answers() {
    let text = "question#What was the size of your team?\nquestion#Which metrics did you improve?";
    let form = QuestionForm::build(
        text,
        &answers(&[("Which metrics did you improve?", "Latency by 40%")]),
    );

    assert_eq!(form.len(), 2);
    assert_eq!(form.items[0].index, 1);
    assert_eq!(form.items[0].answer, None);
    assert_eq!(form.items[1].index, 2);
    assert_eq!(form.items[1].answer.as_deref(), Some("Latency by 40%"));
    assert_eq!(form.answered_count(), 1);
}

#[test]
fn test_form_index_lookup() {
    let form = QuestionForm::build("question#What was the size of your team?", &BTreeMap::new());

    assert_eq!(form.get(1).unwrap().text, "What was the size of your team?");
    assert_eq!(
        form.get(0).unwrap_err(),
        ValidationError::QuestionIndexOutOfRange { index: 0, count: 1 }
    );
    assert_eq!(
        form.get(2).unwrap_err(),
        ValidationError::QuestionIndexOutOfRange { index: 2, count: 1 }
    );
}

#[test]
fn test_form_duplicate_texts() {
    let text = "\
question#What was the size of your team?
question#Which metrics did you improve?
question#What was the size of your team?
question#What was the size of your team?";

    let form = QuestionForm::build(text, &BTreeMap::new());
    assert_eq!(form.len(), 4);
    assert_eq!(form.duplicate_texts(), vec!["What was the size of your team?"]);
}

#[test]
fn test_empty_form() {
    let form = QuestionForm::build("no questions here", &BTreeMap::new());
    assert!(form.is_empty());
    assert!(form.duplicate_texts().is_empty());
}
