/// Literal token that introduces a question in generated text.
pub const QUESTION_MARKER: &str = "question#";

/// Unmarked candidates must be longer than this after cleanup.
const MIN_QUESTION_LEN: usize = 20;

/// Unmarked lines must be longer than this to count as standalone questions.
const MIN_STANDALONE_LEN: usize = 30;

struct Candidate {
    text: String,
    marked: bool,
}

/// Extract the ordered list of questions from free-form generated text.
///
/// Lines starting with [`QUESTION_MARKER`] open a question; following lines
/// are appended to it until the next marker. Heading and list lines (`#`,
/// `**`, `-`) never extend a question. Without an open question, a long line
/// containing `?` is taken as a question on its own.
///
/// Each candidate has a leading `N.` ordinal and all `**` removed. Every
/// kept question contains `?`; unmarked ones must also be longer than 20
/// characters.
///
/// Never fails; noise-only input yields an empty list.
pub fn parse_questions(text: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    let mut current = String::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(rest) = line.strip_prefix(QUESTION_MARKER) {
            flush(&mut current, &mut candidates);
            current.push_str(rest.trim());
        } else if !current.is_empty() {
            if !is_structural(line) {
                current.push(' ');
                current.push_str(line);
            }
        } else if is_standalone_question(line) {
            candidates.push(Candidate {
                text: line.replacen(QUESTION_MARKER, "", 1).trim().to_string(),
                marked: false,
            });
        }
    }
    flush(&mut current, &mut candidates);

    candidates
        .into_iter()
        .filter_map(|candidate| {
            let question = clean(&candidate.text);
            let long_enough = candidate.marked || question.chars().count() > MIN_QUESTION_LEN;
            (long_enough && question.contains('?')).then_some(question)
        })
        .collect()
}

fn flush(current: &mut String, out: &mut Vec<Candidate>) {
    let question = current.trim();
    if !question.is_empty() {
        out.push(Candidate {
            text: question.to_string(),
            marked: true,
        });
    }
    current.clear();
}

fn is_structural(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("**") || line.starts_with('-')
}

fn is_standalone_question(line: &str) -> bool {
    line.contains('?')
        && line.chars().count() > MIN_STANDALONE_LEN
        && !line.starts_with("**")
        && !line.starts_with('#')
}

fn clean(candidate: &str) -> String {
    strip_ordinal(candidate).replace("**", "").trim().to_string()
}

/// Remove a leading `12.` plus any whitespace after it.
fn strip_ordinal(s: &str) -> &str {
    let digits = s.len() - s.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return s;
    }
    match s[digits..].strip_prefix('.') {
        Some(rest) => rest.trim_start(),
        None => s,
    }
}
