//! Question bank parsing.
//!
//! Two inputs end up as a [`QuestionBank`]:
//! - the free-text reply of an LLM asked for "Question 1: ..." followed by a
//!   numbered answer list with points in brackets, and
//! - TOML/JSON bank files written by hand or by `guessbot generate`.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::BankError;
use crate::model::{canonical_form, Question, QuestionBank};

// ---------------------------------------------------------------------------
// LLM replies
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct DraftQuestion {
    prompt: String,
    answers: Vec<AnswerLine>,
}

#[derive(Debug, PartialEq)]
struct AnswerLine {
    display: String,
    points: Option<u32>,
}

/// Parse a provider reply into a bank.
///
/// Each `Question N:` line opens a question; the following non-blank lines
/// are its answers. The first `slots` answers become scored slots (missing
/// points count as 0) and every answer, scored or not, goes on the opponent's
/// guess list. Text before the first header is ignored. Counts are not
/// checked here; see [`QuestionBank::validate`].
pub fn parse_completion(text: &str, slots: usize) -> Result<QuestionBank, BankError> {
    let mut drafts: Vec<DraftQuestion> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(prompt) = question_header(line) {
            drafts.push(DraftQuestion {
                prompt,
                answers: Vec::new(),
            });
            continue;
        }
        let Some(draft) = drafts.last_mut() else {
            continue;
        };
        if let Some(answer) = answer_line(line) {
            draft.answers.push(answer);
        }
    }

    if drafts.is_empty() {
        return Err(BankError::Unparsable(
            "no 'Question N:' headers found in reply".into(),
        ));
    }

    let mut questions = Vec::with_capacity(drafts.len());
    let mut guesses = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let scored = &draft.answers[..slots.min(draft.answers.len())];
        let display = scored.iter().map(|a| a.display.clone()).collect();
        let points = scored.iter().map(|a| a.points.unwrap_or(0)).collect();
        questions.push(Question::from_display(draft.prompt, display, points));
        guesses.push(draft.answers.into_iter().map(|a| a.display).collect());
    }
    QuestionBank::new(questions, guesses)
}

/// `Question 2: Name a fruit` -> `Name a fruit`. Leading markdown emphasis
/// and headings are tolerated.
fn question_header(line: &str) -> Option<String> {
    let line = line.trim_start_matches(['#', '*', ' ']);
    let keyword = line.get(..8)?;
    if !keyword.eq_ignore_ascii_case("question") {
        return None;
    }
    let rest = line[8..].trim_start();
    if !rest.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let prompt = match rest.find(':') {
        Some(colon) => &rest[colon + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.'),
    };
    Some(prompt.trim().trim_matches('*').trim().to_string())
}

/// `3. Golden Retriever (15)` -> display "Golden Retriever", 15 points.
fn answer_line(line: &str) -> Option<AnswerLine> {
    let body = strip_list_marker(line);

    let (display, points) = match trailing_points(body) {
        Some((open, points)) => (body[..open].trim(), Some(points)),
        None => (body.trim(), None),
    };
    let display = display.trim_end_matches([' ', '-', ':', '–']).trim();
    if canonical_form(display).is_empty() {
        return None;
    }
    Some(AnswerLine {
        display: display.to_string(),
        points,
    })
}

fn strip_list_marker(line: &str) -> &str {
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(['.', ')']) {
            return rest.trim_start();
        }
        return line;
    }
    line.strip_prefix(['-', '*', '•'])
        .map(str::trim_start)
        .unwrap_or(line)
}

/// Find the last `(NN ...)` group whose leading characters are digits.
/// Returns the byte offset of `(` and the number.
fn trailing_points(body: &str) -> Option<(usize, u32)> {
    let open = body.rfind('(')?;
    let close = body[open..].find(')')? + open;
    let inside = body[open + 1..close].trim();
    let digits: String = inside.chars().take_while(|c| c.is_ascii_digit()).collect();
    let points = digits.parse().ok()?;
    Some((open, points))
}

// ---------------------------------------------------------------------------
// Bank files
// ---------------------------------------------------------------------------

/// On-disk bank layout.
///
/// ```toml
/// [[questions]]
/// prompt = "Name a pet"
/// answers = ["Dog", "Cat", "Fish", "Bird", "Hamster", "Snake"]
/// points = [40, 25, 15, 10, 5, 5]
/// guesses = ["Dog", "Cat", "Fish", "Bird", "Hamster", "Snake", "Parrot"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankFile {
    #[serde(default)]
    pub questions: Vec<BankFileQuestion>,
}

/// One question in a [`BankFile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankFileQuestion {
    pub prompt: String,
    /// Display answers, one per slot.
    pub answers: Vec<String>,
    pub points: Vec<u32>,
    /// Matchable answers; derived from `answers` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<Vec<String>>,
    /// What the opponent may say; defaults to `answers`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guesses: Vec<String>,
}

impl BankFile {
    /// Build the in-memory bank, checking each question's shape.
    pub fn into_bank(self) -> Result<QuestionBank, BankError> {
        let mut questions = Vec::with_capacity(self.questions.len());
        let mut guesses = Vec::with_capacity(self.questions.len());
        for q in self.questions {
            let opponent = if q.guesses.is_empty() {
                q.answers.clone()
            } else {
                q.guesses
            };
            let question = match q.canonical {
                Some(canonical) => Question::new(q.prompt, canonical, q.answers, q.points),
                None => Question::from_display(q.prompt, q.answers, q.points),
            };
            questions.push(question);
            guesses.push(opponent);
        }
        QuestionBank::new(questions, guesses)
    }

    /// Describe an existing bank, omitting fields that equal their defaults.
    pub fn from_bank(bank: &QuestionBank) -> Self {
        let questions = bank
            .questions()
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let derived: Vec<String> =
                    q.display_answers().iter().map(|d| canonical_form(d)).collect();
                let guesses = bank.guesses(i);
                BankFileQuestion {
                    prompt: q.prompt().to_string(),
                    answers: q.display_answers().to_vec(),
                    points: q.point_values().to_vec(),
                    canonical: (derived != q.canonical_answers())
                        .then(|| q.canonical_answers().to_vec()),
                    guesses: if guesses == q.display_answers() {
                        Vec::new()
                    } else {
                        guesses.to_vec()
                    },
                }
            })
            .collect();
        Self { questions }
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize question bank")
    }
}

/// Load a bank from a `.toml` or `.json` file.
pub fn load_bank_file(path: &Path) -> Result<QuestionBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bank file: {}", path.display()))?;
    parse_bank_str(&content, path)
}

/// Parse bank file contents; the format follows `source_path`'s extension
/// (JSON for `.json`, TOML otherwise).
pub fn parse_bank_str(content: &str, source_path: &Path) -> Result<QuestionBank> {
    let is_json = source_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let file: BankFile = if is_json {
        serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?
    } else {
        toml::from_str(content)
            .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?
    };
    file.into_bank()
        .with_context(|| format!("invalid question bank: {}", source_path.display()))
}
