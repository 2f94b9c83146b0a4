//! Fact-or-Fake swipe game.
//!
//! A [`GameSession`] walks through a [`QuestionBank`] one card at a time.
//! Each card is either being presented or has been decided and is showing
//! its reveal:
//!
//! - `Presenting` -> `Revealing` on a decision (swipe, or a drag past
//!   [`DRAG_THRESHOLD`])
//! - `Revealing` -> `Presenting` on [`GameSession::advance`]
//!
//! The fly-off animation between the two is a presentation detail and has
//! no state of its own. Nothing is persisted; a new session starts over.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::{FactlensError, Result};

/// XP awarded for a correct answer.
pub const XP_PER_CORRECT: u32 = 5;

/// Extra XP for a correct answer made with a streak of at least two.
pub const STREAK_BONUS: u32 = 3;

/// XP a new session starts with.
pub const INITIAL_XP: u32 = 30;

/// Horizontal drag distance a release must exceed to count as a decision.
pub const DRAG_THRESHOLD: f64 = 120.0;

/// Hint shown on the right edge of the card.
pub const SWIPE_RIGHT_HINT: &str = "Swipe right for FACT";

/// Hint shown on the left edge of the card.
pub const SWIPE_LEFT_HINT: &str = "Swipe left for FAKE";

// ============================================================================
// Answers and directions
// ============================================================================

/// Ground truth of a statement, or a player's guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Answer {
    /// The statement is true.
    Fact,
    /// The statement is false.
    Fake,
}

impl Answer {
    /// Parses an answer case-insensitively.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "fact" => Some(Self::Fact),
            "fake" => Some(Self::Fake),
            _ => None,
        }
    }

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fact => "fact",
            Self::Fake => "fake",
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Answer {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_str_case_insensitive(s)
            .ok_or_else(|| format!("invalid answer '{s}': expected 'fact' or 'fake'"))
    }
}

impl<'de> Deserialize<'de> for Answer {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for Answer {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Direction a card was swiped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    /// Guess "fake".
    Left,
    /// Guess "fact".
    Right,
}

impl SwipeDirection {
    /// The guess this direction stands for.
    #[must_use]
    pub const fn answer(self) -> Answer {
        match self {
            Self::Right => Answer::Fact,
            Self::Left => Answer::Fake,
        }
    }

    /// Direction of a released drag, or `None` if it did not go past
    /// [`DRAG_THRESHOLD`]. Exactly the threshold does not count.
    #[must_use]
    pub fn from_offset(offset_x: f64) -> Option<Self> {
        if offset_x > DRAG_THRESHOLD {
            Some(Self::Right)
        } else if offset_x < -DRAG_THRESHOLD {
            Some(Self::Left)
        } else {
            None
        }
    }
}

// ============================================================================
// Question bank
// ============================================================================

/// A statement to classify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// The statement shown on the card.
    pub text: String,
    /// Whether the statement is true.
    pub answer: Answer,
    /// Shown after the player decides, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    fn new(text: &str, answer: Answer, explanation: &str) -> Self {
        Self {
            text: text.to_string(),
            answer,
            explanation: Some(explanation.to_string()),
        }
    }
}

/// A non-empty, ordered list of questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Creates a bank from a list of questions.
    ///
    /// # Errors
    ///
    /// Returns `FactlensError::QuestionBankError` if the list is empty.
    pub fn new(questions: Vec<Question>) -> Result<Self> {
        if questions.is_empty() {
            return Err(FactlensError::question_bank(
                "<inline>",
                "at least one question is required",
            ));
        }
        Ok(Self { questions })
    }

    /// The five built-in statements about misinformation.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            questions: vec![
                Question::new(
                    "A single viral tweet can reduce vaccine uptake in a city by more than 10%.",
                    Answer::Fact,
                    "Studies show misleading viral posts can measurably impact health decisions.",
                ),
                Question::new(
                    "Deepfake videos are always easy to spot if you look closely at the eyes and mouth.",
                    Answer::Fake,
                    "Some deepfakes are extremely polished; relying on one visual cue is risky.",
                ),
                Question::new(
                    "Images shared in private messaging apps cannot be manipulated or edited.",
                    Answer::Fake,
                    "Any image can be edited before sharing, regardless of where it is posted.",
                ),
                Question::new(
                    "Fact-checking a claim before sharing it can cut the spread of misinformation in your circles by half.",
                    Answer::Fact,
                    "Even small pauses before sharing can significantly reduce cascade effects.",
                ),
                Question::new(
                    "If a headline mentions a scientific \u{201c}breakthrough,\u{201d} it is guaranteed to be peer reviewed.",
                    Answer::Fake,
                    "Headlines often exaggerate; many \u{201c}breakthroughs\u{201d} are early-stage or unverified.",
                ),
            ],
        }
    }

    /// Loads a bank from a JSON array of `{ "text", "answer", "explanation" }`.
    ///
    /// # Errors
    ///
    /// Returns `FactlensError::QuestionBankError` if the file cannot be read,
    /// is not valid JSON, or holds no questions.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| FactlensError::question_bank(path, format!("failed to read file: {e}")))?;
        let questions: Vec<Question> = serde_json::from_str(&contents)
            .map_err(|e| FactlensError::question_bank(path, e.to_string()))?;
        if questions.is_empty() {
            return Err(FactlensError::question_bank(
                path,
                "at least one question is required",
            ));
        }
        debug!(path = %path.display(), count = questions.len(), "Loaded question bank");
        Ok(Self { questions })
    }

    /// Loads `questionsFile` when configured, otherwise the built-in bank.
    ///
    /// # Errors
    ///
    /// Same as [`QuestionBank::load_from_file`].
    pub fn from_config(config: &Config) -> Result<Self> {
        config
            .questions_file
            .as_deref()
            .map_or_else(|| Ok(Self::builtin()), |path| Self::load_from_file(Path::new(path)))
    }

    /// Number of questions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always `false`; a bank holds at least one question.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Question for a running index, wrapping around the end of the bank.
    #[must_use]
    pub fn get(&self, index: usize) -> &Question {
        &self.questions[index % self.questions.len()]
    }

    /// All questions in order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================================
// League
// ============================================================================

/// Rank derived from XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum League {
    /// Below 50 XP.
    Lv1,
    /// 50 to 79 XP.
    Lv2,
    /// 80 XP and above.
    Lv3,
}

impl League {
    /// Derives the league from XP. Lower bounds are inclusive.
    ///
    /// # Examples
    ///
    /// ```
    /// use factlens_core::League;
    ///
    /// assert_eq!(League::from_xp(30), League::Lv1);
    /// assert_eq!(League::from_xp(50), League::Lv2);
    /// assert_eq!(League::from_xp(80), League::Lv3);
    /// ```
    #[must_use]
    pub const fn from_xp(xp: u32) -> Self {
        if xp >= 80 {
            Self::Lv3
        } else if xp >= 50 {
            Self::Lv2
        } else {
            Self::Lv1
        }
    }

    /// Numeric level, 1 to 3.
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Self::Lv1 => 1,
            Self::Lv2 => 2,
            Self::Lv3 => 3,
        }
    }

    /// Title of the league.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Lv1 => "Curious Reader",
            Self::Lv2 => "Signal Seeker",
            Self::Lv3 => "Myth Buster",
        }
    }

    /// Full header label, e.g. `League: Lv 3 – Myth Buster`.
    #[must_use]
    pub fn label(self) -> String {
        format!("League: {self}")
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lv {} \u{2013} {}", self.level(), self.title())
    }
}

// ============================================================================
// Session
// ============================================================================

/// Logical phase of the current card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Waiting for a decision.
    Presenting,
    /// Showing the outcome of the last decision.
    Revealing,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Presenting => f.write_str("Presenting"),
            Self::Revealing => f.write_str("Revealing"),
        }
    }
}

/// Outcome of one decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reveal {
    /// Whether the guess matched the answer.
    pub was_correct: bool,
    /// What the player guessed.
    pub chosen_answer: Answer,
    /// The actual answer.
    pub correct_answer: Answer,
    /// Explanation from the question, if it has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Reveal {
    /// Headline shown on the reveal panel.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match (self.was_correct, self.correct_answer) {
            (true, Answer::Fact) => "It's a fact! +5 XP",
            (true, Answer::Fake) => "It's fake! +5 XP",
            (false, Answer::Fact) => "This one was actually a fact.",
            (false, Answer::Fake) => "This one was actually fake.",
        }
    }

    /// Short tag shown over the card.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        if self.was_correct {
            "Correct"
        } else {
            "Not quite"
        }
    }
}

/// Result of releasing a drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// The card returns to center; nothing changed.
    SnapBack,
    /// The drag counted as a decision.
    Decided(Reveal),
}

/// End-of-game totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    /// Decisions made.
    pub answered: u32,
    /// Decisions that were correct.
    pub correct: u32,
    /// XP at the end.
    pub xp: u32,
    /// Longest run of correct answers.
    pub best_streak: u32,
    /// League at the end.
    pub league: League,
}

/// One play-through of the swipe game.
#[derive(Debug, Clone)]
pub struct GameSession {
    bank: QuestionBank,
    current_index: usize,
    xp: u32,
    streak: u32,
    best_streak: u32,
    answered: u32,
    correct: u32,
    reveal: Option<Reveal>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(QuestionBank::builtin())
    }
}

impl GameSession {
    /// Starts a session at the first question with [`INITIAL_XP`].
    ///
    /// # Examples
    ///
    /// ```
    /// use factlens_core::{GameSession, QuestionBank};
    ///
    /// let game = GameSession::new(QuestionBank::builtin());
    /// assert_eq!(game.xp(), 30);
    /// assert_eq!(game.streak(), 0);
    /// assert_eq!(game.question_number(), 1);
    /// ```
    #[must_use]
    pub const fn new(bank: QuestionBank) -> Self {
        Self {
            bank,
            current_index: 0,
            xp: INITIAL_XP,
            streak: 0,
            best_streak: 0,
            answered: 0,
            correct: 0,
            reveal: None,
        }
    }

    /// Question on the current card.
    #[must_use]
    pub fn current_question(&self) -> &Question {
        self.bank.get(self.current_index)
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> GamePhase {
        if self.reveal.is_some() {
            GamePhase::Revealing
        } else {
            GamePhase::Presenting
        }
    }

    /// Records a decision for the current card.
    ///
    /// A correct answer earns [`XP_PER_CORRECT`], plus [`STREAK_BONUS`] when
    /// the streak before this answer is at least two, then extends the
    /// streak. A wrong answer resets the streak and leaves XP unchanged.
    ///
    /// # Errors
    ///
    /// Returns `FactlensError::InvalidStateTransition` if the current card
    /// has already been decided.
    pub fn decide(&mut self, direction: SwipeDirection) -> Result<&Reveal> {
        if self.reveal.is_some() {
            return Err(FactlensError::invalid_transition(
                GamePhase::Revealing,
                "decide",
            ));
        }

        let question = self.bank.get(self.current_index);
        let chosen_answer = direction.answer();
        let was_correct = chosen_answer == question.answer;
        let reveal = Reveal {
            was_correct,
            chosen_answer,
            correct_answer: question.answer,
            explanation: question.explanation.clone(),
        };

        self.answered += 1;
        if was_correct {
            let bonus = if self.streak >= 2 { STREAK_BONUS } else { 0 };
            self.xp += XP_PER_CORRECT + bonus;
            self.streak += 1;
            self.correct += 1;
            self.best_streak = self.best_streak.max(self.streak);
        } else {
            self.streak = 0;
        }

        debug!(
            question = self.question_number(),
            ?direction,
            was_correct,
            xp = self.xp,
            streak = self.streak,
            "Card decided"
        );

        Ok(&*self.reveal.insert(reveal))
    }

    /// Handles the release of a horizontal drag.
    ///
    /// Offsets within [`DRAG_THRESHOLD`] (inclusive) snap back without any
    /// state change; larger ones are decisions in the drag direction.
    ///
    /// # Errors
    ///
    /// Same as [`GameSession::decide`].
    pub fn drag_end(&mut self, offset_x: f64) -> Result<DragOutcome> {
        match SwipeDirection::from_offset(offset_x) {
            Some(direction) => self.decide(direction).cloned().map(DragOutcome::Decided),
            None => Ok(DragOutcome::SnapBack),
        }
    }

    /// Moves to the next card, wrapping around the bank.
    ///
    /// # Errors
    ///
    /// Returns `FactlensError::InvalidStateTransition` if the current card
    /// has not been decided yet.
    pub fn advance(&mut self) -> Result<()> {
        if self.reveal.is_none() {
            return Err(FactlensError::invalid_transition(
                GamePhase::Presenting,
                "advance",
            ));
        }
        self.reveal = None;
        self.current_index += 1;
        Ok(())
    }

    /// Current XP.
    #[must_use]
    pub const fn xp(&self) -> u32 {
        self.xp
    }

    /// Current run of correct answers.
    #[must_use]
    pub const fn streak(&self) -> u32 {
        self.streak
    }

    /// Running index; not reduced modulo the bank size.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    /// 1-based number shown on the card.
    #[must_use]
    pub const fn question_number(&self) -> usize {
        self.current_index + 1
    }

    /// Outcome of the last decision while revealing.
    #[must_use]
    pub const fn reveal(&self) -> Option<&Reveal> {
        self.reveal.as_ref()
    }

    /// League for the current XP.
    #[must_use]
    pub const fn league(&self) -> League {
        League::from_xp(self.xp)
    }

    /// Whether the streak badge is shown.
    #[must_use]
    pub const fn shows_streak(&self) -> bool {
        self.streak > 1
    }

    /// Reveal headline, while revealing.
    #[must_use]
    pub fn reveal_title(&self) -> Option<&'static str> {
        self.reveal.as_ref().map(Reveal::title)
    }

    /// The two swipe hints, left then right.
    #[must_use]
    pub const fn hints() -> [&'static str; 2] {
        [SWIPE_LEFT_HINT, SWIPE_RIGHT_HINT]
    }

    /// The question bank in use.
    #[must_use]
    pub const fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Totals so far.
    #[must_use]
    pub fn summary(&self) -> GameSummary {
        GameSummary {
            answered: self.answered,
            correct: self.correct,
            xp: self.xp,
            best_streak: self.best_streak,
            league: self.league(),
        }
    }
}
