//! Session controller.
//!
//! Owns everything one game needs (bank, round machine, bot dice, history)
//! and moves between `Menu -> Playing -> Scoreboard -> Menu`. A front end
//! feeds it two kinds of events: submitted guesses via [`Session::submit`]
//! and clock ticks via [`Session::tick`]. Both run to completion; nothing in
//! here blocks except fetching questions in [`Session::start`].

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};
use uuid::Uuid;

use crate::config::GameConfig;
use crate::dice::Dice;
use crate::error::{BankError, ConfigError, SessionError};
use crate::history::{Scoreboard, SessionHistory};
use crate::model::QuestionBank;
use crate::round::{BotAnswer, Feedback, RoundMachine, RoundPhase, RoundState};
use crate::traits::QuestionSource;

/// Top-level phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Menu,
    Playing,
    Scoreboard,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Menu => write!(f, "menu"),
            Phase::Playing => write!(f, "playing"),
            Phase::Scoreboard => write!(f, "scoreboard"),
        }
    }
}

/// What happened during one [`Session::tick`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// The round timer ran out and the next round (or the scoreboard) began.
    pub round_advanced: bool,
    /// The bot spoke this tick.
    pub bot_answer: Option<BotAnswer>,
    /// The session just reached the scoreboard.
    pub finished: bool,
}

/// A revealed slot as the display shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealedSlot {
    pub slot: usize,
    pub answer: String,
    pub points: u32,
}

/// Read-only view of the running round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundView {
    /// 1-based round number.
    pub number: usize,
    /// Total rounds in the session.
    pub total: usize,
    pub prompt: String,
    pub revealed: Vec<RevealedSlot>,
    /// Slots nobody has claimed.
    pub remaining: usize,
    pub time_left_secs: u64,
    pub player_score: u32,
    pub opponent_score: u32,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub phase: Phase,
    /// Present while playing.
    pub round: Option<RoundView>,
    pub last_feedback: Option<Feedback>,
    pub last_bot_answer: Option<BotAnswer>,
}

/// One player against the bot, from menu to scoreboard.
pub struct Session {
    id: Uuid,
    config: GameConfig,
    source: Arc<dyn QuestionSource>,
    dice: Box<dyn Dice>,
    phase: Phase,
    rounds: Option<RoundMachine>,
    last_feedback: Option<Feedback>,
    last_bot_answer: Option<BotAnswer>,
}

impl Session {
    /// A session sitting in the menu.
    pub fn new(
        source: Arc<dyn QuestionSource>,
        config: GameConfig,
        dice: Box<dyn Dice>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            config,
            source,
            dice,
            phase: Phase::Menu,
            rounds: None,
            last_feedback: None,
            last_bot_answer: None,
        })
    }

    /// Fetch a fresh bank and enter round one.
    ///
    /// A source failure or a bank of the wrong shape leaves the session in
    /// the menu. No retries happen here.
    pub async fn start(&mut self, theme: Option<&str>) -> Result<(), SessionError> {
        self.ensure_phase(Phase::Menu)?;
        info!(source = self.source.name(), ?theme, "fetching questions");

        let bank = self.source.fetch(theme).await.map_err(|err| {
            match err.downcast_ref::<BankError>() {
                Some(bank_err) => SessionError::MalformedBank(bank_err.clone()),
                None => SessionError::Source(err),
            }
        })?;
        self.begin(bank, Instant::now())
    }

    /// Enter round one with an already-fetched bank, timing from `now`.
    pub fn begin(&mut self, bank: QuestionBank, now: Instant) -> Result<(), SessionError> {
        self.ensure_phase(Phase::Menu)?;
        if let Err(err) = bank.validate(&self.config) {
            warn!(error = %err, "rejecting question bank");
            return Err(err.into());
        }
        self.launch(Arc::new(bank), now);
        Ok(())
    }

    /// Play the same bank again from round one with a fresh history.
    pub fn restart(&mut self, now: Instant) -> Result<(), SessionError> {
        self.ensure_phase(Phase::Scoreboard)?;
        let Some(bank) = self.rounds.as_ref().map(|r| Arc::clone(r.bank())) else {
            return Err(SessionError::NotAtScoreboard(self.phase));
        };
        self.launch(bank, now);
        Ok(())
    }

    /// Drop the bank, rounds, bot and history; back to a pristine menu.
    pub fn return_to_menu(&mut self) {
        if self.phase != Phase::Menu {
            info!(session = %self.id, "returning to menu");
        }
        self.rounds = None;
        self.last_feedback = None;
        self.last_bot_answer = None;
        self.phase = Phase::Menu;
    }

    /// Score a submitted guess. Ignored (returns `None`) unless playing.
    pub fn submit(&mut self, raw: &str) -> Option<Feedback> {
        if self.phase != Phase::Playing {
            return None;
        }
        let feedback = self.rounds.as_mut()?.on_player_guess(raw)?;
        self.last_feedback = Some(feedback);
        Some(feedback)
    }

    /// Poll the round timer, then the bot.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if self.phase != Phase::Playing {
            return outcome;
        }
        let Some(rounds) = self.rounds.as_mut() else {
            return outcome;
        };

        if rounds.on_time_expired(now, self.dice.as_mut()) {
            outcome.round_advanced = true;
            self.last_feedback = None;
            self.last_bot_answer = None;
        }

        if let Some(answer) = rounds.on_bot_tick(now, self.dice.as_mut()) {
            self.last_bot_answer = Some(answer.clone());
            outcome.bot_answer = Some(answer);
        }

        if rounds.phase() == RoundPhase::Scoreboard {
            self.phase = Phase::Scoreboard;
            outcome.finished = true;
            let totals = rounds.history().totals();
            info!(
                session = %self.id,
                player = totals.player,
                opponent = totals.opponent,
                "session finished"
            );
        }
        outcome
    }

    /// Frame data for the renderer.
    pub fn snapshot(&self, now: Instant) -> Snapshot {
        let round = match (self.phase, self.rounds.as_ref()) {
            (Phase::Playing, Some(rounds)) => round_view(rounds, now),
            _ => None,
        };
        Snapshot {
            phase: self.phase,
            round,
            last_feedback: self.last_feedback,
            last_bot_answer: self.last_bot_answer.clone(),
        }
    }

    /// Final table; only available on the scoreboard.
    pub fn scoreboard(&self) -> Option<Scoreboard> {
        if self.phase != Phase::Scoreboard {
            return None;
        }
        self.rounds.as_ref().map(|r| r.history().scoreboard())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn round_state(&self) -> Option<&RoundState> {
        self.rounds.as_ref().map(RoundMachine::state)
    }

    pub fn history(&self) -> Option<&SessionHistory> {
        self.rounds.as_ref().map(RoundMachine::history)
    }

    pub fn rounds(&self) -> Option<&RoundMachine> {
        self.rounds.as_ref()
    }

    pub fn last_feedback(&self) -> Option<Feedback> {
        self.last_feedback
    }

    pub fn last_bot_answer(&self) -> Option<&BotAnswer> {
        self.last_bot_answer.as_ref()
    }

    fn launch(&mut self, bank: Arc<QuestionBank>, now: Instant) {
        self.id = Uuid::new_v4();
        let mut rounds = RoundMachine::new(bank, self.config.clone());
        rounds.advance_round(now, self.dice.as_mut());
        self.rounds = Some(rounds);
        self.last_feedback = None;
        self.last_bot_answer = None;
        self.phase = Phase::Playing;
        info!(session = %self.id, "session started");
    }

    fn ensure_phase(&self, wanted: Phase) -> Result<(), SessionError> {
        if self.phase == wanted {
            return Ok(());
        }
        Err(match wanted {
            Phase::Scoreboard => SessionError::NotAtScoreboard(self.phase),
            _ => SessionError::NotInMenu(self.phase),
        })
    }
}

fn round_view(rounds: &RoundMachine, now: Instant) -> Option<RoundView> {
    let RoundPhase::Playing(index) = rounds.phase() else {
        return None;
    };
    let question = rounds.bank().question(index)?;
    let state = rounds.state();
    let revealed = state
        .revealed
        .iter()
        .enumerate()
        .filter(|(_, shown)| **shown)
        .map(|(slot, _)| RevealedSlot {
            slot,
            answer: question.display_answers()[slot].clone(),
            points: question.points_for(slot).unwrap_or(0),
        })
        .collect();
    Some(RoundView {
        number: index + 1,
        total: rounds.bank().len(),
        prompt: question.prompt().to_string(),
        revealed,
        remaining: state.remaining(),
        time_left_secs: rounds.time_left_secs(now),
        player_score: state.player_score,
        opponent_score: state.opponent_score,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::dice::ScriptedDice;
    use crate::history::Side;
    use crate::model::tests::{pets, sample_bank};
    use crate::source::StaticQuestionSource;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn session_with(bank: QuestionBank, dice: ScriptedDice) -> Session {
        Session::new(
            Arc::new(StaticQuestionSource::new(bank)),
            GameConfig::default(),
            Box::new(dice),
        )
        .unwrap()
    }

    struct FailingSource;

    #[async_trait]
    impl QuestionSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        async fn fetch(&self, _theme: Option<&str>) -> anyhow::Result<QuestionBank> {
            anyhow::bail!("provider unreachable")
        }
    }

    #[tokio::test]
    async fn start_enters_first_round() {
        let mut session = session_with(sample_bank(), ScriptedDice::default());
        assert_eq!(session.phase(), Phase::Menu);
        assert!(session.round_state().is_none());

        session.start(Some("pets")).await.unwrap();
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.round_state().unwrap().question_index, Some(0));

        let err = session.start(None).await.unwrap_err();
        assert!(matches!(err, SessionError::NotInMenu(Phase::Playing)));
    }

    #[tokio::test]
    async fn source_failure_stays_in_menu() {
        let mut session = Session::new(
            Arc::new(FailingSource),
            GameConfig::default(),
            Box::new(ScriptedDice::default()),
        )
        .unwrap();
        let err = session.start(None).await.unwrap_err();
        assert!(matches!(err, SessionError::Source(_)));
        assert!(err.to_string().contains("provider unreachable"));
        assert_eq!(session.phase(), Phase::Menu);
    }

    #[tokio::test]
    async fn malformed_bank_is_fatal_to_start() {
        let short = QuestionBank::without_decoys(vec![pets()]).unwrap();
        let mut session = session_with(short, ScriptedDice::default());
        let err = session.start(None).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::MalformedBank(BankError::QuestionCount { expected: 3, found: 1 })
        ));
        assert_eq!(session.phase(), Phase::Menu);
    }

    #[test]
    fn rejects_bad_config() {
        let config = GameConfig {
            bot_min_delay_secs: 20,
            ..Default::default()
        };
        let result = Session::new(
            Arc::new(StaticQuestionSource::new(sample_bank())),
            config,
            Box::new(ScriptedDice::default()),
        );
        assert!(matches!(result, Err(ConfigError::DelayRange { .. })));
    }

    #[test]
    fn guesses_only_count_while_playing() {
        let mut session = session_with(sample_bank(), ScriptedDice::default());
        assert_eq!(session.submit("dog"), None);

        session.begin(sample_bank(), Instant::now()).unwrap();
        assert_eq!(
            session.submit("Dog"),
            Some(Feedback::Correct { slot: 0, points: 40 })
        );
        assert_eq!(session.submit("dog"), Some(Feedback::RepeatedAnswer { slot: 0 }));
        assert_eq!(session.last_feedback(), Some(Feedback::RepeatedAnswer { slot: 0 }));
        assert_eq!(session.round_state().unwrap().player_score, 40);
    }

    #[test]
    fn full_session_reaches_scoreboard() {
        // Bot: first answer 8s in, picks slot 0 in round one only.
        let mut session = session_with(sample_bank(), ScriptedDice::new([8, 15], [0]));
        let t0 = Instant::now();
        session.begin(sample_bank(), t0).unwrap();

        session.submit("cat");
        let tick = session.tick(t0 + secs(8));
        let bot = tick.bot_answer.unwrap();
        assert_eq!((bot.pick, bot.points), (0, Some(40)));
        assert!(!tick.round_advanced);

        let tick = session.tick(t0 + secs(20));
        assert!(tick.round_advanced);
        assert_eq!(session.last_bot_answer(), None);
        assert_eq!(session.snapshot(t0 + secs(20)).round.unwrap().number, 2);

        session.submit("banana");
        session.submit("apple");
        session.tick(t0 + secs(40));
        session.submit("red");
        let tick = session.tick(t0 + secs(60));
        assert!(tick.finished);
        assert_eq!(session.phase(), Phase::Scoreboard);
        assert_eq!(session.submit("blue"), None);

        let board = session.scoreboard().unwrap();
        let history = session.history().unwrap();
        assert_eq!(history.player_scores(), &[25, 55, 35]);
        assert_eq!(history.opponent_scores(), &[40, 0, 0]);
        assert_eq!(board.rows[0].leader, Some(Side::Opponent));
        assert_eq!(board.totals.player, 115);
        assert_eq!(board.winner, Some(Side::Player));

        // Frozen once finished.
        assert_eq!(session.tick(t0 + secs(200)), TickOutcome::default());
        assert_eq!(session.history().unwrap().len(), 3);
    }

    #[test]
    fn snapshot_reports_round_view() {
        let mut session = session_with(sample_bank(), ScriptedDice::default());
        let t0 = Instant::now();
        assert!(session.snapshot(t0).round.is_none());

        session.begin(sample_bank(), t0).unwrap();
        session.submit("fish");
        let snap = session.snapshot(t0 + Duration::from_millis(4_500));
        let round = snap.round.unwrap();
        assert_eq!(round.number, 1);
        assert_eq!(round.total, 3);
        assert_eq!(round.prompt, "Name a pet");
        assert_eq!(round.time_left_secs, 16);
        assert_eq!(round.remaining, 5);
        assert_eq!(
            round.revealed,
            vec![RevealedSlot {
                slot: 2,
                answer: "Fish".into(),
                points: 15
            }]
        );
        assert_eq!(snap.last_feedback, Some(Feedback::Correct { slot: 2, points: 15 }));
    }

    #[test]
    fn restart_and_return_to_menu() {
        let mut session = session_with(sample_bank(), ScriptedDice::default());
        let t0 = Instant::now();
        assert!(matches!(
            session.restart(t0),
            Err(SessionError::NotAtScoreboard(Phase::Menu))
        ));

        session.begin(sample_bank(), t0).unwrap();
        let first_id = session.id();
        for i in 1..=3 {
            session.tick(t0 + secs(20 * i));
        }
        assert_eq!(session.phase(), Phase::Scoreboard);

        let t1 = t0 + secs(100);
        session.restart(t1).unwrap();
        assert_eq!(session.phase(), Phase::Playing);
        assert_ne!(session.id(), first_id);
        assert!(session.history().unwrap().is_empty());
        assert_eq!(session.round_state().unwrap().started_at, Some(t1));

        session.return_to_menu();
        assert_eq!(session.phase(), Phase::Menu);
        assert!(session.round_state().is_none());
        assert!(session.history().is_none());
        assert!(session.scoreboard().is_none());
        assert_eq!(session.snapshot(t1).last_feedback, None);
    }
}
