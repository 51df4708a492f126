//! End-to-end sessions: generated questions, a scripted bot and a synthetic
//! clock, from menu to scoreboard and back.

use std::sync::Arc;
use std::time::{Duration, Instant};

use guessbot_core::config::GameConfig;
use guessbot_core::dice::ScriptedDice;
use guessbot_core::error::{BankError, SessionError};
use guessbot_core::generator::{GeneratorConfig, LlmQuestionSource};
use guessbot_core::history::Side;
use guessbot_core::round::Feedback;
use guessbot_core::session::{Phase, Session};
use guessbot_providers::mock::MockProvider;
use guessbot_providers::ProviderError;

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

fn session_over(provider: MockProvider, dice: ScriptedDice) -> Session {
    let source = LlmQuestionSource::new(
        Arc::new(provider),
        GeneratorConfig::default(),
        GameConfig::default(),
    );
    Session::new(Arc::new(source), GameConfig::default(), Box::new(dice)).unwrap()
}

#[tokio::test]
async fn generated_session_runs_to_scoreboard() {
    // Round 1: the bot says Dog at 8s and Fish at 16s. Later rounds it waits 15s.
    let dice = ScriptedDice::new([8, 8, 8, 15, 15, 15], [0, 1]);
    let mut session = session_over(MockProvider::new(), dice);
    session.start(Some("everyday life")).await.unwrap();
    let t0 = session.round_state().unwrap().started_at.unwrap();

    // Round 1: the player takes Cat before the bot gets there.
    assert_eq!(
        session.submit("cat"),
        Some(Feedback::Correct { slot: 1, points: 25 })
    );
    let bot = session.tick(t0 + secs(8)).bot_answer.unwrap();
    assert_eq!(bot.utterance, "Dog");
    assert_eq!(bot.points, Some(40));
    let bot = session.tick(t0 + secs(16)).bot_answer.unwrap();
    assert_eq!(bot.utterance, "Fish");
    assert_eq!(bot.points, Some(15));
    assert_eq!(session.submit("dog"), Some(Feedback::RepeatedAnswer { slot: 0 }));

    let snap = session.snapshot(t0 + secs(17));
    let round = snap.round.unwrap();
    assert_eq!(round.time_left_secs, 3);
    assert_eq!(round.remaining, 3);
    assert_eq!((round.player_score, round.opponent_score), (25, 55));

    // Round 2: a sweep before the bot's first answer at 15s.
    let t1 = t0 + secs(20);
    assert!(session.tick(t1).round_advanced);
    for guess in ["banana", "apple", "orange", "strawberry", "blueberry", "grapefruit"] {
        assert!(matches!(session.submit(guess), Some(Feedback::Correct { .. })));
    }
    assert_eq!(session.round_state().unwrap().remaining(), 0);
    assert_eq!(session.round_state().unwrap().player_score, 100);
    // Every slot is taken, so the bot's answer scores nothing.
    let bot = session.tick(t1 + secs(15)).bot_answer.unwrap();
    assert_eq!(bot.points, None);

    // Round 3: nobody answers.
    let t2 = t1 + secs(20);
    assert!(session.tick(t2).round_advanced);
    let end = session.tick(t2 + secs(20));
    assert!(end.finished);
    assert_eq!(session.phase(), Phase::Scoreboard);

    let board = session.scoreboard().unwrap();
    let rows: Vec<_> = board
        .rows
        .iter()
        .map(|r| (r.round, r.player, r.opponent, r.leader))
        .collect();
    assert_eq!(
        rows,
        vec![
            (1, 25, 55, Some(Side::Opponent)),
            (2, 100, 0, Some(Side::Player)),
            (3, 0, 0, None),
        ]
    );
    assert_eq!((board.totals.player, board.totals.opponent), (125, 55));
    assert_eq!(board.winner, Some(Side::Player));

    // Back to the menu and a second, freshly generated session.
    session.return_to_menu();
    assert!(session.history().is_none());
    session.start(None).await.unwrap();
    assert_eq!(session.phase(), Phase::Playing);
    assert!(session.history().unwrap().is_empty());
}

#[tokio::test]
async fn provider_failure_leaves_session_in_menu() {
    let provider = MockProvider::scripted([Err(ProviderError::Timeout(120))]);
    let mut session = session_over(provider, ScriptedDice::default());

    let err = session.start(None).await.unwrap_err();
    assert!(matches!(err, SessionError::Source(_)));
    assert!(err.to_string().contains("timed out"));
    assert_eq!(session.phase(), Phase::Menu);

    // The next attempt gets the fallback reply and starts normally.
    session.start(None).await.unwrap();
    assert_eq!(session.phase(), Phase::Playing);
}

#[tokio::test]
async fn malformed_reply_is_reported_as_bank_error() {
    let reply = "Question 1: Name a pet\n1. Dog (50)\n2. Cat (50)\n";
    let provider = MockProvider::scripted([Ok(reply.to_string())]);
    let mut session = session_over(provider, ScriptedDice::default());

    let err = session.start(None).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::MalformedBank(BankError::QuestionCount { expected: 3, found: 1 })
    ));
    assert_eq!(session.phase(), Phase::Menu);
}

#[tokio::test]
async fn restart_replays_the_same_questions() {
    let provider = Arc::new(MockProvider::new());
    let source = LlmQuestionSource::new(
        provider.clone(),
        GeneratorConfig::default(),
        GameConfig::default(),
    );
    let mut session = Session::new(
        Arc::new(source),
        GameConfig::default(),
        Box::new(ScriptedDice::default()),
    )
    .unwrap();
    session.start(None).await.unwrap();
    let t0 = session.round_state().unwrap().started_at.unwrap();
    let first_prompt = session.snapshot(t0).round.unwrap().prompt;

    for i in 1..=3 {
        session.tick(t0 + secs(20 * i));
    }
    assert_eq!(session.phase(), Phase::Scoreboard);

    let t1 = Instant::now() + secs(120);
    session.restart(t1).unwrap();
    assert_eq!(session.snapshot(t1).round.unwrap().prompt, first_prompt);
    assert_eq!(provider.call_count(), 1, "restart does not refetch");
}
