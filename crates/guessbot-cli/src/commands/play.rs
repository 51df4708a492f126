//! The `guessbot play` command.
//!
//! Two event streams drive the session: stdin lines (guesses and slash
//! commands) and a fixed-rate clock tick. Everything the player sees goes to
//! stdout; logs go to stderr.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use comfy_table::{Attribute, Cell, Color, Table};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use guessbot_core::dice::{Dice, SeededDice};
use guessbot_core::history::{Scoreboard, Side};
use guessbot_core::round::{BotAnswer, Feedback};
use guessbot_core::session::{Phase, RoundView, Session, TickOutcome};
use guessbot_providers::config::load_config_from;

use crate::sources::play_source;
use crate::SourceArgs;

/// Countdown values worth announcing.
const ANNOUNCED_SECONDS: [u64; 5] = [10, 5, 3, 2, 1];

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub async fn execute(
    source_args: SourceArgs,
    bank: Option<PathBuf>,
    seed: Option<u64>,
    tick_ms: u64,
) -> Result<()> {
    anyhow::ensure!(
        (10..=1000).contains(&tick_ms),
        "tick-ms must be between 10 and 1000"
    );

    let config = load_config_from(source_args.config.as_deref())?;
    let source = play_source(&source_args, bank.as_deref(), &config)?;
    let dice: Box<dyn Dice> = match seed {
        Some(seed) => Box::new(SeededDice::seeded(seed)),
        None => Box::new(SeededDice::from_entropy()),
    };
    let mut session = Session::new(source, config.game.clone(), dice)?;
    let mut screen = Screen::default();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_millis(tick_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    print_menu();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read from stdin")? else {
                    break;
                };
                let flow = handle_line(&mut session, &mut screen, &source_args, line.trim()).await?;
                if flow == Flow::Quit {
                    break;
                }
            }
            _ = ticker.tick() => {
                let outcome = session.tick(Instant::now());
                screen.on_tick(&session, &outcome);
            }
        }
    }

    println!("Bye!");
    Ok(())
}

async fn handle_line(
    session: &mut Session,
    screen: &mut Screen,
    args: &SourceArgs,
    input: &str,
) -> Result<Flow> {
    match (session.phase(), input) {
        (_, "/quit") => return Ok(Flow::Quit),
        (Phase::Menu, _) => {
            println!("Fetching questions...");
            match session.start(args.theme.as_deref()).await {
                Ok(()) => screen.on_round_start(session),
                Err(err) => {
                    println!("Could not start a game: {err}");
                    print_menu();
                }
            }
        }
        (Phase::Playing, text) => {
            if let Some(feedback) = session.submit(text) {
                screen.on_feedback(session, feedback);
            }
        }
        (Phase::Scoreboard, "/again") => {
            session.restart(Instant::now())?;
            screen.on_round_start(session);
        }
        (Phase::Scoreboard, "/menu") => {
            session.return_to_menu();
            print_menu();
        }
        (Phase::Scoreboard, _) => print_scoreboard_options(),
    }
    Ok(Flow::Continue)
}

/// Tracks what has already been printed so ticks only announce changes.
#[derive(Debug, Default)]
struct Screen {
    last_announced: Option<u64>,
}

impl Screen {
    fn on_round_start(&mut self, session: &Session) {
        self.last_announced = None;
        if let Some(round) = session.snapshot(Instant::now()).round {
            println!("{}", round_header(&round));
        }
    }

    fn on_feedback(&mut self, session: &Session, feedback: Feedback) {
        match session.snapshot(Instant::now()).round {
            Some(round) => println!("{feedback}   {}", status_line(&round)),
            None => println!("{feedback}"),
        }
    }

    fn on_tick(&mut self, session: &Session, outcome: &TickOutcome) {
        if outcome.finished {
            println!("Time's up!");
            if let Some(board) = session.scoreboard() {
                print_scoreboard(&board);
            }
            print_scoreboard_options();
            return;
        }
        if outcome.round_advanced {
            println!("Time's up!");
            self.on_round_start(session);
        }
        if let Some(answer) = &outcome.bot_answer {
            match session.snapshot(Instant::now()).round {
                Some(round) => println!("{}   {}", bot_line(answer), status_line(&round)),
                None => println!("{}", bot_line(answer)),
            }
        }

        let Some(round) = session.snapshot(Instant::now()).round else {
            return;
        };
        let left = round.time_left_secs;
        if ANNOUNCED_SECONDS.contains(&left) && self.last_announced != Some(left) {
            self.last_announced = Some(left);
            println!("{left}s left");
        }
    }
}

fn print_menu() {
    println!("=== Guess Their Answer ===");
    println!("Name the most popular answers before the bot does.");
    println!("Press Enter to start, or type /quit to exit.");
}

fn print_scoreboard_options() {
    println!("Type /again to replay these questions, /menu for a new game, or /quit to exit.");
}

fn print_scoreboard(board: &Scoreboard) {
    println!("{}", scoreboard_table(board));
    println!("{}", winner_line(board.winner));
}

fn round_header(round: &RoundView) -> String {
    format!(
        "\n--- Round {}/{} ---\n{}\n{} answers to find, {}s on the clock. Type your guesses!",
        round.number, round.total, round.prompt, round.remaining, round.time_left_secs
    )
}

fn status_line(round: &RoundView) -> String {
    format!(
        "[You {} : {} Bot | {} left | {}s]",
        round.player_score, round.opponent_score, round.remaining, round.time_left_secs
    )
}

fn bot_line(answer: &BotAnswer) -> String {
    match answer.points {
        Some(points) => format!("Bot: {} (+{points} points)", answer.utterance),
        None => format!("Bot: {} (no points)", answer.utterance),
    }
}

fn winner_line(winner: Option<Side>) -> &'static str {
    match winner {
        Some(Side::Player) => "You win!",
        Some(Side::Opponent) => "The bot wins!",
        None => "It's a tie!",
    }
}

fn scoreboard_table(board: &Scoreboard) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Round", "You", "Bot"]);

    for row in &board.rows {
        table.add_row(vec![
            Cell::new(row.round),
            score_cell(row.player, row.leader == Some(Side::Player)),
            score_cell(row.opponent, row.leader == Some(Side::Opponent)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        score_cell(board.totals.player, board.winner == Some(Side::Player)),
        score_cell(board.totals.opponent, board.winner == Some(Side::Opponent)),
    ]);
    table
}

fn score_cell(score: u32, leads: bool) -> Cell {
    let cell = Cell::new(score);
    if leads {
        cell.add_attribute(Attribute::Bold).fg(Color::Green)
    } else {
        cell
    }
}
