use std::io::{BufRead, Write};

use crate::engine::engine::{Engine, TurnResult};
use crate::engine::llm_client::{ChatTransport, InferenceClient};
use crate::engine::protocol::{PlayerCommand, HELP_LINES};
use crate::engine::session::{GameOverReason, Session, SessionEvent, SessionPhase};
use crate::model::event_result::StateChange;
use crate::model::game_state::GameState;

const BANNER: &str = r"
  ========================================
     D U N G E O N      M A S T E R
  ========================================
";

pub const CLASSES: [&str; 4] = ["Warrior", "Wizard", "Rogue", "Bard"];
pub const FALLBACK_CLASS: &str = "Adventurer";

/// Maps a 1-based menu pick to a class name. Only the leading digits
/// count, so "2abc" and "1.5" still pick a class.
pub fn class_from_selection(selection: &str) -> &'static str {
    let trimmed = selection.trim_start();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());

    trimmed[..digits_end]
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| CLASSES.get(i).copied())
        .unwrap_or(FALLBACK_CLASS)
}

pub fn status_line(state: &GameState) -> String {
    format!(
        "[Health {} | Mana {} | Location {} | Inventory {} | Turn {}]",
        state.health,
        state.mana,
        state.location,
        state.inventory_summary(),
        state.turn_count
    )
}

/// Prints `prompt` and reads one line. `None` on end of input.
fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> anyhow::Result<Option<String>> {
    write!(out, "{prompt}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

pub fn describe_change(change: &StateChange) -> String {
    match change {
        StateChange::Damage {
            amount,
            health_after,
        } => format!("-{amount} health ({health_after} left)"),
        StateChange::Relocated { location } => format!("Location: {location}"),
        StateChange::ItemAcquired { item } => format!("+ {item}"),
    }
}

fn render_turn<W: Write>(out: &mut W, result: &TurnResult) -> anyhow::Result<()> {
    writeln!(out, "\n{}", result.narrative)?;

    if result.degraded {
        writeln!(out, "(The Dungeon Master seems distracted. Nothing changed.)")?;
    } else if !result.report.is_empty() {
        writeln!(out)?;
        for change in &result.report.changes {
            writeln!(out, "{}", describe_change(change))?;
        }
    }
    Ok(())
}

fn render_help<W: Write>(out: &mut W) -> anyhow::Result<()> {
    writeln!(out, "\nAvailable commands:")?;
    for line in HELP_LINES {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn render_ending<W: Write>(out: &mut W, reason: GameOverReason) -> anyhow::Result<()> {
    match reason {
        GameOverReason::Quit => writeln!(out, "\nThanks for playing!")?,
        GameOverReason::Defeated => writeln!(out, "\nGAME OVER - Your journey ends here...")?,
    }
    Ok(())
}

/// Character creation followed by the action loop. Returns once the
/// session reaches game over; end of input counts as quitting.
pub fn run<T, R, W>(client: InferenceClient<T>, input: &mut R, out: &mut W) -> anyhow::Result<GameOverReason>
where
    T: ChatTransport,
    R: BufRead,
    W: Write,
{
    writeln!(out, "{BANNER}")?;

    let Some(name) = ask(input, out, "\nEnter your character's name: ")? else {
        render_ending(out, GameOverReason::Quit)?;
        return Ok(GameOverReason::Quit);
    };

    writeln!(out, "\nChoose class:")?;
    writeln!(out, "1. Warrior  2. Wizard  3. Rogue  4. Bard")?;
    let selection = ask(input, out, "Select (1-4): ")?.unwrap_or_default();
    let class = class_from_selection(&selection);

    let mut session = Session::new(Engine::new(client, GameState::new(name.trim(), class)));

    writeln!(out, "\nThe Dungeon Master ponders your action...")?;
    let opening = session.begin();
    render_turn(out, &opening)?;

    if let SessionPhase::GameOver(reason) = session.phase() {
        render_ending(out, reason)?;
        return Ok(reason);
    }

    loop {
        writeln!(out, "\n{}", status_line(session.game_state()))?;
        let line = ask(input, out, "\nWhat do you do? > ")?.unwrap_or_else(|| "quit".to_string());

        if matches!(PlayerCommand::parse(&line), PlayerCommand::Action(_)) {
            writeln!(out, "\nThe Dungeon Master ponders your action...")?;
        }

        match session.submit(&line) {
            SessionEvent::Turn(result) => render_turn(out, &result)?,
            SessionEvent::Help => render_help(out)?,
            SessionEvent::Ignored => {}
            SessionEvent::Ended(reason) => {
                render_ending(out, reason)?;
                return Ok(reason);
            }
        }

        if let SessionPhase::GameOver(reason) = session.phase() {
            render_ending(out, reason)?;
            return Ok(reason);
        }
    }
}
