use tracing::info;

use crate::engine::engine::{Engine, TurnResult};
use crate::engine::llm_client::ChatTransport;
use crate::engine::protocol::PlayerCommand;
use crate::model::game_state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    Quit,
    Defeated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    AwaitingAction,
    Processing,
    GameOver(GameOverReason),
}

/// What the front end should show after a line of input.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Turn(TurnResult),
    Help,
    Ignored,
    Ended(GameOverReason),
}

/// The play loop as a state machine. One action is fully processed
/// before the next line is accepted.
pub struct Session<T> {
    engine: Engine<T>,
    phase: SessionPhase,
}

impl<T: ChatTransport> Session<T> {
    pub fn new(engine: Engine<T>) -> Self {
        Self {
            engine,
            phase: SessionPhase::AwaitingAction,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn game_state(&self) -> &GameState {
        self.engine.game_state()
    }

    #[cfg(test)]
    pub fn engine(&self) -> &Engine<T> {
        &self.engine
    }

    /// Plays the opening scene through the regular turn path.
    pub fn begin(&mut self) -> TurnResult {
        self.phase = SessionPhase::Processing;
        let result = self.engine.open_scene();
        self.settle();
        result
    }

    pub fn submit(&mut self, line: &str) -> SessionEvent {
        if let SessionPhase::GameOver(reason) = self.phase {
            return SessionEvent::Ended(reason);
        }

        match PlayerCommand::parse(line) {
            PlayerCommand::Quit => {
                info!("player quit");
                self.phase = SessionPhase::GameOver(GameOverReason::Quit);
                SessionEvent::Ended(GameOverReason::Quit)
            }
            PlayerCommand::Help => SessionEvent::Help,
            PlayerCommand::Blank => SessionEvent::Ignored,
            PlayerCommand::Action(action) => {
                self.phase = SessionPhase::Processing;
                let result = self.engine.process_action(&action);
                self.settle();
                SessionEvent::Turn(result)
            }
        }
    }

    fn settle(&mut self) {
        self.phase = if self.engine.game_state().is_defeated() {
            info!(turn = self.engine.game_state().turn_count, "player defeated");
            SessionPhase::GameOver(GameOverReason::Defeated)
        } else {
            SessionPhase::AwaitingAction
        };
    }
}
