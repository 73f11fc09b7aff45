use tracing::{debug, warn};

use crate::engine::apply_narrative::StateExtractor;
use crate::engine::llm_client::{ChatTransport, Completion, InferenceClient};
use crate::engine::prompt_builder::PromptBuilder;
use crate::model::event_result::ExtractionReport;
use crate::model::game_state::GameState;
use crate::model::history::HistoryBuffer;

/// Result of one processed action, ready for display.
#[derive(Debug, Clone)]
pub struct TurnResult {
    pub narrative: String,
    pub degraded: bool,
    pub report: ExtractionReport,
}

/// Runs player actions through the narrator and folds the replies back
/// into the game state. Owns the session's state and history outright.
pub struct Engine<T> {
    client: InferenceClient<T>,
    extractor: StateExtractor,
    history: HistoryBuffer,
    game_state: GameState,
}

impl<T: ChatTransport> Engine<T> {
    pub fn new(client: InferenceClient<T>, game_state: GameState) -> Self {
        Self {
            client,
            extractor: StateExtractor::default(),
            history: HistoryBuffer::new(),
            game_state,
        }
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    #[cfg(test)]
    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Asks the narrator for the opening scene. Counts as a regular turn.
    pub fn open_scene(&mut self) -> TurnResult {
        let action = opening_action(&self.game_state);
        self.process_action(&action)
    }

    /// The turn counter measures attempts, so it moves even when the
    /// narrator is unreachable.
    pub fn process_action(&mut self, action: &str) -> TurnResult {
        self.game_state.turn_count += 1;
        debug!(turn = self.game_state.turn_count, action, "processing action");

        let prompt = PromptBuilder::build(&self.game_state);
        let completion = self.client.complete(&prompt, &mut self.history, action);
        if let Completion::Degraded(err) = &completion {
            warn!(turn = self.game_state.turn_count, error = %err, "narrator unavailable, turn degraded");
        }

        let narrative = completion.text().to_string();
        let report = self.extractor.apply(&narrative, &mut self.game_state);

        TurnResult {
            narrative,
            degraded: completion.is_degraded(),
            report,
        }
    }
}

pub fn opening_action(state: &GameState) -> String {
    format!(
        "Create opening scene for {} {} in a fantasy setting",
        state.character_class(),
        state.name()
    )
}
