pub mod event_result;
pub mod game_state;
pub mod history;
pub mod message;
