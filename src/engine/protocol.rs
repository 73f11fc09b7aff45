/// Lines printed for the `help` command.
pub const HELP_LINES: [&str; 4] = [
    "- move [direction]  - examine [object]",
    "- use [item]        - attack [target]",
    "- cast [spell]      - inventory",
    "- quit              - help",
];

/// What a line of player input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCommand {
    Quit,
    Help,
    Action(String),
    Blank,
}

impl PlayerCommand {
    /// `quit` and `help` are reserved, case-insensitively. Anything else
    /// is handed to the narrator verbatim.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            PlayerCommand::Blank
        } else if trimmed.eq_ignore_ascii_case("quit") {
            PlayerCommand::Quit
        } else if trimmed.eq_ignore_ascii_case("help") {
            PlayerCommand::Help
        } else {
            PlayerCommand::Action(trimmed.to_string())
        }
    }
}
