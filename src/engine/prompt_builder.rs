use crate::model::game_state::GameState;

/// Renders the system directive sent with every request.
/// Formatting only; rebuilt each turn since the state moves underneath it.
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn build(state: &GameState) -> String {
        let mut prompt = String::new();

        push_game_state(&mut prompt, state);
        push_rules(&mut prompt);

        prompt
    }
}

fn push_game_state(prompt: &mut String, state: &GameState) {
    prompt.push_str("You are an expert text RPG Dungeon Master. Current game state:\n");
    prompt.push_str(&format!(
        "- Player: {} the {}\n",
        state.name(),
        state.character_class()
    ));
    prompt.push_str(&format!("- Health: {}\n", state.health));
    prompt.push_str(&format!("- Mana: {}\n", state.mana));
    prompt.push_str(&format!("- Location: {}\n", state.location));
    prompt.push_str(&format!("- Inventory: {}\n", state.inventory_summary()));
    prompt.push_str(&format!("- Turn: {}\n\n", state.turn_count));
}

fn push_rules(prompt: &mut String) {
    prompt.push_str(
        "Rules:\n\
1. Always provide detailed responses\n\
2. Update game state logically\n\
3. Include environmental details\n\
4. Maintain consistent world logic\n\
5. Limit responses to 3 paragraphs",
    );
}
