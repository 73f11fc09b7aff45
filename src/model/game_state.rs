pub const STARTING_HEALTH: u32 = 100;
pub const STARTING_MANA: i32 = 50;
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// The single mutable state of a play session.
///
/// Name and class are fixed at creation; everything else is driven by
/// the turn loop and narrative extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    name: String,
    character_class: String,

    pub health: u32,

    /// Not touched by extraction yet.
    pub mana: i32,

    /// Append-only, duplicates allowed.
    pub inventory: Vec<String>,
    pub location: String,
    pub turn_count: u64,
}

impl GameState {
    pub fn new(name: impl Into<String>, character_class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            character_class: character_class.into(),
            health: STARTING_HEALTH,
            mana: STARTING_MANA,
            inventory: Vec::new(),
            location: UNKNOWN_LOCATION.to_string(),
            turn_count: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn character_class(&self) -> &str {
        &self.character_class
    }

    /// Subtracts damage, flooring at zero. Returns the health left.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        self.health = self.health.saturating_sub(amount);
        self.health
    }

    pub fn is_defeated(&self) -> bool {
        self.health == 0
    }

    /// Inventory as shown to the model and the player.
    pub fn inventory_summary(&self) -> String {
        if self.inventory.is_empty() {
            "Empty".to_string()
        } else {
            self.inventory.join(", ")
        }
    }
}
