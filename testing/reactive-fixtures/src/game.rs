use reactive_property::{Reactive, include_generated};

///
/// Player
///

#[derive(Debug, Default, Reactive)]
pub struct Player {
    #[ReactiveProperty]
    _name: String,
    #[ReactiveProperty]
    _health: u32,
    // not private, so the generator leaves it alone
    #[ReactiveProperty]
    pub(crate) _level: u8,
    events: PlayerEvents,
}

impl Player {
    #[must_use]
    pub fn new(name: &str, health: u32) -> Self {
        Self {
            _name: name.to_string(),
            _health: health,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn level(&self) -> u8 {
        self._level
    }
}

include_generated!("Player_Classes_g");
