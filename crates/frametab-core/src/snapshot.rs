//! Decoded game-state snapshots.
//!
//! A [`Snapshot`] is one instant of a replay as handed over by the replay
//! decoder: frame-level metadata, the two (or more) participants keyed by
//! controller port, and the projectiles alive on that frame. Snapshots are
//! transient -- the flattener reads one, produces a
//! [`FlatRecord`](crate::record::FlatRecord), and the snapshot is dropped.
//!
//! Every type here derives `Deserialize` with generous `#[serde(default)]`s so
//! a decoded stream can be fed in as JSON lines (one snapshot per line), and
//! `Default` so tests can build fixtures with struct-update syntax.
//!
//! ```
//! use frametab_core::snapshot::{CharacterState, Snapshot};
//!
//! let snap: Snapshot = serde_json::from_str(r#"{
//!     "frame": -123,
//!     "stage": "BATTLEFIELD",
//!     "players": [
//!         { "port": 1, "character": "FOX", "action": "STANDING" },
//!         { "port": 2, "character": "POPO", "nana": { "character": "NANA" } }
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(snap.players.len(), 2);
//! assert!(snap.players[1].state.nana.is_some());
//! assert_eq!(snap.players[0].state.body, CharacterState {
//!     character: Some("FOX".to_owned()),
//!     action: Some("STANDING".to_owned()),
//!     ..Default::default()
//! });
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MenuState
// ---------------------------------------------------------------------------

/// Phase marker of a snapshot. Only [`MenuState::InGame`] snapshots are
/// flattened; everything else is skipped upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MenuState {
    #[default]
    InGame,
    SuddenDeath,
    CharacterSelect,
    StageSelect,
    PostgameScores,
    MainMenu,
    SlippiOnlineCss,
    #[serde(other)]
    UnknownMenu,
}

impl MenuState {
    /// Whether the snapshot describes active gameplay.
    pub fn is_in_game(self) -> bool {
        matches!(self, MenuState::InGame)
    }
}

// ---------------------------------------------------------------------------
// Button
// ---------------------------------------------------------------------------

/// A digital controller input.
///
/// `Main` and `C` are the stick "buttons" reported by the decoder next to
/// the real ones. Participants carry a column for all fourteen; companions
/// only for the first twelve (see [`Button::COMPANION`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Button {
    #[serde(rename = "BUTTON_A")]
    A,
    #[serde(rename = "BUTTON_B")]
    B,
    #[serde(rename = "BUTTON_X")]
    X,
    #[serde(rename = "BUTTON_Y")]
    Y,
    #[serde(rename = "BUTTON_Z")]
    Z,
    #[serde(rename = "BUTTON_L")]
    L,
    #[serde(rename = "BUTTON_R")]
    R,
    #[serde(rename = "BUTTON_START")]
    Start,
    #[serde(rename = "BUTTON_D_UP")]
    DUp,
    #[serde(rename = "BUTTON_D_DOWN")]
    DDown,
    #[serde(rename = "BUTTON_D_LEFT")]
    DLeft,
    #[serde(rename = "BUTTON_D_RIGHT")]
    DRight,
    #[serde(rename = "BUTTON_MAIN")]
    Main,
    #[serde(rename = "BUTTON_C")]
    C,
}

impl Button {
    pub const COUNT: usize = 14;

    /// Every button, in column order.
    pub const ALL: [Button; Button::COUNT] = [
        Button::A,
        Button::B,
        Button::X,
        Button::Y,
        Button::Z,
        Button::L,
        Button::R,
        Button::Start,
        Button::DUp,
        Button::DDown,
        Button::DLeft,
        Button::DRight,
        Button::Main,
        Button::C,
    ];

    /// Buttons that get a column in the companion family.
    pub const COMPANION: [Button; 12] = [
        Button::A,
        Button::B,
        Button::X,
        Button::Y,
        Button::Z,
        Button::L,
        Button::R,
        Button::Start,
        Button::DUp,
        Button::DDown,
        Button::DLeft,
        Button::DRight,
    ];

    /// Column suffix for this button (e.g. `"btn_BUTTON_A"`).
    pub fn column_name(self) -> &'static str {
        match self {
            Button::A => "btn_BUTTON_A",
            Button::B => "btn_BUTTON_B",
            Button::X => "btn_BUTTON_X",
            Button::Y => "btn_BUTTON_Y",
            Button::Z => "btn_BUTTON_Z",
            Button::L => "btn_BUTTON_L",
            Button::R => "btn_BUTTON_R",
            Button::Start => "btn_BUTTON_START",
            Button::DUp => "btn_BUTTON_D_UP",
            Button::DDown => "btn_BUTTON_D_DOWN",
            Button::DLeft => "btn_BUTTON_D_LEFT",
            Button::DRight => "btn_BUTTON_D_RIGHT",
            Button::Main => "btn_BUTTON_MAIN",
            Button::C => "btn_BUTTON_C",
        }
    }

    /// Position of this button in [`Button::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// ControllerState
// ---------------------------------------------------------------------------

/// Controller input for one character on one frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerState {
    /// Button states. Buttons missing from the map are released.
    pub buttons: BTreeMap<Button, bool>,
    /// Main stick `(x, y)`.
    pub main_stick: [f64; 2],
    /// C-stick `(x, y)`.
    pub c_stick: [f64; 2],
    /// Analog L trigger.
    pub l_shoulder: f64,
    /// Analog R trigger.
    pub r_shoulder: f64,
}

impl ControllerState {
    pub fn is_pressed(&self, button: Button) -> bool {
        self.buttons.get(&button).copied().unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

// ---------------------------------------------------------------------------
// CharacterState
// ---------------------------------------------------------------------------

/// State of one fighter: a participant's main character or its companion.
///
/// Character and action are raw labels from the decoder; they are turned
/// into integer codes by the flattener. Missing labels are allowed and encode
/// to the `-1` sentinel.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterState {
    pub character: Option<String>,
    pub action: Option<String>,
    /// Frames elapsed in the current action.
    pub action_frame: i64,
    pub controller_state: ControllerState,
    pub costume: i64,
    /// Environment collision box corners, each `(x, y)`.
    pub ecb_bottom: [f64; 2],
    pub ecb_left: [f64; 2],
    pub ecb_right: [f64; 2],
    pub ecb_top: [f64; 2],
    pub facing: bool,
    pub hitlag_left: i64,
    pub hitstun_frames_left: i64,
    pub invulnerability_left: i64,
    pub invulnerable: bool,
    pub jumps_left: i64,
    pub moonwalkwarning: bool,
    pub off_stage: bool,
    pub on_ground: bool,
    pub percent: f64,
    pub position: Point,
    pub shield_strength: f64,
    pub speed_air_x_self: f64,
    pub speed_ground_x_self: f64,
    pub speed_x_attack: f64,
    pub speed_y_attack: f64,
    pub speed_y_self: f64,
    pub stock: i64,
}

// ---------------------------------------------------------------------------
// ParticipantState
// ---------------------------------------------------------------------------

/// One participant: the main character plus an optional companion.
///
/// The companion ("Nana") exists only for characters that fight with a
/// secondary unit, and even then may be missing on individual frames.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParticipantState {
    #[serde(flatten)]
    pub body: CharacterState,
    #[serde(default)]
    pub nana: Option<CharacterState>,
}

/// A participant together with the controller port it is plugged into.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub port: u8,
    #[serde(flatten)]
    pub state: ParticipantState,
}

// ---------------------------------------------------------------------------
// Projectile
// ---------------------------------------------------------------------------

/// A projectile alive on the snapshot's frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Projectile {
    /// Frames since the projectile was created.
    pub frame: i64,
    /// Port of the owning participant.
    pub owner: i64,
    pub position: Point,
    pub speed: Point,
    pub subtype: i64,
    /// Projectile type label.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One decoded instant of a replay.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub frame: i64,
    /// Distance between the two main characters.
    pub distance: f64,
    pub stage: Option<String>,
    /// Match start timestamp, verbatim from the replay metadata.
    #[serde(rename = "startAt")]
    pub start_at: String,
    pub menu_state: MenuState,
    /// Participants in decoder order.
    pub players: Vec<PlayerEntry>,
    pub projectiles: Vec<Projectile>,
}

impl Snapshot {
    /// Look up a participant by controller port.
    pub fn player(&self, port: u8) -> Option<&ParticipantState> {
        self.players
            .iter()
            .find(|entry| entry.port == port)
            .map(|entry| &entry.state)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_index_matches_all_order() {
        for (i, button) in Button::ALL.iter().enumerate() {
            assert_eq!(button.index(), i);
        }
        assert_eq!(&Button::ALL[..12], &Button::COMPANION[..]);
    }

    #[test]
    fn buttons_deserialize_from_decoder_names() {
        let state: ControllerState = serde_json::from_str(
            r#"{ "buttons": { "BUTTON_A": true, "BUTTON_D_LEFT": false, "BUTTON_C": true } }"#,
        )
        .unwrap();
        assert!(state.is_pressed(Button::A));
        assert!(!state.is_pressed(Button::DLeft));
        assert!(state.is_pressed(Button::C));
        assert!(!state.is_pressed(Button::Z));
    }

    #[test]
    fn unknown_menu_states_fall_through() {
        let menu: MenuState = serde_json::from_str(r#""LOADING_SCREEN""#).unwrap();
        assert_eq!(menu, MenuState::UnknownMenu);
        assert!(!menu.is_in_game());
        assert!(MenuState::default().is_in_game());
    }

    #[test]
    fn player_lookup_by_port() {
        let snap = Snapshot {
            players: vec![
                PlayerEntry {
                    port: 4,
                    ..Default::default()
                },
                PlayerEntry {
                    port: 1,
                    state: ParticipantState {
                        body: CharacterState {
                            stock: 3,
                            ..Default::default()
                        },
                        nana: None,
                    },
                },
            ],
            ..Default::default()
        };
        assert_eq!(snap.player(1).map(|p| p.body.stock), Some(3));
        assert!(snap.player(2).is_none());
    }

    #[test]
    fn projectile_type_uses_wire_name() {
        let proj: Projectile =
            serde_json::from_str(r#"{ "owner": 2, "type": "FOX_LASER" }"#).unwrap();
        assert_eq!(proj.kind.as_deref(), Some("FOX_LASER"));
        assert_eq!(proj.owner, 2);
    }
}
