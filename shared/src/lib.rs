use serde::{Deserialize, Serialize};

pub const TABLE_WIDTH: f32 = 800.0;
pub const TABLE_HEIGHT: f32 = 600.0;
pub const PADDLE_WIDTH: f32 = 20.0;
pub const PADDLE_HEIGHT: f32 = 100.0;
pub const BALL_RADIUS: f32 = 10.0;
/// Distance travelled per display refresh while a direction key is held.
pub const MOVE_STEP: f32 = 20.0;
pub const MAX_PADDLE_Y: f32 = TABLE_HEIGHT - PADDLE_HEIGHT;
/// Held position before any snapshot has assigned a role.
pub const INITIAL_PADDLE_Y: f32 = TABLE_HEIGHT / 2.0;

/// Clamps a candidate paddle offset to `[0, MAX_PADDLE_Y]`.
pub fn clamp_paddle_y(y: f32) -> f32 {
    if y.is_nan() {
        return 0.0;
    }
    y.clamp(0.0, MAX_PADDLE_Y)
}

/// Which of the two controllable paddles a client owns.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Player1,
    Player2,
}

impl Role {
    /// Locates `identity` in the roster: index 0 is `Player1`, index 1 is
    /// `Player2`, anything else is a spectator.
    pub fn from_roster(players: &[String], identity: &str) -> Option<Role> {
        match players.iter().position(|p| p == identity) {
            Some(0) => Some(Role::Player1),
            Some(1) => Some(Role::Player2),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Player1 => "player1",
            Role::Player2 => "player2",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Paddle {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Paddles {
    pub player1: Paddle,
    pub player2: Paddle,
}

impl Paddles {
    pub fn get(&self, role: Role) -> &Paddle {
        match role {
            Role::Player1 => &self.player1,
            Role::Player2 => &self.player2,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scores {
    pub player1: u32,
    pub player2: u32,
}

/// A square obstacle addressed by its center point.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

impl Obstacle {
    /// Top-left corner of the obstacle's square.
    pub fn top_left(&self) -> (f32, f32) {
        (self.x - self.size / 2.0, self.y - self.size / 2.0)
    }
}

/// Authoritative world state at one simulation tick.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Snapshot {
    #[serde(default)]
    pub ball: Option<Ball>,
    pub paddles: Paddles,
    pub scores: Scores,
    pub obstacles: Vec<Obstacle>,
    pub is_active: bool,
    pub players: Vec<String>,
}

impl Snapshot {
    pub fn role_of(&self, identity: &str) -> Option<Role> {
        Role::from_roster(&self.players, identity)
    }
}

/// Commands sent from the client to the remote simulation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    PaddleMove { player: Role, y: f32 },
    StartGame,
}

/// Messages pushed by the remote simulation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    GameState {
        state: Snapshot,
    },
    #[serde(other)]
    Unknown,
}

pub fn encode_client_message(message: &ClientMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}

pub fn decode_server_message(text: &str) -> Result<ServerMessage, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn roster(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    const GAME_STATE_JSON: &str = r#"{
        "type": "game_state",
        "state": {
            "ball": {"x": 400, "y": 300, "dx": 5, "dy": -5},
            "paddles": {"player1": {"x": 50, "y": 300}, "player2": {"x": 750, "y": 120.5}},
            "scores": {"player1": 2, "player2": 3},
            "obstacles": [{"x": 100, "y": 200, "size": 30}],
            "is_active": true,
            "players": ["player_abc", "player_xyz"]
        }
    }"#;

    #[test]
    fn test_clamp_paddle_y() {
        assert_eq!(clamp_paddle_y(-50.0), 0.0);
        assert_eq!(clamp_paddle_y(250.0), 250.0);
        assert_eq!(clamp_paddle_y(10_000.0), MAX_PADDLE_Y);
        assert_eq!(clamp_paddle_y(f32::NEG_INFINITY), 0.0);
        assert_eq!(clamp_paddle_y(f32::NAN), 0.0);
        assert_eq!(MAX_PADDLE_Y, 500.0);
    }

    #[test]
    fn test_role_from_roster() {
        let players = roster(&["player_abc", "player_xyz"]);
        assert_eq!(Role::from_roster(&players, "player_abc"), Some(Role::Player1));
        assert_eq!(Role::from_roster(&players, "player_xyz"), Some(Role::Player2));
        assert_eq!(Role::from_roster(&players, "player_other"), None);
        assert_eq!(Role::from_roster(&[], "player_abc"), None);
    }

    #[test]
    fn test_role_beyond_second_slot_is_spectator() {
        let players = roster(&["a", "b", "c"]);
        assert_eq!(Role::from_roster(&players, "c"), None);
    }

    #[test]
    fn test_paddle_move_wire_shape() {
        let message = ClientMessage::PaddleMove {
            player: Role::Player2,
            y: 350.0,
        };
        let text = encode_client_message(&message).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["type"], "paddle_move");
        assert_eq!(value["player"], "player2");
        assert_approx_eq!(value["y"].as_f64().unwrap(), 350.0, 1e-6);
    }

    #[test]
    fn test_start_game_wire_shape() {
        let text = encode_client_message(&ClientMessage::StartGame).unwrap();
        assert_eq!(text, r#"{"type":"start_game"}"#);
    }

    #[test]
    fn test_decode_game_state() {
        let message = decode_server_message(GAME_STATE_JSON).unwrap();
        let ServerMessage::GameState { state } = message else {
            panic!("expected game_state");
        };

        assert_eq!(state.players, roster(&["player_abc", "player_xyz"]));
        assert_approx_eq!(state.paddles.player2.y, 120.5);
        assert_eq!(state.scores, Scores { player1: 2, player2: 3 });
        assert_eq!(state.obstacles.len(), 1);
        assert!(state.is_active);
        assert_eq!(state.ball.map(|b| b.dy), Some(-5.0));
        assert_eq!(state.role_of("player_xyz"), Some(Role::Player2));
        assert_approx_eq!(state.paddles.get(Role::Player1).x, 50.0);
    }

    #[test]
    fn test_decode_game_state_without_ball() {
        let text = r#"{"type":"game_state","state":{
            "paddles":{"player1":{"x":50,"y":0},"player2":{"x":750,"y":0}},
            "scores":{"player1":0,"player2":0},
            "obstacles":[],"is_active":false,"players":[]}}"#;

        match decode_server_message(text).unwrap() {
            ServerMessage::GameState { state } => assert!(state.ball.is_none()),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_message_type_is_not_an_error() {
        let message = decode_server_message(r#"{"type":"chat","text":"hi"}"#).unwrap();
        assert_eq!(message, ServerMessage::Unknown);
    }

    #[test]
    fn test_malformed_messages_fail_to_decode() {
        assert!(decode_server_message("not json").is_err());
        assert!(decode_server_message(r#"{"state":{}}"#).is_err());
        // game_state whose snapshot is missing the paddles/scores shape
        assert!(decode_server_message(r#"{"type":"game_state","state":{"players":[]}}"#).is_err());
    }

    #[test]
    fn test_obstacle_is_center_addressed() {
        let obstacle = Obstacle {
            x: 100.0,
            y: 200.0,
            size: 40.0,
        };
        assert_eq!(obstacle.top_left(), (80.0, 180.0));
    }
}
