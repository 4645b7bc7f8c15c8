use crate::session::SessionStatus;
use macroquad::prelude::*;
use shared::{Snapshot, BALL_RADIUS, PADDLE_HEIGHT, PADDLE_WIDTH, TABLE_HEIGHT, TABLE_WIDTH};

pub const BACKGROUND: Color = Color::new(0.0, 0.0, 0.0, 1.0);
pub const FOREGROUND: Color = Color::new(1.0, 1.0, 1.0, 1.0);
pub const OBSTACLE: Color = Color::new(1.0, 68.0 / 255.0, 68.0 / 255.0, 1.0);
const CONNECTED: Color = Color::new(34.0 / 255.0, 197.0 / 255.0, 94.0 / 255.0, 1.0);
const DISCONNECTED: Color = Color::new(239.0 / 255.0, 68.0 / 255.0, 68.0 / 255.0, 1.0);
const HUD_TEXT: Color = Color::new(156.0 / 255.0, 163.0 / 255.0, 175.0 / 255.0, 1.0);

/// Anything that can take the scene's draw calls, in table coordinates.
pub trait Surface {
    fn clear(&mut self, color: Color);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color);
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Color);
    fn text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Color);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
    },
    Circle {
        x: f32,
        y: f32,
        radius: f32,
        color: Color,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        color: Color,
    },
}

/// Offscreen surface that records every draw call.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rects(&self) -> Vec<&DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rect { .. }))
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.commands.push(DrawCommand::Rect { x, y, w, h, color });
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            x,
            y,
            radius,
            color,
        });
    }

    fn text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            size,
            color,
        });
    }
}

/// Draws onto the macroquad window, letterboxing the table so it keeps its
/// aspect ratio.
pub struct MacroquadSurface {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl MacroquadSurface {
    pub fn fit(screen_w: f32, screen_h: f32) -> Self {
        let scale = (screen_w / TABLE_WIDTH).min(screen_h / TABLE_HEIGHT).max(0.0);
        Self {
            scale,
            offset_x: (screen_w - TABLE_WIDTH * scale) / 2.0,
            offset_y: (screen_h - TABLE_HEIGHT * scale) / 2.0,
        }
    }

    pub fn for_window() -> Self {
        Self::fit(screen_width(), screen_height())
    }

    /// Screen rectangle the table occupies vertically.
    pub fn viewport(&self) -> crate::input::Viewport {
        crate::input::Viewport::new(self.offset_y, TABLE_HEIGHT * self.scale)
    }
}

impl Surface for MacroquadSurface {
    fn clear(&mut self, color: Color) {
        clear_background(Color::from_rgba(17, 24, 39, 255));
        draw_rectangle(
            self.offset_x,
            self.offset_y,
            TABLE_WIDTH * self.scale,
            TABLE_HEIGHT * self.scale,
            color,
        );
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        draw_rectangle(
            self.offset_x + x * self.scale,
            self.offset_y + y * self.scale,
            w * self.scale,
            h * self.scale,
            color,
        );
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Color) {
        draw_circle(
            self.offset_x + x * self.scale,
            self.offset_y + y * self.scale,
            radius * self.scale,
            color,
        );
    }

    fn text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Color) {
        draw_text(
            text,
            self.offset_x + x * self.scale,
            self.offset_y + y * self.scale,
            size * self.scale,
            color,
        );
    }
}

/// Repaints the latest snapshot. Keeps nothing between frames except the
/// generation it last drew.
#[derive(Debug, Default)]
pub struct Renderer {
    last_drawn: Option<u64>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `generation` has not been drawn yet.
    pub fn is_stale(&self, generation: u64) -> bool {
        self.last_drawn != Some(generation)
    }

    pub fn last_drawn(&self) -> Option<u64> {
        self.last_drawn
    }

    /// Draws `snapshot` as generation `generation`. With no snapshot yet only
    /// the background is painted.
    pub fn render<S: Surface>(&mut self, snapshot: Option<&Snapshot>, generation: u64, surface: &mut S) {
        surface.clear(BACKGROUND);
        if let Some(snapshot) = snapshot {
            draw_scene(snapshot, surface);
        }
        self.last_drawn = Some(generation);
    }

    /// Status line and start prompt, drawn over the scene.
    pub fn render_status<S: Surface>(&self, status: &SessionStatus, surface: &mut S) {
        let (text, color) = if status.connected {
            (format!("Connected as {}", status.identity), CONNECTED)
        } else {
            ("Disconnected".to_string(), DISCONNECTED)
        };
        surface.text(&text, 10.0, TABLE_HEIGHT - 12.0, 18.0, color);

        if let Some(role) = status.role {
            surface.text(&format!("You are: {}", role), 10.0, 20.0, 18.0, HUD_TEXT);
        }

        if status.connected && !status.game_active {
            surface.text(
                "Press SPACE to start",
                TABLE_WIDTH / 2.0 - 90.0,
                TABLE_HEIGHT / 2.0 + 60.0,
                24.0,
                HUD_TEXT,
            );
        }
    }
}

/// Back to front: paddles, ball, obstacles, scores.
pub fn draw_scene<S: Surface>(snapshot: &Snapshot, surface: &mut S) {
    for paddle in [&snapshot.paddles.player1, &snapshot.paddles.player2] {
        surface.fill_rect(paddle.x, paddle.y, PADDLE_WIDTH, PADDLE_HEIGHT, FOREGROUND);
    }

    if let Some(ball) = &snapshot.ball {
        surface.fill_circle(ball.x, ball.y, BALL_RADIUS, FOREGROUND);
    }

    // Obstacle coordinates are centers.
    for obstacle in &snapshot.obstacles {
        let (x, y) = obstacle.top_left();
        surface.fill_rect(x, y, obstacle.size, obstacle.size, OBSTACLE);
    }

    let scores = format!(
        "Player 1: {}    Player 2: {}",
        snapshot.scores.player1, snapshot.scores.player2
    );
    surface.text(&scores, TABLE_WIDTH / 2.0 - 130.0, 30.0, 24.0, FOREGROUND);
}
