use crate::game::{PaddleController, Reconciliation, SnapshotSlot};
use crate::input::{InputAggregator, InputEvent};
use crate::network::{decode_inbound, Channel, ChannelEvent, ChannelEvents, ChannelState};
use log::{debug, info, warn};
use shared::{ClientMessage, Role, ServerMessage, Snapshot};

/// Handle for the recurring held-key evaluation.
///
/// At most one evaluation is ever scheduled: `start` on a scheduled loop is
/// a no-op and `stop` leaves nothing behind.
#[derive(Debug, Default)]
pub struct FrameLoop {
    scheduled: bool,
    ticks: u64,
}

impl FrameLoop {
    /// Returns `true` if this call scheduled the loop.
    pub fn start(&mut self) -> bool {
        if self.scheduled {
            return false;
        }
        self.scheduled = true;
        debug!("Held-key evaluation scheduled");
        true
    }

    /// Returns `true` if a scheduled loop was cancelled.
    pub fn stop(&mut self) -> bool {
        if !self.scheduled {
            return false;
        }
        self.scheduled = false;
        debug!("Held-key evaluation cancelled after {} ticks", self.ticks);
        self.ticks = 0;
        true
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// Consumes one display refresh; `false` when nothing is scheduled.
    fn tick(&mut self) -> bool {
        if self.scheduled {
            self.ticks += 1;
        }
        self.scheduled
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Input(InputEvent),
    Channel(ChannelEvent),
    /// One display refresh.
    Frame,
}

/// What the host shows next to the table.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub identity: String,
    pub role: Option<Role>,
    pub connected: bool,
    pub game_active: bool,
}

/// Everything one client session owns. Input, channel events and display
/// refreshes all go through [`Session::handle`] on the host's frame thread.
pub struct Session {
    input: InputAggregator,
    frame_loop: FrameLoop,
    controller: PaddleController,
    snapshots: SnapshotSlot,
    channel: Channel,
    events: Option<ChannelEvents>,
    listening: bool,
}

impl Session {
    pub fn new(identity: impl Into<String>, channel: Channel) -> Self {
        Self {
            input: InputAggregator::new(),
            frame_loop: FrameLoop::default(),
            controller: PaddleController::new(identity),
            snapshots: SnapshotSlot::new(),
            channel,
            events: None,
            listening: true,
        }
    }

    /// Hands the channel's event queue to the session, so that only events
    /// from the current connection are ever applied.
    pub fn with_events(mut self, events: ChannelEvents) -> Self {
        self.events = Some(events);
        self
    }

    pub fn handle(&mut self, event: Event) {
        match event {
            Event::Input(input) => self.handle_input(input),
            Event::Channel(channel_event) => self.handle_channel(channel_event),
            Event::Frame => self.handle_frame(),
        }
    }

    fn handle_input(&mut self, event: InputEvent) {
        if !self.listening {
            return;
        }

        match event {
            // Presses and touches only count once a paddle is ours.
            InputEvent::KeyDown(_) | InputEvent::TouchStart { .. }
                if self.controller.role().is_none() =>
            {
                debug!("Ignoring {:?} without a role", event);
            }
            InputEvent::KeyDown(direction) => {
                if self.input.key_down(direction) {
                    self.frame_loop.start();
                }
            }
            InputEvent::KeyUp(direction) => {
                if !self.input.key_up(direction) {
                    self.frame_loop.stop();
                }
            }
            InputEvent::TouchStart { screen_y, viewport } => {
                self.input
                    .touch_start(screen_y, viewport, self.controller.position());
            }
            InputEvent::TouchMove { screen_y, viewport } => {
                if let Some(target) = self.input.touch_move(screen_y, viewport) {
                    self.controller.propose(target, &mut self.channel);
                }
            }
            InputEvent::TouchEnd => self.input.touch_end(),
        }
    }

    fn handle_channel(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Opened => self.channel.mark_open(),
            ChannelEvent::Message(text) => {
                if let Some(ServerMessage::GameState { state }) = decode_inbound(&text) {
                    self.apply_snapshot(state);
                }
            }
            ChannelEvent::Error(reason) => {
                warn!("Channel error: {}", reason);
                self.channel.mark_closed();
            }
            ChannelEvent::Closed => self.channel.mark_closed(),
        }
    }

    /// Applies every event already queued by the connection task. Returns
    /// how many were applied.
    pub fn pump_channel(&mut self) -> usize {
        let mut applied = 0;
        loop {
            let Some(event) = self.events.as_mut().and_then(|events| events.try_next()) else {
                return applied;
            };
            self.handle(Event::Channel(event));
            applied += 1;
        }
    }

    /// Waits for the next event from the connection task and applies it.
    /// `None` when no queue is attached or the task has finished.
    pub async fn next_channel_event(&mut self) -> Option<ChannelEvent> {
        let event = self.events.as_mut()?.next().await?;
        self.handle(Event::Channel(event.clone()));
        Some(event)
    }

    fn handle_frame(&mut self) {
        if self.frame_loop.tick() {
            self.controller
                .evaluate_held_keys(self.input.state(), &mut self.channel);
        }
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot) {
        let snapshot = self.snapshots.replace(snapshot);
        if let Reconciliation::Assigned { role, seeded_y } = self.controller.reconcile(snapshot) {
            debug!("Reconciled as {} at {}", role, seeded_y);
            // A drag anchored on the previous position would jump.
            self.input.touch_end();
        }
    }

    /// Asks the simulation to start the game. Sent whenever the channel is
    /// open, whether or not this client holds a paddle.
    pub fn request_start(&mut self) -> bool {
        self.channel.send(&ClientMessage::StartGame)
    }

    /// Attaches a fresh channel and its event queue after the previous one
    /// closed. The old queue is dropped, so late events from the previous
    /// connection can no longer reach the new channel. The role is forgotten
    /// so that the next snapshot seeds the paddle again.
    pub fn reconnect(&mut self, channel: Channel, events: ChannelEvents) {
        self.channel.close();
        self.channel = channel;
        self.events = Some(events);
        self.controller.reset_role();
        self.listening = true;
        info!("Session attached to a new channel");
    }

    /// Stops held-key evaluation, closes the channel and detaches input,
    /// in that order.
    pub fn shutdown(&mut self) {
        self.frame_loop.stop();
        self.channel.close();
        self.listening = false;
        self.input.reset();
        info!("Session shut down");
    }

    pub fn latest_snapshot(&self) -> Option<&Snapshot> {
        self.snapshots.latest()
    }

    pub fn snapshot_generation(&self) -> u64 {
        self.snapshots.generation()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            identity: self.controller.identity().to_string(),
            role: self.controller.role(),
            connected: self.channel.is_open(),
            game_active: self
                .snapshots
                .latest()
                .map(|s| s.is_active)
                .unwrap_or(false),
        }
    }

    pub fn channel_state(&self) -> ChannelState {
        self.channel.state()
    }

    pub fn paddle_position(&self) -> f32 {
        self.controller.position()
    }

    pub fn frame_loop_scheduled(&self) -> bool {
        self.frame_loop.is_scheduled()
    }
}
