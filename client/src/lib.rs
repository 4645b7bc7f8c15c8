//! # Paddle Game Client Library
//!
//! Client half of a two-player networked paddle game. The remote simulation
//! is authoritative for the ball, scores and obstacles; this crate turns
//! keyboard and touch input into paddle commands and repaints the latest
//! snapshot it receives.
//!
//! ## Architecture Overview
//!
//! Two one-way flows meet only at the session:
//!
//! - device events → [`input`] → [`game::PaddleController`] → [`network::Channel`] → simulation
//! - simulation → [`network::ChannelEvents`] → [`game::SnapshotSlot`] → [`rendering`]
//!
//! ### Optimistic own paddle
//! The controller holds the local paddle position, clamps every proposal to
//! the table and sends a command only when the clamped value actually
//! changes. That dedup is what bounds outbound traffic.
//!
//! ### Reconciliation
//! Each snapshot re-derives this client's role from the roster. The held
//! position is seeded from the snapshot only when the role changes.
//!
//! ### One event thread
//! Input, channel events and display refreshes are dispatched one at a time
//! through [`session::Session::handle`]. Socket I/O runs on a tokio task and
//! only exchanges messages with the session over queues.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::{endpoint_url, generate_identity, spawn_connection, ConnectOptions};
//! use client::rendering::{RecordingSurface, Renderer};
//! use client::session::{Event, Session};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let runtime = tokio::runtime::Runtime::new()?;
//! let identity = generate_identity();
//! let url = endpoint_url("ws://127.0.0.1:8000", "room42", &identity);
//! let (channel, events, _task) = spawn_connection(runtime.handle(), &url, ConnectOptions::default());
//!
//! let mut session = Session::new(identity, channel).with_events(events);
//! let mut renderer = Renderer::new();
//! let mut surface = RecordingSurface::new();
//!
//! loop {
//!     session.pump_channel();
//!     session.handle(Event::Frame);
//!     renderer.render(
//!         session.latest_snapshot(),
//!         session.snapshot_generation(),
//!         &mut surface,
//!     );
//! #   break;
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
pub mod session;

pub use error::{ClientError, Result};
