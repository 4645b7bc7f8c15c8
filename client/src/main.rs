use clap::Parser;
use client::error::ClientError;
use client::input::InputManager;
use client::network::{
    endpoint_url, generate_identity, random_token, spawn_connection, ConnectOptions,
};
use client::rendering::{MacroquadSurface, Renderer};
use client::session::{Event, Session};
use log::{error, info};
use macroquad::prelude::*;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base WebSocket URL of the game server
    #[arg(short = 's', long, default_value = "ws://127.0.0.1:8000")]
    server: String,

    /// Room to join; a new one is made up when omitted
    #[arg(short = 'r', long)]
    room: Option<String>,

    /// Use this identity instead of a generated one
    #[arg(short = 'i', long)]
    identity: Option<String>,

    /// Simulate outbound latency in milliseconds
    #[arg(short = 'l', long, default_value = "0")]
    fake_ping: u64,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Pong".to_owned(),
        window_width: 800,
        window_height: 600,
        window_resizable: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    // Socket I/O only; all game state stays on this thread.
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("{}", ClientError::Runtime(e.to_string()));
            return;
        }
    };

    let room = args.room.unwrap_or_else(|| random_token(9));
    let identity = args.identity.unwrap_or_else(generate_identity);
    let url = endpoint_url(&args.server, &room, &identity);

    info!("Starting client...");
    info!("Room {} as {}", room, identity);
    if args.fake_ping > 0 {
        info!("Simulating {}ms latency", args.fake_ping);
    }
    info!("Controls: Up/Down or drag to move, Space to start, Esc to quit");

    let options = ConnectOptions {
        fake_ping: Duration::from_millis(args.fake_ping),
    };
    let (channel, events, _task) = spawn_connection(runtime.handle(), &url, options);

    simulate_mouse_with_touch(false);

    let mut session = Session::new(identity, channel).with_events(events);
    let mut input_manager = InputManager::new();
    let mut renderer = Renderer::new();

    loop {
        let mut surface = MacroquadSurface::for_window();

        let (input_events, controls) = input_manager.poll(surface.viewport());
        if controls.quit {
            break;
        }
        for event in input_events {
            session.handle(Event::Input(event));
        }

        session.pump_channel();

        let status = session.status();
        if controls.start && !status.game_active {
            session.request_start();
        }

        session.handle(Event::Frame);

        renderer.render(
            session.latest_snapshot(),
            session.snapshot_generation(),
            &mut surface,
        );
        renderer.render_status(&status, &mut surface);

        next_frame().await;
    }

    session.shutdown();
    runtime.shutdown_timeout(Duration::from_millis(500));
}
