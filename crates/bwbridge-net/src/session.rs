//! Session loop
//!
//! One session spans a single engine connection:
//! handshaking -> synchronizing -> running -> terminated.
//!
//! The session task is the only writer of the game state; the agent runs on
//! its own thread from the first frame onward and communicates back solely
//! through the command queue. Teardown is cooperative: the stop token is
//! set, then the agent thread is joined off the async runtime.

use crate::wire::{self, Capabilities};
use bwbridge_core::Catalogs;
use bwbridge_core::agent::{Agent, AgentFactory, StopToken};
use bwbridge_core::error::{BridgeError, Result};
use bwbridge_core::game::Game;
use bwbridge_core::player::PlayerStatus;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tracing::{debug, error, info, warn};

/// Per-session settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Flags reported to the engine during the handshake.
    pub capabilities: Capabilities,
    /// Upper bound on commands flushed per frame; the rest stay queued.
    pub max_commands_per_frame: usize,
    /// Game speed command enqueued before the first flush, if set.
    /// 0 is fastest.
    pub initial_game_speed: Option<i32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::default(),
            max_commands_per_frame: 20,
            initial_game_speed: Some(0),
        }
    }
}

/// A running agent thread and its cancellation token.
struct AgentHandle {
    token: StopToken,
    thread: std::thread::JoinHandle<()>,
}

impl AgentHandle {
    /// Start the agent on a dedicated thread. Panics from the agent are
    /// contained at the thread boundary and treated as an implicit stop.
    fn spawn(mut agent: Box<dyn Agent>, game: Arc<Game>) -> Result<Self> {
        let token = StopToken::new();
        let agent_token = token.clone();
        let thread = std::thread::Builder::new()
            .name("bwbridge-agent".into())
            .spawn(move || {
                let outcome =
                    std::panic::catch_unwind(AssertUnwindSafe(|| agent.run(game, &agent_token)));
                if outcome.is_err() {
                    error!("agent panicked; treating as stop");
                }
            })?;

        Ok(Self { token, thread })
    }

    /// Signal the agent and wait for it to acknowledge by returning.
    async fn stop(self) {
        self.token.stop();
        let joined = tokio::task::spawn_blocking(move || self.thread.join()).await;
        match joined {
            Ok(Ok(())) => debug!("agent thread exited"),
            // The panic was already logged inside the thread.
            Ok(Err(_)) => {}
            Err(e) => warn!(error = %e, "agent join task failed"),
        }
    }
}

async fn read_line<R>(lines: &mut Lines<R>) -> Result<String>
where
    R: AsyncBufRead + Unpin,
{
    lines.next_line().await?.ok_or(BridgeError::Disconnect)
}

async fn write_line<W>(writer: &mut W, line: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// Serve one engine connection to completion.
///
/// Returns `Ok(())` on a clean end-of-stream after the game started;
/// `BridgeError::Disconnect` if the engine vanished mid-setup; any other
/// error aborts this session only.
pub async fn run_session<R, W>(
    reader: R,
    mut writer: W,
    config: SessionConfig,
    catalogs: Arc<Catalogs>,
    factory: &AgentFactory,
) -> Result<()>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    let mut lines = reader.lines();

    // Handshaking: the engine leads with the player roster; we answer with
    // the four capability flags.
    info!(phase = "handshaking", "session started");
    let player_line = read_line(&mut lines).await?;
    let (local_player_id, players) = wire::decode_handshake(&player_line)?;
    info!(
        local_player_id,
        players = players.len(),
        "handshake received"
    );
    write_line(&mut writer, &wire::encode_capabilities(&config.capabilities)).await?;

    // Synchronizing: pre-game data, terrain analysis only when negotiated.
    info!(phase = "synchronizing", "reading pre-game data");
    let starting_locations = wire::decode_starting_locations(&read_line(&mut lines).await?)?;
    let map = wire::decode_map(&read_line(&mut lines).await?)?;
    let (choke_points, base_locations) = if config.capabilities.terrain_analysis {
        let chokes = wire::decode_choke_points(&read_line(&mut lines).await?)?;
        let bases = wire::decode_base_locations(&read_line(&mut lines).await?)?;
        (chokes, bases)
    } else {
        (Vec::new(), Vec::new())
    };
    info!(
        map = map.name(),
        width = map.width(),
        height = map.height(),
        starting_locations = starting_locations.len(),
        choke_points = choke_points.len(),
        "game starting"
    );

    let game = Arc::new(Game::new(
        map,
        starting_locations,
        base_locations,
        choke_points,
        players,
        local_player_id,
        catalogs,
    )?);

    // Ally flags are fixed at session start, so one snapshot of the roster
    // serves classification for the whole session.
    let player_table = game.players();

    // Running: whatever happens in the frame loop, the agent is stopped and
    // joined before the session returns.
    info!(phase = "running", "entering frame loop");
    let mut agent: Option<AgentHandle> = None;
    let result = frame_loop(
        &mut lines,
        &mut writer,
        &config,
        &game,
        &player_table,
        factory,
        &mut agent,
    )
    .await;

    info!(phase = "terminated", frames = game.frame(), "session ending");
    if let Some(handle) = agent.take() {
        handle.stop().await;
    }
    result
}

async fn frame_loop<R, W>(
    lines: &mut Lines<R>,
    writer: &mut W,
    config: &SessionConfig,
    game: &Arc<Game>,
    player_table: &[Option<PlayerStatus>],
    factory: &AgentFactory,
    agent: &mut Option<AgentHandle>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        let line = match lines.next_line().await? {
            Some(line) => line,
            // Clean end of stream: the game is over.
            None => return Ok(()),
        };

        let (delta, units) = wire::decode_frame_update(&line, game.local_player_id(), player_table)?;
        game.apply_frame_update(&delta, units);

        if agent.is_none() {
            if let Some(speed) = config.initial_game_speed {
                game.commands().set_game_speed(speed);
            }
            debug!("first frame applied; starting agent");
            *agent = Some(AgentHandle::spawn(factory(), Arc::clone(game))?);
        }

        let batch = game.commands().drain_batch(config.max_commands_per_frame);
        if !batch.is_empty() {
            debug!(frame = game.frame(), commands = batch.len(), "flushing commands");
        }
        write_line(writer, &wire::encode_command_batch(&batch)).await?;
    }
}
