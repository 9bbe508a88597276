use crate::config::Config;
use crate::dto::ClientMessage;
use crate::dto::ServerMessage;
use crate::session::Session;
use std::collections::HashMap;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;

/// Commands from connection bridges into the lobby task.
#[derive(Debug)]
pub enum Command {
    Join {
        conn: u64,
        player: String,
        name: Option<String>,
        color: Option<String>,
        tx: UnboundedSender<String>,
    },
    Message {
        player: String,
        text: String,
    },
    Drop {
        conn: u64,
        player: String,
    },
}

struct Client {
    conn: u64,
    tx: UnboundedSender<String>,
}

/// Owner task for the one arena.
///
/// The session, the connected sockets, and the broadcast cadence all live
/// here; bridges reach it over an unbounded command channel, so every
/// mutation serialises at the tick boundary and the reducer itself never
/// needs a lock. Each tick serializes the snapshot once and fans it out.
pub struct Lobby {
    config: Config,
    session: Session,
    clients: HashMap<String, Client>,
    commands: UnboundedReceiver<Command>,
}

impl Lobby {
    /// spawn the lobby task and return its command handle
    pub fn spawn(config: Config) -> UnboundedSender<Command> {
        let (tx, rx) = unbounded_channel();
        let lobby = Self {
            session: Session::new(config.clone(), crate::clock()),
            config,
            clients: HashMap::new(),
            commands: rx,
        };
        tokio::spawn(lobby.run());
        tx
    }

    async fn run(mut self) {
        let period = std::time::Duration::from_millis(self.config.tick_millis);
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.advance(),
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
            }
        }
    }

    /// one tick: advance the session and fan the snapshot out
    fn advance(&mut self) {
        if let Some(state) = self.session.tick(crate::clock()) {
            match serde_json::to_string(&ServerMessage::StateSync(&state)) {
                Ok(json) => self.broadcast(&json),
                Err(e) => log::error!("failed to serialize snapshot: {}", e),
            }
        }
    }

    /// a failed send means a dead socket; it costs that client only
    fn broadcast(&mut self, json: &str) {
        let dropped = self
            .clients
            .iter()
            .filter(|(_, client)| client.tx.send(json.to_string()).is_err())
            .map(|(id, _)| id.clone())
            .collect::<Vec<_>>();
        for id in dropped {
            log::warn!("dropping unreachable client {}", id);
            self.clients.remove(&id);
            self.session.remove_player(&id);
        }
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Join {
                conn,
                player,
                name,
                color,
                tx,
            } => self.join(conn, player, name, color, tx),
            Command::Message { player, text } => self.message(&player, &text),
            Command::Drop { conn, player } => self.disconnect(conn, &player),
        }
    }

    /// Register the player and greet the socket with the current snapshot.
    /// A second connection for the same id replaces the first.
    fn join(
        &mut self,
        conn: u64,
        player: String,
        name: Option<String>,
        color: Option<String>,
        tx: UnboundedSender<String>,
    ) {
        self.session
            .add_player(&player, name.as_deref(), color.as_deref());
        match serde_json::to_string(&ServerMessage::StateSync(self.session.state())) {
            Ok(json) => {
                let _ = tx.send(json);
            }
            Err(e) => log::error!("failed to serialize snapshot: {}", e),
        }
        self.clients.insert(player, Client { conn, tx });
    }

    fn message(&mut self, player: &str, text: &str) {
        match serde_json::from_str::<ClientMessage>(text) {
            Ok(ClientMessage::Input { dx, dy }) => self.session.set_input(player, dx, dy),
            Ok(ClientMessage::UpdateProfile(update)) => self.session.queue_profile_update(update),
            Err(e) => log::debug!("ignoring malformed message from {}: {}", player, e),
        }
    }

    /// ignores drops from bridges that have already been replaced
    fn disconnect(&mut self, conn: u64, player: &str) {
        if self.clients.get(player).is_some_and(|c| c.conn == conn) {
            self.clients.remove(player);
            self.session.remove_player(player);
        }
    }
}
