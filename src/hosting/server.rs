use super::lobby::Command;
use super::lobby::Lobby;
use crate::config::Config;
use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::web;
use actix_web::App;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use serde::Deserialize;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::mpsc::UnboundedSender;

/// monotonically increasing connection serial, so a stale bridge cannot
/// evict its replacement
static SERIAL: AtomicU64 = AtomicU64::new(1);

/// Handshake query: the client supplies its stable identity up front;
/// connections without one are rejected before the upgrade.
#[derive(Debug, Deserialize)]
pub struct Handshake {
    #[serde(rename = "playerId")]
    player_id: String,
    name: Option<String>,
    color: Option<String>,
}

pub struct Server;

impl Server {
    pub async fn run(config: Config) -> anyhow::Result<()> {
        let port = config.port;
        let lobby = web::Data::new(Lobby::spawn(config));
        log::info!("starting arena server on port {}", port);
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
                .app_data(lobby.clone())
                .route("/ws", web::get().to(connect))
        })
        .workers(4)
        .shutdown_timeout(crate::SHUTDOWN_GRACE_SECS)
        .bind(("0.0.0.0", port))?
        .run()
        .await?;
        log::info!("arena server stopped");
        Ok(())
    }
}

/// WebSocket handshake: upgrade, then bridge the socket onto the lobby.
async fn connect(
    lobby: web::Data<UnboundedSender<Command>>,
    query: web::Query<Handshake>,
    body: web::Payload,
    req: HttpRequest,
) -> impl Responder {
    let Handshake {
        player_id,
        name,
        color,
    } = query.into_inner();
    if player_id.is_empty() {
        return HttpResponse::BadRequest().body("playerId is required");
    }
    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => {
            bridge(lobby.get_ref().clone(), player_id, name, color, session, stream);
            response
        }
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

/// Per-connection pump. Outbound snapshots drain ahead of inbound frames,
/// a periodic ping keeps the peer honest, and any failure tears the bridge
/// down and tells the lobby.
fn bridge(
    lobby: UnboundedSender<Command>,
    player: String,
    name: Option<String>,
    color: Option<String>,
    mut session: actix_ws::Session,
    mut stream: actix_ws::MessageStream,
) {
    use futures::StreamExt;
    let conn = SERIAL.fetch_add(1, Ordering::Relaxed);
    let (tx, mut rx) = unbounded_channel::<String>();
    let join = Command::Join {
        conn,
        player: player.clone(),
        name,
        color,
        tx,
    };
    if lobby.send(join).is_err() {
        return;
    }
    actix_web::rt::spawn(async move {
        let mut keepalive = tokio::time::interval(std::time::Duration::from_secs(5));
        'sesh: loop {
            tokio::select! {
                biased;
                msg = rx.recv() => match msg {
                    Some(json) => if session.text(json).await.is_err() { break 'sesh },
                    None => break 'sesh,
                },
                msg = stream.next() => match msg {
                    Some(Ok(actix_ws::Message::Text(text))) => {
                        let message = Command::Message { player: player.clone(), text: text.to_string() };
                        if lobby.send(message).is_err() { break 'sesh }
                    }
                    Some(Ok(actix_ws::Message::Close(_))) => break 'sesh,
                    Some(Ok(_)) => continue 'sesh,
                    Some(Err(_)) => break 'sesh,
                    None => break 'sesh,
                },
                _ = keepalive.tick() => if session.ping(b"").await.is_err() { break 'sesh },
            }
        }
        let _ = lobby.send(Command::Drop { conn, player });
    });
}
