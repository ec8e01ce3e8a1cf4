/// WebSocket session actor
///
/// Each connection owns one [`Session`]; nothing is shared between
/// connections except the read-only [`AppState`].
use actix::prelude::*;
use actix_web_actors::ws;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::alias::AliasTable;
use crate::config::ServerConfig;
use crate::dataset::Session;
use crate::messages::{ClientMessage, ServerMessage};

/// How often heartbeat pings are sent
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
/// How long before lack of client response causes a timeout
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Read-only settings shared by all connections
#[derive(Debug, Clone)]
pub struct AppState {
    pub data_dir: PathBuf,
    pub aliases: Option<AliasTable>,
}

impl AppState {
    pub fn new(data_dir: impl Into<PathBuf>, aliases: Option<AliasTable>) -> Self {
        Self {
            data_dir: data_dir.into(),
            aliases,
        }
    }

    pub fn from_config(config: &ServerConfig, aliases: Option<AliasTable>) -> Self {
        Self::new(config.data_dir.clone(), aliases)
    }

    /// A fresh session using the configured vocabulary.
    pub fn new_session(&self) -> Session {
        match &self.aliases {
            Some(aliases) => Session::new().with_alias_table(aliases.clone()),
            None => Session::new(),
        }
    }
}

/// Apply one client request to `session` and build the reply.
pub fn respond(session: &mut Session, state: &AppState, msg: ClientMessage) -> ServerMessage {
    match msg {
        ClientMessage::SelectView { view } => {
            session.set_current(view);
            ServerMessage::ViewSelected { view }
        }

        ClientMessage::Upload {
            view,
            files,
            default_grade,
        } => {
            let files: Vec<_> = files.into_iter().map(Into::into).collect();
            let report = session.add_uploads(view, &files, &default_grade);
            ServerMessage::Ingested {
                view,
                rows_added: report.rows(),
                total_rows: session.dataset(view).len(),
                files: report.files,
                warnings: report.warnings,
            }
        }

        ClientMessage::LoadDirectory {
            view,
            default_grade,
        } => match session.load_directory(view, &state.data_dir, &default_grade) {
            Ok(report) => ServerMessage::Ingested {
                view,
                rows_added: report.rows(),
                total_rows: session.dataset(view).len(),
                files: report.files,
                warnings: report.warnings,
            },
            Err(e) => ServerMessage::error(e),
        },

        ClientMessage::Clear { view } => {
            session.clear(view);
            ServerMessage::Cleared { view }
        }

        ClientMessage::Query { view, filter } => {
            let spec = filter.to_filter_spec(view);
            match session.render(view, &spec) {
                Ok(table) => ServerMessage::table_data(view, &table, session.dataset(view).len()),
                Err(e) => ServerMessage::error(e),
            }
        }

        ClientMessage::Export { view, filter } => {
            let spec = filter.to_filter_spec(view);
            match session.export(view, &spec) {
                Ok(export) => ServerMessage::CsvExport {
                    content: export.as_str().to_string(),
                    file_name: export.file_name,
                },
                Err(e) => ServerMessage::error(e),
            }
        }

        ClientMessage::GradeOptions { view } => ServerMessage::GradeOptions {
            view,
            grades: session.grade_options(view),
        },
    }
}

/// WebSocket connection actor
pub struct TableWebSocket {
    hb: Instant,
    state: actix_web::web::Data<AppState>,
    session: Session,
}

impl TableWebSocket {
    pub fn new(state: actix_web::web::Data<AppState>) -> Self {
        let session = state.new_session();
        Self {
            hb: Instant::now(),
            state,
            session,
        }
    }

    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                log::info!("WebSocket client heartbeat failed, disconnecting");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    fn send(&self, msg: &ServerMessage, ctx: &mut ws::WebsocketContext<Self>) {
        match serde_json::to_string(msg) {
            Ok(text) => ctx.text(text),
            Err(e) => log::error!("could not serialize server message: {}", e),
        }
    }
}

impl Actor for TableWebSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.hb(ctx);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for TableWebSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                let reply = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => respond(&mut self.session, &self.state, client_msg),
                    Err(e) => ServerMessage::error(format!("Invalid message format: {}", e)),
                };
                self.send(&reply, ctx);
            }
            Ok(ws::Message::Binary(_)) => {
                log::warn!("unexpected binary message");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            _ => ctx.stop(),
        }
    }
}
