//! Axum web server with WebSocket updates for the dashboard.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{
        rejection::JsonRejection,
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use joymap_data::Metric;
use joymap_rank::Ranking;
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::binding::{Input, Output};
use crate::controls::{ControlState, Weight};
use crate::dashboard::{Dashboard, Event, Render};

/// Shared application state.
///
/// The REST routes drive this dashboard; each WebSocket connection works on
/// its own session cloned from it.
pub struct AppState {
    dashboard: RwLock<Dashboard>,
}

/// Dashboard server.
pub struct DashServer {
    state: Arc<AppState>,
    debug: bool,
}

impl DashServer {
    /// Create a server around a dashboard session.
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            state: Arc::new(AppState {
                dashboard: RwLock::new(dashboard),
            }),
            debug: false,
        }
    }

    /// Enable per-request tracing.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        let router = Router::new()
            // Dashboard page
            .route("/", get(index_handler))
            .route("/health", get(health))
            // API routes
            .route("/api/status", get(status_handler))
            .route("/api/bindings", get(bindings_handler))
            .route("/api/controls", get(controls_handler).post(set_control_handler))
            .route("/api/reset", post(reset_handler))
            .route("/api/render", get(render_handler))
            .route("/api/ranking", get(ranking_handler))
            .route("/api/map", get(map_handler))
            .route("/api/map/spec", get(map_spec_handler))
            // WebSocket for live updates
            .route("/ws", get(ws_handler))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone());

        if self.debug {
            router.layer(TraceLayer::new_for_http())
        } else {
            router
        }
    }

    /// Run the server on the given address.
    pub async fn serve(self, addr: std::net::SocketAddr) -> Result<(), std::io::Error> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Dashboard running on http://{}", listener.local_addr()?);
        axum::serve(listener, self.router()).await
    }
}

/// Serve the dashboard page.
async fn index_handler() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

async fn health() -> &'static str {
    "OK"
}

/// Server status response.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    record_count: usize,
    map_count: usize,
    join_mismatches: usize,
    local_geometry: bool,
    controls: ControlState,
    reset_clicks: u64,
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let dashboard = state.dashboard.read().await;
    Json(StatusResponse {
        status: "ok",
        record_count: dashboard.dataset().len(),
        map_count: dashboard.map().row_count(),
        join_mismatches: dashboard.map().mismatches().len(),
        local_geometry: dashboard.map().has_local_geometry(),
        controls: dashboard.controls(),
        reset_clicks: dashboard.reset_clicks(),
    })
}

#[derive(Serialize)]
struct BindingInfo {
    name: &'static str,
    inputs: Vec<Input>,
    outputs: Vec<Output>,
}

async fn bindings_handler(State(state): State<Arc<AppState>>) -> Json<Vec<BindingInfo>> {
    let dashboard = state.dashboard.read().await;
    let bindings = dashboard
        .bindings()
        .iter()
        .map(|b| BindingInfo {
            name: b.name,
            inputs: b.inputs.clone(),
            outputs: b.outputs.clone(),
        })
        .collect();
    Json(bindings)
}

async fn controls_handler(State(state): State<Arc<AppState>>) -> Json<ControlState> {
    let dashboard = state.dashboard.read().await;
    Json(dashboard.controls())
}

#[derive(Deserialize)]
struct SetControlRequest {
    control: Metric,
    value: i64,
}

async fn set_control_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SetControlRequest>, JsonRejection>,
) -> Result<Json<Render>, (StatusCode, String)> {
    let Json(req) = payload.map_err(bad_request)?;
    let mut dashboard = state.dashboard.write().await;
    Ok(Json(dashboard.dispatch(Event::SliderChanged {
        control: req.control,
        value: req.value,
    })))
}

fn bad_request(rejection: JsonRejection) -> (StatusCode, String) {
    tracing::debug!(%rejection, "Rejected control request");
    (StatusCode::BAD_REQUEST, rejection.body_text())
}

async fn reset_handler(State(state): State<Arc<AppState>>) -> Json<Render> {
    let mut dashboard = state.dashboard.write().await;
    Json(dashboard.dispatch(Event::ResetClicked))
}

async fn render_handler(State(state): State<Arc<AppState>>) -> Json<Render> {
    let mut dashboard = state.dashboard.write().await;
    Json(dashboard.initial_render())
}

/// Stateless ranking query; missing weights default to 5.
#[derive(Debug, Default, Deserialize)]
struct RankingQuery {
    health: Option<i64>,
    freedom: Option<i64>,
    economy: Option<i64>,
}

impl RankingQuery {
    fn controls(&self) -> ControlState {
        let weight = |value: Option<i64>| value.map(Weight::clamped).unwrap_or_default();
        ControlState {
            health: weight(self.health),
            freedom: weight(self.freedom),
            economy: weight(self.economy),
        }
    }
}

#[derive(Serialize)]
struct RankingResponse {
    #[serde(flatten)]
    ranking: Ranking,
    display: String,
    controls: ControlState,
}

async fn ranking_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RankingQuery>,
) -> Json<RankingResponse> {
    let dashboard = state.dashboard.read().await;
    let controls = query.controls();
    let ranking = Ranking::compute(controls.weights(), dashboard.dataset().records());
    Json(RankingResponse {
        display: ranking.display(),
        ranking,
        controls,
    })
}

async fn map_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let dashboard = state.dashboard.read().await;
    Html(dashboard.map().to_html())
}

async fn map_spec_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let dashboard = state.dashboard.read().await;
    Json(dashboard.map().spec())
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let mut session = state.dashboard.read().await.session();

    // Send the full page render on connect
    let render = session.initial_render();
    if !send_update(&mut socket, render).await {
        return;
    }

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<WsCommand>(text.as_str()) {
                Ok(cmd) => {
                    let render = handle_ws_command(&mut session, cmd);
                    if !send_update(&mut socket, render).await {
                        break;
                    }
                }
                Err(err) => {
                    tracing::debug!(%err, "Ignoring malformed WebSocket command");
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }
}

async fn send_update(socket: &mut WebSocket, render: Render) -> bool {
    match serde_json::to_string(&WsResponse::Update(render)) {
        Ok(json) => socket.send(Message::Text(json.into())).await.is_ok(),
        Err(err) => {
            tracing::error!(%err, "Failed to serialize update");
            false
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum WsCommand {
    #[serde(rename = "set")]
    Set { control: Metric, value: i64 },
    #[serde(rename = "reset")]
    Reset,
    #[serde(rename = "render")]
    Render,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum WsResponse {
    #[serde(rename = "update")]
    Update(Render),
}

fn handle_ws_command(dashboard: &mut Dashboard, cmd: WsCommand) -> Render {
    match cmd {
        WsCommand::Set { control, value } => {
            dashboard.dispatch(Event::SliderChanged { control, value })
        }
        WsCommand::Reset => dashboard.dispatch(Event::ResetClicked),
        WsCommand::Render => dashboard.initial_render(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, extract::FromRequest, http::Request};
    use crate::map::{MapLayer, MapOptions};
    use joymap_data::{CountryRecord, Dataset};

    fn dashboard() -> Dashboard {
        let records = vec![
            CountryRecord {
                region_id: 1,
                country: "A".to_string(),
                health: 8.0,
                freedom: 2.0,
                economy: 2.0,
                delta_happy: 6.0,
                happiness_rank: 1,
            },
            CountryRecord {
                region_id: 2,
                country: "B".to_string(),
                health: 1.0,
                freedom: 9.0,
                economy: 1.0,
                delta_happy: 4.0,
                happiness_rank: 2,
            },
        ];
        let dataset = Dataset::from_records(records).unwrap();
        let map = MapLayer::new(&dataset, None, MapOptions::default());
        Dashboard::new(Arc::new(dataset), map)
    }

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            dashboard: RwLock::new(dashboard()),
        })
    }

    #[test]
    fn server_creation() {
        let _server = DashServer::new(dashboard());
    }

    #[test]
    fn router_builds() {
        let server = DashServer::new(dashboard());
        let _router = server.router();
        let _debug_router = DashServer::new(dashboard()).with_debug(true).router();
    }

    #[test]
    fn ranking_query_defaults_and_clamps() {
        let query = RankingQuery {
            health: None,
            freedom: Some(99),
            economy: Some(-1),
        };
        let controls = query.controls();
        assert_eq!(controls.health.get(), 5);
        assert_eq!(controls.freedom.get(), 10);
        assert_eq!(controls.economy.get(), 0);
    }

    #[test]
    fn ws_commands_parse() {
        let cmd: WsCommand =
            serde_json::from_str(r#"{"type": "set", "control": "freedom", "value": 3}"#).unwrap();
        assert!(matches!(cmd, WsCommand::Set { control: Metric::Freedom, value: 3 }));
        let cmd: WsCommand = serde_json::from_str(r#"{"type": "reset"}"#).unwrap();
        assert!(matches!(cmd, WsCommand::Reset));
    }

    #[tokio::test]
    async fn set_control_dispatches_through_state() {
        let state = state();
        let Json(render) = set_control_handler(
            State(state.clone()),
            Ok(Json(SetControlRequest {
                control: Metric::Freedom,
                value: 9,
            })),
        )
        .await
        .unwrap();
        assert_eq!(render.controls.freedom.get(), 9);
        assert_eq!(render.list_text.as_deref(), Some("A, B"));

        let Json(controls) = controls_handler(State(state)).await;
        assert_eq!(controls.freedom.get(), 9);
    }

    async fn rejection_for(body: &'static str) -> JsonRejection {
        let request = Request::builder()
            .method("POST")
            .uri("/api/controls")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        Json::<SetControlRequest>::from_request(request, &()).await.err().unwrap()
    }

    #[tokio::test]
    async fn bad_control_bodies_are_bad_requests() {
        let state = state();
        for body in [
            r#"{"control": "health", "value": "high"}"#,
            r#"{"control": "happiness", "value": 3}"#,
            r#"{"control": "health""#,
        ] {
            let rejection = rejection_for(body).await;
            let (status, _) = set_control_handler(State(state.clone()), Err(rejection))
                .await
                .err()
                .unwrap();
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }

        let Json(controls) = controls_handler(State(state)).await;
        assert_eq!(controls, ControlState::default());
    }

    #[tokio::test]
    async fn ws_sessions_do_not_share_controls() {
        let state = state();
        let mut first = state.dashboard.read().await.session();
        let render = handle_ws_command(&mut first, WsCommand::Set { control: Metric::Freedom, value: 9 });
        assert_eq!(render.controls.freedom.get(), 9);

        let mut second = state.dashboard.read().await.session();
        let render = handle_ws_command(&mut second, WsCommand::Render);
        assert_eq!(render.controls, ControlState::default());
        assert_eq!(render.triggered, vec!["reset", "list", "map"]);

        let Json(controls) = controls_handler(State(state)).await;
        assert_eq!(controls, ControlState::default());
    }

    #[tokio::test]
    async fn reset_handler_restores_defaults() {
        let state = state();
        state.dashboard.write().await.dispatch(Event::SliderChanged {
            control: Metric::Economy,
            value: 1,
        });

        let Json(render) = reset_handler(State(state)).await;
        assert_eq!(render.controls, ControlState::default());
        assert_eq!(render.list_text.as_deref(), Some("B, A"));
    }

    #[tokio::test]
    async fn ranking_handler_is_stateless() {
        let state = state();
        let Json(response) = ranking_handler(
            State(state.clone()),
            Query(RankingQuery {
                health: Some(0),
                freedom: Some(10),
                economy: Some(0),
            }),
        )
        .await;
        assert_eq!(response.ranking.dominant, Metric::Freedom);
        assert_eq!(response.display, "A, B");

        let Json(controls) = controls_handler(State(state)).await;
        assert_eq!(controls, ControlState::default());
    }

    #[test]
    fn status_reports_dataset() {
        let Json(status) = tokio_test::block_on(status_handler(State(state())));
        assert_eq!(status.record_count, 2);
        assert_eq!(status.map_count, 2);
        assert!(!status.local_geometry);
    }
}
