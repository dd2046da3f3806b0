//! Single binary web server: run tournament simulations and fetch their reports via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080), SIM_CONFIG (path to a JSON config).

use actix_web::{
    delete, get, post,
    web::{self, Data, Path},
    App, HttpResponse, HttpServer, Responder,
};
use basketball_tournament_sim::{
    simulate_olympics, Exhibitions, Roster, SimConfig, SimulationReport, TournamentError,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Stored simulation: report + last activity time (for auto-cleanup).
struct SimulationEntry {
    report: SimulationReport,
    last_activity: Instant,
}

/// Inputs used when a request does not bring its own.
struct Defaults {
    config: SimConfig,
    roster: Roster,
    exhibitions: Exhibitions,
}

/// In-memory state: finished simulations by ID. Entries are removed after 12h inactivity.
type AppState = Data<RwLock<HashMap<Uuid, SimulationEntry>>>;

/// Inactivity threshold: simulations not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

const DEFAULT_ROSTER: &str = include_str!("../../data/groups.json");
const DEFAULT_EXHIBITIONS: &str = include_str!("../../data/exhibitions.json");

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct CreateSimulationBody {
    #[serde(default)]
    config: Option<SimConfig>,
    /// Same shape as data/groups.json.
    #[serde(default)]
    roster: Option<serde_json::Value>,
    /// Same shape as data/exhibitions.json.
    #[serde(default)]
    exhibitions: Option<serde_json::Value>,
}

/// An empty body means "use the defaults"; anything else must be a valid JSON body.
fn parse_create_body(bytes: &[u8]) -> Result<CreateSimulationBody, serde_json::Error> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(CreateSimulationBody::default());
    }
    serde_json::from_slice(bytes)
}

/// Path segment: simulation id (e.g. /api/simulations/{id})
#[derive(Deserialize)]
struct SimulationPath {
    id: Uuid,
}

fn error_response(e: &TournamentError) -> HttpResponse {
    if e.is_fatal() {
        log::error!("Simulation aborted: {}", e);
        HttpResponse::UnprocessableEntity().json(serde_json::json!({ "error": e.to_string() }))
    } else {
        HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "basketball-tournament-sim",
    })
}

/// Run a full simulation (group stage, draw, knockout) and store its report.
#[post("/api/simulations")]
async fn api_create_simulation(
    state: AppState,
    defaults: Data<Defaults>,
    body: web::Bytes,
) -> HttpResponse {
    let CreateSimulationBody {
        config,
        roster,
        exhibitions,
    } = match parse_create_body(&body) {
        Ok(b) => b,
        Err(e) => {
            return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
        }
    };
    let config = config.unwrap_or_else(|| defaults.config.clone());
    let roster = match roster.map(Roster::from_json_value).transpose() {
        Ok(r) => r.unwrap_or_else(|| defaults.roster.clone()),
        Err(e) => return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    };
    let exhibitions = match exhibitions.map(Exhibitions::from_json_value).transpose() {
        Ok(x) => x.unwrap_or_else(|| defaults.exhibitions.clone()),
        Err(e) => return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    };

    let outcome = web::block(move || simulate_olympics(&roster, &exhibitions, &config)).await;
    let report = match outcome {
        Ok(Ok(report)) => report,
        Ok(Err(e)) => return error_response(&e),
        Err(_) => return HttpResponse::InternalServerError().body("simulation task failed"),
    };
    log::info!(
        "Simulation {} finished: gold {}, silver {}, bronze {}",
        report.id,
        report.medals.gold,
        report.medals.silver,
        report.medals.bronze
    );

    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let id = report.id;
    let response = HttpResponse::Ok().json(&report);
    g.insert(
        id,
        SimulationEntry {
            report,
            last_activity: Instant::now(),
        },
    );
    response
}

/// List stored simulation ids.
#[get("/api/simulations")]
async fn api_list_simulations(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let ids: Vec<Uuid> = g.keys().copied().collect();
    HttpResponse::Ok().json(ids)
}

/// Get a simulation report by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/simulations/{id}")]
async fn api_get_simulation(state: AppState, path: Path<SimulationPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(&entry.report)
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No simulation" })),
    }
}

/// Remove a stored simulation.
#[delete("/api/simulations/{id}")]
async fn api_delete_simulation(state: AppState, path: Path<SimulationPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.remove(&path.id) {
        Some(_) => HttpResponse::NoContent().finish(),
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No simulation" })),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn load_defaults() -> std::io::Result<Defaults> {
    let to_io = |e: basketball_tournament_sim::DataError| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
    };
    let config = match std::env::var("SIM_CONFIG") {
        Ok(path) => {
            log::info!("Loading simulation config from {}", path);
            SimConfig::from_json_file(&path).map_err(to_io)?
        }
        Err(_) => SimConfig::default(),
    };
    Ok(Defaults {
        config,
        roster: Roster::from_json_str(DEFAULT_ROSTER).map_err(to_io)?,
        exhibitions: Exhibitions::from_json_str(DEFAULT_EXHIBITIONS).map_err(to_io)?,
    })
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    let defaults = Data::from(Arc::new(load_defaults()?));
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<Uuid, SimulationEntry>::new()));

    // Background task: every 30 minutes, remove simulations inactive for 12+ hours
    let state_cleanup = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive simulation(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(defaults.clone())
            .service(api_health)
            .service(api_create_simulation)
            .service(api_list_simulations)
            .service(api_get_simulation)
            .service(api_delete_simulation)
    })
    .bind(bind)?
    .run()
    .await
}
