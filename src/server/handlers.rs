use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::delivery::{ErrorKind, ResolutionResult, ResolveError};
use crate::distance::Location;
use crate::zone::DeliveryZone;

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

/// A failed quote: same body shape as a successful one, with `error_kind` set.
pub struct ApiError(StatusCode, ResolutionResult);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(self.1)).into_response()
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        ApiError(status_for(err.kind()), ResolutionResult::failed(&err))
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidParameters => StatusCode::BAD_REQUEST,
        ErrorKind::AddressNotFound => StatusCode::NOT_FOUND,
        ErrorKind::ProviderError => StatusCode::BAD_GATEWAY,
        ErrorKind::Superseded => StatusCode::CONFLICT,
    }
}

fn invalid(msg: impl Into<String>) -> ApiError {
    ResolveError::InvalidParameters(msg.into()).into()
}

// ─── POST /api/quote ─────────────────────────────────────────────

/// Body of `POST /api/quote`.
///
/// The session memo is keyed on `destination` alone. Re-quoting the same
/// destination with different `zones`, `origin` or `tolerance_km` replays the
/// earlier verdict; call `POST /api/sessions/reset` (or close the session)
/// after changing any of them.
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub session: Option<String>,
    pub origin: Option<Location>,
    pub destination: Option<Location>,
    pub zones: Option<Vec<DeliveryZone>>,
    pub tolerance_km: Option<f64>,
}

pub async fn quote(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<ResolutionResult>, ApiError> {
    let start = Instant::now();

    let session = req
        .session
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| invalid("Missing 'session'"))?;
    let destination = req.destination.as_ref().ok_or_else(|| invalid("Missing 'destination'"))?;
    let origin = req
        .origin
        .as_ref()
        .or(state.settings.origin.as_ref())
        .ok_or_else(|| invalid("Missing 'origin' and no restaurant origin configured"))?;
    let zones = req
        .zones
        .as_deref()
        .or(state.settings.zones.as_deref())
        .ok_or_else(|| invalid("Missing 'zones' and no zone table configured"))?;
    let tolerance_km = req.tolerance_km.unwrap_or(state.settings.tolerance_km);

    let resolver = state.sessions.resolver(session);
    let result = resolver.resolve(origin, destination, zones, tolerance_km).await;

    info!(
        session,
        %destination,
        deliverable = result.as_ref().map(|r| r.deliverable).unwrap_or(false),
        error = result.as_ref().err().map(|e| e.kind().to_string()).unwrap_or_default(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "POST /api/quote"
    );

    Ok(Json(result?))
}

// ─── Sessions ────────────────────────────────────────────────────

pub async fn close_session(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> StatusCode {
    if state.sessions.close(&id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Forget every session's memo after the restaurant's zones were edited elsewhere.
pub async fn reset_sessions(State(state): State<Arc<AppState>>) -> StatusCode {
    state.sessions.reset_all();
    info!(sessions = state.sessions.len(), "reset all session memos");
    StatusCode::NO_CONTENT
}

// ─── GET /api/zones ──────────────────────────────────────────────

pub async fn zones(State(state): State<Arc<AppState>>) -> Json<Vec<DeliveryZone>> {
    Json(state.settings.zones.clone().unwrap_or_default())
}

pub async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::delivery::SessionRegistry;
    use crate::distance::StraightLineProvider;

    fn app_state(settings: Settings) -> Arc<AppState> {
        let sessions = SessionRegistry::new(Arc::new(StraightLineProvider), settings.fallback_zone.to_zone());
        Arc::new(AppState { settings, sessions })
    }

    fn configured() -> Arc<AppState> {
        app_state(Settings {
            origin: Some(Location::coords(0.0, 0.0)),
            zones: Some(vec![
                DeliveryZone::new("near", 0.0, 2.0, 0.0),
                DeliveryZone::new("far", 2.0, 20.0, 7.0),
            ]),
            ..Settings::default()
        })
    }

    fn request(session: &str, destination: Location) -> QuoteRequest {
        QuoteRequest {
            session: Some(session.into()),
            origin: None,
            destination: Some(destination),
            zones: None,
            tolerance_km: None,
        }
    }

    #[tokio::test]
    async fn test_quote_deliverable() {
        let state = configured();
        // ~2.25 km east of the origin along the equator.
        let req = request("s1", Location::coords(0.0, 0.0202));

        let Json(res) = quote(State(state), Json(req)).await.ok().unwrap();
        assert!(res.deliverable);
        assert_eq!(res.zone.unwrap().id, "far");
        assert_eq!(res.fee, Some(7.0));
    }

    #[tokio::test]
    async fn test_quote_out_of_range_is_ok() {
        let state = configured();
        let req = request("s1", Location::coords(0.0, 0.3));

        let Json(res) = quote(State(state), Json(req)).await.ok().unwrap();
        assert!(!res.deliverable);
        assert!(res.error_kind.is_none());
        assert!(res.distance_km.unwrap() > 30.0);
    }

    #[tokio::test]
    async fn test_changed_zones_replay_until_reset() {
        let state = configured();
        let dest = Location::coords(0.0, 0.0202);
        let repriced = vec![DeliveryZone::new("flat", 0.0, 10.0, 1.0)];

        let Json(first) = quote(State(state.clone()), Json(request("s1", dest.clone()))).await.ok().unwrap();
        assert_eq!(first.fee, Some(7.0));

        let mut req = request("s1", dest.clone());
        req.zones = Some(repriced.clone());
        let Json(replayed) = quote(State(state.clone()), Json(req)).await.ok().unwrap();
        assert_eq!(replayed, first);

        assert_eq!(reset_sessions(State(state.clone())).await, StatusCode::NO_CONTENT);
        let mut req = request("s1", dest);
        req.zones = Some(repriced);
        let Json(fresh) = quote(State(state), Json(req)).await.ok().unwrap();
        assert_eq!(fresh.fee, Some(1.0));
        assert_eq!(fresh.zone.unwrap().id, "flat");
    }

    #[tokio::test]
    async fn test_quote_missing_destination() {
        let state = configured();
        let mut req = request("s1", Location::coords(0.0, 0.01));
        req.destination = None;

        let ApiError(status, body) = quote(State(state), Json(req)).await.err().unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error_kind, Some(ErrorKind::InvalidParameters));
    }

    #[tokio::test]
    async fn test_quote_without_any_zone_table() {
        let state = app_state(Settings {
            origin: Some(Location::coords(0.0, 0.0)),
            ..Settings::default()
        });
        let req = request("s1", Location::coords(0.0, 0.01));

        let ApiError(status, _) = quote(State(state), Json(req)).await.err().unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_quote_empty_zone_table_uses_fallback() {
        let state = configured();
        let mut req = request("s1", Location::coords(0.0, 0.027));
        req.zones = Some(vec![]);

        let Json(res) = quote(State(state), Json(req)).await.ok().unwrap();
        assert!(res.deliverable);
        assert_eq!(res.fee, Some(crate::delivery::DEFAULT_ZONE_FEE));
    }

    #[tokio::test]
    async fn test_quote_provider_rejection_maps_to_400() {
        // The straight-line provider cannot measure addresses.
        let state = configured();
        let req = request("s1", Location::address("Rua Augusta, 500"));

        let ApiError(status, body) = quote(State(state), Json(req)).await.err().unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error_kind, Some(ErrorKind::InvalidParameters));
    }

    #[tokio::test]
    async fn test_close_session() {
        let state = configured();
        quote(State(state.clone()), Json(request("s1", Location::coords(0.0, 0.01))))
            .await
            .ok()
            .unwrap();

        assert_eq!(close_session(State(state.clone()), Path("s1".into())).await, StatusCode::NO_CONTENT);
        assert_eq!(close_session(State(state), Path("s1".into())).await, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::AddressNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::ProviderError), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(ErrorKind::Superseded), StatusCode::CONFLICT);
    }
}
