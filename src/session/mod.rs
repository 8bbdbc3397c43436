use crate::common::error::AppError;
use crate::replay::CapturedRequest;

pub mod model;

pub use model::{Flow, Session};

/// Parse a RelayCraft session export into replay input
pub fn captured_requests_from_session(json: &str) -> Result<Vec<CapturedRequest>, AppError> {
    let session: Session = serde_json::from_str(json)?;
    log::debug!(
        "Loaded {} flow(s) from session {}",
        session.flows.len(),
        session.id
    );
    Ok(session.captured_requests())
}
