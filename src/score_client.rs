use camjigsaw_core::{Leaderboard, PuzzleError, ScoreSubmission};
use camjigsaw_core::scores::endpoint_url;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

fn service_error(value: JsValue) -> PuzzleError {
    PuzzleError::ScoreService(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

fn page_location() -> Result<String, PuzzleError> {
    let window = web_sys::window().ok_or_else(|| PuzzleError::ScoreService("no window".into()))?;
    window.location().href().map_err(service_error)
}

async fn fetch_text(url: &str) -> Result<String, PuzzleError> {
    let window = web_sys::window().ok_or_else(|| PuzzleError::ScoreService("no window".into()))?;
    let response: Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(service_error)?
        .dyn_into()
        .map_err(service_error)?;
    if !response.ok() {
        return Err(PuzzleError::ScoreService(format!(
            "{} answered {}",
            url,
            response.status()
        )));
    }
    let body = JsFuture::from(response.text().map_err(service_error)?)
        .await
        .map_err(service_error)?;
    body.as_string()
        .ok_or_else(|| PuzzleError::ScoreService("response body is not text".into()))
}

pub(crate) async fn fetch_leaderboard(endpoint: &str) -> Result<Leaderboard, PuzzleError> {
    let url = endpoint_url(&page_location()?, endpoint)?;
    let body = fetch_text(url.as_str()).await?;
    Leaderboard::from_json(&body)
}

pub(crate) async fn submit_score(
    submission: &ScoreSubmission,
    endpoint: &str,
) -> Result<(), PuzzleError> {
    let url = submission.request_url(&page_location()?, endpoint)?;
    fetch_text(url.as_str()).await?;
    gloo::console::log!("score saved", submission.name.as_str(), submission.time as f64);
    Ok(())
}
