use camjigsaw_core::PuzzleError;
use js_sys::Promise;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlVideoElement, MediaStream, MediaStreamConstraints};

fn js_reason(value: JsValue) -> PuzzleError {
    let reason = value
        .as_string()
        .or_else(|| js_sys::JSON::stringify(&value).ok().and_then(|s| s.as_string()))
        .unwrap_or_else(|| "unknown error".to_string());
    PuzzleError::CameraUnavailable(reason)
}

/// Requests the camera and resolves once the first frame is decodable.
pub(crate) async fn open_camera() -> Result<HtmlVideoElement, PuzzleError> {
    let window = web_sys::window().ok_or_else(|| js_reason(JsValue::from_str("no window")))?;
    let devices = window.navigator().media_devices().map_err(js_reason)?;
    let constraints = MediaStreamConstraints::new();
    constraints.set_video(&JsValue::TRUE);
    let request = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(js_reason)?;
    let stream: MediaStream = JsFuture::from(request)
        .await
        .map_err(js_reason)?
        .dyn_into()
        .map_err(js_reason)?;

    let document = window
        .document()
        .ok_or_else(|| js_reason(JsValue::from_str("no document")))?;
    let video: HtmlVideoElement = document
        .create_element("video")
        .map_err(js_reason)?
        .dyn_into()
        .map_err(|_| js_reason(JsValue::from_str("video element unavailable")))?;
    video.set_muted(true);
    video.set_attribute("playsinline", "").map_err(js_reason)?;
    video.set_src_object(Some(&stream));

    let loaded = Promise::new(&mut |resolve, _reject| {
        video.set_onloadeddata(Some(&resolve));
    });
    if let Ok(playing) = video.play() {
        JsFuture::from(playing).await.map_err(js_reason)?;
    }
    JsFuture::from(loaded).await.map_err(js_reason)?;
    video.set_onloadeddata(None);

    gloo::console::log!(
        "camera ready",
        video.video_width(),
        video.video_height()
    );
    Ok(video)
}
