//! Remote graph templates loaded with `window.fetch`.

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Request, RequestInit, Response};

use super::super::graph::TemplateFetcher;

/// [`TemplateFetcher`] issuing a GET through `window.fetch`.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpFetcher;

impl TemplateFetcher for HttpFetcher {
	fn fetch(&self, uri: &str, done: Box<dyn FnOnce(Result<String, String>)>) {
		let uri = uri.to_string();
		spawn_local(async move {
			done(get_text(&uri).await);
		});
	}
}

/// Any status below 400 counts as success.
async fn get_text(url: &str) -> Result<String, String> {
	let opts = RequestInit::new();
	opts.set_method("GET");

	let request =
		Request::new_with_str_and_init(url, &opts).map_err(|e| format!("request error: {:?}", e))?;

	let window = web_sys::window().ok_or("no window")?;
	let resp_value = JsFuture::from(window.fetch_with_request(&request))
		.await
		.map_err(|e| format!("fetch error: {:?}", e))?;

	let resp: Response = resp_value
		.dyn_into()
		.map_err(|_| "response is not a Response")?;

	if !(200..400).contains(&resp.status()) {
		return Err(format!("HTTP {} for {}", resp.status(), url));
	}

	let text = JsFuture::from(
		resp.text()
			.map_err(|e| format!("text promise error: {:?}", e))?,
	)
	.await
	.map_err(|e| format!("text error: {:?}", e))?;

	text.as_string().ok_or_else(|| "response body is not text".to_string())
}
