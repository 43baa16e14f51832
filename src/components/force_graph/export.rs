use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use log::{error, info};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
	CanvasRenderingContext2d, Document, HtmlAnchorElement, HtmlCanvasElement, HtmlImageElement,
};

use super::error::ExportError;
use super::scene::{SVG_NS, Scene};

/// Add the SVG namespace to the root element if it is missing; without it a
/// standalone image decoder refuses the document.
pub fn ensure_svg_namespace(svg: &str) -> String {
	let Some(start) = svg.find("<svg") else {
		return svg.to_string();
	};
	let tag_end = svg[start..].find('>').map_or(svg.len(), |i| start + i);
	if svg[start..tag_end].contains("xmlns=") {
		return svg.to_string();
	}
	let at = start + "<svg".len();
	format!("{} xmlns=\"{SVG_NS}\"{}", &svg[..at], &svg[at..])
}

pub fn data_url(mime: &str, contents: &str) -> String {
	format!("data:{mime};base64,{}", BASE64_STANDARD.encode(contents.as_bytes()))
}

pub fn svg_data_url(svg: &str) -> String {
	data_url("image/svg+xml", &ensure_svg_namespace(svg))
}

fn document() -> Result<Document, ExportError> {
	web_sys::window()
		.and_then(|w| w.document())
		.ok_or(ExportError::NoDocument)
}

fn trigger_download(document: &Document, href: &str, filename: &str) -> Result<(), ExportError> {
	let anchor: HtmlAnchorElement = document
		.create_element("a")?
		.dyn_into()
		.map_err(|_| ExportError::Js("anchor element expected".into()))?;
	anchor.set_href(href);
	anchor.set_download(filename);
	anchor.click();
	Ok(())
}

/// Rasterize an SVG scene to PNG and download it as `filename`.
///
/// The image decode is the only await point; on any failure nothing is
/// downloaded.
pub async fn export_png(svg: &str, width: u32, height: u32, filename: &str) -> Result<(), ExportError> {
	let document = document()?;
	let image = HtmlImageElement::new()?;
	image.set_width(width);
	image.set_height(height);
	image.set_src(&svg_data_url(svg));
	JsFuture::from(image.decode())
		.await
		.map_err(|e| ExportError::Decode(format!("{e:?}")))?;

	let canvas: HtmlCanvasElement = document
		.create_element("canvas")?
		.dyn_into()
		.map_err(|_| ExportError::NoContext)?;
	canvas.set_width(width);
	canvas.set_height(height);
	let ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")?
		.ok_or(ExportError::NoContext)?
		.dyn_into()
		.map_err(|_| ExportError::NoContext)?;
	ctx.draw_image_with_html_image_element_and_dw_and_dh(
		&image,
		0.0,
		0.0,
		width as f64,
		height as f64,
	)?;

	let png = canvas.to_data_url_with_type("image/png")?;
	trigger_download(&document, &png, filename)?;
	info!("exported {filename} ({width}x{height})");
	Ok(())
}

/// Fire-and-forget PNG export of `scene`. Failures are logged, not returned.
pub fn spawn_png_export(scene: &Scene, filename: String) {
	let svg = scene.to_svg();
	let (width, height) = (scene.width as u32, scene.height as u32);
	wasm_bindgen_futures::spawn_local(async move {
		if let Err(e) = export_png(&svg, width, height, &filename).await {
			error!("image export failed: {e}");
		}
	});
}

pub fn download_text(filename: &str, mime: &str, contents: &str) -> Result<(), ExportError> {
	trigger_download(&document()?, &data_url(mime, contents), filename)
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn adds_missing_namespace() {
		assert_eq!(
			ensure_svg_namespace("<svg width=\"1\"><g/></svg>"),
			"<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"1\"><g/></svg>"
		);
	}

	#[test]
	fn keeps_existing_namespace() {
		let svg = "<svg xmlns=\"http://www.w3.org/2000/svg\"><g/></svg>";
		assert_eq!(ensure_svg_namespace(svg), svg);
		// a namespace on a child element does not count
		assert!(
			ensure_svg_namespace("<svg><g xmlns=\"x\"/></svg>")
				.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\">")
		);
	}

	#[test]
	fn encodes_base64_data_urls() {
		assert_eq!(data_url("text/plain", "hi"), "data:text/plain;base64,aGk=");
		let url = svg_data_url("<svg></svg>");
		let payload = url.strip_prefix("data:image/svg+xml;base64,").unwrap();
		let decoded = String::from_utf8(BASE64_STANDARD.decode(payload).unwrap()).unwrap();
		assert_eq!(decoded, "<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>");
	}
}
