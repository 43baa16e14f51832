use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::scene::{BACKGROUND, LABEL_COLOR, LINK_COLOR, Scene};

pub fn render(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, scene.width, scene.height);
	ctx.save();
	let _ = ctx.translate(scene.transform.x, scene.transform.y);
	let _ = ctx.scale(scene.transform.k, scene.transform.k);
	draw_links(scene, ctx);
	draw_nodes(scene, ctx);
	ctx.restore();
}

fn draw_links(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str(LINK_COLOR);
	ctx.set_line_width(scene.line_width);
	ctx.begin_path();
	for link in &scene.links {
		ctx.move_to(link.x1, link.y1);
		ctx.line_to(link.x2, link.y2);
	}
	ctx.stroke();

	ctx.set_fill_style_str(LABEL_COLOR);
	ctx.set_font(&format!("{}px sans-serif", scene.font_size));
	ctx.set_text_align("center");
	for link in scene.links.iter().filter(|l| !l.label.is_empty()) {
		let _ = ctx.fill_text(
			&link.label,
			(link.x1 + link.x2) / 2.0,
			(link.y1 + link.y2) / 2.0,
		);
	}
	ctx.set_text_align("start");
}

fn draw_nodes(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	for node in &scene.nodes {
		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, node.radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(node.fill);
		ctx.fill();
		ctx.set_stroke_style_str(node.stroke);
		ctx.set_line_width(node.stroke_width);
		ctx.stroke();

		ctx.set_fill_style_str(LABEL_COLOR);
		let _ = ctx.fill_text(&node.label, node.x + node.radius + 3.0, node.y + 3.0);
	}
}
