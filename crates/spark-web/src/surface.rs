use spark_engine::{Color, Surface};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// [`Surface`] over a browser `<canvas>` 2D context.
///
/// Transform and arc calls can only fail on non-finite input; those failures
/// are dropped so one bad particle never aborts a frame.
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    pub fn from_canvas(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self::new(ctx))
    }

    /// Look up `<canvas id="...">` in the current document.
    pub fn from_element_id(id: &str) -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas = document
            .get_element_by_id(id)
            .ok_or_else(|| JsValue::from_str(&format!("no element #{}", id)))?
            .dyn_into::<HtmlCanvasElement>()?;
        Self::from_canvas(&canvas)
    }

    pub fn context(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }
}

impl Surface for CanvasSurface {
    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha as f64);
    }

    fn set_fill_color(&mut self, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
    }

    fn translate(&mut self, x: f32, y: f32) {
        let _ = self.ctx.translate(x as f64, y as f64);
    }

    fn rotate(&mut self, angle: f32) {
        let _ = self.ctx.rotate(angle as f64);
    }

    fn scale(&mut self, x: f32, y: f32) {
        let _ = self.ctx.scale(x as f64, y as f64);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.ctx.move_to(x as f64, y as f64);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.ctx.line_to(x as f64, y as f64);
    }

    fn arc(&mut self, x: f32, y: f32, radius: f32, start: f32, end: f32) {
        let _ = self.ctx.arc(x as f64, y as f64, radius as f64, start as f64, end as f64);
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.ctx.fill_rect(x as f64, y as f64, width as f64, height as f64);
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.ctx.clear_rect(x as f64, y as f64, width as f64, height as f64);
    }
}
