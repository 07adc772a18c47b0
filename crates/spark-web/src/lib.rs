pub mod frame_loop;
pub mod runner;
pub mod surface;
pub mod target;

pub use frame_loop::FrameLoop;
pub use runner::StageRunner;
pub use surface::CanvasSurface;
pub use target::JsTarget;

use std::cell::RefCell;

use glam::Vec2;
use js_sys::{Function, Object};
use spark_engine::{
    EmitPattern, EmitterId, EmitterOptions, ForceField, ForceId, InputEvent, SimulationConfig,
    SparkError, TweenId, TweenOptions,
};
use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<StageRunner>> = const { RefCell::new(None) };
}

fn with_runner<R>(f: impl FnOnce(&mut StageRunner) -> R) -> Result<R, JsValue> {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let runner = borrow
            .as_mut()
            .ok_or_else(|| JsValue::from_str("spark not initialized; call spark_init() first"))?;
        Ok(f(runner))
    })
}

fn to_js(err: SparkError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Create the stage. `canvas_id` names the `<canvas>` to paint on (empty for
/// headless); `config_json` is a `SimulationConfig` object, `"{}"` for defaults.
#[wasm_bindgen]
pub fn spark_init(canvas_id: &str, config_json: &str) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let config = SimulationConfig::from_json(config_json).map_err(to_js)?;
    let surface = if canvas_id.is_empty() {
        None
    } else {
        Some(CanvasSurface::from_element_id(canvas_id)?)
    };

    // Replacing a running runner drops its frame loop, which cancels it.
    let previous = RUNNER.with(|cell| cell.borrow_mut().replace(StageRunner::new(config, surface)));
    drop(previous);
    log::info!("spark: initialized");
    Ok(())
}

#[wasm_bindgen]
pub fn spark_start() -> Result<(), JsValue> {
    with_runner(|r| r.start())?
}

#[wasm_bindgen]
pub fn spark_stop() -> Result<(), JsValue> {
    with_runner(|r| r.stop())
}

// ---- Pointer ----

#[wasm_bindgen]
pub fn spark_pointer_move(x: f32, y: f32) -> Result<(), JsValue> {
    with_runner(|r| r.push_input(InputEvent::PointerMove { x, y }))
}

#[wasm_bindgen]
pub fn spark_pointer_down(x: f32, y: f32) -> Result<(), JsValue> {
    with_runner(|r| r.push_input(InputEvent::PointerDown { x, y }))
}

#[wasm_bindgen]
pub fn spark_pointer_up(x: f32, y: f32) -> Result<(), JsValue> {
    with_runner(|r| r.push_input(InputEvent::PointerUp { x, y }))
}

#[wasm_bindgen]
pub fn spark_pointer_leave() -> Result<(), JsValue> {
    with_runner(|r| r.push_input(InputEvent::PointerLeave))
}

// ---- Particles ----

#[wasm_bindgen]
pub fn spark_burst(x: f32, y: f32, count: u32) -> Result<(), JsValue> {
    with_runner(|r| r.burst(Vec2::new(x, y), count as usize))
}

/// Cone emitter heading `angle` (radians). A `lifetime_ms` of 0 or less runs
/// until stopped.
#[wasm_bindgen]
pub fn spark_emitter(x: f32, y: f32, rate: f32, angle: f32, spread: f32, lifetime_ms: f32) -> Result<u32, JsValue> {
    let mut options = EmitterOptions::new()
        .with_rate(rate)
        .with_pattern(EmitPattern::Cone)
        .with_angle(angle)
        .with_spread(spread);
    if lifetime_ms > 0.0 {
        options = options.with_lifetime(lifetime_ms);
    }
    with_runner(|r| r.create_emitter(Vec2::new(x, y), options).0)
}

#[wasm_bindgen]
pub fn spark_stop_emitter(id: u32) -> Result<bool, JsValue> {
    with_runner(|r| r.stop_emitter(EmitterId(id)))
}

/// Positive `strength` attracts, negative repels.
#[wasm_bindgen]
pub fn spark_force(x: f32, y: f32, strength: f32, radius: f32) -> Result<u32, JsValue> {
    with_runner(|r| r.add_force(ForceField::new(Vec2::new(x, y), strength, radius)).0)
}

#[wasm_bindgen]
pub fn spark_remove_force(id: u32) -> Result<bool, JsValue> {
    with_runner(|r| r.remove_force(ForceId(id)))
}

#[wasm_bindgen]
pub fn spark_particle_count() -> Result<u32, JsValue> {
    with_runner(|r| r.particle_count() as u32)
}

// ---- Tweens ----

/// Tween `target`'s properties toward the values in `to`.
#[wasm_bindgen]
pub fn spark_tween(
    target: Object,
    to: Object,
    duration_ms: f64,
    easing: &str,
    delay_ms: f64,
    on_complete: Option<Function>,
) -> Result<u32, JsValue> {
    let options = TweenOptions::new()
        .with_duration(duration_ms)
        .with_delay(delay_ms)
        .with_easing_named(easing)
        .map_err(to_js)?;
    with_runner(|r| r.tween(target, &to, options, on_complete))?
        .map(|id| id.0)
        .map_err(to_js)
}

#[wasm_bindgen]
pub fn spark_cancel_tween(id: u32) -> Result<bool, JsValue> {
    with_runner(|r| r.cancel_tween(TweenId(id)))
}
