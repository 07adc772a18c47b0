use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use js_sys::{Function, Object};
use spark_engine::{
    EmitterId, EmitterOptions, ForceField, ForceId, InputEvent, SimulationConfig, SparkError, Stage,
    TargetRef, TweenId, TweenOptions,
};
use wasm_bindgen::JsValue;

use crate::frame_loop::FrameLoop;
use crate::surface::CanvasSurface;
use crate::target::{properties_of, JsTarget};

type PendingCallbacks = Rc<RefCell<Vec<(Function, Object)>>>;

/// Wires a [`Stage`] to the browser: canvas, animation-frame loop, pointer
/// events and JS-owned tween targets.
///
/// The tween engine only holds targets weakly, so the runner keeps each JS
/// target alive until its tween leaves the active set. JS completion
/// callbacks are deferred until the stage is no longer borrowed, which lets
/// them start new tweens.
pub struct StageRunner {
    stage: Rc<RefCell<Stage>>,
    targets: Rc<RefCell<Vec<(TweenId, TargetRef)>>>,
    completions: PendingCallbacks,
    frame_loop: FrameLoop,
}

impl StageRunner {
    pub fn new(config: SimulationConfig, surface: Option<CanvasSurface>) -> Self {
        let mut stage = Stage::new(config);
        if let Some(surface) = surface {
            stage.particles.attach_surface(Box::new(surface));
        }
        let stage = Rc::new(RefCell::new(stage));
        let targets: Rc<RefCell<Vec<(TweenId, TargetRef)>>> = Rc::new(RefCell::new(Vec::new()));
        let completions: PendingCallbacks = Rc::new(RefCell::new(Vec::new()));

        let frame_loop = {
            let stage = stage.clone();
            let targets = targets.clone();
            let completions = completions.clone();
            FrameLoop::new(move |now| {
                {
                    let mut stage = stage.borrow_mut();
                    if let Err(err) = stage.frame(now) {
                        log::error!("frame failed: {}", err);
                    }
                    targets.borrow_mut().retain(|(id, _)| stage.tweens.is_active(*id));
                }
                let due: Vec<_> = completions.borrow_mut().drain(..).collect();
                for (callback, object) in due {
                    if let Err(err) = callback.call1(&JsValue::NULL, &object) {
                        log::error!("tween completion callback threw: {:?}", err);
                    }
                }
            })
        };

        Self {
            stage,
            targets,
            completions,
            frame_loop,
        }
    }

    pub fn start(&mut self) -> Result<(), JsValue> {
        self.stage.borrow_mut().start();
        self.frame_loop.start()
    }

    pub fn stop(&mut self) {
        self.frame_loop.stop();
        self.stage.borrow_mut().stop();
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.stage.borrow_mut().input.push(event);
    }

    // -- Particles --

    pub fn burst(&mut self, position: Vec2, count: usize) {
        self.stage.borrow_mut().particles.burst(position, count);
    }

    pub fn create_emitter(&mut self, position: Vec2, options: EmitterOptions) -> EmitterId {
        self.stage.borrow_mut().particles.create_emitter(position, options)
    }

    pub fn stop_emitter(&mut self, id: EmitterId) -> bool {
        self.stage.borrow_mut().particles.stop_emitter(id)
    }

    pub fn add_force(&mut self, force: ForceField) -> ForceId {
        self.stage.borrow_mut().particles.add_force(force)
    }

    pub fn remove_force(&mut self, id: ForceId) -> bool {
        self.stage.borrow_mut().particles.remove_force(id)
    }

    pub fn particle_count(&self) -> usize {
        self.stage.borrow().particles.stats().particles
    }

    // -- Tweens --

    /// Animate the own properties of `to` on `object`. `on_complete` is called
    /// with `object` after the frame that finishes the tween.
    pub fn tween(
        &mut self,
        object: Object,
        to: &Object,
        options: TweenOptions,
        on_complete: Option<Function>,
    ) -> Result<TweenId, SparkError> {
        let properties = properties_of(to)?;
        let pairs: Vec<(&str, _)> = properties.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();

        let options = match on_complete {
            Some(callback) => {
                let pending = self.completions.clone();
                let object = object.clone();
                options.on_complete(move |_, _| {
                    pending.borrow_mut().push((callback.clone(), object.clone()));
                })
            }
            None => options,
        };

        let target: TargetRef = Rc::new(RefCell::new(JsTarget::new(object)));
        let id = self.stage.borrow_mut().tweens.create(&target, &pairs, options)?;
        self.targets.borrow_mut().push((id, target));
        Ok(id)
    }

    pub fn cancel_tween(&mut self, id: TweenId) -> bool {
        self.targets.borrow_mut().retain(|(tid, _)| *tid != id);
        self.stage.borrow_mut().tweens.cancel(id)
    }
}
