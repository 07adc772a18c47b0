// extensions/tween.rs
//
// Tween engine: animates named properties on caller-owned targets.
// Targets are held weakly; the engine only reads and writes properties by name.
//
// Usage:
//   let mut tweens = TweenEngine::new();
//   let id = tweens.create(&target, &[("x", 100.0.into())], TweenOptions::new().with_duration(500.0))?;
//   tweens.tick(now_ms);  // Advances all tweens, writes properties on their targets

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::{Result, SparkError};
use super::easing::Easing;
use super::interpolate::{interpolate, Value};

/// Duration used when a request does not specify one, in milliseconds.
pub const DEFAULT_DURATION_MS: f64 = 1000.0;

/// Read/write access to named properties on a caller-owned object.
pub trait Animatable {
    /// Current value of a property, or `None` if the object has no such property.
    fn get_property(&self, name: &str) -> Option<Value>;

    /// Store a computed value. Unknown names may be ignored.
    fn set_property(&mut self, name: &str, value: Value);
}

/// Shared handle to an animation target. The caller keeps ownership.
pub type TargetRef = Rc<RefCell<dyn Animatable>>;

/// Per-frame progress callback: `(eased_progress, target)`.
pub type UpdateCallback = Rc<dyn Fn(f32, &mut dyn Animatable)>;

/// Completion callback. Runs after the animation left the active set, with no
/// borrow held on the target, so it may start new animations.
pub type CompleteCallback = Rc<dyn Fn(&mut TweenEngine, &TargetRef)>;

/// Handle to a tween for later control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(pub u32);

/// Timing, easing and callbacks for one animation request.
#[derive(Clone, Default)]
pub struct TweenOptions {
    /// Duration in milliseconds; [`DEFAULT_DURATION_MS`] when unset.
    pub duration: Option<f64>,
    /// Delay before the animation starts moving, in milliseconds.
    pub delay: f64,
    pub easing: Easing,
    pub on_update: Option<UpdateCallback>,
    pub on_complete: Option<CompleteCallback>,
}

impl TweenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Builder methods --

    pub fn with_duration(mut self, ms: f64) -> Self {
        self.duration = Some(ms);
        self
    }

    pub fn with_delay(mut self, ms: f64) -> Self {
        self.delay = ms;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Select the easing by name. Unknown names fail here, not on the first tick.
    pub fn with_easing_named(mut self, name: &str) -> Result<Self> {
        self.easing = name.parse()?;
        Ok(self)
    }

    pub fn on_update(mut self, f: impl Fn(f32, &mut dyn Animatable) + 'static) -> Self {
        self.on_update = Some(Rc::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl Fn(&mut TweenEngine, &TargetRef) + 'static) -> Self {
        self.on_complete = Some(Rc::new(f));
        self
    }

    /// Effective duration in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.duration.unwrap_or(DEFAULT_DURATION_MS)
    }
}

impl fmt::Debug for TweenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenOptions")
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .field("easing", &self.easing)
            .field("on_update", &self.on_update.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// One animated property, resolved when the tween is created.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyTrack {
    pub name: String,
    pub from: Value,
    pub to: Value,
    /// Unit suffix re-appended on write (`"px"`, `"deg"`, ...).
    pub unit: Option<String>,
}

impl PropertyTrack {
    /// Snapshot `name` on the target and pair it with the requested end value.
    fn resolve(target: &dyn Animatable, name: &str, to: &Value) -> Result<Self> {
        let current = target
            .get_property(name)
            .ok_or_else(|| SparkError::invalid(format!("target has no property `{}`", name)))?;
        let (to, to_unit) = to.clone().split_unit();
        let (from, from_unit) = current.split_unit();
        Ok(Self {
            name: name.to_string(),
            from,
            to,
            unit: to_unit.or(from_unit),
        })
    }

    /// Value to write at eased progress `t`.
    pub fn sample(&self, t: f32) -> Value {
        interpolate(&self.from, &self.to, t).with_unit(self.unit.as_deref())
    }
}

/// Lifecycle phase of an active animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenPhase {
    /// Waiting out its delay; nothing written yet.
    Scheduled,
    Running,
}

/// Notifications drained by the caller after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenEvent {
    Completed(TweenId),
}

/// A single active animation.
struct Tween {
    target: Weak<RefCell<dyn Animatable>>,
    tracks: Vec<PropertyTrack>,
    duration: f64,
    delay: f64,
    easing: Easing,
    /// Un-paused time accumulated since creation, in milliseconds.
    clock: f64,
    /// Engine time this tween was last advanced to. `None` when it was
    /// created before the engine knew the time; the first tick anchors it.
    seen: Option<f64>,
    paused: bool,
    on_update: Option<UpdateCallback>,
    on_complete: Option<CompleteCallback>,
}

impl Tween {
    fn phase(&self) -> TweenPhase {
        if self.clock < self.delay {
            TweenPhase::Scheduled
        } else {
            TweenPhase::Running
        }
    }

    fn progress(&self) -> f64 {
        ((self.clock - self.delay) / self.duration).clamp(0.0, 1.0)
    }

    /// Move the tween's notion of time to `now`, returning the elapsed ms.
    /// Time never runs backwards.
    fn observe(&mut self, now: f64) -> f64 {
        let dt = match self.seen {
            Some(seen) => (now - seen).max(0.0),
            None => 0.0,
        };
        self.seen = Some(self.seen.map_or(now, |seen| seen.max(now)));
        dt
    }

    fn targets(&self, target: &TargetRef) -> bool {
        self.target
            .upgrade()
            .is_some_and(|t| Rc::ptr_eq(&t, target))
    }
}

/// What happened to one tween during a tick.
enum Step {
    Idle,
    Advanced,
    Finished,
    Orphaned,
}

/// Manages all active tweens.
///
/// Each tween starts at the engine time it was created at: the explicit time
/// given to [`TweenEngine::create_at`], otherwise the latest time passed to
/// [`TweenEngine::tick`] or [`TweenEngine::set_time`]. Progress is driven by
/// accumulated un-paused time from there, so pausing never makes a resumed
/// tween jump.
#[derive(Default)]
pub struct TweenEngine {
    /// Sorted by id; insertion order is processing order.
    tweens: Vec<(TweenId, Tween)>,
    next_id: u32,
    now: Option<f64>,
    events: Vec<TweenEvent>,
}

impl TweenEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an animation of `properties` on `target`, starting at the
    /// engine's current time. Returns its handle.
    ///
    /// On an engine that has not seen a time yet, the tween starts at the
    /// first tick. Start values are snapshotted from the target now. Nothing
    /// is registered when the request is rejected.
    pub fn create(
        &mut self,
        target: &TargetRef,
        properties: &[(&str, Value)],
        options: TweenOptions,
    ) -> Result<TweenId> {
        let start = self.now;
        self.insert(target, properties, options, start)
    }

    /// Like [`TweenEngine::create`], but the tween starts at `now` (ms).
    pub fn create_at(
        &mut self,
        target: &TargetRef,
        properties: &[(&str, Value)],
        options: TweenOptions,
        now: f64,
    ) -> Result<TweenId> {
        if !now.is_finite() {
            return Err(SparkError::invalid(format!("start time must be finite, got {}", now)));
        }
        self.insert(target, properties, options, Some(now))
    }

    fn insert(
        &mut self,
        target: &TargetRef,
        properties: &[(&str, Value)],
        options: TweenOptions,
        start: Option<f64>,
    ) -> Result<TweenId> {
        if properties.is_empty() {
            return Err(SparkError::invalid("no properties to animate"));
        }
        let duration = options.duration_ms();
        if !duration.is_finite() || duration <= 0.0 {
            return Err(SparkError::invalid(format!("duration must be positive, got {}", duration)));
        }
        if !options.delay.is_finite() || options.delay < 0.0 {
            return Err(SparkError::invalid(format!("delay must be non-negative, got {}", options.delay)));
        }

        let tracks = {
            let current = target
                .try_borrow()
                .map_err(|_| SparkError::invalid("target is mutably borrowed"))?;
            properties
                .iter()
                .map(|(name, to)| PropertyTrack::resolve(&*current, name, to))
                .collect::<Result<Vec<_>>>()?
        };

        let id = TweenId(self.next_id);
        self.next_id += 1;
        log::debug!(
            "tween {:?}: {} track(s), {}ms after {}ms, {}",
            id, tracks.len(), duration, options.delay, options.easing
        );
        self.tweens.push((
            id,
            Tween {
                target: Rc::downgrade(target),
                tracks,
                duration,
                delay: options.delay,
                easing: options.easing,
                clock: 0.0,
                seen: start,
                paused: false,
                on_update: options.on_update,
                on_complete: options.on_complete,
            },
        ));
        Ok(id)
    }

    /// Cancel a tween. Its completion callback never fires. Unknown ids are ignored.
    pub fn cancel(&mut self, id: TweenId) -> bool {
        match self.index_of(id) {
            Some(idx) => {
                self.tweens.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Tell the engine the current time (ms) without advancing anything.
    /// Tweens created afterwards with [`TweenEngine::create`] start here.
    pub fn set_time(&mut self, now: f64) {
        if now.is_finite() {
            self.now = Some(self.now.map_or(now, |t| t.max(now)));
        }
    }

    /// Latest time the engine has seen, if any.
    pub fn time(&self) -> Option<f64> {
        self.now
    }

    /// Cancel every tween animating `target`.
    pub fn cancel_target(&mut self, target: &TargetRef) {
        self.tweens.retain(|(_, tween)| !tween.targets(target));
    }

    /// Pause a tween.
    pub fn pause(&mut self, id: TweenId) {
        if let Some(tween) = self.get_mut(id) {
            tween.paused = true;
        }
    }

    /// Resume a paused tween.
    pub fn resume(&mut self, id: TweenId) {
        if let Some(tween) = self.get_mut(id) {
            tween.paused = false;
        }
    }

    /// Pause all tweens.
    pub fn pause_all(&mut self) {
        for (_, tween) in &mut self.tweens {
            tween.paused = true;
        }
    }

    /// Resume all tweens.
    pub fn resume_all(&mut self) {
        for (_, tween) in &mut self.tweens {
            tween.paused = false;
        }
    }

    pub fn is_active(&self, id: TweenId) -> bool {
        self.get(id).is_some()
    }

    pub fn is_paused(&self, id: TweenId) -> bool {
        self.get(id).is_some_and(|t| t.paused)
    }

    /// Linear (un-eased) progress in [0, 1], or `None` for unknown ids.
    pub fn progress(&self, id: TweenId) -> Option<f64> {
        self.get(id).map(Tween::progress)
    }

    pub fn phase(&self, id: TweenId) -> Option<TweenPhase> {
        self.get(id).map(Tween::phase)
    }

    /// Ids of all active tweens in processing order.
    pub fn ids(&self) -> impl Iterator<Item = TweenId> + '_ {
        self.tweens.iter().map(|(id, _)| *id)
    }

    /// Advance every active tween to frame time `now` (milliseconds) and write
    /// the results to their targets. Returns the number of tweens that completed.
    pub fn tick(&mut self, now: f64) -> usize {
        if !now.is_finite() {
            log::warn!("ignoring tween tick with non-finite time {}", now);
            return 0;
        }
        self.set_time(now);

        // One pass; survivors are compacted into a fresh list in order.
        let active = std::mem::take(&mut self.tweens);
        let mut survivors = Vec::with_capacity(active.len());
        let mut finished = Vec::new();
        for (id, mut tween) in active {
            match advance(id, &mut tween, now) {
                Step::Idle | Step::Advanced => survivors.push((id, tween)),
                Step::Finished => {
                    log::debug!("tween {:?}: complete", id);
                    self.events.push(TweenEvent::Completed(id));
                    finished.push(tween);
                }
                Step::Orphaned => log::warn!("tween {:?}: target dropped, discarding", id),
            }
        }
        self.tweens = survivors;

        let count = finished.len();
        for tween in finished {
            if let (Some(callback), Some(target)) = (tween.on_complete, tween.target.upgrade()) {
                callback(self, &target);
            }
        }
        count
    }

    /// Drain notifications recorded since the last drain.
    pub fn drain_events(&mut self) -> impl Iterator<Item = TweenEvent> + '_ {
        self.events.drain(..)
    }

    /// Number of active tweens.
    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    /// Whether there are no active tweens.
    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Drop all tweens without firing callbacks.
    pub fn clear(&mut self) {
        self.tweens.clear();
        self.events.clear();
    }

    fn index_of(&self, id: TweenId) -> Option<usize> {
        self.tweens.binary_search_by_key(&id, |(tid, _)| *tid).ok()
    }

    fn get(&self, id: TweenId) -> Option<&Tween> {
        self.index_of(id).map(|idx| &self.tweens[idx].1)
    }

    fn get_mut(&mut self, id: TweenId) -> Option<&mut Tween> {
        self.index_of(id).map(|idx| &mut self.tweens[idx].1)
    }
}

fn advance(id: TweenId, tween: &mut Tween, now: f64) -> Step {
    let Some(target) = tween.target.upgrade() else {
        return Step::Orphaned;
    };
    let dt = tween.observe(now);
    if tween.paused {
        return Step::Idle;
    }

    tween.clock += dt;
    if tween.phase() == TweenPhase::Scheduled {
        return Step::Idle;
    }

    let progress = tween.progress();
    let eased = tween.easing.apply(progress as f32);

    let Ok(mut target) = target.try_borrow_mut() else {
        // Time still advanced; the write lands on the next tick.
        log::warn!("tween {:?}: target busy, skipping write", id);
        return if progress >= 1.0 { Step::Idle } else { Step::Advanced };
    };
    for track in &tween.tracks {
        target.set_property(&track.name, track.sample(eased));
    }
    if let Some(on_update) = &tween.on_update {
        on_update(eased, &mut *target);
    }

    if progress >= 1.0 {
        Step::Finished
    } else {
        Step::Advanced
    }
}

impl fmt::Debug for TweenEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenEngine")
            .field("active", &self.tweens.len())
            .field("next_id", &self.next_id)
            .field("now", &self.now)
            .finish()
    }
}
