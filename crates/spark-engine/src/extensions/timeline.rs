// extensions/timeline.rs
//
// Sequencing builder: queues tween requests with delays computed from a running
// cursor, then hands them all to a TweenEngine on play().

use crate::error::Result;
use super::interpolate::Value;
use super::tween::{TargetRef, TweenEngine, TweenId, TweenOptions};

struct TimelineEntry {
    target: TargetRef,
    properties: Vec<(String, Value)>,
    /// Options with `delay` already made absolute.
    options: TweenOptions,
}

/// An ordered list of tween requests played back-to-back.
///
/// Holds no runtime state: `play` can be called any number of times and
/// re-issues the same animations each time.
#[derive(Default)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
    /// End of the last appended entry, in milliseconds.
    cursor: f64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a tween starting where the previous one ends, plus `options.delay`.
    pub fn append(&mut self, target: &TargetRef, properties: &[(&str, Value)], options: TweenOptions) -> &mut Self {
        let start = self.cursor + options.delay;
        let duration = options.duration_ms();
        self.entries.push(TimelineEntry {
            target: target.clone(),
            properties: properties
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
            options: TweenOptions {
                delay: start,
                ..options
            },
        });
        self.cursor += duration;
        self
    }

    /// Leave a gap of `ms` before the next appended entry.
    pub fn wait(&mut self, ms: f64) -> &mut Self {
        self.cursor += ms.max(0.0);
        self
    }

    /// Start every queued entry on `engine`, in order. Returns the created ids.
    ///
    /// Stops at the first rejected entry; entries before it stay running.
    pub fn play(&self, engine: &mut TweenEngine) -> Result<Vec<TweenId>> {
        self.entries
            .iter()
            .map(|entry| {
                let properties: Vec<(&str, Value)> = entry
                    .properties
                    .iter()
                    .map(|(name, value)| (name.as_str(), value.clone()))
                    .collect();
                engine.create(&entry.target, &properties, entry.options.clone())
            })
            .collect()
    }

    /// Absolute start delay of each entry, in order.
    pub fn delays(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.options.delay).collect()
    }

    /// Current cursor position: where the next entry would start.
    pub fn duration(&self) -> f64 {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::easing::Easing;
    use crate::extensions::tween::tests::Props;

    #[test]
    fn sequential_delays_accumulate() {
        let props = Props::with(&[("x", 0.0.into())]);
        let target: TargetRef = props.clone();
        let mut timeline = Timeline::new();
        timeline
            .append(&target, &[("x", 1.0.into())], TweenOptions::new().with_duration(200.0))
            .append(&target, &[("x", 2.0.into())], TweenOptions::new().with_duration(300.0))
            .append(&target, &[("x", 3.0.into())], TweenOptions::new().with_duration(100.0));
        assert_eq!(timeline.delays(), vec![0.0, 200.0, 500.0]);
        assert_eq!(timeline.duration(), 600.0);
    }

    #[test]
    fn wait_and_extra_delay_shift_later_entries() {
        let props = Props::with(&[("x", 0.0.into())]);
        let target: TargetRef = props.clone();
        let mut timeline = Timeline::new();
        timeline
            .append(&target, &[("x", 1.0.into())], TweenOptions::new().with_duration(100.0))
            .wait(50.0)
            .append(&target, &[("x", 2.0.into())], TweenOptions::new().with_duration(100.0).with_delay(25.0))
            .append(&target, &[("x", 3.0.into())], TweenOptions::new());
        assert_eq!(timeline.delays(), vec![0.0, 175.0, 250.0]);
        assert_eq!(timeline.duration(), 250.0 + crate::extensions::tween::DEFAULT_DURATION_MS);
    }

    #[test]
    fn play_runs_entries_in_order() {
        let props = Props::with(&[("x", 0.0.into()), ("y", 0.0.into())]);
        let target: TargetRef = props.clone();
        let linear = || TweenOptions::new().with_duration(100.0).with_easing(Easing::Linear);
        let mut timeline = Timeline::new();
        timeline
            .append(&target, &[("x", 10.0.into())], linear())
            .append(&target, &[("y", 20.0.into())], linear());

        let mut engine = TweenEngine::new();
        engine.tick(0.0);
        let ids = timeline.play(&mut engine).unwrap();
        assert_eq!(ids.len(), 2);

        engine.tick(50.0);
        assert_eq!(props.borrow().number("x"), 5.0);
        assert_eq!(props.borrow().number("y"), 0.0);

        engine.tick(150.0);
        assert_eq!(props.borrow().number("x"), 10.0);
        assert_eq!(props.borrow().number("y"), 10.0);
        assert_eq!(engine.len(), 1);

        engine.tick(200.0);
        assert_eq!(props.borrow().number("y"), 20.0);
        assert!(engine.is_empty());
    }

    #[test]
    fn playing_twice_reissues_animations() {
        let props = Props::with(&[("x", 0.0.into())]);
        let target: TargetRef = props.clone();
        let mut timeline = Timeline::new();
        timeline.append(&target, &[("x", 1.0.into())], TweenOptions::new().with_duration(100.0));

        let mut engine = TweenEngine::new();
        let first = timeline.play(&mut engine).unwrap();
        let second = timeline.play(&mut engine).unwrap();
        assert_ne!(first, second);
        assert_eq!(engine.len(), 2);
    }
}
