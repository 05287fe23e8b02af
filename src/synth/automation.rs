//! Parameter automation timeline
//!
//! Scheduled value changes for a single control (gain, typically), evaluated
//! against absolute audio-clock time. Events are kept sorted by time; a
//! linear ramp interpolates from the preceding event to its own target.

/// How an event reaches its value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    /// Jump to the value at the event time
    SetValue,
    /// Ramp linearly from the previous event, arriving at the event time
    LinearRamp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Event {
    kind: EventKind,
    time: f64,
    value: f64,
}

/// A time-ordered list of automation events for one parameter
#[derive(Debug, Clone)]
pub struct Automation {
    default_value: f64,
    events: Vec<Event>,
}

impl Automation {
    /// Create a timeline that reports `default_value` until the first event
    pub fn new(default_value: f64) -> Self {
        Self {
            default_value,
            events: Vec::new(),
        }
    }

    /// Jump to `value` at `time`
    pub fn set_value_at_time(&mut self, value: f64, time: f64) -> &mut Self {
        self.insert(EventKind::SetValue, value, time)
    }

    /// Ramp linearly to `value`, arriving at `time`
    pub fn linear_ramp_to_value_at_time(&mut self, value: f64, time: f64) -> &mut Self {
        self.insert(EventKind::LinearRamp, value, time)
    }

    fn insert(&mut self, kind: EventKind, value: f64, time: f64) -> &mut Self {
        // Equal times keep insertion order.
        let at = self.events.partition_point(|e| e.time <= time);
        self.events.insert(at, Event { kind, time, value });
        self
    }

    /// Evaluate the parameter at `time`
    pub fn value_at(&self, time: f64) -> f64 {
        let passed = self.events.partition_point(|e| e.time <= time);

        let (from_time, from_value) = match passed.checked_sub(1) {
            Some(i) => (self.events[i].time, self.events[i].value),
            None => (0.0, self.default_value),
        };

        match self.events.get(passed) {
            Some(next) if next.kind == EventKind::LinearRamp => {
                let span = next.time - from_time;
                if span <= 0.0 {
                    return next.value;
                }
                let t = ((time - from_time) / span).clamp(0.0, 1.0);
                from_value + (next.value - from_value) * t
            }
            _ => from_value,
        }
    }
}
