use std::fmt;

use super::range::{Domain, transform_range};
use super::types::{ConfigError, Scale};

/// Number of discrete steps a control gets by default.
pub const DEFAULT_RESOLUTION: u32 = 1000;

/// Names a registered listener. Registering again under the same key
/// replaces the previous callback, so registration is idempotent.
pub type ListenerKey = &'static str;

/// A real value held against `[min, max]` bounds with a linear or
/// logarithmic scale and a discretized representation for finite-resolution
/// controls.
///
/// The stored value may lie outside the bounds; only the discrete
/// representation clamps. Listeners fire synchronously on every write and
/// receive the stored, unclamped value. Notification order across listeners
/// is unspecified.
pub struct BoundedValue {
    current: f64,
    min: f64,
    max: f64,
    scale: Scale,
    resolution: u32,
    listeners: Vec<(ListenerKey, Box<dyn FnMut(f64)>)>,
}

impl fmt::Debug for BoundedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedValue")
            .field("current", &self.current)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("scale", &self.scale)
            .field("resolution", &self.resolution)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn validate_bounds(min: f64, max: f64, scale: Scale) -> Result<(), ConfigError> {
    if min >= max {
        return Err(ConfigError::InvertedBounds { min, max });
    }
    if scale == Scale::Logarithmic && min <= 0.0 {
        return Err(ConfigError::NonPositiveLogBounds { min, max });
    }
    Ok(())
}

impl BoundedValue {
    pub fn new(min: f64, max: f64, current: f64, scale: Scale) -> Result<Self, ConfigError> {
        validate_bounds(min, max, scale)?;
        Ok(Self {
            current,
            min,
            max,
            scale,
            resolution: DEFAULT_RESOLUTION,
            listeners: Vec::new(),
        })
    }

    /// Overrides the discrete step count. Must be at least 2 so the
    /// discrete domain `[0, resolution - 1]` has nonzero width.
    pub fn with_resolution(mut self, resolution: u32) -> Self {
        debug_assert!(resolution >= 2);
        self.resolution = resolution;
        self
    }

    /// Resets bounds, scale, and value in one step. On rejection the
    /// container keeps its previous valid state and nothing fires.
    pub fn set_all(
        &mut self,
        min: f64,
        max: f64,
        current: f64,
        scale: Scale,
    ) -> Result<(), ConfigError> {
        validate_bounds(min, max, scale)?;
        self.min = min;
        self.max = max;
        self.scale = scale;
        self.set_real(current);
        Ok(())
    }

    /// Stores `v` verbatim, even outside the bounds, and notifies listeners
    /// with it. The discrete representation clamps independently.
    pub fn set_real(&mut self, v: f64) {
        self.current = v;
        self.notify();
    }

    /// Maps discrete index `i` (in `[0, resolution - 1]`) back to a real
    /// value, stores it, and notifies.
    pub fn set_from_discrete(&mut self, i: u32) {
        let source = Domain::linear(0.0, (self.resolution - 1) as f64);
        let target = Domain {
            scale: self.scale,
            min: self.min,
            max: self.max,
        };
        let v = transform_range(source, f64::from(i), target);
        self.set_real(v);
    }

    pub fn real(&self) -> f64 {
        self.current
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Discrete rendering of the current value: clamped to the bounds, then
    /// mapped onto `[0, resolution - 1]`. Never out of range even when the
    /// stored value is.
    pub fn discrete(&self) -> u32 {
        let source = Domain {
            scale: self.scale,
            min: self.min,
            max: self.max,
        };
        let target = Domain::linear(0.0, (self.resolution - 1) as f64);
        let clamped = self.current.clamp(self.min, self.max);
        transform_range(source, clamped, target).round() as u32
    }

    /// Registers (or replaces) the listener stored under `key`.
    pub fn set_listener(&mut self, key: ListenerKey, listener: impl FnMut(f64) + 'static) {
        if let Some(slot) = self.listeners.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = Box::new(listener);
        } else {
            self.listeners.push((key, Box::new(listener)));
        }
    }

    /// Removes the listener under `key`; returns whether one was present.
    pub fn remove_listener(&mut self, key: ListenerKey) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(k, _)| *k != key);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        let value = self.current;
        for (_, listener) in &mut self.listeners {
            listener(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn linear_value() -> BoundedValue {
        BoundedValue::new(0.0, 100.0, 50.0, Scale::Linear).expect("valid bounds")
    }

    #[test]
    fn new_rejects_inverted_bounds() {
        let err = BoundedValue::new(10.0, 10.0, 5.0, Scale::Linear).expect_err("must reject");
        assert_eq!(
            err,
            ConfigError::InvertedBounds {
                min: 10.0,
                max: 10.0
            }
        );
    }

    #[test]
    fn new_rejects_non_positive_log_bounds() {
        let err =
            BoundedValue::new(0.0, 100.0, 1.0, Scale::Logarithmic).expect_err("must reject");
        assert_eq!(
            err,
            ConfigError::NonPositiveLogBounds {
                min: 0.0,
                max: 100.0
            }
        );
    }

    #[test]
    fn out_of_range_value_is_retained_but_renders_clamped() {
        let mut value = linear_value();
        value.set_real(250.0);
        assert_approx(value.real(), 250.0);
        assert_eq!(value.discrete(), DEFAULT_RESOLUTION - 1);

        value.set_real(-40.0);
        assert_approx(value.real(), -40.0);
        assert_eq!(value.discrete(), 0);
    }

    #[test]
    fn discrete_round_trip_on_linear_scale() {
        let mut value = linear_value();
        value.set_from_discrete(0);
        assert_approx(value.real(), 0.0);
        value.set_from_discrete(DEFAULT_RESOLUTION - 1);
        assert_approx(value.real(), 100.0);
        value.set_from_discrete(333);
        assert_approx(value.real(), 100.0 * 333.0 / 999.0);
        assert_eq!(value.discrete(), 333);
    }

    #[test]
    fn log_scale_discretizes_geometrically() {
        let mut value =
            BoundedValue::new(1.0, 1_000.0, 1.0, Scale::Logarithmic).expect("valid bounds");
        value.set_real(1_000.0f64.sqrt());
        // Geometric midpoint of [1, 1000] sits halfway along the control.
        let mid = value.discrete();
        assert!((499..=500).contains(&mid), "got index {mid}");

        value.set_from_discrete(mid);
        let back = value.real();
        // One discrete step near the midpoint is worth about 0.11 here.
        assert!((back - 1_000.0f64.sqrt()).abs() <= 0.15, "got {back}");
    }

    #[test]
    fn rejected_set_all_keeps_previous_state_and_stays_silent() {
        let mut value = linear_value();
        let fired = Rc::new(RefCell::new(0u32));
        let fired_in_listener = Rc::clone(&fired);
        value.set_listener("count", move |_| *fired_in_listener.borrow_mut() += 1);

        let err = value.set_all(5.0, 1.0, 3.0, Scale::Linear).expect_err("must reject");
        assert_eq!(err, ConfigError::InvertedBounds { min: 5.0, max: 1.0 });
        assert_approx(value.real(), 50.0);
        assert_approx(value.min(), 0.0);
        assert_approx(value.max(), 100.0);
        assert_eq!(*fired.borrow(), 0);
    }

    #[test]
    fn accepted_set_all_rescales_and_notifies() {
        let mut value = linear_value();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_in_listener = Rc::clone(&seen);
        value.set_listener("record", move |v| seen_in_listener.borrow_mut().push(v));

        value
            .set_all(1.0, 10.0, 5.0, Scale::Logarithmic)
            .expect("valid bounds");
        assert_eq!(value.scale(), Scale::Logarithmic);
        assert_eq!(*seen.borrow(), vec![5.0]);
    }

    #[test]
    fn listeners_receive_the_unclamped_value() {
        let mut value = linear_value();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_in_listener = Rc::clone(&seen);
        value.set_listener("record", move |v| seen_in_listener.borrow_mut().push(v));

        value.set_real(250.0);
        assert_eq!(*seen.borrow(), vec![250.0]);
    }

    #[test]
    fn re_registering_a_listener_key_replaces_it() {
        let mut value = linear_value();
        let first = Rc::new(RefCell::new(0u32));
        let second = Rc::new(RefCell::new(0u32));
        let first_in_listener = Rc::clone(&first);
        let second_in_listener = Rc::clone(&second);
        value.set_listener("display", move |_| *first_in_listener.borrow_mut() += 1);
        value.set_listener("display", move |_| *second_in_listener.borrow_mut() += 1);

        value.set_real(1.0);
        assert_eq!(*first.borrow(), 0);
        assert_eq!(*second.borrow(), 1);
    }

    #[test]
    fn removed_listeners_stop_firing() {
        let mut value = linear_value();
        let fired = Rc::new(RefCell::new(0u32));
        let fired_in_listener = Rc::clone(&fired);
        value.set_listener("count", move |_| *fired_in_listener.borrow_mut() += 1);

        assert!(value.remove_listener("count"));
        assert!(!value.remove_listener("count"));
        value.set_real(1.0);
        assert_eq!(*fired.borrow(), 0);
    }

    #[test]
    fn all_registered_listeners_fire_without_order_guarantee() {
        // Two keys both fire; the test asserts membership, not order.
        let mut value = linear_value();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for key in ["a", "b"] {
            let seen_in_listener = Rc::clone(&seen);
            value.set_listener(key, move |v| seen_in_listener.borrow_mut().push((key, v)));
        }

        value.set_real(7.0);
        let mut keys: Vec<_> = seen.borrow().iter().map(|(k, _)| *k).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
