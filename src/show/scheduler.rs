use super::ShowEvent;
use crate::canvas::Surface;
use crate::firework::{Firework, prepare_firework};
use fastrand::Rng;
use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Included, Unbounded};
use tracing::{debug, info, trace};

/// Master clock of a show: launches event groups at their begin time,
/// drives the active fireworks every frame and starts over once the
/// whole show has burnt out.
pub struct Scheduler {
    groups: BTreeMap<u64, Vec<ShowEvent>>,
    canvas_size: (f32, f32),
    active: Vec<Box<dyn Firework>>,
    start_timestamp: Option<f64>,
    execution_time: f64,
    last_time: f64,
    last_activated: Option<u64>,
    used: usize,
}

impl Scheduler {
    pub fn new(events: Vec<ShowEvent>, canvas_size: (f32, f32)) -> Self {
        let mut groups: BTreeMap<u64, Vec<ShowEvent>> = BTreeMap::new();
        for event in events {
            groups.entry(event.begin).or_default().push(event);
        }

        Self {
            groups,
            canvas_size,
            active: Vec::new(),
            start_timestamp: None,
            execution_time: 0.0,
            last_time: 0.0,
            last_activated: None,
            used: 0,
        }
    }

    /// Run one frame. `timestamp` is a monotonic clock in milliseconds.
    pub fn tick<S: Surface>(&mut self, timestamp: f64, surface: &mut S, rng: &mut Rng) {
        surface.clear();

        let start = *self.start_timestamp.get_or_insert(timestamp);
        self.execution_time = timestamp - start;
        let dt = (self.execution_time - self.last_time).max(0.0) as f32;

        if let Some(begin) = self.next_due() {
            let events = &self.groups[&begin];
            debug!(begin, count = events.len(), "launching fireworks");
            for event in events {
                trace!(kind = %event.kind, color = %event.color, duration = event.duration, "launch");
                self.active.push(prepare_firework(event, self.canvas_size));
            }
            self.last_activated = Some(begin);
        }

        if !self.active.is_empty() {
            let mut spent = 0;
            self.active.retain_mut(|firework| {
                firework.render(dt, &mut *surface, rng);
                if firework.exists() {
                    return true;
                }
                trace!(kind = %firework.kind(), "firework spent");
                spent += 1;
                false
            });
            self.used += spent;
        } else if self.used > 0 && !self.has_pending() {
            info!(used = self.used, "show finished, restarting");
            self.reset();
        }

        self.last_time = self.execution_time;
    }

    /// Back to time zero: the next tick starts the show again.
    pub fn reset(&mut self) {
        self.active.clear();
        self.start_timestamp = None;
        self.execution_time = 0.0;
        self.last_time = 0.0;
        self.last_activated = None;
        self.used = 0;
    }

    /// Earliest group that is due and has not been launched yet.
    fn next_due(&self) -> Option<u64> {
        if self.execution_time < 0.0 {
            return None;
        }

        let now = self.execution_time.floor() as u64;
        if self.last_activated.is_some_and(|last| last >= now) {
            return None;
        }
        let lower = self.last_activated.map_or(Unbounded, Excluded);
        self.groups.range((lower, Included(now))).next().map(|(&begin, _)| begin)
    }

    fn has_pending(&self) -> bool {
        match (self.groups.keys().next_back(), self.last_activated) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(&last), Some(activated)) => activated < last,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn active(&self) -> impl Iterator<Item = &(dyn Firework + 'static)> {
        self.active.iter().map(|firework| &**firework)
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Fireworks that have burnt out since the show (re)started.
    pub fn used(&self) -> usize {
        self.used
    }

    pub fn execution_time(&self) -> f64 {
        self.execution_time
    }

    pub fn last_activated(&self) -> Option<u64> {
        self.last_activated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::tests::Recorder;
    use crate::color::Rgb;
    use crate::particle::Point;
    use crate::show::FireworkKind;

    const FRAME: f64 = 16.0;

    fn event(kind: FireworkKind, begin: u64, duration: u64) -> ShowEvent {
        ShowEvent {
            kind,
            begin,
            duration,
            color: Rgb(255, 255, 0),
            position: Point::new(0.0, -200.0),
            velocity: (kind == FireworkKind::Rocket).then_some(Point::new(0.0, 200.0)),
        }
    }

    fn scheduler(events: Vec<ShowEvent>) -> (Scheduler, Recorder, Rng) {
        (Scheduler::new(events, (800.0, 600.0)), Recorder::default(), Rng::with_seed(42))
    }

    #[test]
    fn same_begin_time_launches_together() {
        let (mut s, mut rec, mut rng) = scheduler(vec![
            event(FireworkKind::Fountain, 100, 1000),
            event(FireworkKind::Rocket, 300, 500),
            event(FireworkKind::Rocket, 100, 500),
        ]);

        s.tick(1000.0, &mut rec, &mut rng);
        assert_eq!(s.active_len(), 0);

        s.tick(1100.0, &mut rec, &mut rng);
        assert_eq!(s.active_len(), 2);
        assert_eq!(s.last_activated(), Some(100));
        let kinds: Vec<_> = s.active().map(|f| f.kind()).collect();
        assert_eq!(kinds, [FireworkKind::Fountain, FireworkKind::Rocket]);
    }

    #[test]
    fn begin_zero_launches_on_first_tick() {
        let (mut s, mut rec, mut rng) = scheduler(vec![event(FireworkKind::Fountain, 0, 1000)]);
        s.tick(5000.0, &mut rec, &mut rng);
        assert_eq!(s.active_len(), 1);
        assert_eq!(s.execution_time(), 0.0);
    }

    #[test]
    fn overdue_groups_launch_one_per_tick_in_order() {
        let (mut s, mut rec, mut rng) = scheduler(vec![
            event(FireworkKind::Fountain, 200, 1000),
            event(FireworkKind::Fountain, 100, 1000),
        ]);
        s.tick(0.0, &mut rec, &mut rng);
        s.tick(500.0, &mut rec, &mut rng);
        assert_eq!(s.last_activated(), Some(100));
        assert_eq!(s.active_len(), 1);
        s.tick(516.0, &mut rec, &mut rng);
        assert_eq!(s.last_activated(), Some(200));
        assert_eq!(s.active_len(), 2);
    }

    #[test]
    fn clears_surface_and_draws_every_tick() {
        let (mut s, mut rec, mut rng) = scheduler(vec![event(FireworkKind::Fountain, 0, 1000)]);
        for i in 0..5 {
            s.tick(i as f64 * FRAME, &mut rec, &mut rng);
            assert_eq!(rec.clears, i + 1);
            assert!(!rec.points.is_empty());
        }
    }

    #[test]
    fn exhausted_show_restarts_from_zero() {
        let (mut s, mut rec, mut rng) = scheduler(vec![event(FireworkKind::Rocket, 50, 0)]);

        let mut t = 10_000.0;
        s.tick(t, &mut rec, &mut rng);
        while s.used() == 0 {
            t += FRAME;
            s.tick(t, &mut rec, &mut rng);
            assert!(t < 20_000.0, "rocket never burnt out");
        }
        assert_eq!(s.active_len(), 0);

        // Nothing active: this tick resets the clock
        t += FRAME;
        s.tick(t, &mut rec, &mut rng);
        assert_eq!(s.used(), 0);
        assert_eq!(s.last_activated(), None);

        // And the show plays again from the start
        t += FRAME;
        s.tick(t, &mut rec, &mut rng);
        assert_eq!(s.execution_time(), 0.0);
        assert_eq!(s.active_len(), 0);
        t += 64.0;
        s.tick(t, &mut rec, &mut rng);
        assert_eq!(s.active_len(), 1);
        assert_eq!(s.last_activated(), Some(50));
    }

    #[test]
    fn gap_between_groups_does_not_restart() {
        let (mut s, mut rec, mut rng) = scheduler(vec![
            event(FireworkKind::Rocket, 0, 0),
            event(FireworkKind::Fountain, 5000, 100),
        ]);

        let mut t = 0.0;
        while t < 5000.0 {
            s.tick(t, &mut rec, &mut rng);
            t += FRAME;
        }
        assert_eq!(s.used(), 1);
        assert!(s.execution_time() > 4900.0);

        s.tick(t, &mut rec, &mut rng);
        assert_eq!(s.last_activated(), Some(5000));
        assert_eq!(s.active_len(), 1);
    }

    #[test]
    fn explicit_reset_drops_active_fireworks() {
        let (mut s, mut rec, mut rng) = scheduler(vec![event(FireworkKind::Fountain, 0, 1000)]);
        s.tick(0.0, &mut rec, &mut rng);
        s.tick(FRAME, &mut rec, &mut rng);
        s.reset();
        assert_eq!(s.active_len(), 0);
        assert_eq!(s.last_activated(), None);
        s.tick(1234.0, &mut rec, &mut rng);
        assert_eq!(s.active_len(), 1);
    }

    #[test]
    fn empty_show_draws_nothing() {
        let (mut s, mut rec, mut rng) = scheduler(Vec::new());
        assert!(s.is_empty());
        for i in 0..10 {
            s.tick(i as f64 * FRAME, &mut rec, &mut rng);
        }
        assert!(rec.points.is_empty());
        assert_eq!(s.used(), 0);
    }

    #[test]
    fn clock_going_backwards_launches_nothing() {
        let (mut s, mut rec, mut rng) = scheduler(vec![
            event(FireworkKind::Fountain, 100, 1000),
            event(FireworkKind::Fountain, 200, 1000),
        ]);
        s.tick(1000.0, &mut rec, &mut rng);
        s.tick(1150.0, &mut rec, &mut rng);
        assert_eq!(s.last_activated(), Some(100));
        s.tick(1050.0, &mut rec, &mut rng);
        s.tick(900.0, &mut rec, &mut rng);
        assert_eq!(s.last_activated(), Some(100));
        assert_eq!(s.active_len(), 1);
    }
}
