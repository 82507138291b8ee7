pub(crate) mod fixtures {
    use std::collections::HashSet;

    use crate::delivery::{KeyDelivery, KeyPayload};
    use crate::error::DeliveryError;
    use crate::focus::{ElementId, GeometrySource, KeyboardSurface, Marker};
    use crate::geometry::Rect;

    const STRIDE: u64 = 1_000;

    /// In-memory keyboard: 10x10 keys on a 10 unit grid, one row per slice.
    /// Every layout switch re-renders with fresh element ids.
    pub(crate) struct FakeSurface {
        layouts: Vec<(String, Vec<(Rect, String)>)>,
        current: usize,
        generation: u64,
        markers: HashSet<(ElementId, Marker)>,
        pub renders: usize,
    }

    impl FakeSurface {
        pub fn new() -> Self {
            Self {
                layouts: Vec::new(),
                current: 0,
                generation: 1,
                markers: HashSet::new(),
                renders: 1,
            }
        }

        pub fn with_layout(mut self, name: &str, rows: &[&[&str]]) -> Self {
            let mut keys = Vec::new();
            for (r, row) in rows.iter().enumerate() {
                for (c, key) in row.iter().enumerate() {
                    let rect = Rect::new(c as f32 * 10.0, r as f32 * 10.0, 10.0, 10.0);
                    keys.push((rect, key.to_string()));
                }
            }
            self.layouts.push((name.to_string(), keys));
            self
        }

        pub fn grid(rows: &[&[&str]]) -> Self {
            Self::new().with_layout("default", rows)
        }

        pub fn row(keys: &[&str]) -> Self {
            Self::grid(&[keys])
        }

        pub fn has_marker(&self, el: ElementId, marker: Marker) -> bool {
            self.markers.contains(&(el, marker))
        }

        pub fn marked(&self, marker: Marker) -> Vec<ElementId> {
            let mut v: Vec<_> = self
                .markers
                .iter()
                .filter(|(_, m)| *m == marker)
                .map(|(el, _)| *el)
                .collect();
            v.sort();
            v
        }

        pub fn id_of(&self, key: &str) -> Option<ElementId> {
            let idx = self.keys().iter().position(|(_, k)| k == key)?;
            Some(ElementId(self.generation * STRIDE + idx as u64))
        }

        fn keys(&self) -> &[(Rect, String)] {
            self.layouts
                .get(self.current)
                .map(|(_, keys)| keys.as_slice())
                .unwrap_or(&[])
        }

        fn index_of(&self, el: ElementId) -> Option<usize> {
            if el.0 / STRIDE != self.generation {
                return None;
            }
            let idx = (el.0 % STRIDE) as usize;
            (idx < self.keys().len()).then_some(idx)
        }
    }

    impl GeometrySource for FakeSurface {
        fn rect(&self, el: ElementId) -> Option<Rect> {
            self.index_of(el).map(|i| self.keys()[i].0)
        }
    }

    impl KeyboardSurface for FakeSurface {
        fn candidates(&self) -> Vec<ElementId> {
            (0..self.keys().len() as u64)
                .map(|i| ElementId(self.generation * STRIDE + i))
                .collect()
        }

        fn key_identifier(&self, el: ElementId) -> Option<String> {
            self.index_of(el).map(|i| self.keys()[i].1.clone())
        }

        fn set_marker(&mut self, el: ElementId, marker: Marker, on: bool) {
            if self.index_of(el).is_none() {
                return;
            }
            if on {
                self.markers.insert((el, marker));
            } else {
                self.markers.remove(&(el, marker));
            }
        }

        fn layout(&self) -> &str {
            self.layouts
                .get(self.current)
                .map_or("", |(name, _)| name.as_str())
        }

        fn set_layout(&mut self, name: &str) {
            if let Some(i) = self.layouts.iter().position(|(n, _)| n == name) {
                self.current = i;
                self.generation += 1;
                self.markers.clear();
                self.renders += 1;
            }
        }
    }

    #[derive(Default)]
    pub(crate) struct Recorder {
        pub sent: Vec<KeyPayload>,
        pub attempts: usize,
        pub fail: bool,
    }

    impl Recorder {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }
    }

    impl KeyDelivery for Recorder {
        fn deliver(&mut self, payload: KeyPayload) -> Result<(), DeliveryError> {
            self.attempts += 1;
            if self.fail {
                return Err(DeliveryError::Disconnected);
            }
            self.sent.push(payload);
            Ok(())
        }
    }
}

use web_time::{Duration, Instant};

use crate::config::NavConfig;
use crate::focus::{KeyboardSurface, Marker};
use crate::input::{Direction, LocalKey, LocalKeyEvent, Phase, RemoteEvent};
use crate::session::NavigationSession;
use crate::timer::TimerQueue;
use fixtures::{FakeSurface, Recorder};

struct Harness {
    t0: Instant,
    timers: TimerQueue,
    session: NavigationSession<FakeSurface, Recorder>,
}

impl Harness {
    fn new(surface: FakeSurface) -> Self {
        Self::with(surface, Recorder::default(), NavConfig::default())
    }

    fn with(surface: FakeSurface, delivery: Recorder, config: NavConfig) -> Self {
        let t0 = Instant::now();
        let mut session = NavigationSession::new(surface, delivery, config);
        session.ensure_focus();
        Self {
            t0,
            timers: TimerQueue::new(t0),
            session,
        }
    }

    fn advance_to(&mut self, ms: u64) {
        let until = self.t0 + Duration::from_millis(ms);
        while let Some(task) = self.timers.pop_due(until) {
            self.session.on_timer(task, &mut self.timers);
        }
        self.timers.settle(until);
    }

    fn remote(&mut self, ms: u64, event: RemoteEvent) {
        self.advance_to(ms);
        self.session.handle_remote(event, &mut self.timers);
    }

    fn local(&mut self, ms: u64, event: LocalKeyEvent) {
        self.advance_to(ms);
        self.session.handle_local(event, &mut self.timers);
    }

    fn step(&mut self, direction: Direction) -> Option<String> {
        self.session.move_focus(direction);
        self.focused()
    }

    fn focused(&self) -> Option<String> {
        self.session.active_key_identifier()
    }

    fn sent(&self) -> Vec<(Phase, String)> {
        self.session
            .delivery()
            .sent
            .iter()
            .map(|p| {
                let name = p.key.clone().or_else(|| p.text.clone()).unwrap_or_default();
                (p.phase, name)
            })
            .collect()
    }
}

fn move_down(dx: i32, dy: i32) -> RemoteEvent {
    RemoteEvent::moving(Phase::Down, dx, dy)
}

fn move_up() -> RemoteEvent {
    RemoteEvent::moving(Phase::Up, 0, 0)
}

const SELECT_DOWN: RemoteEvent = RemoteEvent::Select { phase: Phase::Down };
const SELECT_UP: RemoteEvent = RemoteEvent::Select { phase: Phase::Up };

fn grid3() -> FakeSurface {
    FakeSurface::grid(&[&["a", "b", "c"], &["d", "e", "f"], &["g", "h", "i"]])
}

fn shiftable() -> FakeSurface {
    FakeSurface::new()
        .with_layout("default", &[&["q", "w", "e"], &["{shift}", "a", "{bksp}"]])
        .with_layout("shift", &[&["Q", "W", "E"], &["{shift}", "A"]])
}

#[test]
fn first_candidate_is_focused_on_start() {
    let h = Harness::new(grid3());
    assert_eq!(h.focused().as_deref(), Some("a"));
    let a = h.session.surface().id_of("a").unwrap();
    assert_eq!(h.session.surface().marked(Marker::Active), vec![a]);
}

#[test]
fn walks_a_grid() {
    let mut h = Harness::new(grid3());
    assert_eq!(h.step(Direction::Right).as_deref(), Some("b"));
    assert_eq!(h.step(Direction::Down).as_deref(), Some("e"));
    assert_eq!(h.step(Direction::Left).as_deref(), Some("d"));
    // left edge wraps to the far end of the row
    assert_eq!(h.step(Direction::Left).as_deref(), Some("f"));
    assert_eq!(h.session.surface().marked(Marker::Active).len(), 1);
}

#[test]
fn up_from_top_row_wraps_to_bottom() {
    let mut h = Harness::new(grid3());
    assert_eq!(h.step(Direction::Up).as_deref(), Some("g"));
    assert_eq!(h.step(Direction::Right).as_deref(), Some("h"));
    assert_eq!(h.step(Direction::Down).as_deref(), Some("b"));
}

#[test]
fn held_remote_move_repeats_then_stops() {
    let mut h = Harness::new(FakeSurface::row(&["a", "b", "c", "d", "e"]));
    h.remote(0, move_down(1, 0));
    assert_eq!(h.focused().as_deref(), Some("b"));
    h.advance_to(399);
    assert_eq!(h.focused().as_deref(), Some("b"));
    h.advance_to(400);
    assert_eq!(h.focused().as_deref(), Some("c"));
    h.advance_to(600);
    assert_eq!(h.focused().as_deref(), Some("e"));
    h.advance_to(700);
    assert_eq!(h.focused().as_deref(), Some("a"));
    h.remote(750, move_up());
    h.advance_to(2_000);
    assert_eq!(h.focused().as_deref(), Some("a"));
    assert!(h.timers.is_empty());
}

#[test]
fn external_repeat_and_second_down_are_ignored() {
    let mut h = Harness::new(FakeSurface::row(&["a", "b", "c", "d"]));
    h.remote(0, move_down(1, 0));
    h.remote(100, RemoteEvent::moving(Phase::Repeat, 1, 0));
    h.remote(150, move_down(-1, 0));
    assert_eq!(h.focused().as_deref(), Some("b"));
    h.remote(200, move_up());
    assert!(h.timers.is_empty());
}

#[test]
fn move_down_without_direction_is_dropped() {
    let mut h = Harness::new(grid3());
    h.remote(0, move_down(0, 0));
    assert_eq!(h.focused().as_deref(), Some("a"));
    assert!(h.timers.is_empty());
}

#[test]
fn held_select_delivers_down_repeats_up() {
    let mut h = Harness::new(grid3());
    h.remote(0, SELECT_DOWN);
    let a = h.session.surface().id_of("a").unwrap();
    assert!(h.session.surface().has_marker(a, Marker::Pressed));

    h.remote(520, SELECT_UP);
    assert!(!h.session.surface().has_marker(a, Marker::Pressed));
    assert_eq!(
        h.sent(),
        vec![
            (Phase::Down, "a".into()),
            (Phase::Repeat, "a".into()),
            (Phase::Repeat, "a".into()),
            (Phase::Up, "a".into()),
        ]
    );
    h.advance_to(3_000);
    assert_eq!(h.sent().len(), 4);
}

#[test]
fn select_up_without_down_sends_nothing() {
    let mut h = Harness::new(grid3());
    h.remote(0, SELECT_UP);
    assert!(h.sent().is_empty());
}

#[test]
fn key_up_goes_to_the_pressed_key_even_after_moving() {
    let mut h = Harness::new(grid3());
    h.remote(0, SELECT_DOWN);
    h.remote(50, move_down(1, 0));
    h.remote(60, move_up());
    h.remote(100, SELECT_UP);
    assert_eq!(h.focused().as_deref(), Some("b"));
    assert_eq!(
        h.sent(),
        vec![(Phase::Down, "a".into()), (Phase::Up, "a".into())]
    );
}

#[test]
fn move_and_select_repeat_independently() {
    let mut h = Harness::new(FakeSurface::row(&["a", "b", "c", "d", "e", "f"]));
    h.remote(0, move_down(1, 0));
    h.remote(50, SELECT_DOWN);
    h.advance_to(460);
    h.remote(460, move_up());
    h.remote(460, SELECT_UP);
    // move ticks at 400, select ticks at 450
    assert_eq!(h.focused().as_deref(), Some("c"));
    assert_eq!(
        h.sent(),
        vec![
            (Phase::Down, "b".into()),
            (Phase::Repeat, "b".into()),
            (Phase::Up, "b".into()),
        ]
    );
}

#[test]
fn shift_key_swaps_layout_and_keeps_position() {
    let mut h = Harness::new(shiftable());
    assert_eq!(h.step(Direction::Down).as_deref(), Some("{shift}"));
    h.remote(0, SELECT_DOWN);
    h.remote(80, SELECT_UP);

    assert_eq!(h.session.surface().layout(), "shift");
    assert_eq!(h.session.surface().renders, 2);
    assert_eq!(h.focused().as_deref(), Some("{shift}"));
    assert!(h.sent().is_empty());
    assert!(h.session.surface().marked(Marker::Pressed).is_empty());

    assert_eq!(h.step(Direction::Right).as_deref(), Some("A"));
}

#[test]
fn caps_lock_toggles_back_and_forth() {
    let mut h = Harness::new(shiftable());
    h.step(Direction::Right);
    h.local(0, LocalKeyEvent::down(LocalKey::ToggleLayout));
    assert_eq!(h.session.surface().layout(), "shift");
    assert_eq!(h.focused().as_deref(), Some("W"));
    h.local(10, LocalKeyEvent::up(LocalKey::ToggleLayout));
    h.remote(20, RemoteEvent::Shift);
    assert_eq!(h.session.surface().layout(), "default");
    assert_eq!(h.focused().as_deref(), Some("w"));
}

#[test]
fn missing_ordinal_leaves_focus_unset() {
    let mut h = Harness::new(shiftable());
    h.step(Direction::Down);
    h.step(Direction::Left);
    assert_eq!(h.focused().as_deref(), Some("{bksp}"));

    h.remote(0, RemoteEvent::Shift);
    assert_eq!(h.session.active(), None);
    assert!(h.session.surface().marked(Marker::Active).is_empty());

    // next move re-establishes the first button and moves from there
    assert_eq!(h.step(Direction::Right).as_deref(), Some("W"));
}

#[test]
fn stale_focus_is_revalidated() {
    let mut h = Harness::new(shiftable());
    h.step(Direction::Right);
    h.session.surface_mut().set_layout("shift");
    assert_eq!(h.focused(), None);

    assert_eq!(h.step(Direction::Down).as_deref(), Some("{shift}"));
}

#[test]
fn stale_focus_without_revalidation_goes_nowhere() {
    let config = NavConfig {
        revalidate_focus: false,
        ..NavConfig::default()
    };
    let mut h = Harness::with(shiftable(), Recorder::default(), config);
    h.session.surface_mut().set_layout("shift");
    let stale = h.session.active();

    assert_eq!(h.session.move_focus(Direction::Down), None);
    assert_eq!(h.session.active(), stale);
    assert!(h.session.surface().marked(Marker::Active).is_empty());
}

#[test]
fn empty_keyboard_is_a_no_op() {
    let mut h = Harness::new(FakeSurface::row(&[]));
    assert_eq!(h.session.active(), None);
    h.remote(0, move_down(1, 0));
    h.remote(10, SELECT_DOWN);
    h.advance_to(1_000);
    h.remote(1_000, SELECT_UP);
    h.remote(1_000, move_up());
    assert_eq!(h.session.active(), None);
    assert!(h.sent().is_empty());
    assert!(h.timers.is_empty());
}

#[test]
fn delivery_failure_is_swallowed() {
    let mut h = Harness::with(grid3(), Recorder::failing(), NavConfig::default());
    h.remote(0, SELECT_DOWN);
    let a = h.session.surface().id_of("a").unwrap();
    assert!(h.session.surface().has_marker(a, Marker::Pressed));
    h.remote(50, SELECT_UP);
    assert_eq!(h.session.delivery().attempts, 2);
    assert!(!h.session.surface().has_marker(a, Marker::Pressed));

    assert_eq!(h.step(Direction::Right).as_deref(), Some("b"));
}

#[test]
fn local_arrow_hold_absorbs_os_repeat() {
    let mut h = Harness::new(FakeSurface::row(&["a", "b", "c", "d"]));
    let right = LocalKey::Arrow(Direction::Right);
    h.local(0, LocalKeyEvent::down(right));
    h.local(250, LocalKeyEvent::down(right));
    h.local(280, LocalKeyEvent::up(LocalKey::Arrow(Direction::Left)));
    h.advance_to(400);
    assert_eq!(h.focused().as_deref(), Some("c"));
    h.local(430, LocalKeyEvent::up(right));
    h.advance_to(1_000);
    assert_eq!(h.focused().as_deref(), Some("c"));
    assert!(h.timers.is_empty());
}

#[test]
fn local_enter_selects_only_on_grid() {
    let mut h = Harness::new(grid3());
    h.local(0, LocalKeyEvent::down(LocalKey::Enter).off_grid());
    h.local(10, LocalKeyEvent::up(LocalKey::Enter));
    assert!(h.sent().is_empty());

    h.local(20, LocalKeyEvent::down(LocalKey::Enter));
    h.local(420, LocalKeyEvent::up(LocalKey::Enter));
    assert_eq!(
        h.sent(),
        vec![
            (Phase::Down, "a".into()),
            (Phase::Repeat, "a".into()),
            (Phase::Up, "a".into()),
        ]
    );
}

#[test]
fn release_all_ends_held_gestures() {
    let mut h = Harness::new(grid3());
    h.remote(0, move_down(0, 1));
    h.remote(10, SELECT_DOWN);
    h.advance_to(100);
    h.session.release_all(&mut h.timers);

    assert!(h.timers.is_empty());
    assert!(!h.session.is_select_held());
    assert_eq!(
        h.sent(),
        vec![(Phase::Down, "d".into()), (Phase::Up, "d".into())]
    );
}

#[test]
fn overlapping_selects_release_every_key_they_press() {
    let mut h = Harness::new(grid3());
    h.remote(0, SELECT_DOWN);
    h.remote(20, move_down(1, 0));
    h.remote(30, move_up());
    h.local(40, LocalKeyEvent::down(LocalKey::Enter));
    h.remote(60, SELECT_UP);
    h.local(80, LocalKeyEvent::up(LocalKey::Enter));
    h.advance_to(1_000);

    let sent = h.sent();
    for key in ["a", "b"] {
        let count = |phase| {
            sent.iter()
                .filter(|(p, k)| *p == phase && k == key)
                .count()
        };
        assert_eq!(count(Phase::Down), 1, "{key} down");
        assert_eq!(count(Phase::Up), 1, "{key} up");
    }
    assert_eq!(
        sent,
        vec![
            (Phase::Down, "a".into()),
            (Phase::Up, "a".into()),
            (Phase::Down, "b".into()),
            (Phase::Up, "b".into()),
        ]
    );
    assert!(!h.session.is_select_held());
    assert!(h.session.surface().marked(Marker::Pressed).is_empty());
}

#[test]
fn move_up_for_another_direction_keeps_the_held_move() {
    let mut h = Harness::new(FakeSurface::row(&["a", "b", "c", "d", "e"]));
    h.remote(0, move_down(1, 0));
    // ignored while right is held, and so is its release
    h.remote(50, move_down(-1, 0));
    h.remote(100, RemoteEvent::moving(Phase::Up, -1, 0));
    h.advance_to(400);
    assert_eq!(h.focused().as_deref(), Some("c"));

    h.remote(450, RemoteEvent::moving(Phase::Up, 1, 0));
    h.advance_to(2_000);
    assert_eq!(h.focused().as_deref(), Some("c"));
    assert!(h.timers.is_empty());
}
