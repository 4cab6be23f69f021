//! Watch face engine
//!
//! Owns the UI state, the render cadence and the complication slots. The
//! host (the firmware tasks, or a test) feeds it callbacks as [`HostEvent`]s
//! together with the current wall-clock time, sleeps until
//! [`Engine::next_deadline`], calls [`Engine::poll`] and redraws whenever
//! [`Engine::take_redraw`] says so. All of it runs on one task.

use embedded_graphics::geometry::Point;

use crate::{
    complication::{
        ComplicationBridge, ComplicationData, ComplicationHost, ComplicationInbox, SlotId,
        TapOutcome,
    },
    config::WatchFaceConfig,
    system::{battery::percent_from_level, time::local_datetime},
    ui::{Surface, TextWatchFace, WatchFace, WatchFaceState},
};

pub mod timer;

use timer::{until_next_boundary, Deadline};

/// Kind of touch gesture reported by the host
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapType {
    /// Finger went down
    Touch,
    /// Touch turned into another gesture
    TouchCancel,
    /// Completed single tap
    Tap,
}

/// Callbacks from the host
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    SurfaceChanged { width: u32, height: u32 },
    VisibilityChanged(bool),
    AmbientModeChanged(bool),
    PropertiesChanged {
        low_bit_ambient: bool,
        burn_in_protection: bool,
    },
    Tap { kind: TapType, x: i32, y: i32 },
    /// Once a minute, also in ambient mode
    TimeTick,
    ComplicationData { slot: SlotId, data: ComplicationData },
    BatteryChanged { level: i32, scale: i32 },
    TimezoneChanged { utc_offset_secs: i32 },
    Destroy,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Visible and interactive, redrawn every second
    ActiveTicking,
    /// Interactive but off screen
    ActiveIdle,
    /// Low power, redrawn on time ticks only
    Ambient,
}

/// UI state mutated by host callbacks
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineUiState {
    pub ambient: bool,
    /// Date view instead of the phrase, reset by a timer
    pub show_date: bool,
    pub battery_percent: Option<u8>,
    pub visible: bool,
    pub low_bit_ambient: bool,
    pub burn_in_protection: bool,
}

/// Result of a tap as seen by the host
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapResult {
    Complication(SlotId, TapOutcome),
    DateShown,
    Ignored,
}

pub struct Engine<H> {
    config: WatchFaceConfig,
    state: EngineUiState,
    face: TextWatchFace,
    complications: ComplicationBridge,
    host: H,
    center: Point,
    tick: Deadline,
    date_reset: Deadline,
    redraw: bool,
}

impl<H> Engine<H>
where
    H: ComplicationHost,
{
    pub fn new(config: WatchFaceConfig, host: H) -> Self {
        Self {
            config,
            state: EngineUiState::default(),
            face: TextWatchFace::new(config),
            complications: ComplicationBridge::default(),
            host,
            center: Point::zero(),
            tick: Deadline::new(),
            date_reset: Deadline::new(),
            redraw: true,
        }
    }

    pub fn state(&self) -> &EngineUiState {
        &self.state
    }

    pub fn complications(&self) -> &ComplicationBridge {
        &self.complications
    }

    pub fn host(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn mode(&self) -> Mode {
        if self.state.ambient {
            Mode::Ambient
        } else if self.state.visible {
            Mode::ActiveTicking
        } else {
            Mode::ActiveIdle
        }
    }

    /// Route a host callback to its handler.
    pub fn dispatch(&mut self, event: HostEvent, now: i64) {
        match event {
            HostEvent::SurfaceChanged { width, height } => self.on_surface_changed(width, height),
            HostEvent::VisibilityChanged(visible) => self.on_visibility_changed(visible, now),
            HostEvent::AmbientModeChanged(ambient) => self.on_ambient_mode_changed(ambient, now),
            HostEvent::PropertiesChanged {
                low_bit_ambient,
                burn_in_protection,
            } => self.on_properties_changed(low_bit_ambient, burn_in_protection),
            HostEvent::Tap { kind, x, y } => {
                self.on_tap(kind, x, y, now);
            }
            HostEvent::TimeTick => self.on_time_tick(),
            HostEvent::ComplicationData { slot, data } => {
                self.on_complication_data_update(slot, data)
            }
            HostEvent::BatteryChanged { level, scale } => self.on_battery_changed(level, scale),
            HostEvent::TimezoneChanged { utc_offset_secs } => {
                self.on_timezone_changed(utc_offset_secs)
            }
            HostEvent::Destroy => self.on_destroy(),
        }
    }

    pub fn on_surface_changed(&mut self, width: u32, height: u32) {
        info!("Surface changed to {}x{}", width, height);
        self.center = Point::new(width as i32 / 2, height as i32 / 2);
        self.complications
            .on_surface_changed(width, height, self.config.complication_margin);
        self.redraw = true;
    }

    pub fn on_visibility_changed(&mut self, visible: bool, now: i64) {
        debug!("Visibility changed: {}", visible);
        self.state.visible = visible;
        if visible {
            self.redraw = true;
        }
        self.update_timer(now);
    }

    pub fn on_ambient_mode_changed(&mut self, ambient: bool, now: i64) {
        debug!("Ambient mode changed: {}", ambient);
        self.state.ambient = ambient;
        self.redraw = true;
        self.update_timer(now);
    }

    pub fn on_properties_changed(&mut self, low_bit_ambient: bool, burn_in_protection: bool) {
        self.state.low_bit_ambient = low_bit_ambient;
        self.state.burn_in_protection = burn_in_protection;
    }

    /// Taps on a complication go to its provider, anywhere else shows the date.
    pub fn on_tap(&mut self, kind: TapType, x: i32, y: i32, now: i64) -> TapResult {
        self.redraw = true;
        if kind != TapType::Tap {
            return TapResult::Ignored;
        }

        if let Some(slot) = self.complications.hit_test(x, y, now) {
            let outcome = self.complications.tap(slot, &mut self.host);
            return TapResult::Complication(slot, outcome);
        }

        self.state.show_date = true;
        self.date_reset.schedule(now + self.config.date_duration_ms);
        TapResult::DateShown
    }

    pub fn on_time_tick(&mut self) {
        self.redraw = true;
    }

    pub fn on_complication_data_update(&mut self, slot: SlotId, data: ComplicationData) {
        if self.complications.on_complication_data_update(slot, data) {
            self.redraw = true;
        }
    }

    pub fn on_battery_changed(&mut self, level: i32, scale: i32) {
        match percent_from_level(level, scale) {
            Some(percent) => self.state.battery_percent = Some(percent),
            None => warn!("Ignoring battery reading {}/{}", level, scale),
        }
    }

    pub fn on_timezone_changed(&mut self, utc_offset_secs: i32) {
        self.config.utc_offset_secs = utc_offset_secs;
        self.redraw = true;
    }

    /// Stop all timers, the engine stays inert until the host starts over.
    pub fn on_destroy(&mut self) {
        self.tick.cancel();
        self.date_reset.cancel();
    }

    /// Apply complication updates posted from other contexts.
    pub fn drain_complications(&mut self, inbox: &ComplicationInbox) -> usize {
        inbox.drain(|(slot, data)| self.on_complication_data_update(slot, data))
    }

    /// Earliest pending timer, if any
    pub fn next_deadline(&self) -> Option<i64> {
        match (self.tick.due(), self.date_reset.due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fire timers that are due at `now`.
    pub fn poll(&mut self, now: i64) {
        if self.date_reset.fire(now) {
            self.state.show_date = false;
            self.redraw = true;
        }
        if self.tick.fire(now) {
            self.handle_update_time(now);
        }
    }

    /// Whether a frame is due; clears the request.
    pub fn take_redraw(&mut self) -> bool {
        core::mem::take(&mut self.redraw)
    }

    /// Draw one frame for wall-clock time `now`.
    pub fn draw<S: Surface>(&self, surface: &mut S, now: i64) -> Result<(), S::Error> {
        let Some(time) = local_datetime(now, self.config.utc_offset_secs) else {
            error!("Time {} out of range", now);
            return Ok(());
        };

        let mut palette = self.config.palette;
        if self.state.ambient && self.state.low_bit_ambient {
            palette = palette.low_bit();
        }

        let state = WatchFaceState {
            time,
            now_millis: now,
            percent: self.state.battery_percent,
            show_date: self.state.show_date,
            ambient: self.state.ambient,
            center: self.center,
            palette,
            complications: &self.complications,
        };
        self.face.draw(surface, &state)
    }

    fn should_timer_be_running(&self) -> bool {
        self.mode() == Mode::ActiveTicking
    }

    /// Start or stop the tick for the current mode.
    fn update_timer(&mut self, now: i64) {
        self.tick.cancel();
        if self.should_timer_be_running() {
            self.schedule_tick(now);
        }
    }

    fn handle_update_time(&mut self, now: i64) {
        self.redraw = true;
        if self.should_timer_be_running() {
            self.schedule_tick(now);
        }
    }

    fn schedule_tick(&mut self, now: i64) {
        let rate = self.config.update_rate_ms;
        self.tick.schedule(now + until_next_boundary(now, rate));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        complication::{tests::RecordingHost, ActionHandle, ComplicationData, COMPLICATION_ID},
        ui::{
            tests::{Op, RecordingSurface},
            Ink,
        },
    };

    /// 2024-03-03 10:25:00.250 UTC
    const T0: i64 = 1_709_461_500_250;

    fn engine() -> Engine<RecordingHost> {
        let mut engine = Engine::new(WatchFaceConfig::default(), RecordingHost::default());
        engine.dispatch(HostEvent::SurfaceChanged { width: 240, height: 240 }, T0);
        engine
    }

    fn tap(engine: &mut Engine<RecordingHost>, x: i32, y: i32, now: i64) {
        engine.dispatch(HostEvent::Tap { kind: TapType::Tap, x, y }, now);
    }

    #[test]
    fn visible_and_interactive_ticks_on_second_boundaries() {
        let mut engine = engine();
        assert_eq!(engine.mode(), Mode::ActiveIdle);
        assert_eq!(engine.next_deadline(), None);

        engine.dispatch(HostEvent::VisibilityChanged(true), T0);
        assert_eq!(engine.mode(), Mode::ActiveTicking);
        assert_eq!(engine.next_deadline(), Some(T0 + 750));

        engine.take_redraw();
        engine.poll(T0 + 750);
        assert!(engine.take_redraw());
        assert_eq!(engine.next_deadline(), Some(T0 + 1_750));
    }

    #[test]
    fn ambient_and_hidden_stop_the_tick() {
        let mut engine = engine();
        engine.dispatch(HostEvent::VisibilityChanged(true), T0);

        engine.dispatch(HostEvent::AmbientModeChanged(true), T0 + 10);
        assert_eq!(engine.mode(), Mode::Ambient);
        assert_eq!(engine.next_deadline(), None);

        engine.dispatch(HostEvent::AmbientModeChanged(false), T0 + 20);
        assert_eq!(engine.mode(), Mode::ActiveTicking);
        assert!(engine.next_deadline().is_some());

        engine.dispatch(HostEvent::VisibilityChanged(false), T0 + 30);
        assert_eq!(engine.mode(), Mode::ActiveIdle);
        assert_eq!(engine.next_deadline(), None);

        // Stale wake-ups do nothing
        engine.take_redraw();
        engine.poll(T0 + 5_000);
        assert!(!engine.take_redraw());
    }

    #[test]
    fn tap_outside_shows_date_for_three_seconds() {
        let mut engine = engine();
        tap(&mut engine, 120, 120, T0);
        assert!(engine.state().show_date);
        assert_eq!(engine.next_deadline(), Some(T0 + 3_000));

        engine.poll(T0 + 2_999);
        assert!(engine.state().show_date);

        engine.take_redraw();
        engine.poll(T0 + 3_000);
        assert!(!engine.state().show_date);
        assert!(engine.take_redraw());

        // Nothing left to fire
        assert_eq!(engine.next_deadline(), None);
        engine.poll(T0 + 6_000);
        assert!(!engine.take_redraw());
    }

    #[test]
    fn second_tap_replaces_the_pending_reset() {
        let mut engine = engine();
        tap(&mut engine, 10, 10, T0);
        tap(&mut engine, 10, 10, T0 + 2_000);

        engine.poll(T0 + 3_000);
        assert!(engine.state().show_date);
        assert_eq!(engine.next_deadline(), Some(T0 + 5_000));

        engine.poll(T0 + 5_000);
        assert!(!engine.state().show_date);
        assert_eq!(engine.next_deadline(), None);
    }

    #[test]
    fn tap_on_complication_does_not_show_date() {
        let mut engine = engine();
        engine.dispatch(
            HostEvent::ComplicationData {
                slot: COMPLICATION_ID,
                data: ComplicationData::short_text("5k").with_tap_action(ActionHandle(2)),
            },
            T0,
        );

        let result = engine.on_tap(TapType::Tap, 120, 200, T0);
        assert_eq!(
            result,
            TapResult::Complication(COMPLICATION_ID, TapOutcome::ActionSent)
        );
        assert!(!engine.state().show_date);
        assert_eq!(engine.next_deadline(), None);
        assert_eq!(engine.host().sent, [ActionHandle(2)]);
    }

    #[test]
    fn tap_on_unconfigured_complication_shows_date() {
        let mut engine = engine();
        assert_eq!(
            engine.on_tap(TapType::Tap, 120, 200, T0),
            TapResult::DateShown
        );
    }

    #[test]
    fn other_touch_kinds_only_redraw() {
        let mut engine = engine();
        engine.take_redraw();
        assert_eq!(
            engine.on_tap(TapType::Touch, 120, 120, T0),
            TapResult::Ignored
        );
        assert!(!engine.state().show_date);
        assert!(engine.take_redraw());
    }

    #[test]
    fn destroy_cancels_timers() {
        let mut engine = engine();
        engine.dispatch(HostEvent::VisibilityChanged(true), T0);
        tap(&mut engine, 0, 0, T0);
        engine.dispatch(HostEvent::Destroy, T0);
        assert_eq!(engine.next_deadline(), None);
    }

    #[test]
    fn battery_and_timezone() {
        let mut engine = engine();
        engine.dispatch(HostEvent::BatteryChanged { level: 3, scale: 4 }, T0);
        assert_eq!(engine.state().battery_percent, Some(75));
        engine.dispatch(HostEvent::BatteryChanged { level: -1, scale: -1 }, T0);
        assert_eq!(engine.state().battery_percent, Some(75));

        engine.dispatch(HostEvent::TimezoneChanged { utc_offset_secs: 3_600 }, T0);
        let mut surface = RecordingSurface::default();
        engine.draw(&mut surface, T0).unwrap();
        // 11:25 local
        assert_eq!(
            surface.texts()[..3],
            [
                ("kurz vor", Point::new(80, 110), Ink::Text),
                ("halb", Point::new(70, 140), Ink::Text),
                (" zwölf", Point::new(110, 140), Ink::Hour),
            ]
        );
    }

    #[test]
    fn complication_updates_from_inbox() {
        let mut engine = engine();
        let inbox = ComplicationInbox::new();
        inbox
            .post((COMPLICATION_ID, ComplicationData::ranged_value(1, 0, 2)))
            .unwrap();
        engine.take_redraw();
        assert_eq!(engine.drain_complications(&inbox), 1);
        assert!(engine.take_redraw());
        assert!(engine
            .complications()
            .slot(COMPLICATION_ID)
            .and_then(|slot| slot.data.as_ref())
            .is_some());
    }

    #[test]
    fn low_bit_ambient_uses_two_colours() {
        let mut engine = engine();
        engine.dispatch(
            HostEvent::PropertiesChanged {
                low_bit_ambient: true,
                burn_in_protection: false,
            },
            T0,
        );
        engine.dispatch(HostEvent::AmbientModeChanged(true), T0);
        let mut surface = RecordingSurface::default();
        engine.draw(&mut surface, T0).unwrap();
        let expected = WatchFaceConfig::default().palette.low_bit();
        assert_eq!(surface.ops[0], Op::Clear(expected));
    }
}
