use crate::error::Result;

use super::{
    AlarmState, AttributeKind, MotionStatus, PushEvent, PushParams, TagRecord, TagState, convert,
};

/// Routes named push events and reading fields into [`TagState`] mutations.
///
/// The motion and alarm slots are coupled in both directions. Each setter
/// cascades into the other at most one hop, controlled by the `cascade`
/// flag, so the coupling always terminates.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventRouter;

impl EventRouter {
    pub fn new() -> Self {
        Self
    }

    /// Apply a named push callback plus its optional reading fields, then
    /// stamp the tag's last-update time.
    ///
    /// An unknown event name is surfaced as an error, but only after the
    /// reading fields have been applied; the two inputs are independent.
    pub fn handle(
        &self,
        state: &mut TagState,
        event_name: &str,
        params: &PushParams,
        now: i64,
    ) -> Result<()> {
        let parsed = PushEvent::parse(event_name);
        if let Ok(event) = &parsed {
            self.apply_event(state, *event)?;
        }
        self.apply_params(state, params);
        state.touch(now);
        parsed.map(|_| ())
    }

    fn apply_event(&self, state: &mut TagState, event: PushEvent) -> Result<()> {
        use AttributeKind::*;

        match event {
            PushEvent::Update => {}
            PushEvent::MotionDetected => {
                self.route_motion(state, MotionStatus::Detected, true)?;
            }
            PushEvent::MotionTimedOut => {
                self.route_motion(state, MotionStatus::TimedOut, true)?;
            }
            PushEvent::DoorOpened | PushEvent::DoorOpenTooLong => {
                self.route_motion(state, MotionStatus::Open, true)?;
            }
            PushEvent::DoorClosed => {
                self.route_motion(state, MotionStatus::Closed, true)?;
            }
            PushEvent::OutOfRange => {
                state.set(OutOfRange, 1.0)?;
            }
            PushEvent::BackInRange => {
                state.set(OutOfRange, 0.0)?;
            }
            PushEvent::TempNormal => {
                state.set(TempEventState, 1.0)?;
            }
            PushEvent::TempTooHigh => {
                state.set(TempEventState, 2.0)?;
            }
            PushEvent::TempTooLow => {
                state.set(TempEventState, 3.0)?;
            }
            PushEvent::TooHumid => {
                state.set(CapEventState, 4.0)?;
            }
            PushEvent::TooDry => {
                state.set(CapEventState, 3.0)?;
            }
            PushEvent::CapNormal => {
                state.set(CapEventState, 2.0)?;
            }
            PushEvent::WaterDetected => {
                state.set(WaterEventState, 2.0)?;
            }
            PushEvent::WaterDried => {
                state.set(WaterEventState, 1.0)?;
            }
            PushEvent::TooBright => {
                state.set(LightEventState, 4.0)?;
            }
            PushEvent::TooDark => {
                state.set(LightEventState, 3.0)?;
            }
            PushEvent::LightNormal => {
                state.set(LightEventState, 2.0)?;
            }
            // Reserved upstream, deliberately not acted on
            PushEvent::LowBattery => {}
        }
        Ok(())
    }

    /// Set the motion slot; with `cascade` the coupled alarm state is derived
    /// one hop down.
    pub fn route_motion(
        &self,
        state: &mut TagState,
        status: MotionStatus,
        cascade: bool,
    ) -> Result<()> {
        state.set(AttributeKind::Motion, status.value())?;
        if cascade {
            let alarm = match status {
                MotionStatus::TimedOut => AlarmState::Armed,
                MotionStatus::Detected => AlarmState::DetectedMovement,
                MotionStatus::Open | MotionStatus::OpenTooLong => AlarmState::Opened,
                MotionStatus::Closed => AlarmState::Closed,
            };
            self.route_alarm(state, alarm.value(), false);
        }
        Ok(())
    }

    /// Set the alarm slot from a raw code; with `cascade`, `Armed` forces the
    /// motion slot back to timed-out one hop down. Cascade writes skip slots
    /// the tag does not carry rather than fail.
    pub fn route_alarm(&self, state: &mut TagState, value: f64, cascade: bool) {
        let _ = state.set(AttributeKind::EventState, value);
        if cascade && value == AlarmState::Armed.value() {
            let _ = state.set(AttributeKind::Motion, MotionStatus::TimedOut.value());
        }
    }

    /// Apply whichever reading fields are present, silently skipping slots
    /// the tag does not carry.
    fn apply_params(&self, state: &mut TagState, params: &PushParams) {
        use AttributeKind::*;
        use super::TemperatureUnit;

        let unit = state.unit();
        if let Some(celsius) = params.tempc {
            if unit == TemperatureUnit::Celsius {
                let _ = state.set(Temperature, convert::display_temperature(celsius, unit, false));
            }
        }
        if let Some(fahrenheit) = params.tempf {
            if unit == TemperatureUnit::Fahrenheit {
                let _ = state.set(
                    Temperature,
                    convert::display_temperature(fahrenheit, unit, false),
                );
            }
        }
        if let Some(temp) = params.temp {
            let _ = state.set(Temperature, convert::display_temperature(temp, unit, true));
        }
        if let Some(hum) = params.hum {
            let _ = state.set(Humidity, hum);
        }
        if let Some(lux) = params.lux {
            let _ = state.set(Luminosity, lux);
        }
        if let Some(orien) = params.orien {
            let _ = state.set(Orientation, orien);
        }
        if let Some(x) = params.xaxis {
            let _ = state.set(AxisX, x);
        }
        if let Some(y) = params.yaxis {
            let _ = state.set(AxisY, y);
        }
        if let Some(z) = params.zaxis {
            let _ = state.set(AxisZ, z);
        }
    }

    /// Apply a full tag record returned by a poll, field by field, then stamp
    /// the record's own last-communication time and recompute freshness
    /// against `now`.
    pub fn ingest(&self, state: &mut TagState, record: &TagRecord, now: i64) {
        use AttributeKind::*;

        let unit = state.unit();
        if let Some(alive) = record.alive {
            let _ = state.set(Alive, flag(alive));
        }
        if let Some(temp) = record.temperature {
            let _ = state.set(Temperature, convert::display_temperature(temp, unit, true));
        }
        if let Some(volt) = record.battery_volt {
            let _ = state.set(BatteryVolt, volt);
        }
        if let Some(fraction) = record.battery_remaining {
            let _ = state.set(BatteryPercent, fraction * 100.0);
        }
        if let Some(lux) = record.lux {
            let _ = state.set(Luminosity, lux);
        }
        if let Some(cap) = record.cap {
            let _ = state.set(Humidity, cap);
        }
        if let Some(lit) = record.lit {
            let _ = state.set(LightLevel, flag(lit));
        }
        if let Some(event_state) = record.event_state {
            self.route_alarm(state, event_state as f64, true);
        }
        if let Some(oor) = record.oor {
            let _ = state.set(OutOfRange, flag(oor));
        }
        if let Some(signal) = record.signal_dbm {
            let _ = state.set(SignalStrength, signal);
        }
        if let Some(temp_state) = record.temp_event_state {
            let _ = state.set(TempEventState, temp_state as f64);
        }
        if let Some(cap_state) = record.cap_event_state {
            let _ = state.set(CapEventState, cap_state as f64);
        }
        if let Some(light_state) = record.light_event_state {
            let _ = state.set(LightEventState, light_state as f64);
        }
        if let Some(ticks) = record.last_comm {
            state.touch(convert::windows_ticks_to_unix_seconds(ticks));
            state.refresh_freshness(now);
        }
    }
}

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainError;
    use crate::sensor::TemperatureUnit;

    const NOW: i64 = 1_600_000_000;

    fn tag(tag_type: u16, unit: TemperatureUnit) -> TagState {
        TagState::new(1, tag_type, unit, "11111111-2222-3333", "Test Tag").unwrap()
    }

    #[test]
    fn test_motion_detected_cascades_to_alarm() {
        let router = EventRouter::new();
        let mut state = tag(12, TemperatureUnit::Celsius);

        router
            .handle(&mut state, "motion_detected", &PushParams::default(), NOW)
            .unwrap();

        assert_eq!(state.get(AttributeKind::Motion), Some(1.0));
        assert_eq!(
            state.get(AttributeKind::EventState),
            Some(AlarmState::DetectedMovement.value())
        );
        assert_eq!(state.last_update_epoch(), NOW);
    }

    #[test]
    fn test_motion_timeout_reaches_fixed_point() {
        let router = EventRouter::new();
        let mut state = tag(12, TemperatureUnit::Celsius);
        router
            .handle(&mut state, "motion_detected", &PushParams::default(), NOW)
            .unwrap();

        router
            .handle(&mut state, "motion_timedout", &PushParams::default(), NOW + 60)
            .unwrap();

        assert_eq!(state.get(AttributeKind::Motion), Some(0.0));
        assert_eq!(state.get(AttributeKind::EventState), Some(AlarmState::Armed.value()));

        // Applying the same event again must not oscillate
        router
            .handle(&mut state, "motion_timedout", &PushParams::default(), NOW + 60)
            .unwrap();
        assert_eq!(state.get(AttributeKind::Motion), Some(0.0));
        assert_eq!(state.get(AttributeKind::EventState), Some(AlarmState::Armed.value()));
    }

    #[test]
    fn test_door_events() {
        let router = EventRouter::new();
        let mut state = tag(13, TemperatureUnit::Celsius);

        for event in ["door_opened", "door_open_toolong"] {
            router
                .handle(&mut state, event, &PushParams::default(), NOW)
                .unwrap();
            assert_eq!(state.get(AttributeKind::Motion), Some(2.0));
            assert_eq!(state.get(AttributeKind::EventState), Some(AlarmState::Opened.value()));
        }

        router
            .handle(&mut state, "door_closed", &PushParams::default(), NOW)
            .unwrap();
        assert_eq!(state.get(AttributeKind::Motion), Some(4.0));
        assert_eq!(state.get(AttributeKind::EventState), Some(AlarmState::Closed.value()));
    }

    #[test]
    fn test_range_and_threshold_events() {
        let router = EventRouter::new();
        let mut state = tag(13, TemperatureUnit::Celsius);

        let table: &[(&str, AttributeKind, f64)] = &[
            ("oor", AttributeKind::OutOfRange, 1.0),
            ("back_in_range", AttributeKind::OutOfRange, 0.0),
            ("temp_normal", AttributeKind::TempEventState, 1.0),
            ("temp_toohigh", AttributeKind::TempEventState, 2.0),
            ("temp_toolow", AttributeKind::TempEventState, 3.0),
            ("too_humid", AttributeKind::CapEventState, 4.0),
            ("too_dry", AttributeKind::CapEventState, 3.0),
            ("cap_normal", AttributeKind::CapEventState, 2.0),
        ];
        for &(event, kind, expected) in table {
            router
                .handle(&mut state, event, &PushParams::default(), NOW)
                .unwrap();
            assert_eq!(state.get(kind), Some(expected), "event {event}");
        }
    }

    #[test]
    fn test_water_events() {
        let router = EventRouter::new();
        let mut state = tag(32, TemperatureUnit::Celsius);

        router
            .handle(&mut state, "water_detected", &PushParams::default(), NOW)
            .unwrap();
        assert_eq!(state.get(AttributeKind::WaterEventState), Some(2.0));

        router
            .handle(&mut state, "water_dried", &PushParams::default(), NOW)
            .unwrap();
        assert_eq!(state.get(AttributeKind::WaterEventState), Some(1.0));
    }

    #[test]
    fn test_too_bright_on_light_tag_touches_nothing_else() {
        let router = EventRouter::new();
        let mut state = tag(26, TemperatureUnit::Celsius);
        let humidity_before = state.get(AttributeKind::Humidity);

        router
            .handle(&mut state, "too_bright", &PushParams::default(), NOW)
            .unwrap();

        assert_eq!(state.get(AttributeKind::LightEventState), Some(4.0));
        assert_eq!(state.get(AttributeKind::Humidity), humidity_before);
        assert_eq!(state.get(AttributeKind::Motion), None);
    }

    #[test]
    fn test_low_battery_is_a_no_op() {
        let router = EventRouter::new();
        let mut state = tag(13, TemperatureUnit::Celsius);
        let before = state.snapshot().values;

        router
            .handle(&mut state, "low_battery", &PushParams::default(), NOW)
            .unwrap();

        let mut after = state.snapshot().values;
        // Only the time-derived slots may differ
        after.insert(AttributeKind::LastUpdateTime, 0.0);
        after.insert(AttributeKind::SecondsSinceUpdate, 0.0);
        let mut expected = before;
        expected.insert(AttributeKind::LastUpdateTime, 0.0);
        expected.insert(AttributeKind::SecondsSinceUpdate, 0.0);
        assert_eq!(after, expected);
    }

    #[test]
    fn test_unknown_event_errors_but_params_still_apply() {
        let router = EventRouter::new();
        let mut state = tag(13, TemperatureUnit::Celsius);
        let params = PushParams {
            temp: Some(21.5),
            hum: Some(40.6),
            ..Default::default()
        };

        let err = router
            .handle(&mut state, "gamma_burst", &params, NOW)
            .unwrap_err();

        assert_eq!(err, DomainError::UnknownEvent("gamma_burst".to_string()));
        assert_eq!(state.get(AttributeKind::Temperature), Some(21.5));
        assert_eq!(state.get(AttributeKind::Humidity), Some(40.0));
        assert_eq!(state.last_update_epoch(), NOW);
    }

    #[test]
    fn test_handle_is_idempotent_modulo_freshness() {
        let router = EventRouter::new();
        let mut state = tag(13, TemperatureUnit::Celsius);
        let params = PushParams {
            temp: Some(19.95),
            xaxis: Some(3.0),
            ..Default::default()
        };

        router.handle(&mut state, "door_opened", &params, NOW).unwrap();
        let first = state.snapshot();
        router.handle(&mut state, "door_opened", &params, NOW).unwrap();
        assert_eq!(state.snapshot(), first);
    }

    #[test]
    fn test_unit_specific_temperature_fields() {
        let router = EventRouter::new();

        // Celsius device: tempc applies as-is, tempf is ignored
        let mut celsius = tag(13, TemperatureUnit::Celsius);
        let params = PushParams {
            tempc: Some(20.07),
            tempf: Some(90.0),
            ..Default::default()
        };
        router.handle(&mut celsius, "update", &params, NOW).unwrap();
        assert_eq!(celsius.get(AttributeKind::Temperature), Some(20.1));

        // Fahrenheit device: tempf applies without conversion
        let mut fahrenheit = tag(13, TemperatureUnit::Fahrenheit);
        router.handle(&mut fahrenheit, "update", &params, NOW).unwrap();
        assert_eq!(fahrenheit.get(AttributeKind::Temperature), Some(90.0));
    }

    #[test]
    fn test_generic_temperature_converts_for_fahrenheit_device() {
        let router = EventRouter::new();
        let mut state = tag(13, TemperatureUnit::Fahrenheit);
        let params = PushParams {
            temp: Some(20.0),
            ..Default::default()
        };

        router.handle(&mut state, "update", &params, NOW).unwrap();
        assert_eq!(state.get(AttributeKind::Temperature), Some(68.0));
    }

    #[test]
    fn test_params_outside_capability_are_skipped_silently() {
        let router = EventRouter::new();
        // Type 52 has no luminosity or axis slots
        let mut state = tag(52, TemperatureUnit::Celsius);
        let params = PushParams {
            lux: Some(100.0),
            xaxis: Some(5.0),
            hum: Some(33.3),
            ..Default::default()
        };

        router.handle(&mut state, "update", &params, NOW).unwrap();

        assert_eq!(state.get(AttributeKind::Luminosity), None);
        assert_eq!(state.get(AttributeKind::AxisX), None);
        assert_eq!(state.get(AttributeKind::Humidity), Some(33.0));
    }

    #[test]
    fn test_motion_event_on_motionless_tag_is_rejected() {
        let router = EventRouter::new();
        let mut state = tag(32, TemperatureUnit::Celsius);

        let err = router
            .handle(&mut state, "motion_detected", &PushParams::default(), NOW)
            .unwrap_err();
        assert!(matches!(err, DomainError::CapabilityMissing { .. }));
        // The callback still counts as reported activity
        assert_eq!(state.last_update_epoch(), NOW);
    }

    #[test]
    fn test_ingest_full_record() {
        let router = EventRouter::new();
        let mut state = tag(26, TemperatureUnit::Fahrenheit);
        // 2020-01-01T00:00:00Z
        let last_comm_ticks = (1_577_836_800 + 11_644_477_200) * 10_000_000;
        let record = TagRecord {
            temperature: Some(20.0),
            battery_remaining: Some(0.8745),
            battery_volt: Some(3.14159),
            lux: Some(118.3456),
            cap: Some(41.9),
            alive: Some(true),
            lit: Some(false),
            signal_dbm: Some(-77.8),
            last_comm: Some(last_comm_ticks),
            ..Default::default()
        };

        router.ingest(&mut state, &record, 1_577_836_860);

        assert_eq!(state.get(AttributeKind::Temperature), Some(68.0));
        assert_eq!(state.get(AttributeKind::BatteryPercent), Some(87.45));
        assert_eq!(state.get(AttributeKind::BatteryVolt), Some(3.142));
        assert_eq!(state.get(AttributeKind::Luminosity), Some(118.35));
        assert_eq!(state.get(AttributeKind::Humidity), Some(41.0));
        assert_eq!(state.get(AttributeKind::Alive), Some(1.0));
        assert_eq!(state.get(AttributeKind::LightLevel), Some(0.0));
        assert_eq!(state.get(AttributeKind::SignalStrength), Some(-77.0));
        assert_eq!(state.last_update_epoch(), 1_577_836_800);
        assert_eq!(state.get(AttributeKind::LastUpdateTime), Some(1_577_836_800.0));
        assert_eq!(state.get(AttributeKind::SecondsSinceUpdate), Some(60.0));
    }

    #[test]
    fn test_ingest_armed_state_disarms_motion() {
        let router = EventRouter::new();
        let mut state = tag(12, TemperatureUnit::Celsius);
        router
            .route_motion(&mut state, MotionStatus::Detected, true)
            .unwrap();
        assert_eq!(state.get(AttributeKind::Motion), Some(1.0));

        let record = TagRecord {
            event_state: Some(1),
            ..Default::default()
        };
        router.ingest(&mut state, &record, NOW);

        assert_eq!(state.get(AttributeKind::EventState), Some(AlarmState::Armed.value()));
        assert_eq!(state.get(AttributeKind::Motion), Some(0.0));
    }

    #[test]
    fn test_ingest_armed_state_on_motionless_tag_does_not_fail() {
        let router = EventRouter::new();
        let mut state = tag(26, TemperatureUnit::Celsius);
        let record = TagRecord {
            event_state: Some(1),
            ..Default::default()
        };

        router.ingest(&mut state, &record, NOW);

        assert_eq!(state.get(AttributeKind::EventState), Some(1.0));
        assert_eq!(state.get(AttributeKind::Motion), None);
    }

    #[test]
    fn test_ingest_without_last_comm_leaves_timestamps() {
        let router = EventRouter::new();
        let mut state = tag(13, TemperatureUnit::Celsius);
        let record = TagRecord {
            temperature: Some(5.0),
            ..Default::default()
        };

        router.ingest(&mut state, &record, NOW);

        assert_eq!(state.get(AttributeKind::Temperature), Some(5.0));
        assert_eq!(state.last_update_epoch(), 0);
    }
}
