mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use embassy_futures::select::select;
    use embassy_futures::{block_on, yield_now};

    use myrtio_bsp_core::led::{PatternRuntime, PatternSource};
    use myrtio_bsp_core::{
        DisplayOps, Error, Level, LedId, Pattern, PatternEngine, PatternEngineConfig,
        PatternMailbox, PatternStatus, Preset, Repeat, Step, Timebase,
    };

    #[derive(Debug)]
    struct Fault;

    #[derive(Clone, Default)]
    struct FakeLed {
        level: Rc<Cell<Level>>,
        writes: Rc<Cell<u32>>,
        broken: Rc<Cell<bool>>,
        fail_prepare: bool,
    }

    impl FakeLed {
        fn drive(&self, level: Level) -> Result<(), Fault> {
            if self.broken.get() {
                return Err(Fault);
            }
            self.level.set(level);
            self.writes.set(self.writes.get() + 1);
            Ok(())
        }
    }

    impl DisplayOps for FakeLed {
        type Error = Fault;

        fn on(&mut self) -> Result<(), Fault> {
            self.drive(Level::On)
        }

        fn off(&mut self) -> Result<(), Fault> {
            self.drive(Level::Off)
        }

        fn toggle(&mut self) -> Result<(), Fault> {
            self.drive(self.level.get().inverted())
        }

        fn status(&mut self) -> Result<Level, Fault> {
            Ok(self.level.get())
        }

        fn prepare(&mut self) -> Result<(), Fault> {
            if self.fail_prepare {
                return Err(Fault);
            }
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct ManualClock(Rc<Cell<u32>>);

    impl ManualClock {
        fn set(&self, ms: u32) {
            self.0.set(ms);
        }
    }

    impl Timebase for ManualClock {
        fn now_ms(&self) -> u32 {
            self.0.get()
        }
    }

    type Engine<'a> = PatternEngine<'a, FakeLed, ManualClock>;

    fn engine<'a>(mailbox: &'a PatternMailbox, clock: &ManualClock) -> Engine<'a> {
        PatternEngine::new(mailbox, clock.clone(), PatternEngineConfig::default())
    }

    fn leds(count: usize) -> Vec<FakeLed> {
        (0..count).map(|_| FakeLed::default()).collect()
    }

    /// Tick every 10 ms from `from` (inclusive) to `to` (exclusive).
    fn run_until(engine: &mut Engine<'_>, clock: &ManualClock, from: u32, to: u32) {
        for now in (from..to).step_by(10) {
            clock.set(now);
            engine.tick().unwrap();
        }
    }

    #[test]
    fn test_init_seeds_steady_off_not_started() {
        let mailbox = PatternMailbox::new();
        let clock = ManualClock::default();
        let mut engine = engine(&mailbox, &clock);

        engine.init(leds(3)).unwrap();
        assert_eq!(engine.channel_count(), 3);
        assert!(mailbox.is_open());

        let runtime = engine.runtime(LedId::Led0).unwrap();
        assert_eq!(runtime.status(), PatternStatus::NotStarted);
        assert_eq!(runtime, PatternRuntime::default());
    }

    #[test]
    fn test_init_rejects_bad_channel_count() {
        let mailbox = PatternMailbox::new();
        let clock = ManualClock::default();
        let mut engine = engine(&mailbox, &clock);

        assert_eq!(engine.init(leds(0)), Err(Error::InputParam));
        assert_eq!(engine.init(leds(5)), Err(Error::InputParam));
        assert!(!engine.is_initialized());
    }

    #[test]
    fn test_init_twice_is_rejected() {
        let mailbox = PatternMailbox::new();
        let clock = ManualClock::default();
        let mut engine = engine(&mailbox, &clock);

        engine.init(leds(1)).unwrap();
        assert_eq!(engine.init(leds(1)), Err(Error::InitStatus));
    }

    #[test]
    fn test_init_failure_unwinds_earlier_channels() {
        let mailbox = PatternMailbox::new();
        let clock = ManualClock::default();
        let mut engine = engine(&mailbox, &clock);

        let mut displays = leds(3);
        displays[0].level.set(Level::On);
        displays[2].fail_prepare = true;
        let first = displays[0].clone();

        assert_eq!(engine.init(displays), Err(Error::Resource));
        assert!(!engine.is_initialized());
        assert!(!mailbox.is_open());
        // Released channels are turned off.
        assert_eq!(first.level.get(), Level::Off);
    }

    #[test]
    fn test_tick_requires_init() {
        let mailbox = PatternMailbox::new();
        let clock = ManualClock::default();
        let mut engine = engine(&mailbox, &clock);
        assert_eq!(engine.tick(), Err(Error::InitStatus));
        assert_eq!(engine.status(LedId::Led0), Err(Error::InitStatus));
    }

    #[test]
    fn test_submit_before_init_is_rejected() {
        let mailbox: PatternMailbox = PatternMailbox::new();
        assert_eq!(
            mailbox.set_preset(LedId::Led0, Preset::BlinkFast),
            Err(Error::InitStatus)
        );
    }

    #[test]
    fn test_submit_to_missing_channel_is_rejected() {
        let mailbox = PatternMailbox::new();
        let clock = ManualClock::default();
        let mut engine = engine(&mailbox, &clock);
        engine.init(leds(2)).unwrap();

        assert_eq!(
            mailbox.set_preset(LedId::Led2, Preset::SteadyOn),
            Err(Error::InputParam)
        );
        assert_eq!(mailbox.set_preset_raw(0, 42), Err(Error::InputParam));
        assert_eq!(mailbox.set_preset_raw(9, 0), Err(Error::InputParam));
        assert_eq!(engine.runtime(LedId::Led2), Err(Error::InputParam));
    }

    #[test]
    fn test_two_step_pattern_runs_twice_then_holds_off() {
        let mailbox = PatternMailbox::new();
        let clock = ManualClock::default();
        let led = FakeLed::default();
        let mut engine = engine(&mailbox, &clock);
        engine.init([led.clone()]).unwrap();

        let pattern = Pattern::new(&[Step::on(100), Step::off(200)], Repeat::Times(2), 0).unwrap();
        mailbox.set_custom(LedId::Led0, &pattern).unwrap();

        let expect = |from: u32, to: u32, level: Level, engine: &mut Engine<'_>| {
            for now in (from..to).step_by(10) {
                clock.set(now);
                engine.tick().unwrap();
                assert_eq!(led.level.get(), level, "t={now}");
                assert_eq!(engine.status(LedId::Led0), Ok(PatternStatus::Running), "t={now}");
            }
        };
        expect(0, 100, Level::On, &mut engine);
        expect(100, 300, Level::Off, &mut engine);
        expect(300, 400, Level::On, &mut engine);
        expect(400, 600, Level::Off, &mut engine);

        for now in (600..2_000).step_by(10) {
            clock.set(now);
            engine.tick().unwrap();
            assert_eq!(led.level.get(), Level::Off);
            assert_eq!(engine.status(LedId::Led0), Ok(PatternStatus::Finished));
        }
        assert_eq!(engine.runtime(LedId::Led0).unwrap().exec_count(), 2);
    }

    #[test]
    fn test_infinite_pattern_cycles_from_loop_start() {
        let mailbox = PatternMailbox::new();
        let clock = ManualClock::default();
        let mut engine = engine(&mailbox, &clock);
        engine.init(leds(1)).unwrap();

        // Intro step 0 plays once, then steps 1..3 repeat.
        let pattern =
            Pattern::infinite_from(1, &[Step::on(50), Step::off(20), Step::on(30)]).unwrap();
        mailbox.set_custom(LedId::Led0, &pattern).unwrap();

        let mut seen = Vec::new();
        for now in (0..500).step_by(10) {
            clock.set(now);
            engine.tick().unwrap();
            let index = engine.runtime(LedId::Led0).unwrap().step_index();
            if seen.last() != Some(&index) {
                seen.push(index);
            }
        }
        assert_eq!(&seen[..7], &[0u8, 1, 2, 1, 2, 1, 2]);
        assert_eq!(engine.status(LedId::Led0), Ok(PatternStatus::Running));
    }

    #[test]
    fn test_finite_pattern_repeats_from_loop_start() {
        let mailbox = PatternMailbox::new();
        let clock = ManualClock::default();
        let led = FakeLed::default();
        let mut engine = engine(&mailbox, &clock);
        engine.init([led.clone()]).unwrap();

        // Step 0 plays once, then steps 1..3 play twice in total.
        let steps = [Step::on(50), Step::off(50), Step::on(50)];
        let pattern = Pattern::new(&steps, Repeat::Times(2), 1).unwrap();
        mailbox.set_custom(LedId::Led0, &pattern).unwrap();

        let mut seen = Vec::new();
        for now in (0..600).step_by(10) {
            clock.set(now);
            engine.tick().unwrap();
            let index = engine.runtime(LedId::Led0).unwrap().step_index();
            if seen.last() != Some(&index) {
                seen.push(index);
            }
        }

        assert_eq!(seen, [0u8, 1, 2, 1, 2]);
        let runtime = engine.runtime(LedId::Led0).unwrap();
        assert_eq!(runtime.status(), PatternStatus::Finished);
        assert_eq!(runtime.exec_count(), 2);
        assert_eq!(led.level.get(), Level::On);
    }

    #[test]
    fn test_run_applies_queued_intents() {
        let mailbox = PatternMailbox::new();
        let clock = ManualClock::default();
        let led = FakeLed::default();
        let mut engine = engine(&mailbox, &clock);
        engine.init([led.clone()]).unwrap();

        mailbox.set_preset(LedId::Led0, Preset::SteadyOn).unwrap();
        block_on(select(engine.run(), yield_now()));

        assert_eq!(mailbox.pending(), 0);
        assert_eq!(led.level.get(), Level::On);
        assert_eq!(engine.status(LedId::Led0), Ok(PatternStatus::Running));
    }

    #[test]
    fn test_steady_on_preset() {
        let mailbox = PatternMailbox::new();
        let clock = ManualClock::default();
        let led = FakeLed::default();
        let mut engine = engine(&mailbox, &clock);
        engine.init([led.clone()]).unwrap();

        mailbox.set_preset(LedId::Led0, Preset::SteadyOn).unwrap();
        run_until(&mut engine, &clock, 0, 10_000);

        assert_eq!(led.level.get(), Level::On);
        assert_eq!(engine.status(LedId::Led0), Ok(PatternStatus::Running));
        assert_eq!(engine.display_status(LedId::Led0), Ok(Level::On));
    }

    #[test]
    fn test_not_started_channel_is_left_alone() {
        let mailbox = PatternMailbox::new();
        let clock = ManualClock::default();
        let led = FakeLed::default();
        let mut engine = engine(&mailbox, &clock);
        engine.init([led.clone()]).unwrap();

        let writes = led.writes.get();
        run_until(&mut engine, &clock, 0, 100);
        assert_eq!(led.writes.get(), writes);
        assert_eq!(engine.status(LedId::Led0), Ok(PatternStatus::NotStarted));
    }

    #[test]
    fn test_latest_intent_wins() {
        let mailbox = PatternMailbox::new();
        let clock = ManualClock::default();
        let led = FakeLed::default();
        let mut engine = engine(&mailbox, &clock);
        engine.init([led.clone()]).unwrap();

        mailbox.set_preset(LedId::Led0, Preset::SteadyOff).unwrap();
        mailbox.set_preset(LedId::Led0, Preset::BlinkFast).unwrap();
        mailbox.set_preset(LedId::Led0, Preset::SteadyOn).unwrap();
        assert_eq!(mailbox.pending(), 3);

        clock.set(5);
        engine.tick().unwrap();
        assert_eq!(mailbox.pending(), 0);
        assert_eq!(led.level.get(), Level::On);

        let runtime = engine.runtime(LedId::Led0).unwrap();
        assert_eq!(runtime.source(), PatternSource::Preset(Preset::SteadyOn));
        assert_eq!(runtime.status(), PatternStatus::Running);
        assert_eq!(runtime.started_at(), 5);
    }

    #[test]
    fn test_new_intent_restarts_running_pattern() {
        let mailbox = PatternMailbox::new();
        let clock = ManualClock::default();
        let mut engine = engine(&mailbox, &clock);
        engine.init(leds(1)).unwrap();

        mailbox.set_preset(LedId::Led0, Preset::Heartbeat).unwrap();
        run_until(&mut engine, &clock, 0, 400);
        assert_ne!(engine.runtime(LedId::Led0).unwrap().step_index(), 0);

        mailbox.set_preset(LedId::Led0, Preset::Heartbeat).unwrap();
        clock.set(400);
        engine.tick().unwrap();
        let runtime = engine.runtime(LedId::Led0).unwrap();
        assert_eq!(runtime.step_index(), 0);
        assert_eq!(runtime.step_started_at(), 400);
    }

    #[test]
    fn test_full_queue_is_resource_error() {
        let mailbox: PatternMailbox<2> = PatternMailbox::new();
        let clock = ManualClock::default();
        let mut engine = PatternEngine::<FakeLed, _, 2>::new(
            &mailbox,
            clock.clone(),
            PatternEngineConfig::default(),
        );
        engine.init(leds(1)).unwrap();

        mailbox.set_preset(LedId::Led0, Preset::BlinkSlow).unwrap();
        mailbox.set_preset(LedId::Led0, Preset::BlinkNormal).unwrap();
        assert_eq!(
            mailbox.set_preset(LedId::Led0, Preset::BlinkFast),
            Err(Error::Resource)
        );

        engine.tick().unwrap();
        assert!(mailbox.set_preset(LedId::Led0, Preset::BlinkFast).is_ok());
    }

    #[test]
    fn test_submit_only_enqueues() {
        let mailbox = PatternMailbox::new();
        let clock = ManualClock::default();
        let mut engine = engine(&mailbox, &clock);
        engine.init(leds(1)).unwrap();

        mailbox.set_preset(LedId::Led0, Preset::SteadyOn).unwrap();
        engine.tick().unwrap();
        let before = engine.runtime(LedId::Led0).unwrap();

        let pattern = Pattern::infinite(&[Step::on(10), Step::off(10)]).unwrap();
        mailbox.set_custom(LedId::Led0, &pattern).unwrap();
        assert_eq!(mailbox.pending(), 1);
        assert_eq!(engine.runtime(LedId::Led0).unwrap(), before);

        clock.set(1);
        engine.tick().unwrap();
        assert_eq!(engine.runtime(LedId::Led0).unwrap().source(), PatternSource::Custom);
    }

    #[test]
    fn test_actuator_fault_does_not_stop_other_channels() {
        let mailbox = PatternMailbox::new();
        let clock = ManualClock::default();
        let displays = leds(2);
        let (broken, healthy) = (displays[0].clone(), displays[1].clone());
        let mut engine = engine(&mailbox, &clock);
        engine.init(displays).unwrap();

        broken.broken.set(true);
        mailbox.set_preset(LedId::Led0, Preset::SteadyOn).unwrap();
        mailbox.set_preset(LedId::Led1, Preset::SteadyOn).unwrap();

        assert_eq!(engine.tick(), Ok(()));
        assert_eq!(healthy.level.get(), Level::On);
        assert_eq!(broken.level.get(), Level::Off);
        assert_eq!(engine.status(LedId::Led0), Ok(PatternStatus::Running));
    }

    #[test]
    fn test_deinit_twice_is_noop() {
        let mailbox = PatternMailbox::new();
        let clock = ManualClock::default();
        let led = FakeLed::default();
        let mut engine = engine(&mailbox, &clock);
        engine.init([led.clone()]).unwrap();

        mailbox.set_preset(LedId::Led0, Preset::SteadyOn).unwrap();
        engine.tick().unwrap();
        mailbox.set_preset(LedId::Led0, Preset::BlinkFast).unwrap();

        engine.deinit();
        assert!(!engine.is_initialized());
        assert!(!mailbox.is_open());
        assert_eq!(mailbox.pending(), 0);
        assert_eq!(led.level.get(), Level::Off);

        engine.deinit();
        assert_eq!(engine.tick(), Err(Error::InitStatus));

        engine.init([led]).unwrap();
        assert!(mailbox.is_open());
    }
}
