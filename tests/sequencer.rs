mod tests {
    use embassy_time::{Duration, Instant};
    use quntis_light::{
        CommandSequencer, LadderState, RemoteLightConfig, SequencerState, StepCommand,
        TargetState,
    };

    const ADDRESS: [u8; 5] = [0x20, 0x21, 0x01, 0x31, 0xAA];
    const STEP_MS: u64 = 50;

    fn config(brightness_steps: u8, color_temp_steps: u8) -> RemoteLightConfig {
        let mut config = RemoteLightConfig::new(ADDRESS);
        config.brightness_steps = brightness_steps;
        config.color_temp_steps = color_temp_steps;
        config.step_delay = Duration::from_millis(STEP_MS);
        config
    }

    fn sequencer_at(state: LadderState) -> CommandSequencer {
        let mut config = config(75, 30);
        config.initial_state = state;
        CommandSequencer::new(&config)
    }

    /// Release everything, one press per step delay, and return the next free instant
    fn drain(sequencer: &mut CommandSequencer, start: Instant) -> (Vec<StepCommand>, Instant) {
        let mut now = start;
        let mut sent = Vec::new();
        while !sequencer.is_idle() {
            if let Some(command) = sequencer.poll(now) {
                sent.push(command);
            }
            now += Duration::from_millis(STEP_MS);
        }
        (sent, now)
    }

    #[test]
    fn test_full_sweep_down_after_full_sweep_up() {
        for steps in [1u8, 2, 30, 75, 255] {
            let mut sequencer = CommandSequencer::new(&config(steps, 30));
            sequencer.submit(&TargetState::power(true).with_brightness(1.0));
            let (_, now) = drain(&mut sequencer, Instant::from_millis(0));

            sequencer.submit(&TargetState::power(true).with_brightness(0.0));
            let pending = sequencer.pending();
            assert_eq!(
                pending.count_of(StepCommand::BrightnessDown),
                usize::from(steps - 1)
            );
            assert_eq!(pending.count_of(StepCommand::BrightnessUp), 0);
            assert_eq!(pending.len(), usize::from(steps - 1));

            drain(&mut sequencer, now);
            assert_eq!(sequencer.state().brightness_index, 0);
        }
    }

    #[test]
    fn test_same_target_twice_is_idempotent() {
        let mut sequencer = CommandSequencer::new(&config(75, 30));
        let target = TargetState::power(true)
            .with_brightness(0.6)
            .with_color_temp(420.0);

        assert!(sequencer.submit(&target) > 0);
        drain(&mut sequencer, Instant::from_millis(0));

        assert_eq!(sequencer.submit(&target), 0);
        assert_eq!(sequencer.sequencer_state(), SequencerState::Idle);
    }

    #[test]
    fn test_tracking_matches_resolver_after_drain() {
        let mut sequencer = CommandSequencer::new(&config(75, 30));
        let mut now = Instant::from_millis(0);
        for (brightness, mireds) in [(0.25, 200.0), (0.9, 480.0), (0.5, 153.0), (0.0, 326.5)] {
            sequencer.submit(
                &TargetState::power(true)
                    .with_brightness(brightness)
                    .with_color_temp(mireds),
            );
            (_, now) = drain(&mut sequencer, now);

            let resolver = sequencer.resolver();
            assert_eq!(
                sequencer.state().brightness_index,
                resolver.brightness_index(brightness)
            );
            assert_eq!(
                sequencer.state().color_temp_index,
                resolver.color_temp_index(mireds)
            );
        }
    }

    #[test]
    fn test_cadence_one_press_per_step_delay() {
        let mut sequencer = sequencer_at(LadderState::new(true, 0, 0));
        sequencer.submit(&TargetState::power(true).with_brightness(5.0 / 74.0));
        assert_eq!(sequencer.pending().len(), 5);

        // First press goes out immediately
        assert_eq!(
            sequencer.poll(Instant::from_millis(1000)),
            Some(StepCommand::BrightnessUp)
        );
        assert_eq!(sequencer.poll(Instant::from_millis(1000)), None);
        assert_eq!(sequencer.poll(Instant::from_millis(1049)), None);
        assert_eq!(
            sequencer.poll(Instant::from_millis(1050)),
            Some(StepCommand::BrightnessUp)
        );

        // A long stall releases a single press, no catch-up burst
        assert_eq!(
            sequencer.poll(Instant::from_millis(5000)),
            Some(StepCommand::BrightnessUp)
        );
        assert_eq!(sequencer.poll(Instant::from_millis(5000)), None);
        assert_eq!(sequencer.poll(Instant::from_millis(5020)), None);
        assert_eq!(sequencer.pending().len(), 2);
    }

    #[test]
    fn test_time_until_next() {
        let mut sequencer = sequencer_at(LadderState::new(true, 0, 0));
        let now = Instant::from_millis(200);
        assert_eq!(sequencer.time_until_next(now), None);

        sequencer.submit(&TargetState::power(true).with_brightness(1.0));
        assert_eq!(sequencer.time_until_next(now), Some(Duration::from_millis(0)));

        sequencer.poll(now);
        assert_eq!(
            sequencer.time_until_next(now),
            Some(Duration::from_millis(STEP_MS))
        );
        assert_eq!(
            sequencer.time_until_next(Instant::from_millis(230)),
            Some(Duration::from_millis(20))
        );
        assert_eq!(
            sequencer.time_until_next(Instant::from_millis(900)),
            Some(Duration::from_millis(0))
        );
    }

    #[test]
    fn test_interrupted_transition_starts_from_advanced_estimate() {
        let mut sequencer = sequencer_at(LadderState::new(true, 0, 0));
        sequencer.submit(&TargetState::power(true).with_brightness(10.0 / 74.0));
        assert_eq!(sequencer.pending().len(), 10);

        for i in 0..4 {
            assert!(sequencer.poll(Instant::from_millis(i * STEP_MS)).is_some());
        }
        assert_eq!(sequencer.state().brightness_index, 4);

        sequencer.submit(&TargetState::power(true).with_brightness(20.0 / 74.0));
        assert_eq!(sequencer.pending().len(), 16);
        assert_eq!(sequencer.pending().count_of(StepCommand::BrightnessUp), 16);

        sequencer.submit(&TargetState::power(true).with_brightness(2.0 / 74.0));
        assert_eq!(sequencer.pending().len(), 2);
        assert_eq!(sequencer.pending().count_of(StepCommand::BrightnessDown), 2);
    }

    #[test]
    fn test_power_change_only_queues_single_press() {
        let mut sequencer = sequencer_at(LadderState::new(true, 40, 12));
        assert_eq!(sequencer.submit(&TargetState::power(false)), 1);
        assert_eq!(sequencer.pending().front(), Some(StepCommand::PowerOff));
        // Optimistic right away
        assert!(!sequencer.state().power_on);

        let (sent, now) = drain(&mut sequencer, Instant::from_millis(0));
        assert_eq!(sent, [StepCommand::PowerOff]);

        assert_eq!(sequencer.submit(&TargetState::power(true)), 1);
        let (sent, _) = drain(&mut sequencer, now);
        assert_eq!(sent, [StepCommand::PowerOn]);
        assert_eq!(*sequencer.state(), LadderState::new(true, 40, 12));
    }

    #[test]
    fn test_steps_are_skipped_while_off() {
        let mut sequencer = sequencer_at(LadderState::new(false, 10, 10));
        let target = TargetState::power(false)
            .with_brightness(1.0)
            .with_color_temp(500.0);
        assert_eq!(sequencer.submit(&target), 0);
        assert_eq!(*sequencer.state(), LadderState::new(false, 10, 10));
    }

    #[test]
    fn test_queue_order_power_brightness_color() {
        let mut sequencer = sequencer_at(LadderState::new(false, 2, 3));
        sequencer.submit(
            &TargetState::power(true)
                .with_brightness(0.0)
                .with_color_temp(153.0 + 347.0 * 5.0 / 29.0),
        );
        let queued: Vec<_> = sequencer.pending().iter().collect();
        assert_eq!(
            queued,
            [
                StepCommand::PowerOn,
                StepCommand::BrightnessDown,
                StepCommand::BrightnessDown,
                StepCommand::ColorWarmer,
                StepCommand::ColorWarmer,
            ]
        );
    }

    #[test]
    fn test_color_temp_direction() {
        let mut sequencer = sequencer_at(LadderState::new(true, 0, 0));
        sequencer.submit(&TargetState::power(true).with_color_temp(500.0));
        assert_eq!(sequencer.pending().count_of(StepCommand::ColorWarmer), 29);

        let (_, now) = drain(&mut sequencer, Instant::from_millis(0));
        assert_eq!(sequencer.state().color_temp_index, 29);

        sequencer.submit(&TargetState::power(true).with_color_temp(153.0));
        assert_eq!(sequencer.pending().count_of(StepCommand::ColorCooler), 29);
        drain(&mut sequencer, now);
        assert_eq!(sequencer.state().color_temp_index, 0);
    }

    #[test]
    fn test_single_rung_ladders_never_step() {
        let mut config = config(1, 1);
        config.initial_state = LadderState::new(true, 0, 0);
        let mut sequencer = CommandSequencer::new(&config);
        let target = TargetState::power(true)
            .with_brightness(1.0)
            .with_color_temp(500.0);
        assert_eq!(sequencer.submit(&target), 0);
    }

    #[test]
    fn test_preempted_power_press_is_rolled_back() {
        let mut sequencer = sequencer_at(LadderState::new(false, 0, 0));
        assert_eq!(sequencer.submit(&TargetState::power(true)), 1);
        assert!(sequencer.state().power_on);

        // The toggle never went out, so turning off again needs no press
        assert_eq!(sequencer.submit(&TargetState::power(false)), 0);
        assert!(!sequencer.state().power_on);
    }

    #[test]
    fn test_sent_power_press_is_kept_on_preemption() {
        let mut sequencer = sequencer_at(LadderState::new(false, 0, 0));
        sequencer.submit(&TargetState::power(true).with_brightness(1.0));
        assert_eq!(
            sequencer.poll(Instant::from_millis(0)),
            Some(StepCommand::PowerOn)
        );

        assert_eq!(sequencer.submit(&TargetState::power(false)), 1);
        assert_eq!(sequencer.pending().front(), Some(StepCommand::PowerOff));
    }

    #[test]
    fn test_resync_sweeps_to_known_extremes() {
        let mut config = config(10, 5);
        config.initial_state = LadderState::new(false, 3, 2);
        let mut sequencer = CommandSequencer::new(&config);

        assert!(sequencer.resync());
        assert!(sequencer.is_calibrating());
        assert!(!sequencer.resync());
        assert_eq!(sequencer.pending().len(), 15);
        assert_eq!(sequencer.pending().count_of(StepCommand::BrightnessDown), 10);
        assert_eq!(sequencer.pending().count_of(StepCommand::ColorCooler), 5);

        let (sent, _) = drain(&mut sequencer, Instant::from_millis(0));
        assert_eq!(sent.len(), 15);
        assert!(!sequencer.is_calibrating());
        assert_eq!(*sequencer.state(), LadderState::new(true, 0, 0));
    }

    #[test]
    fn test_target_preempts_resync() {
        let mut sequencer = sequencer_at(LadderState::new(true, 0, 0));
        sequencer.resync();
        sequencer.poll(Instant::from_millis(0));

        sequencer.submit(&TargetState::power(true).with_brightness(1.0));
        assert!(!sequencer.is_calibrating());
        assert_eq!(sequencer.pending().count_of(StepCommand::BrightnessDown), 0);
        assert_eq!(sequencer.pending().count_of(StepCommand::BrightnessUp), 1);
    }

    #[test]
    fn test_restore_sends_nothing() {
        let mut sequencer = sequencer_at(LadderState::new(false, 0, 0));
        sequencer.submit(&TargetState::power(true).with_brightness(0.5));

        let restored = sequencer.restore(
            &TargetState::power(true)
                .with_brightness(1.0)
                .with_color_temp(500.0),
        );
        assert_eq!(restored, LadderState::new(true, 74, 29));
        assert!(sequencer.is_idle());
        assert_eq!(sequencer.poll(Instant::from_millis(0)), None);
    }

    #[test]
    fn test_override_power() {
        let mut sequencer = sequencer_at(LadderState::new(true, 5, 5));
        sequencer.override_power(false);
        assert!(!sequencer.state().power_on);
        assert!(sequencer.is_idle());
    }

    #[test]
    fn test_override_drops_queued_power_press() {
        let mut sequencer = sequencer_at(LadderState::new(false, 0, 0));
        assert_eq!(sequencer.submit(&TargetState::power(true)), 1);

        sequencer.override_power(true);
        assert!(sequencer.is_idle());

        // The lamp is known to be on, so only brightness steps are queued
        assert_eq!(
            sequencer.submit(&TargetState::power(true).with_brightness(0.5)),
            37
        );
        assert!(sequencer.state().power_on);
        assert_eq!(sequencer.pending().count_of(StepCommand::PowerOn), 0);
        assert_eq!(
            sequencer.pending().front(),
            Some(StepCommand::BrightnessUp)
        );
    }

    #[test]
    fn test_override_keeps_queued_steps_while_on() {
        let mut sequencer = sequencer_at(LadderState::new(false, 0, 0));
        sequencer.submit(&TargetState::power(true).with_brightness(1.0));

        sequencer.override_power(true);
        assert_eq!(sequencer.queued(), 74);
        assert_eq!(sequencer.pending().count_of(StepCommand::PowerOn), 0);

        let (sent, _) = drain(&mut sequencer, Instant::from_millis(0));
        assert!(sent.iter().all(|command| !command.is_power()));
        assert_eq!(*sequencer.state(), LadderState::new(true, 74, 0));
    }

    #[test]
    fn test_override_off_drops_pending_presses() {
        let mut sequencer = sequencer_at(LadderState::new(false, 0, 0));
        sequencer.submit(&TargetState::power(true).with_brightness(1.0));

        sequencer.override_power(false);
        assert!(sequencer.is_idle());
        assert!(!sequencer.state().power_on);

        // Nothing left to roll back, turning on queues a fresh press
        assert_eq!(sequencer.submit(&TargetState::power(true)), 1);
        assert_eq!(sequencer.pending().front(), Some(StepCommand::PowerOn));
    }

    #[test]
    fn test_initial_state_is_clamped() {
        let mut config = config(10, 10);
        config.initial_state = LadderState::new(true, 200, 200);
        let sequencer = CommandSequencer::new(&config);
        assert_eq!(*sequencer.state(), LadderState::new(true, 9, 9));
    }
}
