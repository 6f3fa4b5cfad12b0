mod common;

mod tests {
    use rlic::qtable::QTable;
    use rlic::{
        Action, Controller, ControllerConfig, ControllerParts, DayBoundary, Error, Instant,
        LearningConfig, Recovery, StorageFault,
    };

    use super::common::{MemoryStorage, RecordingDriver, ScriptedSensor};

    struct Rig {
        storage: MemoryStorage,
        sensor: ScriptedSensor,
        chain: RecordingDriver,
    }

    impl Rig {
        fn new(lux: u16) -> Self {
            Self {
                storage: MemoryStorage::new(1000),
                sensor: ScriptedSensor::constant(lux),
                chain: RecordingDriver::new(),
            }
        }

        fn controller<'a>(
            &self,
            boundary: &'a DayBoundary,
            config: &ControllerConfig,
        ) -> Controller<'a, MemoryStorage, ScriptedSensor, RecordingDriver> {
            let parts = ControllerParts {
                storage: self.storage.clone(),
                sensor: self.sensor.clone(),
                learning_chain: self.chain.clone(),
            };
            Controller::new(parts, boundary, config, &mut Some(7u32))
        }
    }

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn test_first_iteration_exploits_empty_table() {
        let rig = Rig::new(0);
        rig.sensor.push(&[0, 4500]);
        let boundary = DayBoundary::new();
        let mut controller = rig.controller(&boundary, &ControllerConfig::default());
        controller.start().unwrap();

        let report = controller.run_iteration(at(5000)).unwrap();

        assert_eq!(report.day_time.as_millis(), 0);
        assert_eq!(report.slot.index(), 0);
        assert_eq!(report.action, Action::OFF);
        assert!(!report.explored);
        assert_eq!(report.lux, 4500);
        assert_eq!(report.reward, 10);
        assert_eq!(rig.sensor.reads(), 2);
        assert_eq!(rig.storage.table(0).estimate(Action::OFF), 5);
        assert!(!boundary.is_pending());
    }

    #[test]
    fn test_report_line() {
        let rig = Rig::new(4500);
        let boundary = DayBoundary::new();
        let mut controller = rig.controller(&boundary, &ControllerConfig::default());
        controller.start().unwrap();

        let report = controller.run_iteration(at(0)).unwrap();

        assert_eq!(
            report.line().as_str(),
            "[0 ms] [0] numOnLeds: 0 duty: 0 Lum: 4500 reward: 10 [EXPLOIT]"
        );
    }

    #[test]
    fn test_day_clock_selects_slot() {
        let rig = Rig::new(4500);
        let boundary = DayBoundary::new();
        let mut controller = rig.controller(&boundary, &ControllerConfig::default());
        controller.start().unwrap();

        controller.run_iteration(at(5000)).unwrap();
        let report = controller.run_iteration(at(12_000)).unwrap();

        assert_eq!(report.day_time.as_millis(), 7000);
        assert_eq!(report.slot.index(), 14);
        assert_eq!(rig.storage.table(14).estimate(Action::OFF), 5);
    }

    #[test]
    fn test_day_boundary_restarts_clock() {
        let rig = Rig::new(4500);
        let boundary = DayBoundary::new();
        let mut controller = rig.controller(&boundary, &ControllerConfig::default());
        controller.start().unwrap();

        controller.run_iteration(at(1000)).unwrap();
        assert_eq!(controller.run_iteration(at(3000)).unwrap().slot.index(), 4);

        boundary.raise();
        let report = controller.run_iteration(at(9000)).unwrap();
        assert_eq!(report.day_time.as_millis(), 0);
        assert_eq!(report.slot.index(), 0);
        assert!(!boundary.is_pending());

        let report = controller.run_iteration(at(9600)).unwrap();
        assert_eq!(report.slot.index(), 1);
    }

    #[test]
    fn test_clock_before_day_start_counts_as_zero() {
        let rig = Rig::new(4500);
        let boundary = DayBoundary::new();
        let mut controller = rig.controller(&boundary, &ControllerConfig::default());
        controller.start().unwrap();
        controller.run_iteration(at(2000)).unwrap();

        assert_eq!(controller.day_time(at(1000)).as_millis(), 0);
    }

    #[test]
    fn test_learned_action_drives_chain() {
        let rig = Rig::new(4500);
        let mut table = QTable::new();
        table.set_estimate(Action::new(20, 3), 9);
        rig.storage.put_table(0, &table);

        let boundary = DayBoundary::new();
        let mut controller = rig.controller(&boundary, &ControllerConfig::default());
        controller.start().unwrap();
        let report = controller.run_iteration(at(0)).unwrap();

        assert_eq!(report.action, Action::new(20, 3));
        assert_eq!(report.applied, Action::new(20, 3));
        let chain = rig.chain.state();
        assert_eq!(chain.lit_count(), 20);
        assert_eq!(chain.dimming, 3);
        assert_eq!(controller.actuator().applied(), Action::new(20, 3));
    }

    #[test]
    fn test_poor_reward_prunes_action() {
        let rig = Rig::new(0);
        let boundary = DayBoundary::new();
        let mut controller = rig.controller(&boundary, &ControllerConfig::default());
        controller.start().unwrap();

        for _ in 0..3 {
            boundary.raise();
            let report = controller.run_iteration(at(0)).unwrap();
            assert_eq!(report.reward, 0);
        }
        assert!(rig.storage.table(0).is_pruned(Action::OFF));

        boundary.raise();
        let report = controller.run_iteration(at(0)).unwrap();
        assert!(report.explored);
        assert_ne!(report.action, Action::OFF);
    }

    #[test]
    fn test_always_explore_config() {
        let rig = Rig::new(4500);
        let boundary = DayBoundary::new();
        let config = ControllerConfig {
            learning: LearningConfig {
                explore_percent: 100,
                ..LearningConfig::default()
            },
            sensor_samples: 1,
        };
        let mut controller = rig.controller(&boundary, &config);
        controller.start().unwrap();

        for step in 0..10 {
            let report = controller.run_iteration(at(step * 500)).unwrap();
            assert!(report.explored);
            assert!(report.line().ends_with("[EXPLORE]"));
        }
        assert_eq!(rig.sensor.reads(), 10);
    }

    #[test]
    fn test_write_failure_shuts_storage_down() {
        let rig = Rig::new(4500);
        let boundary = DayBoundary::new();
        let mut controller = rig.controller(&boundary, &ControllerConfig::default());
        controller.start().unwrap();
        rig.storage.state_mut().fail_write = true;

        let error = controller.run_iteration(at(0)).unwrap_err();
        assert_eq!(error, Error::StorageIo(StorageFault::Write));

        assert_eq!(controller.escalate(error), Recovery::ShutdownAndReset);
        let storage = rig.storage.state();
        assert!(!storage.opened);
        assert_eq!(storage.closes, 1);
    }

    #[test]
    fn test_close_failure_still_requests_reset() {
        let rig = Rig::new(4500);
        let boundary = DayBoundary::new();
        let mut controller = rig.controller(&boundary, &ControllerConfig::default());
        controller.start().unwrap();
        {
            let mut storage = rig.storage.state_mut();
            storage.fail_write = true;
            storage.fail_close = true;
        }

        let error = controller.run_iteration(at(0)).unwrap_err();

        assert_eq!(controller.escalate(error), Recovery::ShutdownAndReset);
        assert_eq!(rig.storage.state().closes, 1);
        assert!(!controller.learning().store().is_open());
        assert_eq!(
            controller.shutdown(),
            Ok(()),
            "store is already marked closed"
        );
        assert_eq!(rig.storage.state().closes, 1);
    }

    #[test]
    fn test_mount_failure_aborts_startup() {
        let rig = Rig::new(4500);
        rig.storage.state_mut().fail_mount = true;
        let boundary = DayBoundary::new();
        let mut controller = rig.controller(&boundary, &ControllerConfig::default());

        let error = controller.start().unwrap_err();
        assert_eq!(error, Error::StorageUnavailable(StorageFault::Mount));

        assert_eq!(controller.escalate(error), Recovery::AbortStartup);
        assert_eq!(rig.storage.state().closes, 0);
    }

    #[test]
    fn test_start_switches_learning_chain_dark() {
        let rig = Rig::new(4500);
        let boundary = DayBoundary::new();
        let mut controller = rig.controller(&boundary, &ControllerConfig::default());

        controller.start().unwrap();

        let chain = rig.chain.state();
        assert_eq!(chain.lit_count(), 0);
        assert_eq!(chain.dimming, 0);
        assert_eq!(chain.ops.len(), 18);
    }
}
