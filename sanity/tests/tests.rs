use sanity::*;
use fixfit::*;

fn reference_log(sizes: Vec<KiloBytes>) -> RunLog {
    let jobs = ExplicitSizes(sizes).read_jobs().unwrap();
    Simulation::new(Allocator::from_layout(&reference_layout()).unwrap())
        .run(&jobs)
        .unwrap()
}

fn chosen(log: &RunLog) -> Vec<Option<usize>> {
    log.steps
        .iter()
        .map(|s| match s.placement.verdict {
            Verdict::Placed { index, .. }   => { Some(index) },
            Verdict::NoFit                  => { None }
        })
        .collect()
}

#[test]
fn reference_rule_by_hand() {
    assert_eq!(reference_first_fit(&[1000, 500, 4000, 6000, 7000], 5000), Some(3));
    assert_eq!(reference_first_fit(&[0, 0, 0], 1), None);
    assert_eq!(
        replay(&[3000, 5000, 4000, 6000, 7000], &[2000, 4500, 5000, 8000]),
        vec![Some(0), Some(1), Some(3), None]
    );
}

#[test]
fn seeded_reference_runs_agree() {
    let layout = reference_layout();
    for seed in 0..64 {
        let outcome = run_seeded(&layout, REFERENCE_JOBS, REFERENCE_MIN..=REFERENCE_MAX, seed).unwrap();
        assert_eq!(outcome.verdict, Ok(()), "seed {}", seed);
        let sizes = sizes_of(&outcome.log);
        assert_eq!(sizes.len(), REFERENCE_JOBS);
        assert_eq!(chosen(&outcome.log), replay(&capacities_of(&layout), &sizes), "seed {}", seed);
    }
}

#[test]
fn long_runs_agree_on_odd_layouts() {
    let layout = vec![
        PartitionSpec::new("a", 1),
        PartitionSpec::new("b", 12000),
        PartitionSpec::new("c", 250),
        PartitionSpec::new("d", 8000),
    ];
    for seed in 100..116 {
        let outcome = run_seeded(&layout, 40, 1..=2500, seed).unwrap();
        assert!(outcome.verdict.is_ok(), "seed {}: {:?}", seed, outcome.verdict);
    }
}

#[test]
fn wrong_partition_is_caught() {
    let mut log = reference_log(vec![2000, 4500]);
    log.steps[1].placement.verdict = Verdict::Placed { index: 3, partition: "P4".into() };
    assert!(matches!(
        verify_log(&log),
        Err(Discrepancy::WrongPartition { step: 1, expected: Some(1), got: Some(3), .. })
    ));

    let mut log = reference_log(vec![2000, 9000]);
    log.steps[1].placement.verdict = Verdict::Placed { index: 4, partition: "P5".into() };
    assert!(matches!(verify_log(&log), Err(Discrepancy::WrongPartition { expected: None, .. })));
}

#[test]
fn mislabelled_partition_is_caught() {
    let mut log = reference_log(vec![2000]);
    log.steps[0].placement.verdict = Verdict::Placed { index: 0, partition: "P2".into() };
    assert!(matches!(verify_log(&log), Err(Discrepancy::WrongPartition { step: 0, .. })));
}

#[test]
fn missing_skip_is_caught() {
    let mut log = reference_log(vec![2000, 4500]);
    log.steps[1].placement.skipped.clear();
    assert!(matches!(verify_log(&log), Err(Discrepancy::WrongSkips { step: 1, .. })));
}

#[test]
fn wrong_usage_is_caught() {
    let mut log = reference_log(vec![2000, 4500]);
    log.steps[0].after[0].used = 1999;
    assert!(matches!(verify_log(&log), Err(Discrepancy::WrongUsage { step: 0, .. })));

    let mut log = reference_log(vec![2000]);
    log.steps[0].after.pop();
    assert!(matches!(verify_log(&log), Err(Discrepancy::WrongShape { expected: 5, got: 4, .. })));

    let mut log = reference_log(vec![]);
    log.layout.clear();
    assert_eq!(verify_log(&log), Err(Discrepancy::EmptyLayout));
}

#[test]
fn honest_logs_verify() {
    let log = reference_log(vec![2000, 4500, 5000, 6500, 1000, 7000]);
    assert_eq!(verify_log(&log), Ok(()));
    let back: RunLog = serde_json::from_str(&serde_json::to_string(&log).unwrap()).unwrap();
    assert_eq!(verify_log(&back), Ok(()));
}

#[test]
fn sweep_report_adds_up() {
    let layout = reference_layout();
    let mut outcomes: Vec<RunOutcome> = (0..10)
        .map(|s| run_seeded(&layout, REFERENCE_JOBS, REFERENCE_MIN..=REFERENCE_MAX, s).unwrap())
        .collect();
    outcomes[3].verdict = Err(Discrepancy::EmptyLayout);
    let report = SweepReport::collect(outcomes);
    assert_eq!(report.runs, 10);
    assert_eq!(report.verified, 9);
    assert_eq!(report.jobs_placed + report.jobs_rejected, 10 * REFERENCE_JOBS);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, 3);
    assert!(report.mean_utilization > 0.0 && report.mean_utilization <= 100.0);
}

#[test]
fn impossible_layouts_are_rejected() {
    let mut log = reference_log(vec![2000]);
    log.layout[2] = PartitionSnapshot { id: "P3".into(), capacity: 0, used: 0, free: 0 };
    assert!(matches!(verify_log(&log), Err(Discrepancy::InvalidLayout(_))));

    let mut log = reference_log(vec![2000]);
    log.layout[1].id = "P1".into();
    assert!(matches!(verify_log(&log), Err(Discrepancy::InvalidLayout(_))));

    let huge = |id: &str| PartitionSnapshot {
        id:         id.into(),
        capacity:   KiloBytes::MAX,
        used:       0,
        free:       KiloBytes::MAX,
    };
    let log = RunLog { layout: vec![huge("a"), huge("b")], steps: vec![] };
    assert!(matches!(verify_log(&log), Err(Discrepancy::InvalidLayout(_))));
}

#[test]
fn zero_sized_jobs_never_reach_the_checker() {
    let log = reference_log(vec![2000]);
    let text = serde_json::to_string(&log).unwrap();
    // Pretend job 1 asked for nothing and P1 was never charged.
    let forged = text
        .replace("\"size\":2000", "\"size\":0")
        .replacen("\"used\":2000,\"free\":1000", "\"used\":0,\"free\":3000", 1);
    assert!(serde_json::from_str::<RunLog>(&forged).is_err());
}
