//! Scripted runs of the navigation manager over synthetic frames

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::{drive::VelocityCommand, infer::SteerModel, plate::PlateRecord};
use image::Rgb;
use ndarray::{arr1, Array1, Array2};

use super::*;
use crate::{
    evidence::EvidenceParams,
    vision::{HsvRange, IdReading, PlateReading},
};

// ------------------------------------------------------------------------------------------------
// FAKES
// ------------------------------------------------------------------------------------------------

#[derive(Default)]
struct FakePerception {
    action: Option<usize>,
    id: Option<&'static str>,
    plate: Option<&'static str>,
    models: Vec<SteerModel>,
}

impl Perception for FakePerception {
    fn steer(&mut self, _frame: &Frame, model: SteerModel) -> Option<Array1<f64>> {
        self.models.push(model);
        self.action.map(|a| {
            let mut probs = Array1::zeros(5);
            probs[a] = 1.0;
            probs
        })
    }

    fn read_id(&mut self, _frame: &Frame) -> Option<IdReading> {
        self.id.map(|id| IdReading {
            id: id.into(),
            probs: arr1(&[0.2, 0.8]),
        })
    }

    fn read_plate(&mut self, _frame: &Frame) -> Option<PlateReading> {
        self.plate.map(|plate| PlateReading {
            plate: plate.into(),
            probs: Array2::from_elem((4, 2), 0.5),
        })
    }
}

// ------------------------------------------------------------------------------------------------
// HELPERS
// ------------------------------------------------------------------------------------------------

const W: u32 = 100;
const H: u32 = 60;

fn tags() -> ResultTags {
    ResultTags {
        team: "TeamRed".into(),
        session: "multi21".into(),
    }
}

fn rec(id: &str, plate: &str) -> PlateRecord {
    PlateRecord::new("TeamRed", "multi21", id, plate)
}

fn gray(level: u8) -> Frame {
    Frame::from_pixel(W, H, Rgb([level, level, level]))
}

/// A frame mostly filled by a crosswalk line
fn crosswalk() -> Frame {
    let mut f = gray(100);
    for y in 0..H {
        for x in 0..70 {
            f.put_pixel(x, y, Rgb([220, 20, 20]));
        }
    }
    f
}

/// A frame with a thin level line on row 30
fn line_on_row_30() -> Frame {
    let mut f = gray(100);
    for y in 29..32 {
        for x in 10..90 {
            f.put_pixel(x, y, Rgb([220, 20, 20]));
        }
    }
    f
}

fn quick_params() -> NavMgrParams {
    let mut p = NavMgrParams::default();

    p.start_seq = StartSeqParams {
        wait_frames: 0,
        phases: vec![],
    };
    p.proximity.hold_frames = 1000;
    p.loop_gates = LoopGateParams {
        outer_min_time_s: 1.0,
        outer_min_crosswalk_visits: 2,
        inner_min_id_count: 2,
        inner_max_time_s: 100.0,
    };
    p.evidence = EvidenceParams {
        outer_ids: vec!["1".into(), "2".into(), "3".into()],
        inner_ids: vec!["7".into(), "8".into()],
    };
    p.crosswalk.crossing_frames = 2;
    p.pedestrian.gate.settle_time_s = 0.0;
    p.obstacle.gate.settle_time_s = 0.0;
    p.line_aligner.target_row_px = 30.0;
    p.line_aligner.segment.min_length_px = 50.0;
    p.turn_to_inner = ManoeuvrePhase::new(2, 0.0, 1.54);
    p.merge = MergeParams {
        phases: vec![ManoeuvrePhase::new(1, 1.0, 0.0)],
    };

    p
}

/// Simple clock for scripted runs
struct Clock(f64);

impl Clock {
    fn tick(&mut self) -> f64 {
        self.0 += 0.05;
        self.0
    }
}

/// Drive a manager with `quick_params` from the start to the inner loop.
///
/// Outer evidence is id 1 read as AB12 three times and XY99 once, and id 2 read as CD34 twice.
fn run_to_inner_drive(mgr: &mut NavMgr, fake: &mut FakePerception, clock: &mut Clock) {
    // Start record, then straight into the outer loop
    let out = mgr.step(&gray(100), clock.tick(), fake);
    assert_eq!(out.records, vec![rec("0", "AA00")]);
    assert_eq!(out.cmd, None);

    let out = mgr.step(&gray(100), clock.tick(), fake);
    assert_eq!(out.cmd, Some(VelocityCommand::stop()));
    assert!(matches!(mgr.state(), NavState::OuterDrive(_)));

    // Read plates while driving forwards slowly
    fake.action = Some(0);
    let readings = [
        ("1", "AB12"),
        ("1", "AB12"),
        ("1", "XY99"),
        ("1", "AB12"),
        ("2", "CD34"),
        ("2", "CD34"),
        ("7", "ZZ99"),
    ];
    for (id, plate) in readings.iter() {
        fake.id = Some(*id);
        fake.plate = Some(*plate);
        let out = mgr.step(&gray(100), clock.tick(), fake);
        assert_eq!(out.cmd, Some(VelocityCommand::new(0.07, 0.0)));
    }
    fake.id = None;
    fake.plate = None;

    // No classifier output, no command
    fake.action = None;
    let out = mgr.step(&gray(100), clock.tick(), fake);
    assert_eq!(out.cmd, None);
    fake.action = Some(0);

    // First crosswalk, too early to leave the loop
    let out = mgr.step(&crosswalk(), clock.tick(), fake);
    assert_eq!(out.cmd, Some(VelocityCommand::stop()));
    assert!(matches!(mgr.state(), NavState::CrosswalkStopped(_)));

    for level in [100, 100, 200].iter() {
        let out = mgr.step(&gray(*level), clock.tick(), fake);
        assert_eq!(out.cmd, Some(VelocityCommand::stop()));
        assert!(matches!(mgr.state(), NavState::CrosswalkStopped(_)));
    }
    assert_eq!(mgr.persistant.crosswalk_visits, 1);

    // Pedestrian has crossed
    mgr.step(&gray(200), clock.tick(), fake);
    assert!(matches!(mgr.state(), NavState::Crossing(_)));

    // Crossing ignores the crosswalk lines
    for _ in 0..2 {
        let out = mgr.step(&crosswalk(), clock.tick(), fake);
        assert_eq!(out.cmd, Some(VelocityCommand::new(0.4, 0.0)));
    }
    let out = mgr.step(&crosswalk(), clock.tick(), fake);
    assert_eq!(out.cmd, None);
    assert!(matches!(mgr.state(), NavState::OuterDrive(_)));

    // Second crosswalk after the minimum time completes the outer loop
    clock.0 = 5.0;
    mgr.step(&crosswalk(), clock.tick(), fake);
    assert!(matches!(mgr.state(), NavState::CrosswalkStopped(_)));
    let out = mgr.step(&gray(100), clock.tick(), fake);
    assert_eq!(out.cmd, Some(VelocityCommand::stop()));
    assert!(matches!(mgr.state(), NavState::FinalizeOuter(_)));

    // One id per frame, id 3 was never read
    let out = mgr.step(&gray(100), clock.tick(), fake);
    assert_eq!(out.records, vec![rec("1", "AB12")]);
    let out = mgr.step(&gray(100), clock.tick(), fake);
    assert_eq!(out.records, vec![rec("2", "CD34")]);
    let out = mgr.step(&gray(100), clock.tick(), fake);
    assert!(out.records.is_empty());
    assert!(matches!(mgr.state(), NavState::Straighten(_)));

    // No line, hold still
    let out = mgr.step(&gray(100), clock.tick(), fake);
    assert_eq!(out.cmd, Some(VelocityCommand::stop()));
    assert!(matches!(mgr.state(), NavState::Straighten(_)));

    mgr.step(&line_on_row_30(), clock.tick(), fake);
    assert!(matches!(mgr.state(), NavState::TurnToInner(_)));

    for _ in 0..2 {
        let out = mgr.step(&gray(100), clock.tick(), fake);
        assert_eq!(out.cmd, Some(VelocityCommand::new(0.0, 1.54)));
    }
    mgr.step(&gray(100), clock.tick(), fake);
    assert!(matches!(mgr.state(), NavState::WaitForGap(_)));

    // Obstacle passes in front
    for level in [100, 100, 200].iter() {
        let out = mgr.step(&gray(*level), clock.tick(), fake);
        assert_eq!(out.cmd, None);
        assert!(matches!(mgr.state(), NavState::WaitForGap(_)));
    }
    mgr.step(&gray(200), clock.tick(), fake);
    assert!(matches!(mgr.state(), NavState::MergeIntoInner(_)));

    let out = mgr.step(&gray(100), clock.tick(), fake);
    assert_eq!(out.cmd, Some(VelocityCommand::new(1.0, 0.0)));
    let out = mgr.step(&gray(100), clock.tick(), fake);
    assert_eq!(out.cmd, Some(VelocityCommand::stop()));
    assert!(matches!(mgr.state(), NavState::InnerDrive(_)));
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[test]
fn test_start_sequence() {
    let mut mgr = NavMgr::new(NavMgrParams::default(), tags(), 20.0, None);
    let mut fake = FakePerception::default();
    let frame = gray(100);

    for i in 0..10 {
        let out = mgr.step(&frame, i as f64 * 0.05, &mut fake);
        assert_eq!(out, NavOutput::default());
    }

    let out = mgr.step(&frame, 0.5, &mut fake);
    assert_eq!(out.records, vec![rec("0", "AA00")]);
    assert_eq!(out.cmd, None);

    for _ in 11..20 {
        let out = mgr.step(&frame, 1.0, &mut fake);
        assert_eq!(out.cmd, Some(VelocityCommand::new(0.7, 1.4)));
    }
    for _ in 20..26 {
        let out = mgr.step(&frame, 1.0, &mut fake);
        assert_eq!(out.cmd, Some(VelocityCommand::new(0.0, 2.8)));
    }

    let out = mgr.step(&frame, 1.5, &mut fake);
    assert_eq!(out.cmd, Some(VelocityCommand::stop()));
    assert!(matches!(mgr.state(), NavState::OuterDrive(_)));

    // The steering model is not consulted during the start sequence
    assert!(fake.models.is_empty());
}

#[test]
fn test_full_run() {
    let mut mgr = NavMgr::new(quick_params(), tags(), 20.0, None);
    let mut fake = FakePerception::default();
    let mut clock = Clock(0.0);

    run_to_inner_drive(&mut mgr, &mut fake, &mut clock);

    assert_eq!(mgr.persistant.evidence.id_count("1"), 4);
    assert_eq!(mgr.persistant.evidence.id_count("7"), 0);
    assert_eq!(mgr.persistant.evidence.result("1"), Some("AB12"));

    // Outer ids read on the inner loop are rejected
    fake.id = Some("3");
    fake.plate = Some("QQ11");
    let out = mgr.step(&gray(100), clock.tick(), &mut fake);
    assert_eq!(out.cmd, Some(VelocityCommand::new(0.35, 0.0)));
    assert_eq!(mgr.persistant.evidence.id_count("3"), 0);
    assert_eq!(fake.models.last(), Some(&SteerModel::Inner));

    fake.id = Some("7");
    fake.plate = Some("GH56");
    mgr.step(&gray(100), clock.tick(), &mut fake);
    mgr.step(&gray(100), clock.tick(), &mut fake);
    assert!(matches!(mgr.state(), NavState::InnerDrive(_)));

    fake.id = Some("8");
    fake.plate = Some("JK78");
    mgr.step(&gray(100), clock.tick(), &mut fake);
    let out = mgr.step(&gray(100), clock.tick(), &mut fake);
    assert_eq!(out.cmd, Some(VelocityCommand::stop()));
    assert!(matches!(mgr.state(), NavState::FinalizeInner(_)));

    let out = mgr.step(&gray(100), clock.tick(), &mut fake);
    assert_eq!(out.records, vec![rec("7", "GH56")]);
    let out = mgr.step(&gray(100), clock.tick(), &mut fake);
    assert_eq!(out.records, vec![rec("8", "JK78")]);
    mgr.step(&gray(100), clock.tick(), &mut fake);
    assert!(mgr.is_done());

    for _ in 0..3 {
        let out = mgr.step(&gray(100), clock.tick(), &mut fake);
        assert_eq!(out.cmd, Some(VelocityCommand::stop()));
        assert_eq!(out.records, vec![rec("-1", "AA00")]);
    }

    assert_eq!(mgr.persistant.evidence.results().len(), 4);
}

#[test]
fn test_inner_time_ceiling() {
    let mut mgr = NavMgr::new(quick_params(), tags(), 20.0, None);
    let mut fake = FakePerception::default();
    let mut clock = Clock(0.0);

    run_to_inner_drive(&mut mgr, &mut fake, &mut clock);

    // Nothing read on the inner loop
    for _ in 0..5 {
        mgr.step(&gray(100), clock.tick(), &mut fake);
        assert!(matches!(mgr.state(), NavState::InnerDrive(_)));
    }

    clock.0 = 200.0;
    mgr.step(&gray(100), clock.tick(), &mut fake);
    assert!(matches!(mgr.state(), NavState::FinalizeInner(_)));

    // Nothing to report, straight to done
    let out = mgr.step(&gray(100), clock.tick(), &mut fake);
    assert!(out.records.is_empty());
    assert!(mgr.is_done());
}

#[test]
fn test_degenerate_frames() {
    let mut p = quick_params();
    p.loop_gates.outer_min_crosswalk_visits = 10;
    let mut mgr = NavMgr::new(p, tags(), 20.0, None);
    let mut fake = FakePerception {
        action: Some(3),
        ..Default::default()
    };
    let mut clock = Clock(0.0);

    let empty = Frame::new(0, 0);
    let sliver = Frame::new(1, 1);

    for _ in 0..5 {
        mgr.step(&empty, clock.tick(), &mut fake);
        mgr.step(&sliver, clock.tick(), &mut fake);
    }
    assert!(matches!(mgr.state(), NavState::OuterDrive(_)));

    mgr.step(&crosswalk(), clock.tick(), &mut fake);
    for _ in 0..5 {
        let out = mgr.step(&empty, clock.tick(), &mut fake);
        assert_eq!(out.cmd, Some(VelocityCommand::stop()));
        mgr.step(&sliver, clock.tick(), &mut fake);
    }
    assert!(matches!(mgr.state(), NavState::CrosswalkStopped(_)));
}

#[test]
fn test_shipped_params() {
    let params: NavMgrParams =
        util::params::from_str(include_str!("../../../params/nav_mgr.toml")).unwrap();

    assert_eq!(params.start_seq.phases.len(), 2);
    assert_eq!(params.merge.phases.len(), 3);
    assert_eq!(params.turn_to_inner.frames, 20);
    assert_eq!(params.evidence.outer_ids.len(), 7);
    assert_eq!(params.evidence.outer_ids, NavMgrParams::default().evidence.outer_ids);
    assert_eq!(params.evidence.inner_ids, vec!["7", "8"]);
    assert_eq!(params.proximity.colour, HsvRange::BLUE);
    assert_eq!(params.crosswalk.colour, HsvRange::RED);
    assert!(params.obstacle.gate.high_threshold > params.pedestrian.gate.high_threshold);
    assert_eq!(params.results.end_id, "-1");
}

#[test]
fn test_outer_gate_while_stopped() {
    let mut p = quick_params();
    p.loop_gates.outer_min_time_s = 2.0;
    p.loop_gates.outer_min_crosswalk_visits = 1;
    let mut mgr = NavMgr::new(p, tags(), 20.0, None);
    let mut fake = FakePerception::default();
    let mut clock = Clock(0.0);

    mgr.step(&gray(100), clock.tick(), &mut fake);
    mgr.step(&gray(100), clock.tick(), &mut fake);
    mgr.step(&crosswalk(), clock.tick(), &mut fake);
    assert!(matches!(mgr.state(), NavState::CrosswalkStopped(_)));

    // Enough visits but too early, and no pedestrian ever crosses
    for _ in 0..5 {
        let out = mgr.step(&gray(100), clock.tick(), &mut fake);
        assert_eq!(out.cmd, Some(VelocityCommand::stop()));
        assert!(matches!(mgr.state(), NavState::CrosswalkStopped(_)));
    }
    assert_eq!(mgr.persistant.crosswalk_visits, 1);

    // The minimum time passes during the same stop
    clock.0 = 10.0;
    let out = mgr.step(&gray(100), clock.tick(), &mut fake);
    assert_eq!(out.cmd, Some(VelocityCommand::stop()));
    assert!(matches!(mgr.state(), NavState::FinalizeOuter(_)));
    assert_eq!(mgr.persistant.crosswalk_visits, 1);
}

#[test]
fn test_crossing_reads_plates() {
    let p = quick_params();
    let crossing_speed = p.crosswalk.crossing_speed_ms;
    let slow_turn = p.motion_policy.outer_slow_angular_rads;
    let mut mgr = NavMgr::new(p, tags(), 20.0, None);
    let mut fake = FakePerception {
        action: Some(4),
        ..Default::default()
    };
    let mut clock = Clock(0.0);

    mgr.step(&gray(100), clock.tick(), &mut fake);
    mgr.step(&gray(100), clock.tick(), &mut fake);
    mgr.step(&crosswalk(), clock.tick(), &mut fake);
    for level in [100, 100, 200, 200].iter() {
        mgr.step(&gray(*level), clock.tick(), &mut fake);
    }
    assert!(matches!(mgr.state(), NavState::Crossing(_)));
    assert_eq!(mgr.persistant.evidence.id_count("1"), 0);

    // Plates in view are still read, and the turn is damped by the slow zone
    fake.id = Some("1");
    fake.plate = Some("AB12");
    for _ in 0..2 {
        let out = mgr.step(&crosswalk(), clock.tick(), &mut fake);
        assert_eq!(out.cmd, Some(VelocityCommand::new(crossing_speed, slow_turn)));
        assert!(matches!(mgr.state(), NavState::Crossing(_)));
    }
    assert_eq!(mgr.persistant.evidence.id_count("1"), 2);

    mgr.step(&crosswalk(), clock.tick(), &mut fake);
    assert!(matches!(mgr.state(), NavState::OuterDrive(_)));
    assert_eq!(mgr.persistant.evidence.id_count("1"), 2);
}
