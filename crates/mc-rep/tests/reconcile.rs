//! End-to-end reconciliation scenarios.

use std::collections::BTreeMap;

use mc_core::{Bounds, ConstraintIndex, FinalBounds, InitialBounds, Parallelism};
use mc_model::{ActuatorKind, ConstraintKind, EquationCounts, Frame, JointKind, Model, ModelBuilder};
use mc_problem::{
    Goal, GoalKind, GoalMode, Parameter, PathConstraint, PathConstraintKind, Problem, StateTarget,
    VariableInfo,
};
use mc_rep::{ProblemRep, RepError};
use mc_table::TimeSeriesTable;
use nalgebra::DVector;

fn range(lo: f64, hi: f64) -> Bounds {
    Bounds::new(lo, hi).unwrap()
}

/// Two pin-jointed links, one actuator per joint, one holonomic constraint.
fn double_pendulum() -> Model {
    let mut b = ModelBuilder::new("double_pendulum");
    let upper = b.add_body("upper", 1.0);
    let lower = b.add_body("lower", 0.5);
    let j0 = b.add_joint("shoulder", JointKind::Pin, Frame::Ground, Frame::Body(upper));
    let j1 = b.add_joint("elbow", JointKind::Pin, Frame::Body(upper), Frame::Body(lower));
    let q0 = b.add_coordinate(j0, "q", range(-1.0, 1.0));
    let q1 = b.add_coordinate(j1, "q", range(-2.0, 2.0));
    b.add_actuator("tau0", ActuatorKind::Coordinate { coordinate: q0 }, 1.0, range(-10.0, 10.0));
    b.add_actuator("tau1", ActuatorKind::Coordinate { coordinate: q1 }, 1.0, range(-5.0, 5.0));
    b.add_constraint(
        "tip_on_wall",
        ConstraintKind::PointInPlane {
            plane_frame: Frame::Ground,
            follower: Frame::Body(lower),
        },
    );
    b.build().unwrap()
}

fn problem(model: Model) -> Problem {
    Problem::new("test", model)
}

#[test]
fn two_coordinates_give_four_default_states() {
    let mut model = double_pendulum();
    model
        .set_constraint_enabled(ConstraintIndex::from_index(0), false)
        .unwrap();
    let rep = ProblemRep::new(&problem(model)).unwrap();

    assert_eq!(
        rep.state_info_names(),
        vec![
            "/jointset/elbow/q/speed",
            "/jointset/elbow/q/value",
            "/jointset/shoulder/q/speed",
            "/jointset/shoulder/q/value",
        ]
    );
    assert_eq!(
        rep.state_info("/jointset/shoulder/q/value").unwrap().bounds(),
        range(-1.0, 1.0)
    );
    assert_eq!(
        rep.state_info("/jointset/elbow/q/value").unwrap().bounds(),
        range(-2.0, 2.0)
    );
    for speed in ["/jointset/shoulder/q/speed", "/jointset/elbow/q/speed"] {
        assert_eq!(rep.state_info(speed).unwrap().bounds(), range(-50.0, 50.0));
    }
    assert!(rep.multibody_constraint_names().is_empty());
    assert_eq!(rep.num_multibody_constraint_equations(), 0);
}

#[test]
fn user_infos_override_defaults() {
    let mut p = problem(double_pendulum());
    let phase = p.phase_mut().unwrap();
    phase
        .set_state_info(
            "/jointset/elbow/q/value",
            range(0.0, 0.5),
            Some(InitialBounds(Bounds::zero())),
            Some(FinalBounds(range(0.4, 0.5))),
        )
        .set_control_info("/forceset/tau1", range(-1.0, 1.0), None, None)
        .set_default_speed_bounds(range(-3.0, 3.0));
    let rep = ProblemRep::new(&p).unwrap();

    let info = rep.state_info("/jointset/elbow/q/value").unwrap();
    assert_eq!(info.bounds(), range(0.0, 0.5));
    assert_eq!(info.final_bounds(), Some(FinalBounds(range(0.4, 0.5))));
    assert_eq!(
        rep.state_info("/jointset/elbow/q/speed").unwrap().bounds(),
        range(-3.0, 3.0)
    );
    assert_eq!(rep.state_info_names().len(), 4);

    assert_eq!(rep.control_info("/forceset/tau1").unwrap().bounds(), range(-1.0, 1.0));
    assert_eq!(rep.control_info("/forceset/tau0").unwrap().bounds(), range(-10.0, 10.0));
    assert_eq!(rep.control_info_names().len(), 2);
}

#[test]
fn nonexistent_declarations_are_rejected() {
    let mut p = problem(double_pendulum());
    p.phase_mut()
        .unwrap()
        .set_state_info("/jointset/knee/q/value", Bounds::unbounded(), None, None);
    assert_eq!(
        ProblemRep::new(&p).unwrap_err(),
        RepError::NonexistentState {
            name: "/jointset/knee/q/value".into()
        }
    );

    let mut p = problem(double_pendulum());
    p.phase_mut()
        .unwrap()
        .set_control_info("/forceset/tau9", Bounds::unbounded(), None, None);
    assert!(matches!(
        ProblemRep::new(&p),
        Err(RepError::NonexistentControl { .. })
    ));

    let mut p = problem(double_pendulum());
    p.phases.clear();
    assert_eq!(ProblemRep::new(&p).unwrap_err(), RepError::NoPhase);
}

#[test]
fn duplicate_info_declarations_are_rejected() {
    let mut p = problem(double_pendulum());
    let info = VariableInfo::new("/jointset/elbow/q/value", range(0.0, 1.0), None, None);
    p.phase_mut().unwrap().state_infos.extend([info.clone(), info]);
    assert_eq!(
        ProblemRep::new(&p).unwrap_err(),
        RepError::DuplicateName {
            what: "state info",
            name: "/jointset/elbow/q/value".into()
        }
    );

    let mut p = problem(double_pendulum());
    let info = VariableInfo::new("/forceset/tau0", range(-1.0, 1.0), None, None);
    p.phase_mut().unwrap().control_infos.extend([info.clone(), info]);
    assert!(matches!(
        ProblemRep::new(&p),
        Err(RepError::DuplicateName { what: "control info", .. })
    ));
}

/// One pin joint driven through activation dynamics.
fn activated_pin() -> Model {
    let mut b = ModelBuilder::new("activated_pin");
    let link = b.add_body("link", 1.0);
    let j = b.add_joint("pin", JointKind::Pin, Frame::Ground, Frame::Body(link));
    let q = b.add_coordinate(j, "q", range(-1.0, 1.0));
    b.add_actuator(
        "a",
        ActuatorKind::ActivationCoordinate { coordinate: q },
        10.0,
        range(0.0, 1.0),
    );
    b.build().unwrap()
}

#[test]
fn activation_states_need_a_declaration() {
    let rep = ProblemRep::new(&problem(activated_pin())).unwrap();
    assert_eq!(
        rep.state_info("/forceset/a/activation").unwrap_err(),
        RepError::NotFound {
            what: "state info",
            name: "/forceset/a/activation".into()
        }
    );
    assert_eq!(rep.state_info_names().len(), 2);
    assert_eq!(rep.control_info("/forceset/a").unwrap().bounds(), range(0.0, 1.0));

    let mut p = problem(activated_pin());
    p.phase_mut().unwrap().set_state_info(
        "/forceset/a/activation",
        range(0.0, 1.0),
        Some(InitialBounds(Bounds::zero())),
        None,
    );
    let rep = ProblemRep::new(&p).unwrap();
    let info = rep.state_info("/forceset/a/activation").unwrap();
    assert_eq!(info.bounds(), range(0.0, 1.0));
    assert_eq!(info.initial_bounds(), Some(InitialBounds(Bounds::zero())));
    assert_eq!(rep.state_info_names().len(), 3);

    let mut p = problem(activated_pin());
    p.phase_mut()
        .unwrap()
        .set_state_info("/forceset/b/activation", range(0.0, 1.0), None, None);
    assert!(matches!(
        ProblemRep::new(&p),
        Err(RepError::NonexistentState { .. })
    ));
}

#[test]
fn holonomic_constraint_gets_one_multiplier() {
    let rep = ProblemRep::new(&problem(double_pendulum())).unwrap();
    assert_eq!(rep.multibody_constraint_names(), vec!["multibody_0"]);
    assert_eq!(rep.multiplier_info_names(), vec!["lambda_cid0_p0"]);
    assert_eq!(rep.num_multibody_constraint_equations(), 1);

    let multipliers = rep.multiplier_infos("multibody_0").unwrap();
    assert_eq!(multipliers.len(), 1);
    assert_eq!(multipliers[0].bounds(), range(-1000.0, 1000.0));
    assert_eq!(
        multipliers[0].initial_bounds(),
        Some(InitialBounds(range(-1000.0, 1000.0)))
    );
    let mc = rep.multibody_constraint("multibody_0").unwrap();
    assert_eq!(mc.path(), "/constraintset/tip_on_wall");
    assert_eq!(mc.constraint_info().bounds(), &[Bounds::zero()]);
}

#[test]
fn uniform_bounds_are_configurable() {
    let mut b = ModelBuilder::new("m");
    b.add_constraint(
        "c",
        ConstraintKind::Custom {
            counts: EquationCounts::new(1, 1, 1),
        },
    );
    let mut p = problem(b.build().unwrap());
    p.phase_mut()
        .unwrap()
        .set_multibody_constraint_bounds(range(-0.1, 0.1))
        .set_multiplier_bounds(range(-5.0, 5.0));
    let rep = ProblemRep::new(&p).unwrap();
    let mc = rep.multibody_constraint("multibody_0").unwrap();
    assert_eq!(mc.constraint_info().bounds(), &[range(-0.1, 0.1); 3]);
    for m in mc.multipliers() {
        assert_eq!(m.bounds(), range(-5.0, 5.0));
        assert_eq!(m.final_bounds(), Some(FinalBounds(range(-5.0, 5.0))));
    }
}

#[test]
fn lookup_misses_fail() {
    let rep = ProblemRep::new(&problem(double_pendulum())).unwrap();
    assert_eq!(
        rep.control_info("/no/such/actuator").unwrap_err(),
        RepError::NotFound {
            what: "control info",
            name: "/no/such/actuator".into()
        }
    );
    assert!(rep.state_info("/no/such/state").is_err());
    assert!(rep.parameter("p").is_err());
    assert!(rep.path_constraint("pc").is_err());
    assert!(rep.multibody_constraint("multibody_7").is_err());
    assert!(rep.multiplier_infos("multibody_7").is_err());
    assert!(rep.goal("g").is_err());
}

#[test]
fn parameters_apply_in_declaration_order() {
    let mut p = problem(double_pendulum());
    p.phase_mut()
        .unwrap()
        .add_parameter(Parameter::new(
            "upper_mass",
            vec!["/bodyset/upper".into()],
            "mass",
            range(0.1, 5.0),
        ))
        .add_parameter(Parameter::new(
            "lower_mass",
            vec!["/bodyset/lower".into()],
            "mass",
            range(0.1, 5.0),
        ))
        .add_parameter(
            Parameter::new(
                "lower_com",
                vec!["/bodyset/lower".into()],
                "mass_center",
                range(-1.0, 1.0),
            )
            .with_element(1),
        );
    let mut rep = ProblemRep::new(&p).unwrap();
    assert_eq!(rep.parameter_names(), vec!["upper_mass", "lower_mass", "lower_com"]);

    assert_eq!(
        rep.apply_parameters_to_model(&[1.0, 2.0]).unwrap_err(),
        RepError::ParameterCountMismatch {
            expected: 3,
            actual: 2
        }
    );
    // Failed call leaves the model untouched
    assert_eq!(
        rep.model().property("/bodyset/upper", "mass").unwrap().as_scalar(),
        Some(1.0)
    );

    rep.apply_parameters_to_model(&[1.5, 2.5, -0.25]).unwrap();
    let model = rep.model();
    assert_eq!(model.property("/bodyset/upper", "mass").unwrap().as_scalar(), Some(1.5));
    assert_eq!(model.property("/bodyset/lower", "mass").unwrap().as_scalar(), Some(2.5));
    assert_eq!(
        model.property("/bodyset/lower", "mass_center").unwrap().as_vec3(),
        Some([0.0, -0.25, 0.0])
    );
}

#[test]
fn bad_parameter_fails_reconciliation() {
    let mut p = problem(double_pendulum());
    p.phase_mut().unwrap().add_parameter(Parameter::new(
        "ghost",
        vec!["/bodyset/ghost".into()],
        "mass",
        Bounds::unbounded(),
    ));
    assert!(matches!(ProblemRep::new(&p), Err(RepError::Bind(_))));
}

fn coupling() -> PathConstraint {
    PathConstraint::new(
        "couple",
        PathConstraintKind::CoordinateCoupling {
            independent: "/jointset/shoulder/q".into(),
            dependent: "/jointset/elbow/q".into(),
            ratio: 0.5,
        },
    )
}

fn reference() -> TimeSeriesTable {
    TimeSeriesTable::from_rows(
        vec![0.0, 1.0],
        vec!["/forceset/tau0".into(), "/forceset/tau1".into()],
        &[vec![0.0, 1.0], vec![2.0, 1.0]],
    )
    .unwrap()
}

#[test]
fn path_constraint_ranges_follow_declaration_order() {
    let mut p = problem(double_pendulum());
    p.phase_mut()
        .unwrap()
        .add_path_constraint(coupling())
        .add_path_constraint(PathConstraint::new(
            "follow",
            PathConstraintKind::ControlReference {
                reference: reference(),
            },
        ))
        .add_path_constraint(PathConstraint::new(
            "budget",
            PathConstraintKind::ControlSum {
                controls: vec![],
                bounds: range(-1.0, 1.0),
            },
        ));
    let rep = ProblemRep::new(&p).unwrap();
    assert_eq!(rep.path_constraint_names(), vec!["couple", "follow", "budget"]);
    assert_eq!(rep.num_path_constraint_equations(), 4);
    assert_eq!(rep.path_constraint("couple").unwrap().index_range(), 0..1);
    assert_eq!(rep.path_constraint("follow").unwrap().index_range(), 1..3);
    assert_eq!(rep.path_constraint("budget").unwrap().index_range(), 3..4);
}

#[test]
fn duplicate_names_rejected() {
    let mut p = problem(double_pendulum());
    p.phase_mut()
        .unwrap()
        .add_path_constraint(coupling())
        .add_path_constraint(coupling());
    assert!(matches!(
        ProblemRep::new(&p),
        Err(RepError::DuplicateName { what: "path constraint", .. })
    ));
}

#[test]
fn endpoint_mode_on_integral_goal_fails() {
    let mut p = problem(double_pendulum());
    p.phase_mut().unwrap().add_goal(
        Goal::new(
            "effort",
            GoalKind::ControlEffort {
                weights: BTreeMap::new(),
            },
        )
        .as_endpoint_constraint(true),
    );
    assert!(matches!(ProblemRep::new(&p), Err(RepError::Bind(_))));
}

#[test]
fn reconciliation_is_repeatable() {
    let mut p = problem(double_pendulum());
    p.phase_mut()
        .unwrap()
        .set_state_info("/jointset/elbow/q/value", range(0.0, 1.0), None, None)
        .add_path_constraint(coupling());
    let a = ProblemRep::new(&p).unwrap();
    let b = ProblemRep::new(&p).unwrap();
    assert_eq!(a.describe(), b.describe());
    for name in a.state_info_names() {
        assert_eq!(a.state_info(&name).unwrap(), b.state_info(&name).unwrap());
    }
}

#[test]
fn description_lists_every_section() {
    let mut p = problem(double_pendulum());
    p.phase_mut()
        .unwrap()
        .add_goal(Goal::new("time", GoalKind::FinalTime).with_weight(2.0))
        .add_path_constraint(coupling());
    let rep = ProblemRep::new(&p).unwrap();
    let mut buf = Vec::new();
    rep.print_description(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();

    let expected_headers = [
        "Goals: (total: 1)",
        "Multibody constraints: (total: 1)",
        "Path constraints: (total: 1)",
        "States: (total: 4)",
        "Controls: (total: 2)",
        "Parameters: none",
    ];
    let headers: Vec<&str> = text.lines().filter(|l| !l.starts_with("  ")).collect();
    assert_eq!(headers, expected_headers);
    assert!(text.contains("  time. final_time enabled: true mode: cost weight: 2\n"));
    assert!(text.contains("  multibody_0. number of scalar equations: 1. bounds: 0\n"));
    assert!(text.contains("  /forceset/tau0. bounds: [-10, 10]\n"));
}

fn evaluation_problem() -> ProblemRep {
    let mut p = problem(double_pendulum());
    p.phase_mut()
        .unwrap()
        .add_goal(
            Goal::new(
                "effort",
                GoalKind::ControlEffort {
                    weights: BTreeMap::new(),
                },
            )
            .with_weight(0.5),
        )
        .add_goal(Goal::new(
            "reach",
            GoalKind::FinalState {
                targets: vec![StateTarget {
                    state: "/jointset/elbow/q/value".into(),
                    value: 1.0,
                }],
            },
        ))
        .add_goal(Goal::new("duration", GoalKind::FinalTime).with_enabled(false))
        .add_path_constraint(coupling())
        .add_path_constraint(PathConstraint::new(
            "follow",
            PathConstraintKind::ControlReference {
                reference: reference(),
            },
        ));
    ProblemRep::new(&p).unwrap()
}

#[test]
fn goals_evaluate_on_trajectory() {
    let rep = evaluation_problem();
    let times = DVector::from_vec(vec![0.0, 0.5, 1.0]);
    let mut traj = rep.zero_trajectory(times);
    traj.set_control("/forceset/tau0", &[2.0, 2.0, 2.0]).unwrap();
    traj.set_state("/jointset/elbow/q/value", &[0.0, 0.5, 1.25]).unwrap();

    let values = rep.evaluate_goals(&traj).unwrap();
    assert_eq!(values.len(), 3);
    // u^2 = 4 over one second, weight 0.5
    assert!((values[0].values[0] - 2.0).abs() < 1e-12);
    assert_eq!(values[1].mode, GoalMode::EndpointConstraint);
    assert!((values[1].values[0] - 0.25).abs() < 1e-12);
    assert_eq!(values[2].values.as_slice(), &[0.0]);

    assert!((rep.evaluate_cost(&traj).unwrap() - 2.0).abs() < 1e-12);
}

#[test]
fn path_constraints_evaluate_in_column_blocks() {
    let rep = evaluation_problem().with_parallelism(Parallelism::Threads(2));
    let times = DVector::from_vec(vec![0.0, 0.5, 1.0]);
    let mut traj = rep.zero_trajectory(times);
    traj.set_state("/jointset/shoulder/q/value", &[0.0, 0.2, 0.4]).unwrap();
    traj.set_state("/jointset/elbow/q/value", &[0.0, 0.1, 0.3]).unwrap();

    let errors = rep.evaluate_path_constraints(&traj).unwrap();
    assert_eq!(errors.shape(), (3, 3));
    // couple: q_elbow - 0.5 * q_shoulder
    assert!((errors[(2, 0)] - 0.1).abs() < 1e-12);
    // follow: 0 - ref(t)
    assert!((errors[(1, 1)] + 1.0).abs() < 1e-12);
    assert!((errors[(1, 2)] + 1.0).abs() < 1e-12);

    let serial = rep.clone().with_parallelism(Parallelism::Serial);
    assert_eq!(serial.evaluate_path_constraints(&traj).unwrap(), errors);

    assert!((rep.path_constraint_violation(&traj).unwrap() - 2.0).abs() < 1e-12);
}

#[test]
fn mismatched_trajectory_rejected() {
    let rep = evaluation_problem();
    let mut names = rep.model().state_variable_names().to_vec();
    names.reverse();
    let traj = mc_rep::Trajectory::zeros(
        DVector::from_vec(vec![0.0, 1.0]),
        names,
        rep.model().control_names().to_vec(),
    );
    assert!(matches!(
        rep.evaluate_goals(&traj),
        Err(RepError::TrajectoryMismatch { .. })
    ));
}
