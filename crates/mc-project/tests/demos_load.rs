use std::path::{Path, PathBuf};

use mc_core::Bounds;
use mc_problem::{GoalKind, GoalMode, Registry};
use mc_rep::ProblemRep;
use nalgebra::DVector;

fn demos() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos")
}

fn rep_for(file: &str) -> ProblemRep {
    let path = demos().join(file);
    let project = mc_project::load(&path)
        .unwrap_or_else(|e| panic!("Failed to load {}: {}", file, e));
    let problem = mc_project::compile(&project, &Registry::with_builtin(), &demos())
        .unwrap_or_else(|e| panic!("Failed to compile {}: {}", file, e));
    ProblemRep::new(&problem).unwrap_or_else(|e| panic!("Failed to reconcile {}: {}", file, e))
}

#[test]
fn demos_load_compile_and_reconcile() {
    for name in ["sliding_mass.yaml", "arm_tracking.yaml", "double_slider.json"] {
        rep_for(name);
    }
}

#[test]
fn sliding_mass_declarations() {
    let rep = rep_for("sliding_mass.yaml");
    assert_eq!(
        rep.state_info_names(),
        vec!["/jointset/slide/x/speed", "/jointset/slide/x/value"]
    );
    let value = rep.state_info("/jointset/slide/x/value").unwrap();
    assert_eq!(value.final_bounds().map(|b| b.0), Some(Bounds::equal(1.0).unwrap()));
    assert_eq!(rep.time_final_bounds().0, Bounds::new(0.0, 5.0).unwrap());
    assert_eq!(rep.goal_names(), vec!["time"]);
}

#[test]
fn arm_gets_reserves_multipliers_and_radian_reference() {
    let rep = rep_for("arm_tracking.yaml");
    assert_eq!(
        rep.control_info_names(),
        vec![
            "/forceset/biceps",
            "/forceset/deltoid",
            "/forceset/reserve__jointset_shoulder_flexion",
            "/forceset/reserve__jointset_wrist_flexion"
        ]
    );
    assert_eq!(
        rep.control_info("/forceset/reserve__jointset_wrist_flexion")
            .unwrap()
            .bounds(),
        Bounds::unbounded()
    );
    assert_eq!(rep.multiplier_info_names(), vec!["lambda_cid0_p0"]);
    assert_eq!(
        rep.multiplier_infos("multibody_0").unwrap()[0].bounds(),
        Bounds::new(-500.0, 500.0).unwrap()
    );
    assert_eq!(rep.path_constraint("activation_budget").unwrap().index_range(), 0..1);
    assert_eq!(rep.parameter_names(), vec!["forearm_mass"]);

    let project = mc_project::load(&demos().join("arm_tracking.yaml")).unwrap();
    let problem = mc_project::compile(&project, &Registry::with_builtin(), &demos()).unwrap();
    let GoalKind::StateTracking { reference, .. } = &problem.phases[0].goals[0].kind else {
        panic!("expected a tracking goal");
    };
    assert!(!reference.in_degrees());
    let shoulder = reference.column("/jointset/shoulder/flexion/value").unwrap();
    // 60 degrees at the last sample
    assert!((shoulder[shoulder.len() - 1] - 60f64.to_radians()).abs() < 0.05);
}

#[test]
fn double_slider_endpoint_goal_and_disabled_constraint() {
    let rep = rep_for("double_slider.json");
    assert_eq!(rep.multibody_constraint_names(), vec!["multibody_0"]);
    assert_eq!(rep.multiplier_info_names(), vec!["lambda_cid0_v0"]);
    assert_eq!(rep.goal("arrive").unwrap().mode(), GoalMode::EndpointConstraint);
    assert_eq!(rep.goal("effort").unwrap().mode(), GoalMode::Cost);
    assert_eq!(
        rep.control_info("/forceset/pull").unwrap().bounds(),
        Bounds::new(-0.5, 0.5).unwrap()
    );

    let traj = rep.zero_trajectory(DVector::from_vec(vec![0.0, 0.5, 1.0]));
    let goals = rep.evaluate_goals(&traj).unwrap();
    assert_eq!(goals[0].name, "arrive");
    assert_eq!(goals[0].values.as_slice(), &[-1.0, 0.0]);
    assert_eq!(rep.evaluate_cost(&traj).unwrap(), 0.0);
    assert_eq!(rep.path_constraint_violation(&traj).unwrap(), 0.0);
}
