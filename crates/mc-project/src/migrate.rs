//! Schema migration framework.

use tracing::debug;

use crate::ProjectError;
use crate::schema::Project;

pub const LATEST_VERSION: u32 = 2;

pub fn migrate_to_latest(mut project: Project) -> Result<Project, ProjectError> {
    while project.version < LATEST_VERSION {
        debug!(from = project.version, "migrating project file");
        project = migrate_one_version(project)?;
    }
    Ok(project)
}

fn migrate_one_version(project: Project) -> Result<Project, ProjectError> {
    match project.version {
        0 => migrate_v0_to_v1(project),
        1 => migrate_v1_to_v2(project),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

fn migrate_v0_to_v1(mut project: Project) -> Result<Project, ProjectError> {
    project.version = 1;
    Ok(project)
}

/// Version 1 applied every goal as a cost. Version 2 lets `final_state`
/// default to an endpoint constraint, so old files pin the cost mode.
fn migrate_v1_to_v2(mut project: Project) -> Result<Project, ProjectError> {
    for goal in &mut project.phase.goals {
        if goal.type_name == "final_state" && goal.endpoint_constraint.is_none() {
            goal.endpoint_constraint = Some(false);
        }
    }
    project.version = 2;
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ArgsDef, GoalDef, ModelDef, PhaseDef};

    fn goal(type_name: &str, endpoint_constraint: Option<bool>) -> GoalDef {
        GoalDef {
            name: type_name.to_string(),
            type_name: type_name.to_string(),
            enabled: true,
            weight: 1.0,
            endpoint_constraint,
            endpoint_bounds: None,
            args: ArgsDef::default(),
        }
    }

    fn project(version: u32, goals: Vec<GoalDef>) -> Project {
        Project {
            version,
            name: "p".to_string(),
            model: ModelDef {
                name: "m".to_string(),
                bodies: vec![],
                joints: vec![],
                actuators: vec![],
                constraints: vec![],
                remove_actuators: vec![],
                reserve_actuators: None,
            },
            phase: PhaseDef {
                goals,
                ..PhaseDef::default()
            },
        }
    }

    #[test]
    fn v1_final_state_goals_stay_costs() {
        let migrated = migrate_to_latest(project(
            1,
            vec![
                goal("final_state", None),
                goal("final_state", Some(true)),
                goal("final_time", None),
            ],
        ))
        .unwrap();
        assert_eq!(migrated.version, LATEST_VERSION);
        let modes: Vec<_> = migrated
            .phase
            .goals
            .iter()
            .map(|g| g.endpoint_constraint)
            .collect();
        assert_eq!(modes, vec![Some(false), Some(true), None]);
    }

    #[test]
    fn latest_is_untouched() {
        let p = project(LATEST_VERSION, vec![goal("final_state", None)]);
        assert_eq!(migrate_to_latest(p.clone()).unwrap(), p);
    }
}
