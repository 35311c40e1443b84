//! Client-side views over workload and task data.

use crate::models::{MemberWorkload, Task, TaskStatus, TaskSummary, TeamWorkload, User};
use std::collections::BTreeMap;

pub const OVERLOADED_ABOVE: f64 = 100.0;
pub const UNDERLOADED_BELOW: f64 = 70.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Reassignment {
    pub task: TaskSummary,
    pub from: User,
    pub to: User,
}

pub fn is_overloaded(member: &MemberWorkload) -> bool {
    member.utilization_percentage > OVERLOADED_ABOVE
}

pub fn is_underloaded(member: &MemberWorkload) -> bool {
    member.utilization_percentage < UNDERLOADED_BELOW
}

/// Every active task of an overloaded member, smallest first, proposed to the
/// first underloaded member. Tasks without story points count as zero.
pub fn reassignment_suggestions(workload: &TeamWorkload) -> Vec<Reassignment> {
    let Some(target) = workload.members.iter().find(|m| is_underloaded(m)) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for member in workload.members.iter().filter(|m| is_overloaded(m)) {
        let mut tasks = member.active_tasks.clone();
        tasks.sort_by_key(|t| t.story_points.unwrap_or(0));
        out.extend(tasks.into_iter().map(|task| Reassignment {
            task,
            from: member.user.clone(),
            to: target.user.clone(),
        }));
    }
    out
}

/// Buckets tasks by status; every status is present, possibly empty.
pub fn group_by_status(tasks: &[Task]) -> BTreeMap<TaskStatus, Vec<Task>> {
    let mut buckets: BTreeMap<TaskStatus, Vec<Task>> =
        TaskStatus::ALL.into_iter().map(|s| (s, Vec::new())).collect();
    for task in tasks {
        buckets.entry(task.status).or_default().push(task.clone());
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::session::tests::user;
    use serde_json::json;

    fn summary(id: &str, points: Option<u32>) -> TaskSummary {
        serde_json::from_value(json!({"id": id, "title": id, "storyPoints": points}))
            .expect("summary")
    }

    fn member(id: &str, utilization: f64, tasks: Vec<TaskSummary>) -> MemberWorkload {
        MemberWorkload {
            user: user(id, Role::Developer),
            current_workload: 0,
            max_capacity: 40,
            utilization_percentage: utilization,
            active_tasks: tasks,
        }
    }

    fn team(members: Vec<MemberWorkload>) -> TeamWorkload {
        TeamWorkload {
            team_name: Some("Core".into()),
            members,
            balanced: false,
            average_utilization: 0.0,
        }
    }

    #[test]
    fn overloaded_tasks_go_to_first_underloaded_member_smallest_first() {
        let workload = team(vec![
            member("busy", 130.0, vec![summary("big", Some(8)), summary("small", Some(2)), summary("none", None)]),
            member("steady", 85.0, vec![]),
            member("idle-a", 40.0, vec![]),
            member("idle-b", 10.0, vec![]),
        ]);

        let got = reassignment_suggestions(&workload);
        let ids: Vec<&str> = got.iter().map(|r| r.task.id.as_str()).collect();
        assert_eq!(ids, vec!["none", "small", "big"]);
        assert!(got.iter().all(|r| r.from.id == "busy" && r.to.id == "idle-a"));
    }

    #[test]
    fn thresholds_are_strict() {
        let workload = team(vec![
            member("full", 100.0, vec![summary("t", Some(1))]),
            member("edge", 70.0, vec![]),
        ]);
        assert!(reassignment_suggestions(&workload).is_empty());
    }

    #[test]
    fn no_underloaded_member_means_no_suggestions() {
        let workload = team(vec![member("busy", 150.0, vec![summary("t", Some(3))])]);
        assert!(reassignment_suggestions(&workload).is_empty());
    }

    #[test]
    fn grouping_keeps_every_status() {
        let tasks: Vec<Task> = serde_json::from_value(json!([
            {"id": "1", "title": "a", "status": "TODO", "priority": "LOW"},
            {"id": "2", "title": "b", "status": "DONE", "priority": "HIGH"},
            {"id": "3", "title": "c", "status": "TODO", "priority": "MEDIUM"}
        ]))
        .expect("tasks");

        let groups = group_by_status(&tasks);
        assert_eq!(groups.len(), 4);
        assert_eq!(groups[&TaskStatus::Todo].len(), 2);
        assert!(groups[&TaskStatus::InProgress].is_empty());
        assert_eq!(groups[&TaskStatus::Done][0].id, "2");
        let order: Vec<TaskStatus> = groups.keys().copied().collect();
        assert_eq!(order, TaskStatus::ALL.to_vec());
    }
}
