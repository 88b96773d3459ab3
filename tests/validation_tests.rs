use capacity_planner::validation::ReferenceKind;
use capacity_planner::{
    Assignment, Calendar, CalendarException, Plan, PlanValidationError, PlannerConfig, Resource,
    Task, WorkingDay, reference_misses, validate_plan, working_hours,
};
use chrono::{NaiveDate, Weekday};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn base() -> Plan {
    Plan::new(PlannerConfig::new(d(2025, 8, 1), d(2025, 10, 1)))
        .with_resource(Resource::new("r1", "Alice", Calendar::standard_week(8.0)))
        .with_task(Task::new("t1", "Task", d(2025, 8, 4), d(2025, 8, 29)))
        .with_assignment(
            Assignment::new("a1", "t1", "r1", d(2025, 8, 4), d(2025, 8, 29)).with_fragment(
                d(2025, 8, 4),
                d(2025, 8, 29),
                50.0,
            ),
        )
}

#[test]
fn demo_and_minimal_plans_are_valid() {
    assert_eq!(validate_plan(&Plan::demo().unwrap()), Ok(()));
    assert_eq!(validate_plan(&base()), Ok(()));
}

#[test]
fn empty_plan_window_is_rejected() {
    let plan = Plan::new(PlannerConfig::new(d(2025, 8, 1), d(2025, 8, 1)));
    assert!(matches!(
        validate_plan(&plan),
        Err(PlanValidationError::PlanWindow { .. })
    ));
}

#[test]
fn non_positive_default_hours_are_rejected() {
    let config = PlannerConfig::new(d(2025, 8, 1), d(2025, 9, 1)).with_hours_per_day_default(0.0);
    assert_eq!(
        validate_plan(&Plan::new(config)),
        Err(PlanValidationError::DefaultHours(0.0))
    );
}

#[test]
fn duplicate_ids_are_reported_by_kind() {
    let plan = base().with_resource(Resource::new("r1", "Clone", Calendar::standard_week(8.0)));
    assert_eq!(
        validate_plan(&plan),
        Err(PlanValidationError::DuplicateId {
            kind: "resource",
            id: "r1".into()
        })
    );

    let nested = base().with_task(
        Task::new("t2", "Parent", d(2025, 8, 4), d(2025, 8, 29)).with_child(Task::new(
            "t1",
            "Shadow",
            d(2025, 8, 4),
            d(2025, 8, 5),
        )),
    );
    assert!(matches!(
        validate_plan(&nested),
        Err(PlanValidationError::DuplicateId { kind: "task", .. })
    ));
}

#[test]
fn inverted_intervals_are_rejected() {
    let task = base().with_task(Task::new("bad", "Bad", d(2025, 8, 5), d(2025, 8, 5)));
    assert!(matches!(
        validate_plan(&task),
        Err(PlanValidationError::EmptyInterval { kind: "task", .. })
    ));

    let fragment = base().with_assignment(
        Assignment::new("a2", "t1", "r1", d(2025, 8, 4), d(2025, 8, 29))
            .with_fragment(d(2025, 8, 4), d(2025, 8, 6), 10.0)
            .with_fragment(d(2025, 8, 9), d(2025, 8, 7), 10.0),
    );
    let err = validate_plan(&fragment).unwrap_err();
    assert_eq!(
        err.to_string(),
        "fragment a2#1 has start 2025-08-09 not before end 2025-08-07"
    );
}

#[test]
fn non_finite_fragment_percentage_is_rejected() {
    let plan = base().with_assignment(
        Assignment::new("a2", "t1", "r1", d(2025, 8, 4), d(2025, 8, 29)).with_fragment(
            d(2025, 8, 4),
            d(2025, 8, 6),
            f64::NAN,
        ),
    );
    assert_eq!(
        validate_plan(&plan),
        Err(PlanValidationError::FragmentPercent {
            assignment: "a2".into(),
            index: 0
        })
    );
}

#[test]
fn negative_calendar_hours_are_rejected() {
    let mut alice = Resource::new("r9", "Night shift", Calendar::standard_week(8.0));
    alice.calendar.set_exception(d(2025, 8, 6), -1.0);
    let plan = base().with_resource(alice);
    assert!(matches!(
        validate_plan(&plan),
        Err(PlanValidationError::Calendar { resource, .. }) if resource == "r9"
    ));
}

fn calendar_error_detail(plan: &Plan, resource_id: &str) -> String {
    match validate_plan(plan) {
        Err(PlanValidationError::Calendar { resource, detail }) if resource == resource_id => {
            detail
        }
        other => panic!("expected calendar error for {resource_id}, got {other:?}"),
    }
}

#[test]
fn two_rules_for_one_weekday_are_rejected() {
    let mut calendar = Calendar::standard_week(8.0);
    calendar.working_days.push(WorkingDay {
        weekday: Weekday::Mon,
        hours: Some(4.0),
    });
    let plan = base().with_resource(Resource::new("r9", "Split Monday", calendar));
    let detail = calendar_error_detail(&plan, "r9");
    assert!(detail.contains("more than one rule for Mon"), "{detail}");
}

#[test]
fn negative_or_nan_rule_hours_are_rejected() {
    for hours in [-2.0, f64::NAN] {
        let calendar = Calendar::weekly([Weekday::Tue], hours);
        let plan = base().with_resource(Resource::new("r9", "Odd hours", calendar));
        let detail = calendar_error_detail(&plan, "r9");
        assert!(detail.contains("invalid hours"), "{detail}");
    }

    // unspecified hours fall back to the plan default and are fine
    let calendar = Calendar {
        working_days: vec![WorkingDay {
            weekday: Weekday::Tue,
            hours: None,
        }],
        ..Calendar::default()
    };
    let plan = base().with_resource(Resource::new("r9", "Default hours", calendar));
    assert_eq!(validate_plan(&plan), Ok(()));
}

#[test]
fn two_exceptions_on_one_date_are_rejected() {
    let mut calendar = Calendar::standard_week(8.0);
    calendar.exceptions.push(CalendarException {
        date: d(2025, 8, 4),
        hours: 2.0,
    });
    calendar.exceptions.push(CalendarException {
        date: d(2025, 8, 4),
        hours: 6.0,
    });
    let plan = base().with_resource(Resource::new("r9", "Double booked", calendar));
    let detail = calendar_error_detail(&plan, "r9");
    assert!(detail.contains("more than one exception for 2025-08-04"), "{detail}");

    // set_exception replaces instead of appending, so it never builds such a calendar
    let mut alice = Resource::new("r8", "Alice", Calendar::standard_week(8.0));
    alice.calendar.set_exception(d(2025, 8, 4), 2.0);
    alice.calendar.set_exception(d(2025, 8, 4), 6.0);
    let config = PlannerConfig::default();
    assert_eq!(working_hours(&alice, d(2025, 8, 4), &config), 6.0);
    assert_eq!(validate_plan(&base().with_resource(alice)), Ok(()));
}

#[test]
fn dangling_references_are_listed_not_rejected() {
    let plan = base().with_assignment(Assignment::new(
        "a9",
        "t404",
        "r404",
        d(2025, 8, 4),
        d(2025, 8, 8),
    ));
    assert_eq!(validate_plan(&plan), Ok(()));

    let misses = reference_misses(&plan);
    assert_eq!(misses.len(), 2);
    assert_eq!(misses[0].kind, ReferenceKind::Resource);
    assert_eq!(misses[0].missing_id, "r404");
    assert_eq!(misses[1].kind, ReferenceKind::Task);
    assert_eq!(misses[1].assignment_id, "a9");

    assert!(reference_misses(&Plan::demo().unwrap()).is_empty());
}
