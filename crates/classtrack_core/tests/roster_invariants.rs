use classtrack_core::{
    Attendance, ClassRoster, Lesson, ModuleClass, RosterError, Student, Week,
};
use chrono::{NaiveTime, Weekday};

fn student(name: &str) -> Student {
    Student::new(
        name,
        format!("@{name}"),
        format!("{name}@example.com"),
        [],
    )
}

fn lesson(venue: &str) -> Lesson {
    Lesson::new(
        Weekday::Thu,
        NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        10,
        venue,
    )
    .unwrap()
}

#[test]
fn cascade_clears_the_deleted_student_everywhere() {
    let mut roster = ClassRoster::new();
    let alex = student("alex");
    let bee = student("bee");
    let alex_id = alex.id();
    let bee_id = bee.id();
    roster.add_student(alex).unwrap();
    roster.add_student(bee).unwrap();

    let class = ModuleClass::new("CS2103T Tutorial")
        .with_lesson_added(lesson("COM1-0211"))
        .unwrap();
    roster.add_module_class(class).unwrap();
    roster
        .add_module_class(ModuleClass::new("CS2100 Lab"))
        .unwrap();
    roster.link_student("CS2103T Tutorial", alex_id).unwrap();
    roster.link_student("CS2103T Tutorial", bee_id).unwrap();
    roster.link_student("CS2100 Lab", alex_id).unwrap();

    // record a score for alex so the cascade has attendance to scrub
    let tutorial = roster.class_by_name("CS2103T Tutorial").unwrap().clone();
    let old_lesson = tutorial.lessons()[0].clone();
    let new_lesson = old_lesson
        .with_attendance_added(Week::new(1).unwrap(), alex_id, Attendance::new(80).unwrap())
        .unwrap();
    let tutorial = tutorial.with_lesson_replaced(&old_lesson, new_lesson).unwrap();
    roster.set_module_class("CS2103T Tutorial", tutorial).unwrap();

    let lab_expected = roster
        .class_by_name("CS2100 Lab")
        .unwrap()
        .without_student(&alex_id);

    roster.delete_student(&alex_id).unwrap();

    let tutorial = roster.class_by_name("CS2103T Tutorial").unwrap();
    assert!(!tutorial.has_student(&alex_id));
    assert!(tutorial.has_student(&bee_id));
    assert_eq!(
        tutorial.lessons()[0]
            .get_attendance(Week::new(1).unwrap(), &alex_id)
            .unwrap(),
        None
    );

    let lab = roster.class_by_name("CS2100 Lab").unwrap();
    assert!(!lab.has_student(&alex_id));
    // nothing beyond alex's membership changed in the lab
    assert_eq!(lab, &lab_expected);
}

#[test]
fn deleting_a_class_never_touches_students() {
    let mut roster = ClassRoster::new();
    let ids: Vec<_> = ["alex", "bee", "cara"]
        .iter()
        .map(|name| {
            let entry = student(name);
            let id = entry.id();
            roster.add_student(entry).unwrap();
            id
        })
        .collect();
    roster
        .add_module_class(ModuleClass::new("CS2103T Tutorial"))
        .unwrap();
    for id in &ids {
        roster.link_student("CS2103T Tutorial", *id).unwrap();
    }

    let students_before = roster.students().to_vec();
    roster.delete_module_class("CS2103T Tutorial").unwrap();

    assert!(roster.module_classes().is_empty());
    assert_eq!(roster.students(), students_before.as_slice());
}

#[test]
fn failed_mutations_leave_the_roster_value_identical() {
    let mut roster = ClassRoster::new();
    roster.add_student(student("alex")).unwrap();
    roster
        .add_module_class(ModuleClass::new("CS2103T Tutorial"))
        .unwrap();
    let before = roster.clone();

    assert!(roster.add_student(student("alex")).is_err());
    assert!(roster
        .add_module_class(ModuleClass::new("cs2103t tutorial"))
        .is_err());
    assert!(roster.delete_module_class("No Such Class").is_err());
    let alex_id = roster.students()[0].id();
    assert!(roster.unlink_student("CS2103T Tutorial", &alex_id).is_err());

    assert_eq!(roster, before);
}

#[test]
fn link_integrity_is_checked_on_class_installation() {
    let mut roster = ClassRoster::new();
    let alex = student("alex");
    let alex_id = alex.id();
    roster.add_student(alex).unwrap();
    roster
        .add_module_class(ModuleClass::new("CS2103T Tutorial"))
        .unwrap();
    roster.link_student("CS2103T Tutorial", alex_id).unwrap();

    let stray = student("stray");
    let broken = roster
        .class_by_name("CS2103T Tutorial")
        .unwrap()
        .with_student_linked(stray.id())
        .unwrap();
    let err = roster
        .set_module_class("CS2103T Tutorial", broken)
        .expect_err("installing a class with an unknown id must fail");
    assert_eq!(err, RosterError::StudentNotFound(stray.id()));
}
