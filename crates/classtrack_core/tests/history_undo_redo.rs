use classtrack_core::{
    ClassRoster, HistoryError, Student, VersionedRoster, INITIAL_STATE_LABEL,
};

fn roster_with(names: &[&str]) -> ClassRoster {
    let mut roster = ClassRoster::new();
    for name in names {
        roster
            .add_student(Student::new(
                *name,
                format!("@{name}"),
                format!("{name}@example.com"),
                [],
            ))
            .unwrap();
    }
    roster
}

#[test]
fn commits_grow_history_and_double_undo_restores_the_base() {
    let base = roster_with(&["alex"]);
    let mut versioned = VersionedRoster::new(base.clone());
    let initial_len = versioned.history().len();

    versioned.commit(roster_with(&["alex", "bee"]), "Added student bee");
    versioned.commit(roster_with(&["alex", "bee", "cara"]), "Added student cara");

    assert_eq!(versioned.history().len(), initial_len + 2);
    assert!(versioned.history().last().unwrap().is_current);

    versioned.undo().unwrap();
    versioned.undo().unwrap();
    assert_eq!(versioned.current(), &base);
}

#[test]
fn commit_after_undo_discards_the_abandoned_branch() {
    let mut versioned = VersionedRoster::new(ClassRoster::new());
    versioned.commit(roster_with(&["alex"]), "Added student alex");
    versioned.undo().unwrap();
    versioned.commit(roster_with(&["bee"]), "Added student bee");

    assert_eq!(versioned.redo().unwrap_err(), HistoryError::NoNextState);
    assert!(!versioned.can_redo());
}

#[test]
fn three_commits_and_three_undos_walk_back_to_the_initial_state() {
    let mut versioned = VersionedRoster::new(ClassRoster::new());
    versioned.commit(roster_with(&["a"]), "a");
    versioned.commit(roster_with(&["a", "b"]), "b");
    versioned.commit(roster_with(&["a", "b", "c"]), "c");

    versioned.undo().unwrap();
    versioned.undo().unwrap();
    versioned.undo().unwrap();

    let entries = versioned.history();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0].label, INITIAL_STATE_LABEL);
    assert!(entries[0].is_current);
    assert!(entries[1..].iter().all(|entry| !entry.is_current));

    assert_eq!(versioned.undo().unwrap_err(), HistoryError::NoPreviousState);
    assert_eq!(versioned.current(), &ClassRoster::new());
}

#[test]
fn undo_and_redo_round_trip_is_value_exact() {
    let before = roster_with(&["alex"]);
    let after = roster_with(&["alex", "bee"]);
    let mut versioned = VersionedRoster::new(before.clone());
    versioned.commit(after.clone(), "Added student bee");

    assert_eq!(versioned.undo().unwrap(), &before);
    assert_eq!(versioned.redo().unwrap(), &after);
}

#[test]
fn reset_starts_a_fresh_log_from_the_loaded_state() {
    let mut versioned = VersionedRoster::new(ClassRoster::new());
    versioned.commit(roster_with(&["alex"]), "Added student alex");

    let loaded = roster_with(&["dana"]);
    versioned.reset(loaded.clone());

    assert_eq!(versioned.current(), &loaded);
    assert!(!versioned.can_undo());
    assert!(!versioned.can_redo());
    let entries = versioned.history();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].label, INITIAL_STATE_LABEL);
}
