//! Step edits, moves, replacements and input validation, checked against
//! the exact text the engine produces.

use plandoc_core::{
    Classification, NumberingIssue, Operation, Placement, PlanError, StepSpec, Target,
    ThreadSpec, add_step, check_numbering, delete_step, get_thread, insert_task, insert_thread,
    mark_step_complete, move_task, move_thread, render_task, reorder_threads, repair_numbering,
    replace_task, replace_thread,
};
use plandoc_test_utils::{
    SAMPLE_PLAN, audit_entries, task_spec, task_spec_with_steps, tasks_of, thread_spec,
    thread_titles, without_audit,
};

// -----------------------------------------------------------------------
// Steps
// -----------------------------------------------------------------------

#[test]
fn add_step_appends_after_last_step() {
    let text = add_step(SAMPLE_PLAN, 1, 2, &StepSpec::new("precedence"), None, "r").unwrap();
    assert!(text.contains("- [ ] error recovery\n- [ ] precedence\n\n### [ ] Task 1.3"));
}

#[test]
fn add_step_before_position() {
    let text = add_step(SAMPLE_PLAN, 1, 2, &StepSpec::new("tokens in"), Some(1), "r").unwrap();
    let steps: Vec<String> = get_thread(&text, 1).unwrap().tasks[1]
        .steps
        .iter()
        .map(|s| s.description.clone())
        .collect();
    assert_eq!(steps, vec!["tokens in", "expressions", "statements", "error recovery"]);
}

#[test]
fn add_step_creates_steps_block() {
    let text = add_step(SAMPLE_PLAN, 1, 3, &StepSpec::new("golden files"), None, "r").unwrap();
    assert!(text.contains(
        "- **Evidence:** round-trip tests\n\nSteps:\n- [ ] golden files\n\n## Thread 2: Back end\n"
    ));
}

#[test]
fn add_step_keeps_existing_indent() {
    let text = "\
## Thread 1: T

### [ ] Task 1.1: A

- **Classification:** docs
- **Entrypoint:** a
- **Observable:** b
- **Evidence:** c

Steps:
  - [ ] first
";
    let out = add_step(text, 1, 1, &StepSpec::new("second"), None, "r").unwrap();
    assert!(out.contains("  - [ ] first\n  - [ ] second\n"));
}

#[test]
fn add_step_rejects_bad_reference_and_input() {
    let err = add_step(SAMPLE_PLAN, 1, 2, &StepSpec::new("x"), Some(9), "r").unwrap_err();
    assert_eq!(
        err,
        PlanError::NotFound {
            op: Operation::AddStep,
            target: Target::Step {
                thread: 1,
                task: 2,
                step: 9
            },
        }
    );

    let err = add_step(SAMPLE_PLAN, 1, 2, &StepSpec::new("two\nlines"), None, "r").unwrap_err();
    assert!(matches!(err, PlanError::MalformedInput { ref field, .. } if field == "step.description"));
}

#[test]
fn delete_last_step_removes_steps_label() {
    let mut text = SAMPLE_PLAN.to_owned();
    text = delete_step(&text, 1, 1, 1, "r").unwrap();
    text = delete_step(&text, 1, 1, 1, "r").unwrap();
    assert!(without_audit(&text).contains(
        "- **Evidence:** lexer unit tests pass\n\n### [ ] Task 1.2: Parser"
    ));
    assert!(get_thread(&text, 1).unwrap().tasks[0].steps.is_empty());
}

#[test]
fn mark_step_complete_touches_one_line() {
    let text = mark_step_complete(SAMPLE_PLAN, 1, 2, 2, "statements parse").unwrap();
    assert_eq!(
        without_audit(&text),
        format!("{}\n", SAMPLE_PLAN.replace("- [ ] statements", "- [x] statements"))
    );

    let err = mark_step_complete(&text, 1, 2, 2, "again").unwrap_err();
    assert_eq!(err.to_string(), "mark_step_complete: step 2 of task 1.2 is already complete");

    let err = mark_step_complete(SAMPLE_PLAN, 1, 3, 1, "no steps").unwrap_err();
    assert!(matches!(err, PlanError::NotFound { .. }));
}

// -----------------------------------------------------------------------
// Tasks
// -----------------------------------------------------------------------

#[test]
fn insert_into_empty_thread() {
    let text = insert_task(SAMPLE_PLAN, 3, Placement::End, &task_spec("Publish"), "r").unwrap();
    let expected_task = render_task(3, 1, &task_spec("Publish"));
    assert!(text.contains(&format!("Nothing scheduled yet.\n\n{expected_task}")));
    assert_eq!(tasks_of(&text, 3), vec![(1, "Publish".to_owned())]);
}

#[test]
fn insert_task_with_unknown_anchor_fails() {
    let err = insert_task(SAMPLE_PLAN, 1, Placement::After(4), &task_spec("X"), "r").unwrap_err();
    assert_eq!(err.to_string(), "insert_task: task 1.4 not found");
}

#[test]
fn insert_task_validates_spec_before_anything() {
    let mut spec = task_spec_with_steps("Lexer v2", &["a", ""]);
    spec.classification = Classification::Test;
    let err = insert_task(SAMPLE_PLAN, 1, Placement::End, &spec, "r").unwrap_err();
    assert_eq!(
        err,
        PlanError::MalformedInput {
            op: Operation::InsertTask,
            field: "steps[1].description".to_owned(),
            reason: "required value is empty".to_owned(),
        }
    );
}

#[test]
fn replace_task_keeps_number_and_neighbours() {
    let spec = task_spec_with_steps("Parser rewrite", &["pratt parser"]);
    let text = replace_task(SAMPLE_PLAN, 1, 2, &spec, "new approach").unwrap();
    assert_eq!(
        tasks_of(&text, 1),
        vec![
            (1, "Lexer".to_owned()),
            (2, "Parser rewrite".to_owned()),
            (3, "Pretty printer".to_owned()),
        ]
    );
    assert!(text.contains(&render_task(1, 2, &spec)));
    assert!(!text.contains("error recovery"));
}

#[test]
fn move_task_before_and_after() {
    let text = move_task(SAMPLE_PLAN, 1, 3, Placement::Before(1), "r").unwrap();
    let titles: Vec<String> = tasks_of(&text, 1).into_iter().map(|(_, t)| t).collect();
    assert_eq!(titles, vec!["Pretty printer", "Lexer", "Parser"]);
    assert!(text.contains("### [ ] Task 1.1: Pretty printer"));

    let text = move_task(SAMPLE_PLAN, 1, 1, Placement::After(2), "r").unwrap();
    let titles: Vec<String> = tasks_of(&text, 1).into_iter().map(|(_, t)| t).collect();
    assert_eq!(titles, vec!["Parser", "Lexer", "Pretty printer"]);
}

#[test]
fn move_task_relative_to_itself_is_malformed() {
    let err = move_task(SAMPLE_PLAN, 1, 2, Placement::After(2), "r").unwrap_err();
    assert!(matches!(err, PlanError::MalformedInput { ref field, .. } if field == "placement"));
}

#[test]
fn moved_last_task_is_separated_from_successor() {
    let text = "\
## Thread 1: T

### [ ] Task 1.1: A

- **Classification:** docs
- **Entrypoint:** a
- **Observable:** a
- **Evidence:** a

### [ ] Task 1.2: B

- **Classification:** docs
- **Entrypoint:** b
- **Observable:** b
- **Evidence:** b";
    let out = move_task(text, 1, 2, Placement::Before(1), "r").unwrap();
    assert!(out.starts_with(
        "## Thread 1: T\n\n### [ ] Task 1.1: B\n\n- **Classification:** docs\n- **Entrypoint:** b\n- **Observable:** b\n- **Evidence:** b\n\n### [ ] Task 1.2: A\n"
    ));
}

// -----------------------------------------------------------------------
// Threads
// -----------------------------------------------------------------------

#[test]
fn insert_thread_renumbers_following_threads() {
    let spec = thread_spec("Middle end", &["IR", "Lowering"]);
    let text = insert_thread(SAMPLE_PLAN, Placement::Before(2), &spec, "add IR").unwrap();
    assert_eq!(
        thread_titles(&text),
        vec!["Front end", "Middle end", "Back end", "Release"]
    );
    assert!(text.contains("## Thread 2: Middle end\n\nWork on Middle end.\n\n### [ ] Task 2.1: IR\n"));
    assert!(text.contains("### [ ] Task 3.1: Codegen"));
    assert_eq!(get_thread(&text, 2).unwrap().introduction, "Work on Middle end.");
}

#[test]
fn insert_thread_rejects_heading_in_introduction() {
    let mut spec = thread_spec("Bad", &[]);
    spec.introduction = "fine\n## Thread 9: sneaky".to_owned();
    let err = insert_thread(SAMPLE_PLAN, Placement::End, &spec, "r").unwrap_err();
    assert!(matches!(err, PlanError::MalformedInput { ref field, .. } if field == "introduction"));
}

#[test]
fn insert_thread_nested_task_errors_name_path() {
    let mut spec = thread_spec("Ok", &["first", "second"]);
    spec.tasks[1].evidence = String::new();
    let err = insert_thread(SAMPLE_PLAN, Placement::End, &spec, "r").unwrap_err();
    assert!(err.to_string().contains("tasks[1].evidence"), "{err}");
}

#[test]
fn replace_thread_keeps_number() {
    let spec = thread_spec("Back end v2", &["LLVM"]);
    let text = replace_thread(SAMPLE_PLAN, 2, &spec, "switch backend").unwrap();
    assert_eq!(thread_titles(&text), vec!["Front end", "Back end v2", "Release"]);
    assert_eq!(tasks_of(&text, 2), vec![(1, "LLVM".to_owned())]);
    assert!(!text.contains("Codegen"));
}

#[test]
fn move_thread_to_end_after_audit_exists() {
    let text = move_thread(SAMPLE_PLAN, 1, Placement::End, "front end last").unwrap();
    let text = move_thread(&text, 1, Placement::End, "back end last").unwrap();
    assert_eq!(thread_titles(&text), vec!["Release", "Front end", "Back end"]);
    assert_eq!(audit_entries(&text).len(), 2);
    // The audit trail stays last and separated.
    assert!(text.contains("- **Evidence:** benchmark report\n\n## Audit Trail\n\n"));
}

// -----------------------------------------------------------------------
// Numbering repair
// -----------------------------------------------------------------------

const HAND_EDITED: &str = "\
## Thread 1: A

### [ ] Task 1.1: a1

- **Classification:** docs
- **Entrypoint:** a
- **Observable:** a
- **Evidence:** a

### [ ] Task 1.3: a2

- **Classification:** docs
- **Entrypoint:** a
- **Observable:** a
- **Evidence:** a

## Thread 3: B

### [ ] Task 1.1: b1

- **Classification:** docs
- **Entrypoint:** b
- **Observable:** b
- **Evidence:** b
";

#[test]
fn check_numbering_lists_defects() {
    assert_eq!(
        check_numbering(HAND_EDITED).unwrap(),
        vec![
            NumberingIssue::TaskOutOfSequence {
                thread: 1,
                position: 2,
                found: 3
            },
            NumberingIssue::ThreadOutOfSequence {
                position: 2,
                found: 3
            },
            NumberingIssue::StaleQualifier {
                thread: 2,
                task: 1,
                found: 1
            },
        ]
    );
    assert!(check_numbering(SAMPLE_PLAN).unwrap().is_empty());
}

#[test]
fn repair_numbering_fixes_without_audit() {
    let repaired = repair_numbering(HAND_EDITED).unwrap();
    assert!(check_numbering(&repaired).unwrap().is_empty());
    assert!(repaired.contains("### [ ] Task 1.2: a2"));
    assert!(repaired.contains("## Thread 2: B"));
    assert!(repaired.contains("### [ ] Task 2.1: b1"));
    assert!(audit_entries(&repaired).is_empty());
    assert_eq!(repair_numbering(&repaired).unwrap(), repaired);
}

#[test]
fn duplicate_numbers_block_edits_until_repaired() {
    let text = HAND_EDITED.replace("Task 1.3: a2", "Task 1.1: a2");
    let err = insert_task(&text, 1, Placement::After(1), &task_spec("x"), "r").unwrap_err();
    assert!(matches!(err, PlanError::ParseAmbiguity { .. }));

    let repaired = repair_numbering(&text).unwrap();
    assert!(insert_task(&repaired, 1, Placement::After(1), &task_spec("x"), "r").is_ok());
}

// -----------------------------------------------------------------------
// Formatting conventions
// -----------------------------------------------------------------------

fn bare_newlines(text: &str) -> usize {
    text.split_inclusive('\n')
        .filter(|line| line.ends_with('\n') && !line.ends_with("\r\n"))
        .count()
}

#[test]
fn crlf_document_stays_crlf_through_edits() {
    let mut text = SAMPLE_PLAN.replace('\n', "\r\n");
    text = insert_task(&text, 1, Placement::Before(2), &task_spec("Resolver"), "names").unwrap();
    assert_eq!(bare_newlines(&text), 0, "{text:?}");

    text = add_step(&text, 1, 4, &StepSpec::new("golden files"), None, "r").unwrap();
    text = insert_task(&text, 3, Placement::End, &task_spec("Publish"), "r").unwrap();
    text = insert_thread(&text, Placement::Before(3), &thread_spec("Docs", &["Guide"]), "r")
        .unwrap();
    text = move_thread(&text, 1, Placement::End, "r").unwrap();
    assert_eq!(bare_newlines(&text), 0, "{text:?}");

    assert!(text.contains("## Audit Trail\r\n\r\n- "));
    assert_eq!(audit_entries(&text).len(), 5);
    assert_eq!(
        tasks_of(&text, 4),
        vec![
            (1, "Lexer".to_owned()),
            (2, "Resolver".to_owned()),
            (3, "Parser".to_owned()),
            (4, "Pretty printer".to_owned()),
        ]
    );
}

#[test]
fn indented_introduction_survives_insert() {
    let spec = ThreadSpec {
        title: "Runtime".to_owned(),
        introduction: "    indented code\nmore".to_owned(),
        tasks: vec![task_spec("GC")],
    };
    let text = insert_thread(SAMPLE_PLAN, Placement::End, &spec, "r").unwrap();
    assert!(text.contains("## Thread 4: Runtime\n\n    indented code\nmore\n\n"));
    assert_eq!(get_thread(&text, 4).unwrap().introduction, spec.introduction);
}

#[test]
fn renumbering_keeps_hand_written_heading_spacing() {
    let text = "\
## Thread 1:Alpha

### [ ] Task 1.1:First

- **Classification:** docs
- **Entrypoint:** a
- **Observable:** a
- **Evidence:** a

## Thread 2:   Beta
";
    let out = reorder_threads(text, &[2, 1], "beta first").unwrap();
    assert!(out.starts_with("## Thread 1:   Beta\n"), "{out}");
    assert!(out.contains("\n## Thread 2:Alpha\n\n### [ ] Task 2.1:First\n"), "{out}");
    assert_eq!(thread_titles(&out), vec!["  Beta", "Alpha"]);
}
