/// Template bank loading, linting, and override integration tests.

use shorts_planner::core::assembler::{builtin_bank, lint_bank, REQUIRED_SLOTS};
use shorts_planner::core::template::{TemplateBank, TemplateSegment};
use shorts_planner::{Length, ListTargets, PlanError, PlanRequest, Planner, Platform};

#[test]
fn builtin_bank_file_matches_embedded_copy() {
    let path = std::path::Path::new("bank_data/templates.ron");
    let from_file = TemplateBank::load_from_ron(path).unwrap();
    let embedded = builtin_bank().unwrap();
    assert_eq!(from_file.slots.len(), embedded.slots.len());
    for name in REQUIRED_SLOTS {
        assert_eq!(
            from_file.slots[*name].entries.len(),
            embedded.slots[*name].entries.len(),
            "slot {} differs",
            name
        );
    }
}

#[test]
fn all_slots_have_minimum_entries() {
    let bank = builtin_bank().unwrap();
    for (name, slot) in &bank.slots {
        assert!(
            slot.entries.len() >= 5,
            "Slot '{}' has only {} entries (minimum 5 expected)",
            name,
            slot.entries.len()
        );
    }
}

#[test]
fn no_broken_slot_references() {
    let bank = builtin_bank().unwrap();
    for (name, slot) in &bank.slots {
        for entry in &slot.entries {
            for segment in &entry.template.segments {
                if let TemplateSegment::SlotRef(target) = segment {
                    assert!(
                        bank.slots.contains_key(target.as_str()),
                        "Slot '{}' references non-existent slot '{}'",
                        name,
                        target
                    );
                }
            }
        }
    }
}

#[test]
fn builtin_bank_covers_every_platform_and_tone() {
    let report = lint_bank(builtin_bank().unwrap(), &ListTargets::default());
    assert!(report.is_clean(), "errors: {:?}", report.errors);
    assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);
}

#[test]
fn broken_bank_fails_to_build() {
    let err = Planner::builder()
        .bank_file("tests/fixtures/broken_bank.ron")
        .build()
        .unwrap_err();
    match err {
        PlanError::InvalidBank(errors) => {
            assert!(
                errors.iter().any(|e| e.contains("missing_phrase")),
                "errors: {:?}",
                errors
            );
        }
        other => panic!("expected InvalidBank, got {:?}", other),
    }
}

#[test]
fn missing_bank_file_is_io_error() {
    let err = Planner::builder()
        .bank_file("tests/fixtures/does_not_exist.ron")
        .build()
        .unwrap_err();
    assert!(matches!(err, PlanError::Template(_)), "got {:?}", err);
}

#[test]
fn override_bank_changes_only_its_slot() {
    let base = Planner::builder().build().unwrap();
    let overridden = Planner::builder()
        .bank_file("tests/fixtures/override_bank.ron")
        .build()
        .unwrap();

    let mut request = PlanRequest::new(Length::Thirty, Platform::YouTube, 11);
    request.topic = "Editing faster".to_string();

    let a = base.generate(&request).unwrap();
    let b = overridden.generate(&request).unwrap();
    assert!(b.hook.starts_with("OVERRIDE:"));
    assert!(!a.hook.starts_with("OVERRIDE:"));
    assert_eq!(a.beats.len(), b.beats.len());
    assert_eq!(a.total_duration(), b.total_duration());
}

#[test]
fn config_file_sets_list_targets() {
    let planner = Planner::builder()
        .config_file("tests/fixtures/targets.ron")
        .build()
        .unwrap();
    assert_eq!(planner.targets().broll, 3);

    let mut request = PlanRequest::new(Length::Sixty, Platform::Instagram, 4);
    request.topic = "Color grading".to_string();
    let plan = planner.generate(&request).unwrap();
    assert_eq!(plan.broll_ideas.len(), 3);
    assert_eq!(plan.transitions.len(), ListTargets::default().transitions);
}
