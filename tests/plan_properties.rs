/// Plan generation properties — determinism, timing, remix variety, hygiene.

use shorts_planner::core::timeline::beat_count_range;
use shorts_planner::{generate, Length, PlanForm, PlanRequest, Platform};
use shorts_planner::schema::request::FormLength;

fn example_request(seed: i64) -> PlanRequest {
    PlanRequest {
        topic: "Turn long tutorials into bingeable YouTube Shorts".to_string(),
        audience: "solo content creators".to_string(),
        tone: "high-energy".to_string(),
        goal: "grow a loyal audience".to_string(),
        product: String::new(),
        call_to_action: "Follow for the full workflow".to_string(),
        keywords: vec![
            "shorts workflow".to_string(),
            "content batching".to_string(),
            "repurposing".to_string(),
        ],
        length: Length::Thirty,
        platform: Platform::YouTube,
        seed,
    }
}

fn empty_request(length: Length, platform: Platform, seed: i64) -> PlanRequest {
    PlanRequest::new(length, platform, seed)
}

#[test]
fn example_scenario() {
    let plan = generate(&example_request(42)).unwrap();

    assert!(
        plan.beats.len() == 3 || plan.beats.len() == 4,
        "expected 3 or 4 beats, got {}",
        plan.beats.len()
    );
    assert_eq!(plan.total_duration(), 30);
    assert!(!plan.hook.is_empty());
    assert!(
        plan.hashtags.iter().any(|h| h.contains("shortsworkflow")),
        "hashtags missing keyword slug: {:?}",
        plan.hashtags
    );
}

#[test]
fn deterministic_for_same_seed() {
    for seed in [-1000, -1, 0, 1, 42, i64::MAX, i64::MIN] {
        let request = example_request(seed);
        assert_eq!(generate(&request).unwrap(), generate(&request).unwrap(), "seed {}", seed);
    }
}

#[test]
fn durations_sum_to_length_for_every_option() {
    for length in Length::ALL {
        for platform in Platform::ALL {
            for seed in 0..60 {
                let mut request = example_request(seed);
                request.length = length;
                request.platform = platform;
                let plan = generate(&request).unwrap();
                assert_eq!(
                    plan.total_duration(),
                    length.seconds(),
                    "{:?}/{:?} seed {}",
                    length,
                    platform,
                    seed
                );
                assert!(plan.beats.iter().all(|b| b.duration > 0));
            }
        }
    }
}

#[test]
fn beat_count_policy_holds() {
    for length in Length::ALL {
        let (lo, hi) = beat_count_range(length);
        for seed in 0..60 {
            let mut request = example_request(seed);
            request.length = length;
            let n = generate(&request).unwrap().beats.len();
            assert!(n >= lo && n <= hi, "{:?} seed {} produced {} beats", length, seed, n);
        }
    }
    for seed in 0..60 {
        let mut request = example_request(seed);
        request.length = Length::Fifteen;
        assert_eq!(generate(&request).unwrap().beats.len(), 2);
    }
}

#[test]
fn remix_changes_opening_voiceover() {
    let pairs = 100;
    let mut changed = 0;
    for seed in 0..pairs {
        let request = example_request(seed);
        let a = generate(&request).unwrap();
        let b = generate(&request.remixed()).unwrap();
        if a.beats[0].voiceover != b.beats[0].voiceover {
            changed += 1;
        }
    }
    assert!(
        changed * 10 >= pairs * 9,
        "only {} of {} adjacent seeds changed the opening voiceover",
        changed,
        pairs
    );
}

#[test]
fn remix_without_keywords_also_varies() {
    let pairs = 100;
    let mut changed = 0;
    for seed in 0..pairs {
        let mut request = example_request(seed);
        request.keywords.clear();
        let a = generate(&request).unwrap();
        let b = generate(&request.remixed()).unwrap();
        if a.beats[0].voiceover != b.beats[0].voiceover {
            changed += 1;
        }
    }
    assert!(changed * 10 >= pairs * 9, "{} of {}", changed, pairs);
}

#[test]
fn no_placeholders_with_empty_fields() {
    for length in Length::ALL {
        for platform in Platform::ALL {
            for seed in 0..20 {
                let plan = generate(&empty_request(length, platform, seed)).unwrap();
                for text in plan.texts() {
                    assert!(
                        !text.contains('{') && !text.contains('}'),
                        "unresolved placeholder in {:?}",
                        text
                    );
                    assert!(!text.contains('[') && !text.contains(']'), "stray group in {:?}", text);
                    assert!(!text.contains("  "), "double space in {:?}", text);
                }
            }
        }
    }
}

#[test]
fn lists_non_empty_for_any_brief() {
    for seed in 0..20 {
        let plan = generate(&empty_request(Length::FortyFive, Platform::TikTok, seed)).unwrap();
        assert!(!plan.broll_ideas.is_empty());
        assert!(!plan.transitions.is_empty());
        assert!(!plan.captions.is_empty());
        assert!(!plan.hashtags.is_empty());
        assert!(!plan.posting_notes.is_empty());
        assert!(!plan.hook.is_empty());
        assert!(!plan.promise.is_empty());
        assert!(!plan.call_to_action.is_empty());
        assert!(!plan.music_cue.is_empty());
    }
}

#[test]
fn every_keyword_reaches_a_sixty_second_plan() {
    for seed in 0..50 {
        let mut request = example_request(seed);
        request.length = Length::Sixty;
        let plan = generate(&request).unwrap();
        let beat_text: String = plan
            .beats
            .iter()
            .map(|b| format!("{} {} ", b.voiceover, b.visuals).to_lowercase())
            .collect();
        for keyword in &request.keywords {
            assert!(
                beat_text.contains(keyword.as_str()),
                "seed {}: keyword {:?} missing from beats",
                seed,
                keyword
            );
        }
    }
}

#[test]
fn blank_keywords_are_ignored() {
    let mut request = example_request(9);
    request.keywords = vec!["".to_string(), "   ".to_string()];
    let plan = generate(&request).unwrap();
    for text in plan.texts() {
        assert!(!text.contains("''"), "empty keyword leaked into {:?}", text);
    }
    assert!(!plan.hashtags.contains(&"#".to_string()));
}

#[test]
fn call_to_action_is_woven_in() {
    let plan = generate(&example_request(3)).unwrap();
    assert!(
        plan.call_to_action.contains("ollow for the full workflow"),
        "got {:?}",
        plan.call_to_action
    );
}

#[test]
fn platform_tags_follow_platform() {
    let youtube = ["#shorts", "#youtubeshorts", "#ytshorts"];
    for seed in 0..20 {
        let mut request = empty_request(Length::Thirty, Platform::TikTok, seed);
        request.topic = "x".to_string();
        let plan = generate(&request).unwrap();
        assert!(
            !plan.hashtags.iter().any(|h| youtube.contains(&h.as_str())),
            "YouTube tag on a TikTok plan: {:?}",
            plan.hashtags
        );
    }
}

#[test]
fn every_plan_carries_a_tag_for_its_platform() {
    let platform_tags = [
        (Platform::YouTube, ["#shorts", "#youtubeshorts", "#ytshorts"]),
        (Platform::Instagram, ["#reels", "#instareels", "#reelsinstagram"]),
        (Platform::TikTok, ["#fyp", "#learnontiktok", "#tiktoktips"]),
    ];
    for (platform, tags) in platform_tags {
        for seed in 0..200 {
            let mut request = example_request(seed);
            request.platform = platform;
            let plan = generate(&request).unwrap();
            assert!(
                plan.hashtags.iter().any(|h| tags.contains(&h.as_str())),
                "{} seed {} has no platform tag: {:?}",
                platform,
                seed,
                plan.hashtags
            );
        }
    }
}

#[test]
fn punctuated_call_to_action_reads_cleanly() {
    for seed in 0..200 {
        let mut request = example_request(seed);
        request.call_to_action = "Follow now!".to_string();
        let plan = generate(&request).unwrap();
        for text in plan.texts() {
            for artifact in ["!.", "!,", "?.", "..", ".,"] {
                assert!(!text.contains(artifact), "seed {}: {:?}", seed, text);
            }
        }
    }
}

#[test]
fn sentences_start_with_a_capital() {
    for seed in 0..200 {
        let mut request = example_request(seed);
        request.topic = "meal prep".to_string();
        request.tone = "high-energy".to_string();
        let plan = generate(&request).unwrap();
        for text in plan.texts() {
            let chars: Vec<char> = text.chars().collect();
            for w in chars.windows(3) {
                if matches!(w[0], '.' | '!' | '?') && w[1] == ' ' {
                    assert!(!w[2].is_lowercase(), "seed {}: {:?}", seed, text);
                }
            }
        }
    }
}

#[test]
fn different_seeds_return_independent_plans() {
    let a = generate(&example_request(1)).unwrap();
    let b = generate(&example_request(2)).unwrap();
    assert_ne!(a, b);
}

#[test]
fn form_to_plan_end_to_end() {
    let form = PlanForm {
        topic: "Meal prep for the week".to_string(),
        audience: "busy parents".to_string(),
        tone: "friendly".to_string(),
        keywords: "batch cooking, freezer meals, ,".to_string(),
        length: FormLength::Text("45".to_string()),
        platform: "Instagram".to_string(),
        seed: 7,
        ..PlanForm::default()
    };
    let request = form.normalize().unwrap();
    assert_eq!(request.keywords.len(), 2);
    let plan = generate(&request).unwrap();
    assert_eq!(plan.total_duration(), 45);
    assert!(plan.hashtags.contains(&"#batchcooking".to_string()));
}

#[test]
fn malformed_form_is_invalid_argument() {
    let form = PlanForm {
        length: FormLength::Number(90),
        platform: "YouTube".to_string(),
        ..PlanForm::default()
    };
    let err = form.normalize().unwrap_err();
    assert!(err.to_string().contains("length"), "got {}", err);
}
