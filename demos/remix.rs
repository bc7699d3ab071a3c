/// Remix demo — one brief, three seeds, three different plans.
///
/// Run with: cargo run --example remix

use shorts_planner::{generate, script_text, Length, PlanRequest, Platform};

fn main() {
    let mut request = PlanRequest::new(Length::Thirty, Platform::TikTok, 2026);
    request.topic = "Turn long tutorials into bingeable Shorts".to_string();
    request.audience = "solo content creators".to_string();
    request.tone = "high-energy".to_string();
    request.call_to_action = "Follow for part two".to_string();
    request.keywords = vec![
        "shorts workflow".to_string(),
        "content batching".to_string(),
        "repurposing".to_string(),
    ];

    for _ in 0..3 {
        let plan = generate(&request).expect("built-in bank generates");
        println!("--- seed {} ---", request.seed);
        println!("Hook: {}", plan.hook);
        println!("{}", script_text(&plan));
        println!("Hashtags: {}\n", plan.hashtags.join(" "));

        // Remix: same brief, next seed.
        request = request.remixed();
    }
}
