use super::{Task, TaskPriority, TaskStatus};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use uuid::Uuid;

pub const CATEGORY_POOL: [&str; 6] = ["work", "personal", "learning", "home", "health", "finance"];
pub const TAG_POOL: [&str; 7] = ["angular", "ngrx", "testing", "bug", "feature", "chore", "docs"];

const VERBS: [&str; 8] = [
    "Refactor", "Review", "Document", "Fix", "Plan", "Deploy", "Test", "Clean up",
];
const ADJECTIVES: [&str; 8] = [
    "flaky", "legacy", "shared", "async", "primary", "offline", "redundant", "mobile",
];
const NOUNS: [&str; 8] = [
    "login form", "build pipeline", "search index", "billing report", "cache layer",
    "settings page", "onboarding flow", "release notes",
];
const SENTENCES: [&str; 8] = [
    "Check with the team before starting.",
    "Keep the change small enough to review in one sitting.",
    "Follow up on the open questions from last week.",
    "Make sure the edge cases are covered.",
    "Coordinate with design on the final layout.",
    "Update the tracker once this lands.",
    "Split the work if it grows past a day.",
    "Pair with someone who knows this area.",
];

const MAX_CREATED_DAYS_AGO: i64 = 30;
const DUE_OFFSET_DAYS: std::ops::RangeInclusive<i64> = -10..=30;

fn pick<'a>(pool: &[&'a str], rng: &mut impl Rng) -> &'a str {
    pool.choose(rng).copied().unwrap_or_default()
}

fn pick_several(pool: &[&str], min: usize, max: usize, rng: &mut impl Rng) -> Vec<String> {
    let amount = rng.gen_range(min..=max);
    pool.choose_multiple(rng, amount)
        .map(|label| (*label).to_owned())
        .collect()
}

/// Builds `count` randomized tasks for the owner. Creation times fall within the 30 days
/// before `now` and due dates land between 10 days before and 30 days after creation.
pub fn generate_tasks(owner_id: &str, count: usize, now: DateTime<Utc>, rng: &mut impl Rng) -> Vec<Task> {
    (0..count)
        .map(|_| {
            let created_at = now - Duration::days(rng.gen_range(0..=MAX_CREATED_DAYS_AGO));
            let due_date = created_at + Duration::days(rng.gen_range(DUE_OFFSET_DAYS));
            let sentence_count = rng.gen_range(1..=3);
            let description = (0..sentence_count)
                .map(|_| pick(&SENTENCES, rng))
                .collect::<Vec<_>>()
                .join(" ");

            Task {
                id: Uuid::new_v4().to_string(),
                owner_id: owner_id.to_owned(),
                title: format!(
                    "{} the {} {}",
                    pick(&VERBS, rng),
                    pick(&ADJECTIVES, rng),
                    pick(&NOUNS, rng)
                ),
                description,
                status: TaskStatus::ALL.choose(rng).copied().unwrap_or_default(),
                priority: TaskPriority::ALL.choose(rng).copied().unwrap_or_default(),
                categories: pick_several(&CATEGORY_POOL, 1, 2, rng),
                tags: pick_several(&TAG_POOL, 0, 3, rng),
                due_date: Some(due_date),
                created_at,
                updated_at: created_at,
            }
        })
        .collect()
}
