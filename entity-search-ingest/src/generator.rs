//! Synthetic entity generator.

use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::{Builder, Uuid};

use entity_search_shared::{Entity, Event, JobPost};

const SALARY_MIN: u32 = 30_000;
const SALARY_MAX: u32 = 150_000;

/// Events and job posts get this many entries, inclusive.
const MIN_CHILDREN: usize = 1;
const MAX_CHILDREN: usize = 3;

const TAG_COUNT: usize = 3;

/// Event timestamps fall within this many seconds before now.
const EVENT_WINDOW_SECS: i64 = 86_400;

const SURNAMES: &[&str] = &[
    "Abbott", "Barton", "Carroll", "Dietrich", "Emard", "Fahey", "Gislason", "Hahn", "Jacobs",
    "Kemmer", "Larkin", "Mertz", "Nolan", "Okuneva", "Prosacco", "Quigley", "Runolfsdottir",
    "Schinner", "Towne", "Upton", "Vandervort", "Walker", "Yundt", "Zboncak",
];

const COMPANY_SUFFIXES: &[&str] = &["Inc", "LLC", "Group", "and Sons", "Ltd", "Partners"];

const JOB_LEVELS: &[&str] = &[
    "Senior", "Junior", "Lead", "Principal", "Chief", "Associate", "Regional", "Global",
];

const JOB_AREAS: &[&str] = &[
    "Marketing", "Security", "Infrastructure", "Accounts", "Research", "Operations",
    "Integration", "Quality", "Data", "Mobility",
];

const JOB_TYPES: &[&str] = &[
    "Engineer", "Analyst", "Designer", "Manager", "Consultant", "Architect", "Officer",
    "Specialist", "Coordinator", "Strategist",
];

const WORDS: &[&str] = &[
    "alpha", "beacon", "canvas", "delta", "ember", "fabric", "granite", "harbor", "ion",
    "jasper", "kernel", "lumen", "meridian", "nimbus", "orbit", "pixel", "quartz", "relay",
    "summit", "tandem", "vector", "willow", "zenith", "cobalt", "signal", "atlas", "forge",
    "lattice", "prism", "vertex",
];

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, words: &[&'a str]) -> &'a str {
    words.choose(rng).copied().unwrap_or_default()
}

fn random_uuid<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    Builder::from_random_bytes(rng.gen()).into_uuid()
}

fn random_words<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<&'static str> {
    (0..count).map(|_| pick(rng, WORDS)).collect()
}

fn random_sentence<R: Rng + ?Sized>(rng: &mut R, min_words: usize, max_words: usize) -> String {
    let count = rng.gen_range(min_words..=max_words);
    let mut sentence = random_words(rng, count).join(" ");
    if let Some(first) = sentence.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    sentence.push('.');
    sentence
}

fn random_paragraph<R: Rng + ?Sized>(rng: &mut R) -> String {
    let count = rng.gen_range(3..=5);
    (0..count)
        .map(|_| random_sentence(rng, 4, 10))
        .collect::<Vec<_>>()
        .join(" ")
}

fn company_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    if rng.gen_bool(0.5) {
        format!("{} {}", pick(rng, SURNAMES), pick(rng, COMPANY_SUFFIXES))
    } else {
        format!("{}, {} and {}", pick(rng, SURNAMES), pick(rng, SURNAMES), pick(rng, SURNAMES))
    }
}

fn job_title<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "{} {} {}",
        pick(rng, JOB_LEVELS),
        pick(rng, JOB_AREAS),
        pick(rng, JOB_TYPES)
    )
}

fn tags<R: Rng + ?Sized>(rng: &mut R) -> Vec<String> {
    random_words(rng, TAG_COUNT)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Generate one entity using `rng` for every random choice.
///
/// Each entity gets 1 to 3 events dated within the last day and 1 to 3 job
/// posts that point back at it.
pub fn generate_entity_with<R: Rng + ?Sized>(rng: &mut R) -> Entity {
    let entity_id = random_uuid(rng);
    let now = Utc::now();

    let event_count = rng.gen_range(MIN_CHILDREN..=MAX_CHILDREN);
    let events = (0..event_count)
        .map(|_| Event {
            event_id: random_uuid(rng),
            name: random_sentence(rng, 2, 6),
            description: random_paragraph(rng),
            timestamp: now - Duration::seconds(rng.gen_range(0..EVENT_WINDOW_SECS)),
        })
        .collect();

    let job_post_count = rng.gen_range(MIN_CHILDREN..=MAX_CHILDREN);
    let job_posts = (0..job_post_count)
        .map(|_| JobPost {
            id: random_uuid(rng),
            entity_id,
            title: job_title(rng),
            description: random_paragraph(rng),
            salary: rng.gen_range(SALARY_MIN..=SALARY_MAX),
            tags: tags(rng),
        })
        .collect();

    Entity {
        entity_id,
        name: company_name(rng),
        description: random_paragraph(rng),
        tags: tags(rng),
        events,
        job_posts,
    }
}

/// Generate one entity with the thread-local RNG.
pub fn generate_entity() -> Entity {
    generate_entity_with(&mut rand::thread_rng())
}

/// Generate `count` entities with the thread-local RNG.
pub fn generate_batch(count: usize) -> Vec<Entity> {
    let mut rng = rand::thread_rng();
    (0..count).map(|_| generate_entity_with(&mut rng)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_generated_entities_respect_bounds() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..500 {
            let entity = generate_entity_with(&mut rng);

            assert!((1..=3).contains(&entity.events.len()));
            assert!((1..=3).contains(&entity.job_posts.len()));
            assert_eq!(entity.tags.len(), 3);
            assert!(!entity.name.is_empty());
            for post in &entity.job_posts {
                assert!((30_000..=150_000).contains(&post.salary));
                assert_eq!(post.entity_id, entity.entity_id);
            }
        }
    }

    #[test]
    fn test_child_counts_cover_full_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut event_counts = HashSet::new();
        let mut job_post_counts = HashSet::new();

        for _ in 0..200 {
            let entity = generate_entity_with(&mut rng);
            event_counts.insert(entity.events.len());
            job_post_counts.insert(entity.job_posts.len());
        }

        assert_eq!(event_counts, HashSet::from([1, 2, 3]));
        assert_eq!(job_post_counts, HashSet::from([1, 2, 3]));
    }

    #[test]
    fn test_event_timestamps_are_recent() {
        let mut rng = StdRng::seed_from_u64(3);
        let before = Utc::now();
        let entity = generate_entity_with(&mut rng);
        let after = Utc::now();

        for event in &entity.events {
            assert!(event.timestamp <= after);
            assert!(event.timestamp > before - Duration::seconds(EVENT_WINDOW_SECS));
        }
    }

    #[test]
    fn test_identifiers_are_v4_and_unique() {
        let batch = generate_batch(100);

        let mut ids = HashSet::new();
        for entity in &batch {
            assert_eq!(entity.entity_id.get_version_num(), 4);
            assert!(ids.insert(entity.entity_id));
            for event in &entity.events {
                assert!(ids.insert(event.event_id));
            }
            for post in &entity.job_posts {
                assert!(ids.insert(post.id));
            }
        }
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let first = generate_entity_with(&mut StdRng::seed_from_u64(42));
        let second = generate_entity_with(&mut StdRng::seed_from_u64(42));

        assert_eq!(first.entity_id, second.entity_id);
        assert_eq!(first.name, second.name);
        assert_eq!(first.job_posts.len(), second.job_posts.len());
    }

    #[test]
    fn test_generate_entity_serializes_timestamps_as_rfc3339() {
        let value = serde_json::to_value(generate_entity()).unwrap();

        let timestamp = value["events"][0]["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }
}
