//! Sample catalogue loaded into a fresh marketplace.

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::info;

use skillswap_domain::{Listing, ListingId, ListingType, SkillLevel, User, UserId};
use skillswap_store::Store;

use crate::error::EngineResult;

const AVATAR_BASE: &str = "https://api.dicebear.com/7.x/lorelei/svg";

fn sample_user(id: &str, name: &str, email: &str, college: &str, avatar: &str) -> User {
    User {
        id: UserId::new(id),
        name: name.to_string(),
        email: email.to_string(),
        college: college.to_string(),
        branch: "General Studies".to_string(),
        year: "Class of 2026".to_string(),
        avatar: format!("{AVATAR_BASE}?{avatar}"),
        skills: BTreeSet::new(),
        reputation: 5.0,
        trades_completed: 0,
    }
}

/// Owners of the sample listings.
pub fn sample_users() -> Vec<User> {
    vec![
        sample_user(
            "u1",
            "Sarah Lee",
            "sarah@mit.edu",
            "MIT Community",
            "seed=Sarah&hair=long06&accessory=glasses",
        ),
        sample_user(
            "u2",
            "David Chen",
            "david@stanford.edu",
            "STANFORD Community",
            "seed=David&hair=short01&eyebrows=variant03",
        ),
        sample_user(
            "u3",
            "Elena Rodriguez",
            "elena@berkeley.edu",
            "BERKELEY Community",
            "seed=Elena&hair=long01&mouth=happy02",
        ),
        sample_user(
            "u4",
            "Marcus Aurelius",
            "marcus@gmail.com",
            "Independent Learner",
            "seed=Marcus&hair=short05&beard=variant02",
        ),
    ]
}

struct SampleListing {
    id: &'static str,
    owner: usize,
    listing_type: ListingType,
    title: &'static str,
    description: &'static str,
    category: &'static str,
    level: Option<SkillLevel>,
    duration: Option<&'static str>,
    tags: &'static [&'static str],
}

const SAMPLE_LISTINGS: [SampleListing; 4] = [
    SampleListing {
        id: "l1",
        owner: 0,
        listing_type: ListingType::Material,
        title: "Operating Systems - Unit 3 Notes",
        description: "Detailed handwritten notes on CPU scheduling, Memory Management, and Deadlocks. Perfect for exam prep.",
        category: "Computer Science",
        level: None,
        duration: None,
        tags: &["os", "exam prep", "mit"],
    },
    SampleListing {
        id: "l2",
        owner: 1,
        listing_type: ListingType::Skill,
        title: "Python for Data Science Tutoring",
        description: "One-on-one session covering Pandas, NumPy and Matplotlib. I can help with your semester projects.",
        category: "Programming",
        level: Some(SkillLevel::Intermediate),
        duration: Some("1 Hour"),
        tags: &["python", "data science", "tutoring"],
    },
    SampleListing {
        id: "l3",
        owner: 2,
        listing_type: ListingType::Material,
        title: "Organic Chemistry Model Kit",
        description: "Hardly used model kit for 3D molecular structures. Looking to swap for Calculus 2 help.",
        category: "Chemistry",
        level: None,
        duration: None,
        tags: &["chemistry", "stem", "models"],
    },
    SampleListing {
        id: "l4",
        owner: 3,
        listing_type: ListingType::Skill,
        title: "Philosophy & Critical Thinking",
        description: "Deep dive into Stoicism and logic. Great for improving your analytical essay writing skills.",
        category: "Humanities",
        level: Some(SkillLevel::Advanced),
        duration: Some("45 Mins"),
        tags: &["philosophy", "essays", "logic"],
    },
];

/// The sample listings in feed order (l1 first).
pub fn sample_listings() -> Vec<Listing> {
    let users = sample_users();
    let now = Utc::now();

    SAMPLE_LISTINGS
        .iter()
        .map(|sample| {
            let owner = &users[sample.owner];
            Listing {
                id: ListingId::new(sample.id),
                user_id: owner.id.clone(),
                user_name: owner.name.clone(),
                user_avatar: owner.avatar.clone(),
                listing_type: sample.listing_type,
                title: sample.title.to_string(),
                description: sample.description.to_string(),
                category: sample.category.to_string(),
                level: sample.level,
                mode: None,
                duration: sample.duration.map(str::to_string),
                tags: sample.tags.iter().map(|t| t.to_string()).collect(),
                created_at: now,
                media_url: None,
            }
        })
        .collect()
}

/// Load the sample users and listings into `store`.
///
/// Listings are created last-to-first because the store prepends, which
/// leaves the feed in catalogue order.
pub async fn seed_store<S: Store>(store: &S) -> EngineResult<()> {
    let users = sample_users();
    for user in &users {
        store.users().save(user).await?;
    }

    let listings = sample_listings();
    for listing in listings.iter().rev() {
        store.listings().create(listing).await?;
    }

    info!(users = users.len(), listings = listings.len(), "Seeded sample catalogue");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillswap_store::MemoryStore;

    #[tokio::test]
    async fn test_seed_keeps_catalogue_order() {
        let store = MemoryStore::new();
        seed_store(&store).await.unwrap();

        let ids: Vec<String> = store
            .listings()
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.id.to_string())
            .collect();
        assert_eq!(ids, vec!["l1", "l2", "l3", "l4"]);
        assert_eq!(store.users().list_all().await.unwrap().len(), 4);
    }

    #[test]
    fn test_sample_listings_carry_owner_fields() {
        let listings = sample_listings();
        let users = sample_users();
        for listing in &listings {
            let owner = users.iter().find(|u| u.id == listing.user_id).unwrap();
            assert_eq!(listing.user_name, owner.name);
            assert_eq!(listing.user_avatar, owner.avatar);
        }
    }

    #[tokio::test]
    async fn test_seeding_twice_is_rejected() {
        let store = MemoryStore::new();
        seed_store(&store).await.unwrap();
        assert!(seed_store(&store).await.is_err());
    }
}
