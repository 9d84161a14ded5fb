//! E2E tests: full marketplace sessions over the in-memory store.
//!
//! Flow:
//! 1. Seed the sample catalogue
//! 2. Sign up, post listings, search the feed
//! 3. Propose, accept and complete a swap from both sides
//! 4. Edit the profile and check every owned listing follows

use std::sync::Arc;

use skillswap_domain::{
    ListingDraft, ListingId, ListingType, TradeAction, TradeRole, TradeStatus, TypeFilter, UserId,
};
use skillswap_engine::{seed_store, EngineError, Marketplace};
use skillswap_store::{MemoryStorage, MemoryStore, Store};

async fn seeded() -> Marketplace<MemoryStore, MemoryStorage> {
    let store = Arc::new(MemoryStore::new());
    seed_store(store.as_ref()).await.unwrap();
    Marketplace::new(store, Arc::new(MemoryStorage::new()))
}

// =============================================================================
// Test: Swap lifecycle
// =============================================================================

#[tokio::test]
async fn test_skill_swap_lifecycle() {
    let market = seeded().await;

    // u1 (Sarah) posts a skill
    let sarah = market.store().users().find_by_id(&UserId::new("u1")).await.unwrap().unwrap();
    let calc = market
        .listings
        .create(&sarah, ListingDraft::new(ListingType::Skill, "Calc Help", "Series", "Math"))
        .await
        .unwrap();

    // Newest first
    let feed = market.feed.feed(TypeFilter::All, "").await.unwrap();
    assert_eq!(feed[0].id, calc.id);
    assert_eq!(feed.len(), 5);

    // u2 (David) offers his tutoring for it
    let david = UserId::new("u2");
    let offer = market.feed.tradable_items(&david).await.unwrap();
    assert_eq!(offer.len(), 1);

    let trade = market.trades.propose(&sarah.id, &calc.id, &offer[0].id, &david).await.unwrap();
    assert_eq!(trade.status, TradeStatus::Pending);

    // Requester sees no actions yet, provider can accept or reject
    let views = market.trades.trades_for(&david).await.unwrap();
    assert_eq!(views[0].role, TradeRole::Requester);
    assert!(views[0].actions.is_empty());

    let views = market.trades.trades_for(&sarah.id).await.unwrap();
    assert_eq!(views[0].actions, vec![TradeAction::Accept, TradeAction::Reject]);

    market.trades.act(&trade.id, &sarah.id, TradeAction::Accept).await.unwrap();

    let views = market.trades.trades_for(&david).await.unwrap();
    assert_eq!(views[0].trade.status, TradeStatus::Accepted);
    assert_eq!(views[0].actions, vec![TradeAction::Complete]);

    // Either side may complete
    let done = market.trades.complete(&trade.id, &david).await.unwrap();
    assert_eq!(done.status, TradeStatus::Completed);
    assert!(market.trades.trades_for(&sarah.id).await.unwrap()[0].actions.is_empty());

    // Completed is terminal
    let result = market.trades.reject(&trade.id, &sarah.id).await;
    assert!(matches!(
        result,
        Err(EngineError::InvalidTransition { from: TradeStatus::Completed, to: TradeStatus::Rejected })
    ));
    let stored = market.trades.find(&trade.id).await.unwrap();
    assert_eq!(stored.status, TradeStatus::Completed);
}

#[tokio::test]
async fn test_rejected_trade_is_terminal() {
    let market = seeded().await;
    let trade = market
        .trades
        .propose(&UserId::new("u3"), &ListingId::new("l3"), &ListingId::new("l4"), &UserId::new("u4"))
        .await
        .unwrap();

    market.trades.reject(&trade.id, &UserId::new("u3")).await.unwrap();

    for status in [TradeStatus::Accepted, TradeStatus::Completed, TradeStatus::Pending] {
        let result = market.trades.update_status(&trade.id, &UserId::new("u3"), status).await;
        assert!(matches!(result, Err(EngineError::InvalidTransition { .. })), "{status}");
    }
}

#[tokio::test]
async fn test_unknown_trade_is_not_found() {
    let market = seeded().await;
    let result = market.trades.accept(&"t-missing".into(), &UserId::new("u1")).await;
    assert!(matches!(result, Err(EngineError::NotFound { .. })));
}

// =============================================================================
// Test: Feed search
// =============================================================================

#[tokio::test]
async fn test_feed_filters_by_type_and_query() {
    let market = seeded().await;

    let materials = market.feed.feed(TypeFilter::Material, "chemistry").await.unwrap();
    assert_eq!(materials.len(), 1);
    assert_eq!(materials[0].id, ListingId::new("l3"));

    // Case-insensitive
    let tagged = market.feed.feed(TypeFilter::All, "LOGIC").await.unwrap();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].id, ListingId::new("l4"));

    // Spaces are matched literally; only a blank query means "everything"
    assert!(market.feed.feed(TypeFilter::All, "  LOGIC ").await.unwrap().is_empty());
    assert_eq!(market.feed.feed(TypeFilter::All, "   ").await.unwrap().len(), 4);

    let skills = market.feed.feed(TypeFilter::Skill, "").await.unwrap();
    assert!(skills.iter().all(|l| l.listing_type == ListingType::Skill));
    assert_eq!(skills.len(), 2);

    assert!(market.feed.feed(TypeFilter::All, "quantum").await.unwrap().is_empty());
}

// =============================================================================
// Test: Profile edits propagate
// =============================================================================

#[tokio::test]
async fn test_profile_edit_updates_owned_listings() {
    let market = seeded().await;

    let me = market.profile.login("sarah@mit.edu").await.unwrap();
    assert_eq!(me.id, UserId::new("u1"));

    let mut edited = me.clone();
    edited.name = "Sarah L.".to_string();
    let outcome = market.profile.update(edited).await.unwrap();
    assert!(outcome.persisted);
    assert_eq!(outcome.listings_synced, 1);

    let listings = market.store().listings().list_all().await.unwrap();
    for listing in listings {
        if listing.user_id == me.id {
            assert_eq!(listing.user_name, "Sarah L.");
        } else {
            assert_ne!(listing.user_name, "Sarah L.");
        }
    }
}

#[tokio::test]
async fn test_avatar_change_reaches_only_own_listings() {
    let market = seeded().await;
    let before = market.store().listings().list_all().await.unwrap();

    let me = market.profile.login("sarah@mit.edu").await.unwrap();
    market
        .listings
        .create(&me, ListingDraft::new(ListingType::Skill, "Calc Help", "Series", "Math"))
        .await
        .unwrap();

    let mut edited = me.clone();
    edited.avatar = "https://example.com/sarah-new.png".to_string();
    let outcome = market.profile.update(edited).await.unwrap();
    assert_eq!(outcome.listings_synced, 2);

    let after = market.store().listings().list_all().await.unwrap();
    let mine: Vec<_> = after.iter().filter(|l| l.user_id == me.id).collect();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|l| l.user_avatar == "https://example.com/sarah-new.png"));

    for original in before.iter().filter(|l| l.user_id != me.id) {
        let current = after.iter().find(|l| l.id == original.id).unwrap();
        assert_eq!(current.user_avatar, original.user_avatar);
        assert_eq!(current.user_name, original.user_name);
    }
}

#[tokio::test]
async fn test_new_user_can_post_and_trade() {
    let market = seeded().await;

    let me = market.profile.signup("priya@iitb.ac.in").await.unwrap();
    assert_eq!(me.college, "IITB Community");

    let notes = market
        .listings
        .create(
            &me,
            ListingDraft::new(ListingType::Material, "DSA Notes", "Graphs", "CS").with_tags("dsa, graphs"),
        )
        .await
        .unwrap();
    assert_eq!(notes.tags, vec!["dsa", "graphs"]);

    let trade = market
        .trades
        .propose(&UserId::new("u2"), &ListingId::new("l2"), &notes.id, &me.id)
        .await
        .unwrap();
    assert_eq!(trade.requester_id, me.id);

    let result = market.trades.accept(&trade.id, &me.id).await;
    assert!(matches!(result, Err(EngineError::ActorNotPermitted { .. })));
}
