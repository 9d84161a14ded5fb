//! Trade Engine
//!
//! Proposes swaps and drives them through the trade state machine.
//! Every status change goes through `TradeStatus::transition` and is then
//! committed with a compare-and-swap, so two racing actors cannot both move
//! the same trade out of one state.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use skillswap_domain::{
    Listing, ListingId, Trade, TradeAction, TradeId, TradeRole, TradeStatus, UserId,
};
use skillswap_store::{Store, StoreError};

use crate::error::{EngineError, EngineResult};

/// A trade as seen by one of its parties.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeView {
    /// The trade itself
    pub trade: Trade,
    /// Viewer's side of the trade
    pub role: TradeRole,
    /// Listing the viewer hands over, if it still resolves
    pub item_given: Option<Listing>,
    /// Listing the viewer receives, if it still resolves
    pub item_received: Option<Listing>,
    /// What the viewer can do next
    pub actions: Vec<TradeAction>,
}

/// Trade engine over a marketplace store.
pub struct TradeEngine<S: Store> {
    store: Arc<S>,
}

impl<S: Store> TradeEngine<S> {
    /// Create a new trade engine.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Propose swapping `requester_item_id` for the provider's `provider_item_id`.
    ///
    /// Both listings must exist and belong to the side that offers them.
    pub async fn propose(
        &self,
        provider_id: &UserId,
        provider_item_id: &ListingId,
        requester_item_id: &ListingId,
        requester_id: &UserId,
    ) -> EngineResult<Trade> {
        if provider_id == requester_id {
            return Err(EngineError::SelfTrade(requester_id.clone()));
        }

        self.require_owned(provider_item_id, provider_id).await?;
        self.require_owned(requester_item_id, requester_id).await?;

        let trade = Trade::propose(
            requester_id.clone(),
            provider_id.clone(),
            requester_item_id.clone(),
            provider_item_id.clone(),
        )?;

        self.store.trades().create(&trade).await?;

        info!(
            trade_id = %trade.id,
            %requester_id,
            %provider_id,
            %requester_item_id,
            %provider_item_id,
            "Trade proposed"
        );

        Ok(trade)
    }

    /// Move a trade to `new_status` on behalf of `actor`.
    pub async fn update_status(
        &self,
        trade_id: &TradeId,
        actor: &UserId,
        new_status: TradeStatus,
    ) -> EngineResult<Trade> {
        let trade = self.find(trade_id).await?;

        let role = trade.role_of(actor).ok_or_else(|| EngineError::Unauthorized {
            user_id: actor.clone(),
            target: format!("trade {trade_id}"),
        })?;

        let from = trade.status;
        let to = from.transition(new_status, role)?;

        let updated = match self.store.trades().compare_and_set_status(trade_id, from, to).await {
            Ok(updated) => updated,
            Err(StoreError::Conflict { actual, .. }) => {
                warn!(
                    %trade_id,
                    expected = %from,
                    %actual,
                    "Trade changed underneath status update"
                );
                return Err(EngineError::InvalidTransition { from: actual, to });
            },
            Err(e) => return Err(e.into()),
        };

        info!(%trade_id, %actor, %role, %from, %to, "Trade status updated");
        Ok(updated)
    }

    /// Provider accepts a pending trade.
    pub async fn accept(&self, trade_id: &TradeId, actor: &UserId) -> EngineResult<Trade> {
        self.update_status(trade_id, actor, TradeStatus::Accepted).await
    }

    /// Provider declines a pending trade.
    pub async fn reject(&self, trade_id: &TradeId, actor: &UserId) -> EngineResult<Trade> {
        self.update_status(trade_id, actor, TradeStatus::Rejected).await
    }

    /// Either party marks an accepted trade as done.
    pub async fn complete(&self, trade_id: &TradeId, actor: &UserId) -> EngineResult<Trade> {
        self.update_status(trade_id, actor, TradeStatus::Completed).await
    }

    /// Apply a user-facing action.
    pub async fn act(
        &self,
        trade_id: &TradeId,
        actor: &UserId,
        action: TradeAction,
    ) -> EngineResult<Trade> {
        self.update_status(trade_id, actor, action.target()).await
    }

    /// Find a trade by id.
    pub async fn find(&self, trade_id: &TradeId) -> EngineResult<Trade> {
        self.store
            .trades()
            .find_by_id(trade_id)
            .await?
            .ok_or_else(|| EngineError::trade_not_found(trade_id))
    }

    /// Every trade the user is a party to, newest first, with resolved items.
    ///
    /// An item whose listing no longer resolves is shown as `None` rather
    /// than failing the whole list.
    pub async fn trades_for(&self, user_id: &UserId) -> EngineResult<Vec<TradeView>> {
        let trades = self.store.trades().find_by_user(user_id).await?;
        let mut views = Vec::with_capacity(trades.len());

        for trade in trades {
            let Some(role) = trade.role_of(user_id) else {
                continue;
            };

            let item_given = self.store.listings().find_by_id(trade.item_given_by(role)).await?;
            let item_received =
                self.store.listings().find_by_id(trade.item_received_by(role)).await?;
            let actions = trade.status.available_actions(role);

            views.push(TradeView {
                trade,
                role,
                item_given,
                item_received,
                actions,
            });
        }

        debug!(%user_id, count = views.len(), "Loaded trades for user");
        Ok(views)
    }

    async fn require_owned(&self, listing_id: &ListingId, owner: &UserId) -> EngineResult<()> {
        let listing = self
            .store
            .listings()
            .find_by_id(listing_id)
            .await?
            .ok_or_else(|| EngineError::not_found("listing", listing_id.as_str()))?;

        if !listing.is_owned_by(owner) {
            return Err(EngineError::OwnershipMismatch {
                listing_id: listing_id.clone(),
                expected_owner: owner.clone(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillswap_domain::{ListingDraft, ListingType, User};
    use skillswap_store::MemoryStore;

    struct Fixture {
        engine: TradeEngine<MemoryStore>,
        provider: User,
        requester: User,
        wanted: Listing,
        offered: Listing,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let provider = User::from_email("sarah@mit.edu").unwrap();
        let requester = User::from_email("david@stanford.edu").unwrap();

        let wanted = Listing::from_draft(
            ListingDraft::new(ListingType::Material, "OS Notes", "Unit 3", "CS"),
            &provider,
        )
        .unwrap();
        let offered = Listing::from_draft(
            ListingDraft::new(ListingType::Skill, "Python Tutoring", "Pandas", "CS"),
            &requester,
        )
        .unwrap();

        store.users().save(&provider).await.unwrap();
        store.users().save(&requester).await.unwrap();
        store.listings().create(&wanted).await.unwrap();
        store.listings().create(&offered).await.unwrap();

        Fixture {
            engine: TradeEngine::new(store),
            provider,
            requester,
            wanted,
            offered,
        }
    }

    async fn propose(f: &Fixture) -> Trade {
        f.engine
            .propose(&f.provider.id, &f.wanted.id, &f.offered.id, &f.requester.id)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_propose_creates_pending_trade() {
        let f = fixture().await;
        let trade = propose(&f).await;

        assert_eq!(trade.status, TradeStatus::Pending);
        assert_eq!(trade.requester_item_id, f.offered.id);
        assert_eq!(trade.provider_item_id, f.wanted.id);
    }

    #[tokio::test]
    async fn test_propose_rejects_foreign_offer() {
        let f = fixture().await;
        // Requester tries to offer the provider's own listing
        let result = f
            .engine
            .propose(&f.provider.id, &f.wanted.id, &f.wanted.id, &f.requester.id)
            .await;
        assert!(matches!(result, Err(EngineError::OwnershipMismatch { .. })));
    }

    #[tokio::test]
    async fn test_propose_rejects_self_trade() {
        let f = fixture().await;
        let result = f
            .engine
            .propose(&f.provider.id, &f.wanted.id, &f.wanted.id, &f.provider.id)
            .await;
        assert!(matches!(result, Err(EngineError::SelfTrade(_))));
    }

    #[tokio::test]
    async fn test_propose_unknown_listing() {
        let f = fixture().await;
        let result = f
            .engine
            .propose(&f.provider.id, &ListingId::new("l-missing"), &f.offered.id, &f.requester.id)
            .await;
        assert!(matches!(result, Err(EngineError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let f = fixture().await;
        let trade = propose(&f).await;

        let accepted = f.engine.accept(&trade.id, &f.provider.id).await.unwrap();
        assert_eq!(accepted.status, TradeStatus::Accepted);

        let completed = f.engine.complete(&trade.id, &f.requester.id).await.unwrap();
        assert_eq!(completed.status, TradeStatus::Completed);

        let again = f.engine.complete(&trade.id, &f.provider.id).await;
        assert!(matches!(again, Err(EngineError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_requester_cannot_accept() {
        let f = fixture().await;
        let trade = propose(&f).await;

        let result = f.engine.accept(&trade.id, &f.requester.id).await;
        assert!(matches!(
            result,
            Err(EngineError::ActorNotPermitted { role: TradeRole::Requester, .. })
        ));
        assert_eq!(f.engine.find(&trade.id).await.unwrap().status, TradeStatus::Pending);
    }

    #[tokio::test]
    async fn test_outsider_is_unauthorized() {
        let f = fixture().await;
        let trade = propose(&f).await;

        let result = f.engine.reject(&trade.id, &UserId::new("u-outsider")).await;
        assert!(matches!(result, Err(EngineError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_pending_cannot_complete() {
        let f = fixture().await;
        let trade = propose(&f).await;

        let result = f.engine.complete(&trade.id, &f.provider.id).await;
        assert!(matches!(
            result,
            Err(EngineError::InvalidTransition {
                from: TradeStatus::Pending,
                to: TradeStatus::Completed
            })
        ));
    }

    #[tokio::test]
    async fn test_trades_for_resolves_items_per_role() {
        let f = fixture().await;
        propose(&f).await;

        let provider_views = f.engine.trades_for(&f.provider.id).await.unwrap();
        assert_eq!(provider_views.len(), 1);
        let view = &provider_views[0];
        assert_eq!(view.role, TradeRole::Provider);
        assert_eq!(view.item_given.as_ref().map(|l| &l.id), Some(&f.wanted.id));
        assert_eq!(view.item_received.as_ref().map(|l| &l.id), Some(&f.offered.id));
        assert_eq!(view.actions, vec![TradeAction::Accept, TradeAction::Reject]);

        let requester_views = f.engine.trades_for(&f.requester.id).await.unwrap();
        assert!(requester_views[0].actions.is_empty());
    }
}
