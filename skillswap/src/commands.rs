//! Command dispatch.
//!
//! Every command opens the saved session, runs against the marketplace
//! services and saves the session back. Output is returned as text so the
//! caller decides where it goes.

use std::fmt::Write as _;

use tracing::info;

use skillswap_domain::{Listing, ListingDraft, ListingId, TradeAction, TradeId, User};
use skillswap_engine::TradeView;
use skillswap_store::{FileStorage, MemoryStore};
use skillswap_studio::{ImageConfig, MediaRef};

use crate::cli::{Command, PostArgs, ProfileArgs, StudioCommand};
use crate::config::Config;
use crate::error::CliResult;
use crate::session::Session;
use crate::studio::{self, StudioBackend};

type Market = skillswap_engine::Marketplace<MemoryStore, FileStorage>;

/// Run one command and return what to print.
pub async fn execute(config: &Config, command: Command) -> CliResult<String> {
    let session = Session::open(config).await?;
    let market = &session.market;

    let output = match command {
        Command::Login { email } => {
            let user = market.profile.login(&email).await?;
            format!("Welcome back, {}!\n{}", user.name, render_user(&user))
        },
        Command::Signup { email } => {
            let user = market.profile.signup(&email).await?;
            format!("Welcome to SkillSwap, {}!\n{}", user.name, render_user(&user))
        },
        Command::Logout => {
            market.profile.logout().await?;
            "Signed out.".to_string()
        },
        Command::Whoami => render_user(&market.profile.current().await?),
        Command::Profile(args) => edit_profile(market, args).await?,
        Command::Theme { toggle } => {
            let theme = if toggle {
                market.profile.toggle_theme().await
            } else {
                market.profile.theme().await
            };
            format!("Theme: {}", theme.as_str())
        },
        Command::Post(args) => post_listing(market, args).await?,
        Command::Feed { type_filter, query } => {
            let listings = market.feed.feed(type_filter, &query).await?;
            if listings.is_empty() {
                "No listings match.".to_string()
            } else {
                render_listings(&listings)
            }
        },
        Command::Mine => {
            let me = market.profile.current().await?;
            let listings = market.feed.tradable_items(&me.id).await?;
            if listings.is_empty() {
                "You have not posted anything yet.".to_string()
            } else {
                render_listings(&listings)
            }
        },
        Command::Propose { listing, offer } => propose(market, &listing, &offer).await?,
        Command::Accept { trade } => act(market, &trade, TradeAction::Accept).await?,
        Command::Reject { trade } => act(market, &trade, TradeAction::Reject).await?,
        Command::Complete { trade } => act(market, &trade, TradeAction::Complete).await?,
        Command::Trades => {
            let me = market.profile.current().await?;
            let views = market.trades.trades_for(&me.id).await?;
            if views.is_empty() {
                "No trades yet.".to_string()
            } else {
                views.iter().map(render_trade).collect::<Vec<_>>().join("\n")
            }
        },
        Command::Studio(cmd) => run_studio(config, market, cmd).await?,
    };

    session.save().await?;
    Ok(output)
}

async fn edit_profile(market: &Market, args: ProfileArgs) -> CliResult<String> {
    let mut user = market.profile.current().await?;

    if let Some(name) = args.name {
        user.name = name.trim().to_string();
    }
    if let Some(college) = args.college {
        user.college = college;
    }
    if let Some(branch) = args.branch {
        user.branch = branch;
    }
    if let Some(year) = args.year {
        user.year = year;
    }
    if let Some(avatar) = args.avatar {
        user.avatar = avatar;
    }
    for skill in args.add_skills {
        let skill = skill.trim();
        if !skill.is_empty() {
            user.skills.insert(skill.to_string());
        }
    }
    for skill in &args.drop_skills {
        user.skills.remove(skill.trim());
    }

    let outcome = market.profile.update(user).await?;
    let mut out = format!(
        "Profile saved; {} listing(s) updated.\n{}",
        outcome.listings_synced,
        render_user(&outcome.user)
    );
    if !outcome.persisted {
        out.push_str("\nWarning: storage is full, this profile change will not survive a restart.");
    }
    Ok(out)
}

async fn post_listing(market: &Market, args: PostArgs) -> CliResult<String> {
    let me = market.profile.current().await?;

    let mut draft = ListingDraft::new(args.listing_type, args.title, args.description, args.category)
        .with_tags(&args.tags);
    draft.level = args.level;
    draft.mode = args.mode;
    draft.duration = args.duration;
    if let Some(path) = args.media {
        draft.media_url = Some(studio::read_media(&path).await?.to_data_url());
    }

    let listing = market.listings.create(&me, draft).await?;
    Ok(format!("Posted {}.\n{}", listing.id, render_listing(&listing)))
}

async fn propose(market: &Market, wanted: &str, offer: &str) -> CliResult<String> {
    let me = market.profile.current().await?;
    let wanted = market.listings.find(&ListingId::new(wanted)).await?;

    let trade = market
        .trades
        .propose(&wanted.user_id, &wanted.id, &ListingId::new(offer), &me.id)
        .await?;

    Ok(format!(
        "Proposed trade {}: your {} for {}'s \"{}\" (PENDING).",
        trade.id, offer, wanted.user_name, wanted.title
    ))
}

async fn act(market: &Market, trade_id: &str, action: TradeAction) -> CliResult<String> {
    let me = market.profile.current().await?;
    let trade = market.trades.act(&TradeId::new(trade_id), &me.id, action).await?;
    Ok(format!("Trade {} is now {}.", trade.id, trade.status))
}

async fn run_studio(config: &Config, market: &Market, cmd: StudioCommand) -> CliResult<String> {
    let backend = StudioBackend::from_config(config);

    match cmd {
        StudioCommand::Image {
            prompt,
            aspect,
            size,
            out,
            set_avatar,
        } => {
            let image_config = ImageConfig {
                aspect_ratio: aspect,
                size,
            };
            let image = backend.media.generate_image(&prompt, &image_config).await?;
            studio::write_media(&out, &image).await?;

            let mut msg = format!("Saved image to {}.", out.display());
            if set_avatar {
                msg.push('\n');
                msg.push_str(&set_avatar_from(market, &image).await?);
            }
            Ok(msg)
        },
        StudioCommand::Edit { input, prompt, out } => {
            let image = studio::read_media(&input).await?;
            let edited = backend.media.edit_image(&image, &prompt).await?;
            studio::write_media(&out, &edited).await?;
            Ok(format!("Saved edited image to {}.", out.display()))
        },
        StudioCommand::Video { input, prompt, out } => {
            studio::animate(&backend, &input, &prompt, &out).await?;
            Ok(format!("Saved video to {}.", out.display()))
        },
        StudioCommand::Live { input, out } => {
            let samples = studio::converse(&backend, &input, &out).await?;
            Ok(format!("Saved {} samples of reply audio to {}.", samples, out.display()))
        },
    }
}

async fn set_avatar_from(market: &Market, image: &MediaRef) -> CliResult<String> {
    let mut user = market.profile.current().await?;
    user.avatar = image.to_data_url();

    let outcome = market.profile.update(user).await?;
    info!(user_id = %outcome.user.id, persisted = outcome.persisted, "Avatar replaced");

    Ok(if outcome.persisted {
        "Avatar updated.".to_string()
    } else {
        "Avatar updated for this session; storage is full so it will not persist.".to_string()
    })
}

// =============================================================================
// Rendering
// =============================================================================

/// One-paragraph profile summary.
pub fn render_user(user: &User) -> String {
    let mut out = format!(
        "{} <{}>\n  {} · {} · {}\n  Reputation {:.1} · {} trade(s) completed",
        user.name, user.email, user.college, user.branch, user.year, user.reputation,
        user.trades_completed
    );
    if !user.skills.is_empty() {
        let skills: Vec<&str> = user.skills.iter().map(String::as_str).collect();
        let _ = write!(out, "\n  Skills: {}", skills.join(", "));
    }
    out
}

/// One listing as a short block.
pub fn render_listing(listing: &Listing) -> String {
    let mut out = format!(
        "[{}] {} {} ({})\n  by {} · {}",
        listing.id,
        listing.listing_type,
        listing.title,
        listing.category,
        listing.user_name,
        listing.description
    );

    let mut details = Vec::new();
    if let Some(level) = listing.level {
        details.push(format!("{level:?}"));
    }
    if let Some(mode) = listing.mode {
        details.push(format!("{mode:?}"));
    }
    if let Some(duration) = &listing.duration {
        details.push(duration.clone());
    }
    if !details.is_empty() {
        let _ = write!(out, "\n  {}", details.join(" · "));
    }
    if !listing.tags.is_empty() {
        let tags: Vec<String> = listing.tags.iter().map(|t| format!("#{t}")).collect();
        let _ = write!(out, "\n  {}", tags.join(" "));
    }
    if listing.media_url.is_some() {
        out.push_str("\n  (has media)");
    }
    out
}

/// Listings separated by blank lines.
pub fn render_listings(listings: &[Listing]) -> String {
    listings.iter().map(render_listing).collect::<Vec<_>>().join("\n\n")
}

fn item_title(item: &Option<Listing>) -> &str {
    item.as_ref().map(|l| l.title.as_str()).unwrap_or("(listing removed)")
}

/// One trade from the viewer's side.
pub fn render_trade(view: &TradeView) -> String {
    let mut out = format!(
        "[{}] {} · you are the {}\n  you give: {}\n  you get:  {}",
        view.trade.id,
        view.trade.status,
        view.role,
        item_title(&view.item_given),
        item_title(&view.item_received)
    );
    if !view.actions.is_empty() {
        let actions: Vec<String> = view.actions.iter().map(ToString::to_string).collect();
        let _ = write!(out, "\n  actions: {}", actions.join(", "));
    }
    out
}
