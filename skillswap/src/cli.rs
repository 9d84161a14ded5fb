//! Command-line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use skillswap_domain::{ListingType, SessionMode, SkillLevel, TypeFilter};
use skillswap_studio::{AspectRatio, ImageSize};

/// Campus barter marketplace: swap skills and study material with other students.
#[derive(Debug, Parser)]
#[command(name = "skillswap", author, version, about, long_about = None)]
pub struct Cli {
    /// Data directory (overrides SKILLSWAP_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in with a campus email (creates the account on first use)
    Login {
        /// Email address
        email: String,
    },

    /// Create a new account
    Signup {
        /// Email address
        email: String,
    },

    /// Sign out
    Logout,

    /// Show the active profile
    Whoami,

    /// Edit the active profile
    Profile(ProfileArgs),

    /// Show or toggle the colour theme
    Theme {
        /// Switch between light and dark
        #[arg(long)]
        toggle: bool,
    },

    /// Post a new listing
    Post(PostArgs),

    /// Browse the feed
    Feed {
        /// Listing type: all, skill or material
        #[arg(short = 't', long = "type", default_value = "all")]
        type_filter: TypeFilter,

        /// Search title, description and tags
        #[arg(short, long, default_value = "")]
        query: String,
    },

    /// List your own listings
    Mine,

    /// Offer one of your listings for someone else's
    Propose {
        /// Listing you want
        listing: String,

        /// Your listing to give in return
        #[arg(short, long)]
        offer: String,
    },

    /// Accept a pending trade you were offered
    Accept {
        /// Trade id
        trade: String,
    },

    /// Reject a pending trade you were offered
    Reject {
        /// Trade id
        trade: String,
    },

    /// Mark an accepted trade as completed
    Complete {
        /// Trade id
        trade: String,
    },

    /// Show your trades
    Trades,

    /// AI studio tools
    #[command(subcommand)]
    Studio(StudioCommand),
}

/// Profile fields to change; unset fields are kept.
#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    /// College
    #[arg(long)]
    pub college: Option<String>,

    /// Branch of study
    #[arg(long)]
    pub branch: Option<String>,

    /// Graduation year label
    #[arg(long)]
    pub year: Option<String>,

    /// Avatar URL or data URL
    #[arg(long)]
    pub avatar: Option<String>,

    /// Add a skill (repeatable)
    #[arg(long = "skill")]
    pub add_skills: Vec<String>,

    /// Remove a skill (repeatable)
    #[arg(long = "drop-skill")]
    pub drop_skills: Vec<String>,
}

/// Fields of a new listing.
#[derive(Debug, Args)]
pub struct PostArgs {
    /// skill or material
    #[arg(short = 't', long = "type")]
    pub listing_type: ListingType,

    /// Title
    #[arg(long)]
    pub title: String,

    /// Description
    #[arg(short, long)]
    pub description: String,

    /// Category
    #[arg(short, long)]
    pub category: String,

    /// Comma-separated tags
    #[arg(long, default_value = "")]
    pub tags: String,

    /// Skill level (skills default to intermediate)
    #[arg(long)]
    pub level: Option<SkillLevel>,

    /// online or offline
    #[arg(long)]
    pub mode: Option<SessionMode>,

    /// Session length (skills default to "1 Hour")
    #[arg(long)]
    pub duration: Option<String>,

    /// Image file to attach
    #[arg(long)]
    pub media: Option<PathBuf>,
}

/// AI studio commands.
#[derive(Debug, Subcommand)]
pub enum StudioCommand {
    /// Generate an image from a prompt
    Image {
        /// What to draw
        prompt: String,

        /// 1:1, 16:9, 9:16 or 21:9
        #[arg(long, default_value = "1:1")]
        aspect: AspectRatio,

        /// 1K, 2K or 4K
        #[arg(long, default_value = "1K")]
        size: ImageSize,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,

        /// Also use the image as your avatar
        #[arg(long)]
        set_avatar: bool,
    },

    /// Edit an image with an instruction
    Edit {
        /// Source image
        input: PathBuf,

        /// Instruction
        prompt: String,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Animate an image into a short video
    Video {
        /// Source image
        input: PathBuf,

        /// Motion prompt
        prompt: String,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Talk to the voice assistant with a raw 16 kHz PCM file
    Live {
        /// Mono 16-bit little-endian PCM at 16 kHz
        input: PathBuf,

        /// Where to write the 24 kHz PCM reply
        #[arg(short, long)]
        out: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_feed() {
        let cli = Cli::parse_from(["skillswap", "feed", "--type", "material", "-q", "chemistry"]);
        match cli.command {
            Command::Feed { type_filter, query } => {
                assert_eq!(type_filter, TypeFilter::Material);
                assert_eq!(query, "chemistry");
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_post_with_defaults() {
        let cli = Cli::parse_from([
            "skillswap", "post", "-t", "skill", "--title", "Calc Help", "-d", "Series", "-c",
            "Math", "--tags", "calc, math",
        ]);
        match cli.command {
            Command::Post(args) => {
                assert_eq!(args.listing_type, ListingType::Skill);
                assert!(args.level.is_none());
                assert_eq!(args.tags, "calc, math");
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_studio_image() {
        let cli = Cli::parse_from([
            "skillswap", "studio", "image", "a desk", "--aspect", "16:9", "-o", "desk.png",
        ]);
        assert!(matches!(
            cli.command,
            Command::Studio(StudioCommand::Image { aspect: AspectRatio::Landscape, .. })
        ));
    }

    #[test]
    fn test_rejects_unknown_type() {
        assert!(Cli::try_parse_from(["skillswap", "feed", "--type", "books"]).is_err());
    }
}
