pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{LegacyTagFilter, MediaFilter, Sort, TimeWindow};

#[derive(Parser)]
#[command(name = "kopite")]
#[command(about = "A read-only viewer for community news feeds", long_about = None)]
pub struct Cli {
    /// Path to the config file (default: ~/.config/kopite/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Behave as a mobile client (mediator order and error text)
    #[arg(long, global = true)]
    pub mobile: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a community listing
    Listing {
        /// Community to read (defaults to the configured one)
        #[arg(long)]
        community: Option<String>,

        /// hot, new, top, rising, controversial or viral
        #[arg(short, long, default_value_t = Sort::Hot)]
        sort: Sort,

        /// hour, day, week, month, year or all (top/controversial only)
        #[arg(short, long, default_value_t = TimeWindow::Day)]
        time: TimeWindow,

        /// all, images, videos, articles or discussions
        #[arg(short, long, default_value = "all")]
        media: MediaFilter,

        /// Only posts carrying this tag; repeat for several
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// none, matchday or transfers
        #[arg(long, default_value = "none")]
        legacy: LegacyTagFilter,
    },
    /// Search a community
    Search {
        query: String,

        #[arg(long)]
        community: Option<String>,
    },
    /// Show one post with its comments
    Post {
        id: String,

        #[arg(long)]
        community: Option<String>,
    },
    /// Show the comment tree of a post
    Comments {
        id: String,

        #[arg(long)]
        community: Option<String>,
    },
    /// Print the effective configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_listing_flags() {
        let cli = Cli::parse_from([
            "kopite", "--mobile", "listing", "--sort", "top", "--time", "week", "--media", "videos",
            "--tag", "Highlights", "--tag", "Match Thread",
        ]);
        assert!(cli.mobile);
        let Commands::Listing {
            sort,
            time,
            media,
            tags,
            legacy,
            community,
        } = cli.command
        else {
            panic!("expected listing");
        };
        assert_eq!(sort, Sort::Top);
        assert_eq!(time, TimeWindow::Week);
        assert_eq!(media, MediaFilter::Videos);
        assert_eq!(tags, ["Highlights", "Match Thread"]);
        assert_eq!(legacy, LegacyTagFilter::None);
        assert!(community.is_none());
    }

    #[test]
    fn test_rejects_unknown_sort() {
        assert!(Cli::try_parse_from(["kopite", "listing", "--sort", "best"]).is_err());
    }
}
