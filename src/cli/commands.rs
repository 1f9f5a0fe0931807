use crate::app::{AppContext, KopiteError, Result};
use crate::config::{Config, MediatorMode};
use crate::domain::{count_all, Comment, LegacyTagFilter, MediaFilter, Post, Sort, TimeWindow};
use crate::store::selectors::{available_tags, empty_state, visible_listing};
use crate::store::Event;

pub struct ListingArgs {
    pub community: Option<String>,
    pub sort: Sort,
    pub time: TimeWindow,
    pub media: MediaFilter,
    pub tags: Vec<String>,
    pub legacy: LegacyTagFilter,
}

pub async fn show_listing(ctx: &AppContext, args: ListingArgs, json: bool) -> Result<()> {
    let coordinator = &ctx.coordinator;
    if let Some(community) = &args.community {
        ctx.store.dispatch(Event::SetCommunity(community.clone()));
    }

    // Viral reorders whatever is loaded, so load hot first.
    let fetch_sort = if args.sort.is_client_side() { Sort::Hot } else { args.sort };
    let selection = ctx
        .store
        .state()
        .selection
        .clone()
        .with_sort(fetch_sort)
        .with_time_window(args.time);
    coordinator.load_listing(&selection).await?;
    if args.sort.is_client_side() {
        coordinator.reorder_viral();
    }

    ctx.store.dispatch(Event::SetMediaFilter(args.media));
    ctx.store.dispatch(Event::SetLegacyTagFilter(args.legacy));
    for tag in args.tags {
        ctx.store.dispatch(Event::ToggleTagFilter(tag));
    }

    print_listing(ctx, json)
}

pub async fn search(ctx: &AppContext, query: &str, community: Option<&str>, json: bool) -> Result<()> {
    let community = community
        .map(str::to_string)
        .unwrap_or_else(|| ctx.store.state().selection.community.clone());
    ctx.coordinator.search_listing(query, &community).await?;
    print_listing(ctx, json)
}

pub async fn show_post(ctx: &AppContext, id: &str, community: Option<&str>, json: bool) -> Result<()> {
    let community = community
        .map(str::to_string)
        .unwrap_or_else(|| ctx.config.api.default_community.clone());

    let (details, comments) = futures::join!(
        ctx.coordinator.load_item_details(id),
        ctx.coordinator.load_comments(id, &community),
    );
    details?;

    let state = ctx.store.state();
    let post = state
        .current_item
        .as_ref()
        .ok_or_else(|| KopiteError::Other(format!("Post {id} did not load")))?;

    if json {
        println!("{}", serde_json::to_string_pretty(post)?);
        return Ok(());
    }

    print_post_details(post);
    match comments {
        Ok(()) => {
            println!();
            print_comments(&state.comments);
        }
        Err(e) => eprintln!("Comments unavailable: {}", e.user_message()),
    }
    Ok(())
}

pub async fn show_comments(ctx: &AppContext, id: &str, community: Option<&str>, json: bool) -> Result<()> {
    let community = community
        .map(str::to_string)
        .unwrap_or_else(|| ctx.config.api.default_community.clone());
    ctx.coordinator.load_comments(id, &community).await?;

    let state = ctx.store.state();
    if json {
        println!("{}", serde_json::to_string_pretty(&state.comments)?);
    } else {
        print_comments(&state.comments);
    }
    Ok(())
}

pub fn show_config(config: &Config) -> Result<()> {
    let api = &config.api;
    match Config::default_config_path() {
        Ok(path) => println!("Config file: {}", path.display()),
        Err(e) => println!("Config file: ({e})"),
    }
    println!("Default community: {}", api.default_community);
    println!("Allowed communities: {}", api.allowed_communities.join(", "));
    match api.mediator_mode {
        MediatorMode::Proxy => println!("Mediator: proxy ({})", api.proxy_endpoint),
        MediatorMode::Chain => {
            println!("Mediator: chain");
            for descriptor in &api.mediators {
                let mobile = if descriptor.mobile_friendly { " [mobile]" } else { "" };
                println!("  {} {}{}", descriptor.name, descriptor.url_prefix, mobile);
            }
        }
    }
    println!(
        "Rate limit: {} requests per {} ms",
        api.rate_limit_n, api.rate_limit_window_ms
    );
    println!("Cache TTL: {} ms", api.cache_ttl_ms);
    println!("Request timeout: {} ms", api.request_timeout_ms);
    println!("Mobile client: {}", config.client.mobile);
    Ok(())
}

fn print_listing(ctx: &AppContext, json: bool) -> Result<()> {
    let state = ctx.store.state();
    let posts = visible_listing(&state);

    if json {
        println!("{}", serde_json::to_string_pretty(&posts)?);
        return Ok(());
    }

    if let Some(empty) = empty_state(&state) {
        println!("{}", empty.message());
        return Ok(());
    }

    for post in &posts {
        print_post_line(post);
    }

    let tags = available_tags(&state);
    if !tags.is_empty() {
        println!();
        println!("Tags: {}", tags.join(", "));
    }
    Ok(())
}

fn print_post_line(post: &Post) {
    let tag = post.tag().map(|t| format!("[{t}] ")).unwrap_or_default();
    let pinned = if post.flags.pinned { "pinned " } else { "" };
    println!(
        "{:>6}  {:<8} {}{}{} ({}, {} comments)",
        post.score,
        post.id,
        pinned,
        tag,
        post.display_title(),
        post.media.label(),
        post.num_comments
    );
}

fn print_post_details(post: &Post) {
    println!("{}", post.display_title());
    let date = post
        .created_at()
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "Unknown".to_string());
    println!(
        "r/{} · u/{} · {} points · {}",
        post.community, post.author, post.score, date
    );
    if let Some(tag) = post.tag() {
        println!("Tag: {tag}");
    }
    if let Some(url) = &post.url {
        if !post.flags.is_self {
            println!("Link: {url}");
        }
    }
    if let Some(video) = &post.video {
        println!("Video: {}", video.progressive_url);
    }
    for image in &post.gallery {
        match &image.caption {
            Some(caption) => println!("Image: {} ({caption})", image.url),
            None => println!("Image: {}", image.url),
        }
    }
    if let Some(body) = post.body.as_deref().filter(|b| !b.is_empty()) {
        println!();
        println!("{body}");
    }
}

fn print_comments(comments: &[Comment]) {
    if comments.is_empty() {
        println!("No comments");
        return;
    }
    println!("{} comments", count_all(comments));
    for comment in comments {
        print_comment(comment);
    }
}

fn print_comment(comment: &Comment) {
    let indent = "  ".repeat(comment.depth);
    let mut header = format!("{indent}u/{} · {} points", comment.author, comment.score);
    if comment.flags.is_op {
        header.push_str(" · OP");
    }
    if comment.is_edited() {
        header.push_str(" · edited");
    }
    println!("{header}");
    for line in comment.body.lines() {
        println!("{indent}  {line}");
    }
    for reply in &comment.replies {
        print_comment(reply);
    }
}
