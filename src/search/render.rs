//! Detail rendering
//!
//! Turns a catalog item into the embed shown to users. All formatting of
//! ratings, tag lists, media files and runtimes lives here.

use crate::catalog::{CatalogItem, Episode, MediaFile, Movie, Ratings, Season, Show, Tag};
use crate::chat::{Embed, Requester};
use std::fmt::Display;

/// Accent color of every embed
pub const ACCENT_COLOR: u32 = 0x00ff00;

const MISSING: &str = "N/A";
const UNKNOWN_PART: &str = "?";

const MS_PER_SECOND: u64 = 1_000;
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Formats a score fraction as a rounded percentage
///
/// Rounds half away from zero; a missing score renders as `N/A`.
pub fn format_rating(score: Option<f64>) -> String {
    match score {
        Some(score) => format!("{}%", (score * 100.0).round() as i64),
        None => MISSING.to_string(),
    }
}

/// Formats content rating, audience score and critic score on one line
pub fn format_ratings(ratings: &Ratings) -> String {
    format!(
        "`{}` | Audience `{}` | Critics `{}`",
        ratings.content_rating.as_deref().unwrap_or(MISSING),
        format_rating(ratings.audience),
        format_rating(ratings.critic)
    )
}

/// Joins tags with commas
pub fn join_tags(tags: &[Tag]) -> String {
    tags.iter()
        .map(|t| t.tag.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn part<T: Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| UNKNOWN_PART.to_string())
}

/// Formats one line per media file, numbered from 1
pub fn format_media(media: &[MediaFile]) -> String {
    media
        .iter()
        .enumerate()
        .map(|(index, file)| {
            format!(
                "File#`{}`: `{}` - `{}: {}x{}@{} | {}: {}ch`",
                index + 1,
                part(&file.container),
                part(&file.video_codec),
                part(&file.width),
                part(&file.height),
                part(&file.video_frame_rate),
                part(&file.audio_codec),
                part(&file.audio_channels)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats a millisecond duration as `H:MM:SS`
///
/// Durations of a day or more are prefixed with the number of days.
pub fn format_runtime(duration_ms: u64) -> String {
    let total_seconds = duration_ms / MS_PER_SECOND;
    let days = total_seconds / SECONDS_PER_DAY;
    let rest = total_seconds % SECONDS_PER_DAY;
    let clock = format!("{}:{:02}:{:02}", rest / 3600, (rest % 3600) / 60, rest % 60);

    match days {
        0 => clock,
        1 => format!("1 day, {}", clock),
        n => format!("{} days, {}", n, clock),
    }
}

fn count(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn movie_embed(movie: &Movie) -> Embed {
    let title = match movie.year {
        Some(year) => format!("{} ({})", movie.header.title, year),
        None => movie.header.title.clone(),
    };

    Embed::new(title, ACCENT_COLOR)
        .description(movie.tagline.clone().unwrap_or_default())
        .field("Summary", movie.header.summary.clone(), false)
        .field("Ratings", format_ratings(&movie.ratings), false)
        .field("Genres", join_tags(&movie.genres), true)
        .field("Directors", join_tags(&movie.directors), true)
        .field("Writers", join_tags(&movie.writers), true)
        .field("Lead Actors", join_tags(&movie.actors), false)
        .field("Media", format_media(&movie.media), false)
}

fn show_embed(show: &Show) -> Embed {
    Embed::new(show.header.title.clone(), ACCENT_COLOR)
        .description(show.tagline.clone().unwrap_or_default())
        .field("Rating", format_ratings(&show.ratings), false)
        .field("Genres", join_tags(&show.genres), true)
        .field("Network", show.network.clone().unwrap_or_default(), true)
        .field("Studio", show.studio.clone().unwrap_or_default(), true)
        .field(
            "Average Episode Runtime",
            show.duration_ms.map(format_runtime).unwrap_or_default(),
            true,
        )
        .field("Total Seasons", count(show.child_count), true)
        .field("Total Episodes", count(show.leaf_count), true)
}

fn season_embed(season: &Season) -> Embed {
    let description = match season.index {
        Some(index) => format!("Season {}", index),
        None => season.header.title.clone(),
    };

    Embed::new(season.show_title.clone(), ACCENT_COLOR)
        .description(description)
        .field("Episodes", count(season.leaf_count), true)
}

fn episode_embed(episode: &Episode) -> Embed {
    Embed::new(
        format!("{}\n{}", episode.show_title, episode.header.title),
        ACCENT_COLOR,
    )
    .description(episode.header.summary.clone())
    .field("Ratings", format_ratings(&episode.ratings), false)
    .field("Directors", join_tags(&episode.directors), true)
    .field("Writers", join_tags(&episode.writers), true)
    .field("Lead Actors", join_tags(&episode.actors), false)
    .field("Media", format_media(&episode.media), false)
}

/// Renders the detail embed of an item
///
/// The footer carries the item's guid and the requester's avatar.
pub fn detail_embed(item: &CatalogItem, requester: &Requester) -> Embed {
    let embed = match item {
        CatalogItem::Movie(movie) => movie_embed(movie),
        CatalogItem::Show(show) => show_embed(show),
        CatalogItem::Season(season) => season_embed(season),
        CatalogItem::Episode(episode) => episode_embed(episode),
        CatalogItem::Unknown(_) => Embed::new("Unknown content type", ACCENT_COLOR),
    };

    embed.footer(item.guid(), requester.avatar_url.clone())
}

/// Renders the embed shown when a selected item cannot be found anymore
pub fn missing_embed(reference: &str, requester: &Requester) -> Embed {
    Embed::new("Content not found", ACCENT_COLOR)
        .description("The selected item is no longer available on the server.")
        .footer(reference, requester.avatar_url.clone())
}

/// Renders the list of search results offered for selection
pub fn results_embed(query: &str, results: &[CatalogItem]) -> Embed {
    results.iter().fold(
        Embed::new(format!("Search results for '{}'", query), ACCENT_COLOR),
        |embed, item| embed.field(super::selection::item_label(item), item.summary(), false),
    )
}
