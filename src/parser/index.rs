use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::scope::{element_text, enclosing_heading, scope_after, select_in_scope};
use super::types::{EpisodeDescriptor, LinkIndex};
use crate::error::{Result, ScrapeError};

static WITH_ID: LazyLock<Selector> = LazyLock::new(|| Selector::parse("[id]").unwrap());
static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static TH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").unwrap());
static TD: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

/// Map each transcript link on the index page to the episodes it carries.
///
/// Seasons are numbered from 1 in the order of `season_ids`. A missing
/// season section is fatal. A bad episode number ends the scan of that
/// season only; rows already read are kept.
pub fn parse_index(document: &Html, season_ids: &[String]) -> Result<LinkIndex> {
    let mut index = LinkIndex::new();

    for (season, season_id) in (1u32..).zip(season_ids) {
        let rows = season_rows(document, season_id)?;
        debug!(season, rows = rows.len(), "Scanning {}", season_id);

        for row in rows {
            match parse_row(row, season) {
                Ok(Some((link, episode))) => {
                    if index.contains_episode(episode.season, episode.episode_number) {
                        warn!(
                            "Duplicate episode {}x{} ({}), keeping first",
                            episode.season, episode.episode_number, link
                        );
                        continue;
                    }
                    index.push(&link, episode);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Abandoning season {} ({}): {}", season, season_id, e);
                    break;
                }
            }
        }
    }

    Ok(index)
}

/// All `tr` rows of the first table under the season's heading.
fn season_rows<'a>(document: &'a Html, season_id: &str) -> Result<Vec<ElementRef<'a>>> {
    let anchor = document
        .select(&WITH_ID)
        .find(|el| el.value().id() == Some(season_id))
        .ok_or_else(|| ScrapeError::Structure(format!("season section {:?} not found", season_id)))?;

    let heading = enclosing_heading(anchor).unwrap_or(anchor);
    let scope = scope_after(heading);
    let table = select_in_scope(&scope, &TABLE)
        .into_iter()
        .next()
        .ok_or_else(|| {
            ScrapeError::Structure(format!("no episode table after section {:?}", season_id))
        })?;

    Ok(table.select(&ROW).collect())
}

/// `Ok(None)` for rows that are not episode rows (no link, blank title).
fn parse_row(row: ElementRef, season: u32) -> Result<Option<(String, EpisodeDescriptor)>> {
    let Some(link) = row.select(&LINK).next() else {
        return Ok(None);
    };
    let href = link.value().attr("href").unwrap_or_default();

    let label = row
        .select(&TH)
        .next()
        .or_else(|| row.select(&TD).next())
        .map(element_text)
        .unwrap_or_default();
    let label = label.trim();
    let episode_number = label
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ScrapeError::Parse {
            season,
            value: label.to_string(),
        })?;

    let title = element_text(link).trim().to_string();
    if href.is_empty() || title.is_empty() {
        warn!("Skipping season {} episode {}: empty link", season, episode_number);
        return Ok(None);
    }

    Ok(Some((
        href.to_string(),
        EpisodeDescriptor {
            season,
            episode_number,
            title,
        },
    )))
}

// ── Tests ──
