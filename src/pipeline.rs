use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use scraper::Html;
use tracing::{debug, info, warn};

use crate::error::{Result, ScrapeError};
use crate::fetch::Fetch;
use crate::output::RecordSink;
use crate::parser::{article_selector, derive_id, extract, find_article, parse_index};
use crate::settings::Settings;

#[derive(Debug, Default)]
pub struct RunStats {
    pub pages: usize,
    pub episodes: usize,
    pub lines: usize,
    pub files: Vec<PathBuf>,
}

/// Index → transcript pages → sink, one page at a time.
///
/// Any fetch or structure failure aborts the whole run. The index is fully
/// parsed before the first file is written, and every part of a page is
/// extracted before any of that page's files are written.
pub fn run<F, S>(settings: &Settings, fetcher: &F, sink: &mut S) -> Result<RunStats>
where
    F: Fetch,
    S: RecordSink,
{
    let article_sel = article_selector(&settings.article_selector)?;

    info!("Fetching index: {}", settings.index_url);
    let index_doc = parse_html(&fetcher.fetch(&settings.index_url)?);
    let index = parse_index(&index_doc, &settings.season_ids)?;
    info!(
        pages = index.page_count(),
        episodes = index.episode_count(),
        "Index parsed"
    );

    let pb = ProgressBar::new(index.page_count() as u64);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let mut stats = RunStats::default();
    for entry in index.entries() {
        pb.set_message(entry.link.clone());
        let url = settings.page_url(&entry.link);
        let doc = parse_html(&fetcher.fetch(&url)?);

        let transcripts = find_article(&doc, &article_sel)
            .and_then(|article| extract(article, &entry.episodes))
            .map_err(|e| on_page(e, &url))?;
        debug!(parts = transcripts.len(), "Extracted {}", url);

        for transcript in &transcripts {
            let id = derive_id(&transcript.episode);
            if transcript.lines.is_empty() {
                warn!("No dialogue found for {}", id);
            }
            let path = sink.write_records(&id, &transcript.lines)?;
            stats.episodes += 1;
            stats.lines += transcript.lines.len();
            stats.files.push(path);
        }

        stats.pages += 1;
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!(
        pages = stats.pages,
        episodes = stats.episodes,
        lines = stats.lines,
        "Run complete"
    );
    Ok(stats)
}

fn parse_html(bytes: &[u8]) -> Html {
    Html::parse_document(&String::from_utf8_lossy(bytes))
}

fn on_page(err: ScrapeError, url: &str) -> ScrapeError {
    match err {
        ScrapeError::Structure(msg) => ScrapeError::Structure(format!("{} ({})", msg, url)),
        other => other,
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::error::EXIT_FATAL;
    use crate::fetch::testing::StaticFetcher;
    use crate::output::CsvDirSink;

    const INDEX_URL: &str = "https://wiki.test/wiki/Avatar";

    const INDEX: &str = r#"
        <div id="WikiaArticle">
        <h2><span id="Book_One:_Water">Book One: Water</span></h2>
        <table>
          <tr><th>#</th><th>Episode</th></tr>
          <tr><th>3</th><td><a href="/wiki/The_Southern_Air_Temple">The Southern Air Temple</a></td></tr>
        </table>
        <h2><span id="Book_Two:_Earth">Book Two: Earth</span></h2>
        <table>
          <tr><th>1</th><td><a href="/wiki/The_Avatar_State">The Avatar State, Again</a></td></tr>
        </table>
        <h2><span id="Book_Three:_Fire">Book Three: Fire</span></h2>
        <table>
          <tr><th>18</th><td><a href="/wiki/Sozin's_Comet">Sozin's Comet, Part 1</a></td></tr>
          <tr><th>19</th><td><a href="/wiki/Sozin's_Comet">Sozin's Comet, Part 2</a></td></tr>
        </table>
        </div>
    "#;

    const TEMPLE: &str = r#"
        <div id="WikiaArticle"><table>
          <tr><th>Aang</th><td>Hello [whispering] there [pause] friend</td></tr>
          <tr><th>Sokka</th><td>[sighs]</td></tr>
          <tr><th>Katara</th><td>Aang, wait!</td></tr>
        </table></div>
    "#;

    const AVATAR_STATE: &str = r#"
        <div id="WikiaArticle"><table>
          <tr><th>General Fong</th><td>Welcome, Avatar.</td></tr>
        </table></div>
    "#;

    const COMET: &str = r#"
        <div id="WikiaArticle">
          <h2><span id="Part_1">Part 1</span></h2>
          <table><tr><th>Zuko</th><td>I'm sorry.</td></tr></table>
          <h2><span id="Part_2">Part 2</span></h2>
          <table><tr><th>Toph</th><td>"Melon Lord"!</td></tr></table>
        </div>
    "#;

    fn settings() -> Settings {
        Settings {
            index_url: INDEX_URL.to_string(),
            base_url: "https://wiki.test/".to_string(),
            ..Settings::default()
        }
    }

    fn full_site() -> StaticFetcher {
        StaticFetcher::default()
            .with_page(INDEX_URL, INDEX)
            .with_page("https://wiki.test/wiki/The_Southern_Air_Temple", TEMPLE)
            .with_page("https://wiki.test/wiki/The_Avatar_State", AVATAR_STATE)
            .with_page("https://wiki.test/wiki/Sozin's_Comet", COMET)
    }

    fn read(dir: &Path, name: &str) -> String {
        fs::read_to_string(dir.join(name)).unwrap()
    }

    fn file_count(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn writes_one_file_per_episode() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = full_site();
        let mut sink = CsvDirSink::create(tmp.path(), "transcript_", "csv").unwrap();

        let stats = run(&settings(), &fetcher, &mut sink).unwrap();
        assert_eq!(stats.pages, 3);
        assert_eq!(stats.episodes, 4);
        assert_eq!(stats.lines, 5);
        assert_eq!(file_count(tmp.path()), 4);

        // each page fetched once, shared page included
        assert_eq!(fetcher.requested.borrow().len(), 4);

        assert_eq!(
            read(tmp.path(), "transcript_1_3_The_Southern_Air_Temple.csv"),
            "\"Aang\",\"Hello there friend\"\n\"Katara\",\"Aang, wait!\"\n"
        );
        assert_eq!(
            read(tmp.path(), "transcript_2_1_The_Avatar_State_Again.csv"),
            "\"General Fong\",\"Welcome, Avatar.\"\n"
        );
        assert_eq!(
            read(tmp.path(), "transcript_3_18_Sozin's_Comet_Part_1.csv"),
            "\"Zuko\",\"I'm sorry.\"\n"
        );
        assert_eq!(
            read(tmp.path(), "transcript_3_19_Sozin's_Comet_Part_2.csv"),
            "\"Toph\",\"\"\"Melon Lord\"\"!\"\n"
        );
    }

    #[test]
    fn rerun_is_byte_identical() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = full_site();
        let mut sink = CsvDirSink::create(tmp.path(), "transcript_", "csv").unwrap();

        let first = run(&settings(), &fetcher, &mut sink).unwrap();
        let before: Vec<Vec<u8>> = first.files.iter().map(|p| fs::read(p).unwrap()).collect();

        let second = run(&settings(), &fetcher, &mut sink).unwrap();
        let after: Vec<Vec<u8>> = second.files.iter().map(|p| fs::read(p).unwrap()).collect();

        assert_eq!(first.files, second.files);
        assert_eq!(before, after);
        assert_eq!(file_count(tmp.path()), 4);
    }

    #[test]
    fn missing_season_aborts_before_writing() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = full_site();
        let mut sink = CsvDirSink::create(tmp.path(), "transcript_", "csv").unwrap();
        let settings = Settings {
            season_ids: vec!["Book_One:_Water".to_string(), "Book_Four:_Air".to_string()],
            ..settings()
        };

        let err = run(&settings, &fetcher, &mut sink).unwrap_err();
        assert!(matches!(err, ScrapeError::Structure(_)));
        assert_eq!(err.exit_code(), EXIT_FATAL);
        assert_eq!(file_count(tmp.path()), 0);
        assert_eq!(fetcher.requested.borrow().as_slice(), &[INDEX_URL.to_string()]);
    }

    #[test]
    fn unavailable_page_names_url() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = StaticFetcher::default()
            .with_page(INDEX_URL, INDEX)
            .with_page("https://wiki.test/wiki/The_Southern_Air_Temple", TEMPLE);
        let mut sink = CsvDirSink::create(tmp.path(), "transcript_", "csv").unwrap();

        let err = run(&settings(), &fetcher, &mut sink).unwrap_err();
        match &err {
            ScrapeError::Unavailable { url, .. } => {
                assert_eq!(url, "https://wiki.test/wiki/The_Avatar_State")
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.exit_code(), EXIT_FATAL);
        // no retry
        assert_eq!(fetcher.requested.borrow().len(), 3);
    }

    #[test]
    fn unavailable_index_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = StaticFetcher::default();
        let mut sink = CsvDirSink::create(tmp.path(), "transcript_", "csv").unwrap();

        let err = run(&settings(), &fetcher, &mut sink).unwrap_err();
        assert!(matches!(err, ScrapeError::Unavailable { ref url, .. } if url == INDEX_URL));
    }

    #[test]
    fn missing_part_heading_writes_nothing_for_that_page() {
        let tmp = tempfile::tempdir().unwrap();
        let broken = r#"<div id="WikiaArticle"><h2>Part 1</h2><table>
            <tr><th>Zuko</th><td>I'm sorry.</td></tr></table></div>"#;
        let fetcher = StaticFetcher::default()
            .with_page(INDEX_URL, INDEX)
            .with_page("https://wiki.test/wiki/The_Southern_Air_Temple", TEMPLE)
            .with_page("https://wiki.test/wiki/The_Avatar_State", AVATAR_STATE)
            .with_page("https://wiki.test/wiki/Sozin's_Comet", broken);
        let mut sink = CsvDirSink::create(tmp.path(), "transcript_", "csv").unwrap();

        let err = run(&settings(), &fetcher, &mut sink).unwrap_err();
        assert!(
            matches!(err, ScrapeError::Structure(ref m) if m.contains("Part 2") && m.contains("Sozin's_Comet"))
        );
        assert_eq!(file_count(tmp.path()), 2);
        assert!(!tmp.path().join("transcript_3_18_Sozin's_Comet_Part_1.csv").exists());
    }

    #[test]
    fn bad_article_selector_fails_before_fetching() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = full_site();
        let mut sink = CsvDirSink::create(tmp.path(), "transcript_", "csv").unwrap();
        let settings = Settings {
            article_selector: "div[".to_string(),
            ..settings()
        };

        let err = run(&settings, &fetcher, &mut sink).unwrap_err();
        assert!(matches!(err, ScrapeError::Selector(_)));
        assert!(fetcher.requested.borrow().is_empty());
    }
}
