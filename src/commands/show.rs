use std::fmt::Write;
use std::io::IsTerminal;

use anyhow::Context;

use crate::feed::Feed;
use crate::store::Store;

fn format_date(feed: &Feed) -> String {
    feed.created_at.format("%Y-%m-%d %H:%M").to_string()
}

fn format_feed(feed: &Feed, color: bool) -> String {
    let (bold, dim, italic, date_color, reset) = if color {
        ("\x1b[1m", "\x1b[2m", "\x1b[3m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "", "", "")
    };
    let author = if feed.author.is_empty() {
        String::new()
    } else {
        format!(" {italic}by {}{reset}", feed.author)
    };
    format!(
        "{bold}{}{reset}  {date_color}{}{reset}  {}{author} {dim}({}){reset}",
        feed.id,
        format_date(feed),
        feed.title,
        feed.url
    )
}

fn render_list(feeds: &[Feed], color: bool) -> String {
    let mut out = String::new();
    for feed in feeds {
        writeln!(out, "{}", format_feed(feed, color)).unwrap();
    }
    out
}

pub(crate) fn cmd_show(
    store: &Store,
    channel: &str,
    offset: usize,
    limit: usize,
    json: bool,
) -> anyhow::Result<()> {
    let feeds = store
        .list_feeds(channel, offset, limit)
        .with_context(|| format!("failed to list items of {channel}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&feeds)?);
        return Ok(());
    }

    let color = std::io::stdout().is_terminal();
    print!("{}", render_list(&feeds, color));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn feed(id: u64, title: &str, author: &str) -> Feed {
        Feed {
            title: title.to_string(),
            url: "http://x".to_string(),
            created_at: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(12, 30, 0)
                .unwrap()
                .and_utc(),
            description: "d".to_string(),
            author: author.to_string(),
            hash: String::new(),
            channel: "news".to_string(),
            id,
        }
    }

    #[test]
    fn test_format_feed_plain() {
        assert_eq!(
            format_feed(&feed(1001, "Post", ""), false),
            "1001  2024-01-15 12:30  Post (http://x)"
        );
    }

    #[test]
    fn test_format_feed_with_author() {
        assert_eq!(
            format_feed(&feed(1001, "Post", "alice"), false),
            "1001  2024-01-15 12:30  Post by alice (http://x)"
        );
    }

    #[test]
    fn test_format_feed_colored() {
        let line = format_feed(&feed(1001, "Post", ""), true);
        assert!(line.starts_with("\x1b[1m1001\x1b[0m"));
        assert!(line.contains("Post"));
    }

    #[test]
    fn test_render_list_keeps_order() {
        let feeds = [feed(1003, "C", ""), feed(1001, "A", "")];
        assert_eq!(
            render_list(&feeds, false),
            "1003  2024-01-15 12:30  C (http://x)\n1001  2024-01-15 12:30  A (http://x)\n"
        );
    }

    #[test]
    fn test_render_empty_list() {
        assert_eq!(render_list(&[], false), "");
    }
}
