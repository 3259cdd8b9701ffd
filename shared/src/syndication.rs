//! RSS feed, XML sitemap, `robots.txt` and schema.org structured data.
//!
//! Builders take already listed items, so drafts have been dropped by the
//! repository. They skip drafts again anyway in case a caller passes
//! unfiltered input.

use chrono::NaiveDate;
use serde_json::{json, Map, Value};

use crate::{
    models::{ContentItem, ContentType, ContentVariant},
    normalize::{compare_newest_first, parse_date},
    site::SiteConfig,
};

/// Most recent items included in the feed.
pub const FEED_ITEM_LIMIT: usize = 50;

/// Pages that exist outside the content directories.
const STATIC_PAGES: &[(&str, &str, &str)] = &[
    ("/about", "monthly", "0.5"),
    ("/contact", "yearly", "0.3"),
    ("/mentoring", "monthly", "0.5"),
];

/// Escape text for XML element content and attributes.
pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn rfc2822(date: NaiveDate) -> Option<String> {
    date.and_hms_opt(0, 0, 0)
        .map(|date_time| date_time.and_utc().to_rfc2822())
}

fn published(items: &[ContentItem]) -> Vec<&ContentItem> {
    let mut items: Vec<&ContentItem> = items.iter().filter(|item| !item.draft).collect();
    items.sort_by(|a, b| compare_newest_first(a, b));
    items
}

/// RSS 2.0 document with the newest [`FEED_ITEM_LIMIT`] items.
pub fn build_rss(site: &SiteConfig, items: &[ContentItem]) -> String {
    let items: Vec<&ContentItem> = published(items).into_iter().take(FEED_ITEM_LIMIT).collect();
    let home = site.absolute_url("/");

    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
"#,
    );
    xml.push_str(&format!("    <title>{}</title>\n", xml_escape(&site.title)));
    xml.push_str(&format!("    <link>{}</link>\n", xml_escape(&home)));
    xml.push_str(&format!("    <description>{}</description>\n", xml_escape(&site.description)));
    xml.push_str(&format!("    <language>{}</language>\n", xml_escape(&site.language)));
    xml.push_str(&format!(
        "    <atom:link href=\"{}\" rel=\"self\" type=\"application/rss+xml\"/>\n",
        xml_escape(&site.absolute_url("/rss.xml"))
    ));
    if let Some(build_date) = items
        .first()
        .and_then(|item| parse_date(&item.date))
        .and_then(rfc2822)
    {
        xml.push_str(&format!("    <lastBuildDate>{build_date}</lastBuildDate>\n"));
    }

    for item in items {
        let link = site.absolute_url(&item.path());
        xml.push_str("    <item>\n");
        xml.push_str(&format!("      <title>{}</title>\n", xml_escape(&item.title)));
        xml.push_str(&format!("      <link>{}</link>\n", xml_escape(&link)));
        xml.push_str(&format!("      <guid isPermaLink=\"true\">{}</guid>\n", xml_escape(&link)));
        xml.push_str(&format!("      <description>{}</description>\n", xml_escape(&item.excerpt)));
        if let Some(pub_date) = parse_date(&item.date).and_then(rfc2822) {
            xml.push_str(&format!("      <pubDate>{pub_date}</pubDate>\n"));
        }
        if let Some(author) = item.author.as_ref().or(site.author.as_ref()) {
            xml.push_str(&format!("      <dc:creator>{}</dc:creator>\n", xml_escape(author)));
        }
        xml.push_str(&format!(
            "      <category>{}</category>\n",
            xml_escape(item.content_type.label())
        ));
        for tag in &item.tags {
            xml.push_str(&format!("      <category>{}</category>\n", xml_escape(tag)));
        }
        xml.push_str("    </item>\n");
    }

    xml.push_str("  </channel>\n</rss>\n");
    xml
}

/// Latest of the frontmatter dates and the file modification date.
pub fn last_modified(item: &ContentItem) -> Option<NaiveDate> {
    [
        parse_date(&item.date),
        item.updated.as_deref().and_then(parse_date),
        item.modified,
    ]
    .into_iter()
    .flatten()
    .max()
}

fn push_url(xml: &mut String, loc: &str, lastmod: Option<NaiveDate>, changefreq: &str, priority: &str) {
    xml.push_str("  <url>\n");
    xml.push_str(&format!("    <loc>{}</loc>\n", xml_escape(loc)));
    if let Some(lastmod) = lastmod {
        xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod.format("%Y-%m-%d")));
    }
    xml.push_str(&format!("    <changefreq>{changefreq}</changefreq>\n"));
    xml.push_str(&format!("    <priority>{priority}</priority>\n"));
    xml.push_str("  </url>\n");
}

/// Sitemap with the home page, every content hub, the static pages and one
/// entry per published item.
pub fn build_sitemap(site: &SiteConfig, items: &[ContentItem]) -> String {
    let items = published(items);
    let newest = |content_type: Option<ContentType>| {
        items
            .iter()
            .filter(|item| content_type.is_none_or(|wanted| item.content_type == wanted))
            .filter_map(|item| last_modified(item))
            .max()
    };

    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
"#,
    );

    push_url(&mut xml, &site.absolute_url("/"), newest(None), "daily", "1.0");
    for content_type in ContentType::ALL {
        push_url(
            &mut xml,
            &site.absolute_url(&content_type.url_prefix()),
            newest(Some(content_type)),
            "weekly",
            "0.8",
        );
    }
    for (path, changefreq, priority) in STATIC_PAGES {
        push_url(&mut xml, &site.absolute_url(path), None, changefreq, priority);
    }
    for item in &items {
        push_url(
            &mut xml,
            &site.absolute_url(&item.path()),
            last_modified(item),
            "monthly",
            "0.7",
        );
    }

    xml.push_str("</urlset>\n");
    xml
}

/// `robots.txt` allowing pages, hiding the API and pointing at the sitemap.
pub fn build_robots(site: &SiteConfig) -> String {
    format!(
        "User-agent: *\nAllow: /\nDisallow: /api/\n\nSitemap: {}\n",
        site.absolute_url("/sitemap.xml")
    )
}

/// schema.org description of one item.
pub fn build_json_ld(site: &SiteConfig, item: &ContentItem) -> Value {
    let schema_type = match item.content_type {
        ContentType::Leadership | ContentType::Technical => "BlogPosting",
        ContentType::Artumin | ContentType::Dnd => "CreativeWork",
        ContentType::Projects => "SoftwareSourceCode",
    };
    let url = site.absolute_url(&item.path());

    let mut ld = Map::new();
    ld.insert("@context".to_string(), json!("https://schema.org"));
    ld.insert("@type".to_string(), json!(schema_type));
    ld.insert("headline".to_string(), json!(item.title));
    ld.insert("name".to_string(), json!(item.title));
    ld.insert("description".to_string(), json!(item.excerpt));
    ld.insert("url".to_string(), json!(url));
    ld.insert("mainEntityOfPage".to_string(), json!({ "@type": "WebPage", "@id": url }));
    ld.insert("datePublished".to_string(), json!(item.date));
    if let Some(updated) = &item.updated {
        ld.insert("dateModified".to_string(), json!(updated));
    }
    if let Some(author) = item.author.as_ref().or(site.author.as_ref()) {
        ld.insert("author".to_string(), json!({ "@type": "Person", "name": author }));
    }
    if let Some(image) = &item.featured_image {
        let image = if image.starts_with("http://") || image.starts_with("https://") {
            image.clone()
        } else {
            site.absolute_url(image)
        };
        ld.insert("image".to_string(), json!(image));
    }
    if !item.tags.is_empty() {
        ld.insert("keywords".to_string(), json!(item.tags.join(", ")));
    }
    ld.insert("timeRequired".to_string(), json!(format!("PT{}M", item.reading_time)));
    ld.insert(
        "publisher".to_string(),
        json!({ "@type": "Organization", "name": site.title, "url": site.absolute_url("/") }),
    );

    match &item.variant {
        ContentVariant::Leadership(fields) => {
            if let Some(category) = &fields.category {
                ld.insert("articleSection".to_string(), json!(category));
            }
        },
        ContentVariant::Technical(fields) => {
            if let Some(difficulty) = &fields.difficulty {
                ld.insert("proficiencyLevel".to_string(), json!(difficulty));
            }
            if !fields.code_languages.is_empty() {
                ld.insert("about".to_string(), json!(fields.code_languages));
            }
        },
        ContentVariant::Artumin(fields) => {
            if !fields.categories.is_empty() {
                ld.insert("genre".to_string(), json!(fields.categories));
            }
            if let Some(region) = &fields.region {
                ld.insert("contentLocation".to_string(), json!({ "@type": "Place", "name": region }));
            }
            if let Some(status) = &fields.status {
                ld.insert("creativeWorkStatus".to_string(), json!(status));
            }
        },
        ContentVariant::Dnd(fields) => {
            ld.insert("genre".to_string(), json!("Tabletop role-playing game"));
            if let Some(system) = &fields.system {
                ld.insert("isBasedOn".to_string(), json!(system));
            }
            if let Some(availability) = &fields.availability {
                ld.insert("isAccessibleForFree".to_string(), json!(availability.eq_ignore_ascii_case("free")));
            }
        },
        ContentVariant::Projects(fields) => {
            if let Some(repository) = &fields.repository {
                ld.insert("codeRepository".to_string(), json!(repository));
            }
            if !fields.tech_stack.is_empty() {
                ld.insert("programmingLanguage".to_string(), json!(fields.tech_stack));
            }
            if let Some(status) = &fields.status {
                ld.insert("creativeWorkStatus".to_string(), json!(status));
            }
            if let Some(live_url) = &fields.live_url {
                ld.insert("sameAs".to_string(), json!(live_url));
            }
        },
    }

    Value::Object(ld)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LeadershipFields, ProjectFields};

    fn site() -> SiteConfig {
        SiteConfig {
            base_url: "https://example.dev".to_string(),
            title: "Example & Co".to_string(),
            author: Some("Sam".to_string()),
            ..SiteConfig::default()
        }
    }

    fn item(content_type: ContentType, slug: &str, date: &str) -> ContentItem {
        ContentItem {
            content_type,
            slug: slug.to_string(),
            title: format!("Title <{slug}>"),
            date: date.to_string(),
            excerpt: "An excerpt".to_string(),
            tags: vec!["rust".to_string()],
            reading_time: 4,
            featured_image: None,
            featured: false,
            draft: false,
            author: None,
            updated: None,
            modified: None,
            content: None,
            variant: ContentVariant::Leadership(LeadershipFields::default()),
        }
    }

    #[test]
    fn rss_lists_newest_first_and_escapes() {
        let mut draft = item(ContentType::Leadership, "draft", "2024-12-01");
        draft.draft = true;
        let items = vec![
            item(ContentType::Leadership, "older", "2024-01-02"),
            item(ContentType::Technical, "newer", "2024-03-14"),
            draft,
        ];
        let rss = build_rss(&site(), &items);

        assert!(rss.contains("<title>Example &amp; Co</title>"));
        assert!(rss.contains("<title>Title &lt;newer&gt;</title>"));
        assert!(rss.contains("<link>https://example.dev/technical/newer</link>"));
        assert!(rss.contains("<pubDate>Thu, 14 Mar 2024 00:00:00 +0000</pubDate>"));
        assert!(rss.contains("<dc:creator>Sam</dc:creator>"));
        assert!(rss.contains("<category>rust</category>"));
        assert!(!rss.contains("draft"));
        let newer = rss.find("newer").expect("newer present");
        let older = rss.find("older").expect("older present");
        assert!(newer < older);
    }

    #[test]
    fn rss_is_capped() {
        let items: Vec<_> = (0..60)
            .map(|day| item(ContentType::Technical, &format!("post-{day}"), "2024-01-01"))
            .collect();
        let rss = build_rss(&site(), &items);
        assert_eq!(rss.matches("<item>").count(), FEED_ITEM_LIMIT);
    }

    #[test]
    fn sitemap_uses_latest_modification_date() {
        let mut edited = item(ContentType::Projects, "folio", "2024-01-01");
        edited.updated = Some("2024-02-01".to_string());
        edited.modified = NaiveDate::from_ymd_opt(2024, 5, 6);
        let sitemap = build_sitemap(&site(), &[edited]);

        assert!(sitemap.contains("<loc>https://example.dev/</loc>"));
        assert!(sitemap.contains("<loc>https://example.dev/dnd</loc>"));
        assert!(sitemap.contains("<loc>https://example.dev/mentoring</loc>"));
        assert!(sitemap.contains(
            "<loc>https://example.dev/projects/folio</loc>\n    <lastmod>2024-05-06</lastmod>"
        ));
    }

    #[test]
    fn last_modified_prefers_newest_source() {
        let mut edited = item(ContentType::Leadership, "a", "2024-03-01");
        edited.modified = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert_eq!(last_modified(&edited), NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn robots_points_at_sitemap() {
        assert!(build_robots(&site()).contains("Sitemap: https://example.dev/sitemap.xml"));
    }

    #[test]
    fn json_ld_picks_schema_type_per_variant() {
        let post = build_json_ld(&site(), &item(ContentType::Technical, "a", "2024-01-01"));
        assert_eq!(post["@type"], "BlogPosting");
        assert_eq!(post["url"], "https://example.dev/technical/a");
        assert_eq!(post["author"]["name"], "Sam");

        let mut project = item(ContentType::Projects, "folio", "2024-01-01");
        project.variant = ContentVariant::Projects(ProjectFields {
            status: Some("active".to_string()),
            tech_stack: vec!["Rust".to_string()],
            repository: Some("https://github.com/example/folio".to_string()),
            live_url: None,
        });
        let ld = build_json_ld(&site(), &project);
        assert_eq!(ld["@type"], "SoftwareSourceCode");
        assert_eq!(ld["codeRepository"], "https://github.com/example/folio");

        let story = build_json_ld(&site(), &item(ContentType::Artumin, "tale", "2024-01-01"));
        assert_eq!(story["@type"], "CreativeWork");
    }
}
