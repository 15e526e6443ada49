use askama::{Error as AskamaError, Template};
use serde::Serialize;
use thiserror::Error;
use time::format_description::well_known::Rfc3339;

use crate::application::composer::PageResult;
use crate::application::links::PageLink;
use crate::application::pagination::PagePlan;
use crate::domain::entities::TopicRecord;
use crate::domain::types::StickyLevel;

#[derive(Debug, Error)]
#[error("{message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            message,
            error,
        }
    }

    pub fn origin(&self) -> &'static str {
        self.source
    }
}

pub fn render_template<T: Template>(template: T) -> Result<String, TemplateRenderError> {
    template.render().map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct TopicRowView {
    pub id: i64,
    pub title: String,
    /// Shown in the pinned block at the head of the page.
    pub sticky: bool,
    pub sticky_level: StickyLevel,
    pub replies: i32,
    pub tags: Vec<String>,
    pub last_post_at: String,
}

impl TopicRowView {
    pub fn marker(&self) -> &'static str {
        if self.sticky { "[sticky]" } else { "        " }
    }

    pub fn reply_noun(&self) -> &'static str {
        if self.replies == 1 { "reply" } else { "replies" }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLinkView {
    pub label: String,
    pub href: Option<String>,
    pub current: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopicListView {
    pub scope: String,
    pub ordering: &'static str,
    pub summary: String,
    pub page: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub topics: Vec<TopicRowView>,
    pub links: Vec<PageLinkView>,
}

impl TopicListView {
    /// Build the view of a composed page; links point at `{link_base}?p=N&n=P`.
    pub fn from_page(page: &PageResult<TopicRecord>, link_base: &str) -> Self {
        let topics = page
            .items
            .iter()
            .enumerate()
            .map(|(index, topic)| TopicRowView {
                id: topic.id,
                title: topic.title.clone(),
                sticky: page.is_pinned_at(index),
                sticky_level: topic.sticky,
                replies: topic.reply_count(),
                tags: topic.tags.clone(),
                last_post_at: topic
                    .last_post_at
                    .format(&Rfc3339)
                    .unwrap_or_else(|_| topic.last_post_at.to_string()),
            })
            .collect();

        let links = page
            .links()
            .into_iter()
            .map(|link| link_view(link, link_base, page.per_page))
            .collect();

        Self {
            scope: page.scope.target.to_string(),
            ordering: page.scope.ordering.as_str(),
            summary: page.viewing_summary(),
            page: page.page,
            per_page: page.per_page,
            total_items: page.total_items,
            total_pages: page.total_pages,
            topics,
            links,
        }
    }

    pub fn link_strip(&self) -> String {
        self.links
            .iter()
            .map(|link| {
                if link.current {
                    format!("[{}]", link.label)
                } else {
                    link.label.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn link_view(link: PageLink, link_base: &str, per_page: u64) -> PageLinkView {
    let href = |page: u64| Some(format!("{link_base}?p={page}&n={per_page}"));
    match link {
        PageLink::Previous { page } => PageLinkView {
            label: "←".to_string(),
            href: href(page),
            current: false,
        },
        PageLink::Number { page, current } => PageLinkView {
            label: page.to_string(),
            href: if current { None } else { href(page) },
            current,
        },
        PageLink::Gap => PageLinkView {
            label: "…".to_string(),
            href: None,
            current: false,
        },
        PageLink::Next { page } => PageLinkView {
            label: "→".to_string(),
            href: href(page),
            current: false,
        },
    }
}

#[derive(Template)]
#[template(path = "topic_list.txt")]
pub struct TopicListTemplate<'a> {
    pub view: &'a TopicListView,
}

#[derive(Template)]
#[template(path = "page_plan.txt")]
pub struct PagePlanTemplate<'a> {
    pub plan: &'a PagePlan,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    use crate::domain::types::Scope;

    fn topic(id: i64, sticky: StickyLevel, posts: i32) -> TopicRecord {
        TopicRecord {
            id,
            forum_id: 2,
            poster_id: 5,
            title: format!("Topic {id}"),
            sticky,
            post_count: posts,
            tags: Vec::new(),
            started_at: datetime!(2024-05-01 08:00 UTC),
            last_post_at: datetime!(2024-05-02 18:30 UTC),
        }
    }

    fn page() -> PageResult<TopicRecord> {
        PageResult {
            scope: Scope::forum(2),
            items: vec![topic(1, StickyLevel::Forum, 3), topic(40, StickyLevel::Ordinary, 2)],
            page: 1,
            per_page: 2,
            total_items: 9,
            total_pages: 5,
            pinned_on_page: 1,
        }
    }

    #[test]
    fn rows_mark_the_pinned_block() {
        let view = TopicListView::from_page(&page(), "/forums/2");
        assert!(view.topics[0].sticky);
        assert!(!view.topics[1].sticky);
        assert_eq!(view.topics[0].replies, 2);
        assert_eq!(view.topics[1].reply_noun(), "reply");
        assert_eq!(view.topics[0].last_post_at, "2024-05-02T18:30:00Z");
        assert_eq!(view.summary, "Viewing 1 - 2 of 9 topics");
    }

    #[test]
    fn links_carry_page_and_size_query_arguments() {
        let view = TopicListView::from_page(&page(), "/forums/2");
        assert_eq!(
            view.links.last(),
            Some(&PageLinkView {
                label: "→".to_string(),
                href: Some("/forums/2?p=2&n=2".to_string()),
                current: false,
            })
        );
        assert_eq!(view.links[0].href, None);
        insta::assert_snapshot!(view.link_strip(), @"[1] 2 … 5 →");
    }

    #[test]
    fn text_rendering_lists_each_topic() {
        let view = TopicListView::from_page(&page(), "");
        let rendered = render_template(TopicListTemplate { view: &view }).unwrap();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "Viewing 1 - 2 of 9 topics");
        assert!(lines[1].starts_with("[sticky] #1 Topic 1"));
        assert!(lines[2].contains("#40 Topic 40 · 1 reply"));
        assert_eq!(lines[3], "Pages: [1] 2 … 5 →");
    }
}
