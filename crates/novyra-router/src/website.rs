// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search over stored website pages, used when the matcher comes up short.

use novyra_core::types::WebsitePage;

use crate::matcher::MatchPayload;
use crate::text::{jaccard, normalize};

const MIN_SCORE: f32 = 0.3;
const MAX_CONFIDENCE: f32 = 0.9;
const EXCERPT_CHARS: usize = 500;

/// Best page for a query, with a confidence capped below a direct match.
#[derive(Debug, Clone, PartialEq)]
pub struct PageHit {
    pub confidence: f32,
    pub payload: MatchPayload,
}

pub fn search_pages(query: &str, pages: &[WebsitePage]) -> Option<PageHit> {
    let query = normalize(query);
    let mut best: Option<(&WebsitePage, f32)> = None;

    for page in pages.iter().filter(|p| p.is_active) {
        let mut score = jaccard(&query, &page.content);
        if !page.title.trim().is_empty() {
            score = score.max(jaccard(&query, &normalize(&page.title)) * 0.8);
        }
        if score > MIN_SCORE && best.is_none_or(|(_, s)| score > s) {
            best = Some((page, score));
        }
    }

    best.map(|(page, score)| PageHit {
        confidence: score.min(MAX_CONFIDENCE),
        payload: MatchPayload {
            content: excerpt(&page.content),
            title: if page.title.trim().is_empty() {
                "Website Information".to_string()
            } else {
                page.title.clone()
            },
            packages: Vec::new(),
            url: Some(page.url.clone()),
        },
    })
}

fn excerpt(content: &str) -> String {
    if content.chars().count() > EXCERPT_CHARS {
        let cut: String = content.chars().take(EXCERPT_CHARS).collect();
        format!("{cut}...")
    } else {
        content.to_string()
    }
}
