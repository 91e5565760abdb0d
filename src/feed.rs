use crate::models::Post;

pub const POSTS_PER_PAGE: usize = 3;

/// Sort newest first. `sort_by` is stable, so posts sharing a date keep the
/// order the webhook returned them in.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.date.cmp(&a.date));
}

/// One rendered page of the feed, borrowing from the full sorted collection.
#[derive(Debug)]
pub struct FeedPage<'a> {
    pub posts: &'a [Post],
    pub page: usize,
    pub page_count: usize,
}

impl FeedPage<'_> {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count
    }
}

pub fn page_count(total: usize) -> usize {
    total.div_ceil(POSTS_PER_PAGE).max(1)
}

/// Slice out the requested page. Out-of-range requests clamp into
/// `1..=page_count`, so the feed always renders something sensible.
pub fn paginate(posts: &[Post], requested: usize) -> FeedPage<'_> {
    let page_count = page_count(posts.len());
    let page = requested.clamp(1, page_count);
    let start = (page - 1) * POSTS_PER_PAGE;
    let end = (start + POSTS_PER_PAGE).min(posts.len());

    FeedPage {
        posts: &posts[start..end],
        page,
        page_count,
    }
}
