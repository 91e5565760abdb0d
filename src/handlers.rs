use crate::chat::{SESSION_COOKIE, SESSION_MAX_AGE_DAYS, build_payload, extract_reply, session_id};
use crate::consent::{self, Decision};
use crate::errors::AppError;
use crate::feed;
use crate::markdown;
use crate::models::{ChatPrompt, ChatReply, ContactFields, FeedQuery, PostQuery};
use crate::state::AppState;
use crate::ui;
use crate::webhooks::{self, WebhookError};
use axum::{
    Form, Json,
    extract::{Query, State},
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use tracing::{error, info};

const SITE_TITLE: &str = "Rodrigo Valdelvira";

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
    jar: CookieJar,
) -> Html<String> {
    let feed_html = match webhooks::fetch_posts(&state.http, &state.config.posts_webhook).await {
        Ok(mut posts) => {
            feed::sort_newest_first(&mut posts);
            let page = feed::paginate(&posts, query.page());
            ui::render_feed(&page)
        }
        Err(err) => {
            error!("failed to fetch posts: {err}");
            ui::render_message_body(ui::MSG_NO_POSTS)
        }
    };

    let body = ui::render_index_body(&feed_html);
    Html(render_page(&state, &jar, SITE_TITLE, body, query.sent.as_deref()))
}

pub async fn post_page(
    State(state): State<AppState>,
    Query(query): Query<PostQuery>,
    jar: CookieJar,
) -> Html<String> {
    let id = query
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());

    let body = match id {
        None => ui::render_message_body(ui::MSG_NO_POST_ID),
        Some(id) => match webhooks::fetch_posts(&state.http, &state.config.posts_webhook).await {
            Ok(posts) => match posts.iter().find(|post| post.id == id) {
                Some(post) => ui::render_post_body(post),
                None => ui::render_message_body(ui::MSG_POST_NOT_FOUND),
            },
            Err(err) => {
                error!("failed to fetch posts for id {id}: {err}");
                ui::render_message_body(ui::MSG_POST_LOAD_ERROR)
            }
        },
    };

    Html(render_page(&state, &jar, SITE_TITLE, body, None))
}

pub async fn chat(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(prompt): Json<ChatPrompt>,
) -> Result<(CookieJar, Json<ChatReply>), (CookieJar, AppError)> {
    let message = prompt.message.trim();
    if message.is_empty() {
        return Err((jar, AppError::bad_request("message must not be empty")));
    }

    let (session, fresh) = session_id(jar.get(SESSION_COOKIE).map(Cookie::value));
    let jar = if fresh {
        info!("starting chat session {session}");
        jar.add(session_cookie(&session))
    } else {
        jar
    };

    // Failure replies carry the jar too: a freshly minted session id must
    // survive a failed first message, not be reissued on every retry.
    let payload = build_payload(message, &session, prompt.page.as_deref(), Utc::now());
    let body = match webhooks::send_chat(&state.http, &state.config.chat_webhook, &payload).await {
        Ok(body) => body,
        Err(err) => {
            error!("chat webhook call failed: {err}");
            return Err((jar, err.into()));
        }
    };

    let Some(reply) = extract_reply(&body) else {
        error!("chat webhook reply carried none of the known fields");
        return Err((jar, AppError::bad_gateway("unexpected chat webhook reply")));
    };

    Ok((
        jar,
        Json(ChatReply {
            reply_html: markdown::render_sanitized(&reply),
        }),
    ))
}

pub async fn contact(
    State(state): State<AppState>,
    Form(fields): Form<ContactFields>,
) -> Redirect {
    let Some(submission) = crate::contact::validate(&fields) else {
        return Redirect::to("/?sent=missing#contacto");
    };

    match webhooks::send_contact(&state.http, &state.config.contact_webhook, &submission).await {
        Ok(()) => Redirect::to("/?sent=ok#contacto"),
        Err(err @ WebhookError::Transport(_)) => {
            error!("contact webhook unreachable: {err}");
            Redirect::to("/?sent=conn#contacto")
        }
        Err(err) => {
            error!("contact webhook call failed: {err}");
            Redirect::to("/?sent=err#contacto")
        }
    }
}

pub async fn consent_accept(jar: CookieJar) -> (CookieJar, Redirect) {
    apply_decision(jar, Decision::AcceptAll)
}

pub async fn consent_necessary(jar: CookieJar) -> (CookieJar, Redirect) {
    apply_decision(jar, Decision::NecessaryOnly)
}

pub async fn consent_reject(jar: CookieJar) -> (CookieJar, Redirect) {
    apply_decision(jar, Decision::Reject)
}

fn apply_decision(jar: CookieJar, decision: Decision) -> (CookieJar, Redirect) {
    let record = consent::record_for(decision, Utc::now());
    info!("consent decision recorded, analytics={}", record.analytics);

    let cookie = Cookie::build((consent::CONSENT_COOKIE, consent::encode(&record)))
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(consent::CONSENT_VALIDITY_DAYS))
        .build();

    (jar.add(cookie), Redirect::to("/"))
}

fn session_cookie(session: &str) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session.to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(SESSION_MAX_AGE_DAYS))
        .build()
}

/// Wrap a body in the site layout, resolving everything that depends on the
/// visitor's cookies: consent banner visibility, the analytics loader and
/// any transient contact notice.
fn render_page(
    state: &AppState,
    jar: &CookieJar,
    title: &str,
    body: String,
    sent: Option<&str>,
) -> String {
    let record = consent::current(
        jar.get(consent::CONSENT_COOKIE).map(Cookie::value),
        Utc::now(),
    );
    let analytics_id = consent::analytics_tag(
        record.as_ref(),
        &state.config.analytics_id,
        state.config.analytics_id_is_placeholder(),
    );

    ui::render_layout(&ui::Page {
        title,
        body,
        show_consent_banner: record.is_none(),
        analytics_id,
        notice: sent.and_then(ui::notice_text),
    })
}
