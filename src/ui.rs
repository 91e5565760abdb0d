//! Server-side HTML rendering: layout, blog feed, post detail and the
//! fragments gated on per-visitor state (consent banner, analytics loader,
//! transient contact notices).

use crate::feed::FeedPage;
use crate::markdown::{self, PREVIEW_CHARS};
use crate::models::Post;
use chrono::{DateTime, Datelike, Utc};

pub const MSG_NO_POSTS: &str = "No se encontraron artículos.";
pub const MSG_POST_NOT_FOUND: &str = "Post no encontrado.";
pub const MSG_NO_POST_ID: &str = "No se ha especificado un ID de post.";
pub const MSG_POST_LOAD_ERROR: &str = "Error al cargar el post.";

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// "5 de enero de 2026", the fixed es-ES long format the site always used.
pub fn format_date_es(date: &DateTime<Utc>) -> String {
    let month = MONTHS_ES[date.month0() as usize];
    format!("{} de {} de {}", date.day(), month, date.year())
}

/// Transient notification text for a `?sent=` flag, if the flag is known.
pub fn notice_text(code: &str) -> Option<&'static str> {
    match code {
        "ok" => Some("Mensaje enviado correctamente. Gracias."),
        "missing" => Some("Por favor rellena nombre, email y mensaje."),
        "err" => Some("Error al enviar. Intenta de nuevo."),
        "conn" => Some("Error de conexión. Intenta más tarde."),
        _ => None,
    }
}

/// Percent-encode a string for use as a query-parameter value.
fn encode_query(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Everything the layout needs besides the page body.
pub struct Page<'a> {
    pub title: &'a str,
    pub body: String,
    /// Render the consent banner (no valid consent record stored).
    pub show_consent_banner: bool,
    /// Measurement id to load analytics with, when consented and configured.
    pub analytics_id: Option<&'a str>,
    /// Transient notification to float over the page.
    pub notice: Option<&'a str>,
}

pub fn render_layout(page: &Page<'_>) -> String {
    let consent = if page.show_consent_banner {
        CONSENT_BANNER_HTML
    } else {
        ""
    };
    let analytics = page
        .analytics_id
        .map(|id| ANALYTICS_HTML.replace("{{GA_ID}}", id))
        .unwrap_or_default();
    let notice = page
        .notice
        .map(|text| format!(r#"<div class="contact-banner">{}</div>"#, markdown::escape_html(text)))
        .unwrap_or_default();

    LAYOUT_HTML
        .replace("{{TITLE}}", &markdown::escape_html(page.title))
        .replace("{{BODY}}", &page.body)
        .replace("{{CONSENT}}", consent)
        .replace("{{ANALYTICS}}", &analytics)
        .replace("{{NOTICE}}", &notice)
        .replace("{{YEAR}}", &Utc::now().year().to_string())
}

/// Cards plus pagination controls for one feed page. The whole section is
/// rebuilt on every request; there is no incremental update to get wrong.
/// An empty collection is still a successful render: an empty grid, no
/// fallback message (that literal belongs to the fetch-failure path).
pub fn render_feed(feed: &FeedPage<'_>) -> String {
    let mut out = String::from(r#"<div class="blog-grid">"#);
    for (index, post) in feed.posts.iter().enumerate() {
        let href = format!("/post?id={}", encode_query(&post.id));
        // Staggered entrance: each card starts its animation a step later.
        out.push_str(&format!(
            r#"
<article class="blog-card" style="animation-delay: {delay}ms">
  <h3 class="card-title"><a href="{href}">{title}</a></h3>
  <p class="card-meta"><span>{date}</span> &middot; <span>{author}</span></p>
  <p class="card-preview">{preview}</p>
  <p><a class="btn" href="{href}">Ver más</a></p>
</article>"#,
            delay = index * 100,
            href = href,
            title = markdown::escape_html(&post.title),
            date = format_date_es(&post.date),
            author = markdown::escape_html(&post.author),
            preview = markdown::escape_html(&markdown::preview(&post.content, PREVIEW_CHARS)),
        ));
    }
    out.push_str("</div>");
    out.push_str(&render_pagination(feed));
    out
}

fn render_pagination(feed: &FeedPage<'_>) -> String {
    if feed.page_count <= 1 {
        return String::new();
    }

    let prev = if feed.has_prev() {
        format!(
            r#"<a class="page-btn" href="/?page={}">Anterior</a>"#,
            feed.page - 1
        )
    } else {
        r#"<span class="page-btn disabled">Anterior</span>"#.to_owned()
    };
    let next = if feed.has_next() {
        format!(
            r#"<a class="page-btn" href="/?page={}">Siguiente</a>"#,
            feed.page + 1
        )
    } else {
        r#"<span class="page-btn disabled">Siguiente</span>"#.to_owned()
    };

    format!(r#"<nav class="pagination">{prev}{next}</nav>"#)
}

/// Body of the blog index: the feed (or its fallback message) plus the
/// contact section.
pub fn render_index_body(feed_html: &str) -> String {
    format!(
        r#"<section class="blog" id="blog">
  <h2>Blog</h2>
  {feed_html}
</section>
{CONTACT_SECTION_HTML}"#
    )
}

/// Full post view. The Markdown body is sanitized during rendering; title
/// and author are escaped as plain text.
pub fn render_post_body(post: &Post) -> String {
    format!(
        r#"<article class="post">
  <h1>{title}</h1>
  <p class="post-meta">{author} &mdash; {date}</p>
  <div class="post-content">{content}</div>
</article>"#,
        title = markdown::escape_html(&post.title),
        author = markdown::escape_html(&post.author),
        date = format_date_es(&post.date),
        content = markdown::render_sanitized(&post.content),
    )
}

/// Single literal message in place of a page body.
pub fn render_message_body(message: &str) -> String {
    format!("<p>{}</p>", markdown::escape_html(message))
}

const CONTACT_SECTION_HTML: &str = r#"<section class="contact" id="contacto">
  <h2>Contacto</h2>
  <form id="contact-form" method="post" action="/contact">
    <input type="text" name="nombre" placeholder="Nombre">
    <input type="email" name="email" placeholder="Email">
    <input type="text" name="asunto" placeholder="Asunto (opcional)">
    <textarea name="mensaje" rows="5" placeholder="Mensaje"></textarea>
    <button class="btn" type="submit">Enviar</button>
  </form>
</section>"#;

const CONSENT_BANNER_HTML: &str = r#"<div id="cookie-banner" class="cookie-banner">
      <p>
        Usamos cookies necesarias para que la web funcione y, solo si las aceptas,
        cookies de analítica. Tu decisión se guarda durante un año.
      </p>
      <div class="cookie-actions">
        <form method="post" action="/consent/accept"><button class="btn" type="submit">Aceptar todo</button></form>
        <form method="post" action="/consent/necessary"><button class="btn btn-ghost" type="submit">Solo necesarias</button></form>
        <form method="post" action="/consent/reject"><button class="btn btn-ghost" type="submit">Rechazar</button></form>
      </div>
    </div>"#;

const ANALYTICS_HTML: &str = r#"<script async src="https://www.googletagmanager.com/gtag/js?id={{GA_ID}}"></script>
    <script>
      window.dataLayer = window.dataLayer || [];
      function gtag(){dataLayer.push(arguments);}
      gtag('js', new Date());
      gtag('config', '{{GA_ID}}', {
        'anonymize_ip': true,
        'allow_ad_personalization_signals': false
      });
      gtag('consent', 'update', { 'analytics_storage': 'granted' });
    </script>"#;

const LAYOUT_HTML: &str = r##"<!DOCTYPE html>
<html lang="es">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    :root {
      --bg: #f7f8fc;
      --ink: #22243a;
      --muted: #6b6f85;
      --accent: #3e64ff;
      --card: #ffffff;
      --shadow: 0 12px 32px rgba(34, 36, 58, 0.1);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Segoe UI", "Helvetica Neue", Arial, sans-serif;
      line-height: 1.6;
    }

    .site {
      width: min(960px, 100%);
      margin: 0 auto;
      padding: 24px 18px 48px;
    }

    header.site-header {
      display: flex;
      align-items: center;
      justify-content: space-between;
      padding: 8px 0 24px;
    }

    .brand {
      font-size: 1.2rem;
      font-weight: 700;
      text-decoration: none;
      color: var(--ink);
    }

    nav.site-nav a {
      margin-left: 18px;
      color: var(--muted);
      text-decoration: none;
    }

    nav.site-nav a:hover {
      color: var(--accent);
    }

    h1, h2 {
      line-height: 1.25;
    }

    .blog-grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(260px, 1fr));
      gap: 18px;
    }

    .blog-card {
      background: var(--card);
      border-radius: 14px;
      box-shadow: var(--shadow);
      padding: 20px;
      opacity: 0;
      animation: fadeInUp 500ms ease forwards;
    }

    .card-title a {
      color: var(--ink);
      text-decoration: none;
    }

    .card-title a:hover {
      color: var(--accent);
    }

    .card-meta {
      color: var(--muted);
      font-size: 0.9rem;
    }

    .btn {
      display: inline-block;
      background: var(--accent);
      color: white;
      border: none;
      border-radius: 8px;
      padding: 8px 16px;
      font-size: 0.95rem;
      text-decoration: none;
      cursor: pointer;
    }

    .btn:disabled {
      opacity: 0.6;
      cursor: wait;
    }

    .btn-ghost {
      background: transparent;
      color: var(--ink);
      border: 1px solid var(--muted);
    }

    .pagination {
      display: flex;
      gap: 10px;
      justify-content: center;
      margin-top: 24px;
    }

    .page-btn {
      padding: 8px 18px;
      border-radius: 8px;
      background: var(--card);
      box-shadow: var(--shadow);
      color: var(--ink);
      text-decoration: none;
    }

    .page-btn.disabled {
      opacity: 0.45;
    }

    .post {
      background: var(--card);
      border-radius: 14px;
      box-shadow: var(--shadow);
      padding: 28px;
    }

    .post-meta {
      color: var(--muted);
    }

    .contact {
      margin-top: 40px;
    }

    .contact form {
      display: grid;
      gap: 12px;
      max-width: 560px;
    }

    .contact input,
    .contact textarea {
      border: 1px solid #d5d8e4;
      border-radius: 8px;
      padding: 10px 12px;
      font: inherit;
    }

    footer.site-footer {
      margin-top: 48px;
      color: var(--muted);
      font-size: 0.9rem;
      text-align: center;
    }

    .contact-banner {
      position: fixed;
      top: 20px;
      right: 20px;
      padding: 16px 24px;
      background-color: var(--accent);
      color: white;
      border-radius: 8px;
      font-weight: 500;
      box-shadow: 0 4px 12px rgba(62, 100, 255, 0.3);
      z-index: 9999;
      animation: slideInBanner 0.4s ease-out, slideOutBanner 0.4s ease-out 3s forwards;
    }

    .cookie-banner {
      position: fixed;
      left: 0;
      right: 0;
      bottom: 0;
      display: flex;
      flex-wrap: wrap;
      gap: 14px;
      align-items: center;
      justify-content: space-between;
      background: var(--ink);
      color: white;
      padding: 16px 22px;
      z-index: 9998;
    }

    .cookie-banner p {
      margin: 0;
      max-width: 620px;
      font-size: 0.92rem;
    }

    .cookie-actions {
      display: flex;
      gap: 10px;
    }

    .cookie-actions .btn-ghost {
      color: white;
      border-color: rgba(255, 255, 255, 0.6);
    }

    .chat-button {
      position: fixed;
      right: 22px;
      bottom: 22px;
      width: 54px;
      height: 54px;
      border-radius: 50%;
      background: var(--accent);
      color: white;
      display: flex;
      align-items: center;
      justify-content: center;
      font-size: 1.4rem;
      text-decoration: none;
      box-shadow: 0 10px 24px rgba(62, 100, 255, 0.4);
      z-index: 9997;
    }

    .chat-container {
      position: fixed;
      right: 22px;
      bottom: 88px;
      width: min(340px, calc(100vw - 44px));
      height: 420px;
      display: none;
      flex-direction: column;
      background: var(--card);
      border-radius: 14px;
      box-shadow: var(--shadow);
      overflow: hidden;
      z-index: 9997;
    }

    .chat-container.chat-maximized {
      width: min(520px, calc(100vw - 44px));
      height: min(640px, calc(100vh - 120px));
    }

    .chat-header {
      display: flex;
      align-items: center;
      justify-content: space-between;
      background: var(--accent);
      color: white;
      padding: 10px 14px;
    }

    .chat-header button {
      background: transparent;
      border: none;
      color: white;
      font-size: 1rem;
      cursor: pointer;
    }

    .chat-messages {
      flex: 1;
      overflow-y: auto;
      padding: 12px;
      display: flex;
      flex-direction: column;
      gap: 8px;
    }

    .message {
      max-width: 85%;
      padding: 8px 12px;
      border-radius: 10px;
      font-size: 0.93rem;
      overflow-wrap: break-word;
    }

    .user-message {
      align-self: flex-end;
      background: var(--accent);
      color: white;
    }

    .bot-message {
      align-self: flex-start;
      background: #eef0f8;
    }

    .chat-typing {
      display: none;
      padding: 0 12px 8px;
      color: var(--muted);
      font-size: 0.85rem;
    }

    .chat-input {
      display: flex;
      gap: 8px;
      padding: 10px;
      border-top: 1px solid #e3e5ef;
    }

    .chat-input input {
      flex: 1;
      border: 1px solid #d5d8e4;
      border-radius: 8px;
      padding: 8px 10px;
      font: inherit;
    }

    @keyframes fadeInUp {
      from {
        opacity: 0;
        transform: translateY(14px);
      }
      to {
        opacity: 1;
        transform: translateY(0);
      }
    }

    @keyframes slideInBanner {
      from {
        transform: translateX(400px);
        opacity: 0;
      }
      to {
        transform: translateX(0);
        opacity: 1;
      }
    }

    @keyframes slideOutBanner {
      from {
        transform: translateX(0);
        opacity: 1;
      }
      to {
        transform: translateX(400px);
        opacity: 0;
      }
    }
  </style>
  {{ANALYTICS}}
</head>
<body>
  <div class="site">
    <header class="site-header">
      <a class="brand" href="/">Rodrigo Valdelvira</a>
      <nav class="site-nav">
        <a href="/">Blog</a>
        <a href="/#contacto">Contacto</a>
      </nav>
    </header>

    <main>
{{BODY}}
    </main>

    <footer class="site-footer">
      <p>&copy; <span id="footer-year">{{YEAR}}</span> Rodrigo Valdelvira</p>
    </footer>
  </div>

  {{NOTICE}}
  {{CONSENT}}

  <a href="#" class="chat-button" aria-label="Abrir chat">&#128172;</a>
  <div class="chat-container">
    <div class="chat-header">
      <span>Chat</span>
      <div>
        <button type="button" class="maximize-chat" aria-label="Maximizar">&#9634;</button>
        <button type="button" class="close-chat" aria-label="Cerrar">&times;</button>
      </div>
    </div>
    <div class="chat-messages"></div>
    <div class="chat-typing">Escribiendo...</div>
    <div class="chat-input">
      <input type="text" placeholder="Escribe un mensaje...">
      <button class="btn" type="button">Enviar</button>
    </div>
  </div>

  <script>
    const chatButton = document.querySelector('.chat-button');
    const chatContainer = document.querySelector('.chat-container');
    const chatMessages = document.querySelector('.chat-messages');
    const chatInput = document.querySelector('.chat-input input');
    const chatSend = document.querySelector('.chat-input button');
    const closeChat = document.querySelector('.close-chat');
    const maximizeChat = document.querySelector('.maximize-chat');
    const chatTyping = document.querySelector('.chat-typing');

    // Bot replies arrive as server-sanitized HTML; user text is inserted as
    // plain text only and never interpreted as markup.
    const addMessage = (content, type, isHtml) => {
      const div = document.createElement('div');
      div.classList.add('message', type + '-message');
      if (isHtml) {
        div.innerHTML = content;
      } else {
        div.textContent = content;
      }
      chatMessages.appendChild(div);
      chatMessages.scrollTop = chatMessages.scrollHeight;
    };

    const toggleChat = () => {
      // Read the computed style, not a flag, so the widget cannot drift out
      // of sync with what is actually on screen.
      const visible = window.getComputedStyle(chatContainer).display !== 'none';
      chatContainer.style.display = visible ? 'none' : 'flex';
    };

    const sendMessage = async () => {
      const message = chatInput.value.trim();
      if (!message) return;

      addMessage(message, 'user', false);
      chatInput.value = '';
      chatTyping.style.display = 'block';

      try {
        const res = await fetch('/api/chat', {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify({ message: message, page: window.location.href })
        });
        if (!res.ok) {
          throw new Error('status ' + res.status);
        }
        const data = await res.json();
        addMessage(data.reply_html, 'bot', true);
      } catch (err) {
        addMessage('Lo siento, ha ocurrido un error al procesar tu mensaje.', 'bot', false);
      } finally {
        chatTyping.style.display = 'none';
      }
    };

    chatButton.addEventListener('click', (e) => {
      e.preventDefault();
      toggleChat();
    });
    chatSend.addEventListener('click', sendMessage);
    chatInput.addEventListener('keypress', (e) => {
      if (e.key === 'Enter') sendMessage();
    });
    closeChat.addEventListener('click', () => {
      chatContainer.style.display = 'none';
    });
    maximizeChat.addEventListener('click', () => {
      chatContainer.classList.toggle('chat-maximized');
    });

    addMessage('¡Hola! ¿En qué puedo ayudarte?', 'bot', false);

    const contactForm = document.getElementById('contact-form');
    if (contactForm) {
      contactForm.addEventListener('submit', () => {
        const submit = contactForm.querySelector('button[type="submit"]');
        if (submit) submit.disabled = true;
      });
    }

    const notice = document.querySelector('.contact-banner');
    if (notice) {
      setTimeout(() => notice.remove(), 3400);
    }
  </script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed;
    use chrono::TimeZone;

    fn post(id: &str, day: u32, title: &str, content: &str) -> Post {
        Post {
            id: id.to_owned(),
            title: title.to_owned(),
            author: "Rodrigo".to_owned(),
            date: Utc.with_ymd_and_hms(2026, 1, day, 8, 0, 0).unwrap(),
            content: content.to_owned(),
        }
    }

    #[test]
    fn dates_use_spanish_long_format() {
        let date = Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap();
        assert_eq!(format_date_es(&date), "5 de enero de 2026");
        let date = Utc.with_ymd_and_hms(2025, 12, 31, 23, 0, 0).unwrap();
        assert_eq!(format_date_es(&date), "31 de diciembre de 2025");
    }

    #[test]
    fn feed_cards_escape_untrusted_titles() {
        let posts = vec![post("a", 5, "<script>alert(1)</script>", "hola")];
        let html = render_feed(&feed::paginate(&posts, 1));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn feed_links_encode_post_ids() {
        let posts = vec![post("a&b c", 5, "Título", "hola")];
        let html = render_feed(&feed::paginate(&posts, 1));
        assert!(html.contains("/post?id=a%26b%20c"));
    }

    #[test]
    fn pagination_disables_the_right_ends() {
        let posts: Vec<Post> = (1..=7)
            .map(|day| post(&day.to_string(), day, "t", "c"))
            .collect();

        let html = render_feed(&feed::paginate(&posts, 1));
        assert!(html.contains(r#"<span class="page-btn disabled">Anterior</span>"#));
        assert!(html.contains(r#"href="/?page=2""#));

        let html = render_feed(&feed::paginate(&posts, 3));
        assert!(html.contains(r#"href="/?page=2""#));
        assert!(html.contains(r#"<span class="page-btn disabled">Siguiente</span>"#));
    }

    #[test]
    fn single_page_renders_no_controls() {
        let posts = vec![post("a", 1, "t", "c")];
        let html = render_feed(&feed::paginate(&posts, 1));
        assert!(!html.contains("pagination"));
    }

    #[test]
    fn empty_feed_renders_an_empty_grid() {
        let html = render_feed(&feed::paginate(&[], 1));
        assert!(html.contains("blog-grid"));
        assert!(!html.contains(MSG_NO_POSTS));
        assert!(!html.contains("blog-card"));
    }

    #[test]
    fn post_body_sanitizes_markdown_content() {
        let body = render_post_body(&post(
            "a",
            5,
            "Título",
            "Hola **mundo** <script>alert(1)</script>",
        ));
        assert!(body.contains("<strong>mundo</strong>"));
        assert!(!body.contains("<script>"));
    }

    #[test]
    fn layout_gates_consent_banner_and_analytics() {
        let page = Page {
            title: "Blog",
            body: String::new(),
            show_consent_banner: true,
            analytics_id: None,
            notice: None,
        };
        let html = render_layout(&page);
        assert!(html.contains(r#"id="cookie-banner""#));
        assert!(!html.contains("googletagmanager"));

        let page = Page {
            show_consent_banner: false,
            analytics_id: Some("G-ABC123"),
            ..page
        };
        let html = render_layout(&page);
        assert!(!html.contains(r#"id="cookie-banner""#));
        assert!(html.contains("gtag/js?id=G-ABC123"));
    }

    #[test]
    fn layout_floats_the_notice_when_present() {
        let page = Page {
            title: "Blog",
            body: String::new(),
            show_consent_banner: false,
            analytics_id: None,
            notice: notice_text("ok"),
        };
        let html = render_layout(&page);
        assert!(html.contains("Mensaje enviado correctamente. Gracias."));
    }

    #[test]
    fn notice_codes_map_to_literals() {
        assert!(notice_text("ok").is_some());
        assert!(notice_text("missing").is_some());
        assert!(notice_text("err").is_some());
        assert!(notice_text("conn").is_some());
        assert!(notice_text("whatever").is_none());
    }
}
