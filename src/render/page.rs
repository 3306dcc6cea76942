use crate::db::models::{BackgroundType, Button, DEFAULT_BACKGROUND_COLOR, Link, User};
use crate::imaging::{is_light_color, lighten_color};
use crate::render::{css_color, css_url, escape_html};
use crate::service::page_cache::PublicPage;
use crate::service::social::SocialPlatform;
use crate::types::payload::is_safe_href;
use std::fmt::Write;

const STYLE: &str = r#"
*{box-sizing:border-box;margin:0;padding:0}
body{min-height:100vh;font-family:system-ui,-apple-system,sans-serif;color:#fff;background:#000}
.bg{position:fixed;inset:0;z-index:0}
.bg>div{position:absolute;inset:0}
main{position:relative;z-index:1;max-width:28rem;margin:0 auto;padding:4rem 1.5rem}
.profile{text-align:center;margin-bottom:3rem}
.avatar{position:relative;display:inline-block;margin-bottom:2rem}
.avatar img{width:9rem;height:9rem;border-radius:50%;object-fit:cover;border:2px solid rgba(255,255,255,.2)}
.glow{position:absolute;inset:0;border-radius:50%;filter:blur(24px);transform:scale(1.5);z-index:-1}
h1{font-size:2.5rem;font-weight:600;margin-bottom:1rem}
.bio{color:rgba(255,255,255,.7);font-size:1.1rem;line-height:1.6}
.socials{display:flex;flex-wrap:wrap;justify-content:center;gap:.75rem;margin-bottom:3rem}
.social{display:inline-flex;align-items:center;justify-content:center;width:3rem;height:3rem;border-radius:50%;background:rgba(255,255,255,.08);text-decoration:none;font-weight:700}
.social img{width:1.5rem;height:1.5rem}
.buttons{display:flex;flex-direction:column;gap:1rem}
.cta{display:block;padding:1rem;border-radius:1rem;text-align:center;text-decoration:none;font-weight:600;border:1px solid rgba(255,255,255,.2);background:rgba(255,255,255,.08);color:#fff}
.cta:hover{box-shadow:0 0 24px var(--glow)}
dialog{margin:auto;padding:1.5rem;border-radius:1rem;border:none;width:min(90vw,24rem)}
dialog form{display:flex;flex-direction:column;gap:.75rem}
dialog input,dialog textarea{padding:.5rem;border:1px solid #ccc;border-radius:.5rem;font:inherit}
.placeholder{min-height:100vh;display:flex;flex-direction:column;align-items:center;justify-content:center;text-align:center}
.placeholder p{color:rgba(255,255,255,.6)}
"#;

const CONTACT_SCRIPT: &str = r#"
const dialog = document.getElementById('contact');
document.querySelectorAll('[data-contact]').forEach(el => el.addEventListener('click', e => {
  e.preventDefault();
  dialog.showModal();
}));
document.getElementById('contact-form').addEventListener('submit', async e => {
  e.preventDefault();
  const form = new FormData(e.target);
  const res = await fetch('/api/contact', {
    method: 'POST',
    headers: {'content-type': 'application/json'},
    body: JSON.stringify(Object.fromEntries(form)),
  });
  const body = await res.json().catch(() => ({}));
  alert(res.ok ? (body.message || 'Message sent!') : (body.error || 'Failed to send message.'));
  if (res.ok) { e.target.reset(); dialog.close(); }
});
"#;

/// Full public page, or the set-up placeholder when no profile exists yet.
pub fn render_page(page: &PublicPage) -> String {
    let Some(user) = page.snapshot.user.as_ref() else {
        return render_placeholder();
    };

    let mut body = String::new();
    body.push_str(&background(user));
    body.push_str("<main>");
    body.push_str(&profile_section(user, &page.glow_color));
    body.push_str(&social_icons(&page.snapshot.links));
    if !page.snapshot.buttons.is_empty() {
        body.push_str(&buttons_section(&page.snapshot.buttons, &page.glow_color));
    }
    body.push_str("</main>");

    let has_contact = page.snapshot.buttons.iter().any(Button::opens_contact_form);
    if has_contact {
        body.push_str(CONTACT_DIALOG);
        let _ = write!(body, "<script>{CONTACT_SCRIPT}</script>");
    }

    document(&user.name, &body)
}

pub fn render_placeholder() -> String {
    document(
        "Welcome",
        r#"<div class="placeholder"><h1>Welcome</h1><p>Setting up your profile...</p></div>"#,
    )
}

fn document(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>{body}</body>
</html>"#,
        title = escape_html(title),
    )
}

fn background(user: &User) -> String {
    let color = css_color(&user.background_color, DEFAULT_BACKGROUND_COLOR);
    match (user.background_type, user.background_image_url.as_deref()) {
        (BackgroundType::Image, Some(image)) => {
            let image_style = format!(
                "background-image:url({});background-size:cover;background-position:center center;background-repeat:no-repeat",
                css_url(image)
            );
            let opacity = user.background_overlay_opacity.clamp(0.0, 1.0);
            format!(
                r#"<div class="bg"><div style="{}"></div><div style="background:#000;opacity:{opacity}"></div></div>"#,
                escape_html(&image_style)
            )
        }
        (BackgroundType::Gradient, _) => format!(
            r#"<div class="bg"><div style="background:linear-gradient(135deg, {color}, {color}dd, {color}aa)"></div><div style="background:rgba(0,0,0,.1)"></div></div>"#
        ),
        _ => format!(r#"<div class="bg"><div style="background-color:{color}"></div></div>"#),
    }
}

fn profile_section(user: &User, glow: &str) -> String {
    let glow = css_color(glow, "#ffffff");
    let light_glow = lighten_color(&glow, 30.0);
    let mut out = String::from(r#"<section class="profile">"#);
    if let Some(image) = user.profile_image_url.as_deref() {
        let _ = write!(
            out,
            r#"<div class="avatar"><div class="glow" style="background:radial-gradient(circle, {light_glow}60, {glow}30, transparent)"></div><img src="{}" alt="{}"></div>"#,
            escape_html(image),
            escape_html(&user.name),
        );
    }
    let _ = write!(out, "<h1>{}</h1>", escape_html(&user.name));
    if let Some(bio) = user.bio.as_deref().filter(|b| !b.trim().is_empty()) {
        let _ = write!(out, r#"<p class="bio">{}</p>"#, escape_html(bio));
    }
    out.push_str("</section>");
    out
}

fn social_icons(links: &[Link]) -> String {
    if links.is_empty() {
        return String::new();
    }
    let mut out = String::from(r#"<nav class="socials">"#);
    for link in links {
        let platform = SocialPlatform::from_url(&link.url);
        let glyph = match link.icon_url.as_deref() {
            Some(icon) => format!(r#"<img src="{}" alt="">"#, escape_html(icon)),
            None => escape_html(&platform.label().chars().take(1).collect::<String>()),
        };
        let _ = write!(
            out,
            r#"<a class="social" href="{href}" title="{title}" aria-label="{title}" target="_blank" rel="noopener noreferrer" style="color:{color}">{glyph}</a>"#,
            href = escape_html(href(&link.url)),
            title = escape_html(&link.title),
            color = platform.brand_color(),
        );
    }
    out.push_str("</nav>");
    out
}

fn buttons_section(buttons: &[Button], glow: &str) -> String {
    let glow = css_color(glow, "#ffffff");
    let text = if is_light_color(&glow) { "#ffffff" } else { "#f5f5f5" };
    let mut out = format!(r#"<section class="buttons" style="--glow:{glow}80;color:{text}">"#);
    for button in buttons {
        if button.opens_contact_form() {
            let _ = write!(
                out,
                r##"<a class="cta" href="#contact" data-contact>{}</a>"##,
                escape_html(&button.label)
            );
        } else {
            let _ = write!(
                out,
                r#"<a class="cta" href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
                escape_html(href(&button.url)),
                escape_html(&button.label)
            );
        }
    }
    out.push_str("</section>");
    out
}

/// Rows saved before scheme checks existed may hold script URLs.
fn href(url: &str) -> &str {
    if is_safe_href(url) { url.trim() } else { "#" }
}

const CONTACT_DIALOG: &str = r#"<dialog id="contact"><form id="contact-form">
<h2 style="color:#111">Get in touch</h2>
<input name="name" placeholder="Your name" required>
<input name="email" type="email" placeholder="Your email" required>
<textarea name="message" rows="5" placeholder="Your message" required></textarea>
<button type="submit">Send</button>
<button type="button" onclick="this.closest('dialog').close()">Cancel</button>
</form></dialog>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::PageSnapshot;
    use chrono::Utc;

    fn user(kind: BackgroundType) -> User {
        User {
            id: 1,
            name: "Ada <Lovelace>".into(),
            bio: Some("Engines & numbers".into()),
            profile_image_url: None,
            background_color: "#112233".into(),
            background_type: kind,
            background_image_url: Some("https://img.example/bg.png".into()),
            background_overlay_opacity: 0.4,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn page(user: Option<User>, buttons: Vec<Button>) -> PublicPage {
        PublicPage {
            snapshot: PageSnapshot {
                user,
                buttons,
                links: vec![],
            },
            glow_color: "#ffffff".into(),
        }
    }

    fn button(label: &str) -> Button {
        Button {
            id: 1,
            user_id: 1,
            label: label.into(),
            url: "https://example.com".into(),
            order_index: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn missing_profile_renders_placeholder() {
        let html = render_page(&page(None, vec![]));
        assert!(html.contains("Setting up your profile..."));
    }

    #[test]
    fn profile_text_is_escaped() {
        let html = render_page(&page(Some(user(BackgroundType::Solid)), vec![]));
        assert!(html.contains("Ada &lt;Lovelace&gt;"));
        assert!(html.contains("Engines &amp; numbers"));
        assert!(html.contains("background-color:#112233"));
    }

    #[test]
    fn gradient_and_image_backgrounds() {
        let html = render_page(&page(Some(user(BackgroundType::Gradient)), vec![]));
        assert!(html.contains("linear-gradient(135deg, #112233, #112233dd, #112233aa)"));

        let html = render_page(&page(Some(user(BackgroundType::Image)), vec![]));
        assert!(html.contains("https://img.example/bg.png"));
        assert!(html.contains("opacity:0.4"));
    }

    #[test]
    fn stored_script_url_is_not_rendered() {
        let mut evil = button("Free stuff");
        evil.url = "javascript:alert(1)".into();
        let html = render_page(&page(Some(user(BackgroundType::Solid)), vec![evil]));
        assert!(!html.contains("javascript:"));
        assert!(html.contains(r##"<a class="cta" href="#" target="_blank""##));
    }

    #[test]
    fn contact_button_opens_dialog() {
        let html = render_page(&page(
            Some(user(BackgroundType::Solid)),
            vec![button("Contact me"), button("Shop")],
        ));
        assert!(html.contains("data-contact>Contact me</a>"));
        assert!(html.contains(r#"<dialog id="contact">"#));
        assert!(html.contains(r#"href="https://example.com" target="_blank""#));
    }
}
