//! HTML pages served by the relay.
//!
//! Both renderers are pure: same input, same output, no I/O. Every value
//! interpolated into markup goes through [`escape_html`].

/// Escapes the five characters that are significant in HTML text and
/// attribute values.
///
/// ```rust
/// use token_relay::server::escape_html;
///
/// assert_eq!(
///     escape_html(r#"<a href="x">'&'</a>"#),
///     "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
/// );
/// ```
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders the page that shows a shop's permanent access token.
///
/// ```rust
/// use token_relay::server::render_token_page;
///
/// let page = render_token_page("Meezy", "my-store.myshopify.com", "tok_123");
/// assert!(page.contains("<strong>my-store.myshopify.com</strong>"));
/// assert!(page.contains("tok_123"));
/// ```
#[must_use]
pub fn render_token_page(app_name: &str, shop: &str, token: &str) -> String {
    let app_name = escape_html(app_name);
    let shop = escape_html(shop);
    let token = escape_html(token);

    format!(
        r#"<!DOCTYPE html>
<html>
  <head><meta charset="utf-8"><title>{app_name} Integration App</title></head>
  <body style="font-family: sans-serif; padding: 20px;">
    <h1>Successfully Connected!</h1>
    <p>Store: <strong>{shop}</strong></p>
    <div style="background: #f4f4f4; padding: 15px; border-radius: 5px; border: 1px solid #ddd;">
      <p>Your Permanent Access Token is:</p>
      <code style="display: block; word-break: break-all; background: #fff; padding: 10px; border: 1px solid #ccc;">{token}</code>
    </div>
    <p style="color: #666; margin-top: 20px;">
      Copy this token and use it in your {app_name} App Script.
    </p>
  </body>
</html>
"#
    )
}

/// Renders the placeholder served when there is no token to show.
#[must_use]
pub fn render_live_page(app_name: &str) -> String {
    format!("{} App is Live!", escape_html(app_name))
}
