use reqwest::Url;

/// Keeps only scheme, host and port of `url` for logging; paths and query
/// strings often carry API keys.
pub fn mask_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return "***".to_string();
    };
    let Some(host) = parsed.host_str() else {
        return "***".to_string();
    };
    let port = parsed.port().map(|p| format!(":{p}")).unwrap_or_default();
    let hidden = parsed.path() != "/" || parsed.query().is_some();
    format!(
        "{}://{}{}/{}",
        parsed.scheme(),
        host,
        port,
        if hidden { "***" } else { "" }
    )
}

/// Telegram tokens look like `<bot id>:<secret>`; only the bot id is shown.
pub fn mask_token(token: &str) -> String {
    match token.split_once(':') {
        Some((bot_id, _)) if !bot_id.is_empty() => format!("{bot_id}:***"),
        _ => "***".to_string(),
    }
}
