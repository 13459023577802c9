//! Response handling and transformation.
//!
//! # Responsibilities
//! - Restore backend-authored paths in `Location` and `Content-Location`
//! - Restore the `Path` attribute of `Set-Cookie` headers
//!
//! # Design Decisions
//! - Absolute URLs are only rewritten when they point at the route's backend
//! - Rewritten absolute URLs become path-absolute references on the proxy
//! - Values that cannot be parsed are passed through unchanged

use axum::http::{header, uri::Authority, HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::observability::metrics;
use crate::routing::{Route, Rule};

/// Restore a `Location`-style header value.
///
/// Returns `None` when the value needs no change. Absolute URLs aimed at
/// the backend always change, since they become path-absolute references.
pub fn revert_location(value: &str, rule: &dyn Rule, server: &Authority) -> Option<String> {
    if value.starts_with('/') && !value.starts_with("//") {
        let split = value.find(['?', '#']).unwrap_or(value.len());
        let (path, rest) = value.split_at(split);
        let reverted = rule.revert(path);
        return (reverted != path).then(|| format!("{reverted}{rest}"));
    }

    let url = Url::parse(value).ok()?;
    if !points_at(&url, server) {
        return None;
    }
    let mut reverted = rule.revert(url.path());
    if let Some(query) = url.query() {
        reverted.push('?');
        reverted.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        reverted.push('#');
        reverted.push_str(fragment);
    }
    Some(reverted)
}

fn points_at(url: &Url, server: &Authority) -> bool {
    let default_port = match url.scheme() {
        "http" => 80,
        "https" => 443,
        _ => return false,
    };
    url.host_str()
        .map(|host| host.eq_ignore_ascii_case(server.host()))
        .unwrap_or(false)
        && url.port_or_known_default() == Some(server.port_u16().unwrap_or(default_port))
}

/// Restore the `Path` attribute of a `Set-Cookie` value.
///
/// Returns `None` when the cookie has no absolute path attribute or the
/// rule leaves it unchanged.
pub fn revert_cookie_path(value: &str, rule: &dyn Rule) -> Option<String> {
    let mut changed = false;
    let attributes: Vec<String> = value
        .split(';')
        .enumerate()
        .map(|(i, attribute)| {
            // The first segment is the cookie itself
            if i == 0 {
                return attribute.to_string();
            }
            let trimmed = attribute.trim_start();
            let indent = &attribute[..attribute.len() - trimmed.len()];
            match trimmed.split_once('=') {
                Some((name, path))
                    if name.trim().eq_ignore_ascii_case("path") && path.trim().starts_with('/') =>
                {
                    let reverted = rule.revert(path.trim());
                    if reverted == path.trim() {
                        return attribute.to_string();
                    }
                    changed = true;
                    format!("{indent}{name}={reverted}")
                }
                _ => attribute.to_string(),
            }
        })
        .collect();
    changed.then(|| attributes.join(";"))
}

/// Rewrite every backend-authored path in a response's headers.
///
/// Returns the number of header values changed.
pub fn rewrite_response_headers(headers: &mut HeaderMap, route: &Route) -> usize {
    let mut rewritten = 0;

    for name in [header::LOCATION, header::CONTENT_LOCATION] {
        let reverted = headers
            .get(&name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| revert_location(v, route.rule(), route.server()))
            .and_then(|v| HeaderValue::from_str(&v).ok());
        if let Some(value) = reverted {
            tracing::debug!(route = %route.name(), header = %name, value = ?value, "Restored backend path");
            headers.insert(name.clone(), value);
            metrics::record_rewrite(route.name(), header_label(&name));
            rewritten += 1;
        }
    }

    if headers.contains_key(header::SET_COOKIE) {
        let cookies: Vec<HeaderValue> = headers.get_all(header::SET_COOKIE).iter().cloned().collect();
        headers.remove(header::SET_COOKIE);
        for cookie in cookies {
            let reverted = cookie
                .to_str()
                .ok()
                .and_then(|v| revert_cookie_path(v, route.rule()))
                .and_then(|v| HeaderValue::from_str(&v).ok());
            match reverted {
                Some(value) => {
                    headers.append(header::SET_COOKIE, value);
                    metrics::record_rewrite(route.name(), "set-cookie");
                    rewritten += 1;
                }
                None => {
                    headers.append(header::SET_COOKIE, cookie);
                }
            }
        }
    }

    rewritten
}

fn header_label(name: &HeaderName) -> &'static str {
    if name == header::LOCATION {
        "location"
    } else {
        "content-location"
    }
}
