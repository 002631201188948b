//! Host allow-list stage.
//!
//! Matching is plain substring containment on the whole target URI, not a
//! comparison against the parsed host. `https://g.co/?forward_url=facebook.com`
//! therefore passes an allow-list of `facebook.com` even though the actual
//! host is `g.co`.

use crate::config::FilterConfig;

/// True when the allow-list is empty or the URI contains one of its entries.
pub fn passes(config: &FilterConfig, target_uri: &str) -> bool {
    let hosts = config.valid_hosts();
    hosts.is_empty() || hosts.iter().any(|host| target_uri.contains(host.as_str()))
}
