//! Server settings read by the binary. Auth settings live in
//! [`crewdesk_auth::AuthConfig`].

use anyhow::{Context, bail};

pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_COOKIE_SECURE: &str = "SESSION_COOKIE_SECURE";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: std::net::SocketAddr,
    /// Mark the session cookie `Secure` (HTTPS only).
    pub secure_cookies: bool,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .trim()
            .parse()
            .with_context(|| format!("{ENV_BIND_ADDR}: '{bind_addr}' is not a socket address"))?;

        let secure_cookies = match lookup(ENV_COOKIE_SECURE).as_deref().map(str::trim) {
            None | Some("") => false,
            Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => true,
            Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => false,
            Some(other) => bail!("{ENV_COOKIE_SECURE}: expected true or false, got '{other}'"),
        };

        Ok(Self {
            bind_addr,
            secure_cookies,
        })
    }
}
