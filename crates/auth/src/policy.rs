//! Route access policy.
//!
//! One table type serves both the page surface and the API surface. A table
//! is a rule for the literal root path, an ordered list of rules scanned
//! first-match-wins, and a fail-closed default of `Authenticated` for
//! anything unmatched. Tables are built once at startup and only read after.

use serde::Serialize;

pub const ROOT_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";

/// What a caller needs to reach a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessLevel {
    Public,
    Authenticated,
    ManagerOnly,
}

/// HTTP methods reduced to what the policy cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestMethod {
    Read,
    Write,
}

impl RequestMethod {
    /// `GET`, `HEAD` and `OPTIONS` are reads; everything else writes.
    pub fn from_http(method: &str) -> Self {
        if ["GET", "HEAD", "OPTIONS"]
            .iter()
            .any(|m| m.eq_ignore_ascii_case(method))
        {
            RequestMethod::Read
        } else {
            RequestMethod::Write
        }
    }
}

/// How a rule matches a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutePattern {
    /// The path equals the pattern.
    Exact(&'static str),
    /// The pattern or anything below it, on segment boundaries:
    /// `/upload` matches `/upload` and `/upload/1`, not `/uploads`.
    Prefix(&'static str),
    /// The collection root only (`/api/training` or `/api/training/`),
    /// never an item path beneath it.
    Collection(&'static str),
}

impl RoutePattern {
    pub fn matches(&self, path: &str) -> bool {
        match *self {
            RoutePattern::Exact(p) => path == p,
            RoutePattern::Prefix(p) => path
                .strip_prefix(p)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
            RoutePattern::Collection(p) => path
                .strip_prefix(p)
                .is_some_and(|rest| rest.is_empty() || rest == "/"),
        }
    }
}

/// One row of a policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRule {
    pub pattern: RoutePattern,
    pub read: AccessLevel,
    pub write: AccessLevel,
}

impl RouteRule {
    /// Same access level for every method.
    pub const fn new(pattern: RoutePattern, access: AccessLevel) -> Self {
        Self {
            pattern,
            read: access,
            write: access,
        }
    }

    pub const fn by_method(pattern: RoutePattern, read: AccessLevel, write: AccessLevel) -> Self {
        Self {
            pattern,
            read,
            write,
        }
    }

    pub fn access_for(&self, method: RequestMethod) -> AccessLevel {
        match method {
            RequestMethod::Read => self.read,
            RequestMethod::Write => self.write,
        }
    }
}

use AccessLevel::{Authenticated, ManagerOnly, Public};
use RoutePattern::{Collection, Exact, Prefix};

const PAGE_RULES: &[RouteRule] = &[
    RouteRule::new(Prefix(LOGIN_PATH), Public),
    RouteRule::new(Prefix("/register"), Public),
    RouteRule::new(Prefix("/assets"), Public),
    RouteRule::new(Exact("/favicon.ico"), Public),
    RouteRule::new(Prefix("/dashboard"), ManagerOnly),
    RouteRule::new(Prefix("/upload"), ManagerOnly),
    RouteRule::new(Prefix("/staff"), Authenticated),
    RouteRule::new(Prefix("/training"), Authenticated),
    RouteRule::new(Prefix("/profile"), Authenticated),
];

const API_RULES: &[RouteRule] = &[
    RouteRule::new(Exact("/api/health"), Public),
    RouteRule::new(Prefix("/api/auth/login"), Public),
    RouteRule::new(Prefix("/api/auth/register"), Public),
    RouteRule::new(Prefix("/api/auth/logout"), Public),
    RouteRule::new(Prefix("/api/upload"), ManagerOnly),
    RouteRule::new(Prefix("/api/generate"), ManagerOnly),
    RouteRule::new(Prefix("/api/staff"), ManagerOnly),
    // Bulk operations on the collection are manager-only; reading it is not.
    RouteRule::by_method(Collection("/api/training"), Authenticated, ManagerOnly),
    // Item access is ownership-checked by the training handlers.
    RouteRule::new(Prefix("/api/training"), Authenticated),
    RouteRule::new(Prefix("/api/profile"), Authenticated),
];

/// A policy table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    root: AccessLevel,
    rules: Vec<RouteRule>,
}

impl RoutePolicy {
    /// Level for paths no rule matches.
    pub const DEFAULT_ACCESS: AccessLevel = AccessLevel::Authenticated;

    pub fn new(root: AccessLevel, rules: Vec<RouteRule>) -> Self {
        Self { root, rules }
    }

    /// Browser page routes. The landing page at `/` is public.
    pub fn pages() -> Self {
        Self::new(Public, PAGE_RULES.to_vec())
    }

    /// API routes under `/api`.
    pub fn api() -> Self {
        Self::new(Self::DEFAULT_ACCESS, API_RULES.to_vec())
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Access level required for `path`. Always returns exactly one level.
    pub fn classify(&self, path: &str, method: RequestMethod) -> AccessLevel {
        if path == ROOT_PATH {
            return self.root;
        }

        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(path))
            .map_or(Self::DEFAULT_ACCESS, |rule| rule.access_for(method))
    }
}
