/// Application name
pub const APP_NAME: &str = "Vitrine";

/// How often a frontend should re-fetch an open conversation thread, in
/// seconds.
pub const THREAD_POLL_SECS: u64 = 5;

/// How often a frontend should re-fetch the unread badge count, in seconds.
pub const UNREAD_POLL_SECS: u64 = 30;

/// Maximum message body size in bytes (64 KiB)
pub const MAX_BODY_BYTES: usize = 65_536;

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Header carrying the caller's user id, set by the auth proxy in front of
/// the API. The server trusts it verbatim.
pub const IDENTITY_HEADER: &str = "x-user-id";
