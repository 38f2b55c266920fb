//! Curated fingerprint lists. Evaluation order is list order, so these are
//! ordered slices rather than sets; changing the order changes which pattern
//! a scan reports first.

/// Database error text that leaks through an injectable query.
pub const SQL_ERROR_FINGERPRINTS: &[&str] = &[
    "sql syntax",
    "sql error",
    "syntax error",
    "mysql",
    "postgresql",
    "sqlite",
    "oracle",
    "odbc",
    "sqlstate",
    "database error",
];

/// Stack traces and interpreter noise in error responses.
pub const ERROR_FINGERPRINTS: &[&str] = &[
    "stack trace",
    "exception",
    "traceback",
    "at line",
    "syntax error",
    "unexpected token",
    "undefined variable",
    "cannot read property",
    "null reference",
    "file path",
    "directory path",
    "database error",
];

/// Secret-shaped terms that should not appear in any response body.
pub const SENSITIVE_TERMS: &[&str] = &[
    "password",
    "secret",
    "token",
    "key",
    "private",
    "credential",
    "api_key",
    "apikey",
    "auth",
    "jwt",
    "ssh",
    "ssl",
    "cert",
];

/// Terms that mark an unauthenticated response as carrying account data.
pub const SENSITIVE_BODY_TERMS: &[&str] = &[
    "user",
    "password",
    "email",
    "phone",
    "address",
    "credit",
    "payment",
    "token",
    "key",
    "secret",
    "private",
];

/// A 200 body containing these after an injected tautology is suspicious.
pub const SUSPICIOUS_SQL_TOKENS: &[&str] = &["admin", "password", "username"];

/// Response headers that disclose the server stack or framework version.
pub const SENSITIVE_HEADERS: &[&str] = &[
    "server",
    "x-powered-by",
    "x-aspnet-version",
    "x-aspnetmvc-version",
    "x-runtime",
    "x-version",
    "x-generator",
    "x-drupal-cache",
    "x-drupal-dynamic-cache",
    "x-wordpress-cache",
];

/// Debug and management surfaces probed relative to the target origin.
pub const DEBUG_PATHS: &[&str] = &[
    "/debug",
    "/status",
    "/health",
    "/metrics",
    "/admin",
    "/actuator",
    "/swagger",
    "/api-docs",
    "/openapi.json",
    "/trace",
    "/env",
];
