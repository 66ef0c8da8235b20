//! SQL Server connection strings and the driver-version fallback.

use std::fmt;
use std::str::FromStr;

use clap::Args;
use odbc_api::{Connection, ConnectionOptions, Environment};
use tracing::{info, warn};

use crate::error::{QueryError, Result};

pub const DEFAULT_DRIVER: &str = "SQL Server Native Client 11.0";
pub const DEFAULT_SERVER: &str = r"CHUCK\SQL2014";
pub const DEFAULT_DATABASE: &str = "GAP_AnalyticDB";

/// Driver version tried first, and its replacement when that connect fails.
const PREFERRED_DRIVER_VERSION: &str = "11.0";
const FALLBACK_DRIVER_VERSION: &str = "10.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub driver: String,
    pub server: String,
    pub uid: String,
    pub pwd: String,
    pub trusted_connection: String,
    pub database: String,
    /// Keys not listed above, kept in input order.
    pub extra: Vec<(String, String)>,
}

impl Default for ConnectionString {
    fn default() -> Self {
        Self {
            driver: DEFAULT_DRIVER.to_string(),
            server: DEFAULT_SERVER.to_string(),
            uid: String::new(),
            pwd: String::new(),
            trusted_connection: "Yes".to_string(),
            database: DEFAULT_DATABASE.to_string(),
            extra: Vec::new(),
        }
    }
}

impl ConnectionString {
    fn write_with_pwd(&self, f: &mut fmt::Formatter<'_>, pwd: &str) -> fmt::Result {
        write!(
            f,
            "DRIVER={};SERVER={};UID={};PWD={};TRUSTED_CONNECTION={};DATABASE={};",
            self.driver, self.server, self.uid, pwd, self.trusted_connection, self.database
        )?;
        for (key, value) in &self.extra {
            write!(f, "{key}={value};")?;
        }
        Ok(())
    }

    /// Same string with a non-empty password replaced by `***`, for logs.
    pub fn redacted(&self) -> String {
        struct Redacted<'a>(&'a ConnectionString);
        impl fmt::Display for Redacted<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let pwd = if self.0.pwd.is_empty() { "" } else { "***" };
                self.0.write_with_pwd(f, pwd)
            }
        }
        Redacted(self).to_string()
    }

    /// The older Native Client driver, if this string names the 11.0 one.
    pub fn with_downgraded_driver(&self) -> Option<ConnectionString> {
        if !self.driver.contains(PREFERRED_DRIVER_VERSION) {
            return None;
        }
        Some(ConnectionString {
            driver: self
                .driver
                .replace(PREFERRED_DRIVER_VERSION, FALLBACK_DRIVER_VERSION),
            ..self.clone()
        })
    }
}

impl fmt::Display for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_with_pwd(f, &self.pwd)
    }
}

/// Parses `KEY=value;` pairs. Keys are case-insensitive and whitespace
/// around pairs (including newlines) is ignored. Missing keys take the
/// defaults.
impl FromStr for ConnectionString {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        let mut out = ConnectionString::default();
        let mut pairs = 0;
        for part in s.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').ok_or_else(|| {
                QueryError::InvalidConnectionString(format!("expected KEY=value, got {part:?}"))
            })?;
            let key = key.trim();
            let value = value.trim().to_string();
            match key.to_ascii_uppercase().as_str() {
                "DRIVER" => out.driver = value,
                "SERVER" => out.server = value,
                "UID" => out.uid = value,
                "PWD" => out.pwd = value,
                "TRUSTED_CONNECTION" => out.trusted_connection = value,
                "DATABASE" => out.database = value,
                "" => {
                    return Err(QueryError::InvalidConnectionString(format!(
                        "empty key in {part:?}"
                    )))
                }
                _ => out.extra.push((key.to_string(), value)),
            }
            pairs += 1;
        }
        if pairs == 0 {
            return Err(QueryError::InvalidConnectionString("no KEY=value pairs".to_string()));
        }
        Ok(out)
    }
}

// ── CLI ───────────────────────────────────────────────────────────────────────

/// Database connection flags shared by the report binaries.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// ODBC driver name.
    #[arg(long, env = "GAP_DB_DRIVER", default_value = DEFAULT_DRIVER)]
    pub driver: String,

    /// SQL Server instance.
    #[arg(long, env = "GAP_DB_SERVER", default_value = DEFAULT_SERVER)]
    pub server: String,

    #[arg(long, env = "GAP_DB_UID", default_value = "")]
    pub uid: String,

    #[arg(long, env = "GAP_DB_PWD", default_value = "", hide_env_values = true)]
    pub pwd: String,

    /// Windows authentication (Yes/No).
    #[arg(long, env = "GAP_DB_TRUSTED", default_value = "Yes")]
    pub trusted_connection: String,

    #[arg(long, env = "GAP_DB_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: String,

    /// Full connection string; overrides the individual fields.
    #[arg(long, env = "GAP_DB_CONNECTION", hide_env_values = true)]
    pub connection_string: Option<String>,
}

impl ConnectionArgs {
    pub fn connection_string(&self) -> Result<ConnectionString> {
        if let Some(s) = &self.connection_string {
            return s.parse();
        }
        Ok(ConnectionString {
            driver: self.driver.clone(),
            server: self.server.clone(),
            uid: self.uid.clone(),
            pwd: self.pwd.clone(),
            trusted_connection: self.trusted_connection.clone(),
            database: self.database.clone(),
            extra: Vec::new(),
        })
    }
}

// ── Connect ───────────────────────────────────────────────────────────────────

/// Connect, retrying once with the 10.0 driver when the 11.0 one fails.
pub fn connect<'e>(env: &'e Environment, conn_str: &ConnectionString) -> Result<Connection<'e>> {
    let open = |c: &ConnectionString| {
        env.connect_with_connection_string(&c.to_string(), ConnectionOptions::default())
    };

    let first_err = match open(conn_str) {
        Ok(conn) => {
            info!(server = %conn_str.server, database = %conn_str.database, "connected");
            return Ok(conn);
        }
        Err(e) => e,
    };

    let Some(fallback) = conn_str.with_downgraded_driver() else {
        return Err(QueryError::Connection {
            connection: conn_str.redacted(),
            source: first_err,
        });
    };
    warn!(
        error = %first_err,
        driver = %fallback.driver,
        "connect failed; retrying with older driver"
    );
    match open(&fallback) {
        Ok(conn) => {
            info!(server = %fallback.server, database = %fallback.database, driver = %fallback.driver, "connected");
            Ok(conn)
        }
        Err(source) => Err(QueryError::Connection {
            connection: fallback.redacted(),
            source,
        }),
    }
}
