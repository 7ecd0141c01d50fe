use crate::{Error, Result, truncate_long};
use std::{
    collections::BTreeMap,
    fmt::{self, Display},
    time::Duration,
};
use url::form_urlencoded;

/// Parsed form of a `driver://database?key=value` connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionOptions {
    /// Scheme naming the driver, for example `sqlite`.
    pub driver: String,
    /// Percent-decoded database name or path, possibly empty.
    pub database: String,
    /// Time to wait while establishing a connection (`timeout`, whole seconds).
    /// Rendering drops any fraction of a second.
    pub timeout: Duration,
    /// Every other query parameter, for the driver to interpret.
    pub parameters: BTreeMap<String, String>,
}

impl ConnectionOptions {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

    pub fn new(driver: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            database: database.into(),
            timeout: Self::DEFAULT_TIMEOUT,
            parameters: BTreeMap::new(),
        }
    }

    pub fn parse(connection_string: &str) -> Result<Self> {
        let context = || {
            format!(
                "While parsing the connection string `{}`",
                truncate_long!(connection_string)
            )
        };
        let Some((driver, rest)) = connection_string.split_once("://") else {
            return Err(Error::msg(
                "Expected a connection string of the form `driver://database?key=value`",
            )
            .context(context()));
        };
        if driver.is_empty()
            || !driver
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        {
            return Err(Error::msg(format!("Invalid driver name `{driver}`")).context(context()));
        }
        let (database, query) = rest.split_once('?').unwrap_or((rest, ""));
        let database = urlencoding::decode(database)
            .map_err(|e| Error::new(e).context(context()))?
            .into_owned();
        let mut result = Self::new(driver, database);
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if key == "timeout" {
                let seconds = value.parse::<u64>().map_err(|e| {
                    Error::new(e)
                        .context(format!("Invalid timeout `{value}`, expected whole seconds"))
                        .context(context())
                })?;
                result.timeout = Duration::from_secs(seconds);
            } else {
                result.parameters.insert(key.into_owned(), value.into_owned());
            }
        }
        Ok(result)
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// The timeout has whole-second granularity, fractions are truncated.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Duration::from_secs(timeout.as_secs());
        self
    }
}

impl Display for ConnectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://", self.driver)?;
        for c in self.database.chars() {
            match c {
                '%' => f.write_str("%25")?,
                '?' => f.write_str("%3F")?,
                '#' => f.write_str("%23")?,
                _ => write!(f, "{c}")?,
            }
        }
        let mut query = form_urlencoded::Serializer::new(String::new());
        if self.timeout != Self::DEFAULT_TIMEOUT {
            query.append_pair("timeout", &self.timeout.as_secs().to_string());
        }
        for (key, value) in &self.parameters {
            query.append_pair(key, value);
        }
        let query = query.finish();
        if !query.is_empty() {
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}
