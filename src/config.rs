use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

/// Reverts work-item release dates that are not in the future
#[derive(Debug, Parser)]
#[command(name = "release-date-guard", version, about, long_about = None)]
pub struct Cli {
    /// Trusted organization URL; events from any other collection are rejected
    #[arg(long, env = "ADO_ORG_URL_PREFIX")]
    pub org_url_prefix: String,

    /// Project the service is deployed for
    #[arg(long, env = "ADO_PROJECT_NAME")]
    pub project_name: String,

    /// Personal access token for the work-item API
    #[arg(long, env = "ADO_PERSONAL_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Address the webhook endpoint listens on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Connect timeout for outbound calls, in seconds
    #[arg(long, env = "ADO_CONNECT_TIMEOUT_SECS")]
    pub connect_timeout_secs: Option<u64>,

    /// Total timeout for outbound calls, in seconds
    #[arg(long, env = "ADO_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Immutable settings handed to the client and the validator at construction.
#[derive(Debug, Clone)]
pub struct Config {
    pub org_url_prefix: String,
    pub project_name: String,
    /// Checked on every outbound call, not at startup.
    pub access_token: Option<String>,
    pub connect_timeout: Option<Duration>,
    pub request_timeout: Option<Duration>,
}

impl TryFrom<&Cli> for Config {
    type Error = String;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        let org_url_prefix = cli.org_url_prefix.trim().to_string();
        // An empty prefix would trust every sender.
        if org_url_prefix.is_empty() {
            return Err("organization URL prefix must not be blank".to_string());
        }

        Ok(Self {
            org_url_prefix,
            project_name: cli.project_name.trim().to_string(),
            access_token: cli.access_token.clone(),
            connect_timeout: cli.connect_timeout_secs.map(Duration::from_secs),
            request_timeout: cli.request_timeout_secs.map(Duration::from_secs),
        })
    }
}
