use serde::Deserialize;

use otpgate_core::config::Config;

use crate::domain::types::{CODE_LEN, OTP_TTL_SECS, ROTATION_INTERVAL_SECS};

/// Credential service configuration loaded from environment variables.
///
/// Each field is read from its upper-case name (`db_host` from `DB_HOST`).
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialConfig {
    /// PostgreSQL host.
    pub db_host: String,
    /// PostgreSQL user.
    pub db_user: String,
    /// PostgreSQL password.
    pub db_password: String,
    /// PostgreSQL database name.
    pub db_name: String,
    /// PostgreSQL port (default 5432).
    #[serde(default = "default_db_port")]
    pub db_port: u16,

    /// Sender address, also the SMTP login.
    pub smtp_email: String,
    /// SMTP password for `smtp_email`.
    pub smtp_password: String,
    /// Recipient of every code, password and alert mail.
    pub to_email: String,
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// MQTT broker host name.
    pub mqtt_broker_url: String,
    pub mqtt_client_id: String,
    pub mqtt_username: String,
    pub mqtt_password: String,
    /// MQTT broker port (default 8883).
    #[serde(default = "default_mqtt_port")]
    pub mqtt_port: u16,
    /// Connect over TLS (default true).
    #[serde(default = "default_true")]
    pub mqtt_tls: bool,

    /// TCP port for the HTTP server (default 3000).
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Digits per code and per rotated password (default 6).
    #[serde(default = "default_code_length")]
    pub otp_length: usize,
    /// Validity window of an issued code in seconds (default 300).
    #[serde(default = "default_otp_ttl_secs")]
    pub otp_ttl_secs: i64,

    /// Run the password rotation loop (default true).
    #[serde(default = "default_true")]
    pub rotation_enabled: bool,
    /// Seconds between rotations (default 120).
    #[serde(default = "default_rotation_interval_secs")]
    pub rotation_interval_secs: u64,
    /// Handle the alert topic (default true). When false only issuance is triggered.
    #[serde(default = "default_true")]
    pub alerts_enabled: bool,

    #[serde(default = "default_issue_topic")]
    pub issue_topic: String,
    #[serde(default = "default_alert_topic")]
    pub alert_topic: String,
    #[serde(default = "default_verification_topic")]
    pub verification_topic: String,
    #[serde(default = "default_rotation_topic")]
    pub rotation_topic: String,
    /// Topic that receives a single "hello" once the bus connection is up.
    #[serde(default = "default_announce_topic")]
    pub announce_topic: String,

    /// Link included in mails, pointing at the code entry page.
    #[serde(default = "default_unlock_url")]
    pub unlock_url: String,
}

impl Config for CredentialConfig {}

/// A configuration value that parses but cannot be used.
#[derive(Debug, thiserror::Error)]
#[error("invalid {name}: {reason}")]
pub struct InvalidConfig {
    pub name: &'static str,
    pub reason: &'static str,
}

impl CredentialConfig {
    /// Reject values the engine cannot run with. Called once at startup.
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if self.otp_length == 0 {
            return Err(InvalidConfig {
                name: "OTP_LENGTH",
                reason: "must be at least 1",
            });
        }
        if self.otp_ttl_secs <= 0 {
            return Err(InvalidConfig {
                name: "OTP_TTL_SECS",
                reason: "must be positive",
            });
        }
        if self.rotation_enabled && self.rotation_interval_secs == 0 {
            return Err(InvalidConfig {
                name: "ROTATION_INTERVAL_SECS",
                reason: "must be positive when rotation is enabled",
            });
        }
        Ok(())
    }

    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.db_user, self.db_password, self.db_host, self.db_port, self.db_name
        )
    }

    /// Alert topic when alerts are enabled.
    pub fn alert_topic(&self) -> Option<&str> {
        self.alerts_enabled.then_some(self.alert_topic.as_str())
    }
}

fn default_db_port() -> u16 {
    5432
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_owned()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_mqtt_port() -> u16 {
    8883
}

fn default_http_port() -> u16 {
    3000
}

fn default_true() -> bool {
    true
}

fn default_code_length() -> usize {
    CODE_LEN
}

fn default_otp_ttl_secs() -> i64 {
    OTP_TTL_SECS
}

fn default_rotation_interval_secs() -> u64 {
    ROTATION_INTERVAL_SECS
}

fn default_issue_topic() -> String {
    "otp/request".to_owned()
}

fn default_alert_topic() -> String {
    "Project2/wrongPassword".to_owned()
}

fn default_verification_topic() -> String {
    "otp/verification".to_owned()
}

fn default_rotation_topic() -> String {
    "Project2/OTP".to_owned()
}

fn default_announce_topic() -> String {
    "openStatus".to_owned()
}

fn default_unlock_url() -> String {
    "http://127.0.0.1:5500/gen-otp-ui/index.html".to_owned()
}
