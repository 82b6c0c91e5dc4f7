//! Client configuration

/// Client configuration for connecting to the Caja server
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:3000")
    pub base_url: String,

    /// Operator ID sent as `X-Operator-Id`
    pub operator_id: String,

    /// Operator display name sent as `X-Operator-Name`
    pub operator_name: Option<String>,

    /// Branch ID sent as `X-Branch-Id`
    pub branch_id: String,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl ClientConfig {
    pub fn new(
        base_url: impl Into<String>,
        operator_id: impl Into<String>,
        branch_id: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            operator_id: operator_id.into(),
            operator_name: None,
            branch_id: branch_id.into(),
            timeout: 30,
        }
    }

    pub fn with_operator_name(mut self, name: impl Into<String>) -> Self {
        self.operator_name = Some(name.into());
        self
    }

    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }
}
