use serde::{Deserialize, Serialize};

/// Who invoked the command. Only ever written to logs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerContext {
    pub user_name: String,
    pub channel_name: String,
    pub team_id: String,
}

impl CallerContext {
    pub fn new(
        user_name: impl Into<String>,
        channel_name: impl Into<String>,
        team_id: impl Into<String>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            channel_name: channel_name.into(),
            team_id: team_id.into(),
        }
    }
}
