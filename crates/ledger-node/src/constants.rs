/// Sender recorded on the reward transaction appended by `/mine`.
pub const REWARD_SENDER: &str = "0";
pub const MINING_REWARD: i64 = 1;
pub const DEFAULT_NODE_ID: &str = "node-1";
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8080";
