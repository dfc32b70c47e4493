// Error modeling shared by every walkthrough and the binary.
pub mod error;
