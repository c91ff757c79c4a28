// agentctl - Command-line client for the Amazon Bedrock AgentCore control plane
//
// The binary is a thin shell around agentctl-core: it builds the command
// tree from the operation registry, loads configuration, connects the wire
// client and renders results and errors.

pub mod cli;
pub mod emit;
pub mod init;
pub mod prompt;
pub mod shutdown;

pub use cli::run;
pub use init::init_tracing;
