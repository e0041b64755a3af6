/// Orchestrator: inbound chat event parsing and routing.
pub mod dispatch;
/// Session state machine driver for submitted moves.
pub mod move_service;
/// Render-and-notify plumbing towards the external renderer and transport.
pub mod outbound;
/// Stats and leaderboard projections.
pub mod rating_service;
/// Session creation for games and puzzles.
pub mod session_service;
/// Periodic idle-session eviction.
pub mod sweeper;
