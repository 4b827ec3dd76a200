/// Router Module Index
///
/// Routes are split by access requirement. `create_router` applies the
/// authentication layer to the `authenticated` router as a whole, so a handler
/// cannot be exposed without credentials by accident.

/// Routes accessible to any client, no credentials required.
pub mod public;

/// Routes behind the bearer-token guard.
pub mod authenticated;
